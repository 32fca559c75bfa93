//! Account lifecycle status.

use serde::{Deserialize, Serialize};

/// Where a registered account sits in the verify-then-approve flow.
///
/// New accounts must first confirm their email, then be approved by an
/// admin, before they can sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    PendingVerification,
    PendingApproval,
    Active,
}

impl AccountStatus {
    /// Derive the status from the two flags stored on the user row.
    ///
    /// Verification is checked first: an approved but unverified account is
    /// still waiting on its email.
    #[must_use]
    pub const fn from_flags(is_verified: bool, is_approved: bool) -> Self {
        match (is_verified, is_approved) {
            (false, _) => Self::PendingVerification,
            (true, false) => Self::PendingApproval,
            (true, true) => Self::Active,
        }
    }

    #[must_use]
    pub const fn can_sign_in(self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PendingVerification => "Pending verification",
            Self::PendingApproval => "Pending approval",
            Self::Active => "Active",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_checked_before_approval() {
        assert_eq!(
            AccountStatus::from_flags(false, true),
            AccountStatus::PendingVerification
        );
        assert_eq!(
            AccountStatus::from_flags(false, false),
            AccountStatus::PendingVerification
        );
        assert_eq!(
            AccountStatus::from_flags(true, false),
            AccountStatus::PendingApproval
        );
    }

    #[test]
    fn test_only_active_can_sign_in() {
        assert!(AccountStatus::from_flags(true, true).can_sign_in());
        assert!(!AccountStatus::PendingApproval.can_sign_in());
        assert!(!AccountStatus::PendingVerification.can_sign_in());
    }
}
