//! Device type recorded for customers and touchpoints.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The device a customer or touchpoint was recorded on.
///
/// The seeded dataset only produces the three named variants; anything else
/// read from the database is kept verbatim in [`DeviceType::Other`] so it is
/// still displayed rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceType {
    Mobile,
    Desktop,
    Tablet,
    Other(String),
}

impl DeviceType {
    /// The variants the seeder draws from.
    pub const KNOWN: [Self; 3] = [Self::Mobile, Self::Desktop, Self::Tablet];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mobile => "Mobile",
            Self::Desktop => "Desktop",
            Self::Tablet => "Tablet",
            Self::Other(s) => s,
        }
    }

    /// CSS modifier used for the badge in the customers table.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Mobile => "badge-mobile",
            Self::Desktop => "badge-desktop",
            Self::Tablet => "badge-tablet",
            Self::Other(_) => "badge-other",
        }
    }
}

impl From<&str> for DeviceType {
    fn from(s: &str) -> Self {
        match s {
            "Mobile" => Self::Mobile,
            "Desktop" => Self::Desktop,
            "Tablet" => Self::Tablet,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for DeviceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Mobile" | "Desktop" | "Tablet" => Self::from(s.as_str()),
            _ => Self::Other(s),
        }
    }
}

impl From<DeviceType> for String {
    fn from(d: DeviceType) -> Self {
        match d {
            DeviceType::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for DeviceType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for DeviceType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <String as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self::from)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for DeviceType {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_map_to_variants() {
        assert_eq!(DeviceType::from("Mobile"), DeviceType::Mobile);
        assert_eq!(DeviceType::from("Tablet".to_owned()), DeviceType::Tablet);
    }

    #[test]
    fn test_unknown_name_is_preserved() {
        let d = DeviceType::from("Smart TV");
        assert_eq!(d, DeviceType::Other("Smart TV".to_owned()));
        assert_eq!(d.to_string(), "Smart TV");
        assert_eq!(d.badge_class(), "badge-other");
    }

    #[test]
    fn test_json_is_plain_string() {
        assert_eq!(
            serde_json::to_string(&DeviceType::Desktop).unwrap(),
            "\"Desktop\""
        );
        let parsed: DeviceType = serde_json::from_str("\"Mobile\"").unwrap();
        assert_eq!(parsed, DeviceType::Mobile);
    }
}
