//! Business logic services.
//!
//! - `auth` - Registration, email verification, approval, sign-in
//! - `email` - Transactional email (SMTP, or the log when unconfigured)

pub mod auth;
pub mod email;
