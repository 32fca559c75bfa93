//! Core types for the portfolio site.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod device;
pub mod email;
pub mod id;
pub mod pagination;
pub mod status;
pub mod username;

pub use device::DeviceType;
pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PageInfo, PageRequest};
pub use status::AccountStatus;
pub use username::{Username, UsernameError};
