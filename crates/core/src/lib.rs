//! PSS Core - Shared types library.
//!
//! This crate provides common types used across the portfolio workspace:
//! - `site` - Public website, authenticated area, and JSON API
//! - `cli` - Command-line tools for migrations, users, and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, usernames, device types, account
//!   status, and pagination math

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
