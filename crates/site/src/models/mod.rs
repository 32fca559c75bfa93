//! Domain models for the site.
//!
//! Repository row types are converted into these before leaving `db`.

pub mod customer;
pub mod session;
pub mod user;

pub use customer::{
    Campaign, Customer, CustomerDetail, DashboardStats, FinancialMetric, SalesMetric, Touchpoint,
};
pub use session::CurrentUser;
pub use user::User;
