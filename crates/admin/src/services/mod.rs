//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Username/password accounts and the password hasher
//! - `analytics` - Monthly and per-shop sales aggregation

pub mod analytics;
pub mod auth;

pub use analytics::{AnalyticsError, MonthlySales, ShopSales, monthly_sales, top_shops};
pub use auth::{AuthError, AuthService, PasswordHasher};
