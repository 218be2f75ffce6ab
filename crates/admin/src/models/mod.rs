//! Domain models for admin.
//!
//! Each entity comes with three shapes:
//! - the stored entity (`Shop`), serialized to clients in camelCase
//! - a create payload (`NewShop`), validated before it reaches storage
//! - a partial update (`ShopUpdate`), where absent fields are left untouched

pub mod order;
pub mod session;
pub mod shop;
pub mod shop_category;
pub mod transaction;
pub mod user;

pub use order::{NewOrder, Order, OrderUpdate};
pub use session::{CurrentUser, keys as session_keys};
pub use shop::{NewShop, Shop, ShopUpdate};
pub use shop_category::{NewShopCategory, ShopCategory, ShopCategoryUpdate};
pub use transaction::{NewTransaction, Transaction};
pub use user::{NewUser, Profile, PublicUser, User, UserUpdate};

use crate::error::FieldError;

/// Collects field errors for a payload.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A required text field must contain something other than whitespace.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors
                .push(FieldError::new(field, format!("{field} is required")));
        }
        self
    }

    /// Like [`Validator::required`], but only when the field is present.
    pub fn required_if_present(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.required(field, value);
        }
        self
    }

    /// Finish validation.
    ///
    /// # Errors
    ///
    /// Returns every collected field error.
    pub fn finish(&mut self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_collects_all_errors() {
        let errors = Validator::new()
            .required("name", "  ")
            .required("orderNumber", "")
            .required("customerName", "Ada")
            .finish()
            .unwrap_err();

        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["name", "orderNumber"]);
    }

    #[test]
    fn test_required_if_present_skips_absent() {
        assert!(
            Validator::new()
                .required_if_present("name", None)
                .finish()
                .is_ok()
        );
        assert!(
            Validator::new()
                .required_if_present("name", Some(""))
                .finish()
                .is_err()
        );
    }
}
