//! Shop domain types.

use serde::{Deserialize, Serialize};

use kubra_market_core::{ShopCategoryId, ShopId, patch};

use super::Validator;
use crate::error::FieldError;

/// A shop listed on the marketplace.
///
/// `category_id` is a weak reference: the category may have been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub address: Option<String>,
    pub category_id: Option<ShopCategoryId>,
}

/// Fields for creating a shop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShop {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category_id: Option<ShopCategoryId>,
}

impl NewShop {
    /// # Errors
    ///
    /// Returns field errors for a blank name.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new().required("name", &self.name).finish()
    }
}

/// Partial update of a shop. `categoryId: null` detaches the shop from its category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub category_id: Option<Option<ShopCategoryId>>,
}

impl ShopUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.address.is_none()
            && self.category_id.is_none()
    }

    /// # Errors
    ///
    /// Returns field errors for a blank name.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .required_if_present("name", self.name.as_deref())
            .finish()
    }

    pub fn apply_to(self, shop: &mut Shop) {
        if let Some(name) = self.name {
            shop.name = name;
        }
        if let Some(description) = self.description {
            shop.description = description;
        }
        if let Some(image) = self.image {
            shop.image = image;
        }
        if let Some(address) = self.address {
            shop.address = address;
        }
        if let Some(category_id) = self.category_id {
            shop.category_id = category_id;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_shop_requires_name() {
        let shop: NewShop = serde_json::from_str(r#"{"name": " "}"#).unwrap();
        let errors = shop.validate().unwrap_err();
        assert_eq!(errors[0].field, "name");

        assert!(serde_json::from_str::<NewShop>(r#"{"address": "1 Main St"}"#).is_err());
    }

    #[test]
    fn test_shop_serializes_camel_case() {
        let shop = Shop {
            id: ShopId::new(3),
            name: "Joe's".to_string(),
            description: None,
            image: None,
            address: None,
            category_id: Some(ShopCategoryId::new(9)),
        };
        let json = serde_json::to_value(&shop).unwrap();
        assert_eq!(json["categoryId"], 9);
        assert!(json["address"].is_null());
    }

    #[test]
    fn test_update_can_detach_category() {
        let update: ShopUpdate = serde_json::from_str(r#"{"categoryId": null}"#).unwrap();
        assert_eq!(update.category_id, Some(None));
        assert!(!update.is_empty());
    }
}
