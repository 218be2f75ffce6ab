//! Shop category domain types.

use serde::{Deserialize, Serialize};

use kubra_market_core::{ShopCategoryId, patch};

use super::Validator;
use crate::error::FieldError;

/// A grouping of shops (e.g. "Grocery Stores").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopCategory {
    pub id: ShopCategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Fields for creating a shop category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShopCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewShopCategory {
    /// # Errors
    ///
    /// Returns field errors for a blank name.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new().required("name", &self.name).finish()
    }
}

/// Partial update of a shop category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopCategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub image: Option<Option<String>>,
}

impl ShopCategoryUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.image.is_none()
    }

    /// # Errors
    ///
    /// Returns field errors for a blank name.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .required_if_present("name", self.name.as_deref())
            .finish()
    }

    pub fn apply_to(self, category: &mut ShopCategory) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(description) = self.description {
            category.description = description;
        }
        if let Some(image) = self.image {
            category.image = image;
        }
    }
}
