//! Shop category repository for database operations.

use sqlx::{PgPool, Postgres, QueryBuilder};

use kubra_market_core::ShopCategoryId;

use super::RepositoryError;
use crate::models::{NewShopCategory, ShopCategory, ShopCategoryUpdate};

#[derive(Debug, sqlx::FromRow)]
struct ShopCategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    image: Option<String>,
}

impl From<ShopCategoryRow> for ShopCategory {
    fn from(row: ShopCategoryRow) -> Self {
        Self {
            id: ShopCategoryId::new(row.id),
            name: row.name,
            description: row.description,
            image: row.image,
        }
    }
}

const CATEGORY_COLUMNS: &str = "id, name, description, image";

/// Repository for shop category database operations.
pub struct ShopCategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopCategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ShopCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShopCategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop_categories ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: ShopCategoryId,
    ) -> Result<Option<ShopCategory>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopCategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop_categories WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, category: &NewShopCategory) -> Result<ShopCategory, RepositoryError> {
        let row = sqlx::query_as::<_, ShopCategoryRow>(&format!(
            r"
            INSERT INTO shop_categories (name, description, image)
            VALUES ($1, $2, $3)
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.image)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update. An empty update reads the row unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ShopCategoryId,
        changes: ShopCategoryUpdate,
    ) -> Result<Option<ShopCategory>, RepositoryError> {
        if changes.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE shop_categories SET ");
        {
            let mut set = query.separated(", ");
            if let Some(name) = changes.name {
                set.push("name = ").push_bind_unseparated(name);
            }
            if let Some(description) = changes.description {
                set.push("description = ").push_bind_unseparated(description);
            }
            if let Some(image) = changes.image {
                set.push("image = ").push_bind_unseparated(image);
            }
        }
        query
            .push(" WHERE id = ")
            .push_bind(id.as_i32())
            .push(format!(" RETURNING {CATEGORY_COLUMNS}"));

        let row = query
            .build_query_as::<ShopCategoryRow>()
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Delete a category. Shops pointing at it are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ShopCategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop_categories WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
