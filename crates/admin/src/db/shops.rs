//! Shop repository for database operations.

use sqlx::{PgPool, Postgres, QueryBuilder};

use kubra_market_core::{ShopCategoryId, ShopId};

use super::RepositoryError;
use crate::models::{NewShop, Shop, ShopUpdate};

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: i32,
    name: String,
    description: Option<String>,
    image: Option<String>,
    address: Option<String>,
    category_id: Option<i32>,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: ShopId::new(row.id),
            name: row.name,
            description: row.description,
            image: row.image,
            address: row.address,
            category_id: row.category_id.map(ShopCategoryId::new),
        }
    }
}

const SHOP_COLUMNS: &str = "id, name, description, image, address, category_id";

/// Repository for shop database operations.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all shops in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Shop>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, ShopRow>(&format!("SELECT {SHOP_COLUMNS} FROM shops ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List the shops in one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: ShopCategoryId,
    ) -> Result<Vec<Shop>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE category_id = $1 ORDER BY id"
        ))
        .bind(category_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, shop: &NewShop) -> Result<Shop, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            r"
            INSERT INTO shops (name, description, image, address, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SHOP_COLUMNS}
            "
        ))
        .bind(&shop.name)
        .bind(&shop.description)
        .bind(&shop.image)
        .bind(&shop.address)
        .bind(shop.category_id.map(|id| id.as_i32()))
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
        id: ShopId,
        changes: ShopUpdate,
    ) -> Result<Option<Shop>, RepositoryError> {
        if changes.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE shops SET ");
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
            if let Some(address) = changes.address {
                set.push("address = ").push_bind_unseparated(address);
            }
            if let Some(category_id) = changes.category_id {
                set.push("category_id = ")
                    .push_bind_unseparated(category_id.map(|id| id.as_i32()));
            }
        }
        query
            .push(" WHERE id = ")
            .push_bind(id.as_i32())
            .push(format!(" RETURNING {SHOP_COLUMNS}"));

        let row = query
            .build_query_as::<ShopRow>()
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Delete a shop. Orders pointing at it are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ShopId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shops WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
