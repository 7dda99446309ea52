//! # Category Repository

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeBus, ChangeEvent, ChangeOp, SyncTable};
use omni_core::validation::validate_name;
use omni_core::Category;

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        CategoryRepository { pool, bus }
    }

    /// Lists all categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// Inserts a new category. Names are unique.
    pub async fn insert(&self, name: &str) -> DbResult<Category> {
        validate_name("name", name).map_err(omni_core::CoreError::from)?;

        let name = name.trim();

        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::UniqueViolation {
                    field: "category name".to_string(),
                    value: name.to_string(),
                },
                other => other,
            })?;

        let created = Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        };

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Create,
            table: SyncTable::Categories,
            pk: created.id,
            payload: Some(serde_json::to_value(&created)?),
        });

        Ok(created)
    }

    /// Renames a category.
    pub async fn rename(&self, id: i64, name: &str) -> DbResult<()> {
        validate_name("name", name).map_err(omni_core::CoreError::from)?;

        let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name.trim())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Update,
            table: SyncTable::Categories,
            pk: id,
            payload: Some(serde_json::to_value(&Category {
                id,
                name: name.trim().to_string(),
            })?),
        });

        Ok(())
    }

    /// Deletes a category. Products keep their category name string.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Delete,
            table: SyncTable::Categories,
            pk: id,
            payload: None,
        });

        Ok(())
    }
}
