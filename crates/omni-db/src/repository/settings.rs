//! # Settings Repository
//!
//! The settings singleton: exactly one row (id = 1) exists at all times
//! after store initialization, holding currency, theme, the loyalty
//! configuration, and the cloud sync endpoint.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::events::{ChangeBus, ChangeEvent, ChangeOp, SyncTable};
use omni_core::{StoreSettings, SETTINGS_ROW_ID};

const SETTINGS_COLUMNS: &str = "id, store_name, currency, theme_color, loyalty_enabled, \
     spend_per_point, point_value, min_points_to_redeem, live_sync_enabled, \
     cloud_api_url, cloud_api_token";

/// Repository for the settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        SettingsRepository { pool, bus }
    }

    /// Inserts the default settings row when none exists. Idempotent;
    /// called during store initialization.
    pub async fn ensure_initialized(&self) -> DbResult<()> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings WHERE id = ?")
            .bind(SETTINGS_ROW_ID)
            .fetch_one(&self.pool)
            .await?;

        if existing > 0 {
            return Ok(());
        }

        info!("Populating default store settings");
        self.insert_row(&StoreSettings::default()).await?;
        Ok(())
    }

    /// Reads the singleton row.
    pub async fn get(&self) -> DbResult<StoreSettings> {
        get_tx(&self.pool).await
    }

    /// Replaces the singleton row's values. The id is pinned to 1
    /// regardless of what the caller passes.
    pub async fn update(&self, settings: &StoreSettings) -> DbResult<()> {
        debug!("Updating store settings");

        let result = sqlx::query(
            r#"
            UPDATE settings SET
                store_name = ?, currency = ?, theme_color = ?,
                loyalty_enabled = ?, spend_per_point = ?, point_value = ?,
                min_points_to_redeem = ?, live_sync_enabled = ?,
                cloud_api_url = ?, cloud_api_token = ?
            WHERE id = ?
            "#,
        )
        .bind(&settings.store_name)
        .bind(&settings.currency)
        .bind(&settings.theme_color)
        .bind(settings.loyalty_enabled)
        .bind(settings.spend_per_point)
        .bind(settings.point_value)
        .bind(settings.min_points_to_redeem)
        .bind(settings.live_sync_enabled)
        .bind(&settings.cloud_api_url)
        .bind(&settings.cloud_api_token)
        .bind(SETTINGS_ROW_ID)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Settings", SETTINGS_ROW_ID));
        }

        let mut committed = settings.clone();
        committed.id = SETTINGS_ROW_ID;

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Update,
            table: SyncTable::Settings,
            pk: SETTINGS_ROW_ID,
            payload: Some(serde_json::to_value(&committed)?),
        });

        Ok(())
    }

    async fn insert_row(&self, settings: &StoreSettings) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (
                id, store_name, currency, theme_color, loyalty_enabled,
                spend_per_point, point_value, min_points_to_redeem,
                live_sync_enabled, cloud_api_url, cloud_api_token
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(&settings.store_name)
        .bind(&settings.currency)
        .bind(&settings.theme_color)
        .bind(settings.loyalty_enabled)
        .bind(settings.spend_per_point)
        .bind(settings.point_value)
        .bind(settings.min_points_to_redeem)
        .bind(settings.live_sync_enabled)
        .bind(&settings.cloud_api_url)
        .bind(&settings.cloud_api_token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Executor-level helpers (shared with the transaction engine)
// =============================================================================

/// Reads the settings singleton inside a caller-owned transaction, so the
/// loyalty configuration a checkout uses is as fresh as its stock reads.
pub(crate) async fn get_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
) -> DbResult<StoreSettings> {
    let settings = sqlx::query_as::<_, StoreSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM settings WHERE id = ?"
    ))
    .bind(SETTINGS_ROW_ID)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DbError::not_found("Settings", SETTINGS_ROW_ID))?;

    Ok(settings)
}
