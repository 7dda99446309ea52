//! # Notification Repository
//!
//! Storage for watcher-generated alerts, including the lookups the watcher
//! uses for deduplication: latest-per-reference (stock cooldown) and
//! same-calendar-day existence (debt reminders).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use omni_core::{AppNotification, NotificationKind};

const NOTIFICATION_COLUMNS: &str = "id, kind, title, message, date, read, link, reference_id";

/// Repository for notification database operations.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Most recent notifications first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<AppNotification>> {
        let notifications = sqlx::query_as::<_, AppNotification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications ORDER BY date DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Number of unread notifications (badge count).
    pub async fn unread_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE read = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a notification and returns it with the assigned id.
    pub async fn insert(&self, notification: &AppNotification) -> DbResult<AppNotification> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (kind, title, message, date, read, link, reference_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.date)
        .bind(notification.read)
        .bind(&notification.link)
        .bind(notification.reference_id)
        .execute(&self.pool)
        .await?;

        let mut created = notification.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    /// Marks one notification as read.
    pub async fn mark_read(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Notification", id));
        }

        Ok(())
    }

    /// Marks everything as read.
    pub async fn mark_all_read(&self) -> DbResult<u64> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE read = 0")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Latest notification of a kind for one referenced entity.
    pub async fn latest_for_reference(
        &self,
        kind: NotificationKind,
        reference_id: i64,
    ) -> DbResult<Option<AppNotification>> {
        let notification = sqlx::query_as::<_, AppNotification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE kind = ? AND reference_id = ? ORDER BY date DESC, id DESC LIMIT 1"
        ))
        .bind(kind)
        .bind(reference_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Whether a (kind, reference) notification already exists within
    /// [day_start, day_end) — the per-calendar-day dedup window.
    pub async fn exists_in_window(
        &self,
        kind: NotificationKind,
        reference_id: i64,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE kind = ? AND reference_id = ? AND date >= ? AND date < ?",
        )
        .bind(kind)
        .bind(reference_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Deletes notifications older than the given instant. Housekeeping.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE date < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
