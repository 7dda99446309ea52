//! # Notification Watcher
//!
//! A polling watcher that scans store state for threshold conditions and
//! materializes notification rows, deduplicated over time. Runs once
//! immediately on startup and then on a fixed interval.
//!
//! Two independent checks per pass:
//!
//! - **Stock**: products at or below the low-stock threshold get exactly
//!   one unread notification each; once that notification has been read, a
//!   new one may fire only after a cooldown.
//! - **Debt**: contacts with an outstanding balance and a due date are
//!   reminded the day before, on the day, the day after, and then weekly —
//!   at most once per contact per calendar day.
//!
//! The scan is read-heavy and side-effect-light: a failure on one item or
//! one check is logged and skipped, never aborting the whole pass.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::pool::Database;
use omni_core::{AppNotification, NotificationKind, LOW_STOCK_THRESHOLD};

// =============================================================================
// Configuration
// =============================================================================

/// Watcher tuning. An explicit collaborator: the watcher never reads
/// ambient global state.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Time between scan passes.
    pub interval: Duration,

    /// Stock level at or below which an alert fires.
    pub low_stock_threshold: i64,

    /// Minimum time after a read stock alert before it may fire again.
    pub refire_cooldown: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        WatcherConfig {
            interval: Duration::from_secs(5),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            refire_cooldown: Duration::from_secs(24 * 60 * 60),
        }
    }
}

// =============================================================================
// Watcher
// =============================================================================

/// Scans the store and materializes [`AppNotification`] rows.
#[derive(Debug, Clone)]
pub struct NotificationWatcher {
    db: Database,
    config: WatcherConfig,
}

/// Handle to a spawned watcher task.
pub struct WatcherHandle {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl WatcherHandle {
    /// Signals the watcher to stop and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.handle.await;
    }
}

impl NotificationWatcher {
    /// Creates a watcher over the given database.
    pub fn new(db: Database, config: WatcherConfig) -> Self {
        NotificationWatcher { db, config }
    }

    /// Spawns the polling loop. The first pass runs immediately.
    pub fn spawn(self) -> WatcherHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let interval = self.config.interval;
        let handle = tokio::spawn(self.run(interval, shutdown_rx));

        WatcherHandle {
            shutdown_tx,
            handle,
        }
    }

    async fn run(self, interval: Duration, mut shutdown_rx: mpsc::Receiver<()>) {
        info!(interval_secs = interval.as_secs(), "Notification watcher started");
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        warn!(error = %e, "Notification pass failed");
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }

        info!("Notification watcher stopped");
    }

    /// One full scan pass. Returns how many notifications were created.
    ///
    /// Public so callers (and tests) can force a pass without the timer.
    pub async fn run_once(&self) -> DbResult<u32> {
        let mut created = 0;

        // Each check is independent; one failing must not starve the other.
        match self.stock_pass().await {
            Ok(n) => created += n,
            Err(e) => warn!(error = %e, "Stock check failed"),
        }
        match self.debt_pass().await {
            Ok(n) => created += n,
            Err(e) => warn!(error = %e, "Debt check failed"),
        }

        if created > 0 {
            debug!(created, "Notification pass produced alerts");
        }

        Ok(created)
    }

    // =========================================================================
    // Stock check
    // =========================================================================

    async fn stock_pass(&self) -> DbResult<u32> {
        let products = self
            .db
            .products()
            .list_low_stock(self.config.low_stock_threshold)
            .await?;

        let mut created = 0;
        for product in products {
            match self.ensure_stock_notification(product.id, &product.name, product.stock).await {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(product_id = product.id, error = %e, "Skipping product in stock check")
                }
            }
        }

        Ok(created)
    }

    /// Exactly one unread alert per product; after it is read, re-fire only
    /// once the cooldown has elapsed since the alert was raised.
    async fn ensure_stock_notification(
        &self,
        product_id: i64,
        name: &str,
        stock: i64,
    ) -> DbResult<bool> {
        let repo = self.db.notifications();
        let now = Utc::now();

        if let Some(latest) = repo
            .latest_for_reference(NotificationKind::Stock, product_id)
            .await?
        {
            if !latest.read {
                return Ok(false);
            }
            let elapsed = now.signed_duration_since(latest.date);
            if elapsed.to_std().unwrap_or(Duration::ZERO) < self.config.refire_cooldown {
                return Ok(false);
            }
        }

        repo.insert(&AppNotification {
            id: 0,
            kind: NotificationKind::Stock,
            title: "Low stock".to_string(),
            message: format!("\"{name}\" is down to {stock} in stock"),
            date: now,
            read: false,
            link: Some("/products".to_string()),
            reference_id: Some(product_id),
        })
        .await?;

        Ok(true)
    }

    // =========================================================================
    // Debt check
    // =========================================================================

    async fn debt_pass(&self) -> DbResult<u32> {
        let mut created = 0;

        let customers = self.db.customers().list_debtors_with_due_date().await?;
        for c in customers {
            let Some(due) = c.next_payment_date else { continue };
            match self
                .ensure_debt_notification(NotificationKind::DebtCustomer, c.id, &c.name, c.debt, due)
                .await
            {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => warn!(customer_id = c.id, error = %e, "Skipping customer in debt check"),
            }
        }

        let suppliers = self.db.suppliers().list_debtors_with_due_date().await?;
        for s in suppliers {
            let Some(due) = s.next_payment_date else { continue };
            match self
                .ensure_debt_notification(NotificationKind::DebtSupplier, s.id, &s.name, s.debt, due)
                .await
            {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => warn!(supplier_id = s.id, error = %e, "Skipping supplier in debt check"),
            }
        }

        Ok(created)
    }

    /// Remind at offset -1 (due tomorrow), 0 (due today), then day 1 and
    /// every 7th day overdue. At most one alert per contact per calendar
    /// day.
    async fn ensure_debt_notification(
        &self,
        kind: NotificationKind,
        contact_id: i64,
        name: &str,
        debt: i64,
        due: DateTime<Utc>,
    ) -> DbResult<bool> {
        let now = Utc::now();
        let offset = due_offset_days(now, due);

        if !should_remind(offset) {
            return Ok(false);
        }

        let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + chrono::Duration::days(1);

        let repo = self.db.notifications();
        if repo
            .exists_in_window(kind, contact_id, day_start, day_end)
            .await?
        {
            return Ok(false);
        }

        let (title, message) = match (kind, offset) {
            (NotificationKind::DebtSupplier, o) if o < 0 => (
                "Supplier payment due tomorrow",
                format!("Payment of {debt} to \"{name}\" is due tomorrow"),
            ),
            (NotificationKind::DebtSupplier, 0) => (
                "Supplier payment due today",
                format!("Payment of {debt} to \"{name}\" is due today"),
            ),
            (NotificationKind::DebtSupplier, o) => (
                "Supplier payment overdue",
                format!("Payment of {debt} to \"{name}\" is {o} day(s) overdue"),
            ),
            (_, o) if o < 0 => (
                "Debt due tomorrow",
                format!("\"{name}\" owes {debt}, due tomorrow"),
            ),
            (_, 0) => ("Debt due today", format!("\"{name}\" owes {debt}, due today")),
            (_, o) => (
                "Debt overdue",
                format!("\"{name}\" owes {debt}, {o} day(s) overdue"),
            ),
        };

        repo.insert(&AppNotification {
            id: 0,
            kind,
            title: title.to_string(),
            message,
            date: now,
            read: false,
            link: Some("/debts".to_string()),
            reference_id: Some(contact_id),
        })
        .await?;

        Ok(true)
    }
}

// =============================================================================
// Due-date arithmetic
// =============================================================================

/// Whole days between today and the due date, both truncated to midnight.
/// Negative while the due date is still ahead.
fn due_offset_days(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    (now.date_naive() - due.date_naive()).num_days()
}

/// Reminder schedule: the day before, the day itself, the first day
/// overdue, then every 7th day.
fn should_remind(offset: i64) -> bool {
    offset == -1 || offset == 0 || (offset > 0 && (offset == 1 || offset % 7 == 0))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_remind_schedule() {
        assert!(should_remind(-1)); // due tomorrow
        assert!(should_remind(0)); // due today
        assert!(should_remind(1)); // first day overdue
        assert!(should_remind(7));
        assert!(should_remind(14));

        assert!(!should_remind(-2));
        assert!(!should_remind(2));
        assert!(!should_remind(6));
        assert!(!should_remind(8));
    }

    #[test]
    fn test_due_offset_days_truncates_to_midnight() {
        let now = Utc::now();
        assert_eq!(due_offset_days(now, now), 0);
        assert_eq!(due_offset_days(now, now + chrono::Duration::days(1)), -1);
        assert_eq!(due_offset_days(now, now - chrono::Duration::days(7)), 7);
    }
}
