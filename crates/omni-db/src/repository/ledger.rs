//! # Ledger Repository
//!
//! The financial ledger is append-only and is the canonical source for
//! every reporting aggregate: expenses and losses have no invoice, so
//! reports are computed here, never by re-scanning invoices.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use omni_core::{FinancialRecord, TransactionKind};

const LEDGER_COLUMNS: &str = "id, kind, date, amount, related_cost, description, note, \
     invoice_id, customer_id, supplier_id, product_id";

/// Repository for the append-only financial ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Most recent entries first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<FinancialRecord>> {
        let records = sqlx::query_as::<_, FinancialRecord>(&format!(
            "SELECT {LEDGER_COLUMNS} FROM financial_records ORDER BY date DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Entries of one kind, newest first.
    pub async fn list_by_kind(&self, kind: TransactionKind) -> DbResult<Vec<FinancialRecord>> {
        let records = sqlx::query_as::<_, FinancialRecord>(&format!(
            "SELECT {LEDGER_COLUMNS} FROM financial_records WHERE kind = ? ORDER BY date DESC, id DESC"
        ))
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Aggregates the ledger over a date range.
    pub async fn summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<LedgerSummary> {
        let rows: Vec<(TransactionKind, i64, i64)> = sqlx::query_as(
            r#"
            SELECT kind, COALESCE(SUM(amount), 0), COALESCE(SUM(related_cost), 0)
            FROM financial_records
            WHERE date >= ? AND date < ?
            GROUP BY kind
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut summary = LedgerSummary::default();
        for (kind, amount, related_cost) in rows {
            match kind {
                TransactionKind::Sale => {
                    summary.sales_total = amount;
                    summary.sales_cost = related_cost;
                }
                TransactionKind::Expense => summary.expenses_total = amount,
                TransactionKind::Loss => summary.losses_cost = related_cost,
                TransactionKind::Return => {
                    summary.returns_total = amount;
                    summary.returns_cost = related_cost;
                }
                TransactionKind::DebtIn => summary.debt_in_total = amount,
                TransactionKind::DebtOut => summary.debt_out_total = amount,
            }
        }

        Ok(summary)
    }
}

/// Ledger aggregates over a reporting period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub sales_total: i64,
    pub sales_cost: i64,
    pub expenses_total: i64,
    pub losses_cost: i64,
    pub returns_total: i64,
    pub returns_cost: i64,
    pub debt_in_total: i64,
    pub debt_out_total: i64,
}

impl LedgerSummary {
    /// Net profit: sale margin, minus returned margin, expenses, and the
    /// cost impact of losses.
    pub fn net_profit(&self) -> i64 {
        (self.sales_total - self.sales_cost) - (self.returns_total - self.returns_cost)
            - self.expenses_total
            - self.losses_cost
    }
}

// =============================================================================
// Executor-level helpers (shared with the transaction engine)
// =============================================================================

/// Appends a ledger entry and returns the assigned id.
pub(crate) async fn insert_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    record: &FinancialRecord,
) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO financial_records (
            kind, date, amount, related_cost, description, note,
            invoice_id, customer_id, supplier_id, product_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.kind)
    .bind(record.date)
    .bind(record.amount)
    .bind(record.related_cost)
    .bind(&record.description)
    .bind(&record.note)
    .bind(record.invoice_id)
    .bind(record.customer_id)
    .bind(record.supplier_id)
    .bind(record.product_id)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}
