//! # Contact Repositories
//!
//! Database operations for customers and suppliers. Debt and loyalty-point
//! balances are only ever mutated by the transaction engine (checkout,
//! settlement); the repositories here cover directory-style CRUD.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeBus, ChangeEvent, ChangeOp, SyncTable};
use omni_core::validation::validate_name;
use omni_core::{Customer, Supplier};

const CUSTOMER_COLUMNS: &str =
    "id, name, phone, address, debt, points, barcode, next_payment_date, notes, created_at";
const SUPPLIER_COLUMNS: &str =
    "id, name, phone, address, note, debt, next_payment_date, created_at";

// =============================================================================
// Customers
// =============================================================================

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        CustomerRepository { pool, bus }
    }

    /// Lists all customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Customers with an outstanding debt and an agreed payment date,
    /// for the due-date watcher.
    pub async fn list_debtors_with_due_date(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE debt > 0 AND next_payment_date IS NOT NULL"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Inserts a new customer and returns it with the assigned id.
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        validate_name("name", &customer.name).map_err(omni_core::CoreError::from)?;

        debug!(name = %customer.name, "Inserting customer");

        let result = sqlx::query(
            r#"
            INSERT INTO customers (name, phone, address, debt, points, barcode, next_payment_date, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.debt)
        .bind(customer.points)
        .bind(&customer.barcode)
        .bind(customer.next_payment_date)
        .bind(&customer.notes)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        let mut created = customer.clone();
        created.id = result.last_insert_rowid();

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Create,
            table: SyncTable::Customers,
            pk: created.id,
            payload: Some(serde_json::to_value(&created)?),
        });

        Ok(created)
    }

    /// Updates a customer's directory fields. Debt and points are owned by
    /// the engine and left untouched here.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        validate_name("name", &customer.name).map_err(omni_core::CoreError::from)?;

        debug!(id = customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?, phone = ?, address = ?, barcode = ?,
                next_payment_date = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.barcode)
        .bind(customer.next_payment_date)
        .bind(&customer.notes)
        .bind(customer.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer.id));
        }

        let committed = self
            .get_by_id(customer.id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", customer.id))?;

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Update,
            table: SyncTable::Customers,
            pk: customer.id,
            payload: Some(serde_json::to_value(&committed)?),
        });

        Ok(())
    }

    /// Deletes a customer.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Delete,
            table: SyncTable::Customers,
            pk: id,
            payload: None,
        });

        Ok(())
    }
}

// =============================================================================
// Suppliers
// =============================================================================

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        SupplierRepository { pool, bus }
    }

    /// Lists all suppliers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Gets a supplier by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Suppliers the store owes, with an agreed payment date.
    pub async fn list_debtors_with_due_date(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE debt > 0 AND next_payment_date IS NOT NULL"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Inserts a new supplier and returns it with the assigned id.
    pub async fn insert(&self, supplier: &Supplier) -> DbResult<Supplier> {
        validate_name("name", &supplier.name).map_err(omni_core::CoreError::from)?;

        debug!(name = %supplier.name, "Inserting supplier");

        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (name, phone, address, note, debt, next_payment_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.note)
        .bind(supplier.debt)
        .bind(supplier.next_payment_date)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        let mut created = supplier.clone();
        created.id = result.last_insert_rowid();

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Create,
            table: SyncTable::Suppliers,
            pk: created.id,
            payload: Some(serde_json::to_value(&created)?),
        });

        Ok(created)
    }

    /// Updates a supplier's directory fields.
    pub async fn update(&self, supplier: &Supplier) -> DbResult<()> {
        validate_name("name", &supplier.name).map_err(omni_core::CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?, phone = ?, address = ?, note = ?, next_payment_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.note)
        .bind(supplier.next_payment_date)
        .bind(supplier.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", supplier.id));
        }

        let committed = self
            .get_by_id(supplier.id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", supplier.id))?;

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Update,
            table: SyncTable::Suppliers,
            pk: supplier.id,
            payload: Some(serde_json::to_value(&committed)?),
        });

        Ok(())
    }

    /// Deletes a supplier.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Delete,
            table: SyncTable::Suppliers,
            pk: id,
            payload: None,
        });

        Ok(())
    }
}

// =============================================================================
// Executor-level helpers (shared with the transaction engine)
// =============================================================================

pub(crate) async fn get_customer_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    id: i64,
) -> DbResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(customer)
}

pub(crate) async fn get_supplier_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    id: i64,
) -> DbResult<Option<Supplier>> {
    let supplier = sqlx::query_as::<_, Supplier>(&format!(
        "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(supplier)
}

/// Writes a customer's balance fields (debt/points) inside a caller-owned
/// transaction.
pub(crate) async fn set_customer_balances_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    id: i64,
    debt: i64,
    points: i64,
    next_payment_date: Option<chrono::DateTime<chrono::Utc>>,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE customers SET debt = ?, points = ?, next_payment_date = ? WHERE id = ?",
    )
    .bind(debt)
    .bind(points)
    .bind(next_payment_date)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Writes a supplier's balance fields inside a caller-owned transaction.
pub(crate) async fn set_supplier_balance_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    id: i64,
    debt: i64,
    next_payment_date: Option<chrono::DateTime<chrono::Utc>>,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE suppliers SET debt = ?, next_payment_date = ? WHERE id = ?")
        .bind(debt)
        .bind(next_payment_date)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}
