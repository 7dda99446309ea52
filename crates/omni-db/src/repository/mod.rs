//! # Repository Layer
//!
//! One repository per table family. Repositories cover single-row reads and
//! CRUD; every mutation that spans more than one table belongs to the
//! [`crate::engine`]. Writes on syncable tables publish a change event
//! after the statement commits.

pub mod category;
pub mod contact;
pub mod invoice;
pub mod ledger;
pub mod notification;
pub mod product;
pub mod settings;
pub mod stock_movement;
