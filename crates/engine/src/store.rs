//! Ledger storage.
//!
//! The ledger only needs three things from its backend: make sure the table
//! exists, append a row, and read every row back in storage order. Rows are
//! plain text cells (see [`Row`]); parsing happens in the engine so a backend
//! never rejects a row for its content.

use std::fmt;

use async_trait::async_trait;

use crate::{ResultLedger, Row};

mod memory;
mod sheet;
mod sqlite;

pub use memory::MemoryStore;
pub use sheet::CsvStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait LedgerStore: Send + Sync + fmt::Debug {
    /// Creates the table and its header row if missing. Calling it again is a
    /// no-op.
    async fn ensure_schema(&self) -> ResultLedger<()>;

    /// Appends `row` after every existing row.
    async fn append_row(&self, row: Row) -> ResultLedger<()>;

    /// Every row, header included, in storage order.
    async fn read_all_rows(&self) -> ResultLedger<Vec<Row>>;
}
