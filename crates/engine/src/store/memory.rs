use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{LedgerStore, ResultLedger, Row, transactions};

/// In-process ledger, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Row>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing rows, header included.
    #[must_use]
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn ensure_schema(&self) -> ResultLedger<()> {
        let mut rows = self.rows.lock().await;
        if !rows.first().is_some_and(|row| transactions::is_header(row)) {
            rows.insert(0, transactions::header_row());
        }
        Ok(())
    }

    async fn append_row(&self, row: Row) -> ResultLedger<()> {
        self.rows.lock().await.push(row);
        Ok(())
    }

    async fn read_all_rows(&self) -> ResultLedger<Vec<Row>> {
        Ok(self.rows.lock().await.clone())
    }
}
