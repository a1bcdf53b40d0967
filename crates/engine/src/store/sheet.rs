//! Ledger kept in a local CSV sheet.
//!
//! The file mirrors a spreadsheet tab: a header row followed by one row per
//! transaction. Writes append to the end of the file, so storage order is
//! file order. File access runs on the blocking pool.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{LedgerError, LedgerStore, ResultLedger, Row, transactions};

#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    // Serializes writers within this process.
    lock: Mutex<()>,
}

impl CsvStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `work` on the sheet path off the async workers, holding the
    /// store lock until it finishes.
    async fn with_sheet<T, F>(&self, work: F) -> ResultLedger<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> ResultLedger<T> + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || work(&path))
            .await
            .map_err(|err| LedgerError::StoreError(format!("sheet task failed: {err}")))?
    }
}

#[async_trait]
impl LedgerStore for CsvStore {
    async fn ensure_schema(&self) -> ResultLedger<()> {
        self.with_sheet(create_sheet).await
    }

    async fn append_row(&self, row: Row) -> ResultLedger<()> {
        self.with_sheet(move |path| append_to_sheet(path, &row)).await
    }

    async fn read_all_rows(&self) -> ResultLedger<Vec<Row>> {
        self.with_sheet(read_sheet).await
    }
}

fn create_sheet(path: &Path) -> ResultLedger<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let has_content = fs::metadata(path)
        .map(|meta| meta.len() > 0)
        .unwrap_or(false);
    if has_content {
        return Ok(());
    }

    tracing::info!("creating ledger sheet at {}", path.display());
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(transactions::HEADER)?;
    writer.flush()?;
    Ok(())
}

fn append_to_sheet(path: &Path, row: &Row) -> ResultLedger<()> {
    // No `create`: a missing sheet means the schema was never set up.
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|err| LedgerError::StoreUnavailable(format!("{}: {err}", path.display())))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}

fn read_sheet(path: &Path) -> ResultLedger<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(ToString::to_string).collect());
    }
    Ok(rows)
}
