//! Append-only income/expense ledger.
//!
//! [`Ledger`] sits on top of a [`LedgerStore`]: it stamps and validates new
//! records on the way in and turns raw rows into a [`ReportSummary`] on the
//! way out.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::LedgerError;
pub use money::Amount;
pub use report::{DateWindow, ReportSummary};
pub use store::{CsvStore, LedgerStore, MemoryStore, SqliteStore};
pub use transactions::{
    HEADER, Row, TIMESTAMP_FORMAT, TransactionKind, TransactionRecord, header_row, is_header,
};

mod clock;
mod error;
mod money;
mod report;
mod store;
mod transactions;

pub type ResultLedger<T> = Result<T, LedgerError>;

/// Time zone used when nothing is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Jakarta;

#[derive(Debug)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// Makes sure the backing table and its header exist.
    pub async fn ensure_schema(&self) -> ResultLedger<()> {
        self.store.ensure_schema().await
    }

    /// Current local date-time in the ledger time zone.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now().with_timezone(&self.timezone).naive_local()
    }

    /// Current local calendar date, the default report window.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The clock records are stamped with. Chat sessions share it.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Records a new transaction stamped with the current local time.
    ///
    /// Store failures are returned as-is; nothing is retried here.
    pub async fn append(
        &self,
        kind: TransactionKind,
        amount: Amount,
        description: &str,
    ) -> ResultLedger<TransactionRecord> {
        let record = TransactionRecord::new(self.now(), kind, amount, description)?;
        self.store.append_row(record.to_row()).await?;

        tracing::info!(
            "recorded {} of {} ({})",
            record.kind.as_str(),
            record.amount,
            record.description
        );
        Ok(record)
    }

    /// Summarises the ledger over `window`, or over today when `None`.
    pub async fn query(&self, window: Option<DateWindow>) -> ResultLedger<ReportSummary> {
        let window = window.unwrap_or_else(|| DateWindow::day(self.today()));
        let rows = self.store.read_all_rows().await?;
        let summary = ReportSummary::from_rows(&rows, window)?;

        tracing::debug!(
            "report {}..={}: {} of {} rows matched, {} skipped",
            window.start(),
            window.end(),
            summary.records.len(),
            rows.len(),
            summary.skipped
        );
        Ok(summary)
    }
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    store: Option<Arc<dyn LedgerStore>>,
    timezone: Option<Tz>,
    clock: Option<Arc<dyn Clock>>,
}

impl LedgerBuilder {
    /// Pass the required store
    pub fn store(mut self, store: Arc<dyn LedgerStore>) -> LedgerBuilder {
        self.store = Some(store);
        self
    }

    /// Time zone used to stamp records and to decide what "today" is.
    pub fn timezone(mut self, timezone: Tz) -> LedgerBuilder {
        self.timezone = Some(timezone);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> LedgerBuilder {
        self.clock = Some(clock);
        self
    }

    /// Construct `Ledger`
    pub fn build(self) -> ResultLedger<Ledger> {
        let store = self.store.ok_or_else(|| {
            LedgerError::StoreUnavailable("no ledger store configured".to_string())
        })?;
        Ok(Ledger {
            store,
            timezone: self.timezone.unwrap_or(DEFAULT_TIMEZONE),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        })
    }
}
