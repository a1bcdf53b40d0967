//! Report aggregation.
//!
//! A report is a fold over the whole ledger: every row is parsed, filtered by
//! a [`DateWindow`] and summed by kind. Nothing is cached between reports.

use chrono::NaiveDate;

use crate::{Amount, LedgerError, ResultLedger, TransactionKind, TransactionRecord, transactions};

/// Inclusive range of calendar dates. `start <= end` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Returns `None` when `start` is after `end`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Window covering a single day.
    #[must_use]
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_income: Amount,
    pub total_expense: Amount,
    /// Matching records in storage order. Not truncated.
    pub records: Vec<TransactionRecord>,
    /// Rows that could not be parsed and were left out.
    pub skipped: usize,
}

impl ReportSummary {
    #[must_use]
    pub fn balance(&self) -> Amount {
        self.total_income - self.total_expense
    }

    /// Folds raw store rows into a summary.
    ///
    /// A leading header row is ignored. Malformed rows are counted in
    /// `skipped` and logged, never fatal. A total that no longer fits in an
    /// [`Amount`] fails the whole report.
    pub(crate) fn from_rows<'a, I>(rows: I, window: DateWindow) -> ResultLedger<Self>
    where
        I: IntoIterator<Item = &'a transactions::Row>,
    {
        let mut summary = ReportSummary::default();

        for (index, row) in rows.into_iter().enumerate() {
            if index == 0 && transactions::is_header(row) {
                continue;
            }

            let record = match TransactionRecord::try_from(row.as_slice()) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!("skipping ledger row {index}: {err}");
                    summary.skipped += 1;
                    continue;
                }
            };

            if !window.contains(record.date()) {
                continue;
            }

            let total = match record.kind {
                TransactionKind::Income => &mut summary.total_income,
                TransactionKind::Expense => &mut summary.total_expense,
            };
            *total = total.checked_add(record.amount).ok_or_else(|| {
                LedgerError::TotalOverflow(format!(
                    "{} total overflows at row {index}",
                    record.kind.as_str()
                ))
            })?;
            summary.records.push(record);
        }

        Ok(summary)
    }
}
