//! Transaction primitives.
//!
//! A `TransactionRecord` is one line of the ledger. On the store side it is a
//! row of four text cells laid out as [`HEADER`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{Amount, LedgerError, ResultLedger};

/// Header row of the ledger sheet.
pub const HEADER: [&str; 4] = ["date", "kind", "amount", "description"];

/// Format of the `date` cell.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A raw store row, cells in [`HEADER`] order.
pub type Row = Vec<String>;

/// Returns the header as a [`Row`].
#[must_use]
pub fn header_row() -> Row {
    HEADER.iter().map(ToString::to_string).collect()
}

/// Returns `true` when `row` is the header row (case-insensitive). Sheets
/// created by earlier versions label the kind column `type`.
#[must_use]
pub fn is_header(row: &[String]) -> bool {
    let [date, kind, amount, description, ..] = row else {
        return false;
    };
    let is = |cell: &String, name: &str| cell.trim().eq_ignore_ascii_case(name);
    is(date, HEADER[0])
        && (is(kind, HEADER[1]) || is(kind, "type"))
        && is(amount, HEADER[2])
        && is(description, HEADER[3])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::MalformedRow(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    pub timestamp: NaiveDateTime,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub description: String,
}

impl TransactionRecord {
    /// Builds a record, rejecting negative amounts and blank descriptions.
    pub fn new(
        timestamp: NaiveDateTime,
        kind: TransactionKind,
        amount: Amount,
        description: impl Into<String>,
    ) -> ResultLedger<Self> {
        if amount.is_negative() {
            return Err(LedgerError::InvalidAmount(
                "amount must be >= 0".to_string(),
            ));
        }
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(LedgerError::MissingDescription);
        }
        Ok(Self {
            timestamp,
            kind,
            amount,
            description,
        })
    }

    /// Calendar date used by report windows.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    #[must_use]
    pub fn to_row(&self) -> Row {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.kind.as_str().to_string(),
            self.amount.to_string(),
            self.description.clone(),
        ]
    }
}

impl TryFrom<&[String]> for TransactionRecord {
    type Error = LedgerError;

    fn try_from(row: &[String]) -> Result<Self, Self::Error> {
        let [date, kind, amount, description, ..] = row else {
            return Err(LedgerError::MalformedRow(format!(
                "expected {} cells, got {}",
                HEADER.len(),
                row.len()
            )));
        };

        let timestamp = parse_timestamp(date)?;
        let kind = TransactionKind::try_from(kind.as_str())?;
        let amount: Amount = amount
            .parse()
            .map_err(|err: LedgerError| LedgerError::MalformedRow(err.to_string()))?;

        Self::new(timestamp, kind, amount, description.as_str())
            .map_err(|err| LedgerError::MalformedRow(err.to_string()))
    }
}

/// Accepts the canonical `date` cell plus the looser shapes a hand-edited
/// sheet tends to contain (ISO `T` separator, bare dates).
fn parse_timestamp(cell: &str) -> ResultLedger<NaiveDateTime> {
    let cell = cell.trim();
    NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(cell, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(cell, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|_| LedgerError::MalformedRow(format!("invalid date: \"{cell}\"")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_a_canonical_row() {
        let cells = row(&["2024-06-01 10:00:00", "income", "5000000", "gaji"]);
        let record = TransactionRecord::try_from(cells.as_slice()).unwrap();
        assert_eq!(record.kind, TransactionKind::Income);
        assert_eq!(record.amount, Amount::from_units(5_000_000));
        assert_eq!(record.description, "gaji");
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn kind_is_case_insensitive() {
        let cells = row(&["2024-06-01", "Expense", "50000", "makan"]);
        let record = TransactionRecord::try_from(cells.as_slice()).unwrap();
        assert_eq!(record.kind, TransactionKind::Expense);
    }

    #[test]
    fn rejects_malformed_rows() {
        let cases = [
            row(&["2024-06-01 10:00:00", "income", "5000000"]),
            row(&["yesterday", "income", "1", "x"]),
            row(&["2024-06-01 10:00:00", "transfer", "1", "x"]),
            row(&["2024-06-01 10:00:00", "income", "lots", "x"]),
            row(&["2024-06-01 10:00:00", "income", "-5", "x"]),
            row(&["2024-06-01 10:00:00", "income", "5", "  "]),
        ];
        for case in cases {
            let err = TransactionRecord::try_from(case.as_slice()).unwrap_err();
            assert!(matches!(err, LedgerError::MalformedRow(_)), "{case:?}");
        }
    }

    #[test]
    fn row_round_trips_through_the_store_layout() {
        let timestamp =
            NaiveDateTime::parse_from_str("2024-06-01 12:00:00", TIMESTAMP_FORMAT).unwrap();
        let record = TransactionRecord::new(
            timestamp,
            TransactionKind::Expense,
            Amount::from_units(50_000),
            " makan siang ",
        )
        .unwrap();
        assert_eq!(
            record.to_row(),
            row(&["2024-06-01 12:00:00", "expense", "50000", "makan siang"])
        );
    }

    #[test]
    fn header_detection_ignores_case() {
        assert!(is_header(&header_row()));
        assert!(is_header(&row(&["Date", "Type", "Amount", "Description"])));
        assert!(is_header(&row(&["DATE", "KIND", "AMOUNT", "DESCRIPTION"])));
        assert!(!is_header(&row(&["2024-06-01", "income", "1", "x"])));
    }
}
