//! The module contains the errors the ledger can throw.
//!
//! Validation errors ([`InvalidAmount`], [`MissingDescription`]) come from
//! the write path, [`MalformedRow`] and [`TotalOverflow`] from reading stored
//! rows, and the two store errors are propagated as-is from the
//! [`LedgerStore`] backends.
//!
//!  [`InvalidAmount`]: LedgerError::InvalidAmount
//!  [`MissingDescription`]: LedgerError::MissingDescription
//!  [`MalformedRow`]: LedgerError::MalformedRow
//!  [`TotalOverflow`]: LedgerError::TotalOverflow
//!  [`LedgerStore`]: crate::LedgerStore
use std::io;

use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Missing description")]
    MissingDescription,
    #[error("Malformed row: {0}")]
    MalformedRow(String),
    #[error("Report total out of range: {0}")]
    TotalOverflow(String),
    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Ledger store error: {0}")]
    StoreError(String),
}

impl LedgerError {
    /// Returns `true` for failures raised by the backing store.
    #[must_use]
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::StoreError(_))
    }
}

impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::StoreUnavailable(err.to_string()),
            other => Self::StoreError(other.to_string()),
        }
    }
}

impl From<io::Error> for LedgerError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::TimedOut => Self::StoreUnavailable(err.to_string()),
            _ => Self::StoreError(err.to_string()),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return Self::StoreError(err.to_string());
        }
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => Self::from(io_err),
            other => Self::StoreError(format!("{other:?}")),
        }
    }
}
