//! Error types for sip_tracker
//!
//! This module defines domain-specific error types that provide clear,
//! actionable error messages to users. The aggregator itself never fails;
//! errors only exist at the input and storage boundaries.

use thiserror::Error;

/// Validation errors for a new entry submitted through the CLI or the TUI.
///
/// These errors are shown directly to users and should be clear and actionable.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Fund name is required")]
    FundNameRequired,

    #[error("Invested amount is required")]
    InvestedRequired,

    #[error("Current value is required")]
    CurrentRequired,

    #[error("Year is required")]
    YearRequired,

    #[error("Month is required")]
    MonthRequired,

    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    #[error("Amount cannot be negative, got {0}")]
    NegativeAmount(f64),

    #[error("Invalid year: {0}")]
    InvalidYear(String),

    #[error("Unknown month: '{0}' (expected Jan..Dec)")]
    InvalidMonth(String),
}

/// Failures of the entry store. Reported to the user; the dashboard then
/// falls back to an empty entry set.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed entry data in {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Outcome of a rejected add-entry request.
#[derive(Debug, Error)]
pub enum AddEntryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
