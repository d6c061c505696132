//! Error types for the consistency sweep.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during a consistency sweep.
///
/// Every variant aborts the worker's sweep; there is no retry and no
/// partial-success mode. `Violation` is the primary diagnostic output,
/// `Cancelled` lets callers distinguish "run was stopped" from "data is
/// corrupt".
#[derive(Error, Debug)]
pub enum CheckError {
    /// Query execution failed (connectivity, syntax, schema mismatch).
    #[error("query execution failed: {sql}: {source}")]
    Execution {
        sql: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A result cell could not be decoded into the expected scalar.
    #[error("failed to scan result of {sql}: {detail}")]
    Scan { sql: String, detail: String },

    /// A check's predicate failed.
    #[error(
        "consistency check {check} ({name}) failed for warehouse {warehouse}: \
         expected 0, got {observed}"
    )]
    Violation {
        check: u8,
        name: &'static str,
        warehouse: u32,
        observed: Decimal,
    },

    /// The caller's cancellation signal fired mid-sweep.
    #[error("consistency sweep cancelled")]
    Cancelled,
}

impl CheckError {
    pub fn execution(
        sql: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CheckError::Execution {
            sql: sql.to_string(),
            source: Box::new(source),
        }
    }

    pub fn scan(sql: &str, detail: impl Into<String>) -> Self {
        CheckError::Scan {
            sql: sql.to_string(),
            detail: detail.into(),
        }
    }
}
