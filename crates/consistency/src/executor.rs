//! Query execution capability consumed by the checks.

use crate::error::CheckError;
use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// A scalar cell of a query result.
///
/// MySQL returns DECIMAL (and sometimes integer) columns as byte strings
/// on the text protocol, so `Text` is a first-class numeric encoding here,
/// not a fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    UInt(u64),
    Double(f64),
    Text(String),
}

impl SqlValue {
    /// Decode the cell as an exact decimal.
    ///
    /// Monetary aggregates must compare exactly against zero, so integers
    /// and decimal text convert losslessly; a double that cannot be
    /// represented exactly yields `None` rather than a rounded value.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            SqlValue::Null => None,
            SqlValue::Int(i) => Some(Decimal::from(*i)),
            SqlValue::UInt(u) => Some(Decimal::from(*u)),
            SqlValue::Double(d) => Decimal::from_f64(*d),
            SqlValue::Text(s) => Decimal::from_str(s.trim()).ok(),
        }
    }
}

/// Executes one parameterized aggregate query against the data store.
///
/// Implementations own connection acquisition and release; rows come back
/// fully materialized, in declared column order. The warehouse id is the
/// only bind parameter the checks use, possibly repeated for correlated
/// subqueries.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn query(
        &self,
        sql: &str,
        params: &[u32],
    ) -> Result<Vec<Vec<SqlValue>>, CheckError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_decodes_exactly() {
        assert_eq!(SqlValue::Int(-3).to_decimal(), Some(Decimal::from(-3)));
        assert_eq!(SqlValue::UInt(2100).to_decimal(), Some(Decimal::from(2100)));
    }

    #[test]
    fn test_decimal_text_decodes_losslessly() {
        let v = SqlValue::Text("12345.67".to_string());
        assert_eq!(v.to_decimal(), Some(Decimal::from_str("12345.67").unwrap()));

        // MySQL pads some aggregates with whitespace on the text protocol
        let v = SqlValue::Text(" -0.01 ".to_string());
        assert_eq!(v.to_decimal(), Some(Decimal::from_str("-0.01").unwrap()));
    }

    #[test]
    fn test_null_and_garbage_do_not_decode() {
        assert_eq!(SqlValue::Null.to_decimal(), None);
        assert_eq!(SqlValue::Text("not a number".to_string()).to_decimal(), None);
    }

    #[test]
    fn test_zero_scale_variants_compare_equal() {
        let a = SqlValue::Text("0.00".to_string()).to_decimal().unwrap();
        let b = SqlValue::Int(0).to_decimal().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Decimal::ZERO);
    }
}
