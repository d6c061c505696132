//! MySQL-backed query execution.
//!
//! Wraps a `mysql_async` connection pool behind the core crate's
//! [`QueryExecutor`] capability. Connections are acquired per query and
//! returned to the pool on drop; the checks never hold cross-query
//! transactions open.

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Params, Pool, Row, Value};
use tpcc_consistency::{CheckError, QueryExecutor, SqlValue};

/// Query executor backed by a MySQL connection pool.
pub struct MySqlExecutor {
    pool: Pool,
}

impl MySqlExecutor {
    /// Create an executor with a new connection pool.
    pub fn connect(connection_string: &str) -> anyhow::Result<Self> {
        let pool = Pool::from_url(connection_string)?;
        Ok(MySqlExecutor { pool })
    }

    /// Close all pooled connections.
    pub async fn disconnect(&self) -> anyhow::Result<()> {
        self.pool.clone().disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl QueryExecutor for MySqlExecutor {
    async fn query(&self, sql: &str, params: &[u32]) -> Result<Vec<Vec<SqlValue>>, CheckError> {
        let mut conn = self
            .pool
            .get_conn()
            .await
            .map_err(|e| CheckError::execution(sql, e))?;

        let bound: Vec<Value> = params.iter().map(|&w| Value::Int(i64::from(w))).collect();
        let rows: Vec<Row> = conn
            .exec(sql, Params::Positional(bound))
            .await
            .map_err(|e| CheckError::execution(sql, e))?;

        rows.iter().map(|row| convert_row(sql, row)).collect()
    }
}

fn convert_row(sql: &str, row: &Row) -> Result<Vec<SqlValue>, CheckError> {
    (0..row.len())
        .map(|index| {
            let value = row
                .as_ref(index)
                .ok_or_else(|| CheckError::scan(sql, format!("missing value at column {index}")))?;
            convert_value(sql, value)
        })
        .collect()
}

/// Convert a wire value to a result scalar.
///
/// DECIMAL columns (and every numeric column on the text protocol) arrive
/// as byte strings; they stay textual here and are parsed into exact
/// decimals by the checks.
fn convert_value(sql: &str, value: &Value) -> Result<SqlValue, CheckError> {
    match value {
        Value::NULL => Ok(SqlValue::Null),
        Value::Int(i) => Ok(SqlValue::Int(*i)),
        Value::UInt(u) => Ok(SqlValue::UInt(*u)),
        Value::Float(f) => Ok(SqlValue::Double(f64::from(*f))),
        Value::Double(d) => Ok(SqlValue::Double(*d)),
        Value::Bytes(bytes) => Ok(SqlValue::Text(String::from_utf8_lossy(bytes).to_string())),
        Value::Date(..) | Value::Time(..) => Err(CheckError::scan(
            sql,
            "temporal value where a numeric aggregate was expected",
        )),
    }
}
