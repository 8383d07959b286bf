//! Database execution engine.
//!
//! Runs composed report statements against PostgreSQL using sqlx, binding
//! dynamic parameter values and mapping rows to JSON objects by column
//! type.

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, PgPool, Row, TypeInfo};

use crate::composer::{compose, ParamValue, SqlStatement};
use crate::error::{ReportError, ReportResult};
use crate::report::{ReportRequest, ReportResponse};

/// Default connection pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// A Postgres connection pool that runs report requests.
#[derive(Clone)]
pub struct ReportDb {
    pool: PgPool,
}

impl ReportDb {
    /// Connect to Postgres using a connection URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = ReportDb::connect("postgres://localhost/fleet_ops", 5).await?;
    /// ```
    pub async fn connect(url: &str, max_connections: u32) -> ReportResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| ReportError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Compose and execute a report request, returning one page of rows
    /// plus the dataset's total row count.
    pub async fn run(&self, req: &ReportRequest) -> ReportResult<ReportResponse> {
        let composed = compose(req)?;

        let total_rows: i64 = sqlx::query_scalar(&composed.count.sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ReportError::Execution(e.to_string()))?;

        let rows = self.fetch_all(&composed.data).await?;

        // Column names come from the result set itself so derived and
        // aliased columns are reported the way Postgres returned them.
        let columns = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => req.columns.clone(),
        };

        let json_rows: Vec<serde_json::Value> = rows.iter().map(row_to_json).collect();

        Ok(ReportResponse {
            columns,
            rows: json_rows,
            total_rows,
            page: req.page,
            page_size: req.page_size,
        })
    }

    async fn fetch_all(&self, statement: &SqlStatement) -> ReportResult<Vec<PgRow>> {
        let mut query = sqlx::query(&statement.sql);

        for param in &statement.params {
            query = match param {
                ParamValue::Null => query.bind(None::<String>),
                ParamValue::Bool(v) => query.bind(*v),
                ParamValue::Int(v) => query.bind(*v),
                ParamValue::Float(v) => query.bind(*v),
                ParamValue::Text(v) => query.bind(v.clone()),
            };
        }

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ReportError::Execution(e.to_string()))
    }
}

/// Convert a PgRow to a JSON object, decoding by Postgres type name.
/// NULLs and undecodable values become JSON null.
pub fn row_to_json(row: &PgRow) -> serde_json::Value {
    let mut obj = serde_json::Map::new();

    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name().to_string();
        let type_name = column.type_info().name();

        let value: serde_json::Value = match type_name {
            "BOOL" => row
                .try_get::<Option<bool>, _>(i)
                .ok()
                .flatten()
                .map(serde_json::Value::Bool)
                .unwrap_or(serde_json::Value::Null),
            "INT2" => int_value(row.try_get::<Option<i16>, _>(i).ok().flatten().map(i64::from)),
            "INT4" => int_value(row.try_get::<Option<i32>, _>(i).ok().flatten().map(i64::from)),
            "INT8" => int_value(row.try_get::<Option<i64>, _>(i).ok().flatten()),
            "FLOAT4" => float_value(row.try_get::<Option<f32>, _>(i).ok().flatten().map(f64::from)),
            "FLOAT8" => float_value(row.try_get::<Option<f64>, _>(i).ok().flatten()),
            "NUMERIC" => row
                .try_get::<Option<rust_decimal::Decimal>, _>(i)
                .ok()
                .flatten()
                .map(decimal_value)
                .unwrap_or(serde_json::Value::Null),
            "TIMESTAMPTZ" => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(i)
                .ok()
                .flatten()
                .map(|t| serde_json::Value::String(t.to_rfc3339()))
                .unwrap_or(serde_json::Value::Null),
            "TIMESTAMP" => row
                .try_get::<Option<chrono::NaiveDateTime>, _>(i)
                .ok()
                .flatten()
                .map(|t| serde_json::Value::String(t.to_string()))
                .unwrap_or(serde_json::Value::Null),
            "DATE" => row
                .try_get::<Option<chrono::NaiveDate>, _>(i)
                .ok()
                .flatten()
                .map(|d| serde_json::Value::String(d.to_string()))
                .unwrap_or(serde_json::Value::Null),
            _ => row
                .try_get::<Option<String>, _>(i)
                .ok()
                .flatten()
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null),
        };

        obj.insert(name, value);
    }

    serde_json::Value::Object(obj)
}

fn int_value(v: Option<i64>) -> serde_json::Value {
    v.map(|n| serde_json::Value::Number(n.into()))
        .unwrap_or(serde_json::Value::Null)
}

fn float_value(v: Option<f64>) -> serde_json::Value {
    v.and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn decimal_value(d: rust_decimal::Decimal) -> serde_json::Value {
    use rust_decimal::prelude::ToPrimitive;
    d.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(d.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_json_helpers() {
        assert_eq!(int_value(Some(42)), json!(42));
        assert_eq!(int_value(None), serde_json::Value::Null);
        assert_eq!(float_value(Some(2.5)), json!(2.5));
        // NaN has no JSON representation.
        assert_eq!(float_value(Some(f64::NAN)), serde_json::Value::Null);
        assert_eq!(
            decimal_value(rust_decimal::Decimal::new(105, 1)),
            json!(10.5)
        );
    }
}
