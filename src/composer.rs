//! Parameterized SQL composition.
//!
//! Turns a [`ReportRequest`] into two Postgres statements: the paged data
//! query and the matching count query, both wrapping the dataset's base
//! query as `(<base>) t`. Every user-supplied value becomes a `$n`
//! parameter; identifiers only reach the SQL text after passing the
//! dataset's column whitelist (or, for aliases, an identifier shape check).

use crate::dataset::Dataset;
use crate::error::{ReportError, ReportResult};
use crate::report::{FilterClause, FilterOp, ReportRequest};

/// Largest page a single request may ask for.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Dynamic value type for query bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Convert a JSON scalar into a bindable value. Arrays and objects are
    /// rejected; they are only meaningful to `in`/`between`, which unpack
    /// them before reaching here.
    fn from_scalar(value: &serde_json::Value, op: FilterOp) -> ReportResult<Self> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(ReportError::invalid_value(
                        op.as_str(),
                        format!("number out of range: {n}"),
                    ))
                }
            }
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(ReportError::invalid_value(
                op.as_str(),
                format!("expected a scalar, got {other}"),
            )),
        }
    }
}

/// A SQL statement plus its bound parameters, in `$1..$N` order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<ParamValue>,
}

/// The pair of statements a report request compiles to.
#[derive(Debug, Clone)]
pub struct ComposedReport {
    pub data: SqlStatement,
    pub count: SqlStatement,
}

/// Context for parameterized query building. Placeholders are 1-based
/// (`$1`, `$2`, ...) and values are collected in emission order.
#[derive(Debug, Default)]
struct ParamContext {
    index: usize,
    params: Vec<ParamValue>,
}

impl ParamContext {
    fn push(&mut self, value: ParamValue) -> String {
        self.index += 1;
        self.params.push(value);
        format!("${}", self.index)
    }
}

/// Compose the data and count statements for a report request.
pub fn compose(req: &ReportRequest) -> ReportResult<ComposedReport> {
    validate_request(req)?;

    let base = req.dataset.base_sql();
    let mut ctx = ParamContext::default();

    let mut sql = format!("SELECT {} FROM ({}) t", select_list(req)?, base);

    if !req.filters.is_empty() {
        let mut clauses = Vec::with_capacity(req.filters.len());
        for filter in &req.filters {
            clauses.push(filter_to_sql(req.dataset, filter, &mut ctx)?);
        }
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    if !req.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&req.group_by.join(", "));
    }

    if let Some(ref sort_by) = req.sort_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(sort_by);
        sql.push(' ');
        sql.push_str(req.sort_direction.sql_keyword());
    }

    let limit = ctx.push(ParamValue::Int(i64::from(req.page_size)));
    let offset = ctx.push(ParamValue::Int(
        i64::from(req.page - 1) * i64::from(req.page_size),
    ));
    sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));

    let count = SqlStatement {
        sql: format!("SELECT COUNT(*) FROM ({base}) t"),
        params: Vec::new(),
    };

    Ok(ComposedReport {
        data: SqlStatement {
            sql,
            params: ctx.params,
        },
        count,
    })
}

/// Check every identifier and structural rule before any SQL is assembled.
fn validate_request(req: &ReportRequest) -> ReportResult<()> {
    let dataset = req.dataset;

    if req.page < 1 {
        return Err(ReportError::InvalidRequest("page must be at least 1".into()));
    }
    if req.page_size < 1 || req.page_size > MAX_PAGE_SIZE {
        return Err(ReportError::InvalidRequest(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    for column in &req.columns {
        check_column(dataset, column)?;
    }
    for filter in &req.filters {
        check_column(dataset, &filter.field)?;
    }
    for column in &req.group_by {
        check_column(dataset, column)?;
    }

    if !req.group_by.is_empty() && req.aggregations.is_empty() {
        return Err(ReportError::InvalidRequest(
            "group_by requires at least one aggregation".into(),
        ));
    }

    let mut aliases: Vec<&str> = Vec::with_capacity(req.aggregations.len());
    for agg in &req.aggregations {
        check_column(dataset, &agg.field)?;
        if !is_identifier(&agg.alias) {
            return Err(ReportError::InvalidAlias(agg.alias.clone()));
        }
        if aliases.contains(&agg.alias.as_str()) {
            return Err(ReportError::InvalidRequest(format!(
                "duplicate aggregation alias: '{}'",
                agg.alias
            )));
        }
        aliases.push(&agg.alias);
    }

    if let Some(ref sort_by) = req.sort_by {
        let sortable = if req.aggregations.is_empty() {
            dataset.has_column(sort_by)
        } else {
            // Grouped output only exposes group keys and aggregate aliases.
            req.group_by.iter().any(|c| c == sort_by) || aliases.contains(&sort_by.as_str())
        };
        if !sortable {
            return Err(ReportError::invalid_column(dataset.name(), sort_by));
        }
    }

    Ok(())
}

fn check_column(dataset: Dataset, name: &str) -> ReportResult<()> {
    if dataset.has_column(name) {
        Ok(())
    } else {
        Err(ReportError::invalid_column(dataset.name(), name))
    }
}

/// Plain SQL identifier shape: letters, digits, underscore, no leading digit.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Build the select list. Aggregations take over the output shape: the
/// select list becomes the group keys plus the aggregate expressions, or
/// the aggregates alone for a whole-dataset rollup.
fn select_list(req: &ReportRequest) -> ReportResult<String> {
    if !req.aggregations.is_empty() {
        let mut parts: Vec<String> = req.group_by.clone();
        for agg in &req.aggregations {
            parts.push(format!(
                "{}({}) AS {}",
                agg.function.sql_name(),
                agg.field,
                agg.alias
            ));
        }
        return Ok(parts.join(", "));
    }

    if req.columns.is_empty() {
        Ok("*".to_string())
    } else {
        Ok(req.columns.join(", "))
    }
}

/// Convert one filter clause to a SQL predicate, binding its values.
fn filter_to_sql(
    dataset: Dataset,
    filter: &FilterClause,
    ctx: &mut ParamContext,
) -> ReportResult<String> {
    debug_assert!(dataset.has_column(&filter.field));
    let field = filter.field.as_str();
    let op = filter.operator;

    match op {
        FilterOp::Eq | FilterOp::Ne | FilterOp::Gt | FilterOp::Lt | FilterOp::Gte | FilterOp::Lte => {
            let placeholder = ctx.push(ParamValue::from_scalar(&filter.value, op)?);
            Ok(format!("{} {} {}", field, op.as_str(), placeholder))
        }
        FilterOp::Contains => {
            let needle = match &filter.value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ReportError::invalid_value(
                        op.as_str(),
                        format!("expected a scalar, got {other}"),
                    ))
                }
            };
            let placeholder = ctx.push(ParamValue::Text(format!("%{needle}%")));
            Ok(format!("{field} ILIKE {placeholder}"))
        }
        FilterOp::In => {
            let values = expect_array(&filter.value, op)?;
            if values.is_empty() {
                return Err(ReportError::invalid_value(
                    op.as_str(),
                    "expected a non-empty array",
                ));
            }
            let mut placeholders = Vec::with_capacity(values.len());
            for value in values {
                placeholders.push(ctx.push(ParamValue::from_scalar(value, op)?));
            }
            Ok(format!("{} IN ({})", field, placeholders.join(", ")))
        }
        FilterOp::Between => {
            let values = expect_array(&filter.value, op)?;
            if values.len() != 2 {
                return Err(ReportError::invalid_value(
                    op.as_str(),
                    format!("expected exactly 2 values, got {}", values.len()),
                ));
            }
            let low = ctx.push(ParamValue::from_scalar(&values[0], op)?);
            let high = ctx.push(ParamValue::from_scalar(&values[1], op)?);
            Ok(format!("{field} BETWEEN {low} AND {high}"))
        }
    }
}

fn expect_array(value: &serde_json::Value, op: FilterOp) -> ReportResult<&Vec<serde_json::Value>> {
    match value {
        serde_json::Value::Array(values) => Ok(values),
        other => Err(ReportError::invalid_value(
            op.as_str(),
            format!("expected an array, got {other}"),
        )),
    }
}
