//! Wire types for report requests, responses, and saved templates.
//!
//! These mirror the JSON bodies accepted by the HTTP endpoints. Everything
//! user-supplied deserializes into closed enums or free JSON values; the
//! composer decides what is allowed to reach SQL.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// A single predicate over one dataset column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: String,
    pub operator: FilterOp,
    /// Scalar for comparison operators, array for `in`/`between`.
    pub value: serde_json::Value,
}

/// Filter operators, spelled on the wire the way SQL spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "between")]
    Between,
}

impl FilterOp {
    /// The wire spelling, also used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Contains => "contains",
            Self::In => "in",
            Self::Between => "between",
        }
    }
}

/// Aggregate functions available to report specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFn {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

impl AggFn {
    /// SQL spelling of the function.
    pub fn sql_name(&self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Count => "COUNT",
        }
    }
}

/// A function/field/alias triple for GROUP BY reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregation {
    pub field: String,
    pub function: AggFn,
    pub alias: String,
}

/// Sort direction for `sort_by`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A declarative report request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub dataset: Dataset,
    /// Output columns; empty means every column the dataset yields.
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterClause>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

/// One page of report output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Value>,
    pub total_rows: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Access roles carried by saved templates. Declared data only; nothing in
/// the service enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRole {
    Operations,
    Compliance,
    Executive,
    ShipOfficer,
}

/// A named, reusable report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub config: ReportRequest,
    pub access_role: AccessRole,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_defaults() {
        let req: ReportRequest =
            serde_json::from_str(r#"{"dataset": "crew_compliance"}"#).unwrap();
        assert_eq!(req.dataset, Dataset::CrewCompliance);
        assert!(req.columns.is_empty());
        assert!(req.filters.is_empty());
        assert_eq!(req.sort_direction, SortDirection::Asc);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 50);
    }

    #[test]
    fn test_operator_wire_spelling() {
        let f: FilterClause = serde_json::from_str(
            r#"{"field": "risk_level", "operator": ">=", "value": 3}"#,
        )
        .unwrap();
        assert_eq!(f.operator, FilterOp::Gte);

        let f: FilterClause = serde_json::from_str(
            r#"{"field": "vessel_name", "operator": "contains", "value": "Aurora"}"#,
        )
        .unwrap();
        assert_eq!(f.operator, FilterOp::Contains);

        assert!(serde_json::from_str::<FilterClause>(
            r#"{"field": "x", "operator": "like", "value": 1}"#
        )
        .is_err());
    }

    #[test]
    fn test_aggregation_deserialize() {
        let a: Aggregation = serde_json::from_str(
            r#"{"field": "fuel_consumption_mt", "function": "sum", "alias": "total_fuel"}"#,
        )
        .unwrap();
        assert_eq!(a.function, AggFn::Sum);
        assert_eq!(a.function.sql_name(), "SUM");
    }

    #[test]
    fn test_template_roles() {
        let t: SavedTemplate = serde_json::from_str(
            r#"{
                "name": "weekly fuel",
                "config": {"dataset": "fuel_efficiency"},
                "access_role": "ship_officer"
            }"#,
        )
        .unwrap();
        assert_eq!(t.access_role, AccessRole::ShipOfficer);
        assert_eq!(t.description, None);
    }
}
