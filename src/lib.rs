//! # marlin — fleet-operations dynamic reporting
//!
//! Clients describe a report declaratively — dataset, columns, filters,
//! grouping, aggregations, sort, pagination — and marlin compiles the
//! description into a single parameterized Postgres statement over one of
//! eight fixed dataset views, returning paginated rows plus a total count.
//!
//! ## Quick Example
//!
//! ```rust
//! use marlin::prelude::*;
//!
//! let request: ReportRequest = serde_json::from_str(r#"{
//!     "dataset": "maintenance_due",
//!     "filters": [{"field": "severity", "operator": "in", "value": ["high", "critical"]}],
//!     "sort_by": "due_date",
//!     "page": 1,
//!     "page_size": 25
//! }"#).unwrap();
//!
//! let composed = compose(&request).unwrap();
//! assert!(composed.data.sql.contains("WHERE severity IN ($1, $2)"));
//! // Values travel separately, as bound parameters.
//! assert_eq!(composed.data.params.len(), 4);
//! ```
//!
//! ## Safety model
//!
//! User-supplied *values* are always bound as `$n` parameters. User-supplied
//! *identifiers* (columns, filter fields, group keys, sort keys) only reach
//! the SQL text after validating against the dataset's column whitelist;
//! aggregation aliases must parse as plain identifiers.

pub mod composer;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod handler;
pub mod report;
pub mod router;
pub mod server;
pub mod templates;

pub mod prelude {
    pub use crate::composer::{compose, ComposedReport, ParamValue, SqlStatement};
    pub use crate::config::ServerConfig;
    pub use crate::dataset::Dataset;
    pub use crate::engine::ReportDb;
    pub use crate::error::{ReportError, ReportResult};
    pub use crate::report::{
        AccessRole, AggFn, Aggregation, FilterClause, FilterOp, ReportRequest, ReportResponse,
        SavedTemplate, SortDirection,
    };
    pub use crate::server::Server;
    pub use crate::templates::TemplateStore;
}
