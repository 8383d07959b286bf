//! The eight fixed report datasets.
//!
//! Each dataset is a base query over the fleet schema plus the whitelist of
//! column names that query yields. The whitelist is what keeps user-supplied
//! identifiers out of raw SQL: the composer refuses any field, column,
//! group-by, or sort key that is not listed here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// One of the eight predefined base queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    FleetPerformance,
    FuelEfficiency,
    CrewCompliance,
    MaintenanceDue,
    VoyageDelayAnalysis,
    IncidentSafety,
    EmissionsCompliance,
    CargoThroughput,
}

impl Dataset {
    /// Every dataset, in a stable order.
    pub const ALL: [Dataset; 8] = [
        Dataset::FleetPerformance,
        Dataset::FuelEfficiency,
        Dataset::CrewCompliance,
        Dataset::MaintenanceDue,
        Dataset::VoyageDelayAnalysis,
        Dataset::IncidentSafety,
        Dataset::EmissionsCompliance,
        Dataset::CargoThroughput,
    ];

    /// The wire name of the dataset.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FleetPerformance => "fleet_performance",
            Self::FuelEfficiency => "fuel_efficiency",
            Self::CrewCompliance => "crew_compliance",
            Self::MaintenanceDue => "maintenance_due",
            Self::VoyageDelayAnalysis => "voyage_delay_analysis",
            Self::IncidentSafety => "incident_safety",
            Self::EmissionsCompliance => "emissions_compliance",
            Self::CargoThroughput => "cargo_throughput",
        }
    }

    /// The base query the dataset wraps. Always selected from as a
    /// parenthesized subquery aliased `t`.
    pub fn base_sql(&self) -> &'static str {
        match self {
            Self::FleetPerformance => {
                "SELECT v.name AS vessel_name, v.vessel_type, y.voyage_code, y.departure_time, y.arrival_time, \
                 EXTRACT(EPOCH FROM (COALESCE(y.arrival_time, NOW()) - y.departure_time))/3600 AS voyage_hours, \
                 y.cargo_tonnage \
                 FROM voyages y \
                 JOIN vessels v ON y.vessel_id = v.id"
            }
            Self::FuelEfficiency => {
                "SELECT v.name AS vessel_name, y.voyage_code, f.log_time, f.fuel_consumption_mt, f.avg_speed_knots, \
                 f.co2_emissions_mt, (f.fuel_consumption_mt / NULLIF(f.avg_speed_knots, 0)) AS fuel_per_knot \
                 FROM fuel_performance_logs f \
                 JOIN voyages y ON f.voyage_id = y.id \
                 JOIN vessels v ON y.vessel_id = v.id"
            }
            Self::CrewCompliance => {
                "SELECT c.employee_code, c.full_name, c.rank, c.certification_level, c.join_date, c.active \
                 FROM crew_members c"
            }
            Self::MaintenanceDue => {
                "SELECT v.name AS vessel_name, m.record_type, m.title, m.due_date, m.completed_date, m.status, m.severity \
                 FROM maintenance_compliance_records m \
                 JOIN vessels v ON m.vessel_id = v.id"
            }
            Self::VoyageDelayAnalysis => {
                "SELECT v.name AS vessel_name, y.voyage_code, y.origin_port, y.destination_port, \
                 y.departure_time, y.arrival_time, \
                 CASE WHEN y.arrival_time IS NULL THEN 'ongoing' \
                 WHEN y.arrival_time > y.departure_time + INTERVAL '120 hours' THEN 'delayed' \
                 ELSE 'on_time' END AS delay_status \
                 FROM voyages y \
                 JOIN vessels v ON y.vessel_id = v.id"
            }
            Self::IncidentSafety => {
                "SELECT v.name AS vessel_name, i.event_type, i.event_date, i.location, i.risk_level \
                 FROM incident_inspection_logs i \
                 JOIN vessels v ON i.vessel_id = v.id"
            }
            Self::EmissionsCompliance => {
                "SELECT v.name AS vessel_name, y.voyage_code, f.log_time, f.co2_emissions_mt, \
                 CASE WHEN f.co2_emissions_mt > 30 THEN 'alert' ELSE 'compliant' END AS emissions_status \
                 FROM fuel_performance_logs f \
                 JOIN voyages y ON f.voyage_id = y.id \
                 JOIN vessels v ON y.vessel_id = v.id"
            }
            Self::CargoThroughput => {
                "SELECT v.name AS vessel_name, y.voyage_code, c.cargo_type, c.operation_type, \
                 c.terminal, c.quantity_tons, c.operation_time \
                 FROM cargo_operation_history c \
                 JOIN voyages y ON c.voyage_id = y.id \
                 JOIN vessels v ON y.vessel_id = v.id"
            }
        }
    }

    /// Columns the base query yields, in select-list order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::FleetPerformance => &[
                "vessel_name",
                "vessel_type",
                "voyage_code",
                "departure_time",
                "arrival_time",
                "voyage_hours",
                "cargo_tonnage",
            ],
            Self::FuelEfficiency => &[
                "vessel_name",
                "voyage_code",
                "log_time",
                "fuel_consumption_mt",
                "avg_speed_knots",
                "co2_emissions_mt",
                "fuel_per_knot",
            ],
            Self::CrewCompliance => &[
                "employee_code",
                "full_name",
                "rank",
                "certification_level",
                "join_date",
                "active",
            ],
            Self::MaintenanceDue => &[
                "vessel_name",
                "record_type",
                "title",
                "due_date",
                "completed_date",
                "status",
                "severity",
            ],
            Self::VoyageDelayAnalysis => &[
                "vessel_name",
                "voyage_code",
                "origin_port",
                "destination_port",
                "departure_time",
                "arrival_time",
                "delay_status",
            ],
            Self::IncidentSafety => &[
                "vessel_name",
                "event_type",
                "event_date",
                "location",
                "risk_level",
            ],
            Self::EmissionsCompliance => &[
                "vessel_name",
                "voyage_code",
                "log_time",
                "co2_emissions_mt",
                "emissions_status",
            ],
            Self::CargoThroughput => &[
                "vessel_name",
                "voyage_code",
                "cargo_type",
                "operation_type",
                "terminal",
                "quantity_tons",
                "operation_time",
            ],
        }
    }

    /// Whether the dataset yields a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns().contains(&name)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| ReportError::UnknownDataset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset.name().parse::<Dataset>().unwrap(), dataset);
        }
        assert!("fleet_performanc".parse::<Dataset>().is_err());
    }

    #[test]
    fn test_serde_names_match_from_str() {
        for dataset in Dataset::ALL {
            let json = serde_json::to_string(&dataset).unwrap();
            assert_eq!(json, format!("\"{}\"", dataset.name()));
            let back: Dataset = serde_json::from_str(&json).unwrap();
            assert_eq!(back, dataset);
        }
    }

    #[test]
    fn test_column_whitelist() {
        assert!(Dataset::FleetPerformance.has_column("voyage_hours"));
        assert!(Dataset::VoyageDelayAnalysis.has_column("delay_status"));
        assert!(!Dataset::CrewCompliance.has_column("vessel_name"));
        // Identifiers with SQL metacharacters never match.
        assert!(!Dataset::FleetPerformance.has_column("vessel_name; DROP TABLE vessels"));
    }

    #[test]
    fn test_base_sql_has_no_trailing_clauses() {
        for dataset in Dataset::ALL {
            let sql = dataset.base_sql();
            assert!(sql.starts_with("SELECT "), "{}", dataset);
            assert!(!sql.contains("LIMIT"), "{}", dataset);
            assert!(!sql.contains("ORDER BY"), "{}", dataset);
        }
    }
}
