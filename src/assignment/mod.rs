//! Vehicle assignment for clustered orders.
//!
//! - [`VehicleMatcher`] — balanced-utilization cluster-to-vehicle matching
//! - [`AssignmentSummary`], [`AssignmentMetrics`] — fleet-level reporting
//! - [`RouteSuggestion`] — nearest-neighbor reordering advice per vehicle

mod matcher;
mod metrics;
mod suggestion;

pub use matcher::{utilization_score, Assignment, AssignmentOutcome, VehicleMatcher};
pub use metrics::{load_balance_score, AssignmentMetrics, AssignmentSummary};
pub use suggestion::RouteSuggestion;
