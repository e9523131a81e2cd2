//! Route cost evaluation and structural validation.

mod cost;
mod validate;

pub use cost::{RouteCost, RouteCostEvaluator};
pub use validate::{validate_routes, Violation, ViolationType};
