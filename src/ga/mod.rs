//! Population-based refinement of route sets.
//!
//! - [`RouteSet`] — candidate solution, an [`Individual`](u_metaheur::ga::Individual)
//!   whose fitness is its cost (lower is better)
//! - [`DispatchGaProblem`] — the [`GaProblem`](u_metaheur::ga::GaProblem) wiring
//! - [`operators`] — route-level recombination, swap mutation
//! - [`repair`] — restores exactly-once coverage and capacity after recombination
//! - [`PopulationEngine`] — elitist generational search on
//!   [`GaRunner`](u_metaheur::ga::GaRunner)

mod candidate;
mod engine;
pub mod operators;
mod problem;
pub mod repair;

pub use candidate::RouteSet;
pub use engine::{EngineResult, PopulationEngine};
pub use problem::DispatchGaProblem;
pub use repair::RepairReport;
