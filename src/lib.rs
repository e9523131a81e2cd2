//! # u-dispatch
//!
//! Delivery dispatch optimization: capacity- and time-window-constrained
//! routing refined by a population search, plus geographic clustering,
//! vehicle matching and LIFO load sequencing for the same order set.
//!
//! ## Modules
//!
//! - [`models`] — Orders, packages, vehicles, loads, routes
//! - [`distance`] — Haversine distances and the run-scoped matrix
//! - [`evaluation`] — Route cost (distance + lateness penalty) and validation
//! - [`constructive`] — Nearest-feasible-neighbor route construction
//! - [`ga`] — Elitist population search over route sets, with repair
//! - [`cluster`] — Greedy size- and radius-bounded clustering
//! - [`assignment`] — Balanced-utilization cluster-to-vehicle matching
//! - [`loading`] — Delivery sequencing, loading zones, handling notes
//! - [`schedule`] — Timestamped stop schedules
//! - [`planner`] — End-to-end [`Dispatcher`](planner::Dispatcher)
//! - [`config`], [`error`] — Settings and error types

pub mod assignment;
pub mod cluster;
pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod loading;
pub mod models;
pub mod planner;
pub mod schedule;

pub use error::{DispatchError, InfeasibleOrder, InfeasibleReason};
