//! Constructive heuristics for building initial feasible routes.
//!
//! - [`RouteBuilder`] — capacity- and time-window-aware nearest neighbor, O(n²)
//! - [`OrderPool`] — the unplaced stops, threaded by value through construction

mod builder;
mod pool;

pub use builder::{BuildState, Construction, RouteBuilder, TieBreak};
pub use pool::OrderPool;
