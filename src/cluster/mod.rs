//! Geographic grouping of orders ahead of vehicle assignment.

mod geographic;

pub use geographic::{Cluster, GeographicClusterer};
