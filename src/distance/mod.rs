//! Great-circle distances and the run-scoped distance matrix.

mod geo;
mod matrix;

pub use geo::{haversine_km, EARTH_RADIUS_KM};
pub use matrix::DistanceMatrix;
