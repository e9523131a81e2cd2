//! Great-circle distance.

use crate::models::Location;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two locations in kilometres.
///
/// Symmetric, zero for identical points, and within floating-point
/// tolerance of the triangle inequality.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Location;
/// use u_dispatch::distance::haversine_km;
///
/// // One degree of longitude on the equator.
/// let d = haversine_km(&Location::new(0.0, 0.0), &Location::new(0.0, 1.0));
/// assert!((d - 111.195).abs() < 0.01);
/// ```
pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let dlat = lat2 - lat1;
    let dlng = (b.lng() - a.lng()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push h marginally outside [0, 1] for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}
