//! Geographic location type.

use serde::{Deserialize, Serialize};

use crate::distance::haversine_km;

/// A point on the Earth's surface in decimal degrees.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Location;
///
/// let a = Location::new(19.0760, 72.8777);
/// let b = Location::new(19.0896, 72.8656);
/// assert!(a.distance_to(&b) > 1.0);
/// assert_eq!(a.distance_to(&a), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    lat: f64,
    lng: f64,
}

impl Location {
    /// Creates a location from latitude and longitude in degrees.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance to another location in kilometres.
    pub fn distance_to(&self, other: &Location) -> f64 {
        haversine_km(self, other)
    }

    /// Arithmetic mean of the given locations.
    ///
    /// Returns `None` for an empty input.
    pub fn centroid<'a, I>(locations: I) -> Option<Location>
    where
        I: IntoIterator<Item = &'a Location>,
    {
        let (mut lat, mut lng, mut n) = (0.0, 0.0, 0usize);
        for loc in locations {
            lat += loc.lat;
            lng += loc.lng;
            n += 1;
        }
        if n == 0 {
            return None;
        }
        Some(Location::new(lat / n as f64, lng / n as f64))
    }
}
