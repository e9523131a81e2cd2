//! Dense great-circle distance matrix over depot and order locations.

use tracing::debug;

use crate::error::DispatchError;
use crate::models::{Location, Order, DEPOT};

use super::haversine_km;

/// A dense, symmetric n×n distance matrix in kilometres, stored row-major.
///
/// Index 0 is the depot; index `i > 0` is order `i - 1`. The matrix
/// remembers the locations it was built from so that callers can detect
/// when it no longer matches the order set.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Load, Location, Order};
/// use u_dispatch::distance::DistanceMatrix;
///
/// let depot = Location::new(0.0, 0.0);
/// let orders = vec![
///     Order::new("A", Location::new(0.0, 0.01), Load::weight(10.0)),
///     Order::new("B", Location::new(0.0, 0.02), Load::weight(45.0)),
/// ];
/// let dm = DistanceMatrix::build(&depot, &orders);
/// assert_eq!(dm.size(), 3);
/// assert_eq!(dm.get(1, 2), dm.get(2, 1));
/// assert_eq!(dm.get(1, 1), 0.0);
/// assert!(dm.ensure_matches(&depot, &orders).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
    locations: Vec<Location>,
}

impl DistanceMatrix {
    /// Builds the matrix over the depot followed by every order location.
    ///
    /// O(n²) in `1 + orders.len()`.
    pub fn build(depot: &Location, orders: &[Order]) -> Self {
        let mut locations = Vec::with_capacity(orders.len() + 1);
        locations.push(*depot);
        locations.extend(orders.iter().map(|o| *o.location()));
        Self::from_locations(locations)
    }

    /// Builds the matrix over an explicit list of locations.
    pub fn from_locations(locations: Vec<Location>) -> Self {
        let n = locations.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = haversine_km(&locations[i], &locations[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        debug!(size = n, "built distance matrix");
        Self {
            data,
            size: n,
            locations,
        }
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Distance from the depot to `stop`.
    pub fn from_depot(&self, stop: usize) -> f64 {
        self.get(DEPOT, stop)
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Location behind a matrix index.
    pub fn location(&self, index: usize) -> &Location {
        &self.locations[index]
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the nearest neighbor of `from` among the given candidates.
    ///
    /// Exact ties go to the lowest index. Returns `None` if `candidates` is
    /// empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates.iter().copied().min_by(|&a, &b| {
            self.get(from, a)
                .total_cmp(&self.get(from, b))
                .then(a.cmp(&b))
        })
    }

    /// Fails with [`DispatchError::StaleState`] unless this matrix was built
    /// from exactly this depot and order set.
    pub fn ensure_matches(&self, depot: &Location, orders: &[Order]) -> Result<(), DispatchError> {
        let stale = DispatchError::StaleState {
            what: "distance matrix does not match the order set",
        };
        if self.size != orders.len() + 1 || self.locations[DEPOT] != *depot {
            return Err(stale);
        }
        let matches = orders
            .iter()
            .zip(&self.locations[1..])
            .all(|(o, l)| o.location() == l);
        if matches {
            Ok(())
        } else {
            Err(stale)
        }
    }

    /// Fails with [`DispatchError::StaleState`] unless the matrix covers
    /// exactly `orders.len()` orders at their current locations.
    pub fn ensure_covers(&self, orders: &[Order]) -> Result<(), DispatchError> {
        self.ensure_matches(&self.locations[DEPOT], orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Load;

    fn sample_orders() -> Vec<Order> {
        vec![
            Order::new("a", Location::new(0.0, 0.01), Load::weight(1.0)),
            Order::new("b", Location::new(0.0, 0.02), Load::weight(1.0)),
            Order::new("c", Location::new(0.01, 0.0), Load::weight(1.0)),
        ]
    }

    #[test]
    fn test_build() {
        let dm = DistanceMatrix::build(&Location::new(0.0, 0.0), &sample_orders());
        assert_eq!(dm.size(), 4);
        assert!(dm.get(0, 0).abs() < 1e-12);
        assert!((dm.get(0, 2) - 2.0 * dm.get(0, 1)).abs() < 1e-6);
        assert_eq!(dm.from_depot(1), dm.get(0, 1));
    }

    #[test]
    fn test_symmetric_and_zero_diagonal() {
        let dm = DistanceMatrix::build(&Location::new(0.0, 0.0), &sample_orders());
        assert!(dm.is_symmetric(0.0));
        for i in 0..dm.size() {
            assert_eq!(dm.get(i, i), 0.0);
        }
    }

    #[test]
    fn test_nearest_neighbor() {
        let dm = DistanceMatrix::build(&Location::new(0.0, 0.0), &sample_orders());
        assert_eq!(dm.nearest_neighbor(0, &[2, 1]), Some(1));
        assert_eq!(dm.nearest_neighbor(0, &[2]), Some(2));
        assert_eq!(dm.nearest_neighbor(0, &[]), None);
    }

    #[test]
    fn test_nearest_neighbor_tie_lowest_index() {
        // Identical locations force an exact tie.
        let orders = vec![
            Order::new("a", Location::new(0.0, 0.01), Load::weight(1.0)),
            Order::new("b", Location::new(0.0, 0.01), Load::weight(1.0)),
        ];
        let dm = DistanceMatrix::build(&Location::new(0.0, 0.0), &orders);
        assert_eq!(dm.nearest_neighbor(0, &[2, 1]), Some(1));
    }

    #[test]
    fn test_stale_detection() {
        let depot = Location::new(0.0, 0.0);
        let mut orders = sample_orders();
        let dm = DistanceMatrix::build(&depot, &orders);
        assert!(dm.ensure_matches(&depot, &orders).is_ok());
        assert!(dm.ensure_covers(&orders).is_ok());

        orders.push(Order::new("d", Location::new(1.0, 1.0), Load::weight(1.0)));
        assert!(matches!(
            dm.ensure_matches(&depot, &orders),
            Err(DispatchError::StaleState { .. })
        ));

        orders.pop();
        orders[0] = Order::new("a", Location::new(0.5, 0.5), Load::weight(1.0));
        assert!(dm.ensure_matches(&depot, &orders).is_err());
        assert!(dm
            .ensure_matches(&Location::new(1.0, 0.0), &sample_orders())
            .is_err());
    }
}
