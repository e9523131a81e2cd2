//! Structural route-set validation.

use crate::models::{order_index, Load, Order, Route, DEPOT};

/// A type of structural violation in a route set.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationType {
    /// Cumulative load exceeded capacity at some prefix of a route.
    CapacityExceeded {
        /// Route index in the set.
        route_index: usize,
        /// Load at the first offending prefix.
        load: Load,
        /// Vehicle capacity.
        capacity: Load,
    },
    /// A stop appears more than once across the set.
    DuplicateStop {
        /// The repeated stop.
        stop: usize,
        /// Route holding the repeat.
        route_index: usize,
    },
    /// An expected stop is not visited by any route.
    MissingStop {
        /// The missing stop.
        stop: usize,
    },
    /// A stop is out of range, is the depot, or was not expected.
    UnexpectedStop {
        /// The offending stop.
        stop: usize,
        /// Route holding it.
        route_index: usize,
    },
}

/// A structural violation in a route set.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// Checks that `routes` visit every stop in `expected` exactly once, visit
/// nothing else, and never exceed `capacity` at any prefix.
///
/// An empty result means the set is structurally valid.
///
/// # Examples
///
/// ```
/// use u_dispatch::evaluation::validate_routes;
/// use u_dispatch::models::{Load, Location, Order, Route};
///
/// let orders = vec![
///     Order::new("a", Location::new(0.0, 0.0), Load::weight(30.0)),
///     Order::new("b", Location::new(0.0, 0.0), Load::weight(30.0)),
/// ];
/// let cap = Load::weight(50.0);
/// let ok = vec![Route::new(vec![1]), Route::new(vec![2])];
/// assert!(validate_routes(&ok, &orders, &cap, &[1, 2]).is_empty());
///
/// let overloaded = vec![Route::new(vec![1, 2])];
/// assert_eq!(validate_routes(&overloaded, &orders, &cap, &[1, 2]).len(), 1);
/// ```
pub fn validate_routes(
    routes: &[Route],
    orders: &[Order],
    capacity: &Load,
    expected: &[usize],
) -> Vec<Violation> {
    let n_stops = orders.len() + 1;
    let mut expected_mask = vec![false; n_stops];
    for &s in expected {
        if s < n_stops {
            expected_mask[s] = true;
        }
    }
    let mut seen = vec![false; n_stops];
    let mut violations = Vec::new();

    for (route_index, route) in routes.iter().enumerate() {
        let mut load = Load::zero();
        let mut overloaded = false;

        for &stop in route.customers() {
            if stop == DEPOT || stop >= n_stops || !expected_mask[stop] {
                violations.push(Violation::new(ViolationType::UnexpectedStop {
                    stop,
                    route_index,
                }));
                continue;
            }
            if seen[stop] {
                violations.push(Violation::new(ViolationType::DuplicateStop {
                    stop,
                    route_index,
                }));
            }
            seen[stop] = true;

            load += orders[order_index(stop)].load();
            if !overloaded && !load.fits_within(capacity) {
                overloaded = true;
                violations.push(Violation::new(ViolationType::CapacityExceeded {
                    route_index,
                    load,
                    capacity: *capacity,
                }));
            }
        }
    }

    for &stop in expected {
        if stop < n_stops && stop != DEPOT && !seen[stop] {
            violations.push(Violation::new(ViolationType::MissingStop { stop }));
        }
    }

    violations
}
