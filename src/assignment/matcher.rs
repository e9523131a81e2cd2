//! Cluster-to-vehicle matching under capacity and capability constraints.
//!
//! # Algorithm
//!
//! Vehicles are ranked by weight capacity, largest first (stable for equal
//! capacities). Clusters are processed in creation order. For each cluster
//! and each still-unused vehicle, the *compatible set* is built greedily:
//! walking the cluster members in order, a member joins if the vehicle
//! supports its handling and it still fits on top of the members already
//! taken. The vehicle with the best balanced-utilization score wins:
//!
//! ```text
//! score = min(weight_util, volume_util) × 100
//! ```
//!
//! A dimension with zero capacity is left out of the minimum. Ties go to
//! the larger compatible set, then to the higher single-dimension
//! utilization, then to the earlier-ranked vehicle. A vehicle with an empty
//! compatible set is never chosen.
//!
//! Cluster members left out of the chosen vehicle's compatible set, and
//! whole clusters with no remaining vehicle, are reported as unassigned.
//!
//! # Complexity
//!
//! O(C · V · s) where C = clusters, V = vehicles, s = maximum cluster size.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cluster::Cluster;
use crate::error::{InfeasibleOrder, InfeasibleReason};
use crate::models::{Load, Order, Vehicle};

/// Orders of one cluster placed on one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    cluster: usize,
    vehicle: usize,
    orders: Vec<usize>,
    load: Load,
    score: f64,
}

impl Assignment {
    /// Cluster id the orders came from.
    pub fn cluster(&self) -> usize {
        self.cluster
    }

    /// Index of the vehicle in the caller's fleet slice.
    pub fn vehicle(&self) -> usize {
        self.vehicle
    }

    /// Assigned order indices, in cluster order.
    pub fn orders(&self) -> &[usize] {
        &self.orders
    }

    /// Combined load of the assigned orders.
    pub fn load(&self) -> Load {
        self.load
    }

    /// Balanced-utilization score in [0, 100].
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Result of matching every cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssignmentOutcome {
    /// One entry per vehicle used.
    pub assignments: Vec<Assignment>,
    /// Orders that no vehicle took.
    pub unassigned: Vec<InfeasibleOrder>,
}

impl AssignmentOutcome {
    /// Number of assigned orders.
    pub fn assigned_count(&self) -> usize {
        self.assignments.iter().map(|a| a.orders.len()).sum()
    }
}

/// Balanced-utilization score of `load` on `capacity`, in percent.
///
/// Dimensions with zero capacity are ignored; with none left the score is 0.
///
/// # Examples
///
/// ```
/// use u_dispatch::assignment::utilization_score;
/// use u_dispatch::models::Load;
///
/// let cap = Load::new(100.0, 1000.0);
/// assert_eq!(utilization_score(&Load::new(50.0, 250.0), &cap), 25.0);
/// assert_eq!(utilization_score(&Load::weight(40.0), &Load::weight(100.0)), 40.0);
/// ```
pub fn utilization_score(load: &Load, capacity: &Load) -> f64 {
    let (w, v) = load.utilization_of(capacity);
    let dims = [(capacity.weight, w), (capacity.volume, v)];
    dims.iter()
        .filter(|(cap, _)| *cap > 0.0)
        .map(|&(_, u)| u * 100.0)
        .min_by(|a, b| a.total_cmp(b))
        .unwrap_or(0.0)
}

/// Candidate evaluation for one vehicle.
#[derive(Debug, Clone)]
struct Candidate {
    vehicle: usize,
    orders: Vec<usize>,
    load: Load,
    score: f64,
    peak: f64,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        (self.score, self.orders.len(), self.peak) > (other.score, other.orders.len(), other.peak)
    }
}

/// Assigns clusters to vehicles.
///
/// # Examples
///
/// ```
/// use u_dispatch::assignment::VehicleMatcher;
/// use u_dispatch::cluster::GeographicClusterer;
/// use u_dispatch::config::ClusterConfig;
/// use u_dispatch::models::{Load, Location, Order, Vehicle};
///
/// let depot = Location::new(0.0, 0.0);
/// let orders = vec![
///     Order::new("A", Location::new(0.0, 0.01), Load::weight(30.0)),
///     Order::new("B", Location::new(0.0, 0.02), Load::weight(30.0)),
/// ];
/// let fleet = vec![
///     Vehicle::new("big", Load::weight(500.0)),
///     Vehicle::new("small", Load::weight(80.0)),
/// ];
///
/// let clusters = GeographicClusterer::new(ClusterConfig::default())
///     .unwrap()
///     .cluster(&depot, &orders);
/// let outcome = VehicleMatcher::new(&orders, &fleet).assign(&clusters);
///
/// // The small van is better utilized.
/// assert_eq!(outcome.assignments[0].vehicle(), 1);
/// assert!(outcome.unassigned.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct VehicleMatcher<'a> {
    orders: &'a [Order],
    vehicles: &'a [Vehicle],
    ranking: Vec<usize>,
}

impl<'a> VehicleMatcher<'a> {
    /// Creates a matcher over a fleet.
    pub fn new(orders: &'a [Order], vehicles: &'a [Vehicle]) -> Self {
        let mut ranking: Vec<usize> = (0..vehicles.len()).collect();
        ranking.sort_by(|&a, &b| {
            vehicles[b]
                .capacity()
                .weight
                .total_cmp(&vehicles[a].capacity().weight)
        });
        Self {
            orders,
            vehicles,
            ranking,
        }
    }

    /// Vehicle indices in consideration order, largest first.
    pub fn ranking(&self) -> &[usize] {
        &self.ranking
    }

    /// Members of `cluster` that `vehicle` takes, with their combined load.
    pub fn compatible_set(&self, vehicle: usize, members: &[usize]) -> (Vec<usize>, Load) {
        let v = &self.vehicles[vehicle];
        let capacity = v.capacity();
        let mut load = Load::zero();
        let mut taken = Vec::new();
        for &o in members {
            let order = &self.orders[o];
            if !v.supports(order.handling()) {
                continue;
            }
            let next = load + order.load();
            if next.fits_within(&capacity) {
                load = next;
                taken.push(o);
            }
        }
        (taken, load)
    }

    /// Matches every cluster in order.
    pub fn assign(&self, clusters: &[Cluster]) -> AssignmentOutcome {
        let mut used = vec![false; self.vehicles.len()];
        let mut outcome = AssignmentOutcome::default();

        for cluster in clusters {
            let chosen = self.best_vehicle(cluster, &used);
            let Some(chosen) = chosen else {
                debug!(cluster = cluster.id(), "no vehicle available");
                outcome.unassigned.extend(
                    cluster
                        .members()
                        .iter()
                        .map(|&o| InfeasibleOrder::new(o, InfeasibleReason::NoVehicleAvailable)),
                );
                continue;
            };

            used[chosen.vehicle] = true;
            outcome.unassigned.extend(
                cluster
                    .members()
                    .iter()
                    .filter(|&&o| !chosen.orders.contains(&o))
                    .map(|&o| InfeasibleOrder::new(o, InfeasibleReason::NoVehicleAvailable)),
            );
            debug!(
                cluster = cluster.id(),
                vehicle = self.vehicles[chosen.vehicle].id(),
                orders = chosen.orders.len(),
                score = chosen.score,
                "cluster assigned"
            );
            outcome.assignments.push(Assignment {
                cluster: cluster.id(),
                vehicle: chosen.vehicle,
                orders: chosen.orders,
                load: chosen.load,
                score: chosen.score,
            });
        }

        if !outcome.unassigned.is_empty() {
            warn!(
                count = outcome.unassigned.len(),
                "orders left without a vehicle"
            );
        }
        info!(
            clusters = clusters.len(),
            vehicles_used = outcome.assignments.len(),
            assigned = outcome.assigned_count(),
            "vehicle assignment finished"
        );
        outcome
    }

    fn best_vehicle(&self, cluster: &Cluster, used: &[bool]) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for &vi in &self.ranking {
            if used[vi] {
                continue;
            }
            let (orders, load) = self.compatible_set(vi, cluster.members());
            if orders.is_empty() {
                continue;
            }
            let capacity = self.vehicles[vi].capacity();
            let (w, v) = load.utilization_of(&capacity);
            let candidate = Candidate {
                vehicle: vi,
                orders,
                load,
                score: utilization_score(&load, &capacity),
                peak: w.max(v),
            };
            if best.as_ref().map_or(true, |b| candidate.beats(b)) {
                best = Some(candidate);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::GeographicClusterer;
    use crate::config::ClusterConfig;
    use crate::models::{Handling, Location};

    fn clusters_of(orders: &[Order]) -> Vec<Cluster> {
        GeographicClusterer::new(ClusterConfig::default())
            .expect("valid")
            .cluster(&Location::new(0.0, 0.0), orders)
    }

    fn order(id: &str, lng: f64, load: Load) -> Order {
        Order::new(id, Location::new(0.0, lng), load)
    }

    #[test]
    fn test_ranking_largest_first() {
        let fleet = vec![
            Vehicle::new("s", Load::weight(10.0)),
            Vehicle::new("l", Load::weight(100.0)),
            Vehicle::new("m", Load::weight(50.0)),
        ];
        let matcher = VehicleMatcher::new(&[], &fleet);
        assert_eq!(matcher.ranking(), &[1, 2, 0]);
    }

    #[test]
    fn test_score_prefers_balanced() {
        let orders = vec![order("a", 0.01, Load::new(50.0, 500.0))];
        let fleet = vec![
            Vehicle::new("heavy", Load::new(100.0, 5000.0)),
            Vehicle::new("balanced", Load::new(60.0, 600.0)),
        ];
        let outcome = VehicleMatcher::new(&orders, &fleet).assign(&clusters_of(&orders));
        assert_eq!(outcome.assignments[0].vehicle(), 1);
        assert!(outcome.assignments[0].score() <= 100.0);
    }

    #[test]
    fn test_capability_filters_members() {
        let orders = vec![
            order("cold", 0.01, Load::weight(5.0)).with_handling(Handling::TemperatureSensitive),
            order("plain", 0.011, Load::weight(5.0)),
        ];
        let fleet = vec![Vehicle::new("van", Load::weight(100.0))];
        let outcome = VehicleMatcher::new(&orders, &fleet).assign(&clusters_of(&orders));
        assert_eq!(outcome.assignments[0].orders(), &[1]);
        assert_eq!(
            outcome.unassigned,
            vec![InfeasibleOrder::new(0, InfeasibleReason::NoVehicleAvailable)]
        );
    }

    #[test]
    fn test_cumulative_capacity_respected() {
        let orders = vec![
            order("a", 0.01, Load::weight(40.0)),
            order("b", 0.011, Load::weight(40.0)),
            order("c", 0.012, Load::weight(40.0)),
        ];
        let fleet = vec![Vehicle::new("van", Load::weight(100.0))];
        let outcome = VehicleMatcher::new(&orders, &fleet).assign(&clusters_of(&orders));
        let a = &outcome.assignments[0];
        assert_eq!(a.orders().len(), 2);
        assert!(a.load().fits_within(&fleet[0].capacity()));
        assert_eq!(outcome.unassigned.len(), 1);
    }

    #[test]
    fn test_vehicle_used_once() {
        let orders = vec![
            order("a", 0.01, Load::weight(10.0)),
            order("b", 0.5, Load::weight(10.0)),
        ];
        let fleet = vec![Vehicle::new("only", Load::weight(100.0))];
        let clusters = clusters_of(&orders);
        assert_eq!(clusters.len(), 2);
        let outcome = VehicleMatcher::new(&orders, &fleet).assign(&clusters);
        assert_eq!(outcome.assignments.len(), 1);
        assert_eq!(
            outcome.unassigned,
            vec![InfeasibleOrder::new(1, InfeasibleReason::NoVehicleAvailable)]
        );
    }

    #[test]
    fn test_zero_volume_capacity_ignored_in_score() {
        assert_eq!(utilization_score(&Load::weight(25.0), &Load::weight(50.0)), 50.0);
        assert_eq!(utilization_score(&Load::zero(), &Load::zero()), 0.0);
    }

    #[test]
    fn test_empty_fleet() {
        let orders = vec![order("a", 0.01, Load::weight(1.0))];
        let outcome = VehicleMatcher::new(&orders, &[]).assign(&clusters_of(&orders));
        assert!(outcome.assignments.is_empty());
        assert_eq!(outcome.unassigned.len(), 1);
    }
}
