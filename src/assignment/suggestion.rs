//! Nearest-neighbor reordering advice for an assigned order set.

use serde::Serialize;

use crate::config::CostModel;
use crate::distance::DistanceMatrix;
use crate::models::{order_index, stop_index, DEPOT};

/// Distance of delivering in the given order versus nearest-neighbor order.
///
/// # Examples
///
/// ```
/// use u_dispatch::assignment::RouteSuggestion;
/// use u_dispatch::config::CostModel;
/// use u_dispatch::distance::DistanceMatrix;
/// use u_dispatch::models::{Load, Location, Order};
///
/// let depot = Location::new(0.0, 0.0);
/// let orders = vec![
///     Order::new("far", Location::new(0.0, 0.03), Load::weight(1.0)),
///     Order::new("near", Location::new(0.0, 0.01), Load::weight(1.0)),
///     Order::new("mid", Location::new(0.0, 0.02), Load::weight(1.0)),
/// ];
/// let dm = DistanceMatrix::build(&depot, &orders);
/// let model = CostModel::new(2.0, 10.0).unwrap();
///
/// let s = RouteSuggestion::compute(&dm, &[0, 1, 2], &model).unwrap();
/// assert_eq!(s.optimized_sequence(), &[1, 2, 0]);
/// assert!(s.savings_km() > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSuggestion {
    original_sequence: Vec<usize>,
    optimized_sequence: Vec<usize>,
    original_km: f64,
    optimized_km: f64,
    time_savings_minutes: f64,
}

impl RouteSuggestion {
    /// Compares `sequence` (order indices) with its nearest-neighbor
    /// reordering; `None` for an empty sequence.
    pub fn compute(
        distances: &DistanceMatrix,
        sequence: &[usize],
        model: &CostModel,
    ) -> Option<Self> {
        if sequence.is_empty() {
            return None;
        }
        let original: Vec<usize> = sequence.iter().map(|&o| stop_index(o)).collect();

        let mut remaining = original.clone();
        let mut optimized = Vec::with_capacity(original.len());
        let mut current = DEPOT;
        while let Some(next) = distances.nearest_neighbor(current, &remaining) {
            remaining.retain(|&s| s != next);
            optimized.push(next);
            current = next;
        }

        let original_km = tour_km(distances, &original);
        let optimized_km = tour_km(distances, &optimized);
        Some(Self {
            original_sequence: sequence.to_vec(),
            optimized_sequence: optimized.into_iter().map(order_index).collect(),
            original_km,
            optimized_km,
            time_savings_minutes: model.travel_minutes(original_km - optimized_km),
        })
    }

    /// Order indices as given.
    pub fn original_sequence(&self) -> &[usize] {
        &self.original_sequence
    }

    /// Order indices in nearest-neighbor order.
    pub fn optimized_sequence(&self) -> &[usize] {
        &self.optimized_sequence
    }

    /// Depot-to-depot distance of the given order, km.
    pub fn original_km(&self) -> f64 {
        self.original_km
    }

    /// Depot-to-depot distance of the nearest-neighbor order, km.
    pub fn optimized_km(&self) -> f64 {
        self.optimized_km
    }

    /// Distance saved; negative if nearest-neighbor is longer.
    pub fn savings_km(&self) -> f64 {
        self.original_km - self.optimized_km
    }

    /// Saving as a percentage of the original distance.
    pub fn improvement_pct(&self) -> f64 {
        if self.original_km > 0.0 {
            self.savings_km() / self.original_km * 100.0
        } else {
            0.0
        }
    }

    /// Driving time saved, minutes.
    pub fn time_savings_minutes(&self) -> f64 {
        self.time_savings_minutes
    }
}

fn tour_km(distances: &DistanceMatrix, stops: &[usize]) -> f64 {
    let mut total = 0.0;
    let mut current = DEPOT;
    for &s in stops {
        total += distances.get(current, s);
        current = s;
    }
    total + distances.get(current, DEPOT)
}
