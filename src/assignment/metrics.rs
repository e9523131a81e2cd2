//! Fleet-level summary of an assignment outcome.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Load, Location, Order, Priority, Vehicle};

use super::matcher::AssignmentOutcome;

/// Order and vehicle counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssignmentSummary {
    /// Orders considered.
    pub total_orders: usize,
    /// Orders placed on a vehicle.
    pub assigned_orders: usize,
    /// Orders left without a vehicle.
    pub unassigned_orders: usize,
    /// `assigned / total × 100`, 0 when there are no orders.
    pub assignment_rate: f64,
    /// Vehicles that received a cluster.
    pub vehicles_used: usize,
    /// Vehicles in the fleet.
    pub vehicles_available: usize,
}

/// Utilization and balance across the vehicles used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentMetrics {
    /// Used weight over the used vehicles' weight capacity, in percent.
    pub weight_utilization_pct: f64,
    /// Used volume over the used vehicles' volume capacity, in percent.
    pub volume_utilization_pct: f64,
    /// Assigned orders per priority tier.
    pub priority_distribution: BTreeMap<Priority, usize>,
    /// Mean over vehicles of the mean depot-to-order distance, in km.
    pub average_delivery_distance_km: f64,
    /// `max(0, 100 − 100·CV)` of per-vehicle weight utilization.
    pub load_balance_score: f64,
}

impl AssignmentOutcome {
    /// Counts for reporting.
    pub fn summary(&self, total_orders: usize, vehicles_available: usize) -> AssignmentSummary {
        let assigned = self.assigned_count();
        let rate = if total_orders > 0 {
            assigned as f64 / total_orders as f64 * 100.0
        } else {
            0.0
        };
        AssignmentSummary {
            total_orders,
            assigned_orders: assigned,
            unassigned_orders: self.unassigned.len(),
            assignment_rate: rate,
            vehicles_used: self.assignments.len(),
            vehicles_available,
        }
    }

    /// Utilization metrics; `None` when nothing was assigned.
    pub fn metrics(
        &self,
        orders: &[Order],
        vehicles: &[Vehicle],
        depot: &Location,
    ) -> Option<AssignmentMetrics> {
        if self.assignments.is_empty() {
            return None;
        }

        let capacity: Load = self
            .assignments
            .iter()
            .map(|a| vehicles[a.vehicle()].capacity())
            .sum();
        let used: Load = self.assignments.iter().map(|a| a.load()).sum();

        let mut priority_distribution = BTreeMap::new();
        for a in &self.assignments {
            for &o in a.orders() {
                *priority_distribution.entry(orders[o].priority()).or_insert(0) += 1;
            }
        }

        let per_vehicle: Vec<f64> = self
            .assignments
            .iter()
            .filter(|a| !a.orders().is_empty())
            .map(|a| {
                let total: f64 = a
                    .orders()
                    .iter()
                    .map(|&o| depot.distance_to(orders[o].location()))
                    .sum();
                total / a.orders().len() as f64
            })
            .collect();

        let utilizations: Vec<f64> = self
            .assignments
            .iter()
            .map(|a| a.load().utilization_of(&vehicles[a.vehicle()].capacity()).0)
            .collect();

        Some(AssignmentMetrics {
            weight_utilization_pct: percent(used.weight, capacity.weight),
            volume_utilization_pct: percent(used.volume, capacity.volume),
            priority_distribution,
            average_delivery_distance_km: mean(&per_vehicle),
            load_balance_score: load_balance_score(&utilizations),
        })
    }
}

/// Balance score from per-vehicle utilizations; 100 is perfectly even.
///
/// Fewer than two vehicles score 100; a zero mean gives a zero CV.
///
/// # Examples
///
/// ```
/// use u_dispatch::assignment::load_balance_score;
///
/// assert_eq!(load_balance_score(&[0.5, 0.5]), 100.0);
/// assert_eq!(load_balance_score(&[0.9]), 100.0);
/// assert!(load_balance_score(&[0.1, 0.9]) < 50.0);
/// ```
pub fn load_balance_score(utilizations: &[f64]) -> f64 {
    if utilizations.len() < 2 {
        return 100.0;
    }
    let m = mean(utilizations);
    let variance = utilizations.iter().map(|u| (u - m).powi(2)).sum::<f64>()
        / utilizations.len() as f64;
    let cv = if m > 0.0 { variance.sqrt() / m } else { 0.0 };
    (100.0 - cv * 100.0).max(0.0)
}

fn percent(used: f64, available: f64) -> f64 {
    if available > 0.0 {
        used / available * 100.0
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
