//! Priority-based delivery sequencing and loading-zone placement.
//!
//! # Algorithm
//!
//! A vehicle's orders are stable-sorted by, most significant first:
//!
//! 1. priority tier, most urgent first
//! 2. latest window bound, earliest first
//! 3. bulk (weight + volume / 1000), heaviest first
//! 4. number of special-handling flags, fewest first
//! 5. distance from the depot, nearest first
//!
//! The result is the delivery sequence. Zones follow from position alone:
//! with n orders, positions `i < n/3` go to the back, `i < 2n/3` to the
//! middle, the rest to the front (integer division).

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{Load, Location, Order, PackageSize, Vehicle};

use super::handling::{order_handling_summary, package_notes, HandlingNote};

/// Position in the cargo area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LoadingZone {
    /// Furthest from the door.
    Back,
    /// Between back and front.
    Middle,
    /// Nearest the door.
    Front,
}

impl LoadingZone {
    /// Zone for 0-based `position` in a sequence of `total` orders.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_dispatch::loading::LoadingZone;
    ///
    /// let zones: Vec<_> = (0..6).map(|i| LoadingZone::for_position(i, 6)).collect();
    /// assert_eq!(zones[0], LoadingZone::Back);
    /// assert_eq!(zones[2], LoadingZone::Middle);
    /// assert_eq!(zones[5], LoadingZone::Front);
    /// ```
    pub fn for_position(position: usize, total: usize) -> Self {
        if position >= total * 2 / 3 {
            LoadingZone::Front
        } else if position >= total / 3 {
            LoadingZone::Middle
        } else {
            LoadingZone::Back
        }
    }

    /// Upper-case display name.
    pub fn name(&self) -> &'static str {
        match self {
            LoadingZone::Back => "BACK",
            LoadingZone::Middle => "MIDDLE",
            LoadingZone::Front => "FRONT",
        }
    }
}

/// Loader instructions for one package.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageInstruction {
    /// `<order id>_<package id>`.
    pub label: String,
    /// Weight in kg.
    pub weight_kg: f64,
    /// Dimensions in cm.
    pub dimensions_cm: [f64; 3],
    /// Size category.
    pub size: PackageSize,
    /// Handling notes.
    pub notes: Vec<HandlingNote>,
}

/// One order's place in a loading plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingEntry {
    /// 1-based delivery position.
    pub sequence: usize,
    /// Order index.
    pub order: usize,
    /// Cargo zone.
    pub zone: LoadingZone,
    /// Load on board up to and including this order.
    pub cumulative: Load,
    /// Per-package instructions.
    pub packages: Vec<PackageInstruction>,
}

/// Sequenced loading plan for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingPlan {
    /// Vehicle index in the fleet slice.
    pub vehicle: usize,
    /// Entries in delivery order.
    pub entries: Vec<LoadingEntry>,
    /// Combined load.
    pub total: Load,
    /// Weight and volume utilization, percent.
    pub utilization_pct: (f64, f64),
    /// `Order <id>: <summary>` lines for orders needing special handling.
    pub special_instructions: Vec<String>,
}

impl LoadingPlan {
    /// Order indices in delivery order.
    pub fn sequence(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.order).collect()
    }

    /// Orders grouped by zone, back to front.
    pub fn zones(&self) -> Vec<(LoadingZone, Vec<usize>)> {
        [LoadingZone::Back, LoadingZone::Middle, LoadingZone::Front]
            .into_iter()
            .map(|zone| {
                let members = self
                    .entries
                    .iter()
                    .filter(|e| e.zone == zone)
                    .map(|e| e.order)
                    .collect();
                (zone, members)
            })
            .collect()
    }
}

/// Orders a vehicle's deliveries and assigns loading zones.
///
/// # Examples
///
/// ```
/// use u_dispatch::loading::LoadSequencer;
/// use u_dispatch::models::{Load, Location, Order, Priority};
///
/// let depot = Location::new(0.0, 0.0);
/// let orders = vec![
///     Order::new("slow", Location::new(0.0, 0.01), Load::weight(5.0)).with_priority(Priority::Low),
///     Order::new("rush", Location::new(0.0, 0.02), Load::weight(5.0)).with_priority(Priority::Urgent),
/// ];
///
/// let sequencer = LoadSequencer::new(depot);
/// assert_eq!(sequencer.sequence(&orders, &[0, 1]), vec![1, 0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoadSequencer {
    depot: Location,
}

impl LoadSequencer {
    /// Creates a sequencer for a depot.
    pub fn new(depot: Location) -> Self {
        Self { depot }
    }

    /// Compares two orders by the delivery sequence key.
    pub fn compare(&self, a: &Order, b: &Order) -> Ordering {
        a.priority()
            .cmp(&b.priority())
            .then_with(|| a.time_window().latest().total_cmp(&b.time_window().latest()))
            .then_with(|| b.load().bulk().total_cmp(&a.load().bulk()))
            .then_with(|| a.handling_count().cmp(&b.handling_count()))
            .then_with(|| {
                self.depot
                    .distance_to(a.location())
                    .total_cmp(&self.depot.distance_to(b.location()))
            })
    }

    /// Sorts `members` (order indices) into delivery sequence.
    pub fn sequence(&self, orders: &[Order], members: &[usize]) -> Vec<usize> {
        let mut seq = members.to_vec();
        seq.sort_by(|&a, &b| self.compare(&orders[a], &orders[b]));
        seq
    }

    /// Builds the loading plan for `members` on a vehicle.
    pub fn plan(
        &self,
        vehicle_index: usize,
        vehicle: &Vehicle,
        orders: &[Order],
        members: &[usize],
    ) -> LoadingPlan {
        let seq = self.sequence(orders, members);
        let total_orders = seq.len();
        let mut cumulative = Load::zero();
        let mut entries = Vec::with_capacity(total_orders);
        let mut special_instructions = Vec::new();

        for (i, &o) in seq.iter().enumerate() {
            let order = &orders[o];
            cumulative += order.load();
            let packages = order
                .packages()
                .iter()
                .map(|p| PackageInstruction {
                    label: format!("{}_{}", order.id(), p.id()),
                    weight_kg: p.weight_kg(),
                    dimensions_cm: p.dimensions_cm(),
                    size: p.size_category(),
                    notes: package_notes(p),
                })
                .collect();
            entries.push(LoadingEntry {
                sequence: i + 1,
                order: o,
                zone: LoadingZone::for_position(i, total_orders),
                cumulative,
                packages,
            });
            if let Some(summary) = order_handling_summary(order) {
                special_instructions.push(format!("Order {}: {}", order.id(), summary));
            }
        }

        let (w, v) = cumulative.utilization_of(&vehicle.capacity());
        LoadingPlan {
            vehicle: vehicle_index,
            entries,
            total: cumulative,
            utilization_pct: (w * 100.0, v * 100.0),
            special_instructions,
        }
    }
}
