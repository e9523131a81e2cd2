//! Greedy geographic clustering of orders.
//!
//! # Algorithm
//!
//! While orders remain: seed a cluster with the unclustered order nearest
//! the depot, then repeatedly add the unclustered order nearest the
//! cluster's current centroid. Growth stops when the cluster is full or the
//! nearest candidate lies beyond the radius. The centroid is recomputed
//! after every addition.
//!
//! Ties go to the order that comes first in the candidate sequence, so a
//! caller that pre-sorts by urgency gets urgent orders seeded first.
//!
//! # Complexity
//!
//! O(n² · s) where n = orders and s = maximum cluster size.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ClusterConfig;
use crate::error::DispatchError;
use crate::models::{Location, Order};

/// A group of geographically close orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    id: usize,
    members: Vec<usize>,
    centroid: Location,
}

impl Cluster {
    /// Creation index, starting at 0.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Member order indices, in the order they joined.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Mean location of the members.
    pub fn centroid(&self) -> &Location {
        &self.centroid
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the cluster has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Display label, `CLUSTER_<n>` with n starting at 1.
    pub fn label(&self) -> String {
        format!("CLUSTER_{}", self.id + 1)
    }
}

/// Partitions orders into size- and radius-bounded clusters.
///
/// # Examples
///
/// ```
/// use u_dispatch::cluster::GeographicClusterer;
/// use u_dispatch::config::ClusterConfig;
/// use u_dispatch::models::{Load, Location, Order};
///
/// let depot = Location::new(0.0, 0.0);
/// let orders = vec![
///     Order::new("A", Location::new(0.0, 0.001), Load::weight(1.0)),
///     Order::new("B", Location::new(0.0, 0.002), Load::weight(1.0)),
///     Order::new("C", Location::new(0.001, 0.0), Load::weight(1.0)),
/// ];
///
/// let clusterer = GeographicClusterer::new(ClusterConfig::default()).unwrap();
/// let clusters = clusterer.cluster(&depot, &orders);
/// assert_eq!(clusters.len(), 1);
/// assert_eq!(clusters[0].len(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GeographicClusterer {
    config: ClusterConfig,
}

impl GeographicClusterer {
    /// Creates a clusterer; fails on an invalid config.
    pub fn new(config: ClusterConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The bounds in use.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Clusters every order, considering them in slice order.
    pub fn cluster(&self, depot: &Location, orders: &[Order]) -> Vec<Cluster> {
        let all: Vec<usize> = (0..orders.len()).collect();
        self.cluster_subset(depot, orders, &all)
    }

    /// Clusters the orders named by `candidates`, in that sequence.
    ///
    /// Duplicate indices are ignored after their first appearance.
    pub fn cluster_subset(
        &self,
        depot: &Location,
        orders: &[Order],
        candidates: &[usize],
    ) -> Vec<Cluster> {
        let mut remaining: Vec<usize> = Vec::with_capacity(candidates.len());
        for &c in candidates {
            if !remaining.contains(&c) {
                remaining.push(c);
            }
        }

        let mut clusters = Vec::new();
        while let Some(seed_pos) = nearest(&remaining, orders, depot) {
            let seed = remaining.remove(seed_pos);
            let mut members = vec![seed];
            let mut centroid = *orders[seed].location();

            while members.len() < self.config.max_cluster_size {
                let Some(pos) = nearest(&remaining, orders, &centroid) else {
                    break;
                };
                let d = centroid.distance_to(orders[remaining[pos]].location());
                if d > self.config.max_radius_km {
                    break;
                }
                members.push(remaining.remove(pos));
                centroid = Location::centroid(members.iter().map(|&m| orders[m].location()))
                    .unwrap_or(centroid);
            }

            debug!(
                cluster = clusters.len(),
                size = members.len(),
                lat = centroid.lat(),
                lng = centroid.lng(),
                "cluster formed"
            );
            clusters.push(Cluster {
                id: clusters.len(),
                members,
                centroid,
            });
        }

        info!(
            orders = candidates.len(),
            clusters = clusters.len(),
            "clustering finished"
        );
        clusters
    }
}

/// Position in `remaining` of the order nearest `from`; first wins on ties.
fn nearest(remaining: &[usize], orders: &[Order], from: &Location) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (pos, &o) in remaining.iter().enumerate() {
        let d = from.distance_to(orders[o].location());
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((pos, d));
        }
    }
    best.map(|(pos, _)| pos)
}
