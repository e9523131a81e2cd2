//! Repair pass that restores exactly-once coverage and capacity.
//!
//! Recombination splices whole routes from two parents, so a child may
//! visit some orders twice and miss others entirely. Repair runs in three
//! stages:
//!
//! 1. **Deduplicate** — an order keeps its first occurrence in route order;
//!    later copies are removed. Removal only lowers a route's load.
//! 2. **Evict overflow** — any stop that pushes a route prefix past capacity
//!    is removed and treated as dropped.
//! 3. **Reinsert** — dropped orders are appended to the route tail they are
//!    nearest to, among tails where they still fit and arrive in time.
//!    Whatever is left is routed from the depot by the constructive builder.

use crate::constructive::{OrderPool, RouteBuilder, TieBreak};
use crate::models::{order_index, Load, Route};

use super::candidate::RouteSet;

/// What a repair pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairReport {
    /// Duplicate stops removed.
    pub duplicates_removed: usize,
    /// Stops evicted because their route exceeded capacity.
    pub overflow_evicted: usize,
    /// Missing stops appended to existing routes.
    pub reinserted: usize,
    /// Routes opened for stops no existing route could take.
    pub new_routes: usize,
}

impl RepairReport {
    /// Returns `true` if the candidate was already valid.
    pub fn is_clean(&self) -> bool {
        *self == RepairReport::default()
    }
}

/// Repairs `child` so it visits every stop in `expected` exactly once
/// within capacity.
///
/// Stops outside `expected` are removed as if they were duplicates.
pub fn repair(child: RouteSet, builder: &RouteBuilder<'_>, expected: &[usize]) -> (RouteSet, RepairReport) {
    let n_stops = builder.orders().len() + 1;
    let mut wanted = vec![false; n_stops];
    for &s in expected {
        wanted[s] = true;
    }

    let mut report = RepairReport::default();
    let mut placed = vec![false; n_stops];
    let mut routes: Vec<Route> = Vec::with_capacity(child.num_routes());

    for route in child.into_routes() {
        let before = route.len();
        let mut kept = Vec::with_capacity(before);
        for &s in route.customers() {
            if s < n_stops && wanted[s] && !placed[s] {
                placed[s] = true;
                kept.push(s);
            }
        }
        report.duplicates_removed += before - kept.len();

        let (kept, evicted) = split_overflow(kept, builder);
        for &s in &evicted {
            placed[s] = false;
        }
        report.overflow_evicted += evicted.len();

        if !kept.is_empty() {
            routes.push(Route::new(kept));
        }
    }

    let missing: Vec<usize> = expected.iter().copied().filter(|&s| !placed[s]).collect();
    let remaining = reinsert(&mut routes, OrderPool::new(missing), builder, &mut report);

    if !remaining.is_empty() {
        let tie = TieBreak::lowest_index(n_stops);
        let fresh = builder.build_from(remaining, &tie);
        report.new_routes += fresh.routes.len();
        routes.extend(fresh.routes);
    }

    (RouteSet::new(routes), report)
}

/// Splits a stop sequence into the part that fits capacity (prefix-wise)
/// and the stops that had to be evicted.
fn split_overflow(stops: Vec<usize>, builder: &RouteBuilder<'_>) -> (Vec<usize>, Vec<usize>) {
    let capacity = builder.capacity();
    let mut load = Load::zero();
    let mut kept = Vec::with_capacity(stops.len());
    let mut evicted = Vec::new();
    for s in stops {
        let next = load + builder.orders()[order_index(s)].load();
        if next.fits_within(&capacity) {
            load = next;
            kept.push(s);
        } else {
            evicted.push(s);
        }
    }
    (kept, evicted)
}

/// Appends pool stops to their nearest feasible route tails until none
/// fits; returns the stops still unplaced.
fn reinsert(
    routes: &mut [Route],
    mut pool: OrderPool,
    builder: &RouteBuilder<'_>,
    report: &mut RepairReport,
) -> OrderPool {
    let distances = builder.distances();
    let mut tails: Vec<_> = routes.iter().map(|r| builder.tail_state(r)).collect();

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for (ri, &(last, clock, load)) in tails.iter().enumerate() {
            for &s in pool.as_slice() {
                if !builder.is_feasible_next(last, s, clock, load) {
                    continue;
                }
                let d = distances.get(last, s);
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((ri, s, d));
                }
            }
        }

        let Some((ri, s, _)) = best else {
            return pool;
        };
        routes[ri].push(s);
        tails[ri] = builder.tail_state(&routes[ri]);
        pool = pool.without(s);
        report.reinserted += 1;
    }
}
