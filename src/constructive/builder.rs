//! Constrained nearest-feasible-neighbor route construction.
//!
//! # Algorithm
//!
//! Each route runs a small state machine, `AtDepot → Visiting → … →
//! ReturnToDepot`. At every step the builder picks, among the unplaced
//! orders, the nearest one that keeps the cumulative load within capacity
//! and can be reached no later than its window's latest bound. When nothing
//! qualifies the route closes and a new one starts from the depot with the
//! remaining orders.
//!
//! Orders too heavy for the vehicle are flagged before construction. Orders
//! that not even a fresh route can reach in time are flagged when a new
//! route cannot take a single order. Neither is ever dropped silently.
//!
//! # Complexity
//!
//! O(n²) where n = number of orders.
//!
//! # Reference
//!
//! Solomon, M.M. (1987). "Algorithms for the Vehicle Routing and Scheduling
//! Problems with Time Window Constraints", *Operations Research* 35(2), 254-265.

use rand::Rng;
use tracing::{debug, warn};

use crate::config::CostModel;
use crate::distance::DistanceMatrix;
use crate::error::{DispatchError, InfeasibleOrder, InfeasibleReason};
use crate::models::{order_index, Load, Order, Route, DEPOT};

use super::pool::OrderPool;

/// Position of the route under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Route opened; vehicle still at the depot.
    AtDepot,
    /// Vehicle has just served `stop`.
    Visiting {
        /// Last served stop.
        stop: usize,
    },
    /// No further stop qualifies; the route is closed.
    ReturnToDepot,
}

/// Decides between candidates at (nearly) equal distance.
///
/// Candidates within `tolerance` (relative) of the nearest distance are
/// tied; the one with the lowest rank wins.
#[derive(Debug, Clone)]
pub struct TieBreak {
    rank: Vec<usize>,
    tolerance: f64,
}

impl TieBreak {
    /// Exact ties only, lowest stop index wins.
    pub fn lowest_index(n_stops: usize) -> Self {
        Self {
            rank: (0..n_stops).collect(),
            tolerance: 0.0,
        }
    }

    /// Random ranks, with near-ties inside `tolerance` treated as ties.
    pub fn shuffled<R: Rng>(n_stops: usize, tolerance: f64, rng: &mut R) -> Self {
        let mut rank: Vec<usize> = (0..n_stops).collect();
        for i in (1..rank.len()).rev() {
            let j = rng.random_range(0..=i);
            rank.swap(i, j);
        }
        Self { rank, tolerance }
    }

    fn pick(&self, candidates: &[(usize, f64)]) -> Option<usize> {
        let nearest = candidates
            .iter()
            .map(|&(_, d)| d)
            .min_by(|a, b| a.total_cmp(b))?;
        let limit = nearest * (1.0 + self.tolerance);
        candidates
            .iter()
            .filter(|&&(_, d)| d <= limit)
            .min_by_key(|&&(s, _)| self.rank[s])
            .map(|&(s, _)| s)
    }
}

/// Routes and flagged orders produced by one construction pass.
#[derive(Debug, Clone, Default)]
pub struct Construction {
    /// Feasible routes, each bookended by the depot.
    pub routes: Vec<Route>,
    /// Orders no route could take.
    pub unassignable: Vec<InfeasibleOrder>,
}

/// Builds feasible routes under a single vehicle capacity and the orders'
/// time windows.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::CostModel;
/// use u_dispatch::constructive::RouteBuilder;
/// use u_dispatch::distance::DistanceMatrix;
/// use u_dispatch::models::{Load, Location, Order, TimeWindow};
///
/// let depot = Location::new(0.0, 0.0);
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let orders = vec![
///     Order::new("A", Location::new(0.0, 0.01), Load::weight(10.0)).with_time_window(tw),
///     Order::new("B", Location::new(0.0, 0.02), Load::weight(45.0)).with_time_window(tw),
/// ];
/// let dm = DistanceMatrix::build(&depot, &orders);
/// let model = CostModel::new(2.0, 10.0).unwrap();
///
/// let builder = RouteBuilder::new(&orders, &dm, model, Load::weight(60.0)).unwrap();
/// let result = builder.build();
/// assert_eq!(result.routes.len(), 1);
/// assert_eq!(result.routes[0].stops(), &[0, 1, 2, 0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteBuilder<'a> {
    orders: &'a [Order],
    distances: &'a DistanceMatrix,
    model: CostModel,
    capacity: Load,
}

impl<'a> RouteBuilder<'a> {
    /// Creates a builder.
    ///
    /// Fails with [`DispatchError::StaleState`] if `distances` was not built
    /// for `orders`.
    pub fn new(
        orders: &'a [Order],
        distances: &'a DistanceMatrix,
        model: CostModel,
        capacity: Load,
    ) -> Result<Self, DispatchError> {
        distances.ensure_covers(orders)?;
        Ok(Self {
            orders,
            distances,
            model,
            capacity,
        })
    }

    /// Vehicle capacity every route must respect.
    pub fn capacity(&self) -> Load {
        self.capacity
    }

    /// Deterministic construction over all orders; exact ties go to the
    /// lowest order index.
    pub fn build(&self) -> Construction {
        let tie = TieBreak::lowest_index(self.orders.len() + 1);
        self.build_from(OrderPool::all(self.orders.len()), &tie)
    }

    /// Construction over all orders with randomized tie-breaking.
    pub fn build_randomized<R: Rng>(&self, tolerance: f64, rng: &mut R) -> Construction {
        let tie = TieBreak::shuffled(self.orders.len() + 1, tolerance, rng);
        self.build_from(OrderPool::all(self.orders.len()), &tie)
    }

    /// Builds routes until the pool is exhausted or proven unservable.
    pub fn build_from(&self, pool: OrderPool, tie: &TieBreak) -> Construction {
        let mut result = Construction::default();

        let (fits, too_heavy): (Vec<usize>, Vec<usize>) = pool
            .into_stops()
            .into_iter()
            .partition(|&s| self.order(s).load().fits_within(&self.capacity));
        result.unassignable.extend(
            too_heavy
                .into_iter()
                .map(|s| InfeasibleOrder::new(order_index(s), InfeasibleReason::ExceedsCapacity)),
        );

        let mut pool = OrderPool::new(fits);
        while !pool.is_empty() {
            let (route, rest) = self.build_route(pool, tie);
            if route.is_empty() {
                // A fresh route from the depot reaches none of these in time.
                result.unassignable.extend(rest.into_stops().into_iter().map(|s| {
                    InfeasibleOrder::new(order_index(s), InfeasibleReason::TimeWindowUnreachable)
                }));
                break;
            }
            result.routes.push(route);
            pool = rest;
        }

        if !result.unassignable.is_empty() {
            warn!(
                count = result.unassignable.len(),
                "orders could not be placed on any route"
            );
        }
        debug!(routes = result.routes.len(), "construction finished");
        result
    }

    /// Runs one route's state machine, returning the route and the pool
    /// without the stops it took.
    pub fn build_route(&self, mut pool: OrderPool, tie: &TieBreak) -> (Route, OrderPool) {
        let mut route = Route::empty();
        let mut state = BuildState::AtDepot;
        let mut clock = 0.0;
        let mut load = Load::zero();

        loop {
            let current = match state {
                BuildState::AtDepot => DEPOT,
                BuildState::Visiting { stop } => stop,
                BuildState::ReturnToDepot => break,
            };
            state = match self.next_stop(&pool, current, clock, load, tie) {
                Some(next) => {
                    clock = self.depart_after(current, next, clock);
                    load += self.order(next).load();
                    route.push(next);
                    pool = pool.without(next);
                    BuildState::Visiting { stop: next }
                }
                None => BuildState::ReturnToDepot,
            };
        }

        (route, pool)
    }

    /// Nearest stop in `pool` that fits the remaining capacity and can be
    /// reached from `current` by its latest bound.
    pub fn next_stop(
        &self,
        pool: &OrderPool,
        current: usize,
        clock: f64,
        load: Load,
        tie: &TieBreak,
    ) -> Option<usize> {
        let candidates: Vec<(usize, f64)> = pool
            .as_slice()
            .iter()
            .copied()
            .filter(|&s| self.is_feasible_next(current, s, clock, load))
            .map(|s| (s, self.distances.get(current, s)))
            .collect();
        tie.pick(&candidates)
    }

    /// Returns `true` if `next` fits `load` and is reached in time from
    /// `current` leaving at `clock`.
    pub fn is_feasible_next(&self, current: usize, next: usize, clock: f64, load: Load) -> bool {
        let order = self.order(next);
        if !(load + order.load()).fits_within(&self.capacity) {
            return false;
        }
        let arrival = clock + self.model.travel_minutes(self.distances.get(current, next));
        !order.time_window().is_violated(arrival)
    }

    /// Clock and load after serving the last stop of `route`.
    pub fn tail_state(&self, route: &Route) -> (usize, f64, Load) {
        let mut clock = 0.0;
        let mut load = Load::zero();
        let mut current = DEPOT;
        for &s in route.customers() {
            clock = self.depart_after(current, s, clock);
            load += self.order(s).load();
            current = s;
        }
        (current, clock, load)
    }

    /// Departure time from `next` when leaving `current` at `clock`.
    fn depart_after(&self, current: usize, next: usize, clock: f64) -> f64 {
        let order = self.order(next);
        let arrival = clock + self.model.travel_minutes(self.distances.get(current, next));
        arrival + order.time_window().waiting_time(arrival) + order.service_minutes()
    }

    fn order(&self, stop: usize) -> &Order {
        &self.orders[order_index(stop)]
    }

    /// The distance matrix in use.
    pub fn distances(&self) -> &'a DistanceMatrix {
        self.distances
    }

    /// The orders being routed.
    pub fn orders(&self) -> &'a [Order] {
        self.orders
    }
}
