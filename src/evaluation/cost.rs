//! Soft-constraint route cost: travel distance plus lateness penalty.

use serde::Serialize;

use crate::config::CostModel;
use crate::distance::DistanceMatrix;
use crate::error::DispatchError;
use crate::models::{order_index, Order, Route, DEPOT};

/// Cost components of a single route.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RouteCost {
    /// Total travel distance in km, including the return leg.
    pub distance_km: f64,
    /// Sum of minutes arrived past each stop's latest bound.
    pub lateness_minutes: f64,
    /// `lateness_minutes` times the penalty coefficient.
    pub penalty: f64,
    /// Minutes from leaving the depot to returning to it.
    pub duration_minutes: f64,
}

impl RouteCost {
    /// Distance plus penalty.
    pub fn total(&self) -> f64 {
        self.distance_km + self.penalty
    }
}

/// Scores routes by distance plus a per-minute lateness penalty.
///
/// Arriving before a window opens costs nothing but advances the clock to
/// the opening. Arriving after it closes adds a penalty proportional to the
/// delay. Lateness never invalidates a route, so every route gets a finite,
/// comparable cost.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::CostModel;
/// use u_dispatch::distance::DistanceMatrix;
/// use u_dispatch::evaluation::RouteCostEvaluator;
/// use u_dispatch::models::{Load, Location, Order, Route, TimeWindow};
///
/// let depot = Location::new(0.0, 0.0);
/// let orders = vec![
///     Order::new("A", Location::new(0.0, 0.01), Load::weight(10.0))
///         .with_time_window(TimeWindow::new(0.0, 100.0).unwrap()),
/// ];
/// let dm = DistanceMatrix::build(&depot, &orders);
/// let model = CostModel::new(2.0, 10.0).unwrap();
/// let eval = RouteCostEvaluator::new(&orders, &dm, model).unwrap();
///
/// let cost = eval.cost(&Route::new(vec![1]));
/// assert!((cost - 2.0 * dm.get(0, 1)).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteCostEvaluator<'a> {
    orders: &'a [Order],
    distances: &'a DistanceMatrix,
    model: CostModel,
}

impl<'a> RouteCostEvaluator<'a> {
    /// Creates an evaluator.
    ///
    /// Fails with [`DispatchError::StaleState`] if `distances` was not built
    /// for `orders`.
    pub fn new(
        orders: &'a [Order],
        distances: &'a DistanceMatrix,
        model: CostModel,
    ) -> Result<Self, DispatchError> {
        distances.ensure_covers(orders)?;
        Ok(Self {
            orders,
            distances,
            model,
        })
    }

    /// The orders being evaluated against.
    pub fn orders(&self) -> &'a [Order] {
        self.orders
    }

    /// The distance matrix in use.
    pub fn distances(&self) -> &'a DistanceMatrix {
        self.distances
    }

    /// The cost model in use.
    pub fn model(&self) -> &CostModel {
        &self.model
    }

    /// Computes every cost component of `route`.
    pub fn breakdown(&self, route: &Route) -> RouteCost {
        let mut result = RouteCost::default();
        let mut clock = 0.0;

        for leg in route.stops().windows(2) {
            let (from, to) = (leg[0], leg[1]);
            let km = self.distances.get(from, to);
            result.distance_km += km;
            clock += self.model.travel_minutes(km);

            if to == DEPOT {
                continue;
            }
            let order = &self.orders[order_index(to)];
            let tw = order.time_window();
            result.lateness_minutes += tw.lateness(clock);
            clock += tw.waiting_time(clock) + order.service_minutes();
        }

        result.penalty = result.lateness_minutes * self.model.lateness_penalty_per_minute();
        result.duration_minutes = clock;
        result
    }

    /// Distance plus lateness penalty for one route.
    pub fn cost(&self, route: &Route) -> f64 {
        self.breakdown(route).total()
    }

    /// Summed cost over a route set.
    pub fn total_cost(&self, routes: &[Route]) -> f64 {
        routes.iter().map(|r| self.cost(r)).sum()
    }
}
