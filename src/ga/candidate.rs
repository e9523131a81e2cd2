//! Route-set individual for the population search.

use u_metaheur::ga::Individual;

use crate::evaluation::RouteCostEvaluator;
use crate::models::Route;

/// A candidate solution: a set of routes covering each placeable order
/// exactly once.
///
/// The [`Individual`] fitness is the total route cost, so lower is better
/// and an unevaluated candidate sits at `f64::INFINITY`.
/// [`score`](Self::score) gives the bounded form `1 / (1 + cost)`.
///
/// # Examples
///
/// ```
/// use u_dispatch::ga::RouteSet;
/// use u_dispatch::models::Route;
/// use u_metaheur::ga::Individual;
///
/// let mut set = RouteSet::new(vec![Route::new(vec![1, 2]), Route::new(vec![3])]);
/// assert_eq!(set.num_stops(), 3);
/// assert_eq!(set.fitness(), f64::INFINITY);
/// assert_eq!(set.score(), 0.0);
///
/// set.set_fitness(3.0);
/// assert_eq!(set.cost(), 3.0);
/// assert_eq!(set.score(), 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSet {
    routes: Vec<Route>,
    cost: f64,
}

impl RouteSet {
    /// Creates an unevaluated candidate; empty routes are dropped.
    pub fn new(mut routes: Vec<Route>) -> Self {
        routes.retain(|r| !r.is_empty());
        Self {
            routes,
            cost: f64::INFINITY,
        }
    }

    /// The routes.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Mutable routes.
    pub fn routes_mut(&mut self) -> &mut Vec<Route> {
        &mut self.routes
    }

    /// Consumes the candidate, returning its routes.
    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }

    /// Number of non-empty routes.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of customer stops across all routes.
    pub fn num_stops(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    /// Total cost from the last evaluation (infinity if never evaluated).
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// `1 / (1 + cost)`: in `(0, 1]` once evaluated, 0 before.
    pub fn score(&self) -> f64 {
        if self.cost.is_finite() {
            1.0 / (1.0 + self.cost)
        } else {
            0.0
        }
    }

    /// Scores the candidate against `evaluator` and stores the cost.
    pub fn evaluate(&mut self, evaluator: &RouteCostEvaluator<'_>) -> f64 {
        self.cost = evaluator.total_cost(&self.routes);
        self.cost
    }
}

impl Individual for RouteSet {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.cost
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.cost = fitness;
    }
}
