//! GA problem definition for dispatch routing.
//!
//! Implements the [`GaProblem`](u_metaheur::ga::GaProblem) trait directly on
//! route sets, so every individual is a feasible plan at all times.
//!
//! # Operators
//!
//! - **Initialization**: the first individual is the deterministic
//!   nearest-feasible construction; the rest use randomized near-tie breaking
//! - **Crossover**: route-level uniform crossover followed by
//!   [`repair`](super::repair::repair) and validation
//! - **Mutation**: swap two stops inside one route
//! - **Evaluation**: total route cost (distance + lateness penalty)

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::Rng;
use tracing::debug;
use u_metaheur::ga::GaProblem;

use crate::constructive::RouteBuilder;
use crate::error::{DispatchError, InfeasibleOrder};
use crate::evaluation::{validate_routes, RouteCostEvaluator};

use super::candidate::RouteSet;
use super::operators::{recombine, swap_mutate};
use super::repair::repair;

/// GA problem over route sets for one vehicle capacity.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::CostModel;
/// use u_dispatch::constructive::RouteBuilder;
/// use u_dispatch::distance::DistanceMatrix;
/// use u_dispatch::evaluation::RouteCostEvaluator;
/// use u_dispatch::ga::DispatchGaProblem;
/// use u_dispatch::models::{Load, Location, Order};
/// use u_metaheur::ga::{GaConfig, GaRunner};
///
/// let depot = Location::new(0.0, 0.0);
/// let orders: Vec<Order> = (1..=4)
///     .map(|i| Order::new(format!("o{i}"), Location::new(0.01 * i as f64, 0.0), Load::weight(10.0)))
///     .collect();
/// let dm = DistanceMatrix::build(&depot, &orders);
/// let model = CostModel::new(2.0, 10.0).unwrap();
///
/// let builder = RouteBuilder::new(&orders, &dm, model, Load::weight(30.0)).unwrap();
/// let evaluator = RouteCostEvaluator::new(&orders, &dm, model).unwrap();
/// let problem = DispatchGaProblem::new(builder, evaluator, 0.05).unwrap();
///
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_max_generations(10)
///     .with_parallel(false)
///     .with_seed(1);
/// let result = GaRunner::run(&problem, &config).unwrap();
/// assert_eq!(result.best.num_stops(), 4);
/// assert!(result.best_fitness < f64::INFINITY);
/// ```
#[derive(Debug)]
pub struct DispatchGaProblem<'a> {
    builder: RouteBuilder<'a>,
    evaluator: RouteCostEvaluator<'a>,
    tie_tolerance: f64,
    baseline: RouteSet,
    expected: Vec<usize>,
    unassignable: Vec<InfeasibleOrder>,
    baseline_issued: AtomicBool,
    rejected: AtomicUsize,
}

impl<'a> DispatchGaProblem<'a> {
    /// Creates the problem and runs the deterministic construction once.
    ///
    /// Fails with [`DispatchError::StaleState`] if builder and evaluator
    /// were set up over different orders or distance matrices.
    pub fn new(
        builder: RouteBuilder<'a>,
        evaluator: RouteCostEvaluator<'a>,
        tie_tolerance: f64,
    ) -> Result<Self, DispatchError> {
        let same_orders = std::ptr::eq(builder.orders(), evaluator.orders());
        let same_matrix = std::ptr::eq(builder.distances(), evaluator.distances());
        if !same_orders || !same_matrix {
            return Err(DispatchError::StaleState {
                what: "builder and evaluator disagree on orders or distances",
            });
        }

        let base = builder.build();
        let mut expected: Vec<usize> = base
            .routes
            .iter()
            .flat_map(|r| r.customers().iter().copied())
            .collect();
        expected.sort_unstable();

        Ok(Self {
            builder,
            evaluator,
            tie_tolerance,
            baseline: RouteSet::new(base.routes),
            expected,
            unassignable: base.unassignable,
            baseline_issued: AtomicBool::new(false),
            rejected: AtomicUsize::new(0),
        })
    }

    /// Stops every individual must cover, ascending.
    pub fn expected_stops(&self) -> &[usize] {
        &self.expected
    }

    /// Orders the construction could not place on any route.
    pub fn unassignable(&self) -> &[InfeasibleOrder] {
        &self.unassignable
    }

    /// The deterministic construction.
    pub fn baseline(&self) -> &RouteSet {
        &self.baseline
    }

    /// Children replaced by a parent copy because repair left violations.
    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Re-arms the problem for another run: the next individual created is
    /// the baseline again and the rejection count restarts at zero.
    pub fn reset(&mut self) {
        *self.baseline_issued.get_mut() = false;
        *self.rejected.get_mut() = 0;
    }
}

impl GaProblem for DispatchGaProblem<'_> {
    type Individual = RouteSet;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> RouteSet {
        if !self.baseline_issued.swap(true, Ordering::Relaxed) {
            return self.baseline.clone();
        }
        let c = self.builder.build_randomized(self.tie_tolerance, rng);
        RouteSet::new(c.routes)
    }

    fn evaluate(&self, individual: &RouteSet) -> f64 {
        self.evaluator.total_cost(individual.routes())
    }

    fn crossover<R: Rng>(&self, parent1: &RouteSet, parent2: &RouteSet, rng: &mut R) -> Vec<RouteSet> {
        let (child, report) = repair(recombine(parent1, parent2, rng), &self.builder, &self.expected);
        if !report.is_clean() {
            debug!(?report, "child repaired");
        }

        let violations = validate_routes(
            child.routes(),
            self.builder.orders(),
            &self.builder.capacity(),
            &self.expected,
        );
        debug_assert!(violations.is_empty(), "repair left violations: {:?}", violations);
        if violations.is_empty() {
            vec![child]
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            vec![RouteSet::new(parent1.routes().to_vec())]
        }
    }

    fn mutate<R: Rng>(&self, individual: &mut RouteSet, rng: &mut R) {
        swap_mutate(individual, rng);
    }

    fn on_generation(&self, generation: usize, best_fitness: f64) {
        debug!(generation, best_cost = best_fitness, "generation complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CostModel;
    use crate::distance::DistanceMatrix;
    use crate::models::{Load, Location, Order, Route};
    use u_metaheur::ga::Individual;
    use u_numflow::random::create_rng;

    fn setup() -> (Vec<Order>, DistanceMatrix) {
        let depot = Location::new(0.0, 0.0);
        let orders: Vec<Order> = (0..6)
            .map(|i| {
                let lat = 0.01 * ((i * 3) % 5) as f64;
                let lng = 0.01 * ((i * 2) % 7) as f64 - 0.02;
                Order::new(format!("o{}", i), Location::new(lat, lng), Load::weight(10.0))
            })
            .collect();
        let dm = DistanceMatrix::build(&depot, &orders);
        (orders, dm)
    }

    fn model() -> CostModel {
        CostModel::new(2.0, 10.0).expect("valid")
    }

    #[test]
    fn test_first_individual_is_baseline() {
        let (orders, dm) = setup();
        let builder = RouteBuilder::new(&orders, &dm, model(), Load::weight(30.0)).expect("fresh");
        let eval = RouteCostEvaluator::new(&orders, &dm, model()).expect("fresh");
        let mut problem = DispatchGaProblem::new(builder, eval, 0.05).expect("matching");
        let mut rng = create_rng(42);

        let first = problem.create_individual(&mut rng);
        assert_eq!(first.routes(), builder.build().routes.as_slice());
        let second = problem.create_individual(&mut rng);
        assert_eq!(second.num_stops(), 6);

        problem.reset();
        assert_eq!(problem.create_individual(&mut rng), *problem.baseline());
    }

    #[test]
    fn test_evaluate_returns_cost() {
        let (orders, dm) = setup();
        let builder = RouteBuilder::new(&orders, &dm, model(), Load::weight(30.0)).expect("fresh");
        let eval = RouteCostEvaluator::new(&orders, &dm, model()).expect("fresh");
        let problem = DispatchGaProblem::new(builder, eval, 0.05).expect("matching");
        let cost = problem.evaluate(problem.baseline());
        assert!((cost - eval.total_cost(problem.baseline().routes())).abs() < 1e-12);
    }

    #[test]
    fn test_crossover_children_valid() {
        let (orders, dm) = setup();
        let cap = Load::weight(30.0);
        let builder = RouteBuilder::new(&orders, &dm, model(), cap).expect("fresh");
        let eval = RouteCostEvaluator::new(&orders, &dm, model()).expect("fresh");
        let problem = DispatchGaProblem::new(builder, eval, 0.05).expect("matching");
        let mut rng = create_rng(5);
        let a = problem.create_individual(&mut rng);
        let b = problem.create_individual(&mut rng);

        for _ in 0..30 {
            let children = problem.crossover(&a, &b, &mut rng);
            assert_eq!(children.len(), 1);
            assert!(children[0].fitness().is_infinite());
            assert!(
                validate_routes(children[0].routes(), &orders, &cap, problem.expected_stops())
                    .is_empty()
            );
        }
        assert_eq!(problem.rejected(), 0);
    }

    #[test]
    fn test_mutate_keeps_route_members() {
        let (orders, dm) = setup();
        let builder = RouteBuilder::new(&orders, &dm, model(), Load::weight(60.0)).expect("fresh");
        let eval = RouteCostEvaluator::new(&orders, &dm, model()).expect("fresh");
        let problem = DispatchGaProblem::new(builder, eval, 0.05).expect("matching");
        let mut set = RouteSet::new(vec![Route::new(vec![1, 2, 3]), Route::new(vec![4, 5, 6])]);
        let mut rng = create_rng(3);
        problem.mutate(&mut set, &mut rng);
        let mut first = set.routes()[0].customers().to_vec();
        let mut second = set.routes()[1].customers().to_vec();
        first.sort();
        second.sort();
        assert_eq!((first, second), (vec![1, 2, 3], vec![4, 5, 6]));
    }

    #[test]
    fn test_mismatched_inputs_rejected() {
        let (orders, dm) = setup();
        let (other_orders, other_dm) = setup();
        let builder = RouteBuilder::new(&orders, &dm, model(), Load::weight(30.0)).expect("fresh");
        let eval = RouteCostEvaluator::new(&other_orders, &other_dm, model()).expect("fresh");
        assert!(matches!(
            DispatchGaProblem::new(builder, eval, 0.05),
            Err(DispatchError::StaleState { .. })
        ));
    }
}
