//! Generational improvement of route sets.
//!
//! # Algorithm
//!
//! [`GaRunner`] drives the loop over a [`DispatchGaProblem`]:
//!
//! 1. Seed a population with one deterministic construction and
//!    `population_size - 1` constructions under randomized near-tie breaking.
//! 2. Each generation keeps the elite fraction unchanged, then fills the
//!    rest by tournament selection, recombination with repair (probability
//!    `crossover_rate`) and swap mutation (probability `mutation_rate`).
//! 3. The best candidate ever evaluated is tracked across generations, so
//!    the recorded best cost never increases.
//!
//! # Complexity
//!
//! O(G · P · n²) where G = generations, P = population size, n = orders;
//! the n² term is the repair pass in the worst case.

use tracing::info;
use u_metaheur::ga::{GaRunner, GenerationStats};

use crate::config::EngineConfig;
use crate::constructive::RouteBuilder;
use crate::error::{DispatchError, InfeasibleOrder};
use crate::evaluation::RouteCostEvaluator;

use super::candidate::RouteSet;
use super::problem::DispatchGaProblem;

/// Outcome of a full engine run.
#[derive(Debug, Clone)]
pub struct EngineResult {
    /// Best route set found.
    pub best: RouteSet,
    /// Cost of `best`.
    pub best_cost: f64,
    /// Best-so-far cost for the seeded population, then after each
    /// generation; non-increasing.
    pub history: Vec<f64>,
    /// Population cost statistics per generation, seeded population first.
    pub generation_stats: Vec<GenerationStats>,
    /// Generations executed.
    pub generations: usize,
    /// Children replaced by a parent copy because repair left violations.
    pub rejected: usize,
    /// Orders no route could take.
    pub unassignable: Vec<InfeasibleOrder>,
}

/// Population-based refinement over candidate route sets.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::{CostModel, EngineConfig};
/// use u_dispatch::constructive::RouteBuilder;
/// use u_dispatch::distance::DistanceMatrix;
/// use u_dispatch::evaluation::RouteCostEvaluator;
/// use u_dispatch::ga::PopulationEngine;
/// use u_dispatch::models::{Load, Location, Order};
///
/// let depot = Location::new(0.0, 0.0);
/// let orders: Vec<Order> = (1..=5)
///     .map(|i| Order::new(format!("o{i}"), Location::new(0.01 * i as f64, 0.0), Load::weight(10.0)))
///     .collect();
/// let dm = DistanceMatrix::build(&depot, &orders);
/// let model = CostModel::new(2.0, 10.0).unwrap();
///
/// let builder = RouteBuilder::new(&orders, &dm, model, Load::weight(30.0)).unwrap();
/// let evaluator = RouteCostEvaluator::new(&orders, &dm, model).unwrap();
/// let config = EngineConfig::default().with_population_size(10).with_max_generations(20);
///
/// let mut engine = PopulationEngine::new(builder, evaluator, config).unwrap();
/// let result = engine.run().unwrap();
/// assert_eq!(result.best.num_stops(), 5);
/// assert_eq!(result.history.len(), 21);
/// ```
#[derive(Debug)]
pub struct PopulationEngine<'a> {
    problem: DispatchGaProblem<'a>,
    config: EngineConfig,
    result: Option<EngineResult>,
}

impl<'a> PopulationEngine<'a> {
    /// Creates an engine.
    ///
    /// Fails if `config` is out of range, or with
    /// [`DispatchError::StaleState`] if builder and evaluator were set up
    /// over different orders or distance matrices.
    pub fn new(
        builder: RouteBuilder<'a>,
        evaluator: RouteCostEvaluator<'a>,
        config: EngineConfig,
    ) -> Result<Self, DispatchError> {
        config.validate()?;
        let problem = DispatchGaProblem::new(builder, evaluator, config.tie_tolerance)?;
        Ok(Self {
            problem,
            config,
            result: None,
        })
    }

    /// Runs the search from `config.seed`, replacing any earlier result.
    pub fn run(&mut self) -> Result<EngineResult, DispatchError> {
        self.problem.reset();
        let ga = GaRunner::run(&self.problem, &self.config.to_ga_config())
            .map_err(DispatchError::InvalidConfig)?;

        let result = EngineResult {
            best_cost: ga.best_fitness,
            best: ga.best,
            history: ga.fitness_history,
            generation_stats: ga.generation_stats,
            generations: ga.generations,
            rejected: self.problem.rejected(),
            unassignable: self.problem.unassignable().to_vec(),
        };
        info!(
            generations = result.generations,
            best_cost = result.best_cost,
            routes = result.best.num_routes(),
            rejected = result.rejected,
            unassignable = result.unassignable.len(),
            "population search finished"
        );
        self.result = Some(result.clone());
        Ok(result)
    }

    /// The last run's result.
    ///
    /// Fails with [`DispatchError::StaleState`] before the first
    /// [`run`](Self::run).
    pub fn result(&self) -> Result<&EngineResult, DispatchError> {
        self.result.as_ref().ok_or(DispatchError::StaleState {
            what: "population search has not been run",
        })
    }

    /// Best candidate of the last run.
    pub fn best(&self) -> Option<&RouteSet> {
        self.result.as_ref().map(|r| &r.best)
    }

    /// Best-so-far costs of the last run; empty before the first run.
    pub fn history(&self) -> &[f64] {
        self.result.as_ref().map_or(&[], |r| r.history.as_slice())
    }

    /// Stops every candidate must cover.
    pub fn expected_stops(&self) -> &[usize] {
        self.problem.expected_stops()
    }

    /// The underlying GA problem.
    pub fn problem(&self) -> &DispatchGaProblem<'a> {
        &self.problem
    }
}
