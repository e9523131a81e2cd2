//! Planner configuration.
//!
//! The travel-speed and lateness-penalty constants have no sensible universal
//! value, so [`CostModel`] has no `Default` and must be supplied by the
//! caller. The search and clustering knobs default to values that work for
//! city-scale fleets.

use serde::{Deserialize, Serialize};
use u_metaheur::ga::GaConfig;

use crate::error::DispatchError;

/// Travel-time and lateness-penalty constants.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::CostModel;
///
/// let model = CostModel::new(2.0, 10.0).unwrap();
/// assert_eq!(model.travel_minutes(3.0), 6.0);
/// assert!(CostModel::new(-1.0, 10.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    minutes_per_km: f64,
    lateness_penalty_per_minute: f64,
}

impl CostModel {
    /// Creates a cost model.
    ///
    /// Both values must be finite and non-negative.
    pub fn new(minutes_per_km: f64, lateness_penalty_per_minute: f64) -> Result<Self, DispatchError> {
        let model = Self {
            minutes_per_km,
            lateness_penalty_per_minute,
        };
        model.validate()?;
        Ok(model)
    }

    /// Checks ranges; useful after deserialization.
    pub fn validate(&self) -> Result<(), DispatchError> {
        check_non_negative("minutes_per_km", self.minutes_per_km)?;
        check_non_negative(
            "lateness_penalty_per_minute",
            self.lateness_penalty_per_minute,
        )
    }

    /// Minutes needed to drive one kilometre.
    pub fn minutes_per_km(&self) -> f64 {
        self.minutes_per_km
    }

    /// Cost added per minute of arrival past a window's latest bound.
    pub fn lateness_penalty_per_minute(&self) -> f64 {
        self.lateness_penalty_per_minute
    }

    /// Travel time in minutes for a distance in kilometres.
    pub fn travel_minutes(&self, km: f64) -> f64 {
        km * self.minutes_per_km
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), DispatchError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DispatchError::InvalidConfig(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )))
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), DispatchError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DispatchError::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

/// Population search parameters.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_population_size(20)
///     .with_max_generations(30)
///     .with_seed(7);
/// assert_eq!(config.population_size, 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Candidates per generation.
    pub population_size: usize,
    /// Number of generations to run.
    pub max_generations: usize,
    /// Candidates sampled per tournament.
    pub tournament_size: usize,
    /// Fraction of each generation carried over unchanged from the best of
    /// the previous one; at least one candidate is always carried.
    pub elite_ratio: f64,
    /// Probability that a child is produced by recombination rather than
    /// cloned from its first parent.
    pub crossover_rate: f64,
    /// Probability that a child receives a swap mutation.
    pub mutation_rate: f64,
    /// Relative distance slack under which two candidate next stops count
    /// as tied during randomized construction (0 = exact ties only).
    pub tie_tolerance: f64,
    /// Random seed; equal seeds give identical runs.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            tournament_size: 3,
            elite_ratio: 0.1,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            tie_tolerance: 0.05,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the elite fraction.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio;
        self
    }

    /// Sets the recombination probability.
    pub fn with_crossover_rate(mut self, p: f64) -> Self {
        self.crossover_rate = p;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_rate(mut self, p: f64) -> Self {
        self.mutation_rate = p;
        self
    }

    /// Sets the construction tie tolerance.
    pub fn with_tie_tolerance(mut self, tol: f64) -> Self {
        self.tie_tolerance = tol;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks ranges.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.population_size < 2 {
            return Err(DispatchError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if self.max_generations == 0 {
            return Err(DispatchError::InvalidConfig(
                "max_generations must be at least 1".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(DispatchError::InvalidConfig(
                "tournament_size must be at least 1".into(),
            ));
        }
        check_probability("elite_ratio", self.elite_ratio)?;
        check_probability("crossover_rate", self.crossover_rate)?;
        check_probability("mutation_rate", self.mutation_rate)?;
        check_non_negative("tie_tolerance", self.tie_tolerance)
    }

    /// Runner settings for [`GaRunner`](u_metaheur::ga::GaRunner).
    ///
    /// The elite count is clamped to `1..population_size`, stagnation
    /// stopping is disabled so every run spends the full generation budget,
    /// and evaluation is sequential.
    pub fn to_ga_config(&self) -> GaConfig {
        let size = self.population_size;
        let elites = ((size as f64 * self.elite_ratio) as usize)
            .clamp(1, size.saturating_sub(1).max(1));
        GaConfig::default()
            .with_population_size(size)
            .with_max_generations(self.max_generations)
            .with_tournament_size(self.tournament_size)
            .with_elite_ratio((elites as f64 + 0.5) / size.max(1) as f64)
            .with_crossover_rate(self.crossover_rate)
            .with_mutation_rate(self.mutation_rate)
            .with_stagnation_limit(0)
            .with_parallel(false)
            .with_seed(self.seed)
    }
}

/// Geographic clustering bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Maximum orders per cluster.
    pub max_cluster_size: usize,
    /// Maximum distance from the current centroid for a new member, in km.
    pub max_radius_km: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_cluster_size: 8,
            max_radius_km: 10.0,
        }
    }
}

impl ClusterConfig {
    /// Sets the maximum cluster size.
    pub fn with_max_cluster_size(mut self, n: usize) -> Self {
        self.max_cluster_size = n;
        self
    }

    /// Sets the growth radius in km.
    pub fn with_max_radius_km(mut self, km: f64) -> Self {
        self.max_radius_km = km;
        self
    }

    /// Checks ranges.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.max_cluster_size == 0 {
            return Err(DispatchError::InvalidConfig(
                "max_cluster_size must be at least 1".into(),
            ));
        }
        check_non_negative("max_radius_km", self.max_radius_km)
    }
}

/// Full planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Travel and lateness constants.
    pub cost_model: CostModel,
    /// Population search parameters.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Clustering bounds.
    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl PlannerConfig {
    /// Creates a configuration with default search and clustering settings.
    pub fn new(cost_model: CostModel) -> Self {
        Self {
            cost_model,
            engine: EngineConfig::default(),
            cluster: ClusterConfig::default(),
        }
    }

    /// Replaces the engine settings.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Replaces the clustering settings.
    pub fn with_cluster(mut self, cluster: ClusterConfig) -> Self {
        self.cluster = cluster;
        self
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), DispatchError> {
        self.cost_model.validate()?;
        self.engine.validate()?;
        self.cluster.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_model_rejects_bad_values() {
        assert!(CostModel::new(f64::NAN, 1.0).is_err());
        assert!(CostModel::new(1.0, -0.5).is_err());
        assert!(CostModel::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_engine_defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.population_size, 50);
        assert_eq!(c.max_generations, 100);
        assert_eq!(c.tournament_size, 3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_engine_validate() {
        assert!(EngineConfig::default()
            .with_population_size(0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_mutation_rate(1.5)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_tournament_size(0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_population_size(1)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_max_generations(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_ga_config_mapping() {
        let ga = EngineConfig::default()
            .with_population_size(8)
            .with_max_generations(12)
            .with_tournament_size(4)
            .with_seed(9)
            .to_ga_config();
        assert_eq!(ga.population_size, 8);
        assert_eq!(ga.max_generations, 12);
        assert_eq!(ga.selection, u_metaheur::ga::Selection::Tournament(4));
        assert_eq!(ga.stagnation_limit, 0);
        assert_eq!(ga.seed, Some(9));
        assert_eq!((ga.population_size as f64 * ga.elite_ratio) as usize, 1);
        assert!(ga.validate().is_ok());

        let two = EngineConfig::default().with_population_size(2).to_ga_config();
        assert!(two.validate().is_ok());
        let all_elite = EngineConfig::default()
            .with_population_size(10)
            .with_elite_ratio(1.0)
            .to_ga_config();
        assert_eq!((10.0 * all_elite.elite_ratio) as usize, 9);
        assert!(all_elite.validate().is_ok());
    }

    #[test]
    fn test_cluster_defaults() {
        let c = ClusterConfig::default();
        assert_eq!(c.max_cluster_size, 8);
        assert_eq!(c.max_radius_km, 10.0);
        assert!(c.with_max_cluster_size(0).validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{
            "cost_model": { "minutes_per_km": 2.0, "lateness_penalty_per_minute": 10.0 },
            "engine": { "max_generations": 5 }
        }"#;
        let config: PlannerConfig = serde_json::from_str(json).expect("valid json");
        assert_eq!(config.engine.max_generations, 5);
        assert_eq!(config.engine.population_size, 50);
        assert_eq!(config.cluster.max_cluster_size, 8);
        assert!(config.validate().is_ok());
    }
}
