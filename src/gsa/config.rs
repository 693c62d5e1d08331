//! Cloudy-GSA run configuration.
//!
//! All knobs of the engine live in [`GsaConfig`]. Policy choices that
//! vary between engine revisions (distance law, neighbourhood, inertia,
//! local search strategy, stagnation response) are enums rather than
//! hard-coded behaviour.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::fitness::{FitnessModel, UtilizationMeasure};

/// Exponent `p` of the distance in the force law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistancePower {
    /// `1 / dist`.
    Linear,
    /// `1 / dist²`.
    #[default]
    Square,
}

impl DistancePower {
    /// Applies the law to a (guarded) distance.
    #[inline]
    pub fn apply(self, dist: f64) -> f64 {
        match self {
            DistancePower::Linear => dist,
            DistancePower::Square => dist * dist,
        }
    }
}

/// Which particles exert force on each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Neighborhood {
    /// Every other particle.
    #[default]
    Full,
    /// Only the `k` best-ranked particles, `k` shrinking linearly from
    /// the population size to `min_k` over the run.
    KBest {
        /// Floor of the shrinking neighbourhood.
        min_k: usize,
    },
}

/// Inertia weight schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InertiaSchedule {
    /// Constant weight.
    Fixed(f64),
    /// Linear decay from `max` at `t = 0` to `min` at `t = T`.
    LinearDecay {
        /// Starting weight.
        max: f64,
        /// Final weight.
        min: f64,
    },
    /// Decrease by `step` on improvement, increase by `step` after
    /// `patience` consecutive non-improving iterations.
    Reactive {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
        /// Adjustment per event.
        step: f64,
        /// Non-improving iterations before increasing.
        patience: usize,
    },
}

impl Default for InertiaSchedule {
    fn default() -> Self {
        InertiaSchedule::Fixed(0.75)
    }
}

impl InertiaSchedule {
    /// Upper bound of the weight.
    pub fn max(&self) -> f64 {
        match *self {
            InertiaSchedule::Fixed(w) => w,
            InertiaSchedule::LinearDecay { max, .. } | InertiaSchedule::Reactive { max, .. } => max,
        }
    }

    /// Lower bound of the weight.
    pub fn min(&self) -> f64 {
        match *self {
            InertiaSchedule::Fixed(w) => w,
            InertiaSchedule::LinearDecay { min, .. } | InertiaSchedule::Reactive { min, .. } => min,
        }
    }
}

/// Local search neighbourhood used on top-ranked particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocalSearchStrategy {
    /// Move then swap between the most and least loaded VMs.
    #[default]
    MoveSwap,
    /// Relocate the heaviest task of the most loaded VM.
    Greedy,
    /// MoveSwap on even ranks, Greedy on odd ranks.
    Alternating,
}

/// Local search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSearchConfig {
    /// Neighbourhood strategy.
    pub strategy: LocalSearchStrategy,
    /// Maximum improvement rounds per call.
    pub rounds: usize,
    /// Cap on tasks considered per VM (heaviest first). `None` = all.
    pub candidate_cap: Option<usize>,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            strategy: LocalSearchStrategy::MoveSwap,
            rounds: 2,
            candidate_cap: None,
        }
    }
}

/// Reaction to a stalled global best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StagnationResponse {
    /// Restart the G decay from `G0`.
    #[default]
    ResetGravity,
    /// Push inertia to its maximum.
    BoostInertia,
    /// Re-randomize the worse half of the population (elites kept).
    PartialRestart,
}

/// Cloudy-GSA configuration.
///
/// # Example
///
/// ```
/// use cloudy_gsa::gsa::{GsaConfig, StagnationResponse};
///
/// let config = GsaConfig::default()
///     .with_population_size(30)
///     .with_max_iterations(200)
///     .with_stagnation(50, StagnationResponse::PartialRestart)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GsaConfig {
    /// Number of particles (P).
    pub population_size: usize,
    /// Fixed iteration budget (T).
    pub max_iterations: usize,
    /// Initial gravitational constant.
    pub g0: f64,
    /// Decay rate of G.
    pub alpha: f64,
    /// Denominator guard.
    pub epsilon: f64,
    /// Component-wise velocity bound.
    pub velocity_clamp: f64,
    /// Force law exponent.
    pub distance_power: DistancePower,
    /// Force neighbourhood.
    pub neighborhood: Neighborhood,
    /// Inertia weight schedule.
    pub inertia: InertiaSchedule,
    /// Per-iteration mutation probability of a particle outside the top E.
    pub mutation_rate: f64,
    /// Scale mutation strength with distance above the mean fitness.
    pub adaptive_mutation: bool,
    /// Upper bound on mutated coordinates, as a fraction of task count.
    pub max_mutation_fraction: f64,
    /// Number of top-ranked particles polished by local search (K).
    pub local_search_candidates: usize,
    /// Local search parameters.
    pub local_search: LocalSearchConfig,
    /// Elite archive size (E).
    pub elite_size: usize,
    /// Velocity multiplier for particles overwritten by an elite.
    pub elite_velocity_damping: f64,
    /// Non-improving iterations before a stagnation response.
    pub stagnation_limit: usize,
    /// Stagnation response policy.
    pub stagnation_response: StagnationResponse,
    /// Fraction of coordinates decoded by floor/ceil instead of rounding.
    pub stochastic_rounding: f64,
    /// Cost model.
    pub fitness: FitnessModel,
    /// Evaluate particles with rayon.
    pub parallel: bool,
    /// RNG seed. `None` = seeded from the OS.
    pub seed: Option<u64>,
}

impl Default for GsaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_iterations: 1000,
            g0: 100.0,
            alpha: 20.0,
            epsilon: 1e-12,
            velocity_clamp: 2.0,
            distance_power: DistancePower::Square,
            neighborhood: Neighborhood::Full,
            inertia: InertiaSchedule::Fixed(0.75),
            mutation_rate: 0.02,
            adaptive_mutation: true,
            max_mutation_fraction: 0.1,
            local_search_candidates: 5,
            local_search: LocalSearchConfig::default(),
            elite_size: 3,
            elite_velocity_damping: 0.5,
            stagnation_limit: 75,
            stagnation_response: StagnationResponse::ResetGravity,
            stochastic_rounding: 0.0,
            fitness: FitnessModel::default(),
            parallel: true,
            seed: None,
        }
    }
}

impl GsaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets `G0` and the decay rate.
    pub fn with_gravity(mut self, g0: f64, alpha: f64) -> Self {
        self.g0 = g0;
        self.alpha = alpha;
        self
    }

    /// Sets the velocity clamp.
    pub fn with_velocity_clamp(mut self, clamp: f64) -> Self {
        self.velocity_clamp = clamp;
        self
    }

    /// Sets the force law exponent.
    pub fn with_distance_power(mut self, power: DistancePower) -> Self {
        self.distance_power = power;
        self
    }

    /// Sets the force neighbourhood.
    pub fn with_neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    /// Sets the inertia schedule.
    pub fn with_inertia(mut self, inertia: InertiaSchedule) -> Self {
        self.inertia = inertia;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Enables or disables fitness-scaled mutation strength.
    pub fn with_adaptive_mutation(mut self, adaptive: bool, max_fraction: f64) -> Self {
        self.adaptive_mutation = adaptive;
        self.max_mutation_fraction = max_fraction;
        self
    }

    /// Sets how many top particles get local search.
    pub fn with_local_search_candidates(mut self, k: usize) -> Self {
        self.local_search_candidates = k;
        self
    }

    /// Sets local search parameters.
    pub fn with_local_search(mut self, local_search: LocalSearchConfig) -> Self {
        self.local_search = local_search;
        self
    }

    /// Sets the elite archive size.
    pub fn with_elite_size(mut self, size: usize) -> Self {
        self.elite_size = size;
        self
    }

    /// Sets the stagnation threshold and response.
    pub fn with_stagnation(mut self, limit: usize, response: StagnationResponse) -> Self {
        self.stagnation_limit = limit;
        self.stagnation_response = response;
        self
    }

    /// Sets the stochastic rounding fraction.
    pub fn with_stochastic_rounding(mut self, fraction: f64) -> Self {
        self.stochastic_rounding = fraction;
        self
    }

    /// Sets the cost model.
    pub fn with_fitness(mut self, fitness: FitnessModel) -> Self {
        self.fitness = fitness;
        self
    }

    /// Enables or disables rayon evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let fail = |msg: &str| Err(ScheduleError::InvalidConfig(msg.to_string()));

        if self.population_size == 0 {
            return fail("population_size must be at least 1");
        }
        if !(self.g0.is_finite() && self.g0 >= 0.0) {
            return fail("g0 must be finite and non-negative");
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return fail("alpha must be finite and non-negative");
        }
        if !(self.epsilon > 0.0) {
            return fail("epsilon must be positive");
        }
        if !(self.velocity_clamp > 0.0) {
            return fail("velocity_clamp must be positive");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return fail("mutation_rate must be in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.max_mutation_fraction) {
            return fail("max_mutation_fraction must be in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.stochastic_rounding) {
            return fail("stochastic_rounding must be in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.elite_velocity_damping) {
            return fail("elite_velocity_damping must be in [0, 1]");
        }
        if self.elite_size > self.population_size {
            return fail("elite_size cannot exceed population_size");
        }
        if self.stagnation_limit == 0 {
            return fail("stagnation_limit must be at least 1");
        }
        if let Neighborhood::KBest { min_k } = self.neighborhood {
            if min_k == 0 {
                return fail("KBest min_k must be at least 1");
            }
        }
        if self.inertia.min() > self.inertia.max() || self.inertia.min() < 0.0 {
            return fail("inertia bounds must satisfy 0 <= min <= max");
        }
        let w = self.fitness.weights;
        if w.makespan < 0.0 || w.balance < 0.0 || w.utilization < 0.0 {
            return fail("fitness weights must be non-negative");
        }
        if self.fitness.utilization == UtilizationMeasure::MeanLoadBonus
            && w.utilization > w.makespan
        {
            return fail("MeanLoadBonus requires utilization weight <= makespan weight");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = GsaConfig::default();
        assert_eq!(c.population_size, 50);
        assert_eq!(c.max_iterations, 1000);
        assert!((c.g0 - 100.0).abs() < 1e-10);
        assert!((c.alpha - 20.0).abs() < 1e-10);
        assert_eq!(c.distance_power, DistancePower::Square);
        assert_eq!(c.inertia, InertiaSchedule::Fixed(0.75));
        assert_eq!(c.stagnation_limit, 75);
        assert_eq!(c.local_search_candidates, 5);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let c = GsaConfig::default()
            .with_population_size(10)
            .with_max_iterations(20)
            .with_neighborhood(Neighborhood::KBest { min_k: 2 })
            .with_inertia(InertiaSchedule::LinearDecay { max: 0.9, min: 0.4 })
            .with_parallel(false)
            .with_seed(42);
        assert_eq!(c.population_size, 10);
        assert_eq!(c.max_iterations, 20);
        assert_eq!(c.neighborhood, Neighborhood::KBest { min_k: 2 });
        assert!((c.inertia.max() - 0.9).abs() < 1e-10);
        assert!((c.inertia.min() - 0.4).abs() < 1e-10);
        assert!(!c.parallel);
        assert_eq!(c.seed, Some(42));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(GsaConfig::default().with_population_size(0).validate().is_err());
        assert!(GsaConfig::default().with_mutation_rate(1.5).validate().is_err());
        assert!(GsaConfig::default().with_elite_size(100).validate().is_err());
        assert!(GsaConfig::default()
            .with_stagnation(0, StagnationResponse::BoostInertia)
            .validate()
            .is_err());
        assert!(GsaConfig::default()
            .with_inertia(InertiaSchedule::LinearDecay { max: 0.2, min: 0.8 })
            .validate()
            .is_err());
        assert!(GsaConfig::default()
            .with_neighborhood(Neighborhood::KBest { min_k: 0 })
            .validate()
            .is_err());
        assert!(GsaConfig::default()
            .with_fitness(FitnessModel::default().with_weights(1.0, -1.0, 0.0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_mean_load_bonus_weight_bound() {
        let bonus = |utilization: f64| {
            GsaConfig::default().with_fitness(
                FitnessModel::default()
                    .with_weights(1.0, 1.0, utilization)
                    .with_utilization(UtilizationMeasure::MeanLoadBonus),
            )
        };
        assert!(matches!(
            bonus(3.0).validate(),
            Err(ScheduleError::InvalidConfig(_))
        ));
        assert!(bonus(1.0).validate().is_ok());
        // Idle time is never negative, so any weight is fine there.
        assert!(GsaConfig::default()
            .with_fitness(FitnessModel::default().with_weights(1.0, 1.0, 3.0))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_distance_power() {
        assert!((DistancePower::Linear.apply(3.0) - 3.0).abs() < 1e-10);
        assert!((DistancePower::Square.apply(3.0) - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_serde_partial_config() {
        let c: GsaConfig =
            serde_json::from_str(r#"{"population_size": 12, "stagnation_response": "PartialRestart"}"#)
                .unwrap();
        assert_eq!(c.population_size, 12);
        assert_eq!(c.stagnation_response, StagnationResponse::PartialRestart);
        assert_eq!(c.max_iterations, 1000);

        let json = serde_json::to_string(&c).unwrap();
        let back: GsaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
