//! Multi-objective cost model.
//!
//! Scores a discrete solution (task index → VM index) as a single
//! non-negative scalar, lower is better:
//!
//! ```text
//! fitness = W_makespan · makespan
//!         + W_balance · balance_penalty
//!         + W_utilization · utilization_term
//! ```
//!
//! | Term | Options |
//! |------|---------|
//! | balance_penalty | std-dev of VM loads, or imbalance degree `(max−min)/(mean+ε) · makespan` |
//! | utilization_term | summed idle time `Σ(makespan − load_v)`, or bonus `−mean(load)` |
//!
//! With the bonus variant the score stays non-negative as long as
//! `W_utilization ≤ W_makespan`, since `mean(load) ≤ makespan`.
//!
//! Evaluation is a pure aggregation: it is deterministic and does not
//! depend on the order in which tasks are folded into the load vector.

use serde::{Deserialize, Serialize};

use crate::problem::SchedulingProblem;

/// Guard added to every denominator.
pub const EPSILON: f64 = 1e-12;

/// How load dispersion across VMs is penalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BalanceMeasure {
    /// Population standard deviation of VM loads.
    #[default]
    StdDev,
    /// `(max − min) / (mean + ε)`, scaled by makespan to keep time units.
    ImbalanceDegree,
}

/// How resource use enters the cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UtilizationMeasure {
    /// Penalty: summed idle time `Σ(makespan − load_v)`.
    #[default]
    IdleTime,
    /// Bonus: `−mean(load)`.
    MeanLoadBonus,
}

/// Objective weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    /// Weight of the makespan term.
    pub makespan: f64,
    /// Weight of the balance penalty.
    pub balance: f64,
    /// Weight of the utilization term.
    pub utilization: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            makespan: 1.0,
            balance: 1.2,
            utilization: 0.5,
        }
    }
}

/// Configurable fitness function.
///
/// # Example
///
/// ```
/// use cloudy_gsa::fitness::FitnessModel;
/// use cloudy_gsa::models::{Task, Vm};
/// use cloudy_gsa::problem::SchedulingProblem;
///
/// let tasks = vec![Task::new(1, 10.0), Task::new(2, 10.0)];
/// let vms = vec![Vm::new("a", 1), Vm::new("b", 1)];
/// let problem = SchedulingProblem::new(&tasks, &vms).unwrap();
///
/// let model = FitnessModel::default();
/// // Perfectly balanced: only the makespan term remains.
/// assert!((model.evaluate(&problem, &[0, 1]) - 10.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FitnessModel {
    /// Objective weights.
    pub weights: FitnessWeights,
    /// Balance penalty form.
    pub balance: BalanceMeasure,
    /// Utilization term form.
    pub utilization: UtilizationMeasure,
}

impl FitnessModel {
    /// Creates a model with default weights and measures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the objective weights.
    pub fn with_weights(mut self, makespan: f64, balance: f64, utilization: f64) -> Self {
        self.weights = FitnessWeights {
            makespan,
            balance,
            utilization,
        };
        self
    }

    /// Sets the balance penalty form.
    pub fn with_balance(mut self, balance: BalanceMeasure) -> Self {
        self.balance = balance;
        self
    }

    /// Sets the utilization term form.
    pub fn with_utilization(mut self, utilization: UtilizationMeasure) -> Self {
        self.utilization = utilization;
        self
    }

    /// Scores a discrete solution.
    pub fn evaluate(&self, problem: &SchedulingProblem, solution: &[usize]) -> f64 {
        self.score_loads(&problem.vm_loads(solution))
    }

    /// Scores an already computed VM-Load vector.
    ///
    /// Returns `0.0` for an empty vector.
    pub fn score_loads(&self, loads: &[f64]) -> f64 {
        if loads.is_empty() {
            return 0.0;
        }
        let n = loads.len() as f64;
        let makespan = loads.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = loads.iter().copied().fold(f64::INFINITY, f64::min);
        let total: f64 = loads.iter().sum();
        let mean = total / n;

        let balance_penalty = match self.balance {
            BalanceMeasure::StdDev => {
                let var = loads.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
                var.sqrt()
            }
            BalanceMeasure::ImbalanceDegree => (makespan - min) / (mean + EPSILON) * makespan,
        };

        let utilization_term = match self.utilization {
            UtilizationMeasure::IdleTime => n * makespan - total,
            UtilizationMeasure::MeanLoadBonus => -mean,
        };

        self.weights.makespan * makespan
            + self.weights.balance * balance_penalty
            + self.weights.utilization * utilization_term
    }
}

/// Index of the first maximum.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Index of the first minimum.
pub(crate) fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v < values[best] {
            best = i;
        }
    }
    best
}
