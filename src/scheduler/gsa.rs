//! Cloudy-GSA as a [`Scheduler`].

use tracing::info;

use super::Scheduler;
use crate::error::ScheduleError;
use crate::gsa::{GsaConfig, GsaRunner};
use crate::models::{Assignment, Task, Vm};
use crate::problem::SchedulingProblem;

/// Scheduler backed by the Cloudy-GSA engine.
///
/// # Example
///
/// ```
/// use cloudy_gsa::gsa::GsaConfig;
/// use cloudy_gsa::models::{Task, Vm};
/// use cloudy_gsa::scheduler::{GsaScheduler, Scheduler};
///
/// let tasks: Vec<Task> = (0..8).map(|i| Task::new(i, 10.0 * (i + 1) as f64)).collect();
/// let vms = vec![Vm::new("vm1", 1), Vm::new("vm2", 2)];
///
/// let scheduler = GsaScheduler::with_config(
///     GsaConfig::default().with_population_size(10).with_max_iterations(30),
/// )
/// .with_seed(7);
/// let assignment = scheduler.schedule(&tasks, &vms).unwrap();
/// assert_eq!(assignment.len(), 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GsaScheduler {
    config: GsaConfig,
}

impl GsaScheduler {
    /// Scheduler with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler with a custom configuration.
    pub fn with_config(config: GsaConfig) -> Self {
        Self { config }
    }

    /// Fixes the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// The configuration used by [`Scheduler::schedule`].
    pub fn config(&self) -> &GsaConfig {
        &self.config
    }
}

impl Scheduler for GsaScheduler {
    fn name(&self) -> &'static str {
        "Cloudy-GSA"
    }

    fn schedule(&self, tasks: &[Task], vms: &[Vm]) -> Result<Assignment, ScheduleError> {
        let problem = SchedulingProblem::new(tasks, vms)?;
        if problem.task_count() == 0 {
            return Ok(Assignment::new());
        }
        let result = GsaRunner::run(&problem, &self.config)?;
        info!(
            tasks = problem.task_count(),
            vms = problem.vm_count(),
            fitness = result.best_fitness,
            "Cloudy-GSA schedule ready"
        );
        Ok(problem.to_assignment(&result.best_solution))
    }
}
