//! Load-model quality metrics (KPIs).
//!
//! Computes scheduling indicators for an [`Assignment`] from the load
//! model alone (`exec_time = load / cores`), so strategies can be
//! compared without running any task.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan | Largest VM load |
//! | Throughput | Tasks / makespan |
//! | Imbalance Degree | (max − min) / mean of VM loads |
//! | Resource Utilization | Σ task load / (makespan · Σ cores) |
//! | Fitness | Cost under a [`FitnessModel`] |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::fitness::{FitnessModel, EPSILON};
use crate::models::Assignment;
use crate::problem::SchedulingProblem;

/// Assignment performance indicators.
///
/// Time values are in the model's time unit (load per core).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadKpi {
    /// Estimated busy time per VM name.
    pub vm_loads: BTreeMap<String, f64>,
    /// Largest VM load.
    pub makespan: f64,
    /// Tasks completed per time unit.
    pub throughput: f64,
    /// `(max − min) / mean` of VM loads.
    pub imbalance_degree: f64,
    /// Share of total core time doing work (0.0..=1.0).
    pub resource_utilization: f64,
    /// Cost of the assignment under the given fitness model.
    pub fitness: f64,
}

impl LoadKpi {
    /// Computes KPIs for an assignment of `problem`'s tasks.
    ///
    /// # Errors
    /// [`ScheduleError::UnknownTask`] / [`ScheduleError::UnknownVm`] if
    /// the assignment does not cover the problem's tasks with its VMs.
    pub fn calculate(
        problem: &SchedulingProblem,
        assignment: &Assignment,
        model: &FitnessModel,
    ) -> Result<Self, ScheduleError> {
        let solution = problem.solution_of(assignment)?;
        let loads = problem.vm_loads(&solution);

        let makespan = loads.iter().copied().fold(0.0, f64::max);
        let min = loads.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = loads.iter().sum::<f64>() / loads.len() as f64;

        let (throughput, imbalance_degree, resource_utilization) = if makespan > 0.0 {
            let work: f64 = (0..problem.task_count()).map(|t| problem.load(t)).sum();
            (
                problem.task_count() as f64 / makespan,
                (makespan - min) / (mean + EPSILON),
                work / (makespan * problem.total_cores()),
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        let vm_loads = problem
            .vms()
            .iter()
            .zip(&loads)
            .map(|(vm, &load)| (vm.name.clone(), load))
            .collect();

        Ok(Self {
            vm_loads,
            makespan,
            throughput,
            imbalance_degree,
            resource_utilization,
            fitness: model.evaluate(problem, &solution),
        })
    }

    /// Whether the assignment meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_makespan: f64, min_utilization: f64) -> bool {
        self.makespan <= max_makespan && self.resource_utilization >= min_utilization
    }
}
