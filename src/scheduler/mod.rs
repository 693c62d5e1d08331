//! Scheduling strategies and load KPIs.
//!
//! Every strategy implements [`Scheduler`]: a pure function from tasks
//! and VMs to an [`Assignment`]. No I/O happens inside `schedule`.
//!
//! | Strategy | Kind | Randomness |
//! |----------|------|------------|
//! | [`GsaScheduler`] | Cloudy-GSA metaheuristic | seedable |
//! | [`RoundRobinScheduler`] | `task_i → vm[i mod n]` | none |
//! | [`HillClimbScheduler`] | stochastic hill climbing with restarts | seedable |
//!
//! # KPI
//!
//! [`LoadKpi`] estimates makespan, imbalance and utilization of an
//! assignment from the load model, so strategies can be compared
//! without executing anything.

mod gsa;
mod hill_climb;
mod kpi;
mod round_robin;

pub use gsa::GsaScheduler;
pub use hill_climb::HillClimbScheduler;
pub use kpi::LoadKpi;
pub use round_robin::RoundRobinScheduler;

use crate::error::ScheduleError;
use crate::models::{Assignment, Task, Vm};

/// A task-to-VM placement strategy.
///
/// # Contract
/// On success every task id appears exactly once in the assignment and
/// every value names a VM from `vms`. An empty VM list fails with
/// [`ScheduleError::NoVirtualMachines`]; an empty task list yields an
/// empty assignment.
pub trait Scheduler {
    /// Strategy name (e.g. "Cloudy-GSA").
    fn name(&self) -> &'static str;

    /// Assigns every task to a VM.
    fn schedule(&self, tasks: &[Task], vms: &[Vm]) -> Result<Assignment, ScheduleError>;
}
