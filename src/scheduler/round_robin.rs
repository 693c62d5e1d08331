//! Round-robin baseline.

use super::Scheduler;
use crate::error::ScheduleError;
use crate::models::{Assignment, Task, Vm};
use crate::problem::SchedulingProblem;

/// Deterministic round-robin placement: task `i` goes to VM `i mod n`.
///
/// # Example
///
/// ```
/// use cloudy_gsa::models::{Task, Vm};
/// use cloudy_gsa::scheduler::{RoundRobinScheduler, Scheduler};
///
/// let tasks = vec![Task::new(1, 10.0), Task::new(2, 20.0), Task::new(3, 30.0)];
/// let vms = vec![Vm::new("A", 1), Vm::new("B", 1)];
///
/// let assignment = RoundRobinScheduler.schedule(&tasks, &vms).unwrap();
/// assert_eq!(assignment.vm_for(1), Some("A"));
/// assert_eq!(assignment.vm_for(2), Some("B"));
/// assert_eq!(assignment.vm_for(3), Some("A"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinScheduler;

impl RoundRobinScheduler {
    /// Round-robin discrete solution for `n_tasks` tasks on `n_vms` VMs.
    pub fn solution(n_tasks: usize, n_vms: usize) -> Vec<usize> {
        (0..n_tasks).map(|i| i % n_vms).collect()
    }
}

impl Scheduler for RoundRobinScheduler {
    fn name(&self) -> &'static str {
        "Round Robin"
    }

    fn schedule(&self, tasks: &[Task], vms: &[Vm]) -> Result<Assignment, ScheduleError> {
        let problem = SchedulingProblem::new(tasks, vms)?;
        let solution = Self::solution(problem.task_count(), problem.vm_count());
        Ok(problem.to_assignment(&solution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_through_vms() {
        let tasks: Vec<Task> = (0..7).map(|i| Task::new(i, 1.0)).collect();
        let vms = vec![Vm::new("a", 1), Vm::new("b", 1), Vm::new("c", 1)];
        let assignment = RoundRobinScheduler.schedule(&tasks, &vms).unwrap();
        assert_eq!(assignment.len(), 7);
        assert_eq!(assignment.tasks_on("a"), vec![0, 3, 6]);
        assert_eq!(assignment.tasks_on("b"), vec![1, 4]);
        assert_eq!(assignment.tasks_on("c"), vec![2, 5]);
    }

    #[test]
    fn test_deterministic() {
        let tasks: Vec<Task> = (0..20).map(|i| Task::from_class(i, (i % 10 + 1) as u32)).collect();
        let vms = vec![Vm::new("vm1", 1), Vm::new("vm2", 2), Vm::new("vm3", 4)];
        let a = RoundRobinScheduler.schedule(&tasks, &vms).unwrap();
        let b = RoundRobinScheduler.schedule(&tasks, &vms).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_uses_input_order_not_id_order() {
        let tasks = vec![Task::new(9, 1.0), Task::new(1, 1.0)];
        let vms = vec![Vm::new("a", 1), Vm::new("b", 1)];
        let assignment = RoundRobinScheduler.schedule(&tasks, &vms).unwrap();
        assert_eq!(assignment.vm_for(9), Some("a"));
        assert_eq!(assignment.vm_for(1), Some("b"));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(
            RoundRobinScheduler.schedule(&[Task::new(1, 1.0)], &[]),
            Err(ScheduleError::NoVirtualMachines)
        );
        let empty = RoundRobinScheduler.schedule(&[], &[Vm::new("a", 1)]).unwrap();
        assert!(empty.is_empty());
    }
}
