//! Index-stable problem tables.
//!
//! [`SchedulingProblem`] flattens tasks and VMs into arrays once, so the
//! optimization loop works on plain `usize` indices: a discrete solution
//! is a `Vec<usize>` where `solution[task_idx] = vm_idx`. Id and name
//! lookups are hashed only at the boundary (building problems, encoding
//! and decoding [`Assignment`]s).

use std::collections::HashMap;

use crate::error::ScheduleError;
use crate::models::{Assignment, Task, Vm};
use crate::validation::validate_input;

/// Validated, index-stable view of a scheduling problem.
#[derive(Debug, Clone)]
pub struct SchedulingProblem {
    tasks: Vec<Task>,
    vms: Vec<Vm>,
    /// `loads[t]` = task CPU load.
    loads: Vec<f64>,
    /// `cores[v]` = VM core count as f64.
    cores: Vec<f64>,
    task_index: HashMap<u64, usize>,
    vm_index: HashMap<String, usize>,
}

impl SchedulingProblem {
    /// Builds a problem from tasks and VMs.
    ///
    /// # Errors
    /// - [`ScheduleError::NoVirtualMachines`] if `vms` is empty.
    /// - [`ScheduleError::InvalidInput`] if validation fails.
    pub fn new(tasks: &[Task], vms: &[Vm]) -> Result<Self, ScheduleError> {
        if vms.is_empty() {
            return Err(ScheduleError::NoVirtualMachines);
        }
        validate_input(tasks, vms).map_err(ScheduleError::InvalidInput)?;

        let task_index = tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
        let vm_index = vms
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name.clone(), i))
            .collect();

        Ok(Self {
            tasks: tasks.to_vec(),
            vms: vms.to_vec(),
            loads: tasks.iter().map(|t| t.cpu_load).collect(),
            cores: vms.iter().map(|v| f64::from(v.cpu_cores)).collect(),
            task_index,
            vm_index,
        })
    }

    /// Tasks in input order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// VMs in input order.
    pub fn vms(&self) -> &[Vm] {
        &self.vms
    }

    /// Number of tasks.
    #[inline]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of VMs (always at least 1).
    #[inline]
    pub fn vm_count(&self) -> usize {
        self.vms.len()
    }

    /// CPU load of task `task_idx`.
    #[inline]
    pub fn load(&self, task_idx: usize) -> f64 {
        self.loads[task_idx]
    }

    /// Execution time of task `task_idx` on VM `vm_idx`.
    #[inline]
    pub fn exec_time(&self, task_idx: usize, vm_idx: usize) -> f64 {
        self.loads[task_idx] / self.cores[vm_idx]
    }

    /// Total number of cores across the fleet.
    pub fn total_cores(&self) -> f64 {
        self.cores.iter().sum()
    }

    /// Computes the VM-Load vector of a discrete solution.
    ///
    /// `load[v] = Σ exec_time(t, v)` over tasks `t` with `solution[t] = v`.
    pub fn vm_loads(&self, solution: &[usize]) -> Vec<f64> {
        let mut loads = vec![0.0; self.vm_count()];
        self.vm_loads_into(solution, &mut loads);
        loads
    }

    /// Like [`vm_loads`](Self::vm_loads) but reuses the output buffer.
    pub fn vm_loads_into(&self, solution: &[usize], loads: &mut Vec<f64>) {
        loads.clear();
        loads.resize(self.vm_count(), 0.0);
        for (task_idx, &vm_idx) in solution.iter().enumerate() {
            loads[vm_idx] += self.exec_time(task_idx, vm_idx);
        }
    }

    /// Index of a task id.
    pub fn task_idx(&self, task_id: u64) -> Option<usize> {
        self.task_index.get(&task_id).copied()
    }

    /// Index of a VM name.
    pub fn vm_idx(&self, vm_name: &str) -> Option<usize> {
        self.vm_index.get(vm_name).copied()
    }

    /// Converts a discrete solution into an [`Assignment`].
    pub fn to_assignment(&self, solution: &[usize]) -> Assignment {
        self.tasks
            .iter()
            .zip(solution)
            .map(|(task, &vm_idx)| (task.id, self.vms[vm_idx].name.clone()))
            .collect()
    }

    /// Converts an [`Assignment`] back into a discrete solution.
    ///
    /// # Errors
    /// - [`ScheduleError::UnknownTask`] if a problem task is not assigned
    ///   (or the assignment names a task outside the problem).
    /// - [`ScheduleError::UnknownVm`] if a VM name is not in the fleet.
    pub fn solution_of(&self, assignment: &Assignment) -> Result<Vec<usize>, ScheduleError> {
        if let Some((id, _)) = assignment.iter().find(|(id, _)| self.task_idx(*id).is_none()) {
            return Err(ScheduleError::UnknownTask(id));
        }
        self.tasks
            .iter()
            .map(|task| {
                let vm_name = assignment
                    .vm_for(task.id)
                    .ok_or(ScheduleError::UnknownTask(task.id))?;
                self.vm_idx(vm_name)
                    .ok_or_else(|| ScheduleError::UnknownVm(vm_name.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchedulingProblem {
        let tasks = vec![Task::new(10, 8.0), Task::new(20, 4.0), Task::new(30, 2.0)];
        let vms = vec![Vm::new("a", 1), Vm::new("b", 2)];
        SchedulingProblem::new(&tasks, &vms).unwrap()
    }

    #[test]
    fn test_empty_fleet_fails_fast() {
        let err = SchedulingProblem::new(&[Task::new(1, 1.0)], &[]).unwrap_err();
        assert_eq!(err, ScheduleError::NoVirtualMachines);
    }

    #[test]
    fn test_invalid_input_is_reported() {
        let err = SchedulingProblem::new(&[Task::new(1, -1.0)], &[Vm::new("a", 1)]).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput(_)));
    }

    #[test]
    fn test_vm_loads() {
        let p = sample();
        // a: 8/1 + 2/1 = 10, b: 4/2 = 2
        let loads = p.vm_loads(&[0, 1, 0]);
        assert!((loads[0] - 10.0).abs() < 1e-10);
        assert!((loads[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_lookups() {
        let p = sample();
        assert_eq!(p.task_idx(20), Some(1));
        assert_eq!(p.task_idx(99), None);
        assert_eq!(p.vm_idx("b"), Some(1));
        assert_eq!(p.vm_idx("zzz"), None);
        assert!((p.total_cores() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_assignment_conversion() {
        let p = sample();
        let assignment = p.to_assignment(&[1, 0, 1]);
        assert_eq!(assignment.vm_for(10), Some("b"));
        assert_eq!(assignment.vm_for(20), Some("a"));
        assert_eq!(p.solution_of(&assignment).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn test_solution_of_rejects_unknowns() {
        let p = sample();
        let mut missing = p.to_assignment(&[0, 0, 0]);
        missing.mapping.remove(&30);
        assert_eq!(p.solution_of(&missing), Err(ScheduleError::UnknownTask(30)));

        let mut bad_vm = p.to_assignment(&[0, 0, 0]);
        bad_vm.assign(10, "ghost");
        assert_eq!(
            p.solution_of(&bad_vm),
            Err(ScheduleError::UnknownVm("ghost".into()))
        );

        let mut extra = p.to_assignment(&[0, 0, 0]);
        extra.assign(77, "a");
        assert_eq!(p.solution_of(&extra), Err(ScheduleError::UnknownTask(77)));
    }
}
