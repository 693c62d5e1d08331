//! Task model.
//!
//! A task is an independent, atomic unit of computational work. Tasks
//! have no precedence relations and are never preempted: each is placed
//! on exactly one VM and runs there to completion.

use serde::{Deserialize, Serialize};

/// Workload units per squared class index (see [`Task::from_class`]).
pub const CLASS_LOAD_FACTOR: f64 = 10_000.0;

/// A computational task to be placed on a VM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: u64,
    /// Human-readable name.
    pub name: String,
    /// Workload class (small ordinal range, e.g. 1..=10).
    pub class_index: u32,
    /// Workload in abstract CPU units (positive).
    pub cpu_load: f64,
}

impl Task {
    /// Creates a task with an explicit workload.
    pub fn new(id: u64, cpu_load: f64) -> Self {
        Self {
            id,
            name: format!("task-{id}"),
            class_index: 0,
            cpu_load,
        }
    }

    /// Creates a task whose workload grows with the square of its class.
    ///
    /// `cpu_load = class_index² · CLASS_LOAD_FACTOR`
    pub fn from_class(id: u64, class_index: u32) -> Self {
        let class = f64::from(class_index);
        Self {
            id,
            name: format!("task-{class_index}-{id}"),
            class_index,
            cpu_load: class * class * CLASS_LOAD_FACTOR,
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the workload class without touching the load.
    pub fn with_class_index(mut self, class_index: u32) -> Self {
        self.class_index = class_index;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder() {
        let task = Task::new(7, 42.5).with_name("render").with_class_index(3);
        assert_eq!(task.id, 7);
        assert_eq!(task.name, "render");
        assert_eq!(task.class_index, 3);
        assert!((task.cpu_load - 42.5).abs() < 1e-10);
    }

    #[test]
    fn test_task_from_class() {
        let task = Task::from_class(4, 3);
        assert_eq!(task.name, "task-3-4");
        assert_eq!(task.class_index, 3);
        assert!((task.cpu_load - 90_000.0).abs() < 1e-10);
    }

    #[test]
    fn test_class_load_is_monotonic() {
        let loads: Vec<f64> = (1..=10).map(|c| Task::from_class(0, c).cpu_load).collect();
        assert!(loads.windows(2).all(|w| w[0] < w[1]));
    }
}
