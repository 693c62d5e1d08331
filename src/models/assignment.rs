//! Assignment (solution) model.
//!
//! An assignment maps every task to exactly one VM. It is the only
//! thing a scheduler hands to the downstream executor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete task → VM mapping.
///
/// Entries are kept ordered by task id, so two equal assignments
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Task id → VM name.
    pub mapping: BTreeMap<u64, String>,
}

impl Assignment {
    /// Creates an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a task on a VM, replacing any previous placement.
    pub fn assign(&mut self, task_id: u64, vm_name: impl Into<String>) {
        self.mapping.insert(task_id, vm_name.into());
    }

    /// VM name assigned to a task.
    pub fn vm_for(&self, task_id: u64) -> Option<&str> {
        self.mapping.get(&task_id).map(|s| s.as_str())
    }

    /// Task ids placed on a VM, in ascending id order.
    pub fn tasks_on(&self, vm_name: &str) -> Vec<u64> {
        self.mapping
            .iter()
            .filter(|(_, vm)| vm.as_str() == vm_name)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Iterates over (task id, VM name) pairs in task id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.mapping.iter().map(|(&id, vm)| (id, vm.as_str()))
    }

    /// Number of assigned tasks.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Whether no task is assigned.
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl FromIterator<(u64, String)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (u64, String)>>(iter: I) -> Self {
        Self {
            mapping: iter.into_iter().collect(),
        }
    }
}
