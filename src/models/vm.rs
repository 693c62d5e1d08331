//! Virtual machine model.
//!
//! VMs are the execution targets. Only `cpu_cores` enters the cost
//! model; `address` and `ram_gb` are carried for downstream executors.

use serde::{Deserialize, Serialize};

use super::Task;

/// A virtual machine that tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vm {
    /// Unique VM name.
    pub name: String,
    /// Network locator (opaque to the scheduler).
    pub address: String,
    /// Number of CPU cores (positive).
    pub cpu_cores: u32,
    /// Memory in GB (informational).
    pub ram_gb: f64,
}

impl Vm {
    /// Creates a VM with the given name and core count.
    pub fn new(name: impl Into<String>, cpu_cores: u32) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            cpu_cores,
            ram_gb: 0.0,
        }
    }

    /// Sets the network address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Sets the memory size.
    pub fn with_ram_gb(mut self, ram_gb: f64) -> Self {
        self.ram_gb = ram_gb;
        self
    }

    /// Execution time of `task` on this VM: `cpu_load / cpu_cores`.
    #[inline]
    pub fn exec_time(&self, task: &Task) -> f64 {
        task.cpu_load / f64::from(self.cpu_cores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vm_builder() {
        let vm = Vm::new("vm3", 4)
            .with_address("10.0.0.3:5000")
            .with_ram_gb(4.0);
        assert_eq!(vm.name, "vm3");
        assert_eq!(vm.address, "10.0.0.3:5000");
        assert_eq!(vm.cpu_cores, 4);
        assert!((vm.ram_gb - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_exec_time_scales_with_cores() {
        let task = Task::new(1, 80.0);
        assert!((Vm::new("a", 1).exec_time(&task) - 80.0).abs() < 1e-10);
        assert!((Vm::new("b", 8).exec_time(&task) - 10.0).abs() < 1e-10);
    }
}
