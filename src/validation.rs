//! Input validation for task-to-VM scheduling problems.
//!
//! Checks structural integrity of tasks and VMs before scheduling.
//! Detects:
//! - Duplicate task ids and VM names
//! - An empty VM fleet
//! - VMs without cores
//! - Tasks with non-positive or non-finite load

use crate::models::{Task, Vm};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two tasks share an id, or two VMs share a name.
    DuplicateId,
    /// No VM is available to receive tasks.
    EmptyFleet,
    /// A VM reports zero cores.
    InvalidCapacity,
    /// A task load is zero, negative, NaN or infinite.
    InvalidLoad,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a scheduling problem.
///
/// Checks:
/// 1. At least one VM
/// 2. No duplicate VM names
/// 3. Every VM has at least one core
/// 4. No duplicate task ids
/// 5. Every task load is finite and positive
///
/// An empty task list is valid.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(tasks: &[Task], vms: &[Vm]) -> ValidationResult {
    let mut errors = Vec::new();

    if vms.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyFleet,
            "No VMs available",
        ));
    }

    let mut vm_names = HashSet::new();
    for vm in vms {
        if !vm_names.insert(vm.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate VM name: {}", vm.name),
            ));
        }
        if vm.cpu_cores == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!("VM '{}' has no CPU cores", vm.name),
            ));
        }
    }

    let mut task_ids = HashSet::new();
    for task in tasks {
        if !task_ids.insert(task.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
        if !(task.cpu_load.is_finite() && task.cpu_load > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidLoad,
                format!("Task {} has invalid load {}", task.id, task.cpu_load),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
