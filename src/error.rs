//! Error type for scheduling entry points.

use crate::validation::ValidationError;

/// Errors returned by schedulers and problem construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    /// The VM fleet is empty, so no task has a valid target.
    #[error("no virtual machines available")]
    NoVirtualMachines,

    /// Tasks or VMs failed validation.
    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A task id is not part of the problem.
    #[error("unknown task id {0}")]
    UnknownTask(u64),

    /// A VM name is not part of the problem.
    #[error("unknown VM '{0}'")]
    UnknownVm(String),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, Vm};
    use crate::validation::validate_input;

    #[test]
    fn test_invalid_input_lists_every_message() {
        let errors = validate_input(&[Task::new(1, -1.0)], &[Vm::new("vm1", 0)]).unwrap_err();
        let msg = ScheduleError::InvalidInput(errors).to_string();
        assert!(msg.contains("vm1"));
        assert!(msg.contains("Task 1"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ScheduleError::NoVirtualMachines.to_string(),
            "no virtual machines available"
        );
        assert_eq!(
            ScheduleError::UnknownVm("x".into()).to_string(),
            "unknown VM 'x'"
        );
    }
}
