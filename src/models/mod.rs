//! Scheduling domain models.
//!
//! Provides the entities of the task-to-VM placement problem and the
//! solution type handed to executors.
//!
//! | Type | Role |
//! |------|------|
//! | Task | Independent unit of work with a CPU load |
//! | Vm | Execution target with a core count |
//! | Assignment | Total map task id → VM name |

mod assignment;
mod task;
mod vm;

pub use assignment::Assignment;
pub use task::{Task, CLASS_LOAD_FACTOR};
pub use vm::Vm;
