//! Task-to-VM scheduling with the Cloudy-GSA metaheuristic.
//!
//! Assigns independent CPU-bound tasks to a heterogeneous fleet of
//! virtual machines, minimizing a weighted cost of makespan, load
//! imbalance and idle capacity. Round Robin and Stochastic Hill
//! Climbing are provided as baselines behind the same [`Scheduler`]
//! trait.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Vm`, `Assignment`
//! - **`validation`**: Input integrity checks (duplicate ids, zero cores, bad loads)
//! - **`problem`**: Validated, index-stable problem instance
//! - **`fitness`**: Multi-objective cost model
//! - **`gsa`**: Cloudy-GSA engine (gravity, local search, elitism, anti-stagnation)
//! - **`scheduler`**: `Scheduler` trait, strategies and load KPIs
//!
//! # Example
//!
//! ```
//! use cloudy_gsa::models::{Task, Vm};
//! use cloudy_gsa::scheduler::{GsaScheduler, RoundRobinScheduler, Scheduler};
//! use cloudy_gsa::gsa::GsaConfig;
//!
//! let tasks: Vec<Task> = (0..12).map(|i| Task::from_class(i, (i % 5 + 1) as u32)).collect();
//! let vms = vec![Vm::new("vm1", 1), Vm::new("vm2", 2), Vm::new("vm3", 4)];
//!
//! let gsa = GsaScheduler::with_config(
//!     GsaConfig::default().with_population_size(10).with_max_iterations(20),
//! )
//! .with_seed(42);
//! for scheduler in [&gsa as &dyn Scheduler, &RoundRobinScheduler] {
//!     let assignment = scheduler.schedule(&tasks, &vms).unwrap();
//!     assert_eq!(assignment.len(), tasks.len());
//! }
//! ```
//!
//! # References
//!
//! - Rashedi, Nezamabadi-pour & Saryazdi (2009), "GSA: A Gravitational Search Algorithm"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod error;
pub mod fitness;
pub mod gsa;
pub mod models;
pub mod problem;
pub mod scheduler;
pub mod validation;

pub use error::ScheduleError;
pub use problem::SchedulingProblem;
pub use scheduler::Scheduler;
