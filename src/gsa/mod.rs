//! Cloudy-GSA: gravitational search for task-to-VM placement.
//!
//! Particles move in a continuous space with one coordinate per task;
//! decoding rounds each coordinate to a VM index. Better particles are
//! heavier and pull the others toward them under a decaying
//! gravitational constant. The search is hybridized with:
//!
//! - **Local search** on the top-ranked particles (move / swap / greedy)
//! - **Mutation** of the remaining particles, stronger for worse ones
//! - **Elitism**: an archive of the best solutions re-injected over the
//!   worst particles
//! - **Anti-stagnation**: G reset, inertia boost or partial restart
//!   after a run of non-improving iterations
//!
//! # Submodules
//!
//! - [`encoding`]: continuous ↔ discrete conversion
//! - [`gravity`]: mass, G(t), forces, motion, inertia
//! - [`local_search`]: strict-descent neighbourhoods
//! - [`mutation`]: adaptive coordinate reassignment
//! - [`elitism`]: archive, global best, stagnation counter
//!
//! # Reference
//! - Rashedi et al. (2009), "GSA: A Gravitational Search Algorithm"

mod config;
pub mod elitism;
pub mod encoding;
pub mod gravity;
pub mod local_search;
pub mod mutation;
mod population;
mod runner;

pub use config::{
    DistancePower, GsaConfig, InertiaSchedule, LocalSearchConfig, LocalSearchStrategy,
    Neighborhood, StagnationResponse,
};
pub use population::{Particle, Population};
pub use runner::{GsaContext, GsaResult, GsaRunner};
