//! Stochastic hill climbing baseline.
//!
//! # Algorithm
//!
//! Each restart starts from a uniformly random assignment and keeps a
//! per-VM load cache plus the two largest loads. A move takes a random
//! task to a different random VM; the resulting makespan is predicted
//! in O(1):
//!
//! ```text
//! if source is not the most loaded VM: reject (makespan cannot drop)
//! new = max(load[src] − t/c_src, load[dst] + t/c_dst, second_max)
//! ```
//!
//! Only strict improvements are applied. The best assignment across
//! restarts is returned.
//!
//! # Complexity
//! O(R · (N + I)) for R restarts, N tasks and I iterations, plus O(M)
//! to refresh the top-two loads on each accepted move.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::Scheduler;
use crate::error::ScheduleError;
use crate::models::{Assignment, Task, Vm};
use crate::problem::SchedulingProblem;

/// Random-restart hill climber minimizing makespan.
#[derive(Debug, Clone)]
pub struct HillClimbScheduler {
    /// Move attempts per restart.
    pub iterations: usize,
    /// Number of independent restarts.
    pub restarts: usize,
    /// RNG seed (`None` seeds from the OS).
    pub seed: Option<u64>,
}

impl Default for HillClimbScheduler {
    fn default() -> Self {
        Self {
            iterations: 1000,
            restarts: 5,
            seed: None,
        }
    }
}

/// The two largest loads, with the index of the largest.
#[derive(Debug, Clone, Copy)]
struct TopTwo {
    max_idx: usize,
    max: f64,
    second: f64,
}

impl TopTwo {
    fn of(loads: &[f64]) -> Self {
        let mut top = Self {
            max_idx: 0,
            max: f64::NEG_INFINITY,
            second: f64::NEG_INFINITY,
        };
        for (i, &load) in loads.iter().enumerate() {
            if load > top.max {
                top.second = top.max;
                top.max = load;
                top.max_idx = i;
            } else if load > top.second {
                top.second = load;
            }
        }
        if loads.len() < 2 {
            top.second = 0.0;
        }
        top
    }
}

impl HillClimbScheduler {
    /// Hill climber with default budget (1000 iterations × 5 restarts).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the move attempts per restart.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the number of restarts (at least one is always run).
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Searches for a low-makespan solution; returns it with its makespan.
    pub fn optimize<R: Rng>(&self, problem: &SchedulingProblem, rng: &mut R) -> (Vec<usize>, f64) {
        let n_tasks = problem.task_count();
        let n_vms = problem.vm_count();
        if n_tasks == 0 {
            return (Vec::new(), 0.0);
        }
        if n_vms == 1 {
            let solution = vec![0; n_tasks];
            let makespan = problem.vm_loads(&solution)[0];
            return (solution, makespan);
        }

        let mut best: Option<(Vec<usize>, f64)> = None;
        for restart in 0..self.restarts.max(1) {
            let (solution, makespan) = self.climb(problem, rng);
            debug!(restart, makespan, "hill climbing restart finished");
            match &best {
                Some((_, f)) if *f <= makespan => {}
                _ => best = Some((solution, makespan)),
            }
        }
        best.unwrap_or_default()
    }

    fn climb<R: Rng>(&self, problem: &SchedulingProblem, rng: &mut R) -> (Vec<usize>, f64) {
        let n_tasks = problem.task_count();
        let n_vms = problem.vm_count();

        let mut solution: Vec<usize> = (0..n_tasks).map(|_| rng.random_range(0..n_vms)).collect();
        let mut loads = problem.vm_loads(&solution);
        let mut top = TopTwo::of(&loads);

        for _ in 0..self.iterations {
            let task = rng.random_range(0..n_tasks);
            let src = solution[task];
            // Uniform over the other n_vms - 1 VMs.
            let mut dst = rng.random_range(0..n_vms - 1);
            if dst >= src {
                dst += 1;
            }
            if src != top.max_idx {
                continue;
            }

            let new_src = loads[src] - problem.exec_time(task, src);
            let new_dst = loads[dst] + problem.exec_time(task, dst);
            let predicted = new_src.max(new_dst).max(top.second);
            if predicted < top.max {
                solution[task] = dst;
                loads[src] = new_src;
                loads[dst] = new_dst;
                top = TopTwo::of(&loads);
            }
        }
        (solution, top.max)
    }
}

impl Scheduler for HillClimbScheduler {
    fn name(&self) -> &'static str {
        "Stochastic Hill Climbing"
    }

    fn schedule(&self, tasks: &[Task], vms: &[Vm]) -> Result<Assignment, ScheduleError> {
        let problem = SchedulingProblem::new(tasks, vms)?;
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let (solution, _) = self.optimize(&problem, &mut rng);
        Ok(problem.to_assignment(&solution))
    }
}
