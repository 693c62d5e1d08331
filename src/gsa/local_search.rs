//! Deterministic local search on discrete solutions.
//!
//! All neighbourhoods are strict descent: a tentative change is kept
//! only if it lowers fitness. Tentative moves update the cached VM-Load
//! vector in place and restore it on rejection, so each candidate costs
//! O(n_vms) to score instead of a full re-evaluation.
//!
//! | Neighbourhood | Candidates | Acceptance |
//! |---------------|------------|------------|
//! | Move | tasks on the most loaded VM → least loaded VM | first improvement |
//! | Swap | (most loaded task, least loaded task) pairs | best improvement |
//! | Greedy | heaviest task of the most loaded VM → any other VM | first improvement |

use super::config::{LocalSearchConfig, LocalSearchStrategy};
use crate::fitness::{argmax, argmin, FitnessModel};
use crate::problem::SchedulingProblem;

/// Local search bound to a problem and cost model.
#[derive(Debug, Clone, Copy)]
pub struct LocalSearch<'a> {
    problem: &'a SchedulingProblem,
    model: &'a FitnessModel,
    config: LocalSearchConfig,
}

impl<'a> LocalSearch<'a> {
    /// Creates a local search.
    pub fn new(
        problem: &'a SchedulingProblem,
        model: &'a FitnessModel,
        config: LocalSearchConfig,
    ) -> Self {
        Self {
            problem,
            model,
            config,
        }
    }

    /// Improves the solution of the particle at `rank`.
    ///
    /// `Alternating` resolves to MoveSwap on even ranks and Greedy on odd.
    pub fn improve_ranked(&self, solution: &mut [usize], fitness: f64, rank: usize) -> f64 {
        let strategy = match self.config.strategy {
            LocalSearchStrategy::Alternating if rank % 2 == 0 => LocalSearchStrategy::MoveSwap,
            LocalSearchStrategy::Alternating => LocalSearchStrategy::Greedy,
            s => s,
        };
        self.improve(solution, fitness, strategy)
    }

    /// Runs up to `rounds` improvement rounds and returns the new fitness.
    ///
    /// `fitness` must be the current fitness of `solution`. The returned
    /// value never exceeds it; if no strict improvement survives exact
    /// re-evaluation, `solution` is left unchanged.
    pub fn improve(
        &self,
        solution: &mut [usize],
        fitness: f64,
        strategy: LocalSearchStrategy,
    ) -> f64 {
        if self.problem.vm_count() < 2 || solution.is_empty() {
            return fitness;
        }
        let original = solution.to_vec();
        let mut loads = self.problem.vm_loads(solution);
        let mut current = fitness;
        let mut changed = false;

        for _ in 0..self.config.rounds {
            let improved = match strategy {
                LocalSearchStrategy::Greedy => self.greedy_pass(solution, &mut loads, &mut current),
                _ => {
                    let moved = self.move_pass(solution, &mut loads, &mut current);
                    let swapped = self.swap_pass(solution, &mut loads, &mut current);
                    moved || swapped
                }
            };
            if !improved {
                break;
            }
            changed = true;
        }

        if !changed {
            return fitness;
        }
        let exact = self.model.evaluate(self.problem, solution);
        if exact < fitness {
            exact
        } else {
            solution.copy_from_slice(&original);
            fitness
        }
    }

    /// Tasks on `vm`, heaviest first when capped.
    fn tasks_on(&self, solution: &[usize], vm: usize) -> Vec<usize> {
        let mut tasks: Vec<usize> = (0..solution.len()).filter(|&t| solution[t] == vm).collect();
        if let Some(cap) = self.config.candidate_cap {
            if tasks.len() > cap {
                tasks.sort_by(|&a, &b| self.problem.load(b).total_cmp(&self.problem.load(a)));
                tasks.truncate(cap);
            }
        }
        tasks
    }

    fn move_pass(&self, solution: &mut [usize], loads: &mut [f64], current: &mut f64) -> bool {
        let most = argmax(loads);
        let least = argmin(loads);
        if most == least {
            return false;
        }
        let mut improved = false;
        for task in self.tasks_on(solution, most) {
            let (old_most, old_least) = (loads[most], loads[least]);
            loads[most] -= self.problem.exec_time(task, most);
            loads[least] += self.problem.exec_time(task, least);
            let candidate = self.model.score_loads(loads);
            if candidate < *current {
                solution[task] = least;
                *current = candidate;
                improved = true;
            } else {
                loads[most] = old_most;
                loads[least] = old_least;
            }
        }
        improved
    }

    fn swap_pass(&self, solution: &mut [usize], loads: &mut [f64], current: &mut f64) -> bool {
        let most = argmax(loads);
        let least = argmin(loads);
        if most == least {
            return false;
        }
        let on_most = self.tasks_on(solution, most);
        let on_least = self.tasks_on(solution, least);
        let (old_most, old_least) = (loads[most], loads[least]);

        let mut best: Option<(usize, usize, f64)> = None;
        for &a in &on_most {
            for &b in &on_least {
                loads[most] = old_most - self.problem.exec_time(a, most)
                    + self.problem.exec_time(b, most);
                loads[least] = old_least - self.problem.exec_time(b, least)
                    + self.problem.exec_time(a, least);
                let candidate = self.model.score_loads(loads);
                let bar = best.map_or(*current, |(_, _, f)| f);
                if candidate < bar {
                    best = Some((a, b, candidate));
                }
            }
        }

        match best {
            Some((a, b, f)) => {
                loads[most] = old_most - self.problem.exec_time(a, most)
                    + self.problem.exec_time(b, most);
                loads[least] = old_least - self.problem.exec_time(b, least)
                    + self.problem.exec_time(a, least);
                solution[a] = least;
                solution[b] = most;
                *current = f;
                true
            }
            None => {
                loads[most] = old_most;
                loads[least] = old_least;
                false
            }
        }
    }

    fn greedy_pass(&self, solution: &mut [usize], loads: &mut [f64], current: &mut f64) -> bool {
        let most = argmax(loads);
        let heaviest = (0..solution.len())
            .filter(|&t| solution[t] == most)
            .fold(None, |acc: Option<usize>, t| match acc {
                Some(h) if self.problem.load(h) >= self.problem.load(t) => Some(h),
                _ => Some(t),
            });
        let Some(task) = heaviest else {
            return false;
        };

        let old_most = loads[most];
        for target in (0..loads.len()).filter(|&v| v != most) {
            let old_target = loads[target];
            loads[most] = old_most - self.problem.exec_time(task, most);
            loads[target] += self.problem.exec_time(task, target);
            let candidate = self.model.score_loads(loads);
            if candidate < *current {
                solution[task] = target;
                *current = candidate;
                return true;
            }
            loads[most] = old_most;
            loads[target] = old_target;
        }
        false
    }
}
