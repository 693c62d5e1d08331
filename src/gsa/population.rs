//! Particles and the population container.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::encoding::{decode, encode};
use crate::fitness::FitnessModel;
use crate::problem::SchedulingProblem;

/// One candidate solution in continuous form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Coordinates in `[0, n_vms−1]`, one per task.
    pub position: Vec<f64>,
    /// Velocity, same shape as `position`.
    pub velocity: Vec<f64>,
    /// Fitness of `solution` (lower = better).
    pub fitness: f64,
    /// Last decoded discrete solution.
    pub solution: Vec<usize>,
}

impl Particle {
    /// Creates a particle at rest at a uniformly random position.
    pub fn random<R: Rng>(n_tasks: usize, n_vms: usize, rng: &mut R) -> Self {
        let max = n_vms.saturating_sub(1) as f64;
        let position: Vec<f64> = (0..n_tasks).map(|_| rng.random::<f64>() * max).collect();
        let solution = decode(&position, n_vms);
        Self {
            velocity: vec![0.0; n_tasks],
            position,
            fitness: f64::INFINITY,
            solution,
        }
    }

    /// Creates a particle at rest on the integer encoding of `solution`.
    pub fn from_solution(solution: Vec<usize>, fitness: f64) -> Self {
        Self {
            position: encode(&solution),
            velocity: vec![0.0; solution.len()],
            fitness,
            solution,
        }
    }

    /// Scores the cached solution with `model`.
    pub fn evaluate(&mut self, problem: &SchedulingProblem, model: &FitnessModel) {
        self.fitness = model.evaluate(problem, &self.solution);
    }

    /// Replaces the discrete solution and snaps the position onto it.
    pub fn set_solution(&mut self, solution: Vec<usize>, fitness: f64) {
        self.position = encode(&solution);
        self.solution = solution;
        self.fitness = fitness;
    }
}

/// Fixed-size collection of particles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    /// Particles, indexed by slot.
    pub particles: Vec<Particle>,
}

impl Population {
    /// Creates `size` random particles and evaluates them.
    pub fn random<R: Rng>(
        problem: &SchedulingProblem,
        model: &FitnessModel,
        size: usize,
        rng: &mut R,
    ) -> Self {
        let particles = (0..size)
            .map(|_| {
                let mut p = Particle::random(problem.task_count(), problem.vm_count(), rng);
                p.evaluate(problem, model);
                p
            })
            .collect();
        Self { particles }
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Fitness values by slot.
    pub fn fitness_values(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.fitness).collect()
    }

    /// Slot indices sorted best-first; ties keep slot order.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.particles.len()).collect();
        order.sort_by(|&a, &b| {
            self.particles[a]
                .fitness
                .total_cmp(&self.particles[b].fitness)
        });
        order
    }

    /// Mean fitness, or 0 for an empty population.
    pub fn mean_fitness(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(|p| p.fitness).sum::<f64>() / self.particles.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, Vm};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn problem() -> SchedulingProblem {
        let tasks: Vec<Task> = (0..6).map(|i| Task::new(i, (i + 1) as f64)).collect();
        let vms = vec![Vm::new("a", 1), Vm::new("b", 2), Vm::new("c", 4)];
        SchedulingProblem::new(&tasks, &vms).unwrap()
    }

    #[test]
    fn test_random_population_in_bounds() {
        let p = problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = Population::random(&p, &FitnessModel::default(), 10, &mut rng);
        assert_eq!(pop.len(), 10);
        for particle in &pop.particles {
            assert_eq!(particle.position.len(), 6);
            assert!(particle.position.iter().all(|&x| (0.0..=2.0).contains(&x)));
            assert!(particle.velocity.iter().all(|&v| v == 0.0));
            assert!(particle.fitness.is_finite());
        }
    }

    #[test]
    fn test_ranking_is_sorted() {
        let p = problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = Population::random(&p, &FitnessModel::default(), 8, &mut rng);
        let ranking = pop.ranking();
        for w in ranking.windows(2) {
            assert!(pop.particles[w[0]].fitness <= pop.particles[w[1]].fitness);
        }
    }

    #[test]
    fn test_ranking_ties_keep_slot_order() {
        let pop = Population {
            particles: vec![
                Particle::from_solution(vec![0], 2.0),
                Particle::from_solution(vec![0], 1.0),
                Particle::from_solution(vec![0], 2.0),
            ],
        };
        assert_eq!(pop.ranking(), vec![1, 0, 2]);
        assert!((pop.mean_fitness() - 5.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_set_solution_snaps_position() {
        let mut particle = Particle::from_solution(vec![0, 0], 5.0);
        particle.velocity = vec![0.3, -0.2];
        particle.set_solution(vec![2, 1], 3.0);
        assert_eq!(particle.position, vec![2.0, 1.0]);
        assert_eq!(particle.velocity, vec![0.3, -0.2]);
        assert!((particle.fitness - 3.0).abs() < 1e-10);
    }
}
