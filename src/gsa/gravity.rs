//! Gravitational search dynamics.
//!
//! # Algorithm
//!
//! Per iteration `t` of `T`:
//! 1. **Mass**: `m_i = (worst − f_i) / (worst − best)`, normalized to sum 1.
//!    Uniform `1/P` when the fitness spread is below ε.
//! 2. **Gravity**: `G(t) = G0 · exp(−α · (t − t_reset) / T)`.
//! 3. **Force**: `F_i = Σ_j r · G · m_j / dist(i,j)^p · (x_j − x_i)` with a
//!    fresh uniform `r` per coordinate and pair; `dist` is Euclidean + ε.
//! 4. **Motion**: `a_i = F_i / (m_i + ε)`, `v_i = w·v_i + a_i` (clamped),
//!    `x_i += v_i` (clipped to `[0, n_vms−1]`).
//!
//! Forces are computed against a read-only snapshot of the population,
//! so the per-particle work is independent.
//!
//! # Complexity
//! O(P · k · n_tasks) per iteration, `k = P` for the full neighbourhood.
//!
//! # Reference
//! Rashedi, Nezamabadi-pour & Saryazdi (2009), "GSA: A Gravitational
//! Search Algorithm", Information Sciences 179(13).

use rand::Rng;

use super::config::{DistancePower, InertiaSchedule, Neighborhood};
use super::population::Particle;

/// Normalized masses from fitness values (lower fitness → heavier).
///
/// The result sums to 1 and has no negative entries. An empty input
/// yields an empty vector.
pub fn compute_mass(fitness: &[f64], epsilon: f64) -> Vec<f64> {
    if fitness.is_empty() {
        return Vec::new();
    }
    let best = fitness.iter().copied().fold(f64::INFINITY, f64::min);
    let worst = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let n = fitness.len() as f64;

    if !(worst - best >= epsilon) {
        return vec![1.0 / n; fitness.len()];
    }

    let range = worst - best;
    let raw: Vec<f64> = fitness.iter().map(|&f| (worst - f) / range).collect();
    // The best particle contributes 1, so the total is at least 1.
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|m| m / total).collect()
}

/// Gravitational constant at iteration `t` of `total`, decaying from
/// `g0` since `t_reset`.
pub fn gravitational_constant(g0: f64, alpha: f64, t: usize, t_reset: usize, total: usize) -> f64 {
    if total == 0 {
        return g0;
    }
    let elapsed = t.saturating_sub(t_reset) as f64;
    g0 * (-alpha * elapsed / total as f64).exp()
}

/// Number of best-ranked particles that exert force at iteration `t`.
pub fn neighborhood_size(
    neighborhood: Neighborhood,
    population: usize,
    t: usize,
    total: usize,
) -> usize {
    match neighborhood {
        Neighborhood::Full => population,
        Neighborhood::KBest { min_k } => {
            let floor = min_k.min(population);
            let progress = t as f64 / total.max(1) as f64;
            let k = population as f64 - (population - floor) as f64 * progress;
            (k.round() as usize).clamp(floor, population)
        }
    }
}

/// Accumulates the force acting on particle `i` into `out`.
///
/// `neighbors` are slot indices of attracting particles; `i` itself is
/// skipped if present.
#[allow(clippy::too_many_arguments)]
pub fn compute_force<R: Rng>(
    i: usize,
    particles: &[Particle],
    masses: &[f64],
    neighbors: &[usize],
    g: f64,
    power: DistancePower,
    epsilon: f64,
    rng: &mut R,
    out: &mut [f64],
) {
    out.iter_mut().for_each(|f| *f = 0.0);
    let xi = &particles[i].position;

    for &j in neighbors {
        if j == i {
            continue;
        }
        let xj = &particles[j].position;
        let dist_sq: f64 = xi.iter().zip(xj).map(|(a, b)| (b - a) * (b - a)).sum();
        let dist = dist_sq.sqrt() + epsilon;
        let scale = g * masses[j] / power.apply(dist);

        for ((f, a), b) in out.iter_mut().zip(xi).zip(xj) {
            *f += rng.random::<f64>() * scale * (b - a);
        }
    }
}

/// Applies acceleration, velocity clamping and position clipping.
pub fn apply_motion(
    particle: &mut Particle,
    force: &[f64],
    mass: f64,
    inertia: f64,
    velocity_clamp: f64,
    max_coord: f64,
    epsilon: f64,
) {
    let inv_mass = 1.0 / (mass + epsilon);
    for ((x, v), f) in particle
        .position
        .iter_mut()
        .zip(particle.velocity.iter_mut())
        .zip(force)
    {
        *v = (inertia * *v + f * inv_mass).clamp(-velocity_clamp, velocity_clamp);
        *x = (*x + *v).clamp(0.0, max_coord);
    }
}

/// Tracks the inertia weight over a run.
#[derive(Debug, Clone, PartialEq)]
pub struct InertiaController {
    schedule: InertiaSchedule,
    current: f64,
    stale: usize,
    decay_start: usize,
}

impl InertiaController {
    /// Starts at the schedule's initial weight.
    pub fn new(schedule: InertiaSchedule) -> Self {
        Self {
            schedule,
            current: schedule.max(),
            stale: 0,
            decay_start: 0,
        }
    }

    /// Weight to use at iteration `t` of `total`.
    pub fn weight(&self, t: usize, total: usize) -> f64 {
        match self.schedule {
            InertiaSchedule::Fixed(w) => w,
            InertiaSchedule::LinearDecay { max, min } => {
                let progress = t.saturating_sub(self.decay_start) as f64 / total.max(1) as f64;
                (max - (max - min) * progress).clamp(min, max)
            }
            InertiaSchedule::Reactive { .. } => self.current,
        }
    }

    /// Feeds back whether the global best improved this iteration.
    pub fn observe(&mut self, improved: bool) {
        if let InertiaSchedule::Reactive {
            min,
            max,
            step,
            patience,
        } = self.schedule
        {
            if improved {
                self.current = (self.current - step).max(min);
                self.stale = 0;
            } else {
                self.stale += 1;
                if self.stale >= patience {
                    self.current = (self.current + step).min(max);
                    self.stale = 0;
                }
            }
        }
    }

    /// Pushes the weight back to its maximum from iteration `t` on.
    ///
    /// No effect on a fixed schedule.
    pub fn boost(&mut self, t: usize) {
        self.current = self.schedule.max();
        self.stale = 0;
        self.decay_start = t;
    }
}
