//! Mutation and diversification.
//!
//! A mutated particle has some of its coordinates reassigned to
//! uniformly random VM indices. With adaptive strength, particles
//! further above the population mean fitness lose more coordinates.

use rand::Rng;

/// Number of coordinates to mutate.
///
/// Non-adaptive, or at/below the mean: 1. Otherwise
/// `ceil(max_fraction · n_tasks · (f − mean) / (worst − mean + ε))`,
/// clamped to `[1, max(1, floor(max_fraction · n_tasks))]`.
pub fn mutation_count(
    fitness: f64,
    mean: f64,
    worst: f64,
    n_tasks: usize,
    max_fraction: f64,
    adaptive: bool,
    epsilon: f64,
) -> usize {
    if n_tasks == 0 {
        return 0;
    }
    let upper = ((max_fraction * n_tasks as f64).floor() as usize).clamp(1, n_tasks);
    if !adaptive || fitness <= mean {
        return 1;
    }
    let severity = ((fitness - mean) / (worst - mean + epsilon)).clamp(0.0, 1.0);
    let count = (max_fraction * n_tasks as f64 * severity).ceil() as usize;
    count.clamp(1, upper)
}

/// Reassigns `count` random coordinates of `position` to random VM
/// indices (integer coordinates). Coordinates may repeat.
pub fn mutate_position<R: Rng>(position: &mut [f64], n_vms: usize, count: usize, rng: &mut R) {
    if position.is_empty() || n_vms == 0 {
        return;
    }
    for _ in 0..count {
        let task = rng.random_range(0..position.len());
        position[task] = rng.random_range(0..n_vms) as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_count_non_adaptive() {
        assert_eq!(mutation_count(500.0, 10.0, 500.0, 100, 0.1, false, 1e-12), 1);
    }

    #[test]
    fn test_count_scales_with_severity() {
        let best_half = mutation_count(5.0, 10.0, 20.0, 100, 0.1, true, 1e-12);
        let mid = mutation_count(15.0, 10.0, 20.0, 100, 0.1, true, 1e-12);
        let worst = mutation_count(20.0, 10.0, 20.0, 100, 0.1, true, 1e-12);
        assert_eq!(best_half, 1);
        assert_eq!(mid, 5);
        assert_eq!(worst, 10);
    }

    #[test]
    fn test_count_bounds() {
        assert_eq!(mutation_count(20.0, 10.0, 20.0, 3, 0.1, true, 1e-12), 1);
        assert_eq!(mutation_count(20.0, 10.0, 20.0, 0, 0.1, true, 1e-12), 0);
        assert_eq!(mutation_count(1e9, 10.0, 20.0, 50, 1.0, true, 1e-12), 50);
    }

    #[test]
    fn test_mutate_position_uses_valid_indices() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut position = vec![0.4; 20];
        mutate_position(&mut position, 4, 10, &mut rng);
        let changed = position.iter().filter(|&&x| x != 0.4).count();
        assert!(changed >= 1 && changed <= 10);
        for &x in &position {
            assert!(x == 0.4 || (x.fract() == 0.0 && (0.0..4.0).contains(&x)));
        }
    }
}
