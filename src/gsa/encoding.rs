//! Continuous ↔ discrete solution encoding.
//!
//! Particles move in a continuous box `[0, n_vms−1]^n_tasks`. A position
//! is decoded coordinate-wise into a VM index by rounding and clipping.
//! The stochastic variant replaces round-to-nearest with a floor/ceil
//! coin flip on a configurable fraction of coordinates; its randomness
//! comes only from the RNG passed in.

use rand::Rng;

/// Decodes one coordinate: round to nearest, clip to `[0, n_vms−1]`.
#[inline]
pub fn decode_coordinate(x: f64, n_vms: usize) -> usize {
    let max = n_vms.saturating_sub(1) as f64;
    x.round().clamp(0.0, max) as usize
}

/// Decodes a position into a discrete solution.
///
/// # Example
///
/// ```
/// use cloudy_gsa::gsa::encoding::decode;
///
/// assert_eq!(decode(&[0.2, 1.6, -3.0, 9.0], 3), vec![0, 2, 0, 2]);
/// ```
pub fn decode(position: &[f64], n_vms: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(position.len());
    decode_into(position, n_vms, &mut out);
    out
}

fn decode_into(position: &[f64], n_vms: usize, out: &mut Vec<usize>) {
    out.clear();
    out.extend(position.iter().map(|&x| decode_coordinate(x, n_vms)));
}

/// Decodes with stochastic rounding on a fraction of coordinates.
///
/// Each coordinate independently, with probability `fraction`, takes
/// `floor(x)` or `ceil(x)` with equal chance instead of `round(x)`.
/// `fraction = 0.0` is identical to [`decode`] and draws nothing.
pub fn decode_stochastic<R: Rng>(
    position: &[f64],
    n_vms: usize,
    fraction: f64,
    rng: &mut R,
    out: &mut Vec<usize>,
) {
    if fraction <= 0.0 {
        decode_into(position, n_vms, out);
        return;
    }
    let max = n_vms.saturating_sub(1) as f64;
    out.clear();
    out.extend(position.iter().map(|&x| {
        let rounded = if rng.random_bool(fraction.min(1.0)) {
            if rng.random_bool(0.5) {
                x.floor()
            } else {
                x.ceil()
            }
        } else {
            x.round()
        };
        rounded.clamp(0.0, max) as usize
    }));
}

/// Encodes a discrete solution as integer coordinates.
pub fn encode(solution: &[usize]) -> Vec<f64> {
    solution.iter().map(|&v| v as f64).collect()
}
