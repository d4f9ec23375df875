//! Information-theoretic statistics over categorical arrays
//!
//! All quantities follow the convention `0 * log(0) = 0`, so empty buckets
//! contribute nothing.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::{
    hist::{hist1d, hist2d, hist3d},
    utils::shuffle_bin_array,
};

/// `p * log(p)` where the numerator and denominator of `p` are counts
fn plogp(count: usize, total: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        let p = count as f64 / total as f64;
        p * p.ln()
    }
}

/// Shannon entropy of a categorical array
pub fn entropy(x: &[usize], x_bins: usize, base: u32) -> f64 {
    let table = hist1d(x, x_bins);
    let total = table.total();
    if total == 0 {
        return 0.0;
    }
    let h = -table
        .counts()
        .iter()
        .map(|&c| plogp(c, total))
        .sum::<f64>();
    h / f64::from(base).ln()
}

/// Mutual information between `x` and `y`
pub fn mutual_information(
    x: &[usize],
    y: &[usize],
    x_bins: usize,
    y_bins: usize,
    base: u32,
) -> f64 {
    let table = hist2d(x, y, x_bins, y_bins);
    let total = table.total();
    if total == 0 {
        return 0.0;
    }

    let counts = table.counts();
    let mut x_marginal = vec![0; x_bins];
    let mut y_marginal = vec![0; y_bins];
    for i in 0..x_bins {
        for j in 0..y_bins {
            let c = counts[i * y_bins + j];
            x_marginal[i] += c;
            y_marginal[j] += c;
        }
    }

    let n = total as f64;
    let mut mi = 0.0;
    for i in 0..x_bins {
        for j in 0..y_bins {
            let c = counts[i * y_bins + j];
            if c == 0 {
                continue;
            }
            let c = c as f64;
            mi += (c / n) * ((c * n) / (x_marginal[i] as f64 * y_marginal[j] as f64)).ln();
        }
    }

    (mi / f64::from(base).ln()).max(0.0)
}

/// Mutual information between `x` and `y` conditioned on `z`
///
/// Equivalent to the `z`-bucket weighted sum of the mutual information of
/// `x` and `y` restricted to the genes of each `z` bucket.
pub fn conditional_mutual_information(
    x: &[usize],
    y: &[usize],
    z: &[usize],
    x_bins: usize,
    y_bins: usize,
    z_bins: usize,
    base: u32,
) -> f64 {
    let table = hist3d(x, y, z, x_bins, y_bins, z_bins);
    let total = table.total();
    if total == 0 {
        return 0.0;
    }

    let counts = table.counts();
    let cell = |i: usize, j: usize, k: usize| counts[(i * y_bins + j) * z_bins + k];

    let mut xz = vec![0; x_bins * z_bins];
    let mut yz = vec![0; y_bins * z_bins];
    let mut zs = vec![0; z_bins];
    for i in 0..x_bins {
        for j in 0..y_bins {
            for k in 0..z_bins {
                let c = cell(i, j, k);
                xz[i * z_bins + k] += c;
                yz[j * z_bins + k] += c;
                zs[k] += c;
            }
        }
    }

    let n = total as f64;
    let mut cmi = 0.0;
    for i in 0..x_bins {
        for j in 0..y_bins {
            for k in 0..z_bins {
                let c = cell(i, j, k);
                if c == 0 {
                    continue;
                }
                let c = c as f64;
                let ratio = (c * zs[k] as f64)
                    / (xz[i * z_bins + k] as f64 * yz[j * z_bins + k] as f64);
                cmi += (c / n) * ratio.ln();
            }
        }
    }

    (cmi / f64::from(base).ln()).max(0.0)
}

/// Builds the generator for a single permutation trial
///
/// Every trial shares the seed but draws from its own ChaCha stream, so the
/// null sample does not depend on how trials are scheduled across workers.
fn trial_rng(seed: u64, trial: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    rng
}

/// Null distribution of mutual information under permutation of `x`
pub fn calculate_mi_permutations(
    x: &[usize],
    y: &[usize],
    x_bins: usize,
    y_bins: usize,
    base: u32,
    n: usize,
    seed: u64,
) -> Vec<f64> {
    (0..n)
        .into_par_iter()
        .map(|trial| {
            let mut rng = trial_rng(seed, trial);
            let shuffled = shuffle_bin_array(x, &mut rng);
            mutual_information(&shuffled, y, x_bins, y_bins, base)
        })
        .collect()
}

/// Null distribution of conditional mutual information under permutation of `x`
#[allow(clippy::too_many_arguments)]
pub fn calculate_cmi_permutations(
    x: &[usize],
    y: &[usize],
    z: &[usize],
    x_bins: usize,
    y_bins: usize,
    z_bins: usize,
    base: u32,
    n: usize,
    seed: u64,
) -> Vec<f64> {
    (0..n)
        .into_par_iter()
        .map(|trial| {
            let mut rng = trial_rng(seed, trial);
            let shuffled = shuffle_bin_array(x, &mut rng);
            conditional_mutual_information(&shuffled, y, z, x_bins, y_bins, z_bins, base)
        })
        .collect()
}

/// Ratio of the information `a` retains about `x` once `b` is known to the
/// information shared between `a` and `b`
///
/// Larger values mean `a` is less redundant with `b`. When `a` and `b` share
/// no information the ratio is infinite, unless `a` also carries nothing
/// about `x` beyond `b`, in which case it is zero.
pub fn measure_redundancy(
    x: &[usize],
    a: &[usize],
    b: &[usize],
    x_bins: usize,
    a_bins: usize,
    b_bins: usize,
    base: u32,
) -> f64 {
    let unique = conditional_mutual_information(x, a, b, x_bins, a_bins, b_bins, base);
    let overlap = mutual_information(a, b, a_bins, b_bins, base);
    if overlap > 0.0 {
        unique / overlap
    } else if unique > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}
