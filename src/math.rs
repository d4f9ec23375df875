use adjustp::{adjust, Procedure};
use statrs::distribution::{DiscreteCDF, Hypergeometric};

use crate::{
    error::{PageError, Result},
    hist::{hist2d, num_bins},
};

/// Calculates the empirical p-value of a value given a null distribution
///
/// Returns the fraction of the null sample at least as large as `value`,
/// or exactly zero when `value` exceeds every element of the sample. An empty
/// sample carries no evidence and yields one.
pub fn empirical_pvalue(null: &[f64], value: f64) -> f64 {
    if null.is_empty() {
        return 1.0;
    }
    let max = null.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if value > max {
        0.0
    } else {
        null.iter().filter(|&&x| x >= value).count() as f64 / null.len() as f64
    }
}

/// Per-bin hypergeometric p-values for a single pathway
#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    /// Over-representation of the pathway in each bin, `P(X > k)`
    pub over: Vec<f64>,
    /// Under-representation of the pathway in each bin, `P(X <= k)`
    pub under: Vec<f64>,
}

/// Tests each expression bin for over- and under-representation of a pathway
///
/// For every bin the hypergeometric distribution is parameterized by the
/// total number of genes, the size of the pathway and the size of the bin,
/// and evaluated at the number of pathway genes falling in that bin.
pub fn hypergeometric_test(bins: &[usize], membership: &[usize]) -> Result<Representation> {
    let n_bins = num_bins(bins);
    let population = membership.len() as u64;
    if population == 0 {
        return Ok(Representation {
            over: vec![1.0; n_bins],
            under: vec![1.0; n_bins],
        });
    }

    let table = hist2d(bins, membership, n_bins, num_bins(membership).max(2));
    let successes = membership.iter().filter(|&&m| m > 0).count() as u64;

    let mut over = Vec::with_capacity(n_bins);
    let mut under = Vec::with_capacity(n_bins);
    for b in 0..n_bins {
        let observed = table.get(&[b, 1]) as u64;
        let draws = (table.get(&[b, 0]) + table.get(&[b, 1])) as u64;
        if draws == 0 || successes == 0 {
            // degenerate margin, nothing to test
            over.push(1.0);
            under.push(1.0);
            continue;
        }
        let dist = Hypergeometric::new(population, successes, draws)
            .map_err(|e| PageError::Distribution(e.to_string()))?;
        over.push(dist.sf(observed));
        under.push(dist.cdf(observed));
    }

    Ok(Representation { over, under })
}

/// Benjamini-Hochberg false discovery rate correction
///
/// Adjusted values are returned in the original order of `pvalues`.
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    if pvalues.is_empty() {
        return Vec::new();
    }
    adjust(pvalues, Procedure::BenjaminiHochberg)
}

/// The smaller of an under/over p-value pair and the side it came from
///
/// Ties resolve to under-representation.
pub fn min_with_sign(under: f64, over: f64) -> (f64, f64) {
    if under <= over {
        (under, -1.0)
    } else {
        (over, 1.0)
    }
}
