//! Rank-ordered informative pathway search and redundancy consolidation
//!
//! Both algorithms walk pathways in descending order of information. The
//! search commits decisions strictly in that order so the early stop does not
//! depend on how permutation work was scheduled.

use itertools::Itertools;

/// Indices of `information` sorted by descending value
///
/// Ties keep their original relative order.
pub fn descending_order(information: &[f64]) -> Vec<usize> {
    (0..information.len())
        .sorted_by(|&a, &b| information[b].total_cmp(&information[a]))
        .collect()
}

/// Whether the search should continue after a committed decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    Continue,
    Stop,
}

/// Sequential reduction over permutation p-values in rank order
///
/// Every pathway starts uninformative with a p-value of one. Pathways
/// never committed keep those values.
#[derive(Debug, Clone)]
pub struct InformativeSearch {
    alpha: f64,
    k: usize,
    n_break: usize,
    visited: usize,
    informative: Vec<bool>,
    pvalues: Vec<f64>,
}
impl InformativeSearch {
    pub fn new(num_pathways: usize, alpha: f64, k: usize) -> Self {
        Self {
            alpha,
            k,
            n_break: 0,
            visited: 0,
            informative: vec![false; num_pathways],
            pvalues: vec![1.0; num_pathways],
        }
    }

    /// Records the p-value of the next pathway in rank order
    pub fn commit(&mut self, idx: usize, pvalue: f64) -> Search {
        self.visited += 1;
        self.pvalues[idx] = pvalue;
        if pvalue > self.alpha {
            self.n_break += 1;
            if self.n_break >= self.k {
                return Search::Stop;
            }
        } else {
            self.informative[idx] = true;
            self.n_break = 0;
        }
        Search::Continue
    }

    /// Number of pathways committed so far
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn finish(self) -> (Vec<bool>, Vec<f64>) {
        (self.informative, self.pvalues)
    }
}

/// Greedy single-pass consolidation of informative pathways
///
/// Walks `order` keeping informative pathways only. The first one is always
/// accepted; each later candidate is accepted only if `redundancy(candidate,
/// accepted)` exceeds `threshold` for every pathway accepted before it.
/// Accepted pathways are never revisited, so the result depends on the order.
pub fn consolidate<F>(
    order: &[usize],
    informative: &[bool],
    threshold: f64,
    redundancy: F,
) -> Vec<usize>
where
    F: Fn(usize, usize) -> f64,
{
    let mut existing: Vec<usize> = Vec::new();
    for &idx in order.iter().filter(|&&idx| informative[idx]) {
        if existing
            .iter()
            .all(|&accepted| redundancy(idx, accepted) > threshold)
        {
            existing.push(idx);
        }
    }
    existing
}
