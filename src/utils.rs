use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};

/// Shuffles the bin identities of a categorical array
pub fn shuffle_bin_array<R: Rng + ?Sized>(bin_array: &[usize], rng: &mut R) -> Vec<usize> {
    let mut shuf = bin_array.to_vec();
    shuf.shuffle(rng);
    shuf
}

pub fn select_indices<T: Copy>(indices: &[usize], data: &[T]) -> Vec<T> {
    indices.iter().map(|i| data[*i]).collect()
}

/// Sorted intersection of two sorted, deduplicated gene lists
pub fn intersect_genes(a: &[String], b: &[String]) -> Vec<String> {
    a.iter()
        .merge_join_by(b.iter(), |x, y| x.cmp(y))
        .filter_map(|either| either.both().map(|(x, _)| x.clone()))
        .collect()
}

/// Indices into the sorted `genes` of every gene found in the sorted `subset`
pub fn subset_indices(genes: &[String], subset: &[String]) -> Vec<usize> {
    genes
        .iter()
        .enumerate()
        .merge_join_by(subset.iter(), |(_, x), y| x.cmp(y))
        .filter_map(|either| either.both().map(|((i, _), _)| i))
        .collect()
}

/// Relabels arbitrary labels to their rank among the sorted unique labels
pub fn densify<T: Ord + Clone>(labels: &[T]) -> Vec<usize> {
    let unique = labels.iter().cloned().sorted().dedup().collect::<Vec<_>>();
    labels
        .iter()
        .map(|l| unique.binary_search(l).unwrap_or_default())
        .collect()
}

/// Discretizes values into at most `n_bins` equal-frequency bins by rank
///
/// Tied values always share a bin and the resulting labels are dense.
pub fn quantile_bins<T: PartialOrd + Copy>(values: &[T], n_bins: usize) -> Vec<usize> {
    if values.is_empty() || n_bins == 0 {
        return vec![0; values.len()];
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let bins = values
        .iter()
        .map(|v| sorted.partition_point(|x| x < v) * n_bins / sorted.len())
        .collect::<Vec<_>>();
    densify(&bins)
}
