//! Dense joint-frequency tables over small integer-coded categorical variables.

/// A dense count table over one to three categorical variables.
///
/// Counts are stored row-major in bucket-index order, so the cell for
/// `(i, j, k)` lives at `(i * shape[1] + j) * shape[2] + k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contingency {
    shape: Vec<usize>,
    counts: Vec<usize>,
}
impl Contingency {
    fn zeros(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self {
            shape,
            counts: vec![0; size],
        }
    }

    fn offset(&self, index: &[usize]) -> usize {
        assert_eq!(
            index.len(),
            self.shape.len(),
            "index dimensionality does not match table"
        );
        index
            .iter()
            .zip(self.shape.iter())
            .fold(0, |acc, (i, dim)| acc * dim + i)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Count of genes falling into the given bucket combination
    pub fn get(&self, index: &[usize]) -> usize {
        self.counts[self.offset(index)]
    }

    /// Number of genes tabulated
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Number of buckets spanned by a categorical array (`max + 1`, or zero if empty)
pub fn num_bins(x: &[usize]) -> usize {
    x.iter().max().map_or(0, |m| m + 1)
}

fn assert_aligned(lengths: &[usize]) {
    if let Some(first) = lengths.first() {
        for len in lengths {
            assert_eq!(
                len, first,
                "categorical arrays must be aligned to the same gene universe"
            );
        }
    }
}

pub fn hist1d(x: &[usize], x_bins: usize) -> Contingency {
    let mut table = Contingency::zeros(vec![x_bins]);
    for &i in x {
        table.counts[i] += 1;
    }
    table
}

pub fn hist2d(x: &[usize], y: &[usize], x_bins: usize, y_bins: usize) -> Contingency {
    assert_aligned(&[x.len(), y.len()]);
    let mut table = Contingency::zeros(vec![x_bins, y_bins]);
    for (&i, &j) in x.iter().zip(y) {
        table.counts[i * y_bins + j] += 1;
    }
    table
}

pub fn hist3d(
    x: &[usize],
    y: &[usize],
    z: &[usize],
    x_bins: usize,
    y_bins: usize,
    z_bins: usize,
) -> Contingency {
    assert_aligned(&[x.len(), y.len(), z.len()]);
    let mut table = Contingency::zeros(vec![x_bins, y_bins, z_bins]);
    for ((&i, &j), &k) in x.iter().zip(y).zip(z) {
        table.counts[(i * y_bins + j) * z_bins + k] += 1;
    }
    table
}
