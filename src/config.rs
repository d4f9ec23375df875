use bon::Builder;

use crate::{
    error::{PageError, Result},
    information::{
        calculate_cmi_permutations, calculate_mi_permutations, conditional_mutual_information,
        mutual_information,
    },
};

/// The statistic relating expression bins to pathway membership
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InformationFunction {
    /// Mutual information between bins and membership
    MutualInformation,
    /// Mutual information conditioned on each gene's pathway-membership group
    #[default]
    ConditionalMutualInformation,
}

/// Aligned categorical arrays for a single pathway
pub struct InformationInput<'a> {
    pub bins: &'a [usize],
    pub membership: &'a [usize],
    pub groups: &'a [usize],
    pub x_bins: usize,
    pub y_bins: usize,
    pub z_bins: usize,
}

impl InformationFunction {
    pub fn describe(&self) -> &'static str {
        match self {
            InformationFunction::MutualInformation => "mutual information",
            InformationFunction::ConditionalMutualInformation => {
                "conditional mutual information"
            }
        }
    }

    pub fn information(&self, input: &InformationInput, base: u32) -> f64 {
        match self {
            InformationFunction::MutualInformation => mutual_information(
                input.bins,
                input.membership,
                input.x_bins,
                input.y_bins,
                base,
            ),
            InformationFunction::ConditionalMutualInformation => conditional_mutual_information(
                input.bins,
                input.membership,
                input.groups,
                input.x_bins,
                input.y_bins,
                input.z_bins,
                base,
            ),
        }
    }

    pub fn permutations(
        &self,
        input: &InformationInput,
        base: u32,
        n: usize,
        seed: u64,
    ) -> Vec<f64> {
        match self {
            InformationFunction::MutualInformation => calculate_mi_permutations(
                input.bins,
                input.membership,
                input.x_bins,
                input.y_bins,
                base,
                n,
                seed,
            ),
            InformationFunction::ConditionalMutualInformation => calculate_cmi_permutations(
                input.bins,
                input.membership,
                input.groups,
                input.x_bins,
                input.y_bins,
                input.z_bins,
                base,
                n,
                seed,
            ),
        }
    }
}

/// Parameters of a PAGE analysis
#[derive(Debug, Clone, Builder)]
pub struct PageConfig {
    /// Number of label permutations drawn per visited pathway
    #[builder(default = 10_000)]
    pub n_shuffle: usize,

    /// Maximum permutation p-value for a pathway to be considered informative
    #[builder(default = 0.01)]
    pub alpha: f64,

    /// Number of contiguous uninformative pathways tolerated before the
    /// informative search stops
    #[builder(default = 10)]
    pub k: usize,

    /// Minimum redundancy ratio a candidate must hold against every accepted
    /// pathway. Only used when `filter_redundant` is set.
    #[builder(default = 5.0)]
    pub redundancy_ratio: f64,

    /// Logarithm base used for entropies
    #[builder(default = 2)]
    pub base: u32,

    #[builder(default)]
    pub filter_redundant: bool,

    /// Number of worker threads, all available cores if unset
    pub n_jobs: Option<usize>,

    #[builder(default)]
    pub function: InformationFunction,

    #[builder(default = 42)]
    pub seed: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_shuffle == 0 {
            return Err(PageError::InvalidConfig(
                "n_shuffle must be positive".to_string(),
            ));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(PageError::InvalidConfig(format!(
                "alpha must be in (0, 1], found {}",
                self.alpha
            )));
        }
        if self.k == 0 {
            return Err(PageError::InvalidConfig("k must be positive".to_string()));
        }
        if !(self.redundancy_ratio > 0.0) {
            return Err(PageError::InvalidConfig(format!(
                "redundancy_ratio must be positive, found {}",
                self.redundancy_ratio
            )));
        }
        if self.base < 2 {
            return Err(PageError::InvalidConfig(format!(
                "base must be at least 2, found {}",
                self.base
            )));
        }
        if self.n_jobs == Some(0) {
            return Err(PageError::InvalidConfig(
                "n_jobs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
