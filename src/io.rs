//! Ingestion of gene/bin and gene/pathway tables into indexed categorical arrays

use std::{collections::HashMap, path::Path};

use anyhow::{bail, Context};
use itertools::Itertools;

use crate::{
    error::{PageError, Result},
    utils::{densify, quantile_bins, select_indices, subset_indices},
};

fn read_pairs<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<(String, String)>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("unable to open {}", path.display()))?;

    let mut pairs = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed record in {}", path.display()))?;
        match (record.get(0), record.get(1)) {
            (Some(a), Some(b)) => pairs.push((a.to_string(), b.to_string())),
            _ => bail!(
                "expected two columns on line {} of {}",
                line + 1,
                path.display()
            ),
        }
    }
    Ok(pairs)
}

/// Sorts `(gene, value)` pairs by gene and rejects conflicting duplicates
fn unique_by_gene<T: Clone + PartialEq>(
    genes: &[String],
    values: &[T],
) -> Result<(Vec<String>, Vec<T>)> {
    if genes.len() != values.len() {
        return Err(PageError::Alignment {
            what: "expression values".to_string(),
            expected: genes.len(),
            got: values.len(),
        });
    }
    let mut unique_genes = Vec::with_capacity(genes.len());
    let mut unique_values: Vec<T> = Vec::with_capacity(genes.len());
    for (gene, value) in genes
        .iter()
        .zip(values.iter())
        .sorted_by(|a, b| a.0.cmp(b.0))
    {
        if unique_genes.last() == Some(gene) {
            if unique_values.last() != Some(value) {
                return Err(PageError::InvalidInput(format!(
                    "gene {gene} is assigned to more than one expression value"
                )));
            }
            continue;
        }
        unique_genes.push(gene.clone());
        unique_values.push(value.clone());
    }
    Ok((unique_genes, unique_values))
}

/// Expression bins for a set of genes
#[derive(Debug, Clone)]
pub struct ExpressionProfile {
    /// Sorted unique genes
    genes: Vec<String>,
    /// Bin index of each gene in `genes`
    bin_array: Vec<usize>,
    n_bins: usize,
    /// Continuous expression values, when bins were derived from them
    raw_expression: Option<Vec<f64>>,
}
impl ExpressionProfile {
    /// Builds a profile from pre-discretized bin labels
    ///
    /// Labels are relabeled to `[0, n_bins)` by their sorted rank.
    pub fn from_bins(genes: &[String], bins: &[usize]) -> Result<Self> {
        let (genes, labels) = unique_by_gene(genes, bins)?;
        let bin_array = densify(&labels);
        let n_bins = crate::hist::num_bins(&bin_array);
        Ok(Self {
            genes,
            bin_array,
            n_bins,
            raw_expression: None,
        })
    }

    /// Builds a profile by discretizing continuous expression into
    /// `n_bins` equal-frequency bins
    pub fn from_continuous(genes: &[String], expression: &[f64], n_bins: usize) -> Result<Self> {
        if n_bins == 0 {
            return Err(PageError::InvalidInput(
                "number of expression bins must be positive".to_string(),
            ));
        }
        if let Some(v) = expression.iter().find(|v| !v.is_finite()) {
            return Err(PageError::InvalidInput(format!(
                "expression values must be finite, found {v}"
            )));
        }
        let (genes, raw) = unique_by_gene(genes, expression)?;
        let bin_array = quantile_bins(&raw, n_bins);
        let n_bins = crate::hist::num_bins(&bin_array);
        Ok(Self {
            genes,
            bin_array,
            n_bins,
            raw_expression: Some(raw),
        })
    }

    /// Reads a headerless two-column `gene<TAB>value` table
    ///
    /// With `n_bins` unset the value column must hold integer bin labels,
    /// otherwise it is parsed as continuous expression and discretized.
    pub fn from_tsv<P: AsRef<Path>>(path: P, n_bins: Option<usize>) -> anyhow::Result<Self> {
        let pairs = read_pairs(&path)?;
        let genes = pairs.iter().map(|(g, _)| g.clone()).collect::<Vec<_>>();
        let profile = match n_bins {
            Some(n_bins) => {
                let values = pairs
                    .iter()
                    .map(|(g, v)| {
                        v.parse::<f64>()
                            .with_context(|| format!("invalid expression value {v} for {g}"))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Self::from_continuous(&genes, &values, n_bins)?
            }
            None => {
                let bins = pairs
                    .iter()
                    .map(|(g, v)| {
                        v.parse::<usize>()
                            .with_context(|| format!("invalid bin label {v} for {g}"))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Self::from_bins(&genes, &bins)?
            }
        };
        Ok(profile)
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn bin_array(&self) -> &[usize] {
        &self.bin_array
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Number of genes in each bin
    pub fn bin_sizes(&self) -> Vec<usize> {
        crate::hist::hist1d(&self.bin_array, self.n_bins)
            .counts()
            .to_vec()
    }

    pub fn raw_expression(&self) -> Option<&[f64]> {
        self.raw_expression.as_deref()
    }

    /// Bin array restricted to the sorted `subset` of genes
    pub fn get_gene_subset(&self, subset: &[String]) -> Vec<usize> {
        let indices = subset_indices(&self.genes, subset);
        select_indices(&indices, &self.bin_array)
    }
}

/// Pathway memberships for a set of genes
#[derive(Debug, Clone)]
pub struct GeneOntology {
    /// Sorted unique genes
    genes: Vec<String>,
    /// Sorted unique pathways
    pathways: Vec<String>,
    /// 0/1 membership of each gene (columns) in each pathway (rows)
    bool_array: Vec<Vec<usize>>,
    /// Discretized number of pathways each gene belongs to
    membership_bins: Vec<usize>,
}
impl GeneOntology {
    /// Builds an ontology from `(gene, pathway)` pairs
    ///
    /// Each gene is additionally assigned a membership group by discretizing
    /// the number of pathways it belongs to into at most `n_membership_bins`
    /// equal-frequency bins.
    pub fn from_pairs(
        genes: &[String],
        pathways: &[String],
        n_membership_bins: usize,
    ) -> Result<Self> {
        if genes.len() != pathways.len() {
            return Err(PageError::Alignment {
                what: "pathway column".to_string(),
                expected: genes.len(),
                got: pathways.len(),
            });
        }
        if n_membership_bins == 0 {
            return Err(PageError::InvalidInput(
                "number of membership bins must be positive".to_string(),
            ));
        }

        let gene_index: HashMap<&String, usize> = genes
            .iter()
            .sorted()
            .dedup()
            .enumerate()
            .map(|(i, g)| (g, i))
            .collect();
        let pathway_index: HashMap<&String, usize> = pathways
            .iter()
            .sorted()
            .dedup()
            .enumerate()
            .map(|(i, p)| (p, i))
            .collect();

        let mut bool_array = vec![vec![0; gene_index.len()]; pathway_index.len()];
        for (g, p) in genes.iter().zip(pathways.iter()) {
            bool_array[pathway_index[p]][gene_index[g]] = 1;
        }

        let membership = (0..gene_index.len())
            .map(|g| bool_array.iter().map(|row| row[g]).sum::<usize>())
            .collect::<Vec<_>>();
        let membership_bins = quantile_bins(&membership, n_membership_bins);

        Ok(Self {
            genes: gene_index.keys().map(|g| g.to_string()).sorted().collect(),
            pathways: pathway_index
                .keys()
                .map(|p| p.to_string())
                .sorted()
                .collect(),
            bool_array,
            membership_bins,
        })
    }

    /// Reads a headerless two-column `gene<TAB>pathway` table
    pub fn from_tsv<P: AsRef<Path>>(path: P, n_membership_bins: usize) -> anyhow::Result<Self> {
        let (genes, pathways): (Vec<String>, Vec<String>) = read_pairs(&path)?.into_iter().unzip();
        Ok(Self::from_pairs(&genes, &pathways, n_membership_bins)?)
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn pathways(&self) -> &[String] {
        &self.pathways
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_pathways(&self) -> usize {
        self.pathways.len()
    }

    pub fn bool_array(&self) -> &[Vec<usize>] {
        &self.bool_array
    }

    pub fn membership_bins(&self) -> &[usize] {
        &self.membership_bins
    }

    /// Number of genes in each pathway
    pub fn pathway_sizes(&self) -> Vec<usize> {
        self.bool_array.iter().map(|row| row.iter().sum()).collect()
    }

    /// Mean number of genes across pathways
    pub fn avg_pathway_size(&self) -> f64 {
        if self.pathways.is_empty() {
            return 0.0;
        }
        self.pathway_sizes().iter().sum::<usize>() as f64 / self.pathways.len() as f64
    }

    /// Membership matrix restricted to the sorted `subset` of genes
    pub fn get_gene_subset(&self, subset: &[String]) -> Vec<Vec<usize>> {
        let indices = subset_indices(&self.genes, subset);
        self.bool_array
            .iter()
            .map(|row| select_indices(&indices, row))
            .collect()
    }

    /// Membership groups restricted to the sorted `subset` of genes
    pub fn get_membership_subset(&self, subset: &[String]) -> Vec<usize> {
        let indices = subset_indices(&self.genes, subset);
        select_indices(&indices, &self.membership_bins)
    }
}
