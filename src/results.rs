use derive_new::new;

use crate::math::{min_with_sign, Representation};

/// Sums the lower and upper halves of a per-bin p-value vector
fn half_sums(pvalues: &[f64]) -> (f64, f64) {
    let (lower, upper) = pvalues.split_at(pvalues.len() / 2);
    (lower.iter().sum(), upper.iter().sum())
}

#[derive(Debug, Clone)]
pub struct PathwayResult {
    pub pathway: String,
    /// (Conditional) mutual information of the pathway with the bins
    pub information: f64,
    /// Permutation p-value of the information
    pub pvalue: f64,
    /// Benjamini-Hochberg adjusted permutation p-value
    pub adjusted_pvalue: f64,
    /// Per-bin over-representation p-values
    pub overrep: Vec<f64>,
    /// Per-bin under-representation p-values
    pub underrep: Vec<f64>,
    /// Per-bin minimum of the under/over p-values
    pub min_pvalues: Vec<f64>,
    /// Per-bin side of the minimum: -1 under-represented, 1 over-represented
    pub sign: Vec<f64>,
    /// -1 when significance concentrates in the lower bins, 1 in the upper
    /// bins, 0 when neither half dominates. The direction matches the sign
    /// reported for the pathway in the summary table.
    pub regulation_pattern: i8,
}
impl PathwayResult {
    pub fn new(
        pathway: String,
        information: f64,
        pvalue: f64,
        adjusted_pvalue: f64,
        representation: Representation,
    ) -> Self {
        let (min_pvalues, sign): (Vec<f64>, Vec<f64>) = representation
            .under
            .iter()
            .zip(representation.over.iter())
            .map(|(&under, &over)| min_with_sign(under, over))
            .unzip();

        let (lower, upper) = half_sums(&min_pvalues);
        let ratio = lower / upper;
        let regulation_pattern = if ratio < 1.0 / 1.5 {
            -1
        } else if ratio > 1.5 {
            1
        } else {
            0
        };

        Self {
            pathway,
            information,
            pvalue,
            adjusted_pvalue,
            overrep: representation.over,
            underrep: representation.under,
            min_pvalues,
            sign,
            regulation_pattern,
        }
    }

    /// Signed `-log10` of the per-bin minimum p-values
    pub fn signed_enrichment(&self) -> Vec<f64> {
        self.min_pvalues
            .iter()
            .zip(self.sign.iter())
            .map(|(p, s)| -p.log10() * s)
            .collect()
    }

    /// Smallest p-value across all bins
    pub fn min_pvalue(&self) -> f64 {
        self.min_pvalues.iter().copied().fold(1.0, f64::min)
    }
}

/// Selected pathways in descending order of information
#[derive(Debug, Clone, Default)]
pub struct PageResults {
    pub results: Vec<PathwayResult>,
}
impl PageResults {
    pub fn from_vec(results: Vec<PathwayResult>) -> Self {
        Self { results }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathwayResult> {
        self.results.iter()
    }

    pub fn pathways(&self) -> Vec<String> {
        self.results.iter().map(|r| r.pathway.clone()).collect()
    }

    /// Signed enrichment matrix of shape (pathway, bin)
    pub fn enrichment_matrix(&self) -> Vec<Vec<f64>> {
        self.results.iter().map(|r| r.signed_enrichment()).collect()
    }

    pub fn pprint(&self) {
        println!(
            "Pathway\tInformation\tP-value\tAdjusted P-value\t\
             Min Hypergeometric P-value\tRegulation Pattern"
        );
        for r in &self.results {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                r.pathway,
                r.information,
                r.pvalue,
                r.adjusted_pvalue,
                r.min_pvalue(),
                r.regulation_pattern
            );
        }
    }
}

#[derive(Debug, Clone, new)]
pub struct SummaryRow {
    pub pathway: String,
    pub information: f64,
    /// `log10` of the smallest per-bin p-value
    pub pvalue: f64,
    /// -1 when the lower bins carry less p-value mass, 1 otherwise
    pub regulation_pattern: i8,
}
impl From<&PathwayResult> for SummaryRow {
    fn from(result: &PathwayResult) -> Self {
        let (lower, upper) = half_sums(&result.min_pvalues);
        let regulation_pattern = if lower < upper { -1 } else { 1 };
        SummaryRow::new(
            result.pathway.clone(),
            result.information,
            result.min_pvalue().log10(),
            regulation_pattern,
        )
    }
}

/// Per-pathway summary across all bins
#[derive(Debug, Clone)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
}
impl Summary {
    pub fn from_results(results: &PageResults) -> Self {
        Self {
            rows: results.iter().map(SummaryRow::from).collect(),
        }
    }

    pub fn pprint(&self) {
        println!("Pathway\tInformation\tP-value\tRegulation Pattern");
        for row in &self.rows {
            println!(
                "{}\t{}\t{}\t{}",
                row.pathway, row.information, row.pvalue, row.regulation_pattern
            );
        }
    }
}

/// Expression values attached to a heatmap for annotation
#[derive(Debug, Clone, new)]
pub struct GeneExpression {
    pub genes: Vec<String>,
    pub values: Vec<f64>,
}

/// Signed enrichment matrix ready for rendering
#[derive(Debug, Clone, new)]
pub struct Heatmap {
    pub pathways: Vec<String>,
    /// Rows are pathways, columns are bins
    pub matrix: Vec<Vec<f64>>,
    #[new(default)]
    pub expression: Option<GeneExpression>,
}
impl Heatmap {
    pub fn add_gene_expression(&mut self, genes: Vec<String>, values: Vec<f64>) {
        self.expression = Some(GeneExpression::new(genes, values));
    }

    pub fn n_bins(&self) -> usize {
        self.matrix.first().map_or(0, |row| row.len())
    }

    pub fn pprint(&self) {
        let header = (0..self.n_bins())
            .map(|b| format!("bin_{b}"))
            .collect::<Vec<_>>()
            .join("\t");
        println!("Pathway\t{header}");
        for (pathway, row) in self.pathways.iter().zip(self.matrix.iter()) {
            let row = row
                .iter()
                .map(|v| format!("{v:.3}"))
                .collect::<Vec<_>>()
                .join("\t");
            println!("{pathway}\t{row}");
        }
    }
}
