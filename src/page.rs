use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::channel,
    },
};

use log::{debug, info};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};

use crate::{
    config::{InformationInput, PageConfig},
    error::{PageError, Result},
    hist::num_bins,
    io::{ExpressionProfile, GeneOntology},
    information::measure_redundancy,
    math::{benjamini_hochberg, empirical_pvalue, hypergeometric_test},
    results::{GeneExpression, Heatmap, PageResults, PathwayResult, Summary},
    selection::{consolidate, descending_order, InformativeSearch, Search},
    utils::intersect_genes,
};

/// State produced by a completed run
struct PageFit {
    information: Vec<f64>,
    visited: usize,
    informative: Vec<bool>,
    pvalues: Vec<f64>,
    pathway_indices: Vec<usize>,
    results: PageResults,
}

/// Pathway Analysis of Gene Expression
///
/// Identifies the pathways whose membership carries significant,
/// non-redundant information about a discretized expression profile, and
/// characterizes their over/under-representation across expression bins.
///
/// Reference: H. Goodarzi, O. Elemento, S. Tavazoie, "Revealing Global
/// Regulatory Perturbations across Human Cancers", Molecular Cell (2009).
pub struct Page {
    config: PageConfig,
    pool: ThreadPool,

    /// Sorted genes present in both the expression profile and the ontology
    shared_genes: Vec<String>,
    pathways: Vec<String>,

    /// Expression bin of each shared gene
    exp_bins: Vec<usize>,
    /// Pathway membership over the shared genes, one row per pathway
    ont_bool: Vec<Vec<usize>>,
    /// Membership group of each shared gene
    membership_bins: Vec<usize>,

    x_bins: usize,
    y_bins: usize,
    z_bins: usize,

    annotation: Option<GeneExpression>,
    fit: Option<PageFit>,
}
impl Page {
    /// Prepares an analysis over the genes shared by `expression` and `ontology`
    pub fn new(
        expression: &ExpressionProfile,
        ontology: &GeneOntology,
        config: PageConfig,
    ) -> Result<Self> {
        let shared_genes = intersect_genes(expression.genes(), ontology.genes());
        let exp_bins = expression.get_gene_subset(&shared_genes);
        let ont_bool = ontology.get_gene_subset(&shared_genes);
        let membership_bins = ontology.get_membership_subset(&shared_genes);

        let mut page = Self::from_aligned(
            shared_genes,
            ontology.pathways().to_vec(),
            exp_bins,
            ont_bool,
            membership_bins,
            config,
        )?;
        if let Some(raw) = expression.raw_expression() {
            page.annotation = Some(GeneExpression::new(
                expression.genes().to_vec(),
                raw.to_vec(),
            ));
        }
        Ok(page)
    }

    /// Prepares an analysis over pre-indexed categorical arrays
    ///
    /// Every array must be indexed by the same ordering of `genes`, and
    /// `ont_bool` must hold one row per entry of `pathways`.
    pub fn from_aligned(
        genes: Vec<String>,
        pathways: Vec<String>,
        exp_bins: Vec<usize>,
        ont_bool: Vec<Vec<usize>>,
        membership_bins: Vec<usize>,
        config: PageConfig,
    ) -> Result<Self> {
        config.validate()?;
        validate_alignment(&genes, &pathways, &exp_bins, &ont_bool, &membership_bins)?;

        let x_bins = num_bins(&exp_bins);
        let y_bins = ont_bool
            .iter()
            .map(|row| num_bins(row))
            .max()
            .unwrap_or(0)
            .max(2);
        let z_bins = num_bins(&membership_bins);

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.n_jobs.unwrap_or(0))
            .build()?;

        info!(
            "PAGE over {} shared genes, {} expression bins, {} pathways, {} membership groups",
            genes.len(),
            x_bins,
            pathways.len(),
            z_bins
        );

        Ok(Self {
            config,
            pool,
            shared_genes: genes,
            pathways,
            exp_bins,
            ont_bool,
            membership_bins,
            x_bins,
            y_bins,
            z_bins,
            annotation: None,
            fit: None,
        })
    }

    fn input(&self, idx: usize) -> InformationInput<'_> {
        InformationInput {
            bins: &self.exp_bins,
            membership: &self.ont_bool[idx],
            groups: &self.membership_bins,
            x_bins: self.x_bins,
            y_bins: self.y_bins,
            z_bins: self.z_bins,
        }
    }

    /// Calculates mutual or conditional mutual information for each pathway
    fn calculate_information(&self) -> Vec<f64> {
        info!("calculating {}", self.config.function.describe());
        self.pool.install(|| {
            (0..self.pathways.len())
                .into_par_iter()
                .map(|idx| {
                    self.config
                        .function
                        .information(&self.input(idx), self.config.base)
                })
                .collect()
        })
    }

    /// Permutation p-value of a single pathway's information
    fn permutation_pvalue(&self, idx: usize, information: f64) -> f64 {
        let seed = self.config.seed.wrapping_add(idx as u64);
        let null = self.config.function.permutations(
            &self.input(idx),
            self.config.base,
            self.config.n_shuffle,
            seed,
        );
        empirical_pvalue(&null, information)
    }

    /// Searches for informative pathways in descending order of information
    ///
    /// Workers pull pathways in rank order as soon as they are free, while
    /// decisions are committed in rank order so the early stop matches a
    /// strictly sequential search. Tests finished past the stop point are
    /// discarded.
    fn calculate_informative(&self, information: &[f64], order: &[usize]) -> InformativeSearch {
        info!("permutation testing with {} shuffles", self.config.n_shuffle);
        let mut search =
            InformativeSearch::new(information.len(), self.config.alpha, self.config.k);
        let stopped = AtomicBool::new(false);
        let (tx, rx) = channel::<(usize, f64)>();

        self.pool.in_place_scope(|scope| {
            let stopped = &stopped;
            scope.spawn(move |_| {
                order
                    .iter()
                    .enumerate()
                    .par_bridge()
                    .for_each_with(tx, |tx, (rank, &idx)| {
                        if stopped.load(Ordering::Relaxed) {
                            return;
                        }
                        let pvalue = self.permutation_pvalue(idx, information[idx]);
                        // receiver is gone once the search has stopped
                        let _ = tx.send((rank, pvalue));
                    });
            });

            let mut pending = BTreeMap::new();
            let mut next = 0;
            'commits: while let Ok((rank, pvalue)) = rx.recv() {
                pending.insert(rank, pvalue);
                while let Some(pvalue) = pending.remove(&next) {
                    let idx = order[next];
                    debug!(
                        "{}: information = {:.5}, p-value = {}",
                        self.pathways[idx], information[idx], pvalue
                    );
                    next += 1;
                    if search.commit(idx, pvalue) == Search::Stop {
                        stopped.store(true, Ordering::Relaxed);
                        break 'commits;
                    }
                }
            }
            drop(rx);
        });

        info!(
            "visited {} of {} pathways",
            search.visited(),
            information.len()
        );
        search
    }

    /// Drops informative pathways that are redundant with a more informative one
    fn consolidate_pathways(&self, order: &[usize], informative: &[bool]) -> Vec<usize> {
        info!("consolidating redundant pathways");
        let redundancy = |candidate: usize, accepted: usize| {
            measure_redundancy(
                &self.exp_bins,
                &self.ont_bool[candidate],
                &self.ont_bool[accepted],
                self.x_bins,
                self.y_bins,
                self.y_bins,
                self.config.base,
            )
        };
        consolidate(order, informative, self.config.redundancy_ratio, redundancy)
    }

    /// Hypergeometric testing over the selected pathways
    fn significance_testing(
        &self,
        pathway_indices: &[usize],
        information: &[f64],
        pvalues: &[f64],
    ) -> Result<PageResults> {
        info!("hypergeometric tests over {} pathways", pathway_indices.len());
        let adjusted = benjamini_hochberg(pvalues);
        let results = self.pool.install(|| {
            pathway_indices
                .par_iter()
                .map(|&idx| -> Result<PathwayResult> {
                    let representation = hypergeometric_test(&self.exp_bins, &self.ont_bool[idx])?;
                    Ok(PathwayResult::new(
                        self.pathways[idx].clone(),
                        information[idx],
                        pvalues[idx],
                        adjusted[idx],
                        representation,
                    ))
                })
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(PageResults::from_vec(results))
    }

    /// Perform the PAGE algorithm
    ///
    /// 1. Score every pathway by (conditional) mutual information
    /// 2. Select informative pathways by permutation testing
    /// 3. Optionally drop redundant pathways
    /// 4. Test the remaining pathways for per-bin over/under-representation
    pub fn run(&mut self) -> Result<&PageResults> {
        let information = self.calculate_information();
        let order = descending_order(&information);
        let search = self.calculate_informative(&information, &order);
        let visited = search.visited();
        let (informative, pvalues) = search.finish();

        let pathway_indices = if self.config.filter_redundant {
            self.consolidate_pathways(&order, &informative)
        } else {
            order
                .iter()
                .copied()
                .filter(|&idx| informative[idx])
                .collect()
        };

        let results = if pathway_indices.is_empty() {
            info!("no informative pathways found");
            PageResults::default()
        } else {
            self.significance_testing(&pathway_indices, &information, &pvalues)?
        };

        let fit = self.fit.insert(PageFit {
            information,
            visited,
            informative,
            pvalues,
            pathway_indices,
            results,
        });
        Ok(&fit.results)
    }

    fn fitted(&self) -> Result<&PageFit> {
        let fit = self.fit.as_ref().ok_or(PageError::NotFit)?;
        if fit.results.is_empty() {
            return Err(PageError::NoSignificantPathways);
        }
        Ok(fit)
    }

    /// Results of the last run, which may be empty
    pub fn results(&self) -> Result<&PageResults> {
        self.fit
            .as_ref()
            .map(|fit| &fit.results)
            .ok_or(PageError::NotFit)
    }

    /// Summarized table of the selected pathways across all bins
    pub fn summary(&self) -> Result<Summary> {
        Ok(Summary::from_results(&self.fitted()?.results))
    }

    /// Signed enrichment matrix of the selected pathways
    pub fn heatmap(&self) -> Result<Heatmap> {
        let fit = self.fitted()?;
        let mut heatmap = Heatmap::new(fit.results.pathways(), fit.results.enrichment_matrix());
        if let Some(annotation) = &self.annotation {
            heatmap.add_gene_expression(annotation.genes.clone(), annotation.values.clone());
        }
        Ok(heatmap)
    }

    pub fn is_fit(&self) -> bool {
        self.fit.is_some()
    }

    pub fn shared_genes(&self) -> &[String] {
        &self.shared_genes
    }

    pub fn pathways(&self) -> &[String] {
        &self.pathways
    }

    pub fn information(&self) -> Result<&[f64]> {
        Ok(&self.fit.as_ref().ok_or(PageError::NotFit)?.information)
    }

    pub fn informative(&self) -> Result<&[bool]> {
        Ok(&self.fit.as_ref().ok_or(PageError::NotFit)?.informative)
    }

    pub fn pvalues(&self) -> Result<&[f64]> {
        Ok(&self.fit.as_ref().ok_or(PageError::NotFit)?.pvalues)
    }

    /// Number of pathways permutation tested before the search stopped
    pub fn visited(&self) -> Result<usize> {
        Ok(self.fit.as_ref().ok_or(PageError::NotFit)?.visited)
    }

    /// Indices into `pathways` of the selected pathways, most informative first
    pub fn pathway_indices(&self) -> Result<&[usize]> {
        Ok(&self.fit.as_ref().ok_or(PageError::NotFit)?.pathway_indices)
    }
}

fn validate_alignment(
    genes: &[String],
    pathways: &[String],
    exp_bins: &[usize],
    ont_bool: &[Vec<usize>],
    membership_bins: &[usize],
) -> Result<()> {
    if genes.is_empty() {
        return Err(PageError::EmptyUniverse);
    }
    let n = genes.len();
    let check = |what: &str, got: usize, expected: usize| {
        if got == expected {
            Ok(())
        } else {
            Err(PageError::Alignment {
                what: what.to_string(),
                expected,
                got,
            })
        }
    };
    check("expression bins", exp_bins.len(), n)?;
    check("membership groups", membership_bins.len(), n)?;
    check("pathway membership rows", ont_bool.len(), pathways.len())?;
    for (pathway, row) in pathways.iter().zip(ont_bool) {
        check(&format!("membership of {pathway}"), row.len(), n)?;
        if row.iter().any(|&m| m > 1) {
            return Err(PageError::InvalidInput(format!(
                "membership of {pathway} must be 0/1"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InformationFunction;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn genes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("g{i:03}")).collect()
    }

    fn config(function: InformationFunction, n_shuffle: usize) -> PageConfig {
        PageConfig::builder()
            .n_shuffle(n_shuffle)
            .function(function)
            .n_jobs(2)
            .build()
    }

    /// 20 genes in two bins of ten; `p_exact` is exactly bin 0
    fn two_bin_page(function: InformationFunction) -> Page {
        let exp_bins = (0..20).map(|i| i / 10).collect::<Vec<_>>();
        let exact = (0..20).map(|i| usize::from(i < 10)).collect::<Vec<_>>();
        Page::from_aligned(
            genes(20),
            vec!["p_exact".to_string()],
            exp_bins,
            vec![exact],
            vec![0; 20],
            config(function, 500),
        )
        .unwrap()
    }

    #[test]
    fn test_exact_pathway() {
        let mut page = two_bin_page(InformationFunction::MutualInformation);
        let results = page.run().unwrap();
        assert_eq!(results.len(), 1);

        let result = &results.results[0];
        assert_relative_eq!(result.information, 1.0, epsilon = 1e-12);
        assert!(result.pvalue <= 0.01);
        assert_eq!(result.overrep[0], 0.0);
        assert_relative_eq!(result.underrep[1], 1.0 / 184_756.0, max_relative = 1e-6);

        // an exhausted upper tail is infinitely enriched
        let heatmap = page.heatmap().unwrap();
        assert_eq!(heatmap.pathways, vec!["p_exact".to_string()]);
        assert!(heatmap.matrix[0][0].is_infinite());
        assert!(heatmap.matrix[0][0] > 0.0);
        assert_relative_eq!(heatmap.matrix[0][1], -(184_756f64.log10()), max_relative = 1e-6);

        let summary = page.summary().unwrap();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].pvalue, f64::NEG_INFINITY);
        assert_eq!(summary.rows[0].regulation_pattern, -1);
    }

    #[test]
    fn test_exact_pathway_conditional() {
        let mut page = two_bin_page(InformationFunction::ConditionalMutualInformation);
        page.run().unwrap();
        assert_relative_eq!(page.information().unwrap()[0], 1.0, epsilon = 1e-12);
        assert_eq!(page.informative().unwrap(), &[true]);
    }

    #[test]
    fn test_not_fit() {
        let page = two_bin_page(InformationFunction::MutualInformation);
        assert!(!page.is_fit());
        assert!(matches!(page.summary(), Err(PageError::NotFit)));
        assert!(matches!(page.heatmap(), Err(PageError::NotFit)));
        assert!(matches!(page.results(), Err(PageError::NotFit)));
        assert!(matches!(page.pvalues(), Err(PageError::NotFit)));
    }

    #[test]
    fn test_no_significant_pathways() {
        // membership independent of the bins by construction
        let exp_bins = (0..20).map(|i| i % 2).collect::<Vec<_>>();
        let membership = (0..20).map(|i| usize::from(i < 10)).collect::<Vec<_>>();
        let mut page = Page::from_aligned(
            genes(20),
            vec!["flat".to_string()],
            exp_bins,
            vec![membership],
            vec![0; 20],
            config(InformationFunction::MutualInformation, 200),
        )
        .unwrap();

        let results = page.run().unwrap();
        assert!(results.is_empty());
        assert!(page.is_fit());
        assert_eq!(page.pvalues().unwrap(), &[1.0]);
        assert!(matches!(
            page.summary(),
            Err(PageError::NoSignificantPathways)
        ));
        assert!(matches!(
            page.heatmap(),
            Err(PageError::NoSignificantPathways)
        ));
    }

    #[test]
    fn test_random_pathway_not_informative() {
        let n_genes = 200;
        let mut informative = 0;
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let exp_bins = (0..n_genes).map(|i| i * 4 / n_genes).collect::<Vec<_>>();
            let membership = (0..n_genes)
                .map(|_| usize::from(rng.gen_bool(0.5)))
                .collect::<Vec<_>>();
            let config = PageConfig::builder()
                .n_shuffle(1000)
                .alpha(0.01)
                .function(InformationFunction::MutualInformation)
                .seed(seed)
                .n_jobs(2)
                .build();
            let mut page = Page::from_aligned(
                genes(n_genes),
                vec!["random".to_string()],
                exp_bins,
                vec![membership],
                vec![0; n_genes],
                config,
            )
            .unwrap();
            page.run().unwrap();
            if page.informative().unwrap()[0] {
                informative += 1;
            }
        }
        assert!(informative <= 3, "{informative} of 20 random pathways informative");
    }

    /// Bins of 30 genes each; pathways of decreasing dependence on the bins
    fn ranked_page(filter_redundant: bool, k: usize) -> Page {
        let n_genes = 120;
        let exp_bins = (0..n_genes).map(|i| i / 30).collect::<Vec<_>>();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut rows = Vec::new();
        let mut names = Vec::new();
        // bin 0 exactly, and a near copy of it
        rows.push((0..n_genes).map(|i| usize::from(i < 30)).collect::<Vec<_>>());
        rows.push((0..n_genes).map(|i| usize::from(i < 29)).collect::<Vec<_>>());
        // bin 3 exactly, independent of the first
        rows.push((0..n_genes).map(|i| usize::from(i >= 90)).collect::<Vec<_>>());
        names.extend(["bin0", "bin0_copy", "bin3"].map(String::from));
        // noise
        for i in 0..10 {
            rows.push(
                (0..n_genes)
                    .map(|_| usize::from(rng.gen_bool(0.3)))
                    .collect::<Vec<_>>(),
            );
            names.push(format!("noise{i}"));
        }

        let config = PageConfig::builder()
            .n_shuffle(300)
            .alpha(0.01)
            .k(k)
            .redundancy_ratio(2.0)
            .filter_redundant(filter_redundant)
            .function(InformationFunction::MutualInformation)
            .n_jobs(3)
            .build();
        Page::from_aligned(genes(n_genes), names, exp_bins, rows, vec![0; n_genes], config)
            .unwrap()
    }

    #[test]
    fn test_selection_finds_structured_pathways() {
        let mut page = ranked_page(false, 2);
        page.run().unwrap();
        let informative = page.informative().unwrap();
        assert!(informative[0] && informative[1] && informative[2]);

        let selected = page.pathway_indices().unwrap();
        assert_eq!(selected.len(), informative.iter().filter(|&&x| x).count());
        // most informative first
        let information = page.information().unwrap();
        for w in selected.windows(2) {
            assert!(information[w[0]] >= information[w[1]]);
        }
    }

    #[test]
    fn test_early_stop_invariant() {
        for k in 1..4 {
            let mut page = ranked_page(false, k);
            page.run().unwrap();
            let order = descending_order(page.information().unwrap());
            let informative = page.informative().unwrap();
            let pvalues = page.pvalues().unwrap();
            let visited = page.visited().unwrap();

            let last_informative = order[..visited]
                .iter()
                .rposition(|&idx| informative[idx])
                .unwrap();
            assert!(visited - last_informative - 1 <= k);
            for &idx in &order[visited..] {
                assert_eq!(pvalues[idx], 1.0);
                assert!(!informative[idx]);
            }
        }
    }

    #[test]
    fn test_redundancy_filter() {
        let mut page = ranked_page(true, 3);
        page.run().unwrap();
        let selected = page.pathway_indices().unwrap().to_vec();
        let pathways = page.pathways();
        let names = selected
            .iter()
            .map(|&i| pathways[i].as_str())
            .collect::<Vec<_>>();
        assert!(names.contains(&"bin0"));
        assert!(names.contains(&"bin3"));
        assert!(!names.contains(&"bin0_copy"));
    }

    #[test]
    fn test_parallel_search_matches_sequential() {
        for k in 1..4 {
            let mut page = ranked_page(false, k);
            page.run().unwrap();
            let information = page.information().unwrap().to_vec();

            let mut sequential = InformativeSearch::new(information.len(), 0.01, k);
            for idx in descending_order(&information) {
                let pvalue = page.permutation_pvalue(idx, information[idx]);
                if sequential.commit(idx, pvalue) == Search::Stop {
                    break;
                }
            }
            assert_eq!(sequential.visited(), page.visited().unwrap());
            let (informative, pvalues) = sequential.finish();
            assert_eq!(informative, page.informative().unwrap());
            assert_eq!(pvalues, page.pvalues().unwrap());
        }
    }

    #[test]
    fn test_reproducible_across_workers() {
        let mut a = ranked_page(false, 3);
        let mut b = ranked_page(false, 3);
        b.config.n_jobs = Some(1);
        b.pool = ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        a.run().unwrap();
        b.run().unwrap();
        assert_eq!(a.pvalues().unwrap(), b.pvalues().unwrap());
    }

    #[test]
    fn test_alignment_faults() {
        let misaligned = Page::from_aligned(
            genes(4),
            vec!["p".to_string()],
            vec![0, 1, 0],
            vec![vec![1, 0, 1, 0]],
            vec![0; 4],
            PageConfig::default(),
        );
        assert!(matches!(misaligned, Err(PageError::Alignment { .. })));

        let short_row = Page::from_aligned(
            genes(4),
            vec!["p".to_string()],
            vec![0, 1, 0, 1],
            vec![vec![1, 0]],
            vec![0; 4],
            PageConfig::default(),
        );
        assert!(matches!(short_row, Err(PageError::Alignment { .. })));

        let missing_row = Page::from_aligned(
            genes(4),
            vec!["p".to_string(), "q".to_string()],
            vec![0, 1, 0, 1],
            vec![vec![1, 0, 1, 0]],
            vec![0; 4],
            PageConfig::default(),
        );
        assert!(matches!(missing_row, Err(PageError::Alignment { .. })));
    }

    #[test]
    fn test_empty_universe() {
        let expression =
            ExpressionProfile::from_bins(&["a".to_string()], &[0]).unwrap();
        let ontology =
            GeneOntology::from_pairs(&["b".to_string()], &["p".to_string()], 1).unwrap();
        assert!(matches!(
            Page::new(&expression, &ontology, PageConfig::default()),
            Err(PageError::EmptyUniverse)
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Page::from_aligned(
            genes(2),
            vec![],
            vec![0, 1],
            vec![],
            vec![0, 0],
            PageConfig::builder().alpha(0.0).build(),
        );
        assert!(matches!(result, Err(PageError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_profiles() {
        let all_genes = genes(40);
        let values = (0..40).map(|i| i as f64).collect::<Vec<_>>();
        let expression = ExpressionProfile::from_continuous(&all_genes, &values, 4).unwrap();

        // pathway of the top bin plus genes unknown to the expression profile
        let mut ont_genes = all_genes[30..].to_vec();
        ont_genes.extend(["x1", "x2"].map(String::from));
        let mut ont_pathways = vec!["top".to_string(); ont_genes.len()];
        ont_genes.extend(all_genes[..30].iter().cloned());
        ont_pathways.extend(vec!["rest".to_string(); 30]);
        let ontology = GeneOntology::from_pairs(&ont_genes, &ont_pathways, 1).unwrap();

        let mut page = Page::new(
            &expression,
            &ontology,
            config(InformationFunction::ConditionalMutualInformation, 300),
        )
        .unwrap();
        assert_eq!(page.shared_genes().len(), 40);

        page.run().unwrap();
        let results = page.results().unwrap();
        assert!(results.pathways().contains(&"top".to_string()));

        let heatmap = page.heatmap().unwrap();
        let annotation = heatmap.expression.unwrap();
        assert_eq!(annotation.genes.len(), 40);
        assert_eq!(heatmap.matrix[0].len(), 4);
    }

    #[test]
    fn test_bucket_counts_recomputed_after_subsetting() {
        // three expression bins of ten genes; the ontology never sees bin 2
        let all_genes = genes(30);
        let bins = (0..30).map(|i| i / 10).collect::<Vec<_>>();
        let expression = ExpressionProfile::from_bins(&all_genes, &bins).unwrap();

        // unknown genes belong to both pathways and form their own
        // membership group, which vanishes on intersection
        let mut ont_genes = Vec::new();
        let mut ont_pathways = Vec::new();
        for (i, gene) in all_genes[..20].iter().enumerate() {
            ont_genes.push(gene.clone());
            ont_pathways.push(if i < 10 { "a" } else { "b" }.to_string());
        }
        for j in 0..10 {
            for pathway in ["a", "b"] {
                ont_genes.push(format!("x{j}"));
                ont_pathways.push(pathway.to_string());
            }
        }
        let ontology = GeneOntology::from_pairs(&ont_genes, &ont_pathways, 2).unwrap();
        assert_eq!(num_bins(ontology.membership_bins()), 2);

        let mut page = Page::new(
            &expression,
            &ontology,
            config(InformationFunction::ConditionalMutualInformation, 300),
        )
        .unwrap();
        assert_eq!(page.shared_genes().len(), 20);
        assert_eq!(page.x_bins, 2);
        assert_eq!(page.y_bins, 2);
        assert_eq!(page.z_bins, 1);

        page.run().unwrap();
        let heatmap = page.heatmap().unwrap();
        assert_eq!(heatmap.matrix.len(), 2);
        for row in &heatmap.matrix {
            assert_eq!(row.len(), page.x_bins);
        }
    }
}
