//! Comparative analysis — splits a campaign population into high- and
//! low-performing cohorts by CPA and surfaces the metric gaps between them.

use insight_core::config::ComparisonConfig;
use insight_core::metrics::{cohort_diff_pct, round2, safe_div, Direction, COHORT_METRICS};
use insight_core::types::CampaignAggregate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::info;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One metric's cohort averages and the oriented gap between them. The sign
/// of `diff_pct` always reads "positive means high performers are better".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: String,
    pub label: String,
    pub direction: Direction,
    pub high_avg: f64,
    pub low_avg: f64,
    pub diff_pct: f64,
    pub significant: bool,
}

/// Cohort-level summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortSummary {
    pub eligible_count: usize,
    pub cohort_size: usize,
    pub high_avg_cpa: f64,
    pub low_avg_cpa: f64,
    pub high_avg_roas: f64,
    pub low_avg_roas: f64,
}

/// Full result of a cohort comparison run. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparativeAnalysis {
    pub skipped: bool,
    pub skip_reason: Option<String>,
    pub high_performers: Vec<CampaignAggregate>,
    pub low_performers: Vec<CampaignAggregate>,
    pub comparisons: Vec<MetricComparison>,
    pub significant_differences: Vec<MetricComparison>,
    /// The most significant differences, largest absolute gap first.
    pub top_differences: Vec<MetricComparison>,
    pub summary: Option<CohortSummary>,
}

impl ComparativeAnalysis {
    /// A skipped analysis carrying a human-readable reason and no cohorts.
    pub fn skipped(reason: String) -> Self {
        Self {
            skipped: true,
            skip_reason: Some(reason),
            high_performers: Vec::new(),
            low_performers: Vec::new(),
            comparisons: Vec::new(),
            significant_differences: Vec::new(),
            top_differences: Vec::new(),
            summary: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ComparativeAnalyzer
// ---------------------------------------------------------------------------

/// Ranks campaigns by CPA and compares the best slice against the worst.
pub struct ComparativeAnalyzer {
    config: ComparisonConfig,
}

impl ComparativeAnalyzer {
    pub fn new(config: ComparisonConfig) -> Self {
        Self { config }
    }

    /// Analyze a campaign population.
    ///
    /// Campaigns without a positive CPA cannot be ranked and are excluded up
    /// front; populations smaller than twice `min_per_group` after that
    /// filter are skipped with a stated reason.
    pub fn analyze(&self, campaigns: &[CampaignAggregate]) -> ComparativeAnalysis {
        let min_per_group = self.config.min_per_group;
        let mut eligible: Vec<&CampaignAggregate> =
            campaigns.iter().filter(|c| c.cpa > 0.0).collect();

        let required = 2 * min_per_group;
        if eligible.len() < required {
            let reason = format!(
                "comparative analysis requires at least {} campaigns with a positive CPA, found {}",
                required,
                eligible.len()
            );
            info!(eligible = eligible.len(), required, "comparative analysis skipped");
            return ComparativeAnalysis::skipped(reason);
        }

        // Rank ascending by CPA: cheapest acquisitions first.
        eligible.sort_by(|a, b| a.cpa.partial_cmp(&b.cpa).unwrap_or(Ordering::Equal));

        // Cohort size: a truncated fraction of the population, floored up to
        // the minimum. The entry gate above guarantees the cohorts cannot
        // overlap; assert that invariant rather than trusting it silently.
        let fractional = (eligible.len() as f64 * self.config.cohort_fraction) as usize;
        let cohort_size = fractional.max(min_per_group);
        debug_assert!(
            2 * cohort_size <= eligible.len(),
            "cohorts may not overlap: size {} over population {}",
            cohort_size,
            eligible.len()
        );

        let high: Vec<CampaignAggregate> = eligible[..cohort_size]
            .iter()
            .map(|c| (*c).clone())
            .collect();
        let low: Vec<CampaignAggregate> = eligible[eligible.len() - cohort_size..]
            .iter()
            .map(|c| (*c).clone())
            .collect();

        let comparisons: Vec<MetricComparison> = COHORT_METRICS
            .iter()
            .map(|d| {
                let high_avg = mean(&high, d.extract);
                let low_avg = mean(&low, d.extract);
                let diff_pct = cohort_diff_pct(high_avg, low_avg, d.direction);
                MetricComparison {
                    metric: d.key.to_string(),
                    label: d.label.to_string(),
                    direction: d.direction,
                    high_avg,
                    low_avg,
                    diff_pct,
                    significant: diff_pct.abs() >= self.config.significance_pct,
                }
            })
            .collect();

        let significant_differences: Vec<MetricComparison> = comparisons
            .iter()
            .filter(|c| c.significant)
            .cloned()
            .collect();

        // Largest absolute gap first; stable sort keeps metric-list order for
        // ties.
        let mut top_differences = significant_differences.clone();
        top_differences.sort_by(|a, b| {
            b.diff_pct
                .abs()
                .partial_cmp(&a.diff_pct.abs())
                .unwrap_or(Ordering::Equal)
        });
        top_differences.truncate(self.config.top_differences);

        // Summary averages are reporting figures; round them to the report
        // precision. The comparisons above stay unrounded.
        let summary = CohortSummary {
            eligible_count: eligible.len(),
            cohort_size,
            high_avg_cpa: round2(mean(&high, |c| c.cpa)),
            low_avg_cpa: round2(mean(&low, |c| c.cpa)),
            high_avg_roas: round2(mean(&high, |c| c.roas)),
            low_avg_roas: round2(mean(&low, |c| c.roas)),
        };

        info!(
            eligible = eligible.len(),
            cohort_size,
            significant = significant_differences.len(),
            "comparative analysis complete"
        );

        ComparativeAnalysis {
            skipped: false,
            skip_reason: None,
            high_performers: high,
            low_performers: low,
            comparisons,
            significant_differences,
            top_differences,
            summary: Some(summary),
        }
    }
}

impl Default for ComparativeAnalyzer {
    fn default() -> Self {
        Self::new(ComparisonConfig::default())
    }
}

fn mean(cohort: &[CampaignAggregate], extract: impl Fn(&CampaignAggregate) -> f64) -> f64 {
    safe_div(cohort.iter().map(&extract).sum(), cohort.len() as f64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
