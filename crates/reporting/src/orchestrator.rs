//! Report orchestration — sequences pacing, comparative analysis, and action
//! recommendation over a reporting period and assembles the final report.

use crate::actions::{AccountMetrics, ActionRecommendations, ActionRecommender};
use crate::comparative::{ComparativeAnalysis, ComparativeAnalyzer};
use crate::pacing::{KpiAchievement, PacingAnalyzer, PacingResult, PeriodComparison};
use crate::prompt::build_narration_prompt;
use crate::store::TargetStore;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use insight_core::config::AnalysisConfig;
use insight_core::metrics::safe_pct;
use insight_core::types::{AccountTotals, PeriodKey, RowSet, COL_CAMPAIGN};
use insight_core::{InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Collaborator seam
// ---------------------------------------------------------------------------

/// Warehouse seam: returns the period's rows as already-shaped tabular data.
/// Synchronous by design — the core never blocks on its own logic, and the
/// actually slow work lives behind this trait.
pub trait MetricsSource {
    fn fetch_rows(&self, period: PeriodKey) -> InsightResult<RowSet>;
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parameters for one report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub period: PeriodKey,
    /// Fetch the prior period and include a period-over-period section.
    pub compare_previous: bool,
    /// Reference date for day-of-period progress; defaults to today.
    pub as_of: Option<NaiveDate>,
}

impl ReportRequest {
    pub fn new(period: PeriodKey) -> Self {
        Self {
            period,
            compare_previous: false,
            as_of: None,
        }
    }
}

/// The assembled report. Every section is always present; only the optional
/// period-over-period comparison may be omitted (when no prior data exists).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub report_id: Uuid,
    pub period: PeriodKey,
    pub period_label: String,
    pub generated_at: DateTime<Utc>,
    pub current_day: u32,
    pub total_days: u32,
    pub totals: AccountTotals,
    pub pacing: PacingResult,
    pub kpi_achievement: Vec<KpiAchievement>,
    pub comparison: Option<PeriodComparison>,
    pub comparative_analysis: ComparativeAnalysis,
    pub action_recommendations: ActionRecommendations,
    /// Outbound payload for the narration collaborator; never read back.
    pub narration_prompt: String,
}

// ---------------------------------------------------------------------------
// ReportOrchestrator
// ---------------------------------------------------------------------------

/// Runs the full diagnose → compare → recommend pipeline for one period.
/// Holds no mutable state between runs; independent runs may be parallelized
/// by the caller.
pub struct ReportOrchestrator<S: MetricsSource, T: TargetStore> {
    source: S,
    target_store: T,
    pacing: PacingAnalyzer,
    comparative: ComparativeAnalyzer,
    recommender: ActionRecommender,
}

impl<S: MetricsSource, T: TargetStore> ReportOrchestrator<S, T> {
    pub fn new(source: S, target_store: T, config: AnalysisConfig) -> Self {
        Self {
            source,
            target_store,
            pacing: PacingAnalyzer::new(config.clone()),
            comparative: ComparativeAnalyzer::new(config.comparison.clone()),
            recommender: ActionRecommender::new(config.actions.clone()),
        }
    }

    /// Produce a report for the requested period.
    ///
    /// An empty primary dataset aborts the run; every other data problem
    /// degrades the affected section with a stated reason and the rest of
    /// the pipeline proceeds.
    pub fn run(&self, request: &ReportRequest) -> InsightResult<PerformanceReport> {
        let period = request.period;
        info!(period = %period, "report run started");

        let rows = self.source.fetch_rows(period)?;
        if rows.is_empty() {
            return Err(InsightError::EmptyDataset(format!(
                "no performance rows for period {period}"
            )));
        }
        info!(rows = rows.len(), "primary data fetched");

        let totals = rows.account_totals();

        let targets = match self.target_store.get(&period) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "target store read failed; proceeding without targets");
                None
            }
        };

        let total_days = period.days_in_month();
        let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let current_day = elapsed_day(period, as_of, total_days);

        let pacing = self.pacing.analyze_budget_pacing(
            targets.as_ref().and_then(|t| t.budget),
            totals.cost,
            current_day,
            total_days,
        );
        let kpi_achievement = self
            .pacing
            .calculate_kpi_achievement(targets.as_ref(), &(&totals).into());
        info!(status = ?pacing.status, "pacing and achievement computed");

        let comparison = if request.compare_previous {
            self.fetch_comparison(period, &totals)
        } else {
            None
        };

        let comparative_analysis = if rows.has_column(COL_CAMPAIGN) {
            self.comparative.analyze(&rows.group_by_campaign())
        } else {
            warn!(column = COL_CAMPAIGN, "grouping column missing; skipping comparative analysis");
            ComparativeAnalysis::skipped(format!(
                "input data has no '{COL_CAMPAIGN}' column; comparative analysis and recommendations were skipped"
            ))
        };

        let account_metrics = AccountMetrics {
            budget_usage_pct: targets
                .as_ref()
                .and_then(|t| t.budget)
                .filter(|b| *b > 0.0)
                .map(|b| safe_pct(totals.cost, b)),
            overall_roas: Some(totals.roas),
            // The targets snapshot carries no ROAS target; callers using the
            // recommender directly may supply one.
            target_roas: None,
        };
        let action_recommendations = self
            .recommender
            .generate(&comparative_analysis, Some(&account_metrics));

        let narration_prompt = build_narration_prompt(
            &period,
            &totals,
            &pacing,
            &kpi_achievement,
            &comparative_analysis,
            &action_recommendations,
        );

        info!(period = %period, actions = action_recommendations.actions.len(), "report assembled");

        Ok(PerformanceReport {
            report_id: Uuid::new_v4(),
            period,
            period_label: period.to_string(),
            generated_at: Utc::now(),
            current_day,
            total_days,
            totals,
            pacing,
            kpi_achievement,
            comparison,
            comparative_analysis,
            action_recommendations,
            narration_prompt,
        })
    }

    /// Fetch the prior period and build the comparison section. Any failure
    /// or emptiness omits the section instead of failing the run.
    fn fetch_comparison(
        &self,
        period: PeriodKey,
        totals: &AccountTotals,
    ) -> Option<PeriodComparison> {
        let previous = period.previous();
        match self.source.fetch_rows(previous) {
            Ok(prev_rows) if !prev_rows.is_empty() => {
                let prev_totals = prev_rows.account_totals();
                Some(
                    self.pacing
                        .compare_periods(&totals.into(), Some(&(&prev_totals).into())),
                )
            }
            Ok(_) => {
                warn!(period = %previous, "comparison period empty; omitting comparison section");
                None
            }
            Err(e) => {
                warn!(period = %previous, error = %e, "comparison fetch failed; omitting comparison section");
                None
            }
        }
    }
}

/// Day-of-period progress relative to a reference date: the reference day for
/// the current month, the full month for completed periods, day 1 for
/// not-yet-started periods.
fn elapsed_day(period: PeriodKey, as_of: NaiveDate, total_days: u32) -> u32 {
    let as_of_month = (as_of.year(), as_of.month());
    let period_month = (period.year, period.month);
    if as_of_month == period_month {
        as_of.day().min(total_days)
    } else if as_of_month > period_month {
        total_days
    } else {
        1
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
