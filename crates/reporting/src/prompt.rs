//! Narration prompt builder — renders the structured report sections into the
//! plain-text payload sent to the external narration service. Outbound only;
//! no verdict in the report depends on the narration response.

use crate::actions::ActionRecommendations;
use crate::comparative::ComparativeAnalysis;
use crate::pacing::{KpiAchievement, PacingResult, PacingStatus};
use insight_core::types::{AccountTotals, PeriodKey};
use std::fmt::Write;

/// Build the deterministic narration prompt for an assembled report.
pub fn build_narration_prompt(
    period: &PeriodKey,
    totals: &AccountTotals,
    pacing: &PacingResult,
    kpi_achievement: &[KpiAchievement],
    analysis: &ComparativeAnalysis,
    recommendations: &ActionRecommendations,
) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "You are an advertising performance analyst. Summarize the {period} report below in plain language for a marketing manager."
    );

    let _ = writeln!(out, "\n## Account totals");
    let _ = writeln!(
        out,
        "cost={:.0} impressions={:.0} clicks={:.0} conversions={:.0} cpa={:.2} cvr={:.4} ctr={:.4} roas={:.2}",
        totals.cost,
        totals.impressions,
        totals.clicks,
        totals.conversions,
        totals.cpa,
        totals.cvr,
        totals.ctr,
        totals.roas
    );

    let _ = writeln!(out, "\n## Budget pacing");
    if pacing.status == PacingStatus::NoTarget {
        let _ = writeln!(
            out,
            "no budget target set; daily average {:.0}, projected period total {:.0}",
            pacing.daily_average, pacing.projected_total
        );
    } else {
        let _ = writeln!(
            out,
            "status={:?} progress={:.1}% expected={:.1}% remaining_budget={:.0}",
            pacing.status,
            pacing.progress_rate.unwrap_or(0.0) * 100.0,
            pacing.expected_progress_rate.unwrap_or(0.0) * 100.0,
            pacing.remaining_budget.unwrap_or(0.0)
        );
    }

    let _ = writeln!(out, "\n## KPI achievement");
    for kpi in kpi_achievement {
        match kpi.achievement_rate {
            Some(rate) => {
                let _ = writeln!(
                    out,
                    "{:?}: actual={:.4} target={:.4} rate={:.1}% status={:?}",
                    kpi.kpi,
                    kpi.actual,
                    kpi.target.unwrap_or(0.0),
                    rate * 100.0,
                    kpi.status
                );
            }
            None => {
                let _ = writeln!(out, "{:?}: no target set", kpi.kpi);
            }
        }
    }

    let _ = writeln!(out, "\n## Campaign cohort comparison");
    if analysis.skipped {
        let _ = writeln!(
            out,
            "skipped: {}",
            analysis.skip_reason.as_deref().unwrap_or("no reason recorded")
        );
    } else {
        if let Some(summary) = &analysis.summary {
            let _ = writeln!(
                out,
                "{} eligible campaigns, {} per cohort; top cohort avg CPA {:.2} vs {:.2}",
                summary.eligible_count,
                summary.cohort_size,
                summary.high_avg_cpa,
                summary.low_avg_cpa
            );
        }
        for diff in &analysis.top_differences {
            let _ = writeln!(
                out,
                "- {}: high performers better by {:.1}% ({:.4} vs {:.4})",
                diff.label, diff.diff_pct, diff.high_avg, diff.low_avg
            );
        }
    }

    let _ = writeln!(out, "\n## Recommended actions");
    let _ = writeln!(out, "{}", recommendations.summary);
    for action in &recommendations.actions {
        let _ = writeln!(out, "- [{:?}] {}: {}", action.priority, action.title, action.description);
    }

    out
}
