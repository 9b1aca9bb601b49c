//! Action recommendation — maps significant cohort differences and
//! whole-account signals into a prioritized, explained action list.

use crate::comparative::ComparativeAnalysis;
use insight_core::config::ActionConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

impl ActionPriority {
    /// Sort rank: high first.
    pub fn rank(self) -> u8 {
        match self {
            ActionPriority::High => 0,
            ActionPriority::Medium => 1,
            ActionPriority::Low => 2,
        }
    }
}

/// One recommended action with its rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub title: String,
    pub description: String,
    pub priority: ActionPriority,
    pub expected_impact: String,
    pub validation_method: String,
    pub category: String,
}

/// The full recommendation set, priority-sorted with generation order
/// preserved within each priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecommendations {
    pub actions: Vec<ActionItem>,
    pub summary: String,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
}

/// Whole-account signals, independent of the cohort comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountMetrics {
    pub budget_usage_pct: Option<f64>,
    pub overall_roas: Option<f64>,
    pub target_roas: Option<f64>,
}

struct ActionTemplate {
    title: &'static str,
    advice: &'static str,
    expected_impact: &'static str,
    validation_method: &'static str,
    category: &'static str,
}

/// Fixed per-metric playbook. Metrics without an entry produce no action.
fn template_for(metric: &str) -> Option<&'static ActionTemplate> {
    match metric {
        "cpa" => Some(&ActionTemplate {
            title: "Rebalance spend toward low-CPA campaigns",
            advice: "shift budget from the high-CPA cohort into the campaigns acquiring cheapest, and audit bids and audiences on the laggards",
            expected_impact: "Lower blended CPA as spend concentrates where acquisition is cheapest",
            validation_method: "Track blended CPA weekly after the budget shift",
            category: "budget_allocation",
        }),
        "roas" => Some(&ActionTemplate {
            title: "Replicate high-ROAS campaign setups",
            advice: "copy the creative, audience, and bidding setup of the high-ROAS cohort into underperforming campaigns",
            expected_impact: "Higher return on spend across the account",
            validation_method: "Compare per-campaign ROAS before and after the rollout",
            category: "optimization",
        }),
        "cvr" => Some(&ActionTemplate {
            title: "Fix the post-click experience on low-CVR campaigns",
            advice: "review landing pages, offers, and audience fit where the conversion rate lags the top cohort",
            expected_impact: "More conversions from the same click volume",
            validation_method: "A/B test landing-page variants and watch CVR",
            category: "conversion",
        }),
        "ctr" => Some(&ActionTemplate {
            title: "Refresh creatives on low-CTR campaigns",
            advice: "rotate in the ad copy and formats that earn clicks in the top cohort",
            expected_impact: "Higher click-through at unchanged impression volume",
            validation_method: "Monitor CTR per creative over the next two weeks",
            category: "creative",
        }),
        "cost" => Some(&ActionTemplate {
            title: "Review spend concentration",
            advice: "check whether the spend gap between cohorts matches their performance gap, and cap spend where it does not",
            expected_impact: "Less budget locked in underperforming campaigns",
            validation_method: "Compare cohort spend shares after rebalancing",
            category: "budget_allocation",
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ActionRecommender
// ---------------------------------------------------------------------------

/// Turns an analysis result into a deduplicated, prioritized action list.
pub struct ActionRecommender {
    config: ActionConfig,
}

impl ActionRecommender {
    pub fn new(config: ActionConfig) -> Self {
        Self { config }
    }

    pub fn generate(
        &self,
        analysis: &ComparativeAnalysis,
        overall: Option<&AccountMetrics>,
    ) -> ActionRecommendations {
        if analysis.skipped {
            let detail = analysis
                .skip_reason
                .clone()
                .unwrap_or_else(|| "comparative analysis was skipped".to_string());
            return ActionRecommendations {
                actions: Vec::new(),
                summary: format!(
                    "No recommended actions: insufficient campaign volume ({detail})."
                ),
                high_count: 0,
                medium_count: 0,
                low_count: 0,
            };
        }

        let mut actions: Vec<ActionItem> = Vec::new();

        // Cohort-derived actions, in significant-difference order.
        for diff in &analysis.significant_differences {
            let template = match template_for(&diff.metric) {
                Some(t) => t,
                None => continue,
            };
            let gap = diff.diff_pct.abs();
            let priority = if gap >= self.config.high_priority_pct {
                ActionPriority::High
            } else if gap >= self.config.medium_priority_pct {
                ActionPriority::Medium
            } else {
                ActionPriority::Low
            };
            actions.push(ActionItem {
                title: template.title.to_string(),
                description: format!(
                    "Top campaigns outperform the bottom cohort on {} by {:.1}%: {}.",
                    diff.label, gap, template.advice
                ),
                priority,
                expected_impact: template.expected_impact.to_string(),
                validation_method: template.validation_method.to_string(),
                category: template.category.to_string(),
            });
        }

        // Whole-account signals, after the cohort actions.
        if let Some(overall) = overall {
            self.push_account_actions(overall, &mut actions);
        }

        // Stable sort: generation order survives within each priority.
        actions.sort_by_key(|a| a.priority.rank());

        let high_count = actions
            .iter()
            .filter(|a| a.priority == ActionPriority::High)
            .count();
        let medium_count = actions
            .iter()
            .filter(|a| a.priority == ActionPriority::Medium)
            .count();
        let low_count = actions.len() - high_count - medium_count;

        let summary = format!(
            "{} recommended actions: {} high priority (implement immediately), \
             {} medium priority (within two weeks), {} low priority (situational).",
            actions.len(),
            high_count,
            medium_count,
            low_count
        );

        info!(
            total = actions.len(),
            high = high_count,
            medium = medium_count,
            low = low_count,
            "action recommendations generated"
        );

        ActionRecommendations {
            actions,
            summary,
            high_count,
            medium_count,
            low_count,
        }
    }

    fn push_account_actions(&self, overall: &AccountMetrics, actions: &mut Vec<ActionItem>) {
        if let Some(usage) = overall.budget_usage_pct {
            if usage < self.config.low_budget_usage_pct {
                actions.push(ActionItem {
                    title: "Increase budget utilization".to_string(),
                    description: format!(
                        "Only {usage:.1}% of the monthly budget has been used; raise bids or widen targeting on proven campaigns to avoid leaving budget unspent."
                    ),
                    priority: ActionPriority::Medium,
                    expected_impact: "Full budget delivery without quality loss".to_string(),
                    validation_method: "Check daily spend pace against the remaining budget"
                        .to_string(),
                    category: "budget_pacing".to_string(),
                });
            } else if usage > self.config.high_budget_usage_pct {
                actions.push(ActionItem {
                    title: "Manage budget overage risk".to_string(),
                    description: format!(
                        "{usage:.1}% of the monthly budget is already spent; cap daily budgets or pause low performers to avoid an overage."
                    ),
                    priority: ActionPriority::High,
                    expected_impact: "Spend stays within the approved budget".to_string(),
                    validation_method: "Review spend caps daily until period end".to_string(),
                    category: "budget_pacing".to_string(),
                });
            }
        }

        if let (Some(roas), Some(target)) = (overall.overall_roas, overall.target_roas) {
            if target > 0.0 && roas < target {
                let gap_pct = (target - roas) / target * 100.0;
                let priority = if gap_pct > self.config.roas_gap_high_pct {
                    ActionPriority::High
                } else {
                    ActionPriority::Medium
                };
                actions.push(ActionItem {
                    title: "Close the ROAS gap to target".to_string(),
                    description: format!(
                        "Overall ROAS {roas:.2} is {gap_pct:.1}% below the {target:.2} target; prioritize the campaigns and audiences with the strongest return."
                    ),
                    priority,
                    expected_impact: "Return on spend recovers toward target".to_string(),
                    validation_method: "Track weekly account ROAS against target".to_string(),
                    category: "roas".to_string(),
                });
            }
        }
    }
}

impl Default for ActionRecommender {
    fn default() -> Self {
        Self::new(ActionConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
