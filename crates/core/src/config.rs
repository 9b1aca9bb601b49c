use serde::Deserialize;

/// Analysis thresholds and tuning knobs. Loaded from environment variables
/// with the prefix `CAMPAIGN_INSIGHT__`; every field has a production default
/// so an empty environment yields a fully usable configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub achievement: AchievementConfig,
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub actions: ActionConfig,
}

/// Budget pacing classification band.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Progress-vs-time deviation tolerated before a campaign is flagged as
    /// under- or over-pacing (fraction of budget, strict comparison).
    #[serde(default = "default_on_track_band")]
    pub on_track_band: f64,
}

/// KPI achievement status cut points, shared by all KPIs.
#[derive(Debug, Clone, Deserialize)]
pub struct AchievementConfig {
    #[serde(default = "default_good_threshold")]
    pub good_threshold: f64,
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
}

/// Cohort comparison parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonConfig {
    /// Absolute cohort difference (in percent) required to flag a metric as
    /// significant.
    #[serde(default = "default_significance_pct")]
    pub significance_pct: f64,
    /// Minimum campaigns per cohort; populations below twice this are skipped.
    #[serde(default = "default_min_per_group")]
    pub min_per_group: usize,
    /// Fraction of the eligible population taken into each cohort (truncated,
    /// then floored up to `min_per_group`).
    #[serde(default = "default_cohort_fraction")]
    pub cohort_fraction: f64,
    /// How many of the most significant differences the summary surfaces.
    #[serde(default = "default_top_differences")]
    pub top_differences: usize,
}

/// Action priority cut points and whole-account signal thresholds.
///
/// `high_priority_pct` is numerically equal to the comparison significance
/// threshold today but is an independent knob; tuning one must not move the
/// other.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionConfig {
    #[serde(default = "default_high_priority_pct")]
    pub high_priority_pct: f64,
    #[serde(default = "default_medium_priority_pct")]
    pub medium_priority_pct: f64,
    /// Budget usage (percent) below which an under-utilization action fires.
    #[serde(default = "default_low_budget_usage_pct")]
    pub low_budget_usage_pct: f64,
    /// Budget usage (percent) above which an overage-risk action fires.
    #[serde(default = "default_high_budget_usage_pct")]
    pub high_budget_usage_pct: f64,
    /// ROAS shortfall (percent of target) above which the ROAS action is
    /// escalated to high priority.
    #[serde(default = "default_roas_gap_high_pct")]
    pub roas_gap_high_pct: f64,
}

// Default functions
fn default_on_track_band() -> f64 {
    0.10
}
fn default_good_threshold() -> f64 {
    0.95
}
fn default_warning_threshold() -> f64 {
    0.85
}
fn default_significance_pct() -> f64 {
    20.0
}
fn default_min_per_group() -> usize {
    3
}
fn default_cohort_fraction() -> f64 {
    0.20
}
fn default_top_differences() -> usize {
    5
}
fn default_high_priority_pct() -> f64 {
    20.0
}
fn default_medium_priority_pct() -> f64 {
    10.0
}
fn default_low_budget_usage_pct() -> f64 {
    50.0
}
fn default_high_budget_usage_pct() -> f64 {
    90.0
}
fn default_roas_gap_high_pct() -> f64 {
    20.0
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            on_track_band: default_on_track_band(),
        }
    }
}

impl Default for AchievementConfig {
    fn default() -> Self {
        Self {
            good_threshold: default_good_threshold(),
            warning_threshold: default_warning_threshold(),
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            significance_pct: default_significance_pct(),
            min_per_group: default_min_per_group(),
            cohort_fraction: default_cohort_fraction(),
            top_differences: default_top_differences(),
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            high_priority_pct: default_high_priority_pct(),
            medium_priority_pct: default_medium_priority_pct(),
            low_budget_usage_pct: default_low_budget_usage_pct(),
            high_budget_usage_pct: default_high_budget_usage_pct(),
            roas_gap_high_pct: default_roas_gap_high_pct(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            achievement: AchievementConfig::default(),
            comparison: ComparisonConfig::default(),
            actions: ActionConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_INSIGHT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_design_constants() {
        let cfg = AnalysisConfig::default();
        assert!((cfg.pacing.on_track_band - 0.10).abs() < f64::EPSILON);
        assert!((cfg.achievement.good_threshold - 0.95).abs() < f64::EPSILON);
        assert!((cfg.achievement.warning_threshold - 0.85).abs() < f64::EPSILON);
        assert!((cfg.comparison.significance_pct - 20.0).abs() < f64::EPSILON);
        assert_eq!(cfg.comparison.min_per_group, 3);
        assert!((cfg.actions.high_priority_pct - 20.0).abs() < f64::EPSILON);
        assert!((cfg.actions.medium_priority_pct - 10.0).abs() < f64::EPSILON);
    }
}
