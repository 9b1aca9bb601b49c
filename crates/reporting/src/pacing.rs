//! Budget pacing and KPI achievement — time-normalized spend progress and
//! per-KPI target classification for a reporting period.

use insight_core::config::AnalysisConfig;
use insight_core::metrics::{
    achievement_rate, change_rate, format_signed_pct, safe_div, Direction,
};
use insight_core::types::{AccountTotals, Targets};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether spend is keeping up with the elapsed fraction of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingStatus {
    NoTarget,
    Under,
    OnTrack,
    Over,
}

/// Budget pacing for a period as of a given day.
///
/// When `has_target` is false every target-dependent field is `None` and the
/// status is `no_target`; the daily average and projection are still computed
/// from actual spend alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingResult {
    pub has_target: bool,
    pub status: PacingStatus,
    /// `actual_cost / budget`.
    pub progress_rate: Option<f64>,
    /// `current_day / total_days`.
    pub expected_progress_rate: Option<f64>,
    pub pace_difference: Option<f64>,
    pub daily_average: f64,
    /// Straight-line projection of period-end spend.
    pub projected_total: f64,
    /// `budget - actual_cost`; negative when overspent.
    pub remaining_budget: Option<f64>,
    pub days_remaining: u32,
}

/// How an actual compares to its KPI target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    NoTarget,
    Good,
    Warning,
    Poor,
}

/// The KPIs tracked against monthly targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    Conversions,
    Cpa,
    Cvr,
    Ctr,
}

impl Kpi {
    pub const ALL: [Kpi; 4] = [Kpi::Conversions, Kpi::Cpa, Kpi::Cvr, Kpi::Ctr];

    /// CPA improves downward; everything else improves upward.
    pub fn direction(self) -> Direction {
        match self {
            Kpi::Cpa => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }
}

/// Achievement of one KPI against its target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiAchievement {
    pub kpi: Kpi,
    pub target: Option<f64>,
    pub actual: f64,
    pub achievement_rate: Option<f64>,
    pub status: AchievementStatus,
}

/// KPI actuals for a period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiActuals {
    pub conversions: f64,
    pub cpa: f64,
    pub cvr: f64,
    pub ctr: f64,
}

impl From<&AccountTotals> for KpiActuals {
    fn from(totals: &AccountTotals) -> Self {
        Self {
            conversions: totals.conversions,
            cpa: totals.cpa,
            cvr: totals.cvr,
            ctr: totals.ctr,
        }
    }
}

/// Account metrics used for period-over-period comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub cost: f64,
    pub conversions: f64,
    pub cpa: f64,
    pub cvr: f64,
    pub ctr: f64,
}

impl From<&AccountTotals> for PeriodMetrics {
    fn from(totals: &AccountTotals) -> Self {
        Self {
            cost: totals.cost,
            conversions: totals.conversions,
            cpa: totals.cpa,
            cvr: totals.cvr,
            ctr: totals.ctr,
        }
    }
}

/// One metric's change against the prior period. `comparable` is false when
/// there is no prior period or its value was 0 — explicitly not the same as a
/// zero change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricChange {
    pub metric: String,
    pub current: f64,
    pub previous: Option<f64>,
    pub comparable: bool,
    pub change_rate: Option<f64>,
    pub change_abs: Option<f64>,
    pub improved: Option<bool>,
    pub trend: String,
}

/// Period-over-period comparison across the fixed metric set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub metrics: Vec<MetricChange>,
}

// ---------------------------------------------------------------------------
// PacingAnalyzer
// ---------------------------------------------------------------------------

/// Converts raw actuals plus optional targets into pacing and achievement
/// classifications.
pub struct PacingAnalyzer {
    config: AnalysisConfig,
}

impl PacingAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Classify budget consumption against elapsed time.
    ///
    /// `current_day` and `total_days` must be calendar-consistent positive
    /// values; they are not validated here.
    pub fn analyze_budget_pacing(
        &self,
        target_budget: Option<f64>,
        actual_cost: f64,
        current_day: u32,
        total_days: u32,
    ) -> PacingResult {
        let daily_average = if current_day == 0 {
            0.0
        } else {
            actual_cost / current_day as f64
        };
        let projected_total = daily_average * total_days as f64;
        let days_remaining = total_days.saturating_sub(current_day);

        let budget = match target_budget {
            Some(b) => b,
            None => {
                return PacingResult {
                    has_target: false,
                    status: PacingStatus::NoTarget,
                    progress_rate: None,
                    expected_progress_rate: None,
                    pace_difference: None,
                    daily_average,
                    projected_total,
                    remaining_budget: None,
                    days_remaining,
                }
            }
        };

        let expected_progress = safe_div(current_day as f64, total_days as f64);
        let actual_progress = if budget <= 0.0 {
            0.0
        } else {
            actual_cost / budget
        };
        let pace_difference = actual_progress - expected_progress;

        let band = self.config.pacing.on_track_band;
        let status = if pace_difference <= -band {
            PacingStatus::Under
        } else if pace_difference >= band {
            PacingStatus::Over
        } else {
            PacingStatus::OnTrack
        };

        PacingResult {
            has_target: true,
            status,
            progress_rate: Some(actual_progress),
            expected_progress_rate: Some(expected_progress),
            pace_difference: Some(pace_difference),
            daily_average,
            projected_total,
            remaining_budget: Some(budget - actual_cost),
            days_remaining,
        }
    }

    /// Classify each KPI against its target.
    ///
    /// Absent targets (or a snapshot carrying only zeros) classify every KPI
    /// as `no_target`. When targets exist, KPIs without their own target are
    /// omitted from the result entirely.
    pub fn calculate_kpi_achievement(
        &self,
        targets: Option<&Targets>,
        actuals: &KpiActuals,
    ) -> Vec<KpiAchievement> {
        let no_target_all = |actuals: &KpiActuals| -> Vec<KpiAchievement> {
            Kpi::ALL
                .iter()
                .map(|&kpi| KpiAchievement {
                    kpi,
                    target: None,
                    actual: Self::actual_for(kpi, actuals),
                    achievement_rate: None,
                    status: AchievementStatus::NoTarget,
                })
                .collect()
        };

        let targets = match targets {
            Some(t) if !t.kpi_targets_empty() => t,
            _ => return no_target_all(actuals),
        };

        let mut results = Vec::new();
        for kpi in Kpi::ALL {
            let target = match Self::target_for(kpi, targets) {
                Some(t) => t,
                None => continue,
            };
            let actual = Self::actual_for(kpi, actuals);
            let rate = achievement_rate(target, actual, kpi.direction());
            let status = if rate >= self.config.achievement.good_threshold {
                AchievementStatus::Good
            } else if rate >= self.config.achievement.warning_threshold {
                AchievementStatus::Warning
            } else {
                AchievementStatus::Poor
            };
            results.push(KpiAchievement {
                kpi,
                target: Some(target),
                actual,
                achievement_rate: Some(rate),
                status,
            });
        }
        results
    }

    /// Compare a period's account metrics against the prior period.
    pub fn compare_periods(
        &self,
        current: &PeriodMetrics,
        previous: Option<&PeriodMetrics>,
    ) -> PeriodComparison {
        let pairs: [(&str, f64, Option<f64>, Direction); 5] = [
            (
                "cost",
                current.cost,
                previous.map(|p| p.cost),
                Direction::HigherIsBetter,
            ),
            (
                "conversions",
                current.conversions,
                previous.map(|p| p.conversions),
                Direction::HigherIsBetter,
            ),
            (
                "cpa",
                current.cpa,
                previous.map(|p| p.cpa),
                Direction::LowerIsBetter,
            ),
            (
                "cvr",
                current.cvr,
                previous.map(|p| p.cvr),
                Direction::HigherIsBetter,
            ),
            (
                "ctr",
                current.ctr,
                previous.map(|p| p.ctr),
                Direction::HigherIsBetter,
            ),
        ];

        let metrics = pairs
            .into_iter()
            .map(|(name, cur, prev, direction)| {
                let rate = prev.and_then(|p| change_rate(cur, p));
                match (prev, rate) {
                    (Some(p), Some(r)) => MetricChange {
                        metric: name.to_string(),
                        current: cur,
                        previous: Some(p),
                        comparable: true,
                        change_rate: Some(r),
                        change_abs: Some(cur - p),
                        improved: Some(match direction {
                            Direction::HigherIsBetter => r > 0.0,
                            Direction::LowerIsBetter => r < 0.0,
                        }),
                        trend: format_signed_pct(r),
                    },
                    (prev, _) => MetricChange {
                        metric: name.to_string(),
                        current: cur,
                        previous: prev,
                        comparable: false,
                        change_rate: None,
                        change_abs: None,
                        improved: None,
                        trend: "n/a".to_string(),
                    },
                }
            })
            .collect();

        PeriodComparison { metrics }
    }

    fn target_for(kpi: Kpi, targets: &Targets) -> Option<f64> {
        match kpi {
            Kpi::Conversions => targets.target_conversions,
            Kpi::Cpa => targets.target_cpa,
            Kpi::Cvr => targets.target_cvr,
            Kpi::Ctr => targets.target_ctr,
        }
    }

    fn actual_for(kpi: Kpi, actuals: &KpiActuals) -> f64 {
        match kpi {
            Kpi::Conversions => actuals.conversions,
            Kpi::Cpa => actuals.cpa,
            Kpi::Cvr => actuals.cvr,
            Kpi::Ctr => actuals.ctr,
        }
    }
}

impl Default for PacingAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> PacingAnalyzer {
        PacingAnalyzer::default()
    }

    // 1. Budget pacing -------------------------------------------------------

    #[test]
    fn test_pacing_no_target() {
        let result = analyzer().analyze_budget_pacing(None, 3_100.0, 10, 31);
        assert!(!result.has_target);
        assert_eq!(result.status, PacingStatus::NoTarget);
        assert!(result.progress_rate.is_none());
        assert!(result.remaining_budget.is_none());
        assert!((result.daily_average - 310.0).abs() < f64::EPSILON);
        assert!((result.projected_total - 9_610.0).abs() < f64::EPSILON);
        assert_eq!(result.days_remaining, 21);
    }

    #[test]
    fn test_pacing_on_track_scenario() {
        // 96 774 of 500 000 spent on day 6 of 31: both progress rates ~0.1935.
        let result = analyzer().analyze_budget_pacing(Some(500_000.0), 96_774.0, 6, 31);
        assert!(result.has_target);
        assert_eq!(result.status, PacingStatus::OnTrack);
        let diff = result.pace_difference.unwrap();
        assert!(diff.abs() < 0.001, "pace difference should be ~0, got {diff}");
        assert!((result.remaining_budget.unwrap() - 403_226.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pacing_under_and_over() {
        let under = analyzer().analyze_budget_pacing(Some(100_000.0), 10_000.0, 15, 30);
        assert_eq!(under.status, PacingStatus::Under);

        let over = analyzer().analyze_budget_pacing(Some(100_000.0), 90_000.0, 15, 30);
        assert_eq!(over.status, PacingStatus::Over);
        // Overspend is reported as-is, remaining may go negative later.
        assert!((over.remaining_budget.unwrap() - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pacing_band_boundary_not_on_track() {
        // Expected 0.25 (day 2 of 8), actual 0.375: difference is exactly
        // 0.125, comfortably past the band; a difference within it stays
        // on_track.
        let over = analyzer().analyze_budget_pacing(Some(1_000.0), 375.0, 2, 8);
        assert_eq!(over.status, PacingStatus::Over);

        let ok = analyzer().analyze_budget_pacing(Some(1_000.0), 320.0, 2, 8);
        assert_eq!(ok.status, PacingStatus::OnTrack);
    }

    #[test]
    fn test_pacing_band_exact_boundary_classifies_off_track() {
        // A wider band makes the boundary value exactly representable:
        // day 1 of 4 (expected 0.25) with half the budget spent gives a pace
        // difference bitwise-equal to the band.
        let mut config = AnalysisConfig::default();
        config.pacing.on_track_band = 0.25;
        let analyzer = PacingAnalyzer::new(config);

        let over = analyzer.analyze_budget_pacing(Some(1_000.0), 500.0, 1, 4);
        assert_eq!(over.pace_difference, Some(0.25));
        assert_eq!(over.status, PacingStatus::Over);

        let under = analyzer.analyze_budget_pacing(Some(1_000.0), 0.0, 1, 4);
        assert_eq!(under.pace_difference, Some(-0.25));
        assert_eq!(under.status, PacingStatus::Under);
    }

    #[test]
    fn test_pacing_zero_budget_counts_as_zero_progress() {
        let result = analyzer().analyze_budget_pacing(Some(0.0), 5_000.0, 10, 30);
        assert_eq!(result.progress_rate, Some(0.0));
        assert_eq!(result.status, PacingStatus::Under);
    }

    // 2. KPI achievement -----------------------------------------------------

    fn actuals() -> KpiActuals {
        KpiActuals {
            conversions: 95.0,
            cpa: 1_050.0,
            cvr: 0.02,
            ctr: 0.015,
        }
    }

    #[test]
    fn test_kpi_achievement_without_targets() {
        let results = analyzer().calculate_kpi_achievement(None, &actuals());
        assert_eq!(results.len(), 4);
        assert!(results
            .iter()
            .all(|r| r.status == AchievementStatus::NoTarget && r.achievement_rate.is_none()));
    }

    #[test]
    fn test_kpi_achievement_all_zero_targets_is_no_target() {
        let targets = Targets {
            target_conversions: Some(0.0),
            target_cpa: Some(0.0),
            ..Default::default()
        };
        let results = analyzer().calculate_kpi_achievement(Some(&targets), &actuals());
        assert_eq!(results.len(), 4);
        assert!(results
            .iter()
            .all(|r| r.status == AchievementStatus::NoTarget));
    }

    #[test]
    fn test_kpi_achievement_statuses_and_inverted_cpa() {
        let targets = Targets {
            target_conversions: Some(100.0),
            target_cpa: Some(1_000.0),
            target_cvr: Some(0.025),
            ..Default::default()
        };
        let results = analyzer().calculate_kpi_achievement(Some(&targets), &actuals());
        // CTR has no target and is omitted entirely.
        assert_eq!(results.len(), 3);

        let conv = results.iter().find(|r| r.kpi == Kpi::Conversions).unwrap();
        assert!((conv.achievement_rate.unwrap() - 0.95).abs() < 1e-9);
        assert_eq!(conv.status, AchievementStatus::Good);

        // CPA rate is target/actual: 1000/1050 ≈ 0.952.
        let cpa = results.iter().find(|r| r.kpi == Kpi::Cpa).unwrap();
        assert!((cpa.achievement_rate.unwrap() - 1_000.0 / 1_050.0).abs() < 1e-9);
        assert_eq!(cpa.status, AchievementStatus::Good);

        // CVR 0.02 / 0.025 = 0.8 -> poor.
        let cvr = results.iter().find(|r| r.kpi == Kpi::Cvr).unwrap();
        assert_eq!(cvr.status, AchievementStatus::Poor);
    }

    #[test]
    fn test_kpi_achievement_warning_band() {
        let targets = Targets {
            target_conversions: Some(100.0),
            ..Default::default()
        };
        let mid = KpiActuals {
            conversions: 90.0,
            ..Default::default()
        };
        let results = analyzer().calculate_kpi_achievement(Some(&targets), &mid);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, AchievementStatus::Warning);
    }

    // 3. Period comparison ---------------------------------------------------

    #[test]
    fn test_compare_periods_directional_improvement() {
        let current = PeriodMetrics {
            cost: 120.0,
            conversions: 110.0,
            cpa: 90.0,
            cvr: 0.03,
            ctr: 0.01,
        };
        let previous = PeriodMetrics {
            cost: 100.0,
            conversions: 100.0,
            cpa: 100.0,
            cvr: 0.02,
            ctr: 0.02,
        };
        let comparison = analyzer().compare_periods(&current, Some(&previous));
        let by_name = |name: &str| {
            comparison
                .metrics
                .iter()
                .find(|m| m.metric == name)
                .unwrap()
                .clone()
        };

        assert_eq!(by_name("cost").improved, Some(true));
        assert_eq!(by_name("conversions").improved, Some(true));
        // CPA fell 10% — an improvement.
        let cpa = by_name("cpa");
        assert_eq!(cpa.improved, Some(true));
        assert!((cpa.change_rate.unwrap() + 0.1).abs() < 1e-9);
        assert_eq!(cpa.trend, "-10.0%");
        // CTR halved — not an improvement.
        assert_eq!(by_name("ctr").improved, Some(false));
    }

    #[test]
    fn test_compare_periods_not_comparable() {
        let current = PeriodMetrics {
            cost: 120.0,
            ..Default::default()
        };

        // No previous period at all.
        let comparison = analyzer().compare_periods(&current, None);
        assert_eq!(comparison.metrics.len(), 5);
        assert!(comparison
            .metrics
            .iter()
            .all(|m| !m.comparable && m.change_rate.is_none() && m.trend == "n/a"));

        // Previous period present but zero-valued metric.
        let previous = PeriodMetrics {
            cost: 100.0,
            ..Default::default()
        };
        let comparison = analyzer().compare_periods(&current, Some(&previous));
        let conv = comparison
            .metrics
            .iter()
            .find(|m| m.metric == "conversions")
            .unwrap();
        assert!(!conv.comparable);
        assert_eq!(conv.previous, Some(0.0));
        let cost = comparison.metrics.iter().find(|m| m.metric == "cost").unwrap();
        assert!(cost.comparable);
    }
}
