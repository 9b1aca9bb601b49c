//! Metric math — safe ratios, directional comparison, and the declarative
//! metric descriptors consumed by the analyzers.

use crate::types::CampaignAggregate;
use serde::{Deserialize, Serialize};

/// Whether a larger value of a metric is better (ROAS, CVR) or worse (CPA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Declarative description of one comparable metric: where to read it from a
/// campaign aggregate and which direction counts as an improvement.
#[derive(Clone, Copy)]
pub struct MetricDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub direction: Direction,
    pub extract: fn(&CampaignAggregate) -> f64,
}

/// The fixed metric set compared between performance cohorts, in report order.
pub const COHORT_METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        key: "cpa",
        label: "CPA",
        direction: Direction::LowerIsBetter,
        extract: |c| c.cpa,
    },
    MetricDescriptor {
        key: "roas",
        label: "ROAS",
        direction: Direction::HigherIsBetter,
        extract: |c| c.roas,
    },
    MetricDescriptor {
        key: "cvr",
        label: "conversion rate",
        direction: Direction::HigherIsBetter,
        extract: |c| c.cvr,
    },
    MetricDescriptor {
        key: "ctr",
        label: "click rate",
        direction: Direction::HigherIsBetter,
        extract: |c| c.ctr,
    },
    // In the cohort view, spending less for the same outcomes is the better
    // side. Period-over-period comparison deliberately differs: there,
    // rising spend counts as growth, not decline.
    MetricDescriptor {
        key: "cost",
        label: "cost",
        direction: Direction::LowerIsBetter,
        extract: |c| c.cost,
    },
    MetricDescriptor {
        key: "conversions",
        label: "conversions",
        direction: Direction::HigherIsBetter,
        extract: |c| c.conversions,
    },
    MetricDescriptor {
        key: "clicks",
        label: "clicks",
        direction: Direction::HigherIsBetter,
        extract: |c| c.clicks,
    },
];

/// `numerator / denominator`, 0.0 when the denominator is 0.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `numerator / denominator` as a percentage, 0.0 when the denominator is 0.
pub fn safe_pct(numerator: f64, denominator: f64) -> f64 {
    safe_div(numerator, denominator) * 100.0
}

/// Round to two decimal places, the precision summary figures are reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Achievement rate of an actual against its target, honoring direction:
/// for lower-is-better metrics (CPA) the ratio inverts to `target / actual`
/// so that beating the target always reads as a rate above 1.0.
pub fn achievement_rate(target: f64, actual: f64, direction: Direction) -> f64 {
    match direction {
        Direction::HigherIsBetter => safe_div(actual, target),
        Direction::LowerIsBetter => safe_div(target, actual),
    }
}

/// Signed relative difference (percent) between the high- and low-performer
/// cohort averages, oriented so a positive value always means "high
/// performers are better on this metric". A zero low-cohort average yields
/// 0.0 rather than a division error.
pub fn cohort_diff_pct(high_avg: f64, low_avg: f64, direction: Direction) -> f64 {
    if low_avg == 0.0 {
        return 0.0;
    }
    let raw = (high_avg - low_avg) / low_avg.abs() * 100.0;
    match direction {
        Direction::HigherIsBetter => raw,
        Direction::LowerIsBetter => -raw,
    }
}

/// Period-over-period change as a signed fraction. `None` when the previous
/// value is 0 — the change is not comparable, which is distinct from "no
/// change".
pub fn change_rate(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous)
    }
}

/// Render a signed fraction as a percent string, e.g. `+12.3%` / `-4.0%`.
pub fn format_signed_pct(rate: f64) -> String {
    format!("{:+.1}%", rate * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert!((safe_div(10.0, 4.0) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_safe_pct_guards_denominator() {
        assert_eq!(safe_pct(5_000.0, 0.0), 0.0);
        assert!((safe_pct(45_000.0, 500_000.0) - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(123.456_78), 123.46);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(110.0), 110.0);
    }

    #[test]
    fn test_achievement_rate_directional() {
        // Higher-is-better: actual / target.
        let rate = achievement_rate(100.0, 120.0, Direction::HigherIsBetter);
        assert!((rate - 1.2).abs() < f64::EPSILON);

        // Lower-is-better (CPA): target / actual — beating the target (lower
        // actual) yields a rate above 1.0.
        let rate = achievement_rate(1000.0, 800.0, Direction::LowerIsBetter);
        assert!((rate - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cpa_achievement_rate_monotone_in_actual() {
        let target = 1000.0;
        let mut last = f64::MAX;
        for actual in [500.0, 750.0, 1000.0, 1500.0, 4000.0] {
            let rate = achievement_rate(target, actual, Direction::LowerIsBetter);
            assert!(rate <= last, "rate must not increase as actual CPA rises");
            last = rate;
        }
    }

    #[test]
    fn test_cohort_diff_orientation() {
        // Higher-is-better metric where high performers lead: positive.
        let d = cohort_diff_pct(3.0, 2.0, Direction::HigherIsBetter);
        assert!((d - 50.0).abs() < 1e-9);

        // Lower-is-better metric where high performers have the lower value:
        // still positive.
        let d = cohort_diff_pct(100.0, 200.0, Direction::LowerIsBetter);
        assert!((d - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_cohort_diff_zero_low_average() {
        for direction in [Direction::HigherIsBetter, Direction::LowerIsBetter] {
            assert_eq!(cohort_diff_pct(5.0, 0.0, direction), 0.0);
        }
    }

    #[test]
    fn test_change_rate_not_comparable_on_zero_previous() {
        assert!(change_rate(10.0, 0.0).is_none());
        let rate = change_rate(120.0, 100.0).unwrap();
        assert!((rate - 0.2).abs() < f64::EPSILON);
    }
}
