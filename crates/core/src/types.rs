use crate::metrics::safe_div;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Column names the warehouse collaborator is expected to deliver.
pub const COL_DATE: &str = "date";
pub const COL_CAMPAIGN: &str = "campaign_name";
pub const COL_MEDIA: &str = "media";
pub const COL_COST: &str = "cost";
pub const COL_IMPRESSIONS: &str = "impressions";
pub const COL_CLICKS: &str = "clicks";
pub const COL_CONVERSIONS: &str = "conversions";
pub const COL_CONVERSION_VALUE: &str = "conversion_value";

/// One typed performance row, for sources that already deliver clean data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRow {
    pub date: NaiveDate,
    pub campaign_name: String,
    pub media: String,
    pub cost: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub conversions: f64,
    /// Revenue attributed to conversions; 0 when the source has no revenue
    /// column (ROAS then reads 0 throughout).
    #[serde(default)]
    pub conversion_value: f64,
}

/// Schema-lenient tabular input as delivered by the warehouse collaborator.
///
/// Rows are JSON objects; numeric fields are coerced on read (missing or
/// non-numeric values become 0, numeric strings are parsed), so malformed
/// cells degrade a value rather than failing a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowSet {
    rows: Vec<serde_json::Map<String, Value>>,
}

impl RowSet {
    /// Build from raw JSON values; non-object rows are dropped.
    pub fn from_values(values: Vec<Value>) -> Self {
        let rows = values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Self { rows }
    }

    /// Build from already-typed rows.
    pub fn from_rows(rows: &[PerformanceRow]) -> Self {
        let values = rows
            .iter()
            .map(|r| serde_json::to_value(r).unwrap_or(Value::Null))
            .collect();
        Self::from_values(values)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row carries the given column.
    pub fn has_column(&self, name: &str) -> bool {
        self.rows.iter().any(|r| r.contains_key(name))
    }

    /// Sum of a numeric column across all rows, with lenient coercion.
    pub fn column_total(&self, name: &str) -> f64 {
        self.rows.iter().map(|r| coerce_metric(r.get(name))).sum()
    }

    /// Whole-set totals with derived rates.
    pub fn account_totals(&self) -> AccountTotals {
        AccountTotals::new(
            self.column_total(COL_COST),
            self.column_total(COL_IMPRESSIONS),
            self.column_total(COL_CLICKS),
            self.column_total(COL_CONVERSIONS),
            self.column_total(COL_CONVERSION_VALUE),
        )
    }

    /// Group rows by campaign name into per-campaign aggregates, sorted by
    /// name for deterministic output. Rows without a usable campaign name are
    /// collected under `(unknown)`.
    pub fn group_by_campaign(&self) -> Vec<CampaignAggregate> {
        let mut groups: BTreeMap<String, [f64; 5]> = BTreeMap::new();
        for row in &self.rows {
            let name = row
                .get(COL_CAMPAIGN)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or("(unknown)")
                .to_string();
            let acc = groups.entry(name).or_insert([0.0; 5]);
            acc[0] += coerce_metric(row.get(COL_COST));
            acc[1] += coerce_metric(row.get(COL_IMPRESSIONS));
            acc[2] += coerce_metric(row.get(COL_CLICKS));
            acc[3] += coerce_metric(row.get(COL_CONVERSIONS));
            acc[4] += coerce_metric(row.get(COL_CONVERSION_VALUE));
        }
        groups
            .into_iter()
            .map(|(name, m)| CampaignAggregate::new(name, m[0], m[1], m[2], m[3], m[4]))
            .collect()
    }
}

/// Coerce a cell to a non-negative float: numbers pass through, numeric
/// strings parse, everything else (missing, null, text) reads as 0.
pub fn coerce_metric(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// One campaign's totals for a reporting period, with rates derived once at
/// construction. Immutable for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignAggregate {
    pub name: String,
    pub cost: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub conversions: f64,
    pub conversion_value: f64,
    /// `cost / conversions` (0 when no conversions).
    pub cpa: f64,
    /// `conversion_value / cost` (0 when no cost).
    pub roas: f64,
    /// `conversions / clicks`.
    pub cvr: f64,
    /// `clicks / impressions`.
    pub ctr: f64,
}

impl CampaignAggregate {
    pub fn new(
        name: String,
        cost: f64,
        impressions: f64,
        clicks: f64,
        conversions: f64,
        conversion_value: f64,
    ) -> Self {
        Self {
            name,
            cost,
            impressions,
            clicks,
            conversions,
            conversion_value,
            cpa: safe_div(cost, conversions),
            roas: safe_div(conversion_value, cost),
            cvr: safe_div(conversions, clicks),
            ctr: safe_div(clicks, impressions),
        }
    }
}

/// Whole-account totals for a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTotals {
    pub cost: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub conversions: f64,
    pub conversion_value: f64,
    pub cpa: f64,
    pub roas: f64,
    pub cvr: f64,
    pub ctr: f64,
}

impl AccountTotals {
    pub fn new(
        cost: f64,
        impressions: f64,
        clicks: f64,
        conversions: f64,
        conversion_value: f64,
    ) -> Self {
        Self {
            cost,
            impressions,
            clicks,
            conversions,
            conversion_value,
            cpa: safe_div(cost, conversions),
            roas: safe_div(conversion_value, cost),
            cvr: safe_div(conversions, clicks),
            ctr: safe_div(clicks, impressions),
        }
    }
}

/// Monthly targets snapshot. Every field is optional: an unset target is a
/// first-class state and must never collapse into 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Targets {
    pub budget: Option<f64>,
    pub target_conversions: Option<f64>,
    pub target_cpa: Option<f64>,
    pub target_cvr: Option<f64>,
    pub target_ctr: Option<f64>,
}

impl Targets {
    /// True when no KPI target is usable — all absent, or only zeros.
    pub fn kpi_targets_empty(&self) -> bool {
        [
            self.target_conversions,
            self.target_cpa,
            self.target_cvr,
            self.target_ctr,
        ]
        .iter()
        .all(|t| t.map_or(true, |v| v == 0.0))
    }
}

/// Year-month key for a reporting period, also the target-store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar length of this month.
    pub fn days_in_month(&self) -> u32 {
        let (ny, nm) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        let first_next = NaiveDate::from_ymd_opt(ny, nm, 1).unwrap_or_default();
        first_next.pred_opt().map(|d| d.day()).unwrap_or(30)
    }

    /// The immediately preceding month.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(name: &str, cost: f64, imp: f64, clicks: f64, conv: f64) -> Value {
        json!({
            "date": "2026-08-01",
            "campaign_name": name,
            "media": "search",
            "cost": cost,
            "impressions": imp,
            "clicks": clicks,
            "conversions": conv,
        })
    }

    #[test]
    fn test_coerce_metric_lenient() {
        assert_eq!(coerce_metric(Some(&json!(12.5))), 12.5);
        assert_eq!(coerce_metric(Some(&json!("37"))), 37.0);
        assert_eq!(coerce_metric(Some(&json!("n/a"))), 0.0);
        assert_eq!(coerce_metric(Some(&json!(null))), 0.0);
        assert_eq!(coerce_metric(None), 0.0);
        assert_eq!(coerce_metric(Some(&json!(-4.0))), 0.0);
    }

    #[test]
    fn test_group_by_campaign_aggregates_and_sorts() {
        let set = RowSet::from_values(vec![
            row("B", 100.0, 1000.0, 50.0, 5.0),
            row("A", 200.0, 2000.0, 100.0, 10.0),
            row("B", 300.0, 1000.0, 50.0, 5.0),
        ]);
        let aggs = set.group_by_campaign();
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].name, "A");
        assert_eq!(aggs[1].name, "B");
        assert!((aggs[1].cost - 400.0).abs() < f64::EPSILON);
        assert!((aggs[1].cpa - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_aggregate_guards_zero_denominators() {
        let agg = CampaignAggregate::new("x".into(), 100.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(agg.cpa, 0.0);
        assert_eq!(agg.cvr, 0.0);
        assert_eq!(agg.ctr, 0.0);
        assert_eq!(agg.roas, 0.0);
    }

    #[test]
    fn test_has_column_and_totals() {
        let set = RowSet::from_values(vec![row("A", 10.0, 0.0, 0.0, 0.0)]);
        assert!(set.has_column(COL_CAMPAIGN));
        assert!(!set.has_column("revenue"));
        assert!((set.column_total(COL_COST) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_targets_tri_state() {
        let unset = Targets::default();
        assert!(unset.kpi_targets_empty());

        let zeros = Targets {
            target_conversions: Some(0.0),
            ..Default::default()
        };
        assert!(zeros.kpi_targets_empty());

        let set = Targets {
            target_cpa: Some(900.0),
            ..Default::default()
        };
        assert!(!set.kpi_targets_empty());

        // Unset must serialize as null, not 0.
        let json = serde_json::to_value(&unset).unwrap();
        assert!(json["budget"].is_null());
    }

    #[test]
    fn test_period_key() {
        let key = PeriodKey::new(2026, 8);
        assert_eq!(key.to_string(), "2026-08");
        assert_eq!(key.days_in_month(), 31);
        assert_eq!(PeriodKey::new(2024, 2).days_in_month(), 29);
        assert_eq!(key.previous(), PeriodKey::new(2026, 7));
        assert_eq!(PeriodKey::new(2026, 1).previous(), PeriodKey::new(2025, 12));
    }
}
