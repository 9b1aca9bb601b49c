//! Campaign performance reporting — budget pacing, KPI achievement, cohort
//! comparison, and prioritized action recommendations, assembled into one
//! deterministic report per period.

pub mod actions;
pub mod comparative;
pub mod orchestrator;
pub mod pacing;
pub mod prompt;
pub mod store;

pub use actions::{
    AccountMetrics, ActionItem, ActionPriority, ActionRecommendations, ActionRecommender,
};
pub use comparative::{ComparativeAnalysis, ComparativeAnalyzer, MetricComparison};
pub use orchestrator::{MetricsSource, PerformanceReport, ReportOrchestrator, ReportRequest};
pub use pacing::{KpiAchievement, PacingAnalyzer, PacingResult, PacingStatus};
pub use store::{InMemoryTargetStore, TargetStore};
