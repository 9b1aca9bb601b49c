//! Target persistence seam — an injected key-value store keyed by period,
//! plus an in-memory implementation for tests and embedding.

use dashmap::DashMap;
use insight_core::types::{PeriodKey, Targets};
use insight_core::InsightResult;

/// Key-value access to monthly targets. Injected so report runs stay
/// independently testable; the backing format is the implementor's concern.
pub trait TargetStore {
    fn get(&self, period: &PeriodKey) -> InsightResult<Option<Targets>>;
    fn set(&self, period: PeriodKey, targets: Targets) -> InsightResult<()>;
}

/// In-memory store backed by `DashMap`.
#[derive(Default)]
pub struct InMemoryTargetStore {
    entries: DashMap<String, Targets>,
}

impl InMemoryTargetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TargetStore for InMemoryTargetStore {
    fn get(&self, period: &PeriodKey) -> InsightResult<Option<Targets>> {
        Ok(self.entries.get(&period.to_string()).map(|t| t.clone()))
    }

    fn set(&self, period: PeriodKey, targets: Targets) -> InsightResult<()> {
        self.entries.insert(period.to_string(), targets);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip_by_period() {
        let store = InMemoryTargetStore::new();
        let period = PeriodKey::new(2026, 8);
        assert!(store.get(&period).unwrap().is_none());

        store
            .set(
                period,
                Targets {
                    budget: Some(500_000.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let loaded = store.get(&period).unwrap().unwrap();
        assert_eq!(loaded.budget, Some(500_000.0));
        assert!(loaded.target_cpa.is_none());
        assert!(store.get(&PeriodKey::new(2026, 7)).unwrap().is_none());
    }
}
