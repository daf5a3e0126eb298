use crate::insights::thresholds::InsightConfig;
use crate::models::{Insight, Severity};

#[derive(Debug, Clone, PartialEq)]
pub enum Sufficiency {
    /// Enough points for the series analyzers to run.
    Sufficient,
    /// Analysis stops here, optionally with a notice for the reader.
    Insufficient(Option<Insight>),
}

pub fn check_sufficiency(points: usize, config: &InsightConfig) -> Sufficiency {
    if points >= config.min_series_points {
        return Sufficiency::Sufficient;
    }
    if points == 0 {
        return Sufficiency::Insufficient(None);
    }

    Sufficiency::Insufficient(Some(Insight {
        icon: "ℹ️",
        title: "Not much data in the period".to_string(),
        body: format!(
            "There are {} day(s) in the period. Some insights (drops, weekdays, seasonality) become reliable with {}+ days.",
            points, config.recommended_series_days
        ),
        severity: Severity::Info,
    }))
}
