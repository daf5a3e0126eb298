/// Below this many daily points only the sufficiency notice is produced.
pub const MIN_SERIES_POINTS: usize = 7;

/// Length of series the notice recommends for reliable insights.
pub const RECOMMENDED_SERIES_DAYS: usize = 14;

pub const DROP_WINDOW_DAYS: usize = 7;

/// A window averaging below this percentage change versus the period is a drop.
pub const DROP_THRESHOLD_PCT: f64 = -12.0;

/// Month-end lift beyond +/- this percentage counts as a strong difference.
pub const SEASONALITY_THRESHOLD_PCT: f64 = 10.0;

/// First day of month that belongs to the "end of month" group.
pub const MONTH_END_START_DAY: u32 = 24;

pub const MIN_SEASONALITY_GROUP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightConfig {
    pub min_series_points: usize,
    pub recommended_series_days: usize,
    pub drop_window_days: usize,
    pub drop_threshold_pct: f64,
    pub seasonality_threshold_pct: f64,
    pub month_end_start_day: u32,
    pub min_seasonality_group: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_series_points: MIN_SERIES_POINTS,
            recommended_series_days: RECOMMENDED_SERIES_DAYS,
            drop_window_days: DROP_WINDOW_DAYS,
            drop_threshold_pct: DROP_THRESHOLD_PCT,
            seasonality_threshold_pct: SEASONALITY_THRESHOLD_PCT,
            month_end_start_day: MONTH_END_START_DAY,
            min_seasonality_group: MIN_SEASONALITY_GROUP,
        }
    }
}

impl InsightConfig {
    /// Applies CLI overrides on top of the defaults.
    pub fn with_overrides(drop_threshold: Option<f64>, seasonality_threshold: Option<f64>) -> Self {
        let mut config = Self::default();
        if let Some(value) = drop_threshold {
            // accept "12" as well as "-12"
            config.drop_threshold_pct = -value.abs();
        }
        if let Some(value) = seasonality_threshold {
            config.seasonality_threshold_pct = value.abs();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_normalize_sign() {
        let config = InsightConfig::with_overrides(Some(20.0), Some(-5.0));
        assert_eq!(config.drop_threshold_pct, -20.0);
        assert_eq!(config.seasonality_threshold_pct, 5.0);
        assert_eq!(config.drop_window_days, DROP_WINDOW_DAYS);
    }

    #[test]
    fn no_overrides_is_default() {
        assert_eq!(InsightConfig::with_overrides(None, None), InsightConfig::default());
    }
}
