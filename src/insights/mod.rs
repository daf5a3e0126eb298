// Insight engine: derives a short, ordered list of observations from a
// daily sales series and a seller ranking snapshot.

pub mod champion;
pub mod drop;
pub mod month_end;
pub mod normalize;
pub mod stats;
pub mod sufficiency;
pub mod thresholds;
pub mod weekday;

use tracing::debug;

use crate::models::{Insight, SellerRankingRow, SeriesPoint};

use normalize::rank_sellers;
use sufficiency::{check_sufficiency, Sufficiency};

pub use normalize::normalize_series;
pub use thresholds::InsightConfig;

/// Runs every analyzer in presentation order: champion, sufficiency notice,
/// weekday peaks, worst window, month-end seasonality.
pub fn build_insights_with(
    series: &[SeriesPoint],
    sellers: &[SellerRankingRow],
    config: &InsightConfig,
) -> Vec<Insight> {
    let series = normalize_series(series);
    let sellers = rank_sellers(sellers);
    let mut insights = Vec::new();

    insights.extend(champion::champion_insight(&sellers));

    if let Sufficiency::Insufficient(notice) = check_sufficiency(series.len(), config) {
        debug!(points = series.len(), "series too short, skipping series analyzers");
        insights.extend(notice);
        return insights;
    }

    let stages = [
        ("weekday", weekday::weekday_insight(&series)),
        ("drop", drop::drop_insight(&series, config)),
        ("month_end", month_end::month_end_insight(&series, config)),
    ];
    for (stage, insight) in stages {
        debug!(stage, emitted = insight.is_some(), "insight stage finished");
        insights.extend(insight);
    }

    insights
}
