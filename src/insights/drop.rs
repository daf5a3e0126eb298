use crate::insights::stats::{mean, money, pct_change, pct_whole};
use crate::insights::thresholds::InsightConfig;
use crate::models::{DailyTotal, Insight, Severity};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorstWindow {
    pub start: usize,
    pub sum: f64,
}

/// Finds the window with the smallest sum; the earliest one wins ties.
pub fn worst_window(values: &[f64], size: usize) -> Option<WorstWindow> {
    if size == 0 || values.len() < size {
        return None;
    }

    let mut worst: Option<WorstWindow> = None;
    for (start, window) in values.windows(size).enumerate() {
        let sum: f64 = window.iter().sum();
        if worst.map_or(true, |w| sum < w.sum) {
            worst = Some(WorstWindow { start, sum });
        }
    }
    worst
}

pub fn drop_insight(series: &[DailyTotal], config: &InsightConfig) -> Option<Insight> {
    let size = config.drop_window_days;
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let window = worst_window(&values, size)?;

    let window_avg = window.sum / size as f64;
    let overall_avg = mean(&values);
    let drop = pct_change(window_avg, overall_avg)?;
    let flagged = drop < config.drop_threshold_pct;
    if !flagged {
        return None;
    }

    let start = &series[window.start].date;
    let end = &series[window.start + size - 1].date;
    Some(Insight {
        icon: "📉",
        title: "Significant drop detected".to_string(),
        body: format!(
            "Between {} and {}, the average was {}, about {}% below the period average ({}).",
            start,
            end,
            money(window_avg),
            pct_whole(drop.abs()),
            money(overall_avg)
        ),
        severity: Severity::Warn,
    })
}
