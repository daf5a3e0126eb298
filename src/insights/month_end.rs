use chrono::Datelike;

use crate::insights::stats::{mean, money, parse_day, pct_change, pct_whole};
use crate::insights::thresholds::InsightConfig;
use crate::models::{DailyTotal, Insight, Severity};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthSplit {
    pub end_of_month: Vec<f64>,
    pub rest: Vec<f64>,
}

/// Splits values by day of month; points with an unparsable date are dropped.
pub fn split_month_end(series: &[DailyTotal], start_day: u32) -> MonthSplit {
    let mut split = MonthSplit::default();
    for point in series {
        let Some(day) = parse_day(&point.date) else {
            continue;
        };
        if day.day() >= start_day {
            split.end_of_month.push(point.value);
        } else {
            split.rest.push(point.value);
        }
    }
    split
}

pub fn month_end_insight(series: &[DailyTotal], config: &InsightConfig) -> Option<Insight> {
    let split = split_month_end(series, config.month_end_start_day);
    if split.end_of_month.len() < config.min_seasonality_group
        || split.rest.len() < config.min_seasonality_group
    {
        return None;
    }

    let avg_end = mean(&split.end_of_month);
    let avg_rest = mean(&split.rest);
    let lift = pct_change(avg_end, avg_rest)?;
    let threshold = config.seasonality_threshold_pct;
    let start_day = config.month_end_start_day;

    let insight = if lift > threshold {
        Insight {
            icon: "📈",
            title: "Seasonality: stronger end of month".to_string(),
            body: format!(
                "From day {} onward the average is {} vs {} for the rest of the month, a lift of about {}%.",
                start_day,
                money(avg_end),
                money(avg_rest),
                pct_whole(lift)
            ),
            severity: Severity::Good,
        }
    } else if lift < -threshold {
        Insight {
            icon: "📉",
            title: "Seasonality: weaker end of month".to_string(),
            body: format!(
                "From day {} onward the average is {} vs {} for the rest of the month, a drop of about {}%.",
                start_day,
                money(avg_end),
                money(avg_rest),
                pct_whole(lift.abs())
            ),
            severity: Severity::Warn,
        }
    } else {
        Insight {
            icon: "📌",
            title: "Seasonality".to_string(),
            body: format!(
                "From day {} onward the average is {} vs {} for the rest of the month, with no strong difference.",
                start_day,
                money(avg_end),
                money(avg_rest)
            ),
            severity: Severity::Info,
        }
    };

    Some(insight)
}

#[cfg(test)]
mod tests {
    use super::*;

    // January 15-23 as the rest group, January 24-31 as month end.
    fn january(rest: f64, end: f64) -> Vec<DailyTotal> {
        (15..=31)
            .map(|d| DailyTotal {
                date: format!("2026-01-{:02}", d),
                value: if d >= 24 { end } else { rest },
            })
            .collect()
    }

    #[test]
    fn split_uses_day_24_cutoff() {
        let split = split_month_end(&january(1.0, 2.0), 24);
        assert_eq!(split.rest.len(), 9);
        assert_eq!(split.end_of_month.len(), 8);
    }

    #[test]
    fn stronger_month_end_is_good() {
        let insight = month_end_insight(&january(100.0, 200.0), &InsightConfig::default()).unwrap();
        assert_eq!(insight.severity, Severity::Good);
        assert_eq!(
            insight.body,
            "From day 24 onward the average is 200.00 vs 100.00 for the rest of the month, a lift of about 100%."
        );
    }

    #[test]
    fn weaker_month_end_is_warn() {
        let insight = month_end_insight(&january(200.0, 100.0), &InsightConfig::default()).unwrap();
        assert_eq!(insight.severity, Severity::Warn);
        assert!(insight.body.contains("a drop of about 50%"));
    }

    #[test]
    fn small_lift_is_neutral() {
        let insight = month_end_insight(&january(100.0, 105.0), &InsightConfig::default()).unwrap();
        assert_eq!(insight.severity, Severity::Info);
        assert!(insight.body.contains("105.00"));
        assert!(insight.body.contains("100.00"));
    }

    #[test]
    fn small_groups_are_skipped() {
        let series: Vec<DailyTotal> = january(100.0, 200.0).into_iter().skip(5).collect();
        // only 4 rest days remain
        assert!(month_end_insight(&series, &InsightConfig::default()).is_none());
    }

    #[test]
    fn zero_rest_average_is_skipped() {
        assert!(month_end_insight(&january(0.0, 200.0), &InsightConfig::default()).is_none());
    }

    // January 19-23 as the rest group, January 24-28 as month end.
    fn smallest_groups(rest: f64, end: f64) -> Vec<DailyTotal> {
        (19..=28)
            .map(|d| DailyTotal {
                date: format!("2026-01-{:02}", d),
                value: if d >= 24 { end } else { rest },
            })
            .collect()
    }

    #[test]
    fn five_points_per_group_is_enough() {
        let series = smallest_groups(100.0, 200.0);
        let split = split_month_end(&series, 24);
        assert_eq!(split.rest.len(), 5);
        assert_eq!(split.end_of_month.len(), 5);

        let insight = month_end_insight(&series, &InsightConfig::default()).unwrap();
        assert_eq!(insight.severity, Severity::Good);
    }

    #[test]
    fn day_23_is_rest_and_day_24_is_month_end() {
        let series = vec![
            DailyTotal {
                date: "2026-01-23".to_string(),
                value: 1.0,
            },
            DailyTotal {
                date: "2026-01-24".to_string(),
                value: 2.0,
            },
        ];
        let split = split_month_end(&series, 24);
        assert_eq!(split.rest, vec![1.0]);
        assert_eq!(split.end_of_month, vec![2.0]);
    }

    #[test]
    fn lift_of_exactly_ten_percent_is_neutral() {
        let config = InsightConfig::default();

        let up = month_end_insight(&smallest_groups(100.0, 110.0), &config).unwrap();
        assert_eq!(up.severity, Severity::Info);

        let down = month_end_insight(&smallest_groups(100.0, 90.0), &config).unwrap();
        assert_eq!(down.severity, Severity::Info);
    }

    #[test]
    fn neutral_body_mentions_configured_start_day() {
        let mut config = InsightConfig::default();
        config.month_end_start_day = 20;
        let insight = month_end_insight(&january(100.0, 100.0), &config).unwrap();
        assert_eq!(
            insight.body,
            "From day 20 onward the average is 100.00 vs 100.00 for the rest of the month, with no strong difference."
        );
    }

    #[test]
    fn overflowing_averages_are_skipped() {
        assert!(month_end_insight(&january(f64::MAX, f64::MAX), &InsightConfig::default()).is_none());
    }
}
