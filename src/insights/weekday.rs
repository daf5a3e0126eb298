use chrono::{Datelike, Weekday};

use crate::insights::stats::{money, parse_day, pct_change, pct_whole};
use crate::models::{DailyTotal, Insight, Severity};

/// Labels indexed by days from Sunday.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeekdayBucket {
    pub total: f64,
    pub count: usize,
}

impl WeekdayBucket {
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

pub fn weekday_index(day: Weekday) -> usize {
    day.num_days_from_sunday() as usize
}

/// Points with an unparsable date are left out of every bucket.
pub fn bucket_by_weekday(series: &[DailyTotal]) -> [WeekdayBucket; 7] {
    let mut buckets = [WeekdayBucket::default(); 7];
    for point in series {
        if let Some(day) = parse_day(&point.date) {
            let bucket = &mut buckets[weekday_index(day.weekday())];
            bucket.total += point.value;
            bucket.count += 1;
        }
    }
    buckets
}

/// Returns `(best, worst)` indices; the first bucket wins ties on both ends.
pub fn best_and_worst(buckets: &[WeekdayBucket; 7]) -> (usize, usize) {
    let mut best = 0;
    let mut worst = 0;
    for (index, bucket) in buckets.iter().enumerate().skip(1) {
        if bucket.avg() > buckets[best].avg() {
            best = index;
        }
        if bucket.avg() < buckets[worst].avg() {
            worst = index;
        }
    }
    (best, worst)
}

pub fn weekday_insight(series: &[DailyTotal]) -> Option<Insight> {
    let buckets = bucket_by_weekday(series);
    let (best, worst) = best_and_worst(&buckets);
    if buckets[best].count == 0 || buckets[worst].count == 0 {
        return None;
    }

    let best_avg = buckets[best].avg();
    let worst_avg = buckets[worst].avg();
    let mut body = format!(
        "The best weekday is {}, averaging {}. The weakest is {}, averaging {}.",
        WEEKDAY_NAMES[best],
        money(best_avg),
        WEEKDAY_NAMES[worst],
        money(worst_avg)
    );
    if let Some(diff) = pct_change(best_avg, worst_avg) {
        body.push_str(&format!(
            " The average gap between them is about {}%.",
            pct_whole(diff)
        ));
    }

    Some(Insight {
        icon: "📊",
        title: "Weekly peaks".to_string(),
        body,
        severity: Severity::Info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, value: f64) -> DailyTotal {
        DailyTotal {
            date: date.to_string(),
            value,
        }
    }

    // 2026-02-01 is a Sunday.
    fn two_weeks(monday: [f64; 2], others: f64) -> Vec<DailyTotal> {
        (1..=14)
            .map(|d| {
                let date = format!("2026-02-{:02}", d);
                let value = match d {
                    2 => monday[0],
                    9 => monday[1],
                    _ => others,
                };
                day(&date, value)
            })
            .collect()
    }

    #[test]
    fn buckets_follow_calendar_weekday() {
        let buckets = bucket_by_weekday(&two_weeks([100.0, 120.0], 10.0));
        assert_eq!(buckets[1].count, 2);
        assert_eq!(buckets[1].avg(), 110.0);
        assert!(buckets.iter().all(|b| b.count == 2));
    }

    #[test]
    fn monday_beats_first_weak_day() {
        let insight = weekday_insight(&two_weeks([100.0, 120.0], 10.0)).unwrap();
        assert_eq!(insight.severity, Severity::Info);
        assert_eq!(
            insight.body,
            "The best weekday is Monday, averaging 110.00. The weakest is Sunday, averaging 10.00. The average gap between them is about 1000%."
        );
    }

    #[test]
    fn ties_keep_lowest_index() {
        let buckets = bucket_by_weekday(&two_weeks([10.0, 10.0], 10.0));
        assert_eq!(best_and_worst(&buckets), (0, 0));
    }

    #[test]
    fn zero_worst_average_omits_gap() {
        let insight = weekday_insight(&two_weeks([100.0, 120.0], 0.0)).unwrap();
        assert!(!insight.body.contains('%'));
    }

    #[test]
    fn missing_weekday_suppresses_insight() {
        // Sunday through Friday only; Saturday's empty bucket averages 0.
        let series: Vec<DailyTotal> = (1..=6)
            .map(|d| day(&format!("2026-02-{:02}", d), 50.0 + d as f64))
            .collect();
        assert!(weekday_insight(&series).is_none());
    }

    #[test]
    fn unparsable_dates_are_skipped() {
        let mut series = two_weeks([100.0, 120.0], 10.0);
        series.push(day("not-a-date", 1_000_000.0));
        let buckets = bucket_by_weekday(&series);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 14);
    }
}
