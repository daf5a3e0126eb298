use crate::models::{DailyTotal, RawValue, SellerRankingRow, SeriesPoint};

/// Coerces a raw value to a finite number, falling back to zero.
pub fn numeric_or_zero(value: Option<&RawValue>) -> f64 {
    let number = match value {
        Some(RawValue::Number(n)) => *n,
        Some(RawValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(RawValue::Flag(flag)) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        None => 0.0,
    };

    finite_or_zero(number)
}

pub fn normalize_series(series: &[SeriesPoint]) -> Vec<DailyTotal> {
    let mut points: Vec<DailyTotal> = series
        .iter()
        .map(|point| DailyTotal {
            date: point.date.clone(),
            value: numeric_or_zero(point.value.as_ref()),
        })
        .collect();

    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Copies sellers best first; non-finite totals count as zero.
pub fn rank_sellers(sellers: &[SellerRankingRow]) -> Vec<SellerRankingRow> {
    let mut ranked: Vec<SellerRankingRow> = sellers
        .iter()
        .map(|seller| SellerRankingRow {
            total_value: finite_or_zero(seller.total_value),
            avg_daily_value: finite_or_zero(seller.avg_daily_value),
            ..seller.clone()
        })
        .collect();
    ranked.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seller(name: &str, total: f64) -> SellerRankingRow {
        SellerRankingRow {
            seller_id: name.to_lowercase(),
            seller_name: name.to_string(),
            total_value: total,
            avg_daily_value: 0.0,
            days: 0,
        }
    }

    #[test]
    fn coerces_bad_values_to_zero() {
        assert_eq!(numeric_or_zero(None), 0.0);
        assert_eq!(numeric_or_zero(Some(&RawValue::Text("abc".into()))), 0.0);
        assert_eq!(numeric_or_zero(Some(&RawValue::Text(" 42.5 ".into()))), 42.5);
        assert_eq!(numeric_or_zero(Some(&RawValue::Text("NaN".into()))), 0.0);
        assert_eq!(numeric_or_zero(Some(&RawValue::Number(f64::INFINITY))), 0.0);
        assert_eq!(numeric_or_zero(Some(&RawValue::Flag(true))), 1.0);
    }

    #[test]
    fn series_is_sorted_and_idempotent() {
        let raw = vec![
            SeriesPoint::new("2026-02-03", 3.0),
            SeriesPoint::new("2026-01-31", 1.0),
            SeriesPoint::new("2026-02-01", 2.0),
        ];

        let once = normalize_series(&raw);
        let dates: Vec<&str> = once.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-01-31", "2026-02-01", "2026-02-03"]);

        let again: Vec<SeriesPoint> = once
            .iter()
            .map(|p| SeriesPoint::new(p.date.clone(), p.value))
            .collect();
        assert_eq!(normalize_series(&again), once);
    }

    #[test]
    fn caller_data_is_left_untouched() {
        let raw = vec![
            SeriesPoint::new("2026-02-02", 2.0),
            SeriesPoint::new("2026-02-01", 1.0),
        ];
        let _ = normalize_series(&raw);
        assert_eq!(raw[0].date, "2026-02-02");
    }

    #[test]
    fn sellers_sort_descending_and_stable() {
        let ranked = rank_sellers(&[
            seller("Ana", 50.0),
            seller("Bruno", 80.0),
            seller("Carla", 80.0),
        ]);
        let names: Vec<&str> = ranked.iter().map(|s| s.seller_name.as_str()).collect();
        assert_eq!(names, vec!["Bruno", "Carla", "Ana"]);
    }

    #[test]
    fn non_finite_totals_rank_as_zero() {
        let sellers: Vec<SellerRankingRow> = (0..25)
            .map(|i| {
                let total = if i % 3 == 0 { f64::NAN } else { i as f64 * 10.0 };
                seller(&format!("S{}", i), total)
            })
            .collect();

        let ranked = rank_sellers(&sellers);
        assert_eq!(ranked.len(), 25);
        assert_eq!(ranked[0].seller_name, "S23");
        assert!(ranked.iter().all(|s| s.total_value.is_finite()));
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].total_value >= pair[1].total_value));
        // NaN rows become zero and keep their original order at the bottom
        let tail: Vec<&str> = ranked[16..].iter().map(|s| s.seller_name.as_str()).collect();
        assert_eq!(tail, vec!["S0", "S3", "S6", "S9", "S12", "S15", "S18", "S21", "S24"]);
    }

    #[test]
    fn infinite_total_does_not_lead() {
        let ranked = rank_sellers(&[seller("Ana", f64::INFINITY), seller("Bruno", 5.0)]);
        assert_eq!(ranked[0].seller_name, "Bruno");
        assert_eq!(ranked[1].total_value, 0.0);
    }
}
