use chrono::NaiveDate;

/// Parses the `YYYY-MM-DD` prefix of a date string.
pub fn parse_day(date: &str) -> Option<NaiveDate> {
    let day = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage change from `base` to `value`; `None` when `base` is zero or
/// the result is not finite.
pub fn pct_change(value: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    Some((value - base) / base * 100.0).filter(|pct| pct.is_finite())
}

pub fn money(value: f64) -> String {
    format!("{:.2}", value)
}

/// Rounds half away from zero to one decimal.
pub fn pct_one_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    format!("{:.1}", rounded + 0.0)
}

pub fn pct_whole(value: f64) -> String {
    format!("{}", value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_days() {
        assert_eq!(parse_day("2026-02-01"), NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(parse_day("2026-02-01T00:00:00"), NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(parse_day("yesterday"), None);
        assert_eq!(parse_day("2026-02-30"), None);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn pct_change_guards_zero_base() {
        assert_eq!(pct_change(10.0, 0.0), None);
        let change = pct_change(10.0, 55.0).unwrap();
        assert!((change + 81.818).abs() < 0.01);
    }

    #[test]
    fn pct_change_rejects_non_finite_results() {
        assert_eq!(pct_change(1.0, f64::INFINITY), None);
        assert_eq!(pct_change(f64::MAX, -f64::MAX), None);
        assert_eq!(pct_change(f64::NAN, 10.0), None);
    }

    #[test]
    fn rounding_policy() {
        assert_eq!(money(1234.5), "1234.50");
        assert_eq!(pct_one_decimal(33.333), "33.3");
        assert_eq!(pct_one_decimal(12.25), "12.3");
        assert_eq!(pct_whole(81.818), "82");
        assert_eq!(pct_whole(2.5), "3");
        assert_eq!(pct_whole(1000.0), "1000");
    }
}
