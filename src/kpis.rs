use crate::models::{DailyTotal, DayValue, Kpis};

pub fn compute_kpis(series: &[DailyTotal]) -> Kpis {
    let total_value: f64 = series.iter().map(|p| p.value).sum();
    let days = series.len();
    let avg_daily_value = if days == 0 {
        0.0
    } else {
        total_value / days as f64
    };

    let mut best: Option<&DailyTotal> = None;
    let mut worst: Option<&DailyTotal> = None;
    for point in series {
        if best.map_or(true, |b| point.value > b.value) {
            best = Some(point);
        }
        if worst.map_or(true, |w| point.value < w.value) {
            worst = Some(point);
        }
    }

    let to_day = |point: &DailyTotal| DayValue {
        date: point.date.clone(),
        value: point.value,
    };

    Kpis {
        total_value,
        avg_daily_value,
        days,
        best_day: best.map(to_day),
        worst_day: worst.map(to_day),
    }
}
