use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::{RawValue, SellerRankingRow, SeriesPoint};

/// Dashboard payload as served by the sales backend.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardPayload {
    #[serde(default)]
    pub series: Vec<SeriesPoint>,
    #[serde(default)]
    pub seller_ranking: Vec<SellerRankingRow>,
}

pub fn load_dashboard_json(path: &Path) -> anyhow::Result<DashboardPayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_dashboard_json(&content).with_context(|| format!("invalid dashboard JSON in {}", path.display()))
}

pub fn parse_dashboard_json(content: &str) -> anyhow::Result<DashboardPayload> {
    Ok(serde_json::from_str(content)?)
}

pub fn load_series_csv(path: &Path) -> anyhow::Result<Vec<SeriesPoint>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_series_csv(reader).with_context(|| format!("invalid series CSV in {}", path.display()))
}

pub fn read_series_csv<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> anyhow::Result<Vec<SeriesPoint>> {
    #[derive(Deserialize)]
    struct CsvRow {
        date: String,
        value: Option<String>,
    }

    let mut points = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("row {}", index + 1))?;
        points.push(SeriesPoint {
            date: row.date.trim().to_string(),
            value: row.value.map(RawValue::Text),
        });
    }
    Ok(points)
}

pub fn load_sellers_csv(path: &Path) -> anyhow::Result<Vec<SellerRankingRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut sellers = Vec::new();
    for (index, result) in reader.deserialize::<SellerRankingRow>().enumerate() {
        let row = result
            .with_context(|| format!("invalid seller row {} in {}", index + 1, path.display()))?;
        sellers.push(row);
    }
    Ok(sellers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dashboard_payload() {
        let payload = parse_dashboard_json(
            r#"{
                "kpis": {"total_value": 30.0},
                "series": [{"date": "2026-02-02", "value": "20"}, {"date": "2026-02-01", "value": 10}],
                "seller_ranking": [{"seller_id": "a1", "seller_name": "Ana", "total_value": 30.0, "avg_daily_value": 15.0, "days": 2}]
            }"#,
        )
        .unwrap();

        assert_eq!(payload.series.len(), 2);
        assert_eq!(payload.series[1].value, Some(RawValue::Number(10.0)));
        assert_eq!(payload.seller_ranking[0].days, 2);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let payload = parse_dashboard_json("{}").unwrap();
        assert!(payload.series.is_empty());
        assert!(payload.seller_ranking.is_empty());
    }

    #[test]
    fn series_csv_keeps_raw_text() {
        let data = "date,value\n2026-02-01,12.5\n2026-02-02,oops\n2026-02-03,\n";
        let reader = csv::Reader::from_reader(data.as_bytes());
        let points = read_series_csv(reader).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value, Some(RawValue::Text("12.5".to_string())));
        assert_eq!(points[1].value, Some(RawValue::Text("oops".to_string())));
        assert_eq!(points[2].value, None);
    }
}
