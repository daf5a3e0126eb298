use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw sales value as it arrives from a payload or CSV cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

/// One calendar day of sales, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    #[serde(default)]
    pub value: Option<RawValue>,
}

impl SeriesPoint {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value: Some(RawValue::Number(value)),
        }
    }
}

/// A series point after value coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerRankingRow {
    pub seller_id: String,
    pub seller_name: String,
    pub total_value: f64,
    #[serde(default)]
    pub avg_daily_value: f64,
    #[serde(default)]
    pub days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Good,
    Warn,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Good => "good",
            Severity::Warn => "warn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub icon: &'static str,
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayValue {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_value: f64,
    pub avg_daily_value: f64,
    pub days: usize,
    pub best_day: Option<DayValue>,
    pub worst_day: Option<DayValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct DatasetRecord {
    pub id: Uuid,
    pub name: String,
    pub source_filename: Option<String>,
    pub status: String,
    pub row_count: i32,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct SellerRecord {
    pub id: Uuid,
    pub name: String,
    pub region: Option<String>,
    pub is_active: bool,
}

/// Partial seller update; `region: Some(None)` clears the region.
#[derive(Debug, Clone, Default)]
pub struct SellerChanges {
    pub name: Option<String>,
    pub region: Option<Option<String>>,
    pub is_active: Option<bool>,
}

pub fn clean_seller_name(raw: &str) -> anyhow::Result<String> {
    let name = raw.trim();
    anyhow::ensure!(!name.is_empty(), "seller name must not be empty");
    anyhow::ensure!(name.chars().count() <= 120, "seller name is longer than 120 characters");
    Ok(name.to_string())
}

pub fn clean_region(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|region| !region.is_empty())
        .map(str::to_string)
}

pub fn clean_dataset_status(raw: &str) -> anyhow::Result<String> {
    let status = raw.trim().to_lowercase();
    anyhow::ensure!(!status.is_empty(), "dataset status must not be empty");
    anyhow::ensure!(status.len() <= 32, "dataset status is longer than 32 characters");
    Ok(status)
}

/// Scope shared by every dashboard query.
#[derive(Debug, Clone)]
pub struct DashboardFilter {
    pub dataset_id: Uuid,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub seller_id: Option<Uuid>,
}

impl DashboardFilter {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            anyhow::ensure!(start <= end, "start date must not be after end date");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(start: Option<NaiveDate>, end: Option<NaiveDate>) -> DashboardFilter {
        DashboardFilter {
            dataset_id: Uuid::new_v4(),
            start,
            end,
            seller_id: None,
        }
    }

    #[test]
    fn raw_values_accept_numbers_text_and_null() {
        let points: Vec<SeriesPoint> = serde_json::from_str(
            r#"[{"date":"2026-02-01","value":12.5},
                {"date":"2026-02-02","value":"7"},
                {"date":"2026-02-03","value":null},
                {"date":"2026-02-04"}]"#,
        )
        .unwrap();

        assert_eq!(points[0].value, Some(RawValue::Number(12.5)));
        assert_eq!(points[1].value, Some(RawValue::Text("7".to_string())));
        assert_eq!(points[2].value, None);
        assert_eq!(points[3].value, None);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        assert_eq!(Severity::Good.as_str(), "good");
    }

    #[test]
    fn seller_names_are_trimmed_and_required() {
        assert_eq!(clean_seller_name("  Ana Souza ").unwrap(), "Ana Souza");
        assert!(clean_seller_name("   ").is_err());
        assert!(clean_seller_name(&"x".repeat(121)).is_err());
    }

    #[test]
    fn blank_region_is_none() {
        assert_eq!(clean_region(Some(" South ")), Some("South".to_string()));
        assert_eq!(clean_region(Some("  ")), None);
        assert_eq!(clean_region(None), None);
    }

    #[test]
    fn dataset_status_is_normalized() {
        assert_eq!(clean_dataset_status(" Ready ").unwrap(), "ready");
        assert!(clean_dataset_status("").is_err());
    }

    #[test]
    fn filter_rejects_inverted_range() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 10);
        let end = NaiveDate::from_ymd_opt(2026, 2, 1);
        assert!(filter(start, end).validate().is_err());
        assert!(filter(end, start).validate().is_ok());
        assert!(filter(None, end).validate().is_ok());
    }
}
