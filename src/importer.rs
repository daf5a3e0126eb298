use anyhow::{bail, Context};
use chrono::NaiveDate;
use tracing::warn;

const DATE_CANDIDATES: [&str; 4] = ["date", "data", "event_date", "dia"];
const VALUE_CANDIDATES: [&str; 5] = ["value", "valor", "amount", "receita", "total"];
const CATEGORY_CANDIDATES: [&str; 5] = ["category", "categoria", "segmento", "canal", "channel"];
const SELLER_CANDIDATES: [&str; 4] = ["seller", "seller_name", "vendedor", "vendedora"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub date: usize,
    pub value: usize,
    pub category: Option<usize>,
    pub seller: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub event_date: NaiveDate,
    pub value: f64,
    pub category: Option<String>,
    pub seller_name: Option<String>,
}

fn pick_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    candidates
        .iter()
        .find_map(|candidate| normalized.iter().position(|h| h == candidate))
}

pub fn detect_columns(headers: &csv::StringRecord) -> anyhow::Result<ColumnMap> {
    let Some(date) = pick_column(headers, &DATE_CANDIDATES) else {
        bail!("date column not found; accepted names: {:?}", DATE_CANDIDATES);
    };
    let Some(value) = pick_column(headers, &VALUE_CANDIDATES) else {
        bail!("value column not found; accepted names: {:?}", VALUE_CANDIDATES);
    };

    Ok(ColumnMap {
        date,
        value,
        category: pick_column(headers, &CATEGORY_CANDIDATES),
        seller: pick_column(headers, &SELLER_CANDIDATES),
    })
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn optional_text(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Reads sales rows, skipping rows whose date or value cannot be parsed.
pub fn parse_sales_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> anyhow::Result<Vec<SalesRow>> {
    let headers = reader.headers().context("failed to read CSV header")?.clone();
    let columns = detect_columns(&headers)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (index, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("malformed CSV row {}", index + 1))?;
        let event_date = record.get(columns.date).and_then(parse_date);
        let value = record.get(columns.value).and_then(parse_value);

        let (Some(event_date), Some(value)) = (event_date, value) else {
            skipped += 1;
            continue;
        };

        rows.push(SalesRow {
            event_date,
            value,
            category: optional_text(&record, columns.category),
            seller_name: optional_text(&record, columns.seller),
        });
    }

    if skipped > 0 {
        warn!(skipped, "skipped rows with invalid date or value");
    }
    if rows.is_empty() {
        bail!("no valid rows after parsing (invalid date/value)");
    }

    Ok(rows)
}
