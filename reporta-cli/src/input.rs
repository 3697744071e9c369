//! FILENAME: reporta-cli/src/input.rs
//! Input loading - report definitions and record files.
//!
//! Definitions are JSON documents deserialized straight into `Report`.
//! Records come from a JSON array of flat objects or a CSV file with a
//! header row; CSV fields and JSON strings are sniffed into the richest
//! value type they parse as (number, boolean, datetime, then text).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use band_engine::Report;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use model::{Record, Value};

/// Loads a report definition from a JSON file.
pub fn load_report(path: &Path) -> Result<Report> {
    let file = File::open(path).with_context(|| format!("cannot open report {:?}", path))?;
    let report = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse report definition {:?}", path))?;
    Ok(report)
}

/// Loads records from a JSON or CSV file, picked by extension.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "json" => load_json_records(path),
        "csv" => load_csv_records(path),
        other => bail!("unsupported record format {:?} (expected .json or .csv)", other),
    }
}

fn load_json_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).with_context(|| format!("cannot open records {:?}", path))?;
    let rows: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse records {:?} (expected an array of objects)", path))?;

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let mut record = Record::new();
        for (name, value) in row {
            let value = json_value(value)
                .with_context(|| format!("record {} attribute {:?}", index, name))?;
            record.set(name.clone(), value);
        }
        records.push(record);
    }
    Ok(records)
}

fn load_csv_records(path: &Path) -> Result<Vec<Record>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("cannot open records {:?}", path))?;
    let headers = reader
        .headers()
        .with_context(|| format!("cannot read CSV header {:?}", path))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("cannot read CSV row in {:?}", path))?;
        let mut record = Record::new();
        for (name, field) in headers.iter().zip(row.iter()) {
            record.set(name, sniff_field(field));
        }
        records.push(record);
    }
    Ok(records)
}

fn json_value(value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Empty),
        serde_json::Value::Bool(flag) => Ok(Value::Boolean(*flag)),
        serde_json::Value::Number(number) => {
            let number = number.as_f64().context("number does not fit in f64")?;
            Ok(Value::Number(number))
        }
        serde_json::Value::String(text) => Ok(promote_text(text)),
        _ => bail!("record attributes must be scalar (no nested arrays or objects)"),
    }
}

/// Promotes a string to a datetime when it parses as one. RFC 3339 stamps
/// carry an offset and normalize to UTC; bare stamps are taken verbatim.
fn promote_text(text: &str) -> Value {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Value::DateTime(datetime.naive_utc());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, pattern) {
            return Value::DateTime(datetime);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Value::DateTime(date.and_time(NaiveTime::MIN));
    }
    Value::Text(text.to_string())
}

/// Sniffs a CSV field into the richest value type it parses as.
fn sniff_field(field: &str) -> Value {
    if field.is_empty() {
        return Value::Empty;
    }
    if let Ok(number) = field.parse::<f64>() {
        return Value::Number(number);
    }
    match field {
        "true" | "True" | "TRUE" => return Value::Boolean(true),
        "false" | "False" | "FALSE" => return Value::Boolean(false),
        _ => {}
    }
    promote_text(field)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_json_records_keep_scalar_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "records.json",
            r#"[{"name": "Chair", "price": 49.5, "in_stock": true, "note": null}]"#,
        );

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("name"), Value::Text("Chair".into()));
        assert_eq!(records[0].value("price"), Value::Number(49.5));
        assert_eq!(records[0].value("in_stock"), Value::Boolean(true));
        assert_eq!(records[0].value("note"), Value::Empty);
    }

    #[test]
    fn test_json_strings_promote_to_datetimes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "records.json",
            r#"[{"sold_at": "2024-01-15T09:30:00", "day": "2024-01-15"}]"#,
        );

        let records = load_records(&path).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(records[0].value("sold_at"), Value::DateTime(expected));
        assert_eq!(
            records[0].value("day"),
            Value::DateTime(expected.date().and_time(NaiveTime::MIN))
        );
    }

    #[test]
    fn test_rfc3339_offset_strings_normalize_to_utc() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "records.json",
            r#"[{"sold_at": "2024-01-15T09:30:00Z", "shipped_at": "2024-01-15T09:30:00+02:00"}]"#,
        );

        let records = load_records(&path).unwrap();
        let at = |hour| {
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(hour, 30, 0)
                .unwrap()
        };
        assert_eq!(records[0].value("sold_at"), Value::DateTime(at(9)));
        assert_eq!(records[0].value("shipped_at"), Value::DateTime(at(7)));
    }

    #[test]
    fn test_nested_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "records.json", r#"[{"name": {"nested": 1}}]"#);
        let error = load_records(&path).unwrap_err();
        assert!(error.to_string().contains("attribute"));
    }

    #[test]
    fn test_csv_fields_are_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "records.csv",
            "name,price,in_stock,added\nChair,49.5,true,2024-01-15\nDesk,120,false,\n",
        );

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value("price"), Value::Number(49.5));
        assert_eq!(records[0].value("in_stock"), Value::Boolean(true));
        assert!(matches!(records[0].value("added"), Value::DateTime(_)));
        assert_eq!(records[1].value("added"), Value::Empty);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "records.toml", "name = 1");
        assert!(load_records(&path).is_err());
    }

    #[test]
    fn test_report_definition_round_trips_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "report.json",
            r#"{
                "title": "Listing",
                "band_detail": {
                    "height": 14.0,
                    "elements": [
                        {"Value": {"left": 0.0, "top": 0.0, "attribute_name": "name"}}
                    ]
                }
            }"#,
        );

        let report = load_report(&path).unwrap();
        assert_eq!(report.title, "Listing");
        let detail = report.band_detail.as_ref().unwrap();
        assert_eq!(detail.height, 14.0);
        assert_eq!(detail.elements.len(), 1);
    }
}
