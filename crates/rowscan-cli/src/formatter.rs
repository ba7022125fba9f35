//! Output formatting for decoded rows.
//!
//! Supports table, JSON, CSV, and raw output formats. Every value is read
//! through the typed accessor matching its column's declared type.

use std::str::FromStr;

use anyhow::bail;
use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::{json, Value as JsonValue};

use rowscan_core::{DataRow, Metadata, RowError, RowResult, TypeTag};

/// Text shown for SQL NULL in text formats.
const NULL_TEXT: &str = "NULL";

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output.
    Table,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
    /// Raw output (values separated by tabs).
    Raw,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "raw" => Ok(OutputFormat::Raw),
            other => bail!("unknown output format {:?}", other),
        }
    }
}

/// Formats decoded rows according to the specified format.
pub fn format_rows(metadata: &Metadata, rows: &[DataRow], format: OutputFormat) -> RowResult<String> {
    match format {
        OutputFormat::Table => format_table(metadata, rows),
        OutputFormat::Json => format_json(metadata, rows),
        OutputFormat::Csv => format_csv(metadata, rows),
        OutputFormat::Raw => format_raw(metadata, rows),
    }
}

/// Reads one column of a row as display text, or `None` for SQL NULL.
fn render(row: &DataRow, name: &str, tag: TypeTag) -> RowResult<Option<String>> {
    Ok(match tag {
        TypeTag::String | TypeTag::Unsupported => row.get_string(name)?,
        TypeTag::Boolean => row.get_bool(name)?.map(|v| v.to_string()),
        TypeTag::Date => row.get_date(name)?.map(|v| v.format("%Y-%m-%d").to_string()),
        TypeTag::Timestamp => row
            .get_timestamp(name)?
            .map(|v| v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        TypeTag::Numeric => row.get_numeric(name)?.map(|v| v.to_string()),
        TypeTag::Integer => row.get_int(name)?.map(|v| v.to_string()),
    })
}

/// Reads one column of a row as a JSON value.
fn render_json(row: &DataRow, name: &str, tag: TypeTag) -> RowResult<JsonValue> {
    let value = match tag {
        TypeTag::Boolean => row.get_bool(name)?.map(|v| json!(v)),
        TypeTag::Numeric => row.get_numeric(name)?.map(|v| json!(v)),
        TypeTag::Integer => row.get_int(name)?.map(|v| json!(v)),
        _ => render(row, name, tag)?.map(JsonValue::String),
    };
    Ok(value.unwrap_or(JsonValue::Null))
}

/// Returns `(name, declared tag)` for every column, in projection order.
fn columns(metadata: &Metadata) -> Vec<(&str, TypeTag)> {
    metadata.columns().map(|(name, ty)| (name, ty.tag)).collect()
}

/// Renders every column of a row as text, NULL spelled out.
fn text_cells(columns: &[(&str, TypeTag)], row: &DataRow) -> RowResult<Vec<String>> {
    columns
        .iter()
        .map(|&(name, tag)| Ok(render(row, name, tag)?.unwrap_or_else(|| NULL_TEXT.to_string())))
        .collect()
}

/// Formats the rows as a table.
fn format_table(metadata: &Metadata, rows: &[DataRow]) -> RowResult<String> {
    let columns = columns(metadata);
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    if !columns.is_empty() {
        table.set_header(columns.iter().map(|(name, _)| Cell::new(name)));
    }

    for row in rows {
        table.add_row(text_cells(&columns, row)?);
    }

    Ok(table.to_string())
}

/// Formats the rows as a JSON array of objects.
fn format_json(metadata: &Metadata, rows: &[DataRow]) -> RowResult<String> {
    let columns = columns(metadata);
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let mut obj = serde_json::Map::new();
        for &(name, tag) in &columns {
            obj.insert(name.to_string(), render_json(row, name, tag)?);
        }
        out.push(JsonValue::Object(obj));
    }

    serde_json::to_string_pretty(&out)
        .map_err(|e| RowError::internal(format!("serializing rows as JSON: {}", e)))
}

/// Formats the rows as CSV. NULL is an empty field.
fn format_csv(metadata: &Metadata, rows: &[DataRow]) -> RowResult<String> {
    let columns = columns(metadata);
    let mut output = String::new();

    if !columns.is_empty() {
        let header: Vec<String> = columns.iter().map(|(name, _)| escape_csv(name)).collect();
        output.push_str(&header.join(","));
        output.push('\n');
    }

    for row in rows {
        let mut values = Vec::with_capacity(columns.len());
        for &(name, tag) in &columns {
            values.push(render(row, name, tag)?.map(|v| escape_csv(&v)).unwrap_or_default());
        }
        output.push_str(&values.join(","));
        output.push('\n');
    }

    Ok(output)
}

/// Escapes a value for CSV output.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Formats the rows as raw tab-separated values.
fn format_raw(metadata: &Metadata, rows: &[DataRow]) -> RowResult<String> {
    let columns = columns(metadata);
    let mut output = String::new();

    if !columns.is_empty() {
        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        output.push_str(&names.join("\t"));
        output.push('\n');
    }

    for row in rows {
        output.push_str(&text_cells(&columns, row)?.join("\t"));
        output.push('\n');
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rowscan_core::RawValue;
    use std::sync::Arc;

    fn make_test_rows() -> (Arc<Metadata>, Vec<DataRow>) {
        let metadata = Arc::new(
            Metadata::builder()
                .append("id", "INT8")
                .append("name", "VARCHAR")
                .append("active", "BOOL")
                .append("born", "DATE")
                .build()
                .unwrap(),
        );
        let rows = vec![
            DataRow::from_raw(
                Arc::clone(&metadata),
                vec![
                    RawValue::Int(1),
                    RawValue::from("Alice"),
                    RawValue::Bool(true),
                    RawValue::Date(NaiveDate::from_ymd_opt(1990, 7, 4).unwrap()),
                ],
            )
            .unwrap(),
            DataRow::from_raw(
                Arc::clone(&metadata),
                vec![
                    RawValue::Int(2),
                    RawValue::from("Bob, Jr."),
                    RawValue::Bool(false),
                    RawValue::Null,
                ],
            )
            .unwrap(),
        ];
        (metadata, rows)
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("raw".parse::<OutputFormat>().unwrap(), OutputFormat::Raw);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_table() {
        let (metadata, rows) = make_test_rows();
        let output = format_table(&metadata, &rows).unwrap();
        assert!(output.contains("id"));
        assert!(output.contains("born"));
        assert!(output.contains("Alice"));
        assert!(output.contains("1990-07-04"));
        assert!(output.contains("NULL"));
    }

    #[test]
    fn test_format_json() {
        let (metadata, rows) = make_test_rows();
        let output = format_json(&metadata, &rows).unwrap();

        let parsed: Vec<JsonValue> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["id"], json!(1));
        assert_eq!(parsed[0]["name"], json!("Alice"));
        assert_eq!(parsed[0]["active"], json!(true));
        assert_eq!(parsed[0]["born"], json!("1990-07-04"));
        assert_eq!(parsed[1]["born"], JsonValue::Null);
    }

    #[test]
    fn test_format_csv() {
        let (metadata, rows) = make_test_rows();
        let output = format_csv(&metadata, &rows).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,name,active,born");
        assert_eq!(lines[1], "1,Alice,true,1990-07-04");
        assert_eq!(lines[2], "2,\"Bob, Jr.\",false,");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("hello"), "hello");
        assert_eq!(escape_csv("hello,world"), "\"hello,world\"");
        assert_eq!(escape_csv("hello\"world"), "\"hello\"\"world\"");
    }

    #[test]
    fn test_format_raw() {
        let (metadata, rows) = make_test_rows();
        let output = format_raw(&metadata, &rows).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id\tname\tactive\tborn");
        assert_eq!(lines[2], "2\tBob, Jr.\tfalse\tNULL");
    }

    #[test]
    fn test_format_timestamp_and_numeric() {
        let metadata = Metadata::builder()
            .append("at", "TIMESTAMP")
            .append("score", "NUMERIC")
            .build()
            .unwrap();
        let at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 45, 30)
            .unwrap();
        let row = DataRow::from_raw(metadata, vec![RawValue::Timestamp(at), RawValue::Float(2.5)])
            .unwrap();
        let metadata = Arc::clone(row.metadata());

        let raw = format_rows(&metadata, &[row], OutputFormat::Raw).unwrap();
        assert_eq!(raw.lines().nth(1), Some("2024-01-15 09:45:30\t2.5"));
    }

    #[test]
    fn test_format_json_non_finite_numeric() {
        let metadata = Metadata::builder().append("score", "NUMERIC").build().unwrap();
        let row = DataRow::from_raw(metadata, vec![RawValue::Float(f64::NAN)]).unwrap();
        let metadata = Arc::clone(row.metadata());

        let output = format_rows(&metadata, &[row], OutputFormat::Json).unwrap();
        let parsed: Vec<JsonValue> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["score"], JsonValue::Null);
    }

    #[test]
    fn test_empty_result() {
        let metadata = Metadata::builder().build().unwrap();
        assert_eq!(format_rows(&metadata, &[], OutputFormat::Csv).unwrap(), "");
        assert_eq!(format_rows(&metadata, &[], OutputFormat::Json).unwrap(), "[]");
    }
}
