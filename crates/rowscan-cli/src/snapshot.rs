//! Captured result sets.
//!
//! A snapshot is a JSON document holding a result's column descriptors and
//! its rows as JSON values:
//!
//! ```json
//! {
//!   "columns": [{ "name": "id", "type": "INT8" }, { "name": "born", "type": "DATE" }],
//!   "rows": [[1, "1990-07-04"], [2, null]]
//! }
//! ```
//!
//! Replaying it through a [`MemoryCursor`] exercises the same decode path a
//! live driver would.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use rowscan_core::{ColumnDescriptor, MemoryCursor, RawValue, TypeTag};

/// Timestamp layouts accepted in snapshot text.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One column descriptor in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotColumn {
    /// Column name.
    pub name: String,
    /// Vendor type name, as the driver reported it.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A captured result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Columns in projection order.
    pub columns: Vec<SnapshotColumn>,
    /// Rows of JSON values, one value per column.
    #[serde(default)]
    pub rows: Vec<Vec<JsonValue>>,
}

impl Snapshot {
    /// Loads a snapshot from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing snapshot {}", path.display()))
    }

    /// Parses a snapshot from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Converts the snapshot into a cursor positioned before its first row.
    ///
    /// Row width is not checked here; the decoder reports a mismatch when
    /// the row is scanned.
    pub fn into_cursor(self) -> Result<MemoryCursor> {
        let tags: Vec<TypeTag> = self
            .columns
            .iter()
            .map(|c| TypeTag::from_vendor(&c.type_name))
            .collect();

        let mut cursor = MemoryCursor::new(
            self.columns
                .into_iter()
                .map(|c| ColumnDescriptor::new(c.name, c.type_name))
                .collect(),
        );

        for (row_idx, row) in self.rows.into_iter().enumerate() {
            let raw = row
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    let tag = tags.get(i).copied().unwrap_or(TypeTag::Unsupported);
                    to_raw(value, tag)
                        .with_context(|| format!("row {}, column {}", row_idx, i))
                })
                .collect::<Result<Vec<_>>>()?;
            cursor.push_row(raw);
        }

        Ok(cursor)
    }
}

/// Maps a JSON value to the wire value a driver would produce for a column
/// of the given declared type.
fn to_raw(value: JsonValue, tag: TypeTag) -> Result<RawValue> {
    let raw = match value {
        JsonValue::Null => RawValue::Null,
        JsonValue::Bool(b) => RawValue::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => RawValue::Int(i),
            None => match n.as_f64() {
                Some(f) => RawValue::Float(f),
                None => bail!("number {} is out of range", n),
            },
        },
        JsonValue::String(s) => match tag {
            TypeTag::Date => RawValue::Date(
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .with_context(|| format!("invalid date {:?}", s))?,
            ),
            TypeTag::Timestamp => RawValue::Timestamp(parse_timestamp(&s)?),
            _ => RawValue::Text(s),
        },
        // structured values arrive as their JSON text, like JSONB columns
        other @ (JsonValue::Array(_) | JsonValue::Object(_)) => RawValue::Text(other.to_string()),
    };
    Ok(raw)
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .with_context(|| format!("invalid timestamp {:?}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowscan_core::{Cursor, DecoderConfig, RowError, Rows, ScanError};
    use tempfile::TempDir;

    const USERS: &str = r#"{
        "columns": [
            { "name": "id", "type": "INT8" },
            { "name": "name", "type": "VARCHAR" },
            { "name": "is_good", "type": "BOOL" },
            { "name": "born", "type": "DATE" },
            { "name": "seen_at", "type": "TIMESTAMP" },
            { "name": "score", "type": "NUMERIC" },
            { "name": "tags", "type": "JSONB" }
        ],
        "rows": [
            [1, "alice", true, "1990-07-04", "2024-01-15T09:45:30", 98.25, ["a", "b"]],
            [2, null, false, null, "2024-01-16 10:00:00", "12.5", null]
        ]
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = Snapshot::from_json(USERS).unwrap();
        assert_eq!(snapshot.columns.len(), 7);
        assert_eq!(snapshot.columns[3].type_name, "DATE");
        assert_eq!(snapshot.rows.len(), 2);
    }

    #[test]
    fn test_rows_default_to_empty() {
        let snapshot = Snapshot::from_json(r#"{"columns": [{"name": "a", "type": "INT8"}]}"#).unwrap();
        let mut cursor = snapshot.into_cursor().unwrap();
        assert_eq!(cursor.columns().unwrap().len(), 1);
        assert!(!cursor.advance().unwrap());
    }

    #[test]
    fn test_replay_decodes_typed_values() {
        let cursor = Snapshot::from_json(USERS).unwrap().into_cursor().unwrap();
        let rows: Vec<_> = Rows::new(cursor, &DecoderConfig::default())
            .unwrap()
            .collect::<Result<_, RowError>>()
            .unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.get_int("id").unwrap(), Some(1));
        assert_eq!(first.get_string("name").unwrap().as_deref(), Some("alice"));
        assert_eq!(first.get_bool("is_good").unwrap(), Some(true));
        assert_eq!(first.get_date("born").unwrap(), NaiveDate::from_ymd_opt(1990, 7, 4));
        assert_eq!(
            first.get_timestamp("seen_at").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).and_then(|d| d.and_hms_opt(9, 45, 30))
        );
        assert_eq!(first.get_numeric("score").unwrap(), Some(98.25));
        assert_eq!(first.get_string("tags").unwrap().as_deref(), Some(r#"["a","b"]"#));

        let second = &rows[1];
        assert_eq!(second.get_string("name").unwrap(), None);
        assert_eq!(second.get_date("born").unwrap(), None);
        assert_eq!(second.get_numeric("score").unwrap(), Some(12.5));
        assert_eq!(second.get_string("tags").unwrap(), None);
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let snapshot = Snapshot::from_json(
            r#"{"columns": [{"name": "d", "type": "DATE"}], "rows": [["07/04/1990"]]}"#,
        )
        .unwrap();
        let err = snapshot.into_cursor().unwrap_err();
        assert!(format!("{:#}", err).contains("invalid date"));
    }

    #[test]
    fn test_short_row_fails_at_decode() {
        let snapshot = Snapshot::from_json(
            r#"{"columns": [{"name": "a", "type": "INT8"}, {"name": "b", "type": "INT8"}],
                "rows": [[1]]}"#,
        )
        .unwrap();
        let cursor = snapshot.into_cursor().unwrap();
        let mut rows = Rows::new(cursor, &DecoderConfig::default()).unwrap();
        assert!(matches!(
            rows.next().unwrap(),
            Err(RowError::Scan(ScanError::ColumnCountMismatch { .. }))
        ));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        std::fs::write(&path, USERS).unwrap();

        let snapshot = Snapshot::from_file(&path).unwrap();
        assert_eq!(snapshot.rows.len(), 2);

        let missing = Snapshot::from_file(&temp_dir.path().join("missing.json"));
        assert!(missing.is_err());
    }
}
