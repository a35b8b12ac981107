//! Decoding of `BigQuery` tabular results.

use eyre::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Column definition in a result schema.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FieldSchema {
    /// Column name
    pub name: String,
    /// Standard SQL type name as reported by the API (e.g. `INTEGER`)
    #[serde(rename = "type")]
    pub field_type: String,
    /// `NULLABLE`, `REQUIRED` or `REPEATED`
    #[serde(default)]
    pub mode: Option<String>,
}

/// Schema block of a query response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TableSchema {
    /// Columns in result order
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

/// One row in the REST wire format: `{"f": [{"v": ...}, ...]}`.
#[derive(Clone, Debug, Deserialize)]
pub struct TableRow {
    /// Cells in schema order
    #[serde(default)]
    pub f: Vec<TableCell>,
}

/// One cell in the REST wire format.
#[derive(Clone, Debug, Deserialize)]
pub struct TableCell {
    /// Cell value; scalars arrive as strings, NULL as `null`
    #[serde(default)]
    pub v: Value,
}

/// Rows returned by a completed query.
///
/// Values are kept as the strings the API returns; `None` is SQL NULL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultSet {
    fields: Vec<FieldSchema>,
    rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    /// Create a result set from already decoded parts.
    pub const fn new(fields: Vec<FieldSchema>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { fields, rows }
    }

    /// Build a result set from the wire representation.
    pub fn from_wire(schema: Option<TableSchema>, rows: Vec<TableRow>) -> Self {
        let fields = schema.map(|s| s.fields).unwrap_or_default();
        let rows = rows
            .into_iter()
            .map(|row| row.f.into_iter().map(|cell| cell_to_string(cell.v)).collect())
            .collect();
        Self { fields, rows }
    }

    /// Result columns.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the query returned no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of `column`, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == column)
    }

    /// Value of `column` in the first row.
    ///
    /// `None` when there are no rows, the column does not exist or the value
    /// is NULL.
    pub fn first_value(&self, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.first()?.get(idx)?.as_deref()
    }

    /// Value of `column` in the first row parsed as an unsigned integer.
    pub fn first_u64(&self, column: &str) -> Result<Option<u64>> {
        self.first_value(column)
            .map(|v| {
                v.parse::<u64>()
                    .wrap_err_with(|| format!("column `{column}` is not an unsigned integer: {v}"))
            })
            .transpose()
    }
}

fn cell_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count_schema() -> Vec<FieldSchema> {
        vec![FieldSchema {
            name: "count".to_owned(),
            field_type: "INTEGER".to_owned(),
            mode: Some("NULLABLE".to_owned()),
        }]
    }

    #[test]
    fn decodes_wire_rows() {
        let schema: TableSchema = serde_json::from_value(json!({
            "fields": [
                {"name": "person_id", "type": "INTEGER", "mode": "NULLABLE"},
                {"name": "procedure_dat", "type": "DATE"}
            ]
        }))
        .unwrap();
        let rows: Vec<TableRow> = serde_json::from_value(json!([
            {"f": [{"v": "1"}, {"v": "2009-01-01"}]},
            {"f": [{"v": "2"}, {"v": null}]}
        ]))
        .unwrap();

        let rs = ResultSet::from_wire(Some(schema), rows);
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.column_index("procedure_dat"), Some(1));
        assert_eq!(rs.first_value("procedure_dat"), Some("2009-01-01"));
        assert_eq!(rs.first_value("missing"), None);
    }

    #[test]
    fn first_u64_parses_integer_strings() {
        let rs = ResultSet::new(count_schema(), vec![vec![Some("42".to_owned())]]);
        assert_eq!(rs.first_u64("count").unwrap(), Some(42));
    }

    #[test]
    fn first_u64_is_none_without_rows() {
        let rs = ResultSet::new(count_schema(), Vec::new());
        assert!(rs.is_empty());
        assert_eq!(rs.first_u64("count").unwrap(), None);
    }

    #[test]
    fn first_u64_is_none_for_null() {
        let rs = ResultSet::new(count_schema(), vec![vec![None]]);
        assert_eq!(rs.first_u64("count").unwrap(), None);
    }

    #[test]
    fn first_u64_rejects_non_numeric() {
        let rs = ResultSet::new(count_schema(), vec![vec![Some("-3".to_owned())]]);
        let err = rs.first_u64("count").unwrap_err();
        assert!(err.to_string().contains("not an unsigned integer"));
    }

    #[test]
    fn nested_values_are_kept_as_json() {
        let rows: Vec<TableRow> =
            serde_json::from_value(json!([{"f": [{"v": [{"v": "a"}]}]}])).unwrap();
        let schema = TableSchema {
            fields: vec![FieldSchema {
                name: "tags".to_owned(),
                field_type: "STRING".to_owned(),
                mode: Some("REPEATED".to_owned()),
            }],
        };
        let rs = ResultSet::from_wire(Some(schema), rows);
        assert_eq!(rs.first_value("tags"), Some(r#"[{"v":"a"}]"#));
    }
}
