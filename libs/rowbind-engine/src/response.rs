//! JSON query-response reader.
//!
//! Accepts the response shape returned by BigQuery's `jobs.query` /
//! `getQueryResults`:
//!
//! ```json
//! {
//!   "schema": { "fields": [ { "name": "A", "type": "INTEGER", "mode": "REQUIRED" } ] },
//!   "rows": [ { "f": [ { "v": "1" } ] } ]
//! }
//! ```
//!
//! Only flat scalar columns are supported.

use serde::Deserialize;

use rowbind_api::schema::{Column, ColumnSchema, ColumnType};
use rowbind_api::value::{Cell, QueryResult, RawRow};

use crate::error::BindError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    schema: Option<WireSchema>,
    #[serde(default)]
    rows: Vec<WireRow>,
    #[serde(default)]
    page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSchema {
    #[serde(default)]
    fields: Vec<WireField>,
}

#[derive(Debug, Deserialize)]
struct WireField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRow {
    #[serde(default)]
    f: Vec<WireCell>,
}

#[derive(Debug, Deserialize)]
struct WireCell {
    #[serde(default)]
    v: serde_json::Value,
}

/// Parse a JSON query response into a `QueryResult`.
pub fn parse_query_response(json: &str) -> Result<QueryResult, BindError> {
    let wire: WireResponse = serde_json::from_str(json)?;
    if let Some(token) = &wire.page_token {
        tracing::debug!(page_token = %token, "response has further pages, reading this page only");
    }

    let schema = match wire.schema {
        Some(schema) => schema
            .fields
            .into_iter()
            .map(column_from_wire)
            .collect::<Result<ColumnSchema, _>>()?,
        None if wire.rows.is_empty() => ColumnSchema::default(),
        None => return Err(BindError::Response("rows present without a schema".into())),
    };

    let rows = wire
        .rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.f
                .into_iter()
                .map(|cell| cell_from_json(cell.v))
                .collect::<Result<Vec<_>, _>>()
                .map(RawRow)
                .map_err(|e| e.with_context(format!("row {i}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QueryResult { schema, rows })
}

fn column_from_wire(field: WireField) -> Result<Column, BindError> {
    let column_type = ColumnType::from_wire(&field.field_type).ok_or_else(|| {
        BindError::Response(format!(
            "column '{}': unsupported type '{}'",
            field.name, field.field_type
        ))
    })?;
    let nullable = match field.mode.as_deref().map(str::to_ascii_uppercase).as_deref() {
        None | Some("NULLABLE") => true,
        Some("REQUIRED") => false,
        Some(other) => {
            return Err(BindError::Response(format!(
                "column '{}': unsupported mode '{other}'",
                field.name
            )))
        }
    };
    Ok(Column {
        name: field.name,
        column_type,
        nullable,
    })
}

fn cell_from_json(value: serde_json::Value) -> Result<Cell, BindError> {
    match value {
        serde_json::Value::Null => Ok(Cell::Null),
        serde_json::Value::String(s) => Ok(Cell::Text(s)),
        serde_json::Value::Number(n) => Ok(Cell::Text(n.to_string())),
        serde_json::Value::Bool(b) => Ok(Cell::Text(b.to_string())),
        other => Err(BindError::Response(format!(
            "nested cell values are not supported: {other}"
        ))),
    }
}
