//! Column → field resolution.

use rowbind_api::record::FieldDesc;
use rowbind_api::schema::ColumnSchema;

use crate::error::BindError;

/// Resolved target of every schema column, by column position.
///
/// Built once per materialization and reused for every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    slots: Vec<Option<usize>>,
}

impl ColumnMap {
    /// Field index for the column at `column`, if any.
    pub fn field(&self, column: usize) -> Option<usize> {
        self.slots.get(column).copied().flatten()
    }

    /// `(column, field)` pairs in column order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(column, field)| field.map(|f| (column, f)))
    }

    pub fn matched(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Check that a field table can be resolved against unambiguously.
///
/// Names must be non-empty and unique, aliases must be unique, and no alias
/// may equal another field's name (records render keyed by alias or name).
pub fn validate_fields(fields: &[FieldDesc]) -> Result<(), BindError> {
    for (i, field) in fields.iter().enumerate() {
        if field.name.is_empty() {
            return Err(BindError::InvalidDestination(format!("field #{i} has an empty name")));
        }
        let earlier = &fields[..i];
        if earlier.iter().any(|f| f.name == field.name) {
            return Err(BindError::InvalidDestination(format!(
                "duplicate field name '{}'",
                field.name
            )));
        }
        if let Some(alias) = &field.alias {
            if earlier.iter().any(|f| f.alias.as_ref() == Some(alias)) {
                return Err(BindError::InvalidDestination(format!(
                    "duplicate field alias '{alias}'"
                )));
            }
            let shadowed = fields
                .iter()
                .enumerate()
                .find(|(j, other)| *j != i && other.name == *alias);
            if let Some((_, other)) = shadowed {
                return Err(BindError::InvalidDestination(format!(
                    "alias '{alias}' of field '{}' collides with field '{}'",
                    field.name, other.name
                )));
            }
        }
    }
    Ok(())
}

/// Match every column of `schema` against `fields`.
///
/// Per column, highest priority first:
/// 1. exact match on a field alias;
/// 2. case-insensitive match on a field name, preferring an exact-case
///    match, then the first declared field.
///
/// Unmatched columns map to `None`.
pub fn resolve(schema: &ColumnSchema, fields: &[FieldDesc]) -> ColumnMap {
    let slots = schema
        .iter()
        .map(|column| {
            let slot = resolve_column(&column.name, fields);
            match slot {
                Some(index) => {
                    let field = &fields[index];
                    if !field.kind.accepts(column.column_type) {
                        tracing::debug!(
                            column = %column.name,
                            declared = %column.column_type,
                            field = %field.name,
                            kind = %field.kind,
                            "column type does not match field kind, parsing by field kind"
                        );
                    }
                }
                None => tracing::trace!(column = %column.name, "no field for column, skipping"),
            }
            slot
        })
        .collect();
    ColumnMap { slots }
}

fn resolve_column(column: &str, fields: &[FieldDesc]) -> Option<usize> {
    if let Some(index) = fields
        .iter()
        .position(|f| f.alias.as_deref() == Some(column))
    {
        return Some(index);
    }
    if let Some(index) = fields.iter().position(|f| f.name == column) {
        return Some(index);
    }
    fields.iter().position(|f| eq_ignore_case(&f.name, column))
}

/// Unicode-aware case-insensitive comparison.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
