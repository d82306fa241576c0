//! Query result → typed records.

use rowbind_api::record::{Record, RecordBinder, Typed};
use rowbind_api::value::QueryResult;

use crate::coerce::coerce_cell;
use crate::error::BindError;
use crate::resolve::{resolve, validate_fields};

/// Materialize every row of `result` as a `T` and append them to `dst`.
///
/// Row `i` becomes the `i`-th appended record. Every field starts at its
/// zero value (`None` for `Option` fields) whatever `T::default()` sets, and
/// a null cell resets it there. All-or-nothing: on error nothing is appended.
///
/// Returns the number of records appended.
pub fn materialize<T: Record>(result: &QueryResult, dst: &mut Vec<T>) -> Result<usize, BindError> {
    materialize_with(&Typed::<T>::new(), result, dst)
}

/// Same as [`materialize`], for any destination described by a binder.
pub fn materialize_with<B: RecordBinder>(
    binder: &B,
    result: &QueryResult,
    dst: &mut Vec<B::Record>,
) -> Result<usize, BindError> {
    let fields = binder.fields();
    validate_fields(fields)?;

    let schema = &result.schema;
    let map = resolve(schema, fields);
    tracing::debug!(
        columns = schema.len(),
        matched = map.matched(),
        fields = fields.len(),
        rows = result.rows.len(),
        "materializing query result"
    );

    let mut staged = Vec::with_capacity(result.rows.len());
    for (row_index, row) in result.rows.iter().enumerate() {
        if row.len() != schema.len() {
            return Err(BindError::RowLength {
                row: row_index,
                expected: schema.len(),
                found: row.len(),
            });
        }

        let mut record = binder.zeroed();
        for (field_index, field) in fields.iter().enumerate() {
            binder
                .assign(&mut record, field_index, None)
                .map_err(|e| {
                    BindError::InvalidDestination(format!("field '{}': {e}", field.name))
                })?;
        }
        for (column_index, field_index) in map.pairs() {
            let column = &schema.columns[column_index];
            let field = &fields[field_index];
            let cell_error = |source| BindError::Cell {
                row: row_index,
                column: column.name.clone(),
                declared: column.column_type,
                source,
            };

            let value = coerce_cell(field.kind, &row.0[column_index]).map_err(cell_error)?;
            binder
                .assign(&mut record, field_index, value)
                .map_err(cell_error)?;
        }
        staged.push(record);
    }

    let appended = staged.len();
    dst.append(&mut staged);
    tracing::debug!(records = appended, total = dst.len(), "materialization complete");
    Ok(appended)
}
