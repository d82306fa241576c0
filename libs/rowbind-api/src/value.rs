use crate::record::FieldKind;
use crate::schema::ColumnSchema;

/// Wire-level value of one row/column intersection.
///
/// Cells are string-encoded regardless of the column's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Null => None,
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Cell::Null, Cell::Text)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// Positional array of cells. Order matches `ColumnSchema.columns`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow(pub Vec<Cell>);

impl RawRow {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C: Into<Cell>> FromIterator<C> for RawRow {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        RawRow(iter.into_iter().map(Into::into).collect())
    }
}

/// Tabular query result as handed over by the query-execution side.
///
/// Read-only input to materialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub schema: ColumnSchema,
    pub rows: Vec<RawRow>,
}

impl QueryResult {
    pub fn new(schema: ColumnSchema, rows: Vec<RawRow>) -> Self {
        Self { schema, rows }
    }
}

/// Typed value produced by coercion, one variant per supported field kind.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Scalar {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl Scalar {
    pub fn kind(&self) -> FieldKind {
        match self {
            Scalar::I8(_) => FieldKind::I8,
            Scalar::I16(_) => FieldKind::I16,
            Scalar::I32(_) => FieldKind::I32,
            Scalar::I64(_) => FieldKind::I64,
            Scalar::Isize(_) => FieldKind::Isize,
            Scalar::U8(_) => FieldKind::U8,
            Scalar::U16(_) => FieldKind::U16,
            Scalar::U32(_) => FieldKind::U32,
            Scalar::U64(_) => FieldKind::U64,
            Scalar::Usize(_) => FieldKind::Usize,
            Scalar::F32(_) => FieldKind::F32,
            Scalar::F64(_) => FieldKind::F64,
            Scalar::Bool(_) => FieldKind::Bool,
            Scalar::Str(_) => FieldKind::Str,
        }
    }
}
