use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::CoerceError;
use crate::schema::ColumnType;
use crate::value::Scalar;

/// Native kind of a destination field.
///
/// The closed set of scalar kinds a field may have. Anything else is
/// carried as `Unsupported` with the field's type name so that the failure
/// can be reported when (and only when) a column is written into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    I8,
    I16,
    I32,
    I64,
    /// Native-width signed integer.
    Isize,
    U8,
    U16,
    U32,
    U64,
    /// Native-width unsigned integer.
    Usize,
    F32,
    F64,
    Bool,
    Str,
    Unsupported(&'static str),
}

impl FieldKind {
    /// Value a field of this kind holds before any column is applied.
    pub fn zero(&self) -> Option<Scalar> {
        Some(match self {
            FieldKind::I8 => Scalar::I8(0),
            FieldKind::I16 => Scalar::I16(0),
            FieldKind::I32 => Scalar::I32(0),
            FieldKind::I64 => Scalar::I64(0),
            FieldKind::Isize => Scalar::Isize(0),
            FieldKind::U8 => Scalar::U8(0),
            FieldKind::U16 => Scalar::U16(0),
            FieldKind::U32 => Scalar::U32(0),
            FieldKind::U64 => Scalar::U64(0),
            FieldKind::Usize => Scalar::Usize(0),
            FieldKind::F32 => Scalar::F32(0.0),
            FieldKind::F64 => Scalar::F64(0.0),
            FieldKind::Bool => Scalar::Bool(false),
            FieldKind::Str => Scalar::Str(String::new()),
            FieldKind::Unsupported(_) => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::I8 => "i8",
            FieldKind::I16 => "i16",
            FieldKind::I32 => "i32",
            FieldKind::I64 => "i64",
            FieldKind::Isize => "isize",
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::U64 => "u64",
            FieldKind::Usize => "usize",
            FieldKind::F32 => "f32",
            FieldKind::F64 => "f64",
            FieldKind::Bool => "bool",
            FieldKind::Str => "String",
            FieldKind::Unsupported(name) => name,
        }
    }

    /// Whether a column of `declared` type naturally feeds this kind.
    ///
    /// Not enforced during conversion; used for diagnostics only.
    pub fn accepts(&self, declared: ColumnType) -> bool {
        match declared {
            ColumnType::Integer => matches!(
                self,
                FieldKind::I8
                    | FieldKind::I16
                    | FieldKind::I32
                    | FieldKind::I64
                    | FieldKind::Isize
                    | FieldKind::U8
                    | FieldKind::U16
                    | FieldKind::U32
                    | FieldKind::U64
                    | FieldKind::Usize
            ),
            ColumnType::Float => matches!(self, FieldKind::F32 | FieldKind::F64),
            ColumnType::String => matches!(self, FieldKind::Str),
            ColumnType::Boolean => matches!(self, FieldKind::Bool),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type '{0}' (expected i8..i64, isize, u8..u64, usize, f32, f64, bool, String)")]
pub struct UnknownFieldKind(pub String);

impl FromStr for FieldKind {
    type Err = UnknownFieldKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "i8" => FieldKind::I8,
            "i16" => FieldKind::I16,
            "i32" => FieldKind::I32,
            "i64" => FieldKind::I64,
            "isize" => FieldKind::Isize,
            "u8" => FieldKind::U8,
            "u16" => FieldKind::U16,
            "u32" => FieldKind::U32,
            "u64" => FieldKind::U64,
            "usize" => FieldKind::Usize,
            "f32" => FieldKind::F32,
            "f64" => FieldKind::F64,
            "bool" => FieldKind::Bool,
            "String" | "string" | "str" => FieldKind::Str,
            other => return Err(UnknownFieldKind(other.to_string())),
        })
    }
}

/// One entry of a record's field table.
///
/// Position in the table is the field index passed to `Record::set_field`
/// and `RecordBinder::assign`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDesc {
    /// Declared field name. Matched case-insensitively.
    pub name: Cow<'static, str>,
    /// Explicit alias. Matched exactly and before any name match.
    pub alias: Option<Cow<'static, str>>,
    pub kind: FieldKind,
    /// `Option<T>` field: null stores `None`.
    pub optional: bool,
}

impl FieldDesc {
    pub fn new(name: impl Into<Cow<'static, str>>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            alias: None,
            kind,
            optional: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Statically known destination record.
///
/// Usually implemented with `#[derive(Record)]`. `Default` only constructs
/// the record; every supported field is then cleared through `set_field`, so
/// a hand-written `Default` never leaks into materialized rows.
pub trait Record: Default {
    fn fields() -> &'static [FieldDesc];

    /// Store `value` into the field at `index` of `fields()`.
    ///
    /// `None` clears the field: the kind's zero value, or `None` for an
    /// optional field.
    fn set_field(&mut self, index: usize, value: Option<Scalar>) -> Result<(), CoerceError>;
}

/// Runtime view of a destination record type.
///
/// Materialization only talks to this trait, so statically derived records
/// (through `Typed`) and runtime-registered layouts share one code path.
pub trait RecordBinder {
    type Record;

    fn fields(&self) -> &[FieldDesc];

    /// A fresh record. Fields are cleared with `assign(.., None)` afterwards.
    fn zeroed(&self) -> Self::Record;

    /// Store `value` into the field at `index`; `None` clears it.
    fn assign(
        &self,
        record: &mut Self::Record,
        index: usize,
        value: Option<Scalar>,
    ) -> Result<(), CoerceError>;
}

/// `RecordBinder` for a `Record` type.
pub struct Typed<T>(PhantomData<fn() -> T>);

impl<T> Typed<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordBinder for Typed<T> {
    type Record = T;

    fn fields(&self) -> &[FieldDesc] {
        T::fields()
    }

    fn zeroed(&self) -> T {
        T::default()
    }

    fn assign(
        &self,
        record: &mut T,
        index: usize,
        value: Option<Scalar>,
    ) -> Result<(), CoerceError> {
        record.set_field(index, value)
    }
}

/// Typed extraction of a coerced value into a struct field.
pub trait FromScalar: Sized {
    fn from_scalar(value: Scalar) -> Result<Self, CoerceError>;

    /// Value stored for a null cell.
    fn null() -> Self;

    fn from_cell(value: Option<Scalar>) -> Result<Self, CoerceError> {
        match value {
            Some(value) => Self::from_scalar(value),
            None => Ok(Self::null()),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromScalar for $ty {
                fn from_scalar(value: Scalar) -> Result<Self, CoerceError> {
                    match value {
                        Scalar::$variant(v) => Ok(v),
                        other => Err(CoerceError::Mismatch {
                            expected: FieldKind::$variant,
                            found: other.kind(),
                        }),
                    }
                }

                fn null() -> Self {
                    <$ty>::default()
                }
            }
        )*
    };
}

impl_from_scalar! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    String => Str,
}

impl<T: FromScalar> FromScalar for Option<T> {
    fn from_scalar(value: Scalar) -> Result<Self, CoerceError> {
        T::from_scalar(value).map(Some)
    }

    fn null() -> Self {
        None
    }
}
