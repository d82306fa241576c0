//! Runtime-registered record layouts.
//!
//! For destinations whose shape is only known at runtime (configuration,
//! generated bindings). Records are stored as one optional value per field.

use std::borrow::Cow;

use rowbind_api::error::CoerceError;
use rowbind_api::record::{FieldDesc, FieldKind, RecordBinder};
use rowbind_api::value::Scalar;

/// Ordered field table of a runtime record type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<FieldDesc>,
}

/// A record materialized against a `RecordLayout`.
///
/// `None` only for optional fields that received no value (and for
/// unsupported kinds, which have no zero value).
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    values: Vec<Option<Scalar>>,
}

impl DynamicRecord {
    pub fn get(&self, index: usize) -> Option<&Scalar> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn values(&self) -> &[Option<Scalar>] {
        &self.values
    }
}

impl RecordLayout {
    pub fn new(fields: Vec<FieldDesc>) -> Self {
        Self { fields }
    }

    pub fn builder() -> RecordLayoutBuilder {
        RecordLayoutBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the field declared as `name` (exact).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Value of the field declared as `name`.
    pub fn get<'r>(&self, record: &'r DynamicRecord, name: &str) -> Option<&'r Scalar> {
        self.index_of(name).and_then(|i| record.get(i))
    }

    /// JSON object keyed by each field's alias, or its name when it has none.
    pub fn to_json(&self, record: &DynamicRecord) -> serde_json::Value {
        let object = self
            .fields
            .iter()
            .zip(&record.values)
            .map(|(field, value)| {
                let key = field.alias.as_ref().unwrap_or(&field.name).to_string();
                let value = match value {
                    Some(scalar) => serde_json::to_value(scalar).unwrap_or(serde_json::Value::Null),
                    None => serde_json::Value::Null,
                };
                (key, value)
            })
            .collect();
        serde_json::Value::Object(object)
    }
}

impl RecordBinder for RecordLayout {
    type Record = DynamicRecord;

    fn fields(&self) -> &[FieldDesc] {
        &self.fields
    }

    fn zeroed(&self) -> DynamicRecord {
        let values = self
            .fields
            .iter()
            .map(|f| if f.optional { None } else { f.kind.zero() })
            .collect();
        DynamicRecord { values }
    }

    fn assign(
        &self,
        record: &mut DynamicRecord,
        index: usize,
        value: Option<Scalar>,
    ) -> Result<(), CoerceError> {
        let field = self.fields.get(index).ok_or(CoerceError::NoSuchField(index))?;
        let value = match value {
            Some(value) => {
                if let FieldKind::Unsupported(type_name) = field.kind {
                    return Err(CoerceError::Unsupported { type_name });
                }
                if value.kind() != field.kind {
                    return Err(CoerceError::Mismatch {
                        expected: field.kind,
                        found: value.kind(),
                    });
                }
                Some(value)
            }
            None if field.optional => None,
            None => field.kind.zero(),
        };
        let slot = record
            .values
            .get_mut(index)
            .ok_or(CoerceError::NoSuchField(index))?;
        *slot = value;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordLayoutBuilder {
    fields: Vec<FieldDesc>,
}

impl RecordLayoutBuilder {
    pub fn field(mut self, name: impl Into<Cow<'static, str>>, kind: FieldKind) -> Self {
        self.fields.push(FieldDesc::new(name, kind));
        self
    }

    pub fn aliased_field(
        mut self,
        name: impl Into<Cow<'static, str>>,
        alias: impl Into<Cow<'static, str>>,
        kind: FieldKind,
    ) -> Self {
        self.fields.push(FieldDesc::new(name, kind).with_alias(alias));
        self
    }

    pub fn optional_field(mut self, name: impl Into<Cow<'static, str>>, kind: FieldKind) -> Self {
        self.fields.push(FieldDesc::new(name, kind).optional());
        self
    }

    /// Append a fully specified field.
    pub fn push(mut self, desc: FieldDesc) -> Self {
        self.fields.push(desc);
        self
    }

    pub fn build(self) -> RecordLayout {
        RecordLayout::new(self.fields)
    }
}
