use crate::record::FieldKind;

/// Error classification shared by every error in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Destination or row shape does not fit the result.
    Structural,
    /// A resolved field has a type outside the supported scalar set.
    UnsupportedFieldType,
    /// A non-null token does not parse as the field's kind.
    ValueParse,
    /// A parsed number does not fit the field's width or signedness.
    Range,
    /// The wire response itself is malformed.
    Format,
}

/// Failure converting one cell into one field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoerceError {
    #[error("cannot parse {token:?} as {kind}")]
    Parse { token: String, kind: FieldKind },

    #[error("{token:?} is out of range for {kind}")]
    Range { token: String, kind: FieldKind },

    #[error("unsupported field type '{type_name}'")]
    Unsupported { type_name: &'static str },

    #[error("field expects {expected}, got {found}")]
    Mismatch { expected: FieldKind, found: FieldKind },

    #[error("record has no field #{0}")]
    NoSuchField(usize),
}

impl CoerceError {
    pub fn parse(token: &str, kind: FieldKind) -> Self {
        Self::Parse {
            token: token.to_string(),
            kind,
        }
    }

    pub fn range(token: &str, kind: FieldKind) -> Self {
        Self::Range {
            token: token.to_string(),
            kind,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CoerceError::Parse { .. } => ErrorKind::ValueParse,
            CoerceError::Range { .. } => ErrorKind::Range,
            CoerceError::Unsupported { .. } => ErrorKind::UnsupportedFieldType,
            CoerceError::Mismatch { .. } | CoerceError::NoSuchField(_) => ErrorKind::Structural,
        }
    }
}
