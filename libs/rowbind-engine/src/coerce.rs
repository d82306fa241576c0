//! Scalar coercion: one raw cell into one field kind.
//!
//! Parsing is driven by the destination kind and the literal text only.
//! The column's declared type is never consulted here.

use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use rowbind_api::error::CoerceError;
use rowbind_api::record::FieldKind;
use rowbind_api::value::{Cell, Scalar};

/// Coerce a cell for a field of `kind`.
///
/// `Ok(None)` for a null cell: the field is cleared to its zero value. Nulls
/// are never an error, whatever the kind.
pub fn coerce_cell(kind: FieldKind, cell: &Cell) -> Result<Option<Scalar>, CoerceError> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Text(token) => coerce(kind, token).map(Some),
    }
}

/// Parse a non-null token as `kind`.
pub fn coerce(kind: FieldKind, token: &str) -> Result<Scalar, CoerceError> {
    Ok(match kind {
        FieldKind::I8 => Scalar::I8(parse_signed(token, kind)?),
        FieldKind::I16 => Scalar::I16(parse_signed(token, kind)?),
        FieldKind::I32 => Scalar::I32(parse_signed(token, kind)?),
        FieldKind::I64 => Scalar::I64(parse_signed(token, kind)?),
        FieldKind::Isize => Scalar::Isize(parse_signed(token, kind)?),
        FieldKind::U8 => Scalar::U8(parse_unsigned(token, kind)?),
        FieldKind::U16 => Scalar::U16(parse_unsigned(token, kind)?),
        FieldKind::U32 => Scalar::U32(parse_unsigned(token, kind)?),
        FieldKind::U64 => Scalar::U64(parse_unsigned(token, kind)?),
        FieldKind::Usize => Scalar::Usize(parse_unsigned(token, kind)?),
        FieldKind::F32 => Scalar::F32(parse_float(token, kind)?),
        FieldKind::F64 => Scalar::F64(parse_float(token, kind)?),
        FieldKind::Bool => {
            Scalar::Bool(parse_bool(token).ok_or_else(|| CoerceError::parse(token, kind))?)
        }
        FieldKind::Str => Scalar::Str(token.to_string()),
        FieldKind::Unsupported(type_name) => return Err(CoerceError::Unsupported { type_name }),
    })
}

fn int_error(e: &ParseIntError, token: &str, kind: FieldKind) -> CoerceError {
    match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CoerceError::range(token, kind),
        _ => CoerceError::parse(token, kind),
    }
}

/// Parse at full 64-bit width, then narrow.
fn parse_signed<T: TryFrom<i64>>(token: &str, kind: FieldKind) -> Result<T, CoerceError> {
    let wide: i64 = token.parse().map_err(|e| int_error(&e, token, kind))?;
    T::try_from(wide).map_err(|_| CoerceError::range(token, kind))
}

fn parse_unsigned<T: TryFrom<u64>>(token: &str, kind: FieldKind) -> Result<T, CoerceError> {
    let wide: u64 = token.parse().map_err(|e| int_error(&e, token, kind))?;
    T::try_from(wide).map_err(|_| CoerceError::range(token, kind))
}

/// Parse straight at the target precision, so the literal is rounded once.
///
/// Finite literals that overflow to infinity are range errors; spelled-out
/// infinities are accepted.
fn parse_float<T>(token: &str, kind: FieldKind) -> Result<T, CoerceError>
where
    T: FromStr + Copy + Into<f64>,
{
    let value: T = token.parse().map_err(|_| CoerceError::parse(token, kind))?;
    if value.into().is_infinite() && !is_infinity_literal(token) {
        return Err(CoerceError::range(token, kind));
    }
    Ok(value)
}

fn is_infinity_literal(token: &str) -> bool {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Boolean literal grammar: `1 t T TRUE true True` / `0 f F FALSE false False`.
fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_into_every_integer_width() {
        assert_eq!(coerce(FieldKind::I8, "1"), Ok(Scalar::I8(1)));
        assert_eq!(coerce(FieldKind::I16, "1"), Ok(Scalar::I16(1)));
        assert_eq!(coerce(FieldKind::I32, "1"), Ok(Scalar::I32(1)));
        assert_eq!(coerce(FieldKind::I64, "1"), Ok(Scalar::I64(1)));
        assert_eq!(coerce(FieldKind::Isize, "1"), Ok(Scalar::Isize(1)));
        assert_eq!(coerce(FieldKind::U8, "1"), Ok(Scalar::U8(1)));
        assert_eq!(coerce(FieldKind::U16, "1"), Ok(Scalar::U16(1)));
        assert_eq!(coerce(FieldKind::U32, "1"), Ok(Scalar::U32(1)));
        assert_eq!(coerce(FieldKind::U64, "1"), Ok(Scalar::U64(1)));
        assert_eq!(coerce(FieldKind::Usize, "1"), Ok(Scalar::Usize(1)));
    }

    #[test]
    fn integer_bounds_are_exact() {
        assert_eq!(coerce(FieldKind::I8, "-128"), Ok(Scalar::I8(-128)));
        assert_eq!(coerce(FieldKind::I8, "127"), Ok(Scalar::I8(127)));
        assert_eq!(coerce(FieldKind::U8, "255"), Ok(Scalar::U8(255)));
        assert_eq!(
            coerce(FieldKind::U64, "18446744073709551615"),
            Ok(Scalar::U64(u64::MAX))
        );
        assert_eq!(
            coerce(FieldKind::I64, "-9223372036854775808"),
            Ok(Scalar::I64(i64::MIN))
        );
    }

    #[test]
    fn integer_out_of_range() {
        assert_eq!(coerce(FieldKind::I8, "128"), Err(CoerceError::range("128", FieldKind::I8)));
        assert_eq!(
            coerce(FieldKind::U16, "65536"),
            Err(CoerceError::range("65536", FieldKind::U16))
        );
        assert_eq!(
            coerce(FieldKind::I64, "9223372036854775808"),
            Err(CoerceError::range("9223372036854775808", FieldKind::I64))
        );
        assert_eq!(
            coerce(FieldKind::U64, "18446744073709551616"),
            Err(CoerceError::range("18446744073709551616", FieldKind::U64))
        );
    }

    #[test]
    fn integer_parse_failures() {
        assert_eq!(coerce(FieldKind::I32, "abc"), Err(CoerceError::parse("abc", FieldKind::I32)));
        assert_eq!(coerce(FieldKind::I32, ""), Err(CoerceError::parse("", FieldKind::I32)));
        assert_eq!(coerce(FieldKind::I64, "1.0"), Err(CoerceError::parse("1.0", FieldKind::I64)));
        assert_eq!(coerce(FieldKind::U32, "-1"), Err(CoerceError::parse("-1", FieldKind::U32)));
        assert_eq!(coerce(FieldKind::I16, " 1"), Err(CoerceError::parse(" 1", FieldKind::I16)));
    }

    #[test]
    fn floats_at_both_precisions() {
        assert_eq!(coerce(FieldKind::F32, "2.0"), Ok(Scalar::F32(2.0)));
        assert_eq!(coerce(FieldKind::F64, "2.0"), Ok(Scalar::F64(2.0)));
        assert_eq!(coerce(FieldKind::F64, "-1.5e3"), Ok(Scalar::F64(-1500.0)));
        assert_eq!(coerce(FieldKind::F64, "7"), Ok(Scalar::F64(7.0)));
        assert_eq!(coerce(FieldKind::F64, "-inf"), Ok(Scalar::F64(f64::NEG_INFINITY)));
        assert_eq!(coerce(FieldKind::F32, "inf"), Ok(Scalar::F32(f32::INFINITY)));
    }

    #[test]
    fn f32_rounds_once_from_the_literal() {
        // Just above the midpoint between 1.0 and the next f32; through f64
        // it lands exactly on the midpoint and rounds down to 1.0.
        let token = "1.0000000596046447753906251";
        assert_eq!(coerce(FieldKind::F32, token), Ok(Scalar::F32(1.000_000_1)));
        assert_ne!(coerce(FieldKind::F32, token), Ok(Scalar::F32(1.0)));
    }

    #[test]
    fn float_failures() {
        assert_eq!(
            coerce(FieldKind::F64, "x1"),
            Err(CoerceError::parse("x1", FieldKind::F64))
        );
        assert_eq!(
            coerce(FieldKind::F64, "1e400"),
            Err(CoerceError::range("1e400", FieldKind::F64))
        );
        assert_eq!(
            coerce(FieldKind::F32, "1e39"),
            Err(CoerceError::range("1e39", FieldKind::F32))
        );
    }

    #[test]
    fn boolean_literals() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(coerce(FieldKind::Bool, t), Ok(Scalar::Bool(true)), "{t}");
        }
        for f in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(coerce(FieldKind::Bool, f), Ok(Scalar::Bool(false)), "{f}");
        }
        assert_eq!(
            coerce(FieldKind::Bool, "yes"),
            Err(CoerceError::parse("yes", FieldKind::Bool))
        );
        assert_eq!(
            coerce(FieldKind::Bool, "tRUE"),
            Err(CoerceError::parse("tRUE", FieldKind::Bool))
        );
    }

    #[test]
    fn strings_are_verbatim() {
        assert_eq!(coerce(FieldKind::Str, " some "), Ok(Scalar::Str(" some ".into())));
        assert_eq!(coerce(FieldKind::Str, ""), Ok(Scalar::Str(String::new())));
    }

    #[test]
    fn unsupported_kind_is_reported() {
        assert_eq!(
            coerce(FieldKind::Unsupported("Vec<u8>"), "1"),
            Err(CoerceError::Unsupported { type_name: "Vec<u8>" })
        );
    }

    #[test]
    fn null_never_errors() {
        for kind in [FieldKind::I8, FieldKind::F32, FieldKind::Bool, FieldKind::Unsupported("X")] {
            assert_eq!(coerce_cell(kind, &Cell::Null), Ok(None));
        }
        assert_eq!(coerce_cell(FieldKind::U8, &Cell::text("9")), Ok(Some(Scalar::U8(9))));
    }
}
