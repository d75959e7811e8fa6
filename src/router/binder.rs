//! Segment-to-field conversion.
//!
//! # Responsibilities
//! - Convert matched segment text into the declared kind of its field
//! - Enforce range and sign of the declared integer width
//! - Report failures with the destination name so they can be aggregated
//!
//! # Design Decisions
//! - Only two kinds are bindable: strings (identity copy) and the integer
//!   family. Everything else is rejected while preparing and never reaches
//!   this module
//! - Parsing is delegated to `FromStr` of the concrete width

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::Serialize;

use crate::router::error::ConversionError;

/// Width and signedness of an integer destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl IntKind {
    pub fn name(&self) -> &'static str {
        match self {
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::Isize => "isize",
            IntKind::U8 => "u8",
            IntKind::U16 => "u16",
            IntKind::U32 => "u32",
            IntKind::U64 => "u64",
            IntKind::Usize => "usize",
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IntKind::I8 | IntKind::I16 | IntKind::I32 | IntKind::I64 | IntKind::Isize
        )
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "i8" => IntKind::I8,
            "i16" => IntKind::I16,
            "i32" => IntKind::I32,
            "i64" => IntKind::I64,
            "isize" => IntKind::Isize,
            "u8" => IntKind::U8,
            "u16" => IntKind::U16,
            "u32" => IntKind::U32,
            "u64" => IntKind::U64,
            "usize" => IntKind::Usize,
            _ => return None,
        };
        Some(kind)
    }
}

/// Semantic kind of a parameter record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer(IntKind),
    /// Declared but not bindable from a path segment.
    Unsupported(String),
}

impl FieldKind {
    /// Parse a kind name as used in route files.
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" | "str" | "String" => FieldKind::String,
            other => IntKind::from_name(other)
                .map(FieldKind::Integer)
                .unwrap_or_else(|| FieldKind::Unsupported(other.to_string())),
        }
    }

    pub fn is_bindable(&self) -> bool {
        !matches!(self, FieldKind::Unsupported(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "string"),
            FieldKind::Integer(kind) => write!(f, "{}", kind.name()),
            FieldKind::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// Integer types a segment can be bound to.
pub trait Integer: FromStr<Err = ParseIntError> + Copy + Send + Sync + 'static {
    const KIND: IntKind;
}

macro_rules! integer_kinds {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl Integer for $ty {
            const KIND: IntKind = IntKind::$kind;
        })*
    };
}

integer_kinds! {
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
}

/// Parse `text` as the integer width `T`.
pub fn parse_integer<T: Integer>(name: &str, text: &str) -> Result<T, ConversionError> {
    text.parse::<T>().map_err(|e| ConversionError {
        name: name.to_string(),
        value: text.to_string(),
        expected: T::KIND.name(),
        reason: e.to_string(),
    })
}

/// A converted segment value of a runtime-declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Signed(i64),
    Unsigned(u64),
}

impl ParamValue {
    /// Zero value of a field kind.
    pub fn zero(kind: &FieldKind) -> Option<Self> {
        match kind {
            FieldKind::String => Some(ParamValue::Str(String::new())),
            FieldKind::Integer(int) if int.is_signed() => Some(ParamValue::Signed(0)),
            FieldKind::Integer(_) => Some(ParamValue::Unsigned(0)),
            FieldKind::Unsupported(_) => None,
        }
    }
}

/// Convert `text` into a value of `kind`, honoring the declared width.
pub fn convert(name: &str, kind: &FieldKind, text: &str) -> Result<ParamValue, ConversionError> {
    let int = match kind {
        FieldKind::String => return Ok(ParamValue::Str(text.to_string())),
        FieldKind::Integer(int) => *int,
        FieldKind::Unsupported(other) => {
            return Err(ConversionError {
                name: name.to_string(),
                value: text.to_string(),
                expected: "string or integer",
                reason: format!("unsupported field kind {}", other),
            })
        }
    };

    let value = match int {
        IntKind::I8 => ParamValue::Signed(parse_integer::<i8>(name, text)?.into()),
        IntKind::I16 => ParamValue::Signed(parse_integer::<i16>(name, text)?.into()),
        IntKind::I32 => ParamValue::Signed(parse_integer::<i32>(name, text)?.into()),
        IntKind::I64 => ParamValue::Signed(parse_integer::<i64>(name, text)?),
        IntKind::Isize => ParamValue::Signed(parse_integer::<isize>(name, text)? as i64),
        IntKind::U8 => ParamValue::Unsigned(parse_integer::<u8>(name, text)?.into()),
        IntKind::U16 => ParamValue::Unsigned(parse_integer::<u16>(name, text)?.into()),
        IntKind::U32 => ParamValue::Unsigned(parse_integer::<u32>(name, text)?.into()),
        IntKind::U64 => ParamValue::Unsigned(parse_integer::<u64>(name, text)?),
        IntKind::Usize => ParamValue::Unsigned(parse_integer::<usize>(name, text)? as u64),
    };
    Ok(value)
}
