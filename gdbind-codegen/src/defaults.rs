// Zero-value construction recipes and default-argument literals.

use std::fmt;

use crate::model::ArgumentDef;
use crate::type_map::TargetType;

/// Canonical zero value for a mapped type. `Display` renders the Rust
/// expression that builds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Unit,
    False,
    Int(&'static str),
    Float(&'static str),
    /// A documented zero member (`GodotError::OK`, `VariantType::TYPE_NIL`).
    EnumMember { ty: String, member: &'static str },
    /// Zero ordinal of an ordinary enum.
    EnumZero(String),
    EmptyFlags(String),
    /// `T::default()`: all-zero storage for builtins and Variant.
    Empty(String),
    /// Placeholder object wrapper that bypasses registration.
    Placeholder(String),
    Null,
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Unit => f.write_str("()"),
            DefaultValue::False => f.write_str("false"),
            DefaultValue::Int(t) => write!(f, "0{t}"),
            DefaultValue::Float(t) => write!(f, "0.0{t}"),
            DefaultValue::EnumMember { ty, member } => write!(f, "{ty}::{member}"),
            DefaultValue::EnumZero(ty) => write!(f, "{ty}(0)"),
            DefaultValue::EmptyFlags(ty) => write!(f, "{ty}::empty()"),
            DefaultValue::Empty(ty) => write!(f, "<{ty}>::default()"),
            DefaultValue::Placeholder(ty) => write!(f, "{ty}::fast()"),
            DefaultValue::Null => f.write_str("std::ptr::null_mut()"),
        }
    }
}

pub fn default_value(ty: &TargetType) -> DefaultValue {
    match ty {
        TargetType::Unit => DefaultValue::Unit,
        TargetType::Bool => DefaultValue::False,
        TargetType::Int(t) => DefaultValue::Int(*t),
        TargetType::Float(t) => DefaultValue::Float(*t),
        TargetType::Enum(name) if name == "GodotError" => DefaultValue::EnumMember {
            ty: name.clone(),
            member: "OK",
        },
        TargetType::Enum(name) if name == "VariantType" => DefaultValue::EnumMember {
            ty: name.clone(),
            member: "TYPE_NIL",
        },
        TargetType::Enum(name) => DefaultValue::EnumZero(name.clone()),
        TargetType::Bitfield(name) => DefaultValue::EmptyFlags(name.clone()),
        TargetType::Variant | TargetType::Value(_) | TargetType::Collection(_) => {
            DefaultValue::Empty(ty.rust_type())
        }
        TargetType::Object(name) => DefaultValue::Placeholder(name.clone()),
        TargetType::Pointer => DefaultValue::Null,
    }
}

/// Parse a schema default-argument literal into a Rust expression.
/// Returns None when the literal can't be expressed (the argument stays
/// required).
pub fn parse_default_literal(arg: &ArgumentDef, ty: &TargetType) -> Option<String> {
    let s = arg.default_value.as_deref()?.trim();
    match ty {
        TargetType::Bool => parse_bool_default(s),
        TargetType::Int(suffix) => parse_int_default(s, suffix),
        TargetType::Float(suffix) => parse_float_default(s, suffix),
        TargetType::Enum(name) => {
            let v: i64 = s.parse().ok()?;
            Some(format!("{name}({v})"))
        }
        TargetType::Bitfield(name) => {
            let v: u64 = s.parse().ok()?;
            Some(format!("{name}({v})"))
        }
        _ => None,
    }
}

fn parse_bool_default(s: &str) -> Option<String> {
    match s {
        "true" => Some("true".into()),
        "false" => Some("false".into()),
        _ => None,
    }
}

fn parse_float_default(s: &str, suffix: &str) -> Option<String> {
    let v: f64 = s.parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    if s.contains('.') || s.contains('e') {
        Some(format!("{s}{suffix}"))
    } else {
        Some(format!("{s}.0{suffix}"))
    }
}

fn parse_int_default(s: &str, suffix: &str) -> Option<String> {
    let _: i128 = s.parse().ok()?;
    Some(format!("{s}{suffix}"))
}
