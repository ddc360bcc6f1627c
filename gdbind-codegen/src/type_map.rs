// Schema type → Rust type mapping.

use std::fmt;

use crate::error::{CodegenError, CodegenResult};
use crate::type_ref::{TypeRef, WidthMeta};

/// Selects the builtin size table and the default numeric widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildConfiguration {
    Float32,
    Float64,
    Double32,
    #[default]
    Double64,
}

impl BuildConfiguration {
    pub fn parse(name: &str) -> CodegenResult<Self> {
        Ok(match name {
            "float_32" => BuildConfiguration::Float32,
            "float_64" => BuildConfiguration::Float64,
            "double_32" => BuildConfiguration::Double32,
            "double_64" => BuildConfiguration::Double64,
            other => return Err(CodegenError::UnknownConfiguration(other.to_string())),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildConfiguration::Float32 => "float_32",
            BuildConfiguration::Float64 => "float_64",
            BuildConfiguration::Double32 => "double_32",
            BuildConfiguration::Double64 => "double_64",
        }
    }

    /// `*_32` → 32-bit default int, `*_64` → 64-bit; `float_*` → f32
    /// default float, `double_*` → f64.
    pub fn profile(self) -> WidthProfile {
        match self {
            BuildConfiguration::Float32 => WidthProfile { int: "i32", float: "f32" },
            BuildConfiguration::Float64 => WidthProfile { int: "i64", float: "f32" },
            BuildConfiguration::Double32 => WidthProfile { int: "i32", float: "f64" },
            BuildConfiguration::Double64 => WidthProfile { int: "i64", float: "f64" },
        }
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default widths for untyped `int` / `float` under one build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthProfile {
    pub int: &'static str,
    pub float: &'static str,
}

/// Where a type is being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    /// Engine class method argument or return.
    Classes,
    /// Named field of a struct-like builtin the member layout leaves unlisted;
    /// narrow widths.
    BuiltinField,
    /// Builtin constructor / operator / utility argument or return.
    Builtin,
}

/// Resolved Rust-side type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetType {
    Unit,
    Bool,
    Int(&'static str),
    Float(&'static str),
    Variant,
    /// Builtin value type, already renamed.
    Value(String),
    Object(String),
    Enum(String),
    Bitfield(String),
    Collection(Box<TargetType>),
    Pointer,
}

impl TargetType {
    /// Rust spelling of the type.
    pub fn rust_type(&self) -> String {
        match self {
            TargetType::Unit => "()".to_string(),
            TargetType::Bool => "bool".to_string(),
            TargetType::Int(t) | TargetType::Float(t) => t.to_string(),
            TargetType::Variant => "Variant".to_string(),
            TargetType::Value(n)
            | TargetType::Object(n)
            | TargetType::Enum(n)
            | TargetType::Bitfield(n) => n.clone(),
            TargetType::Collection(inner) => format!("GodotCollection<{}>", inner.rust_type()),
            TargetType::Pointer => "*mut std::ffi::c_void".to_string(),
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, TargetType::Unit)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rust_type())
    }
}

/// Legacy builtin names that would shadow Rust prelude types.
pub fn core_rename(name: &str) -> &str {
    match name {
        "String" => "GString",
        "Array" => "GArray",
        other => other,
    }
}

/// Rust name for an engine enum. The error-code and variant-type
/// enumerations resolve to one canonical type; other dotted names flatten.
pub fn enum_host_name(name: &str) -> String {
    match name {
        "Error" => "GodotError".to_string(),
        "Variant.Type" => "VariantType".to_string(),
        other => other.replace('.', ""),
    }
}

/// Map a schema type to its Rust type.
pub fn map_type(
    ty: &TypeRef,
    meta: Option<WidthMeta>,
    kind: MapKind,
    profile: WidthProfile,
) -> CodegenResult<TargetType> {
    Ok(match ty {
        TypeRef::Void => TargetType::Unit,
        TypeRef::Bool => TargetType::Bool,
        TypeRef::Int => match meta {
            Some(m) => match m.int_type() {
                Some(t) => TargetType::Int(t),
                None => return Err(mismatch(m, ty)),
            },
            None if kind == MapKind::BuiltinField => TargetType::Int("i32"),
            None => TargetType::Int(profile.int),
        },
        TypeRef::Float => {
            if let Some(m) = meta.filter(|m| m.int_type().is_some()) {
                return Err(mismatch(m, ty));
            }
            if kind == MapKind::BuiltinField {
                TargetType::Float("f32")
            } else {
                // Explicit float/double metas follow the profile.
                TargetType::Float(profile.float)
            }
        }
        TypeRef::Variant => TargetType::Variant,
        TypeRef::Core(name) => TargetType::Value(core_rename(name).to_string()),
        TypeRef::Object(name) => TargetType::Object(name.clone()),
        TypeRef::Enum(name) => TargetType::Enum(enum_host_name(name)),
        TypeRef::Bitfield(name) => TargetType::Bitfield(enum_host_name(name)),
        TypeRef::TypedArray(inner) => {
            TargetType::Collection(Box::new(map_type(inner, None, kind, profile)?))
        }
        TypeRef::Pointer(_) => TargetType::Pointer,
    })
}

fn mismatch(meta: WidthMeta, ty: &TypeRef) -> CodegenError {
    CodegenError::MetaMismatch {
        meta: meta.as_str().to_string(),
        ty: ty.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE: WidthProfile = WidthProfile { int: "i64", float: "f64" };

    #[test]
    fn int_widths_follow_meta_then_kind() {
        let m = |meta, kind| map_type(&TypeRef::Int, meta, kind, WIDE).unwrap();
        assert_eq!(m(Some(WidthMeta::Int32), MapKind::Classes), TargetType::Int("i32"));
        assert_eq!(m(Some(WidthMeta::Uint8), MapKind::BuiltinField), TargetType::Int("u8"));
        assert_eq!(m(None, MapKind::Classes), TargetType::Int("i64"));
        assert_eq!(m(None, MapKind::Builtin), TargetType::Int("i64"));
        assert_eq!(m(None, MapKind::BuiltinField), TargetType::Int("i32"));
    }

    #[test]
    fn floats_follow_profile_except_fields() {
        let narrow = BuildConfiguration::Float32.profile();
        let m = |meta, kind, p| map_type(&TypeRef::Float, meta, kind, p).unwrap();
        assert_eq!(m(None, MapKind::Classes, WIDE), TargetType::Float("f64"));
        assert_eq!(m(Some(WidthMeta::Float), MapKind::Classes, WIDE), TargetType::Float("f64"));
        assert_eq!(m(Some(WidthMeta::Double), MapKind::Builtin, narrow), TargetType::Float("f32"));
        assert_eq!(m(None, MapKind::BuiltinField, WIDE), TargetType::Float("f32"));
    }

    #[test]
    fn mismatched_metas_are_fatal() {
        assert!(matches!(
            map_type(&TypeRef::Int, Some(WidthMeta::Double), MapKind::Classes, WIDE),
            Err(CodegenError::MetaMismatch { .. })
        ));
        assert!(matches!(
            map_type(&TypeRef::Float, Some(WidthMeta::Int64), MapKind::Classes, WIDE),
            Err(CodegenError::MetaMismatch { .. })
        ));
    }

    #[test]
    fn names_are_renamed_and_canonicalized() {
        let m = |ty: TypeRef| map_type(&ty, None, MapKind::Classes, WIDE).unwrap().rust_type();
        assert_eq!(m(TypeRef::Core("String".into())), "GString");
        assert_eq!(m(TypeRef::Core("Array".into())), "GArray");
        assert_eq!(m(TypeRef::Core("Vector2".into())), "Vector2");
        assert_eq!(m(TypeRef::Enum("Error".into())), "GodotError");
        assert_eq!(m(TypeRef::Enum("Variant.Type".into())), "VariantType");
        assert_eq!(m(TypeRef::Enum("Node.ProcessMode".into())), "NodeProcessMode");
        assert_eq!(m(TypeRef::Bitfield("Control.SizeFlags".into())), "ControlSizeFlags");
        assert_eq!(m(TypeRef::Variant), "Variant");
        assert_eq!(
            m(TypeRef::TypedArray(Box::new(TypeRef::Core("String".into())))),
            "GodotCollection<GString>"
        );
        assert_eq!(m(TypeRef::Pointer("void*".into())), "*mut std::ffi::c_void");
    }

    #[test]
    fn mapping_is_total_over_non_fatal_inputs() {
        let all = [
            TypeRef::Void,
            TypeRef::Bool,
            TypeRef::Int,
            TypeRef::Float,
            TypeRef::Variant,
            TypeRef::Core("Vector3".into()),
            TypeRef::Object("Node".into()),
            TypeRef::Enum("Side".into()),
            TypeRef::Bitfield("KeyModifierMask".into()),
            TypeRef::TypedArray(Box::new(TypeRef::Int)),
            TypeRef::Pointer("const void*".into()),
        ];
        for config in [
            BuildConfiguration::Float32,
            BuildConfiguration::Float64,
            BuildConfiguration::Double32,
            BuildConfiguration::Double64,
        ] {
            for kind in [MapKind::Classes, MapKind::BuiltinField, MapKind::Builtin] {
                for ty in &all {
                    assert!(map_type(ty, None, kind, config.profile()).is_ok(), "{ty} {kind:?}");
                }
            }
        }
    }

    #[test]
    fn configuration_names_round_trip() {
        for name in ["float_32", "float_64", "double_32", "double_64"] {
            assert_eq!(BuildConfiguration::parse(name).unwrap().as_str(), name);
        }
        assert!(BuildConfiguration::parse("quad_128").is_err());
        assert_eq!(BuildConfiguration::Float64.profile(), WidthProfile { int: "i64", float: "f32" });
    }
}
