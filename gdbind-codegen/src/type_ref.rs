// Schema type descriptors, parsed once at load into a closed union so every
// downstream stage matches exhaustively instead of re-reading string prefixes.

use std::collections::HashSet;
use std::fmt;

use crate::error::{CodegenError, CodegenResult};

/// Explicit numeric width attached to an `int` or `float` in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidthMeta {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    /// Unicode scalar carried in an int slot.
    Char32,
    Float,
    Double,
}

impl WidthMeta {
    pub fn parse(meta: &str, context: &str) -> CodegenResult<Self> {
        Ok(match meta {
            "int8" => WidthMeta::Int8,
            "int16" => WidthMeta::Int16,
            "int32" => WidthMeta::Int32,
            "int64" => WidthMeta::Int64,
            "uint8" => WidthMeta::Uint8,
            "uint16" => WidthMeta::Uint16,
            "uint32" => WidthMeta::Uint32,
            "uint64" => WidthMeta::Uint64,
            "char32" => WidthMeta::Char32,
            "float" => WidthMeta::Float,
            "double" => WidthMeta::Double,
            other => {
                return Err(CodegenError::UnknownMeta {
                    meta: other.to_string(),
                    context: context.to_string(),
                });
            }
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WidthMeta::Int8 => "int8",
            WidthMeta::Int16 => "int16",
            WidthMeta::Int32 => "int32",
            WidthMeta::Int64 => "int64",
            WidthMeta::Uint8 => "uint8",
            WidthMeta::Uint16 => "uint16",
            WidthMeta::Uint32 => "uint32",
            WidthMeta::Uint64 => "uint64",
            WidthMeta::Char32 => "char32",
            WidthMeta::Float => "float",
            WidthMeta::Double => "double",
        }
    }

    /// Exact Rust integer for integer metas, `None` for float metas.
    pub fn int_type(self) -> Option<&'static str> {
        match self {
            WidthMeta::Int8 => Some("i8"),
            WidthMeta::Int16 => Some("i16"),
            WidthMeta::Int32 => Some("i32"),
            WidthMeta::Int64 => Some("i64"),
            WidthMeta::Uint8 => Some("u8"),
            WidthMeta::Uint16 => Some("u16"),
            WidthMeta::Uint32 | WidthMeta::Char32 => Some("u32"),
            WidthMeta::Uint64 => Some("u64"),
            WidthMeta::Float | WidthMeta::Double => None,
        }
    }
}

/// A schema type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Void,
    Bool,
    Int,
    Float,
    /// `Variant` or `Nil`.
    Variant,
    /// Fixed-layout builtin value type (Vector2, String, Dictionary, ...).
    Core(String),
    /// Engine class, passed as an opaque handle.
    Object(String),
    Enum(String),
    Bitfield(String),
    TypedArray(Box<TypeRef>),
    /// Raw C pointer descriptor such as `const uint8_t*`.
    Pointer(String),
}

/// Names the parser needs to classify bare identifiers.
pub struct TypeNames<'a> {
    pub core: &'a HashSet<String>,
    pub classes: &'a HashSet<String>,
}

impl TypeRef {
    /// Parse a raw schema type string. `context` names the referencing member
    /// for error messages.
    pub fn parse(raw: &str, names: &TypeNames<'_>, context: &str) -> CodegenResult<TypeRef> {
        let raw = raw.trim();
        // Only raw C descriptors end in `*`; collection names never do.
        if raw.ends_with('*') {
            return Ok(TypeRef::Pointer(raw.to_string()));
        }
        if let Some(name) = raw.strip_prefix("enum::") {
            return Ok(TypeRef::Enum(name.to_string()));
        }
        if let Some(name) = raw.strip_prefix("bitfield::") {
            return Ok(TypeRef::Bitfield(name.to_string()));
        }
        if let Some(inner) = raw.strip_prefix("typedarray::") {
            let inner = TypeRef::parse(inner, names, context)?;
            return Ok(TypeRef::TypedArray(Box::new(inner)));
        }
        // Typed dictionaries cross the ABI exactly like plain ones.
        if raw.starts_with("typeddictionary::") {
            return Ok(TypeRef::Core("Dictionary".to_string()));
        }
        Ok(match raw {
            "void" | "" => TypeRef::Void,
            "bool" => TypeRef::Bool,
            "int" => TypeRef::Int,
            "float" | "real" => TypeRef::Float,
            "Nil" | "Variant" => TypeRef::Variant,
            name if names.core.contains(name) => TypeRef::Core(name.to_string()),
            name if names.classes.contains(name) => TypeRef::Object(name.to_string()),
            name => {
                return Err(CodegenError::UnknownType {
                    name: name.to_string(),
                    context: context.to_string(),
                });
            }
        })
    }

    /// True if a raw pointer descriptor appears anywhere in this type.
    pub fn contains_pointer(&self) -> bool {
        match self {
            TypeRef::Pointer(_) => true,
            TypeRef::TypedArray(inner) => inner.contains_pointer(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeRef::Int | TypeRef::Float)
    }
}

impl fmt::Display for TypeRef {
    /// Renders the schema spelling back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str("void"),
            TypeRef::Bool => f.write_str("bool"),
            TypeRef::Int => f.write_str("int"),
            TypeRef::Float => f.write_str("float"),
            TypeRef::Variant => f.write_str("Variant"),
            TypeRef::Core(n) | TypeRef::Object(n) | TypeRef::Pointer(n) => f.write_str(n),
            TypeRef::Enum(n) => write!(f, "enum::{n}"),
            TypeRef::Bitfield(n) => write!(f, "bitfield::{n}"),
            TypeRef::TypedArray(inner) => write!(f, "typedarray::{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets() -> (HashSet<String>, HashSet<String>) {
        let core = ["Vector2", "String", "Array", "Dictionary"]
            .into_iter()
            .map(String::from)
            .collect();
        let classes = ["Object", "Node"].into_iter().map(String::from).collect();
        (core, classes)
    }

    #[test]
    fn parses_every_variant() {
        let (core, classes) = sets();
        let names = TypeNames { core: &core, classes: &classes };
        let p = |s: &str| TypeRef::parse(s, &names, "test").unwrap();
        assert_eq!(p("void"), TypeRef::Void);
        assert_eq!(p("bool"), TypeRef::Bool);
        assert_eq!(p("int"), TypeRef::Int);
        assert_eq!(p("real"), TypeRef::Float);
        assert_eq!(p("Nil"), TypeRef::Variant);
        assert_eq!(p("Vector2"), TypeRef::Core("Vector2".into()));
        assert_eq!(p("Node"), TypeRef::Object("Node".into()));
        assert_eq!(p("enum::Node.ProcessMode"), TypeRef::Enum("Node.ProcessMode".into()));
        assert_eq!(p("bitfield::MethodFlags"), TypeRef::Bitfield("MethodFlags".into()));
        assert_eq!(
            p("typedarray::Node"),
            TypeRef::TypedArray(Box::new(TypeRef::Object("Node".into())))
        );
        assert_eq!(p("const uint8_t **"), TypeRef::Pointer("const uint8_t **".into()));
        assert_eq!(p("typeddictionary::String;int"), TypeRef::Core("Dictionary".into()));
    }

    #[test]
    fn unknown_names_are_fatal() {
        let (core, classes) = sets();
        let names = TypeNames { core: &core, classes: &classes };
        let err = TypeRef::parse("Frobnicator", &names, "Foo.bar").unwrap_err();
        assert!(matches!(err, CodegenError::UnknownType { ref name, .. } if name == "Frobnicator"));
        let err = TypeRef::parse("typedarray::Nope", &names, "Foo.bar").unwrap_err();
        assert!(matches!(err, CodegenError::UnknownType { .. }));
    }

    #[test]
    fn pointer_detection_ignores_collection_names() {
        let (core, classes) = sets();
        let names = TypeNames { core: &core, classes: &classes };
        let arr = TypeRef::parse("typedarray::Vector2", &names, "t").unwrap();
        assert!(!arr.contains_pointer());
        let ptr = TypeRef::parse("AudioFrame*", &names, "t").unwrap();
        assert!(ptr.contains_pointer());
        assert_eq!(ptr.to_string(), "AudioFrame*");
        assert_eq!(arr.to_string(), "typedarray::Vector2");
    }

    #[test]
    fn width_meta_is_a_closed_set() {
        assert_eq!(WidthMeta::parse("int32", "t").unwrap().int_type(), Some("i32"));
        assert_eq!(WidthMeta::parse("double", "t").unwrap().int_type(), None);
        assert!(matches!(
            WidthMeta::parse("int128", "t"),
            Err(CodegenError::UnknownMeta { .. })
        ));
    }
}
