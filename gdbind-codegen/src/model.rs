// Validated definitions held by the registry. Built from `schema` types
// once; immutable afterwards.

use crate::type_ref::{TypeRef, WidthMeta};

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub parent: Option<String>,
    pub is_instantiable: bool,
    pub is_refcounted: bool,
    pub methods: Vec<MethodDef>,
    pub properties: Vec<PropertyDef>,
    pub enums: Vec<EnumDef>,
}

impl ClassDef {
    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Whether a method is a concrete ABI call or an overridable virtual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Bound { hash: i64 },
    Virtual,
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub arguments: Vec<ArgumentDef>,
    pub ret: Option<ReturnDef>,
    pub is_static: bool,
    pub is_vararg: bool,
    pub is_const: bool,
    pub kind: MethodKind,
}

impl MethodDef {
    pub fn is_virtual(&self) -> bool {
        self.kind == MethodKind::Virtual
    }

    pub fn hash(&self) -> Option<i64> {
        match self.kind {
            MethodKind::Bound { hash } => Some(hash),
            MethodKind::Virtual => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub name: String,
    pub ty: TypeRef,
    pub meta: Option<WidthMeta>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReturnDef {
    pub ty: TypeRef,
    pub meta: Option<WidthMeta>,
}

#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub getter: String,
    pub setter: Option<String>,
    pub index: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub is_bitfield: bool,
    pub values: Vec<(String, i64)>,
}

#[derive(Debug, Clone)]
pub struct BuiltinDef {
    pub name: String,
    /// Named fields, empty for opaque builtins.
    pub members: Vec<BuiltinMember>,
    pub constructors: Vec<ConstructorDef>,
    pub operators: Vec<OperatorDef>,
    pub enums: Vec<EnumDef>,
}

impl BuiltinDef {
    /// Struct-like builtins expose named fields and cross the ABI by value.
    pub fn is_struct(&self) -> bool {
        !self.members.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BuiltinMember {
    pub name: String,
    pub ty: TypeRef,
    /// Byte offset in the active build configuration, when the dump lists one.
    pub offset: Option<usize>,
    /// Numeric width of the field in the active build configuration.
    pub meta: Option<WidthMeta>,
}

#[derive(Debug, Clone)]
pub struct ConstructorDef {
    pub index: i32,
    pub arguments: Vec<ArgumentDef>,
}

#[derive(Debug, Clone)]
pub struct OperatorDef {
    pub symbol: String,
    /// Raw schema name of the right operand type; `None` for unary operators.
    pub right: Option<String>,
    pub ret: TypeRef,
}

#[derive(Debug, Clone)]
pub struct UtilityDef {
    pub name: String,
    pub category: String,
    pub ret: Option<TypeRef>,
    pub arguments: Vec<ArgumentDef>,
    pub is_vararg: bool,
    pub hash: i64,
}

#[derive(Debug, Clone)]
pub struct NativeStructDef {
    pub name: String,
    pub format: String,
}
