// JSON schema types matching the engine's extension_api.json dump.

#![allow(dead_code)] // Some fields are deserialized for completeness only.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ApiFile {
    #[serde(default)]
    pub header: Option<ApiHeader>,
    #[serde(default)]
    pub builtin_class_sizes: Vec<BuiltinSizeTable>,
    #[serde(default)]
    pub builtin_class_member_offsets: Vec<MemberOffsetTable>,
    #[serde(default)]
    pub global_enums: Vec<EnumInfo>,
    #[serde(default)]
    pub utility_functions: Vec<UtilityFunctionInfo>,
    #[serde(default)]
    pub builtin_classes: Vec<BuiltinClassInfo>,
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
    #[serde(default)]
    pub singletons: Vec<SingletonInfo>,
    #[serde(default)]
    pub native_structures: Vec<NativeStructureInfo>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiHeader {
    pub version_major: u32,
    pub version_minor: u32,
    pub version_patch: u32,
    #[serde(default)]
    pub version_full_name: String,
}

// ---------------------------------------------------------------------------
// Sizes and layouts
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct BuiltinSizeTable {
    pub build_configuration: String,
    pub sizes: Vec<BuiltinSize>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BuiltinSize {
    pub name: String,
    pub size: usize,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MemberOffsetTable {
    pub build_configuration: String,
    pub classes: Vec<MemberOffsetClass>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MemberOffsetClass {
    pub name: String,
    pub members: Vec<MemberOffset>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MemberOffset {
    pub member: String,
    pub offset: usize,
    #[serde(default)]
    pub meta: Option<String>,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct EnumInfo {
    pub name: String,
    #[serde(default)]
    pub is_bitfield: bool,
    #[serde(default)]
    pub values: Vec<EnumValueInfo>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EnumValueInfo {
    pub name: String,
    pub value: i64,
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct ArgumentInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub meta: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ReturnInfo {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub meta: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_vararg: bool,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub hash: Option<i64>,
    #[serde(default)]
    pub return_value: Option<ReturnInfo>,
    #[serde(default)]
    pub arguments: Vec<ArgumentInfo>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UtilityFunctionInfo {
    pub name: String,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_vararg: bool,
    pub hash: i64,
    #[serde(default)]
    pub arguments: Vec<ArgumentInfo>,
}

// ---------------------------------------------------------------------------
// Builtin value types
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct BuiltinClassInfo {
    pub name: String,
    #[serde(default)]
    pub indexing_return_type: Option<String>,
    #[serde(default)]
    pub is_keyed: bool,
    #[serde(default)]
    pub members: Vec<BuiltinMemberInfo>,
    #[serde(default)]
    pub constants: Vec<BuiltinConstantInfo>,
    #[serde(default)]
    pub enums: Vec<EnumInfo>,
    #[serde(default)]
    pub operators: Vec<OperatorInfo>,
    #[serde(default)]
    pub constructors: Vec<ConstructorInfo>,
    #[serde(default)]
    pub has_destructor: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BuiltinMemberInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BuiltinConstantInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OperatorInfo {
    pub name: String,
    #[serde(default)]
    pub right_type: Option<String>,
    pub return_type: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ConstructorInfo {
    pub index: i32,
    #[serde(default)]
    pub arguments: Vec<ArgumentInfo>,
}

// ---------------------------------------------------------------------------
// Engine classes
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub is_refcounted: bool,
    #[serde(default)]
    pub is_instantiable: bool,
    #[serde(default)]
    pub inherits: Option<String>,
    #[serde(default)]
    pub api_type: Option<String>,
    #[serde(default)]
    pub enums: Vec<EnumInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PropertyInfo {
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
    #[serde(default)]
    pub getter: String,
    #[serde(default)]
    pub setter: Option<String>,
    #[serde(default)]
    pub index: Option<i64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SingletonInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NativeStructureInfo {
    pub name: String,
    pub format: String,
}
