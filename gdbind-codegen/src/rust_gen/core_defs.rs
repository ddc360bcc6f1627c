// Core definitions artifact: everything generated from the registry alone
// (global enums, builtin value types, typed collections, constructor and
// operator tables, utility functions, native structures).

use std::collections::HashSet;

use crate::diag::{Diagnostic, SkipReason};
use crate::error::{CodegenError, CodegenResult};
use crate::identity::CallIdentity;
use crate::model::{BuiltinDef, BuiltinMember, ConstructorDef, NativeStructDef, ReturnDef, UtilityDef};
use crate::naming::{escape_reserved, sanitize_ident, to_snake_case};
use crate::plan::methods::{ArgPass, plan_arg, plan_ret, trim_defaults};
use crate::registry::Registry;
use crate::type_map::{MapKind, TargetType, core_rename, map_type};
use crate::type_ref::{TypeRef, WidthMeta};

use super::enums::generate_enum;
use super::methods::{marshal_args, param_list, ret_storage};

/// Engine variant type ordinals, by schema builtin name.
const TYPECODES: &[(&str, u32)] = &[
    ("Nil", 0),
    ("bool", 1),
    ("int", 2),
    ("float", 3),
    ("String", 4),
    ("Vector2", 5),
    ("Vector2i", 6),
    ("Rect2", 7),
    ("Rect2i", 8),
    ("Vector3", 9),
    ("Vector3i", 10),
    ("Transform2D", 11),
    ("Vector4", 12),
    ("Vector4i", 13),
    ("Plane", 14),
    ("Quaternion", 15),
    ("AABB", 16),
    ("Basis", 17),
    ("Transform3D", 18),
    ("Projection", 19),
    ("Color", 20),
    ("StringName", 21),
    ("NodePath", 22),
    ("RID", 23),
    ("Object", 24),
    ("Callable", 25),
    ("Signal", 26),
    ("Dictionary", 27),
    ("Array", 28),
    ("PackedByteArray", 29),
    ("PackedInt32Array", 30),
    ("PackedInt64Array", 31),
    ("PackedFloat32Array", 32),
    ("PackedFloat64Array", 33),
    ("PackedStringArray", 34),
    ("PackedVector2Array", 35),
    ("PackedVector3Array", 36),
    ("PackedColorArray", 37),
    ("PackedVector4Array", 38),
];

/// Engine operator ordinals: (schema symbol, ordinal, name used in the table).
const OPERATORS: &[(&str, u32, &str)] = &[
    ("==", 0, "equal"),
    ("!=", 1, "not_equal"),
    ("<", 2, "less"),
    ("<=", 3, "less_equal"),
    (">", 4, "greater"),
    (">=", 5, "greater_equal"),
    ("+", 6, "add"),
    ("-", 7, "subtract"),
    ("*", 8, "multiply"),
    ("/", 9, "divide"),
    ("unary-", 10, "negate"),
    ("unary+", 11, "positive"),
    ("%", 12, "module"),
    ("**", 13, "power"),
    ("<<", 14, "shift_left"),
    (">>", 15, "shift_right"),
    ("&", 16, "bit_and"),
    ("|", 17, "bit_or"),
    ("^", 18, "bit_xor"),
    ("~", 19, "bit_negate"),
    ("and", 20, "and"),
    ("or", 21, "or"),
    ("xor", 22, "xor"),
    ("not", 23, "not"),
    ("in", 24, "in"),
];

pub fn builtin_typecode(name: &str) -> CodegenResult<u32> {
    TYPECODES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
        .ok_or_else(|| CodegenError::UnknownBuiltinTypecode {
            name: name.to_string(),
        })
}

pub fn operator_code(symbol: &str, owner: &str) -> CodegenResult<(u32, &'static str)> {
    OPERATORS
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(_, code, label)| (*code, *label))
        .ok_or_else(|| CodegenError::UnknownOperator {
            symbol: symbol.to_string(),
            owner: owner.to_string(),
        })
}

/// Render the core artifact body. Recoverable skips come back alongside it.
pub fn generate_core_defs(reg: &Registry) -> CodegenResult<(String, Vec<Diagnostic>)> {
    let mut out = String::with_capacity(64 * 1024);
    let mut diagnostics = Vec::new();

    out.push_str("// ---- Global enums ----\n\n");
    for e in reg.global_enums() {
        out.push_str(&generate_enum(e, None));
        out.push('\n');
    }

    out.push_str("// ---- Builtin value types ----\n\n");
    generate_variant(&mut out, reg)?;
    for builtin in reg.builtins() {
        if builtin.is_struct() {
            generate_struct_builtin(&mut out, builtin, reg)?;
        } else {
            generate_opaque_builtin(&mut out, builtin, reg)?;
        }
        for e in &builtin.enums {
            out.push_str(&generate_enum(e, Some(&builtin.name)));
            out.push('\n');
        }
        generate_constructors(&mut out, builtin, reg, &mut diagnostics)?;
    }
    generate_collection(&mut out, reg)?;

    out.push_str("// ---- Operator evaluators ----\n\n");
    generate_operators(&mut out, reg, &mut diagnostics)?;

    out.push_str("// ---- Utility functions ----\n\n");
    generate_utilities(&mut out, reg, &mut diagnostics)?;

    out.push_str("// ---- Native structures ----\n\n");
    for native in reg.native_structs() {
        match generate_native_struct(native, reg) {
            Ok(code) => out.push_str(&code),
            Err(reason) => diagnostics.push(Diagnostic::new(&native.name, "format", reason)),
        }
    }

    Ok((out, diagnostics))
}

fn generate_variant(out: &mut String, reg: &Registry) -> CodegenResult<()> {
    let size = reg.require_byte_size("Variant")?;
    generate_opaque_wrapper(out, "Variant", size);
    Ok(())
}

fn generate_opaque_builtin(out: &mut String, builtin: &BuiltinDef, reg: &Registry) -> CodegenResult<()> {
    let size = reg.require_byte_size(&builtin.name)?;
    generate_opaque_wrapper(out, core_rename(&builtin.name), size);
    Ok(())
}

/// Opaque builtins wrap their sized, engine-owned content.
fn generate_opaque_wrapper(out: &mut String, name: &str, size: usize) {
    out.push_str(&format!(
        "#[repr(transparent)]\n\
         #[derive(Debug, Default)]\n\
         pub struct {name}(gdbind_abi::OpaqueStorage<{size}>);\n\n\
         impl {name} {{\n\
         \x20   pub const SIZE: usize = {size};\n\n\
         \x20   pub fn as_ptr(&self) -> *const std::ffi::c_void {{\n\
         \x20       self.0.as_ptr()\n\
         \x20   }}\n\n\
         \x20   pub fn as_mut_ptr(&mut self) -> *mut std::ffi::c_void {{\n\
         \x20       self.0.as_mut_ptr()\n\
         \x20   }}\n\
         }}\n\n\
         unsafe impl gdbind_abi::SlotValue for {name} {{\n\
         \x20   const SIZE: usize = {size};\n\n\
         \x20   unsafe fn read_from(src: *const u8) -> Self {{\n\
         \x20       {name}(unsafe {{ gdbind_abi::SlotValue::read_from(src) }})\n\
         \x20   }}\n\n\
         \x20   unsafe fn write_to(&self, dst: *mut u8) {{\n\
         \x20       unsafe {{ gdbind_abi::SlotValue::write_to(&self.0, dst) }}\n\
         \x20   }}\n\
         }}\n\n"
    ));
}

fn generate_struct_builtin(out: &mut String, builtin: &BuiltinDef, reg: &Registry) -> CodegenResult<()> {
    let name = &builtin.name;
    let declared = reg.require_byte_size(name)?;
    let (fields, layout) = struct_layout(builtin, reg)?;
    check_layout(builtin, &layout, declared, reg)?;

    out.push_str(&format!(
        "#[repr(C)]\n\
         #[derive(Debug, Clone, Copy, PartialEq, Default)]\n\
         pub struct {name} {{\n"
    ));
    for (member, ty) in builtin.members.iter().zip(&fields) {
        out.push_str(&format!("    pub {}: {},\n", sanitize_ident(&member.name), ty.rust_type()));
    }
    out.push_str(&format!(
        "}}\n\n\
         const _: () = assert!(std::mem::size_of::<{name}>() == {declared});\n\n\
         unsafe impl gdbind_abi::SlotValue for {name} {{\n\
         \x20   const SIZE: usize = {declared};\n\n\
         \x20   unsafe fn read_from(src: *const u8) -> Self {{\n\
         \x20       unsafe {{ (src as *const {name}).read_unaligned() }}\n\
         \x20   }}\n\n\
         \x20   unsafe fn write_to(&self, dst: *mut u8) {{\n\
         \x20       unsafe {{ (dst as *mut {name}).write_unaligned(*self) }}\n\
         \x20   }}\n\
         }}\n\n"
    ));
    Ok(())
}

/// Field type of a struct builtin member. The per-configuration member
/// layout decides real widths; members it does not list keep the narrow
/// field widths.
pub(crate) fn field_type(member: &BuiltinMember, reg: &Registry) -> CodegenResult<TargetType> {
    Ok(match (&member.ty, member.meta) {
        (TypeRef::Float, Some(WidthMeta::Double)) => TargetType::Float("f64"),
        (TypeRef::Float, Some(WidthMeta::Float)) => TargetType::Float("f32"),
        (TypeRef::Int, Some(meta)) if meta.int_type().is_some() => {
            map_type(&member.ty, Some(meta), MapKind::BuiltinField, reg.profile())?
        }
        _ => map_type(&member.ty, None, MapKind::BuiltinField, reg.profile())?,
    })
}

/// `repr(C)` placement of one struct builtin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StructLayout {
    pub offsets: Vec<usize>,
    pub size: usize,
    pub align: usize,
}

pub(crate) fn struct_layout(builtin: &BuiltinDef, reg: &Registry) -> CodegenResult<(Vec<TargetType>, StructLayout)> {
    let mut fields = Vec::with_capacity(builtin.members.len());
    let mut offsets = Vec::with_capacity(builtin.members.len());
    let (mut cursor, mut align) = (0usize, 1usize);
    for member in &builtin.members {
        let ty = field_type(member, reg)?;
        let (size, field_align) = field_extent(&ty, builtin, reg)?;
        cursor = cursor.next_multiple_of(field_align);
        offsets.push(cursor);
        cursor += size;
        align = align.max(field_align);
        fields.push(ty);
    }
    let size = cursor.next_multiple_of(align);
    Ok((fields, StructLayout { offsets, size, align }))
}

/// Size and alignment of one emitted field.
fn field_extent(ty: &TargetType, owner: &BuiltinDef, reg: &Registry) -> CodegenResult<(usize, usize)> {
    let width = match ty {
        TargetType::Bool => 1,
        TargetType::Int(t) | TargetType::Float(t) => match *t {
            "i8" | "u8" => 1,
            "i16" | "u16" => 2,
            "i32" | "u32" | "f32" => 4,
            _ => 8,
        },
        TargetType::Value(name) => match reg.lookup_builtin(name) {
            Some(nested) if nested.is_struct() && nested.name != owner.name => {
                let (_, layout) = struct_layout(nested, reg)?;
                return Ok((layout.size, layout.align));
            }
            _ => return Ok((reg.require_byte_size(name)?, 8)),
        },
        other => {
            return Err(CodegenError::UnknownType {
                name: other.rust_type(),
                context: format!("{} member layout", owner.name),
            });
        }
    };
    Ok((width, width))
}

fn check_layout(builtin: &BuiltinDef, layout: &StructLayout, declared: usize, reg: &Registry) -> CodegenResult<()> {
    let mismatch = |what: String, declared: usize, emitted: usize| CodegenError::BuiltinLayoutMismatch {
        name: builtin.name.clone(),
        configuration: reg.configuration().to_string(),
        what,
        declared,
        emitted,
    };
    for (member, &emitted) in builtin.members.iter().zip(&layout.offsets) {
        if let Some(offset) = member.offset.filter(|&o| o != emitted) {
            return Err(mismatch(format!("offset of `{}`", member.name), offset, emitted));
        }
    }
    if layout.size != declared {
        return Err(mismatch("size".to_string(), declared, layout.size));
    }
    Ok(())
}

/// Suffix naming a constructor: argument type for one-argument
/// constructors, argument names otherwise.
fn constructor_name(ctor: &ConstructorDef) -> String {
    match ctor.arguments.as_slice() {
        [only] => format!("from_{}", to_snake_case(&only.ty.to_string().replace("::", "_"))),
        args => {
            let names: Vec<String> = args.iter().map(|a| to_snake_case(&a.name)).collect();
            format!("from_{}", names.join("_"))
        }
    }
}

fn generate_constructors(
    out: &mut String,
    builtin: &BuiltinDef,
    reg: &Registry,
    diagnostics: &mut Vec<Diagnostic>,
) -> CodegenResult<()> {
    // The zero-argument constructor is the all-zero image (`Default`).
    let ctors: Vec<&ConstructorDef> = builtin.constructors.iter().filter(|c| !c.arguments.is_empty()).collect();
    if ctors.is_empty() {
        return Ok(());
    }
    let typecode = builtin_typecode(&builtin.name)?;
    let self_ty = if builtin.is_struct() {
        builtin.name.clone()
    } else {
        core_rename(&builtin.name).to_string()
    };
    let ret_ptr = if builtin.is_struct() {
        format!("(&mut ret as *mut {self_ty}).cast()")
    } else {
        "ret.as_mut_ptr()".to_string()
    };

    let mut taken = HashSet::new();
    let mut conversions = String::new();
    out.push_str(&format!("impl {self_ty} {{\n"));
    for ctor in ctors {
        if ctor.arguments.iter().any(|a| a.ty.contains_pointer()) {
            diagnostics.push(Diagnostic::new(
                &builtin.name,
                &format!("constructor #{}", ctor.index),
                SkipReason::RawPointer,
            ));
            continue;
        }
        let mut args = ctor
            .arguments
            .iter()
            .map(|a| plan_arg(a, MapKind::Builtin, reg))
            .collect::<CodegenResult<Vec<_>>>()?;
        trim_defaults(&mut args);

        let mut fn_name = constructor_name(ctor);
        if !taken.insert(fn_name.clone()) {
            fn_name = format!("{fn_name}_{}", ctor.index);
            taken.insert(fn_name.clone());
        }
        let identity = CallIdentity::new(
            &builtin.name,
            &format!("#{}", ctor.index),
            args.iter().map(|a| a.target.rust_type()).collect(),
            Some(self_ty.clone()),
        );

        out.push_str(&format!(
            "    /// `{identity}`\n\
             \x20   pub fn {fn_name}({}) -> Self {{\n\
             \x20       static CTOR: gdbind_abi::LazyConstructor = gdbind_abi::LazyConstructor::new({typecode}, {});\n",
            param_list(&args),
            ctor.index
        ));
        marshal_args(out, &args);
        out.push_str(&format!(
            "        let mut ret = <{self_ty}>::default();\n\
             \x20       unsafe {{ (CTOR.get())({ret_ptr}, args.as_ptr()) }};\n\
             \x20       ret\n\
             \x20   }}\n\n"
        ));

        // One-argument constructors from another builtin double as conversions.
        if let ([arg], [def]) = (args.as_slice(), ctor.arguments.as_slice()) {
            if let TypeRef::Core(other) = &def.ty {
                if other != &builtin.name && arg.default.is_none() {
                    let from_ty = arg.target.rust_type();
                    let value = if arg.pass == ArgPass::Content { "value" } else { "*value" };
                    conversions.push_str(&format!(
                        "impl From<&{from_ty}> for {self_ty} {{\n\
                         \x20   fn from(value: &{from_ty}) -> Self {{\n\
                         \x20       {self_ty}::{fn_name}({value})\n\
                         \x20   }}\n\
                         }}\n\n"
                    ));
                }
            }
        }
    }
    out.push_str("}\n\n");
    out.push_str(&conversions);
    Ok(())
}

/// `GodotCollection<T>`: typed view over an engine array.
fn generate_collection(out: &mut String, reg: &Registry) -> CodegenResult<()> {
    if reg.lookup_builtin("Array").is_none() {
        return Err(CodegenError::UnknownType {
            name: "Array".to_string(),
            context: "typed collections".to_string(),
        });
    }
    out.push_str(
        "#[repr(transparent)]\n\
         pub struct GodotCollection<T> {\n\
         \x20   array: GArray,\n\
         \x20   _element: std::marker::PhantomData<T>,\n\
         }\n\n\
         impl<T> GodotCollection<T> {\n\
         \x20   pub fn from_array(array: GArray) -> Self {\n\
         \x20       GodotCollection { array, _element: std::marker::PhantomData }\n\
         \x20   }\n\n\
         \x20   pub fn into_array(self) -> GArray {\n\
         \x20       self.array\n\
         \x20   }\n\n\
         \x20   pub fn as_array(&self) -> &GArray {\n\
         \x20       &self.array\n\
         \x20   }\n\n\
         \x20   pub fn as_ptr(&self) -> *const std::ffi::c_void {\n\
         \x20       self.array.as_ptr()\n\
         \x20   }\n\n\
         \x20   pub fn as_mut_ptr(&mut self) -> *mut std::ffi::c_void {\n\
         \x20       self.array.as_mut_ptr()\n\
         \x20   }\n\
         }\n\n\
         impl<T> Default for GodotCollection<T> {\n\
         \x20   fn default() -> Self {\n\
         \x20       GodotCollection::from_array(GArray::default())\n\
         \x20   }\n\
         }\n\n\
         impl<T> std::fmt::Debug for GodotCollection<T> {\n\
         \x20   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {\n\
         \x20       f.debug_tuple(\"GodotCollection\").field(&self.array).finish()\n\
         \x20   }\n\
         }\n\n\
         unsafe impl<T> gdbind_abi::SlotValue for GodotCollection<T> {\n\
         \x20   const SIZE: usize = <GArray as gdbind_abi::SlotValue>::SIZE;\n\n\
         \x20   unsafe fn read_from(src: *const u8) -> Self {\n\
         \x20       GodotCollection::from_array(unsafe { gdbind_abi::SlotValue::read_from(src) })\n\
         \x20   }\n\n\
         \x20   unsafe fn write_to(&self, dst: *mut u8) {\n\
         \x20       unsafe { gdbind_abi::SlotValue::write_to(&self.array, dst) }\n\
         \x20   }\n\
         }\n\n",
    );
    Ok(())
}

fn table_name(name: &str) -> String {
    to_snake_case(name).to_uppercase()
}

fn generate_operators(
    out: &mut String,
    reg: &Registry,
    diagnostics: &mut Vec<Diagnostic>,
) -> CodegenResult<()> {
    out.push_str("pub mod operators {\n");
    for builtin in reg.builtins() {
        if builtin.operators.is_empty() {
            continue;
        }
        let left = builtin_typecode(&builtin.name)?;
        for op in &builtin.operators {
            let (code, label) = operator_code(&op.symbol, &builtin.name)?;
            let (right, entry, doc) = match op.right.as_deref() {
                Some("Variant") => {
                    diagnostics.push(Diagnostic::new(
                        &builtin.name,
                        &format!("operator {}", op.symbol),
                        SkipReason::VariantOperand,
                    ));
                    continue;
                }
                Some(right) => (
                    builtin_typecode(right)?,
                    format!("{}_{}_{}", table_name(&builtin.name), label.to_uppercase(), table_name(right)),
                    format!("{} {} {right}", builtin.name, op.symbol),
                ),
                None => (
                    0,
                    format!("{}_{}", table_name(&builtin.name), label.to_uppercase()),
                    format!("{} {}", op.symbol, builtin.name),
                ),
            };
            out.push_str(&format!(
                "    /// `{doc}` → `{}`\n\
                 \x20   pub static {entry}: gdbind_abi::LazyOperator = gdbind_abi::LazyOperator::new({code}, {left}, {right});\n",
                op.ret
            ));
        }
    }
    out.push_str("}\n\n");
    Ok(())
}

fn utility_skip(u: &UtilityDef) -> Option<SkipReason> {
    if u.is_vararg {
        return Some(SkipReason::Vararg);
    }
    let in_args = u.arguments.iter().any(|a| a.ty.contains_pointer());
    if in_args || u.ret.as_ref().is_some_and(TypeRef::contains_pointer) {
        return Some(SkipReason::RawPointer);
    }
    None
}

fn generate_utilities(
    out: &mut String,
    reg: &Registry,
    diagnostics: &mut Vec<Diagnostic>,
) -> CodegenResult<()> {
    out.push_str("pub mod utility {\n    use super::*;\n\n");
    for u in reg.utilities() {
        if let Some(reason) = utility_skip(u) {
            diagnostics.push(Diagnostic::new("utility", &u.name, reason));
            continue;
        }
        let mut args = u
            .arguments
            .iter()
            .map(|a| plan_arg(a, MapKind::Builtin, reg))
            .collect::<CodegenResult<Vec<_>>>()?;
        trim_defaults(&mut args);
        let ret = u
            .ret
            .as_ref()
            .map(|ty| plan_ret(&ReturnDef { ty: ty.clone(), meta: None }, MapKind::Builtin, reg))
            .transpose()?;
        let identity = CallIdentity::new(
            "utility",
            &u.name,
            args.iter().map(|a| a.target.rust_type()).collect(),
            ret.as_ref().map(|r| r.rust_type()),
        );
        let ret_ty = ret
            .as_ref()
            .map(|r| format!(" -> {}", r.rust_type()))
            .unwrap_or_default();

        out.push_str(&format!(
            "    /// `{identity}` ({})\n\
             \x20   pub fn {}({}){ret_ty} {{\n\
             \x20       static UTIL: gdbind_abi::LazyUtility = gdbind_abi::LazyUtility::new(\"{}\", {});\n",
            u.category,
            escape_reserved(&u.name),
            param_list(&args),
            u.name,
            u.hash
        ));
        marshal_args(out, &args);
        let storage = ret_storage(ret.as_ref());
        if let Some(decl) = &storage.decl {
            out.push_str(&format!("        {decl}\n"));
        }
        out.push_str(&format!(
            "        unsafe {{ (UTIL.get())({}, args.as_ptr(), {}) }};\n",
            storage.ptr,
            args.len()
        ));
        if let Some(result) = &storage.result {
            out.push_str(&format!("        {result}\n"));
        }
        out.push_str("    }\n\n");
    }
    out.push_str("}\n\n");
    Ok(())
}

fn c_field_type(c_ty: &str, reg: &Registry) -> Option<String> {
    let ty = c_ty.trim_start_matches("const ").trim();
    let prim = match ty {
        "float" => "f32",
        "double" => "f64",
        "real_t" => reg.profile().float,
        "bool" => "bool",
        "int" | "int32_t" => "i32",
        "int8_t" => "i8",
        "int16_t" => "i16",
        "int64_t" => "i64",
        "uint8_t" => "u8",
        "uint16_t" => "u16",
        "uint32_t" | "unsigned int" | "char32_t" => "u32",
        "uint64_t" => "u64",
        other => {
            if reg.native_structs().iter().any(|n| n.name == other) {
                return Some(other.to_string());
            }
            return reg.lookup_builtin(other).map(|_| core_rename(other).to_string());
        }
    };
    Some(prim.to_string())
}

/// Parse one `type name[N] = default` declaration.
fn native_field(decl: &str, reg: &Registry) -> Result<(String, String), SkipReason> {
    let decl = decl.split_once('=').map_or(decl, |(lhs, _)| lhs).trim();
    if let Some(star) = decl.rfind('*') {
        let name = sanitize_ident(decl[star + 1..].trim());
        return Ok((name, "*mut std::ffi::c_void".to_string()));
    }
    let (c_ty, name) = decl
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| SkipReason::NativeFieldType(decl.to_string()))?;
    let (name, len) = match name.split_once('[') {
        Some((n, rest)) => (n, rest.trim_end_matches(']').parse::<usize>().ok()),
        None => (name, None),
    };
    let ty = c_field_type(c_ty, reg).ok_or_else(|| SkipReason::NativeFieldType(c_ty.trim().to_string()))?;
    let ty = match len {
        Some(n) => format!("[{ty}; {n}]"),
        None => ty,
    };
    Ok((sanitize_ident(name), ty))
}

fn generate_native_struct(native: &NativeStructDef, reg: &Registry) -> Result<String, SkipReason> {
    let fields = native
        .format
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| native_field(d, reg))
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = format!(
        "#[repr(C)]\n\
         #[derive(Debug)]\n\
         pub struct {} {{\n",
        native.name
    );
    for (name, ty) in fields {
        out.push_str(&format!("    pub {name}: {ty},\n"));
    }
    out.push_str("}\n\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::{fixture, fixture_json, fixture_with};
    use crate::schema::ApiFile;
    use crate::type_map::BuildConfiguration;

    fn core() -> (String, Vec<Diagnostic>) {
        generate_core_defs(&fixture()).unwrap()
    }

    #[test]
    fn opaque_builtins_take_their_configured_size() {
        let (code, _) = core();
        assert!(code.contains("pub struct GString(gdbind_abi::OpaqueStorage<8>);"));
        assert!(code.contains("pub struct PackedByteArray(gdbind_abi::OpaqueStorage<16>);"));
        assert!(code.contains("pub struct Variant(gdbind_abi::OpaqueStorage<40>);"));

        let (narrow, _) = generate_core_defs(&fixture_with(BuildConfiguration::Float32)).unwrap();
        assert!(narrow.contains("pub struct GString(gdbind_abi::OpaqueStorage<4>);"));
        assert!(narrow.contains("pub struct Variant(gdbind_abi::OpaqueStorage<24>);"));
    }

    #[test]
    fn struct_builtin_fields_follow_the_member_layout() {
        let (code, _) = core();
        assert!(code.contains("pub struct Vector2 {\n    pub x: f64,\n    pub y: f64,\n}"));
        assert!(code.contains("const _: () = assert!(std::mem::size_of::<Vector2>() == 16);"));
        assert!(code.contains("pub struct Color {\n    pub r: f32,"));
        assert!(code.contains("unsafe impl gdbind_abi::SlotValue for Vector2 {\n    const SIZE: usize = 16;"));
        assert!(code.contains("pub struct GodotCollection<T>"));

        let (narrow, _) = generate_core_defs(&fixture_with(BuildConfiguration::Float64)).unwrap();
        assert!(narrow.contains("pub struct Vector2 {\n    pub x: f32,\n    pub y: f32,\n}"));
        assert!(narrow.contains("const _: () = assert!(std::mem::size_of::<Vector2>() == 8);"));
    }

    #[test]
    fn struct_builtins_match_their_declared_size_in_every_configuration() {
        for configuration in [
            BuildConfiguration::Float32,
            BuildConfiguration::Float64,
            BuildConfiguration::Double32,
            BuildConfiguration::Double64,
        ] {
            let reg = fixture_with(configuration);
            let structs: Vec<&BuiltinDef> = reg.builtins().iter().filter(|b| b.is_struct()).collect();
            assert_eq!(structs.len(), 2);
            for builtin in structs {
                let (_, layout) = struct_layout(builtin, &reg).unwrap();
                assert_eq!(
                    Some(layout.size),
                    reg.builtin_byte_size(&builtin.name),
                    "{} under {configuration}",
                    builtin.name
                );
                let listed: Vec<Option<usize>> = builtin.members.iter().map(|m| m.offset).collect();
                let emitted: Vec<Option<usize>> = layout.offsets.iter().map(|&o| Some(o)).collect();
                assert_eq!(listed, emitted, "{} under {configuration}", builtin.name);
            }
        }
    }

    #[test]
    fn unlisted_wide_members_are_a_layout_mismatch() {
        let mut json = fixture_json();
        json.as_object_mut().unwrap().remove("builtin_class_member_offsets");
        let api: ApiFile = serde_json::from_value(json).unwrap();

        let wide = Registry::load(&api, BuildConfiguration::Double64).unwrap();
        match generate_core_defs(&wide).unwrap_err() {
            CodegenError::BuiltinLayoutMismatch { name, what, declared, emitted, .. } => {
                assert_eq!(name, "Vector2");
                assert_eq!(what, "size");
                assert_eq!((declared, emitted), (16, 8));
            }
            other => panic!("unexpected error: {other}"),
        }

        let narrow = Registry::load(&api, BuildConfiguration::Float64).unwrap();
        assert!(generate_core_defs(&narrow).is_ok());
    }

    #[test]
    fn listed_offsets_must_agree_with_the_emitted_fields() {
        let mut json = fixture_json();
        json["builtin_class_member_offsets"][3]["classes"][1]["members"][3]["offset"] = serde_json::json!(16);
        let api: ApiFile = serde_json::from_value(json).unwrap();
        let reg = Registry::load(&api, BuildConfiguration::Double64).unwrap();
        let err = generate_core_defs(&reg).unwrap_err();
        assert!(err.to_string().contains("offset of `a` is 16 in the schema but 12"), "{err}");
    }

    #[test]
    fn constructors_resolve_by_typecode_and_convert() {
        let (code, _) = core();
        assert!(code.contains("pub fn from_x_y(x: f64, y: f64) -> Self {"));
        assert!(code.contains("gdbind_abi::LazyConstructor::new(5, 3)"));
        assert!(code.contains("pub fn from_string_name(from: &StringName) -> Self {"));
        assert!(code.contains("gdbind_abi::LazyConstructor::new(4, 2)"));
        assert!(code.contains("impl From<&StringName> for GString {"));
        assert!(code.contains("impl From<&GString> for StringName {"));
    }

    #[test]
    fn operators_use_engine_ordinals() {
        let (code, _) = core();
        assert!(code.contains("pub static VECTOR2_ADD_VECTOR2: gdbind_abi::LazyOperator = gdbind_abi::LazyOperator::new(6, 5, 5);"));
        assert!(code.contains("pub static VECTOR2_NEGATE: gdbind_abi::LazyOperator = gdbind_abi::LazyOperator::new(10, 5, 0);"));
        assert!(code.contains("pub static STRING_EQUAL_STRING: gdbind_abi::LazyOperator = gdbind_abi::LazyOperator::new(0, 4, 4);"));
    }

    #[test]
    fn utilities_bind_by_name_and_hash_and_skip_varargs() {
        let (code, diags) = core();
        assert!(code.contains("pub fn sin(angle_rad: f64) -> f64 {"));
        assert!(code.contains("gdbind_abi::LazyUtility::new(\"sin\", 2140049587)"));
        assert!(code.contains("(UTIL.get())((&mut ret as *mut f64).cast(), args.as_ptr(), 1)"));
        assert!(!code.contains("pub fn print("));
        assert!(diags.contains(&Diagnostic::new("utility", "print", SkipReason::Vararg)));
    }

    #[test]
    fn native_structures_parse_their_format() {
        let (code, _) = core();
        assert!(code.contains("pub struct AudioFrame {\n    pub left: f32,\n    pub right: f32,\n}"));
        assert!(code.contains("pub struct ObjectID {\n    pub id: u64,\n}"));
    }

    #[test]
    fn native_field_shapes() {
        let reg = fixture();
        assert_eq!(
            native_field("Object *collider", &reg).unwrap(),
            ("collider".to_string(), "*mut std::ffi::c_void".to_string())
        );
        assert_eq!(
            native_field("float samples[4]", &reg).unwrap(),
            ("samples".to_string(), "[f32; 4]".to_string())
        );
        assert_eq!(
            native_field("Vector2 position", &reg).unwrap(),
            ("position".to_string(), "Vector2".to_string())
        );
        assert!(matches!(
            native_field("TextServer::Direction dir", &reg),
            Err(SkipReason::NativeFieldType(_))
        ));
    }

    #[test]
    fn unknown_operator_symbols_are_fatal() {
        let mut doc = fixture_json();
        doc["builtin_classes"][6]["operators"][0]["name"] = serde_json::json!("<=>");
        let api: ApiFile = serde_json::from_value(doc).unwrap();
        let reg = Registry::load(&api, BuildConfiguration::Double64).unwrap();
        assert!(matches!(
            generate_core_defs(&reg),
            Err(CodegenError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn typecode_table_rejects_unknown_builtins() {
        assert_eq!(builtin_typecode("PackedVector4Array").unwrap(), 38);
        assert!(matches!(
            builtin_typecode("Quaternionish"),
            Err(CodegenError::UnknownBuiltinTypecode { .. })
        ));
    }
}
