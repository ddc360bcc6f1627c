// Marshalling plans for bound (non-virtual) methods.

use crate::defaults::{DefaultValue, default_value, parse_default_literal};
use crate::diag::{Diagnostic, SkipReason};
use crate::error::CodegenResult;
use crate::identity::CallIdentity;
use crate::model::{ArgumentDef, ClassDef, MethodDef, ReturnDef};
use crate::naming::escape_reserved;
use crate::registry::Registry;
use crate::type_map::{MapKind, TargetType, map_type};
use crate::type_ref::TypeRef;

/// Inherent names every generated wrapper already defines.
pub const WRAPPER_MEMBERS: &[&str] = &[
    "new",
    "fast",
    "handle",
    "from_handle",
    "virtual_dispatcher",
];

/// How one argument reaches its ABI slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgPass {
    /// Enum/bitfield copied into an untyped integer (`i64` / `u64`).
    CopyInt { raw: &'static str },
    /// Primitive or struct-like builtin copied into a local.
    CopyValue,
    /// Integer or float narrower than its engine slot, widened to `raw`.
    Widen { raw: &'static str },
    /// Opaque builtin or typed array: address of its raw content.
    Content,
    /// Object: address of a local handle copy.
    Handle,
    /// Raw buffer passed through.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetPass {
    /// Enum/bitfield read back from its integer image.
    CopyInt,
    CopyValue,
    /// Read as `raw` and narrowed to the mapped type.
    Widen { raw: &'static str },
    Content,
    /// Raw array storage wrapped into `GodotCollection<T>` afterwards.
    Collection,
    /// Handle storage; `dynamic` when the declared class has subclasses.
    Object { dynamic: bool },
    Direct,
}

#[derive(Debug, Clone)]
pub struct ArgPlan {
    pub name: String,
    pub target: TargetType,
    pub pass: ArgPass,
    /// Rust expression for an optional argument's default.
    pub default: Option<String>,
}

impl ArgPlan {
    /// Parameter type in the generated signature.
    pub fn param_type(&self) -> String {
        let base = match self.pass {
            ArgPass::Content => format!("&{}", self.target.rust_type()),
            ArgPass::Handle => format!("Option<&{}>", self.target.rust_type()),
            _ => self.target.rust_type(),
        };
        if self.default.is_some() {
            format!("Option<{base}>")
        } else {
            base
        }
    }

    /// Wrap `expr` the way this parameter expects to receive it.
    pub fn pass_expr(&self, expr: &str) -> String {
        if self.default.is_some() {
            format!("Some({expr})")
        } else {
            expr.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetPlan {
    pub target: TargetType,
    pub pass: RetPass,
    /// Initial content of the return storage.
    pub init: DefaultValue,
}

impl RetPlan {
    pub fn rust_type(&self) -> String {
        match self.pass {
            RetPass::Object { .. } => format!("Option<{}>", self.target.rust_type()),
            _ => self.target.rust_type(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodPlan {
    pub schema_name: String,
    pub rust_name: String,
    /// Referenced by an emitted property: generated private as `raw_<name>`.
    pub private: bool,
    pub hash: i64,
    pub is_static: bool,
    pub is_const: bool,
    pub args: Vec<ArgPlan>,
    pub ret: Option<RetPlan>,
    pub identity: CallIdentity,
}

impl MethodPlan {
    pub fn make_private(&mut self) {
        self.private = true;
        self.rust_name = format!("raw_{}", self.schema_name);
    }
}

/// Common skips for every method shape (bound and virtual).
pub fn unsupported_shape(method: &MethodDef) -> Option<SkipReason> {
    if method.is_vararg {
        return Some(SkipReason::Vararg);
    }
    let in_args = method.arguments.iter().any(|a| a.ty.contains_pointer());
    let in_ret = method.ret.as_ref().is_some_and(|r| r.ty.contains_pointer());
    if in_args || in_ret {
        return Some(SkipReason::RawPointer);
    }
    None
}

/// Engine slot type of a narrow primitive. Pointer calls carry every
/// integer as `i64` and every float as `f64`.
pub fn slot_primitive(target: &TargetType) -> Option<&'static str> {
    match target {
        TargetType::Int(t) if !matches!(*t, "i64" | "u64") => Some("i64"),
        TargetType::Float("f32") => Some("f64"),
        _ => None,
    }
}

pub fn classify_arg(ty: &TypeRef, target: &TargetType, reg: &Registry) -> CodegenResult<ArgPass> {
    Ok(match (ty, target) {
        (_, TargetType::Enum(_)) => ArgPass::CopyInt { raw: "i64" },
        (_, TargetType::Bitfield(_)) => ArgPass::CopyInt { raw: "u64" },
        (_, TargetType::Int(_) | TargetType::Float(_)) => match slot_primitive(target) {
            Some(raw) => ArgPass::Widen { raw },
            None => ArgPass::CopyValue,
        },
        (_, TargetType::Bool) => ArgPass::CopyValue,
        (TypeRef::Core(name), TargetType::Value(_)) if reg.is_struct_type(name) => ArgPass::CopyValue,
        (TypeRef::Core(name), TargetType::Value(_)) => {
            reg.require_byte_size(name)?;
            ArgPass::Content
        }
        (_, TargetType::Variant) => {
            reg.require_byte_size("Variant")?;
            ArgPass::Content
        }
        (_, TargetType::Collection(_)) => ArgPass::Content,
        (_, TargetType::Object(_)) => ArgPass::Handle,
        (_, TargetType::Pointer | TargetType::Unit | TargetType::Value(_)) => ArgPass::Direct,
    })
}

pub fn classify_ret(ty: &TypeRef, target: &TargetType, reg: &Registry) -> CodegenResult<RetPass> {
    Ok(match (ty, target) {
        (_, TargetType::Enum(_) | TargetType::Bitfield(_)) => RetPass::CopyInt,
        (_, TargetType::Int(_) | TargetType::Float(_)) => match slot_primitive(target) {
            Some(raw) => RetPass::Widen { raw },
            None => RetPass::CopyValue,
        },
        (_, TargetType::Bool) => RetPass::CopyValue,
        (TypeRef::Core(name), TargetType::Value(_)) if reg.is_struct_type(name) => RetPass::CopyValue,
        (TypeRef::Core(name), TargetType::Value(_)) => {
            reg.require_byte_size(name)?;
            RetPass::Content
        }
        (_, TargetType::Variant) => {
            reg.require_byte_size("Variant")?;
            RetPass::Content
        }
        (_, TargetType::Collection(_)) => RetPass::Collection,
        (TypeRef::Object(name), TargetType::Object(_)) => RetPass::Object {
            dynamic: reg.has_subclasses(name),
        },
        _ => RetPass::Direct,
    })
}

pub fn plan_arg(arg: &ArgumentDef, kind: MapKind, reg: &Registry) -> CodegenResult<ArgPlan> {
    let target = map_type(&arg.ty, arg.meta, kind, reg.profile())?;
    let pass = classify_arg(&arg.ty, &target, reg)?;
    Ok(ArgPlan {
        name: escape_reserved(&arg.name),
        default: parse_default_literal(arg, &target),
        target,
        pass,
    })
}

pub fn plan_ret(ret: &ReturnDef, kind: MapKind, reg: &Registry) -> CodegenResult<RetPlan> {
    let target = map_type(&ret.ty, ret.meta, kind, reg.profile())?;
    let pass = classify_ret(&ret.ty, &target, reg)?;
    Ok(RetPlan {
        init: default_value(&target),
        target,
        pass,
    })
}

/// Defaults only apply to a trailing run of arguments.
pub fn trim_defaults(args: &mut [ArgPlan]) {
    let mut optional_tail = true;
    for arg in args.iter_mut().rev() {
        if arg.default.is_none() {
            optional_tail = false;
        } else if !optional_tail {
            arg.default = None;
        }
    }
}

fn rust_method_name(name: &str) -> String {
    if WRAPPER_MEMBERS.contains(&name) {
        format!("{name}_")
    } else {
        escape_reserved(name)
    }
}

/// Plan every bound method of `class`. Skipped methods produce diagnostics;
/// mapping misses abort.
pub fn plan_methods(
    class: &ClassDef,
    reg: &Registry,
    diagnostics: &mut Vec<Diagnostic>,
) -> CodegenResult<Vec<MethodPlan>> {
    let mut plans = Vec::new();
    for method in &class.methods {
        let Some(hash) = method.hash() else { continue };
        if let Some(reason) = unsupported_shape(method) {
            diagnostics.push(Diagnostic::new(&class.name, &method.name, reason));
            continue;
        }

        let mut args = method
            .arguments
            .iter()
            .map(|a| plan_arg(a, MapKind::Classes, reg))
            .collect::<CodegenResult<Vec<_>>>()?;
        let ret = method.ret.as_ref().map(|r| plan_ret(r, MapKind::Classes, reg)).transpose()?;

        trim_defaults(&mut args);

        let identity = CallIdentity::new(
            &class.name,
            &method.name,
            args.iter().map(|a| a.target.rust_type()).collect(),
            ret.as_ref().map(|r| r.rust_type()),
        );
        plans.push(MethodPlan {
            schema_name: method.name.clone(),
            rust_name: rust_method_name(&method.name),
            private: false,
            hash,
            is_static: method.is_static,
            is_const: method.is_const,
            args,
            ret,
            identity,
        });
    }
    Ok(plans)
}
