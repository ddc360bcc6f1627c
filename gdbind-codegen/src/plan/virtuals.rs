// Virtual-method trampolines and the per-class dispatcher.

use std::collections::HashMap;

use crate::defaults::{DefaultValue, default_value};
use crate::diag::{Diagnostic, SkipReason};
use crate::error::CodegenResult;
use crate::identity::CallIdentity;
use crate::model::{ClassDef, MethodDef};
use crate::naming::{escape_reserved, to_snake_case};
use crate::registry::Registry;
use crate::type_map::{MapKind, TargetType, map_type};
use crate::type_ref::TypeRef;

use super::methods::{slot_primitive, unsupported_shape};

/// How a trampoline reads one argument out of its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualArgRead {
    /// Slot pointee decoded as the mapped type.
    Value,
    /// Slot holds the wide engine primitive `raw`; narrowed after reading.
    Widen { raw: &'static str },
    /// Slot holds an object handle; resolved through the live registry.
    Object { dynamic: bool },
}

#[derive(Debug, Clone)]
pub struct VirtualArg {
    pub name: String,
    pub target: TargetType,
    pub read: VirtualArgRead,
}

impl VirtualArg {
    pub fn param_type(&self) -> String {
        match self.read {
            VirtualArgRead::Object { .. } => format!("Option<{}>", self.target.rust_type()),
            VirtualArgRead::Value | VirtualArgRead::Widen { .. } => self.target.rust_type(),
        }
    }
}

/// How the override's result lands in the return slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualRetStore {
    /// Struct, primitive, enum and bitfield results: stored by value.
    Value,
    /// Narrow primitive widened to `raw` before it is stored.
    Widen { raw: &'static str },
    /// Handle-backed results: the handle is stored.
    Handle,
    /// Opaque builtins: raw content is stored.
    Content,
}

#[derive(Debug, Clone)]
pub struct VirtualRet {
    pub target: TargetType,
    pub store: VirtualRetStore,
    /// Registry byte size of the slot.
    pub capacity: usize,
}

#[derive(Debug, Clone)]
pub struct VirtualPlan {
    pub schema_name: String,
    pub trait_method: String,
    pub trampoline: String,
    pub is_const: bool,
    pub args: Vec<VirtualArg>,
    pub ret: Option<VirtualRet>,
    /// Body of the trait's default method.
    pub default: DefaultValue,
    pub identity: CallIdentity,
}

pub fn trampoline_name(class: &str, method: &str) -> String {
    format!("{}_proxy_{}", to_snake_case(class), method.trim_start_matches('_'))
}

/// Argument types the trampoline path can't rebuild from a raw slot.
fn rejects(ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Enum(_) | TypeRef::Bitfield(_) | TypeRef::TypedArray(_) => true,
        TypeRef::Core(name) => name == "Dictionary" || name == "String",
        _ => false,
    }
}

fn slot_size_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Object(_) => "Object".to_string(),
        TypeRef::TypedArray(_) => "Array".to_string(),
        TypeRef::Enum(_) | TypeRef::Bitfield(_) => "int".to_string(),
        other => other.to_string(),
    }
}

fn plan_virtual(
    class: &ClassDef,
    method: &MethodDef,
    reg: &Registry,
) -> CodegenResult<Result<VirtualPlan, SkipReason>> {
    if let Some(reason) = unsupported_shape(method) {
        return Ok(Err(reason));
    }
    if let Some(arg) = method.arguments.iter().find(|a| rejects(&a.ty)) {
        return Ok(Err(SkipReason::UnsupportedVirtualArg {
            arg: arg.name.clone(),
            ty: arg.ty.to_string(),
        }));
    }

    let mut args = Vec::with_capacity(method.arguments.len());
    for arg in &method.arguments {
        let target = map_type(&arg.ty, arg.meta, MapKind::Classes, reg.profile())?;
        let read = match &arg.ty {
            TypeRef::Object(name) => VirtualArgRead::Object {
                dynamic: reg.has_subclasses(name),
            },
            TypeRef::Core(name) if !reg.is_struct_type(name) => {
                reg.require_byte_size(name)?;
                VirtualArgRead::Value
            }
            _ => match slot_primitive(&target) {
                Some(raw) => VirtualArgRead::Widen { raw },
                None => VirtualArgRead::Value,
            },
        };
        args.push(VirtualArg {
            name: escape_reserved(&arg.name),
            target,
            read,
        });
    }

    let ret = match &method.ret {
        None => None,
        Some(r) => {
            let target = map_type(&r.ty, r.meta, MapKind::Classes, reg.profile())?;
            let store = match &r.ty {
                TypeRef::Object(_) => VirtualRetStore::Handle,
                TypeRef::Core(name) if !reg.is_struct_type(name) => VirtualRetStore::Content,
                TypeRef::Variant | TypeRef::TypedArray(_) => VirtualRetStore::Content,
                _ => match slot_primitive(&target) {
                    Some(raw) => VirtualRetStore::Widen { raw },
                    None => VirtualRetStore::Value,
                },
            };
            Some(VirtualRet {
                capacity: reg.require_byte_size(&slot_size_name(&r.ty))?,
                target,
                store,
            })
        }
    };

    let ret_target = ret.as_ref().map(|r| r.target.clone()).unwrap_or(TargetType::Unit);
    Ok(Ok(VirtualPlan {
        schema_name: method.name.clone(),
        trait_method: escape_reserved(&method.name),
        trampoline: trampoline_name(&class.name, &method.name),
        is_const: method.is_const,
        identity: CallIdentity::new(
            &class.name,
            &method.name,
            args.iter().map(|a| a.param_type()).collect(),
            ret.as_ref().map(|r| r.target.rust_type()),
        ),
        default: default_value(&ret_target),
        args,
        ret,
    }))
}

/// Accept or reject every virtual candidate of `class`.
pub fn plan_virtuals(
    class: &ClassDef,
    reg: &Registry,
    diagnostics: &mut Vec<Diagnostic>,
) -> CodegenResult<Vec<VirtualPlan>> {
    let mut plans = Vec::new();
    for method in class.methods.iter().filter(|m| m.is_virtual()) {
        match plan_virtual(class, method, reg)? {
            Ok(plan) => plans.push(plan),
            Err(reason) => diagnostics.push(Diagnostic::new(&class.name, &method.name, reason)),
        }
    }
    Ok(plans)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEntry {
    pub owner: String,
    pub trampoline: String,
}

/// Name → trampoline tables for every class, plus the parent links needed to
/// resolve inherited virtuals.
#[derive(Debug, Default)]
pub struct DispatchTable {
    entries: HashMap<String, HashMap<String, DispatchEntry>>,
    parents: HashMap<String, Option<String>>,
}

impl DispatchTable {
    pub fn insert_class(&mut self, class: &str, parent: Option<&str>, virtuals: &[VirtualPlan]) {
        let table = virtuals
            .iter()
            .map(|v| {
                let entry = DispatchEntry {
                    owner: class.to_string(),
                    trampoline: v.trampoline.clone(),
                };
                (v.schema_name.clone(), entry)
            })
            .collect();
        self.entries.insert(class.to_string(), table);
        self.parents
            .insert(class.to_string(), parent.map(str::to_string));
    }

    pub fn dispatcher<'a>(&'a self, class: &str) -> Dispatcher<'a> {
        Dispatcher {
            table: self,
            class: class.to_string(),
        }
    }
}

/// One class's view of the dispatch table.
pub struct Dispatcher<'a> {
    table: &'a DispatchTable,
    class: String,
}

impl Dispatcher<'_> {
    /// Own entries first, then each ancestor in turn.
    pub fn lookup(&self, name: &str) -> Option<&DispatchEntry> {
        let mut cursor = Some(self.class.as_str());
        while let Some(class) = cursor {
            if let Some(entry) = self.table.entries.get(class).and_then(|t| t.get(name)) {
                return Some(entry);
            }
            cursor = self.table.parents.get(class).and_then(|p| p.as_deref());
        }
        None
    }
}
