// Accessor pairs synthesized from a property's getter/setter references.

use std::collections::HashSet;

use crate::diag::{Diagnostic, SkipReason};
use crate::model::{ClassDef, PropertyDef};
use crate::naming::sanitize_ident;
use crate::type_map::TargetType;

use super::methods::{ArgPass, MethodPlan, WRAPPER_MEMBERS};

/// How the setter receives the property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetterValue {
    /// Same type as the getter's return.
    Direct,
    /// Property is `StringName`, setter wants `String`.
    StringNameToGString,
}

#[derive(Debug, Clone)]
pub struct PropertyPlan {
    pub schema_name: String,
    pub getter_name: String,
    pub setter_name: String,
    pub ty: TargetType,
    /// Getter plan's return rendering (`Option<T>` for objects).
    pub getter_ret: String,
    /// Setter value parameter type.
    pub value_param: String,
    /// Schema names of the methods this property wraps.
    pub getter: String,
    pub setter: String,
    /// Rust expression passed as the leading index argument.
    pub index_getter: Option<String>,
    pub index_setter: Option<String>,
    pub value: SetterValue,
    /// Whether the setter's value argument is optional (`Some(value)`).
    pub value_optional: bool,
    /// Static backing methods are called through `Self::`.
    pub getter_static: bool,
    pub setter_static: bool,
}

fn index_literal(plan: &MethodPlan, idx: i64) -> Result<String, SkipReason> {
    let first = &plan.args[0];
    let lit = match &first.target {
        TargetType::Int(_) => idx.to_string(),
        TargetType::Enum(name) | TargetType::Bitfield(name) => format!("{name}({idx})"),
        other => return Err(SkipReason::IndexType(other.rust_type())),
    };
    Ok(first.pass_expr(&lit))
}

fn plan_property(
    prop: &PropertyDef,
    methods: &[MethodPlan],
    taken: &HashSet<String>,
) -> Result<PropertyPlan, SkipReason> {
    if prop.getter.is_empty() {
        return Err(SkipReason::NoGetter);
    }
    if prop.getter.starts_with('_') {
        return Err(SkipReason::InternalGetter);
    }
    let find = |name: &str| methods.iter().find(|m| m.schema_name == name);
    let getter = find(&prop.getter).ok_or_else(|| SkipReason::UnresolvedGetter(prop.getter.clone()))?;
    let setter = prop
        .setter
        .as_deref()
        .and_then(find)
        .ok_or_else(|| SkipReason::UnresolvedSetter(prop.setter.clone()))?;

    if getter.args.len() > 1 {
        return Err(SkipReason::GetterArity(getter.args.len()));
    }
    if setter.args.len() > 2 {
        return Err(SkipReason::SetterArity(setter.args.len()));
    }
    let wanted = usize::from(prop.index.is_some());
    if getter.args.len() != wanted {
        return Err(SkipReason::GetterArity(getter.args.len()));
    }
    if setter.args.len() != wanted + 1 {
        return Err(SkipReason::SetterArity(setter.args.len()));
    }
    let ret = getter.ret.as_ref().ok_or(SkipReason::GetterWithoutReturn)?;

    let (index_getter, index_setter) = match prop.index {
        Some(idx) => (
            Some(index_literal(getter, idx)?),
            Some(index_literal(setter, idx)?),
        ),
        None => (None, None),
    };

    let value_arg = &setter.args[wanted];
    let value = if value_arg.target == ret.target {
        SetterValue::Direct
    } else if ret.target == TargetType::Value("StringName".into())
        && value_arg.target == TargetType::Value("GString".into())
    {
        SetterValue::StringNameToGString
    } else {
        return Err(SkipReason::SetterTypeMismatch {
            getter: ret.target.rust_type(),
            setter: value_arg.target.rust_type(),
        });
    };

    let name = sanitize_ident(&prop.name);
    let setter_name = format!("set_{}", name.trim_start_matches("r#"));
    for accessor in [&name, &setter_name] {
        if taken.contains(accessor) || WRAPPER_MEMBERS.contains(&accessor.as_str()) {
            return Err(SkipReason::AccessorCollision(accessor.clone()));
        }
    }

    let value_param = match (&value, &value_arg.pass) {
        (SetterValue::StringNameToGString, _) => "&StringName".to_string(),
        (_, ArgPass::Content) => format!("&{}", ret.target.rust_type()),
        (_, ArgPass::Handle) => format!("Option<&{}>", ret.target.rust_type()),
        _ => ret.target.rust_type(),
    };

    Ok(PropertyPlan {
        schema_name: prop.name.clone(),
        getter_name: name,
        setter_name,
        ty: ret.target.clone(),
        getter_ret: ret.rust_type(),
        value_param,
        getter: getter.schema_name.clone(),
        setter: setter.schema_name.clone(),
        index_getter,
        index_setter,
        value,
        value_optional: value_arg.default.is_some(),
        getter_static: getter.is_static,
        setter_static: setter.is_static,
    })
}

/// Plan every property of `class` against its bound-method plans. Methods a
/// plan wraps are marked private.
pub fn plan_properties(
    class: &ClassDef,
    methods: &mut [MethodPlan],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<PropertyPlan> {
    let mut plans: Vec<PropertyPlan> = Vec::new();
    let mut referenced: HashSet<String> = HashSet::new();

    for prop in &class.properties {
        // Public names a new accessor must not shadow: every method except
        // this property's own getter/setter, plus accessors emitted so far.
        let mut taken: HashSet<String> = methods
            .iter()
            .filter(|m| m.schema_name != prop.getter && Some(&m.schema_name) != prop.setter.as_ref())
            .map(|m| m.rust_name.clone())
            .collect();
        for p in &plans {
            taken.insert(p.getter_name.clone());
            taken.insert(p.setter_name.clone());
        }

        match plan_property(prop, methods, &taken) {
            Ok(plan) => {
                referenced.insert(plan.getter.clone());
                referenced.insert(plan.setter.clone());
                plans.push(plan);
            }
            Err(reason) => diagnostics.push(Diagnostic::new(&class.name, &prop.name, reason)),
        }
    }

    for method in methods.iter_mut() {
        if referenced.contains(&method.schema_name) {
            method.make_private();
        }
    }
    plans
}
