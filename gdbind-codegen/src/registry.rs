// Registry: every lookup table the generator needs, built once from the
// parsed API dump and immutable afterwards.

use std::collections::{HashMap, HashSet};

use crate::error::{CodegenError, CodegenResult};
use crate::model::*;
use crate::schema::{self, ApiFile};
use crate::type_map::{BuildConfiguration, WidthProfile};
use crate::type_ref::{TypeNames, TypeRef, WidthMeta};

/// Builtins the dump lists alongside the value types but which map to
/// primitives.
const PRIMITIVE_BUILTINS: &[&str] = &["Nil", "bool", "int", "float"];

pub struct Registry {
    configuration: BuildConfiguration,
    classes: Vec<ClassDef>,
    class_index: HashMap<String, usize>,
    builtins: Vec<BuiltinDef>,
    builtin_index: HashMap<String, usize>,
    sizes: HashMap<String, usize>,
    core_names: HashSet<String>,
    subclassed: HashSet<String>,
    global_enums: Vec<EnumDef>,
    utilities: Vec<UtilityDef>,
    native_structs: Vec<NativeStructDef>,
    singletons: HashSet<String>,
}

impl Registry {
    pub fn load(api: &ApiFile, configuration: BuildConfiguration) -> CodegenResult<Registry> {
        let sizes = api
            .builtin_class_sizes
            .iter()
            .find(|t| t.build_configuration == configuration.as_str())
            .ok_or(CodegenError::MissingField {
                owner: format!("builtin_class_sizes[{configuration}]"),
                field: "sizes",
            })?
            .sizes
            .iter()
            .map(|s| (s.name.clone(), s.size))
            .collect::<HashMap<_, _>>();

        let core_names: HashSet<String> = api
            .builtin_classes
            .iter()
            .map(|b| b.name.clone())
            .filter(|n| !PRIMITIVE_BUILTINS.contains(&n.as_str()))
            .collect();
        let class_names: HashSet<String> = api.classes.iter().map(|c| c.name.clone()).collect();
        let names = TypeNames {
            core: &core_names,
            classes: &class_names,
        };

        let mut subclassed = HashSet::new();
        for class in &api.classes {
            if let Some(parent) = &class.inherits {
                if !class_names.contains(parent) {
                    return Err(CodegenError::UnknownParent {
                        class: class.name.clone(),
                        parent: parent.clone(),
                    });
                }
                subclassed.insert(parent.clone());
            }
        }

        let classes = api
            .classes
            .iter()
            .map(|c| load_class(c, &names))
            .collect::<CodegenResult<Vec<_>>>()?;
        let class_index = index_by_name(classes.iter().map(|c| c.name.as_str()));

        // Member layouts are optional; dumps without them fall back to the
        // narrow field widths.
        let layouts: HashMap<&str, &schema::MemberOffsetClass> = api
            .builtin_class_member_offsets
            .iter()
            .find(|t| t.build_configuration == configuration.as_str())
            .map(|t| t.classes.iter().map(|c| (c.name.as_str(), c)).collect())
            .unwrap_or_default();

        let builtins = api
            .builtin_classes
            .iter()
            .filter(|b| core_names.contains(&b.name))
            .map(|b| load_builtin(b, layouts.get(b.name.as_str()).copied(), &names))
            .collect::<CodegenResult<Vec<_>>>()?;
        let builtin_index = index_by_name(builtins.iter().map(|b| b.name.as_str()));

        let utilities = api
            .utility_functions
            .iter()
            .map(|u| load_utility(u, &names))
            .collect::<CodegenResult<Vec<_>>>()?;

        tracing::debug!(
            classes = classes.len(),
            builtins = builtins.len(),
            subclassed = subclassed.len(),
            "registry loaded"
        );

        Ok(Registry {
            configuration,
            classes,
            class_index,
            builtins,
            builtin_index,
            sizes,
            core_names,
            subclassed,
            global_enums: api.global_enums.iter().map(load_enum).collect(),
            utilities,
            native_structs: api
                .native_structures
                .iter()
                .map(|n| NativeStructDef {
                    name: n.name.clone(),
                    format: n.format.clone(),
                })
                .collect(),
            singletons: api.singletons.iter().map(|s| s.name.clone()).collect(),
        })
    }

    pub fn configuration(&self) -> BuildConfiguration {
        self.configuration
    }

    pub fn profile(&self) -> WidthProfile {
        self.configuration.profile()
    }

    /// Classes in declaration order.
    pub fn classes(&self) -> &[ClassDef] {
        &self.classes
    }

    pub fn lookup_class(&self, name: &str) -> Option<&ClassDef> {
        self.class_index.get(name).map(|&i| &self.classes[i])
    }

    /// Engine classes cross the ABI as handles unless the name is also a
    /// builtin value type.
    pub fn is_reference_type(&self, name: &str) -> bool {
        self.class_index.contains_key(name) && !self.core_names.contains(name)
    }

    pub fn has_subclasses(&self, name: &str) -> bool {
        self.subclassed.contains(name)
    }

    pub fn is_singleton(&self, name: &str) -> bool {
        self.singletons.contains(name)
    }

    /// Byte size for the active build configuration.
    pub fn builtin_byte_size(&self, name: &str) -> Option<usize> {
        self.sizes.get(name).copied()
    }

    /// Like `builtin_byte_size`, but a miss is fatal.
    pub fn require_byte_size(&self, name: &str) -> CodegenResult<usize> {
        self.builtin_byte_size(name)
            .ok_or_else(|| CodegenError::UnknownBuiltinSize {
                name: name.to_string(),
                configuration: self.configuration.to_string(),
            })
    }

    pub fn lookup_builtin(&self, name: &str) -> Option<&BuiltinDef> {
        self.builtin_index.get(name).map(|&i| &self.builtins[i])
    }

    pub fn builtins(&self) -> &[BuiltinDef] {
        &self.builtins
    }

    /// Struct-like builtins (Vector2, Color, ...) are copied by value.
    pub fn is_struct_type(&self, name: &str) -> bool {
        self.lookup_builtin(name).is_some_and(BuiltinDef::is_struct)
    }

    /// Parent chain of `name`, nearest first. Excludes `name` itself.
    pub fn ancestors(&self, name: &str) -> Vec<&ClassDef> {
        let mut out = Vec::new();
        let mut cursor = self.lookup_class(name).and_then(|c| c.parent.as_deref());
        while let Some(parent) = cursor {
            match self.lookup_class(parent) {
                Some(def) => {
                    out.push(def);
                    cursor = def.parent.as_deref();
                }
                None => break,
            }
        }
        out
    }

    pub fn global_enums(&self) -> &[EnumDef] {
        &self.global_enums
    }

    pub fn utilities(&self) -> &[UtilityDef] {
        &self.utilities
    }

    pub fn native_structs(&self) -> &[NativeStructDef] {
        &self.native_structs
    }
}

fn index_by_name<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    names.enumerate().map(|(i, n)| (n.to_string(), i)).collect()
}

fn load_enum(e: &schema::EnumInfo) -> EnumDef {
    EnumDef {
        name: e.name.clone(),
        is_bitfield: e.is_bitfield,
        values: e.values.iter().map(|v| (v.name.clone(), v.value)).collect(),
    }
}

fn parse_meta(meta: Option<&str>, ty: &TypeRef, context: &str) -> CodegenResult<Option<WidthMeta>> {
    match meta {
        None => Ok(None),
        // Nullability annotation on object arguments, not a width.
        Some("required") if matches!(ty, TypeRef::Object(_)) => Ok(None),
        Some(m) => WidthMeta::parse(m, context).map(Some),
    }
}

fn load_argument(
    arg: &schema::ArgumentInfo,
    names: &TypeNames<'_>,
    owner: &str,
) -> CodegenResult<ArgumentDef> {
    let context = format!("{owner}({})", arg.name);
    let ty = TypeRef::parse(&arg.ty, names, &context)?;
    let meta = parse_meta(arg.meta.as_deref(), &ty, &context)?;
    Ok(ArgumentDef {
        name: arg.name.clone(),
        ty,
        meta,
        default_value: arg.default_value.clone(),
    })
}

fn load_method(
    m: &schema::MethodInfo,
    names: &TypeNames<'_>,
    class: &str,
) -> CodegenResult<MethodDef> {
    let owner = format!("{class}.{}", m.name);
    let kind = match (m.is_virtual, m.hash) {
        (true, _) => MethodKind::Virtual,
        (false, Some(hash)) => MethodKind::Bound { hash },
        (false, None) => {
            return Err(CodegenError::MissingField {
                owner,
                field: "hash",
            });
        }
    };
    let arguments = m
        .arguments
        .iter()
        .map(|a| load_argument(a, names, &owner))
        .collect::<CodegenResult<Vec<_>>>()?;
    let ret = match &m.return_value {
        Some(r) => {
            let context = format!("{owner} -> return");
            let ty = TypeRef::parse(&r.ty, names, &context)?;
            let meta = parse_meta(r.meta.as_deref(), &ty, &context)?;
            Some(ReturnDef { ty, meta }).filter(|r| r.ty != TypeRef::Void)
        }
        None => None,
    };
    Ok(MethodDef {
        name: m.name.clone(),
        arguments,
        ret,
        is_static: m.is_static,
        is_vararg: m.is_vararg,
        is_const: m.is_const,
        kind,
    })
}

fn load_class(c: &schema::ClassInfo, names: &TypeNames<'_>) -> CodegenResult<ClassDef> {
    let methods = c
        .methods
        .iter()
        .map(|m| load_method(m, names, &c.name))
        .collect::<CodegenResult<Vec<_>>>()?;
    Ok(ClassDef {
        name: c.name.clone(),
        parent: c.inherits.clone(),
        is_instantiable: c.is_instantiable,
        is_refcounted: c.is_refcounted,
        methods,
        properties: c
            .properties
            .iter()
            .map(|p| PropertyDef {
                name: p.name.clone(),
                getter: p.getter.clone(),
                setter: p.setter.clone().filter(|s| !s.is_empty()),
                index: p.index,
            })
            .collect(),
        enums: c.enums.iter().map(load_enum).collect(),
    })
}

fn load_builtin(
    b: &schema::BuiltinClassInfo,
    layout: Option<&schema::MemberOffsetClass>,
    names: &TypeNames<'_>,
) -> CodegenResult<BuiltinDef> {
    let members = b
        .members
        .iter()
        .map(|m| {
            let context = format!("{}.{}", b.name, m.name);
            let ty = TypeRef::parse(&m.ty, names, &context)?;
            let placed = layout.and_then(|l| l.members.iter().find(|o| o.member == m.name));
            // Nested value members carry their type name as meta; only
            // numeric widths matter here.
            let meta = placed
                .and_then(|o| o.meta.as_deref())
                .and_then(|meta| WidthMeta::parse(meta, &context).ok());
            Ok(BuiltinMember {
                name: m.name.clone(),
                ty,
                offset: placed.map(|o| o.offset),
                meta,
            })
        })
        .collect::<CodegenResult<Vec<_>>>()?;
    let constructors = b
        .constructors
        .iter()
        .map(|c| {
            let owner = format!("{}#{}", b.name, c.index);
            let arguments = c
                .arguments
                .iter()
                .map(|a| load_argument(a, names, &owner))
                .collect::<CodegenResult<Vec<_>>>()?;
            Ok(ConstructorDef {
                index: c.index,
                arguments,
            })
        })
        .collect::<CodegenResult<Vec<_>>>()?;
    let operators = b
        .operators
        .iter()
        .map(|o| {
            let context = format!("{} operator {}", b.name, o.name);
            Ok(OperatorDef {
                symbol: o.name.clone(),
                right: o.right_type.clone(),
                ret: TypeRef::parse(&o.return_type, names, &context)?,
            })
        })
        .collect::<CodegenResult<Vec<_>>>()?;
    Ok(BuiltinDef {
        name: b.name.clone(),
        members,
        constructors,
        operators,
        enums: b.enums.iter().map(load_enum).collect(),
    })
}

fn load_utility(u: &schema::UtilityFunctionInfo, names: &TypeNames<'_>) -> CodegenResult<UtilityDef> {
    let owner = format!("utility {}", u.name);
    let ret = match u.return_type.as_deref() {
        Some(t) => Some(TypeRef::parse(t, names, &owner)?).filter(|t| *t != TypeRef::Void),
        None => None,
    };
    Ok(UtilityDef {
        name: u.name.clone(),
        category: u.category.clone(),
        ret,
        arguments: u
            .arguments
            .iter()
            .map(|a| load_argument(a, names, &owner))
            .collect::<CodegenResult<Vec<_>>>()?,
        is_vararg: u.is_vararg,
        hash: u.hash,
    })
}
