// Overridable virtuals: the `<Class>Virtual` trait, one trampoline per
// accepted method, and the name → trampoline dispatcher.

use crate::plan::VirtualPlan;
use crate::plan::virtuals::{VirtualArgRead, VirtualRetStore};

pub fn trait_name(class: &str) -> String {
    format!("{class}Virtual")
}

/// Trait with one default method per accepted virtual. Overrides are
/// optional; the default body returns the type's zero value.
pub fn generate_trait(out: &mut String, class: &str, parent: Option<&str>, virtuals: &[VirtualPlan]) {
    let name = trait_name(class);
    let supertrait = match parent {
        Some(p) => format!(": {}", trait_name(p)),
        None => String::new(),
    };
    out.push_str(&format!(
        "/// Overridable virtuals declared by `{class}`.\n\
         pub trait {name}{supertrait} {{\n"
    ));
    for (i, v) in virtuals.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let receiver = if v.is_const { "&self" } else { "&mut self" };
        let params: String = v
            .args
            .iter()
            .map(|a| format!(", _{}: {}", a.name.trim_start_matches("r#"), a.param_type()))
            .collect();
        match &v.ret {
            Some(ret) => out.push_str(&format!(
                "    fn {}({receiver}{params}) -> {} {{\n\
                 \x20       {}\n\
                 \x20   }}\n",
                v.trait_method,
                ret.target.rust_type(),
                v.default
            )),
            None => out.push_str(&format!("    fn {}({receiver}{params}) {{}}\n", v.trait_method)),
        }
    }
    out.push_str("}\n\n");
}

pub fn generate_trampoline(out: &mut String, class: &str, v: &VirtualPlan) {
    let bound = trait_name(class);
    let args_param = if v.args.is_empty() { "_args" } else { "args" };
    let ret_param = if v.ret.is_some() { "ret" } else { "_ret" };
    out.push_str(&format!(
        "unsafe extern \"C\" fn {}<T: {bound}>(\n\
         \x20   instance: *mut std::ffi::c_void,\n\
         \x20   {args_param}: *const *const std::ffi::c_void,\n\
         \x20   {ret_param}: *mut std::ffi::c_void,\n\
         ) {{\n\
         \x20   gdbind_abi::ffi_boundary(\"{class}.{}\", || unsafe {{\n\
         \x20       let this = gdbind_abi::instance_mut::<T>(instance)?;\n",
        v.trampoline, v.schema_name
    ));

    if !v.args.is_empty() {
        out.push_str(&format!(
            "        let slots = gdbind_abi::ArgSlots::new(args, {})?;\n",
            v.args.len()
        ));
    }
    for (i, arg) in v.args.iter().enumerate() {
        let read = match arg.read {
            VirtualArgRead::Value => {
                format!("slots.value::<{}>({i})?", arg.target.rust_type())
            }
            VirtualArgRead::Widen { raw } => {
                format!("slots.value::<{raw}>({i})? as {}", arg.target.rust_type())
            }
            VirtualArgRead::Object { dynamic } => {
                let convert = if dynamic { "lookup_object" } else { "wrap_object" };
                format!(
                    "gdbind_abi::{convert}::<{}>(slots.value::<gdbind_abi::ObjectHandle>({i})?)",
                    arg.target.rust_type()
                )
            }
        };
        out.push_str(&format!("        let {} = {read};\n", arg.name));
    }

    let call_args = v.args.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ");
    match &v.ret {
        Some(ret) => {
            out.push_str(&format!("        let out = this.{}({call_args});\n", v.trait_method));
            let stored = match ret.store {
                VirtualRetStore::Handle => "&out.handle()".to_string(),
                VirtualRetStore::Widen { raw } => format!("&{raw}::from(out)"),
                VirtualRetStore::Value | VirtualRetStore::Content => "&out".to_string(),
            };
            out.push_str(&format!(
                "        gdbind_abi::RetSlot::new(ret, {}).store({stored})?;\n",
                ret.capacity
            ));
        }
        None => out.push_str(&format!("        this.{}({call_args});\n", v.trait_method)),
    }
    out.push_str(
        "        Ok(())\n\
         \x20   });\n\
         }\n\n",
    );
}

/// `virtual_dispatcher::<T>(name)`: own names first, then the parent's
/// dispatcher; the root class answers `None`.
pub fn generate_dispatcher(out: &mut String, class: &str, parent: Option<&str>, virtuals: &[VirtualPlan]) {
    let bound = trait_name(class);
    out.push_str(&format!(
        "impl {class} {{\n\
         \x20   pub fn virtual_dispatcher<T: {bound}>(name: &str) -> Option<gdbind_abi::VirtualFn> {{\n"
    ));
    let fallback = match parent {
        Some(p) => format!("{p}::virtual_dispatcher::<T>(name)"),
        None => "None".to_string(),
    };
    if virtuals.is_empty() {
        if parent.is_none() {
            out.push_str("        let _ = name;\n");
        }
        out.push_str(&format!("        {fallback}\n"));
    } else {
        out.push_str("        match name {\n");
        for v in virtuals {
            out.push_str(&format!(
                "            \"{}\" => Some({}::<T> as gdbind_abi::VirtualFn),\n",
                v.schema_name, v.trampoline
            ));
        }
        out.push_str(&format!("            _ => {fallback},\n        }}\n"));
    }
    out.push_str("    }\n}\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan_class;
    use crate::registry::tests::fixture;

    fn render(class: &str) -> String {
        let reg = fixture();
        let plan = plan_class(reg.lookup_class(class).unwrap(), &reg).unwrap();
        let parent = plan.parent.as_deref();
        let mut out = String::new();
        generate_trait(&mut out, class, parent, &plan.virtuals);
        for v in &plan.virtuals {
            generate_trampoline(&mut out, class, v);
        }
        generate_dispatcher(&mut out, class, parent, &plan.virtuals);
        out
    }

    #[test]
    fn trait_chains_to_parent_with_default_bodies() {
        let code = render("Foo");
        assert!(code.contains("pub trait FooVirtual: BaseVirtual {"));
        assert!(code.contains("fn _on_hit(&mut self, _other: Option<Base>, _at: Vector2) -> bool {\n        false\n    }"));
        let base = render("Base");
        assert!(base.contains("fn _ready(&mut self) {}"));
        assert!(base.contains("fn _get_weight(&self) -> f64 {\n        0.0f64\n    }"));
    }

    #[test]
    fn trampoline_reads_slots_and_stores_through_checked_return() {
        let code = render("Foo");
        assert!(code.contains("unsafe extern \"C\" fn foo_proxy_on_hit<T: FooVirtual>("));
        assert!(code.contains("gdbind_abi::ffi_boundary(\"Foo._on_hit\""));
        assert!(code.contains("let slots = gdbind_abi::ArgSlots::new(args, 2)?;"));
        assert!(code.contains(
            "let other = gdbind_abi::lookup_object::<Base>(slots.value::<gdbind_abi::ObjectHandle>(0)?);"
        ));
        assert!(code.contains("let at = slots.value::<Vector2>(1)?;"));
        assert!(code.contains("gdbind_abi::RetSlot::new(ret, 1).store(&out)?;"));
    }

    #[test]
    fn single_precision_override_results_fill_the_whole_slot() {
        let reg = crate::registry::tests::fixture_with(crate::type_map::BuildConfiguration::Float64);
        let plan = plan_class(reg.lookup_class("Base").unwrap(), &reg).unwrap();
        let weight = plan.virtuals.iter().find(|v| v.schema_name == "_get_weight").unwrap();
        let mut code = String::new();
        generate_trampoline(&mut code, "Base", weight);
        assert!(code.contains("let out = this._get_weight();"));
        assert!(code.contains("gdbind_abi::RetSlot::new(ret, 8).store(&f64::from(out))?;"));
    }

    #[test]
    fn dispatcher_matches_own_names_and_defers_to_parent() {
        let code = render("Foo");
        assert!(code.contains("\"_on_hit\" => Some(foo_proxy_on_hit::<T> as gdbind_abi::VirtualFn),"));
        assert!(code.contains("_ => Base::virtual_dispatcher::<T>(name),"));

        let root = render("Object");
        assert!(root.contains("pub trait ObjectVirtual {"));
        assert!(root.contains("let _ = name;\n        None\n"));
    }

    #[test]
    fn rejected_virtuals_never_reach_the_dispatcher() {
        let code = render("Shape");
        assert!(!code.contains("\"_draw\""));
        assert!(!code.contains("fn _draw"));
        assert!(code.contains("\"_area\" => Some(shape_proxy_area::<T> as gdbind_abi::VirtualFn),"));
    }
}
