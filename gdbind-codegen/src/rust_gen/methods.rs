// Bound-method wrappers: lazy bind, argument slots, return storage, ptrcall.

use crate::plan::{ArgPass, ArgPlan, MethodPlan, RetPass, RetPlan};

const BODY: &str = "        ";

/// `name: Type` list for a signature.
pub fn param_list(args: &[ArgPlan]) -> String {
    args.iter()
        .map(|a| format!("{}: {}", a.name, a.param_type()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Statements that put every argument into addressable storage, ending
/// with the `args` pointer array.
pub fn marshal_args(out: &mut String, args: &[ArgPlan]) {
    let mut slots = Vec::with_capacity(args.len());
    for arg in args {
        let name = &arg.name;
        if let Some(default) = &arg.default {
            out.push_str(&format!("{BODY}let {name} = {name}.unwrap_or({default});\n"));
        }
        let slot = match &arg.pass {
            ArgPass::CopyInt { raw } => {
                let accessor = if *raw == "u64" { "bits" } else { "ord" };
                out.push_str(&format!("{BODY}let {name}_raw: {raw} = {name}.{accessor}();\n"));
                format!("(&{name}_raw as *const {raw}).cast()")
            }
            ArgPass::CopyValue => {
                format!("(&{name} as *const {}).cast()", arg.target.rust_type())
            }
            ArgPass::Widen { raw } => {
                out.push_str(&format!("{BODY}let {name}_raw = {raw}::from({name});\n"));
                format!("(&{name}_raw as *const {raw}).cast()")
            }
            ArgPass::Content => format!("{name}.as_ptr()"),
            ArgPass::Handle => {
                out.push_str(&format!(
                    "{BODY}let {name}_handle = {name}.map_or(gdbind_abi::ObjectHandle::NULL, |v| v.handle());\n"
                ));
                format!("(&{name}_handle as *const gdbind_abi::ObjectHandle).cast()")
            }
            ArgPass::Direct => format!("{name}.cast_const()"),
        };
        slots.push(slot);
    }
    out.push_str(&format!(
        "{BODY}let args: [*const std::ffi::c_void; {}] = [{}];\n",
        slots.len(),
        slots.join(", ")
    ));
}

/// Return storage declaration, the pointer handed to the engine, and the
/// expression that produces the Rust result afterwards.
pub struct RetStorage {
    pub decl: Option<String>,
    pub ptr: String,
    pub result: Option<String>,
}

pub fn ret_storage(ret: Option<&RetPlan>) -> RetStorage {
    let Some(ret) = ret else {
        return RetStorage {
            decl: None,
            ptr: "std::ptr::null_mut()".to_string(),
            result: None,
        };
    };
    let ty = ret.target.rust_type();
    let typed_ptr = |ty: &str| format!("(&mut ret as *mut {ty}).cast()");
    let (decl, ptr, result) = match &ret.pass {
        RetPass::CopyInt | RetPass::CopyValue | RetPass::Direct => (
            format!("let mut ret: {ty} = {};", ret.init),
            typed_ptr(&ty),
            "ret".to_string(),
        ),
        RetPass::Widen { raw } => (
            format!("let mut ret: {raw} = {raw}::default();"),
            typed_ptr(raw),
            format!("ret as {ty}"),
        ),
        RetPass::Content => (
            format!("let mut ret = {};", ret.init),
            "ret.as_mut_ptr()".to_string(),
            "ret".to_string(),
        ),
        RetPass::Collection => (
            "let mut ret = <GArray>::default();".to_string(),
            "ret.as_mut_ptr()".to_string(),
            format!("<{ty}>::from_array(ret)"),
        ),
        RetPass::Object { dynamic } => {
            let convert = if *dynamic { "lookup_object" } else { "wrap_object" };
            (
                "let mut ret = gdbind_abi::ObjectHandle::NULL;".to_string(),
                typed_ptr("gdbind_abi::ObjectHandle"),
                format!("gdbind_abi::{convert}::<{ty}>(ret)"),
            )
        }
    };
    RetStorage {
        decl: Some(decl),
        ptr,
        result: Some(result),
    }
}

/// Emit one bound method into an `impl <Class>` block.
pub fn generate_method(out: &mut String, class: &str, plan: &MethodPlan) {
    let vis = if plan.private { "" } else { "pub " };
    let receiver = if plan.is_static { "" } else { "&self" };
    let params = param_list(&plan.args);
    let sep = if !receiver.is_empty() && !params.is_empty() { ", " } else { "" };
    let ret_ty = plan
        .ret
        .as_ref()
        .map(|r| format!(" -> {}", r.rust_type()))
        .unwrap_or_default();

    out.push_str(&format!("    /// `{}`\n", plan.identity));
    out.push_str(&format!(
        "    {vis}fn {}({receiver}{sep}{params}){ret_ty} {{\n",
        plan.rust_name
    ));
    out.push_str(&format!(
        "{BODY}static BIND: gdbind_abi::LazyMethodBind = gdbind_abi::LazyMethodBind::new(\"{class}\", \"{}\", {});\n",
        plan.schema_name, plan.hash
    ));
    marshal_args(out, &plan.args);

    let storage = ret_storage(plan.ret.as_ref());
    if let Some(decl) = &storage.decl {
        out.push_str(&format!("{BODY}{decl}\n"));
    }
    let instance = if plan.is_static {
        "gdbind_abi::ObjectHandle::NULL"
    } else {
        "self.handle()"
    };
    out.push_str(&format!(
        "{BODY}unsafe {{ gdbind_abi::ptrcall(BIND.get(), {instance}, args.as_ptr(), {}) }};\n",
        storage.ptr
    ));
    if let Some(result) = &storage.result {
        out.push_str(&format!("{BODY}{result}\n"));
    }
    out.push_str("    }\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan_class;
    use crate::registry::tests::fixture;

    fn render(name: &str) -> String {
        let reg = fixture();
        let plan = plan_class(reg.lookup_class("Foo").unwrap(), &reg).unwrap();
        let method = plan.methods.iter().find(|m| m.schema_name == name).unwrap();
        let mut out = String::new();
        generate_method(&mut out, "Foo", method);
        out
    }

    #[test]
    fn bar_binds_by_class_method_and_hash() {
        let code = render("bar");
        assert!(code.contains("pub fn bar(&self, x: i32) -> f64 {"));
        assert!(code.contains("LazyMethodBind::new(\"Foo\", \"bar\", 1234)"));
        assert!(code.contains("let x_raw = i64::from(x);"));
        assert!(code.contains("let args: [*const std::ffi::c_void; 1] = [(&x_raw as *const i64).cast()];"));
        assert!(code.contains("let mut ret: f64 = 0.0f64;"));
        assert!(code.contains("gdbind_abi::ptrcall(BIND.get(), self.handle(), args.as_ptr(), (&mut ret as *mut f64).cast())"));
    }

    #[test]
    fn single_precision_returns_are_read_from_a_double_slot() {
        let reg = crate::registry::tests::fixture_with(crate::type_map::BuildConfiguration::Float64);
        let plan = plan_class(reg.lookup_class("Foo").unwrap(), &reg).unwrap();
        let bar = plan.methods.iter().find(|m| m.schema_name == "bar").unwrap();
        let mut code = String::new();
        generate_method(&mut code, "Foo", bar);
        assert!(code.contains("pub fn bar(&self, x: i32) -> f32 {"));
        assert!(code.contains("let mut ret: f64 = f64::default();"));
        assert!(code.contains("(&mut ret as *mut f64).cast()"));
        assert!(code.contains("        ret as f32\n"));
    }

    #[test]
    fn enum_and_bitfield_arguments_travel_as_raw_integers() {
        let code = render("set_kind");
        assert!(code.contains("kind: Option<FooKind>, mask: Option<KeyModifierMask>"));
        assert!(code.contains("let kind = kind.unwrap_or(FooKind(0));"));
        assert!(code.contains("let kind_raw: i64 = kind.ord();"));
        assert!(code.contains("let mask_raw: u64 = mask.bits();"));
        assert!(code.contains("std::ptr::null_mut()"));
    }

    #[test]
    fn object_arguments_and_returns_go_through_handles() {
        let code = render("put_data");
        assert!(code.contains("data: &PackedByteArray, target: Option<&Base>"));
        assert!(code.contains("data.as_ptr()"));
        assert!(code.contains("let target_handle = target.map_or(gdbind_abi::ObjectHandle::NULL, |v| v.handle());"));

        assert!(render("get_child").contains("gdbind_abi::lookup_object::<Base>(ret)"));
        assert!(render("get_parent_foo").contains("gdbind_abi::wrap_object::<Foo>(ret)"));
        assert!(render("get_children").contains("<GodotCollection<Base>>::from_array(ret)"));
    }

    #[test]
    fn static_methods_have_no_receiver() {
        let code = render("make");
        assert!(code.contains("pub fn make() -> Option<Foo> {"));
        assert!(code.contains("BIND.get(), gdbind_abi::ObjectHandle::NULL,"));
    }

    #[test]
    fn property_backing_methods_are_private() {
        let code = render("get_size");
        assert!(code.contains("    fn raw_get_size(&self) -> Vector2 {"));
        assert!(!code.contains("pub fn raw_get_size"));
    }
}
