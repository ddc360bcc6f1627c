// Rust class generation: wrapper struct, Deref chain to the parent, bound
// methods, property accessors and the virtual-override surface.

use crate::plan::ClassPlan;

use super::enums::generate_enum;
use super::methods::generate_method;
use super::properties::generate_property;
use super::virtuals::{generate_dispatcher, generate_trait, generate_trampoline};

/// Generate the body of one class artifact (no imports).
pub fn generate_class(plan: &ClassPlan) -> String {
    let mut out = String::with_capacity(8192);
    let name = &plan.name;

    let mut doc = format!("/// Engine class `{name}`");
    if let Some(parent) = &plan.parent {
        doc.push_str(&format!(", inherits `{parent}`"));
    }
    doc.push_str(".\n");
    if plan.is_refcounted {
        doc.push_str("///\n/// Reference-counted by the engine.\n");
    }
    if plan.is_singleton {
        doc.push_str("///\n/// Engine singleton.\n");
    }
    out.push_str(&doc);

    match &plan.parent {
        Some(parent) => {
            out.push_str(&format!(
                "#[repr(transparent)]\n\
                 #[derive(Debug, Clone, Copy, PartialEq, Eq)]\n\
                 pub struct {name} {{\n\
                 \x20   base: {parent},\n\
                 }}\n\n\
                 impl std::ops::Deref for {name} {{\n\
                 \x20   type Target = {parent};\n\n\
                 \x20   fn deref(&self) -> &{parent} {{\n\
                 \x20       &self.base\n\
                 \x20   }}\n\
                 }}\n\n\
                 impl gdbind_abi::Wrapped for {name} {{\n\
                 \x20   const CLASS_NAME: &'static str = \"{name}\";\n\n\
                 \x20   fn from_handle(handle: gdbind_abi::ObjectHandle) -> Self {{\n\
                 \x20       {name} {{ base: <{parent} as gdbind_abi::Wrapped>::from_handle(handle) }}\n\
                 \x20   }}\n\n\
                 \x20   fn handle(&self) -> gdbind_abi::ObjectHandle {{\n\
                 \x20       gdbind_abi::Wrapped::handle(&self.base)\n\
                 \x20   }}\n\
                 }}\n\n"
            ));
        }
        None => {
            out.push_str(&format!(
                "#[repr(transparent)]\n\
                 #[derive(Debug, Clone, Copy, PartialEq, Eq)]\n\
                 pub struct {name} {{\n\
                 \x20   handle: gdbind_abi::ObjectHandle,\n\
                 }}\n\n\
                 impl gdbind_abi::Wrapped for {name} {{\n\
                 \x20   const CLASS_NAME: &'static str = \"{name}\";\n\n\
                 \x20   fn from_handle(handle: gdbind_abi::ObjectHandle) -> Self {{\n\
                 \x20       {name} {{ handle }}\n\
                 \x20   }}\n\n\
                 \x20   fn handle(&self) -> gdbind_abi::ObjectHandle {{\n\
                 \x20       self.handle\n\
                 \x20   }}\n\
                 }}\n\n"
            ));
        }
    }

    for e in &plan.enums {
        out.push_str(&generate_enum(e, Some(name)));
        out.push('\n');
    }

    out.push_str(&format!(
        "impl {name} {{\n\
         \x20   /// Wrapper over a null handle. Bypasses registration; used as the\n\
         \x20   /// zero value of `{name}`.\n\
         \x20   pub fn fast() -> Self {{\n\
         \x20       <Self as gdbind_abi::Wrapped>::from_handle(gdbind_abi::ObjectHandle::NULL)\n\
         \x20   }}\n\n"
    ));
    if plan.is_instantiable {
        out.push_str(&format!(
            "    pub fn new() -> gdbind_abi::AbiResult<Self> {{\n\
             \x20       gdbind_abi::construct_object(\"{name}\").map(<Self as gdbind_abi::Wrapped>::from_handle)\n\
             \x20   }}\n\n"
        ));
    }
    for method in &plan.methods {
        generate_method(&mut out, name, method);
    }
    for prop in &plan.properties {
        generate_property(&mut out, prop);
    }
    // Drop the blank line before the closing brace.
    if out.ends_with("\n\n") {
        out.pop();
    }
    out.push_str("}\n\n");

    let parent = plan.parent.as_deref();
    generate_trait(&mut out, name, parent, &plan.virtuals);
    for v in &plan.virtuals {
        generate_trampoline(&mut out, name, v);
    }
    generate_dispatcher(&mut out, name, parent, &plan.virtuals);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan_class;
    use crate::registry::tests::fixture;

    fn render(class: &str) -> String {
        let reg = fixture();
        generate_class(&plan_class(reg.lookup_class(class).unwrap(), &reg).unwrap())
    }

    #[test]
    fn child_class_derefs_to_parent() {
        let code = render("Foo");
        assert!(code.contains("/// Engine class `Foo`, inherits `Base`."));
        assert!(code.contains("pub struct Foo {\n    base: Base,\n}"));
        assert!(code.contains("impl std::ops::Deref for Foo {"));
        assert!(code.contains("const CLASS_NAME: &'static str = \"Foo\";"));
        assert!(code.contains("pub struct FooKind(pub i64);"));
        assert!(code.contains("pub fn new() -> gdbind_abi::AbiResult<Self> {"));
    }

    #[test]
    fn root_class_owns_the_handle() {
        let code = render("Object");
        assert!(code.contains("pub struct Object {\n    handle: gdbind_abi::ObjectHandle,\n}"));
        assert!(!code.contains("impl std::ops::Deref for Object"));
    }

    #[test]
    fn non_instantiable_classes_have_no_constructor() {
        let code = render("Shape");
        assert!(code.contains("pub fn fast() -> Self {"));
        assert!(!code.contains("pub fn new()"));
    }

    #[test]
    fn skipped_members_are_absent_and_siblings_present() {
        let code = render("Foo");
        assert!(!code.contains("call_deferred_thing"));
        assert!(!code.contains("get_buffer"));
        assert!(!code.contains("hidden_thing"));
        assert!(code.contains("pub fn get_speed(&self) -> f64 {"));
        assert!(code.contains("pub fn size(&self) -> Vector2 {"));
        assert!(code.contains("fn raw_get_size(&self) -> Vector2 {"));
    }
}
