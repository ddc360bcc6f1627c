// Per-class marshalling plans. A plan holds every decision the renderer
// needs; rendering itself makes none.

pub mod methods;
pub mod properties;
pub mod virtuals;

use crate::diag::Diagnostic;
use crate::error::CodegenResult;
use crate::model::{ClassDef, EnumDef};
use crate::registry::Registry;

pub use methods::{ArgPass, ArgPlan, MethodPlan, RetPass, RetPlan};
pub use properties::{PropertyPlan, SetterValue};
pub use virtuals::{DispatchTable, Dispatcher, VirtualPlan};

#[derive(Debug, Clone)]
pub struct ClassPlan {
    pub name: String,
    pub parent: Option<String>,
    pub is_instantiable: bool,
    pub is_refcounted: bool,
    pub is_singleton: bool,
    pub methods: Vec<MethodPlan>,
    pub virtuals: Vec<VirtualPlan>,
    pub properties: Vec<PropertyPlan>,
    pub enums: Vec<EnumDef>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the complete plan for one class. Only schema/engine mismatches are
/// errors; unsupported members land in `diagnostics`.
pub fn plan_class(class: &ClassDef, reg: &Registry) -> CodegenResult<ClassPlan> {
    let mut diagnostics = Vec::new();
    let mut methods = methods::plan_methods(class, reg, &mut diagnostics)?;
    let virtuals = virtuals::plan_virtuals(class, reg, &mut diagnostics)?;
    let properties = properties::plan_properties(class, &mut methods, &mut diagnostics);

    Ok(ClassPlan {
        name: class.name.clone(),
        parent: class.parent.clone(),
        is_instantiable: class.is_instantiable,
        is_refcounted: class.is_refcounted,
        is_singleton: reg.is_singleton(&class.name),
        methods,
        virtuals,
        properties,
        enums: class.enums.clone(),
        diagnostics,
    })
}
