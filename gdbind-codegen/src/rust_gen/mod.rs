// Rust code generation orchestrator.

pub mod classes;
pub mod core_defs;
pub mod enums;
pub mod methods;
pub mod properties;
pub mod virtuals;

use std::path::PathBuf;

use rayon::prelude::*;

use crate::diag::Diagnostic;
use crate::error::CodegenResult;
use crate::naming::module_name;
use crate::plan::plan_class;
use crate::registry::Registry;

const LINT_ALLOWS: &str = "#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals, \
                           dead_code, unused_imports, clippy::all)]\n";

/// One output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

/// Rendered class, before it is laid out into files.
#[derive(Debug, Clone)]
pub struct ClassArtifact {
    pub class: String,
    pub module: String,
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
pub struct Generated {
    pub artifacts: Vec<Artifact>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generated {
    pub fn artifact(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.path == PathBuf::from(path))
    }
}

fn banner(reg: &Registry) -> String {
    format!(
        "// Generated by gdbind for build configuration `{}`. Do not edit.\n",
        reg.configuration()
    )
}

/// Plan and render every class (in parallel, declaration order kept) plus
/// the core definitions. The first fatal error aborts the run.
pub fn generate(reg: &Registry, single_file: bool) -> CodegenResult<Generated> {
    let classes: Vec<ClassArtifact> = reg
        .classes()
        .par_iter()
        .map(|class| {
            let plan = plan_class(class, reg)?;
            Ok(ClassArtifact {
                class: plan.name.clone(),
                module: module_name(&plan.name),
                code: classes::generate_class(&plan),
                diagnostics: plan.diagnostics,
            })
        })
        .collect::<CodegenResult<Vec<_>>>()?;
    tracing::info!(classes = classes.len(), "rendered class artifacts");

    let (core, core_diagnostics) = core_defs::generate_core_defs(reg)?;

    let mut diagnostics = core_diagnostics;
    for class in &classes {
        diagnostics.extend(class.diagnostics.iter().cloned());
    }

    let artifacts = if single_file {
        vec![single_file_layout(reg, &core, &classes)]
    } else {
        directory_layout(reg, &core, &classes)
    };
    Ok(Generated {
        artifacts,
        diagnostics,
    })
}

fn directory_layout(reg: &Registry, core: &str, classes: &[ClassArtifact]) -> Vec<Artifact> {
    let banner = banner(reg);
    let mut artifacts = Vec::with_capacity(classes.len() + 3);

    artifacts.push(Artifact {
        path: PathBuf::from("lib.rs"),
        contents: format!(
            "{banner}{LINT_ALLOWS}\n\
             pub mod classes;\n\
             pub mod core_defs;\n\n\
             pub use classes::*;\n\
             pub use core_defs::*;\n"
        ),
    });
    artifacts.push(Artifact {
        path: PathBuf::from("core_defs.rs"),
        contents: format!("{banner}\nuse crate::*;\nuse gdbind_abi::Wrapped;\n\n{core}"),
    });

    let mut mod_rs = banner.clone();
    mod_rs.push('\n');
    for class in classes {
        mod_rs.push_str(&format!("pub mod {};\n", class.module));
    }
    mod_rs.push('\n');
    for class in classes {
        mod_rs.push_str(&format!("pub use {}::*;\n", class.module));
    }
    artifacts.push(Artifact {
        path: PathBuf::from("classes").join("mod.rs"),
        contents: mod_rs,
    });

    for class in classes {
        artifacts.push(Artifact {
            path: PathBuf::from("classes").join(format!("{}.rs", class.module.trim_start_matches("r#"))),
            contents: format!("{banner}\nuse crate::*;\nuse gdbind_abi::Wrapped;\n\n{}", class.code),
        });
    }
    artifacts
}

fn single_file_layout(reg: &Registry, core: &str, classes: &[ClassArtifact]) -> Artifact {
    let mut out = banner(reg);
    out.push_str(LINT_ALLOWS);
    out.push_str("\nuse gdbind_abi::Wrapped;\n\n");
    out.push_str(core);
    for class in classes {
        out.push_str(&format!(
            "pub mod {} {{\n\
             use super::*;\n\n\
             {}}}\n\
             pub use {}::*;\n\n",
            class.module, class.code, class.module
        ));
    }
    Artifact {
        path: PathBuf::from("generated.rs"),
        contents: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::SkipReason;
    use crate::registry::tests::fixture;

    #[test]
    fn directory_layout_has_one_file_per_class() {
        let generated = generate(&fixture(), false).unwrap();
        let paths: Vec<String> = generated
            .artifacts
            .iter()
            .map(|a| a.path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            paths,
            [
                "lib.rs",
                "core_defs.rs",
                "classes/mod.rs",
                "classes/object.rs",
                "classes/ref_counted.rs",
                "classes/base.rs",
                "classes/foo.rs",
                "classes/shape.rs",
            ]
        );
        let mod_rs = generated.artifact("classes/mod.rs").unwrap();
        assert!(mod_rs.contents.contains("pub mod foo;\n"));
        assert!(mod_rs.contents.contains("pub use foo::*;\n"));
    }

    #[test]
    fn foo_bar_scenario_end_to_end() {
        let generated = generate(&fixture(), false).unwrap();
        let foo = &generated.artifact("classes/foo.rs").unwrap().contents;
        assert!(foo.starts_with("// Generated by gdbind for build configuration `double_64`."));
        assert!(foo.contains("pub fn bar(&self, x: i32) -> f64 {"));
        assert!(foo.contains("LazyMethodBind::new(\"Foo\", \"bar\", 1234)"));
    }

    #[test]
    fn shape_draw_is_rejected_everywhere() {
        let generated = generate(&fixture(), false).unwrap();
        let shape = &generated.artifact("classes/shape.rs").unwrap().contents;
        assert!(!shape.contains("_draw"));
        assert!(generated.diagnostics.iter().any(|d| d.owner == "Shape"
            && d.member == "_draw"
            && matches!(d.reason, SkipReason::UnsupportedVirtualArg { .. })));
    }

    #[test]
    fn single_file_wraps_classes_in_modules() {
        let generated = generate(&fixture(), true).unwrap();
        assert_eq!(generated.artifacts.len(), 1);
        let all = &generated.artifacts[0];
        assert_eq!(all.path, PathBuf::from("generated.rs"));
        assert!(all.contents.contains("pub mod foo {\nuse super::*;\n"));
        assert!(all.contents.contains("pub use foo::*;"));
        assert!(all.contents.contains("pub struct GodotCollection<T>"));
    }
}
