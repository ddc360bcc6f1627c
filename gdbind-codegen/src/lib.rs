// gdbind-codegen: reads the engine's extension_api.json and generates Rust
// bindings (core types, class wrappers, virtual dispatch) against gdbind-abi.

pub mod config;
pub mod defaults;
pub mod diag;
pub mod error;
pub mod identity;
pub mod model;
pub mod naming;
pub mod plan;
pub mod registry;
pub mod rust_gen;
pub mod schema;
pub mod sink;
pub mod type_map;
pub mod type_ref;

use tracing::info;

use crate::config::GenerateOptions;
use crate::error::{CodegenError, CodegenResult};
use crate::registry::Registry;
use crate::rust_gen::Generated;
use crate::schema::ApiFile;
use crate::sink::DirSink;
use crate::type_map::BuildConfiguration;

/// Load, plan, render and write. Returns what was generated so callers can
/// report counts and diagnostics.
pub fn run_generate(opts: &GenerateOptions) -> CodegenResult<Generated> {
    let configuration = BuildConfiguration::parse(&opts.build_configuration)?;

    info!(path = %opts.api_json.display(), "loading JSON...");
    let text = std::fs::read_to_string(&opts.api_json).map_err(|source| CodegenError::Read {
        path: opts.api_json.clone(),
        source,
    })?;
    let api: ApiFile = serde_json::from_str(&text)?;
    if let Some(header) = &api.header {
        info!(
            "  engine {}.{}.{} {}",
            header.version_major, header.version_minor, header.version_patch, header.version_full_name
        );
    }

    let registry = Registry::load(&api, configuration)?;
    info!(
        "  loaded {} classes, {} builtins, {} global enums, {} utilities, {} native structures",
        registry.classes().len(),
        registry.builtins().len(),
        registry.global_enums().len(),
        registry.utilities().len(),
        registry.native_structs().len()
    );

    info!(%configuration, single_file = opts.single_file, "generating Rust code...");
    let generated = rust_gen::generate(&registry, opts.single_file)?;
    for diagnostic in &generated.diagnostics {
        diagnostic.log();
    }

    info!(out = %opts.out_dir.display(), "writing {} files...", generated.artifacts.len());
    let mut sink = DirSink::new(&opts.out_dir);
    sink::write_all(&mut sink, &generated.artifacts)?;

    info!("verifying output...");
    let problems = sink::verify_written(sink.root(), &generated.artifacts);
    if !problems.is_empty() {
        return Err(CodegenError::Verification(problems));
    }

    info!(skipped = generated.diagnostics.len(), "done!");
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::fixture_json;

    fn options(dir: &std::path::Path, configuration: &str) -> GenerateOptions {
        let api_json = dir.join("extension_api.json");
        std::fs::write(&api_json, fixture_json().to_string()).unwrap();
        GenerateOptions {
            api_json,
            out_dir: dir.join("generated"),
            build_configuration: configuration.to_string(),
            single_file: false,
        }
    }

    #[test]
    fn generates_a_module_tree() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), "double_64");
        let generated = run_generate(&opts).unwrap();

        assert!(!generated.diagnostics.is_empty());
        let lib = std::fs::read_to_string(opts.out_dir.join("lib.rs")).unwrap();
        assert!(lib.contains("pub mod classes;"));
        let foo = std::fs::read_to_string(opts.out_dir.join("classes").join("foo.rs")).unwrap();
        assert!(foo.contains("pub fn bar(&self, x: i32) -> f64 {"));
    }

    #[test]
    fn single_configuration_changes_real_width() {
        let dir = tempfile::tempdir().unwrap();
        let opts = GenerateOptions {
            single_file: true,
            ..options(dir.path(), "float_32")
        };
        run_generate(&opts).unwrap();
        let all = std::fs::read_to_string(opts.out_dir.join("generated.rs")).unwrap();
        assert!(all.contains("`float_32`"));
        assert!(all.contains("pub x: f32,"));
    }

    #[test]
    fn unknown_configuration_is_rejected_before_reading() {
        let opts = GenerateOptions {
            api_json: "does/not/exist.json".into(),
            out_dir: "unused".into(),
            build_configuration: "quad_128".to_string(),
            single_file: false,
        };
        let err = run_generate(&opts).unwrap_err();
        assert!(matches!(err, CodegenError::UnknownConfiguration(_)));
    }

    #[test]
    fn missing_api_json_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let opts = GenerateOptions {
            api_json: dir.path().join("missing.json"),
            out_dir: dir.path().join("out"),
            build_configuration: "double_64".to_string(),
            single_file: false,
        };
        let err = run_generate(&opts).unwrap_err();
        assert!(matches!(err, CodegenError::Read { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn malformed_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), "double_64");
        std::fs::write(&opts.api_json, "{ not json").unwrap();
        assert!(matches!(run_generate(&opts).unwrap_err(), CodegenError::Json(_)));
    }
}
