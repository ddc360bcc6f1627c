// Configuration types for gdbind-codegen, deserialized from gdbind.toml.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CodegenError, CodegenResult};

/// Top-level config file.
#[derive(Deserialize, Debug, Default)]
pub struct GdbindConfig {
    #[serde(default)]
    pub codegen: CodegenConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CodegenConfig {
    /// Path to `extension_api.json`, relative to the config file.
    pub api_json: String,
    /// Output directory, relative to the config file.
    pub out_dir: String,
    /// One of float_32 / float_64 / double_32 / double_64.
    pub build_configuration: String,
    /// Emit one `generated.rs` instead of a file per class.
    pub single_file: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        CodegenConfig {
            api_json: "extension_api.json".to_string(),
            out_dir: "generated".to_string(),
            build_configuration: "double_64".to_string(),
            single_file: false,
        }
    }
}

/// Fully resolved generation options (paths absolute or cwd-relative).
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub api_json: PathBuf,
    pub out_dir: PathBuf,
    pub build_configuration: String,
    pub single_file: bool,
}

impl GdbindConfig {
    pub fn load(path: &Path) -> CodegenResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CodegenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> CodegenResult<Self> {
        toml::from_str(text).map_err(|source| CodegenError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve paths relative to `base` (the config file's directory).
    pub fn resolve(&self, base: &Path) -> GenerateOptions {
        let codegen = &self.codegen;
        GenerateOptions {
            api_json: base.join(&codegen.api_json),
            out_dir: base.join(&codegen.out_dir),
            build_configuration: codegen.build_configuration.clone(),
            single_file: codegen.single_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = GdbindConfig::parse("[codegen]\nsingle_file = true\n", Path::new("x.toml")).unwrap();
        assert!(cfg.codegen.single_file);
        assert_eq!(cfg.codegen.build_configuration, "double_64");
        assert_eq!(cfg.codegen.api_json, "extension_api.json");
    }

    #[test]
    fn paths_resolve_against_config_dir() {
        let cfg = GdbindConfig::parse(
            "[codegen]\napi_json = \"api/extension_api.json\"\nout_dir = \"src/gen\"\nbuild_configuration = \"float_32\"\n",
            Path::new("gdbind.toml"),
        )
        .unwrap();
        let opts = cfg.resolve(Path::new("/proj"));
        assert_eq!(opts.api_json, PathBuf::from("/proj/api/extension_api.json"));
        assert_eq!(opts.out_dir, PathBuf::from("/proj/src/gen"));
        assert_eq!(opts.build_configuration, "float_32");
    }

    #[test]
    fn malformed_toml_is_reported_with_path() {
        let err = GdbindConfig::parse("[codegen\n", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
