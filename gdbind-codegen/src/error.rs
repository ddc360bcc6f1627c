// Fatal codegen errors. Anything here aborts the whole run: it means the
// mapping tables are out of sync with the schema, or the schema itself is
// malformed. Recoverable skips are `diag::Diagnostic`s instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse API JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{owner}: missing required field `{field}`")]
    MissingField { owner: String, field: &'static str },
    #[error("class `{class}` inherits from unknown class `{parent}`")]
    UnknownParent { class: String, parent: String },
    #[error("unknown type `{name}` (referenced from {context})")]
    UnknownType { name: String, context: String },
    #[error("unknown width meta `{meta}` (referenced from {context})")]
    UnknownMeta { meta: String, context: String },
    #[error("width meta `{meta}` does not apply to `{ty}`")]
    MetaMismatch { meta: String, ty: String },
    #[error("no byte size for builtin `{name}` in configuration `{configuration}`")]
    UnknownBuiltinSize { name: String, configuration: String },
    #[error("builtin `{name}` under `{configuration}`: {what} is {declared} in the schema but {emitted} in the emitted struct")]
    BuiltinLayoutMismatch {
        name: String,
        configuration: String,
        what: String,
        declared: usize,
        emitted: usize,
    },
    #[error("unknown operator symbol `{symbol}` on `{owner}`")]
    UnknownOperator { symbol: String, owner: String },
    #[error("no variant type code for builtin `{name}`")]
    UnknownBuiltinTypecode { name: String },
    #[error("unknown build configuration `{0}` (expected float_32, float_64, double_32 or double_64)")]
    UnknownConfiguration(String),
    #[error("output verification failed: {}", .0.join("; "))]
    Verification(Vec<String>),
}

pub type CodegenResult<T> = Result<T, CodegenError>;
