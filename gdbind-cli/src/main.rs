// gdbind: CLI entry point for binding generation.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gdbind_codegen::config::{GdbindConfig, GenerateOptions};

#[derive(Parser)]
#[command(name = "gdbind", about = "gdbind: Rust bindings from the engine's extension_api.json")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Rust bindings from extension_api.json.
    Generate {
        /// Path to gdbind.toml. Missing file means defaults.
        #[arg(long, default_value = "gdbind.toml")]
        config: PathBuf,
        /// Override the API JSON path.
        #[arg(long)]
        api: Option<PathBuf>,
        /// Override the output directory.
        #[arg(long)]
        out: Option<PathBuf>,
        /// float_32, float_64, double_32 or double_64.
        #[arg(long)]
        build_configuration: Option<String>,
        /// Emit a single generated.rs.
        #[arg(long)]
        single_file: bool,
    },
}

#[derive(Debug, Default)]
struct Overrides {
    api: Option<PathBuf>,
    out: Option<PathBuf>,
    build_configuration: Option<String>,
    single_file: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Generate {
            config,
            api,
            out,
            build_configuration,
            single_file,
        } => {
            let overrides = Overrides {
                api,
                out,
                build_configuration,
                single_file,
            };
            generate(&config, overrides)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn generate(config_path: &Path, overrides: Overrides) -> anyhow::Result<()> {
    let opts = resolve_options(config_path, overrides)?;
    let generated = gdbind_codegen::run_generate(&opts)
        .with_context(|| format!("generating bindings from {}", opts.api_json.display()))?;
    tracing::info!(
        files = generated.artifacts.len(),
        skipped = generated.diagnostics.len(),
        "wrote bindings to {}",
        opts.out_dir.display()
    );
    Ok(())
}

/// Config file (if present) resolved against its directory, then flags.
fn resolve_options(config_path: &Path, overrides: Overrides) -> anyhow::Result<GenerateOptions> {
    let mut opts = if config_path.exists() {
        let config = GdbindConfig::load(config_path)?;
        let base = config_path.parent().unwrap_or(Path::new("."));
        tracing::debug!(config = %config_path.display(), "using config file");
        config.resolve(base)
    } else {
        tracing::debug!(config = %config_path.display(), "no config file, using defaults");
        GdbindConfig::default().resolve(Path::new(""))
    };

    if let Some(api) = overrides.api {
        opts.api_json = api;
    }
    if let Some(out) = overrides.out {
        opts.out_dir = out;
    }
    if let Some(configuration) = overrides.build_configuration {
        opts.build_configuration = configuration;
    }
    opts.single_file |= overrides.single_file;
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile_free_path();
        let opts = resolve_options(&dir, Overrides::default()).unwrap();
        assert_eq!(opts.api_json, PathBuf::from("extension_api.json"));
        assert_eq!(opts.out_dir, PathBuf::from("generated"));
        assert_eq!(opts.build_configuration, "double_64");
        assert!(!opts.single_file);
    }

    #[test]
    fn flags_override_defaults() {
        let overrides = Overrides {
            api: Some("api.json".into()),
            out: Some("out".into()),
            build_configuration: Some("float_32".to_string()),
            single_file: true,
        };
        let opts = resolve_options(&tempfile_free_path(), overrides).unwrap();
        assert_eq!(opts.api_json, PathBuf::from("api.json"));
        assert_eq!(opts.out_dir, PathBuf::from("out"));
        assert_eq!(opts.build_configuration, "float_32");
        assert!(opts.single_file);
    }

    #[test]
    fn cli_parses_generate() {
        let cli = Cli::try_parse_from(["gdbind", "generate", "--api", "x.json", "--single-file"]).unwrap();
        let Commands::Generate { config, api, single_file, .. } = cli.command;
        assert_eq!(config, PathBuf::from("gdbind.toml"));
        assert_eq!(api, Some(PathBuf::from("x.json")));
        assert!(single_file);
    }

    fn tempfile_free_path() -> PathBuf {
        PathBuf::from("definitely/not/here/gdbind.toml")
    }
}
