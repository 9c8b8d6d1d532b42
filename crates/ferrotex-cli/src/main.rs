use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ferrotex_funceval::{OutputRecord, Registry, translate, validate_with_registry_file};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ferrotex")]
#[command(about = "FerroTeX CLI tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a LaTeX fit function into a Fortran infix expression
    Translate {
        /// The LaTeX expression
        #[arg(value_name = "EXPR")]
        expression: String,
        /// Function registry (defaults to ~/.nested_fit/func_names.dat)
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,
        /// Skip checking user function calls against the registry
        #[arg(long)]
        no_validate: bool,
        /// Emit the result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Load a function registry and emit it as JSON
    Registry {
        /// Path to the registry file
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Emit the fixed-layout record handed to Fortran for an expression
    Record {
        #[arg(value_name = "EXPR")]
        expression: String,
    },
}

/// Registry to validate against. An explicit path must exist; a missing
/// default registry only disables validation.
fn registry_path(explicit: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("function registry {:?} does not exist", path);
        }
        return Ok(Some(path.to_path_buf()));
    }
    match Registry::default_path() {
        Some(path) if path.exists() => Ok(Some(path)),
        Some(path) => {
            log::warn!("No function registry at {:?}; skipping call validation", path);
            Ok(None)
        }
        None => {
            log::warn!("Home directory not found; skipping call validation");
            Ok(None)
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Translate {
            expression,
            registry,
            no_validate,
            json,
        } => {
            let mut result = translate(expression);
            if !*no_validate && !result.is_error() {
                if let Some(path) = registry_path(registry.as_deref())? {
                    validate_with_registry_file(&mut result, &path)?;
                }
            }

            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.summary());
            }
            if result.is_error() {
                bail!("translation failed: {}", result.status);
            }
        }
        Commands::Registry { path } => {
            let path = path
                .clone()
                .or_else(Registry::default_path)
                .context("no registry path given and home directory not found")?;
            let registry = Registry::load(&path)?;
            let entries: Vec<_> = registry.entries().collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Commands::Record { expression } => {
            let result = translate(expression);
            let record = OutputRecord::from_result(&result)?;
            let value = serde_json::json!({
                "infixcode_f90": record.infix,
                "num_params": record.num_params(),
                "parameters": record
                    .parameters
                    .iter()
                    .map(|slot| serde_json::json!({
                        "name": slot.name(),
                        "identifier": slot.identifier(),
                    }))
                    .collect::<Vec<_>>(),
                "num_funcs": record.num_funcs(),
                "functions": record.functions.iter().map(|slot| slot.name()).collect::<Vec<_>>(),
                "func_argc": record.arities,
                "error": record.error,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
