use clap::{Parser, Subcommand, ValueEnum};
use merlin_checker::{check_with_config, ValidationConfig};
use merlin_diagnostics::{DiagnosticSet, ErrorKind};
use merlin_reporting::DiagnosticContext;
use merlin_resolved::Program;
use merlin_span::SourceId;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "merlin")]
#[command(about = "Compile-time diagnostics for resolved programs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check resolved programs stored as JSON
    Check {
        /// Program files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Skip a validator by name (repeatable)
        #[arg(long = "disable", value_name = "VALIDATOR")]
        disabled: Vec<String>,

        /// Report checked-mode rules as warnings
        #[arg(long)]
        unchecked: bool,

        /// Record which validator reported each diagnostic
        #[arg(long)]
        debug: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
    },
    /// List every error kind with its category, arity and message template
    Catalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Source snippets with labels
    Human,
    /// One line per diagnostic
    Short,
    /// The diagnostic set as JSON
    Json,
}

#[derive(Debug, Error)]
enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{}' is not a valid program: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn load_program(path: &Path) -> Result<Program, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Unit paths by source, for locating diagnostics.
fn unit_paths(program: &Program) -> BTreeMap<SourceId, String> {
    program
        .libraries
        .iter()
        .flat_map(|(_, library)| &library.units)
        .map(|unit| (unit.source, unit.path.clone()))
        .collect()
}

fn print_short(diagnostics: &DiagnosticSet, paths: &BTreeMap<SourceId, String>) {
    for diagnostic in diagnostics.iter() {
        let path = paths.get(&diagnostic.span.source).map_or("<unknown>", String::as_str);
        println!(
            "{}:{}: {}[{}]: {}",
            path,
            diagnostic.span.start,
            diagnostic.severity,
            diagnostic.name(),
            diagnostic.display_message()
        );
    }
}

/// Render with source snippets, reading unit texts next to the program file.
///
/// Falls back to the short form when a unit's text is unavailable.
fn print_human(diagnostics: &DiagnosticSet, paths: &BTreeMap<SourceId, String>, base: &Path) {
    let mut context = DiagnosticContext::new();
    for (source, path) in paths {
        match fs::read_to_string(base.join(path)) {
            Ok(text) => {
                context.add_file(*source, path.clone(), text);
            }
            Err(error) => tracing::debug!(path = %path, %error, "unit text unavailable"),
        }
    }

    let renderable = diagnostics.iter().all(|d| context.has_file(d.span.source));
    if !renderable {
        print_short(diagnostics, paths);
        return;
    }
    for diagnostic in diagnostics.iter() {
        context.throw(diagnostic);
    }
    if let Err(error) = context.emit() {
        eprintln!("error: cannot render diagnostics: {}", error);
        print_short(diagnostics, paths);
    }
}

fn run_check(files: &[PathBuf], config: &ValidationConfig, format: Format) -> ExitCode {
    let mut failed = false;

    for file in files {
        let program = match load_program(file) {
            Ok(program) => program,
            Err(error) => {
                eprintln!("error: {}", error);
                failed = true;
                continue;
            }
        };
        tracing::info!(file = %file.display(), libraries = program.libraries.len(), "checking");

        let diagnostics = check_with_config(&program, config);
        failed |= diagnostics.has_errors();

        let paths = unit_paths(&program);
        match format {
            Format::Json => match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{}", json),
                Err(error) => {
                    eprintln!("error: cannot serialize diagnostics: {}", error);
                    failed = true;
                }
            },
            Format::Short => print_short(&diagnostics, &paths),
            Format::Human => {
                let base = file.parent().unwrap_or_else(|| Path::new("."));
                print_human(&diagnostics, &paths, base);
            }
        }
    }

    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_catalog() {
    for kind in ErrorKind::ALL {
        println!(
            "{:<56} {:<12} {} {}",
            kind.name(),
            kind.category().as_str(),
            kind.arity(),
            kind.template()
        );
    }
}

fn main() -> ExitCode {
    if let Ok(filter) = EnvFilter::try_from_env("MERLIN_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            files,
            disabled,
            unchecked,
            debug,
            format,
        } => {
            let mut config = ValidationConfig::new();
            for name in disabled {
                config.disable(name);
            }
            if unchecked {
                config = config.unchecked();
            }
            if debug {
                config = config.with_debug_mode();
            }
            run_check(&files, &config, format)
        }
        Commands::Catalog => {
            print_catalog();
            ExitCode::SUCCESS
        }
    }
}
