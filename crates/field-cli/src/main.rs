mod report;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use field_spec::{Form, FormDef, RenderStatus, build_render_payload, definition_schema};
use report::{ReportFormat, ReportPresenter};
use serde_json::{Map, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form submission resolver",
    long_about = "Resolves submitted values against a JSON form definition and reports values and validation errors"
)]
struct Cli {
    /// Emit debug logs on stderr (overrides RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a submission and report values and errors.
    Check {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Optional JSON object of display defaults.
        #[arg(long, value_name = "DEFAULTS")]
        defaults: Option<PathBuf>,
        /// Optional JSON object of submitted values. Omit to resolve an unsubmitted form.
        #[arg(long, value_name = "SUBMITTED")]
        submitted: Option<PathBuf>,
        /// Report format.
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Print the JSON schema of form definitions.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Check {
            form,
            defaults,
            submitted,
            format,
        } => run_check(&form, defaults.as_deref(), submitted.as_deref(), format),
        Command::Schema => run_schema(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_check(
    form_path: &Path,
    defaults_path: Option<&Path>,
    submitted_path: Option<&Path>,
    format: ReportFormat,
) -> CliResult<()> {
    let def: FormDef = serde_json::from_str(&fs::read_to_string(form_path)?)?;
    let mut form = Form::from_def(&def)?;
    info!(form = %form.name(), elements = form.len(), "form loaded");

    if let Some(path) = defaults_path {
        form.set_defaults(&read_object(path, "defaults")?);
    }
    if let Some(path) = submitted_path {
        form.set_submitted(&read_object(path, "submitted values")?);
    }

    let payload = build_render_payload(&mut form);
    debug!(status = payload.status.as_str(), "form resolved");
    ReportPresenter::new(format).show(&payload)?;

    if payload.status == RenderStatus::Invalid {
        Err("validation failed".into())
    } else {
        Ok(())
    }
}

fn run_schema() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&definition_schema())?);
    Ok(())
}

fn read_object(path: &Path, what: &str) -> CliResult<Map<String, Value>> {
    let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(format!("{} in {} must be a JSON object", what, path.display()).into()),
    }
}
