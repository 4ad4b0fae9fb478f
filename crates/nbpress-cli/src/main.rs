//! nbpress CLI - Jupyter notebook processing for Quarto documentation.

mod colors;
mod config;
mod process;

use std::path::PathBuf;

use clap::{Args, Parser};
use nbpress_sync::{OutputFormat, SyncError};

use crate::process::Input;

#[derive(Parser)]
#[command(name = "nbpress")]
#[command(about = "Apply processors to Jupyter notebooks for Quarto documentation")]
#[command(version)]
struct Cli {
    /// Configuration file listing the processors to apply
    #[arg(long, alias = "config_file", value_name = "YAML")]
    config_file: PathBuf,

    #[command(flatten)]
    input: InputArgs,

    /// Folder for processed output, overriding `output_folder` in the config
    #[arg(long, alias = "output_folder")]
    output_folder: Option<PathBuf>,

    /// Output format (ipynb or qmd), overriding `output_format` in the config
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// A single notebook to process
    #[arg(long, alias = "notebook_file")]
    notebook_file: Option<PathBuf>,

    /// A folder whose notebooks are all processed
    #[arg(long, alias = "notebook_folder")]
    notebook_folder: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Helper to format nbpress-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<nbpress_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else if let Some(SyncError::Core(core_err)) = err.downcast_ref::<SyncError>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    let input = match (&cli.input.notebook_file, &cli.input.notebook_folder) {
        (Some(file), _) => Input::File(file),
        (None, Some(folder)) => Input::Folder(folder),
        (None, None) => anyhow::bail!("one of --notebook-file or --notebook-folder is required"),
    };

    process::execute(
        &cli.config_file,
        input,
        cli.output_folder.as_deref(),
        cli.format,
    )
    .map_err(format_error)?;

    Ok(())
}
