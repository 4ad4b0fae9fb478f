//! Process command implementation.
//!
//! Applies the configured processors to one notebook or to every notebook
//! under a folder.

use std::path::{Path, PathBuf};
use std::time::Instant;

use nbpress_core::ProcessorRegistry;
use nbpress_sync::{OutputFormat, output_path, process_to_file};

use crate::colors;
use crate::config::Config;

/// Directory Jupyter keeps autosaved copies in.
const CHECKPOINTS_DIR: &str = ".ipynb_checkpoints";

/// What to process.
pub enum Input<'a> {
    File(&'a Path),
    Folder(&'a Path),
}

/// Execute the process command.
pub fn execute(
    config_file: &Path,
    input: Input<'_>,
    output_folder: Option<&Path>,
    format: Option<OutputFormat>,
) -> anyhow::Result<()> {
    let config = Config::load(config_file)?;
    let registry = ProcessorRegistry::with_builtins();
    config.validate(&registry)?;

    let notebooks = match input {
        Input::File(path) => {
            if !path.is_file() {
                anyhow::bail!("Notebook not found: {}", path.display());
            }
            vec![path.to_path_buf()]
        }
        Input::Folder(folder) => find_notebooks(folder)?,
    };

    if notebooks.is_empty() {
        tracing::warn!("No notebooks found to process");
        return Ok(());
    }

    let options = config.process_options(format);
    let output_folder = config.output_folder(output_folder);

    println!(
        "\n{}nbpress{} - Processing {} notebook(s) to {}",
        colors::BOLD,
        colors::RESET,
        notebooks.len(),
        options.format
    );
    println!("{}", "─".repeat(50));

    for notebook in &notebooks {
        let output = output_path(
            notebook,
            &config.documentation_source,
            &output_folder,
            options.format,
        );
        let processors = config.build_processors(&registry)?;

        let start = Instant::now();
        print!("  {} → {} ... ", notebook.display(), output.display());
        colors::flush_stdout();

        if let Err(e) = process_to_file(notebook, &output, processors, &options) {
            println!("{}✗{}", colors::RED, colors::RESET);
            return Err(e.into());
        }

        let elapsed = start.elapsed();
        println!(
            "{}✓{} {}({:.2}ms){}",
            colors::GREEN,
            colors::RESET,
            colors::DIM,
            elapsed.as_secs_f64() * 1000.0,
            colors::RESET
        );
    }

    println!(
        "\n{}Done.{} Output written to {}",
        colors::GREEN,
        colors::RESET,
        output_folder.display()
    );
    Ok(())
}

/// Every `.ipynb` file below `folder`, sorted, skipping Jupyter checkpoints.
pub fn find_notebooks(folder: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        anyhow::bail!("Notebook folder not found: {}", folder.display());
    }

    let pattern = folder.join("**").join("*.ipynb");
    let pattern = pattern.to_string_lossy();

    let mut notebooks = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        if path.components().any(|c| c.as_os_str() == CHECKPOINTS_DIR) {
            tracing::debug!("Skipping checkpoint {}", path.display());
            continue;
        }
        if path.is_file() {
            notebooks.push(path);
        }
    }
    notebooks.sort();

    if notebooks.is_empty() {
        println!(
            "{}No notebooks found under {}{}",
            colors::YELLOW,
            folder.display(),
            colors::RESET
        );
    }
    Ok(notebooks)
}
