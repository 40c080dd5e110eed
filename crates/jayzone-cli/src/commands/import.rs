//! Import command - load heart-rate samples from CSV.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::style;
use crate::util::{open_store, write_output};

/// Execute the import command. Reads stdin when `input` is `None`.
pub fn cmd_import(input: Option<PathBuf>, settings: &Settings) -> Result<()> {
    let store = open_store(&settings.db_path)?;

    let result = match &input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            store
                .import_csv(BufReader::new(file))
                .with_context(|| format!("Failed to import {}", path.display()))?
        }
        None => store
            .import_csv(io::stdin().lock())
            .context("Failed to import from stdin")?,
    };
    info!(
        rows = result.rows,
        inserted = result.inserted,
        duplicates = result.duplicates,
        "CSV import finished"
    );

    match settings.format {
        OutputFormat::Json => {
            let content = settings.opts.as_json(&result)?;
            write_output(settings.output.as_ref(), &content)?;
        }
        OutputFormat::Text if !settings.quiet => {
            let mut message = format!(
                "Imported {} of {} samples",
                result.inserted, result.rows
            );
            if result.duplicates > 0 {
                message.push_str(&format!(" ({} already cached)", result.duplicates));
            }
            println!("{}", style::format_success(&message, settings.opts.no_color));
        }
        OutputFormat::Text => {}
    }

    Ok(())
}
