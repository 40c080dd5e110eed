//! Cache command - inspect and clear the local sample cache.

use anyhow::Result;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::cli::{CacheAction, OutputFormat};
use crate::config::Settings;
use crate::style;
use crate::util::{open_store, write_output};

#[derive(Debug, Serialize)]
struct CacheStats {
    database: String,
    count: u64,
    first: Option<String>,
    last: Option<String>,
}

fn format_timestamp(ts: f64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos((ts * 1e9) as i128)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| ts.to_string())
}

/// Execute the cache command.
pub fn cmd_cache(action: CacheAction, settings: &Settings) -> Result<()> {
    let store = open_store(&settings.db_path)?;

    match action {
        CacheAction::Stats => {
            let stats = store.sample_stats()?;
            let report = CacheStats {
                database: settings.db_path.display().to_string(),
                count: stats.count,
                first: stats.first.map(format_timestamp),
                last: stats.last.map(format_timestamp),
            };
            let content = match settings.format {
                OutputFormat::Json => settings.opts.as_json(&report)?,
                OutputFormat::Text => {
                    let mut out = style::format_title("Sample cache", settings.opts.no_color);
                    out.push('\n');
                    out.push_str(&format!("  Database: {}\n", report.database));
                    out.push_str(&format!("  Samples:  {}\n", report.count));
                    if let (Some(first), Some(last)) = (&report.first, &report.last) {
                        out.push_str(&format!("  First:    {}\n", first));
                        out.push_str(&format!("  Last:     {}\n", last));
                    }
                    out
                }
            };
            write_output(settings.output.as_ref(), &content)?;
        }
        CacheAction::Clear => {
            let removed = store.clear_samples()?;
            if !settings.quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!("Removed {} cached samples", removed),
                        settings.opts.no_color
                    )
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1_709_719_200.0), "2024-03-06T10:00:00Z");
    }
}
