//! Zones command - view and edit the zone table.

use anyhow::{Context, Result};
use jayzone_store::{load_zones, save_zones};

use crate::cli::{OutputFormat, ZonesAction};
use crate::config::Settings;
use crate::format::format_zones_text;
use crate::style;
use crate::util::{open_store, write_output};

/// Execute the zones command.
pub fn cmd_zones(action: ZonesAction, settings: &Settings) -> Result<()> {
    let store = open_store(&settings.db_path)?;
    let mut zones = load_zones(&store);

    match action {
        ZonesAction::List => {
            let content = match settings.format {
                OutputFormat::Json => settings.opts.as_json(&zones)?,
                OutputFormat::Text => format_zones_text(&zones, &settings.opts),
            };
            write_output(settings.output.as_ref(), &content)?;
        }
        ZonesAction::Set { zone, min, max } => {
            zones
                .update_range(zone, min, max)
                .with_context(|| format!("Cannot update zone {}", zone))?;
            save_zones(&store, &zones).context("Failed to save zones")?;
            if !settings.quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!("Zone {} set to {}-{} bpm", zone, min, max),
                        settings.opts.no_color
                    )
                );
            }
        }
        ZonesAction::Reset => {
            zones.reset_to_defaults();
            save_zones(&store, &zones).context("Failed to save zones")?;
            if !settings.quiet {
                println!(
                    "{}",
                    style::format_success("Zones restored to defaults", settings.opts.no_color)
                );
            }
        }
    }

    Ok(())
}
