//! Goals command - view and edit per-zone goals.

use anyhow::{Context, Result, bail};
use jayzone_store::{load_goals, load_zones, save_goals};
use jayzone_types::GoalEntry;

use crate::cli::{GoalsAction, OutputFormat};
use crate::config::Settings;
use crate::format::format_goals_text;
use crate::style;
use crate::util::{open_store, write_output};

/// Execute the goals command.
pub fn cmd_goals(action: GoalsAction, settings: &Settings) -> Result<()> {
    let store = open_store(&settings.db_path)?;
    let mut goals = load_goals(&store);

    match action {
        GoalsAction::List { period } => {
            let entries: Vec<&GoalEntry> = goals
                .iter()
                .filter(|g| period.is_none_or(|p| g.period == p))
                .collect();
            let content = match settings.format {
                OutputFormat::Json => settings.opts.as_json(&entries)?,
                OutputFormat::Text => {
                    let zones = load_zones(&store);
                    format_goals_text(entries, &zones, &settings.opts)
                }
            };
            write_output(settings.output.as_ref(), &content)?;
        }
        GoalsAction::Set {
            zone,
            period,
            minutes,
        } => {
            if load_zones(&store).get(zone).is_none() {
                bail!("Unknown zone {}. Run 'jayzone zones list' to see zone ids.", zone);
            }
            goals
                .upsert(zone, period, minutes)
                .with_context(|| format!("Cannot set goal for zone {}", zone))?;
            save_goals(&store, &goals).context("Failed to save goals")?;
            if !settings.quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!(
                            "Goal for zone {} ({}) set to {} min",
                            zone,
                            period.label(),
                            minutes
                        ),
                        settings.opts.no_color
                    )
                );
            }
        }
        GoalsAction::Remove { zone, period } => {
            if goals.remove(zone, period) {
                save_goals(&store, &goals).context("Failed to save goals")?;
                if !settings.quiet {
                    println!(
                        "{}",
                        style::format_success(
                            &format!("Removed goal for zone {} ({})", zone, period.label()),
                            settings.opts.no_color
                        )
                    );
                }
            } else if !settings.quiet {
                println!(
                    "{}",
                    style::format_warning(
                        &format!("No goal set for zone {} ({})", zone, period.label()),
                        settings.opts.no_color
                    )
                );
            }
        }
    }

    Ok(())
}
