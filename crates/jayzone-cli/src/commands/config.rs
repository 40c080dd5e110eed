//! Config command - manage the TOML configuration file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::ConfigAction;
use crate::config::Config;
use crate::format::FormatOptions;
use crate::style;

/// Execute the config command against the file at `path`.
///
/// Runs without resolved settings so that a config holding bad values
/// can still be inspected and repaired.
pub fn cmd_config(
    action: ConfigAction,
    path: &Path,
    mut config: Config,
    opts: &FormatOptions,
    json: bool,
    quiet: bool,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            if json {
                print!("{}", opts.as_json(&config)?);
            } else {
                let content =
                    toml::to_string_pretty(&config).context("Failed to serialize config")?;
                if content.trim().is_empty() {
                    println!("# {} (defaults)", path.display());
                } else {
                    print!("{}", content);
                }
            }
        }
        ConfigAction::Get { key } => match config.get(key) {
            Some(value) => println!("{}", value),
            None => println!("(not set)"),
        },
        ConfigAction::Set { key, value } => {
            config.set(key, &value)?;
            config.save_to(path)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!("Saved to {}", path.display()),
                        opts.no_color
                    )
                );
            }
        }
        ConfigAction::Unset { key } => {
            config.unset(key);
            config.save_to(path)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!("Saved to {}", path.display()),
                        opts.no_color
                    )
                );
            }
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Init => {
            if path.exists() {
                if !quiet {
                    println!(
                        "{}",
                        style::format_warning(
                            &format!("Config already exists at {}", path.display()),
                            opts.no_color
                        )
                    );
                }
            } else {
                Config::default().save_to(path)?;
                if !quiet {
                    println!(
                        "{}",
                        style::format_success(
                            &format!("Created {}", path.display()),
                            opts.no_color
                        )
                    );
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigKey;

    #[test]
    fn test_set_then_unset_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let opts = FormatOptions::default();

        cmd_config(
            ConfigAction::Set {
                key: ConfigKey::FirstWeekday,
                value: "Mon".into(),
            },
            &path,
            Config::default(),
            &opts,
            false,
            true,
        )
        .unwrap();
        let saved = Config::load_from(&path);
        assert_eq!(saved.first_weekday.as_deref(), Some("monday"));

        cmd_config(
            ConfigAction::Unset {
                key: ConfigKey::FirstWeekday,
            },
            &path,
            saved,
            &opts,
            false,
            true,
        )
        .unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_set_rejects_invalid_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let err = cmd_config(
            ConfigAction::Set {
                key: ConfigKey::UtcOffset,
                value: "two hours".into(),
            },
            &path,
            Config::default(),
            &FormatOptions::default(),
            false,
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid UTC offset"));
        assert!(!path.exists());
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "first_weekday = \"monday\"\n").unwrap();
        cmd_config(
            ConfigAction::Init,
            &path,
            Config::default(),
            &FormatOptions::default(),
            false,
            true,
        )
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "first_weekday = \"monday\"\n"
        );
    }
}
