//! Output formatting for text and JSON output.

use anyhow::Result;
use jayzone_core::{
    Coverage, DateRange, GoalRegistry, GoalTracker, format_target_minutes, format_total,
    total_seconds,
};
use jayzone_types::{DisplayHint, GoalEntry, PeriodKind, ZoneTable, ZoneTimeRecord};
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

/// One zone's line in a period report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRow {
    pub zone_id: u32,
    pub zone_label: String,
    pub display_hint: DisplayHint,
    pub total_seconds: f64,
    pub formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// Zone times and goal progress for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub period: PeriodKind,
    pub label: &'static str,
    pub range: DateRange,
    pub total_seconds: f64,
    pub zones: Vec<ZoneRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
}

impl PeriodReport {
    /// Join records with their zone hints and goal status.
    pub fn build(
        period: PeriodKind,
        range: DateRange,
        records: &[ZoneTimeRecord],
        zones: &ZoneTable,
        goals: &GoalRegistry,
    ) -> Self {
        let statuses = GoalTracker::new(goals).summarize(period, records);
        let rows = records
            .iter()
            .zip(statuses)
            .map(|(record, status)| ZoneRow {
                zone_id: record.zone_id,
                zone_label: record.zone_label.clone(),
                display_hint: zones
                    .get(record.zone_id)
                    .map(|z| z.display_hint)
                    .unwrap_or_default(),
                total_seconds: record.total_seconds,
                formatted: record.formatted_time(),
                target_minutes: status.target_minutes,
                progress: status.progress,
            })
            .collect();

        Self {
            period,
            label: period.label(),
            range,
            total_seconds: total_seconds(records),
            zones: rows,
            coverage: None,
        }
    }

    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = Some(coverage);
        self
    }
}

fn format_instant(instant: OffsetDateTime) -> String {
    instant
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| instant.to_string())
}

/// Render a range as `"2024-03-04 00:00 to 2024-03-06 15:00"`.
pub fn format_range(range: &DateRange) -> String {
    format!(
        "{} to {}",
        format_instant(range.start),
        format_instant(range.end)
    )
}

/// Text rendering of one period report.
pub fn format_report_text(report: &PeriodReport, opts: &FormatOptions) -> String {
    let mut out = String::new();
    out.push_str(&style::format_title(report.label, opts.no_color));
    out.push('\n');
    out.push_str(&format!("{}\n\n", format_range(&report.range)));

    let width = report
        .zones
        .iter()
        .map(|z| z.zone_label.chars().count())
        .max()
        .unwrap_or(0);

    for row in &report.zones {
        let padding = " ".repeat(width - row.zone_label.chars().count());
        let label = style::paint_hint(&row.zone_label, row.display_hint, opts.no_color);
        out.push_str(&format!("  {}{}  {:>8}", label, padding, row.formatted));
        if let (Some(target), Some(progress)) = (row.target_minutes, row.progress) {
            out.push_str(&format!(
                "  {} {:>3.0}% of {}",
                style::progress_bar(progress, row.display_hint, opts.no_color),
                progress * 100.0,
                format_target_minutes(target)
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!("\n  Total: {}\n", format_total(report.total_seconds)));

    if let Some(coverage) = report.coverage {
        let ratio = coverage
            .ratio()
            .map_or_else(|| "n/a".to_string(), |r| format!("{:.0}%", r * 100.0));
        out.push_str(&format!(
            "  Coverage: {} in zones, {} samples ({}) outside every zone\n",
            ratio,
            coverage.unmatched_samples,
            format_total(coverage.unmatched_seconds)
        ));
    }
    out
}

/// Text rendering of several reports.
pub fn format_reports_text(reports: &[PeriodReport], opts: &FormatOptions) -> String {
    reports
        .iter()
        .map(|r| format_report_text(r, opts))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text rendering of the zone table.
pub fn format_zones_text(zones: &ZoneTable, opts: &FormatOptions) -> String {
    let mut out = style::format_title("Zones", opts.no_color);
    out.push('\n');
    for zone in zones {
        let label = style::paint_hint(&zone.label, zone.display_hint, opts.no_color);
        out.push_str(&format!(
            "  {:>2}  {:>3}-{:<3} bpm  {}\n",
            zone.id, zone.min_bpm, zone.max_bpm, label
        ));
    }
    out
}

/// Text rendering of goal entries.
pub fn format_goals_text<'a>(
    goals: impl IntoIterator<Item = &'a GoalEntry>,
    zones: &ZoneTable,
    opts: &FormatOptions,
) -> String {
    let mut out = style::format_title("Goals", opts.no_color);
    out.push('\n');
    let mut any = false;
    for goal in goals {
        any = true;
        let label = zones
            .get(goal.zone_id)
            .map_or_else(|| format!("Zone {}", goal.zone_id), |z| z.label.clone());
        out.push_str(&format!(
            "  {:<10}  {}  {}\n",
            goal.period.label(),
            label,
            format_target_minutes(goal.target_minutes)
        ));
    }
    if !any {
        out.push_str("  No goals set. Use 'jayzone goals set <ZONE> <PERIOD> <MINUTES>'.\n");
    }
    out
}
