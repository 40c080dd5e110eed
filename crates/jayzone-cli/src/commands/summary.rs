//! Summary command - zone times and goal progress for a period.

use std::sync::Arc;

use anyhow::Result;
use jayzone_core::{
    CoordinatorConfig, Coverage, DateRange, RefreshCoordinator, SampleSource, ZoneAggregator,
    fetch_all_periods,
};
use jayzone_store::{StoredSamples, load_goals, load_zones};
use jayzone_types::ZoneTable;
use tracing::{debug, warn};

use crate::cli::{OutputFormat, SummaryArgs};
use crate::config::Settings;
use crate::format::{PeriodReport, format_reports_text};
use crate::style;
use crate::util::{open_store, parse_instant, write_output};

/// Coverage of `range`. A failed fetch counts as no samples.
async fn period_coverage<S: SampleSource + ?Sized>(
    source: &S,
    range: DateRange,
    zones: &ZoneTable,
    aggregator: &ZoneAggregator,
) -> Coverage {
    match source.fetch_samples(range).await {
        Ok(samples) => aggregator.coverage(&samples, zones),
        Err(e) => {
            warn!("Coverage fetch failed, treating as no samples: {}", e);
            aggregator.coverage(&[], zones)
        }
    }
}

/// Execute the summary command.
pub async fn cmd_summary(args: SummaryArgs, settings: &Settings) -> Result<()> {
    let store = open_store(&settings.db_path)?;
    let zones = Arc::new(load_zones(&store));
    let goals = load_goals(&store);
    let cached = store.count_samples()?;
    let source = StoredSamples::new(store);

    let now = match args.at.as_deref() {
        Some(at) => parse_instant(at)?.to_offset(settings.calendar.utc_offset),
        None => settings.calendar.now(),
    };
    let aggregator = ZoneAggregator::default();

    let mut reports = Vec::new();
    if args.all {
        let summaries =
            fetch_all_periods(&source, &settings.calendar, now, &zones, &aggregator).await;
        for summary in summaries {
            let mut report = PeriodReport::build(
                summary.period,
                summary.range,
                &summary.records,
                &zones,
                &goals,
            );
            if args.coverage {
                let coverage =
                    period_coverage(&source, summary.range, &zones, &aggregator).await;
                report = report.with_coverage(coverage);
            }
            reports.push(report);
        }
    } else {
        let period = args.period.unwrap_or(settings.period);
        let coordinator = RefreshCoordinator::with_config(
            source,
            CoordinatorConfig {
                calendar: settings.calendar,
                initial_period: period,
                ..Default::default()
            },
        );

        let ticket = coordinator.begin_at(Arc::clone(&zones), now).await;
        let range = ticket.range();
        let fetched = coordinator.source().fetch_samples(range).await;
        let coverage = match &fetched {
            Ok(samples) if args.coverage => Some(aggregator.coverage(samples, &zones)),
            _ => None,
        };
        let outcome = coordinator.complete(ticket, fetched).await;
        debug!(token = %outcome.token(), "Summary refresh finished");

        let mut report = PeriodReport::build(
            period,
            range,
            outcome.records().unwrap_or_default(),
            &zones,
            &goals,
        );
        if let Some(coverage) = coverage {
            report = report.with_coverage(coverage);
        }
        reports.push(report);
    }

    let format = args.format.unwrap_or(settings.format);
    let content = match format {
        OutputFormat::Json if args.all => settings.opts.as_json(&reports)?,
        OutputFormat::Json => settings.opts.as_json(&reports[0])?,
        OutputFormat::Text => format_reports_text(&reports, &settings.opts),
    };
    write_output(settings.output.as_ref(), &content)?;

    if cached == 0 && !settings.quiet && format == OutputFormat::Text {
        eprintln!(
            "{}",
            style::format_warning(
                "No samples cached. Import some with 'jayzone import <FILE.csv>'.",
                settings.opts.no_color
            )
        );
    }

    Ok(())
}
