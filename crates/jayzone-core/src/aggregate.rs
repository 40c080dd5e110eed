//! Time-in-zone aggregation.
//!
//! Heart-rate samples arrive at irregular intervals. Each sample is weighted
//! by the gap to the next sample, capped so that a long gap (watch off-wrist,
//! paused workout) cannot inflate a single reading. The last sample has no
//! successor and gets a fixed weight.
//!
//! # Example
//!
//! ```
//! use jayzone_core::aggregate::aggregate;
//! use jayzone_types::{Sample, ZoneTable};
//!
//! let zones = ZoneTable::defaults();
//! let samples = [Sample::new(0.0, 110), Sample::new(7.0, 112)];
//!
//! let records = aggregate(&samples, &zones);
//! assert_eq!(records.len(), 5);
//! assert_eq!(records[1].total_seconds, 12.0);
//! ```

use serde::{Deserialize, Serialize};

use jayzone_types::{Sample, ZoneTable, ZoneTimeRecord};

/// Upper bound on the weight of one sample, in seconds.
pub const MAX_SAMPLE_SECONDS: f64 = 10.0;

/// Weight of the final sample in a sequence, in seconds.
pub const TRAILING_SAMPLE_SECONDS: f64 = 5.0;

/// Duration attribution settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Cap applied to the gap between consecutive samples.
    pub max_sample_seconds: f64,
    /// Weight given to the last sample.
    pub trailing_sample_seconds: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_sample_seconds: MAX_SAMPLE_SECONDS,
            trailing_sample_seconds: TRAILING_SAMPLE_SECONDS,
        }
    }
}

/// How much of a sample sequence was attributed to a zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    /// Seconds attributed to some zone.
    pub attributed_seconds: f64,
    /// Seconds belonging to samples that matched no zone.
    pub unmatched_seconds: f64,
    /// Number of samples that matched no zone.
    pub unmatched_samples: usize,
}

impl Coverage {
    /// Fraction of the attributed time that landed in a zone, or `None` for
    /// an empty sequence.
    pub fn ratio(&self) -> Option<f64> {
        let total = self.attributed_seconds + self.unmatched_seconds;
        (total > 0.0).then(|| self.attributed_seconds / total)
    }
}

/// Converts sample sequences into per-zone totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneAggregator {
    config: AggregatorConfig,
}

impl ZoneAggregator {
    /// Create an aggregator with the given configuration.
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Seconds attributed to `samples[index]`.
    ///
    /// Samples must be sorted by timestamp.
    pub fn attributed_duration(&self, samples: &[Sample], index: usize) -> f64 {
        match samples.get(index + 1) {
            Some(next) => (next.timestamp - samples[index].timestamp)
                .min(self.config.max_sample_seconds),
            None => self.config.trailing_sample_seconds,
        }
    }

    /// Sum the attributed time per zone.
    ///
    /// Returns one record per zone in table order, including zones with no
    /// matching samples. Samples outside every zone are dropped.
    pub fn aggregate(&self, samples: &[Sample], zones: &ZoneTable) -> Vec<ZoneTimeRecord> {
        let mut totals = vec![0.0_f64; zones.len()];

        for index in 0..samples.len() {
            let bpm = samples[index].bpm;
            if let Some(slot) = zones.iter().position(|z| z.contains(bpm)) {
                totals[slot] += self.attributed_duration(samples, index);
            }
        }

        zones
            .iter()
            .zip(totals)
            .map(|(zone, total_seconds)| ZoneTimeRecord {
                zone_id: zone.id,
                zone_label: zone.label.clone(),
                total_seconds,
            })
            .collect()
    }

    /// Report how much attributed time fell outside every zone.
    pub fn coverage(&self, samples: &[Sample], zones: &ZoneTable) -> Coverage {
        let mut coverage = Coverage::default();
        for index in 0..samples.len() {
            let duration = self.attributed_duration(samples, index);
            if zones.classify(samples[index].bpm).is_some() {
                coverage.attributed_seconds += duration;
            } else {
                coverage.unmatched_seconds += duration;
                coverage.unmatched_samples += 1;
            }
        }
        coverage
    }
}

/// Aggregate with the default attribution rule.
pub fn aggregate(samples: &[Sample], zones: &ZoneTable) -> Vec<ZoneTimeRecord> {
    ZoneAggregator::default().aggregate(samples, zones)
}

/// Sum of every record's total.
pub fn total_seconds(records: &[ZoneTimeRecord]) -> f64 {
    records.iter().map(|r| r.total_seconds).sum()
}

/// Render a total as `"2h 05m"` or `"42m"`.
pub fn format_total(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jayzone_types::{DisplayHint, ZoneDefinition};

    fn zone_total(records: &[ZoneTimeRecord], id: u32) -> f64 {
        records
            .iter()
            .find(|r| r.zone_id == id)
            .map(|r| r.total_seconds)
            .unwrap()
    }

    #[test]
    fn test_empty_samples_yield_zero_records() {
        let zones = ZoneTable::defaults();
        let records = aggregate(&[], &zones);
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.total_seconds == 0.0));
        let ids: Vec<u32> = records.iter().map(|r| r.zone_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_table_yields_no_records() {
        let zones = ZoneTable::new(vec![]).unwrap();
        let records = aggregate(&[Sample::new(0.0, 120)], &zones);
        assert!(records.is_empty());
    }

    #[test]
    fn test_single_sample_uses_trailing_weight() {
        let zones = ZoneTable::defaults();
        let records = aggregate(&[Sample::new(100.0, 150)], &zones);
        assert_eq!(zone_total(&records, 4), 5.0);
    }

    #[test]
    fn test_gap_below_cap() {
        let zones = ZoneTable::defaults();
        let samples = [Sample::new(0.0, 130), Sample::new(7.0, 131)];
        let records = aggregate(&samples, &zones);
        assert_eq!(zone_total(&records, 3), 12.0);
    }

    #[test]
    fn test_gap_capped() {
        let zones = ZoneTable::defaults();
        let samples = [Sample::new(0.0, 130), Sample::new(30.0, 131)];
        let records = aggregate(&samples, &zones);
        assert_eq!(zone_total(&records, 3), 15.0);
    }

    #[test]
    fn test_duration_goes_to_earlier_sample_zone() {
        let zones = ZoneTable::defaults();
        // 4s in zone 2, then trailing 5s in zone 5
        let samples = [Sample::new(0.0, 110), Sample::new(4.0, 180)];
        let records = aggregate(&samples, &zones);
        assert_eq!(zone_total(&records, 2), 4.0);
        assert_eq!(zone_total(&records, 5), 5.0);
    }

    #[test]
    fn test_overlap_first_zone_wins() {
        let zones = ZoneTable::new(vec![
            ZoneDefinition::new(1, "Z1", 100, 140, DisplayHint::Blue),
            ZoneDefinition::new(2, "Z2", 130, 150, DisplayHint::Green),
        ])
        .unwrap();
        let records = aggregate(&[Sample::new(0.0, 135)], &zones);
        assert_eq!(zone_total(&records, 1), 5.0);
        assert_eq!(zone_total(&records, 2), 0.0);
    }

    #[test]
    fn test_unmatched_samples_dropped() {
        let zones = ZoneTable::defaults();
        let samples = [
            Sample::new(0.0, 40),
            Sample::new(5.0, 120),
            Sample::new(10.0, 240),
        ];
        let records = aggregate(&samples, &zones);
        assert_eq!(total_seconds(&records), 5.0);

        let coverage = ZoneAggregator::default().coverage(&samples, &zones);
        assert_eq!(coverage.attributed_seconds, 5.0);
        assert_eq!(coverage.unmatched_seconds, 10.0);
        assert_eq!(coverage.unmatched_samples, 2);
        assert!((coverage.ratio().unwrap() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_coverage_empty() {
        let coverage = ZoneAggregator::default().coverage(&[], &ZoneTable::defaults());
        assert_eq!(coverage, Coverage::default());
        assert!(coverage.ratio().is_none());
    }

    #[test]
    fn test_records_carry_labels() {
        let zones = ZoneTable::defaults();
        let records = aggregate(&[], &zones);
        assert_eq!(records[0].zone_label, "Zone 1 – Recovery");
    }

    #[test]
    fn test_custom_config() {
        let aggregator = ZoneAggregator::new(AggregatorConfig {
            max_sample_seconds: 60.0,
            trailing_sample_seconds: 0.0,
        });
        let zones = ZoneTable::defaults();
        let samples = [Sample::new(0.0, 130), Sample::new(30.0, 131)];
        let records = aggregator.aggregate(&samples, &zones);
        assert_eq!(zone_total(&records, 3), 30.0);
    }

    #[test]
    fn test_format_total() {
        assert_eq!(format_total(0.0), "0m");
        assert_eq!(format_total(2_700.0), "45m");
        assert_eq!(format_total(3_600.0), "1h 00m");
        assert_eq!(format_total(7_500.0), "2h 05m");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn sorted_samples() -> impl Strategy<Value = Vec<Sample>> {
            prop::collection::vec((0.0f64..40.0, 30u16..240), 0..200).prop_map(|steps| {
                let mut t = 0.0;
                steps
                    .into_iter()
                    .map(|(gap, bpm)| {
                        t += gap;
                        Sample::new(t, bpm)
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn totals_bounded_by_attributed_time(samples in sorted_samples()) {
                let aggregator = ZoneAggregator::default();
                let zones = ZoneTable::defaults();
                let records = aggregator.aggregate(&samples, &zones);

                let attributed: f64 = (0..samples.len())
                    .map(|i| aggregator.attributed_duration(&samples, i))
                    .sum();
                let total = total_seconds(&records);
                prop_assert!(total <= attributed + 1e-6);

                let all_matched = samples.iter().all(|s| zones.classify(s.bpm).is_some());
                if all_matched {
                    prop_assert!((total - attributed).abs() < 1e-6);
                }
            }

            #[test]
            fn one_record_per_zone_in_order(samples in sorted_samples()) {
                let zones = ZoneTable::defaults();
                let records = aggregate(&samples, &zones);
                let ids: Vec<u32> = records.iter().map(|r| r.zone_id).collect();
                let expected: Vec<u32> = zones.iter().map(|z| z.id).collect();
                prop_assert_eq!(ids, expected);
                prop_assert!(records.iter().all(|r| r.total_seconds >= 0.0));
            }

            #[test]
            fn coverage_partitions_time(samples in sorted_samples()) {
                let aggregator = ZoneAggregator::default();
                let zones = ZoneTable::defaults();
                let coverage = aggregator.coverage(&samples, &zones);
                let total = total_seconds(&aggregator.aggregate(&samples, &zones));
                prop_assert!((coverage.attributed_seconds - total).abs() < 1e-6);
            }
        }
    }
}
