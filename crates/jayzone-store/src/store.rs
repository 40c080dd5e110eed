//! Main store implementation.

use std::io::Read;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use jayzone_core::DateRange;
use jayzone_types::Sample;

use crate::error::{Error, Result};
use crate::schema;

/// Result of a CSV import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    /// Data rows read (header excluded).
    pub rows: usize,
    /// Samples newly stored.
    pub inserted: usize,
    /// Rows whose timestamp was already stored.
    pub duplicates: usize,
}

/// Span of the cached samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleStats {
    pub count: u64,
    pub first: Option<f64>,
    pub last: Option<f64>,
}

/// SQLite-based store for samples and preferences.
pub struct Store {
    conn: Connection,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }
}

// Preference operations
impl Store {
    /// Read the raw value stored under `key`.
    pub fn get_preference(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn put_preference(&self, key: &str, value: &[u8]) -> Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            rusqlite::params![key, value, now],
        )?;
        debug!("Saved preference {} ({} bytes)", key, value.len());
        Ok(())
    }

    /// Remove `key`. Returns whether it existed.
    pub fn delete_preference(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM preferences WHERE key = ?", [key])?;
        Ok(removed > 0)
    }
}

// Sample operations
impl Store {
    /// Insert samples, skipping timestamps that are already stored.
    ///
    /// Returns the number of new rows.
    pub fn insert_samples(&self, samples: &[Sample]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO samples (timestamp, bpm) VALUES (?1, ?2)")?;
            for sample in samples {
                inserted += stmt.execute(rusqlite::params![sample.timestamp, sample.bpm])?;
            }
        }
        tx.commit()?;

        info!("Inserted {} new samples ({} given)", inserted, samples.len());
        Ok(inserted)
    }

    /// Samples with timestamps in `[range.start, range.end)`, ascending.
    pub fn query_samples(&self, range: &DateRange) -> Result<Vec<Sample>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, bpm FROM samples
             WHERE timestamp >= ?1 AND timestamp < ?2
             ORDER BY timestamp ASC",
        )?;

        let samples = stmt
            .query_map(
                rusqlite::params![range.start_timestamp(), range.end_timestamp()],
                |row| Ok(Sample::new(row.get(0)?, row.get(1)?)),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Loaded {} samples for {:?}", samples.len(), range);
        Ok(samples)
    }

    /// Count stored samples.
    pub fn count_samples(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM samples", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Count and time span of stored samples.
    pub fn sample_stats(&self) -> Result<SampleStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*), MIN(timestamp), MAX(timestamp) FROM samples",
            [],
            |row| {
                Ok(SampleStats {
                    count: row.get::<_, i64>(0)? as u64,
                    first: row.get(1)?,
                    last: row.get(2)?,
                })
            },
        )?;
        Ok(stats)
    }

    /// Delete every stored sample. Returns the number removed.
    pub fn clear_samples(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM samples", [])?;
        info!("Cleared {} samples", removed);
        Ok(removed)
    }

    /// Import `timestamp,bpm` rows from CSV.
    ///
    /// The timestamp is RFC 3339 or Unix seconds. A first row whose
    /// timestamp does not parse is treated as a header.
    pub fn import_csv<R: Read>(&self, reader: R) -> Result<ImportResult> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut samples = Vec::new();
        for (index, record) in rdr.records().enumerate() {
            let record = record?;
            let line = record.position().map_or(index as u64 + 1, |p| p.line());

            let raw_timestamp = record.get(0).unwrap_or_default();
            let timestamp = match parse_timestamp(raw_timestamp) {
                Some(ts) => ts,
                None if index == 0 => {
                    debug!("Skipping CSV header: {:?}", record);
                    continue;
                }
                None => {
                    return Err(Error::invalid_sample(
                        line,
                        format!("unrecognized timestamp '{}'", raw_timestamp),
                    ));
                }
            };

            let raw_bpm = record
                .get(1)
                .ok_or_else(|| Error::invalid_sample(line, "missing bpm column"))?;
            let bpm: u16 = raw_bpm
                .parse()
                .map_err(|_| Error::invalid_sample(line, format!("invalid bpm '{}'", raw_bpm)))?;

            samples.push(Sample::new(timestamp, bpm));
        }

        let inserted = self.insert_samples(&samples)?;
        Ok(ImportResult {
            rows: samples.len(),
            inserted,
            duplicates: samples.len() - inserted,
        })
    }
}

/// Parse Unix seconds or an RFC 3339 instant into Unix seconds.
pub fn parse_timestamp(s: &str) -> Option<f64> {
    if let Ok(seconds) = s.parse::<f64>() {
        return seconds.is_finite().then_some(seconds);
    }
    OffsetDateTime::parse(s, &Rfc3339)
        .ok()
        .map(|dt| dt.unix_timestamp_nanos() as f64 / 1e9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn day() -> DateRange {
        DateRange::new(
            datetime!(2024-03-06 00:00 UTC),
            datetime!(2024-03-07 00:00 UTC),
        )
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.count_samples().unwrap(), 0);
        assert!(store.get_preference("zones").unwrap().is_none());
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.db");
        let store = Store::open(&path).unwrap();
        store.insert_samples(&[Sample::new(1.0, 100)]).unwrap();
        drop(store);

        let store = Store::open(&path).unwrap();
        assert_eq!(store.count_samples().unwrap(), 1);
    }

    #[test]
    fn test_preferences_round_trip() {
        let store = Store::open_in_memory().unwrap();
        store.put_preference("k", b"one").unwrap();
        store.put_preference("k", b"two").unwrap();
        assert_eq!(store.get_preference("k").unwrap(), Some(b"two".to_vec()));

        assert!(store.delete_preference("k").unwrap());
        assert!(!store.delete_preference("k").unwrap());
        assert!(store.get_preference("k").unwrap().is_none());
    }

    #[test]
    fn test_insert_samples_deduplicates() {
        let store = Store::open_in_memory().unwrap();
        let start = day().start_timestamp();
        let samples = vec![
            Sample::new(start, 100),
            Sample::new(start, 180),
            Sample::new(start + 5.0, 110),
        ];

        assert_eq!(store.insert_samples(&samples).unwrap(), 2);
        assert_eq!(store.insert_samples(&samples).unwrap(), 0);
        assert_eq!(store.count_samples().unwrap(), 2);

        let stored = store.query_samples(&day()).unwrap();
        assert_eq!(stored[0].bpm, 100);
    }

    #[test]
    fn test_query_is_half_open_and_sorted() {
        let store = Store::open_in_memory().unwrap();
        let range = day();
        store
            .insert_samples(&[
                Sample::new(range.start_timestamp() + 20.0, 130),
                Sample::new(range.end_timestamp(), 150),
                Sample::new(range.start_timestamp(), 110),
                Sample::new(range.start_timestamp() - 1.0, 90),
            ])
            .unwrap();

        let bpms: Vec<u16> = store
            .query_samples(&range)
            .unwrap()
            .iter()
            .map(|s| s.bpm)
            .collect();
        assert_eq!(bpms, vec![110, 130]);
    }

    #[test]
    fn test_sample_stats_and_clear() {
        let store = Store::open_in_memory().unwrap();
        let empty = store.sample_stats().unwrap();
        assert_eq!(empty.count, 0);
        assert_eq!(empty.first, None);

        store
            .insert_samples(&[Sample::new(10.0, 100), Sample::new(30.0, 120)])
            .unwrap();
        let stats = store.sample_stats().unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.first, Some(10.0));
        assert_eq!(stats.last, Some(30.0));

        assert_eq!(store.clear_samples().unwrap(), 2);
        assert_eq!(store.count_samples().unwrap(), 0);
    }

    #[test]
    fn test_import_csv_with_header_and_mixed_timestamps() {
        let store = Store::open_in_memory().unwrap();
        let csv = "timestamp,bpm\n\
                   2024-03-06T08:00:00Z,120\n\
                   1709712005,125\n\
                   2024-03-06T08:00:00Z,130\n";

        let result = store.import_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            result,
            ImportResult {
                rows: 3,
                inserted: 2,
                duplicates: 1
            }
        );

        let samples = store.query_samples(&day()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, 1_709_712_000.0);
        assert_eq!(samples[0].bpm, 120);
    }

    #[test]
    fn test_import_csv_without_header() {
        let store = Store::open_in_memory().unwrap();
        let result = store.import_csv("100.5, 90\n101.5, 95\n".as_bytes()).unwrap();
        assert_eq!(result.inserted, 2);
    }

    #[test]
    fn test_import_csv_rejects_bad_row() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .import_csv("timestamp,bpm\n100,90\nyesterday,95\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSample { line: 3, .. }));
        // Nothing is written when a row fails
        assert_eq!(store.count_samples().unwrap(), 0);

        let err = store.import_csv("100,fast\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid bpm"));
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("12.5"), Some(12.5));
        assert_eq!(
            parse_timestamp("2024-03-06T08:00:00+02:00"),
            Some(1_709_704_800.0)
        );
        assert_eq!(parse_timestamp("NaN"), None);
        assert_eq!(parse_timestamp("bpm"), None);
    }
}
