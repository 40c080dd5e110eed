//! Mock sample source for testing.
//!
//! [`MockSampleSource`] implements [`SampleSource`] without any platform
//! integration.
//!
//! # Features
//!
//! - **Stored samples**: filtered by the requested range on each fetch
//! - **Scripted responses**: queue per-call results, each with its own delay,
//!   to reproduce out-of-order completion
//! - **Failure injection**: make every fetch fail with a message
//! - **Call recording**: inspect the ranges that were requested

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use jayzone_types::Sample;

use crate::error::{Error, Result};
use crate::period::DateRange;
use crate::source::SampleSource;

/// One scripted reply.
#[derive(Debug, Clone)]
enum ScriptedReply {
    Samples(Vec<Sample>),
    Failure(String),
}

/// A mock sample source.
///
/// # Example
///
/// ```
/// use jayzone_core::{MockSampleSourceBuilder, SampleSource, DateRange};
/// use jayzone_types::Sample;
/// use time::macros::datetime;
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockSampleSourceBuilder::new()
///         .sample(Sample::new(1_709_715_600.0, 120))
///         .build();
///
///     let range = DateRange::new(datetime!(2024-03-06 00:00 UTC), datetime!(2024-03-07 00:00 UTC));
///     let samples = source.fetch_samples(range).await.unwrap();
///     assert_eq!(samples.len(), 1);
/// }
/// ```
pub struct MockSampleSource {
    samples: RwLock<Vec<Sample>>,
    script: Mutex<VecDeque<(Duration, ScriptedReply)>>,
    requests: Mutex<Vec<DateRange>>,
    fetch_count: AtomicU32,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    /// Simulated latency in milliseconds for unscripted fetches (0 = no delay).
    latency_ms: AtomicU64,
}

impl std::fmt::Debug for MockSampleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSampleSource")
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockSampleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSampleSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self {
            samples: RwLock::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            fetch_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
            fail_message: RwLock::new("Mock failure".to_string()),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// Replace the stored samples. They are sorted by timestamp.
    pub async fn set_samples(&self, mut samples: Vec<Sample>) {
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        *self.samples.write().await = samples;
    }

    /// Queue a reply for the next unanswered fetch, delivered after `delay`.
    ///
    /// Scripted replies are returned as-is, without range filtering.
    pub async fn queue_samples(&self, delay: Duration, samples: Vec<Sample>) {
        self.script
            .lock()
            .await
            .push_back((delay, ScriptedReply::Samples(samples)));
    }

    /// Queue a failure for the next unanswered fetch, delivered after `delay`.
    pub async fn queue_failure(&self, delay: Duration, message: &str) {
        self.script
            .lock()
            .await
            .push_back((delay, ScriptedReply::Failure(message.to_string())));
    }

    /// Make every unscripted fetch fail.
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Set the latency of unscripted fetches.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of fetches started.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// Ranges requested so far, in call order.
    pub async fn requests(&self) -> Vec<DateRange> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl SampleSource for MockSampleSource {
    async fn fetch_samples(&self, range: DateRange) -> Result<Vec<Sample>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().await.push(range);

        let scripted = self.script.lock().await.pop_front();
        if let Some((delay, reply)) = scripted {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            return match reply {
                ScriptedReply::Samples(samples) => Ok(samples),
                ScriptedReply::Failure(message) => Err(Error::source_failed(message)),
            };
        }

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::source_failed(self.fail_message.read().await.clone()));
        }

        Ok(self
            .samples
            .read()
            .await
            .iter()
            .filter(|s| range.contains_timestamp(s.timestamp))
            .copied()
            .collect())
    }
}

/// Builder for creating mock sources with custom settings.
#[derive(Debug, Default)]
pub struct MockSampleSourceBuilder {
    samples: Vec<Sample>,
    latency: Duration,
    should_fail: bool,
    fail_message: Option<String>,
}

impl MockSampleSourceBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one stored sample.
    pub fn sample(mut self, sample: Sample) -> Self {
        self.samples.push(sample);
        self
    }

    /// Add stored samples.
    pub fn samples(mut self, samples: impl IntoIterator<Item = Sample>) -> Self {
        self.samples.extend(samples);
        self
    }

    /// Set the latency of unscripted fetches.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every unscripted fetch fail.
    pub fn failing(mut self, message: &str) -> Self {
        self.should_fail = true;
        self.fail_message = Some(message.to_string());
        self
    }

    /// Build the mock source.
    pub fn build(self) -> MockSampleSource {
        let mut samples = self.samples;
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let source = MockSampleSource::new();
        source.set_latency(self.latency);
        source.should_fail.store(self.should_fail, Ordering::Relaxed);
        MockSampleSource {
            samples: RwLock::new(samples),
            fail_message: RwLock::new(
                self.fail_message
                    .unwrap_or_else(|| "Mock failure".to_string()),
            ),
            ..source
        }
    }
}
