//! Common test utilities for cobolt_laser integration tests
//!
//! This module provides reusable test helpers for:
//! - Building lasers on top of the simulated adapter
//! - Capturing log output through a `LogSink`
//! - Timing assertions with appropriate tolerances

#![allow(dead_code)] // Not every test file uses every helper

use cobolt_laser::adapters::{CommandLog, MockAdapter};
use cobolt_laser::laser::{Laser, LaserBuilder};
use cobolt_laser::logging::LogSink;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// Identifier of a 06-01 series laser.
pub const DPL06_MODEL: &str = "0532-06-01-0100-100";
/// Identifier of a Compact 05 series laser.
pub const COMPACT05_MODEL: &str = "0473-05-01-0050-100";
/// Identifier no family marker matches.
pub const UNKNOWN_MODEL: &str = "0660-04-01-0040-100";

/// `LogSink` that keeps every message for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().clone()
    }

    /// True if any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: Level, message: &str) {
        self.entries.lock().push((level, message.to_string()));
    }
}

/// Build a laser on `adapter`, returning the adapter's command log as well.
pub fn build_laser(adapter: MockAdapter) -> (Laser, CommandLog) {
    let log = adapter.command_log();
    let laser = LaserBuilder::default()
        .build(Box::new(adapter))
        .expect("mock laser should build");
    (laser, log)
}

/// Build a laser and record everything it logs.
pub fn build_laser_with_sink(adapter: MockAdapter) -> (Laser, CommandLog, Arc<RecordingSink>) {
    let sink = RecordingSink::new();
    let log = adapter.command_log();
    let laser = LaserBuilder::new(sink.clone())
        .build(Box::new(adapter))
        .expect("mock laser should build");
    (laser, log, sink)
}

/// Tolerance levels for real-time timing assertions.
#[derive(Debug, Clone, Copy)]
pub enum TimingTolerance {
    /// 5% tolerance - only for stable, controlled environments
    Tight,
    /// 20% tolerance - default for local development
    Normal,
    /// 50% tolerance - for CI environments with variable load
    Relaxed,
}

impl TimingTolerance {
    /// Get the tolerance factor as a fraction (0.0 to 1.0)
    pub fn factor(&self) -> f64 {
        match self {
            TimingTolerance::Tight => 0.05,
            TimingTolerance::Normal => 0.20,
            TimingTolerance::Relaxed => 0.50,
        }
    }
}

/// Assert that a blocking wait lasted at least `expected` and not much longer.
///
/// A sleep never ends early, so only the upper bound gets the tolerance.
///
/// # Panics
/// Panics if the actual duration is outside the acceptable range.
pub fn assert_duration_near(
    actual: Duration,
    expected: Duration,
    tolerance: TimingTolerance,
    context: &str,
) {
    let max = expected.mul_f64(1.0 + tolerance.factor());

    assert!(
        actual >= expected && actual <= max,
        "{}: expected {:?} +{:.0}%, got {:?} (acceptable range: {:?} to {:?})",
        context,
        expected,
        tolerance.factor() * 100.0,
        actual,
        expected,
        max
    );
}

/// Get appropriate timing tolerance based on environment.
///
/// Returns:
/// - `Relaxed` if running in CI (CI env var is set)
/// - `Tight` if TIMING_STRICT env var is set
/// - `Normal` otherwise
pub fn env_timing_tolerance() -> TimingTolerance {
    if std::env::var("CI").is_ok() {
        TimingTolerance::Relaxed
    } else if std::env::var("TIMING_STRICT").is_ok() {
        TimingTolerance::Tight
    } else {
        TimingTolerance::Normal
    }
}
