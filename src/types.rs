use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;

use crate::errors::BenchError;

/// Knobs for a single benchmark run. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of timed attempts.
    pub iterations: u32,
    /// Untimed, unrecorded attempts executed before measurement begins.
    pub warmup_iterations: u32,
    /// Wall-clock budget for the measured phase, checked between attempts.
    pub timeout: Duration,
    /// Capture a resident-set sample alongside the result when available.
    pub memory_tracking: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            warmup_iterations: 100,
            timeout: Duration::from_millis(30_000),
            memory_tracking: false,
        }
    }
}

impl BenchmarkConfig {
    /// Reject impossible configurations before any operation runs.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.iterations == 0 {
            return Err(BenchError::InvalidConfig {
                detail: "iterations must be at least 1".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(BenchError::InvalidConfig {
                detail: "timeout must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Aggregated outcome of one benchmark run. Never mutated after creation.
///
/// `iterations` counts successful timed attempts only and may be lower than
/// the configured count when attempts failed or the timeout cut the loop
/// short. The min/average/max statistics cover recorded attempts only,
/// while `duration_ms` spans the whole run including warmup.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub name: String,
    pub duration_ms: f64,
    pub iterations: u32,
    pub average_time_ms: f64,
    pub min_time_ms: f64,
    pub max_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage_bytes: Option<u64>,
}

/// A result annotated with its place in a ranking.
///
/// `percent_vs_fastest` is zero for the fastest entry and negative for
/// everything slower; callers wanting "how much slower" negate it.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub result: BenchmarkResult,
    pub position: usize,
    pub percent_vs_fastest: f64,
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Default,
    Short,
}

/// Duration as fractional milliseconds.
pub fn duration_millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
