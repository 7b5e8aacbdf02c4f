use std::future::Future;
use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::errors::BenchError;
use crate::stats;
use crate::types::{BenchmarkConfig, BenchmarkResult, duration_millis};

/// Run `operation` under `config` and aggregate its latency distribution.
///
/// Invocations are strictly sequential: each one is awaited to completion
/// before the next begins, whether the operation suspends or not. Warmup
/// attempts leave no trace: values and errors alike are discarded. A
/// measured attempt records a sample only on success; a failing attempt
/// spends its loop slot and the loop moves on. The timeout is compared
/// against the measured-phase clock between attempts only, so an operation
/// that hangs mid-flight is not preempted.
///
/// Fails with [`BenchError::NoSuccessfulIterations`] when every measured
/// attempt errors; a zero-filled result is never produced.
pub async fn run_benchmark<F, Fut, T, E>(
    name: &str,
    mut operation: F,
    config: &BenchmarkConfig,
) -> Result<BenchmarkResult, BenchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    config.validate()?;

    let run_start = Instant::now();

    // Warmup: let caches and lazy state settle before measuring.
    for _ in 0..config.warmup_iterations {
        if let Ok(value) = operation().await {
            black_box(value);
        }
    }

    let mut samples: Vec<Duration> = Vec::with_capacity(config.iterations as usize);
    let phase_start = Instant::now();

    for _ in 0..config.iterations {
        let attempt_start = Instant::now();

        if let Ok(value) = operation().await {
            let elapsed = attempt_start.elapsed();
            black_box(value);
            samples.push(elapsed);
        }

        if phase_start.elapsed() > config.timeout {
            break;
        }
    }

    let duration_ms = duration_millis(run_start.elapsed());

    if samples.is_empty() {
        return Err(BenchError::NoSuccessfulIterations {
            name: name.to_string(),
        });
    }

    let iterations = samples.len() as u32;
    let summary = stats::aggregate(&mut samples);

    let memory_usage_bytes = if config.memory_tracking {
        stats::memory_usage_bytes()
    } else {
        None
    };

    Ok(BenchmarkResult {
        name: name.to_string(),
        duration_ms,
        iterations,
        average_time_ms: duration_millis(summary.average),
        min_time_ms: duration_millis(summary.min),
        max_time_ms: duration_millis(summary.max),
        memory_usage_bytes,
    })
}
