use std::convert::Infallible;
use std::hint::black_box;

use serde::Serialize;

use crate::errors::BenchError;
use crate::hashing::{clear_hash_cache, x64hash128};
use crate::rank::rank_benchmarks;
use crate::runner::run_benchmark;
use crate::sources::{SourceOptions, all_sources, fast_sources, load_sources};
use crate::types::{BenchmarkConfig, BenchmarkResult, RankedResult};

/// One suite's results, ranked fastest-first.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub ranked: Vec<RankedResult>,
}

/// Input strings spanning the shapes the hash sees in practice.
const HASH_INPUTS: &[&str] = &[
    "short",
    "medium length string",
    "very long string with many characters to test performance of hashing algorithm",
    "string with special chars: !@#$%^&*()_+-=[]{}|;:,.<>?",
    "unicode string: 🚀🌟🎉🎊🎋🎍🎎🎏🎐🎑",
];

/// Per-variant iteration scaling. At the default 1000 iterations this
/// reproduces the original suite constants: 100 for fresh strings, 10 for
/// the full source set, 100 for the fast subset.
fn scaled(config: &BenchmarkConfig, divisor: u32) -> BenchmarkConfig {
    BenchmarkConfig {
        iterations: (config.iterations / divisor).max(1),
        ..config.clone()
    }
}

/// Benchmark the hash with a cold cache, a warm cache, and per-call fresh
/// inputs.
pub async fn benchmark_hashing(
    config: &BenchmarkConfig,
) -> Result<Vec<BenchmarkResult>, BenchError> {
    let mut results = Vec::new();

    let hash_batch = || async {
        for input in HASH_INPUTS {
            black_box(x64hash128(input));
        }
        Ok::<_, Infallible>(())
    };

    // Cold start: the first measured pass repopulates the cache.
    clear_hash_cache();
    results.push(run_benchmark("hashing without cache", hash_batch, config).await?);

    // Same inputs again, cache left warm.
    results.push(run_benchmark("hashing with cache", hash_batch, config).await?);

    // Unseen inputs every call, so the cache never helps.
    let mut batch = 0u64;
    results.push(
        run_benchmark(
            "hashing new strings",
            || {
                let batch_id = batch;
                batch += 1;
                async move {
                    for i in 0..100u64 {
                        black_box(x64hash128(&format!("new string {i} {batch_id}")));
                    }
                    Ok::<_, Infallible>(())
                }
            },
            &scaled(config, 10),
        )
        .await?,
    );

    Ok(results)
}

/// Benchmark source collection: everything versus the declared fast subset.
pub async fn benchmark_source_loading(
    config: &BenchmarkConfig,
) -> Result<Vec<BenchmarkResult>, BenchError> {
    let mut results = Vec::new();

    let collect_all = load_sources(all_sources(), SourceOptions::default(), &[]);
    results.push(
        run_benchmark(
            "load all sources",
            || {
                let fut = collect_all();
                async move { Ok::<_, Infallible>(fut.await) }
            },
            &scaled(config, 100),
        )
        .await?,
    );

    let collect_fast = load_sources(fast_sources(), SourceOptions::default(), &[]);
    results.push(
        run_benchmark(
            "load fast sources only",
            || {
                let fut = collect_fast();
                async move { Ok::<_, Infallible>(fut.await) }
            },
            &scaled(config, 10),
        )
        .await?,
    );

    Ok(results)
}

pub async fn hashing_report(config: &BenchmarkConfig) -> Result<SuiteReport, BenchError> {
    let results = benchmark_hashing(config).await?;
    Ok(SuiteReport {
        suite: "hashing".to_string(),
        ranked: rank_benchmarks(&results),
    })
}

pub async fn sources_report(config: &BenchmarkConfig) -> Result<SuiteReport, BenchError> {
    let results = benchmark_source_loading(config).await?;
    Ok(SuiteReport {
        suite: "sources".to_string(),
        ranked: rank_benchmarks(&results),
    })
}

/// Run every suite and rank each one's results.
pub async fn run_all_benchmarks(
    config: &BenchmarkConfig,
) -> Result<Vec<SuiteReport>, BenchError> {
    Ok(vec![hashing_report(config).await?, sources_report(config).await?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::test_support::cache_guard;
    use std::time::Duration;

    fn tiny_config() -> BenchmarkConfig {
        BenchmarkConfig {
            iterations: 20,
            warmup_iterations: 2,
            timeout: Duration::from_millis(10_000),
            memory_tracking: false,
        }
    }

    #[tokio::test]
    async fn hashing_suite_produces_three_named_variants() {
        let _guard = cache_guard();
        let results = benchmark_hashing(&tiny_config()).await.unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "hashing without cache",
                "hashing with cache",
                "hashing new strings"
            ]
        );
        for result in &results {
            assert!(result.iterations >= 1);
            assert!(result.min_time_ms <= result.average_time_ms);
            assert!(result.average_time_ms <= result.max_time_ms);
        }
    }

    #[tokio::test]
    async fn fresh_string_variant_runs_a_tenth_of_the_iterations() {
        let _guard = cache_guard();
        let results = benchmark_hashing(&tiny_config()).await.unwrap();

        assert_eq!(results[0].iterations, 20);
        assert_eq!(results[2].iterations, 2);
    }

    #[tokio::test]
    async fn source_suite_produces_two_named_variants() {
        let _guard = cache_guard();
        let results = benchmark_source_loading(&tiny_config()).await.unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["load all sources", "load fast sources only"]);
    }

    #[tokio::test]
    async fn all_benchmarks_yield_ranked_reports() {
        let _guard = cache_guard();
        let reports = run_all_benchmarks(&tiny_config()).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].suite, "hashing");
        assert_eq!(reports[1].suite, "sources");

        for report in &reports {
            assert!(!report.ranked.is_empty());
            assert_eq!(report.ranked[0].position, 0);
            assert_eq!(report.ranked[0].percent_vs_fastest, 0.0);
            for entry in &report.ranked[1..] {
                assert!(entry.percent_vs_fastest <= 0.0);
            }
        }
    }

    #[test]
    fn scaling_never_drops_below_one_iteration() {
        let config = BenchmarkConfig {
            iterations: 3,
            ..Default::default()
        };
        assert_eq!(scaled(&config, 10).iterations, 1);
        assert_eq!(scaled(&config, 100).iterations, 1);
    }
}
