pub mod config;
pub mod display;
pub mod errors;
pub mod hashing;
pub mod rank;
pub mod runner;
pub mod sources;
pub mod stats;
pub mod suite;
pub mod types;

#[cfg(test)]
mod ranking_cross_check {
    // End-to-end sanity: results produced by the runner must feed the
    // comparator so that a visibly slower operation ranks behind a faster
    // one, with the documented percentage sign.

    use std::convert::Infallible;
    use std::time::Duration;

    use crate::rank::rank_benchmarks;
    use crate::runner::run_benchmark;
    use crate::types::BenchmarkConfig;

    #[tokio::test]
    async fn runner_output_feeds_the_comparator() {
        let config = BenchmarkConfig {
            iterations: 5,
            warmup_iterations: 1,
            timeout: Duration::from_millis(10_000),
            memory_tracking: false,
        };

        let quick = run_benchmark("quick", || async { Ok::<_, Infallible>(()) }, &config)
            .await
            .unwrap();
        let slow = run_benchmark(
            "slow",
            || async {
                tokio::time::sleep(Duration::from_millis(3)).await;
                Ok::<_, Infallible>(())
            },
            &config,
        )
        .await
        .unwrap();

        // Input deliberately slowest-first.
        let ranked = rank_benchmarks(&[slow, quick]);

        assert_eq!(ranked[0].result.name, "quick");
        assert_eq!(ranked[0].percent_vs_fastest, 0.0);
        assert_eq!(ranked[1].result.name, "slow");
        assert!(ranked[1].percent_vs_fastest < 0.0);
    }
}
