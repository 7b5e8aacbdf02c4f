use crate::types::{BenchmarkResult, RankedResult};

/// Order results fastest-first by average iteration time.
///
/// Read-only: the input slice is left untouched and the ordering is stable,
/// so ties keep their original relative order. Position 0 is the fastest
/// with a zero percentage; every slower entry carries
/// `(fastest - entry) / fastest * 100`, a negative number.
pub fn rank_benchmarks(results: &[BenchmarkResult]) -> Vec<RankedResult> {
    let mut ordered: Vec<BenchmarkResult> = results.to_vec();
    ordered.sort_by(|a, b| a.average_time_ms.total_cmp(&b.average_time_ms));

    let fastest = match ordered.first() {
        Some(result) => result.average_time_ms,
        None => return Vec::new(),
    };

    ordered
        .into_iter()
        .enumerate()
        .map(|(position, result)| {
            let percent_vs_fastest = if position == 0 {
                0.0
            } else {
                (fastest - result.average_time_ms) / fastest * 100.0
            };
            RankedResult {
                result,
                position,
                percent_vs_fastest,
            }
        })
        .collect()
}
