use std::time::Duration;

/// Summary statistics over recorded iteration timings.
#[derive(Debug, Clone, Copy)]
pub struct Summary {
    pub min: Duration,
    pub max: Duration,
    pub average: Duration,
}

/// Reduce recorded samples to min/max/mean.
///
/// Sorts ascending so the extremes fall out of the ends; the mean is the
/// untrimmed arithmetic mean. Callers guarantee a non-empty slice.
pub fn aggregate(samples: &mut [Duration]) -> Summary {
    debug_assert!(!samples.is_empty(), "aggregate requires samples");

    samples.sort();
    let total: Duration = samples.iter().sum();

    Summary {
        min: samples[0],
        max: samples[samples.len() - 1],
        average: total / samples.len() as u32,
    }
}

/// Resident-set sample for the current process, if the platform reports one.
///
/// Reads the resident-pages column of `/proc/self/statm`. Any read or
/// parse failure yields `None`; the caller omits the field rather than
/// erroring.
#[cfg(target_os = "linux")]
pub fn memory_usage_bytes() -> Option<u64> {
    // statm reports page counts; 4 KiB pages on every target we run on.
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(resident_pages * 4096)
}

#[cfg(not(target_os = "linux"))]
pub fn memory_usage_bytes() -> Option<u64> {
    None
}
