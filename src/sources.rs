use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;

use crate::hashing::x64hash128;

/// A collected component: one named fact about the host environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComponentValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

pub type ComponentMap = BTreeMap<String, ComponentValue>;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Emit per-source timing events while collecting.
    pub debug: bool,
}

/// A single named probe contributing one component to the collected map.
#[async_trait]
pub trait Source: Send + Sync {
    fn key(&self) -> &'static str;
    async fn collect(&self, options: &SourceOptions) -> Result<ComponentValue, SourceError>;
}

/// Bind a source set to its options and exclusions, yielding an async
/// callable that produces one component map per invocation.
///
/// Sources run sequentially in the order given. A failing source is
/// logged and skipped; it never fails the batch.
pub fn load_sources(
    sources: Vec<Arc<dyn Source>>,
    options: SourceOptions,
    exclusions: &[&str],
) -> impl Fn() -> Pin<Box<dyn Future<Output = ComponentMap> + Send>> {
    let excluded: Vec<String> = exclusions.iter().map(|s| s.to_string()).collect();
    let sources: Vec<Arc<dyn Source>> = sources
        .into_iter()
        .filter(|source| !excluded.iter().any(|e| e == source.key()))
        .collect();

    move || {
        let sources = sources.clone();
        let options = options.clone();
        Box::pin(async move {
            let mut components = ComponentMap::new();
            for source in &sources {
                let started = Instant::now();
                match source.collect(&options).await {
                    Ok(value) => {
                        if options.debug {
                            tracing::debug!(
                                source = source.key(),
                                elapsed_us = started.elapsed().as_micros() as u64,
                                "collected"
                            );
                        }
                        components.insert(source.key().to_string(), value);
                    }
                    Err(err) => {
                        tracing::warn!(source = source.key(), %err, "source failed, skipping");
                    }
                }
            }
            components
        })
    }
}

// ---------------------------------------------------------------------------
// Built-in sources
// ---------------------------------------------------------------------------

struct PlatformSource;

#[async_trait]
impl Source for PlatformSource {
    fn key(&self) -> &'static str {
        "platform"
    }

    async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
        Ok(ComponentValue::Text(std::env::consts::OS.to_string()))
    }
}

struct FamilySource;

#[async_trait]
impl Source for FamilySource {
    fn key(&self) -> &'static str {
        "family"
    }

    async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
        Ok(ComponentValue::Text(std::env::consts::FAMILY.to_string()))
    }
}

struct ArchitectureSource;

#[async_trait]
impl Source for ArchitectureSource {
    fn key(&self) -> &'static str {
        "architecture"
    }

    async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
        Ok(ComponentValue::Text(std::env::consts::ARCH.to_string()))
    }
}

struct HardwareConcurrencySource;

#[async_trait]
impl Source for HardwareConcurrencySource {
    fn key(&self) -> &'static str {
        "hardware_concurrency"
    }

    async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
        let threads = std::thread::available_parallelism()?;
        Ok(ComponentValue::Number(threads.get() as f64))
    }
}

struct OsReleaseSource;

#[async_trait]
impl Source for OsReleaseSource {
    fn key(&self) -> &'static str {
        "os_release"
    }

    async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
        read_os_release()
    }
}

#[cfg(target_os = "linux")]
fn read_os_release() -> Result<ComponentValue, SourceError> {
    let release = std::fs::read_to_string("/proc/sys/kernel/osrelease")?;
    Ok(ComponentValue::Text(release.trim().to_string()))
}

#[cfg(not(target_os = "linux"))]
fn read_os_release() -> Result<ComponentValue, SourceError> {
    Err(SourceError::Unavailable("os_release"))
}

struct HostnameSource;

#[async_trait]
impl Source for HostnameSource {
    fn key(&self) -> &'static str {
        "hostname"
    }

    async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
        #[cfg(target_os = "linux")]
        if let Ok(name) = std::fs::read_to_string("/proc/sys/kernel/hostname") {
            return Ok(ComponentValue::Text(name.trim().to_string()));
        }
        std::env::var("HOSTNAME")
            .map(ComponentValue::Text)
            .map_err(|_| SourceError::Unavailable("hostname"))
    }
}

/// Digest of the sorted environment variable names. The names alone are
/// enough to distinguish environments; values stay out of the component.
struct EnvFingerprintSource;

#[async_trait]
impl Source for EnvFingerprintSource {
    fn key(&self) -> &'static str {
        "env_fingerprint"
    }

    async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
        let mut names: Vec<String> = std::env::vars_os()
            .map(|(name, _)| name.to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(ComponentValue::Text(x64hash128(&names.join("\n"))))
    }
}

/// Digest of `/proc/cpuinfo`, one of the heavier probes.
struct CpuinfoDigestSource;

#[async_trait]
impl Source for CpuinfoDigestSource {
    fn key(&self) -> &'static str {
        "cpuinfo_digest"
    }

    async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
        read_cpuinfo_digest()
    }
}

#[cfg(target_os = "linux")]
fn read_cpuinfo_digest() -> Result<ComponentValue, SourceError> {
    let cpuinfo = std::fs::read_to_string("/proc/cpuinfo")?;
    Ok(ComponentValue::Text(x64hash128(&cpuinfo)))
}

#[cfg(not(target_os = "linux"))]
fn read_cpuinfo_digest() -> Result<ComponentValue, SourceError> {
    Err(SourceError::Unavailable("cpuinfo_digest"))
}

struct TimezoneOffsetSource;

#[async_trait]
impl Source for TimezoneOffsetSource {
    fn key(&self) -> &'static str {
        "timezone_offset_minutes"
    }

    async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
        let offset = chrono::Local::now().offset().local_minus_utc();
        Ok(ComponentValue::Number(f64::from(offset) / 60.0))
    }
}

/// Every built-in source, heavier probes included.
pub fn all_sources() -> Vec<Arc<dyn Source>> {
    vec![
        Arc::new(PlatformSource),
        Arc::new(FamilySource),
        Arc::new(ArchitectureSource),
        Arc::new(HardwareConcurrencySource),
        Arc::new(OsReleaseSource),
        Arc::new(HostnameSource),
        Arc::new(EnvFingerprintSource),
        Arc::new(CpuinfoDigestSource),
        Arc::new(TimezoneOffsetSource),
    ]
}

/// The declared fast subset: constant lookups only, no file reads.
pub fn fast_sources() -> Vec<Arc<dyn Source>> {
    vec![
        Arc::new(PlatformSource),
        Arc::new(FamilySource),
        Arc::new(ArchitectureSource),
        Arc::new(HardwareConcurrencySource),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    #[async_trait]
    impl Source for FailingSource {
        fn key(&self) -> &'static str {
            "failing"
        }

        async fn collect(&self, _options: &SourceOptions) -> Result<ComponentValue, SourceError> {
            Err(SourceError::Unavailable("always fails"))
        }
    }

    #[tokio::test]
    async fn collects_platform_from_env_consts() {
        let collect = load_sources(fast_sources(), SourceOptions::default(), &[]);
        let components = collect().await;

        assert_eq!(
            components.get("platform"),
            Some(&ComponentValue::Text(std::env::consts::OS.to_string()))
        );
        assert_eq!(
            components.get("architecture"),
            Some(&ComponentValue::Text(std::env::consts::ARCH.to_string()))
        );
    }

    #[tokio::test]
    async fn exclusions_are_respected() {
        let collect = load_sources(
            fast_sources(),
            SourceOptions::default(),
            &["platform", "family"],
        );
        let components = collect().await;

        assert!(!components.contains_key("platform"));
        assert!(!components.contains_key("family"));
        assert!(components.contains_key("architecture"));
    }

    #[tokio::test]
    async fn failing_source_is_skipped_not_fatal() {
        let sources: Vec<Arc<dyn Source>> = vec![Arc::new(FailingSource), Arc::new(PlatformSource)];
        let collect = load_sources(sources, SourceOptions::default(), &[]);
        let components = collect().await;

        assert!(!components.contains_key("failing"));
        assert!(components.contains_key("platform"));
    }

    #[tokio::test]
    async fn callable_is_reusable_across_invocations() {
        let collect = load_sources(fast_sources(), SourceOptions::default(), &[]);

        let first = collect().await;
        let second = collect().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fast_sources_are_a_subset_of_all_sources() {
        let all: Vec<&str> = all_sources().iter().map(|s| s.key()).collect();
        for source in fast_sources() {
            assert!(all.contains(&source.key()), "{} missing", source.key());
        }
    }

    #[tokio::test]
    async fn hardware_concurrency_is_a_positive_number() {
        let collect = load_sources(
            vec![Arc::new(HardwareConcurrencySource) as Arc<dyn Source>],
            SourceOptions::default(),
            &[],
        );
        let components = collect().await;

        match components.get("hardware_concurrency") {
            Some(ComponentValue::Number(n)) => assert!(*n >= 1.0),
            other => panic!("unexpected component: {other:?}"),
        }
    }
}
