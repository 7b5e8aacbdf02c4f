use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// Wiped wholesale once the cache reaches this many entries, so workloads
/// hashing a stream of fresh strings cannot grow it without bound.
const CACHE_CAP: usize = 10_000;

#[derive(Default)]
struct HashCache {
    entries: HashMap<String, String>,
    hits: u64,
    misses: u64,
}

static HASH_CACHE: Lazy<Mutex<HashCache>> = Lazy::new(|| Mutex::new(HashCache::default()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// MurmurHash3 x64 128-bit digest of `input`, as 32 lowercase hex chars.
///
/// Digests are memoized in a process-wide cache; [`clear_hash_cache`]
/// resets it so cached and uncached variants can be benchmarked
/// separately.
pub fn x64hash128(input: &str) -> String {
    let mut cache = lock_cache();

    if let Some(digest) = cache.entries.get(input) {
        let digest = digest.clone();
        cache.hits += 1;
        return digest;
    }
    cache.misses += 1;

    let (h1, h2) = murmur3_x64_128(input.as_bytes(), 0);
    let digest = format!("{h1:016x}{h2:016x}");

    if cache.entries.len() >= CACHE_CAP {
        cache.entries.clear();
    }
    cache.entries.insert(input.to_string(), digest.clone());

    digest
}

/// Empty the digest cache and reset its hit/miss counters.
pub fn clear_hash_cache() {
    let mut cache = lock_cache();
    cache.entries.clear();
    cache.hits = 0;
    cache.misses = 0;
}

pub fn hash_cache_stats() -> CacheStats {
    let cache = lock_cache();
    CacheStats {
        entries: cache.entries.len(),
        hits: cache.hits,
        misses: cache.misses,
    }
}

fn lock_cache() -> std::sync::MutexGuard<'static, HashCache> {
    // The cache stays usable after a panicked holder; recover from poisoning.
    HASH_CACHE.lock().unwrap_or_else(|e| e.into_inner())
}

fn murmur3_x64_128(data: &[u8], seed: u64) -> (u64, u64) {
    let mut h1 = seed;
    let mut h2 = seed;

    let mut blocks = data.chunks_exact(16);
    for block in &mut blocks {
        let k1 = u64::from_le_bytes(block[..8].try_into().unwrap());
        let k2 = u64::from_le_bytes(block[8..].try_into().unwrap());

        h1 ^= mix_k1(k1);
        h1 = h1
            .rotate_left(27)
            .wrapping_add(h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dc_e729);

        h2 ^= mix_k2(k2);
        h2 = h2
            .rotate_left(31)
            .wrapping_add(h1)
            .wrapping_mul(5)
            .wrapping_add(0x3849_5ab5);
    }

    let tail = blocks.remainder();
    let mut k1 = 0u64;
    let mut k2 = 0u64;
    for (i, &byte) in tail.iter().enumerate() {
        if i < 8 {
            k1 |= (byte as u64) << (8 * i);
        } else {
            k2 |= (byte as u64) << (8 * (i - 8));
        }
    }
    if tail.len() > 8 {
        h2 ^= mix_k2(k2);
    }
    if !tail.is_empty() {
        h1 ^= mix_k1(k1);
    }

    h1 ^= data.len() as u64;
    h2 ^= data.len() as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    (h1, h2)
}

fn mix_k1(mut k1: u64) -> u64 {
    k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(31);
    k1.wrapping_mul(C2)
}

fn mix_k2(mut k2: u64) -> u64 {
    k2 = k2.wrapping_mul(C2);
    k2 = k2.rotate_left(33);
    k2.wrapping_mul(C1)
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// Serializes tests that reset or assert on the process-wide cache.
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard};

    static CACHE_LOCK: Mutex<()> = Mutex::new(());

    pub(crate) fn cache_guard() -> MutexGuard<'static, ()> {
        CACHE_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}
