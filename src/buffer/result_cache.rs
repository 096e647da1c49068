/*!
 * Size-bounded result cache keyed by chunk index.
 *
 * Values are stored serialized (JSON, optionally zlib-compressed) so that
 * resident size is measured on the bytes actually held. When an insertion
 * would exceed capacity, entries are evicted by the configured policy:
 * - LRU: the entry least recently returned by a `get` hit (or inserted)
 * - FIFO: the entry inserted first, regardless of access
 */

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::marker::PhantomData;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::CacheError;

/// Which entry to remove when the cache is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least recently used
    #[default]
    Lru,
    /// First in, first out
    Fifo,
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lru => write!(f, "lru"),
            Self::Fifo => write!(f, "fifo"),
        }
    }
}

/// Configuration for the result cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Capacity in megabytes
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: usize,

    /// Exact capacity in bytes, overriding `max_size_mb` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_bytes: Option<usize>,

    /// Compress stored entries
    #[serde(default = "default_true")]
    pub enable_compression: bool,

    /// Eviction policy
    #[serde(default)]
    pub eviction_policy: EvictionPolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_size_mb(),
            capacity_bytes: None,
            enable_compression: true,
            eviction_policy: EvictionPolicy::default(),
        }
    }
}

impl BufferConfig {
    /// Create a configuration with an exact byte capacity
    pub fn with_capacity_bytes(capacity_bytes: usize, policy: EvictionPolicy, compress: bool) -> Self {
        Self {
            capacity_bytes: Some(capacity_bytes),
            enable_compression: compress,
            eviction_policy: policy,
            ..Default::default()
        }
    }

    /// Effective capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity_bytes
            .unwrap_or_else(|| self.max_size_mb.saturating_mul(1024 * 1024))
    }
}

fn default_max_size_mb() -> usize {
    50
}

fn default_true() -> bool {
    true
}

/// Cache statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Successful lookups
    pub hits: u64,
    /// Lookups of absent or evicted keys
    pub misses: u64,
    /// Entries currently stored
    pub chunks: usize,
    /// Entries removed to make room
    pub evictions: u64,
    /// Entries stored compressed
    pub compressions: u64,
    /// hits / (hits + misses), 0 without lookups
    pub hit_rate: f64,
    /// Bytes currently held
    pub resident_bytes: usize,
    /// Configured capacity in bytes
    pub capacity_bytes: usize,
}

struct Entry {
    data: Vec<u8>,
    compressed: bool,
    stamp: u64,
}

/// Bounded, size-accounted cache mapping chunk index to a serialized value
pub struct ResultCache<V> {
    config: BufferConfig,
    capacity: usize,
    entries: HashMap<usize, Entry>,
    /// Eviction order: stamp -> index, oldest first
    order: BTreeMap<u64, usize>,
    clock: u64,
    resident: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
    compressions: u64,
    _value: PhantomData<fn() -> V>,
}

impl<V: Serialize + DeserializeOwned> ResultCache<V> {
    /// Create a new cache
    pub fn new(config: BufferConfig) -> Self {
        let capacity = config.capacity();
        Self {
            config,
            capacity,
            entries: HashMap::new(),
            order: BTreeMap::new(),
            clock: 0,
            resident: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
            compressions: 0,
            _value: PhantomData,
        }
    }

    /// Store a value under a chunk index
    ///
    /// Returns false when the encoded value alone exceeds capacity, in which
    /// case nothing is evicted and any previous value for the index is kept.
    pub fn add(&mut self, index: usize, value: &V) -> bool {
        let (data, compressed) = match self.encode(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Not caching result for chunk {}: {}", index, e);
                return false;
            }
        };

        if data.len() > self.capacity {
            debug!(
                "Result for chunk {} ({} bytes) exceeds cache capacity of {} bytes",
                index,
                data.len(),
                self.capacity
            );
            return false;
        }
        if compressed {
            self.compressions += 1;
        }

        if let Some(previous) = self.entries.remove(&index) {
            self.order.remove(&previous.stamp);
            self.resident -= previous.data.len();
        }

        while self.resident + data.len() > self.capacity {
            if !self.evict_one() {
                break;
            }
        }

        let stamp = self.tick();
        self.order.insert(stamp, index);
        self.resident += data.len();
        self.entries.insert(
            index,
            Entry {
                data,
                compressed,
                stamp,
            },
        );
        true
    }

    /// Look up the value for a chunk index
    pub fn get(&mut self, index: usize) -> Option<V> {
        let Some(entry) = self.entries.get(&index) else {
            self.misses += 1;
            return None;
        };

        let value = match decode(&entry.data, entry.compressed) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding unreadable cache entry for chunk {}: {}", index, e);
                if let Some(entry) = self.entries.remove(&index) {
                    self.order.remove(&entry.stamp);
                    self.resident -= entry.data.len();
                }
                self.misses += 1;
                return None;
            }
        };
        self.hits += 1;

        if self.config.eviction_policy == EvictionPolicy::Lru {
            let stamp = self.tick();
            if let Some(entry) = self.entries.get_mut(&index) {
                self.order.remove(&entry.stamp);
                entry.stamp = stamp;
                self.order.insert(stamp, index);
            }
        }
        Some(value)
    }

    /// Whether an index is present, without touching statistics or recency
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    /// Stored indices in ascending order
    pub fn indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.entries.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            chunks: self.entries.len(),
            evictions: self.evictions,
            compressions: self.compressions,
            hit_rate: if lookups > 0 {
                self.hits as f64 / lookups as f64
            } else {
                0.0
            },
            resident_bytes: self.resident,
            capacity_bytes: self.capacity,
        }
    }

    /// Bytes currently held
    pub fn size(&self) -> usize {
        self.resident
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries and reset statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.resident = 0;
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
        self.compressions = 0;
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_one(&mut self) -> bool {
        let Some((_, index)) = self.order.pop_first() else {
            return false;
        };
        if let Some(entry) = self.entries.remove(&index) {
            self.resident -= entry.data.len();
            self.evictions += 1;
            debug!(
                "Evicted chunk {} from result cache ({} policy, freed {} bytes)",
                index,
                self.config.eviction_policy,
                entry.data.len()
            );
        }
        true
    }

    fn encode(&self, value: &V) -> Result<(Vec<u8>, bool), CacheError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        if !self.config.enable_compression {
            return Ok((bytes, false));
        }

        let mut encoder = ZlibEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());
        encoder
            .write_all(&bytes)
            .map_err(|e| CacheError::Compression(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| CacheError::Compression(e.to_string()))?;
        Ok((compressed, true))
    }
}

fn decode<V: DeserializeOwned>(data: &[u8], compressed: bool) -> Result<V, CacheError> {
    if !compressed {
        return serde_json::from_slice(data).map_err(|e| CacheError::Decompression(e.to_string()));
    }

    let mut bytes = Vec::with_capacity(data.len() * 2);
    ZlibDecoder::new(data)
        .read_to_end(&mut bytes)
        .map_err(|e| CacheError::Decompression(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| CacheError::Decompression(e.to_string()))
}
