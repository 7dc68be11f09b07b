//! `ImageCache`: LRU map of fingerprints to packed frames.
//!
//! # Locking
//!
//! One `Mutex` guards the map, the recency queue and the in-flight table.
//! It is held only for bookkeeping; `compute` always runs unlocked. A caller
//! that finds its fingerprint in flight holds on to that flight's result
//! slot and waits on the `Condvar`. A successful compute fills the slot
//! before the flight is retired, so waiters are served even when nothing
//! is stored (capacity 0, or a `clear` while computing). A failed compute
//! leaves the slot empty and one waiter takes over.
//!
//! `clear` bumps a generation counter. A compute that started under an
//! older generation hands its frame to its callers but does not store it.
//!
//! # Recency
//!
//! Every access bumps a global tick, stores it on the entry and pushes
//! `(fingerprint, tick)` onto a queue. Eviction pops from the front and
//! skips pairs whose tick is stale. The queue is rebuilt when stale pairs
//! outnumber live entries, which keeps eviction O(1) amortized.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};

use eink_specs::PackedBuffer;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::fingerprint::Fingerprint;
use crate::persist::{self, PersistedEntry};

/// Stale queue pairs tolerated before a rebuild, beyond the live count.
const COMPACT_SLACK: usize = 32;

/// One cached frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Key.
    pub fingerprint: Fingerprint,
    /// Finished frame.
    pub packed: PackedBuffer,
    /// Frame length in bytes.
    pub size_bytes: usize,
    /// Recency tick of the last access; larger is more recent.
    pub last_used: u64,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Live entries.
    pub entries: usize,
    /// Configured capacity.
    pub capacity: usize,
    /// Sum of frame sizes.
    pub total_bytes: usize,
    /// Whether a persistence path is configured.
    pub persistence_enabled: bool,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
    /// Entries dropped for capacity.
    pub evictions: u64,
}

/// Result slot shared by the computing caller and its waiters.
type Flight = Arc<OnceLock<PackedBuffer>>;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Fingerprint, CacheEntry>,
    recency: VecDeque<(Fingerprint, u64)>,
    tick: u64,
    in_flight: HashMap<Fingerprint, Flight>,
    generation: u64,
    /// Bumped by every change to contents or recency order.
    revision: u64,
    /// `revision` as of the last successful write, load or truncate.
    saved_revision: u64,
    total_bytes: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Inner {
    fn changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn next_tick(&mut self) -> u64 {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }

    /// Look up and mark as most recently used.
    fn touch(&mut self, fp: &Fingerprint) -> Option<PackedBuffer> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(fp)?;
        entry.last_used = tick;
        let packed = entry.packed.clone();
        self.changed();
        self.recency.push_back((*fp, tick));
        self.compact_if_needed();
        Some(packed)
    }

    fn insert(&mut self, fp: Fingerprint, packed: PackedBuffer, capacity: usize) {
        if capacity == 0 {
            return;
        }
        let tick = self.next_tick();
        let size_bytes = packed.len();
        let entry = CacheEntry {
            fingerprint: fp,
            packed,
            size_bytes,
            last_used: tick,
        };
        if let Some(old) = self.entries.insert(fp, entry) {
            self.total_bytes = self.total_bytes.saturating_sub(old.size_bytes);
        }
        self.total_bytes = self.total_bytes.saturating_add(size_bytes);
        self.recency.push_back((fp, tick));
        self.changed();

        while self.entries.len() > capacity {
            if !self.evict_one() {
                break;
            }
        }
        self.compact_if_needed();
    }

    /// Drop the least recently used entry.
    fn evict_one(&mut self) -> bool {
        while let Some((fp, tick)) = self.recency.pop_front() {
            let live = self.entries.get(&fp).is_some_and(|e| e.last_used == tick);
            if live {
                self.remove(&fp);
                self.evictions = self.evictions.saturating_add(1);
                debug!(content_crc32 = fp.content_crc32, "evicted");
                return true;
            }
        }
        false
    }

    fn remove(&mut self, fp: &Fingerprint) -> Option<CacheEntry> {
        let old = self.entries.remove(fp)?;
        self.changed();
        self.total_bytes = self.total_bytes.saturating_sub(old.size_bytes);
        Some(old)
    }

    fn compact_if_needed(&mut self) {
        let limit = self
            .entries
            .len()
            .saturating_mul(2)
            .saturating_add(COMPACT_SLACK);
        if self.recency.len() <= limit {
            return;
        }
        let mut live: Vec<(Fingerprint, u64)> = self
            .entries
            .values()
            .map(|e| (e.fingerprint, e.last_used))
            .collect();
        live.sort_unstable_by_key(|&(_, tick)| tick);
        self.recency = live.into();
    }

    /// Entries, least recently used first.
    fn ordered(&self) -> Vec<&CacheEntry> {
        let mut all: Vec<&CacheEntry> = self.entries.values().collect();
        all.sort_unstable_by_key(|e| e.last_used);
        all
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.total_bytes = 0;
        self.generation = self.generation.wrapping_add(1);
        self.changed();
    }

    fn is_current(&self, fp: &Fingerprint, flight: &Flight) -> bool {
        self.in_flight
            .get(fp)
            .is_some_and(|current| Arc::ptr_eq(current, flight))
    }
}

/// Thread-safe LRU cache of packed frames.
#[derive(Debug)]
pub struct ImageCache {
    capacity: usize,
    persist_path: Option<PathBuf>,
    inner: Mutex<Inner>,
    ready: Condvar,
}

impl ImageCache {
    /// Create a cache, loading the persistence file if one is configured.
    ///
    /// A missing or unreadable file yields an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        let cache = Self {
            capacity: config.capacity,
            persist_path: config.persist_path,
            inner: Mutex::new(Inner::default()),
            ready: Condvar::new(),
        };
        if cache.persist_path.is_some() {
            cache.load();
        }
        cache
    }

    /// In-memory cache with the default capacity.
    pub fn in_memory() -> Self {
        Self::new(CacheConfig::default())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner is consistent between statements, so a poisoned lock is usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the cached frame for `fp`, or run `compute` and cache its result.
    ///
    /// Concurrent callers with the same fingerprint run `compute` at most
    /// once between them: the others block until it finishes and receive
    /// its frame, whether or not it was stored. If it fails, the error goes
    /// to the caller that ran it and a waiter takes over.
    pub fn get_or_compute<E, F>(&self, fp: Fingerprint, compute: F) -> Result<PackedBuffer, E>
    where
        F: FnOnce() -> Result<PackedBuffer, E>,
    {
        let mut inner = self.lock();
        loop {
            if let Some(packed) = inner.touch(&fp) {
                inner.hits = inner.hits.saturating_add(1);
                return Ok(packed);
            }
            let Some(flight) = inner.in_flight.get(&fp).cloned() else {
                break;
            };
            while inner.is_current(&fp, &flight) {
                inner = self.ready.wait(inner).unwrap_or_else(PoisonError::into_inner);
            }
            if let Some(packed) = flight.get() {
                inner.hits = inner.hits.saturating_add(1);
                return Ok(packed.clone());
            }
        }
        inner.misses = inner.misses.saturating_add(1);
        let generation = inner.generation;
        let flight = Flight::default();
        inner.in_flight.insert(fp, Arc::clone(&flight));
        drop(inner);

        let marker = InFlight {
            cache: self,
            fp,
            flight,
        };
        let packed = compute()?;

        let mut inner = self.lock();
        if inner.generation == generation {
            inner.insert(fp, packed.clone(), self.capacity);
        } else {
            debug!(content_crc32 = fp.content_crc32, "cleared while computing, not stored");
        }
        // Filled under the lock so no waiter can observe a retired, empty slot.
        let _ = marker.flight.set(packed.clone());
        drop(inner);
        Ok(packed)
    }

    /// Cached frame, marking it most recently used.
    pub fn get(&self, fp: &Fingerprint) -> Option<PackedBuffer> {
        let mut inner = self.lock();
        let found = inner.touch(fp);
        if found.is_some() {
            inner.hits = inner.hits.saturating_add(1);
        } else {
            inner.misses = inner.misses.saturating_add(1);
        }
        found
    }

    /// Whether `fp` is cached, without touching recency.
    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.lock().entries.contains_key(fp)
    }

    /// Store a frame, evicting the least recently used entry when full.
    pub fn insert(&self, fp: Fingerprint, packed: PackedBuffer) {
        self.lock().insert(fp, packed, self.capacity);
    }

    /// Remove one entry.
    pub fn remove(&self, fp: &Fingerprint) -> Option<CacheEntry> {
        self.lock().remove(fp)
    }

    /// Drop every entry and truncate the persistence file.
    ///
    /// A compute already running when this is called still returns its
    /// frame to its callers, but the frame is not stored.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.clear();
        if let Some(path) = &self.persist_path {
            match fs::File::create(path) {
                Ok(_) => {
                    inner.saved_revision = inner.revision;
                    debug!(path = %path.display(), "cache file truncated");
                }
                Err(e) => warn!(path = %path.display(), error = %e, "cache file truncate failed"),
            }
        }
    }

    /// Whether the contents changed since the last write or load.
    pub fn is_dirty(&self) -> bool {
        let inner = self.lock();
        inner.saved_revision != inner.revision
    }

    /// Entries, least recently used first.
    pub fn entries(&self) -> Vec<CacheEntry> {
        self.lock().ordered().into_iter().cloned().collect()
    }

    /// Live entry count.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters snapshot.
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            entries: inner.entries.len(),
            capacity: self.capacity,
            total_bytes: inner.total_bytes,
            persistence_enabled: self.persist_path.is_some(),
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
        }
    }

    /// Write every entry to the persistence file. No-op without a path.
    ///
    /// # Errors
    ///
    /// [`CacheError::Encode`] if serialisation fails, [`CacheError::Io`] if
    /// the file cannot be written.
    pub fn persist(&self) -> Result<(), CacheError> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        let (records, revision) = {
            let inner = self.lock();
            let records: Vec<PersistedEntry> = inner
                .ordered()
                .into_iter()
                .map(|e| PersistedEntry::new(&e.fingerprint, &e.packed))
                .collect();
            (records, inner.revision)
        };
        let bytes = persist::encode(&records)?;
        persist::write_atomic(path, &bytes)?;
        self.lock().saved_revision = revision;
        info!(path = %path.display(), entries = records.len(), "cache persisted");
        Ok(())
    }

    /// [`persist`](Self::persist) only when something changed since the
    /// last write or load. Returns whether the file was written.
    ///
    /// # Errors
    ///
    /// As [`persist`](Self::persist).
    pub fn persist_if_dirty(&self) -> Result<bool, CacheError> {
        if self.persist_path.is_none() || !self.is_dirty() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Merge the persistence file into the cache and return how many entries
    /// were taken from it.
    ///
    /// Never fails: problems are logged and the file is ignored. Entries for
    /// unknown firmware or with a wrong frame length are dropped.
    pub fn load(&self) -> usize {
        let Some(path) = &self.persist_path else {
            return 0;
        };
        let file = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file");
                return 0;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache file unreadable, starting empty");
                return 0;
            }
        };
        if file.is_empty() {
            return 0;
        }
        let records = match persist::decode(&file) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache file rejected, starting empty");
                return 0;
            }
        };

        let stored = records.len();
        let mut inner = self.lock();
        let mut loaded = 0usize;
        for (fp, packed) in records.into_iter().filter_map(PersistedEntry::resolve) {
            inner.insert(fp, packed, self.capacity);
            loaded = loaded.saturating_add(1);
        }
        inner.saved_revision = inner.revision;
        info!(
            path = %path.display(),
            loaded,
            dropped = stored.saturating_sub(loaded),
            "cache loaded"
        );
        loaded
    }
}

/// Retires the flight and wakes waiters, also on error and unwind.
struct InFlight<'a> {
    cache: &'a ImageCache,
    fp: Fingerprint,
    flight: Flight,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut inner = self.cache.lock();
        if inner.is_current(&self.fp, &self.flight) {
            inner.in_flight.remove(&self.fp);
        }
        drop(inner);
        self.cache.ready.notify_all();
    }
}
