use std::collections::HashSet;
use std::fmt;

use parking_lot::Mutex;

pub const DEDUP_KEY_SIZE: usize = 16;

/// Fixed-size hash identity of an item's tokenized title. A value type so it
/// lives inline in set storage without a separate allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DedupKey([u8; DEDUP_KEY_SIZE]);

// FNV-1 128-bit parameters.
const FNV128_OFFSET: u128 = 0x6c62272e07bb014262b821756295c58d;
const FNV128_PRIME: u128 = 0x0000000001000000000000000000013b;

impl DedupKey {
    /// Hashes an ordered word sequence. Words are separated by a zero byte,
    /// so the key is sensitive to split points, not just to content.
    pub fn of_words<S: AsRef<str>>(words: &[S]) -> Self {
        if words.is_empty() {
            return Self::default();
        }
        let mut hash = FNV128_OFFSET;
        let mut first = true;
        for word in words {
            if !first {
                hash = fnv1_byte(hash, 0);
            }
            first = false;
            for &b in word.as_ref().as_bytes() {
                hash = fnv1_byte(hash, b);
            }
        }
        Self(hash.to_be_bytes())
    }
}

fn fnv1_byte(hash: u128, byte: u8) -> u128 {
    hash.wrapping_mul(FNV128_PRIME) ^ u128::from(byte)
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Bounded recency cache over dedup keys: a hash set for membership plus a
/// ring buffer recording insertion order for oldest-first eviction.
#[derive(Debug)]
pub struct Deduplicator {
    set: HashSet<DedupKey>,
    ring: Vec<DedupKey>,
    read: usize,
    write: usize,
}

impl Deduplicator {
    /// Panics when `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "deduplicator capacity must be positive");
        Self {
            set: HashSet::with_capacity(capacity),
            ring: vec![DedupKey::default(); capacity],
            read: 0,
            write: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Returns true and records the key if it is new; returns false when the
    /// key is already cached. At capacity the oldest key is evicted first.
    pub fn keep(&mut self, key: DedupKey) -> bool {
        if self.set.contains(&key) {
            return false;
        }
        let capacity = self.ring.len();
        if self.set.len() == capacity {
            let oldest = self.ring[self.read];
            self.set.remove(&oldest);
            self.read = (self.read + 1) % capacity;
        }
        self.set.insert(key);
        self.ring[self.write] = key;
        self.write = (self.write + 1) % capacity;
        true
    }
}

/// Deduplicator that serializes all calls through a mutex, so it can be
/// shared between tasks.
#[derive(Debug)]
pub struct SyncDeduplicator(Mutex<Deduplicator>);

impl SyncDeduplicator {
    pub fn new(inner: Deduplicator) -> Self {
        Self(Mutex::new(inner))
    }

    pub fn keep(&self, key: DedupKey) -> bool {
        self.0.lock().keep(key)
    }
}

impl From<Deduplicator> for SyncDeduplicator {
    fn from(inner: Deduplicator) -> Self {
        Self::new(inner)
    }
}
