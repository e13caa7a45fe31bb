//! Bounded concurrent map with a first-writer-wins claim protocol.
//!
//! `ClaimMap` is an open-addressed table of fixed capacity supporting
//! concurrent linearizable insertion, removal, and point lookup, plus a
//! built-in race arbiter: among all calls that insert the same key, exactly
//! one is told it was first. That single bit is enough to let independent
//! parallel tasks discover a shared boundary without any broader lock:
//! whichever task loses the claim knows a partner already registered the key
//! and can go look its entry up.
//!
//! Unusual properties, all deliberate:
//!
//! - **Capacity is consumed per insertion call**, not per distinct key.
//!   Inserting the same key twice takes two slots. Callers size for call
//!   counts, and the table never rehashes; running out of slots is a hard
//!   error, not a slow path.
//! - **Removal tombstones.** A removed slot keeps its key, stops appearing in
//!   snapshots, and is never reused.
//! - **`snapshot_keys` does not linearize** with concurrent writers.
//!
//! # Example
//!
//! ```
//! use claim_map::ClaimMap;
//!
//! let map: ClaimMap<&str, u32> = ClaimMap::new(16);
//! assert!(map.insert_and_claim("ridge", 1).unwrap()); // first writer wins
//! assert!(!map.insert_and_claim("ridge", 2).unwrap()); // second observes the race
//! assert_eq!(map.get_other_value(&"ridge", &2), Some(1));
//! ```

use std::hash::{BuildHasher, Hash};
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

use rustc_hash::FxBuildHasher;
use thiserror::Error;

/// Slots allocated regardless of the capacity hint.
const BASE_SLOTS: usize = 100;

/// The probe wrapped around without finding a free slot.
///
/// Fatal for the insertion: the entry was not stored, and the table will
/// never regain space (tombstones are not reclaimed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("claim map is full ({slots} slots; one slot is consumed per insertion call)")]
pub struct MapFull {
    /// Total slot count of the table that overflowed.
    pub slots: usize,
}

/// One table slot.
///
/// A slot is *taken* once `entry` is non-null. The pointed-to pair is written
/// before the pointer is published and never mutated afterwards, so any
/// acquire load that sees a non-null pointer sees a fully-written entry.
/// `claimed` and `tombstoned` only ever transition false→true.
struct Slot<K, V> {
    entry: AtomicPtr<(K, V)>,
    claimed: AtomicBool,
    tombstoned: AtomicBool,
}

impl<K, V> Slot<K, V> {
    fn empty() -> Self {
        Self {
            entry: AtomicPtr::new(ptr::null_mut()),
            claimed: AtomicBool::new(false),
            tombstoned: AtomicBool::new(false),
        }
    }
}

/// Fixed-capacity concurrent claim map. See the crate docs for the protocol.
pub struct ClaimMap<K, V, S = FxBuildHasher> {
    slots: Box<[Slot<K, V>]>,
    hasher: S,
}

// Entries are owned through raw pointers, so the auto impls must be spelled
// out with the bounds a `Box<(K, V)>` would have imposed.
unsafe impl<K: Send, V: Send, S: Send> Send for ClaimMap<K, V, S> {}
unsafe impl<K: Send + Sync, V: Send + Sync, S: Sync> Sync for ClaimMap<K, V, S> {}

impl<K: Hash + Eq, V> ClaimMap<K, V> {
    /// Allocate a table of `100 + 1.5 * capacity_hint` slots.
    ///
    /// `capacity_hint` is a budget of *insertion calls*, not distinct keys.
    /// The table never grows; once the slots are used up, further insertions
    /// fail with [`MapFull`].
    pub fn new(capacity_hint: usize) -> Self {
        Self::with_hasher(capacity_hint, FxBuildHasher::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ClaimMap<K, V, S> {
    /// Like [`ClaimMap::new`], with an explicit hasher.
    pub fn with_hasher(capacity_hint: usize, hasher: S) -> Self {
        let m = BASE_SLOTS + capacity_hint.saturating_mul(3) / 2;
        let slots: Box<[Slot<K, V>]> = (0..m).map(|_| Slot::empty()).collect();
        Self { slots, hasher }
    }

    /// Total slot count. One slot is consumed per [`insert_and_claim`] call.
    ///
    /// [`insert_and_claim`]: ClaimMap::insert_and_claim
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn start_index(&self, key: &K) -> usize {
        (self.hasher.hash_one(key) % self.slots.len() as u64) as usize
    }

    fn next_index(&self, i: usize) -> usize {
        if i + 1 == self.slots.len() {
            0
        } else {
            i + 1
        }
    }

    /// Insert `(key, value)` into a fresh slot, then race for the key's claim.
    ///
    /// Returns `Ok(true)` iff this call is the unique first claimer of `key`
    /// among all insertions sharing its probe origin; exactly one call per
    /// key ever sees `true`, no matter how many race. Every call consumes one
    /// slot regardless of the outcome.
    pub fn insert_and_claim(&self, key: K, value: V) -> Result<bool, MapFull> {
        let start = self.start_index(&key);
        let entry = Box::into_raw(Box::new((key, value)));

        // Reserve a slot by installing the entry pointer. Reservation and
        // publication are the same release CAS, so a non-null pointer always
        // leads to a fully-written pair.
        let mut i = start;
        loop {
            let slot = &self.slots[i];
            if slot.entry.load(Ordering::Relaxed).is_null()
                && slot
                    .entry
                    .compare_exchange(ptr::null_mut(), entry, Ordering::AcqRel, Ordering::Relaxed)
                    .is_ok()
            {
                break;
            }
            i = self.next_index(i);
            if i == start {
                let slots = self.capacity();
                // Never published; still ours to free.
                drop(unsafe { Box::from_raw(entry) });
                return Err(MapFull { slots });
            }
        }

        // The slot owns the entry now, but it stays immutable, so the key can
        // still be read through the pointer.
        let key = unsafe { &(*entry).0 };

        // Re-scan the chain from its origin; the first slot holding this key
        // arbitrates the claim. Every racer reaches at least its own slot
        // (slots it probed past were already published), and racers agree on
        // the first match, so the CAS below has exactly one winner per key.
        let mut i = start;
        loop {
            let p = self.slots[i].entry.load(Ordering::Acquire);
            if p.is_null() {
                unreachable!("claim scan ran past the slot this call just published");
            }
            if unsafe { &(*p).0 } == key {
                return Ok(self.slots[i]
                    .claimed
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok());
            }
            i = self.next_index(i);
        }
    }

    /// Tombstone the first live slot holding `key`, in probe order.
    ///
    /// Returns `false` if the probe reaches an unreserved slot (or wraps all
    /// the way around) without a match. When several slots hold the same key,
    /// which one is tombstoned is probe order, not necessarily the slot that
    /// won the claim.
    pub fn remove(&self, key: &K) -> bool {
        let start = self.start_index(key);
        let mut i = start;
        loop {
            let slot = &self.slots[i];
            let p = slot.entry.load(Ordering::Acquire);
            if p.is_null() {
                return false;
            }
            if !slot.tombstoned.load(Ordering::Acquire) && unsafe { &(*p).0 } == key {
                slot.tombstoned.store(true, Ordering::Release);
                return true;
            }
            i = self.next_index(i);
            if i == start {
                return false;
            }
        }
    }

    /// Value of the first slot in probe order holding `key` with a value
    /// other than `value`.
    ///
    /// Tombstoned slots are still inspected; the scan stops at the first
    /// unreserved slot. This retrieves "the entry other than mine" for a key
    /// two parties both inserted.
    pub fn get_other_value(&self, key: &K, value: &V) -> Option<V>
    where
        V: PartialEq + Clone,
    {
        let start = self.start_index(key);
        let mut i = start;
        loop {
            let p = self.slots[i].entry.load(Ordering::Acquire);
            if p.is_null() {
                return None;
            }
            let (k, v) = unsafe { &*p };
            if k == key && v != value {
                return Some(v.clone());
            }
            i = self.next_index(i);
            if i == start {
                return None;
            }
        }
    }

    /// Keys of all taken, non-tombstoned slots, in table order.
    ///
    /// A point-in-time view only: concurrent insertions and removals may be
    /// missed or included inconsistently with any single moment. Keys
    /// inserted more than once appear once per live slot.
    pub fn snapshot_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.slots
            .iter()
            .filter_map(|slot| {
                let p = slot.entry.load(Ordering::Acquire);
                if p.is_null() || slot.tombstoned.load(Ordering::Acquire) {
                    None
                } else {
                    Some(unsafe { &(*p).0 }.clone())
                }
            })
            .collect()
    }
}

impl<K, V, S> Drop for ClaimMap<K, V, S> {
    fn drop(&mut self) {
        for slot in self.slots.iter_mut() {
            let p = *slot.entry.get_mut();
            if !p.is_null() {
                drop(unsafe { Box::from_raw(p) });
            }
        }
    }
}
