use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use rand_core::RngCore;

use crate::error::{Error, Result};

/// A heap entry. Ordering compares `(priority, tiebreak, stamp)` only; the
/// stamp is unique per insertion, so the order is total and entries for
/// superseded insertions of the same element can be told apart.
#[derive(Debug, Clone)]
struct Entry<E> {
    priority: i64,
    tiebreak: u64,
    stamp: u64,
    element: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.stamp == other.stamp
    }
}

impl<E> Eq for Entry<E> {}

impl<E> Ord for Entry<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.priority, self.tiebreak, self.stamp).cmp(&(
            other.priority,
            other.tiebreak,
            other.stamp,
        ))
    }
}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
struct LiveEntry {
    priority: i64,
    stamp: u64,
}

/// A min-priority queue with lazy deletion and batch priority updates.
///
/// Priorities are non-positive: the SLS engine stores negated conflict
/// counts, so the minimum entry is the most conflicted element. Removal only
/// marks an element dead; stale heap entries are purged when they surface at
/// the top. Ties between equal priorities are broken by a random key drawn at
/// insertion time, so pop order is not an artifact of element identity or
/// insertion order.
#[derive(Debug, Default)]
pub struct UpdatableQueue<E> {
    heap: BinaryHeap<Reverse<Entry<E>>>,
    live: HashMap<E, LiveEntry>,
    next_stamp: u64,
}

impl<E: Eq + Hash + Clone + Debug> UpdatableQueue<E> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            next_stamp: 0,
        }
    }

    /// The number of live (non-removed) elements.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, element: &E) -> bool {
        self.live.contains_key(element)
    }

    /// The current priority of a live element.
    pub fn priority(&self, element: &E) -> Option<i64> {
        self.live.get(element).map(|entry| entry.priority)
    }

    /// Inserts an element.
    ///
    /// # Panics
    ///
    /// Panics if `priority` is positive or if the element is already queued;
    /// both indicate a bookkeeping bug in the caller.
    pub fn add(&mut self, element: E, priority: i64, rng: &mut dyn RngCore) {
        assert!(
            priority <= 0,
            "queue priorities must be non-positive, got {priority}"
        );
        assert!(
            !self.live.contains_key(&element),
            "element {element:?} is already queued"
        );
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        let _ = self.live.insert(element.clone(), LiveEntry { priority, stamp });
        self.heap.push(Reverse(Entry {
            priority,
            tiebreak: rng.next_u64(),
            stamp,
            element,
        }));
    }

    /// Removes an element lazily. Returns whether it was present.
    pub fn remove(&mut self, element: &E) -> bool {
        self.live.remove(element).is_some()
    }

    /// Applies a batch of priority deltas: for each element with a nonzero
    /// delta, the new priority is `old - delta` (with `old = 0` for elements
    /// not currently queued); the element is removed and, if the new priority
    /// is nonzero, re-added.
    ///
    /// # Panics
    ///
    /// Panics if an update would make a priority positive, which would mean
    /// the caller recorded more "resolved conflicts" than it ever recorded
    /// conflicts.
    pub fn update_each_priority(&mut self, deltas: &BTreeMap<E, i64>, rng: &mut dyn RngCore)
    where
        E: Ord,
    {
        for (element, &delta) in deltas {
            if delta == 0 {
                continue;
            }
            let old = self.priority(element).unwrap_or(0);
            let new = old - delta;
            assert!(
                new <= 0,
                "priority of {element:?} would become positive ({old} - {delta})"
            );
            let _ = self.remove(element);
            if new != 0 {
                self.add(element.clone(), new, rng);
            }
        }
    }

    /// Removes and returns the live element with the smallest priority.
    pub fn pop(&mut self) -> Result<E> {
        loop {
            let Reverse(entry) = self.heap.pop().ok_or(Error::QueueUnderflow)?;
            if let Some(live) = self.live.get(&entry.element) {
                if live.stamp == entry.stamp {
                    let _ = self.live.remove(&entry.element);
                    return Ok(entry.element);
                }
            }
            // Stale entry from a removal or priority update; keep purging.
        }
    }

    /// Returns the live element with the smallest priority without removing
    /// it. Stale entries encountered on the way are purged.
    pub fn top(&mut self) -> Result<&E> {
        loop {
            let stale = match self.heap.peek() {
                None => return Err(Error::QueueUnderflow),
                Some(Reverse(entry)) => self
                    .live
                    .get(&entry.element)
                    .map_or(true, |live| live.stamp != entry.stamp),
            };
            if !stale {
                break;
            }
            let _ = self.heap.pop();
        }
        Ok(&self.heap.peek().expect("peeked above").0.element)
    }
}
