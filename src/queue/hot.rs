use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use super::PriorityQueue;
use crate::config::HotQueueConfig;

// ----------------------------------------------
// HotEntry
// ----------------------------------------------

struct HotEntry<V> {
    key: i32,
    value: V,
}

// Ordering is by key alone; values never take part in comparisons.
impl<V> PartialEq for HotEntry<V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<V> Eq for HotEntry<V> {}

impl<V> PartialOrd for HotEntry<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V> Ord for HotEntry<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

// ----------------------------------------------
// HotPriorityQueue
// ----------------------------------------------

// "Heap-on-top" queue for very large open sets. A* frontiers produce
// keys spanning a huge range but clustered near the current frontier,
// so only the lowest key band lives in a binary heap; once the heap
// grows past the pool size, higher bands spill into coarse sorted
// overflow lists and only get heap treatment when the search reaches
// them. A band is the key right-shifted by `preference_width`.
//
// Invariant: whenever the overflow map is non-empty, every heap entry
// has band <= base_index < every overflow band, so the heap minimum is
// the queue minimum. Equal-key dequeue order is unspecified.
pub struct HotPriorityQueue<V> {
    preference_width: u32,
    pool_size: usize,
    spill_threshold: usize,
    base_index: i32,
    heap: BinaryHeap<Reverse<HotEntry<V>>>,
    overflow: BTreeMap<i32, Vec<HotEntry<V>>>,
    count: usize,
}

impl<V> HotPriorityQueue<V> {
    pub fn new(config: HotQueueConfig) -> Self {
        let pool_size = config.pool_size();
        Self {
            preference_width: config.preference_width,
            pool_size,
            spill_threshold: pool_size,
            base_index: i32::MIN,
            heap: BinaryHeap::with_capacity(config.initial_capacity),
            overflow: BTreeMap::new(),
            count: 0,
        }
    }

    #[inline]
    fn band(&self, key: i32) -> i32 {
        key >> self.preference_width
    }

    // Moves every heap entry above the lowest resident band into the
    // overflow lists. If a single band exceeds the pool the heap must
    // keep it whole; back off the threshold so we do not rescan on
    // every enqueue.
    fn spill(&mut self) {
        let Some(Reverse(minimum)) = self.heap.peek() else { return };
        let new_base = self.band(minimum.key);

        let entries = std::mem::take(&mut self.heap).into_vec();
        let mut kept = Vec::with_capacity(self.pool_size);
        let mut moved = 0usize;

        for Reverse(entry) in entries {
            if self.band(entry.key) > new_base {
                self.overflow.entry(self.band(entry.key)).or_default().push(entry);
                moved += 1;
            } else {
                kept.push(Reverse(entry));
            }
        }

        self.base_index = new_base;
        self.heap = BinaryHeap::from(kept);
        self.spill_threshold = if moved == 0 {
            self.heap.len() * 2
        } else {
            self.pool_size
        };
    }

    // Reloads the lowest surviving overflow band once the heap runs dry.
    fn reload(&mut self) {
        if !self.heap.is_empty() {
            return;
        }
        if let Some((band, entries)) = self.overflow.pop_first() {
            self.base_index = band;
            self.heap.extend(entries.into_iter().map(Reverse));
            self.spill_threshold = self.spill_threshold.max(self.heap.len());
        }
    }

    #[cfg(test)]
    pub(crate) fn heap_len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub(crate) fn overflow_band_count(&self) -> usize {
        self.overflow.len()
    }
}

impl<V> PriorityQueue<i32, V> for HotPriorityQueue<V> {
    fn enqueue(&mut self, key: i32, value: V) {
        let band = self.band(key);
        let entry = HotEntry { key, value };

        if !self.overflow.is_empty() && band > self.base_index {
            self.overflow.entry(band).or_default().push(entry);
        } else {
            self.heap.push(Reverse(entry));
            if self.heap.len() > self.spill_threshold {
                self.spill();
            }
        }

        self.count += 1;
    }

    fn try_dequeue(&mut self) -> Option<(i32, V)> {
        let Reverse(entry) = self.heap.pop()?;
        self.count -= 1;
        self.reload();
        Some((entry.key, entry.value))
    }

    fn try_peek(&self) -> Option<(&i32, &V)> {
        // reload() keeps the heap non-empty whenever any entry exists,
        // so peeking never has to touch the overflow lists.
        self.heap.peek().map(|Reverse(entry)| (&entry.key, &entry.value))
    }

    #[inline]
    fn len(&self) -> usize {
        self.count
    }
}
