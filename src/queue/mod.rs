use std::collections::{BTreeMap, VecDeque};

pub mod hot;
pub use hot::HotPriorityQueue;


// ----------------------------------------------
// PriorityQueue
// ----------------------------------------------

// Minimum-first queue of (key, value) entries, ordered solely by key.
// Dequeue and peek on an empty queue return None rather than panic.
pub trait PriorityQueue<K: Ord, V> {
    fn enqueue(&mut self, key: K, value: V);
    fn try_dequeue(&mut self) -> Option<(K, V)>;
    fn try_peek(&self) -> Option<(&K, &V)>;
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ----------------------------------------------
// DictionaryPriorityQueue
// ----------------------------------------------

// Ordered map from key to a FIFO bucket of same-key values. Equal-key
// entries dequeue in insertion order, which keeps search tie-breaking
// deterministic and path choices reproducible.
pub struct DictionaryPriorityQueue<K: Ord + Copy, V> {
    buckets: BTreeMap<K, VecDeque<V>>,
    count: usize,
}

impl<K: Ord + Copy, V> DictionaryPriorityQueue<K, V> {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            count: 0,
        }
    }
}

impl<K: Ord + Copy, V> Default for DictionaryPriorityQueue<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy, V> PriorityQueue<K, V> for DictionaryPriorityQueue<K, V> {
    fn enqueue(&mut self, key: K, value: V) {
        self.buckets.entry(key).or_default().push_back(value);
        self.count += 1;
    }

    fn try_dequeue(&mut self) -> Option<(K, V)> {
        let mut bucket = self.buckets.first_entry()?;
        let key = *bucket.key();

        debug_assert!(!bucket.get().is_empty(), "Queue buckets are never left empty!");
        let value = bucket.get_mut().pop_front()?;

        if bucket.get().is_empty() {
            bucket.remove();
        }

        self.count -= 1;
        Some((key, value))
    }

    fn try_peek(&self) -> Option<(&K, &V)> {
        let (key, bucket) = self.buckets.first_key_value()?;
        bucket.front().map(|value| (key, value))
    }

    #[inline]
    fn len(&self) -> usize {
        self.count
    }
}
