use std::collections::VecDeque;

/// Number of records a dashboard charts by default.
pub const DEFAULT_CAPACITY: usize = 20;

/// Fixed-capacity FIFO of the most recent items, oldest first.
///
/// Appending past capacity evicts the oldest item. There is no other eviction
/// policy.
#[derive(Debug, Clone)]
pub struct HistoryWindow<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> HistoryWindow<T> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Append `item`, returning the evicted oldest item if the window was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> HistoryWindow<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T> Default for HistoryWindow<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
