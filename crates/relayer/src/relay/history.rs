//! Bounded, oldest-evicting store of published values.

use std::collections::VecDeque;

use serde_json::Value;

pub const DEFAULT_HISTORY_SIZE: usize = 2000;

/// Most recent published values, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<Value>,
    capacity: usize,
}

impl HistoryBuffer {
    /// A zero capacity is clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_SIZE)),
            capacity,
        }
    }

    pub fn append(&mut self, value: Value) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(value);
    }

    /// Owned copy of the contents; later appends do not affect it.
    pub fn snapshot(&self) -> Vec<Value> {
        self.entries.iter().cloned().collect()
    }

    /// Contents as one ordered slice, rearranging storage if needed.
    pub fn as_contiguous(&mut self) -> &[Value] {
        self.entries.make_contiguous()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_insertion_order() {
        let mut h = HistoryBuffer::new(10);
        for v in ["A", "B", "C"] {
            h.append(json!(v));
        }
        assert_eq!(h.snapshot(), vec![json!("A"), json!("B"), json!("C")]);
    }

    #[test]
    fn overflow_keeps_newest_entries() {
        let mut h = HistoryBuffer::new(5);
        for i in 0..12 {
            h.append(json!(i));
        }
        assert_eq!(h.len(), 5);
        let expected: Vec<Value> = (7..12).map(|i| json!(i)).collect();
        assert_eq!(h.snapshot(), expected);
    }

    #[test]
    fn exactly_full_then_one_more() {
        let mut h = HistoryBuffer::new(4);
        for i in 0..4 {
            h.append(json!(i));
        }
        assert_eq!(h.len(), 4);
        assert_eq!(h.snapshot(), vec![json!(0), json!(1), json!(2), json!(3)]);

        h.append(json!(4));
        assert_eq!(h.len(), 4);
        assert_eq!(h.snapshot(), vec![json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn default_capacity_over_many_publishes() {
        let mut h = HistoryBuffer::new(DEFAULT_HISTORY_SIZE);
        let n = DEFAULT_HISTORY_SIZE + 345;
        for i in 0..n {
            h.append(json!(i));
        }
        let snap = h.snapshot();
        assert_eq!(snap.len(), DEFAULT_HISTORY_SIZE);
        assert_eq!(snap.first(), Some(&json!(345)));
        assert_eq!(snap.last(), Some(&json!(n - 1)));
    }

    #[test]
    fn snapshot_is_detached_from_later_appends() {
        let mut h = HistoryBuffer::new(2);
        h.append(json!(1));
        let snap = h.snapshot();
        h.append(json!(2));
        h.append(json!(3));
        assert_eq!(snap, vec![json!(1)]);
    }

    #[test]
    fn contiguous_view_after_wraparound() {
        let mut h = HistoryBuffer::new(3);
        for i in 0..7 {
            h.append(json!(i));
        }
        assert_eq!(h.as_contiguous(), &[json!(4), json!(5), json!(6)][..]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut h = HistoryBuffer::new(0);
        assert_eq!(h.capacity(), 1);
        h.append(json!("a"));
        h.append(json!("b"));
        assert_eq!(h.snapshot(), vec![json!("b")]);
    }
}
