use std::collections::{BTreeMap, HashMap};

use blockfield_common::VisualHandle;

/// Visual handles of every present block, in placement order.
///
/// Kept incrementally alongside the block map: pushes and removals are
/// logarithmic and a handle can appear at most once.
#[derive(Debug, Clone, Default)]
pub struct CollisionList {
    next_seq: u64,
    order: BTreeMap<u64, VisualHandle>,
    slots: HashMap<VisualHandle, u64>,
}

impl CollisionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handle. Returns false (and changes nothing) if it is already
    /// present.
    pub fn push(&mut self, handle: VisualHandle) -> bool {
        if self.slots.contains_key(&handle) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, handle);
        self.slots.insert(handle, seq);
        true
    }

    pub fn remove(&mut self, handle: VisualHandle) -> bool {
        let Some(seq) = self.slots.remove(&handle) else {
            return false;
        };
        self.order.remove(&seq);
        true
    }

    pub fn contains(&self, handle: VisualHandle) -> bool {
        self.slots.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = VisualHandle> + '_ {
        self.order.values().copied()
    }

    pub fn to_vec(&self) -> Vec<VisualHandle> {
        self.iter().collect()
    }

    /// Both internal maps describe the same set of handles.
    pub(crate) fn is_consistent(&self) -> bool {
        self.order.len() == self.slots.len()
            && self
                .order
                .iter()
                .all(|(seq, handle)| self.slots.get(handle) == Some(seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_across_removals() {
        let mut list = CollisionList::new();
        for i in 0..5 {
            assert!(list.push(VisualHandle(i)));
        }
        assert!(list.remove(VisualHandle(1)));
        assert!(list.remove(VisualHandle(3)));
        list.push(VisualHandle(9));

        assert_eq!(
            list.to_vec(),
            vec![VisualHandle(0), VisualHandle(2), VisualHandle(4), VisualHandle(9)]
        );
        assert!(list.is_consistent());
    }

    #[test]
    fn rejects_duplicates() {
        let mut list = CollisionList::new();
        assert!(list.push(VisualHandle(7)));
        assert!(!list.push(VisualHandle(7)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn removing_absent_handle_is_noop() {
        let mut list = CollisionList::new();
        assert!(!list.remove(VisualHandle(3)));
        assert!(list.is_empty());
    }

    #[test]
    fn handle_can_return_after_removal() {
        let mut list = CollisionList::new();
        list.push(VisualHandle(1));
        list.push(VisualHandle(2));
        list.remove(VisualHandle(1));
        list.push(VisualHandle(1));
        assert_eq!(list.to_vec(), vec![VisualHandle(2), VisualHandle(1)]);
        assert!(list.contains(VisualHandle(1)));
    }
}
