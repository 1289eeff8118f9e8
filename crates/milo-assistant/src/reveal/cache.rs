use std::collections::{HashSet, VecDeque};

use milo_common::MessageId;
use parking_lot::Mutex;

/// Set of message ids that forgets its oldest entry past `capacity`.
#[derive(Debug, Clone)]
pub struct BoundedIdSet {
    capacity: usize,
    order: VecDeque<MessageId>,
    members: HashSet<MessageId>,
}

impl BoundedIdSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    /// Insert `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: MessageId) -> bool {
        if self.capacity == 0 || self.members.contains(&id) {
            return false;
        }
        self.order.push_back(id.clone());
        self.members.insert(id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
        true
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Process-wide memory of which replies were animated and spoken.
///
/// Shared behind an `Arc` by the reveal engine, its typewriters and the
/// voice trigger. The animated set grows for the life of the process; the
/// spoken set is bounded.
#[derive(Debug)]
pub struct RevealCache {
    animated: Mutex<HashSet<MessageId>>,
    spoken: Mutex<BoundedIdSet>,
}

impl RevealCache {
    pub fn new(spoken_capacity: usize) -> Self {
        Self {
            animated: Mutex::new(HashSet::new()),
            spoken: Mutex::new(BoundedIdSet::new(spoken_capacity)),
        }
    }

    pub fn is_animated(&self, id: &MessageId) -> bool {
        self.animated.lock().contains(id)
    }

    /// Returns `false` if the message was already marked.
    pub fn mark_animated(&self, id: &MessageId) -> bool {
        self.animated.lock().insert(id.clone())
    }

    pub fn animated_count(&self) -> usize {
        self.animated.lock().len()
    }

    pub fn is_spoken(&self, id: &MessageId) -> bool {
        self.spoken.lock().contains(id)
    }

    /// Returns `false` if the message is still remembered as spoken.
    pub fn mark_spoken(&self, id: &MessageId) -> bool {
        self.spoken.lock().insert(id.clone())
    }
}

impl Default for RevealCache {
    fn default() -> Self {
        Self::new(100)
    }
}
