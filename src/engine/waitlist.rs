use std::collections::VecDeque;

use crate::model::WaitlistEntry;

/// Parking requests waiting for a slot, strictly first-in first-out.
#[derive(Debug, Default)]
pub struct Waitlist {
    queue: VecDeque<WaitlistEntry>,
}

impl Waitlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the back; returns the 1-based position.
    pub fn push(&mut self, entry: WaitlistEntry) -> usize {
        self.queue.push_back(entry);
        self.queue.len()
    }

    pub fn pop(&mut self) -> Option<WaitlistEntry> {
        self.queue.pop_front()
    }

    pub fn peek(&self) -> Option<&WaitlistEntry> {
        self.queue.front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// 1-based position of a guest's request.
    pub fn position(&self, guest_id: &str) -> Option<usize> {
        self.queue.iter().position(|e| e.guest_id == guest_id).map(|i| i + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaitlistEntry> {
        self.queue.iter()
    }
}
