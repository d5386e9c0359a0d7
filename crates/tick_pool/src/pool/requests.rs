//! Release requests raised by entities
//!
//! Entities cannot reach the pool that owns them, so they file a request here
//! and the host drains the queue into [`EntityPoolManager::release`](super::EntityPoolManager::release).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::EntityId;

// `order` may hold withdrawn entries; only those whose ticket still matches
// `filed` are live
#[derive(Debug, Default)]
struct Queue {
    order: Vec<(EntityId, u64)>,
    filed: HashMap<EntityId, u64>,
    next_ticket: u64,
}

/// Shared queue of entities asking to go back to their pool
///
/// Cloning yields another handle to the same queue. Not thread-safe.
#[derive(Debug, Clone, Default)]
pub struct ReleaseRequests {
    queue: Rc<RefCell<Queue>>,
}

impl ReleaseRequests {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `id` to be released; repeated requests collapse into one
    pub fn request(&self, id: EntityId) -> bool {
        let mut queue = self.queue.borrow_mut();
        if queue.filed.contains_key(&id) {
            log::debug!("Release of {id:?} already requested");
            return false;
        }
        let ticket = queue.next_ticket;
        queue.next_ticket += 1;
        queue.filed.insert(id, ticket);
        queue.order.push((id, ticket));
        true
    }

    /// Withdraw a pending request for `id`
    ///
    /// Used when the entity was released through another route, so the request
    /// cannot reach a later life of the same instance.
    pub fn cancel(&self, id: EntityId) -> bool {
        let mut queue = self.queue.borrow_mut();
        let withdrawn = queue.filed.remove(&id).is_some();
        if withdrawn {
            log::trace!("Withdrew release request for {id:?}");
        }
        withdrawn
    }

    /// Whether a request for `id` is pending
    pub fn is_requested(&self, id: EntityId) -> bool {
        self.queue.borrow().filed.contains_key(&id)
    }

    /// Take every pending request in the order it was filed
    pub fn drain(&self) -> Vec<EntityId> {
        let mut queue = self.queue.borrow_mut();
        let order = std::mem::take(&mut queue.order);
        let filed = std::mem::take(&mut queue.filed);
        order
            .into_iter()
            .filter(|(id, ticket)| filed.get(id) == Some(ticket))
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of pending requests
    pub fn len(&self) -> usize {
        self.queue.borrow().filed.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().filed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_requests_are_shared_and_deduplicated() {
        let mut keys: SlotMap<EntityId, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());

        let requests = ReleaseRequests::new();
        let handle = requests.clone();
        assert!(handle.request(a));
        assert!(!handle.request(a));
        assert!(requests.request(b));

        assert_eq!(requests.len(), 2);
        assert_eq!(requests.drain(), vec![a, b]);
        assert!(handle.is_empty());
    }

    #[test]
    fn test_cancel_withdraws_request() {
        let mut keys: SlotMap<EntityId, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());

        let requests = ReleaseRequests::new();
        requests.request(a);
        requests.request(b);
        assert!(requests.cancel(a));
        assert!(!requests.cancel(a));
        assert!(!requests.is_requested(a));

        assert_eq!(requests.len(), 1);
        // Filing again after a withdrawal yields a single entry
        assert!(requests.request(a));
        assert_eq!(requests.drain(), vec![b, a]);
        assert!(requests.request(b));
    }
}
