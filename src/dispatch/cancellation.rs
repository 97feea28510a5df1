//! Cancellation of in-flight requests.
//!
//! Every dispatch registers a handle keyed by its request id. Cancelling
//! through the tracker flips the handle's flag and wakes the dispatch
//! task, which abandons whatever it was doing: the network call, a retry
//! delay, or the wait for a response body.

use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

/// A handle to a running request that can be cancelled.
///
/// Clones share the same cancellation state: one clone lives in the
/// tracker, another travels with the dispatch task.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    /// Id of the request this handle controls.
    pub request_id: String,

    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl RequestHandle {
    /// Creates a handle with a generated id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Creates a handle for a specific request id.
    pub fn with_id(request_id: String) -> Self {
        Self {
            request_id,
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Checks whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Requests cancellation and wakes any task waiting on it.
    pub fn mark_cancelled(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Resolves once cancellation is requested.
    ///
    /// Safe to race against other futures in `tokio::select!`; a request
    /// that is already cancelled resolves immediately.
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for RequestHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from cancellation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelError {
    /// No active request matched the given id.
    NotFound(String),
}

impl fmt::Display for CancelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelError::NotFound(id) => write!(f, "Request not found: {}", id),
        }
    }
}

impl std::error::Error for CancelError {}

/// Registry of in-flight requests.
///
/// Thread-safe through interior mutability, so it can sit behind an
/// `Arc` and be shared between the dispatcher and whoever drives
/// cancellation.
#[derive(Debug, Default)]
pub struct RequestTracker {
    active: DashMap<String, RequestHandle>,
    order: Mutex<Vec<String>>,
}

impl RequestTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            active: DashMap::new(),
            order: Mutex::new(Vec::new()),
        }
    }

    /// Registers a request for tracking.
    ///
    /// # Arguments
    ///
    /// * `handle` - The handle to track; its id becomes the lookup key
    ///
    /// # Returns
    ///
    /// The id of the registered request.
    pub fn register(&self, handle: RequestHandle) -> String {
        let request_id = handle.request_id.clone();
        self.order_guard().push(request_id.clone());
        self.active.insert(request_id.clone(), handle);
        request_id
    }

    /// Removes a request from tracking.
    ///
    /// Called when a request completes, fails, or is cancelled.
    ///
    /// # Returns
    ///
    /// `true` if the request was still tracked.
    pub fn unregister(&self, request_id: &str) -> bool {
        let mut order = self.order_guard();
        if let Some(position) = order.iter().position(|id| id == request_id) {
            order.remove(position);
        }
        drop(order);

        self.active.remove(request_id).is_some()
    }

    /// Cancels a request by id.
    ///
    /// The request is woken, marked cancelled, and removed from
    /// tracking.
    ///
    /// # Returns
    ///
    /// `Ok(())` on success, or `CancelError::NotFound` if no such
    /// request is active.
    pub fn cancel(&self, request_id: &str) -> Result<(), CancelError> {
        {
            let handle = self
                .active
                .get(request_id)
                .ok_or_else(|| CancelError::NotFound(request_id.to_string()))?;
            handle.mark_cancelled();
        }
        self.unregister(request_id);
        Ok(())
    }

    /// Cancels the most recently started request.
    ///
    /// # Returns
    ///
    /// The id of the cancelled request, or `CancelError::NotFound` when
    /// nothing is in flight.
    pub fn cancel_most_recent(&self) -> Result<String, CancelError> {
        let request_id = self
            .order_guard()
            .last()
            .cloned()
            .ok_or_else(|| CancelError::NotFound("no active requests".to_string()))?;

        self.cancel(&request_id)?;
        Ok(request_id)
    }

    /// Returns the number of requests currently in flight.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Returns the ids of all in-flight requests, oldest first.
    pub fn active_ids(&self) -> Vec<String> {
        self.order_guard().clone()
    }

    /// Checks whether a request is still in flight.
    pub fn is_active(&self, request_id: &str) -> bool {
        self.active.contains_key(request_id)
    }

    fn order_guard(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        match self.order.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_handle_starts_uncancelled() {
        let handle = RequestHandle::new();
        assert!(!handle.request_id.is_empty());
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_handle_with_id() {
        let handle = RequestHandle::with_id("req-1".to_string());
        assert_eq!(handle.request_id, "req-1");
    }

    #[test]
    fn test_clones_share_cancellation_state() {
        let handle = RequestHandle::with_id("req-1".to_string());
        let clone = handle.clone();

        handle.mark_cancelled();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_mark() {
        let handle = RequestHandle::new();
        let waiter = handle.clone();

        let task = tokio::spawn(async move {
            waiter.cancelled().await;
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.mark_cancelled();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_when_already_marked() {
        let handle = RequestHandle::new();
        handle.mark_cancelled();

        tokio::time::timeout(Duration::from_millis(100), handle.cancelled())
            .await
            .expect("already-cancelled handle should resolve at once");
    }

    #[test]
    fn test_register_and_unregister() {
        let tracker = RequestTracker::new();
        assert_eq!(tracker.active_count(), 0);

        let id = tracker.register(RequestHandle::with_id("req-1".to_string()));
        assert_eq!(id, "req-1");
        assert_eq!(tracker.active_count(), 1);
        assert!(tracker.is_active("req-1"));

        assert!(tracker.unregister("req-1"));
        assert_eq!(tracker.active_count(), 0);
        assert!(!tracker.unregister("req-1"));
    }

    #[test]
    fn test_cancel_marks_and_removes() {
        let tracker = RequestTracker::new();
        let handle = RequestHandle::with_id("req-1".to_string());
        let observer = handle.clone();
        tracker.register(handle);

        tracker.cancel("req-1").unwrap();
        assert!(observer.is_cancelled());
        assert!(!tracker.is_active("req-1"));
    }

    #[test]
    fn test_cancel_unknown_id() {
        let tracker = RequestTracker::new();
        let result = tracker.cancel("nonexistent");
        assert_eq!(result, Err(CancelError::NotFound("nonexistent".to_string())));
    }

    #[test]
    fn test_cancel_most_recent_walks_backwards() {
        let tracker = RequestTracker::new();
        tracker.register(RequestHandle::with_id("req-1".to_string()));
        tracker.register(RequestHandle::with_id("req-2".to_string()));
        tracker.register(RequestHandle::with_id("req-3".to_string()));

        assert_eq!(tracker.cancel_most_recent().unwrap(), "req-3");
        assert_eq!(tracker.cancel_most_recent().unwrap(), "req-2");
        assert_eq!(tracker.cancel_most_recent().unwrap(), "req-1");
        assert!(tracker.cancel_most_recent().is_err());
    }

    #[test]
    fn test_active_ids_keep_registration_order() {
        let tracker = RequestTracker::new();
        tracker.register(RequestHandle::with_id("req-1".to_string()));
        tracker.register(RequestHandle::with_id("req-2".to_string()));
        tracker.register(RequestHandle::with_id("req-3".to_string()));

        assert_eq!(tracker.active_ids(), vec!["req-1", "req-2", "req-3"]);

        tracker.unregister("req-2");
        assert_eq!(tracker.active_ids(), vec!["req-1", "req-3"]);
    }

    #[test]
    fn test_cancelling_one_request_leaves_others_running() {
        let tracker = RequestTracker::new();
        let first = RequestHandle::with_id("req-1".to_string());
        let second = RequestHandle::with_id("req-2".to_string());
        let first_observer = first.clone();
        let second_observer = second.clone();

        tracker.register(first);
        tracker.register(second);

        tracker.cancel("req-1").unwrap();

        assert!(first_observer.is_cancelled());
        assert!(!second_observer.is_cancelled());
        assert!(tracker.is_active("req-2"));
    }

    #[test]
    fn test_cancel_error_display() {
        let err = CancelError::NotFound("req-9".to_string());
        assert_eq!(err.to_string(), "Request not found: req-9");
    }
}
