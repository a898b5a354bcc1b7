//! Blocking iterator over composite state changes
//!
//! Provides various iteration patterns for consuming changes:
//! - Blocking: `recv()`, `for change in iter`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`, `timeout_iter()`

use std::sync::{mpsc, Arc};
use std::time::Duration;

use parking_lot::Mutex;

use crate::aggregator::CompositeChange;

/// Blocking iterator over composite state changes
///
/// All iterators of one virtual device share a single receiver, so each
/// change is delivered to exactly one of them.
///
/// # Example
///
/// ```rust,ignore
/// for change in device.iter() {
///     println!("{:?} -> {:?}", change.previous.playback_state, change.current.playback_state);
/// }
///
/// // Drain whatever is queued
/// for change in device.iter().try_iter() {
///     println!("now playing from {}", change.current.active_source_device);
/// }
/// ```
pub struct ChangeIterator {
    rx: Arc<Mutex<mpsc::Receiver<CompositeChange>>>,
}

impl ChangeIterator {
    pub(crate) fn new(rx: Arc<Mutex<mpsc::Receiver<CompositeChange>>>) -> Self {
        Self { rx }
    }

    /// Block until the next change is available
    ///
    /// Returns `None` once the worker has stopped.
    pub fn recv(&self) -> Option<CompositeChange> {
        self.rx.lock().recv().ok()
    }

    /// Block until the next change or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<CompositeChange> {
        self.rx.lock().recv_timeout(timeout).ok()
    }

    /// Try to receive a change without blocking
    pub fn try_recv(&self) -> Option<CompositeChange> {
        self.rx.lock().try_recv().ok()
    }

    /// Non-blocking iterator over currently queued changes
    pub fn try_iter(&self) -> TryIter<'_> {
        TryIter { inner: self }
    }

    /// Blocking iterator that stops after `timeout` without a change
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_> {
        TimeoutIter {
            inner: self,
            timeout,
        }
    }
}

impl Iterator for ChangeIterator {
    type Item = CompositeChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

/// Non-blocking iterator over currently queued changes
pub struct TryIter<'a> {
    inner: &'a ChangeIterator,
}

impl<'a> Iterator for TryIter<'a> {
    type Item = CompositeChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with timeout
pub struct TimeoutIter<'a> {
    inner: &'a ChangeIterator,
    timeout: Duration,
}

impl<'a> Iterator for TimeoutIter<'a> {
    type Item = CompositeChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}
