//! Continuous position watching on top of a platform position source.
//!
//! The tracker owns at most one live subscription. Every subscription is
//! tagged with a generation number that its callback checks against the live
//! generation. Stopping resets the live generation, so readings a platform
//! delivers after `clear_watch` are dropped before they reach the consumer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::models::{LocationError, Position};

/// W3C `GeolocationPositionError` codes.
pub const CODE_PERMISSION_DENIED: u16 = 1;
pub const CODE_POSITION_UNAVAILABLE: u16 = 2;
pub const CODE_TIMEOUT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// Oldest cached fix the platform may hand back.
    pub maximum_age: Duration,
    /// How long the platform may wait for a single fix before reporting a timeout.
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::from_secs(10),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Platform-assigned id of a watch registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub i32);

/// Raw reading as delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceReading {
    Fix(Position),
    Error { code: u16, message: String },
}

pub type ReadingCallback = Box<dyn FnMut(SourceReading)>;

/// A device position source such as the browser Geolocation API.
pub trait PositionSource {
    /// Whether the capability exists at all on this device.
    fn is_available(&self) -> bool;

    /// Register a continuous watch. `callback` is invoked for every reading
    /// until the watch is cleared.
    fn watch(
        &self,
        options: &WatchOptions,
        callback: ReadingCallback,
    ) -> Result<WatchId, LocationError>;

    fn clear_watch(&self, id: WatchId);
}

/// Map a platform error code onto the location error taxonomy.
pub fn classify_error_code(code: u16) -> LocationError {
    match code {
        CODE_PERMISSION_DENIED => LocationError::PermissionDenied,
        CODE_POSITION_UNAVAILABLE => LocationError::PositionUnavailable,
        CODE_TIMEOUT => LocationError::Timeout,
        _ => LocationError::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationUpdate {
    pub position: Position,
    /// True only for the first fix delivered since `start`.
    pub first_fix: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle {
    watch_id: WatchId,
    generation: u64,
}

impl SubscriptionHandle {
    pub fn watch_id(&self) -> WatchId {
        self.watch_id
    }
}

pub struct LocationTracker<S: PositionSource> {
    source: S,
    /// Generation of the live subscription; 0 while stopped.
    live_generation: Rc<Cell<u64>>,
    next_generation: u64,
    active: Option<SubscriptionHandle>,
}

impl<S: PositionSource> LocationTracker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            live_generation: Rc::new(Cell::new(0)),
            next_generation: 1,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begin watching. Any previous subscription is stopped first.
    ///
    /// Returns `None` when the capability is missing or the platform refuses
    /// the watch; `on_error` has been called with the reason in that case.
    pub fn start<U, E>(
        &mut self,
        mut on_update: U,
        on_error: E,
        options: WatchOptions,
    ) -> Option<SubscriptionHandle>
    where
        U: FnMut(LocationUpdate) + 'static,
        E: FnMut(LocationError) + 'static,
    {
        self.stop_active();

        let on_error = Rc::new(RefCell::new(on_error));
        if !self.source.is_available() {
            tracing::warn!("position source unavailable, not subscribing");
            (*on_error.borrow_mut())(LocationError::CapabilityUnavailable);
            return None;
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        self.live_generation.set(generation);

        let live = Rc::clone(&self.live_generation);
        let deliver_error = Rc::clone(&on_error);
        let mut first_fix_pending = true;
        let callback: ReadingCallback = Box::new(move |reading| {
            if live.get() != generation {
                tracing::trace!(generation, "dropping reading from stopped subscription");
                return;
            }
            match reading {
                SourceReading::Fix(position) => {
                    let first_fix = std::mem::replace(&mut first_fix_pending, false);
                    on_update(LocationUpdate {
                        position,
                        first_fix,
                    });
                }
                SourceReading::Error { code, message } => {
                    let error = classify_error_code(code);
                    tracing::warn!(code, %message, ?error, "position source reported an error");
                    (*deliver_error.borrow_mut())(error);
                }
            }
        });

        match self.source.watch(&options, callback) {
            Ok(watch_id) => {
                tracing::debug!(?watch_id, generation, "location tracking started");
                let handle = SubscriptionHandle {
                    watch_id,
                    generation,
                };
                self.active = Some(handle);
                Some(handle)
            }
            Err(error) => {
                self.live_generation.set(0);
                tracing::warn!(?error, "position source refused the watch");
                (*on_error.borrow_mut())(error);
                None
            }
        }
    }

    /// Cancel a subscription. Stale or already-stopped handles are ignored.
    pub fn stop(&mut self, handle: SubscriptionHandle) {
        if self.active != Some(handle) {
            return;
        }
        self.active = None;
        self.live_generation.set(0);
        self.source.clear_watch(handle.watch_id);
        tracing::debug!(watch_id = ?handle.watch_id, "location tracking stopped");
    }

    pub fn stop_active(&mut self) {
        if let Some(handle) = self.active {
            self.stop(handle);
        }
    }
}

impl<S: PositionSource> Drop for LocationTracker<S> {
    fn drop(&mut self) {
        self.stop_active();
    }
}
