//! Refresh-driven frame scheduling.
//!
//! A [`RepeatingTask`] keeps exactly one tick outstanding against a
//! [`RefreshSource`] (a display refresh notification, a winit redraw, or an
//! [`IntervalRefresh`] ticker). Each delivered tick is checked against the
//! task's `active` flag and pending id before it runs, and the next tick is
//! requested before the caller draws, so stopping the task simply withholds
//! the next request.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("refresh interval must be greater than zero")]
    ZeroInterval,
    #[error("refresh ticker disconnected")]
    Disconnected,
}

/// Identifies one requested refresh callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(pub u64);

/// Anything that can notify the caller once the display is ready for another frame.
pub trait RefreshSource {
    /// Asks for a single callback on the next refresh.
    fn request_refresh(&mut self) -> TickId;
    /// Withdraws a previously requested callback. Unknown ids are ignored.
    fn cancel_refresh(&mut self, id: TickId);
}

/// Timing handed to the caller for one executed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Time since the task was started; never decreases.
    pub elapsed: Duration,
    /// Zero-based count of ticks executed since the task was started.
    pub frame_index: u64,
}

impl FrameTick {
    pub fn seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The tick belonged to the running task; the next tick is already requested.
    Ran(FrameTick),
    /// The tick id does not match the outstanding request.
    Stale,
    /// The task is stopped.
    Inactive,
}

impl TickOutcome {
    pub fn frame(self) -> Option<FrameTick> {
        match self {
            TickOutcome::Ran(tick) => Some(tick),
            TickOutcome::Stale | TickOutcome::Inactive => None,
        }
    }
}

/// A cancellable, self-rescheduling task driven by a [`RefreshSource`].
#[derive(Debug, Default)]
pub struct RepeatingTask {
    active: bool,
    pending: Option<TickId>,
    origin: Option<Instant>,
    last_elapsed: Duration,
    frames: u64,
}

impl RepeatingTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn pending(&self) -> Option<TickId> {
        self.pending
    }

    /// Number of ticks executed since the last [`start`](Self::start).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Starts the task and requests its first tick. Returns `false` when already running.
    pub fn start<S>(&mut self, source: &mut S, now: Instant) -> bool
    where
        S: RefreshSource + ?Sized,
    {
        if self.active {
            return false;
        }
        self.active = true;
        self.origin = Some(now);
        self.last_elapsed = Duration::ZERO;
        self.frames = 0;
        let id = source.request_refresh();
        self.pending = Some(id);
        tracing::trace!(tick = id.0, "repeating task started");
        true
    }

    /// Stops the task and cancels the outstanding tick. Safe to call repeatedly.
    pub fn stop<S>(&mut self, source: &mut S) -> bool
    where
        S: RefreshSource + ?Sized,
    {
        let was_active = std::mem::replace(&mut self.active, false);
        if let Some(id) = self.pending.take() {
            source.cancel_refresh(id);
        }
        if was_active {
            tracing::trace!(frames = self.frames, "repeating task stopped");
        }
        was_active
    }

    /// Delivers a refresh callback to the task.
    ///
    /// When the tick is the outstanding one and the task is still active, the
    /// next tick is requested and the frame timing is returned for the caller
    /// to draw with.
    pub fn fire<S>(&mut self, id: TickId, source: &mut S, now: Instant) -> TickOutcome
    where
        S: RefreshSource + ?Sized,
    {
        if !self.active {
            return TickOutcome::Inactive;
        }
        if self.pending != Some(id) {
            tracing::trace!(tick = id.0, pending = ?self.pending, "ignoring stale tick");
            return TickOutcome::Stale;
        }

        let origin = *self.origin.get_or_insert(now);
        let elapsed = now
            .saturating_duration_since(origin)
            .max(self.last_elapsed);
        self.last_elapsed = elapsed;

        let tick = FrameTick {
            elapsed,
            frame_index: self.frames,
        };
        self.frames = self.frames.saturating_add(1);

        self.pending = if self.active {
            Some(source.request_refresh())
        } else {
            None
        };
        TickOutcome::Ran(tick)
    }
}

/// Fixed-interval refresh source for headless loops.
///
/// Ticks arrive from a `crossbeam-channel` ticker; a tick is only delivered
/// to the caller when a refresh was requested and not cancelled.
pub struct IntervalRefresh {
    ticker: Receiver<Instant>,
    next_id: u64,
    pending: Option<TickId>,
}

impl IntervalRefresh {
    pub fn new(interval: Duration) -> Result<Self, SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        Ok(Self {
            ticker: crossbeam_channel::tick(interval),
            next_id: 0,
            pending: None,
        })
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Blocks for the next ticker beat, up to `timeout`.
    ///
    /// Returns the outstanding tick together with the beat time, or `None`
    /// when the beat passed with nothing requested or the timeout expired.
    pub fn wait(&mut self, timeout: Duration) -> Result<Option<(TickId, Instant)>, SchedulerError> {
        match self.ticker.recv_timeout(timeout) {
            Ok(at) => Ok(self.pending.take().map(|id| (id, at))),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(SchedulerError::Disconnected),
        }
    }
}

impl RefreshSource for IntervalRefresh {
    fn request_refresh(&mut self) -> TickId {
        self.next_id = self.next_id.wrapping_add(1);
        let id = TickId(self.next_id);
        self.pending = Some(id);
        id
    }

    fn cancel_refresh(&mut self, id: TickId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }
}

/// Refresh source that only fires when told to; useful for deterministic drivers.
#[derive(Debug, Default)]
pub struct ManualRefresh {
    next_id: u64,
    pending: Option<TickId>,
    requested: u64,
    cancelled: u64,
}

impl ManualRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the outstanding request, as a display refresh would.
    pub fn take_pending(&mut self) -> Option<TickId> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<TickId> {
        self.pending
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl RefreshSource for ManualRefresh {
    fn request_refresh(&mut self) -> TickId {
        self.next_id = self.next_id.wrapping_add(1);
        self.requested += 1;
        let id = TickId(self.next_id);
        self.pending = Some(id);
        id
    }

    fn cancel_refresh(&mut self, id: TickId) {
        if self.pending == Some(id) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}
