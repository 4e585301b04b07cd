//! Render trigger state machine
//!
//! Decides when a render pass starts and makes sure only one runs at a
//! time. A pass starts either from the physical trigger (held through the
//! debounce window, then a pre-roll so the operator can start moving) or
//! from a remote request such as the web "Draw Image" action.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::pipeline::RenderError;

/// Timings of the trigger state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerTimings {
    /// How long the input must stay asserted before arming
    pub debounce: Duration,
    /// Delay between arming and the start of the pass
    pub pre_roll: Duration,
    /// Settle time after a pass before new triggers are accepted
    pub cooldown: Duration,
}

pub const DEFAULT_TRIGGER_TIMINGS: TriggerTimings = TriggerTimings {
    debounce: Duration::from_millis(200),
    pre_roll: Duration::from_millis(3000),
    cooldown: Duration::from_millis(0),
};

impl Default for TriggerTimings {
    fn default() -> Self {
        DEFAULT_TRIGGER_TIMINGS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    /// Waiting for a trigger
    Idle,
    /// Trigger accepted, waiting out the pre-roll
    Armed,
    /// A render pass owns the strip
    Rendering,
    /// Pass finished, waiting out the cooldown
    Cooling,
}

/// What started a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSource {
    /// Physical trigger input
    Trigger,
    /// Remote request
    Remote,
}

/// Result of a finished render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    pub source: RenderSource,
    pub result: Result<(), RenderError>,
    pub started: Instant,
    pub finished: Instant,
}

/// Trigger state machine
///
/// Poll it with the current time and input level; it answers with the
/// source of a pass that should start now.
#[derive(Debug, Clone)]
pub struct TriggerController {
    timings: TriggerTimings,
    state: TriggerState,
    asserted_since: Option<Instant>,
    armed_at: Instant,
    cooling_until: Instant,
    pending: Option<RenderSource>,
    last_outcome: Option<RenderOutcome>,
}

impl TriggerController {
    pub const fn new(timings: TriggerTimings) -> Self {
        Self {
            timings,
            state: TriggerState::Idle,
            asserted_since: None,
            armed_at: Instant::from_millis(0),
            cooling_until: Instant::from_millis(0),
            pending: None,
            last_outcome: None,
        }
    }

    pub const fn state(&self) -> TriggerState {
        self.state
    }

    pub const fn timings(&self) -> TriggerTimings {
        self.timings
    }

    pub const fn last_outcome(&self) -> Option<RenderOutcome> {
        self.last_outcome
    }

    /// Advance the state machine
    ///
    /// Returns the source of a render pass that must start now. The caller
    /// is expected to run the pass and then call [`TriggerController::finish`].
    pub fn poll(&mut self, now: Instant, asserted: bool) -> Option<RenderSource> {
        match self.state {
            TriggerState::Idle => {
                self.debounce(now, asserted);
                self.start_if_ready(now)
            }
            TriggerState::Armed => self.start_if_ready(now),
            TriggerState::Rendering => self.pending.take(),
            TriggerState::Cooling => {
                if now >= self.cooling_until {
                    self.state = TriggerState::Idle;
                }
                None
            }
        }
    }

    /// Start a pass on request
    ///
    /// Only accepted while idle; otherwise the request is rejected with
    /// [`RenderError::Busy`] and nothing changes.
    pub fn request_render(&mut self) -> Result<(), RenderError> {
        if self.state != TriggerState::Idle {
            #[cfg(feature = "esp32-log")]
            println!("[TriggerController.request_render] busy in {:?}", self.state);
            return Err(RenderError::Busy);
        }
        self.state = TriggerState::Rendering;
        self.asserted_since = None;
        self.pending = Some(RenderSource::Remote);
        Ok(())
    }

    /// Mark the active pass as finished
    pub fn finish(&mut self, outcome: RenderOutcome) {
        if self.state != TriggerState::Rendering {
            return;
        }
        self.pending = None;
        self.last_outcome = Some(outcome);
        if self.timings.cooldown.as_ticks() == 0 {
            self.state = TriggerState::Idle;
        } else {
            self.state = TriggerState::Cooling;
            self.cooling_until = outcome.finished + self.timings.cooldown;
        }
    }

    /// Arm once the input has stayed asserted for the debounce window
    fn debounce(&mut self, now: Instant, asserted: bool) {
        if !asserted {
            self.asserted_since = None;
            return;
        }
        let since = *self.asserted_since.get_or_insert(now);
        if now.saturating_duration_since(since) >= self.timings.debounce {
            #[cfg(feature = "esp32-log")]
            println!("[TriggerController.debounce] armed at {}", now.as_millis());
            self.asserted_since = None;
            self.armed_at = now;
            self.state = TriggerState::Armed;
        }
    }

    fn start_if_ready(&mut self, now: Instant) -> Option<RenderSource> {
        if self.state != TriggerState::Armed {
            return None;
        }
        if now.saturating_duration_since(self.armed_at) < self.timings.pre_roll {
            return None;
        }
        self.state = TriggerState::Rendering;
        Some(RenderSource::Trigger)
    }
}

impl Default for TriggerController {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_TIMINGS)
    }
}

/// Trigger state machine shared between execution contexts
///
/// Uses critical sections for synchronization, so the web surface can
/// request a pass from another thread or interrupt while the render loop
/// polls.
pub struct TriggerGate {
    inner: Mutex<RefCell<TriggerController>>,
}

impl TriggerGate {
    pub const fn new(timings: TriggerTimings) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(TriggerController::new(timings))),
        }
    }

    /// Request a render pass, returning immediately
    pub fn start_render(&self) -> Result<(), RenderError> {
        self.with(TriggerController::request_render)
    }

    pub fn poll(&self, now: Instant, asserted: bool) -> Option<RenderSource> {
        self.with(|controller| controller.poll(now, asserted))
    }

    pub fn finish(&self, outcome: RenderOutcome) {
        self.with(|controller| controller.finish(outcome));
    }

    pub fn state(&self) -> TriggerState {
        self.with(|controller| controller.state())
    }

    pub fn last_outcome(&self) -> Option<RenderOutcome> {
        self.with(|controller| controller.last_outcome())
    }

    fn with<R>(&self, f: impl FnOnce(&mut TriggerController) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow(cs).borrow_mut()))
    }
}

impl Default for TriggerGate {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_TIMINGS)
    }
}
