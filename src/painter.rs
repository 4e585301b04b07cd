//! Painter loop step
//!
//! Ties the trigger gate to the render pipeline without async/await or
//! platform-specific timers. The caller is responsible for sleeping between
//! ticks.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::ConfigProvider;
use crate::pipeline::RenderPipeline;
use crate::storage::Storage;
use crate::strip::LedOutput;
use crate::trigger::{RenderOutcome, TriggerGate};

/// Default interval between trigger polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Physical trigger input, sampled on demand
pub trait TriggerInput {
    /// Returns `true` while the trigger is held
    fn is_asserted(&mut self) -> bool;
}

impl<F: FnMut() -> bool> TriggerInput for F {
    fn is_asserted(&mut self) -> bool {
        self()
    }
}

/// Result of a painter tick
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// Outcome of the pass run during this tick, if any
    pub outcome: Option<RenderOutcome>,
    /// How long to wait before the next tick
    pub sleep_duration: Duration,
}

/// Painter - polls the trigger and runs render passes
///
/// # Usage
///
/// ```ignore
/// static GATE: TriggerGate = TriggerGate::new(DEFAULT_TRIGGER_TIMINGS);
///
/// let pipeline = RenderPipeline::<_, _, 144>::new(storage, output);
/// let mut painter = Painter::new(pipeline, &GATE, || button.is_low(), config);
///
/// loop {
///     let result = painter.tick(Instant::now());
///     // Platform-specific sleep
///     sleep_ms(result.sleep_duration.as_millis());
/// }
/// ```
pub struct Painter<'a, S, O, I, C, const MAX_LEDS: usize>
where
    S: Storage,
    O: LedOutput,
    I: TriggerInput,
    C: ConfigProvider,
{
    pipeline: RenderPipeline<S, O, MAX_LEDS>,
    gate: &'a TriggerGate,
    input: I,
    config: C,
    poll_interval: Duration,
}

impl<'a, S, O, I, C, const MAX_LEDS: usize> Painter<'a, S, O, I, C, MAX_LEDS>
where
    S: Storage,
    O: LedOutput,
    I: TriggerInput,
    C: ConfigProvider,
{
    /// Create a new painter
    ///
    /// Uses `DEFAULT_POLL_INTERVAL` between ticks.
    pub fn new(
        pipeline: RenderPipeline<S, O, MAX_LEDS>,
        gate: &'a TriggerGate,
        input: I,
        config: C,
    ) -> Self {
        Self::with_poll_interval(pipeline, gate, input, config, DEFAULT_POLL_INTERVAL)
    }

    /// Create a new painter with custom poll interval
    pub fn with_poll_interval(
        pipeline: RenderPipeline<S, O, MAX_LEDS>,
        gate: &'a TriggerGate,
        input: I,
        config: C,
        poll_interval: Duration,
    ) -> Self {
        Self {
            pipeline,
            gate,
            input,
            config,
            poll_interval,
        }
    }

    /// Sample the trigger and run a render pass if one is due
    ///
    /// A pass blocks this call until it completes. The configuration is
    /// snapshotted right before the pass starts.
    ///
    /// Outcome timestamps are on the same clock as `now`.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        let asserted = self.input.is_asserted();
        let Some(source) = self.gate.poll(now, asserted) else {
            return TickResult {
                outcome: None,
                sleep_duration: self.poll_interval,
            };
        };

        let config = self.config.snapshot();
        let pass_start = Instant::now();
        let result = self.pipeline.render(&config);
        // Measured on the system clock, reported on the caller's
        let elapsed = Instant::now().saturating_duration_since(pass_start);
        let outcome = RenderOutcome {
            source,
            result,
            started: now,
            finished: now + elapsed,
        };
        self.gate.finish(outcome);

        #[cfg(feature = "esp32-log")]
        println!(
            "[Painter.tick] {:?} pass finished in {} ms: {:?}",
            source,
            elapsed.as_millis(),
            result
        );

        TickResult {
            outcome: Some(outcome),
            sleep_duration: self.poll_interval,
        }
    }

    pub const fn gate(&self) -> &'a TriggerGate {
        self.gate
    }

    pub const fn pipeline(&self) -> &RenderPipeline<S, O, MAX_LEDS> {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline<S, O, MAX_LEDS> {
        &mut self.pipeline
    }

    pub fn config_mut(&mut self) -> &mut C {
        &mut self.config
    }
}
