//! Refresh controller
//!
//! [`RefreshController`] owns the transport, the frame buffer and the draw
//! callback, and drives one update cycle at a time through
//!
//! ```text
//! Idle -> Waking -> Transferring -> Latching -> Settling -> Idle
//! ```
//!
//! `Waking` is skipped while the panel is awake and initialized. A busy
//! timeout is recorded and the cycle goes on. A bus failure abandons the
//! cycle, returns to `Idle` and makes the next cycle start with a reset and
//! the full init sequence.
//!
//! ## Driving the controller
//!
//! - [`RefreshController::poll`] is meant for a cooperative main loop. It
//!   issues the periodic tick when the polling interval has elapsed and runs
//!   the cycle until it has to wait on the busy line, then returns.
//! - [`RefreshController::tick`] and [`RefreshController::trigger`] request a
//!   cycle. A request made while a cycle is in flight is dropped.
//! - [`RefreshController::update`] runs a whole cycle, polling the busy line
//!   every millisecond up to the model's timeouts.
//!
//! ## Example
//!
//! ```rust,no_run
//! use crowpanel_epd::{
//!     Builder, Color, Model, PixelBuffer, RefreshController, SoftSpiInterface, UpdateMode,
//! };
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! # fn millis() -> u32 { 0 }
//! let mut frame = [0xFFu8; 400 * 300 / 8];
//! let mut old_frame = [0xFFu8; 400 * 300 / 8];
//!
//! let interface = SoftSpiInterface::new(MockPin, MockPin, MockPin, MockPin, Some(MockPin), Some(MockPin));
//! let config = match Builder::new()
//!     .model(Model::CrowPanel4in2)
//!     .update_mode(UpdateMode::Partial)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let controller = match RefreshController::new(
//!     interface,
//!     &mut frame[..],
//!     Some(&mut old_frame[..]),
//!     config,
//! ) {
//!     Ok(controller) => controller,
//!     Err(_) => return,
//! };
//! let mut controller = controller.with_draw(|buffer: &mut PixelBuffer<&mut [u8]>| {
//!     for x in 0..buffer.width() {
//!         buffer.set_color(u32::from(x), 10, Color::Black);
//!     }
//! });
//!
//! loop {
//!     let _ = controller.poll(millis(), &mut delay);
//! #   break;
//! }
//! ```

use embedded_hal::delay::DelayNs;

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::command::{
    BORDER_WAVEFORM, DEEP_SLEEP, DEEP_SLEEP_MODE_1, DISPLAY_UPDATE_CTRL1, DISPLAY_UPDATE_CTRL2,
    MASTER_ACTIVATION, SET_RAM_X_COUNTER, SET_RAM_Y_COUNTER, TARGET_PRIMARY, TARGET_SECONDARY,
    WRITE_RAM_BW, WRITE_RAM_OLD,
};
use crate::config::{Config, Dimensions, Rotation};
use crate::error::{ConfigError, Diagnostic, DiagnosticLog};
use crate::interface::{PanelInterface, Readiness};
use crate::model::{PanelModel, RamLayout};
use crate::policy::{OverrideCounting, RefreshCounters, UpdateMode};

/// Draw callback type of a controller without one
pub type NoDraw<B> = fn(&mut PixelBuffer<B>);

/// Phase of the update cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// No cycle in flight
    Idle,
    /// Resetting and initializing the panel, then waiting for it
    Waking,
    /// Streaming the frame into panel RAM
    Transferring,
    /// Triggering the refresh
    Latching,
    /// Waiting for the refresh to finish
    Settling,
}

impl State {
    /// Lower-case name for log messages
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Waking => "waking",
            Self::Transferring => "transferring",
            Self::Latching => "latching",
            Self::Settling => "settling",
        }
    }
}

/// Result of one update cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The refresh was triggered and the cycle ran to the end
    Completed {
        /// Waveform used
        mode: UpdateMode,
        /// Whether any busy wait of the cycle timed out
        timed_out: bool,
    },
    /// A bus failure cut the cycle short
    Aborted {
        /// Waveform that was selected
        mode: UpdateMode,
        /// Phase the failure happened in
        state: State,
    },
}

/// Power state of the panel as far as the controller knows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Power {
    /// Never initialized, or state unknown after a failure
    Uninitialized,
    /// Initialized and ready for RAM writes
    Awake,
    /// In deep sleep
    Asleep,
}

/// A requested cycle that has not started yet
#[derive(Clone, Copy, Debug)]
struct Request {
    override_mode: Option<UpdateMode>,
}

/// Bookkeeping of the cycle in flight
#[derive(Clone, Copy, Debug)]
struct Cycle {
    mode: UpdateMode,
    overridden: bool,
    timed_out: bool,
    wait_started_ms: u32,
}

impl Cycle {
    const IDLE: Self = Self {
        mode: UpdateMode::Full,
        overridden: false,
        timed_out: false,
        wait_started_ms: 0,
    };
}

/// What the caller of [`RefreshController::step`] should do next
enum Step {
    /// Nothing requested
    Idle,
    /// Waiting on the panel
    Wait,
    /// Keep stepping
    Continue,
    /// Cycle over
    Done(CycleOutcome),
}

/// Periodic refresh controller for one panel
///
/// ## Type Parameters
///
/// * `I` - Transport implementing [`PanelInterface`]
/// * `B` - Frame storage, e.g. `&'static mut [u8]` or `Vec<u8>`
/// * `F` - Draw callback, see [`RefreshController::with_draw`]
pub struct RefreshController<I, B, F = NoDraw<B>> {
    interface: I,
    buffer: PixelBuffer<B>,
    /// Snapshot of the last transferred frame, for partial/fast waveforms
    previous: Option<B>,
    draw: Option<F>,
    config: Config,
    panel: &'static PanelModel,
    counters: RefreshCounters,
    diagnostics: DiagnosticLog,
    state: State,
    power: Power,
    pending: Option<Request>,
    cycle: Cycle,
    boot_full_pending: bool,
    shut_down: bool,
    now_ms: u32,
    last_tick_ms: Option<u32>,
}

impl<I, B> RefreshController<I, B, NoDraw<B>>
where
    I: PanelInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a controller without a draw callback
    ///
    /// `storage` becomes the frame buffer. `previous` holds a copy of the last
    /// transferred frame; it is required when the configured mode is partial
    /// or fast on a model that compares against the old frame.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingBusyLine` if the model needs a busy pin and the
    ///   interface has none
    /// - `ConfigError::MissingPreviousFrame` if the configured mode needs
    ///   `previous` and it is `None`
    /// - `ConfigError::BufferTooSmall` if `storage` or `previous` is too small
    pub fn new(
        mut interface: I,
        storage: B,
        previous: Option<B>,
        config: Config,
    ) -> Result<Self, ConfigError> {
        let model = config.model;
        let panel = model.panel();

        if panel.requires_busy_line && !interface.has_busy_line() {
            return Err(ConfigError::MissingBusyLine { model });
        }
        if config.update_mode.accumulates_ghosting()
            && panel.needs_previous_frame
            && previous.is_none()
        {
            return Err(ConfigError::MissingPreviousFrame {
                model,
                mode: config.update_mode,
            });
        }

        let buffer = PixelBuffer::for_model(storage, model, config.rotation)?;
        let previous = match previous {
            Some(mut snapshot) => {
                let provided = snapshot.as_ref().len();
                let Some(bytes) = snapshot.as_mut().get_mut(..buffer.len()) else {
                    return Err(ConfigError::BufferTooSmall {
                        required: buffer.len(),
                        provided,
                    });
                };
                bytes.fill(Color::White.fill_byte());
                Some(snapshot)
            }
            None => None,
        };

        interface.set_fallback_delay(panel.timing.fallback_delay_ms);

        Ok(Self {
            interface,
            buffer,
            previous,
            draw: None,
            counters: RefreshCounters::new(config.full_update_every),
            diagnostics: DiagnosticLog::default(),
            state: State::Idle,
            power: Power::Uninitialized,
            pending: None,
            cycle: Cycle::IDLE,
            boot_full_pending: config.full_refresh_on_boot,
            shut_down: false,
            now_ms: 0,
            last_tick_ms: None,
            panel,
            config,
        })
    }
}

impl<I, B, F> RefreshController<I, B, F>
where
    I: PanelInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
    F: FnMut(&mut PixelBuffer<B>),
{
    /// Install the draw callback
    ///
    /// The callback runs at the start of every cycle, after the buffer was
    /// cleared to white if `clear_before_draw` is set.
    pub fn with_draw<G>(self, draw: G) -> RefreshController<I, B, G>
    where
        G: FnMut(&mut PixelBuffer<B>),
    {
        RefreshController {
            interface: self.interface,
            buffer: self.buffer,
            previous: self.previous,
            draw: Some(draw),
            config: self.config,
            panel: self.panel,
            counters: self.counters,
            diagnostics: self.diagnostics,
            state: self.state,
            power: self.power,
            pending: self.pending,
            cycle: self.cycle,
            boot_full_pending: self.boot_full_pending,
            shut_down: self.shut_down,
            now_ms: self.now_ms,
            last_tick_ms: self.last_tick_ms,
        }
    }

    /// Request a cycle with the configured waveform
    ///
    /// Returns `false` if the request was dropped.
    pub fn tick(&mut self) -> bool {
        self.trigger(None)
    }

    /// Request a cycle, optionally forcing the waveform for that cycle only
    ///
    /// The request is dropped (and counted in the diagnostics) while a cycle
    /// is in flight or queued, and after [`shutdown`](Self::shutdown).
    pub fn trigger(&mut self, override_mode: Option<UpdateMode>) -> bool {
        if self.shut_down {
            log::warn!("refresh request dropped after shutdown");
        } else if self.state != State::Idle {
            log::warn!("refresh request dropped while {}", self.state.name());
        } else if self.pending.is_some() {
            log::warn!("refresh request dropped, one is already pending");
        } else {
            self.pending = Some(Request { override_mode });
            return true;
        }
        self.diagnostics.record_dropped_tick();
        false
    }

    /// Advance the controller from a cooperative main loop
    ///
    /// `now_ms` is a free-running millisecond clock; wrap-around is handled.
    /// Issues the periodic tick when the polling interval has elapsed (the
    /// first call ticks right away), then runs the cycle until it has to wait
    /// on the panel. Returns the outcome when a cycle finishes.
    pub fn poll<D: DelayNs>(&mut self, now_ms: u32, delay: &mut D) -> Option<CycleOutcome> {
        self.now_ms = now_ms;
        if self.shut_down {
            return None;
        }

        let interval = self.config.polling_interval_ms;
        if self
            .last_tick_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= interval)
        {
            self.last_tick_ms = Some(now_ms);
            self.tick();
        }

        loop {
            match self.step(delay) {
                Step::Continue => {}
                Step::Idle | Step::Wait => return None,
                Step::Done(outcome) => return Some(outcome),
            }
        }
    }

    /// Run one whole cycle
    ///
    /// Busy waits poll every millisecond and are bounded by the model
    /// timeouts. Returns `None` if the request was dropped because a cycle
    /// is already in flight or the controller was shut down.
    pub fn update<D: DelayNs>(
        &mut self,
        override_mode: Option<UpdateMode>,
        delay: &mut D,
    ) -> Option<CycleOutcome> {
        if self.shut_down || self.state != State::Idle {
            if self.shut_down {
                log::warn!("update dropped after shutdown");
            } else {
                log::warn!("update dropped while {}", self.state.name());
            }
            self.diagnostics.record_dropped_tick();
            return None;
        }
        // A queued tick is served by this cycle
        self.pending = Some(Request { override_mode });

        loop {
            match self.step(delay) {
                Step::Continue => {}
                Step::Wait => {
                    delay.delay_ms(1);
                    self.now_ms = self.now_ms.wrapping_add(1);
                }
                Step::Idle => return None,
                Step::Done(outcome) => return Some(outcome),
            }
        }
    }

    /// Put the panel into deep sleep and stop accepting requests
    ///
    /// A cycle in flight is abandoned.
    pub fn shutdown(&mut self) -> Result<(), I::Error> {
        log::info!("shutting down panel");
        self.shut_down = true;
        self.pending = None;
        self.state = State::Idle;
        let result = self.enter_deep_sleep();
        if result.is_err() {
            self.power = Power::Uninitialized;
        }
        result
    }

    /// Log the configuration at info level
    pub fn log_config(&self) {
        let native = self.panel.native;
        log::info!("CrowPanel e-paper");
        log::info!("  Model: {}", self.panel.name);
        log::info!("  Native size: {}x{}", native.width, native.height);
        log::info!("  Rotation: {}", self.config.rotation.degrees());
        log::info!("  Update mode: {}", self.config.update_mode.name());
        log::info!("  Full update every: {}", self.config.full_update_every);
        log::info!("  Polling interval: {} ms", self.config.polling_interval_ms);
        log::info!(
            "  Busy pin: {}",
            if self.interface.has_busy_line() {
                "yes"
            } else {
                "no"
            }
        );
        log::info!(
            "  Sleep between updates: {}",
            self.config.sleep_between_updates
        );
    }

    /// Current phase
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether [`shutdown`](Self::shutdown) was called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Refresh counters
    pub fn counters(&self) -> &RefreshCounters {
        &self.counters
    }

    /// Partial/fast updates since the last full refresh
    pub fn partial_count(&self) -> u32 {
        self.counters.partial_count()
    }

    /// Runtime diagnostics
    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Mutable runtime diagnostics, e.g. to clear them
    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.diagnostics
    }

    /// Controller configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Static description of the panel
    pub fn panel(&self) -> &'static PanelModel {
        self.panel
    }

    /// Logical drawing size
    pub fn dimensions(&self) -> Dimensions {
        self.buffer.dimensions()
    }

    /// Drawing rotation
    pub fn rotation(&self) -> Rotation {
        self.buffer.rotation()
    }

    /// Frame buffer
    pub fn buffer(&self) -> &PixelBuffer<B> {
        &self.buffer
    }

    /// Mutable frame buffer, for drawing without a callback
    pub fn buffer_mut(&mut self) -> &mut PixelBuffer<B> {
        &mut self.buffer
    }

    /// Transport
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Release the transport and the frame storage
    pub fn release(self) -> (I, PixelBuffer<B>, Option<B>) {
        (self.interface, self.buffer, self.previous)
    }

    fn step<D: DelayNs>(&mut self, delay: &mut D) -> Step {
        match self.state {
            State::Idle => match self.pending.take() {
                Some(request) => self.begin(request, delay),
                None => Step::Idle,
            },
            State::Waking => match self.check_ready(self.panel.timing.wake_timeout_ms) {
                Readiness::Pending => Step::Wait,
                Readiness::Ready | Readiness::TimedOut => {
                    self.power = Power::Awake;
                    self.state = State::Transferring;
                    Step::Continue
                }
            },
            State::Transferring => match self.transfer() {
                Ok(()) => {
                    self.state = State::Latching;
                    Step::Continue
                }
                Err(e) => Step::Done(self.abort(&e)),
            },
            State::Latching => match self.latch(delay) {
                Ok(()) => {
                    self.state = State::Settling;
                    self.cycle.wait_started_ms = self.now_ms;
                    Step::Continue
                }
                Err(e) => Step::Done(self.abort(&e)),
            },
            State::Settling => match self.check_ready(self.panel.timing.refresh_timeout_ms) {
                Readiness::Pending => Step::Wait,
                Readiness::Ready | Readiness::TimedOut => Step::Done(self.finish()),
            },
        }
    }

    fn begin<D: DelayNs>(&mut self, request: Request, delay: &mut D) -> Step {
        if let Some(draw) = self.draw.as_mut() {
            if self.config.clear_before_draw {
                self.buffer.fill(Color::White);
            }
            draw(&mut self.buffer);
        }

        let mode = self.choose_mode(request.override_mode);
        log::debug!(
            "starting {} refresh ({} since last full)",
            mode.name(),
            self.counters.partial_count()
        );
        self.cycle = Cycle {
            mode,
            overridden: request.override_mode.is_some(),
            timed_out: false,
            wait_started_ms: self.now_ms,
        };

        if self.power == Power::Awake {
            self.state = State::Transferring;
            return Step::Continue;
        }

        self.state = State::Waking;
        if let Err(e) = self.wake(delay) {
            return Step::Done(self.abort(&e));
        }
        self.cycle.wait_started_ms = self.now_ms;
        Step::Continue
    }

    fn choose_mode(&mut self, override_mode: Option<UpdateMode>) -> UpdateMode {
        let boot_full = core::mem::take(&mut self.boot_full_pending);
        let mode = if boot_full && override_mode.is_none() {
            UpdateMode::Full
        } else {
            self.counters.decide(self.config.update_mode, override_mode)
        };

        if self.panel.waveform(mode).is_none() {
            log::warn!("{} has no {} waveform, using full", self.panel.name, mode.name());
            return UpdateMode::Full;
        }
        if mode.accumulates_ghosting() && self.panel.needs_previous_frame && self.previous.is_none()
        {
            log::warn!("no previous frame for {} refresh, using full", mode.name());
            return UpdateMode::Full;
        }
        mode
    }

    /// Reset and replay the init sequence
    fn wake<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), I::Error> {
        let kind = self
            .interface
            .reset(delay, self.config.reset_duration_ms);
        log::debug!("panel reset ({:?})", kind);

        for step in self.panel.init_sequence {
            self.interface.send_command(step.command)?;
            if !step.data.is_empty() {
                self.interface.send_data(step.data)?;
            }
            if step.delay_ms > 0 {
                delay.delay_ms(u32::from(step.delay_ms));
            }
        }
        Ok(())
    }

    fn transfer(&mut self) -> Result<(), I::Error> {
        let mode = self.cycle.mode;
        let waveform = self
            .panel
            .waveform(mode)
            .copied()
            .unwrap_or(self.panel.full);

        self.interface.send_command(BORDER_WAVEFORM)?;
        self.interface.send_data(&[waveform.border])?;
        self.interface.send_command(DISPLAY_UPDATE_CTRL1)?;
        self.interface.send_data(&waveform.update_ctrl1)?;

        let size = self.buffer.len();
        if mode.accumulates_ghosting() {
            if let Some(previous) = self.previous.as_ref() {
                let old = previous.as_ref().get(..size).unwrap_or(previous.as_ref());
                write_ram(&mut self.interface, self.panel, WRITE_RAM_OLD, old)?;
            }
        }
        write_ram(
            &mut self.interface,
            self.panel,
            WRITE_RAM_BW,
            self.buffer.as_bytes(),
        )
    }

    fn latch<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), I::Error> {
        let waveform = self
            .panel
            .waveform(self.cycle.mode)
            .copied()
            .unwrap_or(self.panel.full);

        self.interface.send_command(DISPLAY_UPDATE_CTRL2)?;
        self.interface.send_data(&[waveform.update_ctrl2])?;
        self.interface.send_command(MASTER_ACTIVATION)?;
        delay.delay_ms(self.panel.timing.latch_settle_ms);
        Ok(())
    }

    /// One non-blocking readiness check against the current wait
    ///
    /// At most one timeout is recorded per cycle.
    fn check_ready(&mut self, timeout_ms: u32) -> Readiness {
        let elapsed = self.now_ms.wrapping_sub(self.cycle.wait_started_ms);
        let readiness = self.interface.poll_ready(elapsed, timeout_ms);
        if readiness == Readiness::TimedOut && !self.cycle.timed_out {
            log::warn!(
                "panel still busy after {} ms while {}",
                elapsed,
                self.state.name()
            );
            self.diagnostics
                .record(Diagnostic::TransportTimeout { state: self.state });
            self.cycle.timed_out = true;
        }
        readiness
    }

    fn finish(&mut self) -> CycleOutcome {
        let Cycle {
            mode,
            overridden,
            timed_out,
            ..
        } = self.cycle;

        if !(overridden && self.config.override_counting == OverrideCounting::Ignore) {
            self.counters.record(mode);
        }

        let size = self.buffer.len();
        if let Some(previous) = self.previous.as_mut() {
            if let Some(snapshot) = previous.as_mut().get_mut(..size) {
                snapshot.copy_from_slice(self.buffer.as_bytes());
            }
        }

        self.state = State::Idle;
        if self.config.sleep_between_updates {
            if let Err(e) = self.enter_deep_sleep() {
                log::warn!("deep sleep failed: {:?}", e);
                self.diagnostics
                    .record(Diagnostic::BusFailure { state: State::Idle });
                self.power = Power::Uninitialized;
            }
        }

        log::debug!(
            "{} refresh done, {} since last full",
            mode.name(),
            self.counters.partial_count()
        );
        CycleOutcome::Completed { mode, timed_out }
    }

    fn abort(&mut self, error: &I::Error) -> CycleOutcome {
        let state = self.state;
        log::warn!("bus failure while {}: {:?}", state.name(), error);
        self.diagnostics.record(Diagnostic::BusFailure { state });
        self.power = Power::Uninitialized;
        self.state = State::Idle;
        CycleOutcome::Aborted {
            mode: self.cycle.mode,
            state,
        }
    }

    fn enter_deep_sleep(&mut self) -> Result<(), I::Error> {
        self.interface.send_command(DEEP_SLEEP)?;
        self.interface.send_data(&[DEEP_SLEEP_MODE_1])?;
        self.power = Power::Asleep;
        log::debug!("panel in deep sleep");
        Ok(())
    }
}

/// Point the RAM counters at the origin and stream `frame` with `command`
fn write_ram<I: PanelInterface>(
    interface: &mut I,
    panel: &PanelModel,
    command: u8,
    frame: &[u8],
) -> Result<(), I::Error> {
    match panel.layout {
        RamLayout::Linear => {
            interface.send_command(SET_RAM_X_COUNTER)?;
            interface.send_data(&[0x00])?;
            interface.send_command(SET_RAM_Y_COUNTER)?;
            interface.send_data(&[0x00, 0x00])?;
            interface.send_command(command)?;
            interface.send_data(frame)
        }
        RamLayout::Cascade => {
            let row_bytes = panel.row_bytes();
            let half = row_bytes.div_ceil(2);
            let secondary_start = row_bytes / 2;

            interface.send_command(SET_RAM_X_COUNTER | TARGET_PRIMARY)?;
            interface.send_data(&[0x00])?;
            interface.send_command(SET_RAM_Y_COUNTER | TARGET_PRIMARY)?;
            interface.send_data(&[0x00, 0x00])?;
            // The secondary chip fills right to left from the end of its window
            interface.send_command(SET_RAM_X_COUNTER | TARGET_SECONDARY)?;
            interface.send_data(&[half.saturating_sub(1) as u8])?;
            interface.send_command(SET_RAM_Y_COUNTER | TARGET_SECONDARY)?;
            interface.send_data(&[0x00, 0x00])?;

            interface.send_command(command | TARGET_PRIMARY)?;
            for row in frame.chunks(row_bytes) {
                interface.send_data(row.get(..half).unwrap_or(row))?;
            }
            interface.send_command(command | TARGET_SECONDARY)?;
            for row in frame.chunks(row_bytes) {
                interface.send_data(row.get(secondary_start..).unwrap_or(&[]))?;
            }
            Ok(())
        }
    }
}
