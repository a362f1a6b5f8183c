//! Panel transport
//!
//! This module provides the [`PanelInterface`] trait and two implementations:
//!
//! - [`SoftSpiInterface`] bit-bangs the bus on plain GPIOs: clock, data-out,
//!   chip-select and data/command select. This is how CrowPanel boards wire the
//!   panel.
//! - [`SpiInterface`] uses an embedded-hal [`SpiDevice`] (which owns
//!   chip-select) plus a data/command pin.
//!
//! Both take an optional reset pin and an optional busy pin. Without a reset
//! pin, [`PanelInterface::reset`] sends a software reset command instead.
//! Without a busy pin, readiness is assumed after a fixed fallback delay.
//!
//! ## Readiness
//!
//! [`PanelInterface::poll_ready`] is a single non-blocking check against a
//! deadline, meant to be called once per scheduler pass.
//! [`PanelInterface::wait_until_ready`] loops over it with 1 ms delays and is
//! bounded by the same timeout.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use crowpanel_epd::{PanelInterface, Readiness, SoftSpiInterface};
//! # use core::convert::Infallible;
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
//! // clk, mosi, cs, dc, reset, busy
//! let mut interface = SoftSpiInterface::new(
//!     MockPin,
//!     MockPin,
//!     MockPin,
//!     MockPin,
//!     Some(MockPin),
//!     Some(MockPin),
//! );
//!
//! let _ = interface.send_command(0x12);
//! let _ = interface.send_data(&[0xFF, 0x00, 0xFF]);
//!
//! if interface.wait_until_ready(&mut delay, 1_000) == Readiness::TimedOut {
//!     // carry on anyway
//! }
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::command::SOFT_RESET;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Default wait used instead of busy polling when no busy pin is wired
pub const DEFAULT_FALLBACK_DELAY_MS: u32 = 4_000;

/// Outcome of a readiness check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// The panel is idle
    Ready,
    /// Still busy, deadline not reached
    Pending,
    /// Still busy at the deadline
    TimedOut,
}

/// How the panel was reset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetKind {
    /// Reset line pulsed
    Hardware,
    /// Software reset command sent (no reset pin, or the pin failed)
    Software,
}

/// Transport to the panel controller
///
/// The controller only talks to the panel through this trait, which lets tests
/// record the exact command stream. For hardware, use [`SoftSpiInterface`] or
/// [`SpiInterface`].
pub trait PanelInterface {
    /// Error type for bus operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send a command byte
    ///
    /// Asserts chip-select, drives DC low, clocks the byte out, releases
    /// chip-select.
    ///
    /// # Errors
    ///
    /// Returns an error if a bus pin or the SPI device fails.
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send data bytes
    ///
    /// Same framing as [`send_command`](Self::send_command) with DC high.
    ///
    /// # Errors
    ///
    /// Returns an error if a bus pin or the SPI device fails.
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Reset the panel
    ///
    /// Pulses the reset line low for `hold_ms`, then waits `hold_ms` after
    /// releasing it. Without a usable reset pin a software reset command is
    /// sent instead. Never fails: a panel that did not reset still gets the
    /// commands that follow.
    fn reset<D: DelayNs>(&mut self, delay: &mut D, hold_ms: u32) -> ResetKind;

    /// Whether a busy pin is wired
    fn has_busy_line(&self) -> bool;

    /// Set the wait used instead of busy polling when no busy pin is wired
    fn set_fallback_delay(&mut self, delay_ms: u32);

    /// Check readiness once, without blocking
    ///
    /// `elapsed_ms` is the time since the wait began. With a busy pin this is
    /// [`Readiness::TimedOut`] once `elapsed_ms` reaches `timeout_ms` while the
    /// panel is still busy. Without one it is [`Readiness::Ready`] once
    /// `elapsed_ms` reaches the fallback delay, and never times out.
    fn poll_ready(&mut self, elapsed_ms: u32, timeout_ms: u32) -> Readiness;

    /// Wait until ready or `timeout_ms` elapses
    ///
    /// Returns [`Readiness::Ready`] or [`Readiness::TimedOut`].
    fn wait_until_ready<D: DelayNs>(&mut self, delay: &mut D, timeout_ms: u32) -> Readiness {
        let mut elapsed_ms = 0u32;
        loop {
            match self.poll_ready(elapsed_ms, timeout_ms) {
                Readiness::Pending => {
                    delay.delay_ms(1);
                    elapsed_ms = elapsed_ms.saturating_add(1);
                }
                done => return done,
            }
        }
    }
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types. [`SoftSpiInterface`] has no SPI
/// peripheral and uses [`core::convert::Infallible`] for `SpiErr`.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Reset and busy lines shared by both interface types
struct ControlLines<RST, BUSY> {
    /// Reset pin (active low)
    rst: Option<RST>,
    /// Busy pin
    busy: Option<BUSY>,
    /// Busy pin polarity (true = high while busy)
    busy_active_high: bool,
    /// Wait used when there is no busy pin
    fallback_delay_ms: u32,
}

impl<RST, BUSY, PinErr> ControlLines<RST, BUSY>
where
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    fn new(rst: Option<RST>, busy: Option<BUSY>) -> Self {
        Self {
            rst,
            busy,
            busy_active_high: true,
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY_MS,
        }
    }

    /// Pulse the reset line; `false` if there is no pin or it failed
    fn hardware_reset<D: DelayNs>(&mut self, delay: &mut D, hold_ms: u32) -> bool {
        let Some(rst) = self.rst.as_mut() else {
            return false;
        };
        if let Err(e) = rst.set_low() {
            log::warn!("reset pin failed: {e:?}");
            return false;
        }
        delay.delay_ms(hold_ms);
        if let Err(e) = rst.set_high() {
            log::warn!("reset pin failed: {e:?}");
            return false;
        }
        delay.delay_ms(hold_ms);
        true
    }

    fn poll_ready(&mut self, elapsed_ms: u32, timeout_ms: u32) -> Readiness {
        let fallback = if elapsed_ms >= self.fallback_delay_ms {
            Readiness::Ready
        } else {
            Readiness::Pending
        };
        let Some(busy) = self.busy.as_mut() else {
            return fallback;
        };

        let is_busy = if self.busy_active_high {
            busy.is_high()
        } else {
            busy.is_low()
        };

        match is_busy {
            Ok(false) => Readiness::Ready,
            Ok(true) if elapsed_ms >= timeout_ms => Readiness::TimedOut,
            Ok(true) => Readiness::Pending,
            // An unreadable busy pin is treated like a missing one
            Err(e) => {
                log::warn!("busy pin read failed: {e:?}");
                fallback
            }
        }
    }
}

/// Bit-banged transport on four GPIOs
///
/// ## Type Parameters
///
/// * `CLK` - Clock pin implementing [`OutputPin`]
/// * `MOSI` - Data-out pin implementing [`OutputPin`]
/// * `CS` - Chip-select pin (active low) implementing [`OutputPin`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Optional reset pin implementing [`OutputPin`]
/// * `BUSY` - Optional busy pin implementing [`InputPin`]
///
/// Bytes are sent MSB first, sampled on the rising clock edge (SPI mode 0).
pub struct SoftSpiInterface<CLK, MOSI, CS, DC, RST, BUSY> {
    /// Clock
    clk: CLK,
    /// Data out
    mosi: MOSI,
    /// Chip-select (active low)
    cs: CS,
    /// Data/Command select (low=command, high=data)
    dc: DC,
    /// Reset and busy
    lines: ControlLines<RST, BUSY>,
}

impl<CLK, MOSI, CS, DC, RST, BUSY, PinErr> SoftSpiInterface<CLK, MOSI, CS, DC, RST, BUSY>
where
    CLK: OutputPin<Error = PinErr>,
    MOSI: OutputPin<Error = PinErr>,
    CS: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    /// Create a new interface and drive the bus to its idle levels
    ///
    /// Idle levels are chip-select high, clock low, DC high.
    pub fn new(
        clk: CLK,
        mosi: MOSI,
        cs: CS,
        dc: DC,
        rst: Option<RST>,
        busy: Option<BUSY>,
    ) -> Self {
        let mut interface = Self {
            clk,
            mosi,
            cs,
            dc,
            lines: ControlLines::new(rst, busy),
        };
        if let Err(e) = interface.idle() {
            log::warn!("could not idle panel bus: {e:?}");
        }
        interface
    }

    /// Set busy pin polarity
    ///
    /// Default is active-high.
    pub fn set_busy_active_high(&mut self, active_high: bool) -> &mut Self {
        self.lines.busy_active_high = active_high;
        self
    }

    /// Whether a reset pin is wired
    pub fn has_reset_line(&self) -> bool {
        self.lines.rst.is_some()
    }

    /// Release the pins
    pub fn release(self) -> (CLK, MOSI, CS, DC, Option<RST>, Option<BUSY>) {
        (
            self.clk,
            self.mosi,
            self.cs,
            self.dc,
            self.lines.rst,
            self.lines.busy,
        )
    }

    fn idle(&mut self) -> InterfaceResult<(), PinErr> {
        self.cs.set_high()?;
        self.clk.set_low()?;
        self.dc.set_high()
    }

    fn write_byte(&mut self, byte: u8) -> InterfaceResult<(), PinErr> {
        for bit in (0..8).rev() {
            self.clk.set_low()?;
            if byte & (1 << bit) != 0 {
                self.mosi.set_high()?;
            } else {
                self.mosi.set_low()?;
            }
            self.clk.set_high()?;
        }
        Ok(())
    }

    /// One chip-select frame with DC at the given level
    fn frame(&mut self, data_mode: bool, bytes: &[u8]) -> InterfaceResult<(), PinErr> {
        if data_mode {
            self.dc.set_high()?;
        } else {
            self.dc.set_low()?;
        }
        self.cs.set_low()?;
        let result = bytes.iter().try_for_each(|&byte| self.write_byte(byte));
        // Release the chip even if clocking failed
        let released = self.cs.set_high();
        result?;
        released?;
        if !data_mode {
            self.dc.set_high()?;
        }
        Ok(())
    }
}

impl<CLK, MOSI, CS, DC, RST, BUSY, PinErr> PanelInterface
    for SoftSpiInterface<CLK, MOSI, CS, DC, RST, BUSY>
where
    CLK: OutputPin<Error = PinErr>,
    MOSI: OutputPin<Error = PinErr>,
    CS: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<core::convert::Infallible, PinErr>;

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        self.frame(false, &[command]).map_err(InterfaceError::Pin)
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.frame(true, data).map_err(InterfaceError::Pin)
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D, hold_ms: u32) -> ResetKind {
        if self.lines.hardware_reset(delay, hold_ms) {
            return ResetKind::Hardware;
        }
        if let Err(e) = self.send_command(SOFT_RESET) {
            log::warn!("software reset failed: {e:?}");
        }
        delay.delay_ms(hold_ms);
        ResetKind::Software
    }

    fn has_busy_line(&self) -> bool {
        self.lines.busy.is_some()
    }

    fn set_fallback_delay(&mut self, delay_ms: u32) {
        self.lines.fallback_delay_ms = delay_ms;
    }

    fn poll_ready(&mut self, elapsed_ms: u32, timeout_ms: u32) -> Readiness {
        self.lines.poll_ready(elapsed_ms, timeout_ms)
    }
}

/// Transport over an embedded-hal [`SpiDevice`]
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`] (owns chip-select)
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Optional reset pin implementing [`OutputPin`]
/// * `BUSY` - Optional busy pin implementing [`InputPin`]
pub struct SpiInterface<SPI, DC, RST, BUSY> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset and busy
    lines: ControlLines<RST, BUSY>,
}

impl<SPI, DC, RST, BUSY, PinErr> SpiInterface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    /// Create a new interface
    pub fn new(spi: SPI, dc: DC, rst: Option<RST>, busy: Option<BUSY>) -> Self {
        Self {
            spi,
            dc,
            lines: ControlLines::new(rst, busy),
        }
    }

    /// Set busy pin polarity
    ///
    /// Default is active-high.
    pub fn set_busy_active_high(&mut self, active_high: bool) -> &mut Self {
        self.lines.busy_active_high = active_high;
        self
    }

    /// Release the SPI device and pins
    pub fn release(self) -> (SPI, DC, Option<RST>, Option<BUSY>) {
        (self.spi, self.dc, self.lines.rst, self.lines.busy)
    }
}

impl<SPI, DC, RST, BUSY, PinErr> PanelInterface for SpiInterface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D, hold_ms: u32) -> ResetKind {
        if self.lines.hardware_reset(delay, hold_ms) {
            return ResetKind::Hardware;
        }
        if let Err(e) = self.send_command(SOFT_RESET) {
            log::warn!("software reset failed: {e:?}");
        }
        delay.delay_ms(hold_ms);
        ResetKind::Software
    }

    fn has_busy_line(&self) -> bool {
        self.lines.busy.is_some()
    }

    fn set_fallback_delay(&mut self, delay_ms: u32) {
        self.lines.fallback_delay_ms = delay_ms;
    }

    fn poll_ready(&mut self, elapsed_ms: u32, timeout_ms: u32) -> Readiness {
        self.lines.poll_ready(elapsed_ms, timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};
    use embedded_hal::digital::ErrorType;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct MockError;

    impl embedded_hal::digital::Error for MockError {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl embedded_hal::spi::Error for MockError {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Line {
        Clk,
        Mosi,
        Cs,
        Dc,
        Rst,
    }

    type Events = Rc<RefCell<Vec<(Line, bool)>>>;

    /// Output pin that records every level change; fails once `fail_after` writes are used up
    struct MockPin {
        line: Line,
        events: Events,
        fail_after: Option<Rc<Cell<u32>>>,
    }

    impl MockPin {
        fn new(line: Line, events: &Events) -> Self {
            Self {
                line,
                events: events.clone(),
                fail_after: None,
            }
        }

        fn set(&mut self, level: bool) -> Result<(), MockError> {
            if let Some(budget) = &self.fail_after {
                if budget.get() == 0 {
                    return Err(MockError);
                }
                budget.set(budget.get() - 1);
            }
            self.events.borrow_mut().push((self.line, level));
            Ok(())
        }
    }

    impl ErrorType for MockPin {
        type Error = MockError;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.set(false)
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.set(true)
        }
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(false)
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(true)
        }
    }

    /// Busy pin that stays busy for a number of reads (`None` = forever)
    struct MockBusy {
        busy_reads: Option<u32>,
        reads: u32,
        broken: bool,
    }

    impl MockBusy {
        fn busy_for(reads: Option<u32>) -> Self {
            Self {
                busy_reads: reads,
                reads: 0,
                broken: false,
            }
        }
    }

    impl ErrorType for MockBusy {
        type Error = MockError;
    }

    impl InputPin for MockBusy {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.broken {
                return Err(MockError);
            }
            self.reads += 1;
            Ok(self.busy_reads.is_none_or(|n| self.reads <= n))
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    impl MockDelay {
        fn total_ms(&self) -> u64 {
            self.total_ns / 1_000_000
        }
    }

    type SoftBus = SoftSpiInterface<MockPin, MockPin, MockPin, MockPin, MockPin, MockBusy>;

    fn soft_bus(events: &Events, busy: Option<MockBusy>, with_reset: bool) -> SoftBus {
        SoftSpiInterface::new(
            MockPin::new(Line::Clk, events),
            MockPin::new(Line::Mosi, events),
            MockPin::new(Line::Cs, events),
            MockPin::new(Line::Dc, events),
            with_reset.then(|| MockPin::new(Line::Rst, events)),
            busy,
        )
    }

    /// Decode recorded pin events into (dc level, bytes) frames
    fn decode(events: &[(Line, bool)]) -> Vec<(bool, Vec<u8>)> {
        let mut frames = Vec::new();
        let (mut dc, mut mosi, mut selected) = (true, false, false);
        let (mut bits, mut current) = (0u8, 0u8);
        let mut bytes = Vec::new();
        for &(line, level) in events {
            match line {
                Line::Dc => dc = level,
                Line::Mosi => mosi = level,
                Line::Cs if !level => {
                    selected = true;
                    bytes.clear();
                }
                Line::Cs => {
                    if selected {
                        frames.push((dc, core::mem::take(&mut bytes)));
                    }
                    selected = false;
                }
                Line::Clk if level && selected => {
                    current = (current << 1) | u8::from(mosi);
                    bits += 1;
                    if bits == 8 {
                        bytes.push(current);
                        bits = 0;
                        current = 0;
                    }
                }
                _ => {}
            }
        }
        frames
    }

    #[test]
    fn test_new_drives_idle_levels() {
        let events = Events::default();
        let _bus = soft_bus(&events, None, false);
        assert_eq!(
            events.borrow().as_slice(),
            &[(Line::Cs, true), (Line::Clk, false), (Line::Dc, true)]
        );
    }

    #[test]
    fn test_soft_spi_command_and_data_framing() {
        let events = Events::default();
        let mut bus = soft_bus(&events, None, false);
        events.borrow_mut().clear();

        bus.send_command(0x12).unwrap();
        bus.send_data(&[0xA5, 0x01]).unwrap();

        let frames = decode(&events.borrow());
        assert_eq!(
            frames,
            alloc::vec![(false, alloc::vec![0x12]), (true, alloc::vec![0xA5, 0x01])]
        );
        // Bus ends idle: chip released, DC back high
        let log = events.borrow();
        let last_cs = log.iter().rev().find(|(l, _)| *l == Line::Cs);
        assert_eq!(last_cs, Some(&(Line::Cs, true)));
    }

    #[test]
    fn test_soft_spi_failure_releases_chip_select() {
        let events = Events::default();
        let mut bus = soft_bus(&events, None, false);
        // dc, cs low, then the first clock edge fails
        bus.clk.fail_after = Some(Rc::new(Cell::new(0)));
        events.borrow_mut().clear();

        let result = bus.send_data(&[0xFF]);
        assert!(matches!(result, Err(InterfaceError::Pin(MockError))));
        let log = events.borrow();
        assert_eq!(log.last(), Some(&(Line::Cs, true)));
    }

    #[test]
    fn test_hardware_reset_pulses_line() {
        let events = Events::default();
        let mut bus = soft_bus(&events, None, true);
        events.borrow_mut().clear();
        let mut delay = MockDelay::default();

        assert_eq!(bus.reset(&mut delay, 10), ResetKind::Hardware);
        assert_eq!(
            events.borrow().as_slice(),
            &[(Line::Rst, false), (Line::Rst, true)]
        );
        assert_eq!(delay.total_ms(), 20);
    }

    #[test]
    fn test_software_reset_without_pin() {
        let events = Events::default();
        let mut bus = soft_bus(&events, None, false);
        events.borrow_mut().clear();
        let mut delay = MockDelay::default();

        assert_eq!(bus.reset(&mut delay, 10), ResetKind::Software);
        assert_eq!(
            decode(&events.borrow()),
            alloc::vec![(false, alloc::vec![SOFT_RESET])]
        );
    }

    #[test]
    fn test_poll_ready_with_busy_line() {
        let events = Events::default();
        let mut bus = soft_bus(&events, Some(MockBusy::busy_for(Some(2))), false);
        assert!(bus.has_busy_line());
        assert_eq!(bus.poll_ready(0, 100), Readiness::Pending);
        assert_eq!(bus.poll_ready(1, 100), Readiness::Pending);
        assert_eq!(bus.poll_ready(2, 100), Readiness::Ready);
    }

    #[test]
    fn test_wait_until_ready_times_out() {
        let events = Events::default();
        let mut bus = soft_bus(&events, Some(MockBusy::busy_for(None)), false);
        let mut delay = MockDelay::default();
        assert_eq!(bus.wait_until_ready(&mut delay, 50), Readiness::TimedOut);
        assert_eq!(delay.total_ms(), 50);
    }

    #[test]
    fn test_busy_active_low_polarity() {
        let events = Events::default();
        // Reads high forever; with active-low polarity that means idle
        let mut bus = soft_bus(&events, Some(MockBusy::busy_for(None)), false);
        bus.set_busy_active_high(false);
        assert_eq!(bus.poll_ready(0, 10), Readiness::Ready);
    }

    #[test]
    fn test_no_busy_line_uses_fallback_delay() {
        let events = Events::default();
        let mut bus = soft_bus(&events, None, false);
        bus.set_fallback_delay(25);
        assert!(!bus.has_busy_line());

        // Never times out, even with a tiny timeout
        assert_eq!(bus.poll_ready(24, 1), Readiness::Pending);
        assert_eq!(bus.poll_ready(25, 1), Readiness::Ready);

        let mut delay = MockDelay::default();
        assert_eq!(bus.wait_until_ready(&mut delay, 1), Readiness::Ready);
        assert_eq!(delay.total_ms(), 25);
    }

    #[test]
    fn test_broken_busy_pin_falls_back_to_delay() {
        let events = Events::default();
        let mut busy = MockBusy::busy_for(None);
        busy.broken = true;
        let mut bus = soft_bus(&events, Some(busy), false);
        bus.set_fallback_delay(5);
        assert_eq!(bus.poll_ready(0, 100), Readiness::Pending);
        assert_eq!(bus.poll_ready(5, 100), Readiness::Ready);
    }

    struct MockSpi {
        written: Rc<RefCell<Vec<Vec<u8>>>>,
    }

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = MockError;
    }

    impl SpiDevice for MockSpi {
        fn transaction(
            &mut self,
            operations: &mut [embedded_hal::spi::Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let embedded_hal::spi::Operation::Write(bytes) = op {
                    self.written.borrow_mut().push(bytes.to_vec());
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_spi_interface_sets_dc() {
        let events = Events::default();
        let written = Rc::new(RefCell::new(Vec::new()));
        let mut bus: SpiInterface<MockSpi, MockPin, MockPin, MockBusy> = SpiInterface::new(
            MockSpi {
                written: written.clone(),
            },
            MockPin::new(Line::Dc, &events),
            None,
            None,
        );

        bus.send_command(0x20).unwrap();
        bus.send_data(&[1, 2, 3]).unwrap();

        assert_eq!(
            written.borrow().as_slice(),
            &[alloc::vec![0x20], alloc::vec![1, 2, 3]]
        );
        assert_eq!(
            events.borrow().as_slice(),
            &[(Line::Dc, false), (Line::Dc, true)]
        );
        assert!(!bus.has_busy_line());
    }
}
