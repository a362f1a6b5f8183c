//! CrowPanel E-Paper Refresh Controller
//!
//! A periodic refresh controller for the SSD1683-based CrowPanel e-paper
//! panels: the 4.2" single-chip panel and the 5.79" panel made of two chips in
//! cascade.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support, bit-banged or [`SpiDevice`](embedded_hal::spi::SpiDevice) transport
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Full, partial and fast refresh with a forced full refresh against ghosting
//! - Rotation support
//! - Non-blocking busy polling for cooperative main loops
//! - Logging through the `log` facade
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use crowpanel_epd::{Builder, Model, RefreshController, SoftSpiInterface, UpdateMode};
//!
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
//! # let (clk, mosi, cs, dc, rst, busy) = (MockPin, MockPin, MockPin, MockPin, MockPin, MockPin);
//! # let mut delay = MockDelay;
//! let interface = SoftSpiInterface::new(clk, mosi, cs, dc, Some(rst), Some(busy));
//! let config = match Builder::new()
//!     .model(Model::CrowPanel4in2)
//!     .update_mode(UpdateMode::Full)
//!     .full_update_every(10)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut frame = [0xFFu8; 400 * 300 / 8];
//! let mut controller = match RefreshController::new(interface, &mut frame[..], None, config) {
//!     Ok(controller) => controller,
//!     Err(_) => return,
//! };
//! controller.log_config();
//! let _ = controller.update(None, &mut delay);
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// Frame buffer with rotation-aware pixel access
pub mod buffer;
/// Black/white pixel colors
pub mod color;
/// SSD1683 command definitions
pub mod command;
/// Controller configuration types and builder
pub mod config;
/// Update cycle state machine
pub mod controller;
/// Error and diagnostic types
pub mod error;
/// Panel transport abstraction
pub mod interface;
/// Panel model table
pub mod model;
/// Waveform selection
pub mod policy;
/// Coordinate rotation utilities
pub mod rotation;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use buffer::PixelBuffer;
pub use color::Color;
pub use config::{
    Builder, Config, DEFAULT_FULL_UPDATE_EVERY, DEFAULT_POLLING_INTERVAL_MS, Dimensions,
    MAX_RESET_DURATION_MS, Rotation,
};
pub use controller::{CycleOutcome, NoDraw, RefreshController, State};
pub use error::{ConfigError, Diagnostic, DiagnosticLog};
pub use interface::{
    DEFAULT_FALLBACK_DELAY_MS, InterfaceError, PanelInterface, Readiness, ResetKind,
    SoftSpiInterface, SpiInterface,
};
pub use model::{Model, PanelModel};
pub use policy::{OverrideCounting, RefreshCounters, UpdateMode, decide};
