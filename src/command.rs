//! SSD1683 command definitions
//!
//! Command bytes and parameter values used to drive the SSD1683 e-paper
//! controller found on CrowPanel modules. Commands are sent with the DC line
//! low, their parameters with the DC line high.
//!
//! On cascaded panels (two SSD1683 chips sharing one bus) bit 7 of the command
//! byte selects the target chip, see [`TARGET_PRIMARY`] and [`TARGET_SECONDARY`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use crowpanel_epd::{command, PanelInterface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # use crowpanel_epd::SpiInterface;
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
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
//! # let mut interface = SpiInterface::new(MockSpi, MockPin, Some(MockPin), Some(MockPin));
//! # let pixel_data = [0xFFu8; 4];
//! let _ = interface.send_command(command::SOFT_RESET);
//!
//! let _ = interface.send_command(command::WRITE_RAM_BW);
//! let _ = interface.send_data(&pixel_data);
//! ```

// System control

/// Soft reset (0x12)
///
/// Resets all registers to their defaults. BUSY is high while it runs.
pub const SOFT_RESET: u8 = 0x12;

/// Driver output control (0x01)
///
/// Sets the number of gate lines (MUX). 3 bytes: `[mux-1 LSB, mux-1 MSB, scan mode]`.
pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;

/// Border waveform control (0x3C)
pub const BORDER_WAVEFORM: u8 = 0x3C;

/// Deep sleep mode (0x10)
///
/// Only a reset brings the controller back.
pub const DEEP_SLEEP: u8 = 0x10;

// RAM access

/// Data entry mode (0x11)
pub const DATA_ENTRY_MODE: u8 = 0x11;

/// Set RAM X address start/end, in bytes (0x44)
pub const SET_RAM_X_RANGE: u8 = 0x44;

/// Set RAM Y address start/end (0x45)
pub const SET_RAM_Y_RANGE: u8 = 0x45;

/// Set RAM X address counter (0x4E)
pub const SET_RAM_X_COUNTER: u8 = 0x4E;

/// Set RAM Y address counter (0x4F)
pub const SET_RAM_Y_COUNTER: u8 = 0x4F;

/// Write black/white RAM, the new frame (0x24)
pub const WRITE_RAM_BW: u8 = 0x24;

/// Write RED RAM (0x26)
///
/// On black/white panels this plane holds the previous frame that the
/// partial waveforms compare against.
pub const WRITE_RAM_OLD: u8 = 0x26;

// Display update

/// Display update control 1 (0x21)
///
/// 2 bytes: `[RAM content option, source output mode]`.
pub const DISPLAY_UPDATE_CTRL1: u8 = 0x21;

/// Display update control 2 (0x22)
///
/// 1 byte selecting the update sequence (clock/analog on, LUT load, pattern display).
pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22;

/// Master activation (0x20)
///
/// Starts the sequence selected with [`DISPLAY_UPDATE_CTRL2`]. BUSY goes high until done.
pub const MASTER_ACTIVATION: u8 = 0x20;

// Cascade targets

/// Command target bit for the primary controller of a cascaded pair
pub const TARGET_PRIMARY: u8 = 0x00;

/// Command target bit for the secondary controller of a cascaded pair
pub const TARGET_SECONDARY: u8 = 0x80;

// Parameters

/// Border waveform used with the full waveform
pub const BORDER_FULL: u8 = 0x05;
/// Border waveform used with the partial and fast waveforms
pub const BORDER_PARTIAL: u8 = 0x80;

/// Update control 1: bypass the old-frame RAM (treat as 0)
pub const CTRL1_BYPASS_OLD: u8 = 0x40;
/// Update control 1: compare new frame against the old-frame RAM
pub const CTRL1_NORMAL: u8 = 0x00;
/// Update control 1 source mode: single chip
pub const CTRL1_SINGLE_CHIP: u8 = 0x00;
/// Update control 1 source mode: cascade
pub const CTRL1_CASCADE: u8 = 0x10;

/// Update control 2: full update using the OTP waveform
pub const CTRL2_FULL: u8 = 0xF7;
/// Update control 2: partial update (mode 2 waveform)
pub const CTRL2_PARTIAL: u8 = 0xFF;
/// Update control 2: fast update (skips the temperature reload)
pub const CTRL2_FAST: u8 = 0xC7;

/// Deep sleep mode 1, RAM retained
pub const DEEP_SLEEP_MODE_1: u8 = 0x01;

/// Data entry: X increment, Y increment
pub const ENTRY_X_INC_Y_INC: u8 = 0x03;
/// Data entry: X decrement, Y increment
pub const ENTRY_X_DEC_Y_INC: u8 = 0x02;
