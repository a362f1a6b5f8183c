//! Error types
//!
//! Two classes of failure exist:
//!
//! - [`ConfigError`] - invalid configuration, detected while building the
//!   [`Config`](crate::Config) or constructing the
//!   [`RefreshController`](crate::RefreshController). These are fatal: no
//!   controller is created.
//! - [`Diagnostic`] - runtime trouble on the panel bus (busy timeouts, bus
//!   failures). These never stop the controller; they are logged and kept in
//!   a [`DiagnosticLog`].
//!
//! Low-level transport errors are [`InterfaceError`](crate::InterfaceError).
//!
//! ## Example
//!
//! ```
//! use crowpanel_epd::{Builder, ConfigError};
//!
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(ConfigError::MissingModel)));
//! ```

use crate::config::MAX_RESET_DURATION_MS;
use crate::controller::State;
use crate::model::Model;
use crate::policy::UpdateMode;

/// Configuration errors, reported before the controller becomes schedulable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No panel model was selected
    MissingModel,
    /// Model name not recognised
    UnknownModel,
    /// Dimensions with a zero side
    InvalidDimensions {
        /// Requested width
        width: u16,
        /// Requested height
        height: u16,
    },
    /// Rotation other than 0, 90, 180 or 270 degrees
    InvalidRotation {
        /// Requested rotation
        degrees: u16,
    },
    /// Bit depth other than 1, 2, 4 or 8
    InvalidBitDepth {
        /// Requested bits per pixel
        bits_per_pixel: u8,
    },
    /// The model has no waveform for the configured mode
    UnsupportedMode {
        /// Selected model
        model: Model,
        /// Configured mode
        mode: UpdateMode,
    },
    /// Reset pulse longer than [`MAX_RESET_DURATION_MS`]
    ResetDurationTooLong {
        /// Requested duration
        duration_ms: u32,
    },
    /// Polling interval of zero
    InvalidPollingInterval,
    /// Pixel buffer storage is smaller than the panel needs
    BufferTooSmall {
        /// Required size in bytes
        required: usize,
        /// Provided size in bytes
        provided: usize,
    },
    /// The model needs a busy line but none is wired
    MissingBusyLine {
        /// Selected model
        model: Model,
    },
    /// The configured mode compares against the previous frame but no
    /// storage for it was provided
    MissingPreviousFrame {
        /// Selected model
        model: Model,
        /// Configured mode
        mode: UpdateMode,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingModel => write!(f, "Panel model must be specified"),
            Self::UnknownModel => write!(f, "Unknown panel model"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions: {width}x{height}")
            }
            Self::InvalidRotation { degrees } => write!(f, "Invalid rotation: {degrees}"),
            Self::InvalidBitDepth { bits_per_pixel } => {
                write!(f, "Invalid bit depth: {bits_per_pixel}")
            }
            Self::UnsupportedMode { model, mode } => {
                write!(f, "Model {model} has no {} waveform", mode.name())
            }
            Self::ResetDurationTooLong { duration_ms } => write!(
                f,
                "Reset duration {duration_ms} ms exceeds {MAX_RESET_DURATION_MS} ms"
            ),
            Self::InvalidPollingInterval => write!(f, "Polling interval must be non-zero"),
            Self::BufferTooSmall { required, provided } => write!(
                f,
                "Buffer too small: required {required} bytes, provided {provided}"
            ),
            Self::MissingBusyLine { model } => {
                write!(f, "Model {model} requires a busy pin")
            }
            Self::MissingPreviousFrame { model, mode } => write!(
                f,
                "Model {model} needs a previous-frame buffer for {} updates",
                mode.name()
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Non-fatal runtime problem observed during an update cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// The busy line did not report ready within the timeout; the cycle went on
    TransportTimeout {
        /// State the controller was waiting in
        state: State,
    },
    /// A bus write failed; the rest of the cycle was abandoned
    BusFailure {
        /// State the failure happened in
        state: State,
    },
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TransportTimeout { state } => {
                write!(f, "Busy timeout while {}", state.name())
            }
            Self::BusFailure { state } => write!(f, "Bus failure while {}", state.name()),
        }
    }
}

/// Running record of [`Diagnostic`]s
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticLog {
    transport_timeouts: u32,
    bus_failures: u32,
    dropped_ticks: u32,
    last: Option<Diagnostic>,
}

impl DiagnosticLog {
    /// Record a diagnostic
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::TransportTimeout { .. } => {
                self.transport_timeouts = self.transport_timeouts.saturating_add(1);
            }
            Diagnostic::BusFailure { .. } => {
                self.bus_failures = self.bus_failures.saturating_add(1);
            }
        }
        self.last = Some(diagnostic);
    }

    /// Count a tick that arrived while a cycle was in flight
    pub fn record_dropped_tick(&mut self) {
        self.dropped_ticks = self.dropped_ticks.saturating_add(1);
    }

    /// Busy timeouts seen so far
    pub fn transport_timeouts(&self) -> u32 {
        self.transport_timeouts
    }

    /// Bus failures seen so far
    pub fn bus_failures(&self) -> u32 {
        self.bus_failures
    }

    /// Ticks dropped because a cycle was still running
    pub fn dropped_ticks(&self) -> u32 {
        self.dropped_ticks
    }

    /// Most recent diagnostic
    pub fn last(&self) -> Option<Diagnostic> {
        self.last
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
