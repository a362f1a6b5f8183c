//! Panel model table
//!
//! Everything that differs between CrowPanel variants is static data: native
//! resolution, the init command stream, the command bytes of each waveform,
//! how RAM is laid out and the timing constants. A [`Model`] is picked once
//! when the configuration is built and resolves to one [`PanelModel`] entry.
//!
//! ```
//! use crowpanel_epd::{Model, UpdateMode};
//!
//! let model: Model = "4.2in".parse().unwrap_or(Model::CrowPanel4in2);
//! let panel = model.panel();
//! assert_eq!((panel.native.width, panel.native.height), (400, 300));
//! assert!(panel.waveform(UpdateMode::Partial).is_some());
//! ```

use core::str::FromStr;

use crate::command::{
    BORDER_FULL, BORDER_PARTIAL, BORDER_WAVEFORM, CTRL1_BYPASS_OLD, CTRL1_CASCADE,
    CTRL1_NORMAL, CTRL1_SINGLE_CHIP, CTRL2_FAST, CTRL2_FULL, CTRL2_PARTIAL, DATA_ENTRY_MODE,
    DISPLAY_UPDATE_CTRL1, DRIVER_OUTPUT_CONTROL, ENTRY_X_DEC_Y_INC, ENTRY_X_INC_Y_INC,
    SET_RAM_X_COUNTER, SET_RAM_X_RANGE, SET_RAM_Y_COUNTER, SET_RAM_Y_RANGE, SOFT_RESET,
    TARGET_PRIMARY, TARGET_SECONDARY,
};
use crate::config::Dimensions;
use crate::error::ConfigError;
use crate::policy::UpdateMode;

/// One command of an init sequence
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InitStep {
    /// Command byte
    pub command: u8,
    /// Parameter bytes sent after the command
    pub data: &'static [u8],
    /// Delay after the step in milliseconds
    pub delay_ms: u8,
}

impl InitStep {
    const fn new(command: u8, data: &'static [u8]) -> Self {
        Self {
            command,
            data,
            delay_ms: 0,
        }
    }

    const fn with_delay(command: u8, delay_ms: u8) -> Self {
        Self {
            command,
            data: &[],
            delay_ms,
        }
    }
}

/// Command bytes selecting one refresh waveform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waveform {
    /// Border waveform control value
    pub border: u8,
    /// Display update control 1 parameters
    pub update_ctrl1: [u8; 2],
    /// Display update control 2 value sent right before master activation
    pub update_ctrl2: u8,
}

/// How the controller RAM maps onto the frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RamLayout {
    /// One controller, frame streamed row by row
    Linear,
    /// Two controllers side by side
    ///
    /// The primary one receives the left `ceil(wb / 2)` bytes of each row and
    /// the secondary one the right `ceil(wb / 2)` bytes starting at `wb / 2`,
    /// where `wb` is the row width in bytes. With an odd `wb` the middle byte
    /// goes to both.
    Cascade,
}

/// Timing constants, all in milliseconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    /// Reset line low time and recovery time after release
    pub reset_hold_ms: u32,
    /// Busy timeout after reset and init
    pub wake_timeout_ms: u32,
    /// Busy timeout after master activation
    pub refresh_timeout_ms: u32,
    /// Fixed wait used instead of busy polling when no busy line is wired
    pub fallback_delay_ms: u32,
    /// Delay between master activation and the first busy poll
    pub latch_settle_ms: u32,
}

/// Static description of one panel model
#[derive(Debug, PartialEq)]
pub struct PanelModel {
    /// Model name as used in configuration
    pub name: &'static str,
    /// Native (unrotated) resolution
    pub native: Dimensions,
    /// Bits per pixel in the frame buffer
    pub bits_per_pixel: u8,
    /// Commands replayed after every reset
    pub init_sequence: &'static [InitStep],
    /// Full refresh waveform
    pub full: Waveform,
    /// Partial refresh waveform, if the panel has one
    pub partial: Option<Waveform>,
    /// Fast refresh waveform, if the panel has one
    pub fast: Option<Waveform>,
    /// RAM layout
    pub layout: RamLayout,
    /// Whether native X runs right to left in RAM
    pub mirror_x: bool,
    /// Whether partial and fast waveforms compare against the previous frame
    pub needs_previous_frame: bool,
    /// Whether the panel cannot be driven on fixed delays alone
    pub requires_busy_line: bool,
    /// Timing constants
    pub timing: Timing,
}

impl PanelModel {
    /// Waveform for a refresh mode, `None` if the panel lacks it
    pub fn waveform(&self, mode: UpdateMode) -> Option<&Waveform> {
        match mode {
            UpdateMode::Full => Some(&self.full),
            UpdateMode::Partial => self.partial.as_ref(),
            UpdateMode::Fast => self.fast.as_ref(),
        }
    }

    /// Frame buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.native.buffer_size(self.bits_per_pixel)
    }

    /// Row width in bytes
    pub fn row_bytes(&self) -> usize {
        (self.native.width as usize * self.bits_per_pixel as usize).div_ceil(8)
    }
}

const SSD1683_TIMING: Timing = Timing {
    reset_hold_ms: 10,
    wake_timeout_ms: 60_000,
    refresh_timeout_ms: 60_000,
    fallback_delay_ms: 4_000,
    latch_settle_ms: 10,
};

const INIT_4P2IN: &[InitStep] = &[
    InitStep::new(SOFT_RESET, &[]),
    // MUX = 300 gate lines
    InitStep::new(DRIVER_OUTPUT_CONTROL, &[0x2B, 0x01, 0x00]),
    InitStep::new(DISPLAY_UPDATE_CTRL1, &[CTRL1_BYPASS_OLD, CTRL1_SINGLE_CHIP]),
    InitStep::new(BORDER_WAVEFORM, &[BORDER_FULL]),
    InitStep::new(DATA_ENTRY_MODE, &[ENTRY_X_INC_Y_INC]),
    // 50 bytes = 400 px
    InitStep::new(SET_RAM_X_RANGE, &[0x00, 0x31]),
    // rows 0..=299
    InitStep::new(SET_RAM_Y_RANGE, &[0x00, 0x00, 0x2B, 0x01]),
    InitStep::new(SET_RAM_X_COUNTER, &[0x00]),
    InitStep::new(SET_RAM_Y_COUNTER, &[0x00, 0x00]),
];

// The MUX is left at its default; setting it breaks the cascaded pair.
const INIT_5P79IN: &[InitStep] = &[
    InitStep::with_delay(SOFT_RESET, 10),
    InitStep::new(DATA_ENTRY_MODE | TARGET_PRIMARY, &[ENTRY_X_INC_Y_INC]),
    InitStep::new(SET_RAM_X_RANGE | TARGET_PRIMARY, &[0x00, 0x31]),
    InitStep::new(SET_RAM_Y_RANGE | TARGET_PRIMARY, &[0x00, 0x00, 0x0F, 0x01]),
    // secondary chip fills right to left
    InitStep::new(DATA_ENTRY_MODE | TARGET_SECONDARY, &[ENTRY_X_DEC_Y_INC]),
    InitStep::new(SET_RAM_X_RANGE | TARGET_SECONDARY, &[0x31, 0x00]),
    InitStep::new(SET_RAM_Y_RANGE | TARGET_SECONDARY, &[0x00, 0x00, 0x0F, 0x01]),
];

/// CrowPanel 4.2" (400x300, single SSD1683)
pub const CROWPANEL_4P2IN: PanelModel = PanelModel {
    name: "4.2in",
    native: Dimensions {
        width: 400,
        height: 300,
    },
    bits_per_pixel: 1,
    init_sequence: INIT_4P2IN,
    full: Waveform {
        border: BORDER_FULL,
        update_ctrl1: [CTRL1_BYPASS_OLD, CTRL1_SINGLE_CHIP],
        update_ctrl2: CTRL2_FULL,
    },
    partial: Some(Waveform {
        border: BORDER_PARTIAL,
        update_ctrl1: [CTRL1_NORMAL, CTRL1_SINGLE_CHIP],
        update_ctrl2: CTRL2_PARTIAL,
    }),
    fast: Some(Waveform {
        border: BORDER_PARTIAL,
        update_ctrl1: [CTRL1_NORMAL, CTRL1_SINGLE_CHIP],
        update_ctrl2: CTRL2_FAST,
    }),
    layout: RamLayout::Linear,
    mirror_x: true,
    needs_previous_frame: true,
    requires_busy_line: false,
    timing: SSD1683_TIMING,
};

/// CrowPanel 5.79" (792x272, two SSD1683 in cascade)
pub const CROWPANEL_5P79IN: PanelModel = PanelModel {
    name: "5.79in",
    native: Dimensions {
        width: 792,
        height: 272,
    },
    bits_per_pixel: 1,
    init_sequence: INIT_5P79IN,
    full: Waveform {
        border: BORDER_FULL,
        update_ctrl1: [CTRL1_BYPASS_OLD, CTRL1_CASCADE],
        update_ctrl2: CTRL2_FULL,
    },
    partial: Some(Waveform {
        border: BORDER_PARTIAL,
        update_ctrl1: [CTRL1_NORMAL, CTRL1_CASCADE],
        update_ctrl2: CTRL2_PARTIAL,
    }),
    fast: None,
    layout: RamLayout::Cascade,
    mirror_x: true,
    needs_previous_frame: true,
    // Two chips finish at different times; a fixed delay cannot cover both.
    requires_busy_line: true,
    timing: SSD1683_TIMING,
};

/// Supported panel models
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    /// CrowPanel 4.2"
    CrowPanel4in2,
    /// CrowPanel 5.79"
    CrowPanel5in79,
}

impl Model {
    /// Static description of the model
    pub fn panel(self) -> &'static PanelModel {
        match self {
            Self::CrowPanel4in2 => &CROWPANEL_4P2IN,
            Self::CrowPanel5in79 => &CROWPANEL_5P79IN,
        }
    }

    /// Model name as used in configuration
    pub fn name(self) -> &'static str {
        self.panel().name
    }
}

impl FromStr for Model {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("4.2in") || s.eq_ignore_ascii_case("4.20in") {
            Ok(Self::CrowPanel4in2)
        } else if s.eq_ignore_ascii_case("5.79in") {
            Ok(Self::CrowPanel5in79)
        } else {
            Err(ConfigError::UnknownModel)
        }
    }
}

impl core::fmt::Display for Model {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_from_str() {
        assert_eq!("4.2in".parse::<Model>().unwrap(), Model::CrowPanel4in2);
        assert_eq!("4.20IN".parse::<Model>().unwrap(), Model::CrowPanel4in2);
        assert_eq!("5.79in".parse::<Model>().unwrap(), Model::CrowPanel5in79);
        assert!(matches!(
            "7.5in".parse::<Model>(),
            Err(ConfigError::UnknownModel)
        ));
    }

    #[test]
    fn test_buffer_sizes() {
        assert_eq!(CROWPANEL_4P2IN.buffer_size(), 400 * 300 / 8);
        assert_eq!(CROWPANEL_5P79IN.buffer_size(), 792 * 272 / 8);
        assert_eq!(CROWPANEL_5P79IN.row_bytes(), 99);
    }

    #[test]
    fn test_waveform_lookup() {
        let panel = Model::CrowPanel5in79.panel();
        assert_eq!(panel.waveform(UpdateMode::Full), Some(&panel.full));
        assert!(panel.waveform(UpdateMode::Partial).is_some());
        assert!(panel.waveform(UpdateMode::Fast).is_none());
    }

    #[test]
    fn test_cascade_waveforms_select_cascade_mode() {
        let panel = Model::CrowPanel5in79.panel();
        assert_eq!(panel.full.update_ctrl1[1], CTRL1_CASCADE);
        assert_eq!(panel.layout, RamLayout::Cascade);
    }
}
