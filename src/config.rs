//! Controller configuration types and builder

pub use crate::error::ConfigError;
use crate::model::Model;
use crate::policy::{OverrideCounting, UpdateMode};

/// Longest accepted reset pulse in milliseconds
pub const MAX_RESET_DURATION_MS: u32 = 500;

/// Default polling interval (60 s)
pub const DEFAULT_POLLING_INTERVAL_MS: u32 = 60_000;

/// Default number of partial/fast updates between forced full refreshes
pub const DEFAULT_FULL_UPDATE_EVERY: u32 = 10;

/// Panel dimensions in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDimensions` if either side is zero.
    pub fn new(width: u16, height: u16) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels
    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Packed buffer size in bytes for the given bit depth, rounded up
    pub fn buffer_size(&self, bits_per_pixel: u8) -> usize {
        (self.pixels() * bits_per_pixel as usize).div_ceil(8)
    }

    /// Dimensions with width and height swapped
    pub fn transposed(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Rotation of the logical drawing surface relative to the native panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

impl Rotation {
    /// Parse a rotation given in degrees
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRotation` unless `degrees` is 0, 90, 180 or 270.
    pub fn from_degrees(degrees: u16) -> Result<Self, ConfigError> {
        match degrees {
            0 => Ok(Self::Rotate0),
            90 => Ok(Self::Rotate90),
            180 => Ok(Self::Rotate180),
            270 => Ok(Self::Rotate270),
            _ => Err(ConfigError::InvalidRotation { degrees }),
        }
    }

    /// Rotation in degrees
    pub fn degrees(self) -> u16 {
        match self {
            Self::Rotate0 => 0,
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }

    /// Whether width and height trade places
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }
}

/// Controller configuration
///
/// Use [`Builder`] to create one.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Panel model
    pub model: Model,
    /// Rotation of the drawing surface
    pub rotation: Rotation,
    /// Waveform used when nothing forces another one
    pub update_mode: UpdateMode,
    /// Partial/fast updates allowed before a full refresh is forced (0 = never force)
    pub full_update_every: u32,
    /// Interval between periodic ticks in milliseconds
    pub polling_interval_ms: u32,
    /// Reset pulse length in milliseconds
    pub reset_duration_ms: u32,
    /// Put the panel into deep sleep after every update
    pub sleep_between_updates: bool,
    /// Force the first update after construction to use the full waveform
    pub full_refresh_on_boot: bool,
    /// Fill the buffer with white before the draw callback runs
    pub clear_before_draw: bool,
    /// How one-shot overrides affect the refresh counters
    pub override_counting: OverrideCounting,
}

/// Builder for [`Config`]
///
/// # Example
///
/// ```
/// use crowpanel_epd::{Builder, Model, Rotation, UpdateMode};
///
/// let config = Builder::new()
///     .model(Model::CrowPanel4in2)
///     .update_mode(UpdateMode::Partial)
///     .full_update_every(5)
///     .rotation(Rotation::Rotate90)
///     .build();
/// assert!(config.is_ok());
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct Builder {
    model: Option<Model>,
    rotation: Rotation,
    update_mode: UpdateMode,
    full_update_every: u32,
    polling_interval_ms: u32,
    reset_duration_ms: Option<u32>,
    sleep_between_updates: bool,
    full_refresh_on_boot: bool,
    clear_before_draw: bool,
    override_counting: OverrideCounting,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            model: None,
            rotation: Rotation::Rotate0,
            update_mode: UpdateMode::Full,
            full_update_every: DEFAULT_FULL_UPDATE_EVERY,
            polling_interval_ms: DEFAULT_POLLING_INTERVAL_MS,
            // Falls back to the model's reset hold time
            reset_duration_ms: None,
            sleep_between_updates: false,
            full_refresh_on_boot: false,
            clear_before_draw: true,
            override_counting: OverrideCounting::Actual,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the panel model (required)
    pub fn model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the drawing surface rotation
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the configured waveform
    pub fn update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// Set how many partial/fast updates may run before a full one is forced
    ///
    /// 0 disables the forced full refresh.
    pub fn full_update_every(mut self, count: u32) -> Self {
        self.full_update_every = count;
        self
    }

    /// Set the periodic tick interval in milliseconds
    pub fn polling_interval_ms(mut self, interval_ms: u32) -> Self {
        self.polling_interval_ms = interval_ms;
        self
    }

    /// Set the reset pulse length in milliseconds
    pub fn reset_duration_ms(mut self, duration_ms: u32) -> Self {
        self.reset_duration_ms = Some(duration_ms);
        self
    }

    /// Put the panel into deep sleep between updates
    pub fn sleep_between_updates(mut self, value: bool) -> Self {
        self.sleep_between_updates = value;
        self
    }

    /// Force the first update to be a full refresh
    pub fn full_refresh_on_boot(mut self, value: bool) -> Self {
        self.full_refresh_on_boot = value;
        self
    }

    /// Clear the buffer to white before calling the draw callback
    pub fn clear_before_draw(mut self, value: bool) -> Self {
        self.clear_before_draw = value;
        self
    }

    /// Choose how one-shot overrides affect the refresh counters
    pub fn override_counting(mut self, value: OverrideCounting) -> Self {
        self.override_counting = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingModel` if no model was set
    /// - `ConfigError::UnsupportedMode` if the model has no waveform for the configured mode
    /// - `ConfigError::ResetDurationTooLong` if the reset pulse exceeds [`MAX_RESET_DURATION_MS`]
    /// - `ConfigError::InvalidPollingInterval` if the interval is zero
    pub fn build(self) -> Result<Config, ConfigError> {
        let model = self.model.ok_or(ConfigError::MissingModel)?;
        let panel = model.panel();

        if panel.waveform(self.update_mode).is_none() {
            return Err(ConfigError::UnsupportedMode {
                model,
                mode: self.update_mode,
            });
        }

        let reset_duration_ms = self
            .reset_duration_ms
            .unwrap_or(panel.timing.reset_hold_ms);
        if reset_duration_ms > MAX_RESET_DURATION_MS {
            return Err(ConfigError::ResetDurationTooLong {
                duration_ms: reset_duration_ms,
            });
        }

        if self.polling_interval_ms == 0 {
            return Err(ConfigError::InvalidPollingInterval);
        }

        Ok(Config {
            model,
            rotation: self.rotation,
            update_mode: self.update_mode,
            full_update_every: self.full_update_every,
            polling_interval_ms: self.polling_interval_ms,
            reset_duration_ms,
            sleep_between_updates: self.sleep_between_updates,
            full_refresh_on_boot: self.full_refresh_on_boot,
            clear_before_draw: self.clear_before_draw,
            override_counting: self.override_counting,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = Builder::new().model(Model::CrowPanel4in2).build().unwrap();
        assert_eq!(config.update_mode, UpdateMode::Full);
        assert_eq!(config.full_update_every, 10);
        assert_eq!(config.polling_interval_ms, 60_000);
        assert_eq!(config.rotation, Rotation::Rotate0);
        assert_eq!(config.reset_duration_ms, 10);
        assert!(config.clear_before_draw);
        assert!(!config.sleep_between_updates);
        assert_eq!(config.override_counting, OverrideCounting::Actual);
    }

    #[test]
    fn test_builder_missing_model() {
        assert!(matches!(
            Builder::new().build(),
            Err(ConfigError::MissingModel)
        ));
    }

    #[test]
    fn test_builder_rejects_unsupported_mode() {
        let result = Builder::new()
            .model(Model::CrowPanel5in79)
            .update_mode(UpdateMode::Fast)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedMode {
                mode: UpdateMode::Fast,
                ..
            })
        ));
    }

    #[test]
    fn test_builder_reset_duration_limit() {
        let ok = Builder::new()
            .model(Model::CrowPanel4in2)
            .reset_duration_ms(500)
            .build();
        assert_eq!(ok.unwrap().reset_duration_ms, 500);

        let too_long = Builder::new()
            .model(Model::CrowPanel4in2)
            .reset_duration_ms(501)
            .build();
        assert!(matches!(
            too_long,
            Err(ConfigError::ResetDurationTooLong { duration_ms: 501 })
        ));
    }

    #[test]
    fn test_builder_zero_polling_interval() {
        let result = Builder::new()
            .model(Model::CrowPanel4in2)
            .polling_interval_ms(0)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidPollingInterval)));
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0).unwrap(), Rotation::Rotate0);
        assert_eq!(Rotation::from_degrees(270).unwrap(), Rotation::Rotate270);
        assert!(matches!(
            Rotation::from_degrees(45),
            Err(ConfigError::InvalidRotation { degrees: 45 })
        ));
        assert_eq!(Rotation::Rotate180.degrees(), 180);
    }

    #[test]
    fn test_dimensions() {
        assert!(Dimensions::new(0, 10).is_err());
        let dims = Dimensions::new(13, 3).unwrap();
        assert_eq!(dims.buffer_size(1), 5);
        assert_eq!(dims.buffer_size(4), 20);
        assert_eq!(dims.transposed(), Dimensions::new(3, 13).unwrap());
    }
}
