//! Waveform selection
//!
//! Partial and fast waveforms leave a faint ghost of the previous image. The
//! ghost builds up with every such update and only a full refresh clears it,
//! so after `full_update_every` partial/fast updates the next one is forced to
//! [`UpdateMode::Full`] whatever the configured mode is.
//!
//! ```
//! use crowpanel_epd::{decide, UpdateMode};
//!
//! assert_eq!(decide(UpdateMode::Partial, 2, 3, None), UpdateMode::Partial);
//! assert_eq!(decide(UpdateMode::Partial, 3, 3, None), UpdateMode::Full);
//! assert_eq!(decide(UpdateMode::Partial, 3, 3, Some(UpdateMode::Fast)), UpdateMode::Fast);
//! assert_eq!(decide(UpdateMode::Fast, 1_000, 0, None), UpdateMode::Fast);
//! ```

/// Refresh waveform for one update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Full refresh (slowest, flashes, clears ghosting)
    #[default]
    Full,
    /// Partial refresh (no flashing, ghosting accumulates)
    Partial,
    /// Fast refresh (fastest, most ghosting)
    Fast,
}

impl UpdateMode {
    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Fast => "fast",
        }
    }

    /// Whether the waveform leaves ghosting behind
    pub fn accumulates_ghosting(self) -> bool {
        matches!(self, Self::Partial | Self::Fast)
    }
}

/// How a one-shot override affects [`RefreshCounters`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverrideCounting {
    /// Count the waveform that was actually driven: an override to full resets
    /// the counter, an override to partial or fast increments it
    #[default]
    Actual,
    /// Leave the counters untouched on override cycles
    Ignore,
}

/// Pick the waveform for the next update
///
/// An override always wins. Otherwise, once `partial_count` reaches a non-zero
/// `full_update_every`, the result is [`UpdateMode::Full`]. Otherwise the
/// configured mode is used.
pub fn decide(
    configured: UpdateMode,
    partial_count: u32,
    full_update_every: u32,
    override_mode: Option<UpdateMode>,
) -> UpdateMode {
    if let Some(mode) = override_mode {
        return mode;
    }
    if full_update_every > 0 && partial_count >= full_update_every {
        return UpdateMode::Full;
    }
    configured
}

/// Updates since the last full refresh
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshCounters {
    partial_count: u32,
    full_update_every: u32,
}

impl RefreshCounters {
    /// Create counters with the given forced-full threshold (0 disables it)
    pub fn new(full_update_every: u32) -> Self {
        Self {
            partial_count: 0,
            full_update_every,
        }
    }

    /// Partial/fast updates since the last full refresh
    pub fn partial_count(&self) -> u32 {
        self.partial_count
    }

    /// Forced-full threshold
    pub fn full_update_every(&self) -> u32 {
        self.full_update_every
    }

    /// Waveform for the next update
    pub fn decide(&self, configured: UpdateMode, override_mode: Option<UpdateMode>) -> UpdateMode {
        decide(
            configured,
            self.partial_count,
            self.full_update_every,
            override_mode,
        )
    }

    /// Account for a completed update
    pub fn record(&mut self, mode: UpdateMode) {
        match mode {
            UpdateMode::Full => self.partial_count = 0,
            UpdateMode::Partial | UpdateMode::Fast => {
                self.partial_count = self.partial_count.saturating_add(1);
            }
        }
    }
}
