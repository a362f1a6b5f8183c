//! Pixel colors
//!
//! E-paper RAM stores ink, not light: a cleared bit is black, a set bit is
//! white. For deeper bit depths the raw value is a gray level where 0 is black
//! and all ones is white.
//!
//! | Color | 1 bpp | 2 bpp | 4 bpp |
//! |-------|-------|-------|-------|
//! | Black | 0     | 0     | 0     |
//! | White | 1     | 3     | 15    |
//!
//! ## Example
//!
//! ```
//! use crowpanel_epd::Color;
//!
//! assert_eq!(Color::Black.raw(1), 0);
//! assert_eq!(Color::White.raw(1), 1);
//! assert_eq!(Color::White.fill_byte(), 0xFF);
//! ```

/// Colors of a black/white panel
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    /// Black ink
    Black,
    /// No ink
    White,
}

impl Color {
    /// Raw pixel value at the given bit depth
    pub fn raw(self, bits_per_pixel: u8) -> u8 {
        match self {
            Self::Black => 0,
            Self::White => max_value(bits_per_pixel),
        }
    }

    /// Byte value that fills a whole buffer with this color
    pub fn fill_byte(self) -> u8 {
        match self {
            Self::Black => 0x00,
            Self::White => 0xFF,
        }
    }
}

/// Largest raw pixel value at the given bit depth
pub(crate) fn max_value(bits_per_pixel: u8) -> u8 {
    match bits_per_pixel {
        0 => 0,
        1..=7 => (1u8 << bits_per_pixel) - 1,
        _ => u8::MAX,
    }
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::BinaryColor> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::BinaryColor) -> Self {
        match color {
            embedded_graphics_core::pixelcolor::BinaryColor::On => Self::Black,
            embedded_graphics_core::pixelcolor::BinaryColor::Off => Self::White,
        }
    }
}
