//! Off-screen frame buffer
//!
//! [`PixelBuffer`] wraps caller-provided storage (a static array, a
//! `heapless::Vec`, an `alloc::vec::Vec`, ...) and packs pixels MSB-first in
//! native panel order. The storage is checked once at construction and never
//! resized. Writes go through the rotation transform and are bounds-checked;
//! a write outside the logical surface does nothing.
//!
//! ## Example
//!
//! ```
//! use crowpanel_epd::{Color, Model, PixelBuffer, Rotation};
//!
//! let mut storage = [0u8; 400 * 300 / 8];
//! let mut buffer = match PixelBuffer::for_model(&mut storage[..], Model::CrowPanel4in2, Rotation::Rotate90) {
//!     Ok(buffer) => buffer,
//!     Err(_) => return,
//! };
//! assert_eq!((buffer.width(), buffer.height()), (300, 400));
//!
//! buffer.fill(Color::White);
//! assert!(buffer.set_color(10, 350, Color::Black));
//! assert!(!buffer.set_color(350, 10, Color::Black));
//! ```

use crate::color::{Color, max_value};
use crate::config::{ConfigError, Dimensions, Rotation};
use crate::model::Model;
use crate::rotation::{logical_dimensions, to_native};

/// Packed frame buffer with rotation-aware pixel access
#[derive(Debug)]
pub struct PixelBuffer<B> {
    /// Backing storage, at least `size` bytes
    storage: B,
    /// Native panel resolution
    native: Dimensions,
    /// Rotation of the logical surface
    rotation: Rotation,
    /// Bits per pixel (1, 2, 4 or 8)
    bits_per_pixel: u8,
    /// Whether native X runs right to left
    mirror_x: bool,
    /// Bytes of `storage` in use
    size: usize,
}

impl<B> PixelBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a buffer over `storage`
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidBitDepth` unless `bits_per_pixel` is 1, 2, 4 or 8
    /// - `ConfigError::BufferTooSmall` if `storage` holds fewer than
    ///   `native.buffer_size(bits_per_pixel)` bytes
    pub fn new(
        storage: B,
        native: Dimensions,
        bits_per_pixel: u8,
        rotation: Rotation,
    ) -> Result<Self, ConfigError> {
        if !matches!(bits_per_pixel, 1 | 2 | 4 | 8) {
            return Err(ConfigError::InvalidBitDepth { bits_per_pixel });
        }
        let size = native.buffer_size(bits_per_pixel);
        let provided = storage.as_ref().len();
        if provided < size {
            return Err(ConfigError::BufferTooSmall {
                required: size,
                provided,
            });
        }
        Ok(Self {
            storage,
            native,
            rotation,
            bits_per_pixel,
            mirror_x: false,
            size,
        })
    }

    /// Create a buffer sized and laid out for a panel model
    pub fn for_model(storage: B, model: Model, rotation: Rotation) -> Result<Self, ConfigError> {
        let panel = model.panel();
        let mut buffer = Self::new(storage, panel.native, panel.bits_per_pixel, rotation)?;
        buffer.mirror_x = panel.mirror_x;
        Ok(buffer)
    }

    /// Store native X right to left
    pub fn with_mirror_x(mut self, mirror_x: bool) -> Self {
        self.mirror_x = mirror_x;
        self
    }

    /// Logical width (after rotation)
    pub fn width(&self) -> u16 {
        self.dimensions().width
    }

    /// Logical height (after rotation)
    pub fn height(&self) -> u16 {
        self.dimensions().height
    }

    /// Logical dimensions (after rotation)
    pub fn dimensions(&self) -> Dimensions {
        logical_dimensions(self.native, self.rotation)
    }

    /// Native panel dimensions
    pub fn native_dimensions(&self) -> Dimensions {
        self.native
    }

    /// Rotation of the logical surface
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Bits per pixel
    pub fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    /// Buffer size in bytes
    pub fn len(&self) -> usize {
        self.size
    }

    /// True only for an empty buffer
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Packed frame in native order
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_ref().get(..self.size).unwrap_or(&[])
    }

    /// Set a pixel to a raw value, masked to the bit depth
    ///
    /// Returns `false` (and writes nothing) outside the logical bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u8) -> bool {
        let Some((index, shift)) = self.locate(x, y) else {
            return false;
        };
        let max = max_value(self.bits_per_pixel);
        let Some(byte) = self.storage.as_mut().get_mut(index) else {
            return false;
        };
        *byte = (*byte & !(max << shift)) | ((value & max) << shift);
        true
    }

    /// Set a pixel to a color
    pub fn set_color(&mut self, x: u32, y: u32, color: Color) -> bool {
        let raw = color.raw(self.bits_per_pixel);
        self.set_pixel(x, y, raw)
    }

    /// Raw value of a pixel, `None` outside the logical bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        let (index, shift) = self.locate(x, y)?;
        let byte = self.storage.as_ref().get(index)?;
        Some((byte >> shift) & max_value(self.bits_per_pixel))
    }

    /// Fill the whole buffer with a color
    pub fn fill(&mut self, color: Color) {
        self.fill_bytes(color.fill_byte());
    }

    /// Fill the whole buffer with a byte pattern
    pub fn fill_bytes(&mut self, value: u8) {
        let size = self.size;
        if let Some(bytes) = self.storage.as_mut().get_mut(..size) {
            bytes.fill(value);
        }
    }

    /// Byte index and shift of a logical pixel
    fn locate(&self, x: u32, y: u32) -> Option<(usize, u32)> {
        let (nx, ny) = to_native(x, y, self.native, self.rotation)?;
        let width = u32::from(self.native.width);
        let nx = if self.mirror_x { width - 1 - nx } else { nx };

        let bpp = u32::from(self.bits_per_pixel);
        let bit = (ny as usize * width as usize + nx as usize) * bpp as usize;
        let index = bit / 8;
        if index >= self.size {
            return None;
        }
        let shift = 8 - bpp - (bit % 8) as u32;
        Some((index, shift))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn buffer(w: u16, h: u16, bpp: u8, rotation: Rotation) -> PixelBuffer<alloc::vec::Vec<u8>> {
        let native = Dimensions::new(w, h).unwrap();
        PixelBuffer::new(vec![0xFF; native.buffer_size(bpp)], native, bpp, rotation).unwrap()
    }

    #[test]
    fn test_new_rejects_small_storage() {
        let native = Dimensions::new(16, 2).unwrap();
        let result = PixelBuffer::new(vec![0u8; 3], native, 1, Rotation::Rotate0);
        assert!(matches!(
            result,
            Err(ConfigError::BufferTooSmall {
                required: 4,
                provided: 3
            })
        ));
    }

    #[test]
    fn test_new_rejects_bad_bit_depth() {
        let native = Dimensions::new(8, 1).unwrap();
        let result = PixelBuffer::new(vec![0u8; 8], native, 3, Rotation::Rotate0);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidBitDepth { bits_per_pixel: 3 })
        ));
    }

    #[test]
    fn test_larger_storage_uses_prefix() {
        let native = Dimensions::new(8, 2).unwrap();
        let buf = PixelBuffer::new(vec![0u8; 10], native, 1, Rotation::Rotate0).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.as_bytes().len(), 2);
    }

    #[test]
    fn test_set_pixel_msb_first() {
        let mut buf = buffer(8, 2, 1, Rotation::Rotate0);
        assert!(buf.set_color(0, 0, Color::Black));
        assert!(buf.set_color(7, 1, Color::Black));
        assert_eq!(buf.as_bytes(), &[0x7F, 0xFE]);
        assert_eq!(buf.pixel(0, 0), Some(0));
        assert_eq!(buf.pixel(1, 0), Some(1));
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let mut buf = buffer(8, 2, 1, Rotation::Rotate0);
        assert!(!buf.set_color(8, 0, Color::Black));
        assert!(!buf.set_color(0, 2, Color::Black));
        assert!(!buf.set_color(u32::MAX, u32::MAX, Color::Black));
        assert_eq!(buf.as_bytes(), &[0xFF, 0xFF]);
        assert_eq!(buf.pixel(8, 0), None);
    }

    #[test]
    fn test_rotation_90_swaps_bounds() {
        let mut buf = buffer(16, 8, 1, Rotation::Rotate90);
        assert_eq!((buf.width(), buf.height()), (8, 16));

        // y = 12 is past the native height but inside the rotated surface
        assert!(buf.set_color(0, 12, Color::Black));
        // x = 12 is inside the native width but outside the rotated surface
        assert!(!buf.set_color(12, 0, Color::Black));
        assert_eq!(buf.pixel(0, 12), Some(0));
    }

    #[test]
    fn test_rotation_270_swaps_bounds() {
        let mut buf = buffer(16, 8, 1, Rotation::Rotate270);
        assert_eq!((buf.width(), buf.height()), (8, 16));
        assert!(buf.set_color(7, 15, Color::Black));
        // native (0, 7): last row, first byte, MSB
        assert_eq!(buf.as_bytes()[14], 0x7F);
    }

    #[test]
    fn test_mirror_x() {
        let mut buf = buffer(8, 1, 1, Rotation::Rotate0).with_mirror_x(true);
        assert!(buf.set_color(0, 0, Color::Black));
        assert_eq!(buf.as_bytes(), &[0xFE]);
    }

    #[test]
    fn test_two_bits_per_pixel() {
        let mut buf = buffer(4, 1, 2, Rotation::Rotate0);
        buf.fill_bytes(0x00);
        assert!(buf.set_pixel(1, 0, 0b10));
        assert!(buf.set_pixel(3, 0, 0xFF));
        assert_eq!(buf.as_bytes(), &[0b0010_0011]);
        assert_eq!(buf.pixel(1, 0), Some(0b10));
        assert_eq!(buf.pixel(3, 0), Some(0b11));
    }

    #[test]
    fn test_fill() {
        let mut buf = buffer(8, 2, 1, Rotation::Rotate180);
        buf.fill(Color::Black);
        assert_eq!(buf.as_bytes(), &[0x00, 0x00]);
        buf.fill(Color::White);
        assert_eq!(buf.as_bytes(), &[0xFF, 0xFF]);
    }

    #[test]
    fn test_for_model() {
        let storage = vec![0u8; Model::CrowPanel5in79.panel().buffer_size()];
        let buf = PixelBuffer::for_model(storage, Model::CrowPanel5in79, Rotation::Rotate0).unwrap();
        assert_eq!(buf.dimensions(), Dimensions::new(792, 272).unwrap());
        assert_eq!(buf.native_dimensions(), Dimensions::new(792, 272).unwrap());
        assert_eq!(buf.bits_per_pixel(), 1);
    }
}
