//! Graphics support via embedded-graphics
//!
//! [`PixelBuffer`] implements the
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait, so a
//! draw callback can render text, primitives and images from the
//! embedded-graphics ecosystem straight into the frame.
//!
//! [`BinaryColor::On`] is black ink, [`BinaryColor::Off`] is white. The target
//! size is the logical (rotated) size; pixels outside it are skipped.
//!
//! ## Example
//!
//! ```
//! use embedded_graphics::{
//!     prelude::*,
//!     pixelcolor::BinaryColor,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//! use crowpanel_epd::{Model, PixelBuffer, Rotation};
//!
//! let mut storage = [0xFFu8; 400 * 300 / 8];
//! let mut buffer = match PixelBuffer::for_model(&mut storage[..], Model::CrowPanel4in2, Rotation::Rotate0) {
//!     Ok(buffer) => buffer,
//!     Err(_) => return,
//! };
//!
//! let _ = Rectangle::new(Point::new(10, 10), Size::new(50, 20))
//!     .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
//!     .draw(&mut buffer);
//! assert_eq!(buffer.size(), Size::new(400, 300));
//! ```

use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions as _, OriginDimensions, Size},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
};

use crate::buffer::PixelBuffer;
use crate::color::Color;

impl<B> DrawTarget for PixelBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Negative coordinates are off-surface
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            self.set_color(x, y, Color::from(color));
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(Color::from(color));
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let color = Color::from(color);
        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_color(x as u32, y as u32, color);
            }
        }
        Ok(())
    }
}

impl<B> OriginDimensions for PixelBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let dims = self.dimensions();
        Size::new(u32::from(dims.width), u32::from(dims.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Dimensions, Rotation};
    use crate::model::Model;
    use embedded_graphics::{
        prelude::*,
        primitives::{Line, PrimitiveStyle},
    };

    fn buffer(rotation: Rotation) -> PixelBuffer<alloc::vec::Vec<u8>> {
        let native = Dimensions::new(16, 8).unwrap();
        PixelBuffer::new(alloc::vec![0xFF; 16], native, 1, rotation).unwrap()
    }

    #[test]
    fn test_size_follows_rotation() {
        assert_eq!(buffer(Rotation::Rotate0).size(), Size::new(16, 8));
        assert_eq!(buffer(Rotation::Rotate90).size(), Size::new(8, 16));

        let storage = alloc::vec![0u8; Model::CrowPanel4in2.panel().buffer_size()];
        let panel = PixelBuffer::for_model(storage, Model::CrowPanel4in2, Rotation::Rotate270).unwrap();
        assert_eq!(panel.size(), Size::new(300, 400));
    }

    #[test]
    fn test_draw_line_sets_black_bits() {
        let mut buf = buffer(Rotation::Rotate0);
        Line::new(Point::new(0, 1), Point::new(15, 1))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut buf)
            .unwrap();
        assert_eq!(&buf.as_bytes()[..6], &[0xFF, 0xFF, 0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_negative_and_out_of_range_points_are_skipped() {
        let mut buf = buffer(Rotation::Rotate0);
        let pixels = [
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(0, -1), BinaryColor::On),
            Pixel(Point::new(16, 0), BinaryColor::On),
            Pixel(Point::new(0, 8), BinaryColor::On),
        ];
        buf.draw_iter(pixels).unwrap();
        assert!(buf.as_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_clear_and_fill_solid() {
        let mut buf = buffer(Rotation::Rotate180);
        buf.clear(BinaryColor::On).unwrap();
        assert!(buf.as_bytes().iter().all(|&b| b == 0x00));

        buf.clear(BinaryColor::Off).unwrap();
        // Logical top-left 8x1 lands on the native bottom-right byte
        buf.fill_solid(
            &Rectangle::new(Point::new(0, 0), Size::new(8, 1)),
            BinaryColor::On,
        )
        .unwrap();
        assert_eq!(buf.as_bytes()[15], 0x00);
        assert_eq!(buf.as_bytes().iter().filter(|&&b| b == 0x00).count(), 1);

        // Clipped to the surface
        buf.fill_solid(
            &Rectangle::new(Point::new(12, 6), Size::new(10, 10)),
            BinaryColor::On,
        )
        .unwrap();
        assert_eq!(buf.pixel(15, 7), Some(0));
    }
}
