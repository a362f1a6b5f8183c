//! Coordinate rotation utilities
//!
//! Drawing happens in logical coordinates: the panel as the user sees it after
//! rotation. The frame buffer is always laid out in native panel order. This
//! module maps one onto the other.
//!
//! ## Rotation Modes
//!
//! - **Rotate0**: logical and native coordinates are equal
//! - **Rotate90**: 90° clockwise, logical width is the native height
//! - **Rotate180**: origin at the native bottom-right corner
//! - **Rotate270**: 270° clockwise, logical width is the native height
//!
//! ## Example
//!
//! ```
//! use crowpanel_epd::{rotation::to_native, Dimensions, Rotation};
//!
//! let native = Dimensions { width: 400, height: 300 };
//!
//! // Logical (0, 0) at 90° is the native bottom-left corner
//! assert_eq!(to_native(0, 0, native, Rotation::Rotate90), Some((0, 299)));
//!
//! // Logical x = 350 is out of range once width and height swap
//! assert_eq!(to_native(350, 0, native, Rotation::Rotate90), None);
//! ```

use crate::config::{Dimensions, Rotation};

/// Logical drawing size for a native size and rotation
pub fn logical_dimensions(native: Dimensions, rotation: Rotation) -> Dimensions {
    if rotation.swaps_axes() {
        native.transposed()
    } else {
        native
    }
}

/// Map logical `(x, y)` to native panel coordinates
///
/// Returns `None` when the point lies outside the logical bounds.
pub fn to_native(x: u32, y: u32, native: Dimensions, rotation: Rotation) -> Option<(u32, u32)> {
    let logical = logical_dimensions(native, rotation);
    if x >= u32::from(logical.width) || y >= u32::from(logical.height) {
        return None;
    }

    let width = u32::from(native.width);
    let height = u32::from(native.height);

    let point = match rotation {
        Rotation::Rotate0 => (x, y),
        Rotation::Rotate90 => (y, height - 1 - x),
        Rotation::Rotate180 => (width - 1 - x, height - 1 - y),
        Rotation::Rotate270 => (width - 1 - y, x),
    };
    Some(point)
}
