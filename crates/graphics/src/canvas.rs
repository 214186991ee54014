use geometry::{Extent, Point, Rect};

use crate::Color;

bitflags::bitflags! {
    /// Placement of text drawn with [`Canvas::text_in_rect`].
    ///
    /// The bit values match the GDI `DT_*` flags so the Win32 back-end can pass
    /// them through unchanged. Other back-ends interpret them with
    /// [`approximate_text_origin`].
    pub struct TextAlign: u32 {
        const LEFT = 0x00;
        const CENTER = 0x01;
        const VCENTER = 0x04;
        const SINGLE_LINE = 0x20;
    }
}

impl Default for TextAlign {
    fn default() -> Self {
        TextAlign::LEFT | TextAlign::SINGLE_LINE
    }
}

/// A font face and pixel size. Also the key of the native font cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    pub name: String,
    pub size: u32,
}

impl Font {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("Arial", 16)
    }
}

/// The drawing verbs available to a [`Renderable`](crate::Renderable).
///
/// A canvas always targets an off-screen surface the size of the window's
/// client area; the window presents it once every item has drawn.
pub trait Canvas {
    /// The size of the surface being drawn to.
    fn extent(&self) -> Extent;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draws a one pixel outline along the edges of `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Color);

    fn line(&mut self, from: Point, to: Point, color: Color, width: u32);

    /// Draws a single run of text with its top-left corner at `at`.
    fn text(&mut self, at: Point, text: &str, color: Color, font: &Font);

    /// Draws text inside `rect`, positioned according to `align`.
    fn text_in_rect(&mut self, rect: Rect, text: &str, color: Color, font: &Font, align: TextAlign);

    fn measure_text(&mut self, text: &str, font: &Font) -> Extent;
}

/// Estimates the size of `text` when no shaping engine is available: every
/// character is half the font size wide, and a line is exactly the font size
/// tall.
#[must_use]
pub fn approximate_text_extent(text: &str, font: &Font) -> Extent {
    let size = i32::try_from(font.size).unwrap_or(i32::MAX);
    let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    Extent::new(chars.saturating_mul(size / 2), size)
}

/// Computes the baseline origin of `text` placed in `rect` according to
/// `align`, using [`approximate_text_extent`] for the text size.
#[must_use]
pub fn approximate_text_origin(rect: Rect, text: &str, font: &Font, align: TextAlign) -> Point {
    let size = approximate_text_extent(text, font);

    let x = if align.contains(TextAlign::CENTER) {
        rect.left() + (rect.width() - size.width) / 2
    } else {
        rect.left()
    };

    let y = if align.contains(TextAlign::VCENTER) {
        rect.top() + (rect.height() + size.height) / 2
    } else {
        rect.top() + size.height
    };

    Point::new(x, y)
}
