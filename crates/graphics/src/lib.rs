//! Graphics!
//!
//! Everything a window needs to turn a list of drawable items into pixels,
//! without knowing which platform it runs on:
//!
//! - [`Color`], [`Font`] and [`TextAlign`]: the visual attributes of a draw call.
//! - [`Canvas`]: the drawing verbs (rectangles, lines, text, text measurement).
//!   Each platform back-end implements it on top of its native drawing API.
//! - [`Renderable`] and the optional capabilities an item can expose to the
//!   window that owns it (change notification, mouse and keyboard input,
//!   explicit disposal).
//! - [`RenderStack`]: the ordered list of items that make up a window's
//!   contents.
//! - [`ResourceCache`]: a deduplicating store for native drawing handles.
//! - [`RecordingCanvas`]: a canvas that stores draw calls instead of
//!   executing them, used by the headless back-end.

mod cache;
mod canvas;
mod recording;
mod render_stack;

pub use cache::{ResourceCache, ResourceError};
pub use canvas::{
    approximate_text_extent, approximate_text_origin, Canvas, Font, TextAlign,
};
pub use recording::{DrawCommand, Frame, RecordingCanvas};
pub use render_stack::{
    same_item, Disposable, KeyboardTarget, MouseTarget, RenderStack, Renderable,
};

/// An opaque 24-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);
    pub const LIGHT_GRAY: Self = Self::rgb(200, 200, 200);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the color as a GDI `COLORREF` (`0x00BBGGRR`).
    #[must_use]
    pub const fn to_colorref(self) -> u32 {
        (self.r as u32) | (self.g as u32) << 8 | (self.b as u32) << 16
    }

    /// Unpacks a GDI `COLORREF`. The high byte is ignored.
    #[must_use]
    pub const fn from_colorref(value: u32) -> Self {
        Self::rgb(value as u8, (value >> 8) as u8, (value >> 16) as u8)
    }

    /// Packs the color as a 24-bit TrueColor X11 pixel (`0x00RRGGBB`).
    #[must_use]
    pub const fn to_pixel(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | (self.b as u32)
    }
}
