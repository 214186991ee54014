use std::os::raw::{c_char, c_int, c_uint};

use geometry::{Extent, Point, Rect};
use graphics::{approximate_text_extent, approximate_text_origin, Canvas, Color, Font, TextAlign};
use x11_dl::xlib;

/// A [`Canvas`] over an X11 drawable, normally the pixmap holding a window's
/// back buffer.
///
/// Core X11 drawing has no font shaping, so text is drawn in the GC's default
/// font and measured with [`approximate_text_extent`].
pub struct XlibCanvas<'a> {
    xlib: &'a xlib::Xlib,
    display: *mut xlib::Display,
    drawable: xlib::Drawable,
    gc: xlib::GC,
    extent: Extent,
}

impl<'a> XlibCanvas<'a> {
    pub fn new(
        xlib: &'a xlib::Xlib,
        display: *mut xlib::Display,
        drawable: xlib::Drawable,
        gc: xlib::GC,
        extent: Extent,
    ) -> Self {
        Self {
            xlib,
            display,
            drawable,
            gc,
            extent,
        }
    }

    fn set_color(&mut self, color: Color) {
        unsafe {
            (self.xlib.XSetForeground)(self.display, self.gc, u64::from(color.to_pixel()) as _)
        };
    }

    fn draw_string(&mut self, x: i32, baseline: i32, text: &str) {
        // XDrawString takes Latin-1; anything outside it is replaced.
        let bytes: Vec<c_char> = text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?') as c_char)
            .collect();

        unsafe {
            (self.xlib.XDrawString)(
                self.display,
                self.drawable,
                self.gc,
                x,
                baseline,
                bytes.as_ptr(),
                bytes.len() as c_int,
            )
        };
    }
}

fn dimension(value: i32) -> c_uint {
    value.max(0) as c_uint
}

impl Canvas for XlibCanvas<'_> {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.set_color(color);
        unsafe {
            (self.xlib.XFillRectangle)(
                self.display,
                self.drawable,
                self.gc,
                rect.left(),
                rect.top(),
                dimension(rect.width()),
                dimension(rect.height()),
            )
        };
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.set_color(color);
        unsafe {
            (self.xlib.XSetLineAttributes)(
                self.display,
                self.gc,
                1,
                xlib::LineSolid,
                xlib::CapButt,
                xlib::JoinMiter,
            );
            // XDrawRectangle covers width + 1 pixels; match the exclusive
            // right and bottom edges of the rectangle.
            (self.xlib.XDrawRectangle)(
                self.display,
                self.drawable,
                self.gc,
                rect.left(),
                rect.top(),
                dimension(rect.width() - 1),
                dimension(rect.height() - 1),
            )
        };
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: u32) {
        self.set_color(color);
        unsafe {
            (self.xlib.XSetLineAttributes)(
                self.display,
                self.gc,
                width,
                xlib::LineSolid,
                xlib::CapButt,
                xlib::JoinMiter,
            );
            (self.xlib.XDrawLine)(
                self.display,
                self.drawable,
                self.gc,
                from.x,
                from.y,
                to.x,
                to.y,
            )
        };
    }

    fn text(&mut self, at: Point, text: &str, color: Color, font: &Font) {
        let size = approximate_text_extent(text, font);
        self.set_color(color);
        self.draw_string(at.x, at.y + size.height, text);
    }

    fn text_in_rect(&mut self, rect: Rect, text: &str, color: Color, font: &Font, align: TextAlign) {
        let origin = approximate_text_origin(rect, text, font, align);
        self.set_color(color);
        self.draw_string(origin.x, origin.y, text);
    }

    fn measure_text(&mut self, text: &str, font: &Font) -> Extent {
        approximate_text_extent(text, font)
    }
}
