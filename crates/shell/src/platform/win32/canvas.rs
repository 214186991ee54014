use geometry::{Extent, Point, Rect};
use graphics::{Canvas, Color, Font, ResourceError, TextAlign};
use windows::Win32::{
    Foundation::{COLORREF, RECT, SIZE},
    Graphics::Gdi::{
        DrawTextW, FillRect, FrameRect, GetTextExtentPoint32W, LineTo, MoveToEx, SelectObject,
        SetBkMode, SetTextColor, TextOutW, DRAW_TEXT_FORMAT, HDC, HGDIOBJ, TRANSPARENT,
    },
};

use super::gdi;

/// A [`Canvas`] over a GDI device context, normally the memory DC holding a
/// window's back buffer.
pub struct GdiCanvas {
    dc: HDC,
    extent: Extent,
}

impl GdiCanvas {
    pub fn new(dc: HDC, extent: Extent) -> Self {
        unsafe { SetBkMode(dc, TRANSPARENT) };
        Self { dc, extent }
    }

    /// Runs `f` with `object` selected into the device context, restoring the
    /// previous selection afterwards.
    fn with_selected<R>(&mut self, object: HGDIOBJ, f: impl FnOnce(HDC) -> R) -> R {
        let previous = unsafe { SelectObject(self.dc, object) };
        let result = f(self.dc);
        unsafe { SelectObject(self.dc, previous) };
        result
    }

    fn with_font<R>(&mut self, font: &Font, f: impl FnOnce(HDC) -> R) -> Option<R> {
        let font = ok_or_warn(gdi::font(font))?;
        Some(self.with_selected(HGDIOBJ(font.0), f))
    }
}

fn ok_or_warn<T>(result: Result<T, ResourceError>) -> Option<T> {
    match result {
        Ok(handle) => Some(handle),
        Err(err) => {
            log::warn!("skipping draw call: {err}");
            None
        }
    }
}

fn to_rect(rect: Rect) -> RECT {
    RECT {
        left: rect.left(),
        top: rect.top(),
        right: rect.right(),
        bottom: rect.bottom(),
    }
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

impl Canvas for GdiCanvas {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(brush) = ok_or_warn(gdi::brush(color)) {
            unsafe { FillRect(self.dc, &to_rect(rect), brush) };
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        if let Some(brush) = ok_or_warn(gdi::brush(color)) {
            unsafe { FrameRect(self.dc, &to_rect(rect), brush) };
        }
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: u32) {
        let Some(pen) = ok_or_warn(gdi::pen(width, color)) else {
            return;
        };

        self.with_selected(HGDIOBJ(pen.0), |dc| unsafe {
            MoveToEx(dc, from.x, from.y, None);
            LineTo(dc, to.x, to.y);
        });
    }

    fn text(&mut self, at: Point, text: &str, color: Color, font: &Font) {
        let text = wide(text);
        self.with_font(font, |dc| unsafe {
            SetTextColor(dc, COLORREF(color.to_colorref()));
            TextOutW(dc, at.x, at.y, &text);
        });
    }

    fn text_in_rect(&mut self, rect: Rect, text: &str, color: Color, font: &Font, align: TextAlign) {
        let mut text = wide(text);
        let mut rect = to_rect(rect);
        self.with_font(font, |dc| unsafe {
            SetTextColor(dc, COLORREF(color.to_colorref()));
            DrawTextW(dc, &mut text, &mut rect, DRAW_TEXT_FORMAT(align.bits()));
        });
    }

    fn measure_text(&mut self, text: &str, font: &Font) -> Extent {
        let units = wide(text);
        self.with_font(font, |dc| {
            let mut size = SIZE::default();
            unsafe { GetTextExtentPoint32W(dc, &units, &mut size) };
            Extent::new(size.cx, size.cy)
        })
        .unwrap_or_else(|| graphics::approximate_text_extent(text, font))
    }
}
