//! Process-wide caches of GDI pens, brushes and fonts.
//!
//! Drawing code asks for an object by its visual attributes and gets back a
//! shared handle. Handles are owned by the caches and deleted all at once by
//! [`dispose`].

use graphics::{Color, Font, ResourceCache, ResourceError};
use once_cell::sync::Lazy;
use windows::Win32::{
    Foundation::COLORREF,
    Graphics::Gdi::{
        CreateFontIndirectW, CreatePen, CreateSolidBrush, DeleteObject, HBRUSH, HFONT, HGDIOBJ,
        HPEN, LOGFONTW, PS_SOLID,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum GdiKey {
    Pen { width: u32, color: Color },
    Brush(Color),
}

static PENS_AND_BRUSHES: Lazy<ResourceCache<GdiKey, isize>> =
    Lazy::new(|| ResourceCache::new("pen and brush"));

static FONTS: Lazy<ResourceCache<Font, isize>> = Lazy::new(|| ResourceCache::new("font"));

const REGULAR_WEIGHT: i32 = 400;

fn colorref(color: Color) -> COLORREF {
    COLORREF(color.to_colorref())
}

fn non_null(handle: isize) -> Option<isize> {
    (handle != 0).then_some(handle)
}

pub fn brush(color: Color) -> Result<HBRUSH, ResourceError> {
    PENS_AND_BRUSHES
        .get_or_create(GdiKey::Brush(color), |_| {
            non_null(unsafe { CreateSolidBrush(colorref(color)) }.0)
        })
        .map(HBRUSH)
}

pub fn pen(width: u32, color: Color) -> Result<HPEN, ResourceError> {
    PENS_AND_BRUSHES
        .get_or_create(GdiKey::Pen { width, color }, |_| {
            let width = i32::try_from(width).unwrap_or(i32::MAX);
            non_null(unsafe { CreatePen(PS_SOLID, width, colorref(color)) }.0)
        })
        .map(HPEN)
}

pub fn font(font: &Font) -> Result<HFONT, ResourceError> {
    FONTS
        .get_or_create(font.clone(), |font| {
            let mut face = [0u16; 32];
            for (dst, src) in face.iter_mut().zip(font.name.encode_utf16().take(31)) {
                *dst = src;
            }

            // A negative height selects by character height rather than cell
            // height, so `size` matches the em size.
            let logfont = LOGFONTW {
                lfHeight: -i32::try_from(font.size).unwrap_or(i32::MAX),
                lfWeight: REGULAR_WEIGHT,
                lfFaceName: face,
                ..Default::default()
            };

            non_null(unsafe { CreateFontIndirectW(&logfont) }.0)
        })
        .map(HFONT)
}

/// Deletes every cached GDI object. Lookups fail from then on. Returns the
/// number of objects deleted; calling this again deletes nothing.
pub fn dispose() -> usize {
    let release = |handle: isize| {
        unsafe { DeleteObject(HGDIOBJ(handle)) };
    };

    PENS_AND_BRUSHES.dispose(release) + FONTS.dispose(release)
}
