//! The Win32 back-end: one top-level window per [`Win32Window`], painted
//! through a GDI memory bitmap.

use std::{
    any::Any,
    cell::Cell,
    ffi::c_void,
    rc::Rc,
};

use geometry::{point, Extent, Point};
use graphics::Color;
use once_cell::sync::OnceCell;
use raw_window_handle::{RawWindowHandle, Win32WindowHandle};
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{
            GetLastError, BOOL, COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM,
        },
        Graphics::Gdi::{
            BeginPaint, BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, CreateSolidBrush,
            DeleteDC, DeleteObject, EndPaint, GetClientRect, InvalidateRect, ScreenToClient,
            SelectObject, UpdateWindow, HBRUSH, HDC, HGDIOBJ, PAINTSTRUCT, SRCCOPY,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            AdjustWindowRectEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
            GetMessageW, GetWindowLongPtrW, KillTimer, LoadCursorW, PeekMessageW, RegisterClassW,
            SetClassLongPtrW, SetTimer, SetWindowLongPtrW, ShowWindow, TranslateMessage,
            CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, GCLP_HBRBACKGROUND, GWLP_HINSTANCE,
            GWLP_USERDATA, IDC_ARROW, MSG, PM_REMOVE, SW_SHOW, WINDOW_EX_STYLE, WM_CHAR,
            WM_CLOSE, WM_DESTROY, WM_ERASEBKGND, WM_KEYDOWN, WM_KEYUP, WM_KILLFOCUS,
            WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_PAINT, WM_QUIT, WM_SIZE,
            WM_SYSKEYDOWN, WM_SYSKEYUP, WM_TIMER, WNDCLASSW, WS_MAXIMIZEBOX, WS_OVERLAPPEDWINDOW,
            WS_THICKFRAME,
        },
    },
};

use crate::{
    Backend, Error, InputEvent, Key, NativeWindow, Wheel, WindowConfig, WindowCore,
};

mod canvas;
pub mod gdi;

pub use canvas::GdiCanvas;

const TICK_TIMER_ID: usize = 1;

static CLASS_REGISTRATION: OnceCell<Result<(), u32>> = OnceCell::new();

fn class_name() -> Vec<u16> {
    wide("casement.window")
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn last_error() -> u32 {
    unsafe { GetLastError() }.0
}

fn instance() -> HINSTANCE {
    unsafe { GetModuleHandleW(PCWSTR::null()) }
        .map(|module| HINSTANCE(module.0))
        .unwrap_or_default()
}

/// Registers the window class shared by every window, once per process.
fn register_class() -> Result<(), Error> {
    let registration = CLASS_REGISTRATION.get_or_init(|| {
        let class_name = class_name();
        let class = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wndproc),
            hInstance: instance(),
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };

        if unsafe { RegisterClassW(&class) } == 0 {
            Err(last_error())
        } else {
            Ok(())
        }
    });

    registration
        .as_ref()
        .map(|_| ())
        .map_err(|code| Error::ClassRegistration { code: *code })
}

fn point_from_lparam(lparam: LPARAM) -> Point {
    point(
        (lparam.0 & 0xffff) as i16 as i32,
        ((lparam.0 >> 16) & 0xffff) as i16 as i32,
    )
}

fn wheel_delta(wparam: WPARAM) -> i32 {
    ((wparam.0 >> 16) & 0xffff) as u16 as i16 as i32
}

pub struct Win32Window {
    core: Rc<WindowCore>,
    hwnd: Cell<HWND>,
    /// The brush installed as the window class background. Owned by this
    /// window, unlike the cached brushes used for drawing.
    background_brush: Cell<HBRUSH>,
    /// The first half of a UTF-16 surrogate pair received through `WM_CHAR`.
    high_surrogate: Cell<Option<u16>>,
}

impl Win32Window {
    pub fn new(config: &WindowConfig) -> Result<Rc<Self>, Error> {
        register_class()?;

        let window = Rc::new(Self {
            core: WindowCore::new(&config.title, config.size, config.background),
            hwnd: Cell::new(HWND(0)),
            background_brush: Cell::new(HBRUSH(0)),
            high_surrogate: Cell::new(None),
        });

        let style = if config.resizable {
            WS_OVERLAPPEDWINDOW
        } else {
            WS_OVERLAPPEDWINDOW & !(WS_THICKFRAME | WS_MAXIMIZEBOX)
        };

        // Size the outer window so that the client area matches the request.
        let mut bounds = RECT {
            left: 0,
            top: 0,
            right: config.size.width,
            bottom: config.size.height,
        };
        unsafe {
            AdjustWindowRectEx(&mut bounds, style, BOOL::from(false), WINDOW_EX_STYLE::default())
        };

        let (x, y) = config
            .position
            .map_or((CW_USEDEFAULT, CW_USEDEFAULT), |p| (p.x, p.y));

        let class_name = class_name();
        let title = wide(&config.title);

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                style,
                x,
                y,
                bounds.right - bounds.left,
                bounds.bottom - bounds.top,
                None,
                None,
                instance(),
                None,
            )
        };

        if hwnd.0 == 0 {
            return Err(Error::WindowCreation { code: last_error() });
        }

        window.hwnd.set(hwnd);

        // The window procedure finds its window through this pointer. It is
        // cleared when the native window is destroyed, which always happens
        // before the `Win32Window` is dropped.
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, Rc::as_ptr(&window) as isize) };

        window.replace_background_brush(config.background);

        let interval = u32::try_from(config.tick_interval.as_millis()).unwrap_or(u32::MAX);
        unsafe { SetTimer(hwnd, TICK_TIMER_ID, interval.max(1), None) };

        log::debug!("created win32 window {:?} ({:#x})", config.title, hwnd.0);
        Ok(window)
    }

    fn replace_background_brush(&self, color: Color) {
        let hwnd = self.hwnd.get();
        if hwnd.0 == 0 {
            return;
        }

        let brush = unsafe { CreateSolidBrush(COLORREF(color.to_colorref())) };
        if brush.0 == 0 {
            log::warn!("could not create a background brush (error {:#x})", last_error());
            return;
        }

        unsafe { SetClassLongPtrW(hwnd, GCLP_HBRBACKGROUND, brush.0) };

        let previous = self.background_brush.replace(brush);
        if previous.0 != 0 {
            unsafe { DeleteObject(HGDIOBJ(previous.0)) };
        }
    }

    /// Turns pending redraw requests into a paint message. GDI merges
    /// invalidated regions, so however many requests were made, the window
    /// receives a single `WM_PAINT`.
    fn flush_redraw_request(&self) {
        if self.core.take_redraw_request() {
            let hwnd = self.hwnd.get();
            if hwnd.0 != 0 {
                unsafe { InvalidateRect(hwnd, None, BOOL::from(false)) };
            }
        }
    }

    fn paint(&self, hwnd: HWND) {
        // This paint serves any request made so far.
        self.core.take_redraw_request();

        let mut ps = PAINTSTRUCT::default();
        let hdc = unsafe { BeginPaint(hwnd, &mut ps) };

        let mut client = RECT::default();
        unsafe { GetClientRect(hwnd, &mut client) };
        let width = client.right - client.left;
        let height = client.bottom - client.top;

        if width > 0 && height > 0 {
            unsafe {
                let back_dc = CreateCompatibleDC(hdc);
                let back_buffer = CreateCompatibleBitmap(hdc, width, height);
                let previous = SelectObject(HDC(back_dc.0), HGDIOBJ(back_buffer.0));

                let mut canvas = GdiCanvas::new(HDC(back_dc.0), Extent::new(width, height));
                self.core.paint(&mut canvas);

                BitBlt(hdc, 0, 0, width, height, HDC(back_dc.0), 0, 0, SRCCOPY);

                SelectObject(HDC(back_dc.0), previous);
                DeleteObject(HGDIOBJ(back_buffer.0));
                DeleteDC(back_dc);
            }
        }

        unsafe { EndPaint(hwnd, &ps) };
    }

    /// Releases everything tied to the native window and notifies observers.
    /// Runs from `WM_DESTROY`, and again from `destroy` in case the message
    /// never arrived; only the first run has any effect.
    fn release(&self) {
        let hwnd = self.hwnd.replace(HWND(0));
        if hwnd.0 != 0 {
            unsafe {
                KillTimer(hwnd, TICK_TIMER_ID);
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            }
        }

        let brush = self.background_brush.replace(HBRUSH(0));
        if brush.0 != 0 {
            unsafe { DeleteObject(HGDIOBJ(brush.0)) };
        }

        if self.core.mark_destroyed() {
            log::debug!("destroyed win32 window {:?}", self.core.title());
        }
    }

    fn on_char(&self, unit: u16) {
        let ch = match unit {
            0xD800..=0xDBFF => {
                self.high_surrogate.set(Some(unit));
                return;
            }
            0xDC00..=0xDFFF => {
                let Some(high) = self.high_surrogate.take() else {
                    return;
                };
                char::decode_utf16([high, unit]).next().and_then(Result::ok)
            }
            _ => char::from_u32(u32::from(unit)),
        };

        if let Some(ch) = ch {
            self.core.dispatch(InputEvent::Char(ch));
        }
    }

    fn handle_message(&self, hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        match msg {
            WM_PAINT => {
                self.paint(hwnd);
                LRESULT(0)
            }
            // Painting always covers the whole client area.
            WM_ERASEBKGND => LRESULT(1),
            WM_SIZE => {
                let size = point_from_lparam(lparam);
                self.core
                    .dispatch(InputEvent::Resized(Extent::new(size.x, size.y)));
                LRESULT(0)
            }
            WM_TIMER if wparam.0 == TICK_TIMER_ID => {
                self.core.dispatch(InputEvent::Tick);
                LRESULT(0)
            }
            WM_CLOSE => {
                self.destroy();
                LRESULT(0)
            }
            WM_DESTROY => {
                self.release();
                LRESULT(0)
            }
            WM_KEYDOWN | WM_SYSKEYDOWN => {
                self.core
                    .dispatch(InputEvent::KeyDown(Key::from_code(wparam.0 as u16)));
                unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
            }
            WM_KEYUP | WM_SYSKEYUP => {
                self.core
                    .dispatch(InputEvent::KeyUp(Key::from_code(wparam.0 as u16)));
                unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
            }
            WM_CHAR => {
                self.on_char(wparam.0 as u16);
                LRESULT(0)
            }
            WM_MOUSEMOVE => {
                self.core
                    .dispatch(InputEvent::MouseMove(point_from_lparam(lparam)));
                LRESULT(0)
            }
            WM_LBUTTONDOWN => {
                self.core
                    .dispatch(InputEvent::MouseDown(point_from_lparam(lparam)));
                LRESULT(0)
            }
            WM_LBUTTONUP => {
                self.core
                    .dispatch(InputEvent::MouseUp(point_from_lparam(lparam)));
                LRESULT(0)
            }
            WM_MOUSEWHEEL => {
                // Wheel messages carry screen coordinates.
                let at = point_from_lparam(lparam);
                let mut client = POINT { x: at.x, y: at.y };
                unsafe { ScreenToClient(hwnd, &mut client) };

                self.core.dispatch(InputEvent::MouseWheel(Wheel {
                    at: point(client.x, client.y),
                    delta: wheel_delta(wparam),
                }));
                LRESULT(0)
            }
            WM_KILLFOCUS => {
                self.core.dispatch(InputEvent::FocusLost);
                LRESULT(0)
            }
            _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        }
    }
}

impl NativeWindow for Win32Window {
    fn core(&self) -> &Rc<WindowCore> {
        &self.core
    }

    fn backend(&self) -> Backend {
        Backend::Win32
    }

    fn show(&self) {
        let hwnd = self.hwnd.get();
        if hwnd.0 != 0 {
            unsafe {
                ShowWindow(hwnd, SW_SHOW);
                UpdateWindow(hwnd);
            }
        }
    }

    fn destroy(&self) {
        let hwnd = self.hwnd.get();
        if hwnd.0 != 0 {
            // Sends WM_DESTROY, which releases the window.
            unsafe { DestroyWindow(hwnd) };
        }
        self.release();
    }

    fn pump(&self) -> bool {
        if self.core.is_destroyed() {
            return false;
        }

        self.flush_redraw_request();

        let mut msg = MSG::default();
        unsafe {
            // The tick timer guarantees a message within one tick interval.
            if GetMessageW(&mut msg, None, 0, 0).0 <= 0 {
                return false;
            }
            TranslateMessage(&msg);
            DispatchMessageW(&msg);

            while !self.core.is_destroyed() && PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool()
            {
                if msg.message == WM_QUIT {
                    return false;
                }
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        self.flush_redraw_request();
        !self.core.is_destroyed()
    }

    fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        let hwnd = self.hwnd.get();
        if hwnd.0 == 0 {
            return None;
        }

        let mut handle = Win32WindowHandle::empty();
        handle.hwnd = hwnd.0 as *mut c_void;
        handle.hinstance = unsafe { GetWindowLongPtrW(hwnd, GWLP_HINSTANCE) } as *mut c_void;
        Some(RawWindowHandle::Win32(handle))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set_background_color(&self, color: Color) {
        self.replace_background_brush(color);
        self.core.set_background(color);
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        let hwnd = self.hwnd.get();
        if hwnd.0 != 0 {
            // Detach first so the window procedure does not reach this window
            // while it is being dropped.
            unsafe {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                DestroyWindow(hwnd);
            }
        }
        self.release();
    }
}

unsafe extern "system" fn wndproc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let window = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const Win32Window;

    // SAFETY: the pointer is set right after creation and cleared before the
    // window is released or dropped.
    match window.as_ref() {
        Some(window) => window.handle_message(hwnd, msg, wparam, lparam),
        None => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lparam_coordinates_are_signed() {
        let lparam = LPARAM(((-5i16 as u16 as isize) << 16) | (12i16 as u16 as isize));
        assert_eq!(point_from_lparam(lparam), point(12, -5));
    }

    #[test]
    fn wheel_delta_is_signed() {
        assert_eq!(wheel_delta(WPARAM((120usize) << 16)), 120);
        assert_eq!(wheel_delta(WPARAM(((-120i16 as u16) as usize) << 16)), -120);
    }
}
