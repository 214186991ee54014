//! The Xlib back-end: one X11 window per [`XlibWindow`], painted through a
//! server-side pixmap.
//!
//! libX11 is loaded at runtime, so a missing library surfaces as a
//! [`DisplayConnection`](crate::Error::DisplayConnection) error rather than a
//! link failure.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    ffi::CString,
    os::raw::{c_char, c_int, c_long, c_uint},
    ptr,
    rc::Rc,
    time::Instant,
};

use crossbeam::channel::{self, Receiver};
use geometry::{point, Extent};
use graphics::Color;
use raw_window_handle::{RawWindowHandle, XlibWindowHandle};
use x11_dl::xlib;

use crate::{Backend, Error, InputEvent, NativeWindow, Wheel, WindowConfig, WindowCore};

mod canvas;
mod keys;

pub use canvas::XlibCanvas;
pub use keys::key_from_keysym;

const EVENT_MASK: c_long = xlib::ExposureMask
    | xlib::KeyPressMask
    | xlib::KeyReleaseMask
    | xlib::ButtonPressMask
    | xlib::ButtonReleaseMask
    | xlib::PointerMotionMask
    | xlib::StructureNotifyMask
    | xlib::FocusChangeMask;

const WHEEL_STEP: i32 = 120;

/// Everything owned on the X server for one window. Dropping it releases
/// the server resources and closes the display connection.
struct Connection {
    xlib: xlib::Xlib,
    display: *mut xlib::Display,
    window: xlib::Window,
    gc: xlib::GC,
    back_buffer: xlib::Pixmap,
    depth: c_uint,
    wm_delete_window: xlib::Atom,
}

impl Connection {
    fn open(config: &WindowConfig) -> Result<Self, Error> {
        let xlib = xlib::Xlib::open().map_err(|err| Error::DisplayConnection(err.to_string()))?;

        let display = unsafe { (xlib.XOpenDisplay)(ptr::null()) };
        if display.is_null() {
            return Err(Error::DisplayConnection(
                "cannot open the X11 display".to_owned(),
            ));
        }

        let title = CString::new(config.title.replace('\0', "")).unwrap_or_default();
        let (x, y) = config.position.map_or((0, 0), |p| (p.x, p.y));
        let width = config.size.width.max(1) as c_uint;
        let height = config.size.height.max(1) as c_uint;

        unsafe {
            let screen = (xlib.XDefaultScreen)(display);
            let root = (xlib.XRootWindow)(display, screen);
            let depth = (xlib.XDefaultDepth)(display, screen) as c_uint;

            let window = (xlib.XCreateSimpleWindow)(
                display,
                root,
                x,
                y,
                width,
                height,
                1,
                (xlib.XBlackPixel)(display, screen),
                u64::from(config.background.to_pixel()) as _,
            );
            if window == 0 {
                (xlib.XCloseDisplay)(display);
                return Err(Error::WindowCreation { code: 0 });
            }

            (xlib.XStoreName)(display, window, title.as_ptr());
            (xlib.XSelectInput)(display, window, EVENT_MASK);

            // Ask the window manager to send a message instead of killing the
            // connection when the user closes the window.
            let mut wm_delete_window = (xlib.XInternAtom)(
                display,
                b"WM_DELETE_WINDOW\0".as_ptr().cast::<c_char>(),
                xlib::False,
            );
            (xlib.XSetWMProtocols)(display, window, &mut wm_delete_window, 1);

            if !config.resizable {
                let mut hints: xlib::XSizeHints = std::mem::zeroed();
                hints.flags = xlib::PMinSize | xlib::PMaxSize;
                hints.min_width = width as c_int;
                hints.max_width = width as c_int;
                hints.min_height = height as c_int;
                hints.max_height = height as c_int;
                (xlib.XSetWMNormalHints)(display, window, &mut hints);
            }

            // Without this, holding a key produces release/press pairs rather
            // than repeated presses.
            (xlib.XkbSetDetectableAutoRepeat)(display, xlib::True, ptr::null_mut());

            let gc = (xlib.XCreateGC)(display, window, 0, ptr::null_mut());
            let back_buffer = (xlib.XCreatePixmap)(display, window, width, height, depth);

            Ok(Self {
                xlib,
                display,
                window,
                gc,
                back_buffer,
                depth,
                wm_delete_window,
            })
        }
    }

    fn resize_back_buffer(&mut self, extent: Extent) {
        unsafe {
            (self.xlib.XFreePixmap)(self.display, self.back_buffer);
            self.back_buffer = (self.xlib.XCreatePixmap)(
                self.display,
                self.window,
                extent.width.max(1) as c_uint,
                extent.height.max(1) as c_uint,
                self.depth,
            );
        }
    }

    fn next_event(&self) -> Option<xlib::XEvent> {
        unsafe {
            if (self.xlib.XPending)(self.display) == 0 {
                return None;
            }
            let mut event: xlib::XEvent = std::mem::zeroed();
            (self.xlib.XNextEvent)(self.display, &mut event);
            Some(event)
        }
    }

    /// The text a key press produces, if any.
    fn lookup_text(&self, event: &mut xlib::XKeyEvent) -> String {
        let mut buffer = [0 as c_char; 32];
        let count = unsafe {
            (self.xlib.XLookupString)(
                event,
                buffer.as_mut_ptr(),
                buffer.len() as c_int,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };

        // XLookupString produces Latin-1.
        buffer[..count.clamp(0, buffer.len() as c_int) as usize]
            .iter()
            .map(|b| char::from(*b as u8))
            .collect()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        unsafe {
            (self.xlib.XFreePixmap)(self.display, self.back_buffer);
            (self.xlib.XFreeGC)(self.display, self.gc);
            (self.xlib.XDestroyWindow)(self.display, self.window);
            (self.xlib.XCloseDisplay)(self.display);
        }
    }
}

pub struct XlibWindow {
    core: Rc<WindowCore>,
    connection: RefCell<Option<Connection>>,
    ticks: Receiver<Instant>,
    /// Set by Expose and resize; the server-side contents must be copied
    /// again even though nothing changed.
    needs_present: Cell<bool>,
}

impl XlibWindow {
    pub fn new(config: &WindowConfig) -> Result<Rc<Self>, Error> {
        let connection = Connection::open(config)?;
        log::debug!(
            "created xlib window {:?} ({:#x})",
            config.title,
            connection.window
        );

        Ok(Rc::new(Self {
            core: WindowCore::new(&config.title, config.size, config.background),
            connection: RefCell::new(Some(connection)),
            ticks: channel::tick(config.tick_interval),
            needs_present: Cell::new(false),
        }))
    }

    fn next_event(&self) -> Option<xlib::XEvent> {
        self.connection.borrow().as_ref()?.next_event()
    }

    /// Decodes one X event. The connection is never borrowed while the core
    /// dispatches, since observers may destroy the window.
    fn handle(&self, event: xlib::XEvent) {
        match event.get_type() {
            xlib::Expose => {
                self.needs_present.set(true);
            }
            xlib::ConfigureNotify => {
                let configure = xlib::XConfigureEvent::from(event);
                let extent = Extent::new(configure.width, configure.height);
                if extent != self.core.extent() {
                    if let Some(connection) = self.connection.borrow_mut().as_mut() {
                        connection.resize_back_buffer(extent);
                    }
                    self.needs_present.set(true);
                    self.core.dispatch(InputEvent::Resized(extent));
                }
            }
            xlib::KeyPress => {
                let mut key_event = xlib::XKeyEvent::from(event);
                let Some((keysym, text)) = self.connection.borrow().as_ref().map(|c| {
                    let keysym = unsafe { (c.xlib.XLookupKeysym)(&mut key_event, 0) };
                    (keysym, c.lookup_text(&mut key_event))
                }) else {
                    return;
                };

                self.core
                    .dispatch(InputEvent::KeyDown(key_from_keysym(keysym as u64)));
                for ch in text.chars() {
                    self.core.dispatch(InputEvent::Char(ch));
                }
            }
            xlib::KeyRelease => {
                let mut key_event = xlib::XKeyEvent::from(event);
                let Some(keysym) = self
                    .connection
                    .borrow()
                    .as_ref()
                    .map(|c| unsafe { (c.xlib.XLookupKeysym)(&mut key_event, 0) })
                else {
                    return;
                };

                self.core
                    .dispatch(InputEvent::KeyUp(key_from_keysym(keysym as u64)));
            }
            xlib::ButtonPress => {
                let button = xlib::XButtonEvent::from(event);
                let at = point(button.x, button.y);
                match button.button {
                    xlib::Button1 => self.core.dispatch(InputEvent::MouseDown(at)),
                    xlib::Button4 => self.core.dispatch(InputEvent::MouseWheel(Wheel {
                        at,
                        delta: WHEEL_STEP,
                    })),
                    xlib::Button5 => self.core.dispatch(InputEvent::MouseWheel(Wheel {
                        at,
                        delta: -WHEEL_STEP,
                    })),
                    _ => {}
                }
            }
            xlib::ButtonRelease => {
                let button = xlib::XButtonEvent::from(event);
                if button.button == xlib::Button1 {
                    self.core
                        .dispatch(InputEvent::MouseUp(point(button.x, button.y)));
                }
            }
            xlib::MotionNotify => {
                let motion = xlib::XMotionEvent::from(event);
                self.core
                    .dispatch(InputEvent::MouseMove(point(motion.x, motion.y)));
            }
            xlib::FocusOut => {
                self.core.dispatch(InputEvent::FocusLost);
            }
            xlib::ClientMessage => {
                let message = xlib::XClientMessageEvent::from(event);
                let is_delete = self.connection.borrow().as_ref().map_or(false, |c| {
                    message.data.get_long(0) as xlib::Atom == c.wm_delete_window
                });
                if is_delete {
                    self.destroy();
                }
            }
            _ => {}
        }
    }

    /// Paints into the back buffer and copies it to the window.
    fn present(&self) {
        let connection = self.connection.borrow();
        let Some(c) = connection.as_ref() else {
            return;
        };

        let extent = self.core.extent();
        let mut canvas = XlibCanvas::new(&c.xlib, c.display, c.back_buffer, c.gc, extent);
        self.core.paint(&mut canvas);

        unsafe {
            (c.xlib.XCopyArea)(
                c.display,
                c.back_buffer,
                c.window,
                c.gc,
                0,
                0,
                extent.width.max(0) as c_uint,
                extent.height.max(0) as c_uint,
                0,
                0,
            );
            (c.xlib.XFlush)(c.display);
        }
    }
}

impl NativeWindow for XlibWindow {
    fn core(&self) -> &Rc<WindowCore> {
        &self.core
    }

    fn backend(&self) -> Backend {
        Backend::Xlib
    }

    fn show(&self) {
        if let Some(c) = self.connection.borrow().as_ref() {
            unsafe {
                (c.xlib.XMapWindow)(c.display, c.window);
                (c.xlib.XFlush)(c.display);
            }
        }
    }

    fn destroy(&self) {
        let connection = self.connection.borrow_mut().take();
        if connection.is_some() {
            drop(connection);
            log::debug!("destroyed xlib window {:?}", self.core.title());
        }
        self.core.mark_destroyed();
    }

    fn pump(&self) -> bool {
        if self.core.is_destroyed() {
            return false;
        }

        let mut handled = false;
        while let Some(event) = self.next_event() {
            handled = true;
            self.handle(event);

            if self.core.is_destroyed() {
                return false;
            }
        }

        if self.ticks.try_recv().is_ok() {
            self.core.dispatch(InputEvent::Tick);
        } else if !handled && !self.core.redraw_pending() && !self.needs_present.get() {
            // Xlib offers no blocking wait that also wakes for the timer, so
            // idle until the next tick and poll again.
            if self.ticks.recv().is_ok() {
                self.core.dispatch(InputEvent::Tick);
            }
        }

        let redraw = self.core.take_redraw_request();
        if (redraw | self.needs_present.replace(false)) && !self.core.is_destroyed() {
            self.present();
        }

        !self.core.is_destroyed()
    }

    fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        let connection = self.connection.borrow();
        let c = connection.as_ref()?;

        let mut handle = XlibWindowHandle::empty();
        handle.window = c.window;
        Some(RawWindowHandle::Xlib(handle))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set_background_color(&self, color: Color) {
        if let Some(c) = self.connection.borrow().as_ref() {
            unsafe {
                (c.xlib.XSetWindowBackground)(c.display, c.window, u64::from(color.to_pixel()) as _)
            };
        }
        self.core.set_background(color);
    }
}
