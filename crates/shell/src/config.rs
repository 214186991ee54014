use std::time::Duration;

use geometry::{Extent, Point};
use graphics::Color;

use crate::Error;

/// The windowing back-ends a [`Window`](crate::Window) can be built on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// A Win32 window with a GDI double buffer.
    Win32,
    /// An X11 window driven through Xlib, with a pixmap double buffer.
    Xlib,
    /// No native window at all. Frames are recorded in memory and input is
    /// injected by the caller. Used as the macOS stub and for tests.
    Headless,
}

impl Backend {
    /// Picks the back-end for the operating system this process runs on.
    pub fn detect() -> Result<Self, Error> {
        match std::env::consts::OS {
            "windows" => Ok(Self::Win32),
            "linux" | "freebsd" | "dragonfly" | "netbsd" | "openbsd" => Ok(Self::Xlib),
            "macos" => Ok(Self::Headless),
            other => Err(Error::UnsupportedPlatform(other.to_owned())),
        }
    }
}

/// Everything needed to create a window.
#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub title: String,
    /// Size of the client area, in pixels.
    pub size: Extent,
    /// Initial position of the window's top-left corner on screen. `None`
    /// lets the platform choose.
    pub position: Option<Point>,
    pub background: Color,
    /// `None` selects the back-end with [`Backend::detect`].
    pub backend: Option<Backend>,
    /// Period of the window's tick notification.
    ///
    /// The Xlib and headless back-ends sleep on this timer while idle, so it
    /// is also the longest time input can wait before it is handled there.
    pub tick_interval: Duration,
    pub resizable: bool,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            title: title.into(),
            size: Extent::new(width, height),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    #[must_use]
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            size: Extent::new(800, 600),
            position: None,
            background: Color::WHITE,
            backend: None,
            tick_interval: Duration::from_millis(16),
            resizable: true,
        }
    }
}
