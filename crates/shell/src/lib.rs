//! Native windows and the loop that drives them.
//!
//! A [`Window`] wraps one platform window: Win32 on Windows, Xlib on Linux
//! and the BSDs, and a headless stand-in on macOS (and anywhere, on request).
//! Each back-end decodes its native messages into [`InputEvent`]s and hands
//! them to a shared [`WindowCore`], which routes input to the window's
//! contents, raises the window's notifications, and paints through the
//! back-end's double-buffered [`Canvas`](graphics::Canvas).
//!
//! A [`WindowManager`] owns the single current window and runs its message
//! loop until the window closes.

mod config;
mod error;
mod input;
mod manager;
mod native;
pub mod platform;
mod window;
mod window_core;

pub use config::{Backend, WindowConfig};
pub use error::Error;
pub use input::{InputEvent, Key, KeySet, Wheel};
pub use manager::WindowManager;
pub use native::NativeWindow;
pub use platform::headless::HeadlessWindow;
pub use window::Window;
pub use window_core::{WindowCore, WindowEvents};

/// Releases the process-wide native drawing resources (the GDI pen, brush
/// and font caches on Windows). Drawing after this logs a warning and skips
/// the affected draw calls. Returns the number of handles released; calling
/// it again releases nothing.
pub fn dispose_native_resources() -> usize {
    #[cfg(windows)]
    {
        platform::win32::gdi::dispose()
    }

    #[cfg(not(windows))]
    {
        0
    }
}
