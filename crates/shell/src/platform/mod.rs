use std::rc::Rc;

use crate::{Backend, Error, NativeWindow, WindowConfig};

pub mod headless;

#[cfg(windows)]
pub mod win32;

#[cfg(all(unix, not(target_os = "macos")))]
pub mod x11;

/// Creates a native window on the configured back-end, or the one detected
/// for the running operating system.
pub(crate) fn create(config: &WindowConfig) -> Result<Rc<dyn NativeWindow>, Error> {
    let backend = match config.backend {
        Some(backend) => backend,
        None => Backend::detect()?,
    };

    log::info!("creating window {:?} with the {:?} back-end", config.title, backend);

    match backend {
        Backend::Headless => Ok(headless::HeadlessWindow::new(config)),
        #[cfg(windows)]
        Backend::Win32 => Ok(win32::Win32Window::new(config)?),
        #[cfg(all(unix, not(target_os = "macos")))]
        Backend::Xlib => Ok(x11::XlibWindow::new(config)?),
        #[allow(unreachable_patterns)]
        other => Err(Error::UnsupportedPlatform(format!(
            "{:?} on {}",
            other,
            std::env::consts::OS
        ))),
    }
}
