use graphics::ResourceError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to register the window class (platform error {code:#x})")]
    ClassRegistration { code: u32 },
    #[error("failed to create the native window (platform error {code:#x})")]
    WindowCreation { code: u32 },
    #[error("failed to connect to the display server: {0}")]
    DisplayConnection(String),
    #[error("no windowing back-end is available for {0}")]
    UnsupportedPlatform(String),
    #[error("a window is already registered with the window manager")]
    WindowAlreadyRegistered,
    #[error("no window is registered with the window manager")]
    NoActiveWindow,
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
