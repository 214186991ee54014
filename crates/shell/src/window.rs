use std::rc::Rc;

use geometry::Extent;
use graphics::{Color, RenderStack, Renderable};
use raw_window_handle::RawWindowHandle;

use crate::{
    platform::{self, headless::HeadlessWindow},
    Backend, Error, NativeWindow, WindowConfig, WindowEvents,
};

/// A top-level window.
///
/// `Window` is a cheap handle: clones refer to the same native window. The
/// back-end is chosen once, when the window is created, from
/// [`WindowConfig::backend`] or the running operating system.
#[derive(Clone)]
pub struct Window {
    native: Rc<dyn NativeWindow>,
}

impl Window {
    pub fn new(config: &WindowConfig) -> Result<Self, Error> {
        let native = platform::create(config)?;
        Ok(Self { native })
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.native.core().extent().width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.native.core().extent().height
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.native.core().extent()
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.native.core().title()
    }

    #[must_use]
    pub fn background(&self) -> Color {
        self.native.core().background()
    }

    /// Changes the background color and redraws.
    pub fn set_background_color(&self, color: Color) {
        self.native.set_background_color(color);
    }

    pub fn show(&self) {
        self.native.show();
    }

    /// Destroys the native window. `closed` fires the first time; closing an
    /// already closed window does nothing.
    pub fn close(&self) {
        self.native.destroy();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.native.core().is_destroyed()
    }

    /// Adds an item on top of the window's contents.
    pub fn add(&self, item: Rc<dyn Renderable>) {
        self.native.add(item);
    }

    /// Adds every item of `stack`, in order.
    pub fn add_stack(&self, stack: &RenderStack) {
        self.native.add_stack(stack);
    }

    /// Removes the first occurrence of `item`. If the item holds a native
    /// resource, it is disposed.
    pub fn remove(&self, item: &Rc<dyn Renderable>) {
        self.native.remove(item);
    }

    /// Schedules a redraw.
    pub fn invalidate(&self) {
        self.native.core().invalidate();
    }

    #[must_use]
    pub fn events(&self) -> &WindowEvents {
        self.native.core().events()
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        self.native.backend()
    }

    #[must_use]
    pub fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        self.native.raw_window_handle()
    }

    /// The headless back-end, for injecting input and inspecting frames.
    #[must_use]
    pub fn headless(&self) -> Option<&HeadlessWindow> {
        self.native.as_any().downcast_ref::<HeadlessWindow>()
    }

    /// The number of redraw requests made since the window was created.
    #[must_use]
    pub fn invalidations(&self) -> u64 {
        self.native.core().invalidations()
    }

    /// The number of times the window has been painted.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.native.core().frames()
    }

    /// Processes pending messages once. Returns false after the window has
    /// been destroyed.
    pub fn pump(&self) -> bool {
        self.native.pump()
    }

    /// True if both handles refer to the same native window.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self.native.core(), other.native.core())
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("backend", &self.native.backend())
            .field("core", self.native.core())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use geometry::extent;

    use super::*;

    fn headless(title: &str) -> Window {
        Window::new(&WindowConfig::new(title, 640, 480).with_backend(Backend::Headless)).unwrap()
    }

    #[test]
    fn forwards_properties() {
        let window = headless("forward");

        assert_eq!(window.title(), "forward");
        assert_eq!(window.width(), 640);
        assert_eq!(window.height(), 480);
        assert_eq!(window.backend(), Backend::Headless);
        assert!(window.raw_window_handle().is_none());
        assert!(window.headless().is_some());

        let before = window.invalidations();
        window.set_background_color(Color::RED);
        assert_eq!(window.background(), Color::RED);
        assert_eq!(window.invalidations(), before + 1);
    }

    struct Handle {
        released: Cell<u32>,
    }

    impl Renderable for Handle {
        fn draw(&self, _canvas: &mut dyn graphics::Canvas) {}

        fn as_disposable(&self) -> Option<&dyn graphics::Disposable> {
            Some(self)
        }
    }

    impl graphics::Disposable for Handle {
        fn dispose(&self) {
            self.released.set(self.released.get() + 1);
        }
    }

    #[test]
    fn remove_releases_resources() {
        let window = headless("remove");
        let handle = Rc::new(Handle {
            released: Cell::new(0),
        });
        let item: Rc<dyn Renderable> = handle.clone();

        window.add(item.clone());
        let before = window.invalidations();
        window.remove(&item);
        window.remove(&item);

        assert_eq!(handle.released.get(), 1);
        assert_eq!(window.invalidations(), before + 1);
    }

    #[test]
    fn clones_share_the_native_window() {
        let window = headless("shared");
        let clone = window.clone();
        assert!(window.ptr_eq(&clone));
        assert!(!window.ptr_eq(&headless("other")));

        let closed = Rc::new(Cell::new(0));
        {
            let closed = closed.clone();
            window.events().closed.subscribe(move |_| closed.set(closed.get() + 1));
        }

        clone.close();
        window.close();
        assert!(window.is_closed());
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn resize_notification() {
        let window = headless("resize");
        let seen = Rc::new(Cell::new(extent(0, 0)));
        {
            let seen = seen.clone();
            window.events().resized.subscribe(move |e| seen.set(*e));
        }

        window
            .headless()
            .unwrap()
            .inject(crate::InputEvent::Resized(extent(100, 50)));
        assert!(window.pump());

        assert_eq!(seen.get(), extent(100, 50));
        assert_eq!(window.extent(), extent(100, 50));
    }
}
