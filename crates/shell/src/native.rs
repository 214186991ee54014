use std::{any::Any, rc::Rc};

use graphics::{Color, RenderStack, Renderable};
use raw_window_handle::RawWindowHandle;

use crate::{Backend, WindowCore};

/// One platform-level window.
///
/// Implemented once per back-end. Everything platform-independent lives in
/// the [`WindowCore`] the back-end owns; the back-end decodes native messages
/// into [`InputEvent`](crate::InputEvent)s for it and provides a canvas when
/// the core asks to be painted.
///
/// Once [`destroy`](Self::destroy) has run, the window is inert: native calls
/// become no-ops and no further notifications are raised.
pub trait NativeWindow {
    fn core(&self) -> &Rc<WindowCore>;

    fn backend(&self) -> Backend;

    /// Makes the window visible.
    fn show(&self);

    /// Destroys the native window and raises `closed`. Calling this again
    /// does nothing.
    fn destroy(&self);

    /// Processes pending native messages, blocking for at most one tick
    /// interval if there are none. Paints if a redraw was requested. Returns
    /// false once the window has been destroyed.
    fn pump(&self) -> bool;

    /// The native handle, while the window exists.
    fn raw_window_handle(&self) -> Option<RawWindowHandle>;

    fn as_any(&self) -> &dyn Any;

    fn set_background_color(&self, color: Color) {
        self.core().set_background(color);
    }

    fn add(&self, item: Rc<dyn Renderable>) {
        self.core().add(item);
    }

    fn add_stack(&self, stack: &RenderStack) {
        self.core().add_stack(stack);
    }

    fn remove(&self, item: &Rc<dyn Renderable>) {
        self.core().remove(item);
    }
}
