use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use structures::SubscriptionId;

use crate::{Error, Window};

struct Registration {
    window: Window,
    closed: SubscriptionId,
}

struct State {
    current: RefCell<Option<Registration>>,
    quit: Rc<Cell<bool>>,
}

/// Controls which single top-level window is current and runs the message
/// loop for it.
///
/// A manager is either empty or has exactly one registered window. Switching
/// windows replaces the current one, optionally closing it. `WindowManager`
/// is a cheap handle; clones share the same state, so one can be captured by
/// a window's event handlers to switch windows from inside the loop.
#[derive(Clone)]
pub struct WindowManager {
    state: Rc<State>,
}

impl WindowManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(State {
                current: RefCell::new(None),
                quit: Rc::new(Cell::new(false)),
            }),
        }
    }

    /// Makes `window` the current window and shows it. Fails if a window is
    /// already registered.
    pub fn register_window(&self, window: Window) -> Result<(), Error> {
        if self.state.current.borrow().is_some() {
            return Err(Error::WindowAlreadyRegistered);
        }

        let quit = self.state.quit.clone();
        let closed = window.events().closed.subscribe(move |_| quit.set(true));

        log::info!("registered window {:?}", window.title());

        *self.state.current.borrow_mut() = Some(Registration {
            window: window.clone(),
            closed,
        });

        window.show();
        Ok(())
    }

    /// Replaces the current window with `next`. The previous window is closed
    /// if `close_previous` is set; otherwise it stays open but is no longer
    /// pumped. Fails if no window is registered.
    pub fn switch_window(&self, next: Window, close_previous: bool) -> Result<(), Error> {
        let previous = self
            .state
            .current
            .borrow_mut()
            .take()
            .ok_or(Error::NoActiveWindow)?;

        previous.window.events().closed.unsubscribe(previous.closed);
        log::info!(
            "switching from window {:?} to {:?}",
            previous.window.title(),
            next.title()
        );

        if close_previous {
            previous.window.close();
        }

        self.register_window(next)
    }

    /// The current window, if any.
    #[must_use]
    pub fn current(&self) -> Option<Window> {
        self.state
            .current
            .borrow()
            .as_ref()
            .map(|r| r.window.clone())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.current.borrow().is_some()
    }

    /// Asks [`run`](Self::run) to return after the current iteration.
    pub fn quit(&self) {
        self.state.quit.set(true);
    }

    /// Pumps the current window's messages until it closes or
    /// [`quit`](Self::quit) is called. The window that is current at that
    /// point is closed, and the manager is empty again when this returns.
    pub fn run(&self) {
        while !self.state.quit.get() {
            // Pump a clone so that handlers can switch windows while the
            // previous one is still processing its messages.
            let Some(window) = self.current() else {
                break;
            };

            if !window.pump() {
                let still_current = self
                    .current()
                    .map_or(false, |current| current.ptr_eq(&window));
                if still_current {
                    self.state.quit.set(true);
                }
            }
        }

        let registration = self.state.current.borrow_mut().take();
        if let Some(registration) = registration {
            registration
                .window
                .events()
                .closed
                .unsubscribe(registration.closed);
            registration.window.close();
            log::info!("window manager finished with {:?}", registration.window.title());
        }

        self.state.quit.set(false);
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Backend, InputEvent, WindowConfig};

    fn headless(title: &str) -> Window {
        Window::new(&WindowConfig::new(title, 200, 100).with_backend(Backend::Headless)).unwrap()
    }

    #[test]
    fn second_registration_fails() {
        let manager = WindowManager::new();

        manager.register_window(headless("first")).unwrap();
        assert!(matches!(
            manager.register_window(headless("second")),
            Err(Error::WindowAlreadyRegistered)
        ));
        assert_eq!(manager.current().unwrap().title(), "first");
    }

    #[test]
    fn switch_requires_a_window() {
        let manager = WindowManager::new();
        assert!(matches!(
            manager.switch_window(headless("next"), true),
            Err(Error::NoActiveWindow)
        ));
        assert!(!manager.is_active());
    }

    #[test]
    fn switch_keeps_previous_open_when_asked() {
        let manager = WindowManager::new();
        let first = headless("first");
        manager.register_window(first.clone()).unwrap();

        manager.switch_window(headless("second"), false).unwrap();
        assert!(!first.is_closed());

        // Closing the old window no longer stops the loop.
        first.close();
        manager
            .current()
            .unwrap()
            .headless()
            .unwrap()
            .inject(InputEvent::CloseRequested);
        manager.run();

        assert!(!manager.is_active());
    }

    #[test]
    fn run_returns_when_the_window_closes() {
        let manager = WindowManager::new();
        let window = headless("run");
        manager.register_window(window.clone()).unwrap();

        window
            .headless()
            .unwrap()
            .inject(InputEvent::CloseRequested);
        manager.run();

        assert!(window.is_closed());
        assert!(manager.current().is_none());

        // Empty again, so a new window can be registered.
        manager.register_window(headless("again")).unwrap();
    }
}
