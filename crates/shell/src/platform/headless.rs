use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
    time::Instant,
};

use crossbeam::channel::{self, Receiver};
use graphics::{Frame, RecordingCanvas};
use raw_window_handle::RawWindowHandle;

use crate::{Backend, InputEvent, NativeWindow, WindowConfig, WindowCore};

/// A window without a display.
///
/// Input is injected with [`inject`](Self::inject) and delivered on the next
/// [`pump`](NativeWindow::pump), exactly as a native back-end would deliver
/// decoded messages. Paints are recorded into a [`Frame`] instead of being
/// rasterized. This is the back-end used on macOS, and the one tests use
/// everywhere.
pub struct HeadlessWindow {
    core: Rc<WindowCore>,
    queue: RefCell<VecDeque<InputEvent>>,
    ticks: Receiver<Instant>,
    visible: Cell<bool>,
    last_frame: RefCell<Option<Frame>>,
    frames_presented: Cell<u64>,
}

impl HeadlessWindow {
    pub fn new(config: &WindowConfig) -> Rc<Self> {
        log::debug!("creating headless window {:?}", config.title);

        Rc::new(Self {
            core: WindowCore::new(&config.title, config.size, config.background),
            queue: RefCell::new(VecDeque::new()),
            ticks: channel::tick(config.tick_interval),
            visible: Cell::new(false),
            last_frame: RefCell::new(None),
            frames_presented: Cell::new(0),
        })
    }

    /// Queues an event for the next pump. Ignored once the window is
    /// destroyed.
    pub fn inject(&self, event: InputEvent) {
        if !self.core.is_destroyed() {
            self.queue.borrow_mut().push_back(event);
        }
    }

    /// The most recently presented frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<Frame> {
        self.last_frame.borrow().clone()
    }

    #[must_use]
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented.get()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn handle(&self, event: InputEvent) {
        match event {
            InputEvent::CloseRequested => self.destroy(),
            other => self.core.dispatch(other),
        }
    }

    fn present(&self) {
        let mut canvas = RecordingCanvas::new(self.core.extent());
        self.core.paint(&mut canvas);

        *self.last_frame.borrow_mut() = Some(canvas.into_frame());
        self.frames_presented.set(self.frames_presented.get() + 1);
    }
}

impl NativeWindow for HeadlessWindow {
    fn core(&self) -> &Rc<WindowCore> {
        &self.core
    }

    fn backend(&self) -> Backend {
        Backend::Headless
    }

    fn show(&self) {
        if !self.core.is_destroyed() && !self.visible.replace(true) {
            self.core.invalidate();
        }
    }

    fn destroy(&self) {
        self.queue.borrow_mut().clear();
        self.visible.set(false);

        if self.core.mark_destroyed() {
            log::debug!("destroyed headless window {:?}", self.core.title());
        }
    }

    fn pump(&self) -> bool {
        if self.core.is_destroyed() {
            return false;
        }

        let mut handled = false;
        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            handled = true;
            self.handle(event);

            if self.core.is_destroyed() {
                return false;
            }
        }

        if self.ticks.try_recv().is_ok() {
            self.core.dispatch(InputEvent::Tick);
        } else if !handled && !self.core.redraw_pending() && self.ticks.recv().is_ok() {
            // Nothing to do until the next tick.
            self.core.dispatch(InputEvent::Tick);
        }

        if self.visible.get() && self.core.take_redraw_request() {
            self.present();
        }

        !self.core.is_destroyed()
    }

    fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        None
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use geometry::{extent, point};
    use graphics::{Color, DrawCommand};

    use super::*;

    fn window() -> Rc<HeadlessWindow> {
        HeadlessWindow::new(
            &WindowConfig::new("headless", 320, 240)
                .with_background(Color::BLACK)
                .with_tick_interval(Duration::from_millis(1)),
        )
    }

    #[test]
    fn presents_after_show() {
        let window = window();

        assert!(window.pump());
        assert_eq!(window.frames_presented(), 0);

        window.show();
        assert!(window.pump());
        assert_eq!(window.frames_presented(), 1);
        assert_eq!(
            window.last_frame().unwrap().commands,
            vec![DrawCommand::FillRect {
                rect: geometry::Rect::from_ltrb(0, 0, 320, 240),
                color: Color::BLACK,
            }]
        );

        // No redraw requested, no new frame.
        assert!(window.pump());
        assert_eq!(window.frames_presented(), 1);
    }

    #[test]
    fn injected_events_are_dispatched_in_order() {
        let window = window();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            window
                .core()
                .events()
                .mouse_move
                .subscribe(move |p| seen.borrow_mut().push(*p));
        }

        window.inject(InputEvent::MouseMove(point(1, 2)));
        window.inject(InputEvent::MouseMove(point(3, 4)));
        assert!(window.pump());

        assert_eq!(*seen.borrow(), vec![point(1, 2), point(3, 4)]);
    }

    #[test]
    fn resize_updates_extent() {
        let window = window();
        window.show();

        window.inject(InputEvent::Resized(extent(640, 480)));
        assert!(window.pump());

        assert_eq!(window.core().extent(), extent(640, 480));
        assert_eq!(window.last_frame().unwrap().extent, extent(640, 480));
    }

    #[test]
    fn close_request_destroys_once() {
        let window = window();
        let closed = Rc::new(Cell::new(0));
        {
            let closed = closed.clone();
            window.core().events().closed.subscribe(move |_| closed.set(closed.get() + 1));
        }

        window.inject(InputEvent::CloseRequested);
        window.inject(InputEvent::MouseMove(point(0, 0)));
        assert!(!window.pump());
        assert!(!window.pump());

        window.destroy();
        assert_eq!(closed.get(), 1);
        assert!(window.core().is_destroyed());
    }
}
