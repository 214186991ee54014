use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use geometry::{Extent, Point, Rect};
use graphics::{same_item, Canvas, Color, MouseTarget, RenderStack, Renderable};
use smallvec::SmallVec;
use structures::{EventSource, SubscriptionId};

use crate::input::{InputEvent, Key, KeySet, Wheel};

/// The notifications a window raises. Subscribe through
/// [`Window::events`](crate::Window::events).
#[derive(Default)]
pub struct WindowEvents {
    /// The client area changed size.
    pub resized: EventSource<Extent>,
    /// The window was destroyed. Fires exactly once.
    pub closed: EventSource<()>,
    /// A key went down. Auto-repeat does not fire this again until the key is
    /// released.
    pub key_down: EventSource<Key>,
    pub key_up: EventSource<Key>,
    /// The keys currently held, raised after every input event and every
    /// tick.
    pub keys_down: EventSource<[Key]>,
    /// The periodic timer, at the window's tick interval.
    pub tick: EventSource<()>,
    pub mouse_move: EventSource<Point>,
    pub mouse_down: EventSource<Point>,
    pub mouse_up: EventSource<Point>,
    pub mouse_wheel: EventSource<Wheel>,
}

/// The platform-independent half of a native window.
///
/// Every back-end owns one `WindowCore` and feeds it the events it decodes
/// from native messages. The core holds the window's contents and cached
/// properties, routes input to the items in its render stack, raises the
/// window's notifications, and paints its contents into whatever canvas the
/// back-end provides.
///
/// Redraws are requested through [`invalidate`](Self::invalidate) and
/// collected by the back-end with
/// [`take_redraw_request`](Self::take_redraw_request), so any number of
/// requests between two paints result in a single paint.
pub struct WindowCore {
    this: Weak<WindowCore>,
    title: RefCell<String>,
    extent: Cell<Extent>,
    background: Cell<Color>,
    stack: RefCell<RenderStack>,
    subscriptions: RefCell<Vec<(Rc<dyn Renderable>, SubscriptionId)>>,
    keys: RefCell<KeySet>,
    events: WindowEvents,
    redraw_requested: Cell<bool>,
    invalidations: Cell<u64>,
    frames: Cell<u64>,
    destroyed: Cell<bool>,
}

impl WindowCore {
    pub fn new(title: &str, extent: Extent, background: Color) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            title: RefCell::new(title.to_owned()),
            extent: Cell::new(extent),
            background: Cell::new(background),
            stack: RefCell::new(RenderStack::new()),
            subscriptions: RefCell::new(Vec::new()),
            keys: RefCell::new(KeySet::default()),
            events: WindowEvents::default(),
            redraw_requested: Cell::new(false),
            invalidations: Cell::new(0),
            frames: Cell::new(0),
            destroyed: Cell::new(false),
        })
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent.get()
    }

    #[must_use]
    pub fn background(&self) -> Color {
        self.background.get()
    }

    pub fn set_background(&self, color: Color) {
        self.background.set(color);
        self.invalidate();
    }

    #[must_use]
    pub fn events(&self) -> &WindowEvents {
        &self.events
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// The number of items in the render stack.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.stack.borrow().len()
    }

    /// The keys currently held down.
    #[must_use]
    pub fn keys_down(&self) -> SmallVec<[Key; 8]> {
        self.keys.borrow().as_slice().iter().copied().collect()
    }

    /// Marks the current frame stale. Has no effect once the window is
    /// destroyed.
    pub fn invalidate(&self) {
        if self.destroyed.get() {
            return;
        }
        self.invalidations.set(self.invalidations.get() + 1);
        self.redraw_requested.set(true);
    }

    /// Returns true, once, if a redraw was requested since the last call.
    pub fn take_redraw_request(&self) -> bool {
        self.redraw_requested.replace(false)
    }

    #[must_use]
    pub fn redraw_pending(&self) -> bool {
        self.redraw_requested.get()
    }

    /// The number of redraw requests made over the window's lifetime. Several
    /// requests may be served by one paint.
    #[must_use]
    pub fn invalidations(&self) -> u64 {
        self.invalidations.get()
    }

    /// The number of times the window's contents have been painted.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }

    pub fn add(&self, item: Rc<dyn Renderable>) {
        if self.destroyed.get() {
            return;
        }

        if let Some(notifier) = item.change_notifier() {
            let this = self.this.clone();
            let id = notifier.subscribe(move |_| {
                if let Some(core) = this.upgrade() {
                    core.invalidate();
                }
            });
            self.subscriptions.borrow_mut().push((item.clone(), id));
        }

        self.stack.borrow_mut().add(item);
        self.invalidate();
    }

    pub fn add_stack(&self, stack: &RenderStack) {
        for item in stack {
            self.add(item.clone());
        }
    }

    /// Removes the first occurrence of `item`. An item holding a native
    /// resource is disposed once its last occurrence is gone. Removing an
    /// item that is not present does nothing.
    pub fn remove(&self, item: &Rc<dyn Renderable>) {
        if !self.stack.borrow_mut().remove(item) {
            return;
        }

        self.unsubscribe(item);

        let still_present = self.stack.borrow().contains(item);
        if !still_present {
            if let Some(disposable) = item.as_disposable() {
                disposable.dispose();
            }
        }

        self.invalidate();
    }

    fn unsubscribe(&self, item: &Rc<dyn Renderable>) {
        let subscription = {
            let mut subscriptions = self.subscriptions.borrow_mut();
            subscriptions
                .iter()
                .position(|(i, _)| same_item(i, item))
                .map(|index| subscriptions.remove(index))
        };

        if let Some((item, id)) = subscription {
            if let Some(notifier) = item.change_notifier() {
                notifier.unsubscribe(id);
            }
        }
    }

    /// Fills the canvas with the background color and draws every item on
    /// top of it in insertion order.
    pub fn paint(&self, canvas: &mut dyn Canvas) {
        let extent = canvas.extent();
        canvas.fill_rect(
            Rect::from_ltrb(0, 0, extent.width, extent.height),
            self.background.get(),
        );

        // Drawing must not hold the stack borrow: an item may add or remove
        // items from inside `draw`.
        let stack: RenderStack = self.stack.borrow().iter().cloned().collect();
        stack.draw_all(canvas);

        self.frames.set(self.frames.get() + 1);
    }

    /// Delivers one decoded event: updates cached state, routes input to the
    /// render stack, and raises the matching notifications.
    ///
    /// Does nothing once the window is destroyed.
    pub fn dispatch(&self, event: InputEvent) {
        if self.destroyed.get() {
            return;
        }

        match event {
            InputEvent::Resized(extent) => {
                if extent != self.extent.get() {
                    self.extent.set(extent);
                    self.events.resized.emit(&extent);
                    self.invalidate();
                }
                return;
            }
            // Close requests are handled by the back-end, which destroys the
            // native window and then calls `mark_destroyed`.
            InputEvent::CloseRequested => return,
            InputEvent::Tick => {
                self.events.tick.emit(&());
            }
            InputEvent::KeyDown(key) => {
                let pressed = self.keys.borrow_mut().press(key);
                if pressed {
                    self.events.key_down.emit(&key);
                }
            }
            InputEvent::KeyUp(key) => {
                let released = self.keys.borrow_mut().release(key);
                if released {
                    self.events.key_up.emit(&key);
                }
            }
            InputEvent::FocusLost => {
                let released = self.keys.borrow_mut().drain();
                for key in &released {
                    self.events.key_up.emit(key);
                }
            }
            InputEvent::Char(ch) => {
                self.route_char(ch);
            }
            InputEvent::MouseMove(at) => {
                self.route_mouse(at, |target, at| target.mouse_move(at));
                self.events.mouse_move.emit(&at);
            }
            InputEvent::MouseDown(at) => {
                self.route_mouse(at, |target, at| target.mouse_down(at));
                self.events.mouse_down.emit(&at);
            }
            InputEvent::MouseUp(at) => {
                self.route_mouse(at, |target, at| target.mouse_up(at));
                self.events.mouse_up.emit(&at);
            }
            InputEvent::MouseWheel(wheel) => {
                self.events.mouse_wheel.emit(&wheel);
            }
        }

        // An observer may have closed the window.
        if !self.destroyed.get() {
            let keys = self.keys_down();
            self.events.keys_down.emit(&keys[..]);
        }
    }

    /// Delivers a pointer event to every mouse target, topmost last. Each
    /// target does its own hit test. Schedules one redraw if any of them
    /// changed.
    fn route_mouse(&self, at: Point, deliver: impl Fn(&dyn MouseTarget, Point) -> bool) {
        let targets = self.stack.borrow().mouse_targets();

        let mut changed = false;
        for item in &targets {
            if let Some(target) = item.as_mouse_target() {
                changed |= deliver(target, at);
            }
        }

        if changed {
            self.invalidate();
        }
    }

    fn route_char(&self, ch: char) {
        let targets = self.stack.borrow().keyboard_targets();

        let mut changed = false;
        for item in &targets {
            if let Some(target) = item.as_keyboard_target() {
                if target.has_focus() {
                    changed |= target.key_press(ch);
                }
            }
        }

        if changed {
            self.invalidate();
        }
    }

    /// Records that the native window is gone. The first call detaches every
    /// item's change notification and raises `closed`; later calls do
    /// nothing.
    pub fn mark_destroyed(&self) -> bool {
        if self.destroyed.replace(true) {
            return false;
        }

        self.redraw_requested.set(false);

        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
        for (item, id) in subscriptions {
            if let Some(notifier) = item.change_notifier() {
                notifier.unsubscribe(id);
            }
        }

        self.events.closed.emit(&());
        true
    }
}

impl std::fmt::Debug for WindowCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowCore")
            .field("title", &self.title.borrow())
            .field("extent", &self.extent.get())
            .field("items", &self.stack.borrow().len())
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use geometry::{extent, point};
    use graphics::{DrawCommand, RecordingCanvas};

    use super::*;

    struct Square {
        bounds: Rect,
        hovered: Cell<bool>,
        changed: EventSource<()>,
    }

    impl Square {
        fn new(bounds: Rect) -> Rc<Self> {
            Rc::new(Self {
                bounds,
                hovered: Cell::new(false),
                changed: EventSource::new(),
            })
        }
    }

    impl Renderable for Square {
        fn draw(&self, canvas: &mut dyn Canvas) {
            canvas.fill_rect(self.bounds, Color::GREEN);
        }

        fn change_notifier(&self) -> Option<&EventSource<()>> {
            Some(&self.changed)
        }

        fn as_mouse_target(&self) -> Option<&dyn MouseTarget> {
            Some(self)
        }
    }

    impl MouseTarget for Square {
        fn mouse_move(&self, at: Point) -> bool {
            let inside = self.bounds.contains(at);
            self.hovered.replace(inside) != inside
        }

        fn mouse_down(&self, _at: Point) -> bool {
            false
        }

        fn mouse_up(&self, _at: Point) -> bool {
            false
        }
    }

    /// Draws a line until disposed.
    struct Wire {
        disposed: Cell<bool>,
    }

    impl Renderable for Wire {
        fn draw(&self, canvas: &mut dyn Canvas) {
            if !self.disposed.get() {
                canvas.line(point(0, 0), point(5, 5), Color::BLACK, 1);
            }
        }

        fn as_disposable(&self) -> Option<&dyn graphics::Disposable> {
            Some(self)
        }
    }

    impl graphics::Disposable for Wire {
        fn dispose(&self) {
            self.disposed.set(true);
        }
    }

    fn recorded(core: &WindowCore) -> Vec<DrawCommand> {
        let mut canvas = RecordingCanvas::new(core.extent());
        core.paint(&mut canvas);
        canvas.into_frame().commands
    }

    #[test]
    fn add_and_remove_request_redraws() {
        let core = WindowCore::new("test", extent(100, 100), Color::WHITE);
        let square = Square::new(Rect::from_ltrb(0, 0, 10, 10));
        let item: Rc<dyn Renderable> = square.clone();

        core.add(item.clone());
        assert!(core.take_redraw_request());
        assert!(!core.take_redraw_request());
        assert_eq!(square.changed.len(), 1);

        square.changed.emit(&());
        assert!(core.take_redraw_request());

        core.remove(&item);
        assert!(core.take_redraw_request());
        assert!(square.changed.is_empty());

        // Not present: no redraw.
        core.remove(&item);
        assert!(!core.take_redraw_request());
    }

    #[test]
    fn remove_disposes_resource_items() {
        let core = WindowCore::new("test", extent(100, 100), Color::WHITE);
        let wire = Rc::new(Wire {
            disposed: Cell::new(false),
        });
        let item: Rc<dyn Renderable> = wire.clone();

        core.add(item.clone());
        core.take_redraw_request();

        core.remove(&item);
        assert!(wire.disposed.get());
        assert!(core.take_redraw_request());
        assert_eq!(core.item_count(), 0);
    }

    #[test]
    fn duplicate_survives_removal_of_one_copy() {
        let core = WindowCore::new("test", extent(100, 100), Color::WHITE);
        let wire = Rc::new(Wire {
            disposed: Cell::new(false),
        });
        let item: Rc<dyn Renderable> = wire.clone();

        core.add(item.clone());
        core.add(item.clone());
        core.remove(&item);
        assert!(!wire.disposed.get());

        let lines = recorded(&core)
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        assert_eq!(lines, 1);

        core.remove(&item);
        assert!(wire.disposed.get());
    }

    #[test]
    fn add_stack_subscribes_and_keeps_order() {
        let core = WindowCore::new("test", extent(100, 100), Color::WHITE);
        let first = Square::new(Rect::from_ltrb(0, 0, 10, 10));
        let second = Square::new(Rect::from_ltrb(20, 20, 30, 30));

        let mut stack = RenderStack::new();
        stack.add(first.clone());
        stack.add(second.clone());
        core.add_stack(&stack);

        assert_eq!(core.item_count(), 2);
        assert_eq!(first.changed.len(), 1);
        assert_eq!(second.changed.len(), 1);
        assert!(core.take_redraw_request());

        second.changed.emit(&());
        assert!(core.take_redraw_request());

        let rects: Vec<Rect> = recorded(&core)
            .into_iter()
            .skip(1)
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, .. } => Some(rect),
                _ => None,
            })
            .collect();
        assert_eq!(rects, [first.bounds, second.bounds]);
    }

    #[test]
    fn background_change_requests_redraw() {
        let core = WindowCore::new("test", extent(10, 10), Color::WHITE);
        core.take_redraw_request();

        core.set_background(Color::RED);
        assert!(core.take_redraw_request());
        assert_eq!(
            recorded(&core)[0],
            DrawCommand::FillRect {
                rect: Rect::from_ltrb(0, 0, 10, 10),
                color: Color::RED
            }
        );
    }

    #[test]
    fn tick_and_wheel_raise_notifications() {
        let core = WindowCore::new("test", extent(100, 100), Color::WHITE);
        let ticks = Rc::new(Cell::new(0));
        let wheels = Rc::new(RefCell::new(Vec::new()));
        let held = Rc::new(Cell::new(0));
        {
            let ticks = ticks.clone();
            core.events().tick.subscribe(move |_| ticks.set(ticks.get() + 1));
            let wheels = wheels.clone();
            core.events()
                .mouse_wheel
                .subscribe(move |w| wheels.borrow_mut().push(*w));
            let held = held.clone();
            core.events()
                .keys_down
                .subscribe(move |_| held.set(held.get() + 1));
        }

        core.dispatch(InputEvent::Tick);
        assert_eq!(ticks.get(), 1);
        assert_eq!(held.get(), 1);

        let wheel = Wheel {
            at: point(3, 4),
            delta: -120,
        };
        core.dispatch(InputEvent::MouseWheel(wheel));
        assert_eq!(*wheels.borrow(), vec![wheel]);
        assert_eq!(ticks.get(), 1);
        assert_eq!(held.get(), 2);
    }

    #[test]
    fn paint_fills_background_first() {
        let core = WindowCore::new("test", extent(20, 10), Color::BLUE);
        core.add(Square::new(Rect::from_ltrb(1, 1, 2, 2)));

        assert_eq!(
            recorded(&core),
            vec![
                DrawCommand::FillRect {
                    rect: Rect::from_ltrb(0, 0, 20, 10),
                    color: Color::BLUE
                },
                DrawCommand::FillRect {
                    rect: Rect::from_ltrb(1, 1, 2, 2),
                    color: Color::GREEN
                },
            ]
        );
        assert_eq!(core.frames(), 1);
    }

    #[test]
    fn hover_changes_invalidate_once() {
        let core = WindowCore::new("test", extent(100, 100), Color::WHITE);
        let a = Square::new(Rect::from_ltrb(0, 0, 50, 50));
        let b = Square::new(Rect::from_ltrb(0, 0, 60, 60));
        core.add(a.clone());
        core.add(b.clone());
        core.take_redraw_request();
        let before = core.invalidations();

        // Both targets change, one redraw request.
        core.dispatch(InputEvent::MouseMove(point(10, 10)));
        assert!(a.hovered.get() && b.hovered.get());
        assert_eq!(core.invalidations(), before + 1);

        core.dispatch(InputEvent::MouseMove(point(11, 11)));
        assert_eq!(core.invalidations(), before + 1);

        core.dispatch(InputEvent::MouseMove(point(55, 55)));
        assert!(!a.hovered.get() && b.hovered.get());
        assert_eq!(core.invalidations(), before + 2);
    }

    #[test]
    fn key_repeat_is_suppressed() {
        let core = WindowCore::new("test", extent(100, 100), Color::WHITE);
        let downs = Rc::new(Cell::new(0));
        {
            let downs = downs.clone();
            core.events().key_down.subscribe(move |_| downs.set(downs.get() + 1));
        }

        core.dispatch(InputEvent::KeyDown(Key::A));
        core.dispatch(InputEvent::KeyDown(Key::A));
        core.dispatch(InputEvent::KeyDown(Key::A));
        assert_eq!(downs.get(), 1);

        core.dispatch(InputEvent::KeyUp(Key::A));
        core.dispatch(InputEvent::KeyDown(Key::A));
        assert_eq!(downs.get(), 2);
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let core = WindowCore::new("test", extent(100, 100), Color::WHITE);
        let ups = Rc::new(RefCell::new(Vec::new()));
        let held = Rc::new(RefCell::new(Vec::new()));
        {
            let ups = ups.clone();
            core.events().key_up.subscribe(move |k| ups.borrow_mut().push(*k));
            let held = held.clone();
            core.events()
                .keys_down
                .subscribe(move |keys| *held.borrow_mut() = keys.to_vec());
        }

        core.dispatch(InputEvent::KeyDown(Key::SHIFT));
        core.dispatch(InputEvent::KeyDown(Key::W));
        assert_eq!(*held.borrow(), vec![Key::SHIFT, Key::W]);

        core.dispatch(InputEvent::FocusLost);
        assert_eq!(*ups.borrow(), vec![Key::SHIFT, Key::W]);
        assert!(held.borrow().is_empty());

        // Nothing left to release.
        core.dispatch(InputEvent::FocusLost);
        assert_eq!(ups.borrow().len(), 2);
    }

    #[test]
    fn destroyed_core_is_inert() {
        let core = WindowCore::new("test", extent(100, 100), Color::WHITE);
        let square = Square::new(Rect::from_ltrb(0, 0, 10, 10));
        core.add(square.clone());

        let closed = Rc::new(Cell::new(0));
        let moves = Rc::new(Cell::new(0));
        {
            let closed = closed.clone();
            core.events().closed.subscribe(move |_| closed.set(closed.get() + 1));
            let moves = moves.clone();
            core.events().mouse_move.subscribe(move |_| moves.set(moves.get() + 1));
        }

        assert!(core.mark_destroyed());
        assert!(!core.mark_destroyed());
        assert_eq!(closed.get(), 1);
        assert!(square.changed.is_empty());

        core.dispatch(InputEvent::MouseMove(point(1, 1)));
        core.invalidate();
        assert_eq!(moves.get(), 0);
        assert!(!core.take_redraw_request());
    }
}
