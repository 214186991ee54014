use std::rc::Rc;

use geometry::Point;
use structures::EventSource;

use crate::Canvas;

/// Something that can be drawn into a window.
///
/// Beyond drawing, an item may expose optional capabilities. The window
/// inspects them when the item is added or removed and while routing input:
///
/// - [`change_notifier`](Self::change_notifier): the window subscribes to it
///   and schedules a redraw whenever the item reports a visual change.
/// - [`as_mouse_target`](Self::as_mouse_target): receives pointer input.
/// - [`as_keyboard_target`](Self::as_keyboard_target): receives character input
///   while it reports focus.
/// - [`as_disposable`](Self::as_disposable): released when it is removed from
///   a window.
pub trait Renderable {
    fn draw(&self, canvas: &mut dyn Canvas);

    fn change_notifier(&self) -> Option<&EventSource<()>> {
        None
    }

    fn as_mouse_target(&self) -> Option<&dyn MouseTarget> {
        None
    }

    fn as_keyboard_target(&self) -> Option<&dyn KeyboardTarget> {
        None
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

/// Pointer input, in client-area pixels.
///
/// Every target sees every event; each one performs its own hit test. The
/// return value reports whether the target's appearance changed, which is how
/// the window decides whether to redraw.
pub trait MouseTarget {
    fn mouse_move(&self, at: Point) -> bool;

    fn mouse_down(&self, at: Point) -> bool;

    fn mouse_up(&self, at: Point) -> bool;
}

/// Character input for text entry.
pub trait KeyboardTarget {
    fn has_focus(&self) -> bool;

    /// Called with each typed character while [`has_focus`](Self::has_focus)
    /// is true. Backspace arrives as `'\u{8}'`. Returns true if the target's
    /// appearance changed.
    fn key_press(&self, ch: char) -> bool;
}

/// An item holding a resource that must be released explicitly.
pub trait Disposable {
    /// Releases the resource. Calling this more than once has no effect.
    fn dispose(&self);
}

/// Compares two items by identity.
#[must_use]
pub fn same_item(a: &Rc<dyn Renderable>, b: &Rc<dyn Renderable>) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a).cast::<()>(),
        Rc::as_ptr(b).cast::<()>(),
    )
}

/// An ordered list of renderable items.
///
/// Insertion order is both the draw order (later items draw on top) and the
/// order in which items receive routed input. The same item may be added more
/// than once.
#[derive(Default)]
pub struct RenderStack {
    items: Vec<Rc<dyn Renderable>>,
}

impl RenderStack {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn add(&mut self, item: Rc<dyn Renderable>) {
        self.items.push(item);
    }

    /// Removes the first occurrence of `item`. Returns false if it was not
    /// present.
    pub fn remove(&mut self, item: &Rc<dyn Renderable>) -> bool {
        if let Some(index) = self.items.iter().position(|i| same_item(i, item)) {
            self.items.remove(index);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, item: &Rc<dyn Renderable>) -> bool {
        self.items.iter().any(|i| same_item(i, item))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<dyn Renderable>> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Draws every item in insertion order.
    pub fn draw_all(&self, canvas: &mut dyn Canvas) {
        for item in &self.items {
            item.draw(canvas);
        }
    }

    /// A snapshot of the items that accept pointer input, in insertion order.
    #[must_use]
    pub fn mouse_targets(&self) -> Vec<Rc<dyn Renderable>> {
        self.items
            .iter()
            .filter(|i| i.as_mouse_target().is_some())
            .cloned()
            .collect()
    }

    /// A snapshot of the items that accept character input, in insertion
    /// order.
    #[must_use]
    pub fn keyboard_targets(&self) -> Vec<Rc<dyn Renderable>> {
        self.items
            .iter()
            .filter(|i| i.as_keyboard_target().is_some())
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a RenderStack {
    type Item = &'a Rc<dyn Renderable>;
    type IntoIter = std::slice::Iter<'a, Rc<dyn Renderable>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Rc<dyn Renderable>> for RenderStack {
    fn from_iter<I: IntoIterator<Item = Rc<dyn Renderable>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for RenderStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderStack")
            .field("items", &self.items.len())
            .finish()
    }
}
