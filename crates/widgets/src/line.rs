use std::cell::Cell;

use geometry::Point;
use graphics::{Canvas, Color, Disposable, Renderable};
use structures::EventSource;

use crate::replace_if_changed;

/// A straight line segment.
///
/// Disposing a line detaches all of its observers. A disposed line no longer
/// draws or notifies.
pub struct Line {
    start: Cell<Point>,
    end: Cell<Point>,
    color: Cell<Color>,
    width: Cell<u32>,
    disposed: Cell<bool>,
    changed: EventSource<()>,
}

impl Line {
    #[must_use]
    pub fn new(start: Point, end: Point, color: Color) -> Self {
        Self {
            start: Cell::new(start),
            end: Cell::new(end),
            color: Cell::new(color),
            width: Cell::new(1),
            disposed: Cell::new(false),
            changed: EventSource::new(),
        }
    }

    #[must_use]
    pub fn start(&self) -> Point {
        self.start.get()
    }

    pub fn set_start(&self, start: Point) {
        if replace_if_changed(&self.start, start) {
            self.notify();
        }
    }

    #[must_use]
    pub fn end(&self) -> Point {
        self.end.get()
    }

    pub fn set_end(&self, end: Point) {
        if replace_if_changed(&self.end, end) {
            self.notify();
        }
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color.get()
    }

    pub fn set_color(&self, color: Color) {
        if replace_if_changed(&self.color, color) {
            self.notify();
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn set_width(&self, width: u32) {
        if replace_if_changed(&self.width, width) {
            self.notify();
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    fn notify(&self) {
        if !self.disposed.get() {
            self.changed.emit(&());
        }
    }
}

impl Renderable for Line {
    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.disposed.get() {
            log::debug!("skipping draw of a disposed line");
            return;
        }

        canvas.line(
            self.start.get(),
            self.end.get(),
            self.color.get(),
            self.width.get(),
        );
    }

    fn change_notifier(&self) -> Option<&EventSource<()>> {
        Some(&self.changed)
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl Disposable for Line {
    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.changed.clear();
    }
}
