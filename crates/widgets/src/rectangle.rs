use std::cell::Cell;

use geometry::Rect;
use graphics::{Canvas, Color, Renderable};
use structures::EventSource;

use crate::replace_if_changed;

/// A solid or outlined axis-aligned rectangle.
pub struct Rectangle {
    bounds: Cell<Rect>,
    color: Cell<Color>,
    filled: Cell<bool>,
    changed: EventSource<()>,
}

impl Rectangle {
    /// An outlined rectangle.
    #[must_use]
    pub fn new(bounds: Rect, color: Color) -> Self {
        Self {
            bounds: Cell::new(bounds),
            color: Cell::new(color),
            filled: Cell::new(false),
            changed: EventSource::new(),
        }
    }

    #[must_use]
    pub fn filled(bounds: Rect, color: Color) -> Self {
        let rect = Self::new(bounds, color);
        rect.filled.set(true);
        rect
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    pub fn set_bounds(&self, bounds: Rect) {
        if replace_if_changed(&self.bounds, bounds) {
            self.changed.emit(&());
        }
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color.get()
    }

    pub fn set_color(&self, color: Color) {
        if replace_if_changed(&self.color, color) {
            self.changed.emit(&());
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled.get()
    }

    pub fn set_filled(&self, filled: bool) {
        if replace_if_changed(&self.filled, filled) {
            self.changed.emit(&());
        }
    }
}

impl Renderable for Rectangle {
    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.filled.get() {
            canvas.fill_rect(self.bounds.get(), self.color.get());
        } else {
            canvas.stroke_rect(self.bounds.get(), self.color.get());
        }
    }

    fn change_notifier(&self) -> Option<&EventSource<()>> {
        Some(&self.changed)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use geometry::extent;
    use graphics::{DrawCommand, RecordingCanvas};

    use super::*;

    #[test]
    fn draws_outline_or_fill() {
        let bounds = Rect::from_ltrb(100, 100, 400, 300);
        let rect = Rectangle::new(bounds, Color::GREEN);
        let mut canvas = RecordingCanvas::new(extent(800, 600));

        rect.draw(&mut canvas);
        rect.set_filled(true);
        rect.draw(&mut canvas);

        assert_eq!(
            canvas.commands(),
            &[
                DrawCommand::StrokeRect {
                    rect: bounds,
                    color: Color::GREEN
                },
                DrawCommand::FillRect {
                    rect: bounds,
                    color: Color::GREEN
                },
            ]
        );
    }

    #[test]
    fn notifies_only_on_change() {
        let rect = Rectangle::filled(Rect::from_ltrb(0, 0, 10, 10), Color::RED);
        let count = Rc::new(Cell::new(0));
        {
            let count = count.clone();
            rect.change_notifier()
                .unwrap()
                .subscribe(move |_| count.set(count.get() + 1));
        }

        rect.set_color(Color::RED);
        rect.set_filled(true);
        assert_eq!(count.get(), 0);

        rect.set_color(Color::BLUE);
        rect.set_bounds(Rect::from_ltrb(5, 5, 10, 10));
        assert_eq!(count.get(), 2);
    }
}
