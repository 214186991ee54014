use std::cell::{Cell, RefCell};

use geometry::Point;
use graphics::{Canvas, Color, Font, Renderable};
use structures::EventSource;

use crate::replace_if_changed;

/// A single run of text with its top-left corner at a fixed position.
pub struct Text {
    position: Cell<Point>,
    content: RefCell<String>,
    color: Cell<Color>,
    font: RefCell<Font>,
    changed: EventSource<()>,
}

impl Text {
    /// Text in the default font (16px Arial).
    pub fn new(position: Point, content: impl Into<String>, color: Color) -> Self {
        Self::with_font(position, content, color, Font::default())
    }

    pub fn with_font(position: Point, content: impl Into<String>, color: Color, font: Font) -> Self {
        Self {
            position: Cell::new(position),
            content: RefCell::new(content.into()),
            color: Cell::new(color),
            font: RefCell::new(font),
            changed: EventSource::new(),
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position.get()
    }

    pub fn set_position(&self, position: Point) {
        if replace_if_changed(&self.position, position) {
            self.changed.emit(&());
        }
    }

    #[must_use]
    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        let content = content.into();
        if *self.content.borrow() == content {
            return;
        }

        *self.content.borrow_mut() = content;
        self.changed.emit(&());
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
    pub fn font(&self) -> Font {
        self.font.borrow().clone()
    }

    pub fn set_font(&self, font: Font) {
        if *self.font.borrow() == font {
            return;
        }

        *self.font.borrow_mut() = font;
        self.changed.emit(&());
    }
}

impl Renderable for Text {
    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.text(
            self.position.get(),
            &self.content.borrow(),
            self.color.get(),
            &self.font.borrow(),
        );
    }

    fn change_notifier(&self) -> Option<&EventSource<()>> {
        Some(&self.changed)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use geometry::{extent, point};
    use graphics::{DrawCommand, RecordingCanvas};

    use super::*;

    #[test]
    fn setters_notify() {
        let text = Text::new(point(50, 50), "hello", Color::BLACK);
        let count = Rc::new(Cell::new(0));
        {
            let count = count.clone();
            text.changed.subscribe(move |_| count.set(count.get() + 1));
        }

        text.set_content("hello");
        assert_eq!(count.get(), 0);

        text.set_content("world");
        text.set_position(point(60, 60));
        text.set_color(Color::RED);
        text.set_font(Font::new("Consolas", 12));
        assert_eq!(count.get(), 4);

        let mut canvas = RecordingCanvas::new(extent(200, 200));
        text.draw(&mut canvas);
        assert_eq!(
            canvas.commands(),
            &[DrawCommand::Text {
                at: point(60, 60),
                text: "world".to_string(),
                color: Color::RED,
                font: Font::new("Consolas", 12),
            }]
        );
    }
}
