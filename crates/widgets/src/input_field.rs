use std::cell::{Cell, RefCell};

use geometry::{Point, Rect};
use graphics::{Canvas, Color, Font, KeyboardTarget, MouseTarget, Renderable, TextAlign};
use structures::EventSource;

const BACKSPACE: char = '\u{8}';
const PADDING: i32 = 4;

/// The colors an [`InputField`] draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputFieldStyle {
    pub normal: Color,
    pub hover: Color,
    pub focused: Color,
    pub border: Color,
    pub text: Color,
}

impl Default for InputFieldStyle {
    fn default() -> Self {
        Self {
            normal: Color::WHITE,
            hover: Color::rgb(230, 230, 230),
            focused: Color::rgb(200, 200, 255),
            border: Color::BLACK,
            text: Color::BLACK,
        }
    }
}

/// A single-line text entry box.
///
/// The field takes keyboard focus when the pointer is pressed inside it and
/// loses it when the pointer is pressed anywhere else. While focused, typed
/// characters are inserted at the caret and backspace deletes the character
/// before it.
pub struct InputField {
    bounds: Rect,
    text: RefCell<String>,
    /// In characters, not bytes.
    caret: Cell<usize>,
    font: RefCell<Font>,
    style: Cell<InputFieldStyle>,
    hovered: Cell<bool>,
    focused: Cell<bool>,
    changed: EventSource<()>,

    /// Raised with the new contents after every edit made by typing.
    pub text_changed: EventSource<str>,
    pub focus_gained: EventSource<()>,
    pub focus_lost: EventSource<()>,
}

impl InputField {
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            text: RefCell::new(String::new()),
            caret: Cell::new(0),
            font: RefCell::new(Font::default()),
            style: Cell::new(InputFieldStyle::default()),
            hovered: Cell::new(false),
            focused: Cell::new(false),
            changed: EventSource::new(),
            text_changed: EventSource::new(),
            focus_gained: EventSource::new(),
            focus_lost: EventSource::new(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Replaces the contents. The caret stays where it was, or moves to the
    /// end if the new text is shorter.
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        if *self.text.borrow() == text {
            return;
        }

        let len = text.chars().count();
        *self.text.borrow_mut() = text;
        self.caret.set(self.caret.get().min(len));
        self.changed.emit(&());
    }

    #[must_use]
    pub fn caret(&self) -> usize {
        self.caret.get()
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

    #[must_use]
    pub fn style(&self) -> InputFieldStyle {
        self.style.get()
    }

    pub fn set_style(&self, style: InputFieldStyle) {
        if self.style.replace(style) != style {
            self.changed.emit(&());
        }
    }

    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered.get()
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    fn background(&self) -> Color {
        let style = self.style.get();
        if self.focused.get() {
            style.focused
        } else if self.hovered.get() {
            style.hover
        } else {
            style.normal
        }
    }

    fn byte_offset(text: &str, chars: usize) -> usize {
        text.char_indices()
            .nth(chars)
            .map_or(text.len(), |(offset, _)| offset)
    }

    fn edit(&self, ch: char) -> bool {
        let mut text = self.text.borrow_mut();
        let caret = self.caret.get();

        if ch == BACKSPACE {
            if caret == 0 {
                return false;
            }
            let offset = Self::byte_offset(&text, caret - 1);
            text.remove(offset);
            self.caret.set(caret - 1);
        } else {
            let offset = Self::byte_offset(&text, caret);
            text.insert(offset, ch);
            self.caret.set(caret + 1);
        }
        true
    }
}

impl Renderable for InputField {
    fn draw(&self, canvas: &mut dyn Canvas) {
        let style = self.style.get();
        let text = self.text.borrow();
        let font = self.font.borrow();

        canvas.fill_rect(self.bounds, self.background());
        canvas.stroke_rect(self.bounds, style.border);

        let text_area = self.bounds.inset(PADDING, 0);
        canvas.text_in_rect(
            text_area,
            &text,
            style.text,
            &font,
            TextAlign::LEFT | TextAlign::VCENTER | TextAlign::SINGLE_LINE,
        );

        if self.focused.get() {
            let before = &text[..Self::byte_offset(&text, self.caret.get())];
            let x = text_area.left() + canvas.measure_text(before, &font).width;
            canvas.line(
                Point::new(x, self.bounds.top() + 2),
                Point::new(x, self.bounds.bottom() - 2),
                style.text,
                1,
            );
        }
    }

    fn change_notifier(&self) -> Option<&EventSource<()>> {
        Some(&self.changed)
    }

    fn as_mouse_target(&self) -> Option<&dyn MouseTarget> {
        Some(self)
    }

    fn as_keyboard_target(&self) -> Option<&dyn KeyboardTarget> {
        Some(self)
    }
}

impl MouseTarget for InputField {
    fn mouse_move(&self, at: Point) -> bool {
        let inside = self.bounds.contains(at);
        self.hovered.replace(inside) != inside
    }

    fn mouse_down(&self, at: Point) -> bool {
        let inside = self.bounds.contains(at);
        if self.focused.replace(inside) == inside {
            return false;
        }

        if inside {
            self.focus_gained.emit(&());
        } else {
            self.focus_lost.emit(&());
        }
        true
    }

    fn mouse_up(&self, _at: Point) -> bool {
        false
    }
}

impl KeyboardTarget for InputField {
    fn has_focus(&self) -> bool {
        self.focused.get()
    }

    fn key_press(&self, ch: char) -> bool {
        if !self.focused.get() || (ch.is_control() && ch != BACKSPACE) {
            return false;
        }

        if !self.edit(ch) {
            return false;
        }

        let text = self.text.borrow().clone();
        self.text_changed.emit(&text);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use geometry::{extent, point};
    use graphics::{DrawCommand, RecordingCanvas};

    use super::*;

    fn field() -> InputField {
        InputField::new(Rect::from_ltrb(10, 10, 210, 40))
    }

    fn type_str(field: &InputField, s: &str) {
        for ch in s.chars() {
            field.key_press(ch);
        }
    }

    #[test]
    fn focus_follows_presses() {
        let field = field();
        let gained = Rc::new(Cell::new(0));
        let lost = Rc::new(Cell::new(0));
        {
            let gained = gained.clone();
            field.focus_gained.subscribe(move |_| gained.set(gained.get() + 1));
            let lost = lost.clone();
            field.focus_lost.subscribe(move |_| lost.set(lost.get() + 1));
        }

        assert!(!field.mouse_down(point(500, 500)));
        assert!(field.mouse_down(point(20, 20)));
        assert!(!field.mouse_down(point(30, 30)));
        assert!(field.has_focus());

        assert!(field.mouse_down(point(500, 500)));
        assert!(!field.has_focus());

        assert_eq!((gained.get(), lost.get()), (1, 1));
    }

    #[test]
    fn typing_requires_focus() {
        let field = field();
        assert!(!field.key_press('a'));
        assert_eq!(field.text(), "");

        field.mouse_down(point(20, 20));
        assert!(field.key_press('a'));
        assert_eq!(field.text(), "a");
    }

    #[test]
    fn editing() {
        let field = field();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            field
                .text_changed
                .subscribe(move |text: &str| seen.borrow_mut().push(text.to_string()));
        }

        field.mouse_down(point(20, 20));
        type_str(&field, "hé");
        assert_eq!(field.caret(), 2);

        assert!(field.key_press(BACKSPACE));
        assert_eq!(field.text(), "h");
        assert!(field.key_press(BACKSPACE));
        assert!(!field.key_press(BACKSPACE));

        // Other control characters are ignored.
        assert!(!field.key_press('\r'));
        assert!(!field.key_press('\u{1b}'));

        assert_eq!(*seen.borrow(), ["h", "hé", "h", ""]);
    }

    #[test]
    fn set_text_clamps_caret() {
        let field = field();
        field.mouse_down(point(20, 20));
        type_str(&field, "hello");

        field.set_text("hi");
        assert_eq!(field.caret(), 2);
        assert!(field.key_press('!'));
        assert_eq!(field.text(), "hi!");
    }

    #[test]
    fn caret_drawn_only_when_focused() {
        let field = field();
        field.set_text("ab");

        let mut canvas = RecordingCanvas::new(extent(300, 100));
        field.draw(&mut canvas);
        assert_eq!(canvas.commands().len(), 3);

        field.mouse_down(point(20, 20));
        type_str(&field, "c");

        let mut canvas = RecordingCanvas::new(extent(300, 100));
        field.draw(&mut canvas);

        // Caret after "c", at the start because set_text left it at 0.
        assert_eq!(
            canvas.commands()[3],
            DrawCommand::Line {
                from: point(14 + 8, 12),
                to: point(14 + 8, 38),
                color: Color::BLACK,
                width: 1,
            }
        );
        assert_eq!(field.text(), "cab");
    }
}
