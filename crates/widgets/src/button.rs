use std::cell::{Cell, RefCell};

use geometry::{Point, Rect};
use graphics::{Canvas, Color, Font, MouseTarget, Renderable, TextAlign};
use structures::EventSource;

/// The colors a [`Button`] draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonStyle {
    pub normal: Color,
    pub hover: Color,
    pub pressed: Color,
    pub border: Color,
    pub text: Color,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            normal: Color::rgb(200, 200, 200),
            hover: Color::rgb(180, 180, 180),
            pressed: Color::rgb(160, 160, 160),
            border: Color::BLACK,
            text: Color::BLACK,
        }
    }
}

/// A push button with a centered label.
///
/// Hover and press state changes are reported to the window through the
/// [`MouseTarget`] return values; only label, font and style changes raise the
/// change notification.
pub struct Button {
    bounds: Rect,
    label: RefCell<String>,
    font: RefCell<Font>,
    style: Cell<ButtonStyle>,
    hovered: Cell<bool>,
    pressed: Cell<bool>,
    changed: EventSource<()>,

    /// The pointer was pressed and released inside the button.
    pub clicked: EventSource<()>,
    pub mouse_enter: EventSource<()>,
    pub mouse_leave: EventSource<()>,
    /// The pointer was pressed inside the button.
    pub mouse_down: EventSource<()>,
    /// The pointer was released after a press that started inside the button,
    /// wherever the release happened.
    pub mouse_up: EventSource<()>,
}

impl Button {
    pub fn new(bounds: Rect, label: impl Into<String>) -> Self {
        Self {
            bounds,
            label: RefCell::new(label.into()),
            font: RefCell::new(Font::default()),
            style: Cell::new(ButtonStyle::default()),
            hovered: Cell::new(false),
            pressed: Cell::new(false),
            changed: EventSource::new(),
            clicked: EventSource::new(),
            mouse_enter: EventSource::new(),
            mouse_leave: EventSource::new(),
            mouse_down: EventSource::new(),
            mouse_up: EventSource::new(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        let label = label.into();
        if *self.label.borrow() == label {
            return;
        }

        *self.label.borrow_mut() = label;
        self.changed.emit(&());
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
    pub fn style(&self) -> ButtonStyle {
        self.style.get()
    }

    pub fn set_style(&self, style: ButtonStyle) {
        if self.style.replace(style) != style {
            self.changed.emit(&());
        }
    }

    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered.get()
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed.get()
    }

    fn background(&self) -> Color {
        let style = self.style.get();
        if self.pressed.get() {
            style.pressed
        } else if self.hovered.get() {
            style.hover
        } else {
            style.normal
        }
    }
}

impl Renderable for Button {
    fn draw(&self, canvas: &mut dyn Canvas) {
        let style = self.style.get();

        canvas.fill_rect(self.bounds, self.background());
        canvas.stroke_rect(self.bounds, style.border);
        canvas.text_in_rect(
            self.bounds,
            &self.label.borrow(),
            style.text,
            &self.font.borrow(),
            TextAlign::CENTER | TextAlign::VCENTER | TextAlign::SINGLE_LINE,
        );
    }

    fn change_notifier(&self) -> Option<&EventSource<()>> {
        Some(&self.changed)
    }

    fn as_mouse_target(&self) -> Option<&dyn MouseTarget> {
        Some(self)
    }
}

impl MouseTarget for Button {
    fn mouse_move(&self, at: Point) -> bool {
        let inside = self.bounds.contains(at);
        if inside == self.hovered.get() {
            return false;
        }

        self.hovered.set(inside);
        if inside {
            self.mouse_enter.emit(&());
        } else {
            self.mouse_leave.emit(&());
        }
        true
    }

    fn mouse_down(&self, at: Point) -> bool {
        if !self.bounds.contains(at) {
            return false;
        }

        let changed = !self.pressed.replace(true);
        self.mouse_down.emit(&());
        changed
    }

    fn mouse_up(&self, at: Point) -> bool {
        if !self.pressed.replace(false) {
            return false;
        }

        self.mouse_up.emit(&());
        if self.bounds.contains(at) {
            self.clicked.emit(&());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use geometry::{extent, point};
    use graphics::{DrawCommand, RecordingCanvas};

    use super::*;

    fn counter(source: &EventSource<()>) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        source.subscribe(move |_| c.set(c.get() + 1));
        count
    }

    fn button() -> Button {
        Button::new(Rect::from_ltrb(100, 100, 300, 150), "OK")
    }

    #[test]
    fn hover_transitions() {
        let button = button();
        let enter = counter(&button.mouse_enter);
        let leave = counter(&button.mouse_leave);
        let changed = counter(&button.changed);

        assert!(button.mouse_move(point(150, 150)));
        assert!(button.is_hovered());
        assert!(!button.mouse_move(point(160, 120)));

        assert!(button.mouse_move(point(500, 500)));
        assert!(!button.is_hovered());
        assert!(!button.mouse_move(point(501, 501)));

        assert_eq!(enter.get(), 1);
        assert_eq!(leave.get(), 1);
        assert_eq!(changed.get(), 0);
    }

    #[test]
    fn edges_are_inside() {
        let button = button();
        assert!(button.mouse_move(point(300, 150)));
        assert!(button.is_hovered());
        assert!(button.mouse_move(point(301, 150)));
    }

    #[test]
    fn click_requires_release_inside() {
        let button = button();
        let clicked = counter(&button.clicked);
        let released = counter(&button.mouse_up);

        assert!(!button.mouse_down(point(10, 10)));
        assert!(!button.mouse_up(point(150, 120)));
        assert_eq!(clicked.get(), 0);

        assert!(button.mouse_down(point(150, 120)));
        assert!(button.is_pressed());
        assert!(button.mouse_up(point(160, 130)));
        assert_eq!(clicked.get(), 1);

        button.mouse_down(point(150, 120));
        button.mouse_up(point(500, 500));
        assert_eq!(clicked.get(), 1);
        assert_eq!(released.get(), 2);
    }

    #[test]
    fn draws_by_state() {
        let button = button();
        let style = button.style();
        button.mouse_move(point(150, 120));
        button.mouse_down(point(150, 120));

        let mut canvas = RecordingCanvas::new(extent(400, 400));
        button.draw(&mut canvas);

        assert_eq!(
            canvas.commands()[0],
            DrawCommand::FillRect {
                rect: button.bounds(),
                color: style.pressed
            }
        );
        assert!(matches!(
            &canvas.commands()[2],
            DrawCommand::TextInRect { text, .. } if text == "OK"
        ));
    }

    #[test]
    fn label_change_notifies() {
        let button = button();
        let changed = counter(&button.changed);

        button.set_label("OK");
        button.set_label("Cancel");
        assert_eq!(changed.get(), 1);
        assert_eq!(button.label(), "Cancel");
    }
}
