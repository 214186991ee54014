//! A handful of ready-made items for a window's render stack.
//!
//! Every widget keeps its state behind `Cell`/`RefCell` so that it can be
//! shared as an `Rc<dyn Renderable>` between the window that draws it and the
//! application code that changes it. Setters raise the widget's change
//! notification, which the owning window turns into a redraw.

mod button;
mod input_field;
mod line;
mod rectangle;
mod text;

pub use button::{Button, ButtonStyle};
pub use input_field::{InputField, InputFieldStyle};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::Text;

/// Replaces the value in `cell` and reports whether it was different.
fn replace_if_changed<T: Copy + PartialEq>(cell: &std::cell::Cell<T>, value: T) -> bool {
    cell.replace(value) != value
}
