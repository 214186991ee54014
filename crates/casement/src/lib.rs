//! A small retained-mode windowing toolkit.
//!
//! Build a [`Window`], fill it with [`Renderable`] items (the [`widgets`]
//! module has a few ready-made ones), subscribe to its [`events`], and hand
//! it to a [`WindowManager`] to run:
//!
//! ```no_run
//! use std::rc::Rc;
//!
//! use casement::{geometry::Rect, widgets::Button, Window, WindowConfig, WindowManager};
//!
//! let window = Window::new(&WindowConfig::new("Hello", 640, 480))?;
//! let button = Rc::new(Button::new(Rect::from_ltrb(20, 20, 140, 60), "Quit"));
//! {
//!     let window = window.clone();
//!     button.clicked.subscribe(move |_| window.close());
//! }
//! window.add(button);
//!
//! let manager = WindowManager::new();
//! manager.register_window(window)?;
//! manager.run();
//! # Ok::<(), casement::Error>(())
//! ```
//!
//! [`events`]: Window::events

pub use geometry;
pub use graphics;
pub use shell;
pub use structures;
pub use widgets;

pub use graphics::{
    Canvas, Color, Disposable, Font, KeyboardTarget, MouseTarget, RenderStack, Renderable,
    TextAlign,
};
pub use shell::{
    dispose_native_resources, Backend, Error, InputEvent, Key, Wheel, Window, WindowConfig,
    WindowEvents, WindowManager,
};
pub use structures::{EventSource, SubscriptionId};
