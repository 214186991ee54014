use std::rc::Rc;

use casement::{
    geometry::{point, Rect},
    widgets::{Button, InputField, Line, Rectangle, Text},
    Color, Key, Window, WindowConfig, WindowManager,
};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let manager = WindowManager::new();

    let first = match MainWindow::new(&manager) {
        Ok(window) => window,
        Err(e) => {
            log::error!("could not create the main window: {}", e);
            return;
        }
    };

    if let Err(e) = manager.register_window(first.window.clone()) {
        log::error!("{}", e);
        return;
    }

    manager.run();
    casement::dispose_native_resources();
}

struct MainWindow {
    window: Window,
}

impl MainWindow {
    fn new(manager: &WindowManager) -> Result<Self, casement::Error> {
        let window = Window::new(
            &WindowConfig::new("Casement", 800, 600).with_background(Color::rgb(240, 240, 240)),
        )?;

        window.add(Rc::new(Text::new(
            point(50, 50),
            "Type below, then press Next",
            Color::BLACK,
        )));
        window.add(Rc::new(Rectangle::filled(
            Rect::from_ltrb(100, 100, 400, 300),
            Color::rgb(0, 160, 0),
        )));
        window.add(Rc::new(Line::new(point(100, 320), point(400, 320), Color::GRAY)));

        let field = Rc::new(InputField::new(Rect::from_ltrb(100, 340, 400, 370)));
        field
            .text_changed
            .subscribe(|text: &str| log::info!("text is now {:?}", text));
        window.add(field.clone());

        let next = Rc::new(Button::new(Rect::from_ltrb(100, 400, 300, 450), "Next"));
        {
            let manager = manager.clone();
            let field = field.clone();
            next.clicked.subscribe(move |_| {
                let greeting = field.text();
                match SecondWindow::new(&greeting) {
                    Ok(second) => {
                        if let Err(e) = manager.switch_window(second.window, true) {
                            log::error!("{}", e);
                        }
                    }
                    Err(e) => log::error!("could not create the second window: {}", e),
                }
            });
        }
        window.add(next);

        {
            let window_ = window.clone();
            window.events().key_down.subscribe(move |key| {
                if *key == Key::ESCAPE {
                    window_.close();
                }
            });
        }

        window
            .events()
            .keys_down
            .subscribe(|keys| log::trace!("held: {:?}", keys));

        Ok(Self { window })
    }
}

struct SecondWindow {
    window: Window,
}

impl SecondWindow {
    fn new(greeting: &str) -> Result<Self, casement::Error> {
        let window = Window::new(&WindowConfig::new("Casement - second", 400, 200))?;

        let greeting = if greeting.is_empty() {
            "Hello!".to_string()
        } else {
            format!("Hello, {}!", greeting)
        };
        window.add(Rc::new(Text::new(point(20, 20), greeting, Color::BLACK)));

        let counter = Rc::new(Text::new(point(20, 60), "0 ticks", Color::GRAY));
        {
            let counter = counter.clone();
            let ticks = std::cell::Cell::new(0u64);
            window.events().tick.subscribe(move |_| {
                let n = ticks.get() + 1;
                ticks.set(n);
                if n % 60 == 0 {
                    counter.set_content(format!("{} ticks", n));
                }
            });
        }
        window.add(counter);

        Ok(Self { window })
    }
}
