//! Swatch: a colored rectangle whose fill is picked by activation events.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use swatch_app::Application;
//!
//! // Open a window; keys 1/2/3 pick red/green/blue, R or 0 resets.
//! Application::new().title("swatch").run()?;
//!
//! // Or render one frame offscreen.
//! let fb = Application::new().replay("color2").snapshot(640, 480)?;
//! fb.save_png("green.png")?;
//! ```

pub mod app;
pub mod demo;
pub mod error;
pub mod keymap;
pub mod palette;

pub use app::Application;
pub use demo::Demo;
pub use error::DemoError;
pub use keymap::{KeyAction, KeyBindings};
pub use palette::{ColorEvent, ColorHandler, HandlerTable, DEFAULT_COLOR};
