//! Color model shared between the application layer and renderers.

pub mod color;

pub use color::Color;
