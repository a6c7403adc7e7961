//! Swatch engine crate.
//!
//! Platform and GPU plumbing for the color-swatch demo: window runtime,
//! device setup, input translation, and the shader pipeline + quad renderer.

pub mod core;
pub mod device;
pub mod input;
pub mod window;

pub mod logging;
pub mod paint;
pub mod render;
