//! GPU rendering subsystem.
//!
//! Turns a pair of WGSL shader sources into a linked [`Program`] and draws the
//! fixed quad with it, filled with one uniform color.
//!
//! Convention:
//! - Quad geometry is in normalized device coordinates (+Y up).
//! - Renderers never own a device; the host passes a [`RenderCtx`] in.

mod compile;
mod ctx;
mod error;
mod frame;
mod link;
mod offscreen;
mod program;
mod quad;
mod shader;

pub use ctx::{RenderCtx, RenderTarget};
pub use error::{FormatMismatch, PipelineError};
pub use frame::{FrameRenderer, CLEAR_COLOR};
pub use link::{COLOR_BINDING, COLOR_GROUP, POSITION_LOCATION};
pub use offscreen::{Framebuffer, OffscreenTarget};
pub use program::Program;
pub use quad::{QuadBuffer, QuadVertex, QUAD_VERTICES};
pub use shader::{ShaderSource, ShaderStage, PASSTHROUGH_VERTEX, SOLID_COLOR_FRAGMENT};
