//! GPU device + surface management.
//!
//! This module is responsible for:
//! - selecting an adapter and creating the Device/Queue
//! - creating & configuring the window Surface (swapchain)
//! - a windowless context for offscreen rendering

mod error;
mod frame;
mod gpu;
mod headless;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use headless::HeadlessGpu;
pub use init::GpuInit;

#[cfg(test)]
pub(crate) use headless::testing;
