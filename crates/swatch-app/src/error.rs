use swatch_engine::render::{FormatMismatch, PipelineError};
use thiserror::Error;

/// Errors surfaced by [`Demo`](crate::Demo) and [`Application`](crate::Application).
#[derive(Debug, Error)]
pub enum DemoError {
    /// Shader compile or link failed; the demo never becomes ready.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A frame was requested on a target the pipeline was not built for.
    #[error(transparent)]
    TargetFormat(#[from] FormatMismatch),

    /// A frame was requested before the pipeline was initialized.
    #[error("renderer is not initialized")]
    NotReady,

    /// No handler is registered under this event id.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
}
