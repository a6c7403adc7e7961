use super::shader::ShaderStage;

/// Failure to turn shader source into a usable program.
///
/// Both variants are fatal for the program being built: no handle is
/// produced and nothing may be drawn with it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// One stage failed to parse, validate, or expose its entry point.
    #[error("failed to compile {stage} shader:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// Both stages compiled but their interfaces do not fit together.
    #[error("failed to link shader program:\n{log}")]
    ShaderLink { log: String },
}

impl PipelineError {
    /// Diagnostic text, without the summary line.
    pub fn log(&self) -> &str {
        match self {
            PipelineError::ShaderCompile { log, .. } | PipelineError::ShaderLink { log } => log,
        }
    }

    /// Stage that failed to compile; `None` for link failures.
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            PipelineError::ShaderCompile { stage, .. } => Some(*stage),
            PipelineError::ShaderLink { .. } => None,
        }
    }
}

/// A frame was requested on a target whose format the program was not built
/// for. Nothing is recorded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("target format {target:?} does not match program format {program:?}")]
pub struct FormatMismatch {
    pub target: wgpu::TextureFormat,
    pub program: wgpu::TextureFormat,
}
