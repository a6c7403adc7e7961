use std::borrow::Cow;
use std::fmt;

/// Built-in vertex stage: forwards the quad's NDC positions unchanged.
pub const PASSTHROUGH_VERTEX: &str = include_str!("shaders/passthrough.wgsl");

/// Built-in fragment stage: fills every fragment with the color uniform.
pub const SOLID_COLOR_FRAGMENT: &str = include_str!("shaders/solid_color.wgsl");

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// WGSL source text for both stages of a program.
///
/// Immutable once constructed. The built-in pair is embedded at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    vertex: Cow<'static, str>,
    fragment: Cow<'static, str>,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<Cow<'static, str>>, fragment: impl Into<Cow<'static, str>>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Pass-through vertex stage + solid-color fragment stage.
    pub const fn builtin() -> Self {
        Self {
            vertex: Cow::Borrowed(PASSTHROUGH_VERTEX),
            fragment: Cow::Borrowed(SOLID_COLOR_FRAGMENT),
        }
    }

    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self::builtin()
    }
}
