//! Program linking: checks that two compiled stages fit each other and the
//! fixed resources the frame renderer provides.
//!
//! The renderer supplies exactly one vertex attribute (`vec2<f32>` at
//! `@location(0)`), one color target (`@location(0)`) and one uniform
//! (`vec4<f32>` at `@group(0) @binding(0)`). Anything else is a link error.

use super::compile::{CompiledStage, IoType};
use super::error::PipelineError;

/// Vertex attribute location of the quad's position.
pub const POSITION_LOCATION: u32 = 0;

/// Bind group holding the color uniform.
pub const COLOR_GROUP: u32 = 0;

/// Binding index of the color uniform within `COLOR_GROUP`.
pub const COLOR_BINDING: u32 = 0;

/// Resource layout resolved by a successful link.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ProgramLayout {
    /// Stages that declare the color uniform.
    pub color_visibility: wgpu::ShaderStages,
}

pub(crate) fn link(
    vertex: &CompiledStage<'_>,
    fragment: &CompiledStage<'_>,
) -> Result<ProgramLayout, PipelineError> {
    let mut problems: Vec<String> = Vec::new();

    // Vertex attributes.
    match vertex.inputs.iter().find(|v| v.location == POSITION_LOCATION) {
        Some(v) if v.ty == IoType::VEC2_F32 => {}
        Some(v) => problems.push(format!(
            "vertex input @location({POSITION_LOCATION}) is {}, but the position attribute is {}",
            v.ty,
            IoType::VEC2_F32
        )),
        None => problems.push(format!(
            "vertex stage does not read the position attribute at @location({POSITION_LOCATION})"
        )),
    }
    for v in vertex.inputs.iter().filter(|v| v.location != POSITION_LOCATION) {
        problems.push(format!(
            "vertex input @location({}) has no vertex buffer attribute",
            v.location
        ));
    }

    // Inter-stage varyings.
    for input in &fragment.inputs {
        match vertex.outputs.iter().find(|o| o.location == input.location) {
            Some(o) if o.ty != input.ty => problems.push(format!(
                "fragment input @location({}) is {}, but the vertex stage writes {}",
                input.location, input.ty, o.ty
            )),
            Some(o) if o.interp != input.interp => problems.push(format!(
                "fragment input @location({}) uses {}, but the vertex stage writes {}",
                input.location, input.interp, o.interp
            )),
            Some(_) => {}
            None => problems.push(format!(
                "fragment input @location({}) is not written by the vertex stage",
                input.location
            )),
        }
    }

    // Color target.
    match fragment.outputs.iter().find(|o| o.location == 0) {
        Some(o) if o.ty == IoType::VEC4_F32 => {}
        Some(o) => problems.push(format!(
            "fragment output @location(0) is {}, but the color target expects {}",
            o.ty,
            IoType::VEC4_F32
        )),
        None => problems.push("fragment stage does not write a color at @location(0)".to_string()),
    }
    for o in fragment.outputs.iter().filter(|o| o.location != 0) {
        problems.push(format!("fragment output @location({}) has no color target", o.location));
    }

    // Resources.
    let mut color_visibility = wgpu::ShaderStages::NONE;
    let mut color_slot_misused = false;
    for (compiled, flag) in [
        (vertex, wgpu::ShaderStages::VERTEX),
        (fragment, wgpu::ShaderStages::FRAGMENT),
    ] {
        for decl in &compiled.resources {
            let name = decl.name.as_deref().unwrap_or("<unnamed>");
            if (decl.group, decl.binding) != (COLOR_GROUP, COLOR_BINDING) {
                problems.push(format!(
                    "{} stage declares `{name}` at @group({}) @binding({}); only the color uniform at @group({COLOR_GROUP}) @binding({COLOR_BINDING}) is provided",
                    compiled.stage, decl.group, decl.binding
                ));
            } else if !decl.is_uniform || decl.ty != IoType::VEC4_F32 {
                color_slot_misused = true;
                problems.push(format!(
                    "{} stage declares `{name}` at @group({COLOR_GROUP}) @binding({COLOR_BINDING}), which must be a var<uniform> of {}",
                    compiled.stage,
                    IoType::VEC4_F32
                ));
            } else {
                color_visibility |= flag;
            }
        }
    }
    if color_visibility.is_empty() && !color_slot_misused {
        problems.push(format!(
            "program declares no color uniform at @group({COLOR_GROUP}) @binding({COLOR_BINDING})"
        ));
    }

    if !problems.is_empty() {
        return Err(PipelineError::ShaderLink { log: problems.join("\n") });
    }

    Ok(ProgramLayout { color_visibility })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::compile::compile_stage;
    use crate::render::shader::{ShaderStage, PASSTHROUGH_VERTEX, SOLID_COLOR_FRAGMENT};

    fn link_sources(vs: &str, fs: &str) -> Result<ProgramLayout, PipelineError> {
        let vertex = compile_stage(ShaderStage::Vertex, vs).unwrap();
        let fragment = compile_stage(ShaderStage::Fragment, fs).unwrap();
        link(&vertex, &fragment)
    }

    #[test]
    fn builtin_pair_links() {
        let layout = link_sources(PASSTHROUGH_VERTEX, SOLID_COLOR_FRAGMENT).unwrap();
        assert_eq!(layout.color_visibility, wgpu::ShaderStages::FRAGMENT);
    }

    #[test]
    fn missing_varying_is_a_link_error() {
        let fs = "
            @group(0) @binding(0) var<uniform> u_color: vec4<f32>;
            @fragment fn fs_main(@location(2) shade: f32) -> @location(0) vec4<f32> {
                return u_color * shade;
            }
        ";
        let err = link_sources(PASSTHROUGH_VERTEX, fs).unwrap_err();
        assert_eq!(err.stage(), None);
        assert!(err.log().contains("@location(2) is not written"));
    }

    #[test]
    fn mismatched_varying_type_is_a_link_error() {
        let vs = "
            struct VsOut {
                @builtin(position) pos: vec4<f32>,
                @location(0) shade: vec2<f32>,
            };
            @vertex fn vs_main(@location(0) p: vec2<f32>) -> VsOut {
                return VsOut(vec4<f32>(p, 0.0, 1.0), p);
            }
        ";
        let fs = "
            @group(0) @binding(0) var<uniform> u_color: vec4<f32>;
            @fragment fn fs_main(@location(0) shade: f32) -> @location(0) vec4<f32> {
                return u_color * shade;
            }
        ";
        let err = link_sources(vs, fs).unwrap_err();
        assert!(err.log().contains("is f32, but the vertex stage writes vec2<f32>"));
    }

    #[test]
    fn mismatched_interpolation_is_a_link_error() {
        let vs = "
            struct VsOut {
                @builtin(position) pos: vec4<f32>,
                @location(0) shade: f32,
            };
            @vertex fn vs_main(@location(0) p: vec2<f32>) -> VsOut {
                return VsOut(vec4<f32>(p, 0.0, 1.0), 1.0);
            }
        ";
        let fs = "
            @group(0) @binding(0) var<uniform> u_color: vec4<f32>;
            @fragment fn fs_main(@location(0) @interpolate(flat) shade: f32) -> @location(0) vec4<f32> {
                return u_color * shade;
            }
        ";
        let err = link_sources(vs, fs).unwrap_err();
        assert_eq!(err.stage(), None);
        assert!(
            err.log().contains(
                "@location(0) uses @interpolate(flat), but the vertex stage writes @interpolate(perspective, center)"
            ),
            "{}",
            err.log()
        );
    }

    #[test]
    fn explicit_default_interpolation_links() {
        let vs = "
            struct VsOut {
                @builtin(position) pos: vec4<f32>,
                @location(0) shade: f32,
            };
            @vertex fn vs_main(@location(0) p: vec2<f32>) -> VsOut {
                return VsOut(vec4<f32>(p, 0.0, 1.0), 1.0);
            }
        ";
        let fs = "
            @group(0) @binding(0) var<uniform> u_color: vec4<f32>;
            @fragment fn fs_main(@location(0) @interpolate(perspective, center) shade: f32) -> @location(0) vec4<f32> {
                return u_color * shade;
            }
        ";
        link_sources(vs, fs).unwrap();
    }

    #[test]
    fn program_without_color_uniform_fails() {
        let fs = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        let err = link_sources(PASSTHROUGH_VERTEX, fs).unwrap_err();
        assert!(err.log().contains("no color uniform"));
    }

    #[test]
    fn wrongly_typed_color_uniform_fails() {
        let fs = "
            @group(0) @binding(0) var<uniform> u_color: vec3<f32>;
            @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(u_color, 1.0); }
        ";
        let err = link_sources(PASSTHROUGH_VERTEX, fs).unwrap_err();
        assert!(err.log().contains("must be a var<uniform> of vec4<f32>"));
        assert!(!err.log().contains("no color uniform"));
    }

    #[test]
    fn position_attribute_must_be_vec2() {
        let vs = "@vertex fn vs_main(@location(0) p: vec4<f32>) -> @builtin(position) vec4<f32> { return p; }";
        let err = link_sources(vs, SOLID_COLOR_FRAGMENT).unwrap_err();
        assert!(err.log().contains("position attribute is vec2<f32>"));
    }

    #[test]
    fn every_problem_is_reported() {
        let vs = "@vertex fn vs_main(@location(3) p: vec2<f32>) -> @builtin(position) vec4<f32> { return vec4<f32>(p, 0.0, 1.0); }";
        let fs = "@fragment fn fs_main() -> @location(1) vec4<f32> { return vec4<f32>(1.0); }";
        let err = link_sources(vs, fs).unwrap_err();
        let lines: Vec<&str> = err.log().lines().collect();
        // position, stray attribute, color target, stray output, uniform
        assert_eq!(lines.len(), 5, "{}", err.log());
    }

    #[test]
    fn uniform_shared_by_both_stages() {
        let vs = "
            @group(0) @binding(0) var<uniform> u_color: vec4<f32>;
            @vertex fn vs_main(@location(0) p: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(p * u_color.a, 0.0, 1.0);
            }
        ";
        let layout = link_sources(vs, SOLID_COLOR_FRAGMENT).unwrap();
        assert_eq!(
            layout.color_visibility,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT
        );
    }
}
