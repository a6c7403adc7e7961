//! Per-stage compilation: WGSL text -> validated module + reflected interface.

use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::error::PipelineError;
use super::shader::ShaderStage;

/// Type of a value crossing a stage boundary or bound as a resource.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum IoType {
    Scalar(naga::Scalar),
    Vector(naga::VectorSize, naga::Scalar),
    Other,
}

impl IoType {
    pub(crate) const VEC2_F32: Self = IoType::Vector(naga::VectorSize::Bi, naga::Scalar::F32);
    pub(crate) const VEC4_F32: Self = IoType::Vector(naga::VectorSize::Quad, naga::Scalar::F32);

    fn of(module: &naga::Module, ty: naga::Handle<naga::Type>) -> Self {
        match &module.types[ty].inner {
            naga::TypeInner::Scalar(s) => IoType::Scalar(*s),
            naga::TypeInner::Vector { size, scalar } => IoType::Vector(*size, *scalar),
            _ => IoType::Other,
        }
    }
}

fn scalar_name(s: naga::Scalar) -> String {
    let prefix = match s.kind {
        naga::ScalarKind::Float => "f",
        naga::ScalarKind::Sint => "i",
        naga::ScalarKind::Uint => "u",
        naga::ScalarKind::Bool => return "bool".to_string(),
        _ => "abstract-",
    };
    format!("{prefix}{}", u32::from(s.width) * 8)
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoType::Scalar(s) => f.write_str(&scalar_name(*s)),
            IoType::Vector(size, s) => {
                let n = match size {
                    naga::VectorSize::Bi => 2,
                    naga::VectorSize::Tri => 3,
                    naga::VectorSize::Quad => 4,
                };
                write!(f, "vec{n}<{}>", scalar_name(*s))
            }
            IoType::Other => f.write_str("a non-vector type"),
        }
    }
}

/// Effective `@interpolate` of a varying, with WGSL defaults filled in.
///
/// Sampling is only tracked for perspective and linear interpolation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Interp {
    pub kind: naga::Interpolation,
    pub sampling: Option<naga::Sampling>,
}

impl Interp {
    fn resolve(
        ty: IoType,
        interpolation: Option<naga::Interpolation>,
        sampling: Option<naga::Sampling>,
    ) -> Self {
        let is_float = matches!(
            ty,
            IoType::Scalar(s) | IoType::Vector(_, s) if s.kind == naga::ScalarKind::Float
        );
        let kind = interpolation.unwrap_or(if is_float {
            naga::Interpolation::Perspective
        } else {
            naga::Interpolation::Flat
        });
        let sampling = match kind {
            naga::Interpolation::Flat => None,
            _ => Some(sampling.unwrap_or(naga::Sampling::Center)),
        };
        Self { kind, sampling }
    }
}

impl fmt::Display for Interp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@interpolate({}", format!("{:?}", self.kind).to_lowercase())?;
        if let Some(sampling) = self.sampling {
            write!(f, ", {}", format!("{sampling:?}").to_lowercase())?;
        }
        f.write_str(")")
    }
}

/// A user-defined (`@location`) input or output of an entry point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Varying {
    pub location: u32,
    pub ty: IoType,
    pub interp: Interp,
}

/// A global declared with `@group/@binding`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResourceDecl {
    pub group: u32,
    pub binding: u32,
    pub name: Option<String>,
    pub is_uniform: bool,
    pub ty: IoType,
}

/// One successfully compiled stage and the interface it exposes.
#[derive(Debug)]
pub(crate) struct CompiledStage<'s> {
    pub stage: ShaderStage,
    pub source: &'s str,
    pub entry_point: String,
    pub inputs: Vec<Varying>,
    pub outputs: Vec<Varying>,
    pub resources: Vec<ResourceDecl>,
}

/// Parses and validates `source`, then reflects the single entry point of
/// kind `stage`.
///
/// Diagnostics carry the rendered source excerpt produced by naga.
pub(crate) fn compile_stage(
    stage: ShaderStage,
    source: &str,
) -> Result<CompiledStage<'_>, PipelineError> {
    let fail = |log: String| PipelineError::ShaderCompile { stage, log };

    let module = naga::front::wgsl::parse_str(source).map_err(|e| fail(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(source)))?;

    let mut candidates = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == stage.to_naga());

    let entry = match (candidates.next(), candidates.next()) {
        (Some(ep), None) => ep,
        (None, _) => return Err(fail(format!("no @{stage} entry point found"))),
        (Some(a), Some(b)) => {
            return Err(fail(format!(
                "multiple @{stage} entry points (`{}`, `{}`); expected exactly one",
                a.name, b.name
            )));
        }
    };

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_locations(&module, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_locations(&module, result.ty, result.binding.as_ref(), &mut outputs);
    }

    inputs.sort_by_key(|v| v.location);
    outputs.sort_by_key(|v| v.location);

    let resources = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let rb = var.binding.as_ref()?;
            Some(ResourceDecl {
                group: rb.group,
                binding: rb.binding,
                name: var.name.clone(),
                is_uniform: matches!(var.space, naga::AddressSpace::Uniform),
                ty: IoType::of(&module, var.ty),
            })
        })
        .collect();

    log::debug!(
        "compiled {stage} stage `{}` ({} inputs, {} outputs)",
        entry.name,
        inputs.len(),
        outputs.len()
    );

    Ok(CompiledStage {
        stage,
        source,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        resources,
    })
}

/// Flattens `@location` bindings of an argument or result, descending into
/// IO structs. Built-ins are skipped.
fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(naga::Binding::Location {
            location,
            interpolation,
            sampling,
            ..
        }) => {
            let ty = IoType::of(module, ty);
            out.push(Varying {
                location: *location,
                ty,
                interp: Interp::resolve(ty, *interpolation, *sampling),
            });
        }
        Some(_) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}
