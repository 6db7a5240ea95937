//! Shader program builder.
//!
//! Each stage is compiled on its own (WGSL parse + validation through naga),
//! then the two stages are linked: entry points, the interface between the
//! stages, and the named resource slots are checked before any GPU object is
//! created. Diagnostics are capped at [`MAX_LOG_BYTES`].

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// Upper bound on the diagnostic text carried by a [`ShaderError`].
pub const MAX_LOG_BYTES: usize = 1024;

/// Camera box uniform (vertex stage).
pub const VIEW_PROJECTION_SLOT: &str = "view_projection";
/// Per-draw placement uniform (vertex stage).
pub const MODEL_SLOT: &str = "model";
/// Texture sampled by the fragment stage.
pub const TEXTURE_SLOT: &str = "texture1";

const QUAD_VERTEX_SRC: &str = include_str!("shaders/quad.vert.wgsl");
const QUAD_FRAGMENT_SRC: &str = include_str!("shaders/quad.frag.wgsl");

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Entry point name each stage must export.
    pub const fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }

    fn naga(self) -> naga::ShaderStage {
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

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShaderError {
    #[error("{stage} shader compile error - {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("shader link error - {log}")]
    Link { log: String },
}

impl ShaderError {
    /// Compiler or linker diagnostic text.
    pub fn log(&self) -> &str {
        match self {
            ShaderError::Compile { log, .. } | ShaderError::Link { log } => log,
        }
    }
}

/// One successfully compiled stage. Consumed by [`ShaderProgram::link`].
#[derive(Debug)]
pub struct CompiledStage {
    stage: ShaderStage,
    source: Cow<'static, str>,
    module: naga::Module,
}

/// Parses and validates one stage.
pub fn compile_stage(
    stage: ShaderStage,
    source: impl Into<Cow<'static, str>>,
) -> Result<CompiledStage, ShaderError> {
    let source = source.into();

    let compile_error = |log: String| {
        let log = truncate_log(log);
        log::error!("{stage} shader compile error - {log}");
        ShaderError::Compile { stage, log }
    };

    let module = naga::front::wgsl::parse_str(&source)
        .map_err(|e| compile_error(e.emit_to_string(&source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| compile_error(e.emit_to_string(&source)))?;

    Ok(CompiledStage { stage, source, module })
}

/// A linked vertex + fragment pair, ready for pipeline creation.
///
/// Only the validated sources survive linking; the per-stage IR is dropped.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    vertex_source: Cow<'static, str>,
    fragment_source: Cow<'static, str>,
}

impl ShaderProgram {
    /// Compiles both stages and links them.
    pub fn build(
        vertex_source: impl Into<Cow<'static, str>>,
        fragment_source: impl Into<Cow<'static, str>>,
    ) -> Result<Self, ShaderError> {
        let vertex = compile_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment = compile_stage(ShaderStage::Fragment, fragment_source)?;
        Self::link(vertex, fragment)
    }

    /// Built-in textured quad program.
    pub fn quad() -> Result<Self, ShaderError> {
        Self::build(QUAD_VERTEX_SRC, QUAD_FRAGMENT_SRC)
    }

    pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> Result<Self, ShaderError> {
        let link_error = |log: String| {
            let log = truncate_log(log);
            log::error!("shader link error - {log}");
            ShaderError::Link { log }
        };

        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(link_error(format!(
                "expected vertex + fragment stages, got {} + {}",
                vertex.stage, fragment.stage
            )));
        }

        let vs = find_entry(&vertex).map_err(link_error)?;
        let fs = find_entry(&fragment).map_err(link_error)?;

        let outputs = vertex_output_locations(&vertex.module, vs);
        let inputs = fragment_input_locations(&fragment.module, fs);
        if let Some(missing) = inputs.difference(&outputs).next() {
            return Err(link_error(format!(
                "fragment input @location({missing}) is not written by the vertex stage"
            )));
        }

        for slot in [VIEW_PROJECTION_SLOT, MODEL_SLOT, TEXTURE_SLOT] {
            if !has_global(&vertex.module, slot) && !has_global(&fragment.module, slot) {
                let message = format!("resource `{slot}` is not declared by either stage");
                return Err(link_error(message));
            }
        }

        Ok(Self {
            vertex_source: vertex.source,
            fragment_source: fragment.source,
        })
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }
}

fn find_entry(stage: &CompiledStage) -> Result<&naga::EntryPoint, String> {
    let name = stage.stage.entry_point();
    stage
        .module
        .entry_points
        .iter()
        .find(|ep| ep.name == name && ep.stage == stage.stage.naga())
        .ok_or_else(|| format!("{} stage has no `{name}` entry point", stage.stage))
}

fn vertex_output_locations(module: &naga::Module, ep: &naga::EntryPoint) -> BTreeSet<u32> {
    let mut out = BTreeSet::new();
    if let Some(result) = &ep.function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

fn fragment_input_locations(module: &naga::Module, ep: &naga::EntryPoint) -> BTreeSet<u32> {
    let mut out = BTreeSet::new();
    for arg in &ep.function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    if let Some(naga::Binding::Location { location, .. }) = &m.binding {
                        out.insert(*location);
                    }
                }
            }
        }
    }
}

fn has_global(module: &naga::Module, name: &str) -> bool {
    module
        .global_variables
        .iter()
        .any(|(_, var)| var.name.as_deref() == Some(name))
}

/// Caps `log` at [`MAX_LOG_BYTES`] without splitting a UTF-8 sequence.
fn truncate_log(mut log: String) -> String {
    if log.len() > MAX_LOG_BYTES {
        let mut end = MAX_LOG_BYTES;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSTHROUGH_FS: &str = r#"
@group(1) @binding(0) var texture1: texture_2d<f32>;
@group(1) @binding(1) var texture1_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(texture1, texture1_sampler, uv);
}
"#;

    #[test]
    fn builtin_quad_program_links() {
        let program = ShaderProgram::quad().expect("built-in shaders must link");
        assert!(program.vertex_source().contains("vs_main"));
        assert!(program.fragment_source().contains("fs_main"));
    }

    #[test]
    fn syntax_error_is_a_compile_error_with_log() {
        let err = ShaderProgram::build(QUAD_VERTEX_SRC, "@fragment fn fs_main( {").unwrap_err();
        match &err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(*stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("fragment shader compile error - "));
    }

    #[test]
    fn vertex_stage_is_compiled_first() {
        let err = ShaderProgram::build("not wgsl", "not wgsl either").unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Vertex, .. }));
    }

    #[test]
    fn long_diagnostics_are_capped() {
        let ident = "x".repeat(4 * MAX_LOG_BYTES);
        let src = format!("fn f() -> f32 {{ return {ident}; }}");
        let err = compile_stage(ShaderStage::Vertex, src).unwrap_err();
        assert!(err.log().len() <= MAX_LOG_BYTES);
        assert!(!err.log().is_empty());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "é".repeat(MAX_LOG_BYTES);
        let t = truncate_log(s);
        assert!(t.len() <= MAX_LOG_BYTES);
        assert!(t.chars().all(|c| c == 'é'));
        assert_eq!(truncate_log("short".into()), "short");
    }

    #[test]
    fn missing_entry_point_is_a_link_error() {
        let vs = QUAD_VERTEX_SRC.replace("vs_main", "main");
        let err = ShaderProgram::build(vs, QUAD_FRAGMENT_SRC).unwrap_err();
        match err {
            ShaderError::Link { log } => assert!(log.contains("vs_main"), "{log}"),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn unmatched_fragment_input_is_a_link_error() {
        let fs = PASSTHROUGH_FS.replace("@location(0) uv", "@location(3) uv");
        let err = ShaderProgram::build(QUAD_VERTEX_SRC, fs).unwrap_err();
        match err {
            ShaderError::Link { log } => assert!(log.contains("@location(3)"), "{log}"),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn missing_sampler_slot_is_a_link_error() {
        let fs = PASSTHROUGH_FS.replace("texture1", "albedo");
        let err = ShaderProgram::build(QUAD_VERTEX_SRC, fs).unwrap_err();
        match err {
            ShaderError::Link { log } => assert!(log.contains(TEXTURE_SLOT), "{log}"),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn swapped_stages_do_not_link() {
        let vs = compile_stage(ShaderStage::Vertex, QUAD_VERTEX_SRC).unwrap();
        let fs = compile_stage(ShaderStage::Fragment, QUAD_FRAGMENT_SRC).unwrap();
        assert!(matches!(ShaderProgram::link(fs, vs), Err(ShaderError::Link { .. })));
    }
}
