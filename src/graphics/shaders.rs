//! The two shader stages, baked into the binary, and the code that turns them into a program.

use std::ffi::CStr;

use super::api::Gpu;
use super::gl_types::{GlProgram, GlShader};

/// Passes `aPos` (attribute location 0) straight through as the clip-space position.
pub const VERTEX_SHADER_SOURCE: &[u8] =
    b"#version 330 core\nlayout (location = 0) in vec3 aPos;\nvoid main()\n{\n   gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);\n}\0";

/// Paints every fragment orange.
pub const FRAGMENT_SHADER_SOURCE: &[u8] =
    b"#version 330 core\nout vec4 FragColor;\nvoid main()\n{\n   FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);\n}\n\0";

/// Views a NUL-terminated source literal as a C string.
fn source_cstr(source: &'static [u8]) -> &'static CStr {
    // Both literals above end in exactly one NUL and contain no other; see the tests.
    unsafe { CStr::from_bytes_with_nul_unchecked(source) }
}

/// Compiles both stages and links them. The shader objects are deleted before returning; the
/// program keeps the linked code.
pub fn build_program<G: Gpu>(gpu: &G) -> GlProgram<'_, G> {
    let shaders = [
        GlShader::from_vert_source(gpu, source_cstr(VERTEX_SHADER_SOURCE)),
        GlShader::from_frag_source(gpu, source_cstr(FRAGMENT_SHADER_SOURCE)),
    ];

    let program = GlProgram::from_shaders(gpu, &shaders);
    log::debug!("linked shader program {}", program.id());

    program
}
