//! The slice of the OpenGL 3.3 core API the program uses, as a trait.
//!
//! OpenGL is a big state machine addressed through integer names, and most calls act on whatever
//! object happens to be bound. The trait mirrors that shape one-to-one so the rest of the crate
//! reads like ordinary GL code, while letting the same code drive either a real driver
//! ([`GlApi`](super::opengl::GlApi)) or an in-memory one
//! ([`SoftwareGpu`](super::software::SoftwareGpu)).
//!
//! Object names are plain `u32`s. Name `0` is never handed out and binding `0` means "unbind".

use std::ffi::CStr;

use crate::config::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex = gl::VERTEX_SHADER as isize,
    Fragment = gl::FRAGMENT_SHADER as isize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array = gl::ARRAY_BUFFER as isize,
}

/// How often a buffer's contents will be written and read. Only matters to the driver's
/// placement heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    StaticDraw = gl::STATIC_DRAW as isize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles = gl::TRIANGLES as isize,
}

/// Abstracts over the arguments of
/// [glVertexAttribPointer](http://docs.gl/gl3/glVertexAttribPointer) for float attributes: which
/// shader input to feed, and where in the bound buffer to find it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub index: u32,
    /// Components per vertex (1 to 4).
    pub size: i32,
    pub normalized: bool,
    /// Bytes from the start of one vertex to the start of the next.
    pub stride: i32,
    /// Byte offset of the first component in the buffer.
    pub offset: usize,
}

impl VertexAttribute {
    /// A tightly packed float attribute starting at the beginning of the buffer.
    pub fn packed_floats(index: u32, size: i32) -> Self {
        Self {
            index,
            size,
            normalized: false,
            stride: size * std::mem::size_of::<f32>() as i32,
            offset: 0,
        }
    }
}

pub trait Gpu {
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, color: Rgba);
    /// Clears the color buffer to the current clear color.
    fn clear(&self);

    fn create_shader(&self, kind: ShaderKind) -> u32;
    fn shader_source(&self, shader: u32, source: &CStr);
    fn compile_shader(&self, shader: u32);
    /// `Err` carries the compiler's info log.
    fn compile_status(&self, shader: u32) -> Result<(), String>;
    fn delete_shader(&self, shader: u32);

    fn create_program(&self) -> u32;
    fn attach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    /// `Err` carries the linker's info log.
    fn link_status(&self, program: u32) -> Result<(), String>;
    fn use_program(&self, program: u32);
    fn delete_program(&self, program: u32);

    fn gen_vertex_array(&self) -> u32;
    fn bind_vertex_array(&self, vertex_array: u32);
    fn delete_vertex_array(&self, vertex_array: u32);

    fn gen_buffer(&self) -> u32;
    fn bind_buffer(&self, target: BufferTarget, buffer: u32);
    fn buffer_data(&self, target: BufferTarget, data: &[f32], usage: BufferUsage);
    fn delete_buffer(&self, buffer: u32);

    /// Records, in the bound vertex array, that `attribute` reads from the bound array buffer.
    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute);
    fn enable_vertex_attrib_array(&self, index: u32);

    fn draw_arrays(&self, mode: Primitive, first: i32, count: i32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_position_attribute() {
        let attribute = VertexAttribute::packed_floats(0, 3);
        assert_eq!(attribute.stride, 12);
        assert_eq!(attribute.offset, 0);
        assert!(!attribute.normalized);
    }

    #[test]
    fn enums_carry_gl_constants() {
        assert_eq!(ShaderKind::Vertex as u32, gl::VERTEX_SHADER);
        assert_eq!(BufferUsage::StaticDraw as u32, gl::STATIC_DRAW);
        assert_eq!(Primitive::Triangles as u32, gl::TRIANGLES);
    }
}
