//! [`Gpu`] over the real driver, through the `gl` crate's global function pointers.
//!
//! Every method is a thin `unsafe` call. The safety argument is the same everywhere: the entry
//! points were resolved by [`GlApi::load_with`] after a context was made current, and every
//! pointer we pass refers to memory that outlives the call.

use std::ffi::{c_void, CStr};
use std::mem::size_of;
use std::ptr::null;

use gl::types::*;

use super::api::{BufferTarget, BufferUsage, Gpu, Primitive, ShaderKind, VertexAttribute};
use crate::config::Rgba;

/// Proof that the GL entry points have been loaded. Only obtainable through [`GlApi::load_with`].
#[derive(Debug)]
pub struct GlApi {
    _loaded: (),
}

impl GlApi {
    /// Resolves the GL entry points using `loader`, typically the context's `get_proc_address`.
    /// The context must be current on this thread.
    pub fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        if !gl::CreateShader::is_loaded() || !gl::BindVertexArray::is_loaded() {
            log::warn!("OpenGL loader could not resolve core 3.3 entry points");
        }

        Self { _loaded: () }
    }
}

/// Allocates a buffer for an info log of `len` bytes (including the NUL the driver writes).
fn info_log_buffer(len: GLint) -> Vec<u8> {
    vec![0u8; len.max(1) as usize]
}

fn info_log_to_string(mut buf: Vec<u8>, written: GLsizei) -> String {
    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

impl Gpu for GlApi {
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn clear_color(&self, color: Rgba) {
        unsafe { gl::ClearColor(color.r, color.g, color.b, color.a) }
    }

    fn clear(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) }
    }

    fn create_shader(&self, kind: ShaderKind) -> u32 {
        unsafe { gl::CreateShader(kind as GLenum) }
    }

    fn shader_source(&self, shader: u32, source: &CStr) {
        // A null length array means every string is NUL-terminated.
        unsafe { gl::ShaderSource(shader, 1, &source.as_ptr(), null()) }
    }

    fn compile_shader(&self, shader: u32) {
        unsafe { gl::CompileShader(shader) }
    }

    fn compile_status(&self, shader: u32) -> Result<(), String> {
        let mut success: GLint = 1;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success) };

        if success != 0 {
            return Ok(());
        }

        let mut len: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len) };

        let mut buf = info_log_buffer(len);
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                buf.len() as GLsizei,
                &mut written,
                buf.as_mut_ptr() as *mut GLchar,
            );
        }

        Err(info_log_to_string(buf, written))
    }

    fn delete_shader(&self, shader: u32) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: u32) {
        unsafe { gl::LinkProgram(program) }
    }

    fn link_status(&self, program: u32) -> Result<(), String> {
        let mut success: GLint = 1;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut success) };

        if success != 0 {
            return Ok(());
        }

        let mut len: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len) };

        let mut buf = info_log_buffer(len);
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                buf.len() as GLsizei,
                &mut written,
                buf.as_mut_ptr() as *mut GLchar,
            );
        }

        Err(info_log_to_string(buf, written))
    }

    fn use_program(&self, program: u32) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: u32) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn gen_vertex_array(&self) -> u32 {
        let mut vao: GLuint = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        unsafe { gl::BindVertexArray(vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        unsafe { gl::DeleteVertexArrays(1, &vertex_array) }
    }

    fn gen_buffer(&self) -> u32 {
        let mut vbo: GLuint = 0;
        unsafe { gl::GenBuffers(1, &mut vbo) };
        vbo
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: u32) {
        unsafe { gl::BindBuffer(target as GLenum, buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[f32], usage: BufferUsage) {
        unsafe {
            gl::BufferData(
                target as GLenum,
                (data.len() * size_of::<f32>()) as GLsizeiptr,
                data.as_ptr() as *const c_void,
                usage as GLenum,
            );
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute) {
        let normalized = if attribute.normalized { gl::TRUE } else { gl::FALSE };
        unsafe {
            gl::VertexAttribPointer(
                attribute.index,
                attribute.size,
                gl::FLOAT,
                normalized,
                attribute.stride,
                // With a buffer bound, the "pointer" is a byte offset into it.
                attribute.offset as *const c_void,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn draw_arrays(&self, mode: Primitive, first: i32, count: i32) {
        unsafe { gl::DrawArrays(mode as GLenum, first, count) }
    }
}
