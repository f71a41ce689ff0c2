//! Owning wrappers around GL object names.
//!
//! A GL object is just an integer the driver hands out; nothing stops you from using it after
//! deleting it or forgetting to delete it at all. Each wrapper here owns exactly one name, is
//! move-only, and deletes the object when dropped. Objects that are configured through a bind
//! point (buffers and vertex arrays) hand out a guard from `bind`, and the guard unbinds when it
//! goes out of scope so binding state can't leak from one step into the next.

use std::ffi::CStr;

use super::api::{BufferTarget, BufferUsage, Gpu, Primitive, ShaderKind, VertexAttribute};

/// Represents a compiled shader stage.
pub struct GlShader<'g, G: Gpu> {
    gpu: &'g G,
    id: u32,
}

impl<'g, G: Gpu> GlShader<'g, G> {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Creates a shader, hands it `source` and compiles it. A compile error is logged and the
    /// shader is returned anyway; the driver will refuse to link it later.
    pub fn from_source(gpu: &'g G, source: &CStr, kind: ShaderKind) -> Self {
        let id = gpu.create_shader(kind);
        gpu.shader_source(id, source);
        gpu.compile_shader(id);

        if let Err(info_log) = gpu.compile_status(id) {
            log::warn!("{:?} shader failed to compile: {}", kind, info_log.trim_end());
        }

        Self { gpu, id }
    }

    pub fn from_vert_source(gpu: &'g G, source: &CStr) -> Self {
        Self::from_source(gpu, source, ShaderKind::Vertex)
    }

    pub fn from_frag_source(gpu: &'g G, source: &CStr) -> Self {
        Self::from_source(gpu, source, ShaderKind::Fragment)
    }
}

impl<'g, G: Gpu> Drop for GlShader<'g, G> {
    fn drop(&mut self) {
        self.gpu.delete_shader(self.id);
    }
}

/// Represents the graphics pipeline: a linked set of shader stages.
pub struct GlProgram<'g, G: Gpu> {
    gpu: &'g G,
    id: u32,
}

impl<'g, G: Gpu> GlProgram<'g, G> {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Attaches every shader and links. The shaders may be dropped afterwards; the program keeps
    /// the linked code.
    pub fn from_shaders(gpu: &'g G, shaders: &[GlShader<'g, G>]) -> Self {
        let id = gpu.create_program();

        for shader in shaders {
            gpu.attach_shader(id, shader.id());
        }

        gpu.link_program(id);

        if let Err(info_log) = gpu.link_status(id) {
            log::warn!("shader program failed to link: {}", info_log.trim_end());
        }

        Self { gpu, id }
    }

    pub fn set_used(&self) {
        self.gpu.use_program(self.id);
    }
}

impl<'g, G: Gpu> Drop for GlProgram<'g, G> {
    fn drop(&mut self) {
        self.gpu.delete_program(self.id);
    }
}

/// Represents a [vertex buffer object (VBO)](https://en.wikipedia.org/wiki/Vertex_buffer_object):
/// vertex data living on the graphics card.
pub struct GlVertexBuffer<'g, G: Gpu> {
    gpu: &'g G,
    id: u32,
}

impl<'g, G: Gpu> GlVertexBuffer<'g, G> {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn generate(gpu: &'g G) -> Self {
        let id = gpu.gen_buffer();
        Self { gpu, id }
    }

    /// Binds the buffer to `GL_ARRAY_BUFFER` until the returned guard is dropped.
    pub fn bind(&self) -> BoundVertexBuffer<'_, G> {
        self.gpu.bind_buffer(BufferTarget::Array, self.id);
        BoundVertexBuffer { gpu: self.gpu }
    }
}

impl<'g, G: Gpu> Drop for GlVertexBuffer<'g, G> {
    fn drop(&mut self) {
        self.gpu.delete_buffer(self.id);
    }
}

/// A vertex buffer that is currently bound to `GL_ARRAY_BUFFER`.
pub struct BoundVertexBuffer<'a, G: Gpu> {
    gpu: &'a G,
}

impl<'a, G: Gpu> BoundVertexBuffer<'a, G> {
    /// Replaces the buffer's contents with `data`.
    pub fn upload(&self, data: &[f32], usage: BufferUsage) {
        self.gpu.buffer_data(BufferTarget::Array, data, usage);
    }
}

impl<'a, G: Gpu> Drop for BoundVertexBuffer<'a, G> {
    fn drop(&mut self) {
        self.gpu.bind_buffer(BufferTarget::Array, 0);
    }
}

/// Represents a vertex array object (VAO), which remembers which buffer each vertex attribute
/// reads from and how. Binding it again restores all of that in one call.
pub struct GlVertexArray<'g, G: Gpu> {
    gpu: &'g G,
    id: u32,
}

impl<'g, G: Gpu> GlVertexArray<'g, G> {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn generate(gpu: &'g G) -> Self {
        let id = gpu.gen_vertex_array();
        Self { gpu, id }
    }

    /// Makes this the current vertex array until the returned guard is dropped.
    pub fn bind(&self) -> BoundVertexArray<'_, G> {
        self.gpu.bind_vertex_array(self.id);
        BoundVertexArray { gpu: self.gpu }
    }
}

impl<'g, G: Gpu> Drop for GlVertexArray<'g, G> {
    fn drop(&mut self) {
        self.gpu.delete_vertex_array(self.id);
    }
}

/// A vertex array that is currently bound.
pub struct BoundVertexArray<'a, G: Gpu> {
    gpu: &'a G,
}

impl<'a, G: Gpu> BoundVertexArray<'a, G> {
    /// Records that `attribute` reads from `buffer`. Requiring the bound-buffer guard makes it
    /// impossible to describe an attribute with no buffer bound.
    pub fn set_attribute(&self, _buffer: &BoundVertexBuffer<'_, G>, attribute: &VertexAttribute) {
        self.gpu.vertex_attrib_pointer(attribute);
    }

    pub fn enable_attribute(&self, index: u32) {
        self.gpu.enable_vertex_attrib_array(index);
    }

    pub fn draw_arrays(&self, mode: Primitive, first: i32, count: i32) {
        self.gpu.draw_arrays(mode, first, count);
    }
}

impl<'a, G: Gpu> Drop for BoundVertexArray<'a, G> {
    fn drop(&mut self) {
        self.gpu.bind_vertex_array(0);
    }
}
