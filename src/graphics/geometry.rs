//! The triangle and its trip to the GPU.

use super::api::{BufferUsage, Gpu, Primitive, VertexAttribute};
use super::gl_types::{GlVertexArray, GlVertexBuffer};
use crate::config::POSITION_ATTRIBUTE;

pub const VERTEX_COUNT: i32 = 3;
pub const COMPONENTS_PER_VERTEX: i32 = 3;

/// An equilateral triangle with unit sides, centroid at the origin, in clip space:
/// (-1/2, -√3/6, 0), (1/2, -√3/6, 0), (0, √3/3, 0).
pub fn triangle_vertices() -> [f32; 9] {
    let sqrt3 = 3f32.sqrt();
    #[rustfmt::skip]
    let vertices = [
        -0.5, -0.5 * sqrt3 / 3.0, 0.0,
        0.5, -0.5 * sqrt3 / 3.0, 0.0,
        0.0, 0.5 * sqrt3 * 2.0 / 3.0, 0.0,
    ];
    vertices
}

/// A vertex array with attribute 0 reading positions out of its own vertex buffer.
///
/// Field order is drop order: the vertex array is deleted before the buffer it refers to.
pub struct TriangleMesh<'g, G: Gpu> {
    vertex_array: GlVertexArray<'g, G>,
    vertex_buffer: GlVertexBuffer<'g, G>,
}

impl<'g, G: Gpu> TriangleMesh<'g, G> {
    pub fn vertex_array(&self) -> &GlVertexArray<'g, G> {
        &self.vertex_array
    }

    pub fn vertex_buffer(&self) -> &GlVertexBuffer<'g, G> {
        &self.vertex_buffer
    }

    /// Binds the vertex array for the duration of one draw call.
    pub fn draw(&self) {
        let bound = self.vertex_array.bind();
        bound.draw_arrays(Primitive::Triangles, 0, VERTEX_COUNT);
    }
}

/// Uploads [`triangle_vertices`] and describes them to attribute 0.
///
/// The vertex array has to be bound before the buffer: `glVertexAttribPointer` stores the buffer
/// bound at that moment into the bound vertex array, and that association is the whole point.
/// Both bindings are undone before returning.
pub fn upload_triangle<G: Gpu>(gpu: &G) -> TriangleMesh<'_, G> {
    let vertex_array = GlVertexArray::generate(gpu);
    let vertex_buffer = GlVertexBuffer::generate(gpu);

    {
        let vao = vertex_array.bind();
        let vbo = vertex_buffer.bind();

        vbo.upload(&triangle_vertices(), BufferUsage::StaticDraw);

        let position = VertexAttribute::packed_floats(POSITION_ATTRIBUTE, COMPONENTS_PER_VERTEX);
        vao.set_attribute(&vbo, &position);
        vao.enable_attribute(POSITION_ATTRIBUTE);

        // `vbo` drops first, unbinding GL_ARRAY_BUFFER, then `vao`.
    }

    log::debug!(
        "uploaded triangle: vertex array {}, buffer {}",
        vertex_array.id(),
        vertex_buffer.id()
    );

    TriangleMesh {
        vertex_array,
        vertex_buffer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::software::SoftwareGpu;

    #[test]
    fn vertices_stay_in_clip_space() {
        assert!(triangle_vertices().iter().all(|c| (-1.0..=1.0).contains(c)));
    }

    #[test]
    fn triangle_is_equilateral_and_centered() {
        let v = triangle_vertices();
        let p = [(v[0], v[1]), (v[3], v[4]), (v[6], v[7])];
        let side = |a: (f32, f32), b: (f32, f32)| (a.0 - b.0).hypot(a.1 - b.1);

        for (a, b) in [(0, 1), (1, 2), (2, 0)].iter() {
            assert!((side(p[*a], p[*b]) - 1.0).abs() < 1e-6);
        }

        let centroid = ((p[0].0 + p[1].0 + p[2].0) / 3.0, (p[0].1 + p[1].1 + p[2].1) / 3.0);
        assert!(centroid.0.abs() < 1e-6 && centroid.1.abs() < 1e-6);
    }

    #[test]
    fn vertex_array_is_bound_before_buffer() {
        let gpu = SoftwareGpu::new();
        let _mesh = upload_triangle(&gpu);

        let calls = gpu.calls();
        let expected = [
            "gen_vertex_array",
            "gen_buffer",
            "bind_vertex_array",
            "bind_buffer",
            "buffer_data",
            "vertex_attrib_pointer",
            "enable_vertex_attrib_array",
            "bind_buffer",
            "bind_vertex_array",
        ];
        assert_eq!(calls, expected);
    }

    #[test]
    fn attribute_zero_captures_the_buffer() {
        let gpu = SoftwareGpu::new();
        let mesh = upload_triangle(&gpu);
        let vao = mesh.vertex_array().id();
        let vbo = mesh.vertex_buffer().id();

        let (attribute, buffer) = gpu.enabled_attribute(vao, 0).unwrap();
        assert_eq!(buffer, vbo);
        assert_eq!(attribute, VertexAttribute::packed_floats(0, 3));
        assert_eq!(gpu.enabled_attribute_count(vao), 1);
        assert_eq!(gpu.buffer_contents(vbo).unwrap(), triangle_vertices().to_vec());

        assert_eq!(gpu.bound_array_buffer(), 0);
        assert_eq!(gpu.bound_vertex_array(), 0);
    }

    #[test]
    fn mesh_teardown_deletes_vertex_array_first() {
        let gpu = SoftwareGpu::new();
        drop(upload_triangle(&gpu));

        let calls = gpu.calls();
        assert_eq!(&calls[calls.len() - 2..], &["delete_vertex_array", "delete_buffer"]);
        assert_eq!(gpu.live_objects(), 0);
    }
}
