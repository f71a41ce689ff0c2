//! An in-memory [`Gpu`] for running the program without a display.
//!
//! `SoftwareGpu` keeps just enough of OpenGL's object model to notice the mistakes that matter
//! here (describing an attribute with nothing bound, drawing without a program, leaking names)
//! and rasterizes triangles into a float color buffer so tests can look at the picture.
//!
//! It is not a shader compiler. Vertex shaders are assumed to pass positions through unchanged,
//! and fragment shaders must write a constant `vec4(r, g, b, a)`; anything else fails to compile.
//!
//! Handles share state: cloning a `SoftwareGpu` gives another view of the same "driver", which is
//! how the headless platform lets tests inspect it after a run.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::ffi::CStr;
use std::mem::size_of;
use std::rc::Rc;

use super::api::{BufferTarget, BufferUsage, Gpu, Primitive, ShaderKind, VertexAttribute};
use crate::config::Rgba;

struct ShaderObject {
    kind: ShaderKind,
    source: String,
    /// `None` until compiled. A compiled fragment shader stores the color it writes.
    compiled: Option<Result<Option<Rgba>, String>>,
}

#[derive(Default)]
struct ProgramObject {
    attached: Vec<u32>,
    /// Fragment color on success, linker log on failure.
    linked: Option<Result<Rgba, String>>,
}

#[derive(Default)]
struct VertexArrayObject {
    /// Attribute index -> (layout, buffer captured when the layout was declared).
    attributes: HashMap<u32, (VertexAttribute, u32)>,
    enabled: HashSet<u32>,
}

struct Framebuffer {
    width: usize,
    height: usize,
    /// Row-major, row 0 at the bottom like GL window coordinates.
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::new(0.0, 0.0, 0.0, 0.0); width * height],
        }
    }
}

struct State {
    next_name: u32,
    calls: Vec<&'static str>,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    buffers: HashMap<u32, Vec<f32>>,
    vertex_arrays: HashMap<u32, VertexArrayObject>,
    array_buffer: u32,
    vertex_array: u32,
    program: u32,
    clear_color: Rgba,
    viewport: (i32, i32, i32, i32),
    framebuffer: Framebuffer,
}

impl State {
    fn new(width: usize, height: usize) -> Self {
        Self {
            next_name: 1,
            calls: Vec::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            array_buffer: 0,
            vertex_array: 0,
            program: 0,
            clear_color: Rgba::new(0.0, 0.0, 0.0, 0.0),
            viewport: (0, 0, width as i32, height as i32),
            framebuffer: Framebuffer::new(width, height),
        }
    }

    fn name(&mut self) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        name
    }
}

#[derive(Clone)]
pub struct SoftwareGpu {
    state: Rc<RefCell<State>>,
}

impl Default for SoftwareGpu {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareGpu {
    /// A GPU with an empty (0×0) default framebuffer.
    pub fn new() -> Self {
        Self::with_framebuffer(0, 0)
    }

    pub fn with_framebuffer(width: u32, height: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::new(width as usize, height as usize))),
        }
    }

    /// Reallocates the default framebuffer, e.g. when a window of that size is created.
    pub fn resize_framebuffer(&self, width: u32, height: u32) {
        self.state.borrow_mut().framebuffer = Framebuffer::new(width as usize, height as usize);
    }

    fn record(&self, call: &'static str) -> RefMut<'_, State> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        state
    }

    fn inspect(&self) -> Ref<'_, State> {
        self.state.borrow()
    }

    /// Every `Gpu` method called so far, by name, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.inspect().calls.clone()
    }

    pub fn count_calls(&self, call: &str) -> usize {
        self.inspect().calls.iter().filter(|c| **c == call).count()
    }

    /// Shaders, programs, buffers and vertex arrays that were created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        let state = self.inspect();
        state.shaders.len() + state.programs.len() + state.buffers.len() + state.vertex_arrays.len()
    }

    pub fn bound_array_buffer(&self) -> u32 {
        self.inspect().array_buffer
    }

    pub fn bound_vertex_array(&self) -> u32 {
        self.inspect().vertex_array
    }

    pub fn current_viewport(&self) -> (i32, i32, i32, i32) {
        self.inspect().viewport
    }

    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<f32>> {
        self.inspect().buffers.get(&buffer).cloned()
    }

    /// The buffer and layout that `index` of `vertex_array` reads from, if declared and enabled.
    pub fn enabled_attribute(
        &self,
        vertex_array: u32,
        index: u32,
    ) -> Option<(VertexAttribute, u32)> {
        let state = self.inspect();
        let vao = state.vertex_arrays.get(&vertex_array)?;
        if !vao.enabled.contains(&index) {
            return None;
        }
        vao.attributes.get(&index).copied()
    }

    pub fn enabled_attribute_count(&self, vertex_array: u32) -> usize {
        self.inspect()
            .vertex_arrays
            .get(&vertex_array)
            .map_or(0, |vao| vao.enabled.len())
    }

    /// Reads back one pixel. `(0, 0)` is the bottom-left corner.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let state = self.inspect();
        let fb = &state.framebuffer;
        let (x, y) = (x as usize, y as usize);
        if x >= fb.width || y >= fb.height {
            return None;
        }
        Some(fb.pixels[y * fb.width + x])
    }

    pub fn count_pixels(&self, color: Rgba) -> usize {
        self.inspect()
            .framebuffer
            .pixels
            .iter()
            .filter(|p| **p == color)
            .count()
    }

    pub fn framebuffer_size(&self) -> (u32, u32) {
        let state = self.inspect();
        (state.framebuffer.width as u32, state.framebuffer.height as u32)
    }
}

/// Pulls the color out of a fragment shader of the form `... = vec4(r, g, b, a); ...`.
pub fn parse_constant_color(source: &str) -> Option<Rgba> {
    let start = source.rfind("vec4(")? + "vec4(".len();
    let end = start + source[start..].find(')')?;

    let components = source[start..end]
        .split(',')
        .map(|c| c.trim().trim_end_matches('f').parse::<f32>())
        .collect::<Result<Vec<f32>, _>>()
        .ok()?;

    match components.as_slice() {
        [r, g, b, a] => Some(Rgba::new(*r, *g, *b, *a)),
        _ => None,
    }
}

fn compile(kind: ShaderKind, source: &str) -> Result<Option<Rgba>, String> {
    if !source.trim_start().starts_with("#version 330") {
        return Err(String::from("0:1: missing or unsupported #version directive"));
    }

    match kind {
        ShaderKind::Vertex if source.contains("gl_Position") => Ok(None),
        ShaderKind::Vertex => Err(String::from("vertex shader never writes gl_Position")),
        ShaderKind::Fragment => parse_constant_color(source)
            .map(Some)
            .ok_or_else(|| String::from("fragment shader does not write a constant vec4")),
    }
}

/// Twice the signed area of triangle `(a, b, c)`; positive when counter-clockwise.
fn edge(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn fill_triangle(fb: &mut Framebuffer, v: [(f32, f32); 3], color: Rgba) {
    let area = edge(v[0], v[1], v[2]);
    if area == 0.0 {
        return;
    }

    let xs = v.iter().map(|p| p.0);
    let ys = v.iter().map(|p| p.1);
    let min_x = xs.clone().fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
    let min_y = ys.clone().fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
    let max_x = (xs.fold(f32::NEG_INFINITY, f32::max).ceil() as usize).min(fb.width);
    let max_y = (ys.fold(f32::NEG_INFINITY, f32::max).ceil() as usize).min(fb.height);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = (x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(v[1], v[2], p) * area.signum();
            let w1 = edge(v[2], v[0], p) * area.signum();
            let w2 = edge(v[0], v[1], p) * area.signum();

            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                fb.pixels[y * fb.width + x] = color;
            }
        }
    }
}

impl Gpu for SoftwareGpu {
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record("viewport").viewport = (x, y, width, height);
    }

    fn clear_color(&self, color: Rgba) {
        self.record("clear_color").clear_color = color;
    }

    fn clear(&self) {
        let mut state = self.record("clear");
        let color = state.clear_color;
        for pixel in state.framebuffer.pixels.iter_mut() {
            *pixel = color;
        }
    }

    fn create_shader(&self, kind: ShaderKind) -> u32 {
        let mut state = self.record("create_shader");
        let name = state.name();
        state.shaders.insert(
            name,
            ShaderObject {
                kind,
                source: String::new(),
                compiled: None,
            },
        );
        name
    }

    fn shader_source(&self, shader: u32, source: &CStr) {
        let mut state = self.record("shader_source");
        if let Some(object) = state.shaders.get_mut(&shader) {
            object.source = source.to_string_lossy().into_owned();
        }
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.record("compile_shader");
        if let Some(object) = state.shaders.get_mut(&shader) {
            object.compiled = Some(compile(object.kind, &object.source));
        }
    }

    fn compile_status(&self, shader: u32) -> Result<(), String> {
        let state = self.record("compile_status");
        match state.shaders.get(&shader).and_then(|s| s.compiled.as_ref()) {
            Some(Ok(_)) => Ok(()),
            Some(Err(log)) => Err(log.clone()),
            None => Err(format!("shader {} was never compiled", shader)),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.record("delete_shader").shaders.remove(&shader);
    }

    fn create_program(&self) -> u32 {
        let mut state = self.record("create_program");
        let name = state.name();
        state.programs.insert(name, ProgramObject::default());
        name
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.record("attach_shader");
        if let Some(object) = state.programs.get_mut(&program) {
            object.attached.push(shader);
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.record("link_program");

        let attached = match state.programs.get(&program) {
            Some(object) => object.attached.clone(),
            None => return,
        };

        let mut vertex = 0;
        let mut fragment = Vec::new();
        let mut broken = false;
        for shader in &attached {
            match state.shaders.get(shader) {
                Some(ShaderObject {
                    kind: ShaderKind::Vertex,
                    compiled: Some(Ok(_)),
                    ..
                }) => vertex += 1,
                Some(ShaderObject {
                    kind: ShaderKind::Fragment,
                    compiled: Some(Ok(Some(color))),
                    ..
                }) => fragment.push(*color),
                _ => broken = true,
            }
        }

        let linked = match (broken, vertex, fragment.as_slice()) {
            (false, 1, [color]) => Ok(*color),
            _ => Err(String::from(
                "link requires one compiled vertex and one compiled fragment shader",
            )),
        };

        if let Some(object) = state.programs.get_mut(&program) {
            object.linked = Some(linked);
        }
    }

    fn link_status(&self, program: u32) -> Result<(), String> {
        let state = self.record("link_status");
        match state.programs.get(&program).and_then(|p| p.linked.as_ref()) {
            Some(Ok(_)) => Ok(()),
            Some(Err(log)) => Err(log.clone()),
            None => Err(format!("program {} was never linked", program)),
        }
    }

    fn use_program(&self, program: u32) {
        self.record("use_program").program = program;
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.record("delete_program");
        state.programs.remove(&program);
        if state.program == program {
            state.program = 0;
        }
    }

    fn gen_vertex_array(&self) -> u32 {
        let mut state = self.record("gen_vertex_array");
        let name = state.name();
        state.vertex_arrays.insert(name, VertexArrayObject::default());
        name
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        self.record("bind_vertex_array").vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut state = self.record("delete_vertex_array");
        state.vertex_arrays.remove(&vertex_array);
        if state.vertex_array == vertex_array {
            state.vertex_array = 0;
        }
    }

    fn gen_buffer(&self) -> u32 {
        let mut state = self.record("gen_buffer");
        let name = state.name();
        state.buffers.insert(name, Vec::new());
        name
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: u32) {
        let mut state = self.record("bind_buffer");
        match target {
            BufferTarget::Array => state.array_buffer = buffer,
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[f32], _usage: BufferUsage) {
        let mut state = self.record("buffer_data");
        let bound = match target {
            BufferTarget::Array => state.array_buffer,
        };
        if let Some(contents) = state.buffers.get_mut(&bound) {
            *contents = data.to_vec();
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.record("delete_buffer");
        state.buffers.remove(&buffer);
        if state.array_buffer == buffer {
            state.array_buffer = 0;
        }
    }

    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute) {
        let mut state = self.record("vertex_attrib_pointer");
        let (vertex_array, buffer) = (state.vertex_array, state.array_buffer);

        // Core profile: no-op (GL_INVALID_OPERATION) without both a VAO and a buffer bound.
        if buffer == 0 {
            return;
        }
        if let Some(vao) = state.vertex_arrays.get_mut(&vertex_array) {
            vao.attributes.insert(attribute.index, (*attribute, buffer));
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut state = self.record("enable_vertex_attrib_array");
        let vertex_array = state.vertex_array;
        if let Some(vao) = state.vertex_arrays.get_mut(&vertex_array) {
            vao.enabled.insert(index);
        }
    }

    fn draw_arrays(&self, mode: Primitive, first: i32, count: i32) {
        let mut state = self.record("draw_arrays");

        let color = match state.programs.get(&state.program).and_then(|p| p.linked.as_ref()) {
            Some(Ok(color)) => *color,
            _ => return,
        };

        let (attribute, buffer) = match state.vertex_arrays.get(&state.vertex_array) {
            Some(vao) if vao.enabled.contains(&0) => match vao.attributes.get(&0) {
                Some(binding) => *binding,
                None => return,
            },
            _ => return,
        };

        let data = match state.buffers.get(&buffer) {
            Some(data) => data.clone(),
            None => return,
        };

        let float = size_of::<f32>();
        let stride = if attribute.stride == 0 {
            attribute.size as usize
        } else {
            attribute.stride as usize / float
        };
        let base = attribute.offset / float;

        let (vx, vy, vw, vh) = state.viewport;
        let to_window = |i: usize| -> Option<(f32, f32)> {
            let at = base + i * stride;
            let (x, y) = (*data.get(at)?, *data.get(at + 1)?);
            Some((
                vx as f32 + (x + 1.0) * 0.5 * vw as f32,
                vy as f32 + (y + 1.0) * 0.5 * vh as f32,
            ))
        };

        match mode {
            Primitive::Triangles => {
                let first = first.max(0) as usize;
                for triangle in 0..(count.max(0) as usize / 3) {
                    let i = first + triangle * 3;
                    let vertices = match (to_window(i), to_window(i + 1), to_window(i + 2)) {
                        (Some(a), Some(b), Some(c)) => [a, b, c],
                        _ => return,
                    };
                    fill_triangle(&mut state.framebuffer, vertices, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cstr(bytes: &[u8]) -> &CStr {
        CStr::from_bytes_with_nul(bytes).unwrap()
    }

    #[test]
    fn parses_suffixed_color() {
        let color = parse_constant_color("FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);");
        assert_eq!(color, Some(Rgba::new(1.0, 0.5, 0.2, 1.0)));
    }

    #[test]
    fn rejects_non_constant_color() {
        assert_eq!(parse_constant_color("FragColor = vec4(uv, 0.0, 1.0);"), None);
        assert_eq!(parse_constant_color("FragColor = texture(tex, uv);"), None);
    }

    #[test]
    fn fragment_without_color_fails_to_compile() {
        let gpu = SoftwareGpu::new();
        let shader = gpu.create_shader(ShaderKind::Fragment);
        gpu.shader_source(shader, cstr(b"#version 330 core\nvoid main() {}\0"));
        gpu.compile_shader(shader);
        assert!(gpu.compile_status(shader).is_err());
    }

    #[test]
    fn link_needs_both_stages() {
        let gpu = SoftwareGpu::new();
        let vert = gpu.create_shader(ShaderKind::Vertex);
        let source = b"#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\0";
        gpu.shader_source(vert, cstr(source));
        gpu.compile_shader(vert);

        let program = gpu.create_program();
        gpu.attach_shader(program, vert);
        gpu.link_program(program);
        assert!(gpu.link_status(program).is_err());
    }

    #[test]
    fn attribute_pointer_without_buffer_is_ignored() {
        let gpu = SoftwareGpu::new();
        let vao = gpu.gen_vertex_array();
        gpu.bind_vertex_array(vao);
        gpu.vertex_attrib_pointer(&VertexAttribute::packed_floats(0, 3));
        gpu.enable_vertex_attrib_array(0);
        assert_eq!(gpu.enabled_attribute(vao, 0), None);
    }

    #[test]
    fn clear_fills_whole_framebuffer() {
        let gpu = SoftwareGpu::with_framebuffer(4, 4);
        let teal = Rgba::new(0.07, 0.13, 0.17, 1.0);
        gpu.clear_color(teal);
        gpu.clear();
        assert_eq!(gpu.count_pixels(teal), 16);
        assert_eq!(gpu.pixel(4, 0), None);
    }

    #[test]
    fn full_screen_triangle_pair_covers_everything() {
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let mut fb = Framebuffer::new(8, 8);
        fill_triangle(&mut fb, [(0.0, 0.0), (8.0, 0.0), (8.0, 8.0)], red);
        fill_triangle(&mut fb, [(0.0, 0.0), (8.0, 8.0), (0.0, 8.0)], red);
        assert!(fb.pixels.iter().all(|p| *p == red));
    }
}
