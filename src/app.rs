//! The program from start to finish: bring up a window and GL, build the scene, draw it until the
//! window is closed, then tear everything down in reverse.

use std::io::Write;

use crate::config::{context_hints, WindowConfig, CLEAR_COLOR};
use crate::error::{Error, Result};
use crate::graphics::api::Gpu;
use crate::graphics::geometry::{upload_triangle, TriangleMesh};
use crate::graphics::gl_types::GlProgram;
use crate::graphics::shaders::build_program;
use crate::interface::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Loop iterations presented, not counting the priming frame.
    pub frames: usize,
}

/// Everything that gets drawn, in teardown order: vertex array, vertex buffer, program.
pub struct Scene<'g, G: Gpu> {
    gpu: &'g G,
    mesh: TriangleMesh<'g, G>,
    program: GlProgram<'g, G>,
}

impl<'g, G: Gpu> Scene<'g, G> {
    /// Builds the shader program, then uploads the triangle.
    pub fn new(gpu: &'g G) -> Self {
        let program = build_program(gpu);
        let mesh = upload_triangle(gpu);
        Self { gpu, mesh, program }
    }

    pub fn mesh(&self) -> &TriangleMesh<'g, G> {
        &self.mesh
    }

    pub fn program(&self) -> &GlProgram<'g, G> {
        &self.program
    }

    /// Draws one frame into the back buffer.
    pub fn render(&self) {
        clear_frame(self.gpu);
        self.program.set_used();
        self.mesh.draw();
    }
}

fn clear_frame<G: Gpu>(gpu: &G) {
    gpu.clear_color(CLEAR_COLOR);
    gpu.clear();
}

/// Initializes the platform, opens the window, makes its context current, loads GL and sets the
/// viewport to cover the window. Context hints are given before the window exists, as they must
/// be.
///
/// On failure nothing has been drawn, no GL call has been made and no window is left open; the
/// caller still has to terminate the platform. A window whose context can't be made current is
/// no more usable than one that was never created, so both report [`Error::WindowCreation`].
pub fn bootstrap<P: Platform>(
    platform: &mut P,
    config: &WindowConfig,
) -> Result<(P::Window, P::Gpu)> {
    if !platform.init() {
        log::warn!("windowing platform failed to initialize");
    }

    for hint in context_hints().iter() {
        platform.hint(*hint);
    }

    let mut window = platform.create_window(config).ok_or(Error::WindowCreation)?;

    platform.make_context_current(&mut window);
    let gpu = match platform.load_gpu(&window) {
        Some(gpu) => gpu,
        None => {
            log::error!("GL context is not current; cannot load OpenGL");
            platform.destroy_window(window);
            return Err(Error::WindowCreation);
        }
    };
    gpu.viewport(0, 0, config.width as i32, config.height as i32);

    Ok((window, gpu))
}

/// Presents frames until the window is asked to close.
///
/// One cleared frame is swapped in before the loop starts; the loop then draws over it. Each
/// iteration renders, swaps and then polls events, so a close request seen during a poll ends
/// the loop before another frame is drawn.
pub fn present<P: Platform>(
    platform: &mut P,
    window: &mut P::Window,
    scene: &Scene<'_, P::Gpu>,
) -> usize {
    clear_frame(scene.gpu);
    platform.swap_buffers(window);

    let mut frames = 0;
    while !platform.should_close(window) {
        scene.render();
        platform.swap_buffers(window);
        platform.poll_events();
        frames += 1;
    }

    frames
}

/// Runs the whole program against `platform`.
///
/// If the window cannot be created, `Failed to create window` is written to `out`, the platform is
/// terminated and [`Error::WindowCreation`] is returned.
pub fn run<P: Platform, W: Write>(platform: &mut P, out: &mut W) -> Result<RunSummary> {
    let config = WindowConfig::default();

    let (mut window, gpu) = match bootstrap(platform, &config) {
        Ok(ready) => ready,
        Err(e) => {
            if let Err(io) = writeln!(out, "{}", e).and_then(|_| out.flush()) {
                log::warn!("could not write diagnostic: {}", io);
            }
            platform.terminate();
            return Err(e);
        }
    };

    let frames = {
        let scene = Scene::new(&gpu);
        log::info!("entering render loop");
        let frames = present(platform, &mut window, &scene);
        // `scene` drops here: vertex array, buffer, then program.
        frames
    };

    platform.destroy_window(window);
    platform.terminate();

    log::info!("window closed after {} frames", frames);
    Ok(RunSummary { frames })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::headless::HeadlessPlatform;

    #[test]
    fn bootstrap_sets_full_window_viewport() {
        let mut platform = HeadlessPlatform::new();
        let (_window, gpu) = bootstrap(&mut platform, &WindowConfig::default()).unwrap();
        assert_eq!(gpu.current_viewport(), (0, 0, 800, 800));
    }

    #[test]
    fn hints_precede_window_creation() {
        let mut platform = HeadlessPlatform::new();
        bootstrap(&mut platform, &WindowConfig::default()).unwrap();

        let calls = platform.calls();
        let created = calls.iter().position(|c| *c == "create_window").unwrap();
        let last_hint = calls.iter().rposition(|c| *c == "hint").unwrap();
        assert!(last_hint < created);
        assert_eq!(platform.hints_at_creation(), &context_hints()[..]);
    }

    #[test]
    fn context_is_current_before_loading() {
        let mut platform = HeadlessPlatform::new();
        bootstrap(&mut platform, &WindowConfig::default()).unwrap();

        let calls = platform.calls();
        assert_eq!(
            &calls[calls.len() - 3..],
            &["create_window", "make_context_current", "load_gpu"]
        );
    }

    #[test]
    fn scene_builds_program_before_mesh() {
        let mut platform = HeadlessPlatform::new();
        let (_window, gpu) = bootstrap(&mut platform, &WindowConfig::default()).unwrap();
        let scene = Scene::new(&gpu);

        let calls = gpu.calls();
        let linked = calls.iter().position(|c| *c == "link_program").unwrap();
        let vao = calls.iter().position(|c| *c == "gen_vertex_array").unwrap();
        assert!(linked < vao);
        assert!(scene.program().id() != scene.mesh().vertex_array().id());
    }

    #[test]
    fn render_issues_one_draw_of_three_vertices() {
        let mut platform = HeadlessPlatform::new();
        let (_window, gpu) = bootstrap(&mut platform, &WindowConfig::default()).unwrap();
        let scene = Scene::new(&gpu);
        let before = gpu.calls().len();

        scene.render();

        let calls = gpu.calls();
        assert_eq!(
            &calls[before..],
            &[
                "clear_color",
                "clear",
                "use_program",
                "bind_vertex_array",
                "draw_arrays",
                "bind_vertex_array",
            ]
        );
    }
}
