//! The windowing side of the program: something that can open a window with a GL context,
//! present frames into it and tell us when the user wants it gone.
//!
//! [`Platform`] is modelled on the classic GLFW-style API (init, hints, create, make current,
//! swap, poll, destroy, terminate) because the render loop is written in exactly those terms.
//! [`desktop::DesktopPlatform`] implements it with `glutin`; [`headless::HeadlessPlatform`]
//! implements it in memory for tests.

pub mod desktop;
pub mod headless;

use crate::config::{ContextHint, WindowConfig};
use crate::graphics::api::Gpu;

pub trait Platform {
    type Window;
    type Gpu: Gpu;

    /// Process-wide setup. Returns `false` if the platform could not be initialized, in which
    /// case `create_window` returns `None`.
    fn init(&mut self) -> bool;

    /// Process-wide teardown. Every window must already be destroyed.
    fn terminate(&mut self);

    /// Sets a context-creation hint. Only affects windows created afterwards.
    fn hint(&mut self, hint: ContextHint);

    /// Opens a windowed, unshared window with its own GL context, or `None` if that failed.
    fn create_window(&mut self, config: &WindowConfig) -> Option<Self::Window>;

    fn make_context_current(&mut self, window: &mut Self::Window);

    /// Resolves the GL entry points for `window`'s context. `None` if that context is not current
    /// on this thread.
    fn load_gpu(&mut self, window: &Self::Window) -> Option<Self::Gpu>;

    fn should_close(&self, window: &Self::Window) -> bool;

    fn set_should_close(&mut self, window: &mut Self::Window, value: bool);

    fn swap_buffers(&mut self, window: &mut Self::Window);

    /// Handles pending window-system events without waiting for new ones.
    fn poll_events(&mut self);

    fn destroy_window(&mut self, window: Self::Window);
}
