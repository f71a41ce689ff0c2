//! [`Platform`] on a real desktop, using `glutin` for the window, the context and the event loop.
//!
//! glutin wants to own the main loop through `EventLoop::run`. We need the opposite (our loop
//! calls `poll_events` once per frame), so `poll_events` uses `run_return` and exits as soon as
//! the queued events have been handled.

use std::collections::HashSet;
use std::ffi::c_void;
use std::mem;
use std::panic;

use glutin::dpi::PhysicalSize;
use glutin::event::{Event, WindowEvent};
use glutin::event_loop::{ControlFlow, EventLoop};
use glutin::platform::desktop::EventLoopExtDesktop;
use glutin::window::{WindowBuilder, WindowId};
use glutin::{Api, ContextBuilder, GlRequest, NotCurrent, PossiblyCurrent, WindowedContext};

use super::Platform;
use crate::config::{ContextHint, GlProfile, WindowConfig};
use crate::graphics::opengl::GlApi;

enum ContextState {
    NotCurrent(WindowedContext<NotCurrent>),
    Current(WindowedContext<PossiblyCurrent>),
    /// Only seen transiently while switching states.
    Lost,
}

pub struct DesktopWindow {
    id: WindowId,
    context: ContextState,
}

pub struct DesktopPlatform {
    event_loop: Option<EventLoop<()>>,
    version: Option<(u8, u8)>,
    profile: Option<GlProfile>,
    close_requested: HashSet<WindowId>,
}

impl Default for DesktopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopPlatform {
    pub fn new() -> Self {
        Self {
            event_loop: None,
            version: None,
            profile: None,
            close_requested: HashSet::new(),
        }
    }

    fn context_builder(&self) -> ContextBuilder<'static, NotCurrent> {
        let mut builder = ContextBuilder::new();

        if let Some(version) = self.version {
            builder = builder.with_gl(GlRequest::Specific(Api::OpenGl, version));
        }

        if let Some(GlProfile::Core) = self.profile {
            builder = builder.with_gl_profile(glutin::GlProfile::Core);
        }

        builder
    }
}

impl Platform for DesktopPlatform {
    type Window = DesktopWindow;
    type Gpu = GlApi;

    fn init(&mut self) -> bool {
        if self.event_loop.is_some() {
            return true;
        }

        // winit panics instead of returning an error when no display server is reachable.
        let hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let event_loop = panic::catch_unwind(EventLoop::new);
        panic::set_hook(hook);

        match event_loop {
            Ok(event_loop) => {
                self.event_loop = Some(event_loop);
                log::debug!("event loop created");
                true
            }
            Err(cause) => {
                let reason = cause
                    .downcast_ref::<String>()
                    .map(String::as_str)
                    .or_else(|| cause.downcast_ref::<&str>().copied())
                    .unwrap_or("unknown error");
                log::error!("no windowing backend available: {}", reason);
                false
            }
        }
    }

    fn terminate(&mut self) {
        self.event_loop = None;
        self.version = None;
        self.profile = None;
        self.close_requested.clear();
    }

    fn hint(&mut self, hint: ContextHint) {
        match hint {
            ContextHint::Version(major, minor) => self.version = Some((major, minor)),
            ContextHint::Profile(profile) => self.profile = Some(profile),
        }
    }

    fn create_window(&mut self, config: &WindowConfig) -> Option<DesktopWindow> {
        let event_loop = match self.event_loop.as_ref() {
            Some(event_loop) => event_loop,
            None => {
                log::error!("create_window called before init");
                return None;
            }
        };

        let window = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(config.width, config.height));

        match self.context_builder().build_windowed(window, event_loop) {
            Ok(context) => {
                let id = context.window().id();
                log::info!(
                    "created {}x{} window \"{}\"",
                    config.width,
                    config.height,
                    config.title
                );
                Some(DesktopWindow {
                    id,
                    context: ContextState::NotCurrent(context),
                })
            }
            Err(e) => {
                log::error!("window creation failed: {}", e);
                None
            }
        }
    }

    fn make_context_current(&mut self, window: &mut DesktopWindow) {
        window.context = match mem::replace(&mut window.context, ContextState::Lost) {
            ContextState::NotCurrent(context) => match unsafe { context.make_current() } {
                Ok(context) => ContextState::Current(context),
                Err((context, e)) => {
                    log::warn!("could not make the GL context current: {}", e);
                    ContextState::NotCurrent(context)
                }
            },
            other => other,
        };
    }

    fn load_gpu(&mut self, window: &DesktopWindow) -> Option<GlApi> {
        match &window.context {
            ContextState::Current(context) => Some(GlApi::load_with(|s| {
                context.get_proc_address(s) as *const c_void
            })),
            _ => None,
        }
    }

    fn should_close(&self, window: &DesktopWindow) -> bool {
        self.close_requested.contains(&window.id)
    }

    fn set_should_close(&mut self, window: &mut DesktopWindow, value: bool) {
        if value {
            self.close_requested.insert(window.id);
        } else {
            self.close_requested.remove(&window.id);
        }
    }

    fn swap_buffers(&mut self, window: &mut DesktopWindow) {
        if let ContextState::Current(context) = &window.context {
            if let Err(e) = context.swap_buffers() {
                log::warn!("swap_buffers failed: {}", e);
            }
        }
    }

    fn poll_events(&mut self) {
        let close_requested = &mut self.close_requested;

        if let Some(event_loop) = self.event_loop.as_mut() {
            event_loop.run_return(|event, _, control_flow| {
                *control_flow = ControlFlow::Poll;

                match event {
                    Event::WindowEvent {
                        window_id,
                        event: WindowEvent::CloseRequested,
                    } => {
                        log::debug!("close requested for {:?}", window_id);
                        close_requested.insert(window_id);
                    }
                    Event::MainEventsCleared => *control_flow = ControlFlow::Exit,
                    _ => {}
                }
            });
        }
    }

    fn destroy_window(&mut self, window: DesktopWindow) {
        self.close_requested.remove(&window.id);
        drop(window);
    }
}
