//! A scripted [`Platform`] with no display behind it.
//!
//! Windows are just numbers, the "GL context" is a shared [`SoftwareGpu`], and the user is a
//! counter: `close_after(n)` has the close button pressed during the `n`th `poll_events`. Every
//! call is recorded so tests can check what the program did and in which order.

use std::collections::HashSet;

use super::Platform;
use crate::config::{ContextHint, WindowConfig};
use crate::graphics::software::SoftwareGpu;

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HeadlessWindow {
    id: u32,
}

pub struct HeadlessPlatform {
    gpu: SoftwareGpu,
    initialized: bool,
    fail_init: bool,
    fail_window_creation: bool,
    fail_make_current: bool,
    close_after: Option<usize>,
    hints: Vec<ContextHint>,
    hints_at_creation: Vec<ContextHint>,
    calls: Vec<&'static str>,
    next_window: u32,
    live_windows: HashSet<u32>,
    close_requested: HashSet<u32>,
    polls_since_creation: usize,
    current: Option<u32>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            gpu: SoftwareGpu::new(),
            initialized: false,
            fail_init: false,
            fail_window_creation: false,
            fail_make_current: false,
            close_after: None,
            hints: Vec::new(),
            hints_at_creation: Vec::new(),
            calls: Vec::new(),
            next_window: 1,
            live_windows: HashSet::new(),
            close_requested: HashSet::new(),
            polls_since_creation: 0,
            current: None,
        }
    }

    /// Requests close on every open window during the `polls`th call to `poll_events` after the
    /// window was created.
    pub fn close_after(mut self, polls: usize) -> Self {
        self.close_after = Some(polls);
        self
    }

    /// Makes `init` report failure, as when no display server is reachable.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Makes `create_window` return `None`.
    pub fn failing_window_creation(mut self) -> Self {
        self.fail_window_creation = true;
        self
    }

    /// Makes `make_context_current` leave the context where it was.
    pub fn failing_make_current(mut self) -> Self {
        self.fail_make_current = true;
        self
    }

    /// The GPU handed out by `load_gpu`. Shares state with every copy given to the program.
    pub fn gpu(&self) -> &SoftwareGpu {
        &self.gpu
    }

    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }

    pub fn count_calls(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    /// The hints in effect when the most recent window was created.
    pub fn hints_at_creation(&self) -> &[ContextHint] {
        &self.hints_at_creation
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn live_windows(&self) -> usize {
        self.live_windows.len()
    }
}

impl Platform for HeadlessPlatform {
    type Window = HeadlessWindow;
    type Gpu = SoftwareGpu;

    fn init(&mut self) -> bool {
        self.calls.push("init");
        self.initialized = !self.fail_init;
        self.initialized
    }

    fn terminate(&mut self) {
        self.calls.push("terminate");
        self.initialized = false;
        self.hints.clear();
        self.close_requested.clear();
        self.current = None;
    }

    fn hint(&mut self, hint: ContextHint) {
        self.calls.push("hint");
        self.hints.retain(|h| different_kind(h, &hint));
        self.hints.push(hint);
    }

    fn create_window(&mut self, config: &WindowConfig) -> Option<HeadlessWindow> {
        self.calls.push("create_window");

        if !self.initialized || self.fail_window_creation {
            return None;
        }

        let id = self.next_window;
        self.next_window += 1;
        self.live_windows.insert(id);
        self.hints_at_creation = self.hints.clone();
        self.polls_since_creation = 0;
        self.gpu.resize_framebuffer(config.width, config.height);

        Some(HeadlessWindow { id })
    }

    fn make_context_current(&mut self, window: &mut HeadlessWindow) {
        self.calls.push("make_context_current");
        if !self.fail_make_current {
            self.current = Some(window.id);
        }
    }

    fn load_gpu(&mut self, window: &HeadlessWindow) -> Option<SoftwareGpu> {
        self.calls.push("load_gpu");
        if self.current != Some(window.id) {
            return None;
        }
        Some(self.gpu.clone())
    }

    fn should_close(&self, window: &HeadlessWindow) -> bool {
        self.close_requested.contains(&window.id)
    }

    fn set_should_close(&mut self, window: &mut HeadlessWindow, value: bool) {
        if value {
            self.close_requested.insert(window.id);
        } else {
            self.close_requested.remove(&window.id);
        }
    }

    fn swap_buffers(&mut self, _window: &mut HeadlessWindow) {
        self.calls.push("swap_buffers");
    }

    fn poll_events(&mut self) {
        self.calls.push("poll_events");
        self.polls_since_creation += 1;

        if let Some(limit) = self.close_after {
            if self.polls_since_creation >= limit {
                self.close_requested.extend(self.live_windows.iter().copied());
            }
        }
    }

    fn destroy_window(&mut self, window: HeadlessWindow) {
        self.calls.push("destroy_window");
        self.live_windows.remove(&window.id);
        self.close_requested.remove(&window.id);
        if self.current == Some(window.id) {
            self.current = None;
        }
    }
}

/// A later hint of the same kind replaces an earlier one.
fn different_kind(a: &ContextHint, b: &ContextHint) -> bool {
    std::mem::discriminant(a) != std::mem::discriminant(b)
}
