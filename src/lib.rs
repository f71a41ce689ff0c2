//! Opens an 800×800 OpenGL 3.3 core window and draws one orange equilateral triangle on a dark
//! teal background until the window is closed.
//!
//! The interesting part is the order things happen in: context before GL calls, vertex array
//! bound before the buffer it captures, objects deleted before the window that owns their context.
//! [`app::run`] is the whole program; the binary just runs it against a real desktop.

pub mod app;
pub mod config;
pub mod error;
pub mod graphics;
pub mod interface;
pub mod logging;

pub use app::{run, RunSummary};
pub use error::{Error, Result};
