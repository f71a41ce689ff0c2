//! A thin, safe layer over the handful of OpenGL calls the program makes.
//!
//! [`api::Gpu`] is the GL surface as a trait, with [`opengl::GlApi`] talking to the real driver and
//! [`software::SoftwareGpu`] standing in for it without a display. [`gl_types`] wraps object names
//! in owners that clean up after themselves, and [`shaders`] and [`geometry`] build the one program
//! and the one mesh that get drawn.
//!
//! [Learn OpenGL](https://learnopengl.com/) covers the concepts behind all of this.

pub mod api;
pub mod geometry;
pub mod gl_types;
pub mod opengl;
pub mod shaders;
pub mod software;
