//! Compile-time settings. The program takes no arguments and reads no files, so everything that
//! would normally be configurable lives here as a constant.

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 800;
pub const WINDOW_TITLE: &str = "First OpenGL";

pub const GL_VERSION: (u8, u8) = (3, 3);

/// Dark teal background.
pub const CLEAR_COLOR: Rgba = Rgba::new(0.07, 0.13, 0.17, 1.0);

/// The color the fragment shader writes. Kept in sync with `shaders::FRAGMENT_SHADER_SOURCE`.
pub const TRIANGLE_COLOR: Rgba = Rgba::new(1.0, 0.5, 0.2, 1.0);

/// Shader input location of `aPos`.
pub const POSITION_ATTRIBUTE: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlProfile {
    /// Only the modern, non-deprecated API.
    Core,
}

/// A context-creation hint. Hints only take effect if given before the window is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextHint {
    Version(u8, u8),
    Profile(GlProfile),
}

/// The hints the program requests: OpenGL 3.3, core profile.
pub fn context_hints() -> [ContextHint; 2] {
    [
        ContextHint::Version(GL_VERSION.0, GL_VERSION.1),
        ContextHint::Profile(GlProfile::Core),
    ]
}

/// A windowed (not fullscreen), unshared window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            title: String::from(WINDOW_TITLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_800_square() {
        let config = WindowConfig::default();
        assert_eq!((config.width, config.height), (800, 800));
        assert_eq!(config.title, "First OpenGL");
    }

    #[test]
    fn hints_request_core_33() {
        let hints = context_hints();
        assert!(hints.contains(&ContextHint::Version(3, 3)));
        assert!(hints.contains(&ContextHint::Profile(GlProfile::Core)));
    }
}
