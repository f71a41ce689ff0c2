use thiserror::Error;

/// The one failure the program reports. Shader, link and driver problems are logged instead.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Failed to create window")]
    WindowCreation,
}

pub type Result<T> = std::result::Result<T, Error>;
