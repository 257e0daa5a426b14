//! Errors raised while assembling or rendering a scene.

use thiserror::Error;

/// Errors that abort a render.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A transform matrix could not be inverted.
    #[error("Transform is not invertible (determinant {0})")]
    SingularTransform(f32),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
