//! Error types for scene compilation

use thiserror::Error;

/// Result type alias using the scene compiler's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or compiling a scene
///
/// All of these are fatal for the compile that raised them: they point at a
/// scene-construction bug, not at a transient condition.
#[derive(Error, Debug)]
pub enum Error {
    /// The scene is missing something it needs (root, camera transform, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A type descriptor, constant-buffer member or node handle does not exist
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// A node instance was prepared again after it was already built
    #[error("State error: {0}")]
    State(String),

    /// The operation is undefined for this kind of expression
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// A parameter write does not match its constant-buffer member
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The external shader compiler rejected the generated source
    #[error("Shader compilation failed: {0}")]
    Compile(#[source] Box<dyn std::error::Error + Send + Sync>),
}
