//! Error types for the bridge.

use thiserror::Error;

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while driving the browser bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The engine shim library failed to load.
    #[error("failed to load engine library: {0}")]
    LibraryLoad(String),

    /// Symbol lookup in the engine library failed.
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    /// Engine runtime initialization failed.
    #[error("engine initialization failed: {0}")]
    InitFailed(String),

    /// The frame buffer could not be allocated.
    #[error("invalid frame buffer dimensions {width}x{height}")]
    Allocation { width: i32, height: i32 },

    /// The engine refused to create a window.
    #[error("window creation failed: {0}")]
    WindowCreate(String),

    /// Operation on a session whose window is gone.
    #[error("session not initialized")]
    NotInitialized,

    /// A URL or message contained an interior NUL byte.
    #[error("string not representable across the C boundary: {0}")]
    InvalidCString(#[from] std::ffi::NulError),

    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
}
