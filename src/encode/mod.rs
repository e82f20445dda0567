//! External encoder invocation.

/// `ffmpeg` subprocess encoder and its settings.
pub mod ffmpeg;
