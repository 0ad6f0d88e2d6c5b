//! content-studio adapters crate
//!
//! Infrastructure adapters implementing the domain ports:
//! - `gemini`: Gemini REST model provider
//! - `stub`: offline model provider
//! - `media`: filesystem media store

pub mod gemini;
mod media_fs;
pub mod stub;

/// Re-exports for media adapters
pub mod media {
    pub use crate::media_fs::FsMediaStore;
}

pub use gemini::{GeminiProvider, GeminiSettings};
pub use stub::StubProvider;
