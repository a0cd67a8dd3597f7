//! Imagehost core library
//!
//! Shared building blocks for the imagehost service: configuration loaded
//! from the environment, the upload error taxonomy, and the data-URL
//! payload decoder. This crate is a leaf — it knows nothing about HTTP,
//! the chain, or storage backends.

pub mod config;
pub mod error;
pub mod payload;

pub use config::{Config, StorageBackend};
pub use error::{AppError, ErrorStage, LogLevel};
pub use payload::{decode_envelope, DecodedImage, ImageFormat};
