//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for fallible crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error, surfaced by the demo binary
#[derive(Error, Debug)]
pub enum Error {
    #[error("Asset loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// SDL reports failures as plain strings.
    #[error("Window error: {0}")]
    Window(String),

    #[error("Image write failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Model and texture loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("OBJ parse error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("Model has no vertex positions")]
    NoVertices,

    #[error("Model has no vertex normals")]
    NoNormals,

    #[error("Model has no texture coordinates")]
    NoUvs,

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value in {}: {field} must be greater than zero", path.display())]
    ZeroSize { path: PathBuf, field: &'static str },
}
