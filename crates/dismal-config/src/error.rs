//! Error types for configuration and file operations.

use std::path::PathBuf;
use thiserror::Error;

use dismal_core::DissonanceError;

use crate::file::FileKind;
use crate::tuning::TuningError;

/// Errors that can occur while reading, writing, or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Refused to overwrite an existing file
    #[error("file already exists: '{0}'")]
    AlreadyExists(PathBuf),

    /// Nothing to save
    #[error("{0} has nothing to save")]
    Empty(String),

    /// Tuning system lacks a reference frequency or repeat ratio
    #[error("tuning system '{name}' has no {missing}")]
    Incomplete {
        /// Name of the tuning system.
        name: String,
        /// The missing property.
        missing: &'static str,
    },

    /// File holds a different kind of data than requested
    #[error("expected {expected} data, found {found}")]
    WrongKind {
        /// Kind the caller asked for.
        expected: FileKind,
        /// Kind stored in the file.
        found: FileKind,
    },

    /// Distribution not found by name or path
    #[error("distribution not found: {0}")]
    NotFound(String),

    /// Sweep dimensions other than 2 or 3
    #[error("sweep dimensions must be 2 or 3, got {0}")]
    InvalidDimensions(u8),

    /// Stored values violate an overtone or calculator invariant
    #[error(transparent)]
    Dissonance(#[from] DissonanceError),

    /// Stored values violate a tuning system invariant
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}
