use super::annotate::AnnotateError;
use super::config::ConfigError;
use crate::core::io::extxyz::ExtXyzError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load structure file '{path}': {source}", path = path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ExtXyzError,
    },

    #[error("Failed to write structure file '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: ExtXyzError,
    },

    #[error("Cannot annotate configuration {index} of '{path}': {source}", path = path.display())]
    Annotation {
        path: PathBuf,
        index: usize,
        #[source]
        source: AnnotateError,
    },

    #[error("Output '{path}' already exists; refusing to overwrite it", path = path.display())]
    OutputExists { path: PathBuf },

    #[error(
        "Output '{path}' is the input directory '{input_dir}'",
        path = path.display(),
        input_dir = input_dir.display()
    )]
    OutputInInputDir { path: PathBuf, input_dir: PathBuf },

    #[error("Failed to write classification report '{path}': {source}", path = path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
