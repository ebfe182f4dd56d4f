use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the command-line driver.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] mandelgrid_core::CoreError),

    #[error(transparent)]
    Render(#[from] mandelgrid_render::RenderError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
