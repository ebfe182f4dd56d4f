use thiserror::Error;

/// Errors originating from the core grid engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid resolution: {x_res}×{y_res} (both must be >= 1)")]
    InvalidResolution { x_res: u32, y_res: u32 },

    #[error("invalid plot size: {reason}")]
    InvalidPlotSize { reason: String },

    #[error("invalid precision: {0} bits (must be between {min} and {max})", min = rug::float::prec_min(), max = rug::float::prec_max())]
    InvalidPrecision(u32),

    #[error("failed to parse {input:?} as a number: {source}")]
    Parse {
        input: String,
        #[source]
        source: rug::float::ParseFloatError,
    },

    #[error("failed to spawn grid worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("grid serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
