use thiserror::Error;

/// Why a route could not be produced.
///
/// Callers that only care about "route or no route" can treat every variant
/// the same; the distinction is kept for diagnostics and tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Unknown node id: {0}")]
    InvalidEndpoint(String),

    #[error("No route from {start} to {end}")]
    Unreachable { start: String, end: String },

    #[error("Search truncated after expanding {expanded} nodes")]
    SearchTruncated { expanded: usize },
}

#[derive(Error, Debug)]
pub enum NavError {
    #[error("Graph format error: {0}")]
    GraphFormat(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration format error: {0}")]
    ConfigFormat(#[from] toml::de::Error),

    #[error("Routing failed: {0}")]
    Path(#[from] PathError),
}

pub type Result<T> = std::result::Result<T, NavError>;
