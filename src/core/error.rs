use thiserror::Error;

/// Errors raised by metric construction and configuration.
///
/// The instrumentation core is synchronous, in-memory, and failure-free by
/// construction: once a metric is built, its operations never fail. All
/// errors therefore surface at construction time.
#[derive(Error, Debug)]
pub enum MetronError {
    /// Invalid configuration value supplied at construction.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reservoir decay parameter outside its valid range.
    #[error("decay factor alpha must be positive and finite, got {0}")]
    InvalidAlpha(f64),

    /// A reservoir with zero capacity retains no samples.
    #[error("reservoir capacity must be greater than zero")]
    ZeroCapacity,

    /// A meter cannot tick on a zero-length interval.
    #[error("meter tick interval must be non-zero")]
    ZeroTickInterval,
}

/// Result type alias for metron operations
pub type Result<T> = std::result::Result<T, MetronError>;

impl MetronError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InvalidAlpha(_) | Self::ZeroCapacity => "reservoir",
            Self::ZeroTickInterval => "meter",
        }
    }
}
