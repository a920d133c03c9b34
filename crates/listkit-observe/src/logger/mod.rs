mod config;
mod error;
mod format;
mod log;

pub use config::LogConfig;
pub use error::LogError;
pub use format::LogFormat;

/// Installs the global tracing subscriber described by `cfg`.
///
/// Call once at startup; a second call reports
/// [`LogError::AlreadyInitialized`].
pub fn log_init(cfg: &LogConfig) -> Result<(), LogError> {
    log::init(cfg)
}
