use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log format: {0} (expected: text|json|journald)")]
    InvalidFormat(String),
    #[error("Journald is not supported on this platform or feature disabled")]
    JournaldNotSupported,
    #[error("Logger has been already initialized")]
    AlreadyInitialized,
    #[error("Failed to initialize logger: {0}")]
    InitializationFailed(String),
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}
