use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::Layered, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{config::LogConfig, error::LogError, format::LogFormat};

type Filtered = Layered<EnvFilter, Registry>;

pub(crate) fn init(cfg: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(&cfg.filter)
        .map_err(|_| LogError::InvalidFilter(cfg.filter.clone()))?;

    match cfg.format {
        LogFormat::Text => install(
            filter,
            fmt::layer()
                .with_ansi(cfg.use_color)
                .with_target(cfg.with_targets)
                .with_timer(rfc3339_timer()),
        ),
        LogFormat::Json => install(
            filter,
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(cfg.with_targets)
                .with_timer(rfc3339_timer()),
        ),
        LogFormat::Journald => journald(filter),
    }
}

fn install<L>(filter: EnvFilter, layer: L) -> Result<(), LogError>
where
    L: Layer<Filtered> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(as_error)
}

fn rfc3339_timer() -> OffsetTime<Rfc3339> {
    // local offset is unavailable in some containers; UTC is fine there
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn as_error(e: impl std::fmt::Display) -> LogError {
    let s = e.to_string();
    if s.contains("SetGlobalDefaultError") {
        LogError::AlreadyInitialized
    } else {
        LogError::InitializationFailed(s)
    }
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald(filter: EnvFilter) -> Result<(), LogError> {
    let layer = tracing_journald::layer()
        .map_err(|e| LogError::InitializationFailed(format!("journald: {e}")))?;
    install(filter, layer)
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald(_filter: EnvFilter) -> Result<(), LogError> {
    Err(LogError::JournaldNotSupported)
}
