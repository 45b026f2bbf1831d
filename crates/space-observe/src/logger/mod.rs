mod config;
mod error;
mod init;
mod object;

#[cfg(feature = "timezone-sync")]
mod sync;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerTimeZone, init_local_offset};

#[cfg(feature = "timezone-sync")]
pub use sync::{TZ_SYNC_PERIOD, run_timezone_sync};

/// Install the global `tracing` subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] when called twice. With
/// [`LoggerTimeZone::Local`], call [`init_local_offset`] first, before any
/// thread is spawned.
///
/// ```no_run
/// use space_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).expect("logger");
/// tracing::info!("ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => init::text(cfg),
        LoggerFormat::Json => init::json(cfg),
        LoggerFormat::Journald => init::journald(cfg),
    }
}
