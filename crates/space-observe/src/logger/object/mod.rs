mod format;
pub use format::LoggerFormat;

mod level;
pub use level::LoggerLevel;

mod rfc3339;
pub(crate) use rfc3339::LoggerRfc3339;

mod timezone;
pub use timezone::{LoggerTimeZone, init_local_offset};

#[cfg(feature = "timezone-sync")]
pub(crate) use timezone::{format_offset, sync_local_offset};
