use std::fmt;

use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::logger::object::timezone::{LoggerTimeZone, local_offset};

/// RFC 3339 timestamps in the configured timezone.
///
/// The local offset is read on every event, so offset updates show up
/// without rebuilding the subscriber.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LoggerRfc3339 {
    tz: LoggerTimeZone,
}

impl LoggerRfc3339 {
    pub(crate) fn new(tz: LoggerTimeZone) -> Self {
        Self { tz }
    }

    fn offset(&self) -> UtcOffset {
        match self.tz {
            LoggerTimeZone::Utc => UtcOffset::UTC,
            LoggerTimeZone::Local => local_offset(),
        }
    }
}

impl FormatTime for LoggerRfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match OffsetDateTime::now_utc().to_offset(self.offset()).format(&Rfc3339) {
            Ok(ts) => write!(w, "{ts}"),
            Err(_) => write!(w, "<invalid-time>"),
        }
    }
}
