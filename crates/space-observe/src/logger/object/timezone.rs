use std::{
    fmt,
    str::FromStr,
    sync::{OnceLock, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::logger::error::LoggerError;

/// Last known local offset. UTC until detected.
static LOCAL_OFFSET: RwLock<UtcOffset> = RwLock::new(UtcOffset::UTC);

/// Set once the offset has been detected or explicitly initialized.
static DETECTED: OnceLock<()> = OnceLock::new();

/// Timezone of log timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerTimeZone {
    #[default]
    Utc,
    Local,
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoggerTimeZone::Utc => "utc",
            LoggerTimeZone::Local => "local",
        })
    }
}

/// Detect the local offset. Call from `main` before the runtime starts:
/// detection is refused once the process has several threads.
pub fn init_local_offset() {
    if let Ok(offset) = UtcOffset::current_local_offset() {
        store(offset);
    }
    let _ = DETECTED.set(());
}

/// Re-detect the local offset. Returns the new offset when it changed.
#[cfg_attr(not(feature = "timezone-sync"), allow(dead_code))]
pub(crate) fn sync_local_offset() -> Option<(UtcOffset, UtcOffset)> {
    let new = UtcOffset::current_local_offset().ok()?;
    let old = *LOCAL_OFFSET.read().unwrap_or_else(PoisonError::into_inner);
    if old == new {
        return None;
    }
    store(new);
    Some((old, new))
}

/// Offset used for `Local` timestamps.
pub(crate) fn local_offset() -> UtcOffset {
    DETECTED.get_or_init(|| {
        if let Ok(offset) = UtcOffset::current_local_offset() {
            store(offset);
        }
    });
    *LOCAL_OFFSET.read().unwrap_or_else(PoisonError::into_inner)
}

fn store(offset: UtcOffset) {
    *LOCAL_OFFSET.write().unwrap_or_else(PoisonError::into_inner) = offset;
}

/// `UTC+03`, `UTC+03:30`, `UTC-05`.
#[cfg_attr(not(feature = "timezone-sync"), allow(dead_code))]
pub(crate) fn format_offset(offset: UtcOffset) -> String {
    let (hours, minutes) = (offset.whole_hours(), offset.minutes_past_hour());
    if minutes == 0 {
        format!("UTC{hours:+03}")
    } else {
        format!("UTC{hours:+03}:{:02}", minutes.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_in_any_case() {
        assert_eq!("UTC".parse::<LoggerTimeZone>().unwrap(), LoggerTimeZone::Utc);
        assert_eq!("Local".parse::<LoggerTimeZone>().unwrap(), LoggerTimeZone::Local);
        assert!("pst".parse::<LoggerTimeZone>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&LoggerTimeZone::Local).unwrap(), r#""local""#);
    }

    #[test]
    fn offsets_are_formatted_compactly() {
        assert_eq!(format_offset(UtcOffset::UTC), "UTC+00");
        assert_eq!(format_offset(UtcOffset::from_hms(3, 30, 0).unwrap()), "UTC+03:30");
        assert_eq!(format_offset(UtcOffset::from_hms(-5, 0, 0).unwrap()), "UTC-05");
    }

    #[test]
    fn local_offset_is_plausible() {
        init_local_offset();
        assert!(local_offset().whole_hours().abs() <= 14);
    }
}
