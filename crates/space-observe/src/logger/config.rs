use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::object::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// How the process logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directives, e.g. `info,space_core=debug`.
    pub level: LoggerLevel,
    /// Timezone of the timestamps.
    pub tz: LoggerTimeZone,
    /// Print event targets (module paths). Off by default.
    pub with_targets: bool,
    /// Disable ANSI colors even on a terminal.
    pub no_color: bool,
}

impl LoggerConfig {
    /// Colors are used only for text output to a terminal.
    pub fn use_color(&self) -> bool {
        self.format == LoggerFormat::Text && !self.no_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.tz, LoggerTimeZone::Utc);
        assert_eq!(cfg.level, LoggerLevel::default());
        assert!(!cfg.with_targets);
        assert!(!cfg.no_color);
    }

    #[test]
    fn json_is_never_colored() {
        let cfg = LoggerConfig {
            format: LoggerFormat::Json,
            ..LoggerConfig::default()
        };
        assert!(!cfg.use_color());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"format": "json", "level": "debug"}"#).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level.as_str(), "debug");
        assert_eq!(cfg.tz, LoggerTimeZone::Utc);
    }

    #[test]
    fn invalid_filter_is_rejected_on_load() {
        let res = serde_json::from_str::<LoggerConfig>(r#"{"level": "space_core=loud"}"#);
        assert!(res.is_err());
    }
}
