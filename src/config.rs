//! Configuration types for intraday-sync

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub history: HistoryConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    pub telemetry: TelemetryConfig,
}

/// Live tick feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket endpoint for the quote feed
    pub ws_url: String,
    /// Trading symbol to stream (e.g. "RELIANCE")
    pub symbol: String,
    /// Subscription mode sent with the subscribe payload
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Whether live streaming starts enabled
    #[serde(default = "default_true")]
    pub live_enabled: bool,
}

/// Historical candle endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Base URL of the historical data service
    pub base_url: String,
    /// Candle interval requested for intraday display
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional bearer token for authenticated endpoints
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Exchange session parameters
///
/// Defaults describe the NSE regular session: UTC+05:30, open 09:15 local.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Exchange UTC offset in minutes (fixed, no DST)
    #[serde(default = "default_utc_offset_mins")]
    pub utc_offset_mins: i32,

    /// Regular session open, hour of day in exchange-local time
    #[serde(default = "default_open_hour")]
    pub open_hour: u32,

    /// Regular session open, minute of hour in exchange-local time
    #[serde(default = "default_open_min")]
    pub open_min: u32,

    /// Window recomputation cadence in seconds
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_utc_offset_mins() -> i32 {
    330
}
fn default_open_hour() -> u32 {
    9
}
fn default_open_min() -> u32 {
    15
}
fn default_refresh_secs() -> u64 {
    30
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            utc_offset_mins: 330,
            open_hour: 9,
            open_min: 15,
            refresh_secs: 30,
        }
    }
}

/// Backfill coordinator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Minimum seconds between historical refetches for an unchanged
    /// symbol and session
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_cooldown_secs() -> u64 {
    60
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { cooldown_secs: 60 }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// "pretty" for humans, "json" for log aggregation
    #[serde(default)]
    pub log_format: crate::telemetry::LogFormat,
}

fn default_true() -> bool {
    true
}
fn default_mode() -> String {
    "ltp".to_string()
}
fn default_interval() -> String {
    "minute".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants the type system cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        let s = &self.session;
        if s.utc_offset_mins.abs() >= 18 * 60 {
            anyhow::bail!("session.utc_offset_mins out of range: {}", s.utc_offset_mins);
        }
        if s.open_hour >= 24 || s.open_min >= 60 {
            anyhow::bail!(
                "session open time invalid: {:02}:{:02}",
                s.open_hour,
                s.open_min
            );
        }
        if self.feed.symbol.trim().is_empty() {
            anyhow::bail!("feed.symbol must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EXAMPLE: &str = r#"
        [feed]
        ws_url = "wss://ticks.example.com/quotes"
        symbol = "RELIANCE"
        mode = "ltp"

        [history]
        base_url = "https://api.example.com"
        interval = "minute"

        [telemetry]
        log_level = "info"
    "#;

    #[test]
    fn test_config_deserialize() {
        let config: Config = toml::from_str(EXAMPLE).unwrap();
        assert_eq!(config.feed.symbol, "RELIANCE");
        assert_eq!(config.feed.mode, "ltp");
        assert!(config.feed.live_enabled);
        assert_eq!(config.history.interval, "minute");
        assert_eq!(config.history.timeout_secs, 10);
        assert!(config.history.access_token.is_none());
        assert_eq!(config.telemetry.log_format, crate::telemetry::LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_from_config() {
        let toml = EXAMPLE.replace(
            "log_level = \"info\"",
            "log_level = \"info\"\n        log_format = \"json\"",
        );
        let config: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.telemetry.log_format, crate::telemetry::LogFormat::Json);
    }

    #[test]
    fn test_session_defaults_are_nse() {
        let config: Config = toml::from_str(EXAMPLE).unwrap();
        assert_eq!(config.session.utc_offset_mins, 330);
        assert_eq!(config.session.open_hour, 9);
        assert_eq!(config.session.open_min, 15);
        assert_eq!(config.session.refresh_secs, 30);
        assert_eq!(config.sync.cooldown_secs, 60);
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.feed.symbol, "RELIANCE");
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_open_time() {
        let mut config: Config = toml::from_str(EXAMPLE).unwrap();
        config.session.open_hour = 25;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_symbol() {
        let mut config: Config = toml::from_str(EXAMPLE).unwrap();
        config.feed.symbol = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_offset_out_of_range() {
        let mut config: Config = toml::from_str(EXAMPLE).unwrap();
        config.session.utc_offset_mins = 19 * 60;
        assert!(config.validate().is_err());
    }
}
