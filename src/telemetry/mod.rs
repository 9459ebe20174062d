//! Telemetry module
//!
//! Structured logging and metric registration

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{
    describe_metrics, MERGED_LEN, REFETCHES, STALE_RESPONSES, TICKS_ACCEPTED, TICKS_DROPPED,
};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_format)?;
    describe_metrics();
    Ok(())
}
