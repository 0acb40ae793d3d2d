//! Logging capability handed to the transport and the model builder.
//!
//! The core never reaches for a process-wide logger. Components that log take
//! an `Arc<dyn LogSink>` at construction; [`TracingSink`] forwards everything
//! to `tracing`, which the binary wires to `tracing-subscriber`.

use std::sync::Arc;
use tracing::Level;

/// Destination for diagnostic messages.
pub trait LogSink: Send + Sync {
    /// Record one message at the given level.
    fn log(&self, level: Level, message: &str);
}

/// Forwards messages to the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            Level::TRACE => tracing::trace!("{}", message),
        }
    }
}

/// The sink used when the caller does not supply one.
pub fn default_sink() -> Arc<dyn LogSink> {
    Arc::new(TracingSink)
}
