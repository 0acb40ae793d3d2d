//! Command/response transport on top of a [`HardwareAdapter`].
//!
//! One call is exactly one round trip: the command is written, and when a
//! reply is expected one line is read back. Replies containing the literal
//! substring `"error"` are the instrument's way of rejecting a command and
//! surface as [`LaserError::UnsupportedCommand`], distinct from channel
//! failures which surface as [`LaserError::Transport`].
//!
//! The match is case-sensitive. Cobolt firmware answers rejected commands
//! with a lower-case `error`, and existing deployments depend on anything
//! else passing through.

use crate::adapters::HardwareAdapter;
use crate::error::{LaserError, LaserResult};
use crate::logging::LogSink;
use std::sync::Arc;
use tracing::Level;

const REJECTION_MARKER: &str = "error";

/// Exclusive command channel to one laser.
pub struct Transport {
    adapter: Box<dyn HardwareAdapter>,
    log: Arc<dyn LogSink>,
}

impl Transport {
    /// Wrap a connected adapter.
    pub fn new(adapter: Box<dyn HardwareAdapter>, log: Arc<dyn LogSink>) -> Self {
        Self { adapter, log }
    }

    /// Name of the underlying adapter.
    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    /// Send `command`, reading back one reply line when `expect_response`.
    pub fn send(&mut self, command: &str, expect_response: bool) -> LaserResult<Option<String>> {
        if let Err(err) = self.adapter.write_line(command) {
            self.log.log(
                Level::WARN,
                &format!("Sending '{}' over {} failed: {}", command, self.adapter.name(), err),
            );
            return Err(err);
        }

        if !expect_response {
            self.log.log(Level::DEBUG, &format!("Sent: {}", command));
            return Ok(None);
        }

        let response = match self.adapter.read_line() {
            Ok(response) => response,
            Err(err) => {
                self.log.log(
                    Level::WARN,
                    &format!("Reading reply to '{}' failed: {}", command, err),
                );
                return Err(err);
            }
        };

        if response.contains(REJECTION_MARKER) {
            self.log.log(
                Level::WARN,
                &format!("Sent: {} Reply received: {}", command, response),
            );
            return Err(LaserError::UnsupportedCommand {
                command: command.to_string(),
                response,
            });
        }

        self.log.log(
            Level::DEBUG,
            &format!("Sent: {} Reply received: {}", command, response),
        );
        Ok(Some(response))
    }

    /// Send a query and return its reply.
    pub fn query(&mut self, command: &str) -> LaserResult<String> {
        self.send(command, true)?
            .ok_or_else(|| LaserError::invalid_response(command, ""))
    }

    /// Send a set command and check the acknowledgement for a rejection.
    pub fn execute(&mut self, command: &str) -> LaserResult<()> {
        self.send(command, true).map(|_| ())
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("adapter", &self.adapter.name())
            .finish()
    }
}
