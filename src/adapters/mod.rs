//! Hardware adapter implementations
//!
//! This module contains implementations of the `HardwareAdapter` trait,
//! the line-level I/O abstraction the [`Transport`](crate::transport::Transport)
//! sits on. Adapters own the channel conventions: they append their command
//! terminator on write and strip their response terminator on read.

pub mod mock;
pub mod serial_adapter;

pub use mock::{CommandLog, MockAdapter};
pub use serial_adapter::{SerialAdapter, SerialAdapterBuilder};

use crate::error::LaserResult;

/// Line-oriented channel to an instrument.
///
/// Implementations are blocking: `write_line` returns once the line has been
/// handed to the channel, `read_line` returns once a full response line has
/// arrived or the adapter's own timeout has expired.
pub trait HardwareAdapter: Send {
    /// Short adapter identifier used in log messages.
    fn name(&self) -> &str;

    /// Write one command, appending the adapter's line terminator.
    ///
    /// Any unread input is discarded first so that the next `read_line`
    /// observes the reply to this command only.
    fn write_line(&mut self, line: &str) -> LaserResult<()>;

    /// Read one response line with the terminator removed.
    fn read_line(&mut self) -> LaserResult<String>;
}
