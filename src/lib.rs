//! Driver library for Cobolt lasers.
//!
//! The crate talks to a laser over its line-oriented serial protocol,
//! recognises the model family from the identification string and exposes
//! the instrument as an ordered registry of typed properties plus shutter
//! control (open, close, timed pulse). Everything is synchronous: each call
//! performs its command round trips and returns.
//!
//! - [`adapters`]: line I/O over a serial port, or a simulated laser
//! - [`transport`]: command/response round trips and rejection detection
//! - [`laser`]: properties, model builder, shutter
//! - [`session`]: port selection and one-time initialization
//! - [`config`]: figment-based configuration for the `cobolt` binary

pub mod adapters;
pub mod config;
pub mod error;
pub mod laser;
pub mod logging;
pub mod session;
pub mod transport;

pub use error::{ErrorKind, LaserError, LaserResult};
pub use laser::{Laser, LaserBuilder, Shutter, ShutterState};
pub use session::LaserSession;
