//! Shutter semantics over the toggle and pause properties.
//!
//! A Cobolt laser has no mechanical shutter. The master switch has to be on
//! before anything can be emitted, and pause gates the beam:
//!
//! ```text
//!            set_on(true)             open()
//!   Off  ───────────────▶ OnPaused ──────────▶ OnEmitting
//!    ▲                       ▲  ◀──────────────    │
//!    │ set_on(false)         │      close()        │
//!    └───────────────────────┴─────────────────────┘
//! ```
//!
//! `close()` pauses even while the switch is off, so a laser switched on
//! later stays dark until it is opened.

use super::Laser;
use crate::error::{LaserError, LaserResult};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Beam state derived from toggle and pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShutterState {
    Off,
    OnPaused,
    OnEmitting,
}

impl std::fmt::Display for ShutterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShutterState::Off => "Off",
            ShutterState::OnPaused => "On-Paused",
            ShutterState::OnEmitting => "On-Emitting",
        })
    }
}

/// Cross-thread handle that ends a running [`Shutter::fire_cancellable`]
/// wait early. The closing command is still sent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, condvar) = &*self.inner;
        *flag.lock() = true;
        condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Block for `duration` or until cancelled. Returns true if cancelled.
    pub fn wait(&self, duration: Duration) -> bool {
        let (flag, condvar) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut cancelled = flag.lock();
        while !*cancelled {
            if condvar.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

/// Round a pulse length to whole milliseconds, halves rounding up.
/// Negative and NaN lengths become zero.
pub fn pulse_millis(duration_ms: f64) -> u64 {
    let rounded = (duration_ms + 0.5).floor();
    if rounded.is_nan() || rounded <= 0.0 {
        0
    } else {
        rounded as u64
    }
}

/// Open/close/pulse control of a light source.
pub trait Shutter {
    /// Start emitting. Fails with [`LaserError::LaserOff`] when the master
    /// switch is off, leaving pause untouched.
    fn open(&mut self) -> LaserResult<()>;

    /// Stop emitting, regardless of the master switch.
    fn close(&mut self) -> LaserResult<()>;

    /// True when the beam is on and not paused.
    fn is_open(&mut self) -> LaserResult<bool>;

    fn state(&mut self) -> LaserResult<ShutterState>;

    /// Open, wait `duration_ms` (rounded, halves up), then close.
    ///
    /// If opening fails nothing else is sent. Otherwise the close always
    /// runs, and the first failure is returned.
    fn fire(&mut self, duration_ms: f64) -> LaserResult<()> {
        self.fire_cancellable(duration_ms, &CancelToken::new())
    }

    /// [`fire`](Shutter::fire) with a wait that `cancel` can end early.
    fn fire_cancellable(&mut self, duration_ms: f64, cancel: &CancelToken) -> LaserResult<()> {
        self.open()?;

        let millis = pulse_millis(duration_ms);
        if cancel.wait(Duration::from_millis(millis)) {
            debug!("Pulse of {} ms cancelled", millis);
        }

        self.close()
    }
}

impl Shutter for Laser {
    fn open(&mut self) -> LaserResult<()> {
        if !self.is_on()? {
            return Err(LaserError::LaserOff);
        }
        self.set_paused(false)
    }

    fn close(&mut self) -> LaserResult<()> {
        self.set_paused(true)
    }

    fn is_open(&mut self) -> LaserResult<bool> {
        Ok(self.state()? == ShutterState::OnEmitting)
    }

    fn state(&mut self) -> LaserResult<ShutterState> {
        if !self.is_on()? {
            return Ok(ShutterState::Off);
        }
        Ok(if self.is_paused()? {
            ShutterState::OnPaused
        } else {
            ShutterState::OnEmitting
        })
    }
}
