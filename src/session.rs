//! Port selection and one-time initialization around a [`Laser`].
//!
//! A host first picks the serial port, then initializes. Once the laser has
//! been built the port is locked until [`LaserSession::shutdown`].

use crate::adapters::HardwareAdapter;
use crate::error::{LaserError, LaserResult};
use crate::laser::{Laser, LaserBuilder};
use crate::logging::{default_sink, LogSink};
use std::sync::Arc;
use tracing::info;

/// Owns the selected port and, once initialized, the laser behind it.
#[derive(Debug)]
pub struct LaserSession {
    port: Option<String>,
    laser: Option<Laser>,
    builder: LaserBuilder,
}

impl Default for LaserSession {
    fn default() -> Self {
        Self::new(default_sink())
    }
}

impl LaserSession {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self {
            port: None,
            laser: None,
            builder: LaserBuilder::new(log),
        }
    }

    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Select the port to connect to.
    ///
    /// # Errors
    /// [`LaserError::IllegalPortChange`] once initialized; the old port is
    /// kept.
    pub fn set_port(&mut self, port: impl Into<String>) -> LaserResult<()> {
        if self.is_initialized() {
            return Err(LaserError::IllegalPortChange);
        }
        self.port = Some(port.into());
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.laser.is_some()
    }

    /// Open the selected port with `connect` and build the laser.
    ///
    /// Does nothing when already initialized. A failed connect or build
    /// leaves the session uninitialized.
    pub fn initialize<F>(&mut self, connect: F) -> LaserResult<()>
    where
        F: FnOnce(&str) -> LaserResult<Box<dyn HardwareAdapter>>,
    {
        if self.is_initialized() {
            return Ok(());
        }

        let port = self.port.as_deref().ok_or(LaserError::SerialPortUndefined)?;

        info!("Initializing laser on '{}'", port);
        let adapter = connect(port)?;
        let laser = self.builder.build(adapter)?;
        info!("Laser '{}' on '{}' initialized", laser.name(), port);

        self.laser = Some(laser);
        Ok(())
    }

    /// Drop the laser and release its port.
    pub fn shutdown(&mut self) {
        if let Some(laser) = self.laser.take() {
            info!("Shutting down laser '{}'", laser.name());
        }
    }

    pub fn laser(&self) -> Option<&Laser> {
        self.laser.as_ref()
    }

    pub fn laser_mut(&mut self) -> Option<&mut Laser> {
        self.laser.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockAdapter;
    use crate::error::ErrorKind;

    fn mock_connect(_port: &str) -> LaserResult<Box<dyn HardwareAdapter>> {
        Ok(Box::new(MockAdapter::new("500-06-01-0100-100")))
    }

    #[test]
    fn initialize_requires_port() {
        let mut session = LaserSession::default();
        let err = session.initialize(mock_connect).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SerialPortUndefined);
        assert!(!session.is_initialized());
    }

    #[test]
    fn port_locked_after_initialize() {
        let mut session = LaserSession::default();
        session.set_port("/dev/ttyUSB0").unwrap();
        session.initialize(mock_connect).unwrap();

        let err = session.set_port("/dev/ttyUSB1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalPortChange);
        assert_eq!(session.port(), Some("/dev/ttyUSB0"));

        session.shutdown();
        assert!(session.laser().is_none());
        session.set_port("/dev/ttyUSB1").unwrap();
    }
}
