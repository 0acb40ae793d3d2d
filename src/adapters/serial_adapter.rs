use crate::adapters::HardwareAdapter;
use crate::config::SerialConfig;
use crate::error::{LaserError, LaserResult};
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "instrument_serial")]
use serialport::SerialPort;

/// Builder for constructing a [`SerialAdapter`] with custom settings
///
/// Defaults match the Cobolt RS-232/USB interface:
/// * timeout: 1 second
/// * line_terminator: "\r"
/// * response_terminator: "\r\n"
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use cobolt_laser::adapters::SerialAdapterBuilder;
///
/// let adapter = SerialAdapterBuilder::new("/dev/ttyUSB0", 115200)
///     .with_timeout(Duration::from_millis(500))
///     .open()?;
/// # Ok::<(), cobolt_laser::LaserError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SerialAdapterBuilder {
    port_name: String,
    baud_rate: u32,
    timeout: Duration,
    line_terminator: String,
    response_terminator: String,
}

impl SerialAdapterBuilder {
    /// Create a new builder with required parameters
    ///
    /// # Arguments
    /// * `port_name` - Serial port path (e.g., "/dev/ttyUSB0", "COM3")
    /// * `baud_rate` - Communication speed (115200 for Cobolt lasers)
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            timeout: Duration::from_secs(1),
            line_terminator: "\r".to_string(),
            response_terminator: "\r\n".to_string(),
        }
    }

    /// Builder preloaded from the `[serial]` configuration section.
    pub fn from_config(port_name: impl Into<String>, config: &SerialConfig) -> Self {
        Self::new(port_name, config.baud_rate)
            .with_timeout(Duration::from_millis(config.timeout_ms))
            .with_line_terminator(config.line_terminator.clone())
            .with_response_terminator(config.response_terminator.clone())
    }

    /// Set the overall read timeout for one response line
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the terminator appended to every command
    pub fn with_line_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.line_terminator = terminator.into();
        self
    }

    /// Set the sequence that ends a response line
    pub fn with_response_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.response_terminator = terminator.into();
        self
    }

    /// Open the port and return the connected adapter.
    #[cfg(feature = "instrument_serial")]
    pub fn open(self) -> LaserResult<SerialAdapter> {
        let port = serialport::new(&self.port_name, self.baud_rate)
            .timeout(Duration::from_millis(100)) // Internal read timeout
            .open()?;

        debug!(
            "Serial port '{}' opened at {} baud",
            self.port_name, self.baud_rate
        );

        Ok(SerialAdapter {
            settings: self,
            port,
        })
    }

    #[cfg(not(feature = "instrument_serial"))]
    pub fn open(self) -> LaserResult<SerialAdapter> {
        Err(LaserError::SerialFeatureDisabled)
    }
}

/// Serial adapter for RS-232 / virtual COM communication
///
/// Wraps a blocking `serialport` handle. Every call completes one write or
/// one line read before returning.
pub struct SerialAdapter {
    settings: SerialAdapterBuilder,

    #[cfg(feature = "instrument_serial")]
    port: Box<dyn SerialPort>,
}

impl SerialAdapter {
    /// Port path this adapter was opened on.
    pub fn port_name(&self) -> &str {
        &self.settings.port_name
    }

    /// Baud rate this adapter was opened with.
    pub fn baud_rate(&self) -> u32 {
        self.settings.baud_rate
    }
}

/// Strips one trailing terminator, falling back to trimming stray CR/LF.
fn strip_terminator(line: &str, terminator: &str) -> String {
    line.strip_suffix(terminator)
        .unwrap_or(line)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

impl HardwareAdapter for SerialAdapter {
    fn name(&self) -> &str {
        "serial"
    }

    #[cfg(feature = "instrument_serial")]
    fn write_line(&mut self, line: &str) -> LaserResult<()> {
        use std::io::Write;

        self.port.clear(serialport::ClearBuffer::Input)?;

        let command_str = format!("{}{}", line, self.settings.line_terminator);
        self.port.write_all(command_str.as_bytes())?;
        self.port.flush()?;

        debug!("Sent serial command: {}", line.trim());
        Ok(())
    }

    #[cfg(not(feature = "instrument_serial"))]
    fn write_line(&mut self, _line: &str) -> LaserResult<()> {
        Err(LaserError::SerialFeatureDisabled)
    }

    #[cfg(feature = "instrument_serial")]
    fn read_line(&mut self) -> LaserResult<String> {
        use std::io::{ErrorKind, Read};

        let terminator = self.settings.response_terminator.as_bytes();
        let timeout = self.settings.timeout;

        // Read response byte-by-byte until the terminator sequence
        let mut response: Vec<u8> = Vec::new();
        let mut buffer = [0u8; 1];
        let start = std::time::Instant::now();

        loop {
            if start.elapsed() > timeout {
                return Err(LaserError::Transport(std::io::Error::new(
                    ErrorKind::TimedOut,
                    format!("Serial read timeout after {:?}", timeout),
                )));
            }

            match self.port.read(&mut buffer) {
                Ok(1) => {
                    response.push(buffer[0]);
                    if !terminator.is_empty() && response.ends_with(terminator) {
                        break;
                    }
                }
                Ok(0) => {
                    // EOF - shouldn't happen with serial ports
                    return Err(LaserError::Transport(std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "Unexpected EOF from serial port",
                    )));
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    // Port timeout is shorter than our overall timeout
                    continue;
                }
                Err(e) => return Err(LaserError::Transport(e)),
                Ok(_) => {
                    return Err(LaserError::Generic(
                        "Read into single-byte buffer returned >1".to_string(),
                    ))
                }
            }
        }

        let response = strip_terminator(
            &String::from_utf8_lossy(&response),
            &self.settings.response_terminator,
        );
        debug!("Received serial response: {}", response);
        Ok(response)
    }

    #[cfg(not(feature = "instrument_serial"))]
    fn read_line(&mut self) -> LaserResult<String> {
        Err(LaserError::SerialFeatureDisabled)
    }
}
