//! Simulated Cobolt laser behind the `HardwareAdapter` interface.
//!
//! `MockAdapter` keeps the instrument state as a table of query command →
//! current reply and understands the set commands of the Cobolt protocol, so
//! that a value written with `slc 1.5` reads back from `glc?`. Commands it
//! does not know are answered with the instrument's syntax error line.
//!
//! Used by the test suite and by `cobolt --mock`.

use crate::adapters::HardwareAdapter;
use crate::error::{LaserError, LaserResult};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Reply the instrument gives to a command it does not understand.
pub const SYNTAX_ERROR: &str = "Syntax error: illegal command";

/// Shared record of every command written to a [`MockAdapter`].
///
/// Cloning yields another handle to the same log, so a test can keep one
/// after the adapter has been moved into a laser.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Arc<Mutex<Vec<String>>>);

impl CommandLog {
    /// Snapshot of all commands sent so far.
    pub fn commands(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Number of commands sent so far.
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// True when nothing has been sent.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.0.lock().clear();
    }

    fn push(&self, command: &str) {
        self.0.lock().push(command.to_string());
    }
}

/// Scripted in-memory laser.
#[derive(Debug)]
pub struct MockAdapter {
    state: HashMap<String, String>,
    overrides: HashMap<String, String>,
    pending: VecDeque<String>,
    pause_supported: bool,
    fail_writes: bool,
    log: CommandLog,
}

/// Set commands that take an argument, and the query they update.
const VALUE_COMMANDS: &[(&str, &str)] = &[
    ("slc", "glc?"),
    ("slp", "glp?"),
    ("sam", "gam?"),
    ("slmp", "glmp?"),
    ("salis", "galis?"),
];

/// Fixed set commands, and the query/value they leave behind.
const SWITCH_COMMANDS: &[(&str, &str, &str)] = &[
    ("l1", "l?", "1"),
    ("l0", "l?", "0"),
    ("sdmes 1", "gdmes?", "1"),
    ("sdmes 0", "gdmes?", "0"),
    ("sames 1", "games?", "1"),
    ("sames 0", "games?", "0"),
];

const PAUSE_COMMANDS: &[(&str, &str, &str)] = &[("l1r", "l?r", "1"), ("l0r", "l?r", "0")];

impl MockAdapter {
    /// Simulated laser reporting `model` to `glm?`, powered off, not paused.
    pub fn new(model: impl Into<String>) -> Self {
        let defaults = [
            ("glm?", model.into()),
            ("gsn?", "20950".to_string()),
            ("gfv?", "9.001".to_string()),
            ("hrs?", "1234.56".to_string()),
            ("glc?", "0.5".to_string()),
            ("glp?", "0.01".to_string()),
            ("l?", "0".to_string()),
            ("l?r", "0".to_string()),
            ("gam?", "1".to_string()),
            ("gdmes?", "0".to_string()),
            ("games?", "0".to_string()),
            ("glmp?", "0.0".to_string()),
            ("galis?", "0".to_string()),
        ];

        Self {
            state: defaults
                .into_iter()
                .map(|(query, value)| (query.to_string(), value))
                .collect(),
            overrides: HashMap::new(),
            pending: VecDeque::new(),
            pause_supported: true,
            fail_writes: false,
            log: CommandLog::default(),
        }
    }

    /// Simulate firmware without the `l0r`/`l1r` pause commands.
    pub fn without_pause_support(mut self) -> Self {
        self.pause_supported = false;
        self
    }

    /// Start with the laser switched on.
    pub fn switched_on(mut self) -> Self {
        self.state.insert("l?".to_string(), "1".to_string());
        self
    }

    /// Seed the reply to a query command.
    pub fn with_value(mut self, query: &str, value: impl Into<String>) -> Self {
        self.state.insert(query.to_string(), value.into());
        self
    }

    /// Always answer `command` with `response`, bypassing the simulation.
    pub fn with_response(mut self, command: &str, response: impl Into<String>) -> Self {
        self.overrides.insert(command.to_string(), response.into());
        self
    }

    /// Make every write fail as if the cable had been pulled.
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Handle to the log of commands written to this adapter.
    pub fn command_log(&self) -> CommandLog {
        self.log.clone()
    }

    fn respond(&mut self, command: &str) -> String {
        if let Some(response) = self.overrides.get(command) {
            return response.clone();
        }

        if let Some(value) = self.state.get(command) {
            if command == "l?r" && !self.pause_supported {
                return SYNTAX_ERROR.to_string();
            }
            return value.clone();
        }

        match command {
            "i?" => return self.emitting_reading("glc?"),
            "pa?" => return self.emitting_reading("glp?"),
            _ => {}
        }

        let pause: &[(&str, &str, &str)] = if self.pause_supported {
            PAUSE_COMMANDS
        } else {
            &[]
        };
        for (set, query, value) in SWITCH_COMMANDS.iter().chain(pause) {
            if command == *set {
                self.state.insert((*query).to_string(), (*value).to_string());
                return "OK".to_string();
            }
        }

        if let Some((prefix, argument)) = command.split_once(' ') {
            if let Some((_, query)) = VALUE_COMMANDS.iter().find(|(set, _)| *set == prefix) {
                self.state
                    .insert((*query).to_string(), argument.trim().to_string());
                return "OK".to_string();
            }
        }

        SYNTAX_ERROR.to_string()
    }

    /// Readings follow the setpoint while the laser emits, zero otherwise.
    fn emitting_reading(&self, setpoint_query: &str) -> String {
        let on = self.state.get("l?").map(String::as_str) == Some("1");
        let paused = self.state.get("l?r").map(String::as_str) == Some("1");
        if on && !paused {
            self.state
                .get(setpoint_query)
                .cloned()
                .unwrap_or_else(|| "0.0".to_string())
        } else {
            "0.0".to_string()
        }
    }
}

impl HardwareAdapter for MockAdapter {
    fn name(&self) -> &str {
        "mock"
    }

    fn write_line(&mut self, line: &str) -> LaserResult<()> {
        if self.fail_writes {
            return Err(LaserError::Transport(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock adapter write failure",
            )));
        }

        self.log.push(line);
        self.pending.clear();
        let response = self.respond(line);
        self.pending.push_back(response);
        Ok(())
    }

    fn read_line(&mut self) -> LaserResult<String> {
        self.pending.pop_front().ok_or_else(|| {
            LaserError::Transport(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "mock adapter has no pending response",
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(adapter: &mut MockAdapter, command: &str) -> String {
        adapter.write_line(command).unwrap();
        adapter.read_line().unwrap()
    }

    #[test]
    fn set_commands_update_queries() {
        let mut adapter = MockAdapter::new("500-06-01-0100-100");
        assert_eq!(round_trip(&mut adapter, "slc 1.5"), "OK");
        assert_eq!(round_trip(&mut adapter, "glc?"), "1.5");
        assert_eq!(round_trip(&mut adapter, "l1"), "OK");
        assert_eq!(round_trip(&mut adapter, "l?"), "1");
    }

    #[test]
    fn readings_follow_emission() {
        let mut adapter = MockAdapter::new("500-06-01-0100-100").with_value("glp?", "25.0");
        assert_eq!(round_trip(&mut adapter, "pa?"), "0.0");
        round_trip(&mut adapter, "l1");
        assert_eq!(round_trip(&mut adapter, "pa?"), "25.0");
        round_trip(&mut adapter, "l1r");
        assert_eq!(round_trip(&mut adapter, "pa?"), "0.0");
    }

    #[test]
    fn pause_commands_rejected_without_support() {
        let mut adapter = MockAdapter::new("473-05-01-0050-100").without_pause_support();
        assert_eq!(round_trip(&mut adapter, "l0r"), SYNTAX_ERROR);
        assert_eq!(round_trip(&mut adapter, "l?r"), SYNTAX_ERROR);
    }

    #[test]
    fn write_discards_unread_reply() {
        let mut adapter = MockAdapter::new("500-06-01-0100-100");
        adapter.write_line("l1").unwrap();
        adapter.write_line("gsn?").unwrap();
        assert_eq!(adapter.read_line().unwrap(), "20950");
        assert!(adapter.read_line().is_err());
    }

    #[test]
    fn command_log_survives_move() {
        let adapter = MockAdapter::new("x");
        let log = adapter.command_log();
        let mut boxed: Box<dyn HardwareAdapter> = Box::new(adapter);
        boxed.write_line("glm?").unwrap();
        assert_eq!(log.commands(), vec!["glm?".to_string()]);
    }
}
