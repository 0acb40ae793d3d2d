//! Typed laser properties.
//!
//! Every attribute of the instrument is one [`Property`]: a named value with a
//! declared [`Stereotype`] and a mutability flag. Values travel over the wire
//! as strings; each variant owns the commands and the validation state it
//! needs to turn them into typed values and back.
//!
//! ```text
//! Property
//!   ├─ Static          constant, never queried
//!   ├─ Basic           query + parse
//!   ├─ BasicMutable    query + parse, set without range check
//!   ├─ Numeric         query + parse, set within [min, max]
//!   ├─ Bool            "1"/"0" <-> On/Off or Enable/Disable
//!   ├─ Enumeration     device code <-> label table
//!   ├─ Pause           native pause commands
//!   └─ SimulatedPause  pause kept in memory
//! ```
//!
//! Properties never hold the transport. The owning [`Laser`](super::Laser)
//! lends it to `get`/`set`, so the registry can own every property outright.
//! Validation happens before any write: a rejected `set` never reaches the
//! instrument.

use crate::error::{LaserError, LaserResult};
use crate::transport::Transport;
use serde::Serialize;
use std::fmt;

/// Declared scalar type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stereotype {
    Float,
    Integer,
    String,
}

/// A property value parsed into its stereotype.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Float(f64),
    Integer(i64),
    String(String),
}

impl TypedValue {
    /// Parse `raw` as `stereotype`; `None` if it does not fit.
    pub fn parse(stereotype: Stereotype, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        match stereotype {
            Stereotype::Float => trimmed.parse().ok().map(TypedValue::Float),
            Stereotype::Integer => trimmed.parse().ok().map(TypedValue::Integer),
            Stereotype::String => Some(TypedValue::String(trimmed.to_string())),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Float(value) => Some(*value),
            TypedValue::Integer(value) => Some(*value as f64),
            TypedValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Float(value) => write!(f, "{}", value),
            TypedValue::Integer(value) => write!(f, "{}", value),
            TypedValue::String(value) => f.write_str(value),
        }
    }
}

/// Device-side tokens shared by every two-state property.
const DEVICE_ON: &str = "1";
const DEVICE_OFF: &str = "0";

/// Presentation tokens of a two-state property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolLabels {
    /// `On` / `Off`
    OnOff,
    /// `Enable` / `Disable`
    EnableDisable,
}

impl BoolLabels {
    pub fn on(self) -> &'static str {
        match self {
            BoolLabels::OnOff => "On",
            BoolLabels::EnableDisable => "Enable",
        }
    }

    pub fn off(self) -> &'static str {
        match self {
            BoolLabels::OnOff => "Off",
            BoolLabels::EnableDisable => "Disable",
        }
    }

    pub fn label(self, value: bool) -> &'static str {
        if value {
            self.on()
        } else {
            self.off()
        }
    }

    /// Presentation token → boolean.
    pub fn parse(self, label: &str) -> Option<bool> {
        let label = label.trim();
        if label == self.on() {
            Some(true)
        } else if label == self.off() {
            Some(false)
        } else {
            None
        }
    }
}

fn parse_device_bool(command: &str, response: &str) -> LaserResult<bool> {
    match response.trim() {
        DEVICE_ON => Ok(true),
        DEVICE_OFF => Ok(false),
        _ => Err(LaserError::invalid_response(command, response)),
    }
}

fn query_typed(
    transport: &mut Transport,
    command: &str,
    stereotype: Stereotype,
) -> LaserResult<TypedValue> {
    let response = transport.query(command)?;
    TypedValue::parse(stereotype, &response)
        .ok_or_else(|| LaserError::invalid_response(command, response))
}

// =============================================================================
// Variants
// =============================================================================

/// Constant string fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticProperty {
    name: String,
    value: String,
}

impl StaticProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Read-only value fetched with one query.
#[derive(Debug, Clone)]
pub struct BasicProperty {
    name: String,
    stereotype: Stereotype,
    query: String,
}

impl BasicProperty {
    pub fn new(name: impl Into<String>, stereotype: Stereotype, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stereotype,
            query: query.into(),
        }
    }

    pub fn get(&self, transport: &mut Transport) -> LaserResult<TypedValue> {
        query_typed(transport, &self.query, self.stereotype)
    }
}

/// Writable value without client-side range checks.
#[derive(Debug, Clone)]
pub struct BasicMutableProperty {
    name: String,
    stereotype: Stereotype,
    query: String,
    set_command: String,
}

impl BasicMutableProperty {
    pub fn new(
        name: impl Into<String>,
        stereotype: Stereotype,
        query: impl Into<String>,
        set_command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            stereotype,
            query: query.into(),
            set_command: set_command.into(),
        }
    }

    pub fn get(&self, transport: &mut Transport) -> LaserResult<TypedValue> {
        query_typed(transport, &self.query, self.stereotype)
    }

    pub fn set(&self, transport: &mut Transport, raw: &str) -> LaserResult<()> {
        let value = TypedValue::parse(self.stereotype, raw).ok_or_else(|| {
            LaserError::invalid_value(&self.name, raw, format!("not a {:?}", self.stereotype))
        })?;
        transport.execute(&format!("{} {}", self.set_command, value))
    }
}

/// Floating point setpoint bounded to a closed range.
#[derive(Debug, Clone)]
pub struct NumericProperty {
    name: String,
    query: String,
    set_command: String,
    min: f64,
    max: f64,
}

impl NumericProperty {
    pub fn new(
        name: impl Into<String>,
        query: impl Into<String>,
        set_command: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            set_command: set_command.into(),
            min,
            max,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn get(&self, transport: &mut Transport) -> LaserResult<TypedValue> {
        query_typed(transport, &self.query, Stereotype::Float)
    }

    /// Check `raw` against the range without touching the instrument.
    pub fn validate(&self, raw: &str) -> LaserResult<f64> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| LaserError::invalid_value(&self.name, raw, "not a number"))?;

        if !(self.min..=self.max).contains(&value) {
            return Err(LaserError::invalid_value(
                &self.name,
                raw,
                format!("outside [{}, {}]", self.min, self.max),
            ));
        }
        Ok(value)
    }

    pub fn set(&self, transport: &mut Transport, raw: &str) -> LaserResult<()> {
        let value = self.validate(raw)?;
        transport.execute(&format!("{} {}", self.set_command, value))
    }
}

/// Two-state switch with fixed on/off commands.
#[derive(Debug, Clone)]
pub struct BoolProperty {
    name: String,
    labels: BoolLabels,
    query: String,
    on_command: String,
    off_command: String,
}

impl BoolProperty {
    pub fn new(
        name: impl Into<String>,
        labels: BoolLabels,
        query: impl Into<String>,
        on_command: impl Into<String>,
        off_command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            labels,
            query: query.into(),
            on_command: on_command.into(),
            off_command: off_command.into(),
        }
    }

    pub fn labels(&self) -> BoolLabels {
        self.labels
    }

    pub fn get_bool(&self, transport: &mut Transport) -> LaserResult<bool> {
        let response = transport.query(&self.query)?;
        parse_device_bool(&self.query, &response)
    }

    pub fn set_bool(&self, transport: &mut Transport, value: bool) -> LaserResult<()> {
        let command = if value {
            &self.on_command
        } else {
            &self.off_command
        };
        transport.execute(command)
    }

    pub fn get(&self, transport: &mut Transport) -> LaserResult<TypedValue> {
        let value = self.get_bool(transport)?;
        Ok(TypedValue::String(self.labels.label(value).to_string()))
    }

    pub fn set(&self, transport: &mut Transport, raw: &str) -> LaserResult<()> {
        let value = self.labels.parse(raw).ok_or_else(|| {
            LaserError::invalid_value(
                &self.name,
                raw,
                format!("expected '{}' or '{}'", self.labels.on(), self.labels.off()),
            )
        })?;
        self.set_bool(transport, value)
    }
}

/// Device code ↔ label table with an ordered, invertible mapping.
#[derive(Debug, Clone)]
pub struct EnumerationProperty {
    name: String,
    query: String,
    set_command: String,
    values: Vec<(String, String)>,
}

impl EnumerationProperty {
    pub fn new(
        name: impl Into<String>,
        query: impl Into<String>,
        set_command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            set_command: set_command.into(),
            values: Vec::new(),
        }
    }

    /// Register `code` ↔ `label`.
    ///
    /// Codes and labels must both stay unique so the table can be read in
    /// either direction.
    pub fn register_valid_value(
        &mut self,
        code: impl Into<String>,
        label: impl Into<String>,
    ) -> LaserResult<()> {
        let code = code.into();
        let label = label.into();

        if let Some((existing_code, existing_label)) = self
            .values
            .iter()
            .find(|(c, l)| *c == code || *l == label)
        {
            return Err(LaserError::Generic(format!(
                "Property '{}': '{}' -> '{}' clashes with '{}' -> '{}'",
                self.name, code, label, existing_code, existing_label
            )));
        }

        self.values.push((code, label));
        Ok(())
    }

    /// Labels in registration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(_, label)| label.as_str())
    }

    pub fn label_for(&self, code: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, label)| label.as_str())
    }

    pub fn code_for(&self, label: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, l)| l == label)
            .map(|(code, _)| code.as_str())
    }

    pub fn get(&self, transport: &mut Transport) -> LaserResult<TypedValue> {
        let response = transport.query(&self.query)?;
        self.label_for(response.trim())
            .map(|label| TypedValue::String(label.to_string()))
            .ok_or_else(|| LaserError::invalid_response(&self.query, response.as_str()))
    }

    pub fn set(&self, transport: &mut Transport, raw: &str) -> LaserResult<()> {
        let code = self.code_for(raw.trim()).ok_or_else(|| {
            LaserError::invalid_value(&self.name, raw, "not a registered value")
        })?;
        transport.execute(&format!("{} {}", self.set_command, code))
    }
}

/// Pause using the instrument's own pause commands.
#[derive(Debug, Clone)]
pub struct PauseProperty {
    name: String,
}

impl PauseProperty {
    pub const QUERY: &'static str = "l?r";
    pub const PAUSE_COMMAND: &'static str = "l1r";
    pub const RESUME_COMMAND: &'static str = "l0r";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_paused(&self, transport: &mut Transport) -> LaserResult<bool> {
        let response = transport.query(Self::QUERY)?;
        parse_device_bool(Self::QUERY, &response)
    }

    pub fn set_paused(&self, transport: &mut Transport, paused: bool) -> LaserResult<()> {
        transport.execute(if paused {
            Self::PAUSE_COMMAND
        } else {
            Self::RESUME_COMMAND
        })
    }
}

/// Pause emulated on the host for lasers without pause commands.
#[derive(Debug, Clone)]
pub struct SimulatedPauseProperty {
    name: String,
    paused: bool,
}

impl SimulatedPauseProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

// =============================================================================
// Property
// =============================================================================

/// One named laser attribute.
#[derive(Debug, Clone)]
pub enum Property {
    Static(StaticProperty),
    Basic(BasicProperty),
    BasicMutable(BasicMutableProperty),
    Numeric(NumericProperty),
    Bool(BoolProperty),
    Enumeration(EnumerationProperty),
    Pause(PauseProperty),
    SimulatedPause(SimulatedPauseProperty),
}

/// Pause values are presented with the On/Off pair, On meaning paused.
const PAUSE_LABELS: BoolLabels = BoolLabels::OnOff;

impl Property {
    pub fn name(&self) -> &str {
        match self {
            Property::Static(p) => &p.name,
            Property::Basic(p) => &p.name,
            Property::BasicMutable(p) => &p.name,
            Property::Numeric(p) => &p.name,
            Property::Bool(p) => &p.name,
            Property::Enumeration(p) => &p.name,
            Property::Pause(p) => &p.name,
            Property::SimulatedPause(p) => &p.name,
        }
    }

    pub fn stereotype(&self) -> Stereotype {
        match self {
            Property::Basic(p) => p.stereotype,
            Property::BasicMutable(p) => p.stereotype,
            Property::Numeric(_) => Stereotype::Float,
            Property::Static(_)
            | Property::Bool(_)
            | Property::Enumeration(_)
            | Property::Pause(_)
            | Property::SimulatedPause(_) => Stereotype::String,
        }
    }

    pub fn is_mutable(&self) -> bool {
        !matches!(self, Property::Static(_) | Property::Basic(_))
    }

    /// True for the two-state variants (switches and pause).
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            Property::Bool(_) | Property::Pause(_) | Property::SimulatedPause(_)
        )
    }

    /// Presentation values a host may offer for selection; empty if free-form.
    pub fn allowed_values(&self) -> Vec<String> {
        match self {
            Property::Bool(p) => vec![p.labels.on().to_string(), p.labels.off().to_string()],
            Property::Enumeration(p) => p.labels().map(str::to_string).collect(),
            Property::Pause(_) | Property::SimulatedPause(_) => {
                vec![PAUSE_LABELS.on().to_string(), PAUSE_LABELS.off().to_string()]
            }
            _ => Vec::new(),
        }
    }

    /// Inclusive `(min, max)` for bounded numeric properties.
    pub fn limits(&self) -> Option<(f64, f64)> {
        match self {
            Property::Numeric(p) => Some((p.min, p.max)),
            _ => None,
        }
    }

    /// Current value; every call except for static and simulated
    /// properties re-queries the instrument.
    pub fn get(&self, transport: &mut Transport) -> LaserResult<TypedValue> {
        match self {
            Property::Static(p) => Ok(TypedValue::String(p.value.clone())),
            Property::Basic(p) => p.get(transport),
            Property::BasicMutable(p) => p.get(transport),
            Property::Numeric(p) => p.get(transport),
            Property::Bool(p) => p.get(transport),
            Property::Enumeration(p) => p.get(transport),
            Property::Pause(p) => {
                let paused = p.is_paused(transport)?;
                Ok(TypedValue::String(PAUSE_LABELS.label(paused).to_string()))
            }
            Property::SimulatedPause(p) => Ok(TypedValue::String(
                PAUSE_LABELS.label(p.paused).to_string(),
            )),
        }
    }

    /// Write a presentation value.
    pub fn set(&mut self, transport: &mut Transport, raw: &str) -> LaserResult<()> {
        match self {
            Property::Static(p) => Err(LaserError::ReadOnlyProperty(p.name.clone())),
            Property::Basic(p) => Err(LaserError::ReadOnlyProperty(p.name.clone())),
            Property::BasicMutable(p) => p.set(transport, raw),
            Property::Numeric(p) => p.set(transport, raw),
            Property::Bool(p) => p.set(transport, raw),
            Property::Enumeration(p) => p.set(transport, raw),
            Property::Pause(p) => {
                let paused = parse_pause_label(&p.name, raw)?;
                p.set_paused(transport, paused)
            }
            Property::SimulatedPause(p) => {
                let paused = parse_pause_label(&p.name, raw)?;
                p.set_paused(paused);
                Ok(())
            }
        }
    }
}

fn parse_pause_label(name: &str, raw: &str) -> LaserResult<bool> {
    PAUSE_LABELS.parse(raw).ok_or_else(|| {
        LaserError::invalid_value(
            name,
            raw,
            format!("expected '{}' or '{}'", PAUSE_LABELS.on(), PAUSE_LABELS.off()),
        )
    })
}
