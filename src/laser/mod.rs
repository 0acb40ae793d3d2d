//! Laser device model.
//!
//! A [`Laser`] owns the transport, the classification metadata found by the
//! [`LaserBuilder`] and the ordered registry of every [`Property`] exposed to
//! hosts. The registry is filled during the build and frozen afterwards;
//! callers reach properties by name through [`Laser::get`] / [`Laser::set`]
//! or enumerate them with [`Laser::describe`].
//!
//! # Example
//!
//! ```rust
//! use cobolt_laser::adapters::MockAdapter;
//! use cobolt_laser::laser::{LaserBuilder, Shutter};
//!
//! let adapter = MockAdapter::new("500-06-01-0100-100").switched_on();
//! let mut laser = LaserBuilder::default().build(Box::new(adapter))?;
//!
//! assert_eq!(laser.name(), "06-DPL");
//! laser.set("Run Mode", "Constant Power")?;
//! laser.open()?;
//! assert!(laser.is_open()?);
//! # Ok::<(), cobolt_laser::LaserError>(())
//! ```

pub mod builder;
pub mod family;
pub mod property;
pub mod shutter;

pub use builder::LaserBuilder;
pub use family::{decompose_model_string, Family, FamilyProfile};
pub use property::{
    BasicMutableProperty, BasicProperty, BoolLabels, BoolProperty, EnumerationProperty,
    NumericProperty, PauseProperty, Property, SimulatedPauseProperty, StaticProperty, Stereotype,
    TypedValue,
};
pub use shutter::{CancelToken, Shutter, ShutterState};

use crate::error::{LaserError, LaserResult};
use crate::transport::Transport;
use indexmap::IndexMap;
use serde::Serialize;

/// Name of the master on/off switch property.
pub const TOGGLE_PROPERTY: &str = "On-Off Switch";
/// Name of the pause property.
pub const PAUSE_PROPERTY: &str = "Paused";

/// Host-facing view of one property at the time of the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySnapshot {
    pub name: String,
    pub stereotype: Stereotype,
    pub mutable: bool,
    /// Current value, `None` if reading it failed.
    pub value: Option<TypedValue>,
    /// Why reading failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<(f64, f64)>,
}

/// Classified laser with its property registry.
#[derive(Debug)]
pub struct Laser {
    family: Family,
    name: String,
    wavelength: String,
    current_unit: String,
    power_unit: String,
    max_current_setpoint: f64,
    max_power_setpoint: f64,
    properties: IndexMap<String, Property>,
    transport: Transport,
}

impl Laser {
    /// Unclassified laser with defaults; the builder fills in the rest.
    pub(crate) fn new(name: impl Into<String>, transport: Transport) -> Self {
        Self {
            family: Family::Unknown,
            name: name.into(),
            wavelength: "Unknown".to_string(),
            current_unit: family::UNKNOWN_UNIT.to_string(),
            power_unit: family::UNKNOWN_UNIT.to_string(),
            max_current_setpoint: 0.0,
            max_power_setpoint: 0.0,
            properties: IndexMap::new(),
            transport,
        }
    }

    pub(crate) fn apply_profile(&mut self, family: Family, profile: &FamilyProfile) {
        self.family = family;
        self.name = profile.name.to_string();
        self.current_unit = profile.current_unit.to_string();
        self.power_unit = profile.power_unit.to_string();
        self.max_current_setpoint = profile.max_current_setpoint;
        self.max_power_setpoint = profile.max_power_setpoint;
    }

    pub(crate) fn set_wavelength(&mut self, wavelength: impl Into<String>) {
        self.wavelength = wavelength.into();
    }

    /// Add `property` under its own name. A second registration under the
    /// same name replaces the first and keeps its position.
    pub(crate) fn register(&mut self, property: Property) {
        self.properties.insert(property.name().to_string(), property);
    }

    pub(crate) fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    /// Family display name ("06-DPL", "Compact 05" or "Unknown").
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn wavelength(&self) -> &str {
        &self.wavelength
    }

    pub fn current_unit(&self) -> &str {
        &self.current_unit
    }

    pub fn power_unit(&self) -> &str {
        &self.power_unit
    }

    pub fn max_current_setpoint(&self) -> f64 {
        self.max_current_setpoint
    }

    pub fn max_power_setpoint(&self) -> f64 {
        self.max_power_setpoint
    }

    /// Registered properties in registration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Read a property; every call goes to the instrument unless the
    /// property is static or simulated.
    pub fn get(&mut self, name: &str) -> LaserResult<TypedValue> {
        let property = self
            .properties
            .get(name)
            .ok_or_else(|| LaserError::UnknownProperty(name.to_string()))?;
        property.get(&mut self.transport)
    }

    /// Write a property from its presentation string.
    pub fn set(&mut self, name: &str, value: &str) -> LaserResult<()> {
        let property = self
            .properties
            .get_mut(name)
            .ok_or_else(|| LaserError::UnknownProperty(name.to_string()))?;
        property.set(&mut self.transport, value)
    }

    /// Read every property once.
    ///
    /// A failing read is reported in the snapshot and does not stop the
    /// enumeration.
    pub fn describe(&mut self) -> Vec<PropertySnapshot> {
        let transport = &mut self.transport;
        self.properties
            .values()
            .map(|property| {
                let (value, error) = match property.get(transport) {
                    Ok(value) => (Some(value), None),
                    Err(err) => (None, Some(err.to_string())),
                };
                PropertySnapshot {
                    name: property.name().to_string(),
                    stereotype: property.stereotype(),
                    mutable: property.is_mutable(),
                    value,
                    error,
                    allowed_values: property.allowed_values(),
                    limits: property.limits(),
                }
            })
            .collect()
    }

    /// Whether the master switch is on.
    pub fn is_on(&mut self) -> LaserResult<bool> {
        match self.properties.get(TOGGLE_PROPERTY) {
            Some(Property::Bool(toggle)) => toggle.get_bool(&mut self.transport),
            _ => Err(missing_behavior_property(TOGGLE_PROPERTY)),
        }
    }

    pub fn set_on(&mut self, on: bool) -> LaserResult<()> {
        match self.properties.get(TOGGLE_PROPERTY) {
            Some(Property::Bool(toggle)) => toggle.set_bool(&mut self.transport, on),
            _ => Err(missing_behavior_property(TOGGLE_PROPERTY)),
        }
    }

    pub fn is_paused(&mut self) -> LaserResult<bool> {
        match self.properties.get(PAUSE_PROPERTY) {
            Some(Property::Pause(pause)) => pause.is_paused(&mut self.transport),
            Some(Property::SimulatedPause(pause)) => Ok(pause.is_paused()),
            _ => Err(missing_behavior_property(PAUSE_PROPERTY)),
        }
    }

    pub fn set_paused(&mut self, paused: bool) -> LaserResult<()> {
        match self.properties.get_mut(PAUSE_PROPERTY) {
            Some(Property::Pause(pause)) => pause.set_paused(&mut self.transport, paused),
            Some(Property::SimulatedPause(pause)) => {
                pause.set_paused(paused);
                Ok(())
            }
            _ => Err(missing_behavior_property(PAUSE_PROPERTY)),
        }
    }

    /// True when pause is emulated on the host.
    pub fn pause_is_simulated(&self) -> bool {
        matches!(
            self.properties.get(PAUSE_PROPERTY),
            Some(Property::SimulatedPause(_))
        )
    }
}

fn missing_behavior_property(name: &str) -> LaserError {
    LaserError::Generic(format!("Laser has no usable '{}' property", name))
}
