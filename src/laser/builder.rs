//! Model detection and property assembly.
//!
//! The builder asks the laser for its identifier (`glm?`), derives the
//! wavelength and family from it, probes for native pause support and
//! registers the property set of that family. Only the identification query
//! can fail the build; every later step degrades instead.

use super::family::{decompose_model_string, Family, FamilyProfile, ANALOG_IMPEDANCES};
use super::property::{
    BasicMutableProperty, BasicProperty, BoolLabels, BoolProperty, EnumerationProperty,
    NumericProperty, PauseProperty, Property, SimulatedPauseProperty, StaticProperty, Stereotype,
};
use super::{Laser, PAUSE_PROPERTY, TOGGLE_PROPERTY};
use crate::adapters::HardwareAdapter;
use crate::error::{LaserError, LaserResult};
use crate::logging::{default_sink, LogSink};
use crate::transport::Transport;
use std::sync::Arc;
use tracing::Level;

/// Identification query.
pub const MODEL_QUERY: &str = "glm?";
/// Harmless command whose acknowledgement reveals pause support.
pub const PAUSE_PROBE: &str = "l0r";

/// Builds a [`Laser`] from a connected adapter.
#[derive(Clone)]
pub struct LaserBuilder {
    log: Arc<dyn LogSink>,
}

impl Default for LaserBuilder {
    fn default() -> Self {
        Self::new(default_sink())
    }
}

impl LaserBuilder {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }

    /// Detect the model behind `adapter` and assemble its property set.
    ///
    /// # Errors
    /// [`LaserError::ModelDetectionFailed`] if the identification query
    /// fails for any reason; the adapter is dropped with it.
    pub fn build(&self, adapter: Box<dyn HardwareAdapter>) -> LaserResult<Laser> {
        let mut transport = Transport::new(adapter, self.log.clone());

        let identifier = transport
            .query(MODEL_QUERY)
            .map_err(|err| LaserError::ModelDetectionFailed(Box::new(err)))?;

        let tokens = decompose_model_string(&identifier);
        let family = Family::classify(&identifier);
        let profile = family.profile();

        let mut laser = Laser::new(profile.name, transport);
        laser.apply_profile(family, &profile);
        if let Some(wavelength) = tokens.first().filter(|token| !token.is_empty()) {
            laser.set_wavelength(wavelength.as_str());
        }

        self.register_base_properties(&mut laser);
        if family.is_classified() {
            self.register_family_properties(&mut laser, &profile)?;
        }

        self.log.log(
            Level::INFO,
            &format!(
                "Created laser '{}' ({} nm, identifier '{}')",
                laser.name(),
                laser.wavelength(),
                identifier.trim()
            ),
        );

        Ok(laser)
    }

    fn register_base_properties(&self, laser: &mut Laser) {
        let name = laser.name().to_string();
        let wavelength = laser.wavelength().to_string();

        laser.register(Property::Static(StaticProperty::new("Name", name)));
        laser.register(Property::Basic(BasicProperty::new(
            "Model",
            Stereotype::String,
            MODEL_QUERY,
        )));
        laser.register(Property::Static(StaticProperty::new("Wavelength", wavelength)));
        laser.register(Property::Basic(BasicProperty::new(
            "Serial Number",
            Stereotype::String,
            "gsn?",
        )));
        laser.register(Property::Basic(BasicProperty::new(
            "Firmware Version",
            Stereotype::String,
            "gfv?",
        )));
        laser.register(Property::Basic(BasicProperty::new(
            "Operating Hours",
            Stereotype::String,
            "hrs?",
        )));

        let pause = self.create_pause_property(laser);
        laser.register(pause);

        laser.register(Property::Bool(BoolProperty::new(
            TOGGLE_PROPERTY,
            BoolLabels::OnOff,
            "l?",
            "l1",
            "l0",
        )));
    }

    fn register_family_properties(
        &self,
        laser: &mut Laser,
        profile: &FamilyProfile,
    ) -> LaserResult<()> {
        let current_unit = profile.current_unit;
        let power_unit = profile.power_unit;

        laser.register(Property::Numeric(NumericProperty::new(
            format!("Current Setpoint [{}]", current_unit),
            "glc?",
            "slc",
            0.0,
            profile.max_current_setpoint,
        )));
        laser.register(Property::Basic(BasicProperty::new(
            format!("Measured Current [{}]", current_unit),
            Stereotype::Float,
            "i?",
        )));
        laser.register(Property::Numeric(NumericProperty::new(
            format!("Power Setpoint [{}]", power_unit),
            "glp?",
            "slp",
            0.0,
            profile.max_power_setpoint,
        )));
        laser.register(Property::Basic(BasicProperty::new(
            format!("Power Reading [{}]", power_unit),
            Stereotype::Float,
            "pa?",
        )));

        let mut run_mode = EnumerationProperty::new("Run Mode", "gam?", "sam");
        for (code, label) in profile.run_modes {
            run_mode.register_valid_value(*code, *label)?;
        }
        laser.register(Property::Enumeration(run_mode));

        if profile.modulation {
            laser.register(Property::Bool(BoolProperty::new(
                "Digital Modulation",
                BoolLabels::EnableDisable,
                "gdmes?",
                "sdmes 1",
                "sdmes 0",
            )));
            laser.register(Property::Bool(BoolProperty::new(
                "Analog Modulation",
                BoolLabels::EnableDisable,
                "games?",
                "sames 1",
                "sames 0",
            )));
            laser.register(Property::BasicMutable(BasicMutableProperty::new(
                "Modulation Power Setpoint",
                Stereotype::Float,
                "glmp?",
                "slmp",
            )));

            let mut impedance = EnumerationProperty::new("Analog Impedance", "galis?", "salis");
            for (code, label) in ANALOG_IMPEDANCES {
                impedance.register_valid_value(*code, *label)?;
            }
            laser.register(Property::Enumeration(impedance));
        }

        Ok(())
    }

    fn create_pause_property(&self, laser: &mut Laser) -> Property {
        if self.is_pause_command_supported(laser) {
            Property::Pause(PauseProperty::new(PAUSE_PROPERTY))
        } else {
            self.log.log(
                Level::WARN,
                "Pause command not supported, pause will be simulated",
            );
            Property::SimulatedPause(SimulatedPauseProperty::new(PAUSE_PROPERTY))
        }
    }

    fn is_pause_command_supported(&self, laser: &mut Laser) -> bool {
        match laser.transport_mut().send(PAUSE_PROBE, true) {
            Ok(response) => response.is_some_and(|r| r.contains("OK")),
            Err(err) => {
                self.log.log(
                    Level::DEBUG,
                    &format!("Pause probe '{}' failed: {}", PAUSE_PROBE, err),
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for LaserBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaserBuilder").finish_non_exhaustive()
    }
}
