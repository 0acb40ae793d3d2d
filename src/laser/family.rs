//! Laser families and their fixed parameter tables.
//!
//! A family is recognised from the identifier returned by `glm?`, which has
//! the shape `WWWW-FF-XX-PPPP-CCC` (wavelength, family code, ...).

pub const MILLIAMPERES: &str = "mA";
pub const AMPERES: &str = "A";
pub const MILLIWATTS: &str = "mW";
pub const WATTS: &str = "W";

/// Unit shown before a family has been recognised.
pub const UNKNOWN_UNIT: &str = "?";

/// Run modes of the 06-01 series.
pub const DPL06_RUN_MODES: &[(&str, &str)] = &[
    ("0", "Constant Current"),
    ("1", "Constant Power"),
    ("2", "Modulation"),
];

/// Run modes of the Compact 05 series.
pub const COMPACT05_RUN_MODES: &[(&str, &str)] = &[("0", "Constant Current"), ("1", "Constant Power")];

/// Analog modulation input impedance settings.
pub const ANALOG_IMPEDANCES: &[(&str, &str)] = &[("0", "low"), ("1", "high")];

/// Hardware family of a laser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// 06-01 series diode pumped laser.
    Dpl06,
    /// Compact 05 series.
    Compact05,
    /// Identifier not recognised.
    Unknown,
}

/// Everything the model builder needs to know about one family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyProfile {
    pub name: &'static str,
    pub current_unit: &'static str,
    pub power_unit: &'static str,
    pub max_current_setpoint: f64,
    pub max_power_setpoint: f64,
    pub run_modes: &'static [(&'static str, &'static str)],
    /// Digital/analog modulation switches, modulation power and impedance.
    pub modulation: bool,
}

impl Family {
    /// Classification order; the first marker found in the identifier wins.
    const MARKERS: [(&'static str, Family); 2] = [("-06-", Family::Dpl06), ("-05-", Family::Compact05)];

    pub fn classify(identifier: &str) -> Family {
        Self::MARKERS
            .iter()
            .find(|(marker, _)| identifier.contains(*marker))
            .map(|(_, family)| *family)
            .unwrap_or(Family::Unknown)
    }

    pub fn profile(self) -> FamilyProfile {
        match self {
            Family::Dpl06 => FamilyProfile {
                name: "06-DPL",
                current_unit: MILLIAMPERES,
                power_unit: MILLIWATTS,
                max_current_setpoint: 3.0,
                max_power_setpoint: 100.0,
                run_modes: DPL06_RUN_MODES,
                modulation: true,
            },
            Family::Compact05 => FamilyProfile {
                name: "Compact 05",
                current_unit: AMPERES,
                power_unit: MILLIWATTS,
                max_current_setpoint: 3.0,
                max_power_setpoint: 100.0,
                run_modes: COMPACT05_RUN_MODES,
                modulation: false,
            },
            Family::Unknown => FamilyProfile {
                name: "Unknown",
                current_unit: UNKNOWN_UNIT,
                power_unit: UNKNOWN_UNIT,
                max_current_setpoint: 0.0,
                max_power_setpoint: 0.0,
                run_modes: &[],
                modulation: false,
            },
        }
    }

    pub fn is_classified(self) -> bool {
        self != Family::Unknown
    }
}

/// Split an identifier into its `-` separated tokens.
///
/// Scanning stops at the first carriage return; the token collected up to
/// that point is still emitted. A trailing token is emitted when non-empty.
///
/// `"500-06-123-456"` → `["500", "06", "123", "456"]`
pub fn decompose_model_string(identifier: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut token = String::new();

    for ch in identifier.chars() {
        match ch {
            '\r' => {
                tokens.push(token);
                return tokens;
            }
            '-' => tokens.push(std::mem::take(&mut token)),
            _ => token.push(ch),
        }
    }

    if !token.is_empty() {
        tokens.push(token);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_splits_on_dash() {
        assert_eq!(
            decompose_model_string("500-06-123-456"),
            vec!["500", "06", "123", "456"]
        );
    }

    #[test]
    fn decompose_stops_at_carriage_return() {
        assert_eq!(
            decompose_model_string("473-05-01\r-junk"),
            vec!["473", "05", "01"]
        );
        assert_eq!(decompose_model_string("\r"), vec![""]);
    }

    #[test]
    fn decompose_empty_identifier() {
        assert!(decompose_model_string("").is_empty());
        assert_eq!(decompose_model_string("abc"), vec!["abc"]);
        assert_eq!(decompose_model_string("abc-"), vec!["abc"]);
    }

    #[test]
    fn classification_priority() {
        assert_eq!(Family::classify("500-06-01-0100-100"), Family::Dpl06);
        assert_eq!(Family::classify("473-05-01-0050-100"), Family::Compact05);
        assert_eq!(Family::classify("1-06-05-"), Family::Dpl06);
        assert_eq!(Family::classify("0660-04-01"), Family::Unknown);
        assert_eq!(Family::classify(""), Family::Unknown);
    }

    #[test]
    fn profiles() {
        let dpl = Family::Dpl06.profile();
        assert_eq!(dpl.current_unit, MILLIAMPERES);
        assert_eq!(dpl.run_modes.len(), 3);
        let compact = Family::Compact05.profile();
        assert_eq!(compact.current_unit, AMPERES);
        assert_eq!(compact.run_modes.len(), 2);
        let unknown = Family::Unknown.profile();
        assert_eq!(unknown.power_unit, UNKNOWN_UNIT);
        assert_eq!(unknown.max_power_setpoint, 0.0);
    }
}
