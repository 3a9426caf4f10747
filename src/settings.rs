//! Decoder configuration

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Unit system to present decoded values in
pub enum UnitSystem {
    /// km/h, °C, kPa, km, g/s
    #[default]
    Metric,
    /// mph, F, inHg, miles, lb/s
    Imperial,
}

impl UnitSystem {
    /// Returns true for [UnitSystem::Metric]
    pub fn is_metric(&self) -> bool {
        matches!(self, UnitSystem::Metric)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Decoder settings
pub struct DecoderSettings {
    /// Unit system used when rendering values as strings
    pub unit_system: UnitSystem,
    /// If true, a payload which is too short for its PID formula is reported as
    /// [crate::DecodeError::InsufficientData]. Otherwise the formula
    /// falls back to `0.0`, which cannot be told apart from a real zero reading.
    pub strict: bool,
}

impl DecoderSettings {
    /// Lenient decoding with imperial output
    pub fn imperial() -> Self {
        Self {
            unit_system: UnitSystem::Imperial,
            strict: false,
        }
    }

    /// Returns a copy of these settings with strict decoding enabled
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_lenient_metric() {
        let s = DecoderSettings::default();
        assert!(s.unit_system.is_metric());
        assert!(!s.strict);
    }

    #[test]
    fn strict_keeps_unit_system() {
        let s = DecoderSettings::imperial().strict();
        assert_eq!(UnitSystem::Imperial, s.unit_system);
        assert!(s.strict);
    }
}
