//! Byte to value formulas for service 01 and 02 data PIDs (SAE J1979)
//!
//! Naming follows the J1979 convention where `A`, `B`, `C` and `D` are the
//! first four data bytes after the service and PID bytes.

use crate::{DecodeError, DecodeResult};
use strum_macros::{Display, EnumIter};

/// Returns the first `N` bytes of `data` widened to `f32`
fn take<const N: usize>(data: &[u8]) -> DecodeResult<[f32; N]> {
    match data.get(..N) {
        Some(bytes) => Ok(std::array::from_fn(|i| f32::from(bytes[i]))),
        None => Err(DecodeError::InsufficientData {
            required: N,
            received: data.len(),
        }),
    }
}

/// Big endian 16 bit composite, `(A * 256) + B`
fn composite(hi: f32, lo: f32) -> f32 {
    (hi * 256.0) + lo
}

macro_rules! pid_formula {
    (
        $(#[$meta:meta])*
        $calc:ident, $try_calc:ident, $len:literal, |$bytes:pat_param| $body:expr
    ) => {
        $(#[$meta])*
        ///
        #[doc = concat!(
            "Returns [DecodeError::InsufficientData] if `data` holds less than ",
            stringify!($len),
            " byte(s)."
        )]
        pub fn $try_calc(data: &[u8]) -> DecodeResult<f32> {
            let $bytes = take::<$len>(data)?;
            Ok($body)
        }

        $(#[$meta])*
        ///
        #[doc = concat!("Returns `0.0` if `data` holds less than ", stringify!($len), " byte(s).")]
        pub fn $calc(data: &[u8]) -> f32 {
            $try_calc(data).unwrap_or_else(|e| {
                log::debug!("{}: {e}", stringify!($calc));
                0.0
            })
        }
    };
}

pid_formula! {
    /// Raw integer, `A`
    calc_int, try_calc_int, 1, |[a]| a
}

pid_formula! {
    /// Percentage, `A * 100 / 255`
    calc_percentage, try_calc_percentage, 1, |[a]| (a * 100.0) / 255.0
}

pid_formula! {
    /// Temperature in °C, `A - 40`
    calc_temp, try_calc_temp, 1, |[a]| a - 40.0
}

pid_formula! {
    /// Timing advance in degrees before TDC, `A / 2 - 64`
    calc_timing_advance, try_calc_timing_advance, 1, |[a]| (a / 2.0) - 64.0
}

pid_formula! {
    /// Oxygen sensor voltage, `A * 0.005`
    calc_oxygen_sensor_voltage, try_calc_oxygen_sensor_voltage, 1, |[a]| a * 0.005
}

pid_formula! {
    /// Fuel trim percentage from the first byte, `0.7812 * (A - 128)`
    calc_fuel_trim_percentage, try_calc_fuel_trim_percentage, 1, |[a]| 0.7812 * (a - 128.0)
}

pid_formula! {
    /// EGR error percentage, `A * 0.78125 - 100`
    calc_egr_error, try_calc_egr_error, 1, |[a]| (a * 0.78125) - 100.0
}

pid_formula! {
    /// Raw 16 bit time counter, `(A * 256) + B`
    calc_time, try_calc_time, 2, |[a, b]| composite(a, b)
}

pid_formula! {
    /// Raw 16 bit distance counter, `(A * 256) + B`
    calc_distance, try_calc_distance, 2, |[a, b]| composite(a, b)
}

pid_formula! {
    /// Engine speed in RPM, `((A * 256) + B) / 4`
    calc_engine_rpm, try_calc_engine_rpm, 2, |[a, b]| composite(a, b) / 4.0
}

pid_formula! {
    /// Catalyst temperature in °C, `((A * 256) + B) / 10 - 40`
    calc_catalyst_temp, try_calc_catalyst_temp, 2, |[a, b]| (composite(a, b) / 10.0) - 40.0
}

pid_formula! {
    /// Control module voltage, `((A * 256) + B) / 1000`
    calc_control_module_voltage, try_calc_control_module_voltage, 2,
        |[a, b]| composite(a, b) / 1000.0
}

pid_formula! {
    /// Mass air flow in g/s, `((A * 256) + B) / 100`
    calc_mass_air_flow, try_calc_mass_air_flow, 2, |[a, b]| composite(a, b) / 100.0
}

pid_formula! {
    /// Fuel rail pressure (relative to manifold vacuum) in kPa, `((A * 256) + B) * 0.079`
    calc_pressure, try_calc_pressure, 2, |[a, b]| composite(a, b) * 0.079
}

pid_formula! {
    /// Fuel rail gauge pressure (diesel or direct injection) in kPa, `((A * 256) + B) * 10`
    calc_pressure_diesel, try_calc_pressure_diesel, 2, |[a, b]| composite(a, b) * 10.0
}

pid_formula! {
    /// Evap system vapor pressure in Pa, `((A * 256) + B) / 4 - 8192`
    calc_vapor_pressure, try_calc_vapor_pressure, 2, |[a, b]| (composite(a, b) / 4.0) - 8192.0
}

pid_formula! {
    /// Fuel-air equivalence ratio (lambda), `((A * 256) + B) * 0.0000305`
    calc_equivalence_ratio, try_calc_equivalence_ratio, 2, |[a, b]| composite(a, b) * 0.0000305
}

pid_formula! {
    /// Absolute load value percentage, `((A * 256) + B) * 100 / 255`
    calc_absolute_load_value, try_calc_absolute_load_value, 2,
        |[a, b]| (composite(a, b) * 100.0) / 255.0
}

pid_formula! {
    /// Fuel trim percentage from the *second* byte, `0.7812 * (B - 128)`.
    ///
    /// This is the trim field that follows the voltage byte in the oxygen sensor PIDs
    calc_fuel_trim_percentage2, try_calc_fuel_trim_percentage2, 2, |[_, b]| 0.7812 * (b - 128.0)
}

pid_formula! {
    /// Wide band oxygen sensor voltage, `((C * 256) + D) * 0.000122`
    calc_equivalence_voltage, try_calc_equivalence_voltage, 4,
        |[_, _, c, d]| composite(c, d) * 0.000122
}

pid_formula! {
    /// Wide band oxygen sensor current in mA, `((C * 256) + D) * 0.00390625 - 128`
    calc_equivalence_current, try_calc_equivalence_current, 4,
        |[_, _, c, d]| (composite(c, d) * 0.00390625) - 128.0
}

/// Returns true if the malfunction indicator lamp bit (Bit 7 of `A`) is set.
///
/// Returns [DecodeError::InsufficientData] if `data` is empty.
pub fn try_calc_mil_active(data: &[u8]) -> DecodeResult<bool> {
    data.first()
        .map(|a| a & 0x80 != 0)
        .ok_or(DecodeError::InsufficientData {
            required: 1,
            received: 0,
        })
}

/// Returns true if the malfunction indicator lamp bit (Bit 7 of `A`) is set.
///
/// Returns `false` if `data` is empty.
pub fn calc_mil_active(data: &[u8]) -> bool {
    try_calc_mil_active(data).unwrap_or_else(|e| {
        log::debug!("calc_mil_active: {e}");
        false
    })
}

/// Formula families of the PID calculator, for callers that pick a formula at runtime
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Formula {
    /// [calc_int]
    Int,
    /// [calc_percentage]
    Percentage,
    /// [calc_temp]
    Temp,
    /// [calc_timing_advance]
    TimingAdvance,
    /// [calc_oxygen_sensor_voltage]
    OxygenSensorVoltage,
    /// [calc_fuel_trim_percentage]
    FuelTrimPercentage,
    /// [calc_egr_error]
    EgrError,
    /// [calc_time]
    Time,
    /// [calc_distance]
    Distance,
    /// [calc_engine_rpm]
    EngineRpm,
    /// [calc_catalyst_temp]
    CatalystTemp,
    /// [calc_control_module_voltage]
    ControlModuleVoltage,
    /// [calc_mass_air_flow]
    MassAirFlow,
    /// [calc_pressure]
    Pressure,
    /// [calc_pressure_diesel]
    PressureDiesel,
    /// [calc_vapor_pressure]
    VaporPressure,
    /// [calc_equivalence_ratio]
    EquivalenceRatio,
    /// [calc_absolute_load_value]
    AbsoluteLoadValue,
    /// [calc_fuel_trim_percentage2]
    FuelTrimPercentage2,
    /// [calc_equivalence_voltage]
    EquivalenceVoltage,
    /// [calc_equivalence_current]
    EquivalenceCurrent,
}

impl Formula {
    /// Minimum number of data bytes the formula reads
    pub fn required_len(&self) -> usize {
        match self {
            Formula::Int
            | Formula::Percentage
            | Formula::Temp
            | Formula::TimingAdvance
            | Formula::OxygenSensorVoltage
            | Formula::FuelTrimPercentage
            | Formula::EgrError => 1,
            Formula::EquivalenceVoltage | Formula::EquivalenceCurrent => 4,
            _ => 2,
        }
    }

    /// Applies the formula, reporting a short payload as an error
    pub fn try_apply(&self, data: &[u8]) -> DecodeResult<f32> {
        match self {
            Formula::Int => try_calc_int(data),
            Formula::Percentage => try_calc_percentage(data),
            Formula::Temp => try_calc_temp(data),
            Formula::TimingAdvance => try_calc_timing_advance(data),
            Formula::OxygenSensorVoltage => try_calc_oxygen_sensor_voltage(data),
            Formula::FuelTrimPercentage => try_calc_fuel_trim_percentage(data),
            Formula::EgrError => try_calc_egr_error(data),
            Formula::Time => try_calc_time(data),
            Formula::Distance => try_calc_distance(data),
            Formula::EngineRpm => try_calc_engine_rpm(data),
            Formula::CatalystTemp => try_calc_catalyst_temp(data),
            Formula::ControlModuleVoltage => try_calc_control_module_voltage(data),
            Formula::MassAirFlow => try_calc_mass_air_flow(data),
            Formula::Pressure => try_calc_pressure(data),
            Formula::PressureDiesel => try_calc_pressure_diesel(data),
            Formula::VaporPressure => try_calc_vapor_pressure(data),
            Formula::EquivalenceRatio => try_calc_equivalence_ratio(data),
            Formula::AbsoluteLoadValue => try_calc_absolute_load_value(data),
            Formula::FuelTrimPercentage2 => try_calc_fuel_trim_percentage2(data),
            Formula::EquivalenceVoltage => try_calc_equivalence_voltage(data),
            Formula::EquivalenceCurrent => try_calc_equivalence_current(data),
        }
    }

    /// Applies the formula, falling back to `0.0` on a short payload
    pub fn apply(&self, data: &[u8]) -> f32 {
        self.try_apply(data).unwrap_or_else(|e| {
            log::debug!("{self} formula: {e}");
            0.0
        })
    }

    /// Applies the formula either strictly or leniently
    pub(crate) fn evaluate(&self, data: &[u8], strict: bool) -> DecodeResult<f32> {
        match strict {
            true => self.try_apply(data),
            false => Ok(self.apply(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn assert_close(expected: f32, actual: f32) {
        assert!(
            (expected - actual).abs() < 0.001,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn int_passthrough() {
        assert_eq!(10.0, calc_int(&[0x0A]));
        assert_eq!(50.0, calc_int(&[0x32, 0xFF]));
        assert_eq!(0.0, calc_int(&[]));
    }

    #[test]
    fn engine_rpm() {
        assert_eq!(645.0, calc_engine_rpm(&[0x0A, 0x14]));
        assert_eq!(16383.75, calc_engine_rpm(&[0xFF, 0xFF]));
        assert_eq!(0.0, calc_engine_rpm(&[]));
        assert_eq!(0.0, calc_engine_rpm(&[0xFF]));
    }

    #[test]
    fn temperatures() {
        assert_eq!(60.0, calc_temp(&[0x64]));
        assert_eq!(-40.0, calc_temp(&[0x00]));
        assert_eq!(215.0, calc_temp(&[0xFF]));
        // (1000 / 10) - 40
        assert_eq!(60.0, calc_catalyst_temp(&[0x03, 0xE8]));
    }

    #[test]
    fn single_byte_formulas() {
        assert_eq!(100.0, calc_percentage(&[0xFF]));
        assert_eq!(0.0, calc_percentage(&[0x00]));
        assert_eq!(-64.0, calc_timing_advance(&[0x00]));
        assert_eq!(0.0, calc_timing_advance(&[0x80]));
        assert_close(1.275, calc_oxygen_sensor_voltage(&[0xFF]));
        assert_eq!(0.0, calc_fuel_trim_percentage(&[0x80]));
        assert_close(-99.9936, calc_fuel_trim_percentage(&[0x00]));
        assert_eq!(-100.0, calc_egr_error(&[0x00]));
        assert_eq!(0.0, calc_egr_error(&[0x80]));
    }

    #[test]
    fn two_byte_formulas() {
        assert_eq!(4660.0, calc_time(&[0x12, 0x34]));
        assert_eq!(65535.0, calc_distance(&[0xFF, 0xFF]));
        assert_close(12.5, calc_control_module_voltage(&[0x30, 0xD4]));
        assert_close(655.35, calc_mass_air_flow(&[0xFF, 0xFF]));
        assert_close(79.0, calc_pressure(&[0x03, 0xE8]));
        assert_eq!(10000.0, calc_pressure_diesel(&[0x03, 0xE8]));
        assert_eq!(-8192.0, calc_vapor_pressure(&[0x00, 0x00]));
        assert_eq!(0.0, calc_vapor_pressure(&[0x80, 0x00]));
        assert_close(0.999424, calc_equivalence_ratio(&[0x80, 0x00]));
        assert_close(25700.0, calc_absolute_load_value(&[0xFF, 0xFF]));
        assert_close(100.0, calc_absolute_load_value(&[0x00, 0xFF]));
    }

    #[test]
    fn large_composites_do_not_overflow() {
        // A >= 0x80 would not fit a signed 16 bit intermediate
        assert_eq!(32768.0, calc_time(&[0x80, 0x00]));
        assert_eq!(65280.0, calc_distance(&[0xFF, 0x00]));
    }

    #[test]
    fn bank2_trim_uses_second_byte() {
        assert_eq!(0.0, calc_fuel_trim_percentage2(&[0x00, 0x80]));
        assert_close(-99.9936, calc_fuel_trim_percentage2(&[0x80, 0x00]));
        assert_eq!(0.0, calc_fuel_trim_percentage2(&[0x80]));
    }

    #[test]
    fn four_byte_formulas_read_c_and_d() {
        // A and B are ignored
        assert_close(3.997696, calc_equivalence_voltage(&[0xFF, 0xFF, 0x80, 0x00]));
        assert_eq!(0.0, calc_equivalence_current(&[0x00, 0x00, 0x80, 0x00]));
        assert_eq!(-128.0, calc_equivalence_current(&[0xFF, 0xFF, 0x00, 0x00]));
        assert_eq!(0.0, calc_equivalence_voltage(&[0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn short_payloads_default_to_zero() {
        let payload = [0xFF; 4];
        for formula in Formula::iter() {
            for len in 0..formula.required_len() {
                assert_eq!(0.0, formula.apply(&payload[..len]), "{formula} with {len} bytes");
                assert_eq!(
                    Err(DecodeError::InsufficientData {
                        required: formula.required_len(),
                        received: len
                    }),
                    formula.try_apply(&payload[..len])
                );
            }
            assert!(formula.try_apply(&payload[..formula.required_len()]).is_ok());
        }
    }

    #[test]
    fn lenient_fallback_matches_wrappers() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(calc_engine_rpm(&[0x0A]), Formula::EngineRpm.apply(&[0x0A]));
        assert_eq!(Ok(0.0), Formula::EngineRpm.evaluate(&[0x0A], false));
        assert!(Formula::EngineRpm.evaluate(&[0x0A], true).is_err());
        assert!(!calc_mil_active(&[]));
    }

    #[test]
    fn strict_variant_tells_zero_from_missing() {
        assert_eq!(Ok(0.0), try_calc_int(&[0x00]));
        assert!(try_calc_int(&[]).is_err());
    }

    #[test]
    fn mil_bit() {
        for b in 0..=u8::MAX {
            assert_eq!(b & 0x80 != 0, calc_mil_active(&[b]));
        }
        assert!(!calc_mil_active(&[]));
        assert!(try_calc_mil_active(&[]).is_err());
        assert_eq!(Ok(true), try_calc_mil_active(&[0x81, 0x00]));
    }
}
