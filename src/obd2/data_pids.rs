use crate::obd2::calculator::{Formula, calc_mil_active, try_calc_mil_active};
use crate::obd2::{AirFlow, Distance, ObdUnitType, ObdValue, Pressure, Speed, Temperature, Time};
use crate::{DecodeError, DecodeResult, DecoderSettings};
use strum_macros::EnumString;

/// OBD2 data PIDs used for Service 01 and 02
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum DataPid {
    MonitorStatus,
    CalculatedEngineLoad,
    EngineCoolantTemp,
    ShortTermFuelTrimBank1,
    LongTermFuelTrimBank1,
    ShortTermFuelTrimBank2,
    LongTermFuelTrimBank2,
    IntakeManifoldAbsPressure,
    EngineSpeed,
    VehicleSpeed,
    TimingAdvance,
    IntakeAirTemperature,
    MassAirFlow,
    ThrottlePosition,
    /// Narrow band oxygen sensor, 1..=8
    OxygenSensor(u8),
    RuntimeSinceStart,
    MILRuntime,
    FuelRailPressure,
    FuelRailGaugePressure,
    /// Wide band oxygen sensor lambda and voltage, 1..=8
    OxygenSensorLambdaVoltage(u8),
    CommandedEGR,
    EGRError,
    CommandedEvapPurge,
    FuelTankLevelInput,
    WarmupsSinceCodesCleared,
    DistanceTraveledSinceCodesCleared,
    EvapSystemVaporPressure,
    AbsBarometricPressure,
    /// Wide band oxygen sensor lambda and current, 1..=8
    OxygenSensorLambdaCurrent(u8),
    CatTempBank1Sensor1,
    CatTempBank2Sensor1,
    CatTempBank1Sensor2,
    CatTempBank2Sensor2,
    ControlModuleVoltage,
    AbsLoadValue,
    CommandedLambda,
    RelativeThrottlePosition,
    AmbientAirTemp,
    AbsoluteThrottlePositionB,
    AbsoluteThrottlePositionC,
    AbsoluteThrottlePositionD,
    AbsoluteThrottlePositionE,
    AbsoluteThrottlePositionF,
    CommandedThrottleActuator,
    TimeRunSinceMILOn,
    TimeSinceCodesCleared,
    EthanolFuelPercentage,
    RelativePedalPosition,
    HybridBatteryPackLife,
    EngineOilTemp,
    /// PID without a decoding formula
    Unknown(u8),
}

impl From<u8> for DataPid {
    fn from(x: u8) -> Self {
        match x {
            0x01 => DataPid::MonitorStatus,
            0x04 => DataPid::CalculatedEngineLoad,
            0x05 => DataPid::EngineCoolantTemp,
            0x06 => DataPid::ShortTermFuelTrimBank1,
            0x07 => DataPid::LongTermFuelTrimBank1,
            0x08 => DataPid::ShortTermFuelTrimBank2,
            0x09 => DataPid::LongTermFuelTrimBank2,
            0x0B => DataPid::IntakeManifoldAbsPressure,
            0x0C => DataPid::EngineSpeed,
            0x0D => DataPid::VehicleSpeed,
            0x0E => DataPid::TimingAdvance,
            0x0F => DataPid::IntakeAirTemperature,
            0x10 => DataPid::MassAirFlow,
            0x11 => DataPid::ThrottlePosition,
            0x14..=0x1B => DataPid::OxygenSensor(x - 0x13),
            0x1F => DataPid::RuntimeSinceStart,
            0x21 => DataPid::MILRuntime,
            0x22 => DataPid::FuelRailPressure,
            0x23 => DataPid::FuelRailGaugePressure,
            0x24..=0x2B => DataPid::OxygenSensorLambdaVoltage(x - 0x23),
            0x2C => DataPid::CommandedEGR,
            0x2D => DataPid::EGRError,
            0x2E => DataPid::CommandedEvapPurge,
            0x2F => DataPid::FuelTankLevelInput,
            0x30 => DataPid::WarmupsSinceCodesCleared,
            0x31 => DataPid::DistanceTraveledSinceCodesCleared,
            0x32 => DataPid::EvapSystemVaporPressure,
            0x33 => DataPid::AbsBarometricPressure,
            0x34..=0x3B => DataPid::OxygenSensorLambdaCurrent(x - 0x33),
            0x3C => DataPid::CatTempBank1Sensor1,
            0x3D => DataPid::CatTempBank2Sensor1,
            0x3E => DataPid::CatTempBank1Sensor2,
            0x3F => DataPid::CatTempBank2Sensor2,
            0x42 => DataPid::ControlModuleVoltage,
            0x43 => DataPid::AbsLoadValue,
            0x44 => DataPid::CommandedLambda,
            0x45 => DataPid::RelativeThrottlePosition,
            0x46 => DataPid::AmbientAirTemp,
            0x47 => DataPid::AbsoluteThrottlePositionB,
            0x48 => DataPid::AbsoluteThrottlePositionC,
            0x49 => DataPid::AbsoluteThrottlePositionD,
            0x4A => DataPid::AbsoluteThrottlePositionE,
            0x4B => DataPid::AbsoluteThrottlePositionF,
            0x4C => DataPid::CommandedThrottleActuator,
            0x4D => DataPid::TimeRunSinceMILOn,
            0x4E => DataPid::TimeSinceCodesCleared,
            0x52 => DataPid::EthanolFuelPercentage,
            0x5A => DataPid::RelativePedalPosition,
            0x5B => DataPid::HybridBatteryPackLife,
            0x5C => DataPid::EngineOilTemp,
            _ => DataPid::Unknown(x),
        }
    }
}

impl From<DataPid> for u8 {
    fn from(x: DataPid) -> Self {
        match x {
            DataPid::MonitorStatus => 0x01,
            DataPid::CalculatedEngineLoad => 0x04,
            DataPid::EngineCoolantTemp => 0x05,
            DataPid::ShortTermFuelTrimBank1 => 0x06,
            DataPid::LongTermFuelTrimBank1 => 0x07,
            DataPid::ShortTermFuelTrimBank2 => 0x08,
            DataPid::LongTermFuelTrimBank2 => 0x09,
            DataPid::IntakeManifoldAbsPressure => 0x0B,
            DataPid::EngineSpeed => 0x0C,
            DataPid::VehicleSpeed => 0x0D,
            DataPid::TimingAdvance => 0x0E,
            DataPid::IntakeAirTemperature => 0x0F,
            DataPid::MassAirFlow => 0x10,
            DataPid::ThrottlePosition => 0x11,
            DataPid::OxygenSensor(n) => 0x13 + n.clamp(1, 8),
            DataPid::RuntimeSinceStart => 0x1F,
            DataPid::MILRuntime => 0x21,
            DataPid::FuelRailPressure => 0x22,
            DataPid::FuelRailGaugePressure => 0x23,
            DataPid::OxygenSensorLambdaVoltage(n) => 0x23 + n.clamp(1, 8),
            DataPid::CommandedEGR => 0x2C,
            DataPid::EGRError => 0x2D,
            DataPid::CommandedEvapPurge => 0x2E,
            DataPid::FuelTankLevelInput => 0x2F,
            DataPid::WarmupsSinceCodesCleared => 0x30,
            DataPid::DistanceTraveledSinceCodesCleared => 0x31,
            DataPid::EvapSystemVaporPressure => 0x32,
            DataPid::AbsBarometricPressure => 0x33,
            DataPid::OxygenSensorLambdaCurrent(n) => 0x33 + n.clamp(1, 8),
            DataPid::CatTempBank1Sensor1 => 0x3C,
            DataPid::CatTempBank2Sensor1 => 0x3D,
            DataPid::CatTempBank1Sensor2 => 0x3E,
            DataPid::CatTempBank2Sensor2 => 0x3F,
            DataPid::ControlModuleVoltage => 0x42,
            DataPid::AbsLoadValue => 0x43,
            DataPid::CommandedLambda => 0x44,
            DataPid::RelativeThrottlePosition => 0x45,
            DataPid::AmbientAirTemp => 0x46,
            DataPid::AbsoluteThrottlePositionB => 0x47,
            DataPid::AbsoluteThrottlePositionC => 0x48,
            DataPid::AbsoluteThrottlePositionD => 0x49,
            DataPid::AbsoluteThrottlePositionE => 0x4A,
            DataPid::AbsoluteThrottlePositionF => 0x4B,
            DataPid::CommandedThrottleActuator => 0x4C,
            DataPid::TimeRunSinceMILOn => 0x4D,
            DataPid::TimeSinceCodesCleared => 0x4E,
            DataPid::EthanolFuelPercentage => 0x52,
            DataPid::RelativePedalPosition => 0x5A,
            DataPid::HybridBatteryPackLife => 0x5B,
            DataPid::EngineOilTemp => 0x5C,
            DataPid::Unknown(x) => x,
        }
    }
}

/// How the result of a [Formula] is presented
#[derive(Clone, Copy)]
enum Kind {
    Raw,
    Percent,
    Temperature,
    Rpm,
    Speed,
    Degrees,
    Flow,
    Volts,
    Current,
    Ratio,
    Seconds,
    Minutes,
    Distance,
    KiloPascal,
    Pascal,
}

impl Kind {
    fn wrap(self, v: f32) -> ObdUnitType {
        match self {
            Kind::Raw => ObdUnitType::Raw(v),
            Kind::Percent => ObdUnitType::Percent(v),
            Kind::Temperature => ObdUnitType::Temperature(Temperature::from_celsius(v)),
            Kind::Rpm => ObdUnitType::Rpm(v),
            Kind::Speed => ObdUnitType::Speed(Speed::from_kmh(v)),
            Kind::Degrees => ObdUnitType::Degrees(v),
            Kind::Flow => ObdUnitType::Flow(AirFlow::from_grams_per_sec(v)),
            Kind::Volts => ObdUnitType::Volts(v),
            Kind::Current => ObdUnitType::Current(v),
            Kind::Ratio => ObdUnitType::Ratio(v),
            Kind::Seconds => ObdUnitType::Time(Time::from_seconds(v)),
            Kind::Minutes => ObdUnitType::Time(Time::from_minutes(v)),
            Kind::Distance => ObdUnitType::Distance(Distance::from_kilometers(v)),
            Kind::KiloPascal => ObdUnitType::Pressure(Pressure::from_kilo_pascal(v)),
            Kind::Pascal => ObdUnitType::Pressure(Pressure::from_pascal(v)),
        }
    }
}

/// Name, formula and presentation of every value carried by a PID
type Fields = &'static [(&'static str, Formula, Kind)];

impl DataPid {
    fn fields(&self) -> Option<Fields> {
        use Formula as F;
        use Kind as K;
        let f: Fields = match self {
            DataPid::MonitorStatus | DataPid::Unknown(_) => return None,
            DataPid::CalculatedEngineLoad => {
                &[("Calculated engine load", F::Percentage, K::Percent)]
            }
            DataPid::EngineCoolantTemp => {
                &[("Engine coolant temperature", F::Temp, K::Temperature)]
            }
            DataPid::ShortTermFuelTrimBank1 => {
                &[("Short term fuel trim - Bank 1", F::FuelTrimPercentage, K::Percent)]
            }
            DataPid::LongTermFuelTrimBank1 => {
                &[("Long term fuel trim - Bank 1", F::FuelTrimPercentage, K::Percent)]
            }
            DataPid::ShortTermFuelTrimBank2 => {
                &[("Short term fuel trim - Bank 2", F::FuelTrimPercentage, K::Percent)]
            }
            DataPid::LongTermFuelTrimBank2 => {
                &[("Long term fuel trim - Bank 2", F::FuelTrimPercentage, K::Percent)]
            }
            DataPid::IntakeManifoldAbsPressure => {
                &[("Intake manifold absolute pressure", F::Int, K::KiloPascal)]
            }
            DataPid::EngineSpeed => &[("Engine speed", F::EngineRpm, K::Rpm)],
            DataPid::VehicleSpeed => &[("Vehicle speed", F::Int, K::Speed)],
            DataPid::TimingAdvance => {
                &[("Timing advance before TDC", F::TimingAdvance, K::Degrees)]
            }
            DataPid::IntakeAirTemperature => &[("Intake air temperature", F::Temp, K::Temperature)],
            DataPid::MassAirFlow => &[("Mass air flow sensor rate", F::MassAirFlow, K::Flow)],
            DataPid::ThrottlePosition => &[("Throttle position", F::Percentage, K::Percent)],
            DataPid::OxygenSensor(_) => &[
                ("Oxygen sensor voltage", F::OxygenSensorVoltage, K::Volts),
                ("Oxygen sensor short term fuel trim", F::FuelTrimPercentage2, K::Percent),
            ],
            DataPid::RuntimeSinceStart => &[("Runtime since engine start", F::Time, K::Seconds)],
            DataPid::MILRuntime => &[("Distance travelled with MIL on", F::Distance, K::Distance)],
            DataPid::FuelRailPressure => {
                &[("Fuel rail pressure (Relative to manifold vacuum)", F::Pressure, K::KiloPascal)]
            }
            DataPid::FuelRailGaugePressure => {
                &[("Fuel rail gauge pressure", F::PressureDiesel, K::KiloPascal)]
            }
            DataPid::OxygenSensorLambdaVoltage(_) => &[
                ("Oxygen sensor lambda", F::EquivalenceRatio, K::Ratio),
                ("Oxygen sensor voltage", F::EquivalenceVoltage, K::Volts),
            ],
            DataPid::CommandedEGR => &[("Commanded EGR", F::Percentage, K::Percent)],
            DataPid::EGRError => &[("EGR error", F::EgrError, K::Percent)],
            DataPid::CommandedEvapPurge => {
                &[("Commanded evaporative purge", F::Percentage, K::Percent)]
            }
            DataPid::FuelTankLevelInput => &[("Fuel tank level input", F::Percentage, K::Percent)],
            DataPid::WarmupsSinceCodesCleared => {
                &[("Warm-ups since codes cleared", F::Int, K::Raw)]
            }
            DataPid::DistanceTraveledSinceCodesCleared => {
                &[("Distance traveled since codes cleared", F::Distance, K::Distance)]
            }
            DataPid::EvapSystemVaporPressure => {
                &[("Evap system vapor pressure", F::VaporPressure, K::Pascal)]
            }
            DataPid::AbsBarometricPressure => {
                &[("Absolute barometric pressure", F::Int, K::KiloPascal)]
            }
            DataPid::OxygenSensorLambdaCurrent(_) => &[
                ("Oxygen sensor lambda", F::EquivalenceRatio, K::Ratio),
                ("Oxygen sensor current", F::EquivalenceCurrent, K::Current),
            ],
            DataPid::CatTempBank1Sensor1 => {
                &[("Catalyst temperature - Bank 1, Sensor 1", F::CatalystTemp, K::Temperature)]
            }
            DataPid::CatTempBank2Sensor1 => {
                &[("Catalyst temperature - Bank 2, Sensor 1", F::CatalystTemp, K::Temperature)]
            }
            DataPid::CatTempBank1Sensor2 => {
                &[("Catalyst temperature - Bank 1, Sensor 2", F::CatalystTemp, K::Temperature)]
            }
            DataPid::CatTempBank2Sensor2 => {
                &[("Catalyst temperature - Bank 2, Sensor 2", F::CatalystTemp, K::Temperature)]
            }
            DataPid::ControlModuleVoltage => {
                &[("Control module voltage", F::ControlModuleVoltage, K::Volts)]
            }
            DataPid::AbsLoadValue => &[("Absolute load value", F::AbsoluteLoadValue, K::Percent)],
            DataPid::CommandedLambda => {
                &[("Commanded air-fuel equivalence ratio", F::EquivalenceRatio, K::Ratio)]
            }
            DataPid::RelativeThrottlePosition => {
                &[("Relative throttle position", F::Percentage, K::Percent)]
            }
            DataPid::AmbientAirTemp => &[("Ambient air temperature", F::Temp, K::Temperature)],
            DataPid::AbsoluteThrottlePositionB => {
                &[("Absolute throttle position B", F::Percentage, K::Percent)]
            }
            DataPid::AbsoluteThrottlePositionC => {
                &[("Absolute throttle position C", F::Percentage, K::Percent)]
            }
            DataPid::AbsoluteThrottlePositionD => {
                &[("Accelerator pedal position D", F::Percentage, K::Percent)]
            }
            DataPid::AbsoluteThrottlePositionE => {
                &[("Accelerator pedal position E", F::Percentage, K::Percent)]
            }
            DataPid::AbsoluteThrottlePositionF => {
                &[("Accelerator pedal position F", F::Percentage, K::Percent)]
            }
            DataPid::CommandedThrottleActuator => {
                &[("Commanded throttle actuator", F::Percentage, K::Percent)]
            }
            DataPid::TimeRunSinceMILOn => &[("Time run with MIL on", F::Time, K::Minutes)],
            DataPid::TimeSinceCodesCleared => {
                &[("Time since trouble codes cleared", F::Time, K::Minutes)]
            }
            DataPid::EthanolFuelPercentage => {
                &[("Ethanol fuel percentage", F::Percentage, K::Percent)]
            }
            DataPid::RelativePedalPosition => {
                &[("Relative accelerator pedal position", F::Percentage, K::Percent)]
            }
            DataPid::HybridBatteryPackLife => {
                &[("Hybrid battery pack remaining life", F::Percentage, K::Percent)]
            }
            DataPid::EngineOilTemp => &[("Engine oil temperature", F::Temp, K::Temperature)],
        };
        Some(f)
    }

    /// Returns true if [DataPid::decode] knows how to decode this PID
    pub fn is_supported(&self) -> bool {
        matches!(self, DataPid::MonitorStatus) || self.fields().is_some()
    }

    /// Decodes the data bytes of a service 01 or 02 response for this PID.
    ///
    /// `data` is the response with the service and PID bytes removed. With lenient settings,
    /// a payload which is too short decodes to zero. With strict settings it is
    /// reported as [DecodeError::InsufficientData].
    pub fn decode(&self, data: &[u8], settings: &DecoderSettings) -> DecodeResult<Vec<ObdValue>> {
        if let DataPid::MonitorStatus = self {
            let mil = match settings.strict {
                true => try_calc_mil_active(data)?,
                false => calc_mil_active(data),
            };
            return Ok(vec![ObdValue::new("MIL", ObdUnitType::Flag(mil))]);
        }
        let fields = self.fields().ok_or_else(|| {
            log::debug!("No formula for {self:?}");
            DecodeError::UnsupportedPid(u8::from(*self))
        })?;
        fields
            .iter()
            .map(|(name, formula, kind)| {
                formula
                    .evaluate(data, settings.strict)
                    .map(|v| ObdValue::new(*name, kind.wrap(v)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_byte_round_trip() {
        for pid in 0..=u8::MAX {
            assert_eq!(pid, u8::from(DataPid::from(pid)));
        }
        assert_eq!(DataPid::OxygenSensor(1), DataPid::from(0x14));
        assert_eq!(DataPid::OxygenSensorLambdaCurrent(8), DataPid::from(0x3B));
    }

    #[test]
    fn name_lookup() {
        assert_eq!(Ok(DataPid::EngineSpeed), "EngineSpeed".parse::<DataPid>());
    }

    #[test]
    fn engine_speed() {
        let v = DataPid::EngineSpeed
            .decode(&[0x0A, 0x14], &DecoderSettings::default())
            .unwrap();
        assert_eq!(1, v.len());
        assert_eq!(ObdUnitType::Rpm(645.0), v[0].get_value());
    }

    #[test]
    fn oxygen_sensor_has_voltage_and_trim() {
        let v = DataPid::from(0x15)
            .decode(&[0xC8, 0x80], &DecoderSettings::default())
            .unwrap();
        assert_eq!(2, v.len());
        assert_eq!(ObdUnitType::Volts(1.0), v[0].get_value());
        assert_eq!(ObdUnitType::Percent(0.0), v[1].get_value());
    }

    #[test]
    fn vapor_pressure_is_pascal() {
        let v = DataPid::EvapSystemVaporPressure
            .decode(&[0x80, 0x00], &DecoderSettings::default())
            .unwrap();
        assert_eq!(Some("Pa"), v[0].get_metric_unit());
    }

    #[test]
    fn strictness() {
        let lenient = DecoderSettings::default();
        let strict = lenient.strict();
        let v = DataPid::EngineSpeed.decode(&[0x0A], &lenient).unwrap();
        assert_eq!(0.0, v[0].get_metric_data());
        assert_eq!(
            Err(DecodeError::InsufficientData {
                required: 2,
                received: 1
            }),
            DataPid::EngineSpeed.decode(&[0x0A], &strict)
        );
        assert!(DataPid::MonitorStatus.decode(&[], &strict).is_err());
        assert_eq!(
            ObdUnitType::Flag(false),
            DataPid::MonitorStatus.decode(&[], &lenient).unwrap()[0].get_value()
        );
    }

    #[test]
    fn unknown_pid() {
        assert!(!DataPid::from(0xA6).is_supported());
        assert_eq!(
            Err(DecodeError::UnsupportedPid(0xA6)),
            DataPid::from(0xA6).decode(&[0x00; 4], &DecoderSettings::default())
        );
    }
}
