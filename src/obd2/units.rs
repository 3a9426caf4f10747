//! Module for service 01 and 02 unit value type conversions

use std::fmt::{Display, Formatter};

/// Fahrenheit scale factor
pub const IMPERIAL_TEMP_FACTOR: f32 = 9.0 / 5.0;
/// Fahrenheit offset
pub const IMPERIAL_TEMP_OFFSET: f32 = 32.0;
/// kPa per inHg
pub const PRESSURE_KPA_TO_IN_HG: f32 = 3.386;
/// Pa per inHg
pub const PRESSURE_PA_TO_IN_HG: f32 = 3386.0;
/// km/h to mph
pub const KMH_TO_MPH_FACTOR: f32 = 0.621371;
/// Grams to pounds, as used for mass air flow
pub const GRAMS_TO_LBS_FACTOR: f32 = 0.132;
/// Kilometers to miles.
///
/// NOTE: This is a lower precision factor than [KMH_TO_MPH_FACTOR], both are kept
/// so distance and speed values convert exactly as existing scan tools report them
pub const KM_TO_MILES_FACTOR: f32 = 0.6213;

/// Converts °C to F
pub fn convert_temp(value: f32) -> f32 {
    (value * IMPERIAL_TEMP_FACTOR) + IMPERIAL_TEMP_OFFSET
}

/// Converts kPa to inHg
pub fn convert_pressure(value: f32) -> f32 {
    value / PRESSURE_KPA_TO_IN_HG
}

/// Converts Pa to inHg
pub fn convert_pressure_pa(value: f32) -> f32 {
    value / PRESSURE_PA_TO_IN_HG
}

/// Converts km/h to mph
pub fn convert_speed(value: f32) -> f32 {
    value * KMH_TO_MPH_FACTOR
}

/// Converts grams to pounds
pub fn convert_air(value: f32) -> f32 {
    value * GRAMS_TO_LBS_FACTOR
}

/// Converts km to miles
pub fn convert_distance(value: f32) -> f32 {
    value * KM_TO_MILES_FACTOR
}

#[derive(Debug, Clone, PartialOrd, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Wrapper type for Service 01 and 02 results
pub struct ObdValue {
    /// Name of the measurement
    name: String,
    /// Value of the measurement
    value: ObdUnitType,
}

impl ObdValue {
    /// Creates a new measurement
    pub fn new<T: Into<String>>(x: T, value: ObdUnitType) -> Self {
        Self {
            name: x.into(),
            value,
        }
    }

    /// Returns the value as a formatted string
    pub fn get_value_as_string(&self, use_metric: bool) -> String {
        match use_metric {
            true => self.value.to_metric_string(),
            false => self.value.to_imperial_string(),
        }
    }

    /// Returns the data in imperial form
    pub fn get_imperial_data(&self) -> f32 {
        self.value.as_imperial()
    }

    /// Returns the data in metric form
    pub fn get_metric_data(&self) -> f32 {
        self.value.as_metric()
    }

    /// Returns the imperial representation unit
    pub fn get_imperial_unit(&self) -> Option<&'static str> {
        self.value.get_imperial_unit()
    }

    /// Returns the metric representation unit
    pub fn get_metric_unit(&self) -> Option<&'static str> {
        self.value.get_metric_unit()
    }

    /// Returns the name of the ObdValue
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns inner value
    pub fn get_value(&self) -> ObdUnitType {
        self.value
    }
}

impl Display for ObdValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Wrapper for OBD2 speed values
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Speed(f32); // self.0 is in km/h

impl Speed {
    /// From kilometers per hour
    pub fn from_kmh(kmh: f32) -> Self {
        Self(kmh)
    }

    /// Returns the speed in kilometers per hour
    pub fn to_kmh(&self) -> f32 {
        self.0
    }

    /// Returns the speed in miles per hour
    pub fn to_mph(&self) -> f32 {
        convert_speed(self.0)
    }
}

/// Wrapper for OBD2 temperature values
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Temperature(f32); // self.0 is in *C

impl Temperature {
    /// From celsius
    pub fn from_celsius(c: f32) -> Self {
        Self(c)
    }

    /// Returns the temperature in celsius
    pub fn to_celsius(&self) -> f32 {
        self.0
    }

    /// Returns the temperature in fahrenheit
    pub fn to_fahrenheit(&self) -> f32 {
        convert_temp(self.0)
    }
}

/// Unit a [Pressure] was reported in by the ECU
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PressureBasis {
    /// Kilopascal
    KiloPascal,
    /// Pascal
    Pascal,
}

/// Wrapper for OBD2 pressure values.
///
/// The value is kept in the unit the ECU reported it in, so that the
/// matching inHg divisor is used when converting
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pressure {
    value: f32,
    basis: PressureBasis,
}

impl Pressure {
    /// From kPa
    pub fn from_kilo_pascal(kpa: f32) -> Self {
        Self {
            value: kpa,
            basis: PressureBasis::KiloPascal,
        }
    }

    /// From Pa
    pub fn from_pascal(pa: f32) -> Self {
        Self {
            value: pa,
            basis: PressureBasis::Pascal,
        }
    }

    /// Unit the value was reported in
    pub fn basis(&self) -> PressureBasis {
        self.basis
    }

    /// Value in its reported unit
    pub fn to_native(&self) -> f32 {
        self.value
    }

    /// To kPa
    pub fn to_kilo_pascal(&self) -> f32 {
        match self.basis {
            PressureBasis::KiloPascal => self.value,
            PressureBasis::Pascal => self.value / 1000.0,
        }
    }

    /// To inHg
    pub fn to_in_hg(&self) -> f32 {
        match self.basis {
            PressureBasis::KiloPascal => convert_pressure(self.value),
            PressureBasis::Pascal => convert_pressure_pa(self.value),
        }
    }

    fn native_unit(&self) -> &'static str {
        match self.basis {
            PressureBasis::KiloPascal => "kPa",
            PressureBasis::Pascal => "Pa",
        }
    }
}

/// Wrapper for OBD2 time values
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(f32); // self.0 is in seconds

impl Time {
    /// From seconds
    pub fn from_seconds(seconds: f32) -> Self {
        Self(seconds)
    }

    /// From minutes
    pub fn from_minutes(minutes: f32) -> Self {
        Self(minutes * 60.0)
    }

    /// To seconds
    pub fn to_seconds(&self) -> f32 {
        self.0
    }

    /// To duration. Format string is HH:mm:ss
    pub fn to_elapsed_string(&self) -> String {
        let total = self.0.max(0.0) as u32;
        format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
    }
}

/// Wrapper for OBD2 distance values
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Distance(f32); // self.0 is in km

impl Distance {
    /// From kilometers
    pub fn from_kilometers(km: f32) -> Self {
        Self(km)
    }

    /// To kilometers
    pub fn to_kilometers(&self) -> f32 {
        self.0
    }

    /// To miles
    pub fn to_miles(&self) -> f32 {
        convert_distance(self.0)
    }
}

/// Wrapper for OBD2 air flow values
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AirFlow(f32); // self.0 is in g/s

impl AirFlow {
    /// From grams per second
    pub fn from_grams_per_sec(gs: f32) -> Self {
        Self(gs)
    }

    /// To grams per second
    pub fn to_grams_per_sec(&self) -> f32 {
        self.0
    }

    /// To pounds per second
    pub fn to_lbs_per_sec(&self) -> f32 {
        convert_air(self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// OBD unit type wrapper
pub enum ObdUnitType {
    /// Raw number
    Raw(f32),
    /// Speed value
    Speed(Speed),
    /// Percentage value
    Percent(f32), // Store as -100..0..100
    /// Temperature value
    Temperature(Temperature),
    /// RPM value
    Rpm(f32),
    /// Volts value
    Volts(f32),
    /// Milliamps value
    Current(f32),
    /// Fuel-air equivalence ratio (lambda)
    Ratio(f32),
    /// Angle in degrees
    Degrees(f32),
    /// Time value
    Time(Time),
    /// Distance value
    Distance(Distance),
    /// Pressure value
    Pressure(Pressure),
    /// Air flow value
    Flow(AirFlow),
    /// On / Off state
    Flag(bool),
}

impl ObdUnitType {
    /// Returns an output string with formatted value in metric form.
    ///
    /// Values are displayed as follows:
    /// * Raw - To 1 decimal place
    /// * RPM - As is
    /// * Speed - In km/h
    /// * Percent - As percentage with 1 decimal place
    /// * Temperature - As degrees celsius
    /// * Volts / Current / Degrees - As is
    /// * Ratio - To 3 decimal places
    /// * Time - As HH:mm:ss
    /// * Distance - As kilometers
    /// * Pressure - In the unit reported by the ECU
    /// * Flow - As g/s
    /// * Flag - On / Off
    pub fn to_metric_string(&self) -> String {
        match self {
            ObdUnitType::Raw(i) => format!("{i:.1}"),
            ObdUnitType::Rpm(i) => format!("{i} Rpm"),
            ObdUnitType::Speed(s) => format!("{} km/h", s.to_kmh()),
            ObdUnitType::Percent(p) => format!("{p:.1} %"),
            ObdUnitType::Temperature(t) => format!("{}°C", t.to_celsius()),
            ObdUnitType::Volts(v) => format!("{v}V"),
            ObdUnitType::Current(c) => format!("{c} mA"),
            ObdUnitType::Ratio(r) => format!("{r:.3}"),
            ObdUnitType::Degrees(d) => format!("{d}°"),
            ObdUnitType::Time(t) => t.to_elapsed_string(),
            ObdUnitType::Distance(d) => format!("{} km", d.to_kilometers()),
            ObdUnitType::Pressure(p) => format!("{} {}", p.to_native(), p.native_unit()),
            ObdUnitType::Flow(a) => format!("{} g/s", a.to_grams_per_sec()),
            ObdUnitType::Flag(b) => Self::flag_string(*b),
        }
    }

    /// Returns an output string with formatted value in imperial form.
    ///
    /// Values are displayed as follows:
    /// * Speed - In miles per hour
    /// * Temperature - As degrees fahrenheit
    /// * Distance - As miles
    /// * Pressure - As inHg
    /// * Flow - As lb/s
    /// * Everything else - As [ObdUnitType::to_metric_string]
    pub fn to_imperial_string(&self) -> String {
        match self {
            ObdUnitType::Speed(s) => format!("{} mph", s.to_mph()),
            ObdUnitType::Temperature(t) => format!("{} F", t.to_fahrenheit()),
            ObdUnitType::Distance(d) => format!("{} miles", d.to_miles()),
            ObdUnitType::Pressure(p) => format!("{} inHg", p.to_in_hg()),
            ObdUnitType::Flow(a) => format!("{} lb/s", a.to_lbs_per_sec()),
            _ => self.to_metric_string(),
        }
    }

    fn flag_string(b: bool) -> String {
        match b {
            true => "On".into(),
            false => "Off".into(),
        }
    }

    /// Returns the string of the units for the encoded value (If present) for imperial measurement
    pub fn get_imperial_unit(&self) -> Option<&'static str> {
        match self {
            ObdUnitType::Speed(_) => Some("mph"),
            ObdUnitType::Temperature(_) => Some("F"),
            ObdUnitType::Distance(_) => Some("miles"),
            ObdUnitType::Pressure(_) => Some("inHg"),
            ObdUnitType::Flow(_) => Some("lb/s"),
            _ => self.get_metric_unit(),
        }
    }

    /// Returns the string of the units for the encoded value (If present) for metric measurement
    ///
    /// Units are as follows (If not specified, there is no unit attached)
    /// Speed - km/h
    /// Percent - %
    /// RPM - Rpm
    /// Temperature - °C
    /// Volts - V
    /// Current - mA
    /// Degrees - °
    /// Time - s
    /// Distance - km
    /// Pressure - kPa or Pa
    /// Flow - g/s
    pub fn get_metric_unit(&self) -> Option<&'static str> {
        match self {
            ObdUnitType::Speed(_) => Some("km/h"),
            ObdUnitType::Percent(_) => Some("%"),
            ObdUnitType::Rpm(_) => Some("Rpm"),
            ObdUnitType::Temperature(_) => Some("°C"),
            ObdUnitType::Volts(_) => Some("V"),
            ObdUnitType::Current(_) => Some("mA"),
            ObdUnitType::Degrees(_) => Some("°"),
            ObdUnitType::Time(_) => Some("s"),
            ObdUnitType::Distance(_) => Some("km"),
            ObdUnitType::Pressure(p) => Some(p.native_unit()),
            ObdUnitType::Flow(_) => Some("g/s"),
            ObdUnitType::Raw(_) | ObdUnitType::Ratio(_) | ObdUnitType::Flag(_) => None,
        }
    }

    /// Returns the raw value as a float in imperial form.
    ///
    /// NOTE: flags are returned as 1.0 or 0.0
    pub fn as_imperial(&self) -> f32 {
        match self {
            ObdUnitType::Speed(x) => x.to_mph(),
            ObdUnitType::Temperature(x) => x.to_fahrenheit(),
            ObdUnitType::Distance(x) => x.to_miles(),
            ObdUnitType::Pressure(x) => x.to_in_hg(),
            ObdUnitType::Flow(x) => x.to_lbs_per_sec(),
            _ => self.as_metric(),
        }
    }

    /// Returns the raw value as a float in metric form.
    ///
    /// NOTE: flags are returned as 1.0 or 0.0
    pub fn as_metric(&self) -> f32 {
        match self {
            ObdUnitType::Raw(x)
            | ObdUnitType::Percent(x)
            | ObdUnitType::Rpm(x)
            | ObdUnitType::Volts(x)
            | ObdUnitType::Current(x)
            | ObdUnitType::Ratio(x)
            | ObdUnitType::Degrees(x) => *x,
            ObdUnitType::Speed(x) => x.to_kmh(),
            ObdUnitType::Temperature(x) => x.to_celsius(),
            ObdUnitType::Time(x) => x.to_seconds(),
            ObdUnitType::Distance(x) => x.to_kilometers(),
            ObdUnitType::Pressure(x) => x.to_native(),
            ObdUnitType::Flow(x) => x.to_grams_per_sec(),
            ObdUnitType::Flag(x) => f32::from(u8::from(*x)),
        }
    }
}

impl Display for ObdUnitType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_metric_string())
    }
}
