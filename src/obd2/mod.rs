//! Module for OBD2 (SAE J1979) signal decoding

pub mod calculator;
mod data_pids;
mod descriptor;
pub mod fuel_economy;
pub mod units;

// Exports
pub use calculator::Formula;
pub use data_pids::*;
pub use descriptor::*;
pub use fuel_economy::{calc_instant_mpg, instant_mpg};
pub use units::{
    AirFlow, Distance, ObdUnitType, ObdValue, Pressure, PressureBasis, Speed, Temperature, Time,
};
