//! Instantaneous fuel economy, derived from vehicle speed (PID 0x0D) and mass air flow (PID 0x10)

use crate::obd2::units::{AirFlow, KMH_TO_MPH_FACTOR, Speed};

/// Stoichiometric air-fuel ratio of gasoline
pub const STOICHIOMETRIC_AFR: f64 = 14.7;
/// Gasoline density in lb/gal
pub const GASOLINE_DENSITY_LB_PER_GAL: f64 = 6.17;
/// Grams per pound
pub const GRAMS_PER_POUND: f64 = 454.0;
/// Seconds per hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Vehicle speed is reported in a single byte, so anything above this is clamped
pub const MAX_VEHICLE_SPEED_KMH: f64 = 255.0;
/// Mass air flow used in place of zero or negative readings
pub const MIN_MASS_AIR_FLOW: f64 = 0.1;

/// Calculates instantaneous fuel economy in miles per gallon.
///
/// ## Parameters
/// * vss - Vehicle speed in km/h. Clamped to 0..=255
/// * maf - Mass air flow in g/s. Values of 0 or less are replaced with [MIN_MASS_AIR_FLOW]
pub fn calc_instant_mpg(vss: f64, maf: f64) -> f64 {
    let vss = vss.clamp(0.0, MAX_VEHICLE_SPEED_KMH);
    let maf = if maf <= 0.0 { MIN_MASS_AIR_FLOW } else { maf };

    let mph = vss * f64::from(KMH_TO_MPH_FACTOR);
    (STOICHIOMETRIC_AFR * GASOLINE_DENSITY_LB_PER_GAL * GRAMS_PER_POUND * mph)
        / (SECONDS_PER_HOUR * maf)
}

/// [calc_instant_mpg] for already decoded speed and air flow values
pub fn instant_mpg(speed: Speed, flow: AirFlow) -> f64 {
    calc_instant_mpg(
        f64::from(speed.to_kmh()),
        f64::from(flow.to_grams_per_sec()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standstill_is_zero() {
        assert_eq!(0.0, calc_instant_mpg(0.0, 5.0));
    }

    #[test]
    fn cruising() {
        // 100 km/h at 20 g/s
        let mph = 100.0 * f64::from(KMH_TO_MPH_FACTOR);
        let expected = (14.7 * 6.17 * 454.0 * mph) / (3600.0 * 20.0);
        assert_eq!(expected, calc_instant_mpg(100.0, 20.0));
        assert!((calc_instant_mpg(100.0, 20.0) - 35.54).abs() < 0.01);
    }

    #[test]
    fn speed_is_clamped() {
        assert_eq!(calc_instant_mpg(255.0, 10.0), calc_instant_mpg(300.0, 10.0));
        assert_eq!(calc_instant_mpg(255.0, 10.0), calc_instant_mpg(f64::MAX, 10.0));
        assert_eq!(calc_instant_mpg(0.0, 10.0), calc_instant_mpg(-20.0, 10.0));
    }

    #[test]
    fn flow_is_floored() {
        let floor = calc_instant_mpg(50.0, 0.1);
        assert_eq!(floor, calc_instant_mpg(50.0, 0.0));
        assert_eq!(floor, calc_instant_mpg(50.0, -3.0));
        assert!(floor.is_finite());
        // Small but positive flows are used as is
        assert_ne!(floor, calc_instant_mpg(50.0, 0.05));
    }

    #[test]
    fn typed_inputs() {
        assert_eq!(
            calc_instant_mpg(80.0, 12.5),
            instant_mpg(Speed::from_kmh(80.0), AirFlow::from_grams_per_sec(12.5))
        );
    }
}
