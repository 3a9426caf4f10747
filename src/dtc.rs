//! Module for OBD2 Diagnostic trouble code data
//!
//! Service 03 (stored), 07 (pending) and 0A (permanent) DTC responses all
//! pack each trouble code into two bytes:
//!
//! ```text
//!  first byte              second byte
//!  7 6 | 5 4 3 2 1 0       7 6 | 5 4 3 2 1 0
//!  sys | group             --- | fault
//! ```

use crate::{DecodeError, DecodeResult};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

/// Mask for the group and fault digit fields
pub const DTC_DIGIT_MASK: u8 = 0x3F;

/// System a DTC belongs to, encoded in the top 2 bits of its first byte
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, StrumDisplay, EnumString, EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DtcSystem {
    /// Powertrain (P)
    #[strum(serialize = "P")]
    Powertrain,
    /// Chassis (C)
    #[strum(serialize = "C")]
    Chassis,
    /// Body (B)
    #[strum(serialize = "B")]
    Body,
    /// Network (U)
    #[strum(serialize = "U")]
    Network,
}

const SYSTEM_CODES: [DtcSystem; 4] = [
    DtcSystem::Powertrain,
    DtcSystem::Chassis,
    DtcSystem::Body,
    DtcSystem::Network,
];

impl DtcSystem {
    /// Returns the letter used as the first character of the DTC
    pub fn letter(&self) -> char {
        match self {
            DtcSystem::Powertrain => 'P',
            DtcSystem::Chassis => 'C',
            DtcSystem::Body => 'B',
            DtcSystem::Network => 'U',
        }
    }

    fn index(&self) -> u8 {
        match self {
            DtcSystem::Powertrain => 0,
            DtcSystem::Chassis => 1,
            DtcSystem::Body => 2,
            DtcSystem::Network => 3,
        }
    }
}

/// A single OBD2 diagnostic trouble code, such as `P0101`
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObdDtc {
    system: DtcSystem,
    group: u8,
    fault: u8,
}

impl ObdDtc {
    /// Creates a DTC. Group and fault are masked to their 6 bit fields
    pub fn new(system: DtcSystem, group: u8, fault: u8) -> Self {
        Self {
            system,
            group: group & DTC_DIGIT_MASK,
            fault: fault & DTC_DIGIT_MASK,
        }
    }

    /// Decodes a DTC from its two byte encoding.
    ///
    /// Returns None if the system index falls outside the system table
    pub fn from_bytes(first: u8, second: u8) -> Option<Self> {
        SYSTEM_CODES
            .get(usize::from(first >> 6))
            .map(|system| Self::new(*system, first, second))
    }

    /// System the DTC belongs to
    pub fn system(&self) -> DtcSystem {
        self.system
    }

    /// Group / category number (Digits 2 and 3)
    pub fn group(&self) -> u8 {
        self.group
    }

    /// Specific fault number (Digits 4 and 5)
    pub fn fault(&self) -> u8 {
        self.fault
    }

    /// Returns the two byte encoding of the DTC
    pub fn raw(&self) -> u16 {
        (u16::from((self.system.index() << 6) | self.group) << 8) | u16::from(self.fault)
    }
}

fn push_digits(out: &mut String, value: u8) {
    // value is at most 63
    out.push(char::from(b'0' + value / 10));
    out.push(char::from(b'0' + value % 10));
}

impl Display for ObdDtc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut code = String::with_capacity(5);
        code.push(self.system.letter());
        push_digits(&mut code, self.group);
        push_digits(&mut code, self.fault);
        f.write_str(&code)
    }
}

impl FromStr for ObdDtc {
    type Err = DecodeError;

    fn from_str(s: &str) -> DecodeResult<Self> {
        let invalid = || DecodeError::InvalidDtc(s.to_string());
        if s.len() != 5 || !s.as_bytes()[1..].iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let system = DtcSystem::from_str(&s[0..1]).map_err(|_| invalid())?;
        let group: u8 = s[1..3].parse().map_err(|_| invalid())?;
        let fault: u8 = s[3..5].parse().map_err(|_| invalid())?;
        if group > DTC_DIGIT_MASK || fault > DTC_DIGIT_MASK {
            return Err(invalid());
        }
        Ok(Self::new(system, group, fault))
    }
}

/// Decodes a DTC response payload into a list of DTCs.
///
/// The payload is read 2 bytes at a time, and a trailing odd byte is ignored.
/// A payload shorter than 2 bytes returns an empty list.
pub fn decode_dtcs(data: &[u8]) -> Vec<ObdDtc> {
    if data.len() < 2 {
        log::warn!(
            "DTC payload {:02X?} is too short to hold a trouble code ({} bytes)",
            data,
            data.len()
        );
        return Vec::new();
    }
    let mut dtcs = Vec::with_capacity(data.len() / 2); // Pre-allocate
    for pair in data.chunks_exact(2) {
        match ObdDtc::from_bytes(pair[0], pair[1]) {
            Some(dtc) => dtcs.push(dtc),
            None => {
                log::error!("DTC system index out of range for {pair:02X?}. Stopping");
                break;
            }
        }
    }
    dtcs
}

/// Decodes a DTC response payload into DTC strings such as `P0101`
pub fn decode_trouble_codes(data: &[u8]) -> Vec<String> {
    decode_dtcs(data).iter().map(|dtc| dtc.to_string()).collect()
}

/// Result of decoding a DTC service response
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TroubleCodeReport {
    /// Decoded trouble codes
    pub codes: Vec<String>,
    /// Malfunction indicator lamp state
    pub mil_active: bool,
    /// Number of DTCs reported by the ECU
    pub count: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn decode_pairs() {
        assert_eq!(
            vec!["P0100".to_string(), "P0200".to_string()],
            decode_trouble_codes(&[0x01, 0x00, 0x02, 0x00])
        );
    }

    #[test]
    fn system_from_top_bits() {
        assert_eq!(
            vec!["P0101", "C0101", "B0101", "U0101"],
            decode_trouble_codes(&[0x01, 0x01, 0x41, 0x01, 0x81, 0x01, 0xC1, 0x01])
        );
    }

    #[test]
    fn digits_are_padded() {
        assert_eq!(vec!["U6363"], decode_trouble_codes(&[0xFF, 0xFF]));
        assert_eq!(vec!["P0000"], decode_trouble_codes(&[0x00, 0x00]));
        assert_eq!(vec!["P1009"], decode_trouble_codes(&[0x0A, 0x09]));
    }

    #[test]
    fn second_byte_top_bits_are_ignored() {
        assert_eq!(decode_trouble_codes(&[0x01, 0x05]), decode_trouble_codes(&[0x01, 0xC5]));
    }

    #[test]
    fn short_payloads() {
        assert!(decode_trouble_codes(&[]).is_empty());
        assert!(decode_trouble_codes(&[0x01]).is_empty());
    }

    #[test]
    fn trailing_byte_ignored() {
        assert_eq!(vec!["P0102"], decode_trouble_codes(&[0x01, 0x02, 0x03]));
    }

    #[test]
    fn every_code_is_five_chars() {
        for first in 0..=u8::MAX {
            for second in [0x00, 0x09, 0x0A, 0x3F, 0xFF] {
                let codes = decode_trouble_codes(&[first, second]);
                assert_eq!(1, codes.len());
                assert_eq!(5, codes[0].len());
            }
        }
    }

    #[test]
    fn string_round_trip() {
        for system in DtcSystem::iter() {
            let dtc = ObdDtc::new(system, 21, 7);
            assert_eq!(dtc, dtc.to_string().parse::<ObdDtc>().unwrap());
            let raw = dtc.raw().to_be_bytes();
            assert_eq!(Some(dtc), ObdDtc::from_bytes(raw[0], raw[1]));
        }
    }

    #[test]
    fn parse_requires_plain_digits() {
        assert!("P+1+1".parse::<ObdDtc>().is_err());
        assert_eq!(Ok(ObdDtc::new(DtcSystem::Powertrain, 1, 1)), "P0101".parse::<ObdDtc>());
    }

    #[test]
    fn parse_rejects_garbage() {
        for s in [
            "", "P010", "X0101", "P0A01", "P6401", "P01011", "P01é", "P+1+1", "P0+01", "P-101",
        ] {
            assert!(s.parse::<ObdDtc>().is_err(), "{s}");
        }
    }
}
