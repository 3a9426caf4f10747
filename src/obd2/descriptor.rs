//! Per-service decoding of a complete OBD2 response

use crate::dtc::{ObdDtc, TroubleCodeReport, decode_dtcs};
use crate::obd2::calculator::{calc_mil_active, try_calc_mil_active};
use crate::obd2::{DataPid, ObdValue};
use crate::{DecodeError, DecodeResult, DecoderSettings};

/// Service 01 - Show current data
pub const SERVICE_CURRENT_DATA: u8 = 0x01;
/// Service 02 - Show freeze frame data
pub const SERVICE_FREEZE_FRAME: u8 = 0x02;
/// Service 03 - Show stored DTCs
pub const SERVICE_STORED_DTCS: u8 = 0x03;
/// Service 07 - Show pending DTCs
pub const SERVICE_PENDING_DTCS: u8 = 0x07;
/// Service 0A - Show permanent DTCs
pub const SERVICE_PERMANENT_DTCS: u8 = 0x0A;

/// Strips the positive response bit, so both `0x43` and `0x03` map to service 03
fn request_sid(mode: u8) -> u8 {
    mode & !0x40
}

/// A single OBD2 response, as split up by the adapter layer
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ObdResponse<'a> {
    /// Service of the response. Either the request SID or the positive response SID
    pub mode: u8,
    /// PID byte. For the DTC services, this is the DTC count
    pub pid: u8,
    /// Payload after the service and PID bytes
    pub data: &'a [u8],
    /// The complete response, as received
    pub raw: &'a [u8],
}

impl<'a> ObdResponse<'a> {
    /// Creates a new response view
    pub fn new(mode: u8, pid: u8, data: &'a [u8], raw: &'a [u8]) -> Self {
        Self {
            mode,
            pid,
            data,
            raw,
        }
    }
}

/// Output of a [Descriptor]
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResult {
    /// Values of a data PID
    Values(Vec<ObdValue>),
    /// Trouble codes of a DTC service
    TroubleCodes(TroubleCodeReport),
}

/// Decodes responses of one OBD2 service
pub trait Descriptor {
    /// Service this descriptor decodes
    fn mode(&self) -> u8;

    /// Decodes the response
    fn decode(&self, settings: &DecoderSettings) -> DecodeResult<DecodedResult>;
}

fn check_mode(response: &ObdResponse<'_>, accepted: &[u8]) -> DecodeResult<()> {
    let sid = request_sid(response.mode);
    if accepted.contains(&sid) {
        Ok(())
    } else {
        log::error!("Service 0x{sid:02X} cannot be decoded as any of {accepted:02X?}");
        Err(DecodeError::WrongMode {
            expected: accepted[0],
            received: sid,
        })
    }
}

/// Descriptor for service 01 and 02 data PID responses
#[derive(Debug, Copy, Clone)]
pub struct Mode01Descriptor<'a> {
    response: ObdResponse<'a>,
}

impl<'a> Mode01Descriptor<'a> {
    /// Creates the descriptor. Returns [DecodeError::WrongMode] if the
    /// response is not for service 01 or 02
    pub fn new(response: ObdResponse<'a>) -> DecodeResult<Self> {
        check_mode(&response, &[SERVICE_CURRENT_DATA, SERVICE_FREEZE_FRAME])?;
        Ok(Self { response })
    }

    /// PID the response is for
    pub fn pid(&self) -> DataPid {
        DataPid::from(self.response.pid)
    }

    /// Decodes the PID data into named values
    pub fn values(&self, settings: &DecoderSettings) -> DecodeResult<Vec<ObdValue>> {
        self.pid().decode(self.response.data, settings)
    }
}

impl Descriptor for Mode01Descriptor<'_> {
    fn mode(&self) -> u8 {
        request_sid(self.response.mode)
    }

    fn decode(&self, settings: &DecoderSettings) -> DecodeResult<DecodedResult> {
        self.values(settings).map(DecodedResult::Values)
    }
}

/// Descriptor for service 03, 07 and 0A DTC responses
///
/// ```text
/// 43 06 01 00 02 00
///    ^^ DTC count
///       ^^^^^ ^^^^^ DTCs
/// ```
#[derive(Debug, Copy, Clone)]
pub struct Mode03Descriptor<'a> {
    response: ObdResponse<'a>,
}

impl<'a> Mode03Descriptor<'a> {
    /// Creates the descriptor. Returns [DecodeError::WrongMode] if the
    /// response is not for one of the DTC services
    pub fn new(response: ObdResponse<'a>) -> DecodeResult<Self> {
        check_mode(
            &response,
            &[
                SERVICE_STORED_DTCS,
                SERVICE_PENDING_DTCS,
                SERVICE_PERMANENT_DTCS,
            ],
        )?;
        Ok(Self { response })
    }

    /// Returns the DTCs of the response
    pub fn dtcs(&self) -> Vec<ObdDtc> {
        decode_dtcs(self.response.data)
    }

    /// Returns the DTCs of the response as strings
    pub fn trouble_codes(&self) -> Vec<String> {
        self.dtcs().iter().map(|dtc| dtc.to_string()).collect()
    }

    /// Returns the MIL bit of the first byte of the raw response
    pub fn is_mil_active(&self) -> bool {
        calc_mil_active(self.response.raw)
    }

    /// Returns the DTC count reported by the ECU
    pub fn trouble_code_count(&self) -> u8 {
        self.response.pid
    }

    /// Returns codes, MIL state and count together
    pub fn report(&self) -> TroubleCodeReport {
        TroubleCodeReport {
            codes: self.trouble_codes(),
            mil_active: self.is_mil_active(),
            count: self.trouble_code_count(),
        }
    }
}

impl Descriptor for Mode03Descriptor<'_> {
    fn mode(&self) -> u8 {
        request_sid(self.response.mode)
    }

    fn decode(&self, settings: &DecoderSettings) -> DecodeResult<DecodedResult> {
        if settings.strict {
            try_calc_mil_active(self.response.raw)?;
        }
        Ok(DecodedResult::TroubleCodes(self.report()))
    }
}

/// Picks the descriptor matching the service of `response`
pub fn descriptor_for<'a>(response: ObdResponse<'a>) -> DecodeResult<Box<dyn Descriptor + 'a>> {
    match request_sid(response.mode) {
        SERVICE_CURRENT_DATA | SERVICE_FREEZE_FRAME => {
            Ok(Box::new(Mode01Descriptor::new(response)?))
        }
        _ => Ok(Box::new(Mode03Descriptor::new(response)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obd2::ObdUnitType;

    #[test]
    fn mode03_report() {
        let raw = [0x43, 0x02, 0x01, 0x00, 0x02, 0x00];
        let d = Mode03Descriptor::new(ObdResponse::new(0x43, raw[1], &raw[2..], &raw)).unwrap();
        assert_eq!(
            TroubleCodeReport {
                codes: vec!["P0100".into(), "P0200".into()],
                mil_active: false,
                count: 2,
            },
            d.report()
        );
        assert_eq!(SERVICE_STORED_DTCS, d.mode());
    }

    #[test]
    fn mil_comes_from_raw_leading_byte() {
        let raw = [0x81, 0x01, 0x01, 0x00];
        let d = Mode03Descriptor::new(ObdResponse::new(0x03, 0x01, &raw[2..], &raw)).unwrap();
        assert!(d.is_mil_active());
        // DTC pairs do not affect the MIL
        let raw = [0x43, 0x01, 0x81, 0x00];
        let d = Mode03Descriptor::new(ObdResponse::new(0x03, 0x01, &raw[2..], &raw)).unwrap();
        assert!(!d.is_mil_active());
        assert_eq!(vec!["B0100"], d.trouble_codes());
    }

    #[test]
    fn count_is_not_recomputed() {
        let raw = [0x47, 0x05, 0x01, 0x00];
        let d = Mode03Descriptor::new(ObdResponse::new(0x47, 0x05, &raw[2..], &raw)).unwrap();
        assert_eq!(5, d.trouble_code_count());
        assert_eq!(1, d.dtcs().len());
    }

    #[test]
    fn strict_dtc_decode_needs_raw_bytes() {
        let d = Mode03Descriptor::new(ObdResponse::new(0x43, 0x00, &[], &[])).unwrap();
        assert_eq!(
            Err(DecodeError::InsufficientData {
                required: 1,
                received: 0
            }),
            d.decode(&DecoderSettings::default().strict())
        );
        assert_eq!(
            Ok(DecodedResult::TroubleCodes(TroubleCodeReport::default())),
            d.decode(&DecoderSettings::default())
        );

        let raw = [0x43, 0x00];
        let d = Mode03Descriptor::new(ObdResponse::new(0x43, 0x00, &raw[2..], &raw)).unwrap();
        assert!(d.decode(&DecoderSettings::default().strict()).is_ok());
    }

    #[test]
    fn wrong_mode() {
        let raw = [0x41, 0x0C, 0x0A, 0x14];
        let r = ObdResponse::new(0x41, 0x0C, &raw[2..], &raw);
        assert_eq!(
            Some(DecodeError::WrongMode {
                expected: SERVICE_STORED_DTCS,
                received: SERVICE_CURRENT_DATA
            }),
            Mode03Descriptor::new(r).err()
        );
        assert!(Mode01Descriptor::new(ObdResponse::new(0x43, 0x00, &[], &[])).is_err());
    }

    #[test]
    fn dispatch() {
        let settings = DecoderSettings::default();
        let raw = [0x41, 0x0C, 0x0A, 0x14];
        let d = descriptor_for(ObdResponse::new(0x41, 0x0C, &raw[2..], &raw)).unwrap();
        assert_eq!(SERVICE_CURRENT_DATA, d.mode());
        match d.decode(&settings).unwrap() {
            DecodedResult::Values(v) => assert_eq!(ObdUnitType::Rpm(645.0), v[0].get_value()),
            other => panic!("unexpected {other:?}"),
        }

        let raw = [0x43, 0x00];
        let d = descriptor_for(ObdResponse::new(0x43, 0x00, &raw[2..], &raw)).unwrap();
        assert_eq!(
            DecodedResult::TroubleCodes(TroubleCodeReport::default()),
            d.decode(&settings).unwrap()
        );

        assert!(descriptor_for(ObdResponse::new(0x09, 0x02, &[], &[])).is_err());
    }
}
