#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    clippy::uninlined_format_args
)]

//! A crate which decodes raw OBD2 response payloads into calibrated physical values,
//! and unpacks stored trouble code responses into standard alphanumeric DTCs.
//!
//! ## Signal decoding
//!
//! ### PID calculator
//! SAE J1979 defines a byte-to-value formula for every service 01/02 data PID. The
//! [obd2::calculator] module provides each formula family as a free function over the
//! raw data bytes (Everything after the service and PID bytes of the ECU response).
//!
//! Each formula comes in two flavours:
//! * `try_calc_*` - Returns [DecodeError::InsufficientData] if the payload is too short
//! * `calc_*` - Returns `0.0` (Or `false`) if the payload is too short
//!
//! ### Unit conversion
//! Decoded values are metric. [obd2::units] converts them to imperial units, either through
//! the plain `convert_*` functions or the typed wrappers ([obd2::Speed], [obd2::Temperature], ...)
//!
//! ### Trouble codes
//! [dtc] decodes service 03 (Also 07 and 0A) payloads into codes such as `P0101`, and
//! [obd2::Mode03Descriptor] reports the MIL state and DTC count alongside them.
//!
//! ## Transport
//!
//! This crate does not talk to a vehicle. Bytes are expected to come from an adapter layer
//! (ELM327, J2534, SocketCAN ISO-TP...) which has already reassembled the full response.
//! Every function in this crate is pure and can be called from any thread.

pub mod dtc;
pub mod obd2;
pub mod settings;

pub use settings::{DecoderSettings, UnitSystem};

/// Decoder result
pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
/// Decoder error
pub enum DecodeError {
    /// The payload is shorter than the formula requires
    #[error("Payload too short. Formula requires {required} bytes, but only {received} were provided")]
    InsufficientData {
        /// Number of bytes the formula reads
        required: usize,
        /// Number of bytes that were provided
        received: usize,
    },
    /// No formula is known for the requested PID
    #[error("No decoding formula for PID 0x{0:02X}")]
    UnsupportedPid(u8),
    /// A descriptor was built from a response of another service
    #[error("Expected a response to service 0x{expected:02X}, but got service 0x{received:02X}")]
    WrongMode {
        /// Service the descriptor decodes
        expected: u8,
        /// Service of the response
        received: u8,
    },
    /// A DTC string could not be parsed
    #[error("Invalid DTC '{0}'")]
    InvalidDtc(String),
}
