//! Failure taxonomy of the badge core.
//!
//! None of these reach the main loop as errors. Packet and configuration
//! errors come out of the pure decoders and are dropped by their callers;
//! self-test errors become the boot status glyph.

use thiserror::Error;

/// Why a received buffer was not accepted as a [`Packet`](crate::packet::Packet).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PacketError {
    /// The buffer is not exactly one packet long.
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength {
        /// Fixed packet size.
        expected: usize,
        /// Size of the received buffer.
        actual: usize,
    },
    /// The peer id is neither a valid id nor the unassigned sentinel.
    #[error("peer id {0} is out of range")]
    PeerIdOutOfRange(u16),
    /// The trailing checksum does not match the packet contents.
    #[error("checksum mismatch")]
    BadChecksum,
}

/// Power-on self-test failures, in display priority order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum SelfTestError {
    /// The badge has not been provisioned with an id.
    #[error("badge has no id")]
    NoBadgeId,
    /// The transceiver did not answer its self-test.
    #[error("radio is not responding")]
    RadioNotResponding,
    /// The radio frequency has not been calibrated yet.
    #[error("radio frequency not calibrated")]
    FrequencyUncalibrated,
    /// The LED driver did not answer its self-test.
    #[error("LED driver is not responding")]
    LedDriverNotResponding,
}

impl SelfTestError {
    /// Glyph code shown on the eyes for this failure.
    pub const fn code(self) -> u8 {
        match self {
            SelfTestError::NoBadgeId => 1,
            SelfTestError::RadioNotResponding => 2,
            SelfTestError::FrequencyUncalibrated => 3,
            SelfTestError::LedDriverNotResponding => 4,
        }
    }
}

/// Why a durable configuration image could not be decoded.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ConfigError {
    /// The image is not exactly one configuration long.
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength {
        /// Fixed image size.
        expected: usize,
        /// Size of the supplied image.
        actual: usize,
    },
    /// The stored ambient face index is not in the face catalog.
    #[error("unknown ambient face {0}")]
    UnknownFace(u8),
}
