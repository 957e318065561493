//! Radio packet layout and validation.
//!
//! Every transmission is exactly one fixed-size packet:
//!
//! | Offset | Size | Field           |
//! |--------|------|-----------------|
//! | 0      | 2    | `peer_id` (LE)  |
//! | 2      | 1    | `proto_version` |
//! | 3      | 1    | `msg_type`      |
//! | 4      | 1    | `msg_payload`   |
//! | 5      | 2    | `checksum` (LE) |
//!
//! The checksum covers bytes `0..5` and is seeded with
//! [`CRC16_SEED`](crate::consts::CRC16_SEED).

use crate::consts::{BADGE_ID_UNASSIGNED, PEERS_IN_SYSTEM, PROTO_VERSION};
use crate::crc;
use crate::error::PacketError;

/// Size of an encoded packet.
pub const PACKET_LEN: usize = 7;

/// Bytes covered by the checksum.
const BODY_LEN: usize = PACKET_LEN - 2;

/// Message opcodes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum MsgType {
    /// Periodic presence announcement.
    Beacon,
    /// Flooded greeting; the payload is the remaining hop count.
    Boop,
    /// Reserved acknowledgment opcode.
    Ack,
    /// Any opcode this badge does not know.
    Unknown(u8),
}

impl From<u8> for MsgType {
    fn from(value: u8) -> Self {
        match value {
            1 => MsgType::Beacon,
            2 => MsgType::Boop,
            3 => MsgType::Ack,
            other => MsgType::Unknown(other),
        }
    }
}

impl From<MsgType> for u8 {
    fn from(value: MsgType) -> Self {
        match value {
            MsgType::Beacon => 1,
            MsgType::Boop => 2,
            MsgType::Ack => 3,
            MsgType::Unknown(other) => other,
        }
    }
}

/// One radio message.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Packet {
    /// Sender id (or, for relayed boops, the originator's id).
    pub peer_id: u16,
    /// Protocol version.
    pub proto_version: u8,
    /// Opcode.
    pub msg_type: MsgType,
    /// One-byte argument: hop count for boops, 0 otherwise.
    pub msg_payload: u8,
}

impl Packet {
    /// A beacon announcing `peer_id`.
    pub const fn beacon(peer_id: u16) -> Self {
        Packet {
            peer_id,
            proto_version: PROTO_VERSION,
            msg_type: MsgType::Beacon,
            msg_payload: 0,
        }
    }

    /// A boop from `peer_id` with `hops` relays left.
    pub const fn boop(peer_id: u16, hops: u8) -> Self {
        Packet {
            peer_id,
            proto_version: PROTO_VERSION,
            msg_type: MsgType::Boop,
            msg_payload: hops,
        }
    }

    /// Serializes the packet and appends its checksum.
    pub fn encode(&self) -> [u8; PACKET_LEN] {
        let mut buf = [0u8; PACKET_LEN];
        buf[0..2].copy_from_slice(&self.peer_id.to_le_bytes());
        buf[2] = self.proto_version;
        buf[3] = self.msg_type.into();
        buf[4] = self.msg_payload;
        crc::append(&mut buf, BODY_LEN);
        buf
    }

    /// Validates and parses a received buffer.
    ///
    /// Rejects buffers of the wrong size, peer ids outside the id space
    /// (other than the unassigned sentinel), and checksum mismatches.
    pub fn decode(buf: &[u8]) -> Result<Packet, PacketError> {
        if buf.len() != PACKET_LEN {
            return Err(PacketError::WrongLength {
                expected: PACKET_LEN,
                actual: buf.len(),
            });
        }
        let peer_id = u16::from_le_bytes([buf[0], buf[1]]);
        if peer_id >= PEERS_IN_SYSTEM && peer_id != BADGE_ID_UNASSIGNED {
            return Err(PacketError::PeerIdOutOfRange(peer_id));
        }
        if !crc::check(buf, BODY_LEN) {
            return Err(PacketError::BadChecksum);
        }
        Ok(Packet {
            peer_id,
            proto_version: buf[2],
            msg_type: MsgType::from(buf[3]),
            msg_payload: buf[4],
        })
    }
}
