//! Constants used across the badge core.
//!
//! This module gathers the protocol-wide and display-wide tunables: the
//! peer id space, radio framing, presence window, calibration sweep, and
//! the timing of blinks, boops and button presses.
//!
//! ## Key Concepts
//!
//! - **Ticks**: the system tick is 10 ms, so [`TICKS_PER_SECOND`] is 100.
//! - **Protocol interval**: beacons and presence aging happen once every
//!   [`BEACON_PERIOD_SECS`] seconds.
//! - **Peer ids**: `0..PEERS_IN_SYSTEM`, plus [`BADGE_ID_UNASSIGNED`] for a
//!   badge that was never provisioned.

/// Number of possible peer ids (`0..PEERS_IN_SYSTEM`).
pub const PEERS_IN_SYSTEM: u16 = 250;

/// See [`PEERS_IN_SYSTEM`].
pub const PEERS_IN_SYSTEM_USIZE: usize = PEERS_IN_SYSTEM as usize;

/// Id carried by a badge that has not been assigned one yet.
pub const BADGE_ID_UNASSIGNED: u16 = 250;

/// Bytes in the lifetime seen bitset (one bit per peer id).
pub const SEEN_BITSET_LEN_BYTES: usize = PEERS_IN_SYSTEM_USIZE / 8 + 1;

/// Radio protocol version carried in every packet.
pub const PROTO_VERSION: u8 = 1;

/// Seed of the packet checksum.
pub const CRC16_SEED: u16 = 0x9C8B;

/// Reserved destination address for broadcasts.
pub const BROADCAST_ADDRESS: u16 = 0xffff;

/// Largest payload the transceiver FIFO can hold.
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Number of protocol intervals a peer stays in range after its last beacon.
pub const PRESENCE_WINDOW_INTERVALS: u8 = 8;

/// Seconds between beacons (one protocol interval).
pub const BEACON_PERIOD_SECS: u32 = 8;

/// Hop budget given to a locally triggered boop.
pub const BOOP_HOPS: u8 = 10;

/// Seconds before the button may trigger another radio boop.
pub const BOOP_COOLDOWN_SECS: u8 = 2;

/// System ticks per second.
pub const TICKS_PER_SECOND: u8 = 100;

/// Ticks the eyes stay closed during a blink.
pub const BLINK_TICKS: u8 = 30;

/// Ticks the happy face stays up after a boop.
pub const BOOP_FACE_TICKS: u16 = 800;

/// Ticks a numeric readout stays up before the ambient face returns.
pub const NUMBER_TICKS: u16 = 300;

/// Ticks the button must be held to raise a long press.
pub const LONG_PRESS_TICKS: u16 = 150;

/// Consecutive long presses that make the next release restart calibration.
pub const RECALIBRATE_LONG_PRESSES: u8 = 9;

/// Average seconds between idle blinks.
pub const SECS_PER_BLINK_AVG: u8 = 5;

/// One in this many blinks becomes a random animation instead.
pub const ANIM_CHANCE_ONE_IN: u32 = 8;

/// One in this many animations also changes the ambient face.
pub const FACE_CHANCE_ONE_IN: u32 = 8;

/// First candidate radio channel of the calibration sweep.
pub const FREQ_MIN: u8 = 14;

/// Number of candidate radio channels.
pub const FREQ_NUM: usize = 6;

/// Seconds spent listening on each calibration candidate.
pub const CALIBRATION_SECS_PER_FREQ: u8 = 8;

/// Global LED brightness levels cycled by a long press.
pub const BRIGHTNESS_LEVELS: [u16; 3] = [0x00ff, 0x0900, 0xf000];

/// Brightness level selected at power-on.
pub const DEFAULT_BRIGHTNESS_LEVEL: usize = 1;

/// Scan speed for each number of badges in range (index), saturating at
/// the last entry. 0 turns scanning off; otherwise larger is slower.
pub const SCAN_SPEED_STEPS: [u16; 7] = [0, 96, 64, 48, 32, 24, 16];

/// Number of LED channels driven by the eyes (two eyes of eight segments).
pub const LED_CHANNELS: usize = 16;

/// Highest count the seen counter reaches.
pub const SEEN_COUNT_MAX: u8 = u8::MAX;
