//! Durable badge configuration.
//!
//! [`BadgeConfig`] is everything that survives a power cycle: the badge id,
//! who it has ever seen, whether first-time setup is complete, the
//! calibrated radio channel and the chosen idle face.
//!
//! The live copy sits in non-volatile memory that is write protected
//! outside of an explicit bracket. [`Persistent`] owns the copy together
//! with a [`WriteGuard`] and funnels every mutation through
//! [`Persistent::update`], which runs inside a critical section between
//! [`WriteGuard::acquire_write`] and [`WriteGuard::release_write`].
//!
//! ## Image layout
//!
//! The factory image written by the provisioning tool is little endian:
//!
//! | Offset | Size | Field            |
//! |--------|------|------------------|
//! | 0      | 2    | `badge_id`       |
//! | 2      | 32   | seen bitset      |
//! | 34     | 1    | seen count       |
//! | 35     | 1    | `bootstrapped`   |
//! | 36     | 1    | `frequency`      |
//! | 37     | 1    | `frequency_done` |
//! | 38     | 1    | `ambient_face`   |

use crate::consts::{BADGE_ID_UNASSIGNED, FREQ_MIN, SEEN_BITSET_LEN_BYTES};
use crate::error::ConfigError;
use crate::eyes::Face;
use crate::presence::SeenBitset;

/// Size of a configuration image.
pub const CONFIG_IMAGE_LEN: usize = 2 + SEEN_BITSET_LEN_BYTES + 5;

const SEEN_AT: usize = 2;
const COUNT_AT: usize = SEEN_AT + SEEN_BITSET_LEN_BYTES;
const BOOTSTRAPPED_AT: usize = COUNT_AT + 1;
const FREQUENCY_AT: usize = BOOTSTRAPPED_AT + 1;
const FREQUENCY_DONE_AT: usize = FREQUENCY_AT + 1;
const FACE_AT: usize = FREQUENCY_DONE_AT + 1;

/// The persistent badge configuration.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct BadgeConfig {
    /// This badge's id, or [`BADGE_ID_UNASSIGNED`].
    pub badge_id: u16,
    /// Every peer ever seen, including this badge itself.
    pub seen: SeenBitset,
    /// First-time setup is complete; the game may run.
    pub bootstrapped: bool,
    /// Radio channel, final once `frequency_done` is set.
    pub frequency: u8,
    /// Channel calibration has finished.
    pub frequency_done: bool,
    /// Idle face.
    pub ambient_face: Face,
}

impl Default for BadgeConfig {
    /// An unprovisioned badge. It has seen one badge: itself.
    fn default() -> Self {
        BadgeConfig {
            badge_id: BADGE_ID_UNASSIGNED,
            seen: SeenBitset::from_parts([0; SEEN_BITSET_LEN_BYTES], 1),
            bootstrapped: false,
            frequency: FREQ_MIN,
            frequency_done: false,
            ambient_face: Face::Normal,
        }
    }
}

impl BadgeConfig {
    /// The factory configuration for badge `id`.
    pub fn provisioned(id: u16) -> Self {
        let mut config = BadgeConfig {
            badge_id: id,
            ..Default::default()
        };
        config.seen.rename(BADGE_ID_UNASSIGNED, id);
        config
    }

    /// Serializes the configuration into its image layout.
    pub fn to_image(&self) -> [u8; CONFIG_IMAGE_LEN] {
        let mut image = [0u8; CONFIG_IMAGE_LEN];
        image[..SEEN_AT].copy_from_slice(&self.badge_id.to_le_bytes());
        image[SEEN_AT..COUNT_AT].copy_from_slice(self.seen.bits());
        image[COUNT_AT] = self.seen.count();
        image[BOOTSTRAPPED_AT] = u8::from(self.bootstrapped);
        image[FREQUENCY_AT] = self.frequency;
        image[FREQUENCY_DONE_AT] = u8::from(self.frequency_done);
        image[FACE_AT] = self.ambient_face.index();
        image
    }

    /// Parses an image. Any nonzero flag byte reads as set.
    pub fn from_image(image: &[u8]) -> Result<Self, ConfigError> {
        if image.len() != CONFIG_IMAGE_LEN {
            return Err(ConfigError::WrongLength {
                expected: CONFIG_IMAGE_LEN,
                actual: image.len(),
            });
        }
        let ambient_face = Face::from_index(image[FACE_AT]).ok_or(ConfigError::UnknownFace(image[FACE_AT]))?;
        let mut bits = [0u8; SEEN_BITSET_LEN_BYTES];
        bits.copy_from_slice(&image[SEEN_AT..COUNT_AT]);
        Ok(BadgeConfig {
            badge_id: u16::from_le_bytes([image[0], image[1]]),
            seen: SeenBitset::from_parts(bits, image[COUNT_AT]),
            bootstrapped: image[BOOTSTRAPPED_AT] != 0,
            frequency: image[FREQUENCY_AT],
            frequency_done: image[FREQUENCY_DONE_AT] != 0,
            ambient_face,
        })
    }
}

/// Write protection bracket around the non-volatile configuration.
pub trait WriteGuard {
    /// Lifts write protection.
    fn acquire_write(&mut self);
    /// Restores write protection.
    fn release_write(&mut self);
    /// Called with the new image while writes are allowed. Memory-mapped
    /// storage needs nothing here.
    fn store(&mut self, _image: &[u8; CONFIG_IMAGE_LEN]) {}
}

/// A [`BadgeConfig`] that is only ever written inside the write bracket.
#[derive(Debug)]
pub struct Persistent<S>
where
    S: WriteGuard,
{
    config: BadgeConfig,
    storage: S,
}

impl<S> Persistent<S>
where
    S: WriteGuard,
{
    /// Wraps a configuration loaded from `storage`.
    pub fn new(config: BadgeConfig, storage: S) -> Self {
        Persistent { config, storage }
    }

    /// The current configuration.
    pub fn config(&self) -> &BadgeConfig {
        &self.config
    }

    /// The storage guard.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Applies `f` to the configuration with interrupts masked and write
    /// protection lifted.
    pub fn update<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut BadgeConfig) -> R,
    {
        critical_section::with(|_| {
            self.storage.acquire_write();
            let result = f(&mut self.config);
            self.storage.store(&self.config.to_image());
            self.storage.release_write();
            result
        })
    }

    /// Records `id` as seen. Returns `true` the first time.
    ///
    /// Nothing is written for a peer that was already seen.
    pub fn mark_seen(&mut self, id: u16) -> bool {
        if self.config.seen.contains(id) {
            return false;
        }
        self.update(|config| config.seen.insert(id))
    }

    /// Changes the badge id, moving its own seen bit along.
    pub fn set_id(&mut self, id: u16) {
        self.update(|config| {
            let old = config.badge_id;
            config.badge_id = id;
            config.seen.rename(old, id);
        });
    }

    /// Stores a new idle face.
    pub fn set_ambient_face(&mut self, face: Face) {
        self.update(|config| config.ambient_face = face);
    }

    /// Stores the radio channel and whether it is final.
    pub fn set_frequency(&mut self, frequency: u8, done: bool) {
        self.update(|config| {
            config.frequency = frequency;
            config.frequency_done = done;
        });
    }

    /// Marks first-time setup as complete.
    pub fn set_bootstrapped(&mut self) {
        self.update(|config| config.bootstrapped = true);
    }
}
