//! Who is around, and who has ever been around.
//!
//! [`PresenceTable`] keeps one countdown per peer id, measured in protocol
//! intervals. A countdown of zero means the peer is out of range.
//! [`SeenBitset`] is the durable, lifetime record: one bit per peer id plus
//! a saturating count.

use crate::consts::{PEERS_IN_SYSTEM_USIZE, PRESENCE_WINDOW_INTERVALS, SEEN_BITSET_LEN_BYTES, SEEN_COUNT_MAX};

/// Per-peer aging countdowns and the resulting in-range count.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PresenceTable {
    intervals_left: [u8; PEERS_IN_SYSTEM_USIZE],
    in_range: u8,
}

impl Default for PresenceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceTable {
    /// An empty table: nobody in range.
    pub const fn new() -> Self {
        PresenceTable {
            intervals_left: [0; PEERS_IN_SYSTEM_USIZE],
            in_range: 0,
        }
    }

    /// Number of peers with a nonzero countdown.
    pub fn in_range(&self) -> u8 {
        self.in_range
    }

    /// Remaining intervals for `id`; 0 for unknown or out-of-range ids.
    pub fn intervals_left(&self, id: u16) -> u8 {
        self.intervals_left.get(usize::from(id)).copied().unwrap_or(0)
    }

    /// Whether `id` is currently in range.
    pub fn contains(&self, id: u16) -> bool {
        self.intervals_left(id) != 0
    }

    /// Records a sighting of `id`, resetting its countdown to the full
    /// window regardless of its previous value.
    ///
    /// Returns `true` if the peer was not in range before.
    pub fn refresh(&mut self, id: u16) -> bool {
        let Some(left) = self.intervals_left.get_mut(usize::from(id)) else {
            return false;
        };
        let newly = *left == 0;
        *left = PRESENCE_WINDOW_INTERVALS;
        if newly {
            self.in_range = self.in_range.saturating_add(1);
            info!("peer {} in range ({} total)", id, self.in_range);
        }
        newly
    }

    /// Ages every entry by one interval.
    ///
    /// Returns `true` if at least one peer aged out.
    pub fn age(&mut self) -> bool {
        let mut changed = false;
        for (id, left) in self.intervals_left.iter_mut().enumerate() {
            if *left == 0 {
                continue;
            }
            *left -= 1;
            if *left == 0 {
                self.in_range = self.in_range.saturating_sub(1);
                changed = true;
                info!("peer {} out of range ({} total)", id, self.in_range);
            }
        }
        changed
    }
}

/// Lifetime record of every peer id ever seen.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct SeenBitset {
    bits: [u8; SEEN_BITSET_LEN_BYTES],
    count: u8,
}

impl SeenBitset {
    /// Nobody seen yet, count 0.
    pub const fn new() -> Self {
        SeenBitset {
            bits: [0; SEEN_BITSET_LEN_BYTES],
            count: 0,
        }
    }

    /// Rebuilds a bitset from its stored parts.
    pub const fn from_parts(bits: [u8; SEEN_BITSET_LEN_BYTES], count: u8) -> Self {
        SeenBitset { bits, count }
    }

    /// The raw bits, byte `id / 8`, bit `id % 8`.
    pub fn bits(&self) -> &[u8; SEEN_BITSET_LEN_BYTES] {
        &self.bits
    }

    /// Saturating count of peers seen.
    pub fn count(&self) -> u8 {
        self.count
    }

    fn locate(id: u16) -> Option<(usize, u8)> {
        let id = usize::from(id);
        if id >= SEEN_BITSET_LEN_BYTES * 8 {
            return None;
        }
        Some((id / 8, 1 << (id % 8)))
    }

    /// Whether the bit for `id` is set.
    pub fn contains(&self, id: u16) -> bool {
        Self::locate(id).is_some_and(|(byte, mask)| self.bits[byte] & mask != 0)
    }

    /// Sets the bit for `id`, counting it if it was not set.
    ///
    /// Returns `true` on a first sighting. The count saturates at
    /// [`SEEN_COUNT_MAX`].
    pub fn insert(&mut self, id: u16) -> bool {
        let Some((byte, mask)) = Self::locate(id) else {
            return false;
        };
        if self.bits[byte] & mask != 0 {
            return false;
        }
        self.bits[byte] |= mask;
        if self.count < SEEN_COUNT_MAX {
            self.count += 1;
        }
        true
    }

    /// Moves the bit for `old` to `new` without touching the count. Used
    /// when the badge's own id changes.
    pub fn rename(&mut self, old: u16, new: u16) {
        if let Some((byte, mask)) = Self::locate(old) {
            self.bits[byte] &= !mask;
        }
        if let Some((byte, mask)) = Self::locate(new) {
            self.bits[byte] |= mask;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_counts_once() {
        let mut table = PresenceTable::new();
        assert!(table.refresh(5));
        assert!(!table.refresh(5));
        assert_eq!(table.in_range(), 1);
        assert_eq!(table.intervals_left(5), PRESENCE_WINDOW_INTERVALS);
    }

    #[test]
    fn peer_ages_out_after_the_window() {
        let mut table = PresenceTable::new();
        assert!(table.refresh(5));
        for i in 1..PRESENCE_WINDOW_INTERVALS {
            assert!(!table.age());
            assert_eq!(table.intervals_left(5), PRESENCE_WINDOW_INTERVALS - i);
            assert!(table.contains(5));
        }
        assert!(table.age());
        assert_eq!(table.intervals_left(5), 0);
        assert_eq!(table.in_range(), 0);
        assert!(!table.age());
    }

    #[test]
    fn fresh_beacon_resets_the_countdown() {
        let mut table = PresenceTable::new();
        assert!(table.refresh(9));
        for _ in 0..PRESENCE_WINDOW_INTERVALS - 1 {
            let _ = table.age();
        }
        assert_eq!(table.intervals_left(9), 1);
        assert!(!table.refresh(9));
        assert_eq!(table.intervals_left(9), PRESENCE_WINDOW_INTERVALS);
        assert_eq!(table.in_range(), 1);
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        let mut table = PresenceTable::new();
        assert!(!table.refresh(crate::consts::PEERS_IN_SYSTEM));
        assert!(!table.refresh(u16::MAX));
        assert_eq!(table.in_range(), 0);
        assert_eq!(table.intervals_left(u16::MAX), 0);
    }

    #[test]
    fn several_peers_age_independently() {
        let mut table = PresenceTable::new();
        assert!(table.refresh(1));
        let _ = table.age();
        assert!(table.refresh(2));
        assert_eq!(table.in_range(), 2);
        for _ in 0..PRESENCE_WINDOW_INTERVALS - 1 {
            let _ = table.age();
        }
        assert!(!table.contains(1));
        assert!(table.contains(2));
        assert_eq!(table.in_range(), 1);
    }

    #[test]
    fn seen_bits_are_append_only() {
        let mut seen = SeenBitset::new();
        assert!(seen.insert(0));
        assert!(seen.insert(249));
        assert!(!seen.insert(249));
        assert!(seen.contains(249));
        assert!(!seen.contains(248));
        assert_eq!(seen.count(), 2);
        assert_eq!(seen.bits()[31], 1 << 1);
    }

    #[test]
    fn seen_count_saturates() {
        let mut seen = SeenBitset::from_parts([0; SEEN_BITSET_LEN_BYTES], SEEN_COUNT_MAX - 1);
        assert!(seen.insert(3));
        assert!(seen.insert(4));
        assert_eq!(seen.count(), SEEN_COUNT_MAX);
    }

    #[test]
    fn rename_moves_the_bit_only() {
        let mut seen = SeenBitset::new();
        assert!(seen.insert(250));
        seen.rename(250, 17);
        assert!(!seen.contains(250));
        assert!(seen.contains(17));
        assert_eq!(seen.count(), 1);
    }
}
