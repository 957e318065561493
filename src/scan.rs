//! Scan-dot crossfade.
//!
//! The center dots of the two eyes trade a single point of light back and
//! forth: the active dot fades down, and once it is below a quarter of full
//! brightness the other dot fades up. When the rising dot is (nearly) full
//! the roles swap. The speed encodes how many badges are nearby.
//!
//! The effect is independent of whatever the eyes are showing; a dot that
//! the current eye shape lights explicitly overrides its scan level.

use crate::consts::SCAN_SPEED_STEPS;

/// Maps a number of badges in range to a scan speed. 0 means off; otherwise
/// larger numbers are slower.
pub fn scan_speed_for(in_range: u8) -> u16 {
    let step = usize::from(in_range).min(SCAN_SPEED_STEPS.len() - 1);
    SCAN_SPEED_STEPS[step]
}

/// Two-point brightness crossfade state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ScanDots {
    /// Current level of each eye's dot.
    levels: [u16; 2],
    /// Which dot is lit and fading out.
    active: usize,
    /// 0 is off; otherwise ticks-ish per sweep, larger is slower.
    speed: u16,
}

impl ScanDots {
    /// A stopped scanner with both dots dark.
    pub const fn new() -> Self {
        ScanDots {
            levels: [0, 0],
            active: 0,
            speed: 0,
        }
    }

    /// Whether the crossfade is running.
    pub fn enabled(&self) -> bool {
        self.speed != 0
    }

    /// The current speed setting.
    pub fn speed(&self) -> u16 {
        self.speed
    }

    /// Changes the speed. Turning the scanner off darkens both dots.
    pub fn set_speed(&mut self, speed: u16) {
        self.speed = speed;
        if speed == 0 {
            self.levels = [0, 0];
        }
    }

    /// The scan level of dot `eye` (0 or 1).
    pub fn level(&self, eye: usize) -> u16 {
        self.levels[eye & 1]
    }

    /// Which dot is currently fading out.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Advances the crossfade by one tick at the given global brightness.
    ///
    /// Returns `true` when the dot levels may have changed.
    pub fn update(&mut self, brightness: u16) -> bool {
        if self.speed == 0 {
            return false;
        }
        let step = brightness / self.speed;
        let active = self.active;
        let other = active ^ 1;

        self.levels[active] = self.levels[active].saturating_sub(step);

        // The rising dot waits until the falling one is mostly out.
        if self.levels[active] < brightness / 4 {
            if brightness.saturating_sub(self.speed) <= self.levels[other] {
                self.active = other;
                self.levels[other] = brightness;
            } else {
                self.levels[other] = self.levels[other].saturating_add(step).min(brightness);
            }
        }
        true
    }
}
