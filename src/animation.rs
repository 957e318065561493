//! The static animation catalog.
//!
//! An [`Animation`] is a non-empty list of [`Frame`]s plus a loop count.
//! Animations are never mutated; the engine in [`crate::leds`] only keeps a
//! `&'static` reference and a cursor into one.

use crate::eyes::{EyePair, EyeState};

/// One step of a scripted animation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Frame {
    /// What both eyes show during this frame.
    pub eyes: EyePair,
    /// How many ticks the frame is shown for. Never zero.
    pub duration: u8,
}

impl Frame {
    /// Builds a frame; a zero duration is bumped to one tick.
    pub const fn new(left: EyeState, right: EyeState, duration: u8) -> Self {
        Frame {
            eyes: EyePair::new(left, right),
            duration: if duration == 0 { 1 } else { duration },
        }
    }
}

/// A named sequence of frames.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Animation {
    frames: &'static [Frame],
    loops: u8,
}

impl Animation {
    /// Builds an animation that plays `frames` once plus `loops` repeats.
    ///
    /// # Panics
    /// Panics if `frames` is empty. In a `static` this is a build error.
    pub const fn new(frames: &'static [Frame], loops: u8) -> Self {
        assert!(!frames.is_empty(), "animation needs at least one frame");
        Animation { frames, loops }
    }

    /// Frames in play order. Never empty.
    pub const fn frames(&self) -> &'static [Frame] {
        self.frames
    }

    /// Additional full cycles after the first play. 0 plays once.
    pub const fn loops(&self) -> u8 {
        self.loops
    }

    /// Total ticks one full play of the animation takes, loops included.
    pub fn total_ticks(&self) -> u32 {
        let once: u32 = self.frames.iter().map(|f| u32::from(f.duration)).sum();
        once * (u32::from(self.loops) + 1)
    }
}

const fn both(eye: EyeState, duration: u8) -> Frame {
    Frame::new(eye, eye, duration)
}

static SHIFTY_FRAMES: [Frame; 2] = [
    both(EyeState::CIRCLE_LEFT, 20),
    both(EyeState::CIRCLE_RIGHT, 20),
];

static LOOK_AROUND_FRAMES: [Frame; 4] = [
    both(EyeState::SIDE_LEFT, 40),
    both(EyeState::CIRCLE_BIG, 15),
    both(EyeState::SIDE_RIGHT, 40),
    both(EyeState::CIRCLE_BIG, 15),
];

static WINK_FRAMES: [Frame; 2] = [
    Frame::new(EyeState::CIRCLE_RIGHT, EyeState::BLINK_LEFT, 40),
    Frame::new(EyeState::CIRCLE_RIGHT, EyeState::CIRCLE_LEFT, 20),
];

static SURPRISE_FRAMES: [Frame; 3] = [
    both(EyeState::CIRCLE_BIG, 60),
    both(EyeState::CIRCLE_BIG.with_dot(), 60),
    both(EyeState::CIRCLE_BIG, 30),
];

static DIZZY_FRAMES: [Frame; 4] = [
    both(EyeState::from_bits(EyeState::TL | EyeState::TR), 8),
    both(EyeState::from_bits(EyeState::R | EyeState::L), 8),
    both(EyeState::from_bits(EyeState::BR | EyeState::BL), 8),
    both(EyeState::BLINK_MIDDLE, 8),
];

static NEW_BADGE_FRAMES: [Frame; 2] = [
    both(EyeState::HAPPY_BIG, 25),
    both(EyeState::HAPPY_BIG.with_dot(), 25),
];

static OLD_BADGE_FRAMES: [Frame; 2] = [
    Frame::new(EyeState::HAPPY_LEFT, EyeState::HAPPY_RIGHT, 80),
    Frame::new(EyeState::HAPPY_LEFT, EyeState::BLINK_LEFT, 30),
];

/// Eyes darting left and right.
pub static SHIFTY: Animation = Animation::new(&SHIFTY_FRAMES, 3);

/// A slow look to each side.
pub static LOOK_AROUND: Animation = Animation::new(&LOOK_AROUND_FRAMES, 0);

/// A single wink.
pub static WINK: Animation = Animation::new(&WINK_FRAMES, 0);

/// Wide eyes with a flash of pupil.
pub static SURPRISE: Animation = Animation::new(&SURPRISE_FRAMES, 0);

/// A spinning segment.
pub static DIZZY: Animation = Animation::new(&DIZZY_FRAMES, 5);

/// Shown when a never-before-seen badge comes into range.
pub static NEW_BADGE: Animation = Animation::new(&NEW_BADGE_FRAMES, 3);

/// Shown when a previously seen badge comes back into range.
pub static OLD_BADGE: Animation = Animation::new(&OLD_BADGE_FRAMES, 0);

/// Animations eligible for the idle random pick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum AnimationId {
    /// See [`SHIFTY`].
    Shifty,
    /// See [`LOOK_AROUND`].
    LookAround,
    /// See [`WINK`].
    Wink,
    /// See [`SURPRISE`].
    Surprise,
    /// See [`DIZZY`].
    Dizzy,
}

impl AnimationId {
    /// Every catalog entry.
    pub const ALL: [AnimationId; 5] = [
        AnimationId::Shifty,
        AnimationId::LookAround,
        AnimationId::Wink,
        AnimationId::Surprise,
        AnimationId::Dizzy,
    ];

    /// The animation this id names.
    pub fn animation(self) -> &'static Animation {
        match self {
            AnimationId::Shifty => &SHIFTY,
            AnimationId::LookAround => &LOOK_AROUND,
            AnimationId::Wink => &WINK,
            AnimationId::Surprise => &SURPRISE,
            AnimationId::Dizzy => &DIZZY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_well_formed() {
        for id in AnimationId::ALL {
            let anim = id.animation();
            assert!(!anim.frames.is_empty(), "{:?} has no frames", id);
            assert!(anim.frames.iter().all(|f| f.duration > 0));
        }
        for anim in [&NEW_BADGE, &OLD_BADGE] {
            assert!(!anim.frames.is_empty());
        }
    }

    #[test]
    #[should_panic(expected = "at least one frame")]
    fn empty_animations_are_rejected() {
        let _ = Animation::new(&[], 0);
    }

    #[test]
    fn zero_duration_frames_are_bumped() {
        assert_eq!(Frame::new(EyeState::OFF, EyeState::OFF, 0).duration, 1);
    }

    #[test]
    fn total_ticks_counts_loops() {
        assert_eq!(SHIFTY.total_ticks(), 40 * 4);
        assert_eq!(WINK.total_ticks(), 60);
    }
}
