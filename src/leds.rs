//! Eye animation engine.
//!
//! This module provides the [`EyeEngine`], a tick-driven state machine that
//! decides what the two eyes show and pushes the result into a 16-channel
//! LED driver through the [`LedDriver`] trait.
//!
//! The engine must be ticked at a fixed rate (nominally every 10 ms) via
//! [`EyeEngine::tick`]. Each tick, in priority order:
//!
//! 1. the scan dots crossfade (see [`crate::scan`]), whenever scanning is on;
//! 2. an in-progress blink counts down, reopening into either the queued
//!    animation frame or the idle face;
//! 3. otherwise an active animation advances through its frames and loops;
//! 4. otherwise a temporary idle override counts down and reverts to the
//!    permanent ambient [`Face`].
//!
//! The driver is committed whenever anything visible changed.
//!
//! ## Example
//!
//! ```rust
//! use booper::leds::{EyeEngine, LedDriver};
//! use booper::consts::LED_CHANNELS;
//!
//! struct Sink;
//! impl LedDriver for Sink {
//!     fn commit(&mut self, _levels: &[u16; LED_CHANNELS]) {}
//!     fn self_test(&mut self) -> bool { true }
//! }
//!
//! let mut engine = EyeEngine::new(Sink);
//! engine.blink();
//! for _ in 0..100 {
//!     engine.tick(); // Called every 10 ms
//! }
//! ```

use rand_core::RngCore;

use crate::animation::{Animation, AnimationId, NEW_BADGE, OLD_BADGE};
use crate::consts::{
    ANIM_CHANCE_ONE_IN, BLINK_TICKS, BOOP_FACE_TICKS, BRIGHTNESS_LEVELS, DEFAULT_BRIGHTNESS_LEVEL,
    FACE_CHANCE_ONE_IN, LED_CHANNELS,
};
use crate::eyes::{EyePair, Face};
use crate::scan::{ScanDots, scan_speed_for};

/// The LED driver the eyes are drawn on.
///
/// Channels `0..8` are the left eye and `8..16` the right eye, each in
/// [`EyeState`](crate::eyes::EyeState) segment order.
pub trait LedDriver {
    /// Latches a full set of channel brightness levels.
    fn commit(&mut self, levels: &[u16; LED_CHANNELS]);
    /// Returns `true` if the driver answers its loopback test.
    fn self_test(&mut self) -> bool;
}

/// Kind of sighting alert to show.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum QueerdarAlert {
    /// A badge this badge has never seen before.
    NewBadge,
    /// A badge that was seen before and came back into range.
    OldBadge,
}

/// Cursor into a playing animation.
#[derive(Clone, Copy, Debug)]
struct Playback {
    anim: &'static Animation,
    frame: usize,
    elapsed: u8,
    loops_left: u8,
    blink_transition: bool,
}

impl Playback {
    fn eyes(&self) -> EyePair {
        self.anim.frames()[self.frame].eyes
    }

    fn duration(&self) -> u8 {
        self.anim.frames()[self.frame].duration
    }
}

/// What the engine is doing this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum EngineMode {
    /// Eyes are closed for a blink.
    Blinking,
    /// An animation is playing.
    Animating,
    /// The idle face (or a temporary override) is showing.
    Ambient,
}

/// Tick-driven renderer of the two eyes.
#[derive(Debug)]
pub struct EyeEngine<D>
where
    D: LedDriver,
{
    driver: D,
    current: EyePair,
    ambient: Face,
    temporary: Option<(EyePair, u16)>,
    playback: Option<Playback>,
    blink_ticks: u8,
    scan: ScanDots,
    brightness_level: usize,
    levels: [u16; LED_CHANNELS],
}

impl<D> EyeEngine<D>
where
    D: LedDriver,
{
    /// Creates an engine showing the normal face at the default brightness.
    pub fn new(driver: D) -> Self {
        let mut engine = EyeEngine {
            driver,
            current: Face::Normal.eyes(),
            ambient: Face::Normal,
            temporary: None,
            playback: None,
            blink_ticks: 0,
            scan: ScanDots::new(),
            brightness_level: DEFAULT_BRIGHTNESS_LEVEL,
            levels: [0; LED_CHANNELS],
        };
        engine.render();
        engine
    }

    /// The eyes currently on display (without scan dots).
    pub fn eyes(&self) -> EyePair {
        self.current
    }

    /// The last levels handed to the driver.
    pub fn levels(&self) -> &[u16; LED_CHANNELS] {
        &self.levels
    }

    /// The permanent idle face.
    pub fn ambient(&self) -> Face {
        self.ambient
    }

    /// Which branch governs the eyes.
    pub fn mode(&self) -> EngineMode {
        if self.blink_ticks > 0 {
            EngineMode::Blinking
        } else if self.playback.is_some() {
            EngineMode::Animating
        } else {
            EngineMode::Ambient
        }
    }

    /// Whether a blink or animation is in progress.
    pub fn busy(&self) -> bool {
        self.mode() != EngineMode::Ambient
    }

    /// The current global brightness.
    pub fn brightness(&self) -> u16 {
        BRIGHTNESS_LEVELS[self.brightness_level]
    }

    /// Index of the current global brightness level.
    pub fn brightness_level(&self) -> usize {
        self.brightness_level
    }

    /// The scan-dot state.
    pub fn scan(&self) -> &ScanDots {
        &self.scan
    }

    /// Shared access to the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Exclusive access to the driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    fn idle_eyes(&self) -> EyePair {
        match self.temporary {
            Some((eyes, _)) => eyes,
            None => self.ambient.eyes(),
        }
    }

    /// Advances all display state by one tick.
    pub fn tick(&mut self) {
        let mut dirty = self.scan.update(self.brightness());

        if self.blink_ticks > 0 {
            self.blink_ticks -= 1;
            if self.blink_ticks == 0 {
                self.current = match &self.playback {
                    Some(playback) => playback.eyes(),
                    None => self.idle_eyes(),
                };
                dirty = true;
            }
        } else if let Some(mut playback) = self.playback {
            playback.elapsed = playback.elapsed.saturating_add(1);
            if playback.elapsed >= playback.duration() {
                playback.elapsed = 0;
                if playback.frame + 1 < playback.anim.frames().len() {
                    playback.frame += 1;
                    self.current = playback.eyes();
                    self.playback = Some(playback);
                } else if playback.loops_left > 0 {
                    playback.loops_left -= 1;
                    playback.frame = 0;
                    self.current = playback.eyes();
                    self.playback = Some(playback);
                } else {
                    self.playback = None;
                    if playback.blink_transition {
                        self.close_eyes();
                    } else {
                        self.current = self.idle_eyes();
                    }
                }
                dirty = true;
            } else {
                self.playback = Some(playback);
            }
        } else if let Some((_, ticks)) = self.temporary.as_mut() {
            *ticks = ticks.saturating_sub(1);
            if *ticks == 0 {
                self.temporary = None;
                self.current = self.ambient.eyes();
                dirty = true;
            }
        }

        if dirty {
            self.render();
        }
    }

    fn close_eyes(&mut self) {
        self.current = EyePair::BLINK;
        self.blink_ticks = BLINK_TICKS;
    }

    /// Replaces whatever is showing with `anim`.
    ///
    /// With `blink_transition` the eyes first close, reopen into the first
    /// frame, and close again after the last frame before returning to the
    /// idle face.
    pub fn start_animation(&mut self, anim: &'static Animation, blink_transition: bool) {
        self.playback = Some(Playback {
            anim,
            frame: 0,
            elapsed: 0,
            loops_left: anim.loops(),
            blink_transition,
        });
        if blink_transition {
            self.close_eyes();
        } else {
            self.blink_ticks = 0;
            self.current = anim.frames()[0].eyes;
        }
        self.render();
    }

    /// Closes the eyes for one blink, unless something is already playing.
    pub fn blink(&mut self) {
        if self.busy() {
            return;
        }
        self.close_eyes();
        self.render();
    }

    /// Periodic idle behavior: usually a blink, sometimes a random
    /// animation, and rarely a new ambient face as well.
    ///
    /// A no-op while a blink or animation is in progress. Returns the new
    /// ambient face when one was chosen, so the caller can persist it.
    pub fn blink_or_pick<R: RngCore>(&mut self, rng: &mut R) -> Option<Face> {
        if self.busy() {
            return None;
        }

        if rng.next_u32() % ANIM_CHANCE_ONE_IN != 0 {
            self.blink();
            return None;
        }

        let mut new_face = None;
        if rng.next_u32() % FACE_CHANCE_ONE_IN == 0 {
            let face = Face::ALL[rng.next_u32() as usize % Face::ALL.len()];
            self.ambient = face;
            new_face = Some(face);
        }
        let id = AnimationId::ALL[rng.next_u32() as usize % AnimationId::ALL.len()];
        trace!("idle animation {:?}", id);
        self.start_animation(id.animation(), true);
        new_face
    }

    /// Sets the permanent idle face, showing it right away if idle.
    pub fn set_ambient(&mut self, face: Face) {
        self.ambient = face;
        if !self.busy() && self.temporary.is_none() {
            self.current = face.eyes();
            self.render();
        }
    }

    /// Overrides the idle face with `eyes` for `ticks` idle ticks.
    pub fn set_temporary_ambient(&mut self, eyes: EyePair, ticks: u16) {
        if ticks == 0 {
            self.temporary = None;
            return;
        }
        self.temporary = Some((eyes, ticks));
        if !self.busy() {
            self.current = eyes;
            self.render();
        }
    }

    /// Happy face after a boop: cancel any animation, blink, and reopen
    /// into a temporary happy override.
    pub fn boop(&mut self) {
        self.playback = None;
        self.temporary = Some((Face::Happy.eyes(), BOOP_FACE_TICKS));
        self.close_eyes();
        self.render();
    }

    /// Reacts to a badge coming into range.
    pub fn queerdar_alert(&mut self, alert: QueerdarAlert) {
        let anim = match alert {
            QueerdarAlert::NewBadge => &NEW_BADGE,
            QueerdarAlert::OldBadge => &OLD_BADGE,
        };
        self.start_animation(anim, true);
    }

    /// Rescales the scan dots for the number of badges in range.
    pub fn set_queerdar_count(&mut self, in_range: u8) {
        self.scan.set_speed(scan_speed_for(in_range));
        self.render();
    }

    /// Cycles to the next global brightness level, confirmed with a blink.
    pub fn next_brightness_level(&mut self) {
        self.brightness_level = (self.brightness_level + 1) % BRIGHTNESS_LEVELS.len();
        self.render();
        self.blink();
    }

    /// Shows `n` as two digits right away.
    pub fn show_number(&mut self, n: u8) {
        self.current = EyePair::number(n);
        self.render();
    }

    /// Shows an `E`-digit status code right away.
    pub fn show_error_code(&mut self, code: u8) {
        self.current = EyePair::error_code(code);
        self.render();
    }

    /// Stages the current eyes and scan dots into driver levels and commits.
    fn render(&mut self) {
        let brightness = self.brightness();
        for eye in 0..2 {
            let state = self.current.eye(eye);
            for segment in 0..8 {
                let level = if state.segment(segment) {
                    brightness
                } else if segment == 4 {
                    self.scan.level(eye)
                } else {
                    0
                };
                self.levels[eye * 8 + segment] = level;
            }
        }
        self.driver.commit(&self.levels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Frame, SHIFTY};
    use crate::eyes::EyeState;
    use heapless::Vec;

    #[derive(Debug, Default)]
    struct MockDriver {
        commits: usize,
        last: [u16; LED_CHANNELS],
    }

    impl LedDriver for MockDriver {
        fn commit(&mut self, levels: &[u16; LED_CHANNELS]) {
            self.commits += 1;
            self.last = *levels;
        }

        fn self_test(&mut self) -> bool {
            true
        }
    }

    /// Always returns the same value.
    struct FixedRng(u32);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.0
        }
        fn next_u64(&mut self) -> u64 {
            u64::from(self.0)
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(self.0 as u8);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    static THREE_FRAMES: [Frame; 3] = [
        Frame::new(EyeState::CIRCLE_LEFT, EyeState::CIRCLE_LEFT, 3),
        Frame::new(EyeState::SIDE_LEFT, EyeState::SIDE_RIGHT, 1),
        Frame::new(EyeState::HAPPY_BIG, EyeState::HAPPY_BIG, 5),
    ];

    static LOOPING: Animation = Animation::new(&THREE_FRAMES, 2);

    fn expected_schedule(anim: &Animation) -> Vec<EyePair, 64> {
        let mut out = Vec::new();
        for _ in 0..=anim.loops() {
            for frame in anim.frames() {
                for _ in 0..frame.duration {
                    out.push(frame.eyes).unwrap();
                }
            }
        }
        out
    }

    #[test]
    fn animation_plays_every_frame_for_its_duration() {
        let mut engine = EyeEngine::new(MockDriver::default());
        engine.start_animation(&LOOPING, false);

        let schedule = expected_schedule(&LOOPING);
        assert_eq!(schedule.len() as u32, LOOPING.total_ticks());
        for (t, eyes) in schedule.iter().enumerate() {
            assert_eq!(engine.eyes(), *eyes, "tick {}", t);
            assert_eq!(engine.mode(), EngineMode::Animating);
            engine.tick();
        }
        assert_eq!(engine.eyes(), Face::Normal.eyes());
        assert_eq!(engine.mode(), EngineMode::Ambient);
    }

    #[test]
    fn blink_transition_wraps_both_ends() {
        let mut engine = EyeEngine::new(MockDriver::default());
        engine.start_animation(&LOOPING, true);

        for t in 0..BLINK_TICKS {
            assert_eq!(engine.eyes(), EyePair::BLINK, "opening blink tick {}", t);
            engine.tick();
        }
        for eyes in expected_schedule(&LOOPING) {
            assert_eq!(engine.eyes(), eyes);
            engine.tick();
        }
        for t in 0..BLINK_TICKS {
            assert_eq!(engine.eyes(), EyePair::BLINK, "closing blink tick {}", t);
            assert_eq!(engine.mode(), EngineMode::Blinking);
            engine.tick();
        }
        assert_eq!(engine.eyes(), Face::Normal.eyes());
        assert!(!engine.busy());
    }

    #[test]
    fn plain_blink_returns_to_ambient() {
        let mut engine = EyeEngine::new(MockDriver::default());
        engine.blink();
        assert_eq!(engine.eyes(), EyePair::BLINK);
        for _ in 0..BLINK_TICKS {
            engine.tick();
        }
        assert_eq!(engine.eyes(), Face::Normal.eyes());
    }

    #[test]
    fn scheduler_is_a_no_op_while_busy() {
        let mut engine = EyeEngine::new(MockDriver::default());
        engine.start_animation(&SHIFTY, false);
        engine.tick();
        let eyes = engine.eyes();
        let commits = engine.driver().commits;

        // Zero would pick an animation and a face if it were allowed to.
        assert_eq!(engine.blink_or_pick(&mut FixedRng(0)), None);
        assert_eq!(engine.eyes(), eyes);
        assert_eq!(engine.mode(), EngineMode::Animating);
        assert_eq!(engine.ambient(), Face::Normal);
        assert_eq!(engine.driver().commits, commits);

        engine.blink();
        assert_eq!(engine.mode(), EngineMode::Animating);
    }

    #[test]
    fn scheduler_usually_blinks() {
        let mut engine = EyeEngine::new(MockDriver::default());
        assert_eq!(engine.blink_or_pick(&mut FixedRng(1)), None);
        assert_eq!(engine.mode(), EngineMode::Blinking);
        assert_eq!(engine.ambient(), Face::Normal);
    }

    #[test]
    fn scheduler_sometimes_picks_animation_and_face() {
        let mut engine = EyeEngine::new(MockDriver::default());
        // 0 passes both one-in-eight checks and indexes the first entries.
        assert_eq!(engine.blink_or_pick(&mut FixedRng(0)), Some(Face::ALL[0]));
        assert_eq!(engine.mode(), EngineMode::Blinking);
        for _ in 0..BLINK_TICKS {
            engine.tick();
        }
        assert_eq!(engine.mode(), EngineMode::Animating);
        assert_eq!(engine.eyes(), AnimationId::ALL[0].animation().frames()[0].eyes);
    }

    #[test]
    fn temporary_ambient_expires() {
        let mut engine = EyeEngine::new(MockDriver::default());
        let happy = Face::Happy.eyes();
        engine.set_temporary_ambient(happy, 5);
        assert_eq!(engine.eyes(), happy);
        for _ in 0..4 {
            engine.tick();
            assert_eq!(engine.eyes(), happy);
        }
        engine.tick();
        assert_eq!(engine.eyes(), Face::Normal.eyes());
    }

    #[test]
    fn boop_blinks_into_happy_overlay() {
        let mut engine = EyeEngine::new(MockDriver::default());
        engine.start_animation(&SHIFTY, false);
        engine.boop();
        assert_eq!(engine.eyes(), EyePair::BLINK);
        for _ in 0..BLINK_TICKS {
            engine.tick();
        }
        assert_eq!(engine.eyes(), Face::Happy.eyes());
        for _ in 0..BOOP_FACE_TICKS {
            engine.tick();
        }
        assert_eq!(engine.eyes(), Face::Normal.eyes());
    }

    #[test]
    fn ambient_change_applies_to_next_idle_render() {
        let mut engine = EyeEngine::new(MockDriver::default());
        engine.set_ambient(Face::Sad);
        assert_eq!(engine.eyes(), Face::Sad.eyes());
        engine.blink();
        for _ in 0..BLINK_TICKS {
            engine.tick();
        }
        assert_eq!(engine.eyes(), Face::Sad.eyes());
    }

    #[test]
    fn render_maps_segments_to_channels() {
        let mut engine = EyeEngine::new(MockDriver::default());
        engine.show_number(80);
        let levels = engine.driver().last;
        let on = engine.brightness();
        // Left eye is an 8: every bar, dark dot.
        for (i, level) in levels[..8].iter().enumerate() {
            assert_eq!(*level, if i == 4 { 0 } else { on });
        }
        assert_eq!(engine.eyes().right, EyeState::digit(0));
    }

    #[test]
    fn scan_dots_show_through_unlit_dots() {
        let mut engine = EyeEngine::new(MockDriver::default());
        engine.set_queerdar_count(3);
        assert!(engine.scan().enabled());
        for _ in 0..20 {
            engine.tick();
        }
        let levels = engine.levels();
        assert_eq!(levels[4], engine.scan().level(0));
        assert_eq!(levels[12], engine.scan().level(1));
        assert!(levels[4] > 0 || levels[12] > 0);

        engine.set_queerdar_count(0);
        assert!(!engine.scan().enabled());
        assert_eq!(engine.levels()[4], 0);
        assert_eq!(engine.levels()[12], 0);
    }

    #[test]
    fn brightness_cycles_and_blinks() {
        let mut engine = EyeEngine::new(MockDriver::default());
        let start = engine.brightness_level();
        engine.next_brightness_level();
        assert_eq!(engine.mode(), EngineMode::Blinking);
        assert_ne!(engine.brightness_level(), start);
        for _ in 1..BRIGHTNESS_LEVELS.len() {
            engine.next_brightness_level();
        }
        assert_eq!(engine.brightness_level(), start);
    }

    #[test]
    fn idle_ticks_without_scan_do_not_commit() {
        let mut engine = EyeEngine::new(MockDriver::default());
        let commits = engine.driver().commits;
        for _ in 0..50 {
            engine.tick();
        }
        assert_eq!(engine.driver().commits, commits);
    }

    #[test]
    fn alerts_replace_current_animation() {
        let mut engine = EyeEngine::new(MockDriver::default());
        engine.start_animation(&SHIFTY, false);
        engine.queerdar_alert(QueerdarAlert::NewBadge);
        assert_eq!(engine.mode(), EngineMode::Blinking);
        for _ in 0..BLINK_TICKS {
            engine.tick();
        }
        assert_eq!(engine.eyes(), NEW_BADGE.frames()[0].eyes);
    }
}
