//! Badge identity, button glue and the main-loop event dispatch.
//!
//! [`Badge`] owns every core component: the [`RadioLink`] and the
//! [`PresenceProtocol`] on top of it, the [`EyeEngine`], and the
//! [`Persistent`] configuration. Interrupts never touch it; they raise
//! flags on a shared [`Rtc`], and the main loop calls [`Badge::poll`],
//! which drains the flags in fixed priority order:
//!
//! 1. system tick: feed the watchdog, tick the eyes
//! 2. long press: cycle brightness
//! 3. radio interrupt: service the link, then react to protocol events
//! 4. touch: button press/release
//! 5. second: calibration, beacon slot, idle blinks, boop cooldown
//! 6. pending beacon/boop, once the link can transmit
//!
//! Each step runs to completion before the next one is looked at.
//!
//! Until first-time setup is complete (id assigned and radio channel
//! calibrated) the game is blocked: the eyes show the power-on self-test
//! code and the radio only listens for calibration.

use embedded_hal::delay::DelayNs;
use rand_core::{RngCore, SeedableRng};
use rand_wyrand::WyRand;

use crate::calibration::{Calibration, CalibrationStep};
use crate::config::{BadgeConfig, Persistent, WriteGuard};
use crate::consts::{
    BADGE_ID_UNASSIGNED, BEACON_PERIOD_SECS, BOOP_COOLDOWN_SECS, BOOP_HOPS, NUMBER_TICKS, RECALIBRATE_LONG_PRESSES,
    SECS_PER_BLINK_AVG,
};
use crate::error::SelfTestError;
use crate::eyes::EyePair;
use crate::leds::{EyeEngine, LedDriver, QueerdarAlert};
use crate::link::{RadioLink, Transceiver};
use crate::packet::PACKET_LEN;
use crate::radio::{PresenceProtocol, ProtocolEvent};
use crate::timer::{EVENT_LONG_PRESS, EVENT_RADIO_IRQ, EVENT_SECOND, EVENT_TICK, EVENT_TOUCH, Rtc};

/// Highest number shown by the boot count-up.
const BOOT_COUNT_MAX: u8 = 99;
/// Delay between boot count-up steps.
const BOOT_COUNT_STEP_MS: u32 = 80;
/// How long the final boot count stays up.
const BOOT_COUNT_HOLD_MS: u32 = 6_000;

/// A debounced button transition from the touch front-end.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ButtonEdge {
    /// The button went down.
    Press,
    /// The button came back up.
    Release,
}

/// Board services the main loop needs besides the radio and LEDs.
pub trait Board {
    /// Resets the watchdog.
    fn feed_watchdog(&mut self);
    /// Services the touch front-end, returning a button transition if one
    /// was detected.
    fn service_touch(&mut self) -> Option<ButtonEdge>;
}

/// The whole badge application.
#[derive(Debug)]
pub struct Badge<T, D, S>
where
    T: Transceiver,
    D: LedDriver,
    S: WriteGuard,
{
    link: RadioLink<T>,
    protocol: PresenceProtocol,
    engine: EyeEngine<D>,
    config: Persistent<S>,
    rng: WyRand,
    uptime: u32,
    next_blink: u8,
    beacon_pending: bool,
    boop_pending: bool,
    boop_cooldown: u8,
    long_presses: u8,
    long_pressed: bool,
}

impl<T, D, S> Badge<T, D, S>
where
    T: Transceiver,
    D: LedDriver,
    S: WriteGuard,
{
    /// Assembles a badge from its peripherals and the stored configuration.
    ///
    /// Nothing is transmitted until [`Badge::start`].
    pub fn new(radio: T, leds: D, config: BadgeConfig, storage: S) -> Self {
        let mut engine = EyeEngine::new(leds);
        engine.set_ambient(config.ambient_face);

        let mut protocol = PresenceProtocol::new(
            config.badge_id,
            Calibration::resume(config.frequency, config.frequency_done),
        );
        protocol.set_game_enabled(config.bootstrapped);

        Badge {
            link: RadioLink::new(radio, config.badge_id, PACKET_LEN),
            protocol,
            engine,
            rng: WyRand::seed_from_u64(u64::from(config.badge_id)),
            config: Persistent::new(config, storage),
            uptime: 0,
            next_blink: 1,
            beacon_pending: false,
            boop_pending: false,
            boop_cooldown: 0,
            long_presses: 0,
            long_pressed: false,
        }
    }

    /// Starts listening on the stored channel and runs the power-on self
    /// test. A badge that is not bootstrapped shows the result on its eyes.
    pub fn start(&mut self) -> Result<(), SelfTestError> {
        self.link.start();
        self.protocol.tune(&mut self.link);
        let post = self.post_code();
        if !self.config.config().bootstrapped {
            self.engine.show_error_code(Self::glyph_code(post));
        }
        post
    }

    /// Runs the power-on self test.
    ///
    /// Checks, in order: radio, badge id, radio calibration, LED driver.
    pub fn post_code(&mut self) -> Result<(), SelfTestError> {
        let result = if !self.link.self_test() {
            Err(SelfTestError::RadioNotResponding)
        } else if self.config.config().badge_id == BADGE_ID_UNASSIGNED {
            Err(SelfTestError::NoBadgeId)
        } else if !self.protocol.calibration().done() {
            Err(SelfTestError::FrequencyUncalibrated)
        } else if !self.engine.driver_mut().self_test() {
            Err(SelfTestError::LedDriverNotResponding)
        } else {
            Ok(())
        };
        if let Err(_e) = result {
            warn!("self test: {:?}", _e);
        }
        result
    }

    fn glyph_code(post: Result<(), SelfTestError>) -> u8 {
        match post {
            Ok(()) => 0,
            Err(e) => e.code(),
        }
    }

    /// Counts up on the eyes to the number of badges seen, then holds.
    ///
    /// Only a bootstrapped badge that has seen someone besides itself
    /// does this. Blocks on `delay`; call before entering the main loop.
    pub fn boot_count<DL: DelayNs>(&mut self, delay: &mut DL) {
        let config = self.config.config();
        if !config.bootstrapped || config.seen.count() <= 1 {
            return;
        }
        let top = config.seen.count().min(BOOT_COUNT_MAX);
        for n in 0..=top {
            self.engine.show_number(n);
            delay.delay_ms(BOOT_COUNT_STEP_MS);
        }
        delay.delay_ms(BOOT_COUNT_HOLD_MS);
        self.engine.set_ambient(self.engine.ambient());
    }

    /// Drains pending event flags from `rtc` in priority order.
    ///
    /// Returns `true` if no flags are left, i.e. the caller may park the
    /// CPU until the next interrupt.
    pub fn poll<B: Board>(&mut self, rtc: &Rtc, board: &mut B) -> bool {
        if rtc.take(EVENT_TICK) {
            board.feed_watchdog();
            if self.config.config().bootstrapped {
                self.engine.tick();
            }
        }

        if rtc.take(EVENT_LONG_PRESS) {
            self.long_press();
        }

        if rtc.take(EVENT_RADIO_IRQ) {
            self.link.service_interrupt(&mut self.protocol);
            self.dispatch_events();
        }

        if rtc.take(EVENT_TOUCH) {
            match board.service_touch() {
                Some(ButtonEdge::Press) => {
                    rtc.button_down();
                    self.long_presses = 0;
                    self.long_pressed = false;
                }
                Some(ButtonEdge::Release) => {
                    rtc.button_up();
                    self.release();
                }
                None => {}
            }
        }

        if rtc.take(EVENT_SECOND) {
            self.second();
        }

        self.transmit_pending();

        rtc.pending() == 0
    }

    /// Assigns a new badge id: stores it, moves the seen-myself bit,
    /// re-seeds the random source and updates the radio addresses.
    pub fn set_id(&mut self, id: u16) {
        if id == self.id() {
            return;
        }
        info!("badge id {} -> {}", self.id(), id);
        self.config.set_id(id);
        self.protocol.set_local_id(id);
        self.link.set_unicast_addr(id);
        self.rng = WyRand::seed_from_u64(u64::from(id));
    }

    /// This badge's id.
    pub fn id(&self) -> u16 {
        self.config.config().badge_id
    }

    /// Seconds since [`Badge::new`], counted from `EVENT_SECOND`.
    pub fn uptime(&self) -> u32 {
        self.uptime
    }

    /// The stored configuration.
    pub fn config(&self) -> &BadgeConfig {
        self.config.config()
    }

    /// The eye engine.
    pub fn engine(&self) -> &EyeEngine<D> {
        &self.engine
    }

    /// The presence protocol.
    pub fn protocol(&self) -> &PresenceProtocol {
        &self.protocol
    }

    /// The radio link.
    pub fn link(&self) -> &RadioLink<T> {
        &self.link
    }

    /// The radio link, mutably.
    pub fn link_mut(&mut self) -> &mut RadioLink<T> {
        &mut self.link
    }

    fn long_press(&mut self) {
        self.long_presses = self.long_presses.saturating_add(1);
        self.long_pressed = true;
        if self.config.config().bootstrapped {
            self.engine.next_brightness_level();
        }
    }

    fn release(&mut self) {
        if self.long_presses >= RECALIBRATE_LONG_PRESSES {
            self.long_presses = 0;
            self.recalibrate();
        } else if !self.long_pressed {
            self.short_press();
        }
        self.long_pressed = false;
    }

    fn short_press(&mut self) {
        if !self.protocol.game_enabled() {
            return;
        }
        self.engine.boop();
        if self.boop_cooldown == 0 {
            self.boop_pending = true;
            self.boop_cooldown = BOOP_COOLDOWN_SECS;
        }
    }

    fn recalibrate(&mut self) {
        self.protocol.start_calibration(&mut self.link);
        self.config.set_frequency(self.protocol.calibration().frequency(), false);
    }

    fn second(&mut self) {
        self.uptime = self.uptime.wrapping_add(1);

        let bootstrapped = self.config.config().bootstrapped;
        match self.protocol.calibration_second(&mut self.link, bootstrapped) {
            CalibrationStep::Retune(channel) => self.config.set_frequency(channel, false),
            CalibrationStep::Done(channel) => {
                self.config.set_frequency(channel, true);
                self.finish_bootstrap();
            }
            CalibrationStep::Idle | CalibrationStep::Listening => {}
        }

        if !self.protocol.game_enabled() {
            return;
        }

        if self.uptime % BEACON_PERIOD_SECS == u32::from(self.id()) % BEACON_PERIOD_SECS {
            self.beacon_pending = true;
        }

        if self.next_blink == 0 {
            if let Some(face) = self.engine.blink_or_pick(&mut self.rng) {
                self.config.set_ambient_face(face);
            }
            self.next_blink = (self.rng.next_u32() % (2 * u32::from(SECS_PER_BLINK_AVG))) as u8;
        } else {
            self.next_blink -= 1;
        }

        self.boop_cooldown = self.boop_cooldown.saturating_sub(1);
    }

    /// Calibration just finished: show the self-test result again, and
    /// unblock the game if everything passed.
    fn finish_bootstrap(&mut self) {
        if self.config.config().bootstrapped {
            return;
        }
        let post = self.post_code();
        if post.is_err() {
            self.engine.show_error_code(Self::glyph_code(post));
            return;
        }
        info!("bootstrapped");
        self.config.set_bootstrapped();
        self.protocol.set_game_enabled(true);
        self.engine.set_temporary_ambient(EyePair::error_code(0), NUMBER_TICKS);
    }

    fn transmit_pending(&mut self) {
        if self.beacon_pending && self.link.tx_avail() {
            self.beacon_pending = false;
            if self.protocol.game_enabled() {
                let _ = self.protocol.interval(&mut self.link);
                self.dispatch_events();
            }
        }

        if self.boop_pending && self.link.tx_avail() {
            self.boop_pending = false;
            if self.protocol.game_enabled() {
                let id = self.id();
                let _ = self.protocol.boop(&mut self.link, id, BOOP_HOPS);
            }
        }
    }

    fn dispatch_events(&mut self) {
        while let Some(event) = self.protocol.next_event() {
            match event {
                ProtocolEvent::Boop => self.engine.boop(),
                ProtocolEvent::PeerInRange(id) => {
                    let alert = if self.config.mark_seen(id) {
                        QueerdarAlert::NewBadge
                    } else {
                        QueerdarAlert::OldBadge
                    };
                    self.engine.queerdar_alert(alert);
                }
                ProtocolEvent::InRangeChanged(in_range) => self.engine.set_queerdar_count(in_range),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::MockStorage;
    use crate::consts::{BRIGHTNESS_LEVELS, CALIBRATION_SECS_PER_FREQ, FREQ_MIN, FREQ_NUM, LED_CHANNELS};
    use crate::eyes::Face;
    use crate::link::tests::MockRadio;
    use crate::link::{IRQ_RX_READY, IRQ_TX_SENT};
    use crate::packet::Packet;
    use crate::scan::scan_speed_for;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use heapless::Deque;

    #[derive(Debug, Default)]
    struct Leds {
        dead: bool,
        commits: usize,
    }

    impl LedDriver for Leds {
        fn commit(&mut self, _levels: &[u16; LED_CHANNELS]) {
            self.commits += 1;
        }
        fn self_test(&mut self) -> bool {
            !self.dead
        }
    }

    #[derive(Debug, Default)]
    struct MockBoard {
        edges: Deque<ButtonEdge, 8>,
        watchdog: u32,
    }

    impl Board for MockBoard {
        fn feed_watchdog(&mut self) {
            self.watchdog += 1;
        }
        fn service_touch(&mut self) -> Option<ButtonEdge> {
            self.edges.pop_front()
        }
    }

    type TestBadge = Badge<MockRadio, Leds, MockStorage>;

    fn ready_config(id: u16) -> BadgeConfig {
        let mut config = BadgeConfig::provisioned(id);
        config.bootstrapped = true;
        config.frequency = FREQ_MIN + 2;
        config.frequency_done = true;
        config
    }

    fn badge_with(config: BadgeConfig) -> (TestBadge, Result<(), SelfTestError>) {
        let mut badge = Badge::new(MockRadio::new(), Leds::default(), config, MockStorage::default());
        let post = badge.start();
        (badge, post)
    }

    fn settle(badge: &mut TestBadge, rtc: &Rtc, board: &mut MockBoard) {
        while !badge.poll(rtc, board) {}
    }

    fn run_seconds(badge: &mut TestBadge, rtc: &Rtc, board: &mut MockBoard, seconds: usize) {
        for _ in 0..seconds {
            rtc.raise(EVENT_SECOND);
            settle(badge, rtc, board);
        }
    }

    fn finish_tx(badge: &mut TestBadge, rtc: &Rtc, board: &mut MockBoard) {
        badge.link_mut().radio.status = IRQ_TX_SENT;
        rtc.raise(EVENT_RADIO_IRQ);
        settle(badge, rtc, board);
    }

    fn deliver(badge: &mut TestBadge, rtc: &Rtc, board: &mut MockBoard, packet: Packet) {
        let radio = &mut badge.link_mut().radio;
        radio.rx[..PACKET_LEN].copy_from_slice(&packet.encode());
        radio.status = IRQ_RX_READY;
        rtc.raise(EVENT_RADIO_IRQ);
        settle(badge, rtc, board);
    }

    fn touch(badge: &mut TestBadge, rtc: &Rtc, board: &mut MockBoard, edge: ButtonEdge) {
        let _ = board.edges.push_back(edge);
        rtc.raise(EVENT_TOUCH);
        settle(badge, rtc, board);
    }

    fn sent(badge: &TestBadge) -> heapless::Vec<Packet, 16> {
        badge
            .link()
            .radio
            .sent
            .iter()
            .map(|bytes| Packet::decode(bytes).unwrap())
            .collect()
    }

    #[test]
    fn unprovisioned_badge_shows_no_id_and_blocks_the_game() {
        let (mut badge, post) = badge_with(BadgeConfig::default());
        assert_eq!(post, Err(SelfTestError::NoBadgeId));
        assert_eq!(badge.engine().eyes(), EyePair::error_code(1));

        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        deliver(&mut badge, &rtc, &mut board, Packet::beacon(5));
        assert_eq!(badge.protocol().in_range(), 0);
        assert_eq!(badge.protocol().calibration().count(0), 1);

        touch(&mut badge, &rtc, &mut board, ButtonEdge::Press);
        touch(&mut badge, &rtc, &mut board, ButtonEdge::Release);
        assert!(sent(&badge).is_empty());
        assert_eq!(badge.engine().eyes(), EyePair::error_code(1));
    }

    #[test]
    fn dead_radio_is_reported_first() {
        let mut radio = MockRadio::new();
        radio.alive = false;
        let mut badge = Badge::new(radio, Leds::default(), BadgeConfig::default(), MockStorage::default());
        assert_eq!(badge.start(), Err(SelfTestError::RadioNotResponding));
        assert_eq!(badge.engine().eyes(), EyePair::error_code(2));
    }

    #[test]
    fn dead_leds_are_reported_last() {
        let leds = Leds {
            dead: true,
            ..Default::default()
        };
        let mut badge = Badge::new(MockRadio::new(), leds, ready_config(1), MockStorage::default());
        assert_eq!(badge.start(), Err(SelfTestError::LedDriverNotResponding));
    }

    #[test]
    fn ready_badge_shows_its_face() {
        let mut config = ready_config(1);
        config.ambient_face = Face::Sad;
        let (badge, post) = badge_with(config);
        assert_eq!(post, Ok(()));
        assert_eq!(badge.engine().eyes(), Face::Sad.eyes());
        assert!(badge.protocol().game_enabled());
    }

    #[test]
    fn poll_reports_when_idle() {
        let (mut badge, _) = badge_with(ready_config(1));
        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        assert!(badge.poll(&rtc, &mut board));
        rtc.tick();
        assert!(badge.poll(&rtc, &mut board));
        assert_eq!(board.watchdog, 1);
    }

    #[test]
    fn beacons_in_its_own_slot() {
        let (mut badge, _) = badge_with(ready_config(3));
        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        run_seconds(&mut badge, &rtc, &mut board, 2);
        assert!(sent(&badge).is_empty());
        run_seconds(&mut badge, &rtc, &mut board, 1);
        assert_eq!(sent(&badge).as_slice(), &[Packet::beacon(3)]);
        finish_tx(&mut badge, &rtc, &mut board);
        run_seconds(&mut badge, &rtc, &mut board, BEACON_PERIOD_SECS as usize);
        assert_eq!(sent(&badge).len(), 2);
    }

    #[test]
    fn short_press_boops_with_cooldown() {
        let (mut badge, _) = badge_with(ready_config(4));
        let (rtc, mut board) = (Rtc::new(), MockBoard::default());

        touch(&mut badge, &rtc, &mut board, ButtonEdge::Press);
        touch(&mut badge, &rtc, &mut board, ButtonEdge::Release);
        assert_eq!(sent(&badge).as_slice(), &[Packet::boop(4, BOOP_HOPS)]);
        assert!(badge.engine().busy());
        finish_tx(&mut badge, &rtc, &mut board);

        touch(&mut badge, &rtc, &mut board, ButtonEdge::Press);
        touch(&mut badge, &rtc, &mut board, ButtonEdge::Release);
        assert_eq!(sent(&badge).len(), 1);

        run_seconds(&mut badge, &rtc, &mut board, usize::from(BOOP_COOLDOWN_SECS));
        touch(&mut badge, &rtc, &mut board, ButtonEdge::Press);
        touch(&mut badge, &rtc, &mut board, ButtonEdge::Release);
        assert_eq!(sent(&badge).len(), 2);
    }

    #[test]
    fn new_peer_is_recorded_and_alerted() {
        let (mut badge, _) = badge_with(ready_config(9));
        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        deliver(&mut badge, &rtc, &mut board, Packet::beacon(5));
        assert!(badge.config().seen.contains(5));
        assert_eq!(badge.config().seen.count(), 2);
        assert!(badge.engine().busy());
        assert_eq!(badge.engine().scan().speed(), scan_speed_for(1));
    }

    #[test]
    fn known_peer_is_not_written_again() {
        let mut config = ready_config(9);
        assert!(config.seen.insert(5));
        let (mut badge, _) = badge_with(config);
        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        deliver(&mut badge, &rtc, &mut board, Packet::beacon(5));
        assert_eq!(badge.config().seen.count(), 2);
        assert!(badge.engine().busy());
    }

    #[test]
    fn received_boop_is_shown_and_relayed() {
        let (mut badge, _) = badge_with(ready_config(9));
        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        deliver(&mut badge, &rtc, &mut board, Packet::boop(5, 3));
        assert_eq!(sent(&badge).as_slice(), &[Packet::boop(5, 2)]);
        assert!(badge.engine().busy());
    }

    #[test]
    fn long_presses_cycle_brightness_and_nine_recalibrate() {
        let (mut badge, _) = badge_with(ready_config(2));
        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        let level = badge.engine().brightness_level();

        touch(&mut badge, &rtc, &mut board, ButtonEdge::Press);
        rtc.raise(EVENT_LONG_PRESS);
        settle(&mut badge, &rtc, &mut board);
        assert_eq!(badge.engine().brightness_level(), (level + 1) % BRIGHTNESS_LEVELS.len());

        for _ in 1..RECALIBRATE_LONG_PRESSES {
            rtc.raise(EVENT_LONG_PRESS);
            settle(&mut badge, &rtc, &mut board);
        }
        touch(&mut badge, &rtc, &mut board, ButtonEdge::Release);

        assert!(sent(&badge).is_empty());
        assert!(!badge.protocol().calibration().done());
        assert!(!badge.config().frequency_done);
        assert_eq!(badge.config().frequency, FREQ_MIN);
    }

    #[test]
    fn one_long_press_then_release_does_not_boop() {
        let (mut badge, _) = badge_with(ready_config(2));
        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        touch(&mut badge, &rtc, &mut board, ButtonEdge::Press);
        rtc.raise(EVENT_LONG_PRESS);
        settle(&mut badge, &rtc, &mut board);
        touch(&mut badge, &rtc, &mut board, ButtonEdge::Release);
        assert!(sent(&badge).is_empty());
        assert!(badge.protocol().calibration().done());
    }

    #[test]
    fn calibration_completion_bootstraps() {
        let (mut badge, post) = badge_with(BadgeConfig::provisioned(6));
        assert_eq!(post, Err(SelfTestError::FrequencyUncalibrated));
        assert_eq!(badge.engine().eyes(), EyePair::error_code(3));
        assert!(!badge.protocol().game_enabled());

        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        deliver(&mut badge, &rtc, &mut board, Packet::beacon(1));

        let window = usize::from(CALIBRATION_SECS_PER_FREQ) + 1;
        run_seconds(&mut badge, &rtc, &mut board, window * FREQ_NUM - 1);
        assert!(!badge.config().frequency_done);
        run_seconds(&mut badge, &rtc, &mut board, 1);

        let config = badge.config();
        assert!(config.frequency_done);
        assert_eq!(config.frequency, FREQ_MIN);
        assert!(config.bootstrapped);
        assert!(badge.protocol().game_enabled());
        assert_eq!(badge.engine().eyes(), EyePair::error_code(0));
    }

    #[test]
    fn set_id_moves_identity() {
        let (mut badge, _) = badge_with(BadgeConfig::default());
        badge.set_id(17);
        assert_eq!(badge.id(), 17);
        assert!(badge.config().seen.contains(17));
        assert!(!badge.config().seen.contains(BADGE_ID_UNASSIGNED));
        assert_eq!(badge.protocol().local_id(), 17);
        assert_eq!(badge.link().unicast_addr(), 17);
    }

    #[test]
    fn boot_count_only_when_there_is_something_to_show() {
        let (mut badge, _) = badge_with(ready_config(1));
        let before = badge.engine().driver().commits;
        badge.boot_count(&mut NoopDelay::new());
        assert_eq!(badge.engine().driver().commits, before);

        let mut config = ready_config(1);
        for id in [2, 3, 4] {
            assert!(config.seen.insert(id));
        }
        let (mut badge, _) = badge_with(config);
        let before = badge.engine().driver().commits;
        badge.boot_count(&mut NoopDelay::new());
        // 0..=4 plus the face coming back.
        assert_eq!(badge.engine().driver().commits, before + 6);
        assert_eq!(badge.engine().eyes(), Face::Normal.eyes());
    }

    #[cfg(feature = "delay-loop")]
    #[test]
    fn delay_loop_drives_the_badge() {
        let (mut badge, _) = badge_with(ready_config(1));
        let (rtc, mut board) = (Rtc::new(), MockBoard::default());
        crate::timer::run_badge_ticks(&mut badge, &rtc, &mut board, &mut NoopDelay::new(), 100);
        assert_eq!(badge.uptime(), 1);
        assert_eq!(board.watchdog, 100);
        assert_eq!(sent(&badge).as_slice(), &[Packet::beacon(1)]);
    }
}
