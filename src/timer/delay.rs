use embedded_hal::delay::DelayNs;

use super::TICK_MS;
use super::rtc::Rtc;
use crate::badge::{Badge, Board};
use crate::config::WriteGuard;
use crate::leds::LedDriver;
use crate::link::Transceiver;

/// Runs a blocking loop that ticks `rtc` every [`TICK_MS`] and drains the
/// resulting events into `badge`.
///
/// This is a simple timing loop for boards where a timer interrupt is
/// unavailable or undesired. Radio and touch interrupts may still raise
/// their flags on `rtc` from interrupt context.
///
/// # Example
/// ```rust,ignore
/// use booper::timer::{Rtc, run_badge_loop};
///
/// static RTC: Rtc = Rtc::new();
/// let mut badge = Badge::new(radio, leds, config, storage);
/// badge.start();
/// run_badge_loop(&mut badge, &RTC, &mut board, &mut delay);
/// ```
///
/// # Notes
/// - This loop never returns.
/// - Time spent handling events is not compensated; the tick runs
///   slightly slow under load.
pub fn run_badge_loop<T, D, S, B, DL>(badge: &mut Badge<T, D, S>, rtc: &Rtc, board: &mut B, delay: &mut DL) -> !
where
    T: Transceiver,
    D: LedDriver,
    S: WriteGuard,
    B: Board,
    DL: DelayNs,
{
    loop {
        run_badge_ticks(badge, rtc, board, delay, 1);
    }
}

/// Runs `ticks` iterations of [`run_badge_loop`], then returns.
pub fn run_badge_ticks<T, D, S, B, DL>(
    badge: &mut Badge<T, D, S>,
    rtc: &Rtc,
    board: &mut B,
    delay: &mut DL,
    ticks: u32,
) where
    T: Transceiver,
    D: LedDriver,
    S: WriteGuard,
    B: Board,
    DL: DelayNs,
{
    for _ in 0..ticks {
        rtc.tick();
        while !badge.poll(rtc, board) {}
        delay.delay_ms(TICK_MS);
    }
}
