//! System tick timing for the badge.
//!
//! Everything time-based in the badge counts 10 ms system ticks. The tick
//! source is either a hardware timer interrupt (`timer-isr` feature) or a
//! blocking delay loop (`delay-loop` feature). Either way, the tick only
//! touches the shared [`Rtc`]: it raises event flags that
//! [`Badge::poll`](crate::badge::Badge::poll) later drains.
//!
//! Contains:
//! - [`Rtc`]: interrupt-shared centisecond/second counter, button hold
//!   counter and event flag word
//! - `compute_tick_compare`: runtime compare-value calculator
//! - `const_tick_compare`: compile-time compare-value calculator
//! - `run_badge_loop` / `run_badge_ticks`: blocking driver loops for
//!   `DelayNs` (feature `delay-loop`)
//! - `rtc_tick_isr`, `radio_isr`, `touch_isr` and the `init_badge_rtc!()`
//!   family of macros: interrupt entry points (feature `timer-isr`)
//!
//! Common settings for a 10 ms tick (for use with `compute_tick_compare`
//! and `const_tick_compare`):
//!
//! | Clock    | PRESCALER | Compare value |
//! |----------|-----------|---------------|
//! |   8 MHz  |      1000 |            80 |
//! |   1 MHz  |        10 |          1000 |
//! | 32768 Hz |         1 |           328 |

use libm::round;

mod rtc;
pub use rtc::*;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// Length of one system tick.
pub const TICK_MS: u32 = 10;

/// Microseconds per millisecond.
const MICROS_PER_MILLI: u64 = 1_000;
/// Microseconds per second.
const MICROS_PER_SECOND: u64 = 1_000_000;

/// Computes the timer compare value for a periodic tick.
///
/// # Arguments
/// - `f_clk`: timer input clock in Hz
/// - `prescaler`: timer prescaler (e.g. 1, 8, 1000)
/// - `tick_ms`: desired tick interval in milliseconds (e.g. 10.0)
///
/// # Returns
/// - Compare value, rounded to the nearest count
pub fn compute_tick_compare(f_clk: u32, prescaler: u32, tick_ms: f32) -> u16 {
    let counts_per_second = f64::from(f_clk) / f64::from(prescaler);
    round(counts_per_second * f64::from(tick_ms) / 1_000.0) as u16
}

/// Compile-time tick compare value.
///
/// Same as [`compute_tick_compare`] but for a whole number of microseconds,
/// rounding to the nearest count.
pub const fn const_tick_compare(f_clk: u32, prescaler: u32, tick_us: u32) -> u16 {
    let scaled = f_clk as u64 * tick_us as u64;
    let divisor = prescaler as u64 * MICROS_PER_SECOND;
    ((scaled + divisor / 2) / divisor) as u16
}

/// Ticks per second for a tick of `tick_ms` milliseconds.
pub const fn ticks_per_second(tick_ms: u32) -> u32 {
    (MICROS_PER_SECOND / (tick_ms as u64 * MICROS_PER_MILLI)) as u32
}
