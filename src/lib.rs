//! # booper
//!
//! A portable, no_std application core for a two-eyed conference badge: two
//! seven-segment "eyes" driven by an LED animation engine, and a 2.4 GHz
//! packet radio running a proximity-sensing presence protocol.
//!
//! The crate is built from:
//! - a tick-driven eye animation engine with blinks, scripted animations, a
//!   scan-dot crossfade and temporary overlays
//! - a link-layer state machine arbitrating a half-duplex transceiver
//! - a presence protocol: beacons, sliding-window aging, a hop-limited
//!   "boop" flood and blind channel calibration
//! - interrupt-safe event flags using `critical-section`
//! - optional tick sources using either timer interrupts or a blocking delay
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support, for host builds and tests |
//! | `delay-loop`          | Uses `embedded_hal::delay::DelayNs` for the system tick |
//! | `timer-isr` (default) | Uses a timer interrupt and `critical_section::with` for the system tick |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Software Features
//!
//! - **Queerdar**: badges beacon every 8 seconds and track who is in range;
//!   the scan dots speed up as more badges are around
//! - **Boops**: a button press greets every badge nearby, relayed up to 10 hops
//! - **Memory**: every badge ever seen is remembered across power cycles
//! - **Self-calibration**: the radio channel is picked by listening
//!
//! ## Usage
//!
//! ```rust,ignore
//! use booper::badge::Badge;
//! use booper::timer::Rtc;
//!
//! static RTC: Rtc = Rtc::new();
//!
//! let mut badge = Badge::new(radio, leds, config, storage);
//! let _ = badge.start();
//! badge.boot_count(&mut delay);
//! loop {
//!     if badge.poll(&RTC, &mut board) {
//!         // Sleep until the next interrupt.
//!     }
//! }
//! ```
//!
//! Or, use `run_badge_loop()` with a `DelayNs` implementation:
//!
//! ```rust,ignore
//! booper::timer::run_badge_loop(&mut badge, &RTC, &mut board, &mut delay);
//! ```
//!
//! ## Integration Notes
//!
//! - The system tick is 10 ms; everything time-based counts these ticks
//! - Interrupt handlers only raise flags on the shared [`timer::Rtc`]; all
//!   work happens in [`badge::Badge::poll`]
//! - Durable configuration writes go through [`config::WriteGuard`]
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub mod animation;
pub mod badge;
pub mod calibration;
pub mod config;
pub mod consts;
pub(crate) mod crc;
pub mod error;
pub mod eyes;
pub mod leds;
pub mod link;
pub mod packet;
pub mod presence;
pub mod radio;
pub mod scan;
pub mod timer;
