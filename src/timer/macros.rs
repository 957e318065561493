/// Declares a static global `BADGE_RTC` shared between interrupts and the
/// main loop.
///
/// # Example
/// ```rust
/// booper::init_badge_rtc!();
///
/// booper::tick_badge_rtc!();
/// assert_eq!(BADGE_RTC.pending(), booper::timer::EVENT_TICK);
/// ```
#[macro_export]
macro_rules! init_badge_rtc {
    () => {
        pub static BADGE_RTC: $crate::timer::Rtc = $crate::timer::Rtc::new();
    };
}

/// Calls `tick()` on the global `BADGE_RTC`.
///
/// Intended for the 10 ms timer interrupt.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn RTC() {
///     tick_badge_rtc!();
/// }
/// ```
///
/// # Notes
/// - This macro assumes `BADGE_RTC` was declared with `init_badge_rtc!`.
#[macro_export]
macro_rules! tick_badge_rtc {
    () => {
        $crate::timer::rtc_tick_isr(&BADGE_RTC)
    };
}

/// Raises an event flag on the global `BADGE_RTC` from an interrupt.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn PORT2() {
///     raise_badge_event!(booper::timer::EVENT_RADIO_IRQ);
/// }
/// ```
#[macro_export]
macro_rules! raise_badge_event {
    ( $flags:expr ) => {
        BADGE_RTC.raise($flags)
    };
}
