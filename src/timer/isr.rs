use super::rtc::{EVENT_RADIO_IRQ, EVENT_TOUCH, Rtc};

/// Used to initialize the global static [`Rtc`] shared with the interrupt
/// handlers.
///
/// # Example
/// ```rust
/// use booper::timer::{Rtc, global_rtc_init};
///
/// static BADGE_RTC: Rtc = global_rtc_init();
/// ```
pub const fn global_rtc_init() -> Rtc {
    Rtc::new()
}

/// Runs the system tick at each timer interrupt.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn RTC() {
///     rtc_tick_isr(&BADGE_RTC);
/// }
/// ```
pub fn rtc_tick_isr(rtc: &'static Rtc) {
    rtc.tick();
}

/// Defers the transceiver interrupt to the main loop.
///
/// The radio is never touched from interrupt context; the main loop
/// services it through [`RadioLink::service_interrupt`](crate::link::RadioLink::service_interrupt).
pub fn radio_isr(rtc: &'static Rtc) {
    rtc.raise(EVENT_RADIO_IRQ);
}

/// Defers a touch front-end conversion to the main loop.
pub fn touch_isr(rtc: &'static Rtc) {
    rtc.raise(EVENT_TOUCH);
}
