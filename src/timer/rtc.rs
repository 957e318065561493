use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

use crate::consts::{LONG_PRESS_TICKS, TICKS_PER_SECOND};

/// Event flag: a system tick elapsed.
pub const EVENT_TICK: u8 = 1 << 0;
/// Event flag: the button has been held for another long-press period.
pub const EVENT_LONG_PRESS: u8 = 1 << 1;
/// Event flag: the transceiver raised its interrupt line.
pub const EVENT_RADIO_IRQ: u8 = 1 << 2;
/// Event flag: the touch front-end has a result to service.
pub const EVENT_TOUCH: u8 = 1 << 3;
/// Event flag: a second elapsed.
pub const EVENT_SECOND: u8 = 1 << 4;

#[derive(Clone, Copy, Default)]
struct RtcState {
    flags: u8,
    centis: u8,
    seconds: u32,
    held_ticks: Option<u16>,
}

/// State shared between the interrupt handlers and the main loop.
///
/// Interrupts only ever call [`Rtc::tick`] and [`Rtc::raise`]; the main loop
/// drains flags with [`Rtc::take`]. Every access runs in a critical
/// section, so a single `static` instance is enough.
///
/// # Example
/// ```rust
/// use booper::timer::{Rtc, EVENT_SECOND};
///
/// static RTC: Rtc = Rtc::new();
///
/// for _ in 0..100 {
///     RTC.tick(); // Called from the 10 ms timer interrupt
/// }
/// assert!(RTC.take(EVENT_SECOND));
/// assert_eq!(RTC.seconds(), 1);
/// ```
pub struct Rtc {
    state: Mutex<Cell<RtcState>>,
}

impl fmt::Debug for Rtc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = critical_section::with(|cs| self.state.borrow(cs).get());
        f.debug_struct("Rtc")
            .field("flags", &state.flags)
            .field("seconds", &state.seconds)
            .field("held_ticks", &state.held_ticks)
            .finish()
    }
}

impl Default for Rtc {
    fn default() -> Self {
        Self::new()
    }
}

impl Rtc {
    /// A stopped clock with no flags raised.
    pub const fn new() -> Self {
        Rtc {
            state: Mutex::new(Cell::new(RtcState {
                flags: 0,
                centis: 0,
                seconds: 0,
                held_ticks: None,
            })),
        }
    }

    fn modify<R>(&self, f: impl FnOnce(&mut RtcState) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }

    /// Advances the clock by one system tick.
    ///
    /// Raises [`EVENT_TICK`], [`EVENT_SECOND`] on every hundredth tick, and
    /// [`EVENT_LONG_PRESS`] every [`LONG_PRESS_TICKS`] while the button is
    /// held.
    pub fn tick(&self) {
        self.modify(|state| {
            state.flags |= EVENT_TICK;
            state.centis += 1;

            if let Some(held) = state.held_ticks.as_mut() {
                *held += 1;
                if *held == LONG_PRESS_TICKS {
                    state.flags |= EVENT_LONG_PRESS;
                    *held = 0;
                }
            }

            if state.centis == TICKS_PER_SECOND {
                state.centis = 0;
                state.seconds = state.seconds.wrapping_add(1);
                state.flags |= EVENT_SECOND;
            }
        });
    }

    /// Raises `flags`.
    pub fn raise(&self, flags: u8) {
        self.modify(|state| state.flags |= flags);
    }

    /// Clears `flag`, returning whether it was raised.
    pub fn take(&self, flag: u8) -> bool {
        self.modify(|state| {
            let raised = state.flags & flag != 0;
            state.flags &= !flag;
            raised
        })
    }

    /// Flags raised and not yet taken.
    pub fn pending(&self) -> u8 {
        self.modify(|state| state.flags)
    }

    /// Whole seconds since the clock started.
    pub fn seconds(&self) -> u32 {
        self.modify(|state| state.seconds)
    }

    /// Starts counting a button hold towards long presses.
    pub fn button_down(&self) {
        self.modify(|state| state.held_ticks = Some(0));
    }

    /// Stops counting the button hold.
    pub fn button_up(&self) {
        self.modify(|state| state.held_ticks = None);
    }
}
