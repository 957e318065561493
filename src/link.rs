//! Link-layer state machine for a half-duplex packet transceiver.
//!
//! This module provides the [`RadioLink`] struct, which arbitrates a single
//! transceiver between listening and transmitting. The transceiver is a
//! single-buffer device: at most one operation may be in flight, and the
//! link tracks where it is with [`LinkState`].
//!
//! ## Interrupt servicing
//!
//! The transceiver raises one interrupt line for "sent", "max retries, no
//! ack" and "received". The ISR only sets a flag; the main loop later calls
//! [`RadioLink::service_interrupt`], which reads the interrupt vector and
//! invokes the [`LinkHandler`] callbacks.
//!
//! ## Callback re-entrancy
//!
//! Both callbacks receive the link itself and may call
//! [`RadioLink::transmit`] from inside the callback. This is the only
//! re-entrant path in the system and is how a received boop is relayed
//! synchronously. After a callback returns, the link only re-arms listening
//! if the callback left the state untouched.
//!
//! ## Design Notes
//!
//! This module does **not** know about packet contents; it moves opaque
//! fixed-size payloads. Framing and validation live in [`crate::packet`].
//! Retries are whatever the transceiver's automatic retransmit does; this
//! layer reports an unacknowledged unicast once, as `acked == false`.

use core::convert::Infallible;

use crate::consts::{BROADCAST_ADDRESS, MAX_PAYLOAD_LEN};

/// Interrupt vector bit: a packet is waiting in the receive FIFO.
pub const IRQ_RX_READY: u8 = 0x40;
/// Interrupt vector bit: the transmit FIFO was sent (and acked, if asked).
pub const IRQ_TX_SENT: u8 = 0x20;
/// Interrupt vector bit: automatic retransmits ran out without an ack.
pub const IRQ_MAX_RETRY: u8 = 0x10;
/// All three interrupt bits.
pub const IRQ_ALL: u8 = IRQ_RX_READY | IRQ_TX_SENT | IRQ_MAX_RETRY;
/// Mask of the receive pipe number within the interrupt vector.
const IRQ_PIPE_MASK: u8 = 0b1110;

/// The register-level transceiver operations the link needs.
///
/// Implementations wrap the SPI transport and register map; none of these
/// calls may block for longer than a register access.
pub trait Transceiver {
    /// Reads the interrupt/status vector.
    fn status(&mut self) -> u8;
    /// Clears the given interrupt bits on the device.
    fn clear_irq(&mut self, mask: u8);
    /// Powers up in primary-receive mode on `unicast_addr`, clears all
    /// interrupts, flushes the transmit FIFO and starts listening.
    fn enter_rx(&mut self, unicast_addr: u16);
    /// Re-asserts listening after a received packet has been read.
    fn listen(&mut self);
    /// Stops listening, flushes the receive FIFO and configures primary
    /// transmit towards `dest`, requesting an ack if `ack` is set.
    fn prepare_tx(&mut self, dest: u16, ack: bool);
    /// Loads `payload` into the transmit FIFO.
    fn write_fifo(&mut self, payload: &[u8], ack: bool);
    /// Starts the transmission of the loaded FIFO.
    fn fire(&mut self);
    /// Reads the received payload into `buf`.
    fn read_payload(&mut self, buf: &mut [u8]);
    /// Selects the RF channel.
    fn set_channel(&mut self, channel: u8);
    /// Returns `true` if the device answers its register self-test.
    fn self_test(&mut self) -> bool;
}

/// Where the link is in its receive/transmit cycle.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LinkState {
    /// Not yet initialized.
    #[default]
    Boot,
    /// Being configured for receive.
    RxInit,
    /// Listening for packets. Idle.
    RxListen,
    /// A received packet is being handed to the receive callback.
    RxReady,
    /// Being configured for transmit.
    TxInit,
    /// The transmit FIFO is being loaded.
    TxFifo,
    /// A transmission is in flight.
    TxSend,
    /// A transmission finished; the done callback is running.
    TxDone,
}

impl LinkState {
    /// Whether a new transmission may be started from this state.
    pub const fn tx_allowed(self) -> bool {
        matches!(self, LinkState::RxListen | LinkState::RxReady | LinkState::TxDone)
    }
}

/// Callbacks invoked from [`RadioLink::service_interrupt`].
pub trait LinkHandler<T: Transceiver> {
    /// A packet arrived on `pipe`. `payload` is only valid for the duration
    /// of the call. May call [`RadioLink::transmit`].
    fn rx_done(&mut self, link: &mut RadioLink<T>, payload: &[u8], pipe: u8);
    /// The transceiver reported a sent or max-retry signal. `acked` is
    /// `false` only when an ack was requested and never came. Fires even
    /// for a stray signal outside a transmission. May call
    /// [`RadioLink::transmit`].
    fn tx_done(&mut self, link: &mut RadioLink<T>, acked: bool);
}

/// Arbiter of a single transceiver.
#[derive(Debug)]
pub struct RadioLink<T>
where
    T: Transceiver,
{
    /// The wrapped transceiver.
    pub radio: T,
    state: LinkState,
    unicast_addr: u16,
    payload_len: usize,
    /// Number of transmissions started.
    pub tx_started: u16,
    /// Number of packets handed to the receive callback.
    pub rx_good: u16,
}

impl<T> RadioLink<T>
where
    T: Transceiver,
{
    /// Wraps `radio`, which exchanges fixed `payload_len`-byte payloads
    /// (clamped to [`MAX_PAYLOAD_LEN`]). The link starts in [`LinkState::Boot`];
    /// call [`RadioLink::start`] to begin listening.
    pub fn new(radio: T, unicast_addr: u16, payload_len: usize) -> Self {
        RadioLink {
            radio,
            state: LinkState::Boot,
            unicast_addr,
            payload_len: payload_len.min(MAX_PAYLOAD_LEN),
            tx_started: 0,
            rx_good: 0,
        }
    }

    /// The current link state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// The address this link listens on for unicast packets.
    pub fn unicast_addr(&self) -> u16 {
        self.unicast_addr
    }

    /// Changes the unicast address; applies the next time listening starts.
    pub fn set_unicast_addr(&mut self, addr: u16) {
        self.unicast_addr = addr;
    }

    fn set_state(&mut self, state: LinkState) {
        if self.state != state {
            trace!("link {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    /// Leaves [`LinkState::Boot`] and starts listening.
    pub fn start(&mut self) {
        self.enter_rx();
    }

    fn enter_rx(&mut self) {
        self.set_state(LinkState::RxInit);
        self.radio.enter_rx(self.unicast_addr);
        self.set_state(LinkState::RxListen);
    }

    /// Whether a call to [`RadioLink::transmit`] would be accepted now.
    pub fn tx_avail(&self) -> bool {
        self.state.tx_allowed()
    }

    /// Non-blocking availability check, for use with `nb::block!`.
    pub fn poll_tx_avail(&self) -> nb::Result<(), Infallible> {
        if self.tx_avail() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Starts transmitting `payload` to `dest` (or [`BROADCAST_ADDRESS`]).
    ///
    /// `no_ack` only matters for unicast destinations; broadcasts are never
    /// acknowledged. Returns `WouldBlock` without touching the radio when
    /// the link is busy, which callers are expected to have checked with
    /// [`RadioLink::tx_avail`].
    pub fn transmit(&mut self, dest: u16, no_ack: bool, payload: &[u8]) -> nb::Result<(), Infallible> {
        self.poll_tx_avail()?;
        let ack = dest != BROADCAST_ADDRESS && !no_ack;
        let len = payload.len().min(self.payload_len);

        self.set_state(LinkState::TxInit);
        self.radio.prepare_tx(dest, ack);

        self.set_state(LinkState::TxFifo);
        self.radio.write_fifo(&payload[..len], ack);

        self.set_state(LinkState::TxSend);
        self.radio.fire();
        self.tx_started = self.tx_started.wrapping_add(1);
        Ok(())
    }

    /// Services a pending transceiver interrupt, dispatching to `handler`.
    ///
    /// Must be called from the main loop, never from the ISR itself.
    pub fn service_interrupt<H>(&mut self, handler: &mut H)
    where
        H: LinkHandler<T>,
    {
        let iv = self.radio.status();
        if iv & IRQ_ALL == 0 {
            trace!("spurious radio interrupt {}", iv);
            return;
        }

        if iv & IRQ_MAX_RETRY != 0 {
            self.set_state(LinkState::TxDone);
        }
        if iv & IRQ_TX_SENT != 0 && self.state == LinkState::TxSend {
            self.set_state(LinkState::TxDone);
        }

        if iv & (IRQ_TX_SENT | IRQ_MAX_RETRY) != 0 {
            self.radio.clear_irq(IRQ_ALL);
            handler.tx_done(self, iv & IRQ_MAX_RETRY == 0);
            // Only a finished transmission re-arms; the callback may also
            // have started another one.
            if self.state == LinkState::TxDone {
                self.enter_rx();
            }
        }

        if iv & IRQ_RX_READY != 0 && self.state == LinkState::RxListen {
            self.set_state(LinkState::RxReady);
            let mut buf = [0u8; MAX_PAYLOAD_LEN];
            let len = self.payload_len;
            self.radio.read_payload(&mut buf[..len]);
            self.rx_good = self.rx_good.wrapping_add(1);
            handler.rx_done(self, &buf[..len], (iv & IRQ_PIPE_MASK) >> 1);
            if self.state == LinkState::RxReady {
                self.radio.clear_irq(IRQ_RX_READY);
                self.radio.listen();
                self.set_state(LinkState::RxListen);
            }
        }
    }

    /// Selects the RF channel.
    pub fn set_channel(&mut self, channel: u8) {
        self.radio.set_channel(channel);
    }

    /// Runs the transceiver self-test.
    pub fn self_test(&mut self) -> bool {
        self.radio.self_test()
    }
}
