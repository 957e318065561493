//! Presence protocol ("queerdar") and the boop flood.
//!
//! [`PresenceProtocol`] sits on top of a [`RadioLink`] as its
//! [`LinkHandler`]. It:
//!
//! - validates every received packet and drops the bad ones quietly,
//! - refreshes the [`PresenceTable`] on beacons and boops from other badges,
//! - relays boops with one hop fewer until the hop budget runs out,
//! - ages the table and broadcasts a beacon once per protocol interval,
//! - counts traffic per channel while [`Calibration`] is running.
//!
//! The protocol never calls into the display or the durable configuration.
//! Whatever the rest of the badge needs to react to is queued as a
//! [`ProtocolEvent`] and drained with [`PresenceProtocol::next_event`].

use core::convert::Infallible;

use heapless::Deque;

use crate::calibration::{Calibration, CalibrationStep};
use crate::consts::{BADGE_ID_UNASSIGNED, BROADCAST_ADDRESS};
use crate::link::{LinkHandler, RadioLink, Transceiver};
use crate::packet::{MsgType, Packet};
use crate::presence::PresenceTable;

/// Depth of the event queue between the protocol and the badge.
pub const EVENT_QUEUE_LEN: usize = 16;

/// Something the rest of the badge should react to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ProtocolEvent {
    /// Another badge booped; show the boop face.
    Boop,
    /// A peer came into range. Record it as seen and alert.
    PeerInRange(u16),
    /// The number of badges in range changed to this value.
    InRangeChanged(u8),
}

/// Application protocol state.
#[derive(Debug)]
pub struct PresenceProtocol {
    local_id: u16,
    table: PresenceTable,
    calibration: Calibration,
    game_enabled: bool,
    events: Deque<ProtocolEvent, EVENT_QUEUE_LEN>,
    /// Received buffers that failed validation.
    pub dropped: u16,
}

impl PresenceProtocol {
    /// A protocol instance for `local_id`, resuming `calibration`.
    ///
    /// The game (sightings, boops, beacons) starts disabled; see
    /// [`PresenceProtocol::set_game_enabled`].
    pub fn new(local_id: u16, calibration: Calibration) -> Self {
        PresenceProtocol {
            local_id,
            table: PresenceTable::new(),
            calibration,
            game_enabled: false,
            events: Deque::new(),
            dropped: 0,
        }
    }

    /// This badge's id.
    pub fn local_id(&self) -> u16 {
        self.local_id
    }

    /// Changes this badge's id.
    pub fn set_local_id(&mut self, id: u16) {
        self.local_id = id;
    }

    /// Whether sightings and boops are processed.
    pub fn game_enabled(&self) -> bool {
        self.game_enabled
    }

    /// Allows or blocks the game. Calibration counting runs either way.
    pub fn set_game_enabled(&mut self, enabled: bool) {
        self.game_enabled = enabled;
    }

    /// The presence table.
    pub fn table(&self) -> &PresenceTable {
        &self.table
    }

    /// Number of other badges in range.
    pub fn in_range(&self) -> u8 {
        self.table.in_range()
    }

    /// The channel search state.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Pops the oldest pending event.
    pub fn next_event(&mut self) -> Option<ProtocolEvent> {
        self.events.pop_front()
    }

    fn push_event(&mut self, event: ProtocolEvent) {
        if self.events.push_back(event).is_err() {
            warn!("protocol event queue full, dropping {:?}", event);
        }
    }

    /// Tunes the link to the current calibration channel.
    pub fn tune<T: Transceiver>(&self, link: &mut RadioLink<T>) {
        link.set_channel(self.calibration.frequency());
    }

    /// Restarts the channel search from the first candidate.
    pub fn start_calibration<T: Transceiver>(&mut self, link: &mut RadioLink<T>) {
        self.calibration.start();
        self.tune(link);
    }

    /// One second of calibration; retunes the link when the sweep moves on.
    pub fn calibration_second<T: Transceiver>(&mut self, link: &mut RadioLink<T>, bootstrapped: bool) -> CalibrationStep {
        let step = self.calibration.second(bootstrapped);
        if let CalibrationStep::Retune(channel) | CalibrationStep::Done(channel) = step {
            link.set_channel(channel);
        }
        step
    }

    /// The once-per-interval work: age every peer, then broadcast a beacon.
    ///
    /// Callers should only get here when [`RadioLink::tx_avail`] holds;
    /// otherwise nothing happens and `WouldBlock` is returned.
    pub fn interval<T: Transceiver>(&mut self, link: &mut RadioLink<T>) -> nb::Result<(), Infallible> {
        link.poll_tx_avail()?;
        if self.table.age() {
            self.push_event(ProtocolEvent::InRangeChanged(self.table.in_range()));
        }
        link.transmit(BROADCAST_ADDRESS, true, &Packet::beacon(self.local_id).encode())
    }

    /// Broadcasts a boop on behalf of `origin` with `hops` relays left.
    pub fn boop<T: Transceiver>(&mut self, link: &mut RadioLink<T>, origin: u16, hops: u8) -> nb::Result<(), Infallible> {
        link.transmit(BROADCAST_ADDRESS, true, &Packet::boop(origin, hops).encode())
    }

    /// A beacon (or boop) from `id` was heard.
    fn sighting(&mut self, id: u16) {
        if id == BADGE_ID_UNASSIGNED || id == self.local_id {
            return;
        }
        if self.table.refresh(id) {
            self.push_event(ProtocolEvent::InRangeChanged(self.table.in_range()));
            self.push_event(ProtocolEvent::PeerInRange(id));
        }
    }
}

impl<T: Transceiver> LinkHandler<T> for PresenceProtocol {
    fn rx_done(&mut self, link: &mut RadioLink<T>, payload: &[u8], _pipe: u8) {
        self.calibration.count_rx();

        let packet = match Packet::decode(payload) {
            Ok(packet) => packet,
            Err(_e) => {
                self.dropped = self.dropped.wrapping_add(1);
                debug!("dropped packet: {:?}", _e);
                return;
            }
        };

        if !self.game_enabled {
            return;
        }

        match packet.msg_type {
            MsgType::Boop => {
                if packet.peer_id == self.local_id {
                    return;
                }
                self.push_event(ProtocolEvent::Boop);
                if packet.msg_payload > 0 {
                    // Relay straight from the receive callback.
                    let _ = self.boop(link, packet.peer_id, packet.msg_payload - 1);
                }
                self.sighting(packet.peer_id);
            }
            MsgType::Beacon => self.sighting(packet.peer_id),
            MsgType::Ack | MsgType::Unknown(_) => {}
        }
    }

    fn tx_done(&mut self, _link: &mut RadioLink<T>, acked: bool) {
        if !acked {
            debug!("transmission not acknowledged");
        }
    }
}
