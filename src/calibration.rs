//! Blind radio channel search.
//!
//! The badge listens on each of [`FREQ_NUM`] candidate channels for
//! [`CALIBRATION_SECS_PER_FREQ`] seconds, counting every packet it hears
//! (valid or not). After the last candidate the busiest channel wins. A
//! badge that has not finished first-time setup and heard nothing at all
//! starts the sweep over; otherwise the winner is locked in.
//!
//! [`Calibration`] only decides; retuning the radio and persisting the
//! result is up to the caller, driven by the returned [`CalibrationStep`].

use crate::consts::{CALIBRATION_SECS_PER_FREQ, FREQ_MIN, FREQ_NUM};

/// What the caller should do after a calibration second.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum CalibrationStep {
    /// Calibration is not running.
    Idle,
    /// Keep listening on the current channel.
    Listening,
    /// Tune the radio to this candidate channel.
    Retune(u8),
    /// Calibration finished; tune to and store this channel.
    Done(u8),
}

/// Channel sweep state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Calibration {
    frequency: u8,
    counts: [u16; FREQ_NUM],
    done: bool,
    secs_left: u8,
}

impl Calibration {
    /// Resumes from stored state: the last channel and whether it was final.
    pub const fn resume(frequency: u8, done: bool) -> Self {
        let frequency = if !done && (frequency < FREQ_MIN || frequency >= FREQ_MIN + FREQ_NUM as u8) {
            FREQ_MIN
        } else {
            frequency
        };
        Calibration {
            frequency,
            counts: [0; FREQ_NUM],
            done,
            secs_left: CALIBRATION_SECS_PER_FREQ,
        }
    }

    /// Restarts the sweep at the first candidate, forgetting any result.
    pub fn start(&mut self) {
        info!("starting channel calibration");
        *self = Calibration::resume(FREQ_MIN, false);
    }

    /// Whether a channel has been locked in.
    pub fn done(&self) -> bool {
        self.done
    }

    /// The channel the radio should be on.
    pub fn frequency(&self) -> u8 {
        self.frequency
    }

    /// Packets heard on candidate `index` so far.
    pub fn count(&self, index: usize) -> u16 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Counts one received packet against the current candidate. Ignored
    /// once calibration is done.
    pub fn count_rx(&mut self) {
        if self.done {
            return;
        }
        let index = usize::from(self.frequency - FREQ_MIN);
        if let Some(count) = self.counts.get_mut(index) {
            *count = count.saturating_add(1);
        }
    }

    /// Advances the sweep by one second.
    pub fn second(&mut self, bootstrapped: bool) -> CalibrationStep {
        if self.done {
            return CalibrationStep::Idle;
        }
        if self.secs_left > 0 {
            self.secs_left -= 1;
            return CalibrationStep::Listening;
        }
        self.secs_left = CALIBRATION_SECS_PER_FREQ;

        let next = usize::from(self.frequency - FREQ_MIN) + 1;
        if next < FREQ_NUM {
            self.frequency += 1;
            debug!("calibration trying channel {}", self.frequency);
            return CalibrationStep::Retune(self.frequency);
        }

        // Strictly greater, so ties go to the lowest channel.
        let mut best = 0;
        for (index, &count) in self.counts.iter().enumerate() {
            if count > self.counts[best] {
                best = index;
            }
        }
        let best_count = self.counts[best];
        if best_count > 0 || bootstrapped {
            self.frequency = FREQ_MIN + best as u8;
            self.done = true;
            info!("calibrated to channel {} ({} packets)", self.frequency, best_count);
            CalibrationStep::Done(self.frequency)
        } else {
            info!("calibration heard nothing, sweeping again");
            self.frequency = FREQ_MIN;
            self.counts = [0; FREQ_NUM];
            CalibrationStep::Retune(self.frequency)
        }
    }
}
