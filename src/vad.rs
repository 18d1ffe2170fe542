//! Energy-based utterance detection state machine.
//!
//! Two states, explicit per spec §9: `Idle` waits for a run of exciting
//! frames; `InUtterance` waits for a run of boring ones. Each call to
//! [`Vad::detect`] advances over every feature vector that has arrived since
//! the previous call exactly once (mirroring the reference implementation's
//! "only get past this line once per feature vector" invariant) and returns
//! every utterance span that closed during the pass.

use crate::feature::FeatureFifo;

pub const START_ENERGY_THRESHOLD: f32 = 5.0;
pub const STOP_ENERGY_THRESHOLD: f32 = 2.5;
pub const START_LENGTH: u32 = 4;
pub const STOP_LENGTH: u32 = 10;
pub const FRAMES_BACKED_UP: u64 = 8;
pub const FRAMES_DROPPED_FROM_END: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadState {
    Idle,
    InUtterance,
}

/// An utterance span, inclusive of both endpoints, as feature-vector numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u64,
    pub end: u64,
}

pub struct Vad {
    state: VadState,
    excitement: u32,
    boredom: u32,
    current: Option<u64>,
    utterance_start: Option<u64>,
}

impl Vad {
    pub fn new() -> Self {
        Self {
            state: VadState::Idle,
            excitement: 0,
            boredom: 0,
            current: None,
            utterance_start: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn state(&self) -> VadState {
        self.state
    }

    pub fn utterance_start(&self) -> Option<u64> {
        self.utterance_start
    }

    pub fn current(&self) -> Option<u64> {
        self.current
    }

    /// Advances over every feature vector newer than the last-processed one,
    /// returning the utterance spans (if any) that closed along the way.
    pub fn detect(&mut self, fifo: &FeatureFifo) -> Vec<Span> {
        let mut closed = Vec::new();
        let Some(back) = fifo.back_number() else {
            return closed;
        };
        let mut next = match self.current {
            None => fifo.front_number().unwrap_or(back),
            Some(c) if c < back => c + 1,
            _ => return closed,
        };
        loop {
            let Some(fv) = fifo.get(next) else { break };
            self.current = Some(fv.number);

            if fv.log_energy > fv.noise_floor + START_ENERGY_THRESHOLD {
                self.excitement += 1;
            } else {
                self.excitement = 0;
            }
            if fv.log_energy < fv.noise_floor + STOP_ENERGY_THRESHOLD {
                self.boredom += 1;
            } else {
                self.boredom = 0;
            }

            match self.state {
                VadState::Idle => {
                    if self.excitement >= START_LENGTH {
                        self.state = VadState::InUtterance;
                        self.utterance_start =
                            Some(fifo.back_up(fv.number, FRAMES_BACKED_UP));
                    }
                }
                VadState::InUtterance => {
                    if self.boredom >= STOP_LENGTH {
                        let start = self.utterance_start.unwrap_or(fv.number);
                        let end = fv.number.saturating_sub(FRAMES_DROPPED_FROM_END).max(start);
                        closed.push(Span { start, end });
                        self.state = VadState::Idle;
                        self.utterance_start = None;
                    }
                }
            }

            if fv.number == back {
                break;
            }
            next = fv.number + 1;
        }
        closed
    }

    /// The oldest feature-vector number that must be retained given the
    /// current cursor position.
    pub fn oldest_needed(&self) -> Option<u64> {
        match (self.utterance_start, self.current) {
            (Some(start), _) => Some(start),
            (None, Some(cur)) => Some(cur.saturating_sub(FRAMES_BACKED_UP)),
            (None, None) => None,
        }
    }
}

impl Default for Vad {
    fn default() -> Self {
        Self::new()
    }
}
