//! Feature vectors and their FIFO.
//!
//! The reference implementation keeps a doubly linked list of feature
//! vectors with raw back-pointers and a separately tracked "utterance start"
//! pointer into the same list, while concurrently trimming the head. Per
//! spec §9 this is re-architected as a numbered deque: a feature vector's
//! `number` is a stable 64-bit key, and "cursor" values used by the VAD are
//! plain `u64`s rather than pointers, so there is no dangling-pointer hazard
//! after garbage collection.

use std::collections::VecDeque;

use crate::frontend::RawFeatures;
use crate::frontend::mel::CEPSTRAL_COEFFS;

/// One completed frame's worth of features.
#[derive(Debug, Clone, Copy)]
pub struct FeatureVector {
    /// Monotonically increasing, gapless, numbered from 1.
    pub number: u64,
    pub log_energy: f32,
    pub cepstrum: [f32; CEPSTRAL_COEFFS],
    /// Snapshot of the noise-floor estimate at the time this vector was
    /// emitted.
    pub noise_floor: f32,
}

/// Numbered FIFO of feature vectors, backed by a ring buffer (`VecDeque`)
/// rather than a heap-allocated linked list.
#[derive(Default)]
pub struct FeatureFifo {
    deque: VecDeque<FeatureVector>,
    next_number: u64,
}

impl FeatureFifo {
    pub fn new() -> Self {
        Self {
            deque: VecDeque::new(),
            next_number: 1,
        }
    }

    pub fn reset(&mut self) {
        self.deque.clear();
        self.next_number = 1;
    }

    /// Numbers and appends a newly computed frame's features, snapshotting
    /// `noise_floor`, and returns the assigned number.
    pub fn push(&mut self, raw: RawFeatures, noise_floor: f32) -> u64 {
        let number = self.next_number;
        self.next_number += 1;
        self.deque.push_back(FeatureVector {
            number,
            log_energy: raw.log_energy,
            cepstrum: raw.cepstrum,
            noise_floor,
        });
        number
    }

    pub fn is_empty(&self) -> bool {
        self.deque.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deque.len()
    }

    pub fn front_number(&self) -> Option<u64> {
        self.deque.front().map(|fv| fv.number)
    }

    pub fn back_number(&self) -> Option<u64> {
        self.deque.back().map(|fv| fv.number)
    }

    /// Pops and returns the oldest feature vector, if any.
    pub fn pop_front(&mut self) -> Option<FeatureVector> {
        self.deque.pop_front()
    }

    /// Looks up a feature vector by its stable number in O(1).
    pub fn get(&self, number: u64) -> Option<&FeatureVector> {
        let front = self.front_number()?;
        if number < front {
            return None;
        }
        self.deque.get((number - front) as usize)
    }

    /// Walks backward from `number` by up to `steps` predecessor links,
    /// never going past the head of the FIFO, and returns the resulting
    /// number.
    pub fn back_up(&self, number: u64, steps: u64) -> u64 {
        let front = match self.front_number() {
            Some(f) => f,
            None => return number,
        };
        number.saturating_sub(steps).max(front)
    }

    /// Drops every feature vector whose number is strictly less than
    /// `oldest_needed`.
    pub fn gc(&mut self, oldest_needed: u64) {
        while let Some(front) = self.deque.front() {
            if front.number < oldest_needed {
                self.deque.pop_front();
            } else {
                break;
            }
        }
    }

    /// Copies the inclusive span `[start..=end]` into a flat owned vector.
    /// `end = None` means "to the current tail" (one-shot mode).
    pub fn copy_span(&self, start: u64, end: Option<u64>) -> Vec<FeatureVector> {
        let end = end.unwrap_or_else(|| self.back_number().unwrap_or(start));
        let front = match self.front_number() {
            Some(f) => f,
            None => return Vec::new(),
        };
        if start < front {
            return Vec::new();
        }
        let start_idx = (start - front) as usize;
        let end_idx = (end - front) as usize;
        self.deque
            .iter()
            .skip(start_idx)
            .take(end_idx.saturating_sub(start_idx) + 1)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(log_energy: f32) -> RawFeatures {
        RawFeatures {
            log_energy,
            cepstrum: [0.0; CEPSTRAL_COEFFS],
        }
    }

    #[test]
    fn numbers_are_strictly_increasing_and_gapless() {
        let mut fifo = FeatureFifo::new();
        for i in 0..10 {
            let n = fifo.push(raw(i as f32), 0.0);
            assert_eq!(n, i as u64 + 1);
        }
    }

    #[test]
    fn gc_drops_only_stale_entries() {
        let mut fifo = FeatureFifo::new();
        for i in 0..20 {
            fifo.push(raw(i as f32), 0.0);
        }
        fifo.gc(15);
        assert_eq!(fifo.front_number(), Some(15));
        assert_eq!(fifo.len(), 6);
    }

    #[test]
    fn copy_span_is_inclusive() {
        let mut fifo = FeatureFifo::new();
        for i in 0..10 {
            fifo.push(raw(i as f32), 0.0);
        }
        let span = fifo.copy_span(3, Some(5));
        assert_eq!(span.len(), 3);
        assert_eq!(span[0].number, 3);
        assert_eq!(span[2].number, 5);
    }

    #[test]
    fn back_up_never_crosses_the_head() {
        let mut fifo = FeatureFifo::new();
        for i in 0..3 {
            fifo.push(raw(i as f32), 0.0);
        }
        assert_eq!(fifo.back_up(2, 8), 1);
    }
}
