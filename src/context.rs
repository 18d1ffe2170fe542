//! Wires the DSP pipeline, VAD, model, and DTW scorer into the public API.

use std::collections::VecDeque;
use std::path::Path;

use crate::config::{Config, Mode};
use crate::dtw;
use crate::error::{Error, Result};
use crate::feature::{FeatureFifo, FeatureVector};
use crate::frame::FrameAssembler;
use crate::frontend::FrontEnd;
use crate::model::Model;
use crate::noise_floor::NoiseFloorTracker;
use crate::resample::{OffsetCompensator, Resampler};
use crate::utterance::Utterance;
use crate::vad::{Span, Vad, VadState};

/// Yields each incoming sample as a normalized `f32`, either one-to-one or
/// (under stereo downmix) summed pairwise, without boxing either shape.
enum RawSampleIter<'a> {
    Mono(std::slice::Iter<'a, i16>),
    Stereo(std::slice::ChunksExact<'a, i16>),
}

impl<'a> RawSampleIter<'a> {
    fn new(samples: &'a [i16], downmix_stereo: bool) -> Self {
        if downmix_stereo {
            RawSampleIter::Stereo(samples.chunks_exact(2))
        } else {
            RawSampleIter::Mono(samples.iter())
        }
    }
}

impl Iterator for RawSampleIter<'_> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        match self {
            RawSampleIter::Mono(it) => it.next().map(|&s| s as f32),
            RawSampleIter::Stereo(it) => it.next().map(|pair| pair[0] as f32 + pair[1] as f32),
        }
    }
}

/// Owns every stage of the pipeline for one recognition session: resampling,
/// framing, feature extraction, VAD, the loaded model, and pending results.
pub struct Context {
    config: Config,
    resampler: Resampler,
    offset_compensator: OffsetCompensator,
    framer: FrameAssembler,
    front_end: FrontEnd,
    noise_floor: NoiseFloorTracker,
    fifo: FeatureFifo,
    vad: Vad,
    pending_utterances: VecDeque<Utterance>,
    model: Model,
    results: VecDeque<(usize, f32)>,
    processed_samples: u64,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self {
            resampler: Resampler::new(config.input_sample_rate),
            offset_compensator: OffsetCompensator::new(),
            framer: FrameAssembler::new(),
            front_end: FrontEnd::new(),
            noise_floor: NoiseFloorTracker::new(),
            fifo: FeatureFifo::new(),
            vad: Vad::new(),
            pending_utterances: VecDeque::new(),
            model: Model::default(),
            results: VecDeque::new(),
            processed_samples: 0,
            config,
        }
    }

    /// Changes the sample rate and/or segmentation mode. Does not reset any
    /// buffered audio or pending state; callers that want a clean slate
    /// should build a fresh `Context`.
    pub fn configure(&mut self, config: Config) {
        self.resampler.set_input_rate(config.input_sample_rate);
        self.config = config;
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Number of raw samples consumed by `feed_input`, counted before
    /// stereo downmix pairing (one increment per element of `samples`).
    pub fn processed_samples(&self) -> u64 {
        self.processed_samples
    }

    /// `0` while idle, `1` while inside a detected utterance (free-running
    /// mode only; always `0` in one-shot mode between `detect_utterances`
    /// calls).
    pub fn utterance_state(&self) -> u8 {
        match self.vad.state() {
            VadState::Idle => 0,
            VadState::InUtterance => 1,
        }
    }

    pub fn word_names(&self) -> Vec<&str> {
        self.model.word_names()
    }

    pub fn load_model(&mut self, path: &Path) -> Result<usize> {
        let added = self.model.load_into(path)?;
        log::debug!(
            "loaded {} word(s) from '{}' ({} total)",
            added,
            path.display(),
            self.model.templates.len()
        );
        Ok(added)
    }

    /// Feeds raw 16-bit signed PCM samples through resampling, DC removal,
    /// framing, and feature extraction, pushing every completed feature
    /// vector into the FIFO. Under stereo downmix, an odd-length buffer is a
    /// caller-contract violation rather than a silent drop (spec §9: the
    /// original leaves this undefined; we reject it).
    pub fn feed_input(&mut self, samples: &[i16]) -> Result<()> {
        if self.config.input_sample_rate == 0 {
            return Err(Error::Usage(
                "input_sample_rate must be nonzero".to_string(),
            ));
        }
        if self.config.downmix_stereo && samples.len() % 2 != 0 {
            return Err(Error::Usage(format!(
                "downmix_stereo requires an even-length buffer, got {}",
                samples.len()
            )));
        }
        self.processed_samples += samples.len() as u64;

        // Stereo downmix sums the pair rather than averaging it (spec §4.1;
        // matches tinysr's `raw_sample += (float)*samples++`). An enum of
        // the two iterator shapes (rather than a boxed trait object) keeps
        // this per-buffer hot path allocation-free.
        let iter = RawSampleIter::new(samples, self.config.downmix_stereo);

        for raw in iter {
            let framer = &mut self.framer;
            let front_end = &mut self.front_end;
            let noise_floor = &mut self.noise_floor;
            let fifo = &mut self.fifo;
            let offset_compensator = &mut self.offset_compensator;
            self.resampler.push(raw, &mut |resampled| {
                let compensated = offset_compensator.process(resampled);
                framer.push(compensated, |frame| {
                    let raw_features = front_end.process_frame(frame);
                    let log_energy = raw_features.log_energy;
                    let floor = noise_floor.update(log_energy);
                    let number = fifo.push(raw_features, floor);
                    log::trace!("fv {number}: log_energy={log_energy:.2} noise_floor={floor:.2}");
                });
            });
        }
        Ok(())
    }

    /// Advances segmentation. In free-running mode this drives the VAD over
    /// every feature vector that arrived since the last call and materializes
    /// any utterances whose spans closed. In one-shot mode, every buffered
    /// feature vector becomes a single utterance and the FIFO is fully reset
    /// (spec: one-shot consumes the whole buffer each time it's called).
    pub fn detect_utterances(&mut self) {
        match self.config.mode {
            Mode::FreeRunning => {
                let spans: Vec<Span> = self.vad.detect(&self.fifo);
                for span in &spans {
                    let vectors = self.fifo.copy_span(span.start, Some(span.end));
                    if !vectors.is_empty() {
                        log::debug!(
                            "utterance closed: fv {}..={} ({} frames)",
                            span.start,
                            span.end,
                            vectors.len()
                        );
                        self.pending_utterances.push_back(Utterance::new(vectors));
                    }
                }
                if let Some(oldest) = self.vad.oldest_needed() {
                    self.fifo.gc(oldest);
                }
            }
            Mode::OneShot => {
                if let Some(start) = self.fifo.front_number() {
                    let vectors = self.fifo.copy_span(start, None);
                    if !vectors.is_empty() {
                        log::debug!("one-shot utterance: {} frames", vectors.len());
                        self.pending_utterances.push_back(Utterance::new(vectors));
                    }
                }
                self.fifo.reset();
                self.vad.reset();
            }
        }
    }

    /// Scores every pending utterance against every loaded template and
    /// queues the best match as a result. No-op if no model is loaded or no
    /// utterances are pending.
    ///
    /// Diverges from `tinysr.c` here: the original always appends a result
    /// (word index -1) even with zero templates loaded, since "best match"
    /// there is unconditional. With no templates, `argmax` has no candidate,
    /// so this drops the utterance instead of inventing a sentinel index.
    pub fn recognize_utterances(&mut self) {
        while let Some(utterance) = self.pending_utterances.pop_front() {
            if let Some(best) = dtw::best_match(&utterance, &self.model.templates) {
                self.results.push_back(best);
            }
        }
    }

    /// Convenience: feeds `samples`, advances segmentation, scores any
    /// newly-closed utterances, and returns the number of results now queued.
    pub fn recognize(&mut self, samples: &[i16]) -> Result<usize> {
        self.feed_input(samples)?;
        self.detect_utterances();
        self.recognize_utterances();
        Ok(self.results.len())
    }

    /// Pops the oldest queued result, if any, as `(word_index, score)`.
    pub fn get_result(&mut self) -> Option<(usize, f32)> {
        self.results.pop_front()
    }

    /// Pops the oldest detected utterance without scoring it, for callers
    /// collecting training data instead of recognizing (e.g. a CSV dumper).
    pub fn pop_pending_utterance(&mut self) -> Option<Utterance> {
        self.pending_utterances.pop_front()
    }

    /// Pops every feature vector currently sitting in the FIFO, bypassing
    /// segmentation entirely. Used by tools that dump raw per-frame features
    /// rather than whole utterances.
    pub fn drain_feature_vectors(&mut self) -> Vec<FeatureVector> {
        let mut out = Vec::with_capacity(self.fifo.len());
        while let Some(fv) = self.fifo.pop_front() {
            out.push(fv);
        }
        out
    }

    pub fn reset(&mut self) {
        self.resampler.reset();
        self.offset_compensator.reset();
        self.framer.reset();
        self.noise_floor.reset();
        self.fifo.reset();
        self.vad.reset();
        self.pending_utterances.clear();
        self.results.clear();
        self.processed_samples = 0;
    }
}
