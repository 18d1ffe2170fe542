//! Embeddable isolated-word speech recognizer: a streaming ES 201 108 MFCC
//! front end, an energy-based voice activity detector, cepstral mean
//! normalization, and DTW/Gaussian template scoring against a loaded model.
//!
//! The typical embedding loop is: build a [`Context`], optionally
//! [`Context::load_model`], then repeatedly call [`Context::feed_input`]
//! with raw audio and [`Context::recognize`] (or the lower-level
//! [`Context::detect_utterances`] / [`Context::recognize_utterances`] pair)
//! and drain [`Context::get_result`].

pub mod config;
pub mod context;
pub mod csv_io;
pub mod dtw;
pub mod error;
pub mod feature;
pub mod frame;
pub mod frontend;
pub mod model;
pub mod noise_floor;
pub mod resample;
pub mod utterance;
pub mod vad;

pub use config::{Config, Mode};
pub use context::Context;
pub use error::{Error, Result};
pub use model::Model;
