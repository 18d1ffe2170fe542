//! Streams 16 kHz mono 16-bit signed little-endian PCM from stdin, loads a
//! model, and prints recognized words as utterances complete. Stop with
//! Ctrl-C.

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use wordrec::{Config, Context};

const READ_SAMPS: usize = 128;

#[derive(Parser)]
#[command(about = "Recognize isolated words from a streamed PCM feed")]
struct Args {
    /// Path to a trained model file.
    speech_model: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let keep_reading = Arc::new(AtomicBool::new(true));
    {
        let flag = keep_reading.clone();
        ctrlc::set_handler(move || {
            println!("SIGINT caught, stopping.");
            flag.store(false, Ordering::SeqCst);
        })?;
    }

    let mut ctx = Context::new(Config {
        input_sample_rate: 16_000,
        mode: wordrec::Mode::FreeRunning,
        ..Config::default()
    });
    let loaded = ctx
        .load_model(&args.speech_model)
        .with_context(|| format!("loading model '{}'", args.speech_model.display()))?;
    println!("Loaded up {} words.", loaded);

    let stdin = std::io::stdin();
    let mut lock = stdin.lock();
    let mut raw = [0u8; READ_SAMPS * 2];
    let mut in_utterance = false;
    while keep_reading.load(Ordering::SeqCst) {
        let read = read_fill(&mut lock, &mut raw)?;
        if read == 0 {
            break;
        }
        let samples = decode_i16_le(&raw[..read]);
        ctx.recognize(&samples)?;

        let now_in_utterance = ctx.utterance_state() == 1;
        if !in_utterance && now_in_utterance {
            println!("Utterance detected.");
        }
        if in_utterance && !now_in_utterance {
            println!("Utterance over.");
        }
        in_utterance = now_in_utterance;

        let word_names: Vec<String> = ctx.word_names().into_iter().map(String::from).collect();
        while let Some((word_index, score)) = ctx.get_result() {
            let name = word_names.get(word_index).map(String::as_str).unwrap_or("?");
            println!("=== {} ({:.3})", name, score);
        }
    }

    log::info!("processed {} samples", ctx.processed_samples());
    Ok(())
}

fn read_fill(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn decode_i16_le(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}
