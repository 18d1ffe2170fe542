//! Streams 16 kHz mono 16-bit signed little-endian PCM from stdin, detects
//! utterances, and writes each one's feature vectors to a fresh CSV file in
//! an output directory. For collecting training data.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use wordrec::csv_io;
use wordrec::{Config, Context};

const READ_SAMPS: usize = 128;

#[derive(Parser)]
#[command(about = "Detect utterances and save each one's feature vectors as CSV")]
struct Args {
    /// Directory to write utter_<N>.csv files into.
    output_dir: PathBuf,
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
        ..Config::default()
    });

    let stdin = std::io::stdin();
    let mut lock = stdin.lock();
    let mut raw = [0u8; READ_SAMPS * 2];
    while keep_reading.load(Ordering::SeqCst) {
        let read = read_fill(&mut lock, &mut raw)?;
        if read == 0 {
            break;
        }
        let samples = decode_i16_le(&raw[..read]);
        ctx.feed_input(&samples)?;
        ctx.detect_utterances();

        while let Some(utterance) = ctx.pop_pending_utterance() {
            let path = next_free_path(&args.output_dir);
            log::info!("writing feature vectors to: '{}'", path.display());
            csv_io::append_feature_vectors(&path, &utterance.feature_vectors)?;
        }
    }

    log::info!("processed {} samples", ctx.processed_samples());
    Ok(())
}

fn next_free_path(dir: &Path) -> PathBuf {
    let mut number = 0;
    loop {
        let candidate = dir.join(format!("utter_{}.csv", number));
        if !candidate.exists() {
            return candidate;
        }
        number += 1;
    }
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
