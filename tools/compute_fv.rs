//! Reads raw 16-bit signed little-endian mono audio and prints each
//! computed feature vector as CSV. For collecting training data.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use wordrec::Context;

const READ_SAMPS: usize = 512;

#[derive(Parser)]
#[command(about = "Compute feature vectors from raw audio and print them as CSV")]
struct Args {
    /// Sample rate of the input file.
    sample_rate: u32,
    /// Raw 16-bit signed little-endian PCM input file.
    input: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    log::info!("allocating context");
    let mut ctx = Context::new(wordrec::Config {
        input_sample_rate: args.sample_rate,
        ..wordrec::Config::default()
    });

    let mut file = std::fs::File::open(&args.input)
        .with_context(|| format!("opening '{}'", args.input.display()))?;
    let mut raw = [0u8; READ_SAMPS * 2];
    loop {
        let read = read_fill(&mut file, &mut raw)?;
        if read == 0 {
            break;
        }
        let samples = decode_i16_le(&raw[..read]);
        ctx.feed_input(&samples)?;
        for v in ctx.drain_feature_vectors() {
            print!("{}", v.log_energy);
            for c in v.cepstrum {
                print!(",{}", c);
            }
            println!();
        }
    }

    log::info!("processed {} samples", ctx.processed_samples());
    Ok(())
}

/// Reads into `buf` until full or EOF, returning the number of bytes filled.
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
