//! Streams 16 kHz mono 16-bit signed little-endian PCM from stdin and prints
//! utterance boundary transitions as they're detected. Stop with Ctrl-C.
//!
//! Typical producers:
//!   arecord -r 16000 -c 1 -f S16_LE | detect_utter --go
//!   ffmpeg -y -f alsa -ac 1 -i default -ar 16000 -f s16le -acodec pcm_s16le /dev/stdout | detect_utter --go

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use wordrec::{Config, Context};

const READ_SAMPS: usize = 128;

#[derive(Parser)]
#[command(about = "Detect utterance boundaries in a streamed PCM feed")]
struct Args {
    /// Confirms intent to read from stdin until interrupted.
    #[arg(long)]
    go: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if !args.go {
        eprintln!("refusing to run without --go (reads stdin until Ctrl-C)");
        std::process::exit(1);
    }

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
        ctx.feed_input(&samples)?;
        ctx.detect_utterances();

        let now_in_utterance = ctx.utterance_state() == 1;
        if !in_utterance && now_in_utterance {
            println!("Utterance detected.");
            std::io::stdout().flush().ok();
        }
        if in_utterance && !now_in_utterance {
            println!("Utterance over.");
            std::io::stdout().flush().ok();
        }
        in_utterance = now_in_utterance;
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

