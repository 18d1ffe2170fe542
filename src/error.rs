//! Error kinds returned by the public API.
//!
//! See spec §7: `UsageError` is a caller-contract violation (the `Context`
//! remains usable afterwards), `IoError`/`Corrupt` cover model and CSV I/O,
//! and `Alloc` stands in for the (treated-as-fatal) allocation failure kind.
//! None of the no-op cases enumerated in §7 (empty feed, empty detect, empty
//! recognize, absent result) construct an `Error` at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Caller contract violated: odd-length buffer under downmix, zero FFT
    /// length not a power of two, etc. The `Context` remains usable.
    #[error("usage error: {0}")]
    Usage(String),

    /// Model file or CSV file missing, or an I/O failure while reading it.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A model or CSV file parsed partially but hit a short read or
    /// malformed field before completing an entry/record.
    #[error("corrupt data at {context}")]
    Corrupt { context: String },

    /// Allocation failure. Rust aborts on real allocation failure, so this
    /// variant exists only for interface parity with spec §7.
    #[error("allocation failure")]
    Alloc,
}

pub type Result<T> = std::result::Result<T, Error>;
