//! Recognition template loading.
//!
//! The on-disk format is a flat concatenation of entries, little-endian,
//! read with fixed-width reads through `std::io::Read`, distinguishing a
//! clean EOF (a zero-length read exactly at a `name_length` field) from a
//! short read partway through an entry.

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::frontend::mel::CEPSTRAL_COEFFS;

pub const COVARIANCE_ENTRIES: usize = CEPSTRAL_COEFFS * CEPSTRAL_COEFFS;

/// A single-frame Gaussian emission model.
#[derive(Debug, Clone)]
pub struct Gaussian {
    pub log_likelihood_offset: f32,
    pub cepstrum_mean: [f32; CEPSTRAL_COEFFS],
    /// Row-major 13x13 inverse covariance matrix.
    pub cepstrum_inverse_covariance: Vec<f32>,
}

impl Gaussian {
    /// `offset - 0.5 * (c - mean)^T * inv_cov * (c - mean)`.
    pub fn log_likelihood(&self, cepstrum: &[f32; CEPSTRAL_COEFFS]) -> f32 {
        let mut delta = [0.0f32; CEPSTRAL_COEFFS];
        for i in 0..CEPSTRAL_COEFFS {
            delta[i] = cepstrum[i] - self.cepstrum_mean[i];
        }
        let mut quad = 0.0f32;
        for i in 0..CEPSTRAL_COEFFS {
            for j in 0..CEPSTRAL_COEFFS {
                quad += delta[i] * self.cepstrum_inverse_covariance[j + i * CEPSTRAL_COEFFS] * delta[j];
            }
        }
        self.log_likelihood_offset - 0.5 * quad
    }
}

/// One word's recognition entry: name, affine score calibration, and its
/// ordered sequence of Gaussians.
#[derive(Debug, Clone)]
pub struct Template {
    pub index: usize,
    pub name: String,
    pub ll_offset: f32,
    pub ll_slope: f32,
    pub gaussians: Vec<Gaussian>,
}

/// A loaded model: every template plus the word-name table indexed by word
/// index.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub templates: Vec<Template>,
}

impl Model {
    pub fn word_names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut model = Self::default();
        model.load_into(path)?;
        Ok(model)
    }

    /// Parses entries from `path` and appends them to `self`, until EOF. A
    /// short read at any field after the initial `name_length` is an error;
    /// entries successfully parsed before the error remain appended to
    /// `self` even when this call returns `Err`.
    ///
    /// Returns the number of entries added by this call.
    pub fn load_into(&mut self, path: &Path) -> Result<usize> {
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = file;
        let added_before = self.templates.len();
        loop {
            let name_length = match read_u32_or_eof(&mut reader)? {
                Some(n) => n,
                None => break, // clean EOF
            };
            let entry = read_entry(&mut reader, name_length as usize, self.templates.len())
                .map_err(|_| {
                    log::warn!(
                        "short read in '{}' at entry {}; keeping {} entries already parsed",
                        path.display(),
                        self.templates.len(),
                        self.templates.len()
                    );
                    Error::Corrupt {
                        context: format!("{}: entry {}", path.display(), self.templates.len()),
                    }
                })?;
            self.templates.push(entry);
        }
        Ok(self.templates.len() - added_before)
    }
}

/// Upper bounds on file-supplied length fields, so a corrupt or adversarial
/// model file can't make `read_entry` attempt a multi-gigabyte allocation
/// before the short-read check ever has a chance to fail it cleanly.
const MAX_NAME_LENGTH: usize = 4_096;
const MAX_TEMPLATE_LENGTH: usize = 1_000_000;

fn read_entry(reader: &mut impl Read, name_length: usize, index: usize) -> std::io::Result<Template> {
    if name_length > MAX_NAME_LENGTH {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("name_length {name_length} exceeds {MAX_NAME_LENGTH}"),
        ));
    }
    let mut name_bytes = vec![0u8; name_length];
    reader.read_exact(&mut name_bytes)?;
    let name = String::from_utf8_lossy(&name_bytes).into_owned();

    let ll_offset = read_f32(reader)?;
    let ll_slope = read_f32(reader)?;
    let template_length = read_u32(reader)? as usize;
    if template_length > MAX_TEMPLATE_LENGTH {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("template_length {template_length} exceeds {MAX_TEMPLATE_LENGTH}"),
        ));
    }

    let mut gaussians = Vec::with_capacity(template_length);
    for _ in 0..template_length {
        let log_likelihood_offset = read_f32(reader)?;
        let mut cepstrum_mean = [0.0f32; CEPSTRAL_COEFFS];
        for slot in cepstrum_mean.iter_mut() {
            *slot = read_f32(reader)?;
        }
        let mut cepstrum_inverse_covariance = Vec::with_capacity(COVARIANCE_ENTRIES);
        for _ in 0..COVARIANCE_ENTRIES {
            cepstrum_inverse_covariance.push(read_f32(reader)?);
        }
        gaussians.push(Gaussian {
            log_likelihood_offset,
            cepstrum_mean,
            cepstrum_inverse_covariance,
        });
    }

    Ok(Template {
        index,
        name,
        ll_offset,
        ll_slope,
        gaussians,
    })
}

fn read_u32(reader: &mut impl Read) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Reads a `u32` unless the very first byte hits a clean EOF (zero-length
/// read), which is the documented end-of-entries signal.
fn read_u32_or_eof(reader: &mut impl Read) -> Result<Option<u32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(Error::Corrupt {
                    context: "short read in name_length".to_string(),
                })
            }
            Ok(n) => filled += n,
            Err(e) => {
                return Err(Error::Io {
                    path: std::path::PathBuf::new(),
                    source: e,
                })
            }
        }
    }
    Ok(Some(u32::from_le_bytes(buf)))
}

fn read_f32(reader: &mut impl Read) -> std::io::Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

/// Serializes a model back to disk in the same format `load` reads
/// (used by training tools and by tests that round-trip a synthetic model).
pub fn write_model(path: &Path, templates: &[Template]) -> Result<()> {
    use std::io::Write;
    let mut file = std::fs::File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    for t in templates {
        file.write_all(&(t.name.len() as u32).to_le_bytes())
            .and_then(|_| file.write_all(t.name.as_bytes()))
            .and_then(|_| file.write_all(&t.ll_offset.to_le_bytes()))
            .and_then(|_| file.write_all(&t.ll_slope.to_le_bytes()))
            .and_then(|_| file.write_all(&(t.gaussians.len() as u32).to_le_bytes()))
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        for g in &t.gaussians {
            file.write_all(&g.log_likelihood_offset.to_le_bytes())
                .and_then(|_| {
                    for v in g.cepstrum_mean {
                        file.write_all(&v.to_le_bytes())?;
                    }
                    Ok(())
                })
                .and_then(|_| {
                    for v in &g.cepstrum_inverse_covariance {
                        file.write_all(&v.to_le_bytes())?;
                    }
                    Ok(())
                })
                .map_err(|source| Error::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_covariance() -> Vec<f32> {
        let mut m = vec![0.0f32; COVARIANCE_ENTRIES];
        for i in 0..CEPSTRAL_COEFFS {
            m[i * CEPSTRAL_COEFFS + i] = 1.0;
        }
        m
    }

    #[test]
    fn round_trips_a_single_word_model() {
        let path = tempfile_model_path("wordrec_model_roundtrip.bin");
        let template = Template {
            index: 0,
            name: "yes".to_string(),
            ll_offset: 0.0,
            ll_slope: 1.0,
            gaussians: vec![Gaussian {
                log_likelihood_offset: 0.0,
                cepstrum_mean: [0.1; CEPSTRAL_COEFFS],
                cepstrum_inverse_covariance: identity_covariance(),
            }],
        };
        write_model(&path, &[template]).unwrap();
        let model = Model::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(model.templates.len(), 1);
        assert_eq!(model.templates[0].name, "yes");
        assert_eq!(model.word_names(), vec!["yes"]);
    }

    #[test]
    fn short_read_retains_prior_entries() {
        let path = tempfile_model_path("wordrec_model_short_read.bin");
        let template = Template {
            index: 0,
            name: "no".to_string(),
            ll_offset: 0.0,
            ll_slope: 1.0,
            gaussians: vec![Gaussian {
                log_likelihood_offset: 0.0,
                cepstrum_mean: [0.0; CEPSTRAL_COEFFS],
                cepstrum_inverse_covariance: identity_covariance(),
            }],
        };
        write_model(&path, &[template]).unwrap();
        // Truncate the file mid-second-entry by appending a dangling name_length.
        {
            use std::io::Write;
            let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&5u32.to_le_bytes()).unwrap();
            file.write_all(b"ab").unwrap(); // shorter than the declared name length
        }
        let mut model = Model::default();
        let result = model.load_into(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
        // The entry parsed before the truncated one must still be retained.
        assert_eq!(model.templates.len(), 1);
        assert_eq!(model.templates[0].name, "no");
    }

    #[test]
    fn oversized_name_length_is_rejected_without_allocating() {
        let path = tempfile_model_path("wordrec_model_oversized_name.bin");
        // A declared name_length far beyond MAX_NAME_LENGTH must fail cleanly
        // rather than attempt a huge allocation.
        std::fs::write(&path, (u32::MAX).to_le_bytes()).unwrap();
        let mut model = Model::default();
        let result = model.load_into(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
        assert_eq!(model.templates.len(), 0);
    }

    fn tempfile_model_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}_{}", std::process::id(), name))
    }
}
