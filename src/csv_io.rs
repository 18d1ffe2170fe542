//! CSV import/export for feature vectors.
//!
//! One row per feature vector: `log_energy,c0,c1,...,c12\n`, matching the
//! reference implementation's `write_feature_vector_csv` column order.
//! Only the 14 numeric columns round-trip; `number` and `noise_floor` are
//! not persisted, since downstream consumers (e.g. an offline template
//! trainer) only ever need the raw observation.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::feature::FeatureVector;
use crate::frontend::mel::CEPSTRAL_COEFFS;

/// Appends `vectors` to `path` as CSV rows, creating the file if absent.
pub fn append_feature_vectors(path: &Path, vectors: &[FeatureVector]) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let mut writer = std::io::BufWriter::new(file);
    for v in vectors {
        write_row(&mut writer, v).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_row(writer: &mut impl Write, v: &FeatureVector) -> std::io::Result<()> {
    write!(writer, "{}", v.log_energy)?;
    for c in v.cepstrum {
        write!(writer, ",{}", c)?;
    }
    writeln!(writer)
}

/// Reads every row of `path` back into feature vectors, numbering them
/// sequentially from 1 and stamping `noise_floor` as `0.0` (unknown: CSV
/// rows carry no noise-floor column).
pub fn read_feature_vectors(path: &Path) -> Result<Vec<FeatureVector>> {
    let file = std::fs::File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let fv = parse_row(&line, i as u64 + 1).map_err(|_| Error::Corrupt {
            context: format!("{}: line {}", path.display(), i + 1),
        })?;
        out.push(fv);
    }
    Ok(out)
}

fn parse_row(line: &str, number: u64) -> std::result::Result<FeatureVector, ()> {
    let mut fields = line.split(',');
    let log_energy: f32 = fields.next().ok_or(())?.trim().parse().map_err(|_| ())?;
    let mut cepstrum = [0.0f32; CEPSTRAL_COEFFS];
    for slot in cepstrum.iter_mut() {
        *slot = fields.next().ok_or(())?.trim().parse().map_err(|_| ())?;
    }
    if fields.next().is_some() {
        return Err(()); // extra columns: not a row this format wrote
    }
    Ok(FeatureVector {
        number,
        log_energy,
        cepstrum,
        noise_floor: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}_{}", std::process::id(), name))
    }

    fn fv(number: u64, seed: f32) -> FeatureVector {
        let mut cepstrum = [0.0f32; CEPSTRAL_COEFFS];
        for (i, c) in cepstrum.iter_mut().enumerate() {
            *c = seed + i as f32 * 0.1;
        }
        FeatureVector {
            number,
            log_energy: seed * 2.0,
            cepstrum,
            noise_floor: -49.95,
        }
    }

    #[test]
    fn round_trips_ten_feature_vectors() {
        let path = temp_path("wordrec_csv_roundtrip.csv");
        std::fs::remove_file(&path).ok();
        let written: Vec<FeatureVector> = (0..10).map(|i| fv(i + 1, i as f32)).collect();
        append_feature_vectors(&path, &written).unwrap();
        let read_back = read_feature_vectors(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(read_back.len(), written.len());
        for (a, b) in written.iter().zip(read_back.iter()) {
            assert!((a.log_energy - b.log_energy).abs() < 1e-4);
            for (ca, cb) in a.cepstrum.iter().zip(b.cepstrum.iter()) {
                assert!((ca - cb).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn append_accumulates_across_calls() {
        let path = temp_path("wordrec_csv_append.csv");
        std::fs::remove_file(&path).ok();
        append_feature_vectors(&path, &[fv(1, 1.0)]).unwrap();
        append_feature_vectors(&path, &[fv(2, 2.0)]).unwrap();
        let rows = read_feature_vectors(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn malformed_row_is_corrupt_not_a_panic() {
        let path = temp_path("wordrec_csv_malformed.csv");
        std::fs::write(&path, "not,a,valid,row\n").unwrap();
        let result = read_feature_vectors(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
