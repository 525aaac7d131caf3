//! Dense matrices in csv files.
//!
//! A matrix file has one row per line, no header. Lines beginning with # are comments.
//! The delimiter is detected on the first data line among ',' ';' tab and blank.

use anyhow::anyhow;

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, WriterBuilder};
use ndarray::{Array2, ArrayView2};
use serde::Serialize;

use crate::tools::EmbedScalar;

// delimiters tried in this order
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b' '];

fn open_reader(filepath: &Path) -> anyhow::Result<BufReader<std::fs::File>> {
    let fileres = OpenOptions::new().read(true).open(filepath);
    match fileres {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) => {
            log::error!("could not open file {:?} : {}", filepath.as_os_str(), e);
            Err(anyhow!("could not open file {} : {}", filepath.display(), e))
        }
    }
}

// the first delimiter found on the first non comment line, ',' if the line has one field
fn guess_delimiter(filepath: &Path) -> anyhow::Result<u8> {
    let reader = open_reader(filepath)?;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let delim = DELIMITERS
            .iter()
            .copied()
            .find(|d| line.as_bytes().contains(d))
            .unwrap_or(b',');
        log::debug!("guess_delimiter : {:?}", delim as char);
        return Ok(delim);
    }
    Err(anyhow!("file {} has no data", filepath.display()))
}

/// reads a dense matrix. All rows must have the same number of fields.
pub fn matrix_from_csv<F>(filepath: &Path) -> anyhow::Result<Array2<F>>
where
    F: EmbedScalar + FromStr,
{
    let delim = guess_delimiter(filepath)?;
    let bufreader = open_reader(filepath)?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(delim)
        .flexible(true)
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(bufreader);
    //
    let mut values = Vec::<F>::with_capacity(10_000);
    let mut nb_fields: Option<usize> = None;
    let mut nb_record = 0;
    for result in rdr.records() {
        let record = result?;
        // consecutive blanks give empty fields, so the field count is checked after filtering
        let fields: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
        match nb_fields {
            None => nb_fields = Some(fields.len()),
            Some(nb) if nb != fields.len() => {
                log::error!("record {} has {} fields, first record has {}", nb_record + 1, fields.len(), nb);
                return Err(anyhow!(
                    "non constant number of fields at record {}, first record has {}",
                    nb_record + 1,
                    nb
                ));
            }
            _ => {}
        }
        for (j, field) in fields.iter().enumerate() {
            match field.parse::<F>() {
                Ok(x) => values.push(x),
                Err(_) => {
                    return Err(anyhow!(
                        "error decoding field {} of record {} : {}",
                        j + 1,
                        nb_record + 1,
                        field
                    ));
                }
            }
        }
        nb_record += 1;
    }
    let nb_col = nb_fields.unwrap_or(0);
    if nb_record == 0 || nb_col == 0 {
        return Err(anyhow!("file {} has no data", filepath.display()));
    }
    log::info!("matrix_from_csv : read ({}, {}) from {}", nb_record, nb_col, filepath.display());
    Ok(Array2::from_shape_vec((nb_record, nb_col), values)?)
} // end of matrix_from_csv

/// dumps a matrix, one row per line, comma separated
pub fn array_to_csv<F: EmbedScalar>(filepath: &Path, mat: &ArrayView2<F>) -> anyhow::Result<()> {
    let file = OpenOptions::new().write(true).create(true).truncate(true).open(filepath)?;
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(BufWriter::new(file));
    for row in mat.rows() {
        wtr.write_record(row.iter().map(|x| format!("{:.6e}", x)))?;
    }
    wtr.flush()?;
    log::info!("array_to_csv : dumped ({}, {}) in {}", mat.nrows(), mat.ncols(), filepath.display());
    Ok(())
} // end of array_to_csv

#[derive(Serialize)]
struct SpectrumRecord {
    rank: usize,
    value: f64,
}

/// dumps values as (rank, value) records with a header, rank beginning at 1
pub fn spectrum_to_csv<F: EmbedScalar>(filepath: &Path, values: &[F]) -> anyhow::Result<()> {
    let file = OpenOptions::new().write(true).create(true).truncate(true).open(filepath)?;
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(BufWriter::new(file));
    for (i, v) in values.iter().enumerate() {
        wtr.serialize(SpectrumRecord {
            rank: i + 1,
            value: v.to_f64().unwrap_or(f64::NAN),
        })?;
    }
    wtr.flush()?;
    Ok(())
} // end of spectrum_to_csv

//========================================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;
    use std::io::Write;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn dump_and_reload() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mat.csv");
        let mat = array![[1.5, -2., 0.], [0.25, 3., 1.0E-3]];
        array_to_csv(&path, &mat.view()).unwrap();
        let reloaded = matrix_from_csv::<f64>(&path).unwrap();
        assert_eq!(reloaded.dim(), (2, 3));
        assert!((&reloaded - &mat).iter().all(|x| x.abs() < 1.0E-6));
    }

    #[test]
    fn blank_separated_with_comments() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# adjacency of a path").unwrap();
        writeln!(file, "0 1  0").unwrap();
        writeln!(file, "1 0 1").unwrap();
        writeln!(file, "0 1 0").unwrap();
        drop(file);
        let mat = matrix_from_csv::<f32>(&path).unwrap();
        assert_eq!(mat, array![[0f32, 1., 0.], [1., 0., 1.], [0., 1., 0.]]);
    }

    #[test]
    fn ragged_and_bad_fields() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        std::fs::write(&path, "1,2,3\n4,5\n").unwrap();
        assert!(matrix_from_csv::<f64>(&path).is_err());
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "1,2\n4,x\n").unwrap();
        assert!(matrix_from_csv::<f64>(&path).is_err());
        assert!(matrix_from_csv::<f64>(&dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn spectrum_records() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectrum.csv");
        spectrum_to_csv(&path, &[3., 2., 0.5]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "rank,value");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "3,0.5");
    }
} // end of mod tests
