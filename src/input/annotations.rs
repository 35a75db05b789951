use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::input::InputError;
use crate::model::Signal;

/// Per-frame arousal and valence values of one annotation file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub arousal: Vec<f64>,
    pub valence: Vec<f64>,
}

impl Annotations {
    pub fn new(arousal: Vec<f64>, valence: Vec<f64>) -> Self {
        Self { arousal, valence }
    }

    pub fn signal(&self, signal: Signal) -> &[f64] {
        match signal {
            Signal::Arousal => &self.arousal,
            Signal::Valence => &self.valence,
        }
    }

    pub fn len(&self) -> usize {
        self.arousal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arousal.is_empty()
    }

    pub fn extend_from(&mut self, other: &Annotations) {
        self.arousal.extend_from_slice(&other.arousal);
        self.valence.extend_from_slice(&other.valence);
    }
}

pub fn read_annotations(path: &Path) -> Result<Annotations, InputError> {
    let file = File::open(path)?;
    parse_annotations(file, path)
}

/// Reads the `arousal` and `valence` columns by header name. Any other
/// column, `time` included, is ignored. Empty cells read as NaN.
pub fn parse_annotations<R: Read>(reader: R, origin: &Path) -> Result<Annotations, InputError> {
    let csv_err = |source| InputError::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let arousal_idx = column_index(&headers, "arousal", origin)?;
    let valence_idx = column_index(&headers, "valence", origin)?;
    if headers.iter().any(|h| h == "time") {
        tracing::trace!(path = %origin.display(), "dropping time column");
    }

    let mut out = Annotations::default();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_err)?;
        out.arousal
            .push(parse_cell(&record, arousal_idx, "arousal", row + 1, origin)?);
        out.valence
            .push(parse_cell(&record, valence_idx, "valence", row + 1, origin)?);
    }
    Ok(out)
}

fn column_index(
    headers: &StringRecord,
    column: &'static str,
    origin: &Path,
) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| InputError::MissingColumn {
            path: origin.to_path_buf(),
            column,
        })
}

fn parse_cell(
    record: &StringRecord,
    idx: usize,
    column: &'static str,
    row: usize,
    origin: &Path,
) -> Result<f64, InputError> {
    let raw = record.get(idx).unwrap_or("");
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| InputError::InvalidValue {
        path: origin.to_path_buf(),
        column,
        row,
        value: raw.to_string(),
    })
}
