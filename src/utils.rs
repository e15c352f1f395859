//! Utility routines for loading and storing matrices as text.
//!
//! The format is the one used throughout the crate: scalars within a row
//! are separated by whitespace, rows by `;` or by a newline, e.g.:
//!
//! ```text
//! 0.8 0.2; 0.3 0.7
//! ```
//!
//! Matrices are written one row per line with single spaces, so that a
//! matrix of rationals written by `format_matrix` parses back to a value
//! that formats to the very same text.
use std::fs;
use std::path::Path;
use itertools::Itertools;
use ndarray::prelude::*;

use crate::error::{QifError, Result};
use crate::kernel::Scalar;

/// Parses a whitespace-separated row of scalars.
pub fn parse_vector<S: Scalar>(text: &str) -> Result<Array1<S>> {
    Ok(Array::from(parse_entries(text)?))
}

fn parse_entries<S: Scalar>(text: &str) -> Result<Vec<S>> {
    text.split_whitespace()
        .map(|s| S::parse_scalar(s)
                   .ok_or_else(|| QifError::Parse(
                          format!("cannot parse scalar '{}'", s))))
        .collect()
}

/// Parses a matrix; all rows must have the same number of entries.
pub fn parse_matrix<S: Scalar>(text: &str) -> Result<Array2<S>> {
    let mut entries: Vec<S> = Vec::new();
    let mut ncols: Option<usize> = None;
    let mut nrows = 0;

    for line in text.split(|c: char| c == ';' || c == '\n')
                    .map(str::trim)
                    .filter(|l| !l.is_empty()) {
        let row = parse_entries::<S>(line)?;

        match ncols {
            Some(n) if n != row.len() => {
                return Err(QifError::Parse(format!(
                    "row {} has {} entries, expected {}", nrows, row.len(), n)));
            },
            Some(_) => {},
            None => ncols = Some(row.len()),
        }
        entries.extend(row);
        nrows += 1;
    }

    Array::from_shape_vec((nrows, ncols.unwrap_or(0)), entries)
          .map_err(|e| QifError::Parse(e.to_string()))
}

pub fn format_vector<S: Scalar>(v: &ArrayView1<S>) -> String {
    v.iter().join(" ")
}

/// Formats a matrix one row per line.
pub fn format_matrix<S: Scalar>(m: &ArrayView2<S>) -> String {
    m.outer_iter()
     .map(|row| format_vector(&row))
     .join("\n")
}

pub fn load_matrix<S: Scalar, P: AsRef<Path>>(path: P) -> Result<Array2<S>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
                  .map_err(|source| QifError::Io {
                      context: format!("reading {}", path.display()),
                      source,
                  })?;
    parse_matrix(&text)
}

/// Stores a matrix as plain ASCII text, one row per line.
pub fn save_matrix<S: Scalar, P: AsRef<Path>>(path: P, m: &ArrayView2<S>) -> Result<()> {
    let path = path.as_ref();
    let mut text = format_matrix(m);
    text.push('\n');
    fs::write(path, text)
       .map_err(|source| QifError::Io {
           context: format!("writing {}", path.display()),
           source,
       })
}
