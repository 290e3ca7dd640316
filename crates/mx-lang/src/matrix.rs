use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shape::Shape;

#[derive(Error, Debug, PartialEq)]
pub enum MatrixError {
    #[error("Expected {expected} elements for a {shape} matrix, got {actual}")]
    DataLength {
        shape: Shape,
        expected: usize,
        actual: usize,
    },
    #[error("A {shape} matrix has more cells than fit in memory")]
    TooLarge { shape: Shape },
    #[error("Row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Dense row-major matrix of `f64`.
///
/// Operands travel inside a request in this form. The `Size` field must
/// agree with the length of `Data`; the constructors enforce it, a
/// deserialized value is trusted as is.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct Matrix {
    #[serde(rename = "Size")]
    size: Shape,
    #[serde(rename = "Data")]
    data: Vec<f64>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, MatrixError> {
        let size = Shape::new(rows, cols);
        let expected = size.cells().ok_or(MatrixError::TooLarge { shape: size })?;
        if data.len() != expected {
            return Err(MatrixError::DataLength {
                shape: size,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { size, data })
    }

    /// A `rows x cols` matrix of zeros.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        let size = Shape::new(rows, cols);
        let Some(cells) = size.cells() else {
            panic!("cannot allocate a {size} matrix");
        };

        Self {
            size,
            data: vec![0.0; cells],
        }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map(Vec::len).unwrap_or_default();
        let row_count = rows.len();
        let mut data = Vec::with_capacity(row_count.saturating_mul(cols));

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::RaggedRow {
                    row: i,
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }

        Self::new(row_count, cols, data)
    }

    pub fn shape(&self) -> Shape {
        self.size
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.size.rows || col >= self.size.cols {
            return None;
        }

        self.data.get(row * self.size.cols + col).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks panics on zero
        self.data.chunks(self.size.cols.max(1)).take(self.size.rows)
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "[{}]",
            self.rows()
                .map(|row| format!("[{}]", row.iter().join(" ")))
                .join(" ")
        )
    }
}
