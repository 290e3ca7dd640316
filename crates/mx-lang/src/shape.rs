use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Row/column dimensions of a matrix.
///
/// The zero value (`0x0`) doubles as "not yet annotated" on tree nodes.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
pub struct Shape {
    #[serde(rename = "Rows")]
    pub rows: usize,
    #[serde(rename = "Cols")]
    pub cols: usize,
}

impl Shape {
    pub const ZERO: Shape = Shape { rows: 0, cols: 0 };

    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Number of scalar cells, `None` when it does not fit in `usize`.
    pub fn cells(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Element-wise operations need identical shapes.
    pub fn can_add(&self, other: &Shape) -> bool {
        self == other
    }

    pub fn can_mul(&self, other: &Shape) -> bool {
        self.cols == other.rows
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self { rows, cols }
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
