// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Diagonal (zigzag) reordering between flat coefficient vectors and
//! two-dimensional blocks.

use crate::{
    error::{Error, Result},
    util::tracing_wrappers::*,
};

pub const BLOCK_DIM: usize = 8;
pub const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;

/// Natural (row-major) index of the coefficient at each zigzag position of an
/// 8x8 block.
pub const ZIGZAG_8X8: [usize; BLOCK_SIZE] = [
    0, 1, 8, 16, 9, 2, 3, 10, //
    17, 24, 32, 25, 18, 11, 4, 5, //
    12, 19, 26, 33, 40, 48, 41, 34, //
    27, 20, 13, 6, 7, 14, 21, 28, //
    35, 42, 49, 56, 57, 50, 43, 36, //
    29, 22, 15, 23, 30, 37, 44, 51, //
    58, 59, 52, 45, 38, 31, 39, 46, //
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Yields the `(row, col)` cells of a `rows x cols` block in zigzag order.
///
/// Diagonal `d` holds the cells with `row + col == d`. Odd diagonals are
/// walked down-left (row increasing), even diagonals up-right. Once `d`
/// passes the shorter side the diagonal is clipped at both ends, so the first
/// cell slides along the bottom or right edge instead of restarting at row or
/// column zero.
pub fn scan_order(rows: usize, cols: usize) -> impl Iterator<Item = (usize, usize)> {
    let diagonals = if rows == 0 || cols == 0 {
        0
    } else {
        rows + cols - 1
    };
    (0..diagonals).flat_map(move |d| {
        let first = d.saturating_sub(cols - 1);
        let last = d.min(rows - 1);
        let down_left = d % 2 == 1;
        (first..=last).map(move |i| {
            let row = if down_left { i } else { first + last - i };
            (row, d - row)
        })
    })
}

/// Rebuilds a `rows x cols` matrix from `values` given in zigzag order.
/// ```
/// # use jpeg_segments::zigzag::to_matrix;
/// let values: Vec<u32> = (1..=12).collect();
/// let matrix = to_matrix(&values, 3, 4)?;
/// assert_eq!(matrix, [[1, 2, 6, 7], [3, 5, 8, 11], [4, 9, 10, 12]]);
/// # Ok::<(), jpeg_segments::error::Error>(())
/// ```
pub fn to_matrix<T: Clone + Default>(
    values: &[T],
    rows: usize,
    cols: usize,
) -> Result<Vec<Vec<T>>> {
    let size = rows.checked_mul(cols).ok_or(Error::ArithmeticOverflow)?;
    if values.len() != size {
        return Err(Error::DimensionMismatch {
            len: values.len(),
            rows,
            cols,
        });
    }
    trace!(rows, cols, "rebuilding zigzag block");
    let mut matrix = vec![vec![T::default(); cols]; rows];
    for (value, (row, col)) in values.iter().zip(scan_order(rows, cols)) {
        matrix[row][col] = value.clone();
    }
    Ok(matrix)
}

/// Flattens a rectangular matrix into zigzag order. Inverse of [`to_matrix`].
pub fn from_matrix<T: Clone>(matrix: &[Vec<T>]) -> Result<Vec<T>> {
    let rows = matrix.len();
    let cols = matrix.first().map_or(0, Vec::len);
    if let Some(row) = matrix.iter().find(|row| row.len() != cols) {
        return Err(Error::DimensionMismatch {
            len: row.len(),
            rows,
            cols,
        });
    }
    Ok(scan_order(rows, cols)
        .map(|(row, col)| matrix[row][col].clone())
        .collect())
}
