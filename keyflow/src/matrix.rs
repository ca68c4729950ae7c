//! Row bitsets of the key matrix.
//!
//! Every row of the matrix is packed into a [`MatrixRow`], bit `col` set meaning the switch at
//! `(row, col)` is closed. The raw rows come from a [`MatrixSource`], the debounced ("cooked") rows
//! are owned by the caller and mutated by the debouncer.

use crate::event::KeyPos;

/// One row of the matrix, bit `col` is the state of column `col`
pub type MatrixRow = u32;

/// Maximum number of columns a [`MatrixRow`] can hold
pub const MAX_COLS: usize = MatrixRow::BITS as usize;

/// Source of raw matrix scans, implemented by the board's scanning code.
pub trait MatrixSource<const ROW: usize> {
    /// Scan the matrix into `raw`.
    ///
    /// Returns true if any bit differs from the previous scan.
    fn scan(&mut self, raw: &mut [MatrixRow; ROW]) -> bool;
}

/// Mask of column `col`
#[inline]
pub(crate) const fn col_mask(col: usize) -> MatrixRow {
    1 << col
}

/// Read the bit at `pos`, `None` if `pos` is outside of `rows`
pub fn read_bit(rows: &[MatrixRow], pos: KeyPos) -> Option<bool> {
    let col = pos.col as usize;
    if col >= MAX_COLS {
        return None;
    }
    rows.get(pos.row as usize).map(|row| row & col_mask(col) != 0)
}

/// Write the bit at `pos`. Returns false if `pos` is outside of `rows`.
pub fn write_bit(rows: &mut [MatrixRow], pos: KeyPos, value: bool) -> bool {
    let col = pos.col as usize;
    if col >= MAX_COLS {
        return false;
    }
    match rows.get_mut(pos.row as usize) {
        Some(row) => {
            if value {
                *row |= col_mask(col);
            } else {
                *row &= !col_mask(col);
            }
            true
        }
        None => false,
    }
}

/// Call `f` for each cell whose bit differs between `prev` and `next`, in row-major order.
///
/// The bool passed to `f` is the new state.
pub fn diff_rows(prev: &[MatrixRow], next: &[MatrixRow], mut f: impl FnMut(KeyPos, bool)) {
    for (row_idx, (p, n)) in prev.iter().zip(next.iter()).enumerate() {
        let mut delta = p ^ n;
        while delta != 0 {
            let col = delta.trailing_zeros() as usize;
            delta &= delta - 1;
            f(
                KeyPos {
                    row: row_idx as u8,
                    col: col as u8,
                },
                n & col_mask(col) != 0,
            );
        }
    }
}
