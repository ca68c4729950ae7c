use embassy_time::Instant;

use crate::matrix::{MAX_COLS, MatrixRow, col_mask};

pub mod clock;
pub mod symmetric;

pub use clock::DebounceClock;
pub use symmetric::DebounceEngine;

/// A debouncer filters raw matrix rows into cooked rows.
pub trait DebouncerTrait<const ROW: usize> {
    /// Debounce `raw` into `cooked` (mutated in place).
    ///
    /// `changed` tells whether any raw bit differs from the previous scan.
    /// Only the first `min(ROW, raw.len(), cooked.len())` rows are read or written. Counters of
    /// the other rows keep running and commit on the next update which covers them.
    /// Returns true if any cooked bit changed.
    fn update_at(&mut self, now: Instant, raw: &[MatrixRow], cooked: &mut [MatrixRow], changed: bool) -> bool;

    /// Same as [`DebouncerTrait::update_at`], reading the time from the system clock
    fn update(&mut self, raw: &[MatrixRow], cooked: &mut [MatrixRow], changed: bool) -> bool {
        self.update_at(Instant::now(), raw, cooked, changed)
    }

    /// Switch the fast mode subset of keys between defer and eager
    fn set_fast_mode(&mut self, _enabled: bool) {}
}

const _: () = assert!(
    crate::FAST_MODE_KEYS.len() <= crate::FAST_MODE_KEYS_MAX,
    "too many fast mode keys"
);

/// How a cell turns a raw edge into a cooked edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebouncePolicy {
    /// Commit the edge once the debounce time has elapsed
    #[default]
    Defer,
    /// Commit the edge immediately, then ignore the cell for the debounce time
    Eager,
}

/// Per-position debounce policy.
///
/// Positions are `Defer` unless marked eager. Positions in the fast mode set are `Eager` only while
/// fast mode is on. Build it in a `const` so an out-of-range position is a compile error:
///
/// ```ignore
/// const POLICY: PolicyMap<6, 21> = PolicyMap::new().with_fast_mode(2, 2).with_fast_mode(3, 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicyMap<const ROW: usize, const COL: usize> {
    eager: [MatrixRow; ROW],
    fast_mode: [MatrixRow; ROW],
}

impl<const ROW: usize, const COL: usize> PolicyMap<ROW, COL> {
    /// Policy table built from `keyflow.toml`
    pub const DEFAULT: Self = Self::from_positions(crate::EAGER_KEYS, crate::FAST_MODE_KEYS);

    /// All positions defer
    pub const fn new() -> Self {
        assert!(COL <= MAX_COLS, "a matrix row holds at most 32 columns");
        Self {
            eager: [0; ROW],
            fast_mode: [0; ROW],
        }
    }

    /// Mark `(row, col)` as always eager
    pub const fn with_eager(mut self, row: usize, col: usize) -> Self {
        assert!(row < ROW && col < COL, "eager key position is outside of the matrix");
        self.eager[row] |= col_mask(col);
        self
    }

    /// Mark `(row, col)` as eager while fast mode is on
    pub const fn with_fast_mode(mut self, row: usize, col: usize) -> Self {
        assert!(row < ROW && col < COL, "fast mode key position is outside of the matrix");
        self.fast_mode[row] |= col_mask(col);
        self
    }

    /// Build from lists of `(row, col)`
    pub const fn from_positions(eager: &[(u8, u8)], fast_mode: &[(u8, u8)]) -> Self {
        let mut map = Self::new();
        let mut i = 0;
        while i < eager.len() {
            map = map.with_eager(eager[i].0 as usize, eager[i].1 as usize);
            i += 1;
        }
        i = 0;
        while i < fast_mode.len() {
            map = map.with_fast_mode(fast_mode[i].0 as usize, fast_mode[i].1 as usize);
            i += 1;
        }
        map
    }

    /// Policy of `(row, col)`, positions outside of the matrix are reported as `Defer`
    pub fn policy(&self, row: usize, col: usize, fast_mode: bool) -> DebouncePolicy {
        if col >= COL {
            return DebouncePolicy::Defer;
        }
        if self.eager_mask(row, fast_mode) & col_mask(col) != 0 {
            DebouncePolicy::Eager
        } else {
            DebouncePolicy::Defer
        }
    }

    /// Mask of eager columns in `row`
    pub(crate) fn eager_mask(&self, row: usize, fast_mode: bool) -> MatrixRow {
        match (self.eager.get(row), self.fast_mode.get(row)) {
            (Some(eager), Some(fast)) if fast_mode => eager | fast,
            (Some(eager), _) => *eager,
            _ => 0,
        }
    }
}

impl<const ROW: usize, const COL: usize> Default for PolicyMap<ROW, COL> {
    fn default() -> Self {
        Self::DEFAULT
    }
}
