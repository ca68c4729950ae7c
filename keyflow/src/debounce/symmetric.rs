use core::num::NonZeroU8;

use embassy_time::Instant;

use super::{DebounceClock, DebouncePolicy, DebouncerTrait, PolicyMap};
use crate::config::DebounceConfig;
use crate::event::KeyPos;
use crate::matrix::{MAX_COLS, MatrixRow, col_mask};

/// Counter value of a cell which isn't debouncing
const ELAPSED: u8 = 0;

/// Symmetric per-key debouncer with a per-position policy.
///
/// `Defer` cells behave like QMK's `sym_defer_pk`: an edge arms the cell's counter and the raw
/// state is copied to cooked once the counter runs out. Re-opening the same edge while the counter
/// runs does not restart it.
///
/// `Eager` cells behave like `sym_eager_pk`: an edge flips cooked immediately and arms the counter,
/// every raw edge seen while it runs is ignored. If raw still disagrees when the counter runs out,
/// the cell flips again on that same update.
pub struct DebounceEngine<const ROW: usize, const COL: usize> {
    /// Remaining debounce time of each cell, `ELAPSED` when idle
    counters: [[u8; COL]; ROW],
    clock: DebounceClock,
    /// True while any counter is running
    counters_need_update: bool,
    time: NonZeroU8,
    policy: PolicyMap<ROW, COL>,
    fast_mode: bool,
}

impl<const ROW: usize, const COL: usize> Default for DebounceEngine<ROW, COL> {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

impl<const ROW: usize, const COL: usize> DebounceEngine<ROW, COL> {
    const COLS_FIT: () = assert!(COL <= MAX_COLS, "a matrix row holds at most 32 columns");

    pub fn new(config: DebounceConfig<ROW, COL>) -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::COLS_FIT;
        Self {
            counters: [[ELAPSED; COL]; ROW],
            clock: DebounceClock::new(),
            counters_need_update: false,
            time: config.time,
            policy: config.policy,
            fast_mode: false,
        }
    }

    /// Mark every cell idle and restart the clock at `now`
    pub fn reset_at(&mut self, now: Instant) {
        self.counters = [[ELAPSED; COL]; ROW];
        self.counters_need_update = false;
        self.clock.set(now);
        info!("Debouncer reset, debounce time: {}ms", self.time.get());
    }

    /// Mark every cell idle and restart the clock now
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn fast_mode(&self) -> bool {
        self.fast_mode
    }

    pub fn debounce_time(&self) -> u8 {
        self.time.get()
    }

    /// Policy currently applied to `pos`
    pub fn policy(&self, pos: KeyPos) -> DebouncePolicy {
        self.policy.policy(pos.row as usize, pos.col as usize, self.fast_mode)
    }

    /// Remaining debounce time of `pos`, `None` if `pos` is outside of the matrix
    pub fn counter(&self, pos: KeyPos) -> Option<u8> {
        self.counters.get(pos.row as usize)?.get(pos.col as usize).copied()
    }

    /// True if no cell is debouncing
    pub fn is_idle(&self) -> bool {
        !self.counters_need_update
    }

    /// Count every running counter down by `elapsed`, in every row.
    ///
    /// Only rows below `rows` can expire, the others stop at 1.
    ///
    /// Returns (cooked changed, an eager cell ran out while raw still disagrees).
    fn update_counters_and_transfer_if_expired(
        &mut self,
        raw: &[MatrixRow],
        cooked: &mut [MatrixRow],
        rows: usize,
        elapsed: u8,
    ) -> (bool, bool) {
        let mut cooked_changed = false;
        let mut eager_expired_unstable = false;
        self.counters_need_update = false;

        for row in 0..ROW {
            let eager_mask = self.policy.eager_mask(row, self.fast_mode);
            for col in 0..COL {
                let counter = &mut self.counters[row][col];
                if *counter == ELAPSED {
                    continue;
                }

                if *counter > elapsed {
                    *counter -= elapsed;
                    self.counters_need_update = true;
                    continue;
                }

                if row >= rows {
                    // Not in this update's slices, expire on the next update which covers it
                    *counter = 1;
                    self.counters_need_update = true;
                    continue;
                }

                *counter = ELAPSED;
                let mask = col_mask(col);
                if eager_mask & mask == 0 {
                    // Defer: transfer the raw state
                    let next = (cooked[row] & !mask) | (raw[row] & mask);
                    cooked_changed |= cooked[row] != next;
                    cooked[row] = next;
                } else if (raw[row] ^ cooked[row]) & mask != 0 {
                    // Eager: cooked was committed when armed, re-check the raw state
                    eager_expired_unstable = true;
                }
            }
        }

        (cooked_changed, eager_expired_unstable)
    }

    /// Arm counters of the cells whose raw state differs from cooked.
    ///
    /// Returns true if cooked changed.
    fn arm_counters_for_changes(&mut self, raw: &[MatrixRow], cooked: &mut [MatrixRow], rows: usize) -> bool {
        let mut cooked_changed = false;

        for row in 0..rows {
            let eager_mask = self.policy.eager_mask(row, self.fast_mode);
            let delta = raw[row] ^ cooked[row];
            for col in 0..COL {
                let mask = col_mask(col);
                let counter = &mut self.counters[row][col];

                if eager_mask & mask != 0 {
                    // A running counter suppresses every edge of an eager cell
                    if *counter != ELAPSED || delta & mask == 0 {
                        continue;
                    }
                    cooked[row] ^= mask;
                    cooked_changed = true;
                    *counter = self.time.get();
                    self.counters_need_update = true;
                } else if delta & mask == 0 {
                    // Stable, reset timer
                    *counter = ELAPSED;
                } else if *counter == ELAPSED {
                    *counter = self.time.get();
                    self.counters_need_update = true;
                }
            }
        }

        cooked_changed
    }
}

impl<const ROW: usize, const COL: usize> DebouncerTrait<ROW> for DebounceEngine<ROW, COL> {
    fn update_at(&mut self, now: Instant, raw: &[MatrixRow], cooked: &mut [MatrixRow], changed: bool) -> bool {
        let rows = ROW.min(raw.len()).min(cooked.len());
        let mut cooked_changed = false;
        let mut recheck = false;
        let mut updated_last = false;

        if self.counters_need_update {
            let elapsed = self.clock.elapsed(now);
            updated_last = true;
            if elapsed > 0 {
                let (transferred, eager_expired_unstable) =
                    self.update_counters_and_transfer_if_expired(raw, cooked, rows, elapsed);
                cooked_changed |= transferred;
                recheck = eager_expired_unstable;
            }
        }

        if changed || recheck {
            if !updated_last {
                self.clock.set(now);
            }
            cooked_changed |= self.arm_counters_for_changes(raw, cooked, rows);
        }

        cooked_changed
    }

    fn set_fast_mode(&mut self, enabled: bool) {
        if self.fast_mode != enabled {
            debug!("Debounce fast mode: {}", enabled);
        }
        self.fast_mode = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine<const ROW: usize, const COL: usize>(time: u8, policy: PolicyMap<ROW, COL>) -> DebounceEngine<ROW, COL> {
        let mut engine = DebounceEngine::new(DebounceConfig {
            time: NonZeroU8::new(time).unwrap(),
            policy,
        });
        engine.reset_at(Instant::from_millis(0));
        engine
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_defer_commits_after_debounce_time() {
        let mut e = engine::<1, 4>(5, PolicyMap::new());
        let mut cooked = [0];

        assert!(!e.update_at(at(0), &[0b10], &mut cooked, true));
        assert_eq!(e.counter(KeyPos::new(0, 1)), Some(5));
        for t in 1..5 {
            assert!(!e.update_at(at(t), &[0b10], &mut cooked, false));
            assert_eq!(cooked, [0]);
        }
        assert!(e.update_at(at(5), &[0b10], &mut cooked, false));
        assert_eq!(cooked, [0b10]);
        assert_eq!(e.counter(KeyPos::new(0, 1)), Some(0));
        assert!(e.is_idle());
    }

    #[test]
    fn test_defer_bounce_back_cancels() {
        let mut e = engine::<1, 4>(5, PolicyMap::new());
        let mut cooked = [0];

        e.update_at(at(0), &[0b1], &mut cooked, true);
        // Contact opens again before the debounce time ends
        assert!(!e.update_at(at(2), &[0], &mut cooked, true));
        assert_eq!(e.counter(KeyPos::new(0, 0)), Some(0));
        assert!(!e.update_at(at(10), &[0], &mut cooked, false));
        assert_eq!(cooked, [0]);
    }

    #[test]
    fn test_defer_chatter_does_not_restart_counter() {
        let mut e = engine::<1, 2>(5, PolicyMap::new());
        let mut cooked = [0];

        e.update_at(at(0), &[0b1], &mut cooked, true);
        // Another column changes, the running counter keeps going
        e.update_at(at(3), &[0b11], &mut cooked, true);
        assert_eq!(e.counter(KeyPos::new(0, 0)), Some(2));
        assert_eq!(e.counter(KeyPos::new(0, 1)), Some(5));
        assert!(e.update_at(at(5), &[0b11], &mut cooked, false));
        assert_eq!(cooked, [0b01]);
        assert!(e.update_at(at(8), &[0b11], &mut cooked, false));
        assert_eq!(cooked, [0b11]);
    }

    #[test]
    fn test_eager_flips_immediately_and_suppresses() {
        let mut e = engine::<1, 1>(5, PolicyMap::new().with_eager(0, 0));
        let mut cooked = [0];

        assert!(e.update_at(at(0), &[1], &mut cooked, true));
        assert_eq!(cooked, [1]);
        assert!(!e.update_at(at(1), &[0], &mut cooked, true));
        assert!(!e.update_at(at(2), &[1], &mut cooked, true));
        assert!(!e.update_at(at(3), &[0], &mut cooked, true));
        assert_eq!(cooked, [1]);
        // Window ends with raw released: the release is taken on the same update
        assert!(e.update_at(at(5), &[0], &mut cooked, false));
        assert_eq!(cooked, [0]);
        assert_eq!(e.counter(KeyPos::new(0, 0)), Some(5));
    }

    #[test]
    fn test_eager_window_ends_quietly_when_stable() {
        let mut e = engine::<1, 1>(5, PolicyMap::new().with_eager(0, 0));
        let mut cooked = [0];

        e.update_at(at(0), &[1], &mut cooked, true);
        assert!(!e.update_at(at(6), &[1], &mut cooked, false));
        assert!(e.is_idle());
        assert_eq!(cooked, [1]);
    }

    #[test]
    fn test_fast_mode_switches_policy() {
        let mut e = engine::<1, 1>(5, PolicyMap::new().with_fast_mode(0, 0));
        let mut cooked = [0];

        assert!(!e.update_at(at(0), &[1], &mut cooked, true));
        assert!(e.update_at(at(5), &[1], &mut cooked, false));

        e.set_fast_mode(true);
        assert!(e.fast_mode());
        assert_eq!(e.policy(KeyPos::new(0, 0)), DebouncePolicy::Eager);
        assert!(e.update_at(at(20), &[0], &mut cooked, true));
        assert_eq!(cooked, [0]);
    }

    #[test]
    fn test_rows_limited_by_slices() {
        let mut e = engine::<2, 1>(1, PolicyMap::new().with_eager(1, 0));
        let mut cooked = [0];
        // Only one row is passed in, the second row is never read
        assert!(!e.update_at(at(0), &[1, 1], &mut cooked, true));
        assert!(e.update_at(at(1), &[1, 1], &mut cooked, false));
        assert_eq!(cooked, [1]);
        assert_eq!(e.counter(KeyPos::new(1, 0)), Some(0));
        assert_eq!(e.counter(KeyPos::new(2, 0)), None);
    }
}
