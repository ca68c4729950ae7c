use embassy_time::Instant;

/// Millisecond clock of the debouncer.
///
/// Only the low 32 bits of the millisecond count are kept, differencing wraps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceClock {
    last_time: u32,
}

impl DebounceClock {
    pub const fn new() -> Self {
        Self { last_time: 0 }
    }

    /// Restart measuring from `now`
    pub fn set(&mut self, now: Instant) {
        self.last_time = Self::fast_millis(now);
    }

    /// Time since the last `set`/`elapsed`, saturated to `u8::MAX`, then restart measuring from `now`
    pub fn elapsed(&mut self, now: Instant) -> u8 {
        let now = Self::fast_millis(now);
        let elapsed = now.wrapping_sub(self.last_time);
        self.last_time = now;
        elapsed.min(u8::MAX as u32) as u8
    }

    #[inline]
    fn fast_millis(instant: Instant) -> u32 {
        instant.as_millis() as u32
    }
}
