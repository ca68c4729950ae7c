use embassy_time::Instant;

use crate::config::MultiTapConfig;
use crate::sink::KeyEventSink;

/// Counts presses of the multi-tap key and taps the configured key once the presses stop.
///
/// Every press restarts the timeout. A count larger than the tap table resolves to nothing.
pub struct MultiTap {
    config: MultiTapConfig,
    count: u8,
    last_press: Option<Instant>,
}

impl MultiTap {
    pub fn new(config: MultiTapConfig) -> Self {
        Self {
            config,
            count: 0,
            last_press: None,
        }
    }

    /// Number of presses waiting to be resolved
    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn press(&mut self, now: Instant) {
        self.count = self.count.saturating_add(1);
        self.last_press = Some(now);
        trace!("Multi-tap press #{}", self.count);
    }

    /// Resolve the count if the timeout has passed since the last press.
    ///
    /// Returns the tap count which was resolved, if any.
    pub fn poll(&mut self, now: Instant, sink: &mut impl KeyEventSink) -> Option<u8> {
        let last_press = self.last_press?;
        if now.saturating_duration_since(last_press) <= self.config.timeout {
            return None;
        }

        let count = self.count;
        self.count = 0;
        self.last_press = None;

        match self.config.taps.get(count as usize - 1) {
            Some(key) => {
                info!("Multi-tap #{}, tap {:?}", count, key);
                sink.tap(*key);
            }
            None => warn!("Multi-tap #{} has no key", count),
        }
        Some(count)
    }
}
