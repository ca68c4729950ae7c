//! Runtime configurations.
//!
//! Defaults come from `keyflow.toml` (see the `keyflow-config` crate), every struct can also be
//! built in code.

use core::num::NonZeroU8;

use embassy_time::Duration;
use heapless::Vec;
use keyflow_types::action::{AxisDirection, EncoderAction};
use keyflow_types::keycode::{ConsumerKey, HidKeyCode, KeyCode};

use crate::debounce::PolicyMap;
use crate::{DEBOUNCE_TIME, MULTI_TAP_MAX, MULTI_TAP_TIMEOUT_MS};

/// Max number of tap counts which can be resolved by the multi-tap counter
pub const MULTI_TAP_CAPACITY: usize = 8;

const DEFAULT_DEBOUNCE_TIME: NonZeroU8 = match NonZeroU8::new(DEBOUNCE_TIME) {
    Some(time) => time,
    None => panic!("debounce time must be in 1..=255"),
};

/// The config struct of the whole pipeline.
pub struct KeyflowConfig<const ROW: usize, const COL: usize, const NUM_AXIS: usize, const NUM_ENCODER: usize> {
    pub debounce: DebounceConfig<ROW, COL>,
    pub axes: [AxisConfig; NUM_AXIS],
    pub multi_tap: MultiTapConfig,
    pub encoders: [EncoderAction; NUM_ENCODER],
}

impl<const ROW: usize, const COL: usize> Default for KeyflowConfig<ROW, COL, 2, 1> {
    /// WASD axes and a volume encoder
    fn default() -> Self {
        Self {
            debounce: DebounceConfig::default(),
            axes: [AxisConfig::vertical(), AxisConfig::horizontal()],
            multi_tap: MultiTapConfig::default(),
            encoders: [EncoderAction::new(
                KeyCode::Consumer(ConsumerKey::VolumeIncrement),
                KeyCode::Consumer(ConsumerKey::VolumeDecrement),
            )],
        }
    }
}

/// Debounce time and per-position policy
#[derive(Clone, Copy, Debug)]
pub struct DebounceConfig<const ROW: usize, const COL: usize> {
    /// Debounce time in ms
    pub time: NonZeroU8,
    pub policy: PolicyMap<ROW, COL>,
}

impl<const ROW: usize, const COL: usize> Default for DebounceConfig<ROW, COL> {
    fn default() -> Self {
        Self {
            time: DEFAULT_DEBOUNCE_TIME,
            policy: PolicyMap::default(),
        }
    }
}

/// Which key wins when both directions of an axis are held
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArbiterPolicy {
    /// Resolve from the held set on every event, a fresh press wins
    #[default]
    MostRecentWins,
    /// Track which direction produced the registered key, only its release hands over
    GracefulReassert,
    /// Keep the press order of held directions, the latest press is registered
    LatchedLastPressed,
}

/// Keys and policy of one axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisConfig {
    pub pos: KeyCode,
    pub neg: KeyCode,
    pub policy: ArbiterPolicy,
}

impl AxisConfig {
    pub const fn new(pos: KeyCode, neg: KeyCode, policy: ArbiterPolicy) -> Self {
        Self { pos, neg, policy }
    }

    /// `W` up, `S` down
    pub const fn vertical() -> Self {
        Self::new(
            KeyCode::Hid(HidKeyCode::W),
            KeyCode::Hid(HidKeyCode::S),
            ArbiterPolicy::MostRecentWins,
        )
    }

    /// `D` right, `A` left
    pub const fn horizontal() -> Self {
        Self::new(
            KeyCode::Hid(HidKeyCode::D),
            KeyCode::Hid(HidKeyCode::A),
            ArbiterPolicy::MostRecentWins,
        )
    }

    pub const fn with_policy(mut self, policy: ArbiterPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn key(&self, direction: AxisDirection) -> KeyCode {
        match direction {
            AxisDirection::Pos => self.pos,
            AxisDirection::Neg => self.neg,
        }
    }
}

/// Configuration of the multi-tap counter
#[derive(Clone, Debug)]
pub struct MultiTapConfig {
    /// Idle time after the last press before the count is resolved
    pub timeout: Duration,
    /// `taps[n - 1]` is tapped when the count resolves to `n`.
    ///
    /// The default table holds the first `max_taps` of play/pause, next and previous track. Longer
    /// tables (up to [`MULTI_TAP_CAPACITY`]) are built in code.
    pub taps: Vec<KeyCode, MULTI_TAP_CAPACITY>,
}

impl Default for MultiTapConfig {
    /// play/pause, next track, previous track
    fn default() -> Self {
        let media = [ConsumerKey::PlayPause, ConsumerKey::NextTrack, ConsumerKey::PrevTrack];
        Self {
            timeout: Duration::from_millis(MULTI_TAP_TIMEOUT_MS),
            taps: media
                .into_iter()
                .take(MULTI_TAP_MAX.min(MULTI_TAP_CAPACITY))
                .map(KeyCode::Consumer)
                .collect(),
        }
    }
}
