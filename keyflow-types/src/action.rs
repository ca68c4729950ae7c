//! Key actions.
//!
//! A [`KeyAction`] is what a matrix position does once its debounced state changes.
//! Besides plain keys, a position can be one half of a virtual axis, the switch that
//! toggles fast debounce mode, or the multi-tap button.
//!
//! - [`KeyAction`] - Per-position behavior
//! - [`AxisDirection`] - Which half of an axis a virtual key drives
//! - [`EncoderAction`] - Rotary encoder actions

use serde::{Deserialize, Serialize};

use crate::keycode::KeyCode;

/// One of the two opposite halves of an axis.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, postcard::experimental::max_size::MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisDirection {
    /// Positive side, e.g. `W` on the vertical axis or `D` on the horizontal axis
    Pos,
    /// Negative side, e.g. `S` on the vertical axis or `A` on the horizontal axis
    Neg,
}

impl AxisDirection {
    pub fn opposite(self) -> Self {
        match self {
            AxisDirection::Pos => AxisDirection::Neg,
            AxisDirection::Neg => AxisDirection::Pos,
        }
    }
}

/// A KeyAction is the action at a keyboard position.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action
    #[default]
    No,
    /// Register on press, unregister on release
    Key(KeyCode),
    /// Virtual key feeding one direction of an axis. The registered key is decided by the axis arbiter.
    Axis { axis: u8, direction: AxisDirection },
    /// Toggle fast debounce mode on press
    DebounceToggle,
    /// Count presses, the count is resolved to a key after the multi-tap timeout
    MultiTap,
}

/// EncoderAction is the action at a encoder position, stored in encoder_map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderAction {
    clockwise: Option<KeyCode>,
    counter_clockwise: Option<KeyCode>,
}

impl EncoderAction {
    /// Create a new encoder action.
    pub const fn new(clockwise: KeyCode, counter_clockwise: KeyCode) -> Self {
        Self {
            clockwise: Some(clockwise),
            counter_clockwise: Some(counter_clockwise),
        }
    }

    /// Get the clockwise key.
    pub fn clockwise(&self) -> Option<KeyCode> {
        self.clockwise
    }

    /// Get the counter clockwise key.
    pub fn counter_clockwise(&self) -> Option<KeyCode> {
        self.counter_clockwise
    }
}
