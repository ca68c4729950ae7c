//! Resolution of opposite virtual keys.
//!
//! An axis is a pair of virtual keys, e.g. `W`/`S`, whose registered outputs must never overlap.
//! Each event updates the held state of one direction and produces a [`Transition`]: at most one
//! unregister followed by at most one register. How a conflict is resolved depends on the axis'
//! [`ArbiterPolicy`].

use keyflow_types::action::AxisDirection;
use keyflow_types::keycode::KeyCode;

use crate::config::{AxisConfig, ArbiterPolicy};
use crate::sink::KeyEventSink;

mod graceful;
mod latched;
mod most_recent;

/// Output of one axis event, the unregister is applied before the register
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub unregister: Option<AxisDirection>,
    pub register: Option<AxisDirection>,
}

impl Transition {
    pub const NONE: Self = Self {
        unregister: None,
        register: None,
    };

    pub fn is_none(&self) -> bool {
        self.unregister.is_none() && self.register.is_none()
    }
}

/// Latch state of one axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisState {
    pub pos_pressed: bool,
    pub neg_pressed: bool,
    /// Direction whose key is registered
    pub current: Option<AxisDirection>,
    /// Held directions, latest press first
    press_order: [Option<AxisDirection>; 2],
}

impl AxisState {
    pub fn is_pressed(&self, direction: AxisDirection) -> bool {
        match direction {
            AxisDirection::Pos => self.pos_pressed,
            AxisDirection::Neg => self.neg_pressed,
        }
    }

    /// Update the held state of `direction`, returns the previous one
    fn set_pressed(&mut self, direction: AxisDirection, pressed: bool) -> bool {
        let slot = match direction {
            AxisDirection::Pos => &mut self.pos_pressed,
            AxisDirection::Neg => &mut self.neg_pressed,
        };
        core::mem::replace(slot, pressed)
    }

    /// Move the registered direction to `desired`
    fn converge(&mut self, desired: Option<AxisDirection>) -> Transition {
        if self.current == desired {
            return Transition::NONE;
        }
        let transition = Transition {
            unregister: self.current,
            register: desired,
        };
        self.current = desired;
        transition
    }
}

/// One axis: its keys, policy and latch state
#[derive(Clone, Copy, Debug)]
pub struct Axis {
    config: AxisConfig,
    state: AxisState,
}

impl Axis {
    pub fn new(config: AxisConfig) -> Self {
        Self {
            config,
            state: AxisState::default(),
        }
    }

    pub fn state(&self) -> &AxisState {
        &self.state
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Key registered by this axis
    pub fn registered(&self) -> Option<KeyCode> {
        self.state.current.map(|d| self.config.key(d))
    }

    /// Update the latch with a press/release of `direction`
    pub fn update(&mut self, direction: AxisDirection, pressed: bool) -> Transition {
        match self.config.policy {
            ArbiterPolicy::MostRecentWins => most_recent::resolve(&mut self.state, direction, pressed),
            ArbiterPolicy::GracefulReassert => graceful::resolve(&mut self.state, direction, pressed),
            ArbiterPolicy::LatchedLastPressed => latched::resolve(&mut self.state, direction, pressed),
        }
    }

    fn apply(&self, transition: Transition, sink: &mut impl KeyEventSink) {
        if let Some(direction) = transition.unregister {
            sink.unregister(self.config.key(direction));
        }
        if let Some(direction) = transition.register {
            sink.register(self.config.key(direction));
        }
    }
}

/// The set of axes of a keyboard, addressed by axis id (index)
pub struct AxisArbiter<const NUM_AXIS: usize> {
    axes: [Axis; NUM_AXIS],
}

impl<const NUM_AXIS: usize> AxisArbiter<NUM_AXIS> {
    pub fn new(config: [AxisConfig; NUM_AXIS]) -> Self {
        Self {
            axes: config.map(Axis::new),
        }
    }

    pub fn axis(&self, axis: u8) -> Option<&Axis> {
        self.axes.get(axis as usize)
    }

    /// Process a press/release of a virtual axis key and send the result to `sink`
    pub fn on_event(
        &mut self,
        axis: u8,
        direction: AxisDirection,
        pressed: bool,
        sink: &mut impl KeyEventSink,
    ) -> Transition {
        let Some(target) = self.axes.get_mut(axis as usize) else {
            error!("Axis {} is not configured, {} axes available", axis, NUM_AXIS);
            return Transition::NONE;
        };

        let transition = target.update(direction, pressed);
        if transition.register.is_some() && transition.unregister.is_some() {
            debug!("Axis {}: {:?} takes over from {:?}", axis, transition.register, transition.unregister);
        }
        target.apply(transition, sink);
        transition
    }
}
