//! Most recent press wins.
//!
//! The registered direction is derived from the held set on every event. When both directions
//! are held, a fresh press takes over; releasing the registered direction hands over to the
//! other one if it is still held.

use keyflow_types::action::AxisDirection;

use super::{AxisState, Transition};

pub(super) fn resolve(state: &mut AxisState, direction: AxisDirection, pressed: bool) -> Transition {
    let was_pressed = state.set_pressed(direction, pressed);

    let desired = match (state.pos_pressed, state.neg_pressed) {
        (true, true) if pressed && !was_pressed => Some(direction),
        (true, true) => state.current,
        (true, false) => Some(AxisDirection::Pos),
        (false, true) => Some(AxisDirection::Neg),
        (false, false) => None,
    };

    state.converge(desired)
}
