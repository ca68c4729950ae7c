//! The latest press stays latched while it is held.
//!
//! Held directions are kept in press order; the front of the order is registered. Arrival order is
//! the only tie-break.

use keyflow_types::action::AxisDirection;

use super::{AxisState, Transition};

pub(super) fn resolve(state: &mut AxisState, direction: AxisDirection, pressed: bool) -> Transition {
    if state.set_pressed(direction, pressed) == pressed {
        return Transition::NONE;
    }

    let order = &mut state.press_order;
    // Drop `direction` from the order
    if order[0] == Some(direction) {
        order[0] = order[1].take();
    } else if order[1] == Some(direction) {
        order[1] = None;
    }
    if pressed {
        order[1] = order[0];
        order[0] = Some(direction);
    }

    let desired = state.press_order[0];
    state.converge(desired)
}
