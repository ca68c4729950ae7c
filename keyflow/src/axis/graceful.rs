//! Press wins, release only hands over from the registered direction.
//!
//! Every (event, other held, registered) combination is spelled out, so a release of the direction
//! which is *not* registered never produces a register call.

use keyflow_types::action::AxisDirection;

use super::{AxisState, Transition};

pub(super) fn resolve(state: &mut AxisState, direction: AxisDirection, pressed: bool) -> Transition {
    if state.set_pressed(direction, pressed) == pressed {
        // Already in this state
        return Transition::NONE;
    }

    let other = direction.opposite();
    let other_held = state.is_pressed(other);

    match (pressed, other_held, state.current) {
        // Pressed again while registered, nothing to do
        (true, _, Some(current)) if current == direction => Transition::NONE,
        // Real input to `direction`, from the other direction or from none
        (true, _, from) => {
            state.current = Some(direction);
            Transition {
                unregister: from,
                register: Some(direction),
            }
        }
        // Registered direction released, nothing else held
        (false, false, Some(current)) if current == direction => {
            state.current = None;
            Transition {
                unregister: Some(direction),
                register: None,
            }
        }
        // Registered direction released, the other one takes over
        (false, true, Some(current)) if current == direction => {
            state.current = Some(other);
            Transition {
                unregister: Some(direction),
                register: Some(other),
            }
        }
        // Released direction wasn't registered
        (false, _, _) => Transition::NONE,
    }
}
