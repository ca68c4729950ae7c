/// Create an action table from rows of actions
#[macro_export]
macro_rules! keymap {
    ($([$($x: expr), +]), + $(,)?) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `KeyAction::Key(KeyCode::Hid(HidKeyCode::A))`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::action::KeyAction::Key($crate::keycode::KeyCode::Hid($crate::keycode::HidKeyCode::$k))
    };
}

/// Create a consumer key, e.g. `media!(Mute)`
#[macro_export]
macro_rules! media {
    ($k: ident) => {
        $crate::action::KeyAction::Key($crate::keycode::KeyCode::Consumer($crate::keycode::ConsumerKey::$k))
    };
}

/// Create a virtual axis key. `ax!(0, Pos)` drives the positive direction of axis 0.
#[macro_export]
macro_rules! ax {
    ($axis: literal, $direction: ident) => {
        $crate::action::KeyAction::Axis {
            axis: $axis,
            direction: $crate::action::AxisDirection::$direction,
        }
    };
}

/// Create a normal action: `KeyAction`
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::action::KeyAction::$a
    };
}
