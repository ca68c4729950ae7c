use keyflow_types::keycode::KeyCode;

/// The host's logical keycode layer, which turns register/unregister calls into HID reports.
pub trait KeyEventSink {
    /// Mark `key` as held
    fn register(&mut self, key: KeyCode);

    /// Mark `key` as released
    fn unregister(&mut self, key: KeyCode);

    /// Press and release `key`
    fn tap(&mut self, key: KeyCode) {
        self.register(key);
        self.unregister(key);
    }
}

impl<T: KeyEventSink + ?Sized> KeyEventSink for &mut T {
    fn register(&mut self, key: KeyCode) {
        (**self).register(key)
    }

    fn unregister(&mut self, key: KeyCode) {
        (**self).unregister(key)
    }

    fn tap(&mut self, key: KeyCode) {
        (**self).tap(key)
    }
}
