#![allow(dead_code)]

use embassy_time::Instant;
use keyflow::config::AxisConfig;
use keyflow::keycode::KeyCode;
use keyflow::sink::KeyEventSink;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

/// Records every call and checks that the host never sees an impossible key state:
/// a key registered twice, a key released without being registered, or both keys of an axis held.
#[derive(Default)]
pub struct RecordingSink {
    pub actions: Vec<(bool, KeyCode)>,
    pub held: Vec<KeyCode>,
    pub axes: Vec<AxisConfig>,
}

impl RecordingSink {
    pub fn with_axes(axes: &[AxisConfig]) -> Self {
        Self {
            axes: axes.to_vec(),
            ..Default::default()
        }
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl KeyEventSink for RecordingSink {
    fn register(&mut self, key: KeyCode) {
        assert!(!self.is_held(key), "{key:?} registered twice");
        self.held.push(key);
        for axis in &self.axes {
            assert!(
                !(self.held.contains(&axis.pos) && self.held.contains(&axis.neg)),
                "both {:?} and {:?} are registered",
                axis.pos,
                axis.neg
            );
        }
        self.actions.push((true, key));
    }

    fn unregister(&mut self, key: KeyCode) {
        let idx = self.held.iter().position(|k| *k == key);
        assert!(idx.is_some(), "{key:?} unregistered without being registered");
        if let Some(idx) = idx {
            self.held.swap_remove(idx);
        }
        self.actions.push((false, key));
    }
}
