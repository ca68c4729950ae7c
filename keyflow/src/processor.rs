use embassy_time::Instant;
use keyflow_types::action::{EncoderAction, KeyAction};

use crate::axis::AxisArbiter;
use crate::config::KeyflowConfig;
use crate::debounce::{DebounceEngine, DebouncerTrait};
use crate::event::{Direction, KeyPos, KeyboardEvent, KeyboardEventPos, RotaryEncoderPos};
use crate::matrix::{MatrixRow, MatrixSource, diff_rows};
use crate::sink::KeyEventSink;
use crate::tap::MultiTap;

/// Scan loop glue: debounces the matrix, decodes changed positions through the action table and
/// dispatches them to the axis arbiter, the multi-tap counter or straight to the sink.
pub struct KeyProcessor<'a, const ROW: usize, const COL: usize, const NUM_AXIS: usize, const NUM_ENCODER: usize> {
    /// Single layer action table
    keymap: &'a [[KeyAction; COL]; ROW],
    debouncer: DebounceEngine<ROW, COL>,
    arbiter: AxisArbiter<NUM_AXIS>,
    multi_tap: MultiTap,
    encoders: [EncoderAction; NUM_ENCODER],
    fast_mode: bool,
    /// Last raw scan
    raw: [MatrixRow; ROW],
    /// Debounced matrix
    cooked: [MatrixRow; ROW],
}

impl<'a, const ROW: usize, const COL: usize, const NUM_AXIS: usize, const NUM_ENCODER: usize>
    KeyProcessor<'a, ROW, COL, NUM_AXIS, NUM_ENCODER>
{
    pub fn new(keymap: &'a [[KeyAction; COL]; ROW], config: KeyflowConfig<ROW, COL, NUM_AXIS, NUM_ENCODER>) -> Self {
        Self {
            keymap,
            debouncer: DebounceEngine::new(config.debounce),
            arbiter: AxisArbiter::new(config.axes),
            multi_tap: MultiTap::new(config.multi_tap),
            encoders: config.encoders,
            fast_mode: false,
            raw: [0; ROW],
            cooked: [0; ROW],
        }
    }

    /// Reset the debouncer, call once before the first scan
    pub fn reset_at(&mut self, now: Instant) {
        self.debouncer.reset_at(now);
    }

    pub fn debouncer(&self) -> &DebounceEngine<ROW, COL> {
        &self.debouncer
    }

    pub fn arbiter(&self) -> &AxisArbiter<NUM_AXIS> {
        &self.arbiter
    }

    pub fn multi_tap(&self) -> &MultiTap {
        &self.multi_tap
    }

    pub fn fast_mode(&self) -> bool {
        self.fast_mode
    }

    /// Debounced matrix
    pub fn cooked(&self) -> &[MatrixRow; ROW] {
        &self.cooked
    }

    /// Read the matrix from `source` and process it at the current time
    pub fn scan<M: MatrixSource<ROW>>(&mut self, source: &mut M, sink: &mut impl KeyEventSink) -> bool {
        let changed = source.scan(&mut self.raw);
        let raw = self.raw;
        self.scan_at(Instant::now(), &raw, changed, sink)
    }

    /// Process one raw scan taken at `now`.
    ///
    /// Returns true if any debounced key changed.
    pub fn scan_at(
        &mut self,
        now: Instant,
        raw: &[MatrixRow; ROW],
        raw_changed: bool,
        sink: &mut impl KeyEventSink,
    ) -> bool {
        let prev = self.cooked;
        let cooked_changed = self.debouncer.update_at(now, raw, &mut self.cooked, raw_changed);

        if cooked_changed {
            let cooked = self.cooked;
            diff_rows(&prev, &cooked, |pos, pressed| {
                self.process_event_at(
                    now,
                    KeyboardEvent {
                        pressed,
                        pos: KeyboardEventPos::Key(pos),
                    },
                    &mut *sink,
                )
            });
        }

        self.multi_tap.poll(now, sink);
        cooked_changed
    }

    /// Dispatch a debounced key event or an encoder event
    pub fn process_event_at(&mut self, now: Instant, event: KeyboardEvent, sink: &mut impl KeyEventSink) {
        match event.pos {
            KeyboardEventPos::Key(pos) => {
                let Some(action) = self.action_at(pos) else {
                    error!("Key event out of the keymap: {:?}", pos);
                    return;
                };
                self.process_action(now, action, event.pressed, sink);
            }
            KeyboardEventPos::RotaryEncoder(encoder) => self.process_encoder(encoder, event.pressed, sink),
        }
    }

    fn action_at(&self, pos: KeyPos) -> Option<KeyAction> {
        self.keymap.get(pos.row as usize)?.get(pos.col as usize).copied()
    }

    fn process_action(&mut self, now: Instant, action: KeyAction, pressed: bool, sink: &mut impl KeyEventSink) {
        match action {
            KeyAction::No => (),
            KeyAction::Key(key) => {
                if pressed {
                    sink.register(key);
                } else {
                    sink.unregister(key);
                }
            }
            KeyAction::Axis { axis, direction } => {
                self.arbiter.on_event(axis, direction, pressed, sink);
            }
            KeyAction::DebounceToggle => {
                if pressed {
                    self.fast_mode = !self.fast_mode;
                    self.debouncer.set_fast_mode(self.fast_mode);
                    info!("Debounce fast mode: {}", if self.fast_mode { "ON" } else { "OFF" });
                }
            }
            KeyAction::MultiTap => {
                if pressed {
                    self.multi_tap.press(now);
                }
            }
        }
    }

    fn process_encoder(&mut self, encoder: RotaryEncoderPos, pressed: bool, sink: &mut impl KeyEventSink) {
        // One tap per step
        if !pressed {
            return;
        }
        let Some(action) = self.encoders.get(encoder.id as usize) else {
            warn!("Encoder {} has no action", encoder.id);
            return;
        };
        let key = match encoder.direction {
            Direction::Clockwise => action.clockwise(),
            Direction::CounterClockwise => action.counter_clockwise(),
            Direction::None => None,
        };
        if let Some(key) = key {
            sink.tap(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU8;

    use keyflow_types::keycode::{ConsumerKey, HidKeyCode, KeyCode};

    use super::*;
    use crate::config::{AxisConfig, DebounceConfig, MultiTapConfig};
    use crate::debounce::{DebouncePolicy, PolicyMap};
    use crate::{a, ax, k, keymap};

    #[derive(Default)]
    struct Recorder {
        actions: heapless::Vec<(bool, KeyCode), 16>,
    }

    impl KeyEventSink for Recorder {
        fn register(&mut self, key: KeyCode) {
            self.actions.push((true, key)).unwrap();
        }

        fn unregister(&mut self, key: KeyCode) {
            self.actions.push((false, key)).unwrap();
        }
    }

    const W: KeyCode = KeyCode::Hid(HidKeyCode::W);
    const S: KeyCode = KeyCode::Hid(HidKeyCode::S);
    const Q: KeyCode = KeyCode::Hid(HidKeyCode::Q);
    const VOL_UP: KeyCode = KeyCode::Consumer(ConsumerKey::VolumeIncrement);
    const NEXT: KeyCode = KeyCode::Consumer(ConsumerKey::NextTrack);

    const KEYMAP: [[KeyAction; 3]; 2] = keymap!(
        [ax!(0, Pos), ax!(0, Neg), k!(Q)],
        [a!(DebounceToggle), a!(MultiTap), a!(No)]
    );

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn processor(keymap: &[[KeyAction; 3]; 2]) -> KeyProcessor<'_, 2, 3, 1, 1> {
        let mut processor = KeyProcessor::new(
            keymap,
            KeyflowConfig {
                debounce: DebounceConfig {
                    time: NonZeroU8::new(5).unwrap(),
                    policy: PolicyMap::new().with_fast_mode(0, 0).with_fast_mode(0, 1),
                },
                axes: [AxisConfig::vertical()],
                multi_tap: MultiTapConfig::default(),
                encoders: [EncoderAction::new(VOL_UP, KeyCode::Consumer(ConsumerKey::VolumeDecrement))],
            },
        );
        processor.reset_at(at(0));
        processor
    }

    #[test]
    fn test_axis_keys_are_arbitrated() {
        let mut p = processor(&KEYMAP);
        let mut sink = Recorder::default();

        assert!(!p.scan_at(at(0), &[0b001, 0], true, &mut sink));
        assert!(p.scan_at(at(5), &[0b001, 0], false, &mut sink));
        assert_eq!(sink.actions.as_slice(), &[(true, W)]);

        p.scan_at(at(10), &[0b011, 0], true, &mut sink);
        p.scan_at(at(15), &[0b011, 0], false, &mut sink);
        assert_eq!(sink.actions.as_slice(), &[(true, W), (false, W), (true, S)]);
        assert_eq!(p.arbiter().axis(0).unwrap().registered(), Some(S));
        assert_eq!(p.cooked(), &[0b011, 0]);
    }

    #[test]
    fn test_plain_key() {
        let mut p = processor(&KEYMAP);
        let mut sink = Recorder::default();

        p.scan_at(at(0), &[0b100, 0], true, &mut sink);
        p.scan_at(at(5), &[0b100, 0], false, &mut sink);
        p.scan_at(at(20), &[0, 0], true, &mut sink);
        p.scan_at(at(25), &[0, 0], false, &mut sink);
        assert_eq!(sink.actions.as_slice(), &[(true, Q), (false, Q)]);
    }

    #[test]
    fn test_toggle_fast_mode() {
        let mut p = processor(&KEYMAP);
        let mut sink = Recorder::default();
        assert_eq!(p.debouncer().policy(KeyPos::new(0, 0)), DebouncePolicy::Defer);

        p.scan_at(at(0), &[0, 0b001], true, &mut sink);
        p.scan_at(at(5), &[0, 0b001], false, &mut sink);
        assert!(p.fast_mode());
        assert!(p.debouncer().fast_mode());
        assert_eq!(p.debouncer().policy(KeyPos::new(0, 0)), DebouncePolicy::Eager);
        assert!(sink.actions.is_empty());

        // `W` is eager now
        assert!(p.scan_at(at(6), &[0b001, 0b001], true, &mut sink));
        assert_eq!(sink.actions.as_slice(), &[(true, W)]);

        // Releasing the toggle doesn't switch back
        p.scan_at(at(20), &[0b001, 0], true, &mut sink);
        p.scan_at(at(25), &[0b001, 0], false, &mut sink);
        assert!(p.fast_mode());

        p.scan_at(at(30), &[0b001, 0b001], true, &mut sink);
        p.scan_at(at(35), &[0b001, 0b001], false, &mut sink);
        assert!(!p.fast_mode());
        assert_eq!(p.debouncer().policy(KeyPos::new(0, 0)), DebouncePolicy::Defer);
    }

    #[test]
    fn test_multi_tap_resolves_after_timeout() {
        let mut p = processor(&KEYMAP);
        let mut sink = Recorder::default();

        for (t, raw) in [(0, 0b010), (10, 0), (20, 0b010), (30, 0)] {
            p.scan_at(at(t), &[0, raw], true, &mut sink);
            p.scan_at(at(t + 5), &[0, raw], false, &mut sink);
        }
        assert_eq!(p.multi_tap().count(), 2);

        // Last press was committed at 25ms
        p.scan_at(at(1025), &[0, 0], false, &mut sink);
        assert!(sink.actions.is_empty());
        p.scan_at(at(1026), &[0, 0], false, &mut sink);
        assert_eq!(sink.actions.as_slice(), &[(true, NEXT), (false, NEXT)]);
        assert_eq!(p.multi_tap().count(), 0);
    }

    #[test]
    fn test_encoder_taps_on_step() {
        let mut p = processor(&KEYMAP);
        let mut sink = Recorder::default();

        p.process_event_at(at(0), KeyboardEvent::rotary_encoder(0, Direction::Clockwise, true), &mut sink);
        p.process_event_at(at(0), KeyboardEvent::rotary_encoder(0, Direction::Clockwise, false), &mut sink);
        p.process_event_at(at(0), KeyboardEvent::rotary_encoder(0, Direction::None, true), &mut sink);
        // Unknown encoder
        p.process_event_at(at(0), KeyboardEvent::rotary_encoder(1, Direction::Clockwise, true), &mut sink);
        assert_eq!(sink.actions.as_slice(), &[(true, VOL_UP), (false, VOL_UP)]);
    }

    #[test]
    fn test_event_outside_keymap_is_ignored() {
        let mut p = processor(&KEYMAP);
        let mut sink = Recorder::default();
        p.process_event_at(at(0), KeyboardEvent::key(5, 0, true), &mut sink);
        p.process_event_at(at(0), KeyboardEvent::key(1, 2, true), &mut sink);
        assert!(sink.actions.is_empty());
    }
}
