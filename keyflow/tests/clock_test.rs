pub mod common;

use embassy_time::{Duration, Instant, MockDriver};
use keyflow::config::{AxisConfig, KeyflowConfig};
use keyflow::keycode::{HidKeyCode, KeyCode};
use keyflow::matrix::{MatrixRow, MatrixSource};
use keyflow::processor::KeyProcessor;
use keyflow::{ax, k, keymap};

use crate::common::RecordingSink;

/// A matrix whose switches are set by the test
struct TestMatrix {
    rows: [MatrixRow; 2],
    last: [MatrixRow; 2],
}

impl MatrixSource<2> for TestMatrix {
    fn scan(&mut self, raw: &mut [MatrixRow; 2]) -> bool {
        *raw = self.rows;
        let changed = self.rows != self.last;
        self.last = self.rows;
        changed
    }
}

// The mock driver is global, so the whole scan loop is checked in a single test
#[test]
fn test_scan_with_system_clock() {
    let driver = MockDriver::get();
    driver.reset();

    let keymap = keymap!([ax!(0, Pos), ax!(0, Neg)], [k!(E), k!(R)]);
    let config: KeyflowConfig<2, 2, 2, 1> = KeyflowConfig::default();
    let mut processor = KeyProcessor::new(&keymap, config);
    let mut matrix = TestMatrix { rows: [0; 2], last: [0; 2] };
    let mut sink = RecordingSink::with_axes(&[AxisConfig::vertical()]);
    processor.reset_at(Instant::now());
    let debounce_time = processor.debouncer().debounce_time() as u64;

    matrix.rows = [0b01, 0b01];
    assert!(!processor.scan(&mut matrix, &mut sink));
    driver.advance(Duration::from_millis(debounce_time - 1));
    assert!(!processor.scan(&mut matrix, &mut sink));
    driver.advance(Duration::from_millis(1));
    assert!(processor.scan(&mut matrix, &mut sink));

    let w = KeyCode::Hid(HidKeyCode::W);
    let e = KeyCode::Hid(HidKeyCode::E);
    assert_eq!(sink.actions, vec![(true, w), (true, e)]);

    matrix.rows = [0b10, 0b01];
    processor.scan(&mut matrix, &mut sink);
    driver.advance(Duration::from_millis(debounce_time));
    assert!(processor.scan(&mut matrix, &mut sink));
    assert!(sink.is_held(KeyCode::Hid(HidKeyCode::S)));
    assert!(!sink.is_held(w));
}
