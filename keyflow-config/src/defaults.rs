//! Default values and limits of `keyflow.toml`

/// Default debounce time in milliseconds
pub const DEBOUNCE_TIME_MS: u16 = 5;
/// Default number of matrix rows
pub const MATRIX_ROWS: u8 = 6;
/// Default number of matrix columns
pub const MATRIX_COLS: u8 = 21;
/// Columns are packed into a `u32` per row
pub const MATRIX_COLS_LIMIT: u8 = 32;
/// Capacity of the fast mode key list
pub const FAST_MODE_KEYS_LIMIT: usize = 16;
/// Default multi-tap timeout in milliseconds
pub const MULTI_TAP_TIMEOUT_MS: u64 = 1000;
/// Default number of resolvable taps
pub const MULTI_TAP_MAX: usize = 3;
/// Upper bound of resolvable taps, the length of the default media tap table
pub const MULTI_TAP_MAX_LIMIT: usize = 3;
