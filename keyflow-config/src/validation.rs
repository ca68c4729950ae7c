//! Validation of `keyflow.toml`

use crate::error::{ConfigError, ConfigResult};
use crate::{KeyflowTomlConfig, defaults};

/// Validates the entire configuration
pub(crate) fn validate_config(config: &KeyflowTomlConfig) -> ConfigResult<()> {
    validate_matrix_section(config)?;
    validate_debounce_section(config)?;
    validate_multi_tap_section(config)?;
    Ok(())
}

fn validate_matrix_section(config: &KeyflowTomlConfig) -> ConfigResult<()> {
    let matrix = &config.matrix;
    if matrix.rows == 0 {
        return Err(ConfigError::InvalidValue {
            field: "matrix.rows".to_string(),
            value: matrix.rows.to_string(),
            expected: "at least 1".to_string(),
        });
    }
    if matrix.cols == 0 || matrix.cols > defaults::MATRIX_COLS_LIMIT {
        return Err(ConfigError::InvalidValue {
            field: "matrix.cols".to_string(),
            value: matrix.cols.to_string(),
            expected: format!("1 to {}", defaults::MATRIX_COLS_LIMIT),
        });
    }
    Ok(())
}

fn validate_debounce_section(config: &KeyflowTomlConfig) -> ConfigResult<()> {
    let debounce = &config.debounce;

    if !(1..=255).contains(&debounce.time) {
        return Err(ConfigError::InvalidValue {
            field: "debounce.time".to_string(),
            value: debounce.time.to_string(),
            expected: "1 to 255".to_string(),
        });
    }

    if debounce.fast_mode_keys.len() > defaults::FAST_MODE_KEYS_LIMIT {
        return Err(ConfigError::InvalidValue {
            field: "debounce.fast_mode_keys".to_string(),
            value: format!("{} keys", debounce.fast_mode_keys.len()),
            expected: format!("at most {} keys", defaults::FAST_MODE_KEYS_LIMIT),
        });
    }

    validate_positions(config, "debounce.eager_keys", &debounce.eager_keys)?;
    validate_positions(config, "debounce.fast_mode_keys", &debounce.fast_mode_keys)
}

fn validate_positions(config: &KeyflowTomlConfig, field: &str, positions: &[[u8; 2]]) -> ConfigResult<()> {
    let matrix = &config.matrix;
    for pos in positions {
        if pos[0] >= matrix.rows || pos[1] >= matrix.cols {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: format!("[{}, {}]", pos[0], pos[1]),
                expected: format!("a position inside the {}x{} matrix", matrix.rows, matrix.cols),
            });
        }
    }
    Ok(())
}

fn validate_multi_tap_section(config: &KeyflowTomlConfig) -> ConfigResult<()> {
    let multi_tap = &config.multi_tap;
    if multi_tap.max_taps > defaults::MULTI_TAP_MAX_LIMIT {
        return Err(ConfigError::InvalidValue {
            field: "multi_tap.max_taps".to_string(),
            value: multi_tap.max_taps.to_string(),
            expected: format!("0 to {}", defaults::MULTI_TAP_MAX_LIMIT),
        });
    }
    if multi_tap.timeout == 0 {
        return Err(ConfigError::InvalidValue {
            field: "multi_tap.timeout".to_string(),
            value: multi_tap.timeout.to_string(),
            expected: "a non-zero timeout".to_string(),
        });
    }
    Ok(())
}
