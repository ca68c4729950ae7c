use std::path::Path;
use std::{env, fs};

use const_gen::*;
use keyflow_config::KeyflowTomlConfig;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=KEYFLOW_CONFIG_PATH");

    // Read keyflow.toml if it's present
    let config = match env::var("KEYFLOW_CONFIG_PATH") {
        Ok(path) => {
            println!("cargo:rerun-if-changed={path}");
            KeyflowTomlConfig::load(&path)
        }
        Err(_) => KeyflowTomlConfig::parse("<default>", ""),
    };
    let config = config.unwrap_or_else(|e| panic!("❌ keyflow config error: {e}"));

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("constants.rs");
    fs::write(&dest_path, get_constants_str(&config)).expect("Failed to write constants.rs file");
}

fn get_constants_str(config: &KeyflowTomlConfig) -> String {
    // Validation guarantees the range
    let debounce_time = config.debounce.time as u8;
    let eager_keys: Vec<(u8, u8)> = config.debounce.eager_keys.iter().map(|p| (p[0], p[1])).collect();
    let fast_mode_keys: Vec<(u8, u8)> = config.debounce.fast_mode_keys.iter().map(|p| (p[0], p[1])).collect();

    [
        const_declaration!(pub(crate) DEBOUNCE_TIME = debounce_time),
        const_declaration!(pub(crate) EAGER_KEYS = eager_keys),
        const_declaration!(pub(crate) FAST_MODE_KEYS = fast_mode_keys),
        const_declaration!(pub(crate) FAST_MODE_KEYS_MAX = keyflow_config::defaults::FAST_MODE_KEYS_LIMIT),
        const_declaration!(pub(crate) MULTI_TAP_TIMEOUT_MS = config.multi_tap.timeout),
        const_declaration!(pub(crate) MULTI_TAP_MAX = config.multi_tap.max_taps),
    ]
    .map(|s| "#[allow(clippy::redundant_static_lifetimes)]\n".to_owned() + s.as_str())
    .join("\n")
}
