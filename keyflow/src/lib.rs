//! Per-key matrix debouncing and opposite-direction key arbitration for keyboard firmware.
//!
//! Raw matrix scans go through a [`debounce::DebounceEngine`], the debounced changes are looked up
//! in a single layer action table and dispatched by a [`processor::KeyProcessor`]: plain keys go
//! to the [`sink::KeyEventSink`], virtual axis keys go through the [`axis::AxisArbiter`] first.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![no_std]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod axis;
pub mod config;
pub mod debounce;
pub mod event;
pub mod layout_macro;
pub mod matrix;
pub mod processor;
pub mod sink;
pub mod tap;

pub use keyflow_types::{action, keycode};

// Compile-time defaults generated from `keyflow.toml`
include!(concat!(env!("OUT_DIR"), "/constants.rs"));
