//! # keyflow types
//!
//! Value types shared by the keyflow crates.
//!
//! - [`keycode`] - HID usage codes and consumer page keys, the payload of every sink action
//! - [`action`] - What a matrix position does when it changes: plain keys, virtual axis keys and
//!   the special debounce toggle / multi-tap keys

#![no_std]

pub mod action;
pub mod keycode;
