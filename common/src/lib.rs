//! A small crate containing the raw FMOD DSP plugin ABI, along with various utilities and
//! definitions that are common to both plugins and hosts.
//!
//! All modules of this crate are re-exported in the `fmod-dsp-plugin` and `fmod-dsp-host`
//! crates. Most users should not have to use `fmod-dsp-common` directly.

pub mod debug;
pub mod memory;
pub mod params;
pub mod result;
pub mod speaker;
pub mod sys;
pub mod utils;
