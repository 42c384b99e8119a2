//! Low-level, safe Rust wrappers to create DSP plugins for the FMOD audio engine.
//!
//! A DSP plugin is a type implementing the [`Plugin`](plugin::Plugin) trait, exported to the host
//! through the [`fmod_export_dsp!`] macro. This crate takes care of building the static
//! description table the host reads at load time, of managing each instance's memory through the
//! host's allocator, and of translating every host callback into safe trait method calls.

#[macro_use]
pub mod entry;
pub mod host;
pub mod params;
pub mod plugin;
pub mod process;

pub use fmod_dsp_common::debug;
pub use fmod_dsp_common::memory;
pub use fmod_dsp_common::result;
pub use fmod_dsp_common::speaker;
pub use fmod_dsp_common::sys;
pub use fmod_dsp_common::utils;

/// A helpful prelude re-exporting all the types related to plugin implementation.
pub mod prelude {
    pub use crate::debug::LogLevel;
    pub use crate::entry::DspEntry;
    pub use crate::fmod_export_dsp;
    pub use crate::host::HostHandle;
    pub use crate::params::{
        ParamDescriptor, ParamDisplayWriter, ParamIndex, ParamRange, PluginParams,
    };
    pub use crate::plugin::{
        CallbackKind, Plugin, PluginDescriptor, PluginError, PluginShared,
    };
    pub use crate::process::{Audio, ChannelQuery, InputBuffers, OutputBuffers};
    pub use crate::speaker::{ChannelMask, SpeakerMode};
    pub use crate::utils::{AtomicF32, PluginVersion};
}
