//! A minimal, safe host harness for FMOD DSP plugins.
//!
//! This crate loads a plugin's description table (see [`library`]), provides the host functions
//! table every instance relies on (see [`functions`]), and drives instances through their whole
//! lifecycle (see [`instance`]). It does not mix or route audio: it only exists to exercise
//! plugins outside of the FMOD engine, most notably in tests.
//!
//! # Example
//!
//! ```ignore
//! use fmod_dsp_host::prelude::*;
//!
//! // SAFETY: the entry function comes from a plugin linked into this binary.
//! let library = unsafe { DspLibrary::from_entry_fn(FMODGetDSPDescription) }.unwrap();
//! let mut instance = library.instantiate(HostConfig::default()).unwrap();
//!
//! instance.params().set_float(0, 0.5).unwrap();
//!
//! let mut samples = [1.0; 256];
//! let mut outputs = [OutputBuffer { samples: &mut samples, channels: 1 }];
//! instance.audio().process(256, &[], &mut outputs, false).unwrap();
//! ```

pub mod description;
pub mod error;
pub mod functions;
pub mod instance;
pub mod library;

pub use error::{DescriptionLoadError, HostError};

pub use fmod_dsp_common::debug;
pub use fmod_dsp_common::params;
pub use fmod_dsp_common::result;
pub use fmod_dsp_common::speaker;
pub use fmod_dsp_common::sys;
pub use fmod_dsp_common::utils;

/// A helpful prelude re-exporting all the types related to host implementation.
pub mod prelude {
    pub use crate::description::DspDescription;
    pub use crate::functions::{
        AllocationStats, HostConfig, allocation_stats, reset_allocation_stats,
    };
    pub use crate::instance::{
        DspInstance, InputBuffer, InstanceAudio, InstanceParams, OutputBuffer, OutputLayout,
    };
    pub use crate::library::DspLibrary;
    pub use crate::params::{ParamInfo, ParamRange};
    pub use crate::result::ErrorCode;
    pub use crate::speaker::{ChannelMask, SpeakerMode};
    pub use crate::utils::PluginVersion;
    pub use crate::{DescriptionLoadError, HostError};
}
