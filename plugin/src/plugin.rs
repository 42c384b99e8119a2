//! Core types and traits to implement an FMOD DSP plugin.
//!
//! The [`Plugin`] trait is the main one required to be implemented by a DSP plugin. It is
//! associated to a [`PluginShared`] type, following the host's thread model, as described below.
//!
//! # Thread model
//!
//! FMOD calls into a DSP instance from two kinds of threads:
//!
//! * The *mixer thread*: this is a real-time thread, on which the host calls the process (or read),
//!   reset and should-process callbacks. This is represented by the type implementing the main
//!   [`Plugin`] trait (also named the audio processor), which is [`Send`] but
//!   [`!Sync`](core::marker::Sync). Operations on it are guaranteed to be exclusive (`&mut`).
//!
//!   Those operations must never block or allocate, as doing so risks audio dropouts.
//!
//! * *Any other thread*, most notably the application's (or FMOD Studio's) control thread, on
//!   which parameters are read and written, possibly while the mixer thread is processing audio.
//!   This is represented by a type implementing the [`PluginShared`] trait, which is both [`Send`]
//!   and [`Sync`], and which is shared between all threads. Parameter storage therefore has to be
//!   lock-free, e.g. by using [`AtomicF32`](crate::utils::AtomicF32).
//!
//! Both types are created together when the host creates the instance, and destroyed together when
//! it releases it. They live in a single allocation obtained through the host's allocator.

use crate::host::HostHandle;
use crate::params::PluginParams;
use crate::process::{Audio, ChannelQuery};

mod descriptor;
mod error;
pub(crate) mod instance;
pub(crate) mod logging;
pub(crate) mod wrapper;

pub use descriptor::*;
pub use error::PluginError;

/// The part of the data and operations of a plugin that are thread-safe.
///
/// This is where parameter values live: see the [`PluginParams`] trait, which every shared type
/// implements.
///
/// This type requires to be both [`Send`] and [`Sync`]: it can be used simultaneously by multiple
/// threads, including (but not limited to) the control thread and the mixer thread.
///
/// See the [module documentation](crate::plugin) for more information on the thread model.
pub trait PluginShared: PluginParams + Sized + Send + Sync + 'static {
    /// Creates a new instance of this shared data, with all parameters set to their default values.
    ///
    /// # Errors
    /// This operation may fail for any reason, in which case `Err` is returned and the instance is
    /// not created.
    fn new(host: HostHandle) -> Result<Self, PluginError>;
}

impl PluginShared for () {
    #[inline]
    fn new(_host: HostHandle) -> Result<Self, PluginError> {
        Ok(())
    }
}

/// The audio processor and main part of a plugin.
///
/// This type implements all DSP-related operations, most notably [`process`](Plugin::process),
/// which fills the output buffers for each block of audio.
///
/// See the [module documentation](crate::plugin) for more information on the thread model.
pub trait Plugin: Sized + Send + 'static {
    /// The type holding the plugin's thread-safe data and parameters.
    ///
    /// If not needed, the empty `()` type can be used instead.
    type Shared: PluginShared;

    /// Returns the plugin's descriptor, containing its name, version, buffer layout and parameters.
    ///
    /// This is only called once, the first time the host asks for the plugin's description.
    fn get_descriptor() -> PluginDescriptor;

    /// Creates the audio processor for a new instance.
    ///
    /// This is called by the host's create callback, right after the shared data has been created.
    /// It is not realtime-safe, and may allocate or perform any other initialization.
    ///
    /// # Errors
    /// This operation may fail for any reason, in which case `Err` is returned and the instance is
    /// not created.
    fn new(host: HostHandle, shared: &Self::Shared) -> Result<Self, PluginError>;

    /// Reports which channel layout this plugin is going to output, given its inputs.
    ///
    /// The host calls this before processing to negotiate buffer formats. Input buffers may be
    /// absent, and buffer contents must not be read or written here.
    ///
    /// The default implementation leaves the host's proposed layout untouched.
    ///
    /// # Errors
    /// Any error leaves the host's proposed layout untouched.
    #[inline]
    fn query(&mut self, _query: &mut ChannelQuery) -> Result<(), PluginError> {
        Ok(())
    }

    /// Processes a block of audio.
    ///
    /// Implementations must write every sample of every output buffer.
    ///
    /// # Errors
    /// If this returns an error (or panics), every output buffer is filled with silence, and the
    /// host is told processing succeeded. The host has no way to recover from a failing block.
    ///
    /// # Realtime Safety
    ///
    /// This runs on the host's real-time mixer thread, and must not block or allocate.
    fn process(&mut self, shared: &Self::Shared, audio: Audio) -> Result<(), PluginError>;

    /// Restores all transient processing state (e.g. filter delay lines or oscillator phases) to
    /// what it would be on a clean start, without touching any parameter value.
    ///
    /// The default implementation does nothing.
    #[inline]
    fn reset(&mut self, _shared: &Self::Shared) {}

    /// Hints whether the host should bother calling [`process`](Plugin::process) for the next
    /// block.
    ///
    /// The default implementation always asks to be processed.
    #[inline]
    fn should_process(&mut self, _inputs_idle: bool, _frames_count: u32) -> bool {
        true
    }
}
