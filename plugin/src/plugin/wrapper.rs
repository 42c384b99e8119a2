use crate::host::HostHandle;
use crate::plugin::{Plugin, PluginError, PluginShared, logging};
use fmod_dsp_common::debug::LogLevel;
use fmod_dsp_common::result::ErrorCode;
use fmod_dsp_common::sys::FMOD_DSP_STATE;
use std::cell::UnsafeCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::AssertUnwindSafe;
use std::ptr::NonNull;

pub(crate) mod panic {
    #[cfg(not(test))]
    pub use std::panic::catch_unwind;

    #[cfg(test)]
    #[inline]
    pub fn catch_unwind<F: FnOnce() -> R + std::panic::UnwindSafe, R>(
        f: F,
    ) -> std::thread::Result<R> {
        Ok(f())
    }
}

/// The per-instance state of a plugin, as stored in the host's `plugindata` pointer.
pub(crate) struct PluginWrapper<P: Plugin> {
    shared: P::Shared,
    audio_processor: UnsafeCell<P>,
}

impl<P: Plugin> PluginWrapper<P> {
    pub(crate) fn new(host: HostHandle) -> Result<Self, PluginError> {
        let shared = P::Shared::new(host)?;
        let audio_processor = UnsafeCell::new(P::new(host, &shared)?);

        Ok(Self {
            shared,
            audio_processor,
        })
    }

    #[inline]
    pub(crate) fn shared(&self) -> &P::Shared {
        &self.shared
    }

    /// # Safety
    /// Caller must ensure this method is only called on the mixer thread, and has exclusivity on
    /// it.
    #[inline]
    pub(crate) unsafe fn audio_processor(&self) -> NonNull<P> {
        // SAFETY: pointer has been created from reference
        unsafe { NonNull::new_unchecked(self.audio_processor.get()) }
    }

    /// Resolves the instance stored in the given DSP state.
    ///
    /// # Safety
    /// The state pointer must be valid, and its `plugindata` must either be NULL or have been set
    /// by this wrapper's create callback for the same plugin type `P`.
    pub(crate) unsafe fn from_state<'a>(
        state: *mut FMOD_DSP_STATE,
    ) -> Result<&'a Self, PluginWrapperError> {
        state
            .as_ref()
            .ok_or(PluginWrapperError::NulDspState)?
            .plugindata
            .cast::<Self>()
            .as_ref()
            .ok_or(PluginWrapperError::UninitializedInstance)
    }

    /// Runs the given handler with the instance stored in the given DSP state, reporting any error
    /// (or panic) to the host's logger.
    ///
    /// The reported location is the one of the calling callback.
    ///
    /// # Safety
    /// Same as [`from_state`](Self::from_state).
    #[track_caller]
    pub(crate) unsafe fn handle<T, F>(
        state: *mut FMOD_DSP_STATE,
        handler: F,
    ) -> Result<T, ErrorCode>
    where
        F: FnOnce(&PluginWrapper<P>) -> Result<T, PluginWrapperError>,
    {
        match Self::handle_panic(state, handler) {
            Ok(value) => Ok(value),
            Err(e) => {
                logging::plugin_log(state, &e);
                Err(e.code())
            }
        }
    }

    /// Same as [`handle`](Self::handle), but never logs anything, for use on the mixer thread.
    ///
    /// # Safety
    /// Same as [`from_state`](Self::from_state).
    pub(crate) unsafe fn handle_realtime<T, F>(
        state: *mut FMOD_DSP_STATE,
        handler: F,
    ) -> Result<T, ErrorCode>
    where
        F: FnOnce(&PluginWrapper<P>) -> Result<T, PluginWrapperError>,
    {
        Self::handle_panic(state, handler).map_err(|e| e.code())
    }

    unsafe fn handle_panic<T, F>(
        state: *mut FMOD_DSP_STATE,
        handler: F,
    ) -> Result<T, PluginWrapperError>
    where
        F: FnOnce(&PluginWrapper<P>) -> Result<T, PluginWrapperError>,
    {
        let plugin = Self::from_state(state)?;

        panic::catch_unwind(AssertUnwindSafe(|| handler(plugin)))
            .map_err(|_| PluginWrapperError::Panic)?
    }
}

// SAFETY: the audio processor is only ever accessed by the mixer thread, which the host
// guarantees to be exclusive. The shared part is Sync.
unsafe impl<P: Plugin> Send for PluginWrapper<P> {}
// SAFETY: same as above.
unsafe impl<P: Plugin> Sync for PluginWrapper<P> {}

#[derive(Debug)]
pub enum PluginWrapperError {
    NulDspState,
    NulHostFunctions,
    NulPtr(&'static str),
    UninitializedInstance,
    AllocationFailed(usize),
    MisalignedAllocation,
    NegativeIndex(i32),
    Panic,
    Plugin(PluginError),
}

impl PluginWrapperError {
    /// The status code reported to the host for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PluginWrapperError::Plugin(e) => e.code(),
            PluginWrapperError::AllocationFailed(_) | PluginWrapperError::MisalignedAllocation => {
                ErrorCode::Memory
            }
            PluginWrapperError::UninitializedInstance => ErrorCode::InvalidHandle,
            PluginWrapperError::Panic => ErrorCode::Internal,
            _ => ErrorCode::InvalidParam,
        }
    }

    /// The level this error is logged at.
    pub fn level(&self) -> LogLevel {
        match self {
            PluginWrapperError::Plugin(
                PluginError::InvalidParameter(_) | PluginError::InvalidValue(_),
            )
            | PluginWrapperError::NegativeIndex(_) => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }
}

impl From<PluginError> for PluginWrapperError {
    #[inline]
    fn from(e: PluginError) -> Self {
        PluginWrapperError::Plugin(e)
    }
}

impl Display for PluginWrapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginWrapperError::NulDspState => {
                f.write_str("DSP callback was called with a null FMOD_DSP_STATE pointer")
            }
            PluginWrapperError::NulHostFunctions => {
                f.write_str("DSP callback was called with null FMOD_DSP_STATE.functions")
            }
            PluginWrapperError::NulPtr(ptr_name) => {
                write!(f, "DSP callback was called with null {ptr_name} pointer")
            }
            PluginWrapperError::UninitializedInstance => {
                f.write_str("DSP instance was not created before use, or was already released")
            }
            PluginWrapperError::AllocationFailed(size) => {
                write!(f, "Host failed to allocate {size} bytes for the DSP instance")
            }
            PluginWrapperError::MisalignedAllocation => {
                f.write_str("Host returned misaligned memory for the DSP instance")
            }
            PluginWrapperError::NegativeIndex(index) => {
                write!(f, "DSP callback was called with negative parameter index {index}")
            }
            PluginWrapperError::Plugin(e) => std::fmt::Display::fmt(&e, f),
            PluginWrapperError::Panic => f.write_str("Plugin panicked"),
        }
    }
}

impl Error for PluginWrapperError {}
