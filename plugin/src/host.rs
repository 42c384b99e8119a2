//! Access to the host functions available to a DSP instance.

use fmod_dsp_common::debug::LogLevel;
use fmod_dsp_common::memory::MemoryType;
use fmod_dsp_common::result::ErrorCode;
use fmod_dsp_common::speaker::{ChannelMask, SpeakerMode};
use fmod_dsp_common::sys::*;
use std::ffi::{CString, c_int, c_uint, c_void};
use std::marker::PhantomData;
use std::ptr::NonNull;

/// The source string given to the host's allocator, for its memory tracking.
const ALLOC_SOURCE: &std::ffi::CStr = c"fmod-dsp-plugin";

/// A handle to the host, valid for the duration of a single callback.
///
/// This wraps the `FMOD_DSP_STATE` the host passes to every DSP callback, and exposes the host
/// functions it points to.
#[derive(Copy, Clone)]
pub struct HostHandle<'a> {
    state: NonNull<FMOD_DSP_STATE>,
    _lifetime: PhantomData<&'a FMOD_DSP_STATE>,
}

impl<'a> HostHandle<'a> {
    /// # Safety
    /// The state pointer must be valid for the lifetime `'a`.
    #[inline]
    pub(crate) unsafe fn from_raw(state: *mut FMOD_DSP_STATE) -> Option<Self> {
        Some(Self {
            state: NonNull::new(state)?,
            _lifetime: PhantomData,
        })
    }

    #[inline]
    pub fn as_raw(&self) -> *mut FMOD_DSP_STATE {
        self.state.as_ptr()
    }

    #[inline]
    fn raw(&self) -> &'a FMOD_DSP_STATE {
        // SAFETY: the pointer is valid for 'a, as guaranteed by from_raw's caller
        unsafe { self.state.as_ref() }
    }

    #[inline]
    pub(crate) fn functions(&self) -> Option<&'a FMOD_DSP_STATE_FUNCTIONS> {
        // SAFETY: the host guarantees the functions table outlives all DSP instances
        unsafe { self.raw().functions.as_ref() }
    }

    /// The speakers the channels of the instance's input map to.
    #[inline]
    pub fn channel_mask(&self) -> ChannelMask {
        ChannelMask::from_bits_retain(self.raw().channelmask)
    }

    /// The speaker mode of the instance's input signal.
    #[inline]
    pub fn source_speaker_mode(&self) -> SpeakerMode {
        SpeakerMode::from_raw(self.raw().source_speakermode).unwrap_or_default()
    }

    /// The sample rate of the host's mixer, in Hz.
    pub fn sample_rate(&self) -> Result<u32, ErrorCode> {
        let get_sample_rate = self
            .functions()
            .and_then(|f| f.getsamplerate)
            .ok_or(ErrorCode::Unsupported)?;

        let mut rate: c_int = 0;
        // SAFETY: the state pointer is valid, and rate is a valid location to write to
        ErrorCode::from_raw(unsafe { get_sample_rate(self.as_raw(), &mut rate) })?;
        u32::try_from(rate).map_err(|_| ErrorCode::Internal)
    }

    /// The number of frames the host's mixer processes per block.
    pub fn block_size(&self) -> Result<u32, ErrorCode> {
        let get_block_size = self
            .functions()
            .and_then(|f| f.getblocksize)
            .ok_or(ErrorCode::Unsupported)?;

        let mut size: c_uint = 0;
        // SAFETY: the state pointer is valid, and size is a valid location to write to
        ErrorCode::from_raw(unsafe { get_block_size(self.as_raw(), &mut size) })?;
        Ok(size)
    }

    /// The speaker modes of the host's mixer and of its final output, in that order.
    pub fn speaker_modes(&self) -> Result<(SpeakerMode, SpeakerMode), ErrorCode> {
        let get_speaker_mode = self
            .functions()
            .and_then(|f| f.getspeakermode)
            .ok_or(ErrorCode::Unsupported)?;

        let mut mixer = FMOD_SPEAKERMODE_DEFAULT;
        let mut output = FMOD_SPEAKERMODE_DEFAULT;
        // SAFETY: the state pointer is valid, and both modes are valid locations to write to
        ErrorCode::from_raw(unsafe { get_speaker_mode(self.as_raw(), &mut mixer, &mut output) })?;

        Ok((
            SpeakerMode::from_raw(mixer).unwrap_or_default(),
            SpeakerMode::from_raw(output).unwrap_or_default(),
        ))
    }

    /// Returns `true` if the host provides a logging function.
    #[inline]
    pub fn has_logger(&self) -> bool {
        self.functions().and_then(|f| f.log).is_some()
    }

    /// Sends a diagnostic message to the host's logger.
    ///
    /// The `tag` is displayed by the host as the function the message originates from, and the
    /// caller's file and line are reported along with it. If the host provides no logger, the
    /// message is written to the standard error output instead.
    ///
    /// # Realtime Safety
    ///
    /// This allocates, and must not be called from the mixer thread.
    #[track_caller]
    pub fn log(&self, level: LogLevel, tag: &str, message: &str) {
        let Some(log) = self.functions().and_then(|f| f.log) else {
            eprintln!("{} {tag}: {message}", level.tag_name());
            return;
        };

        let location = std::panic::Location::caller();
        let (Ok(file), Ok(tag), Ok(message)) = (
            CString::new(location.file()),
            CString::new(tag),
            CString::new(message),
        ) else {
            eprintln!("[FMOD_DSP_ERROR] Failed to serialize log message for host: {message}");
            return;
        };

        let line = c_int::try_from(location.line()).unwrap_or(c_int::MAX);

        // SAFETY: all strings are valid and NUL-terminated, and the "%s" format consumes exactly
        // the one string argument that follows it.
        unsafe {
            log(
                level.to_raw(),
                file.as_ptr(),
                line,
                tag.as_ptr(),
                c"%s".as_ptr(),
                message.as_ptr(),
            )
        }
    }

    /// Allocates memory from the host's allocator.
    ///
    /// Returns `None` if the host provides no allocator or if the allocation failed.
    pub(crate) fn alloc(&self, size: usize) -> Option<NonNull<c_void>> {
        let alloc = self.functions()?.alloc?;
        let size = c_uint::try_from(size).ok()?;

        // SAFETY: the source string is a valid, static C string
        NonNull::new(unsafe { alloc(size, MemoryType::NORMAL.bits(), ALLOC_SOURCE.as_ptr()) })
    }

    /// Returns memory to the host's allocator.
    ///
    /// # Safety
    /// The pointer must have been returned by [`alloc`](Self::alloc) on this host, and must not be
    /// used afterwards.
    pub(crate) unsafe fn free(&self, ptr: NonNull<c_void>) {
        if let Some(free) = self.functions().and_then(|f| f.free) {
            // SAFETY: upheld by caller
            unsafe { free(ptr.as_ptr(), MemoryType::NORMAL.bits(), ALLOC_SOURCE.as_ptr()) }
        }
    }
}
