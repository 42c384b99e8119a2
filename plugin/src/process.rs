//! Types exposing audio buffers and format negotiation to plugins.
//!
//! The host hands buffers over as arrays of *interleaved* buffers: each buffer of an array holds
//! `frames_count * channel_count` samples, with all channels of a frame stored next to each other.
//!
//! All of those types are exclusively used in the [`Plugin::process`](crate::plugin::Plugin::process)
//! and [`Plugin::query`](crate::plugin::Plugin::query) methods.

use crate::plugin::PluginError;
use fmod_dsp_common::speaker::{ChannelMask, SpeakerMode};
use fmod_dsp_common::sys::*;
use fmod_dsp_common::utils::{slice_from_external_parts, slice_from_external_parts_mut};
use std::ffi::c_int;

/// The operation requested by the host in a process call.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ProcessOperation {
    /// Fill the output buffers.
    Perform,
    /// Report the output format, without touching any buffer.
    Query,
}

impl ProcessOperation {
    #[inline]
    pub fn from_raw(raw: FMOD_DSP_PROCESS_OPERATION) -> Option<Self> {
        match raw {
            FMOD_DSP_PROCESS_PERFORM => Some(ProcessOperation::Perform),
            FMOD_DSP_PROCESS_QUERY => Some(ProcessOperation::Query),
            _ => None,
        }
    }
}

/// Reads the channel count of a buffer in the given array, checking every pointer along the way.
///
/// # Safety
/// The array's pointers must either be NULL or valid for `numbuffers` elements.
unsafe fn raw_channel_count(raw: &FMOD_DSP_BUFFER_ARRAY, index: u32) -> Option<u32> {
    let index = checked_index(raw, index)?;
    if raw.buffernumchannels.is_null() {
        return None;
    }

    // SAFETY: the index is in bounds, and the pointer is non-null
    u32::try_from(unsafe { *raw.buffernumchannels.add(index) }).ok()
}

/// # Safety
/// Same as [`raw_channel_count`].
unsafe fn raw_channel_mask(raw: &FMOD_DSP_BUFFER_ARRAY, index: u32) -> Option<ChannelMask> {
    let index = checked_index(raw, index)?;
    if raw.bufferchannelmask.is_null() {
        return None;
    }

    // SAFETY: the index is in bounds, and the pointer is non-null
    Some(ChannelMask::from_bits_retain(unsafe {
        *raw.bufferchannelmask.add(index)
    }))
}

/// Returns the location and length of the interleaved samples of a buffer in the given array.
///
/// # Safety
/// Same as [`raw_channel_count`].
unsafe fn raw_buffer_parts(
    raw: &FMOD_DSP_BUFFER_ARRAY,
    index: u32,
    frames_count: u32,
) -> Option<(*mut f32, usize)> {
    let channel_count = raw_channel_count(raw, index)?;
    let index = checked_index(raw, index)?;
    if raw.buffers.is_null() {
        return None;
    }

    let len = usize::try_from(frames_count)
        .ok()?
        .checked_mul(usize::try_from(channel_count).ok()?)?;

    // SAFETY: the index is in bounds, and the pointer is non-null
    let data = unsafe { *raw.buffers.add(index) };
    if data.is_null() && len > 0 {
        return None;
    }

    Some((data, len))
}

#[inline]
fn checked_index(raw: &FMOD_DSP_BUFFER_ARRAY, index: u32) -> Option<usize> {
    let count = u32::try_from(raw.numbuffers).ok()?;
    if index < count {
        usize::try_from(index).ok()
    } else {
        None
    }
}

/// The input buffers of a process call. These may be entirely absent.
#[derive(Copy, Clone)]
pub struct InputBuffers<'a> {
    raw: Option<&'a FMOD_DSP_BUFFER_ARRAY>,
    frames_count: u32,
}

impl<'a> InputBuffers<'a> {
    /// # Safety
    /// The array must either be NULL, or be valid and hold valid buffers of `frames_count` frames
    /// for the lifetime `'a`.
    #[inline]
    pub(crate) unsafe fn from_raw(raw: *const FMOD_DSP_BUFFER_ARRAY, frames_count: u32) -> Self {
        Self {
            // SAFETY: upheld by caller
            raw: unsafe { raw.as_ref() },
            frames_count,
        }
    }

    #[inline]
    pub fn frames_count(&self) -> u32 {
        self.frames_count
    }

    #[inline]
    pub fn buffer_count(&self) -> u32 {
        self.raw
            .and_then(|r| u32::try_from(r.numbuffers).ok())
            .unwrap_or(0)
    }

    #[inline]
    pub fn channel_count(&self, index: u32) -> Option<u32> {
        // SAFETY: the array's validity is upheld by from_raw's caller
        self.raw.and_then(|r| unsafe { raw_channel_count(r, index) })
    }

    #[inline]
    pub fn channel_mask(&self, index: u32) -> Option<ChannelMask> {
        // SAFETY: the array's validity is upheld by from_raw's caller
        self.raw.and_then(|r| unsafe { raw_channel_mask(r, index) })
    }

    #[inline]
    pub fn speaker_mode(&self) -> Option<SpeakerMode> {
        self.raw.and_then(|r| SpeakerMode::from_raw(r.speakermode))
    }

    /// Returns the interleaved samples of the input buffer at the given index.
    #[inline]
    pub fn buffer(&self, index: u32) -> Option<&'a [f32]> {
        let raw = self.raw?;
        // SAFETY: the array's validity is upheld by from_raw's caller
        let (data, len) = unsafe { raw_buffer_parts(raw, index, self.frames_count) }?;
        // SAFETY: each buffer is valid for len samples, as upheld by from_raw's caller
        Some(unsafe { slice_from_external_parts(data, len) })
    }
}

/// The output buffers of a process call, which the plugin must fill.
pub struct OutputBuffers<'a> {
    raw: Option<&'a mut FMOD_DSP_BUFFER_ARRAY>,
    frames_count: u32,
}

impl<'a> OutputBuffers<'a> {
    /// # Safety
    /// The array must either be NULL, or be valid and hold valid, non-overlapping buffers of
    /// `frames_count` frames for the lifetime `'a`.
    #[inline]
    pub(crate) unsafe fn from_raw(raw: *mut FMOD_DSP_BUFFER_ARRAY, frames_count: u32) -> Self {
        Self {
            // SAFETY: upheld by caller
            raw: unsafe { raw.as_mut() },
            frames_count,
        }
    }

    #[inline]
    pub fn frames_count(&self) -> u32 {
        self.frames_count
    }

    #[inline]
    pub fn buffer_count(&self) -> u32 {
        self.raw
            .as_ref()
            .and_then(|r| u32::try_from(r.numbuffers).ok())
            .unwrap_or(0)
    }

    #[inline]
    pub fn channel_count(&self, index: u32) -> Option<u32> {
        // SAFETY: the array's validity is upheld by from_raw's caller
        self.raw
            .as_ref()
            .and_then(|r| unsafe { raw_channel_count(r, index) })
    }

    #[inline]
    pub fn channel_mask(&self, index: u32) -> Option<ChannelMask> {
        // SAFETY: the array's validity is upheld by from_raw's caller
        self.raw
            .as_ref()
            .and_then(|r| unsafe { raw_channel_mask(r, index) })
    }

    #[inline]
    pub fn speaker_mode(&self) -> Option<SpeakerMode> {
        self.raw
            .as_ref()
            .and_then(|r| SpeakerMode::from_raw(r.speakermode))
    }

    /// Returns the interleaved samples of the output buffer at the given index.
    #[inline]
    pub fn buffer_mut(&mut self, index: u32) -> Option<&mut [f32]> {
        let raw = self.raw.as_ref()?;
        // SAFETY: the array's validity is upheld by from_raw's caller
        let (data, len) = unsafe { raw_buffer_parts(raw, index, self.frames_count) }?;
        // SAFETY: each buffer is valid for len samples, as upheld by from_raw's caller. The
        // returned slice borrows self mutably, so it can't alias any other buffer slice.
        Some(unsafe { slice_from_external_parts_mut(data, len) })
    }

    /// Fills every output buffer with silence.
    pub fn fill_silence(&mut self) {
        for index in 0..self.buffer_count() {
            if let Some(buffer) = self.buffer_mut(index) {
                buffer.fill(0.0);
            }
        }
    }
}

/// The audio buffers of a single processing block.
pub struct Audio<'a> {
    pub inputs: InputBuffers<'a>,
    pub outputs: OutputBuffers<'a>,
    inputs_idle: bool,
}

impl<'a> Audio<'a> {
    #[inline]
    pub(crate) fn new(
        inputs: InputBuffers<'a>,
        outputs: OutputBuffers<'a>,
        inputs_idle: bool,
    ) -> Self {
        Self {
            inputs,
            outputs,
            inputs_idle,
        }
    }

    /// The number of frames to process in this block.
    #[inline]
    pub fn frames_count(&self) -> u32 {
        self.outputs.frames_count()
    }

    /// Whether the host knows all inputs to be silent for this block.
    #[inline]
    pub fn inputs_idle(&self) -> bool {
        self.inputs_idle
    }
}

/// The format negotiation happening before processing.
///
/// The host proposes an output layout, which the plugin may change. No buffer contents are
/// available at this stage.
pub struct ChannelQuery<'a> {
    inputs: Option<&'a FMOD_DSP_BUFFER_ARRAY>,
    outputs: &'a mut FMOD_DSP_BUFFER_ARRAY,
}

impl<'a> ChannelQuery<'a> {
    /// # Safety
    /// The input array must either be NULL or valid for `'a`, and the output array must be valid
    /// for `'a`. Their buffer pointers are never read.
    #[inline]
    pub(crate) unsafe fn from_raw(
        inputs: *const FMOD_DSP_BUFFER_ARRAY,
        outputs: &'a mut FMOD_DSP_BUFFER_ARRAY,
    ) -> Self {
        Self {
            // SAFETY: upheld by caller
            inputs: unsafe { inputs.as_ref() },
            outputs,
        }
    }

    #[inline]
    pub fn input_buffer_count(&self) -> u32 {
        self.inputs
            .and_then(|r| u32::try_from(r.numbuffers).ok())
            .unwrap_or(0)
    }

    #[inline]
    pub fn input_channel_count(&self, index: u32) -> Option<u32> {
        // SAFETY: the array's validity is upheld by from_raw's caller
        self.inputs.and_then(|r| unsafe { raw_channel_count(r, index) })
    }

    #[inline]
    pub fn output_buffer_count(&self) -> u32 {
        u32::try_from(self.outputs.numbuffers).unwrap_or(0)
    }

    /// The channel count the host proposes for the given output buffer.
    #[inline]
    pub fn output_channel_count(&self, index: u32) -> Option<u32> {
        // SAFETY: the array's validity is upheld by from_raw's caller
        unsafe { raw_channel_count(self.outputs, index) }
    }

    /// Sets the channel count and speaker layout of the given output buffer.
    ///
    /// # Errors
    /// Returns [`PluginError::Unsupported`] if the host didn't declare a buffer at this index.
    pub fn set_output_channels(
        &mut self,
        index: u32,
        channel_count: u32,
        mask: ChannelMask,
    ) -> Result<(), PluginError> {
        let index = checked_index(self.outputs, index).ok_or(PluginError::Unsupported)?;
        if self.outputs.buffernumchannels.is_null() {
            return Err(PluginError::Unsupported);
        }

        let channel_count = c_int::try_from(channel_count).map_err(|_| PluginError::Unsupported)?;

        // SAFETY: the index is in bounds, and the pointer is non-null
        unsafe { *self.outputs.buffernumchannels.add(index) = channel_count };

        if !self.outputs.bufferchannelmask.is_null() {
            // SAFETY: the index is in bounds, and the pointer is non-null
            unsafe { *self.outputs.bufferchannelmask.add(index) = mask.bits() };
        }

        Ok(())
    }

    #[inline]
    pub fn set_output_speaker_mode(&mut self, speaker_mode: SpeakerMode) {
        self.outputs.speakermode = speaker_mode.to_raw();
    }
}
