//! Plugin instances, and the buffers used to drive them.
//!
//! A [`DspInstance`] owns the DSP state the plugin's callbacks operate on. Its parameters can be
//! accessed from any thread through [`InstanceParams`], while audio operations go through the
//! exclusive [`InstanceAudio`] handle. Both can be obtained at the same time using
//! [`DspInstance::split`], which mirrors how the host's control and mixer threads use a plugin.

use crate::description::DspDescription;
use crate::error::HostError;
use crate::functions::{HostConfig, InstanceContext, host_functions};
use fmod_dsp_common::result::ErrorCode;
use fmod_dsp_common::speaker::{ChannelMask, SpeakerMode};
use fmod_dsp_common::sys::*;
use fmod_dsp_common::utils::data_from_array_buf;
use std::cell::UnsafeCell;
use std::ffi::{c_char, c_int, c_uint, c_void};
use std::marker::PhantomData;

/// An interleaved input buffer.
#[derive(Copy, Clone, Debug)]
pub struct InputBuffer<'a> {
    pub samples: &'a [f32],
    pub channels: u32,
}

/// An interleaved output buffer.
#[derive(Debug)]
pub struct OutputBuffer<'a> {
    pub samples: &'a mut [f32],
    pub channels: u32,
}

/// The output layout a plugin reported during a format query.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct OutputLayout {
    /// The channel count of each output buffer.
    pub channels: Vec<u32>,
    /// The speaker layout of each output buffer.
    pub masks: Vec<ChannelMask>,
    pub speaker_mode: Option<SpeakerMode>,
}

/// A live instance of a plugin.
///
/// The instance is released when this is dropped.
pub struct DspInstance<'a> {
    core: InstanceCore,
    _library: PhantomData<&'a ()>,
}

struct InstanceCore {
    description: *const FMOD_DSP_DESCRIPTION,
    state: Box<UnsafeCell<FMOD_DSP_STATE>>,
    _functions: Box<FMOD_DSP_STATE_FUNCTIONS>,
    _context: Box<InstanceContext>,
    released: bool,
}

impl<'a> DspInstance<'a> {
    /// Creates a new instance of the plugin described by the given description.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugin has no create callback, or if it failed.
    pub fn new(description: DspDescription<'a>, config: HostConfig) -> Result<Self, HostError> {
        let create = description
            .as_raw()
            .create
            .ok_or(HostError::MissingCallback("create"))?;

        let mut functions = Box::new(host_functions());
        let mut context = Box::new(InstanceContext { config });

        let state = Box::new(UnsafeCell::new(FMOD_DSP_STATE {
            instance: (&mut *context as *mut InstanceContext).cast(),
            plugindata: core::ptr::null_mut(),
            channelmask: channel_mask_for(config.mixer_speaker_mode.channel_count().unwrap_or(0))
                .bits(),
            source_speakermode: config.mixer_speaker_mode.to_raw(),
            sidechaindata: core::ptr::null_mut(),
            sidechainchannels: 0,
            functions: &mut *functions,
            systemobject: 0,
        }));

        // SAFETY: the state and everything it points to are valid and owned by this instance
        HostError::check(unsafe { create(state.get()) })?;

        Ok(Self {
            core: InstanceCore {
                description: description.as_raw(),
                state,
                _functions: functions,
                _context: context,
                released: false,
            },
            _library: PhantomData,
        })
    }

    #[inline]
    pub fn description(&self) -> DspDescription<'a> {
        // SAFETY: the description outlives 'a, as guaranteed by new()'s argument
        unsafe { DspDescription::from_raw(&*self.core.description) }
    }

    /// Returns the raw DSP state of this instance.
    #[inline]
    pub fn as_raw(&self) -> *mut FMOD_DSP_STATE {
        self.core.state.get()
    }

    /// Returns `true` if the plugin has attached its data to this instance's state.
    #[inline]
    pub fn has_plugin_data(&self) -> bool {
        // SAFETY: the plugin only writes to the state in create and release, which both take
        // exclusive access to this instance.
        unsafe { !(*self.core.state.get()).plugindata.is_null() }
    }

    /// Returns a handle to this instance's parameters.
    #[inline]
    pub fn params(&self) -> InstanceParams<'_> {
        InstanceParams { core: &self.core }
    }

    /// Returns an exclusive handle to this instance's audio operations.
    #[inline]
    pub fn audio(&mut self) -> InstanceAudio<'_> {
        InstanceAudio { core: &self.core }
    }

    /// Returns both handles at once, so that parameters can be changed from another thread while
    /// audio is being processed.
    #[inline]
    pub fn split(&mut self) -> (InstanceParams<'_>, InstanceAudio<'_>) {
        (InstanceParams { core: &self.core }, InstanceAudio { core: &self.core })
    }

    /// Releases this instance, returning the result of the plugin's release callback.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugin's release callback failed.
    pub fn release(mut self) -> Result<(), HostError> {
        self.core.release()
    }
}

impl Drop for DspInstance<'_> {
    fn drop(&mut self) {
        let _ = self.core.release();
    }
}

impl InstanceCore {
    #[inline]
    fn raw_description(&self) -> &FMOD_DSP_DESCRIPTION {
        // SAFETY: the description outlives the instance
        unsafe { &*self.description }
    }

    fn release(&mut self) -> Result<(), HostError> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let release = self
            .raw_description()
            .release
            .ok_or(HostError::MissingCallback("release"))?;

        // SAFETY: the instance was successfully created, and was not released yet
        HostError::check(unsafe { release(self.state.get()) })
    }
}

// SAFETY: plugins are required to accept calls from any thread, as long as audio operations are
// never called concurrently. InstanceAudio is only ever obtained through an exclusive borrow.
unsafe impl Send for InstanceCore {}
// SAFETY: same as above.
unsafe impl Sync for InstanceCore {}

/// A handle to a plugin instance's parameters, which can be freely shared between threads.
#[derive(Copy, Clone)]
pub struct InstanceParams<'i> {
    core: &'i InstanceCore,
}

impl InstanceParams<'_> {
    pub fn set_float(&self, index: i32, value: f32) -> Result<(), HostError> {
        let set = self
            .core
            .raw_description()
            .setparameterfloat
            .ok_or(HostError::MissingCallback("setparameterfloat"))?;

        // SAFETY: the state is valid for the lifetime of the instance
        HostError::check(unsafe { set(self.core.state.get(), index, value) })
    }

    pub fn get_float(&self, index: i32) -> Result<f32, HostError> {
        self.get_float_raw(index, core::ptr::null_mut())
    }

    /// Returns the current value of a float parameter, along with its display text.
    pub fn get_float_text(&self, index: i32) -> Result<(f32, String), HostError> {
        let mut text = [0; FMOD_DSP_GETPARAM_VALUESTR_LENGTH];
        let value = self.get_float_raw(index, text.as_mut_ptr())?;
        Ok((value, value_string(&text)))
    }

    fn get_float_raw(&self, index: i32, valuestr: *mut c_char) -> Result<f32, HostError> {
        let get = self
            .core
            .raw_description()
            .getparameterfloat
            .ok_or(HostError::MissingCallback("getparameterfloat"))?;

        let mut value = 0.0;
        // SAFETY: the state is valid, and value and valuestr are valid locations to write to
        HostError::check(unsafe { get(self.core.state.get(), index, &mut value, valuestr) })?;
        Ok(value)
    }

    pub fn set_int(&self, index: i32, value: i32) -> Result<(), HostError> {
        let set = self
            .core
            .raw_description()
            .setparameterint
            .ok_or(HostError::MissingCallback("setparameterint"))?;

        // SAFETY: the state is valid for the lifetime of the instance
        HostError::check(unsafe { set(self.core.state.get(), index, value) })
    }

    /// Returns the current value of an int parameter, along with its display text.
    pub fn get_int(&self, index: i32) -> Result<(i32, String), HostError> {
        let get = self
            .core
            .raw_description()
            .getparameterint
            .ok_or(HostError::MissingCallback("getparameterint"))?;

        let mut value: c_int = 0;
        let mut text = [0; FMOD_DSP_GETPARAM_VALUESTR_LENGTH];
        // SAFETY: the state is valid, and value and text are valid locations to write to
        HostError::check(unsafe {
            get(self.core.state.get(), index, &mut value, text.as_mut_ptr())
        })?;

        Ok((value, value_string(&text)))
    }

    pub fn set_bool(&self, index: i32, value: bool) -> Result<(), HostError> {
        let set = self
            .core
            .raw_description()
            .setparameterbool
            .ok_or(HostError::MissingCallback("setparameterbool"))?;

        let value = if value { FMOD_TRUE } else { FMOD_FALSE };
        // SAFETY: the state is valid for the lifetime of the instance
        HostError::check(unsafe { set(self.core.state.get(), index, value) })
    }

    /// Returns the current value of a bool parameter, along with its display text.
    pub fn get_bool(&self, index: i32) -> Result<(bool, String), HostError> {
        let get = self
            .core
            .raw_description()
            .getparameterbool
            .ok_or(HostError::MissingCallback("getparameterbool"))?;

        let mut value = FMOD_FALSE;
        let mut text = [0; FMOD_DSP_GETPARAM_VALUESTR_LENGTH];
        // SAFETY: the state is valid, and value and text are valid locations to write to
        HostError::check(unsafe {
            get(self.core.state.get(), index, &mut value, text.as_mut_ptr())
        })?;

        Ok((value != FMOD_FALSE, value_string(&text)))
    }

    pub fn set_data(&self, index: i32, data: &[u8]) -> Result<(), HostError> {
        let set = self
            .core
            .raw_description()
            .setparameterdata
            .ok_or(HostError::MissingCallback("setparameterdata"))?;

        let length = c_uint::try_from(data.len()).map_err(|_| HostError::Overflow)?;
        let data = data.as_ptr().cast_mut().cast::<c_void>();

        // SAFETY: the state is valid, and data is valid for length bytes
        HostError::check(unsafe { set(self.core.state.get(), index, data, length) })
    }

    /// Returns a copy of the current value of a data parameter.
    pub fn get_data(&self, index: i32) -> Result<Vec<u8>, HostError> {
        let get = self
            .core
            .raw_description()
            .getparameterdata
            .ok_or(HostError::MissingCallback("getparameterdata"))?;

        let mut data: *mut c_void = core::ptr::null_mut();
        let mut length: c_uint = 0;
        // SAFETY: the state is valid, and data and length are valid locations to write to
        HostError::check(unsafe {
            get(self.core.state.get(), index, &mut data, &mut length, core::ptr::null_mut())
        })?;

        let length = usize::try_from(length).map_err(|_| HostError::Overflow)?;
        if data.is_null() || length == 0 {
            return Ok(Vec::new());
        }

        // SAFETY: the plugin guarantees data is valid for length bytes until the next set_data
        Ok(unsafe { core::slice::from_raw_parts(data.cast::<u8>(), length) }.to_vec())
    }
}

/// An exclusive handle to a plugin instance's audio operations.
pub struct InstanceAudio<'i> {
    core: &'i InstanceCore,
}

impl InstanceAudio<'_> {
    pub fn reset(&mut self) -> Result<(), HostError> {
        let reset = self
            .core
            .raw_description()
            .reset
            .ok_or(HostError::MissingCallback("reset"))?;

        // SAFETY: the state is valid, and this handle has exclusive access to audio operations
        HostError::check(unsafe { reset(self.core.state.get()) })
    }

    /// Asks the plugin which output layout it is going to produce, given the proposed one.
    ///
    /// The buffers' contents are handed to the plugin, but must not be touched by it. Passing
    /// `None` as the inputs gives the plugin no input buffer array at all.
    pub fn query(
        &mut self,
        inputs: Option<&[InputBuffer]>,
        outputs: &mut [OutputBuffer],
    ) -> Result<OutputLayout, HostError> {
        let process = self
            .core
            .raw_description()
            .process
            .ok_or(HostError::MissingCallback("process"))?;

        let mut raw_inputs = inputs.map(RawBufferArray::from_inputs);
        let mut raw_outputs = RawBufferArray::from_outputs(outputs);

        let inputs_ptr = raw_inputs
            .as_mut()
            .map_or(core::ptr::null(), |i| i.as_raw() as *const _);

        // SAFETY: the state is valid, this handle has exclusive access to audio operations, and
        // all buffer arrays point to live buffers.
        HostError::check(unsafe {
            process(
                self.core.state.get(),
                0,
                inputs_ptr,
                raw_outputs.as_raw(),
                FMOD_FALSE,
                FMOD_DSP_PROCESS_QUERY,
            )
        })?;

        Ok(raw_outputs.layout())
    }

    /// Processes a block of `frames_count` frames.
    ///
    /// An empty input slice gives the plugin no input buffer array at all.
    pub fn process(
        &mut self,
        frames_count: u32,
        inputs: &[InputBuffer],
        outputs: &mut [OutputBuffer],
        inputs_idle: bool,
    ) -> Result<(), HostError> {
        let process = self
            .core
            .raw_description()
            .process
            .ok_or(HostError::MissingCallback("process"))?;

        let description = self.core.raw_description();
        check_buffers(description.numinputbuffers, inputs.len())?;
        check_buffers(description.numoutputbuffers, outputs.len())?;
        for input in inputs {
            check_len(frames_count, input.channels, input.samples.len())?;
        }
        for output in outputs.iter() {
            check_len(frames_count, output.channels, output.samples.len())?;
        }

        let mut raw_inputs = (!inputs.is_empty()).then(|| RawBufferArray::from_inputs(inputs));
        let mut raw_outputs = RawBufferArray::from_outputs(outputs);

        let inputs_ptr = raw_inputs
            .as_mut()
            .map_or(core::ptr::null(), |i| i.as_raw() as *const _);

        // SAFETY: the state is valid, this handle has exclusive access to audio operations, and
        // all buffers hold at least frames_count frames.
        HostError::check(unsafe {
            process(
                self.core.state.get(),
                frames_count,
                inputs_ptr,
                raw_outputs.as_raw(),
                if inputs_idle { FMOD_TRUE } else { FMOD_FALSE },
                FMOD_DSP_PROCESS_PERFORM,
            )
        })
    }

    /// Processes a block of `frames_count` frames through the legacy read callback.
    pub fn read(
        &mut self,
        frames_count: u32,
        input: Option<InputBuffer>,
        output: &mut OutputBuffer,
    ) -> Result<(), HostError> {
        let read = self
            .core
            .raw_description()
            .read
            .ok_or(HostError::MissingCallback("read"))?;

        check_len(frames_count, output.channels, output.samples.len())?;
        if let Some(input) = input {
            check_len(frames_count, input.channels, input.samples.len())?;
        }

        let in_channels = input.map_or(output.channels, |i| i.channels);
        let in_channels = c_int::try_from(in_channels).map_err(|_| HostError::Overflow)?;
        let mut out_channels = c_int::try_from(output.channels).map_err(|_| HostError::Overflow)?;
        let in_buffer = input.map_or(core::ptr::null_mut(), |i| i.samples.as_ptr().cast_mut());

        // SAFETY: the state is valid, this handle has exclusive access to audio operations, and
        // both buffers hold at least frames_count frames.
        HostError::check(unsafe {
            read(
                self.core.state.get(),
                in_buffer,
                output.samples.as_mut_ptr(),
                frames_count,
                in_channels,
                &mut out_channels,
            )
        })
    }

    /// Asks the plugin whether the next block should be processed.
    pub fn should_process(
        &mut self,
        inputs_idle: bool,
        frames_count: u32,
    ) -> Result<bool, HostError> {
        let Some(should_process) = self.core.raw_description().shouldiprocess else {
            return Ok(true);
        };

        // SAFETY: the state is valid, and this handle has exclusive access to audio operations
        let result = unsafe {
            should_process(
                self.core.state.get(),
                if inputs_idle { FMOD_TRUE } else { FMOD_FALSE },
                frames_count,
                0,
                0,
                FMOD_SPEAKERMODE_DEFAULT,
            )
        };

        match HostError::check(result) {
            Ok(()) => Ok(true),
            Err(HostError::Plugin(ErrorCode::DontProcess)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// The storage behind an `FMOD_DSP_BUFFER_ARRAY`.
struct RawBufferArray {
    channels: Vec<c_int>,
    masks: Vec<FMOD_CHANNELMASK>,
    buffers: Vec<*mut f32>,
    speaker_mode: FMOD_SPEAKERMODE,
    raw: Option<FMOD_DSP_BUFFER_ARRAY>,
}

impl RawBufferArray {
    fn from_inputs(inputs: &[InputBuffer]) -> Self {
        Self::new(
            inputs
                .iter()
                .map(|i| (i.channels, i.samples.as_ptr().cast_mut())),
        )
    }

    fn from_outputs(outputs: &mut [OutputBuffer]) -> Self {
        Self::new(
            outputs
                .iter_mut()
                .map(|o| (o.channels, o.samples.as_mut_ptr())),
        )
    }

    fn new(buffers: impl Iterator<Item = (u32, *mut f32)>) -> Self {
        let (channels, buffers): (Vec<_>, Vec<_>) = buffers
            .map(|(channels, buffer)| (c_int::try_from(channels).unwrap_or(c_int::MAX), buffer))
            .unzip();

        let masks = channels
            .iter()
            .map(|c| channel_mask_for(u32::try_from(*c).unwrap_or(0)).bits())
            .collect();

        Self {
            channels,
            masks,
            buffers,
            speaker_mode: FMOD_SPEAKERMODE_DEFAULT,
            raw: None,
        }
    }

    fn as_raw(&mut self) -> &mut FMOD_DSP_BUFFER_ARRAY {
        self.raw.insert(FMOD_DSP_BUFFER_ARRAY {
            numbuffers: c_int::try_from(self.buffers.len()).unwrap_or(c_int::MAX),
            buffernumchannels: self.channels.as_mut_ptr(),
            bufferchannelmask: self.masks.as_mut_ptr(),
            buffers: self.buffers.as_mut_ptr(),
            speakermode: self.speaker_mode,
        })
    }

    /// Reads back the layout the plugin wrote into the array.
    fn layout(&self) -> OutputLayout {
        let speaker_mode = self
            .raw
            .as_ref()
            .map_or(self.speaker_mode, |raw| raw.speakermode);

        OutputLayout {
            channels: self
                .channels
                .iter()
                .map(|c| u32::try_from(*c).unwrap_or(0))
                .collect(),
            masks: self
                .masks
                .iter()
                .map(|m| ChannelMask::from_bits_retain(*m))
                .collect(),
            speaker_mode: SpeakerMode::from_raw(speaker_mode),
        }
    }
}

fn channel_mask_for(channels: u32) -> ChannelMask {
    match channels {
        1 => ChannelMask::MONO,
        2 => ChannelMask::STEREO,
        _ => ChannelMask::empty(),
    }
}

fn check_buffers(expected: c_int, actual: usize) -> Result<(), HostError> {
    let expected = u32::try_from(expected).unwrap_or(0);
    if usize::try_from(expected).ok() != Some(actual) {
        return Err(HostError::BufferCountMismatch { expected, actual });
    }

    Ok(())
}

fn check_len(frames_count: u32, channels: u32, actual: usize) -> Result<(), HostError> {
    let expected = usize::try_from(frames_count)
        .ok()
        .zip(usize::try_from(channels).ok())
        .and_then(|(f, c)| f.checked_mul(c))
        .ok_or(HostError::Overflow)?;

    if actual < expected {
        return Err(HostError::BufferTooSmall { expected, actual });
    }

    Ok(())
}

/// Extracts the text a plugin wrote into a value string buffer.
fn value_string(buffer: &[c_char; FMOD_DSP_GETPARAM_VALUESTR_LENGTH]) -> String {
    String::from_utf8_lossy(data_from_array_buf(buffer)).into_owned()
}

#[cfg(test)]
mod test {
    extern crate static_assertions as sa;
    use super::*;

    sa::assert_impl_all!(DspInstance<'static>: Send, Sync);
    sa::assert_impl_all!(InstanceParams<'static>: Send, Sync, Copy);
    sa::assert_not_impl_any!(InstanceAudio<'static>: Clone);

    #[test]
    fn buffer_lengths_account_for_channels() {
        assert_eq!(check_len(16, 2, 32), Ok(()));
        assert_eq!(check_len(0, 2, 0), Ok(()));
        assert_eq!(
            check_len(16, 2, 31),
            Err(HostError::BufferTooSmall {
                expected: 32,
                actual: 31
            })
        );
    }

    #[test]
    fn buffer_counts_must_match() {
        assert_eq!(check_buffers(1, 1), Ok(()));
        assert_eq!(
            check_buffers(0, 1),
            Err(HostError::BufferCountMismatch {
                expected: 0,
                actual: 1
            })
        );
    }

    #[test]
    fn proposed_layouts_are_read_back() {
        let mut samples = [0.0; 8];
        let mut outputs = [OutputBuffer {
            samples: &mut samples,
            channels: 2,
        }];

        let mut array = RawBufferArray::from_outputs(&mut outputs);
        array.as_raw().speakermode = FMOD_SPEAKERMODE_STEREO;

        let layout = array.layout();
        assert_eq!(layout.channels, [2]);
        assert_eq!(layout.masks, [ChannelMask::STEREO]);
        assert_eq!(layout.speaker_mode, Some(SpeakerMode::Stereo));
    }
}
