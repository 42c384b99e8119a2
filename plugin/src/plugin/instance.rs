use crate::host::HostHandle;
use crate::params::{ParamDisplayWriter, ParamIndex, PluginParams};
use crate::plugin::wrapper::{PluginWrapper, PluginWrapperError, panic};
use crate::plugin::{Plugin, PluginError, logging};
use crate::process::{Audio, ChannelQuery, InputBuffers, OutputBuffers, ProcessOperation};
use fmod_dsp_common::result::ErrorCode;
use fmod_dsp_common::sys::*;
use fmod_dsp_common::utils::slice_from_external_parts;
use std::ffi::{c_char, c_int, c_uint, c_void};
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::ptr::NonNull;

/// The set of callbacks the host calls on every instance of a plugin type `P`.
///
/// None of these ever unwind into the host.
pub(crate) struct PluginInstance<P>(PhantomData<P>);

impl<P: Plugin> PluginInstance<P> {
    pub(crate) const CREATE: FMOD_DSP_CREATE_CALLBACK = Some(Self::create);
    pub(crate) const RELEASE: FMOD_DSP_RELEASE_CALLBACK = Some(Self::release);
    pub(crate) const RESET: FMOD_DSP_RESET_CALLBACK = Some(Self::reset);
    pub(crate) const READ: FMOD_DSP_READ_CALLBACK = Some(Self::read);
    pub(crate) const PROCESS: FMOD_DSP_PROCESS_CALLBACK = Some(Self::process);
    pub(crate) const SHOULD_PROCESS: FMOD_DSP_SHOULDIPROCESS_CALLBACK =
        Some(Self::should_process);

    pub(crate) const SET_FLOAT: FMOD_DSP_SETPARAM_FLOAT_CALLBACK = Some(Self::set_float);
    pub(crate) const SET_INT: FMOD_DSP_SETPARAM_INT_CALLBACK = Some(Self::set_int);
    pub(crate) const SET_BOOL: FMOD_DSP_SETPARAM_BOOL_CALLBACK = Some(Self::set_bool);
    pub(crate) const SET_DATA: FMOD_DSP_SETPARAM_DATA_CALLBACK = Some(Self::set_data);
    pub(crate) const GET_FLOAT: FMOD_DSP_GETPARAM_FLOAT_CALLBACK = Some(Self::get_float);
    pub(crate) const GET_INT: FMOD_DSP_GETPARAM_INT_CALLBACK = Some(Self::get_int);
    pub(crate) const GET_BOOL: FMOD_DSP_GETPARAM_BOOL_CALLBACK = Some(Self::get_bool);
    pub(crate) const GET_DATA: FMOD_DSP_GETPARAM_DATA_CALLBACK = Some(Self::get_data);

    unsafe extern "system" fn create(state: *mut FMOD_DSP_STATE) -> FMOD_RESULT {
        let result = panic::catch_unwind(AssertUnwindSafe(|| Self::create_inner(state)))
            .unwrap_or(Err(PluginWrapperError::Panic));

        match result {
            Ok(()) => FMOD_OK,
            Err(e) => {
                logging::plugin_log(state, &e);
                e.code().to_raw()
            }
        }
    }

    unsafe fn create_inner(state: *mut FMOD_DSP_STATE) -> Result<(), PluginWrapperError> {
        let host = HostHandle::from_raw(state).ok_or(PluginWrapperError::NulDspState)?;
        if host.functions().is_none() {
            return Err(PluginWrapperError::NulHostFunctions);
        }

        let wrapper = PluginWrapper::<P>::new(host)?;

        let size = size_of::<PluginWrapper<P>>().max(1);
        let ptr = host
            .alloc(size)
            .ok_or(PluginWrapperError::AllocationFailed(size))?;

        let instance = ptr.cast::<PluginWrapper<P>>();
        if !instance.as_ptr().is_aligned() {
            host.free(ptr);
            return Err(PluginWrapperError::MisalignedAllocation);
        }

        // SAFETY: the allocation is large enough and properly aligned for the wrapper
        unsafe { instance.as_ptr().write(wrapper) };
        (*state).plugindata = ptr.as_ptr();

        Ok(())
    }

    unsafe extern "system" fn release(state: *mut FMOD_DSP_STATE) -> FMOD_RESULT {
        let result = panic::catch_unwind(AssertUnwindSafe(|| Self::release_inner(state)))
            .unwrap_or(Err(PluginWrapperError::Panic));

        match result {
            Ok(()) => FMOD_OK,
            Err(e) => {
                logging::plugin_log(state, &e);
                e.code().to_raw()
            }
        }
    }

    unsafe fn release_inner(state: *mut FMOD_DSP_STATE) -> Result<(), PluginWrapperError> {
        let host = HostHandle::from_raw(state).ok_or(PluginWrapperError::NulDspState)?;
        let ptr =
            NonNull::new((*state).plugindata).ok_or(PluginWrapperError::UninitializedInstance)?;

        (*state).plugindata = core::ptr::null_mut();

        // SAFETY: plugindata was set by create to a valid, initialized wrapper of this type, and
        // was just cleared so nothing else can reach it anymore.
        unsafe { ptr.cast::<PluginWrapper<P>>().as_ptr().drop_in_place() };
        host.free(ptr);

        Ok(())
    }

    unsafe extern "system" fn reset(state: *mut FMOD_DSP_STATE) -> FMOD_RESULT {
        ErrorCode::result_to_raw(PluginWrapper::<P>::handle(state, |p| {
            p.audio_processor().as_mut().reset(p.shared());
            Ok(())
        }))
    }

    unsafe extern "system" fn process(
        state: *mut FMOD_DSP_STATE,
        length: c_uint,
        inbufferarray: *const FMOD_DSP_BUFFER_ARRAY,
        outbufferarray: *mut FMOD_DSP_BUFFER_ARRAY,
        inputsidle: FMOD_BOOL,
        op: FMOD_DSP_PROCESS_OPERATION,
    ) -> FMOD_RESULT {
        match ProcessOperation::from_raw(op) {
            Some(ProcessOperation::Query) => {
                ErrorCode::result_to_raw(PluginWrapper::<P>::handle_realtime(state, |p| {
                    // Nothing to report the layout into.
                    let Some(outputs) = outbufferarray.as_mut() else {
                        return Ok(());
                    };

                    let mut query = ChannelQuery::from_raw(inbufferarray, outputs);
                    p.audio_processor().as_mut().query(&mut query)?;
                    Ok(())
                }))
            }
            Some(ProcessOperation::Perform) => {
                Self::perform(state, length, inbufferarray, outbufferarray, inputsidle);
                FMOD_OK
            }
            None => {
                // SAFETY: the buffer array comes from the host, and is either NULL or valid
                unsafe { OutputBuffers::from_raw(outbufferarray, length).fill_silence() };
                FMOD_OK
            }
        }
    }

    /// Runs the processor on a block, filling the outputs with silence if it fails.
    unsafe fn perform(
        state: *mut FMOD_DSP_STATE,
        length: c_uint,
        inbufferarray: *const FMOD_DSP_BUFFER_ARRAY,
        outbufferarray: *mut FMOD_DSP_BUFFER_ARRAY,
        inputsidle: FMOD_BOOL,
    ) {
        let result = PluginWrapper::<P>::handle_realtime(state, |p| {
            let audio = Audio::new(
                InputBuffers::from_raw(inbufferarray, length),
                OutputBuffers::from_raw(outbufferarray, length),
                inputsidle != FMOD_FALSE,
            );

            p.audio_processor().as_mut().process(p.shared(), audio)?;
            Ok(())
        });

        if result.is_err() {
            // SAFETY: the buffers the processor may have borrowed are no longer in use
            unsafe { OutputBuffers::from_raw(outbufferarray, length).fill_silence() };
        }
    }

    unsafe extern "system" fn read(
        state: *mut FMOD_DSP_STATE,
        inbuffer: *mut f32,
        outbuffer: *mut f32,
        length: c_uint,
        inchannels: c_int,
        outchannels: *mut c_int,
    ) -> FMOD_RESULT {
        let mut in_channels = inchannels;
        let mut in_mask: FMOD_CHANNELMASK = 0;
        let mut in_buffer = inbuffer;
        let inputs = FMOD_DSP_BUFFER_ARRAY {
            numbuffers: c_int::from(!inbuffer.is_null()),
            buffernumchannels: &mut in_channels,
            bufferchannelmask: &mut in_mask,
            buffers: &mut in_buffer,
            speakermode: FMOD_SPEAKERMODE_DEFAULT,
        };

        let mut out_channels = outchannels.as_ref().copied().unwrap_or(inchannels);
        let mut out_mask: FMOD_CHANNELMASK = 0;
        let mut out_buffer = outbuffer;
        let mut outputs = FMOD_DSP_BUFFER_ARRAY {
            numbuffers: c_int::from(!outbuffer.is_null()),
            buffernumchannels: &mut out_channels,
            bufferchannelmask: &mut out_mask,
            buffers: &mut out_buffer,
            speakermode: FMOD_SPEAKERMODE_DEFAULT,
        };

        Self::perform(state, length, &inputs, &mut outputs, FMOD_FALSE);
        FMOD_OK
    }

    unsafe extern "system" fn should_process(
        state: *mut FMOD_DSP_STATE,
        inputsidle: FMOD_BOOL,
        length: c_uint,
        _inmask: FMOD_CHANNELMASK,
        _inchannels: c_int,
        _speakermode: FMOD_SPEAKERMODE,
    ) -> FMOD_RESULT {
        let should_process = PluginWrapper::<P>::handle_realtime(state, |p| {
            Ok(p
                .audio_processor()
                .as_mut()
                .should_process(inputsidle != FMOD_FALSE, length))
        });

        match should_process {
            Ok(false) => FMOD_ERR_DSP_DONTPROCESS,
            // Errors are left to the process callback, which outputs silence.
            Ok(true) | Err(_) => FMOD_OK,
        }
    }

    unsafe extern "system" fn set_float(
        state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: f32,
    ) -> FMOD_RESULT {
        ErrorCode::result_to_raw(PluginWrapper::<P>::handle(state, |p| {
            p.shared().set_float(param_index(index)?, value)?;
            Ok(())
        }))
    }

    unsafe extern "system" fn set_int(
        state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: c_int,
    ) -> FMOD_RESULT {
        ErrorCode::result_to_raw(PluginWrapper::<P>::handle(state, |p| {
            p.shared().set_int(param_index(index)?, value)?;
            Ok(())
        }))
    }

    unsafe extern "system" fn set_bool(
        state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: FMOD_BOOL,
    ) -> FMOD_RESULT {
        ErrorCode::result_to_raw(PluginWrapper::<P>::handle(state, |p| {
            p.shared()
                .set_bool(param_index(index)?, value != FMOD_FALSE)?;
            Ok(())
        }))
    }

    unsafe extern "system" fn set_data(
        state: *mut FMOD_DSP_STATE,
        index: c_int,
        data: *mut c_void,
        length: c_uint,
    ) -> FMOD_RESULT {
        ErrorCode::result_to_raw(PluginWrapper::<P>::handle(state, |p| {
            let index = param_index(index)?;
            let length = usize::try_from(length).map_err(|_| PluginError::InvalidValue(index))?;
            if data.is_null() && length > 0 {
                return Err(PluginWrapperError::NulPtr("data"));
            }

            // SAFETY: the host guarantees data is valid for length bytes for this call
            let data = unsafe { slice_from_external_parts(data.cast::<u8>().cast_const(), length) };
            p.shared().set_data(index, data)?;
            Ok(())
        }))
    }

    unsafe extern "system" fn get_float(
        state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: *mut f32,
        valuestr: *mut c_char,
    ) -> FMOD_RESULT {
        ErrorCode::result_to_raw(PluginWrapper::<P>::handle(state, |p| {
            let index = param_index(index)?;
            let current = p.shared().get_float(index)?;

            if let Some(value) = value.as_mut() {
                *value = current;
            }
            write_value_str(valuestr, |w| p.shared().float_to_text(index, current, w));
            Ok(())
        }))
    }

    unsafe extern "system" fn get_int(
        state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: *mut c_int,
        valuestr: *mut c_char,
    ) -> FMOD_RESULT {
        ErrorCode::result_to_raw(PluginWrapper::<P>::handle(state, |p| {
            let index = param_index(index)?;
            let current = p.shared().get_int(index)?;

            if let Some(value) = value.as_mut() {
                *value = current;
            }
            write_value_str(valuestr, |w| p.shared().int_to_text(index, current, w));
            Ok(())
        }))
    }

    unsafe extern "system" fn get_bool(
        state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: *mut FMOD_BOOL,
        valuestr: *mut c_char,
    ) -> FMOD_RESULT {
        ErrorCode::result_to_raw(PluginWrapper::<P>::handle(state, |p| {
            let index = param_index(index)?;
            let current = p.shared().get_bool(index)?;

            if let Some(value) = value.as_mut() {
                *value = if current { FMOD_TRUE } else { FMOD_FALSE };
            }
            write_value_str(valuestr, |w| p.shared().bool_to_text(index, current, w));
            Ok(())
        }))
    }

    unsafe extern "system" fn get_data(
        state: *mut FMOD_DSP_STATE,
        index: c_int,
        data: *mut *mut c_void,
        length: *mut c_uint,
        valuestr: *mut c_char,
    ) -> FMOD_RESULT {
        ErrorCode::result_to_raw(PluginWrapper::<P>::handle(state, |p| {
            let index = param_index(index)?;
            let current = p.shared().get_data(index)?;
            let current_len =
                c_uint::try_from(current.len()).map_err(|_| PluginError::InvalidValue(index))?;

            if let Some(data) = data.as_mut() {
                *data = current.as_ptr().cast_mut().cast();
            }
            if let Some(length) = length.as_mut() {
                *length = current_len;
            }
            write_value_str(valuestr, |_| Ok(()));
            Ok(())
        }))
    }
}

#[inline]
fn param_index(index: c_int) -> Result<ParamIndex, PluginWrapperError> {
    ParamIndex::try_from(index).map_err(|_| PluginWrapperError::NegativeIndex(index))
}

/// Formats a value into the host's optional value string buffer.
///
/// # Safety
/// The buffer must either be NULL or valid for `FMOD_DSP_GETPARAM_VALUESTR_LENGTH` bytes.
unsafe fn write_value_str<F>(valuestr: *mut c_char, format: F)
where
    F: FnOnce(&mut ParamDisplayWriter) -> std::fmt::Result,
{
    if valuestr.is_null() {
        return;
    }

    // SAFETY: upheld by caller
    let buffer = unsafe {
        core::slice::from_raw_parts_mut(valuestr.cast::<u8>(), FMOD_DSP_GETPARAM_VALUESTR_LENGTH)
    };

    let mut writer = ParamDisplayWriter::new(buffer);
    // Truncated or failed formatting still leaves a terminated string.
    let _ = format(&mut writer);
    writer.finish();
}
