//! Raw, C-compatible definitions of the FMOD DSP plugin ABI.
//!
//! These mirror the declarations of `fmod_common.h` and `fmod_dsp.h` from the FMOD plugin SDK.
//! Every callback uses FMOD's `F_CALL` convention, which is `stdcall` on 32-bit Windows and the
//! platform's C convention everywhere else, i.e. Rust's `"system"` ABI.

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_int, c_uint, c_ulonglong, c_void};

pub type FMOD_BOOL = c_int;
pub const FMOD_TRUE: FMOD_BOOL = 1;
pub const FMOD_FALSE: FMOD_BOOL = 0;

pub type FMOD_RESULT = c_int;
pub const FMOD_OK: FMOD_RESULT = 0;
pub const FMOD_ERR_BADCOMMAND: FMOD_RESULT = 1;
pub const FMOD_ERR_DSP_DONTPROCESS: FMOD_RESULT = 6;
pub const FMOD_ERR_DSP_FORMAT: FMOD_RESULT = 7;
pub const FMOD_ERR_DSP_SILENCE: FMOD_RESULT = 11;
pub const FMOD_ERR_INTERNAL: FMOD_RESULT = 28;
pub const FMOD_ERR_INVALID_HANDLE: FMOD_RESULT = 30;
pub const FMOD_ERR_INVALID_PARAM: FMOD_RESULT = 31;
pub const FMOD_ERR_MEMORY: FMOD_RESULT = 38;
pub const FMOD_ERR_PLUGIN: FMOD_RESULT = 53;
pub const FMOD_ERR_PLUGIN_VERSION: FMOD_RESULT = 56;
pub const FMOD_ERR_UNSUPPORTED: FMOD_RESULT = 68;

/// The plugin SDK version this ABI corresponds to.
pub const FMOD_PLUGIN_SDK_VERSION: c_uint = 110;

pub const FMOD_DSP_GETPARAM_VALUESTR_LENGTH: usize = 32;
pub const FMOD_DSP_NAME_LENGTH: usize = 32;
pub const FMOD_DSP_PARAMETER_NAME_LENGTH: usize = 16;

pub type FMOD_DEBUG_FLAGS = c_uint;
pub const FMOD_DEBUG_LEVEL_NONE: FMOD_DEBUG_FLAGS = 0x0000_0000;
pub const FMOD_DEBUG_LEVEL_ERROR: FMOD_DEBUG_FLAGS = 0x0000_0001;
pub const FMOD_DEBUG_LEVEL_WARNING: FMOD_DEBUG_FLAGS = 0x0000_0002;
pub const FMOD_DEBUG_LEVEL_LOG: FMOD_DEBUG_FLAGS = 0x0000_0004;
pub const FMOD_DEBUG_TYPE_MEMORY: FMOD_DEBUG_FLAGS = 0x0000_0100;
pub const FMOD_DEBUG_TYPE_FILE: FMOD_DEBUG_FLAGS = 0x0000_0200;
pub const FMOD_DEBUG_TYPE_CODEC: FMOD_DEBUG_FLAGS = 0x0000_0400;
pub const FMOD_DEBUG_TYPE_TRACE: FMOD_DEBUG_FLAGS = 0x0000_0800;

pub type FMOD_MEMORY_TYPE = c_uint;
pub const FMOD_MEMORY_NORMAL: FMOD_MEMORY_TYPE = 0x0000_0000;
pub const FMOD_MEMORY_STREAM_FILE: FMOD_MEMORY_TYPE = 0x0000_0001;
pub const FMOD_MEMORY_STREAM_DECODE: FMOD_MEMORY_TYPE = 0x0000_0002;
pub const FMOD_MEMORY_SAMPLEDATA: FMOD_MEMORY_TYPE = 0x0000_0004;
pub const FMOD_MEMORY_DSP_BUFFER: FMOD_MEMORY_TYPE = 0x0000_0008;
pub const FMOD_MEMORY_PLUGIN: FMOD_MEMORY_TYPE = 0x0000_0010;
pub const FMOD_MEMORY_PERSISTENT: FMOD_MEMORY_TYPE = 0x0020_0000;

pub type FMOD_CHANNELMASK = c_uint;
pub const FMOD_CHANNELMASK_FRONT_LEFT: FMOD_CHANNELMASK = 0x0000_0001;
pub const FMOD_CHANNELMASK_FRONT_RIGHT: FMOD_CHANNELMASK = 0x0000_0002;
pub const FMOD_CHANNELMASK_FRONT_CENTER: FMOD_CHANNELMASK = 0x0000_0004;
pub const FMOD_CHANNELMASK_LOW_FREQUENCY: FMOD_CHANNELMASK = 0x0000_0008;
pub const FMOD_CHANNELMASK_SURROUND_LEFT: FMOD_CHANNELMASK = 0x0000_0010;
pub const FMOD_CHANNELMASK_SURROUND_RIGHT: FMOD_CHANNELMASK = 0x0000_0020;
pub const FMOD_CHANNELMASK_BACK_LEFT: FMOD_CHANNELMASK = 0x0000_0040;
pub const FMOD_CHANNELMASK_BACK_RIGHT: FMOD_CHANNELMASK = 0x0000_0080;
pub const FMOD_CHANNELMASK_BACK_CENTER: FMOD_CHANNELMASK = 0x0000_0100;

pub type FMOD_SPEAKERMODE = c_int;
pub const FMOD_SPEAKERMODE_DEFAULT: FMOD_SPEAKERMODE = 0;
pub const FMOD_SPEAKERMODE_RAW: FMOD_SPEAKERMODE = 1;
pub const FMOD_SPEAKERMODE_MONO: FMOD_SPEAKERMODE = 2;
pub const FMOD_SPEAKERMODE_STEREO: FMOD_SPEAKERMODE = 3;
pub const FMOD_SPEAKERMODE_QUAD: FMOD_SPEAKERMODE = 4;
pub const FMOD_SPEAKERMODE_SURROUND: FMOD_SPEAKERMODE = 5;
pub const FMOD_SPEAKERMODE_5POINT1: FMOD_SPEAKERMODE = 6;
pub const FMOD_SPEAKERMODE_7POINT1: FMOD_SPEAKERMODE = 7;
pub const FMOD_SPEAKERMODE_7POINT1POINT4: FMOD_SPEAKERMODE = 8;

pub type FMOD_DSP_PROCESS_OPERATION = c_int;
pub const FMOD_DSP_PROCESS_PERFORM: FMOD_DSP_PROCESS_OPERATION = 0;
pub const FMOD_DSP_PROCESS_QUERY: FMOD_DSP_PROCESS_OPERATION = 1;

pub type FMOD_DSP_PARAMETER_TYPE = c_int;
pub const FMOD_DSP_PARAMETER_TYPE_FLOAT: FMOD_DSP_PARAMETER_TYPE = 0;
pub const FMOD_DSP_PARAMETER_TYPE_INT: FMOD_DSP_PARAMETER_TYPE = 1;
pub const FMOD_DSP_PARAMETER_TYPE_BOOL: FMOD_DSP_PARAMETER_TYPE = 2;
pub const FMOD_DSP_PARAMETER_TYPE_DATA: FMOD_DSP_PARAMETER_TYPE = 3;

pub type FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE = c_int;
pub const FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE_LINEAR: FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE = 0;
pub const FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE_AUTO: FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE = 1;
pub const FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE_PIECEWISE_LINEAR:
    FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE = 2;

pub const FMOD_DSP_PARAMETER_DATA_TYPE_USER: c_int = 0;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FMOD_VECTOR {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FMOD_3D_ATTRIBUTES {
    pub position: FMOD_VECTOR,
    pub velocity: FMOD_VECTOR,
    pub forward: FMOD_VECTOR,
    pub up: FMOD_VECTOR,
}

#[repr(C)]
#[derive(Debug)]
pub struct FMOD_DSP_BUFFER_ARRAY {
    pub numbuffers: c_int,
    pub buffernumchannels: *mut c_int,
    pub bufferchannelmask: *mut FMOD_CHANNELMASK,
    pub buffers: *mut *mut f32,
    pub speakermode: FMOD_SPEAKERMODE,
}

/// Opaque table of FFT helpers provided by the host.
#[repr(C)]
pub struct FMOD_DSP_STATE_DFT_FUNCTIONS {
    _private: [u8; 0],
}

/// Opaque table of panning helpers provided by the host.
#[repr(C)]
pub struct FMOD_DSP_STATE_PAN_FUNCTIONS {
    _private: [u8; 0],
}

pub type FMOD_DSP_ALLOC_FUNC = Option<
    unsafe extern "system" fn(
        size: c_uint,
        memory_type: FMOD_MEMORY_TYPE,
        sourcestr: *const c_char,
    ) -> *mut c_void,
>;
pub type FMOD_DSP_REALLOC_FUNC = Option<
    unsafe extern "system" fn(
        ptr: *mut c_void,
        size: c_uint,
        memory_type: FMOD_MEMORY_TYPE,
        sourcestr: *const c_char,
    ) -> *mut c_void,
>;
pub type FMOD_DSP_FREE_FUNC = Option<
    unsafe extern "system" fn(
        ptr: *mut c_void,
        memory_type: FMOD_MEMORY_TYPE,
        sourcestr: *const c_char,
    ),
>;
pub type FMOD_DSP_GETSAMPLERATE_FUNC = Option<
    unsafe extern "system" fn(dsp_state: *mut FMOD_DSP_STATE, rate: *mut c_int) -> FMOD_RESULT,
>;
pub type FMOD_DSP_GETBLOCKSIZE_FUNC = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        blocksize: *mut c_uint,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_GETSPEAKERMODE_FUNC = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        speakermode_mixer: *mut FMOD_SPEAKERMODE,
        speakermode_output: *mut FMOD_SPEAKERMODE,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_GETCLOCK_FUNC = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        clock: *mut c_ulonglong,
        offset: *mut c_uint,
        length: *mut c_uint,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_GETLISTENERATTRIBUTES_FUNC = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        numlisteners: *mut c_int,
        attributes: *mut FMOD_3D_ATTRIBUTES,
    ) -> FMOD_RESULT,
>;
/// The host's logging function. It is variadic, and always uses the C calling convention.
pub type FMOD_DSP_LOG_FUNC = Option<
    unsafe extern "C" fn(
        level: FMOD_DEBUG_FLAGS,
        file: *const c_char,
        line: c_int,
        function: *const c_char,
        string: *const c_char,
        ...
    ),
>;
pub type FMOD_DSP_GETUSERDATA_FUNC = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        userdata: *mut *mut c_void,
    ) -> FMOD_RESULT,
>;

#[repr(C)]
pub struct FMOD_DSP_STATE_FUNCTIONS {
    pub alloc: FMOD_DSP_ALLOC_FUNC,
    pub realloc: FMOD_DSP_REALLOC_FUNC,
    pub free: FMOD_DSP_FREE_FUNC,
    pub getsamplerate: FMOD_DSP_GETSAMPLERATE_FUNC,
    pub getblocksize: FMOD_DSP_GETBLOCKSIZE_FUNC,
    pub dft: *mut FMOD_DSP_STATE_DFT_FUNCTIONS,
    pub pan: *mut FMOD_DSP_STATE_PAN_FUNCTIONS,
    pub getspeakermode: FMOD_DSP_GETSPEAKERMODE_FUNC,
    pub getclock: FMOD_DSP_GETCLOCK_FUNC,
    pub getlistenerattributes: FMOD_DSP_GETLISTENERATTRIBUTES_FUNC,
    pub log: FMOD_DSP_LOG_FUNC,
    pub getuserdata: FMOD_DSP_GETUSERDATA_FUNC,
}

#[repr(C)]
pub struct FMOD_DSP_STATE {
    pub instance: *mut c_void,
    pub plugindata: *mut c_void,
    pub channelmask: FMOD_CHANNELMASK,
    pub source_speakermode: FMOD_SPEAKERMODE,
    pub sidechaindata: *mut f32,
    pub sidechainchannels: c_int,
    pub functions: *mut FMOD_DSP_STATE_FUNCTIONS,
    pub systemobject: c_int,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct FMOD_DSP_PARAMETER_FLOAT_MAPPING_PIECEWISE_LINEAR {
    pub numpoints: c_int,
    pub pointparamvalues: *mut f32,
    pub pointpositions: *mut f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct FMOD_DSP_PARAMETER_FLOAT_MAPPING {
    pub mapping_type: FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE,
    pub piecewiselinearmapping: FMOD_DSP_PARAMETER_FLOAT_MAPPING_PIECEWISE_LINEAR,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct FMOD_DSP_PARAMETER_DESC_FLOAT {
    pub min: f32,
    pub max: f32,
    pub defaultval: f32,
    pub mapping: FMOD_DSP_PARAMETER_FLOAT_MAPPING,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct FMOD_DSP_PARAMETER_DESC_INT {
    pub min: c_int,
    pub max: c_int,
    pub defaultval: c_int,
    pub goestoinf: FMOD_BOOL,
    pub valuenames: *const *const c_char,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct FMOD_DSP_PARAMETER_DESC_BOOL {
    pub defaultval: FMOD_BOOL,
    pub valuenames: *const *const c_char,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct FMOD_DSP_PARAMETER_DESC_DATA {
    pub datatype: c_int,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub union FMOD_DSP_PARAMETER_DESC_UNION {
    pub floatdesc: FMOD_DSP_PARAMETER_DESC_FLOAT,
    pub intdesc: FMOD_DSP_PARAMETER_DESC_INT,
    pub booldesc: FMOD_DSP_PARAMETER_DESC_BOOL,
    pub datadesc: FMOD_DSP_PARAMETER_DESC_DATA,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct FMOD_DSP_PARAMETER_DESC {
    pub param_type: FMOD_DSP_PARAMETER_TYPE,
    pub name: [c_char; FMOD_DSP_PARAMETER_NAME_LENGTH],
    pub label: [c_char; FMOD_DSP_PARAMETER_NAME_LENGTH],
    pub description: *const c_char,
    pub desc: FMOD_DSP_PARAMETER_DESC_UNION,
}

pub type FMOD_DSP_CREATE_CALLBACK =
    Option<unsafe extern "system" fn(dsp_state: *mut FMOD_DSP_STATE) -> FMOD_RESULT>;
pub type FMOD_DSP_RELEASE_CALLBACK =
    Option<unsafe extern "system" fn(dsp_state: *mut FMOD_DSP_STATE) -> FMOD_RESULT>;
pub type FMOD_DSP_RESET_CALLBACK =
    Option<unsafe extern "system" fn(dsp_state: *mut FMOD_DSP_STATE) -> FMOD_RESULT>;
pub type FMOD_DSP_READ_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        inbuffer: *mut f32,
        outbuffer: *mut f32,
        length: c_uint,
        inchannels: c_int,
        outchannels: *mut c_int,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_PROCESS_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        length: c_uint,
        inbufferarray: *const FMOD_DSP_BUFFER_ARRAY,
        outbufferarray: *mut FMOD_DSP_BUFFER_ARRAY,
        inputsidle: FMOD_BOOL,
        op: FMOD_DSP_PROCESS_OPERATION,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_SETPOSITION_CALLBACK =
    Option<unsafe extern "system" fn(dsp_state: *mut FMOD_DSP_STATE, pos: c_uint) -> FMOD_RESULT>;
pub type FMOD_DSP_SHOULDIPROCESS_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        inputsidle: FMOD_BOOL,
        length: c_uint,
        inmask: FMOD_CHANNELMASK,
        inchannels: c_int,
        speakermode: FMOD_SPEAKERMODE,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_SETPARAM_FLOAT_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: f32,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_SETPARAM_INT_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: c_int,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_SETPARAM_BOOL_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: FMOD_BOOL,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_SETPARAM_DATA_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        index: c_int,
        data: *mut c_void,
        length: c_uint,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_GETPARAM_FLOAT_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: *mut f32,
        valuestr: *mut c_char,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_GETPARAM_INT_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: *mut c_int,
        valuestr: *mut c_char,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_GETPARAM_BOOL_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        index: c_int,
        value: *mut FMOD_BOOL,
        valuestr: *mut c_char,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_GETPARAM_DATA_CALLBACK = Option<
    unsafe extern "system" fn(
        dsp_state: *mut FMOD_DSP_STATE,
        index: c_int,
        data: *mut *mut c_void,
        length: *mut c_uint,
        valuestr: *mut c_char,
    ) -> FMOD_RESULT,
>;
pub type FMOD_DSP_SYSTEM_REGISTER_CALLBACK =
    Option<unsafe extern "system" fn(dsp_state: *mut FMOD_DSP_STATE) -> FMOD_RESULT>;
pub type FMOD_DSP_SYSTEM_DEREGISTER_CALLBACK =
    Option<unsafe extern "system" fn(dsp_state: *mut FMOD_DSP_STATE) -> FMOD_RESULT>;
pub type FMOD_DSP_SYSTEM_MIX_CALLBACK =
    Option<unsafe extern "system" fn(dsp_state: *mut FMOD_DSP_STATE, stage: c_int) -> FMOD_RESULT>;

#[repr(C)]
pub struct FMOD_DSP_DESCRIPTION {
    pub pluginsdkversion: c_uint,
    pub name: [c_char; FMOD_DSP_NAME_LENGTH],
    pub version: c_uint,
    pub numinputbuffers: c_int,
    pub numoutputbuffers: c_int,
    pub create: FMOD_DSP_CREATE_CALLBACK,
    pub release: FMOD_DSP_RELEASE_CALLBACK,
    pub reset: FMOD_DSP_RESET_CALLBACK,
    pub read: FMOD_DSP_READ_CALLBACK,
    pub process: FMOD_DSP_PROCESS_CALLBACK,
    pub setposition: FMOD_DSP_SETPOSITION_CALLBACK,
    pub numparameters: c_int,
    pub paramdesc: *mut *mut FMOD_DSP_PARAMETER_DESC,
    pub setparameterfloat: FMOD_DSP_SETPARAM_FLOAT_CALLBACK,
    pub setparameterint: FMOD_DSP_SETPARAM_INT_CALLBACK,
    pub setparameterbool: FMOD_DSP_SETPARAM_BOOL_CALLBACK,
    pub setparameterdata: FMOD_DSP_SETPARAM_DATA_CALLBACK,
    pub getparameterfloat: FMOD_DSP_GETPARAM_FLOAT_CALLBACK,
    pub getparameterint: FMOD_DSP_GETPARAM_INT_CALLBACK,
    pub getparameterbool: FMOD_DSP_GETPARAM_BOOL_CALLBACK,
    pub getparameterdata: FMOD_DSP_GETPARAM_DATA_CALLBACK,
    pub shouldiprocess: FMOD_DSP_SHOULDIPROCESS_CALLBACK,
    pub userdata: *mut c_void,
    pub sys_register: FMOD_DSP_SYSTEM_REGISTER_CALLBACK,
    pub sys_deregister: FMOD_DSP_SYSTEM_DEREGISTER_CALLBACK,
    pub sys_mix: FMOD_DSP_SYSTEM_MIX_CALLBACK,
}

/// The signature of the `FMODGetDSPDescription` symbol every DSP plugin library exports.
pub type FMOD_GET_DSP_DESCRIPTION_FUNC =
    unsafe extern "system" fn() -> *mut FMOD_DSP_DESCRIPTION;

/// The name of the symbol every DSP plugin library exports.
pub const FMOD_GET_DSP_DESCRIPTION_SYMBOL: &std::ffi::CStr = c"FMODGetDSPDescription";

#[cfg(test)]
mod test {
    extern crate static_assertions as sa;
    use super::*;

    #[cfg(target_pointer_width = "64")]
    mod layout {
        use super::sa;
        use super::*;

        sa::assert_eq_size!(FMOD_DSP_BUFFER_ARRAY, [u8; 40]);
        sa::assert_eq_size!(FMOD_DSP_STATE, [u8; 56]);
        sa::assert_eq_size!(FMOD_DSP_STATE_FUNCTIONS, [u8; 96]);
        sa::assert_eq_size!(FMOD_DSP_PARAMETER_DESC, [u8; 96]);
        sa::assert_eq_size!(FMOD_DSP_DESCRIPTION, [u8; 216]);
    }

    sa::assert_eq_size!(FMOD_DSP_CREATE_CALLBACK, *const ());
    sa::assert_eq_size!(FMOD_DSP_LOG_FUNC, *const ());
}
