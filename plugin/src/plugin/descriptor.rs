use crate::params::ParamDescriptor;
use crate::plugin::Plugin;
use crate::plugin::instance::PluginInstance;
use fmod_dsp_common::sys::*;
use fmod_dsp_common::utils::{PluginVersion, data_from_array_buf, write_to_array_buf};
use std::cell::UnsafeCell;
use std::ffi::c_int;

/// Which of the two audio callbacks a plugin exposes to the host.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CallbackKind {
    /// The process callback, which works on arrays of buffers and supports format negotiation.
    #[default]
    Process,
    /// The legacy read callback, which works on a single input and output buffer.
    Read,
}

/// Provides metadata about a given plugin: its name, version, buffer layout and parameters.
///
/// Names longer than 31 bytes are truncated, as the host only reserves 32 bytes (including the
/// NUL terminator) for them.
///
/// # Example
///
/// ```
/// use fmod_dsp_plugin::prelude::*;
///
/// fn get_descriptor() -> PluginDescriptor {
///     PluginDescriptor::new("My Gain")
///         .with_version(PluginVersion::new(1, 2))
///         .with_buffers(1, 1)
///         .with_param(ParamDescriptor::float("Gain", "dB", "Output gain", -80.0, 10.0, 0.0))
/// }
/// ```
#[derive(Debug)]
pub struct PluginDescriptor {
    name: [std::ffi::c_char; FMOD_DSP_NAME_LENGTH],
    version: PluginVersion,
    input_buffers: u32,
    output_buffers: u32,
    callback_kind: CallbackKind,
    params: Vec<ParamDescriptor>,
}

impl PluginDescriptor {
    /// Creates a new descriptor with the given name, for a version `1.0` plugin using the process
    /// callback on one input buffer and one output buffer, with no parameters.
    pub fn new(name: &str) -> Self {
        let mut raw_name = [0; FMOD_DSP_NAME_LENGTH];
        write_to_array_buf(&mut raw_name, name.as_bytes());

        Self {
            name: raw_name,
            version: PluginVersion::new(1, 0),
            input_buffers: 1,
            output_buffers: 1,
            callback_kind: CallbackKind::Process,
            params: Vec::new(),
        }
    }

    #[inline]
    pub fn with_version(mut self, version: PluginVersion) -> Self {
        self.version = version;
        self
    }

    /// Sets how many input and output buffers the host hands to the plugin on each block.
    ///
    /// Sound generators typically use no input buffer.
    #[inline]
    pub fn with_buffers(mut self, inputs: u32, outputs: u32) -> Self {
        self.input_buffers = inputs;
        self.output_buffers = outputs;
        self
    }

    #[inline]
    pub fn with_callback_kind(mut self, callback_kind: CallbackKind) -> Self {
        self.callback_kind = callback_kind;
        self
    }

    /// Appends a parameter to this plugin's parameter table.
    ///
    /// Parameters are indexed in the order they are added, starting at 0.
    #[inline]
    pub fn with_param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    #[inline]
    pub fn name(&self) -> &[u8] {
        data_from_array_buf(&self.name)
    }

    #[inline]
    pub fn version(&self) -> PluginVersion {
        self.version
    }

    #[inline]
    pub fn input_buffers(&self) -> u32 {
        self.input_buffers
    }

    #[inline]
    pub fn output_buffers(&self) -> u32 {
        self.output_buffers
    }

    #[inline]
    pub fn callback_kind(&self) -> CallbackKind {
        self.callback_kind
    }

    #[inline]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }
}

/// The raw description table handed to the host, along with all the data it points to.
pub(crate) struct PluginDescription {
    raw: UnsafeCell<FMOD_DSP_DESCRIPTION>,
    _param_pointers: Box<[*mut FMOD_DSP_PARAMETER_DESC]>,
    _descriptor: PluginDescriptor,
}

impl PluginDescription {
    pub(crate) fn new<P: Plugin>(descriptor: PluginDescriptor) -> Self {
        let mut param_pointers: Box<[_]> = descriptor
            .params
            .iter()
            .map(|p| (p.as_raw() as *const FMOD_DSP_PARAMETER_DESC).cast_mut())
            .collect();

        let (read, process) = match descriptor.callback_kind {
            CallbackKind::Process => (None, PluginInstance::<P>::PROCESS),
            CallbackKind::Read => (PluginInstance::<P>::READ, None),
        };

        let raw = FMOD_DSP_DESCRIPTION {
            pluginsdkversion: FMOD_PLUGIN_SDK_VERSION,
            name: descriptor.name,
            version: descriptor.version.to_raw(),
            numinputbuffers: to_c_int(descriptor.input_buffers),
            numoutputbuffers: to_c_int(descriptor.output_buffers),
            create: PluginInstance::<P>::CREATE,
            release: PluginInstance::<P>::RELEASE,
            reset: PluginInstance::<P>::RESET,
            read,
            process,
            setposition: None,
            numparameters: to_c_int(param_pointers.len()),
            paramdesc: if param_pointers.is_empty() {
                core::ptr::null_mut()
            } else {
                param_pointers.as_mut_ptr()
            },
            setparameterfloat: PluginInstance::<P>::SET_FLOAT,
            setparameterint: PluginInstance::<P>::SET_INT,
            setparameterbool: PluginInstance::<P>::SET_BOOL,
            setparameterdata: PluginInstance::<P>::SET_DATA,
            getparameterfloat: PluginInstance::<P>::GET_FLOAT,
            getparameterint: PluginInstance::<P>::GET_INT,
            getparameterbool: PluginInstance::<P>::GET_BOOL,
            getparameterdata: PluginInstance::<P>::GET_DATA,
            shouldiprocess: PluginInstance::<P>::SHOULD_PROCESS,
            userdata: core::ptr::null_mut(),
            sys_register: None,
            sys_deregister: None,
            sys_mix: None,
        };

        Self {
            raw: UnsafeCell::new(raw),
            _param_pointers: param_pointers,
            _descriptor: descriptor,
        }
    }

    #[inline]
    pub(crate) fn as_raw_mut_ptr(&self) -> *mut FMOD_DSP_DESCRIPTION {
        self.raw.get()
    }
}

// SAFETY: all pointers in the description point into data owned by this struct, which is never
// mutated by the plugin after creation.
unsafe impl Send for PluginDescription {}
// SAFETY: same as above.
unsafe impl Sync for PluginDescription {}

#[inline]
fn to_c_int<T: TryInto<c_int>>(value: T) -> c_int {
    value.try_into().unwrap_or(c_int::MAX)
}
