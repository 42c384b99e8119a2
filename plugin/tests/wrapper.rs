use fmod_dsp_host::prelude::{
    DspLibrary, ErrorCode, HostConfig, HostError, InputBuffer, OutputBuffer, allocation_stats,
    reset_allocation_stats,
};
use fmod_dsp_host::sys::*;
use fmod_dsp_plugin::prelude::*;
use std::ffi::c_int;
use std::fmt::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

macro_rules! entry {
    ($name:ident, $plugin:ty) => {
        extern "system" fn $name() -> *mut FMOD_DSP_DESCRIPTION {
            static ENTRY: DspEntry<$plugin> = DspEntry::new();
            ENTRY.get_description()
        }
    };
}

entry!(gain_entry, Gain);
entry!(read_gain_entry, ReadGain);
entry!(misbehaving_entry, Misbehaving);
entry!(fails_to_create_entry, FailsToCreate);
entry!(panics_on_create_entry, PanicsOnCreate);

fn load(entry: FMOD_GET_DSP_DESCRIPTION_FUNC) -> DspLibrary {
    // SAFETY: every entry function of this file returns a static description
    unsafe { DspLibrary::from_entry_fn(entry) }.unwrap()
}

fn host_index(index: ParamIndex) -> i32 {
    i32::try_from(index).unwrap()
}

const GAIN: ParamIndex = 0;
const STEPS: ParamIndex = 1;
const BYPASS: ParamIndex = 2;
const PRESET: ParamIndex = 3;
const RATE: ParamIndex = 4;

struct Gain;

struct GainShared {
    gain: AtomicF32,
    steps: AtomicI32,
    bypass: AtomicBool,
    preset: OnceLock<Vec<u8>>,
    sample_rate: u32,
}

impl PluginShared for GainShared {
    fn new(host: HostHandle) -> Result<Self, PluginError> {
        Ok(Self {
            gain: AtomicF32::new(1.0),
            steps: AtomicI32::new(4),
            bypass: AtomicBool::new(false),
            preset: OnceLock::new(),
            sample_rate: host.sample_rate().map_err(|_| PluginError::Unsupported)?,
        })
    }
}

impl PluginParams for GainShared {
    fn set_float(&self, index: ParamIndex, value: f32) -> Result<(), PluginError> {
        match index {
            GAIN if (0.0..=2.0).contains(&value) => {
                self.gain.store(value, Ordering::Relaxed);
                Ok(())
            }
            GAIN => Err(PluginError::InvalidValue(index)),
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }

    fn get_float(&self, index: ParamIndex) -> Result<f32, PluginError> {
        match index {
            GAIN => Ok(self.gain.load(Ordering::Relaxed)),
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }

    fn set_int(&self, index: ParamIndex, value: i32) -> Result<(), PluginError> {
        match index {
            STEPS if (0..=8).contains(&value) => {
                self.steps.store(value, Ordering::Relaxed);
                Ok(())
            }
            STEPS | RATE => Err(PluginError::InvalidValue(index)),
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }

    fn get_int(&self, index: ParamIndex) -> Result<i32, PluginError> {
        match index {
            STEPS => Ok(self.steps.load(Ordering::Relaxed)),
            RATE => i32::try_from(self.sample_rate).map_err(|_| PluginError::InvalidValue(index)),
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }

    fn set_bool(&self, index: ParamIndex, value: bool) -> Result<(), PluginError> {
        match index {
            BYPASS => {
                self.bypass.store(value, Ordering::Relaxed);
                Ok(())
            }
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }

    fn get_bool(&self, index: ParamIndex) -> Result<bool, PluginError> {
        match index {
            BYPASS => Ok(self.bypass.load(Ordering::Relaxed)),
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }

    fn set_data(&self, index: ParamIndex, data: &[u8]) -> Result<(), PluginError> {
        match index {
            PRESET => self
                .preset
                .set(data.to_vec())
                .map_err(|_| PluginError::InvalidValue(index)),
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }

    fn get_data(&self, index: ParamIndex) -> Result<&[u8], PluginError> {
        match index {
            PRESET => Ok(self.preset.get().map_or(&[], Vec::as_slice)),
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }

    fn float_to_text(
        &self,
        _index: ParamIndex,
        value: f32,
        writer: &mut ParamDisplayWriter,
    ) -> std::fmt::Result {
        write!(writer, "{value:.1}x")
    }

    fn int_to_text(
        &self,
        index: ParamIndex,
        value: i32,
        writer: &mut ParamDisplayWriter,
    ) -> std::fmt::Result {
        match index {
            RATE => write!(writer, "{value} Hz"),
            _ => write!(writer, "{value} steps"),
        }
    }
}

impl Plugin for Gain {
    type Shared = GainShared;

    fn get_descriptor() -> PluginDescriptor {
        PluginDescriptor::new("Test Gain")
            .with_version(PluginVersion::new(2, 3))
            .with_buffers(1, 1)
            .with_param(ParamDescriptor::float("Gain", "x", "Linear gain", 0.0, 2.0, 1.0))
            .with_param(ParamDescriptor::int("Steps", "", "Quantization steps", 0, 8, 4))
            .with_param(ParamDescriptor::bool("Bypass", "", "Skips the gain", false))
            .with_param(ParamDescriptor::data("Preset", "", "Opaque preset data"))
            .with_param(ParamDescriptor::int("Rate", "Hz", "Mixer sample rate", 0, 192_000, 0))
    }

    fn new(_host: HostHandle, _shared: &GainShared) -> Result<Self, PluginError> {
        Ok(Self)
    }

    fn process(&mut self, shared: &GainShared, mut audio: Audio) -> Result<(), PluginError> {
        let gain = if shared.bypass.load(Ordering::Relaxed) {
            1.0
        } else {
            shared.gain.load(Ordering::Relaxed)
        };

        let input = audio.inputs.buffer(0).ok_or(PluginError::Unsupported)?;
        let output = audio.outputs.buffer_mut(0).ok_or(PluginError::Unsupported)?;

        for (out, sample) in output.iter_mut().zip(input) {
            *out = sample * gain;
        }

        Ok(())
    }

    fn should_process(&mut self, inputs_idle: bool, _frames_count: u32) -> bool {
        !inputs_idle
    }
}

/// The same processor, exposed through the legacy read callback.
struct ReadGain(Gain);

impl Plugin for ReadGain {
    type Shared = GainShared;

    fn get_descriptor() -> PluginDescriptor {
        Gain::get_descriptor().with_callback_kind(CallbackKind::Read)
    }

    fn new(host: HostHandle, shared: &GainShared) -> Result<Self, PluginError> {
        Ok(Self(Gain::new(host, shared)?))
    }

    fn process(&mut self, shared: &GainShared, audio: Audio) -> Result<(), PluginError> {
        self.0.process(shared, audio)
    }
}

struct Misbehaving;

#[derive(Default)]
struct MisbehavingShared {
    panic_in_process: AtomicBool,
}

impl PluginShared for MisbehavingShared {
    fn new(_host: HostHandle) -> Result<Self, PluginError> {
        Ok(Self::default())
    }
}

impl PluginParams for MisbehavingShared {
    fn set_float(&self, _index: ParamIndex, _value: f32) -> Result<(), PluginError> {
        panic!("set_float is broken");
    }

    fn get_float(&self, _index: ParamIndex) -> Result<f32, PluginError> {
        Ok(0.5)
    }

    fn set_bool(&self, _index: ParamIndex, value: bool) -> Result<(), PluginError> {
        self.panic_in_process.store(value, Ordering::Relaxed);
        Ok(())
    }
}

impl Plugin for Misbehaving {
    type Shared = MisbehavingShared;

    fn get_descriptor() -> PluginDescriptor {
        PluginDescriptor::new("Misbehaving")
            .with_buffers(0, 1)
            .with_param(ParamDescriptor::float("Broken", "", "", 0.0, 1.0, 0.5))
            .with_param(ParamDescriptor::bool("Panic", "", "", false))
    }

    fn new(_host: HostHandle, _shared: &MisbehavingShared) -> Result<Self, PluginError> {
        Ok(Self)
    }

    fn query(&mut self, _query: &mut ChannelQuery) -> Result<(), PluginError> {
        panic!("query is broken");
    }

    fn process(&mut self, shared: &MisbehavingShared, mut audio: Audio) -> Result<(), PluginError> {
        if let Some(output) = audio.outputs.buffer_mut(0) {
            output.fill(0.25);
        }

        if shared.panic_in_process.load(Ordering::Relaxed) {
            panic!("process is broken");
        }

        Err(PluginError::Custom("device lost".into()))
    }

    fn reset(&mut self, _shared: &MisbehavingShared) {
        panic!("reset is broken");
    }
}

struct FailsToCreate;

impl Plugin for FailsToCreate {
    type Shared = ();

    fn get_descriptor() -> PluginDescriptor {
        PluginDescriptor::new("Fails to create")
    }

    fn new(_host: HostHandle, _shared: &()) -> Result<Self, PluginError> {
        Err(PluginError::OutOfMemory)
    }

    fn process(&mut self, _shared: &(), _audio: Audio) -> Result<(), PluginError> {
        Ok(())
    }
}

struct PanicsOnCreate;

impl Plugin for PanicsOnCreate {
    type Shared = ();

    fn get_descriptor() -> PluginDescriptor {
        PluginDescriptor::new("Panics on create")
    }

    fn new(_host: HostHandle, _shared: &()) -> Result<Self, PluginError> {
        panic!("cannot create");
    }

    fn process(&mut self, _shared: &(), _audio: Audio) -> Result<(), PluginError> {
        Ok(())
    }
}

fn detached_state() -> FMOD_DSP_STATE {
    FMOD_DSP_STATE {
        instance: core::ptr::null_mut(),
        plugindata: core::ptr::null_mut(),
        channelmask: 0,
        source_speakermode: FMOD_SPEAKERMODE_DEFAULT,
        sidechaindata: core::ptr::null_mut(),
        sidechainchannels: 0,
        functions: core::ptr::null_mut(),
        systemobject: 0,
    }
}

#[test]
fn description_reflects_descriptor() {
    let library = load(gain_entry);
    let description = library.description();

    assert_eq!(description.name(), b"Test Gain");
    assert_eq!(description.version().major(), 2);
    assert_eq!(description.version().minor(), 3);
    assert_eq!(description.input_buffers(), 1);
    assert_eq!(description.output_buffers(), 1);
    assert!(description.has_process());
    assert!(!description.has_read());
    assert_eq!(description.param_count(), 5);

    let steps = description.param(STEPS).unwrap();
    assert_eq!(
        steps.range(),
        Some(ParamRange::Int {
            min: 0,
            max: 8,
            default: 4,
            goes_to_infinity: false
        })
    );

    let preset = description.param(PRESET).unwrap();
    assert_eq!(
        preset.range(),
        Some(ParamRange::Data {
            data_type: FMOD_DSP_PARAMETER_DATA_TYPE_USER
        })
    );

    let names: Vec<&[u8]> = description.params().map(|p| p.name()).collect();
    assert_eq!(
        names,
        [&b"Gain"[..], b"Steps", b"Bypass", b"Preset", b"Rate"]
    );
}

#[test]
fn processes_input_into_output() {
    let library = load(gain_entry);
    let mut instance = library.instantiate(HostConfig::default()).unwrap();
    instance.params().set_float(host_index(GAIN), 0.5).unwrap();

    let input: Vec<f32> = (0..64u16).map(f32::from).collect();
    let mut output = [0.0f32; 64];

    instance
        .audio()
        .process(
            32,
            &[InputBuffer {
                samples: &input,
                channels: 2,
            }],
            &mut [OutputBuffer {
                samples: &mut output,
                channels: 2,
            }],
            false,
        )
        .unwrap();

    for (out, sample) in output.iter().zip(&input) {
        assert_eq!(*out, sample * 0.5);
    }

    instance.params().set_bool(host_index(BYPASS), true).unwrap();
    instance
        .audio()
        .process(
            32,
            &[InputBuffer {
                samples: &input,
                channels: 2,
            }],
            &mut [OutputBuffer {
                samples: &mut output,
                channels: 2,
            }],
            false,
        )
        .unwrap();

    assert_eq!(output.as_slice(), input.as_slice());
}

#[test]
fn typed_params_report_values_and_text() {
    let library = load(gain_entry);
    let instance = library.instantiate(HostConfig::default()).unwrap();
    let params = instance.params();

    assert_eq!(
        params.get_float_text(host_index(GAIN)).unwrap(),
        (1.0, "1.0x".to_owned())
    );

    assert_eq!(params.get_int(host_index(STEPS)).unwrap(), (4, "4 steps".to_owned()));
    params.set_int(host_index(STEPS), 6).unwrap();
    assert_eq!(params.get_int(host_index(STEPS)).unwrap().0, 6);

    assert_eq!(
        params.set_int(host_index(STEPS), 9),
        Err(HostError::Plugin(ErrorCode::InvalidParam))
    );
    assert_eq!(params.get_int(host_index(STEPS)).unwrap().0, 6);

    assert_eq!(
        params.get_bool(host_index(BYPASS)).unwrap(),
        (false, "Off".to_owned())
    );
    params.set_bool(host_index(BYPASS), true).unwrap();
    assert_eq!(
        params.get_bool(host_index(BYPASS)).unwrap(),
        (true, "On".to_owned())
    );
}

#[test]
fn out_of_range_values_leave_params_untouched() {
    let library = load(gain_entry);
    let instance = library.instantiate(HostConfig::default()).unwrap();
    let params = instance.params();

    params.set_float(host_index(GAIN), 0.75).unwrap();
    assert_eq!(
        params.set_float(host_index(GAIN), 3.0),
        Err(HostError::Plugin(ErrorCode::InvalidParam))
    );
    assert_eq!(params.get_float(host_index(GAIN)).unwrap(), 0.75);
}

#[test]
fn data_params_are_copied_back() {
    let library = load(gain_entry);
    let instance = library.instantiate(HostConfig::default()).unwrap();
    let params = instance.params();

    assert_eq!(params.get_data(host_index(PRESET)).unwrap(), b"");

    params.set_data(host_index(PRESET), b"warm").unwrap();
    assert_eq!(params.get_data(host_index(PRESET)).unwrap(), b"warm");

    assert_eq!(
        params.set_data(host_index(PRESET), b"cold"),
        Err(HostError::Plugin(ErrorCode::InvalidParam))
    );
    assert_eq!(params.get_data(host_index(PRESET)).unwrap(), b"warm");
}

#[test]
fn host_queries_are_available_at_creation() {
    let library = load(gain_entry);
    let config = HostConfig {
        sample_rate: 44_100,
        ..HostConfig::default()
    };
    let instance = library.instantiate(config).unwrap();

    assert_eq!(
        instance.params().get_int(host_index(RATE)).unwrap(),
        (44_100, "44100 Hz".to_owned())
    );
    assert_eq!(
        instance.params().set_int(host_index(RATE), 48_000),
        Err(HostError::Plugin(ErrorCode::InvalidParam))
    );
}

#[test]
fn should_process_follows_idle_inputs() {
    let library = load(gain_entry);
    let mut instance = library.instantiate(HostConfig::default()).unwrap();

    assert!(!instance.audio().should_process(true, 512).unwrap());
    assert!(instance.audio().should_process(false, 512).unwrap());
}

#[test]
fn negative_indices_are_rejected() {
    let library = load(gain_entry);
    let instance = library.instantiate(HostConfig::default()).unwrap();
    let invalid = Err(HostError::Plugin(ErrorCode::InvalidParam));

    assert_eq!(instance.params().set_float(-1, 0.5), invalid);
    assert_eq!(instance.params().get_int(-2).map(|_| ()), invalid);
    assert_eq!(instance.params().get_data(-3).map(|_| ()), invalid);
}

#[test]
fn read_callback_adapts_buffers() {
    let library = load(read_gain_entry);
    assert!(library.description().has_read());
    assert!(!library.description().has_process());

    let mut instance = library.instantiate(HostConfig::default()).unwrap();
    instance.params().set_float(host_index(GAIN), 0.25).unwrap();

    let input = [1.0f32; 32];
    let mut samples = [0.0f32; 40];
    let mut output = OutputBuffer {
        samples: &mut samples,
        channels: 2,
    };

    instance
        .audio()
        .read(
            16,
            Some(InputBuffer {
                samples: &input,
                channels: 2,
            }),
            &mut output,
        )
        .unwrap();

    assert!(samples[..32].iter().all(|s| *s == 0.25));
    assert!(samples[32..].iter().all(|s| *s == 0.0));
}

#[test]
fn failing_creation_allocates_nothing() {
    let library = load(fails_to_create_entry);
    reset_allocation_stats();

    assert_eq!(
        library.instantiate(HostConfig::default()).err(),
        Some(HostError::Plugin(ErrorCode::Memory))
    );
    assert_eq!(allocation_stats().allocations, 0);
}

#[test]
fn panicking_creation_is_reported() {
    let library = load(panics_on_create_entry);
    reset_allocation_stats();

    assert_eq!(
        library.instantiate(HostConfig::default()).err(),
        Some(HostError::Plugin(ErrorCode::Internal))
    );
    assert!(allocation_stats().is_balanced());
}

#[test]
fn failed_blocks_output_silence() {
    let library = load(misbehaving_entry);
    let mut instance = library.instantiate(HostConfig::default()).unwrap();
    let mut samples = [1.0f32; 16];

    instance
        .audio()
        .process(
            16,
            &[],
            &mut [OutputBuffer {
                samples: &mut samples,
                channels: 1,
            }],
            false,
        )
        .unwrap();
    assert!(samples.iter().all(|s| *s == 0.0));

    samples.fill(1.0);
    instance.params().set_bool(1, true).unwrap();
    instance
        .audio()
        .process(
            16,
            &[],
            &mut [OutputBuffer {
                samples: &mut samples,
                channels: 1,
            }],
            false,
        )
        .unwrap();
    assert!(samples.iter().all(|s| *s == 0.0));
}

#[test]
fn panics_are_contained() {
    let library = load(misbehaving_entry);
    reset_allocation_stats();
    let mut instance = library.instantiate(HostConfig::default()).unwrap();
    let internal = HostError::Plugin(ErrorCode::Internal);

    let mut samples = [1.0f32; 4];
    let result = instance.audio().query(
        None,
        &mut [OutputBuffer {
            samples: &mut samples,
            channels: 1,
        }],
    );
    assert_eq!(result.err(), Some(internal));

    assert_eq!(instance.audio().reset(), Err(internal));
    assert_eq!(instance.params().set_float(0, 1.0), Err(internal));

    // The instance stays usable afterwards.
    assert_eq!(instance.params().get_float(0).unwrap(), 0.5);

    instance.release().unwrap();
    assert!(allocation_stats().is_balanced());
}

#[test]
fn callbacks_reject_null_state() {
    let library = load(gain_entry);
    let description = library.description().as_raw();
    let null = core::ptr::null_mut();

    // SAFETY: callbacks must accept a NULL state
    unsafe {
        assert_eq!(description.reset.unwrap()(null), FMOD_ERR_INVALID_PARAM);
        assert_eq!(description.create.unwrap()(null), FMOD_ERR_INVALID_PARAM);
        assert_eq!(
            description.setparameterfloat.unwrap()(null, 0, 0.5),
            FMOD_ERR_INVALID_PARAM
        );
    }
}

#[test]
fn callbacks_reject_uninitialized_instance() {
    let library = load(gain_entry);
    let description = library.description().as_raw();
    let mut state = detached_state();

    // SAFETY: the state is valid, and holds no plugin data
    unsafe {
        assert_eq!(description.reset.unwrap()(&mut state), FMOD_ERR_INVALID_HANDLE);
        assert_eq!(description.release.unwrap()(&mut state), FMOD_ERR_INVALID_HANDLE);
        assert_eq!(
            description.setparameterint.unwrap()(&mut state, 1, 2),
            FMOD_ERR_INVALID_HANDLE
        );
        assert_eq!(
            description.shouldiprocess.unwrap()(
                &mut state,
                FMOD_FALSE,
                64,
                0,
                0,
                FMOD_SPEAKERMODE_DEFAULT
            ),
            FMOD_OK
        );
    }
}

#[test]
fn uninitialized_process_outputs_silence() {
    let library = load(gain_entry);
    let process = library.description().as_raw().process.unwrap();
    let mut state = detached_state();

    let mut samples = [1.0f32; 8];
    let mut channels: c_int = 1;
    let mut mask: FMOD_CHANNELMASK = 0;
    let mut buffer = samples.as_mut_ptr();
    let mut outputs = FMOD_DSP_BUFFER_ARRAY {
        numbuffers: 1,
        buffernumchannels: &mut channels,
        bufferchannelmask: &mut mask,
        buffers: &mut buffer,
        speakermode: FMOD_SPEAKERMODE_MONO,
    };

    // SAFETY: the state is valid, and the output array holds a single buffer of 8 frames
    unsafe {
        assert_eq!(
            process(
                &mut state,
                8,
                core::ptr::null(),
                &mut outputs,
                FMOD_FALSE,
                FMOD_DSP_PROCESS_PERFORM
            ),
            FMOD_OK
        );
        assert!(core::slice::from_raw_parts(buffer, 8).iter().all(|s| *s == 0.0));

        core::slice::from_raw_parts_mut(buffer, 8).fill(1.0);
        assert_eq!(
            process(&mut state, 8, core::ptr::null(), &mut outputs, FMOD_FALSE, 7),
            FMOD_OK
        );
    }

    assert!(samples.iter().all(|s| *s == 0.0));
}

#[test]
fn unknown_operations_output_silence() {
    let library = load(gain_entry);
    let process = library.description().as_raw().process.unwrap();
    let instance = library.instantiate(HostConfig::default()).unwrap();

    let mut samples = [1.0f32; 8];
    let mut channels: c_int = 1;
    let mut mask: FMOD_CHANNELMASK = 0;
    let mut buffer = samples.as_mut_ptr();
    let mut outputs = FMOD_DSP_BUFFER_ARRAY {
        numbuffers: 1,
        buffernumchannels: &mut channels,
        bufferchannelmask: &mut mask,
        buffers: &mut buffer,
        speakermode: FMOD_SPEAKERMODE_MONO,
    };

    // SAFETY: the state belongs to a live instance, and the output array holds a single buffer
    // of 8 frames
    let result = unsafe {
        process(instance.as_raw(), 8, core::ptr::null(), &mut outputs, FMOD_FALSE, 2)
    };

    assert_eq!(result, FMOD_OK);
    assert!(samples.iter().all(|s| *s == 0.0));
    instance.release().unwrap();
}

#[test]
fn query_without_outputs_reports_nothing() {
    let library = load(gain_entry);
    let process = library.description().as_raw().process.unwrap();
    let instance = library.instantiate(HostConfig::default()).unwrap();

    // SAFETY: the state belongs to a live instance, and NULL buffer arrays are allowed
    let result = unsafe {
        process(
            instance.as_raw(),
            8,
            core::ptr::null(),
            core::ptr::null_mut(),
            FMOD_FALSE,
            FMOD_DSP_PROCESS_QUERY,
        )
    };

    assert_eq!(result, FMOD_OK);
    instance.release().unwrap();
}

/// A fixed-arity stand-in for the host's variadic logger, which reads the single argument the
/// `"%s"` format consumes. Only sound where variadic and fixed-arity calls share registers.
#[cfg(all(target_arch = "x86_64", not(miri)))]
mod host_log {
    use super::*;
    use std::ffi::{CStr, c_char};
    use std::sync::Mutex;

    pub struct LoggedMessage {
        pub level: FMOD_DEBUG_FLAGS,
        pub file: String,
        pub function: String,
        pub format: String,
        pub message: String,
    }

    pub static MESSAGES: Mutex<Vec<LoggedMessage>> = Mutex::new(Vec::new());

    unsafe extern "C" fn log(
        level: FMOD_DEBUG_FLAGS,
        file: *const c_char,
        _line: c_int,
        function: *const c_char,
        format: *const c_char,
        message: *const c_char,
    ) {
        // SAFETY: the plugin always passes valid, NUL-terminated strings
        let (file, function, format, message) = unsafe {
            (
                CStr::from_ptr(file),
                CStr::from_ptr(function),
                CStr::from_ptr(format),
                CStr::from_ptr(message),
            )
        };

        // Unwinding out of the logger would abort.
        let Ok(mut messages) = MESSAGES.lock() else {
            return;
        };
        messages.push(LoggedMessage {
            level,
            file: file.to_string_lossy().into_owned(),
            function: function.to_string_lossy().into_owned(),
            format: format.to_string_lossy().into_owned(),
            message: message.to_string_lossy().into_owned(),
        });
    }

    pub fn functions() -> FMOD_DSP_STATE_FUNCTIONS {
        type FixedLog = unsafe extern "C" fn(
            FMOD_DEBUG_FLAGS,
            *const c_char,
            c_int,
            *const c_char,
            *const c_char,
            *const c_char,
        );

        FMOD_DSP_STATE_FUNCTIONS {
            alloc: None,
            realloc: None,
            free: None,
            getsamplerate: None,
            getblocksize: None,
            dft: core::ptr::null_mut(),
            pan: core::ptr::null_mut(),
            getspeakermode: None,
            getclock: None,
            getlistenerattributes: None,
            // SAFETY: on x86_64, pointer and integer arguments of a variadic call are passed
            // exactly like those of a fixed-arity call.
            log: Some(unsafe { core::mem::transmute::<FixedLog, _>(log as FixedLog) }),
            getuserdata: None,
        }
    }
}

#[test]
#[cfg(all(target_arch = "x86_64", not(miri)))]
fn boundary_errors_reach_host_logger() {
    let library = load(gain_entry);
    let description = library.description().as_raw();
    let mut functions = host_log::functions();
    let mut state = detached_state();
    state.functions = &mut functions;

    // SAFETY: the state is valid, holds no plugin data, and its functions table outlives the call
    let result = unsafe { description.reset.unwrap()(&mut state) };
    assert_eq!(result, FMOD_ERR_INVALID_HANDLE);

    let messages = host_log::MESSAGES.lock().unwrap();
    assert_eq!(messages.len(), 1);

    let logged = &messages[0];
    assert_eq!(logged.level, FMOD_DEBUG_LEVEL_ERROR);
    assert_eq!(logged.function, "fmod-dsp-plugin");
    assert_eq!(logged.format, "%s");
    assert!(!logged.message.is_empty());
    assert!(
        logged.file.ends_with("instance.rs"),
        "Reported {} instead of the failing callback",
        logged.file
    );
}
