#![deny(unsafe_code)]

//! A skeleton engine sound generator.
//!
//! This plugin exposes a single "RPM" parameter, meant to drive the rotating speed of a simulated
//! engine. It declares no input and a single mono output, which it currently fills with silence.

use fmod_dsp_plugin::prelude::*;
use std::sync::atomic::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

/// The index of the RPM parameter.
pub const PARAM_RPM: ParamIndex = 0;

pub struct RpmPlugin {
    seed: u64,
    rng: fastrand::Rng,
    frames_rendered: u64,
}

impl RpmPlugin {
    /// Creates a processor whose pseudo-random source starts from the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: fastrand::Rng::with_seed(seed),
            frames_rendered: 0,
        }
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The number of frames rendered since creation or the last reset.
    #[inline]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Draws the next value of the pseudo-random source, in `[-1.0, 1.0)`.
    #[inline]
    pub fn next_noise(&mut self) -> f32 {
        self.rng.f32().mul_add(2.0, -1.0)
    }
}

impl Plugin for RpmPlugin {
    type Shared = RpmShared;

    fn get_descriptor() -> PluginDescriptor {
        let callback_kind = if cfg!(feature = "read-callback") {
            CallbackKind::Read
        } else {
            CallbackKind::Process
        };

        PluginDescriptor::new("DSP Example")
            .with_version(PluginVersion::new(1, 0))
            .with_buffers(0, 1)
            .with_callback_kind(callback_kind)
            .with_param(ParamDescriptor::float(
                "RPM",
                "RPM",
                "Rotating speed of engine a number between 0 and 1",
                0.0,
                1.0,
                0.0,
            ))
    }

    fn new(_host: HostHandle, _shared: &RpmShared) -> Result<Self, PluginError> {
        Ok(Self::with_seed(time_seed()))
    }

    fn query(&mut self, query: &mut ChannelQuery) -> Result<(), PluginError> {
        query.set_output_channels(0, 1, ChannelMask::MONO)?;
        query.set_output_speaker_mode(SpeakerMode::Mono);
        Ok(())
    }

    fn process(&mut self, _shared: &RpmShared, mut audio: Audio) -> Result<(), PluginError> {
        audio.outputs.fill_silence();
        self.frames_rendered += u64::from(audio.frames_count());
        Ok(())
    }

    fn reset(&mut self, _shared: &RpmShared) {
        self.rng.seed(self.seed);
        self.frames_rendered = 0;
    }
}

/// The RPM parameter, shared between the control and mixer threads.
#[derive(Default)]
pub struct RpmShared {
    rpm: AtomicF32,
}

impl RpmShared {
    #[inline]
    pub fn rpm(&self) -> f32 {
        self.rpm.load(Ordering::Relaxed)
    }
}

impl PluginShared for RpmShared {
    fn new(_host: HostHandle) -> Result<Self, PluginError> {
        Ok(Self::default())
    }
}

impl PluginParams for RpmShared {
    fn set_float(&self, index: ParamIndex, value: f32) -> Result<(), PluginError> {
        match index {
            PARAM_RPM => {
                self.rpm.store(value, Ordering::Relaxed);
                Ok(())
            }
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }

    fn get_float(&self, index: ParamIndex) -> Result<f32, PluginError> {
        match index {
            PARAM_RPM => Ok(self.rpm.load(Ordering::Relaxed)),
            _ => Err(PluginError::InvalidParameter(index)),
        }
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
        .unwrap_or(0)
}

fmod_export_dsp!(RpmPlugin);
