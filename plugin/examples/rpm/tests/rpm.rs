use fmod_dsp_host::prelude::*;
use fmod_dsp_rpm::{FMODGetDSPDescription, PARAM_RPM};

/// The host-side index of the RPM parameter.
fn rpm_index() -> i32 {
    i32::try_from(PARAM_RPM).unwrap()
}

fn load() -> DspLibrary {
    // SAFETY: the entry function comes from the plugin linked into this test
    unsafe { DspLibrary::from_entry_fn(FMODGetDSPDescription) }.unwrap()
}

#[test]
fn description_matches_engine_layout() {
    let library = load();
    let description = library.description();

    assert_eq!(description.name(), b"DSP Example");
    assert_eq!(description.version().to_raw(), 0x0001_0000);
    assert_eq!(description.input_buffers(), 0);
    assert_eq!(description.output_buffers(), 1);
    assert_eq!(description.param_count(), 1);

    let rpm = description.param(PARAM_RPM).unwrap();
    assert_eq!(rpm.name(), b"RPM");
    assert_eq!(rpm.label(), b"RPM");
    assert_eq!(
        rpm.description(),
        Some(c"Rotating speed of engine a number between 0 and 1")
    );
    assert_eq!(
        rpm.range(),
        Some(ParamRange::Float {
            min: 0.0,
            max: 1.0,
            default: 0.0
        })
    );
    assert!(description.param(1).is_none());
}

#[test]
fn description_pointer_is_stable() {
    assert_eq!(FMODGetDSPDescription(), FMODGetDSPDescription());
}

#[test]
fn rpm_round_trips_exactly() {
    let library = load();
    let instance = library.instantiate(HostConfig::default()).unwrap();
    let params = instance.params();

    assert_eq!(params.get_float(rpm_index()).unwrap(), 0.0);

    for value in [0.5, 1.0, 0.123_456_79, -3.5, f32::MIN_POSITIVE, 1e30] {
        params.set_float(rpm_index(), value).unwrap();
        assert_eq!(params.get_float(rpm_index()).unwrap().to_bits(), value.to_bits());
    }
}

#[test]
fn rpm_value_string_is_formatted() {
    let library = load();
    let instance = library.instantiate(HostConfig::default()).unwrap();

    instance.params().set_float(rpm_index(), 0.5).unwrap();
    let (value, text) = instance.params().get_float_text(rpm_index()).unwrap();

    assert_eq!(value, 0.5);
    assert_eq!(text, "0.50");
}

#[test]
fn unknown_indices_are_rejected_without_mutation() {
    let library = load();
    let instance = library.instantiate(HostConfig::default()).unwrap();
    let params = instance.params();

    params.set_float(rpm_index(), 0.25).unwrap();

    for index in [-1, 1, 2, i32::MAX, i32::MIN] {
        assert_eq!(
            params.set_float(index, 0.75),
            Err(HostError::Plugin(ErrorCode::InvalidParam))
        );
        assert_eq!(
            params.get_float(index),
            Err(HostError::Plugin(ErrorCode::InvalidParam))
        );
    }

    assert_eq!(params.get_float(rpm_index()).unwrap(), 0.25);
}

#[test]
fn other_parameter_types_are_rejected() {
    let library = load();
    let instance = library.instantiate(HostConfig::default()).unwrap();
    let params = instance.params();
    let invalid = Err(HostError::Plugin(ErrorCode::InvalidParam));

    assert_eq!(params.set_int(rpm_index(), 1), invalid);
    assert_eq!(params.get_int(rpm_index()).map(|_| ()), invalid);
    assert_eq!(params.set_bool(rpm_index(), true), invalid);
    assert_eq!(params.get_bool(rpm_index()).map(|_| ()), invalid);
    assert_eq!(params.set_data(rpm_index(), b"data"), invalid);
    assert_eq!(params.get_data(rpm_index()).map(|_| ()), invalid);
}

#[test]
fn create_and_release_are_balanced() {
    let library = load();
    reset_allocation_stats();

    let instance = library.instantiate(HostConfig::default()).unwrap();
    assert!(instance.has_plugin_data());

    let stats = allocation_stats();
    assert_eq!(stats.allocations, 1);
    assert!(stats.live_bytes > 0);

    instance.release().unwrap();
    assert!(allocation_stats().is_balanced());
}

#[test]
fn dropping_an_instance_releases_it() {
    let library = load();
    reset_allocation_stats();

    for _ in 0..4 {
        let _instance = library.instantiate(HostConfig::default()).unwrap();
    }

    let stats = allocation_stats();
    assert_eq!(stats.allocations, 4);
    assert!(stats.is_balanced());
}

#[test]
fn reset_keeps_parameters() {
    let library = load();
    let mut instance = library.instantiate(HostConfig::default()).unwrap();

    instance.params().set_float(rpm_index(), 0.8).unwrap();
    instance.audio().reset().unwrap();

    assert_eq!(instance.params().get_float(rpm_index()).unwrap(), 0.8);
}

#[test]
fn should_process_defaults_to_true() {
    let library = load();
    let mut instance = library.instantiate(HostConfig::default()).unwrap();

    assert!(instance.audio().should_process(true, 256).unwrap());
    assert!(instance.audio().should_process(false, 256).unwrap());
}

#[cfg(not(feature = "read-callback"))]
mod process {
    use super::*;

    #[test]
    fn query_reports_mono_without_touching_buffers() {
        let library = load();
        let mut instance = library.instantiate(HostConfig::default()).unwrap();

        let mut samples = [7.0f32; 64];
        let mut outputs = [OutputBuffer {
            samples: &mut samples,
            channels: 2,
        }];

        let layout = instance.audio().query(None, &mut outputs).unwrap();

        assert_eq!(layout.channels, [1]);
        assert_eq!(layout.masks, [ChannelMask::MONO]);
        assert_eq!(layout.speaker_mode, Some(SpeakerMode::Mono));
        assert!(samples.iter().all(|s| *s == 7.0));
    }

    #[test]
    fn process_overwrites_exactly_the_block() {
        const FRAMES: u32 = 48;
        const LEN: usize = FRAMES as usize;
        let library = load();
        let mut instance = library.instantiate(HostConfig::default()).unwrap();

        let mut samples = [1.0f32; LEN + 16];
        let mut outputs = [OutputBuffer {
            samples: &mut samples,
            channels: 1,
        }];

        instance
            .audio()
            .process(FRAMES, &[], &mut outputs, false)
            .unwrap();

        assert!(samples[..LEN].iter().all(|s| *s == 0.0));
        assert!(samples[LEN..].iter().all(|s| *s == 1.0));
    }

    #[test]
    fn process_covers_every_interleaved_channel() {
        const FRAMES: u32 = 32;
        const LEN: usize = FRAMES as usize;
        let library = load();
        let mut instance = library.instantiate(HostConfig::default()).unwrap();

        let mut samples = [1.0f32; LEN * 2 + 1];
        let mut outputs = [OutputBuffer {
            samples: &mut samples,
            channels: 2,
        }];

        instance
            .audio()
            .process(FRAMES, &[], &mut outputs, true)
            .unwrap();

        assert!(samples[..LEN * 2].iter().all(|s| *s == 0.0));
        assert_eq!(samples[LEN * 2], 1.0);
    }

    #[test]
    fn host_rejects_short_buffers() {
        let library = load();
        let mut instance = library.instantiate(HostConfig::default()).unwrap();

        let mut samples = [1.0f32; 8];
        let mut outputs = [OutputBuffer {
            samples: &mut samples,
            channels: 1,
        }];

        assert_eq!(
            instance.audio().process(16, &[], &mut outputs, false),
            Err(HostError::BufferTooSmall {
                expected: 16,
                actual: 8
            })
        );
    }

    #[test]
    fn parameters_change_while_processing() {
        let library = load();
        let mut instance = library.instantiate(HostConfig::default()).unwrap();
        let (params, mut audio) = instance.split();

        std::thread::scope(|s| {
            s.spawn(move || {
                for i in 0..1000u16 {
                    let value = f32::from(i) / 1000.0;
                    params.set_float(rpm_index(), value).unwrap();
                    assert_eq!(params.get_float(rpm_index()).unwrap().to_bits(), value.to_bits());
                }
            });

            let mut samples = [1.0f32; 128];
            for _ in 0..1000 {
                samples.fill(1.0);
                let mut outputs = [OutputBuffer {
                    samples: &mut samples,
                    channels: 1,
                }];

                audio.process(128, &[], &mut outputs, false).unwrap();
                assert!(samples.iter().all(|s| *s == 0.0));
            }
        });

        assert_eq!(instance.params().get_float(rpm_index()).unwrap(), 0.999);
    }
}

#[cfg(feature = "read-callback")]
mod read {
    use super::*;

    #[test]
    fn read_overwrites_exactly_the_block() {
        const FRAMES: u32 = 48;
        const LEN: usize = FRAMES as usize;
        let library = load();
        assert!(library.description().has_read());
        assert!(!library.description().has_process());

        let mut instance = library.instantiate(HostConfig::default()).unwrap();

        let mut samples = [1.0f32; LEN + 16];
        let mut output = OutputBuffer {
            samples: &mut samples,
            channels: 1,
        };

        instance
            .audio()
            .read(FRAMES, None, &mut output)
            .unwrap();

        assert!(samples[..LEN].iter().all(|s| *s == 0.0));
        assert!(samples[LEN..].iter().all(|s| *s == 1.0));
    }
}
