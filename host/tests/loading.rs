use fmod_dsp_host::prelude::*;
use fmod_dsp_host::sys::*;
use fmod_dsp_host::utils::write_to_array_buf;

fn rpm_library_path() -> String {
    format!(
        "{}/../target/debug/{}fmod_dsp_rpm{}",
        env!("CARGO_MANIFEST_DIR"),
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    )
}

fn bare_description(sdk_version: u32) -> FMOD_DSP_DESCRIPTION {
    let mut name = [0; FMOD_DSP_NAME_LENGTH];
    write_to_array_buf(&mut name, b"Bare");

    FMOD_DSP_DESCRIPTION {
        pluginsdkversion: sdk_version,
        name,
        version: 0x0001_0002,
        numinputbuffers: 0,
        numoutputbuffers: 1,
        create: None,
        release: None,
        reset: None,
        read: None,
        process: None,
        setposition: None,
        numparameters: 0,
        paramdesc: core::ptr::null_mut(),
        setparameterfloat: None,
        setparameterint: None,
        setparameterbool: None,
        setparameterdata: None,
        getparameterfloat: None,
        getparameterint: None,
        getparameterbool: None,
        getparameterdata: None,
        shouldiprocess: None,
        userdata: core::ptr::null_mut(),
        sys_register: None,
        sys_deregister: None,
        sys_mix: None,
    }
}

extern "system" fn null_entry() -> *mut FMOD_DSP_DESCRIPTION {
    core::ptr::null_mut()
}

extern "system" fn outdated_entry() -> *mut FMOD_DSP_DESCRIPTION {
    Box::into_raw(Box::new(bare_description(109)))
}

extern "system" fn bare_entry() -> *mut FMOD_DSP_DESCRIPTION {
    Box::into_raw(Box::new(bare_description(FMOD_PLUGIN_SDK_VERSION)))
}

#[test]
pub fn null_description_is_rejected() {
    // SAFETY: the entry function always returns NULL
    let result = unsafe { DspLibrary::from_entry_fn(null_entry) };
    assert!(matches!(result, Err(DescriptionLoadError::NullDescription)));
}

#[test]
#[cfg_attr(miri, ignore)] // The description is leaked on purpose
pub fn incompatible_sdk_version_is_rejected() {
    // SAFETY: the entry function returns a valid, leaked description
    let result = unsafe { DspLibrary::from_entry_fn(outdated_entry) };
    assert!(matches!(
        result,
        Err(DescriptionLoadError::IncompatibleSdkVersion {
            plugin_version: 109
        })
    ));
}

#[test]
#[cfg_attr(miri, ignore)] // The description is leaked on purpose
pub fn missing_callbacks_are_reported() {
    // SAFETY: the entry function returns a valid, leaked description
    let library = unsafe { DspLibrary::from_entry_fn(bare_entry) }.unwrap();
    let description = library.description();

    assert_eq!(description.name(), b"Bare");
    assert_eq!(description.version(), PluginVersion::new(1, 2));
    assert!(!description.has_process());
    assert!(!description.has_read());
    assert_eq!(description.param_count(), 0);
    assert_eq!(description.params().count(), 0);

    assert_eq!(
        library.instantiate(HostConfig::default()).err(),
        Some(HostError::MissingCallback("create"))
    );
}

#[test]
#[cfg_attr(miri, ignore)] // Miri does not support calling foreign function (dlopen)
pub fn missing_library_fails_to_load() {
    // SAFETY: this file does not exist, nothing gets loaded
    let result = unsafe { DspLibrary::load_from_path("./no-such-dsp-plugin.so") };

    let Err(error) = result else {
        panic!("Loading a missing library should fail");
    };
    assert!(matches!(error, DescriptionLoadError::LibraryLoadingError(_)));
    assert!(error.to_string().starts_with("Failed to load plugin library"));
}

#[test]
#[cfg_attr(miri, ignore)] // Miri does not support calling foreign function (dlopen)
pub fn rpm_plugin_loads_from_disk() {
    let path = rpm_library_path();
    if !std::path::Path::new(&path).exists() {
        eprintln!("Skipping: {path} was not built");
        return;
    }

    // SAFETY: we made the plugin, if it's not UB-free then this is what this test is for :)
    let library = unsafe { DspLibrary::load_from_path(&path).unwrap() };
    assert_eq!(library.description().name(), b"DSP Example");

    let mut instance = library.instantiate(HostConfig::default()).unwrap();
    instance.params().set_float(0, 0.4).unwrap();
    assert_eq!(instance.params().get_float(0).unwrap(), 0.4);

    let mut samples = [1.0; 256];
    let mut outputs = [OutputBuffer {
        samples: &mut samples,
        channels: 1,
    }];
    instance.audio().process(256, &[], &mut outputs, false).unwrap();
    assert!(samples.iter().all(|s| *s == 0.0));
}

#[test]
#[cfg_attr(miri, ignore)] // Miri does not support calling foreign function (dlopen)
pub fn rpm_plugin_loads_concurrently() {
    let path = rpm_library_path();
    if !std::path::Path::new(&path).exists() {
        eprintln!("Skipping: {path} was not built");
        return;
    }

    std::thread::scope(|s| {
        for _ in 0..50 {
            s.spawn(|| {
                // SAFETY: same as test above
                let library = unsafe { DspLibrary::load_from_path(&path).unwrap() };
                let instance = library.instantiate(HostConfig::default()).unwrap();
                assert_eq!(instance.params().get_float(0).unwrap(), 0.0);
            });
        }
    })
}
