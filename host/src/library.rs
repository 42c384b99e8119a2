//! Loading of DSP plugin description tables.
//!
//! A plugin library exposes a single `FMODGetDSPDescription` function, which returns a pointer to
//! the plugin's static description table. The table is then used to create instances of the
//! plugin.
//!
//! A [`DspLibrary`] can be obtained in two ways:
//!
//! * From a dynamic library file, using [`DspLibrary::load_from_path`]. This uses
//!   [`libloading`](https://crates.io/crates/libloading) under the hood, and is only available if
//!   the `libloading` Cargo feature of this crate is enabled.
//! * From the entry function directly, using [`DspLibrary::from_entry_fn`]. This allows to load
//!   plugins that are statically linked into the host's binary, which is most useful for testing.

use crate::description::DspDescription;
use crate::error::DescriptionLoadError;
use crate::functions::HostConfig;
use crate::instance::DspInstance;
use crate::HostError;
use fmod_dsp_common::sys::*;
use std::ptr::NonNull;

#[cfg(feature = "libloading")]
use libloading::Library;
#[cfg(feature = "libloading")]
use std::ffi::OsStr;

/// A loaded plugin description table, along with the library it comes from, if any.
pub struct DspLibrary {
    #[cfg(feature = "libloading")]
    _library: Option<Library>,
    description: NonNull<FMOD_DSP_DESCRIPTION>,
}

impl DspLibrary {
    /// Loads a description by calling the given entry function.
    ///
    /// # Errors
    ///
    /// This function will return an error if the entry function returns NULL, or if the returned
    /// description uses an incompatible plugin SDK version.
    ///
    /// # Safety
    ///
    /// The entry function must return a pointer to a valid description table, which must stay
    /// valid for as long as the program runs.
    pub unsafe fn from_entry_fn(
        entry: FMOD_GET_DSP_DESCRIPTION_FUNC,
    ) -> Result<Self, DescriptionLoadError> {
        Ok(Self {
            #[cfg(feature = "libloading")]
            _library: None,
            description: Self::resolve(entry)?,
        })
    }

    /// Loads a description from a dynamic library file located at the given path.
    ///
    /// # Errors
    ///
    /// This function will return an error if the library file could not be loaded, if the
    /// `FMODGetDSPDescription` symbol could not be found in it, if it returned NULL, or if the
    /// returned description uses an incompatible plugin SDK version.
    ///
    /// # Safety
    ///
    /// This function loads an external library object file, which is inherently unsafe, as even
    /// just loading it can trigger any behavior in your application, including Undefined Behavior.
    #[cfg(feature = "libloading")]
    pub unsafe fn load_from_path(path: impl AsRef<OsStr>) -> Result<Self, DescriptionLoadError> {
        let library = Library::new(path).map_err(DescriptionLoadError::LibraryLoadingError)?;

        Self::load_from_library(library)
    }

    /// Wraps a given [`Library`] object to load a description from.
    ///
    /// # Errors
    ///
    /// Same as [`load_from_path`](Self::load_from_path), minus the loading of the library itself.
    ///
    /// # Safety
    ///
    /// The `FMODGetDSPDescription` symbol in the given library must be ABI-compatible with
    /// [`FMOD_GET_DSP_DESCRIPTION_FUNC`].
    #[cfg(feature = "libloading")]
    pub unsafe fn load_from_library(library: Library) -> Result<Self, DescriptionLoadError> {
        let symbol = FMOD_GET_DSP_DESCRIPTION_SYMBOL.to_bytes_with_nul();
        let entry = *library
            .get::<FMOD_GET_DSP_DESCRIPTION_FUNC>(symbol)
            .map_err(DescriptionLoadError::LibraryLoadingError)?;

        let description = Self::resolve(entry)?;

        Ok(Self {
            _library: Some(library),
            description,
        })
    }

    unsafe fn resolve(
        entry: FMOD_GET_DSP_DESCRIPTION_FUNC,
    ) -> Result<NonNull<FMOD_DSP_DESCRIPTION>, DescriptionLoadError> {
        let description = NonNull::new(entry()).ok_or(DescriptionLoadError::NullDescription)?;

        let plugin_version = description.as_ref().pluginsdkversion;
        if plugin_version != FMOD_PLUGIN_SDK_VERSION {
            return Err(DescriptionLoadError::IncompatibleSdkVersion { plugin_version });
        }

        Ok(description)
    }

    #[inline]
    pub fn description(&self) -> DspDescription<'_> {
        // SAFETY: the description stays valid as long as the library it comes from is loaded
        unsafe { DspDescription::from_raw(self.description.as_ref()) }
    }

    /// Creates a new instance of the plugin, using the given host configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugin has no create callback, or if it failed.
    pub fn instantiate(&self, config: HostConfig) -> Result<DspInstance<'_>, HostError> {
        DspInstance::new(self.description(), config)
    }
}

// SAFETY: the description is never mutated after it is returned by the plugin, and since we hold
// onto the Library it comes from, it will not be unloaded as long as this is alive.
unsafe impl Send for DspLibrary {}
// SAFETY: same as above.
unsafe impl Sync for DspLibrary {}
