use fmod_dsp_common::result::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors that can occur while loading a plugin's description table.
#[derive(Debug)]
pub enum DescriptionLoadError {
    /// The dynamic library file could not be loaded, or does not export the
    /// `FMODGetDSPDescription` symbol.
    ///
    /// This contains the error type from the underlying
    /// [`libloading`](https://crates.io/crates/libloading) library.
    #[cfg(feature = "libloading")]
    LibraryLoadingError(libloading::Error),
    /// The plugin returned a NULL description pointer.
    NullDescription,
    /// The description was built against an incompatible plugin SDK version.
    IncompatibleSdkVersion {
        /// The plugin SDK version the description declares.
        plugin_version: u32,
    },
}

impl Error for DescriptionLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            #[cfg(feature = "libloading")]
            DescriptionLoadError::LibraryLoadingError(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for DescriptionLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "libloading")]
            DescriptionLoadError::LibraryLoadingError(e) => {
                write!(f, "Failed to load plugin library: {e}")
            }
            DescriptionLoadError::NullDescription => {
                f.write_str("Plugin returned a NULL description pointer")
            }
            DescriptionLoadError::IncompatibleSdkVersion { plugin_version } => write!(
                f,
                "Plugin uses an incompatible plugin SDK version ({plugin_version}, expected {})",
                fmod_dsp_common::sys::FMOD_PLUGIN_SDK_VERSION
            ),
        }
    }
}

/// Errors that can occur while driving a plugin instance.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum HostError {
    /// The plugin's description doesn't provide the given callback.
    MissingCallback(&'static str),
    /// The plugin returned an error code.
    Plugin(ErrorCode),
    /// A buffer given to the host is too small for the requested block.
    BufferTooSmall {
        /// The number of samples the block requires.
        expected: usize,
        /// The number of samples the buffer actually holds.
        actual: usize,
    },
    /// The number of buffers given doesn't fit the plugin's description.
    BufferCountMismatch {
        /// The number of buffers the plugin declared.
        expected: u32,
        /// The number of buffers given to the host.
        actual: usize,
    },
    /// A size or count is too large to be handed to the plugin.
    Overflow,
}

impl HostError {
    #[inline]
    pub(crate) fn check(result: fmod_dsp_common::sys::FMOD_RESULT) -> Result<(), HostError> {
        ErrorCode::from_raw(result).map_err(HostError::Plugin)
    }
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::MissingCallback(name) => {
                write!(f, "Plugin does not provide the '{name}' callback")
            }
            HostError::Plugin(code) => write!(f, "Plugin returned an error: {code}"),
            HostError::BufferTooSmall { expected, actual } => write!(
                f,
                "Buffer is too small: expected {expected} samples, got {actual}"
            ),
            HostError::BufferCountMismatch { expected, actual } => write!(
                f,
                "Plugin expects {expected} buffers, but {actual} were given"
            ),
            HostError::Overflow => f.write_str("Size is too large to be handed to the plugin"),
        }
    }
}

impl Error for HostError {}
