use crate::params::ParamIndex;
use fmod_dsp_common::result::ErrorCode;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug)]
pub enum PluginError {
    /// The parameter index doesn't designate a parameter of the requested type.
    InvalidParameter(ParamIndex),
    /// The given value is not acceptable for this parameter.
    InvalidValue(ParamIndex),
    OutOfMemory,
    Unsupported,
    Custom(Box<dyn Error + 'static>),
}

impl PluginError {
    /// The status code reported to the host for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PluginError::InvalidParameter(_) | PluginError::InvalidValue(_) => {
                ErrorCode::InvalidParam
            }
            PluginError::OutOfMemory => ErrorCode::Memory,
            PluginError::Unsupported => ErrorCode::Unsupported,
            PluginError::Custom(_) => ErrorCode::Internal,
        }
    }
}

impl Display for PluginError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginError::InvalidParameter(index) => {
                write!(f, "No parameter of this type exists at index {index}")
            }
            PluginError::InvalidValue(index) => {
                write!(f, "Invalid value given for parameter {index}")
            }
            PluginError::OutOfMemory => f.write_str("The host's allocator is out of memory"),
            PluginError::Unsupported => {
                f.write_str("This operation is not supported by the plugin")
            }
            PluginError::Custom(e) => std::fmt::Display::fmt(&e, f),
        }
    }
}

impl Error for PluginError {}
