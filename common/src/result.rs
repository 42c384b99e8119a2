//! Status codes exchanged with the host through every DSP callback.

use crate::sys::*;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A non-successful `FMOD_RESULT`, as returned by a plugin callback or by a host function.
///
/// Only the codes relevant to DSP plugins have a dedicated variant. Any other value the host may
/// return is preserved in [`Other`](ErrorCode::Other).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// `FMOD_ERR_DSP_DONTPROCESS`: the plugin asks to be skipped for this block.
    DontProcess,
    /// `FMOD_ERR_DSP_SILENCE`: the plugin's output is silent for this block.
    Silence,
    /// `FMOD_ERR_INTERNAL`.
    Internal,
    /// `FMOD_ERR_INVALID_HANDLE`.
    InvalidHandle,
    /// `FMOD_ERR_INVALID_PARAM`.
    InvalidParam,
    /// `FMOD_ERR_MEMORY`.
    Memory,
    /// `FMOD_ERR_PLUGIN_VERSION`.
    PluginVersion,
    /// `FMOD_ERR_UNSUPPORTED`.
    Unsupported,
    /// Any other error code.
    Other(FMOD_RESULT),
}

impl ErrorCode {
    /// Converts a raw `FMOD_RESULT` into a [`Result`].
    pub const fn from_raw(raw: FMOD_RESULT) -> Result<(), ErrorCode> {
        Err(match raw {
            FMOD_OK => return Ok(()),
            FMOD_ERR_DSP_DONTPROCESS => ErrorCode::DontProcess,
            FMOD_ERR_DSP_SILENCE => ErrorCode::Silence,
            FMOD_ERR_INTERNAL => ErrorCode::Internal,
            FMOD_ERR_INVALID_HANDLE => ErrorCode::InvalidHandle,
            FMOD_ERR_INVALID_PARAM => ErrorCode::InvalidParam,
            FMOD_ERR_MEMORY => ErrorCode::Memory,
            FMOD_ERR_PLUGIN_VERSION => ErrorCode::PluginVersion,
            FMOD_ERR_UNSUPPORTED => ErrorCode::Unsupported,
            other => ErrorCode::Other(other),
        })
    }

    pub const fn to_raw(self) -> FMOD_RESULT {
        match self {
            ErrorCode::DontProcess => FMOD_ERR_DSP_DONTPROCESS,
            ErrorCode::Silence => FMOD_ERR_DSP_SILENCE,
            ErrorCode::Internal => FMOD_ERR_INTERNAL,
            ErrorCode::InvalidHandle => FMOD_ERR_INVALID_HANDLE,
            ErrorCode::InvalidParam => FMOD_ERR_INVALID_PARAM,
            ErrorCode::Memory => FMOD_ERR_MEMORY,
            ErrorCode::PluginVersion => FMOD_ERR_PLUGIN_VERSION,
            ErrorCode::Unsupported => FMOD_ERR_UNSUPPORTED,
            ErrorCode::Other(raw) => raw,
        }
    }

    /// Converts a [`Result`] back into the raw `FMOD_RESULT` a callback returns.
    #[inline]
    pub const fn result_to_raw(result: Result<(), ErrorCode>) -> FMOD_RESULT {
        match result {
            Ok(()) => FMOD_OK,
            Err(e) => e.to_raw(),
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::DontProcess => f.write_str("DSP asked not to be processed"),
            ErrorCode::Silence => f.write_str("DSP output is silent"),
            ErrorCode::Internal => f.write_str("An internal error occurred"),
            ErrorCode::InvalidHandle => f.write_str("An invalid DSP handle was used"),
            ErrorCode::InvalidParam => f.write_str("An invalid parameter was passed"),
            ErrorCode::Memory => f.write_str("Not enough memory or resources"),
            ErrorCode::PluginVersion => {
                f.write_str("A plugin was built with an unsupported SDK version")
            }
            ErrorCode::Unsupported => f.write_str("The requested operation is not supported"),
            ErrorCode::Other(raw) => write!(f, "FMOD error code {raw}"),
        }
    }
}

impl Error for ErrorCode {}
