use crate::sys::*;
use bitflags::bitflags;

bitflags! {
    /// Flags accompanying every message sent to the host's logger.
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct DebugFlags: u32 {
        const LEVEL_ERROR = FMOD_DEBUG_LEVEL_ERROR;
        const LEVEL_WARNING = FMOD_DEBUG_LEVEL_WARNING;
        const LEVEL_LOG = FMOD_DEBUG_LEVEL_LOG;
        const TYPE_MEMORY = FMOD_DEBUG_TYPE_MEMORY;
        const TYPE_FILE = FMOD_DEBUG_TYPE_FILE;
        const TYPE_CODEC = FMOD_DEBUG_TYPE_CODEC;
        const TYPE_TRACE = FMOD_DEBUG_TYPE_TRACE;
    }
}

/// The severity of a log message.
#[repr(u32)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum LogLevel {
    Log = FMOD_DEBUG_LEVEL_LOG,
    Warning = FMOD_DEBUG_LEVEL_WARNING,
    Error = FMOD_DEBUG_LEVEL_ERROR,
}

impl LogLevel {
    /// Extracts the most severe level present in the given raw flags, if any.
    pub fn from_raw(raw: FMOD_DEBUG_FLAGS) -> Option<Self> {
        let flags = DebugFlags::from_bits_truncate(raw);

        if flags.contains(DebugFlags::LEVEL_ERROR) {
            Some(LogLevel::Error)
        } else if flags.contains(DebugFlags::LEVEL_WARNING) {
            Some(LogLevel::Warning)
        } else if flags.contains(DebugFlags::LEVEL_LOG) {
            Some(LogLevel::Log)
        } else {
            None
        }
    }

    #[inline]
    pub fn to_raw(self) -> FMOD_DEBUG_FLAGS {
        self as _
    }

    #[inline]
    pub fn to_flags(self) -> DebugFlags {
        DebugFlags::from_bits_retain(self.to_raw())
    }

    /// A short, uppercase name for this level, suitable for prefixing log lines.
    pub fn tag_name(&self) -> &'static str {
        match self {
            LogLevel::Log => "[LOG]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Error => "[ERROR]",
        }
    }
}
