use crate::sys::*;
use bitflags::bitflags;

bitflags! {
    /// The kind of memory requested from the host's allocator.
    ///
    /// Hosts use this only for bookkeeping: all memory types are allocated the same way.
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct MemoryType: u32 {
        const NORMAL = FMOD_MEMORY_NORMAL;
        const STREAM_FILE = FMOD_MEMORY_STREAM_FILE;
        const STREAM_DECODE = FMOD_MEMORY_STREAM_DECODE;
        const SAMPLEDATA = FMOD_MEMORY_SAMPLEDATA;
        const DSP_BUFFER = FMOD_MEMORY_DSP_BUFFER;
        const PLUGIN = FMOD_MEMORY_PLUGIN;
        const PERSISTENT = FMOD_MEMORY_PERSISTENT;
    }
}
