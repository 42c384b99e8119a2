//! The host functions table handed to every plugin instance.
//!
//! Memory requested by plugins is served from the global allocator, and tracked per thread: see
//! [`allocation_stats`]. Each allocation remembers the counters of the thread that made it, so an
//! instance created on one thread and released on another is still accounted for on the first.

use fmod_dsp_common::speaker::SpeakerMode;
use fmod_dsp_common::sys::*;
use std::alloc::Layout;
use std::cell::RefCell;
use std::ffi::{c_char, c_int, c_uint, c_void};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The mixer configuration the host reports to plugin instances.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct HostConfig {
    pub sample_rate: u32,
    pub block_size: u32,
    pub mixer_speaker_mode: SpeakerMode,
    pub output_speaker_mode: SpeakerMode,
}

impl Default for HostConfig {
    #[inline]
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            block_size: 1024,
            mixer_speaker_mode: SpeakerMode::Stereo,
            output_speaker_mode: SpeakerMode::Stereo,
        }
    }
}

/// Per-instance host data, pointed to by the `instance` field of each DSP state.
pub(crate) struct InstanceContext {
    pub(crate) config: HostConfig,
}

/// Counters of the memory plugins requested through the host's allocator.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct AllocationStats {
    /// The number of successful allocations.
    pub allocations: usize,
    /// The number of frees.
    pub frees: usize,
    /// The number of bytes currently allocated by plugins.
    pub live_bytes: usize,
}

impl AllocationStats {
    /// Returns `true` if every allocation has been matched by a free.
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.allocations == self.frees && self.live_bytes == 0
    }
}

#[derive(Default)]
struct AllocationCounters {
    allocations: AtomicUsize,
    frees: AtomicUsize,
    live_bytes: AtomicUsize,
}

impl AllocationCounters {
    fn snapshot(&self) -> AllocationStats {
        AllocationStats {
            allocations: self.allocations.load(Ordering::Acquire),
            frees: self.frees.load(Ordering::Acquire),
            live_bytes: self.live_bytes.load(Ordering::Acquire),
        }
    }
}

thread_local! {
    static ALLOCATION_COUNTERS: RefCell<Arc<AllocationCounters>> =
        RefCell::new(Arc::default());
}

/// Returns the allocation counters of the current thread.
///
/// These count every allocation made on this thread, and every free of those allocations, no
/// matter which thread performed it.
#[inline]
pub fn allocation_stats() -> AllocationStats {
    ALLOCATION_COUNTERS.with(|c| c.borrow().snapshot())
}

/// Resets the allocation counters of the current thread.
///
/// Allocations made before the reset are still credited to the previous counters when freed.
#[inline]
pub fn reset_allocation_stats() {
    ALLOCATION_COUNTERS.with(|c| *c.borrow_mut() = Arc::default());
}

/// Each allocation is prefixed by a header storing its total size, followed by a pointer to the
/// counters it was accounted on.
const HEADER_SIZE: usize = 16;
const ALLOCATION_ALIGN: usize = 16;
const COUNTERS_OFFSET: usize = size_of::<usize>();

const _: () = assert!(
    HEADER_SIZE >= COUNTERS_OFFSET + size_of::<*const AllocationCounters>()
        && HEADER_SIZE % ALLOCATION_ALIGN == 0
);

pub(crate) fn host_functions() -> FMOD_DSP_STATE_FUNCTIONS {
    FMOD_DSP_STATE_FUNCTIONS {
        alloc: Some(alloc),
        realloc: None,
        free: Some(free),
        getsamplerate: Some(get_sample_rate),
        getblocksize: Some(get_block_size),
        dft: core::ptr::null_mut(),
        pan: core::ptr::null_mut(),
        getspeakermode: Some(get_speaker_mode),
        getclock: None,
        getlistenerattributes: None,
        // The log function is variadic, and can't be defined in stable Rust.
        log: None,
        getuserdata: None,
    }
}

unsafe extern "system" fn alloc(
    size: c_uint,
    _memory_type: FMOD_MEMORY_TYPE,
    _source: *const c_char,
) -> *mut c_void {
    let Some(total) = usize::try_from(size)
        .ok()
        .and_then(|s| s.checked_add(HEADER_SIZE))
    else {
        return core::ptr::null_mut();
    };

    let Ok(layout) = Layout::from_size_align(total, ALLOCATION_ALIGN) else {
        return core::ptr::null_mut();
    };

    // The thread is being torn down.
    let Ok(counters) = ALLOCATION_COUNTERS.try_with(|c| Arc::clone(&c.borrow())) else {
        return core::ptr::null_mut();
    };

    // SAFETY: the layout always has a non-zero size
    let base = unsafe { std::alloc::alloc(layout) };
    if base.is_null() {
        return core::ptr::null_mut();
    }

    counters.allocations.fetch_add(1, Ordering::AcqRel);
    counters.live_bytes.fetch_add(total - HEADER_SIZE, Ordering::AcqRel);

    // SAFETY: the allocation is at least HEADER_SIZE bytes, which can hold the whole header
    unsafe {
        base.cast::<usize>().write_unaligned(total);
        base.add(COUNTERS_OFFSET)
            .cast::<*const AllocationCounters>()
            .write_unaligned(Arc::into_raw(counters));
    }

    // SAFETY: the allocation is larger than HEADER_SIZE
    unsafe { base.add(HEADER_SIZE).cast() }
}

unsafe extern "system" fn free(
    ptr: *mut c_void,
    _memory_type: FMOD_MEMORY_TYPE,
    _source: *const c_char,
) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: the pointer was returned by alloc, which placed it right after the header
    let base = unsafe { ptr.cast::<u8>().sub(HEADER_SIZE) };

    // SAFETY: the header was written by alloc, and its counters pointer came from Arc::into_raw
    let (total, counters) = unsafe {
        (
            base.cast::<usize>().read_unaligned(),
            Arc::from_raw(
                base.add(COUNTERS_OFFSET)
                    .cast::<*const AllocationCounters>()
                    .read_unaligned(),
            ),
        )
    };

    counters.frees.fetch_add(1, Ordering::AcqRel);
    counters.live_bytes.fetch_sub(total - HEADER_SIZE, Ordering::AcqRel);

    // SAFETY: this is the same layout alloc used
    unsafe {
        std::alloc::dealloc(
            base,
            Layout::from_size_align_unchecked(total, ALLOCATION_ALIGN),
        )
    };
}

/// # Safety
/// The state must either be NULL or valid, and its `instance` field must either be NULL or point
/// to a valid [`InstanceContext`].
unsafe fn context<'a>(state: *mut FMOD_DSP_STATE) -> Option<&'a InstanceContext> {
    state
        .as_ref()?
        .instance
        .cast::<InstanceContext>()
        .cast_const()
        .as_ref()
}

unsafe extern "system" fn get_sample_rate(
    state: *mut FMOD_DSP_STATE,
    rate: *mut c_int,
) -> FMOD_RESULT {
    let (Some(context), Some(rate)) = (context(state), rate.as_mut()) else {
        return FMOD_ERR_INVALID_PARAM;
    };

    let Ok(sample_rate) = c_int::try_from(context.config.sample_rate) else {
        return FMOD_ERR_INTERNAL;
    };

    *rate = sample_rate;
    FMOD_OK
}

unsafe extern "system" fn get_block_size(
    state: *mut FMOD_DSP_STATE,
    blocksize: *mut c_uint,
) -> FMOD_RESULT {
    let (Some(context), Some(blocksize)) = (context(state), blocksize.as_mut()) else {
        return FMOD_ERR_INVALID_PARAM;
    };

    *blocksize = context.config.block_size;
    FMOD_OK
}

unsafe extern "system" fn get_speaker_mode(
    state: *mut FMOD_DSP_STATE,
    speakermode_mixer: *mut FMOD_SPEAKERMODE,
    speakermode_output: *mut FMOD_SPEAKERMODE,
) -> FMOD_RESULT {
    let Some(context) = context(state) else {
        return FMOD_ERR_INVALID_PARAM;
    };

    if let Some(mixer) = speakermode_mixer.as_mut() {
        *mixer = context.config.mixer_speaker_mode.to_raw();
    }
    if let Some(output) = speakermode_output.as_mut() {
        *output = context.config.output_speaker_mode.to_raw();
    }

    FMOD_OK
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn allocations_are_tracked_and_aligned() {
        reset_allocation_stats();
        let functions = host_functions();
        let (alloc, free) = (functions.alloc.unwrap(), functions.free.unwrap());

        // SAFETY: the source string is allowed to be NULL
        let ptr = unsafe { alloc(24, FMOD_MEMORY_NORMAL, core::ptr::null()) };
        assert!(!ptr.is_null());
        assert_eq!(ptr.addr() % ALLOCATION_ALIGN, 0);

        let stats = allocation_stats();
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.live_bytes, 24);
        assert!(!stats.is_balanced());

        // SAFETY: the pointer was returned by alloc
        unsafe { free(ptr, FMOD_MEMORY_NORMAL, core::ptr::null()) };
        assert!(allocation_stats().is_balanced());
    }

    struct SendPtr(*mut c_void);

    // SAFETY: the pointer is only used to free the allocation once
    unsafe impl Send for SendPtr {}

    #[test]
    fn frees_are_credited_to_the_allocating_thread() {
        reset_allocation_stats();
        let functions = host_functions();
        let (alloc, free) = (functions.alloc.unwrap(), functions.free.unwrap());

        // SAFETY: the source string is allowed to be NULL
        let ptr = SendPtr(unsafe { alloc(40, FMOD_MEMORY_NORMAL, core::ptr::null()) });
        assert!(!ptr.0.is_null());

        std::thread::spawn(move || {
            // Moves the whole wrapper rather than its raw pointer field.
            let ptr = ptr;
            // SAFETY: the pointer was returned by alloc, and is freed exactly once
            unsafe { free(ptr.0, FMOD_MEMORY_NORMAL, core::ptr::null()) };
            assert_eq!(allocation_stats(), AllocationStats::default());
        })
        .join()
        .unwrap();

        let stats = allocation_stats();
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.frees, 1);
        assert!(stats.is_balanced());
    }

    #[test]
    fn queries_fail_without_context() {
        let functions = host_functions();
        let mut rate = 0;

        // SAFETY: a NULL state is handled by the function
        let result = unsafe { functions.getsamplerate.unwrap()(core::ptr::null_mut(), &mut rate) };
        assert_eq!(result, FMOD_ERR_INVALID_PARAM);
    }
}
