use crate::host::HostHandle;
use crate::plugin::wrapper::PluginWrapperError;
use fmod_dsp_common::sys::FMOD_DSP_STATE;

/// The tag errors caught at the callback boundary are logged under.
const ERROR_TAG: &str = "fmod-dsp-plugin";

/// # Safety
/// The state pointer must either be NULL or valid.
#[track_caller]
pub(crate) unsafe fn plugin_log(state: *mut FMOD_DSP_STATE, e: &PluginWrapperError) {
    // SAFETY: upheld by caller
    match unsafe { HostHandle::from_raw(state) } {
        Some(host) if host.has_logger() => host.log(e.level(), ERROR_TAG, &e.to_string()),
        _ => eprintln!("[FMOD_DSP_ERROR] {e}"),
    }
}
