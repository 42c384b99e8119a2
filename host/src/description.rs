use fmod_dsp_common::params::ParamInfo;
use fmod_dsp_common::sys::FMOD_DSP_DESCRIPTION;
use fmod_dsp_common::utils::{PluginVersion, data_from_array_buf};

/// A read-only view of a plugin's description table.
#[derive(Copy, Clone)]
pub struct DspDescription<'a> {
    raw: &'a FMOD_DSP_DESCRIPTION,
}

impl<'a> DspDescription<'a> {
    /// # Safety
    /// All pointers in the description must be valid for `'a`.
    #[inline]
    pub unsafe fn from_raw(raw: &'a FMOD_DSP_DESCRIPTION) -> Self {
        Self { raw }
    }

    #[inline]
    pub fn as_raw(&self) -> &'a FMOD_DSP_DESCRIPTION {
        self.raw
    }

    #[inline]
    pub fn sdk_version(&self) -> u32 {
        self.raw.pluginsdkversion
    }

    #[inline]
    pub fn name(&self) -> &'a [u8] {
        data_from_array_buf(&self.raw.name)
    }

    #[inline]
    pub fn version(&self) -> PluginVersion {
        PluginVersion::from_raw(self.raw.version)
    }

    #[inline]
    pub fn input_buffers(&self) -> u32 {
        u32::try_from(self.raw.numinputbuffers).unwrap_or(0)
    }

    #[inline]
    pub fn output_buffers(&self) -> u32 {
        u32::try_from(self.raw.numoutputbuffers).unwrap_or(0)
    }

    /// Whether the plugin implements the process callback.
    #[inline]
    pub fn has_process(&self) -> bool {
        self.raw.process.is_some()
    }

    /// Whether the plugin implements the legacy read callback.
    #[inline]
    pub fn has_read(&self) -> bool {
        self.raw.read.is_some()
    }

    #[inline]
    pub fn param_count(&self) -> u32 {
        if self.raw.paramdesc.is_null() {
            return 0;
        }

        u32::try_from(self.raw.numparameters).unwrap_or(0)
    }

    /// Returns the descriptor of the parameter at the given index, if any.
    pub fn param(&self, index: u32) -> Option<ParamInfo<'a>> {
        if index >= self.param_count() {
            return None;
        }

        let index = usize::try_from(index).ok()?;

        // SAFETY: the table holds numparameters pointers, which are either NULL or valid for 'a
        unsafe {
            let param = (*self.raw.paramdesc.add(index)).as_ref()?;
            Some(ParamInfo::from_raw(param))
        }
    }

    pub fn params(&self) -> impl Iterator<Item = ParamInfo<'a>> + 'a {
        let description = *self;
        (0..self.param_count()).filter_map(move |i| description.param(i))
    }
}
