//! Static descriptions of the parameters a DSP plugin exposes to the host.
//!
//! The host reads these once, at load time, to render controls for each parameter and to know
//! which typed accessor (float, int, bool or data) to use for a given parameter index.

use crate::sys::*;
use crate::utils::{cstr_from_nullable_ptr, data_from_array_buf, write_to_array_buf};
use std::ffi::{CStr, CString};
use std::fmt::{Debug, Formatter};

/// The index of a parameter in a plugin's parameter table.
pub type ParamIndex = u32;

/// The type and value range of a parameter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParamRange {
    Float { min: f32, max: f32, default: f32 },
    Int { min: i32, max: i32, default: i32, goes_to_infinity: bool },
    Bool { default: bool },
    Data { data_type: i32 },
}

impl ParamRange {
    fn write_to(&self, raw: &mut FMOD_DSP_PARAMETER_DESC) {
        match *self {
            ParamRange::Float { min, max, default } => {
                raw.param_type = FMOD_DSP_PARAMETER_TYPE_FLOAT;
                raw.desc.floatdesc = FMOD_DSP_PARAMETER_DESC_FLOAT {
                    min,
                    max,
                    defaultval: default,
                    mapping: FMOD_DSP_PARAMETER_FLOAT_MAPPING {
                        mapping_type: FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE_AUTO,
                        piecewiselinearmapping: FMOD_DSP_PARAMETER_FLOAT_MAPPING_PIECEWISE_LINEAR {
                            numpoints: 0,
                            pointparamvalues: core::ptr::null_mut(),
                            pointpositions: core::ptr::null_mut(),
                        },
                    },
                };
            }
            ParamRange::Int {
                min,
                max,
                default,
                goes_to_infinity,
            } => {
                raw.param_type = FMOD_DSP_PARAMETER_TYPE_INT;
                raw.desc.intdesc = FMOD_DSP_PARAMETER_DESC_INT {
                    min,
                    max,
                    defaultval: default,
                    goestoinf: goes_to_infinity.into(),
                    valuenames: core::ptr::null(),
                };
            }
            ParamRange::Bool { default } => {
                raw.param_type = FMOD_DSP_PARAMETER_TYPE_BOOL;
                raw.desc.booldesc = FMOD_DSP_PARAMETER_DESC_BOOL {
                    defaultval: default.into(),
                    valuenames: core::ptr::null(),
                };
            }
            ParamRange::Data { data_type } => {
                raw.param_type = FMOD_DSP_PARAMETER_TYPE_DATA;
                raw.desc.datadesc = FMOD_DSP_PARAMETER_DESC_DATA {
                    datatype: data_type,
                };
            }
        }
    }

    /// # Safety
    ///
    /// The union field matching `raw.param_type` must be initialized.
    unsafe fn from_raw(raw: &FMOD_DSP_PARAMETER_DESC) -> Option<Self> {
        // SAFETY: the active union field is designated by param_type, which is upheld by caller
        unsafe {
            match raw.param_type {
                FMOD_DSP_PARAMETER_TYPE_FLOAT => Some(ParamRange::Float {
                    min: raw.desc.floatdesc.min,
                    max: raw.desc.floatdesc.max,
                    default: raw.desc.floatdesc.defaultval,
                }),
                FMOD_DSP_PARAMETER_TYPE_INT => Some(ParamRange::Int {
                    min: raw.desc.intdesc.min,
                    max: raw.desc.intdesc.max,
                    default: raw.desc.intdesc.defaultval,
                    goes_to_infinity: raw.desc.intdesc.goestoinf != FMOD_FALSE,
                }),
                FMOD_DSP_PARAMETER_TYPE_BOOL => Some(ParamRange::Bool {
                    default: raw.desc.booldesc.defaultval != FMOD_FALSE,
                }),
                FMOD_DSP_PARAMETER_TYPE_DATA => Some(ParamRange::Data {
                    data_type: raw.desc.datadesc.datatype,
                }),
                _ => None,
            }
        }
    }
}

/// An owned parameter description, ready to be handed to the host.
///
/// Names and labels longer than 15 bytes are truncated, as the host only reserves 16 bytes
/// (including the NUL terminator) for them.
///
/// # Example
///
/// ```
/// use fmod_dsp_common::params::{ParamDescriptor, ParamRange};
///
/// let rpm = ParamDescriptor::float("RPM", "RPM", "Rotating speed of the engine", 0.0, 1.0, 0.0);
///
/// assert_eq!(b"RPM", rpm.name());
/// assert_eq!(ParamRange::Float { min: 0.0, max: 1.0, default: 0.0 }, rpm.range());
/// ```
pub struct ParamDescriptor {
    raw: FMOD_DSP_PARAMETER_DESC,
    range: ParamRange,
    description: CString,
}

impl ParamDescriptor {
    /// Creates a new parameter descriptor.
    ///
    /// # Panics
    ///
    /// This function will panic if the given description contains a NUL byte.
    pub fn new(name: &str, label: &str, description: &str, range: ParamRange) -> Self {
        let description =
            CString::new(description).expect("Parameter description contains a NUL byte");

        let mut raw = FMOD_DSP_PARAMETER_DESC {
            param_type: FMOD_DSP_PARAMETER_TYPE_DATA,
            name: [0; FMOD_DSP_PARAMETER_NAME_LENGTH],
            label: [0; FMOD_DSP_PARAMETER_NAME_LENGTH],
            description: description.as_ptr(),
            desc: FMOD_DSP_PARAMETER_DESC_UNION {
                datadesc: FMOD_DSP_PARAMETER_DESC_DATA {
                    datatype: FMOD_DSP_PARAMETER_DATA_TYPE_USER,
                },
            },
        };

        write_to_array_buf(&mut raw.name, name.as_bytes());
        write_to_array_buf(&mut raw.label, label.as_bytes());
        range.write_to(&mut raw);

        Self {
            raw,
            range,
            description,
        }
    }

    /// Shorthand for a [`ParamRange::Float`] parameter.
    #[inline]
    pub fn float(
        name: &str,
        label: &str,
        description: &str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::new(name, label, description, ParamRange::Float { min, max, default })
    }

    /// Shorthand for a finite [`ParamRange::Int`] parameter.
    #[inline]
    pub fn int(
        name: &str,
        label: &str,
        description: &str,
        min: i32,
        max: i32,
        default: i32,
    ) -> Self {
        Self::new(
            name,
            label,
            description,
            ParamRange::Int {
                min,
                max,
                default,
                goes_to_infinity: false,
            },
        )
    }

    /// Shorthand for a [`ParamRange::Bool`] parameter.
    #[inline]
    pub fn bool(name: &str, label: &str, description: &str, default: bool) -> Self {
        Self::new(name, label, description, ParamRange::Bool { default })
    }

    /// Shorthand for a user-defined [`ParamRange::Data`] parameter.
    #[inline]
    pub fn data(name: &str, label: &str, description: &str) -> Self {
        Self::new(
            name,
            label,
            description,
            ParamRange::Data {
                data_type: FMOD_DSP_PARAMETER_DATA_TYPE_USER,
            },
        )
    }

    /// Makes the host display this float parameter on a linear scale, instead of letting it pick
    /// one.
    ///
    /// This has no effect on non-float parameters.
    pub fn with_linear_mapping(mut self) -> Self {
        if let ParamRange::Float { .. } = self.range {
            self.raw.desc.floatdesc.mapping.mapping_type =
                FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE_LINEAR;
        }

        self
    }

    #[inline]
    pub fn name(&self) -> &[u8] {
        data_from_array_buf(&self.raw.name)
    }

    #[inline]
    pub fn label(&self) -> &[u8] {
        data_from_array_buf(&self.raw.label)
    }

    #[inline]
    pub fn description(&self) -> &CStr {
        &self.description
    }

    #[inline]
    pub fn range(&self) -> ParamRange {
        self.range
    }

    #[inline]
    pub fn as_raw(&self) -> &FMOD_DSP_PARAMETER_DESC {
        &self.raw
    }
}

impl Debug for ParamDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamDescriptor")
            .field("name", &String::from_utf8_lossy(self.name()))
            .field("label", &String::from_utf8_lossy(self.label()))
            .field("description", &self.description)
            .field("range", &self.range)
            .finish()
    }
}

// SAFETY: the only pointer in the raw descriptor points into the owned, immutable description.
unsafe impl Send for ParamDescriptor {}
// SAFETY: same as above, this type is never mutated through a shared reference.
unsafe impl Sync for ParamDescriptor {}

/// A borrowed view into a parameter description, as read back by a host.
#[derive(Copy, Clone)]
pub struct ParamInfo<'a> {
    raw: &'a FMOD_DSP_PARAMETER_DESC,
}

impl<'a> ParamInfo<'a> {
    /// # Safety
    ///
    /// The description pointer must either be NULL or point to a valid NUL-terminated string, and
    /// the union field designated by the parameter type must be initialized.
    #[inline]
    pub unsafe fn from_raw(raw: &'a FMOD_DSP_PARAMETER_DESC) -> Self {
        Self { raw }
    }

    #[inline]
    pub fn name(&self) -> &'a [u8] {
        data_from_array_buf(&self.raw.name)
    }

    #[inline]
    pub fn label(&self) -> &'a [u8] {
        data_from_array_buf(&self.raw.label)
    }

    #[inline]
    pub fn description(&self) -> Option<&'a CStr> {
        // SAFETY: validity of the pointer is upheld by the from_raw caller
        unsafe { cstr_from_nullable_ptr(self.raw.description) }
    }

    /// Returns the range of this parameter, or `None` if its type is unknown.
    #[inline]
    pub fn range(&self) -> Option<ParamRange> {
        // SAFETY: the active union field is upheld by the from_raw caller
        unsafe { ParamRange::from_raw(self.raw) }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn float_descriptor_matches_sdk_macro() {
        let desc = ParamDescriptor::float("RPM", "RPM", "Engine speed", 0.0, 1.0, 0.0);
        let raw = desc.as_raw();

        assert_eq!(FMOD_DSP_PARAMETER_TYPE_FLOAT, raw.param_type);
        // SAFETY: this is a float parameter
        let float = unsafe { raw.desc.floatdesc };
        assert_eq!(0.0, float.min);
        assert_eq!(1.0, float.max);
        assert_eq!(0.0, float.defaultval);
        assert_eq!(FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE_AUTO, float.mapping.mapping_type);
        assert_eq!(c"Engine speed", desc.description());
    }

    #[test]
    fn linear_mapping_only_applies_to_floats() {
        let desc = ParamDescriptor::float("RPM", "", "", 0.0, 1.0, 0.0).with_linear_mapping();
        // SAFETY: this is a float parameter
        let float = unsafe { desc.as_raw().desc.floatdesc };
        assert_eq!(FMOD_DSP_PARAMETER_FLOAT_MAPPING_TYPE_LINEAR, float.mapping.mapping_type);

        let desc = ParamDescriptor::bool("On", "", "", false).with_linear_mapping();
        // SAFETY: this is a bool parameter
        let boolean = unsafe { desc.as_raw().desc.booldesc };
        assert_eq!(FMOD_FALSE, boolean.defaultval);
    }

    #[test]
    fn names_are_truncated_to_fifteen_bytes() {
        let desc = ParamDescriptor::bool("A very long parameter name", "dB", "", true);

        assert_eq!(b"A very long par", desc.name());
        assert_eq!(b"dB", desc.label());
    }

    #[test]
    fn raw_view_reads_back_range() {
        let desc = ParamDescriptor::int("Mode", "", "", -2, 5, 1).with_linear_mapping();
        // SAFETY: the descriptor was built by ParamDescriptor
        let info = unsafe { ParamInfo::from_raw(desc.as_raw()) };

        assert_eq!(b"Mode", info.name());
        assert_eq!(Some(c""), info.description());
        assert_eq!(
            Some(ParamRange::Int {
                min: -2,
                max: 5,
                default: 1,
                goes_to_infinity: false
            }),
            info.range()
        );
    }
}
