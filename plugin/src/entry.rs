//! The entry point of a DSP plugin library.
//!
//! The host loads a plugin library by looking up its `FMODGetDSPDescription` symbol, and calling it
//! to obtain the plugin's description table. That table (and everything it points to) must stay
//! valid and at the same address for as long as the library is loaded.
//!
//! The [`fmod_export_dsp!`](crate::fmod_export_dsp) macro exports that symbol for a given
//! [`Plugin`] type, using a static [`DspEntry`] to build and store the table.

use crate::plugin::wrapper::panic::catch_unwind;
use crate::plugin::{Plugin, PluginDescription};
use fmod_dsp_common::sys::FMOD_DSP_DESCRIPTION;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::OnceLock;

/// Lazily builds, then keeps, the description table of a plugin type `P`.
///
/// This is meant to be stored in a `static`, so that the table's address stays stable.
pub struct DspEntry<P: Plugin> {
    description: OnceLock<PluginDescription>,
    _plugin: PhantomData<fn() -> P>,
}

impl<P: Plugin> DspEntry<P> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            description: OnceLock::new(),
            _plugin: PhantomData,
        }
    }

    /// Returns the plugin's description table, building it on the first call.
    ///
    /// Returns a NULL pointer if the plugin panicked while building its descriptor. The host
    /// treats this as a failure to load the plugin.
    pub fn get_description(&self) -> *mut FMOD_DSP_DESCRIPTION {
        catch_unwind(AssertUnwindSafe(|| {
            self.description
                .get_or_init(|| PluginDescription::new::<P>(P::get_descriptor()))
                .as_raw_mut_ptr()
        }))
        .unwrap_or(core::ptr::null_mut())
    }
}

impl<P: Plugin> Default for DspEntry<P> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Exports the `FMODGetDSPDescription` symbol for the given [`Plugin`](crate::plugin::Plugin)
/// type.
///
/// This can only be used once per library.
///
/// # Example
///
/// ```ignore
/// use fmod_dsp_plugin::prelude::*;
///
/// struct MyPlugin;
///
/// impl Plugin for MyPlugin {
///     // ...
/// }
///
/// fmod_export_dsp!(MyPlugin);
/// ```
#[macro_export]
macro_rules! fmod_export_dsp {
    ($plugin:ty) => {
        #[allow(non_snake_case, unsafe_code)]
        #[unsafe(no_mangle)]
        pub extern "system" fn FMODGetDSPDescription() -> *mut $crate::sys::FMOD_DSP_DESCRIPTION {
            static ENTRY: $crate::entry::DspEntry<$plugin> = $crate::entry::DspEntry::new();
            ENTRY.get_description()
        }
    };
}
