//! Parameter access, as driven by the host's typed get/set callbacks.
//!
//! The host addresses parameters by their index in the plugin's parameter table (see
//! [`PluginDescriptor::with_param`](crate::plugin::PluginDescriptor::with_param)), and uses a
//! different callback for each parameter type. Every accessor of [`PluginParams`] has a default
//! implementation rejecting all indices, so a plugin only implements the ones matching the types
//! of the parameters it declares.

pub use fmod_dsp_common::params::{ParamDescriptor, ParamIndex, ParamInfo, ParamRange};

use crate::plugin::PluginError;
use std::fmt::Write;

/// Helper for writing a textual parameter representation into the host's value string buffer.
///
/// The host gives a fixed-size buffer along with each get call, and we format into it without
/// overflowing, always ensuring a final NUL terminator.
pub struct ParamDisplayWriter<'a> {
    cursor_position: usize,
    buffer: &'a mut [u8],
}

impl<'a> ParamDisplayWriter<'a> {
    #[inline]
    pub(crate) fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            cursor_position: 0,
            buffer,
        }
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)] // Len is 0 when the host asks for no text
    pub fn len(&self) -> usize {
        self.buffer.len().saturating_sub(1)
    }

    #[inline]
    pub fn remaining_len(&self) -> usize {
        self.buffer.len().saturating_sub(self.cursor_position + 1)
    }

    /// Finalizes the buffer write by inserting a terminating NUL.
    ///
    /// Returns `true` if any characters were written.
    pub(crate) fn finish(self) -> bool {
        if let Some(terminator) = self.buffer.get_mut(self.cursor_position) {
            *terminator = 0;
        }
        self.cursor_position > 0
    }
}

impl Write for ParamDisplayWriter<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let s = s.as_bytes();
        let requested_len = core::cmp::min(s.len(), self.remaining_len());

        if requested_len > 0 {
            self.buffer[self.cursor_position..self.cursor_position + requested_len]
                .copy_from_slice(&s[..requested_len]);
            self.cursor_position += requested_len;
        }

        Ok(())
    }
}

/// Typed parameter accessors, called by the host from any thread.
///
/// Setters must not have any effect when returning an error. Getters return the current value,
/// which the wrapper then formats into the host's value string buffer using the matching
/// `*_to_text` method.
#[allow(unused_variables)]
pub trait PluginParams {
    #[inline]
    fn set_float(&self, index: ParamIndex, value: f32) -> Result<(), PluginError> {
        Err(PluginError::InvalidParameter(index))
    }

    #[inline]
    fn get_float(&self, index: ParamIndex) -> Result<f32, PluginError> {
        Err(PluginError::InvalidParameter(index))
    }

    #[inline]
    fn set_int(&self, index: ParamIndex, value: i32) -> Result<(), PluginError> {
        Err(PluginError::InvalidParameter(index))
    }

    #[inline]
    fn get_int(&self, index: ParamIndex) -> Result<i32, PluginError> {
        Err(PluginError::InvalidParameter(index))
    }

    #[inline]
    fn set_bool(&self, index: ParamIndex, value: bool) -> Result<(), PluginError> {
        Err(PluginError::InvalidParameter(index))
    }

    #[inline]
    fn get_bool(&self, index: ParamIndex) -> Result<bool, PluginError> {
        Err(PluginError::InvalidParameter(index))
    }

    #[inline]
    fn set_data(&self, index: ParamIndex, data: &[u8]) -> Result<(), PluginError> {
        Err(PluginError::InvalidParameter(index))
    }

    /// Returns the current data of a data parameter.
    ///
    /// The returned slice must stay valid and unchanged until the next call to
    /// [`set_data`](PluginParams::set_data) for the same index.
    #[inline]
    fn get_data(&self, index: ParamIndex) -> Result<&[u8], PluginError> {
        Err(PluginError::InvalidParameter(index))
    }

    #[inline]
    fn float_to_text(
        &self,
        index: ParamIndex,
        value: f32,
        writer: &mut ParamDisplayWriter,
    ) -> std::fmt::Result {
        write!(writer, "{value:.2}")
    }

    #[inline]
    fn int_to_text(
        &self,
        index: ParamIndex,
        value: i32,
        writer: &mut ParamDisplayWriter,
    ) -> std::fmt::Result {
        write!(writer, "{value}")
    }

    #[inline]
    fn bool_to_text(
        &self,
        index: ParamIndex,
        value: bool,
        writer: &mut ParamDisplayWriter,
    ) -> std::fmt::Result {
        writer.write_str(if value { "On" } else { "Off" })
    }
}

impl PluginParams for () {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn writer_truncates_and_terminates() {
        let mut buf = [0xFFu8; 6];
        let mut writer = ParamDisplayWriter::new(&mut buf);

        assert_eq!(5, writer.len());
        write!(writer, "{:.2} rpm", 0.5f32).unwrap();
        assert_eq!(0, writer.remaining_len());
        assert!(writer.finish());

        assert_eq!(b"0.50 \0", &buf);
    }

    #[test]
    fn empty_writer_writes_nothing() {
        let mut buf: [u8; 0] = [];
        let mut writer = ParamDisplayWriter::new(&mut buf);

        writer.write_str("ignored").unwrap();
        assert!(!writer.finish());
    }

    #[test]
    fn default_accessors_reject_everything() {
        assert!(matches!(
            ().set_float(0, 1.0),
            Err(PluginError::InvalidParameter(0))
        ));
        assert!(matches!(().get_int(4), Err(PluginError::InvalidParameter(4))));
        assert!(matches!(().get_data(1), Err(PluginError::InvalidParameter(1))));
    }
}
