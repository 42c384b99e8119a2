//! Various utilities shared between plugins and hosts.

mod atomic;
mod conversion;
mod version;

pub use atomic::AtomicF32;
pub use conversion::*;
pub use version::PluginVersion;

use std::ffi::{CStr, c_char};

/// # Safety
///
/// Same as [`CStr::from_ptr`], except `ptr` *can* be NULL.
#[inline]
pub unsafe fn cstr_from_nullable_ptr<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: Upheld by caller
        unsafe { Some(CStr::from_ptr(ptr)) }
    }
}

/// Returns the bytes of a fixed-size, NUL-terminated C string buffer, up to its first NUL.
pub fn data_from_array_buf<const N: usize>(data: &[c_char; N]) -> &[u8] {
    // SAFETY: casting from i8 to u8 is safe, and both have the same layout
    let data = unsafe { core::slice::from_raw_parts(data.as_ptr().cast::<u8>(), data.len()) };

    data.iter()
        .position(|b| *b == 0)
        .map(|pos| &data[..pos])
        .unwrap_or(data)
}

/// Copies `value` into a fixed-size C string buffer, truncating it if needed to always leave room
/// for the terminating NUL byte.
#[allow(clippy::cast_possible_wrap)]
pub fn write_to_array_buf<const N: usize>(dst: &mut [c_char; N], value: &[u8]) {
    if N == 0 {
        return;
    }

    let max_len = core::cmp::min(N - 1, value.len()); // Space for null byte
    for (d, s) in dst.iter_mut().zip(&value[..max_len]) {
        *d = *s as c_char;
    }

    dst[max_len..].fill(0);
}

/// A safer form of [`core::slice::from_raw_parts`] that returns a properly aligned slice in case
/// the length is 0.
///
/// # Safety
///
/// Same requirements as [`core::slice::from_raw_parts`], except the pointer *can* be null or
/// dangling if `len == 0`.
#[inline]
pub unsafe fn slice_from_external_parts<'a, T>(data: *const T, len: usize) -> &'a [T] {
    if len == 0 || data.is_null() {
        return &[];
    }

    // SAFETY: Upheld by caller
    unsafe { core::slice::from_raw_parts(data, len) }
}

/// A safer form of [`core::slice::from_raw_parts_mut`] that returns a properly aligned slice in
/// case the length is 0.
///
/// In C it is common for empty slices to be represented using a null pointer, but this is UB in
/// Rust, as all references must be aligned and non-null.
///
/// # Safety
///
/// Same requirements as [`core::slice::from_raw_parts_mut`], except the pointer *can* be null or
/// dangling if `len == 0`.
#[inline]
pub unsafe fn slice_from_external_parts_mut<'a, T>(data: *mut T, len: usize) -> &'a mut [T] {
    if len == 0 || data.is_null() {
        return &mut [];
    }

    // SAFETY: Upheld by caller
    unsafe { core::slice::from_raw_parts_mut(data, len) }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn array_buf_is_truncated_and_terminated() {
        let mut buf: [c_char; 4] = [1; 4];
        write_to_array_buf(&mut buf, b"RPM engine");

        assert_eq!(b"RPM", data_from_array_buf(&buf));
        assert_eq!(0, buf[3]);
    }

    #[test]
    fn array_buf_clears_leftovers() {
        let mut buf: [c_char; 8] = [b'x' as c_char; 8];
        write_to_array_buf(&mut buf, b"ab");

        assert_eq!(b"ab", data_from_array_buf(&buf));
        assert!(buf[2..].iter().all(|b| *b == 0));
    }
}
