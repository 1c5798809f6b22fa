//! String buffers for FFI.

use std::ffi::{c_char, CString};

/// A null-terminated UTF-8 string owned by Rust.
///
/// Call `vs_string_free` to release.
#[repr(C)]
pub struct VsString {
    /// Pointer to the null-terminated string, or null for "no value".
    pub ptr: *mut c_char,
    /// Length in bytes, not counting the terminator.
    pub len: usize,
}

impl VsString {
    /// Creates a buffer from an owned string.
    ///
    /// Interior nul bytes are stripped; JSON payloads never contain
    /// them.
    pub fn from_string(s: String) -> Self {
        let sanitized: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
        let len = sanitized.len();
        match CString::new(sanitized) {
            Ok(cstring) => Self {
                ptr: cstring.into_raw(),
                len,
            },
            Err(_) => Self::empty(),
        }
    }

    /// Creates an empty (null) buffer.
    pub fn empty() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            len: 0,
        }
    }

    /// Returns true if the buffer holds no string.
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}

/// Frees a string allocated by ViewStore.
///
/// # Safety
///
/// The string must have been returned by a ViewStore FFI function and
/// not freed before.
#[no_mangle]
pub unsafe extern "C" fn vs_string_free(s: VsString) {
    if !s.ptr.is_null() {
        drop(CString::from_raw(s.ptr));
    }
}
