//! Error codes and the thread-local last-error message.

use std::cell::RefCell;
use std::ffi::CString;
use viewstore_core::StoreError;

/// Result code for FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VsResult {
    /// Operation succeeded.
    Ok = 0,
    /// Generic error.
    Error = 1,
    /// Invalid argument.
    InvalidArgument = 2,
    /// Null pointer argument.
    NullPointer = 3,
    /// Invalid UTF-8 in a string argument.
    InvalidUtf8 = 4,
    /// The store is closed.
    Closed = 5,
    /// Timed out waiting for the action queue to drain.
    Timeout = 6,
    /// A snapshot failed to decode.
    DecodeError = 7,
    /// The engine rejected or failed an action.
    EngineError = 8,
    /// The requested path is absent from the cache.
    Absent = 9,
}

impl VsResult {
    /// Returns true if the result indicates success.
    pub fn is_ok(self) -> bool {
        self == VsResult::Ok
    }
}

impl From<&StoreError> for VsResult {
    fn from(error: &StoreError) -> Self {
        match error {
            StoreError::Decode(_) => VsResult::DecodeError,
            StoreError::Engine(_) => VsResult::EngineError,
            StoreError::Closed => VsResult::Closed,
            StoreError::Timeout => VsResult::Timeout,
        }
    }
}

// Thread-local storage for the last error message.
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Sets the last error message for this thread.
pub(crate) fn set_last_error(message: impl Into<String>) {
    let message = message.into();
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(message).ok();
    });
}

/// Clears the last error for this thread.
pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Records a store error and returns its result code.
pub(crate) fn store_error(error: &StoreError) -> VsResult {
    set_last_error(error.to_string());
    VsResult::from(error)
}

/// Gets the last error message as a C string.
///
/// Returns null if no error is set.
///
/// # Safety
///
/// The returned pointer is valid until the next FFI call on this thread.
#[no_mangle]
pub extern "C" fn vs_last_error_message() -> *const std::ffi::c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => std::ptr::null(),
    })
}
