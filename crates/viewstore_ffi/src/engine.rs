//! Engine bridge over an extern "C" callback.
//!
//! The host links its native engine and hands the store a function
//! pointer; requests and responses cross as JSON strings per the
//! protocol's wire rendering.

use crate::error::VsResult;
use std::ffi::{c_char, c_void, CStr, CString};
use viewstore_core::Engine;
use viewstore_protocol::{
    decode_response, encode_request, ActionRequest, Batch, EngineError, EngineResult,
};

/// Host-provided engine entry points.
///
/// `call` receives the request as a null-terminated JSON string and
/// returns a null-terminated JSON response string allocated by the
/// host; the bridge copies it and then invokes `release_response` (if
/// set) so the host can free its allocation. A null return is a
/// transport failure.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VsEngineCallbacks {
    /// Executes one action; called from the store's worker thread.
    pub call:
        Option<extern "C" fn(request_json: *const c_char, user_data: *mut c_void) -> *mut c_char>,
    /// Frees a response string previously returned by `call`.
    pub release_response: Option<extern "C" fn(response: *mut c_char, user_data: *mut c_void)>,
    /// Opaque pointer passed back on every callback.
    pub user_data: *mut c_void,
}

impl VsEngineCallbacks {
    pub(crate) fn validate(&self) -> Result<(), VsResult> {
        if self.call.is_none() {
            return Err(VsResult::InvalidArgument);
        }
        Ok(())
    }
}

/// Adapts the host callback to the [`Engine`] trait.
pub struct CallbackEngine {
    callbacks: VsEngineCallbacks,
}

// The store invokes the callback only from its single worker thread,
// but the handle itself moves across threads; the host contract
// requires `call` and `user_data` to tolerate that.
unsafe impl Send for CallbackEngine {}
unsafe impl Sync for CallbackEngine {}

impl CallbackEngine {
    /// Wraps validated host callbacks.
    pub fn new(callbacks: VsEngineCallbacks) -> Self {
        Self { callbacks }
    }
}

impl Engine for CallbackEngine {
    fn call(&self, request: &ActionRequest) -> EngineResult<Batch> {
        let call = self
            .callbacks
            .call
            .ok_or_else(|| EngineError::transport("engine callback is missing"))?;

        let request_json = CString::new(encode_request(request))
            .map_err(|_| EngineError::transport("request contained a nul byte"))?;

        let response_ptr = call(request_json.as_ptr(), self.callbacks.user_data);
        if response_ptr.is_null() {
            return Err(EngineError::transport("engine returned null"));
        }

        // Copy out before releasing the host's allocation.
        let response = {
            let cstr = unsafe { CStr::from_ptr(response_ptr) };
            cstr.to_str().map(str::to_owned)
        };
        if let Some(release) = self.callbacks.release_response {
            release(response_ptr, self.callbacks.user_data);
        }

        let response =
            response.map_err(|_| EngineError::malformed("response was not valid UTF-8"))?;
        decode_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use viewstore_protocol::{decode_request, encode_response, EngineResponse, SnapshotUpdate};

    static RELEASES: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn echo_engine(request: *const c_char, _user_data: *mut c_void) -> *mut c_char {
        let request = unsafe { CStr::from_ptr(request) }.to_str().unwrap();
        let request = decode_request(request).unwrap();
        let response = EngineResponse::Updates(Batch::new(vec![SnapshotUpdate::put(
            format!("echo/{}", request.name),
            1,
            viewstore_codec::Value::from(request.name.as_str()),
        )]));
        CString::new(encode_response(&response)).unwrap().into_raw()
    }

    extern "C" fn null_engine(_request: *const c_char, _user_data: *mut c_void) -> *mut c_char {
        std::ptr::null_mut()
    }

    extern "C" fn release(response: *mut c_char, _user_data: *mut c_void) {
        RELEASES.fetch_add(1, Ordering::SeqCst);
        drop(unsafe { CString::from_raw(response) });
    }

    #[test]
    fn callback_round_trip() {
        let engine = CallbackEngine::new(VsEngineCallbacks {
            call: Some(echo_engine),
            release_response: Some(release),
            user_data: std::ptr::null_mut(),
        });

        let before = RELEASES.load(Ordering::SeqCst);
        let batch = engine.call(&ActionRequest::new("ping")).unwrap();
        assert_eq!(batch.updates[0].path, "echo/ping");
        assert_eq!(RELEASES.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn null_response_is_a_transport_error() {
        let engine = CallbackEngine::new(VsEngineCallbacks {
            call: Some(null_engine),
            release_response: None,
            user_data: std::ptr::null_mut(),
        });

        let err = engine.call(&ActionRequest::new("ping")).unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }
}
