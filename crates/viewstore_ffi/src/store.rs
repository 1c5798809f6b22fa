//! Store FFI functions.

use crate::engine::{CallbackEngine, VsEngineCallbacks};
use crate::error::{clear_last_error, set_last_error, store_error, VsResult};
use crate::strings::VsString;
use std::ffi::{c_char, c_void, CStr, CString};
use std::sync::Arc;
use std::time::Duration;
use viewstore_core::{Store, StoreConfig, SubscriptionHandle};

/// Opaque store handle.
pub struct VsStoreHandle {
    store: Store,
}

/// Opaque subscription handle.
pub struct VsSubscriptionHandle {
    _handle: SubscriptionHandle,
}

/// Change callback invoked on the store's worker thread.
///
/// `path` is valid only for the duration of the call; copy it if the
/// host needs to keep it.
pub type VsChangeCallback =
    extern "C" fn(path: *const c_char, version: u64, user_data: *mut c_void);

struct SendPtr(*mut c_void);

// The host contract requires subscription user_data to tolerate use
// from the worker thread.
unsafe impl Send for SendPtr {}
unsafe impl Sync for SendPtr {}

unsafe fn str_arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, VsResult> {
    if ptr.is_null() {
        set_last_error(format!("`{name}` is null"));
        return Err(VsResult::NullPointer);
    }
    CStr::from_ptr(ptr).to_str().map_err(|_| {
        set_last_error(format!("`{name}` is not valid UTF-8"));
        VsResult::InvalidUtf8
    })
}

/// Creates a store bound to a host engine.
///
/// # Arguments
///
/// * `callbacks` - Host engine entry points; `call` is required
/// * `get_sync_timeout_ms` - Drain-wait bound for `vs_store_get_sync`;
///   `0` waits indefinitely
/// * `out_handle` - Output pointer for the store handle
///
/// # Safety
///
/// `out_handle` must be a valid pointer. The callbacks must stay valid
/// until `vs_store_free`.
#[no_mangle]
pub unsafe extern "C" fn vs_store_new(
    callbacks: VsEngineCallbacks,
    get_sync_timeout_ms: u64,
    out_handle: *mut *mut VsStoreHandle,
) -> VsResult {
    clear_last_error();

    if out_handle.is_null() {
        set_last_error("`out_handle` is null");
        return VsResult::NullPointer;
    }
    if callbacks.validate().is_err() {
        set_last_error("engine `call` callback is required");
        return VsResult::InvalidArgument;
    }

    let mut config = StoreConfig::new("ffi-store");
    if get_sync_timeout_ms > 0 {
        config = config.with_get_sync_timeout(Duration::from_millis(get_sync_timeout_ms));
    }

    let store = Store::new(config, Arc::new(CallbackEngine::new(callbacks)));
    *out_handle = Box::into_raw(Box::new(VsStoreHandle { store }));
    VsResult::Ok
}

/// Emits the bootstrap action. Returns immediately.
///
/// # Safety
///
/// `handle` must be a live handle from `vs_store_new`.
#[no_mangle]
pub unsafe extern "C" fn vs_store_initialize(handle: *mut VsStoreHandle) -> VsResult {
    clear_last_error();

    if handle.is_null() {
        set_last_error("`handle` is null");
        return VsResult::NullPointer;
    }

    match (*handle).store.initialize() {
        Ok(_) => VsResult::Ok,
        Err(e) => store_error(&e),
    }
}

/// Dispatches an action. Returns immediately; the cache updates
/// asynchronously.
///
/// # Arguments
///
/// * `action` - Action name
/// * `payload_json` - Optional JSON payload; pass null for none
///
/// # Safety
///
/// `handle` must be a live handle; `action` must be a valid
/// null-terminated string; `payload_json` may be null.
#[no_mangle]
pub unsafe extern "C" fn vs_store_emit(
    handle: *mut VsStoreHandle,
    action: *const c_char,
    payload_json: *const c_char,
) -> VsResult {
    clear_last_error();

    if handle.is_null() {
        set_last_error("`handle` is null");
        return VsResult::NullPointer;
    }
    let action = match str_arg(action, "action") {
        Ok(s) => s,
        Err(code) => return code,
    };

    let payload = if payload_json.is_null() {
        None
    } else {
        let raw = match str_arg(payload_json, "payload_json") {
            Ok(s) => s,
            Err(code) => return code,
        };
        match viewstore_codec::Value::from_json_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                set_last_error(e.to_string());
                return VsResult::DecodeError;
            }
        }
    };

    match (*handle).store.emit(action, payload) {
        Ok(_) => VsResult::Ok,
        Err(e) => store_error(&e),
    }
}

unsafe fn read_snapshot(
    handle: *mut VsStoreHandle,
    path: *const c_char,
    out: *mut VsString,
) -> VsResult {
    if handle.is_null() || out.is_null() {
        set_last_error("null pointer argument");
        return VsResult::NullPointer;
    }
    let path = match str_arg(path, "path") {
        Ok(s) => s,
        Err(code) => return code,
    };

    match (*handle).store.snapshot(path) {
        Some(snapshot) => {
            *out = VsString::from_string(snapshot.value.to_json_string());
            VsResult::Ok
        }
        None => {
            *out = VsString::empty();
            VsResult::Absent
        }
    }
}

/// Reads the last cached snapshot for a path as a JSON string.
///
/// Never waits for in-flight actions; the value may be stale relative
/// to an action just emitted. Returns `Absent` with a null string when
/// the path is not populated.
///
/// # Safety
///
/// `handle` must be live; `path` must be a valid null-terminated
/// string; `out` must be a valid pointer. Free the string with
/// `vs_string_free`.
#[no_mangle]
pub unsafe extern "C" fn vs_store_get(
    handle: *mut VsStoreHandle,
    path: *const c_char,
    out: *mut VsString,
) -> VsResult {
    clear_last_error();
    read_snapshot(handle, path, out)
}

/// Blocks until the action queue drains, then reads like `vs_store_get`.
///
/// A blocking call: never invoke it from the render thread. Returns
/// `Timeout` if the configured drain bound elapses.
///
/// # Safety
///
/// Same contract as `vs_store_get`.
#[no_mangle]
pub unsafe extern "C" fn vs_store_get_sync(
    handle: *mut VsStoreHandle,
    path: *const c_char,
    out: *mut VsString,
) -> VsResult {
    clear_last_error();

    if handle.is_null() {
        set_last_error("`handle` is null");
        return VsResult::NullPointer;
    }
    if let Err(e) = (*handle).store.wait_idle() {
        return store_error(&e);
    }
    read_snapshot(handle, path, out)
}

/// Subscribes a callback to changes of an exact path.
///
/// The callback runs on the store's worker thread after each batch
/// that changed the path. Release with `vs_subscription_release`;
/// leaking the handle leaks the callback.
///
/// # Safety
///
/// `handle` must be live; `path` must be a valid null-terminated
/// string; `out_subscription` must be a valid pointer. `callback` and
/// `user_data` must stay valid until the subscription is released.
#[no_mangle]
pub unsafe extern "C" fn vs_store_subscribe(
    handle: *mut VsStoreHandle,
    path: *const c_char,
    callback: Option<VsChangeCallback>,
    user_data: *mut c_void,
    out_subscription: *mut *mut VsSubscriptionHandle,
) -> VsResult {
    clear_last_error();

    if handle.is_null() || out_subscription.is_null() {
        set_last_error("null pointer argument");
        return VsResult::NullPointer;
    }
    let Some(callback) = callback else {
        set_last_error("`callback` is required");
        return VsResult::InvalidArgument;
    };
    let path = match str_arg(path, "path") {
        Ok(s) => s,
        Err(code) => return code,
    };

    let user_data = SendPtr(user_data);
    let subscription = (*handle).store.subscribe(path, move |change| {
        // Force the closure to capture the whole `SendPtr` (Send + Sync)
        // rather than the inner `*mut c_void` field (edition 2021 disjoint
        // capture would otherwise capture the raw pointer and lose Send).
        let user_data = &user_data;
        if let Ok(c_path) = CString::new(change.path.as_str()) {
            callback(c_path.as_ptr(), change.version, user_data.0);
        }
    });

    *out_subscription = Box::into_raw(Box::new(VsSubscriptionHandle {
        _handle: subscription,
    }));
    VsResult::Ok
}

/// Releases a subscription; the callback will not run again.
///
/// # Safety
///
/// `subscription` must have come from `vs_store_subscribe` and must not
/// be used after this call. Null is a no-op.
#[no_mangle]
pub unsafe extern "C" fn vs_subscription_release(subscription: *mut VsSubscriptionHandle) {
    if !subscription.is_null() {
        drop(Box::from_raw(subscription));
    }
}

/// Closes the store: queued actions drain, then further emits fail
/// with `Closed`. The handle stays valid until `vs_store_free`.
///
/// # Safety
///
/// `handle` must be a live handle from `vs_store_new`.
#[no_mangle]
pub unsafe extern "C" fn vs_store_close(handle: *mut VsStoreHandle) -> VsResult {
    clear_last_error();

    if handle.is_null() {
        set_last_error("`handle` is null");
        return VsResult::NullPointer;
    }
    (*handle).store.close();
    VsResult::Ok
}

/// Frees the store handle, closing the store if still open.
///
/// # Safety
///
/// `handle` must have come from `vs_store_new` and must not be used
/// after this call. Null is a no-op.
#[no_mangle]
pub unsafe extern "C" fn vs_store_free(handle: *mut VsStoreHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}
