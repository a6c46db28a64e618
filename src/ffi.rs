//! FFI bindings for Kinecal
//!
//! C-compatible functions for embedding the engine in a mobile host. The
//! host owns the sensor subscription and pushes samples through the handle;
//! strings returned by these functions are allocated and must be freed with
//! `kinecal_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::report::ReportEncoder;
use crate::session::{CalibrationSession, HostDrivenSource};
use crate::types::{SessionStatus, ThresholdSet};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn status_code(status: SessionStatus) -> i32 {
    match status {
        SessionStatus::Init => 0,
        SessionStatus::Observing => 1,
        SessionStatus::HasResult => 2,
        SessionStatus::Error => 3,
    }
}

/// Opaque handle to a calibration session
pub struct KinecalSessionHandle {
    session: CalibrationSession<HostDrivenSource>,
    encoder: ReportEncoder,
}

/// Create a new calibration session.
///
/// # Safety
/// - Returns a pointer to a newly allocated session.
/// - Must be freed with `kinecal_session_free`.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_new() -> *mut KinecalSessionHandle {
    clear_last_error();
    let handle = Box::new(KinecalSessionHandle {
        session: CalibrationSession::default(),
        encoder: ReportEncoder::new(),
    });
    Box::into_raw(handle)
}

/// Free a calibration session.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_free(handle: *mut KinecalSessionHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Begin observing.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_start(handle: *mut KinecalSessionHandle) {
    if let Some(h) = handle.as_mut() {
        h.session.start();
    }
}

/// Stop observing and derive statistics.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_stop(handle: *mut KinecalSessionHandle) {
    if let Some(h) = handle.as_mut() {
        h.session.stop();
    }
}

/// Start/stop by current state.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_toggle(handle: *mut KinecalSessionHandle) {
    if let Some(h) = handle.as_mut() {
        h.session.toggle();
    }
}

/// Reset the session. Ignored while observing.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_reset(handle: *mut KinecalSessionHandle) {
    if let Some(h) = handle.as_mut() {
        h.session.reset();
    }
}

/// Zero the live trial counters.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_reset_trial(handle: *mut KinecalSessionHandle) {
    if let Some(h) = handle.as_mut() {
        h.session.reset_trial();
    }
}

/// Deliver one sample. The host must serialize calls onto one thread.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
/// - Returns 0 on success, non-zero for a null handle or non-finite sample.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_push_sample(
    handle: *mut KinecalSessionHandle,
    sample: f32,
) -> i32 {
    clear_last_error();
    let Some(h) = handle.as_mut() else {
        set_last_error("Null session pointer");
        return -1;
    };
    if !sample.is_finite() {
        set_last_error("Sample must be a finite float");
        return -1;
    }
    h.session.push_sample(sample);
    0
}

/// Set the target rank used for the detail window.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_set_rank(handle: *mut KinecalSessionHandle, rank: i32) {
    if let Some(h) = handle.as_mut() {
        h.session.set_rank(rank.max(0) as usize);
    }
}

/// Current session status: 0 init, 1 observing, 2 has-result, 3 error.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
/// - Returns -1 for a null handle.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_status(handle: *const KinecalSessionHandle) -> i32 {
    match handle.as_ref() {
        Some(h) => status_code(h.session.status()),
        None => -1,
    }
}

/// Encode the current session state as a report JSON payload.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
/// - Returns a newly allocated string that must be freed with
///   `kinecal_free_string`.
/// - Returns NULL on error; call `kinecal_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_report_json(
    handle: *const KinecalSessionHandle,
) -> *mut c_char {
    clear_last_error();
    let Some(h) = handle.as_ref() else {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    };
    match h.encoder.encode_to_json(&h.session) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Adopt the currently derived thresholds into the trial classifier and
/// return them as JSON for the host to persist.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
/// - Returns a newly allocated string that must be freed with
///   `kinecal_free_string`.
/// - Returns NULL on error; call `kinecal_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_register_json(
    handle: *mut KinecalSessionHandle,
) -> *mut c_char {
    clear_last_error();
    let Some(h) = handle.as_mut() else {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    };
    let thresholds = h.session.statistics().thresholds();
    if thresholds.is_empty() {
        set_last_error("No derived thresholds to register");
        return ptr::null_mut();
    }
    h.session.adopt_thresholds(thresholds);
    match serde_json::to_string(&thresholds) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Feed a previously persisted threshold set (JSON) to the trial classifier.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kinecal_session_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error; call `kinecal_last_error`
///   for the message.
#[no_mangle]
pub unsafe extern "C" fn kinecal_session_adopt_thresholds_json(
    handle: *mut KinecalSessionHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();
    let Some(h) = handle.as_mut() else {
        set_last_error("Null session pointer");
        return -1;
    };
    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return -1;
    };
    match serde_json::from_str::<ThresholdSet>(&json_str) {
        Ok(thresholds) => {
            h.session.adopt_thresholds(thresholds);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Free a string returned by Kinecal functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Kinecal function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn kinecal_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Kinecal call on this
///   thread. Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn kinecal_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the Kinecal library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn kinecal_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
