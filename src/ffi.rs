//! FFI interface for C/C++ interop
//!
//! Every conversion takes the HTML as a `(ptr, len)` buffer and an optional
//! JSON configuration string, and returns a `ConversionResultFFI`.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;

/// Result struct returned to C/C++
/// Both pointers are owned by Rust and must be freed via free_conversion_result
#[repr(C)]
pub struct ConversionResultFFI {
    /// Serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if conversion failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Convert microdata to a JSON array of triples.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `config_json` - JSON-serialized Config (null-terminated), or null for defaults
///
/// # Returns
/// ConversionResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `config_json` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_conversion_result`
#[no_mangle]
pub unsafe extern "C" fn microdata_to_rdf_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    config_json: *const c_char,
) -> ConversionResultFFI {
    convert(html_ptr, html_len, config_json, |html, config| {
        crate::to_rdf(html, config).map(|triples| to_json_text(&triples))
    })
}

/// Convert microdata to a JSON-LD array
///
/// # Safety
/// Same as microdata_to_rdf_ffi
#[no_mangle]
pub unsafe extern "C" fn microdata_to_jsonld_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    config_json: *const c_char,
) -> ConversionResultFFI {
    convert(html_ptr, html_len, config_json, |html, config| {
        crate::to_jsonld(html, config).map(|nodes| to_json_text(&nodes))
    })
}

/// Convert microdata to `{"items": [...]}`
///
/// # Safety
/// Same as microdata_to_rdf_ffi
#[no_mangle]
pub unsafe extern "C" fn microdata_to_json_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    config_json: *const c_char,
) -> ConversionResultFFI {
    convert(html_ptr, html_len, config_json, |html, config| {
        crate::to_json(html, config).map(|output| to_json_text(&output))
    })
}

/// Convert microdata to N-Quads text (not JSON encoded)
///
/// # Safety
/// Same as microdata_to_rdf_ffi
#[no_mangle]
pub unsafe extern "C" fn microdata_to_nquads_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    config_json: *const c_char,
) -> ConversionResultFFI {
    convert(html_ptr, html_len, config_json, |html, config| {
        crate::to_nquads(html, config).map(Ok)
    })
}

/// Free a ConversionResultFFI returned by any conversion function
///
/// # Safety
/// - `result` must have been returned by one of the `microdata_to_*_ffi` functions
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_conversion_result(result: ConversionResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

type Serialized = std::result::Result<String, String>;

unsafe fn convert<F>(
    html_ptr: *const c_char,
    html_len: usize,
    config_json: *const c_char,
    run: F,
) -> ConversionResultFFI
where
    F: FnOnce(&str, &Config) -> Result<Serialized>,
{
    let html = match read_html(html_ptr, html_len) {
        Ok(html) => html,
        Err(msg) => return make_error_result(msg),
    };

    let config = match read_config(config_json) {
        Ok(config) => config,
        Err(msg) => return make_error_result(&msg),
    };

    match run(html, &config) {
        Ok(Ok(text)) => match CString::new(text) {
            Ok(cstr) => ConversionResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result contains null bytes"),
        },
        Ok(Err(msg)) => make_error_result(&msg),
        Err(e) => {
            tracing::debug!(error = %e, "microdata conversion failed");
            make_error_result(&e.to_string())
        }
    }
}

// Borrow the HTML buffer as UTF-8
unsafe fn read_html<'a>(
    html_ptr: *const c_char,
    html_len: usize,
) -> std::result::Result<&'a str, &'static str> {
    if html_ptr.is_null() || html_len == 0 {
        return Ok("");
    }
    let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
    std::str::from_utf8(slice).map_err(|_| "Invalid UTF-8 in HTML")
}

// Null config means defaults
unsafe fn read_config(config_json: *const c_char) -> std::result::Result<Config, String> {
    if config_json.is_null() {
        return Ok(Config::default());
    }
    let config_str = CStr::from_ptr(config_json)
        .to_str()
        .map_err(|_| "Invalid UTF-8 in config JSON".to_string())?;
    Config::from_json(config_str).map_err(|e| e.to_string())
}

fn to_json_text<T: Serialize>(value: &T) -> Serialized {
    serde_json::to_string(value).map_err(|e| format!("Serialize error: {}", e))
}

// Helper to create error result
fn make_error_result(msg: &str) -> ConversionResultFFI {
    let error_cstr = CString::new(msg).unwrap_or_else(|_| c"Unknown error".to_owned());
    ConversionResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}
