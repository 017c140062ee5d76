//! FFI interface for embedding hosts
//!
//! Provides C-compatible functions for extracting products from HTML.
//! Results cross the boundary as JSON strings.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::export::to_pretty_json;
use crate::host::{invoke, PageContext};

/// Result struct returned to the host
/// Both pointers are owned by Rust and must be freed via free_product_result
#[repr(C)]
pub struct ProductResultFFI {
    /// JSON array of products (null-terminated), or null on failure
    pub json_ptr: *mut c_char,
    /// Error message (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Extract products from the active page's HTML.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `page_url` - Page URL (null-terminated), or null when unknown
/// * `config_json` - Partial ExtractorConfig as JSON (null-terminated), or null for defaults
///
/// # Returns
/// ProductResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `html_ptr` must be null or point to valid memory of at least `html_len` bytes
/// - `page_url` and `config_json` must be null or valid null-terminated C strings
/// - Caller must free the result via `free_product_result`
#[no_mangle]
pub unsafe extern "C" fn extract_products_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    page_url: *const c_char,
    config_json: *const c_char,
) -> ProductResultFFI {
    match run_extraction(html_ptr, html_len, page_url, config_json) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ProductResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&e.to_string()),
    }
}

/// Free a ProductResultFFI returned by extract_products_ffi
///
/// # Safety
/// - `result` must have been returned by `extract_products_ffi`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_product_result(result: ProductResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

unsafe fn run_extraction(
    html_ptr: *const c_char,
    html_len: usize,
    page_url: *const c_char,
    config_json: *const c_char,
) -> Result<String> {
    // A null page means the host has nothing loaded
    let html = if html_ptr.is_null() {
        None
    } else {
        let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
        let text = std::str::from_utf8(slice)
            .map_err(|_| ExtractError::InvalidDocument("invalid UTF-8 in HTML content".into()))?;
        Some(text.to_string())
    };

    let url = optional_str(page_url, "page URL")?.map(String::from);

    let config = match optional_str(config_json, "config JSON")? {
        Some(json) => ExtractorConfig::from_json(json)?,
        None => ExtractorConfig::default(),
    };

    let products = invoke(&PageContext { url, html }, &config)?;
    to_pretty_json(&products)
}

unsafe fn optional_str<'a>(ptr: *const c_char, what: &str) -> Result<Option<&'a str>> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(Some)
        .map_err(|_| ExtractError::InvalidDocument(format!("invalid UTF-8 in {}", what)))
}

// Helper to create error result
fn make_error_result(msg: &str) -> ProductResultFFI {
    let sanitized = msg.replace('\0', " ");
    let error_ptr = match CString::new(sanitized) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    };
    ProductResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(result: ProductResultFFI) -> (Option<String>, Option<String>) {
        let read = |ptr: *mut c_char| {
            if ptr.is_null() {
                return None;
            }
            let cstr = unsafe { CStr::from_ptr(ptr) };
            Some(cstr.to_string_lossy().into_owned())
        };
        let json = read(result.json_ptr);
        let error = read(result.error_ptr);
        unsafe { free_product_result(result) };
        (json, error)
    }

    #[test]
    fn test_ffi_extracts_products() {
        let html = r#"<div class="product-information"><h3 class="cmp-title__text">Coke</h3></div>"#;
        let url = CString::new("https://www.coca-cola.com/vn").unwrap();

        let result = unsafe {
            extract_products_ffi(
                html.as_ptr() as *const c_char,
                html.len(),
                url.as_ptr(),
                ptr::null(),
            )
        };
        let (json, error) = take(result);

        assert!(error.is_none());
        let products: serde_json::Value = serde_json::from_str(&json.unwrap()).unwrap();
        assert_eq!(products[0]["product_name"], "Coke");
    }

    #[test]
    fn test_ffi_restricted_page_error() {
        let html = "<html></html>";
        let url = CString::new("chrome://newtab").unwrap();

        let result = unsafe {
            extract_products_ffi(
                html.as_ptr() as *const c_char,
                html.len(),
                url.as_ptr(),
                ptr::null(),
            )
        };
        let (json, error) = take(result);

        assert!(json.is_none());
        assert!(error.unwrap().contains("restricted"));
    }

    #[test]
    fn test_ffi_null_html_is_no_active_page() {
        let result = unsafe { extract_products_ffi(ptr::null(), 0, ptr::null(), ptr::null()) };
        let (_, error) = take(result);
        assert_eq!(error.unwrap(), "no active page to extract from");
    }

    #[test]
    fn test_ffi_bad_config() {
        let html = "<html></html>";
        let config = CString::new("{broken").unwrap();

        let result = unsafe {
            extract_products_ffi(
                html.as_ptr() as *const c_char,
                html.len(),
                ptr::null(),
                config.as_ptr(),
            )
        };
        let (_, error) = take(result);
        assert!(error.unwrap().starts_with("configuration error"));
    }
}
