//! Foundation bridging for the native store backends
//!
//! Objects are handled as raw `*mut AnyObject`. Callers wrap each store call
//! in `objc2::rc::autoreleasepool`, which owns every autoreleased value
//! returned here.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use chrono::NaiveDateTime;
use objc2::runtime::AnyObject;
use objc2::{class, msg_send};

use crate::datetime::{local_to_timestamp, timestamp_to_local};

pub fn nsstring_to_string(value: *mut AnyObject) -> Option<String> {
    if value.is_null() {
        return None;
    }
    let cstr: *const c_char = unsafe { msg_send![value, UTF8String] };
    if cstr.is_null() {
        return None;
    }
    let value = unsafe { CStr::from_ptr(cstr) };
    Some(value.to_string_lossy().to_string())
}

/// Like [`nsstring_to_string`] but maps empty strings to `None`.
pub fn nsstring_to_optional(value: *mut AnyObject) -> Option<String> {
    nsstring_to_string(value).filter(|s| !s.is_empty())
}

pub fn string_to_nsstring(value: &str) -> *mut AnyObject {
    let cstring = CString::new(value).unwrap_or_default();
    unsafe { msg_send![class!(NSString), stringWithUTF8String: cstring.as_ptr()] }
}

pub fn nsdate_from_local(value: &NaiveDateTime) -> *mut AnyObject {
    let seconds = local_to_timestamp(value);
    unsafe { msg_send![class!(NSDate), dateWithTimeIntervalSince1970: seconds] }
}

pub fn nsdate_to_local(value: *mut AnyObject) -> Option<NaiveDateTime> {
    if value.is_null() {
        return None;
    }
    let seconds: f64 = unsafe { msg_send![value, timeIntervalSince1970] };
    timestamp_to_local(seconds)
}

pub fn nsurl_from_string(value: &str) -> *mut AnyObject {
    let string = string_to_nsstring(value);
    unsafe { msg_send![class!(NSURL), URLWithString: string] }
}

pub fn nsurl_to_string(value: *mut AnyObject) -> Option<String> {
    if value.is_null() {
        return None;
    }
    nsstring_to_string(unsafe { msg_send![value, absoluteString] })
}

/// Elements of an `NSArray`; empty for nil.
pub fn nsarray_items(array: *mut AnyObject) -> Vec<*mut AnyObject> {
    if array.is_null() {
        return Vec::new();
    }
    let count: usize = unsafe { msg_send![array, count] };
    (0..count)
        .map(|index| unsafe { msg_send![array, objectAtIndex: index] })
        .filter(|item: &*mut AnyObject| !item.is_null())
        .collect()
}

pub fn nsarray_from(items: &[*mut AnyObject]) -> *mut AnyObject {
    let array: *mut AnyObject = unsafe { msg_send![class!(NSMutableArray), array] };
    for item in items.iter().filter(|item| !item.is_null()) {
        let _: () = unsafe { msg_send![array, addObject: *item] };
    }
    array
}

/// `localizedDescription` of an `NSError`, or `fallback` for nil.
pub fn nserror_message(error: *mut AnyObject, fallback: &str) -> String {
    if error.is_null() {
        return fallback.to_string();
    }
    nsstring_to_string(unsafe { msg_send![error, localizedDescription] })
        .unwrap_or_else(|| fallback.to_string())
}
