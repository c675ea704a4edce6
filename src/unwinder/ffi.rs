//! Raw bindgen-generated bindings to the trimmed libunwind-ptrace surface.
//! Nothing in this module is safe to call directly outside of
//! `unwinder::{address_space, unwind_info, cursor}`, which pair each call
//! with the invariants the C API expects (non-null handles, cursor
//! initialized before stepping, etc).

#![allow(non_camel_case_types)]
#![allow(dead_code)]

include!(concat!(env!("OUT_DIR"), "/unwind_bindings.rs"));
