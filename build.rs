//! Generates raw FFI bindings to the trimmed libunwind-ptrace surface in
//! `include/unwind_shim.h`, the same way the teacher generates kernel
//! struct bindings with bindgen rather than hand-maintaining them.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=include/unwind_shim.h");

    println!("cargo:rustc-link-lib=dylib=unwind");
    println!("cargo:rustc-link-lib=dylib=unwind-ptrace");
    let arch_lib = match env::var("CARGO_CFG_TARGET_ARCH").as_deref() {
        Ok("x86_64") => "unwind-x86_64",
        Ok("aarch64") => "unwind-aarch64",
        Ok("x86") => "unwind-x86",
        Ok(other) => panic!("unsupported target arch for libunwind-ptrace: {}", other),
        Err(_) => "unwind-x86_64",
    };
    println!("cargo:rustc-link-lib=dylib={}", arch_lib);

    let bindings = bindgen::Builder::default()
        .header("include/unwind_shim.h")
        .allowlist_function("unw_.*")
        .allowlist_function("_UPT_.*")
        .allowlist_var("UNW_.*")
        .generate()
        .expect("unable to generate libunwind-ptrace bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("unwind_bindings.rs"))
        .expect("couldn't write unwind_bindings.rs");
}
