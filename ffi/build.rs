use std::env;
use std::fs;
use std::path::PathBuf;

/// Regenerate `include/search_ffi.h` from the `extern "C"` surface.
fn main() {
    println!("cargo:rerun-if-changed=src");

    let Ok(crate_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let include_dir = PathBuf::from(&crate_dir).join("include");

    let mut config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("SEARCH_FFI_H".to_string()),
        ..Default::default()
    };
    // Passed as uint32_t, so no function signature pulls these in.
    config.export.include = vec!["FfiLogType".to_string(), "FfiQueryStrategy".to_string()];

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            if let Err(e) = fs::create_dir_all(&include_dir) {
                println!("cargo:warning=cannot create {}: {e}", include_dir.display());
                return;
            }
            bindings.write_to_file(include_dir.join("search_ffi.h"));
        }
        Err(e) => println!("cargo:warning=header generation skipped: {e}"),
    }
}
