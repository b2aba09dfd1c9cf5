/// engine-context build script.
///
/// Sole role: validate that the host targets a platform the resolver has a
/// binding for. Fail loudly at build time rather than silently producing a
/// crate whose every call errors at runtime.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    match target_os.as_str() {
        "windows" | "linux" | "macos" | "ios" | "android" => {}
        other => panic!(
            "engine-context has no platform binding for \
             CARGO_CFG_TARGET_OS = {other:?}"
        ),
    }

    // Only re-run the build script when it changes.
    println!("cargo:rerun-if-changed=build.rs");
}
