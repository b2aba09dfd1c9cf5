// ── Platform bindings ─────────────────────────────────────────────────────────
//
// One sub-module per host-engine embedding, each exporting the same shape:
//   • the native reference types (`FlutterView`, `FlutterBinaryMessenger`,
//     `FlutterTextureRegistrar`),
//   • a `PlatformContext` that binds to the companion plugin's registry
//     accessors and implements `resolver::InstanceLookup`.
//
// All `unsafe` in the crate lives below this module; nothing unsafe leaks
// outward.  Every unsafe block MUST carry a `// SAFETY:` comment stating which
// invariant makes the operation sound.

#[cfg(target_os = "windows")]
pub mod win32;
#[cfg(target_os = "windows")]
pub(crate) use win32 as imp;

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "ios"))]
pub mod posix;
#[cfg(any(target_os = "linux", target_os = "macos", target_os = "ios"))]
pub(crate) use posix as imp;

#[cfg(target_os = "android")]
pub mod android;
#[cfg(target_os = "android")]
pub(crate) use android as imp;
