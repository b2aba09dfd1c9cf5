// ── Win32 platform binding ────────────────────────────────────────────────────
//
// The companion plugin exports three C accessors from the Windows embedding
// (flutter_engine_context_plugin_c_api.cpp):
//
//   size_t                            FlutterEngineContextGetFlutterView(int64_t)
//   FlutterDesktopMessengerRef        FlutterEngineContextGetBinaryMessenger(int64_t)
//   FlutterDesktopTextureRegistrarRef FlutterEngineContextGetTextureRegistrar(int64_t)
//
// Depending on how the runner was built, those exports live either in the
// runner executable itself (plugins statically linked) or in the plugin's own
// DLL.  `PlatformContext::new` probes both once and caches the function
// pointers; each resolve call is then a single C call into the plugin's
// registry, which returns null/0 for handles it does not know.

#![allow(unsafe_code)]

use std::ffi::{c_void, CString};

use windows::{
    core::{w, PCSTR},
    Win32::Foundation::{HMODULE, HWND},
    Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress},
};

use crate::error::{EngineContextError, Result};
use crate::resolver::{EngineHandle, InstanceLookup, Resolved};

// ── Native reference types ────────────────────────────────────────────────────

/// The native view: an `HWND` hosting the engine's render surface.
pub type FlutterView = HWND;

/// Opaque `FlutterDesktopMessengerRef` from the Windows embedder API.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlutterBinaryMessenger(*mut c_void);

/// Opaque `FlutterDesktopTextureRegistrarRef` from the Windows embedder API.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlutterTextureRegistrar(*mut c_void);

impl FlutterBinaryMessenger {
    /// The raw embedder-API pointer, for passing back into C.
    pub fn raw(&self) -> *mut c_void {
        self.0
    }
}

impl FlutterTextureRegistrar {
    /// The raw embedder-API pointer, for passing back into C.
    pub fn raw(&self) -> *mut c_void {
        self.0
    }
}

// ── Plugin exports ────────────────────────────────────────────────────────────

const GET_VIEW: &str = "FlutterEngineContextGetFlutterView";
const GET_MESSENGER: &str = "FlutterEngineContextGetBinaryMessenger";
const GET_TEXTURE_REGISTRAR: &str = "FlutterEngineContextGetTextureRegistrar";

// Signatures of the plugin exports above.  The view accessor returns the HWND
// widened to size_t; the other two return embedder-API pointers.
type GetViewFn = unsafe extern "C" fn(i64) -> usize;
type GetPtrFn = unsafe extern "C" fn(i64) -> *mut c_void;

/// Locate the module that carries the plugin exports: the runner executable
/// first (statically linked plugins), then the plugin DLL.
fn plugin_module() -> Result<HMODULE> {
    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // valid for the process lifetime and never fails in practice.
    let exe = unsafe { GetModuleHandleW(None) }.map_err(EngineContextError::from)?;
    if raw_symbol(exe, GET_VIEW)?.is_some() {
        return Ok(exe);
    }

    // SAFETY: GetModuleHandleW with a name only queries the loader's table of
    // already-loaded modules; it takes no ownership and loads nothing.
    unsafe { GetModuleHandleW(w!("flutter_engine_context_plugin.dll")) }
        .map_err(|_| EngineContextError::PluginNotLoaded { symbol: GET_VIEW })
}

/// `GetProcAddress` with a Rust string name.  `Ok(None)` means the module is
/// valid but does not carry the export.
fn raw_symbol(
    module: HMODULE,
    name: &'static str,
) -> Result<Option<unsafe extern "system" fn() -> isize>> {
    // Plugin export names are ASCII; CString only fails on interior nuls.
    let name_z = CString::new(name)
        .map_err(|_| EngineContextError::PluginNotLoaded { symbol: name })?;
    // SAFETY: `module` is a live HMODULE and `name_z` is a valid
    // nul-terminated C string that outlives the call.
    Ok(unsafe { GetProcAddress(module, PCSTR(name_z.as_ptr() as *const u8)) })
}

/// Resolve one plugin export or fail with `PluginNotLoaded`.
fn require_symbol(
    module: HMODULE,
    name: &'static str,
) -> Result<unsafe extern "system" fn() -> isize> {
    raw_symbol(module, name)?.ok_or(EngineContextError::PluginNotLoaded { symbol: name })
}

// ── Platform context ──────────────────────────────────────────────────────────

pub(crate) struct PlatformContext {
    get_view: GetViewFn,
    get_messenger: GetPtrFn,
    get_texture_registrar: GetPtrFn,
}

impl PlatformContext {
    pub(crate) fn new() -> Result<Self> {
        let module = plugin_module()?;
        log::debug!("engine_context plugin exports found in module {:?}", module.0);

        let get_view = require_symbol(module, GET_VIEW)?;
        let get_messenger = require_symbol(module, GET_MESSENGER)?;
        let get_texture_registrar = require_symbol(module, GET_TEXTURE_REGISTRAR)?;

        // SAFETY: each pointer was resolved from the plugin export named by
        // the corresponding C declaration above, so it has that exact
        // signature.  Casting FARPROC to the typed form is the documented
        // GetProcAddress usage pattern.
        unsafe {
            Ok(Self {
                get_view: std::mem::transmute::<_, GetViewFn>(get_view),
                get_messenger: std::mem::transmute::<_, GetPtrFn>(get_messenger),
                get_texture_registrar: std::mem::transmute::<_, GetPtrFn>(get_texture_registrar),
            })
        }
    }

    fn messenger_ptr(&self, handle: EngineHandle) -> *mut c_void {
        // SAFETY: the pointer was resolved against the matching C signature in
        // `new`; the plugin accessor is a pure registry read, safe to call
        // with any i64.
        unsafe { (self.get_messenger)(handle.0) }
    }
}

impl InstanceLookup for PlatformContext {
    type View = FlutterView;
    type Messenger = FlutterBinaryMessenger;
    type TextureRegistrar = FlutterTextureRegistrar;

    fn view(&self, handle: EngineHandle) -> Result<Resolved<FlutterView>> {
        // SAFETY: see `messenger_ptr`.
        let raw = unsafe { (self.get_view)(handle.0) };
        if raw == 0 {
            // The accessor returns 0 both for unknown handles and for live
            // engines whose view is not attached yet.  Probe the messenger,
            // which exists for the whole engine lifetime, to tell them apart.
            return Ok(if self.messenger_ptr(handle).is_null() {
                Resolved::HandleNotFound
            } else {
                Resolved::ViewNotAttached
            });
        }
        Ok(Resolved::Found(HWND(raw as *mut c_void)))
    }

    fn messenger(&self, handle: EngineHandle) -> Result<Resolved<FlutterBinaryMessenger>> {
        let ptr = self.messenger_ptr(handle);
        Ok(if ptr.is_null() {
            Resolved::HandleNotFound
        } else {
            Resolved::Found(FlutterBinaryMessenger(ptr))
        })
    }

    fn texture_registrar(&self, handle: EngineHandle) -> Result<Resolved<FlutterTextureRegistrar>> {
        // SAFETY: see `messenger_ptr`.
        let ptr = unsafe { (self.get_texture_registrar)(handle.0) };
        Ok(if ptr.is_null() {
            Resolved::HandleNotFound
        } else {
            Resolved::Found(FlutterTextureRegistrar(ptr))
        })
    }
}
