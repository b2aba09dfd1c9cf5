// ── Linux / Darwin platform binding ───────────────────────────────────────────
//
// The companion plugin exports the same three C accessors on every dlopen
// platform (flutter_engine_context_plugin.h, default visibility):
//
//   FlView *            FlutterEngineContextGetFlutterView(int64_t)
//   FlBinaryMessenger * FlutterEngineContextGetBinaryMessenger(int64_t)
//   FlTextureRegistrar *FlutterEngineContextGetTextureRegistrar(int64_t)
//
// (On macOS/iOS the returned pointers are the Objective-C counterparts:
// FlutterView, FlutterBinaryMessenger, FlutterTextureRegistry.)  The plugin
// shared object is loaded into this process by the engine's plugin registrant
// before any native code runs, so the exports are resolvable through
// `dlsym(RTLD_DEFAULT)` without naming the library.

#![allow(unsafe_code)]

use std::ffi::{c_char, c_void, CString};

use crate::error::{EngineContextError, Result};
use crate::resolver::{EngineHandle, InstanceLookup, Resolved};

// ── Native reference types ────────────────────────────────────────────────────

/// The native view: `FlView*` on Linux, the `FlutterView` Objective-C object
/// on macOS/iOS.  Non-owning; valid only while the engine instance is alive.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlutterView(*mut c_void);

/// `FlBinaryMessenger*` on Linux, the `FlutterBinaryMessenger` object on
/// macOS/iOS.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlutterBinaryMessenger(*mut c_void);

/// `FlTextureRegistrar*` on Linux, the `FlutterTextureRegistry` object on
/// macOS/iOS.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlutterTextureRegistrar(*mut c_void);

impl FlutterView {
    /// The raw engine-owned pointer, for passing back into platform code.
    pub fn raw(&self) -> *mut c_void {
        self.0
    }
}

impl FlutterBinaryMessenger {
    /// The raw engine-owned pointer, for passing back into platform code.
    pub fn raw(&self) -> *mut c_void {
        self.0
    }
}

impl FlutterTextureRegistrar {
    /// The raw engine-owned pointer, for passing back into platform code.
    pub fn raw(&self) -> *mut c_void {
        self.0
    }
}

// ── Plugin exports ────────────────────────────────────────────────────────────

const GET_VIEW: &str = "FlutterEngineContextGetFlutterView";
const GET_MESSENGER: &str = "FlutterEngineContextGetBinaryMessenger";
const GET_TEXTURE_REGISTRAR: &str = "FlutterEngineContextGetTextureRegistrar";

type GetRefFn = unsafe extern "C" fn(i64) -> *mut c_void;

extern "C" {
    fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
}

/// `RTLD_DEFAULT`: search every object already loaded into the process.
#[cfg(target_os = "linux")]
const RTLD_DEFAULT: *mut c_void = std::ptr::null_mut();
#[cfg(any(target_os = "macos", target_os = "ios"))]
const RTLD_DEFAULT: *mut c_void = -2isize as *mut c_void;

/// Resolve one plugin export in the global symbol scope.
fn require_symbol(name: &'static str) -> Result<GetRefFn> {
    // Plugin export names are ASCII; CString only fails on interior nuls.
    let name_z =
        CString::new(name).map_err(|_| EngineContextError::PluginNotLoaded { symbol: name })?;
    // SAFETY: RTLD_DEFAULT is a valid pseudo-handle and `name_z` is a valid
    // nul-terminated C string that outlives the call.
    let addr = unsafe { dlsym(RTLD_DEFAULT, name_z.as_ptr()) };
    if addr.is_null() {
        return Err(EngineContextError::PluginNotLoaded { symbol: name });
    }
    // SAFETY: the address was resolved from the plugin export named by the
    // C declaration in the plugin header, so it has that exact signature.
    Ok(unsafe { std::mem::transmute::<*mut c_void, GetRefFn>(addr) })
}

// ── Platform context ──────────────────────────────────────────────────────────

pub(crate) struct PlatformContext {
    get_view: GetRefFn,
    get_messenger: GetRefFn,
    get_texture_registrar: GetRefFn,
}

impl PlatformContext {
    pub(crate) fn new() -> Result<Self> {
        let context = Self {
            get_view: require_symbol(GET_VIEW)?,
            get_messenger: require_symbol(GET_MESSENGER)?,
            get_texture_registrar: require_symbol(GET_TEXTURE_REGISTRAR)?,
        };
        log::debug!("engine_context plugin exports resolved via dlsym");
        Ok(context)
    }

    fn messenger_ptr(&self, handle: EngineHandle) -> *mut c_void {
        // SAFETY: the pointer was resolved against the matching C signature in
        // `require_symbol`; the plugin accessor is a pure registry read, safe
        // to call with any i64.
        unsafe { (self.get_messenger)(handle.0) }
    }
}

impl InstanceLookup for PlatformContext {
    type View = FlutterView;
    type Messenger = FlutterBinaryMessenger;
    type TextureRegistrar = FlutterTextureRegistrar;

    fn view(&self, handle: EngineHandle) -> Result<Resolved<FlutterView>> {
        // SAFETY: see `messenger_ptr`.
        let ptr = unsafe { (self.get_view)(handle.0) };
        if ptr.is_null() {
            // Null both for unknown handles and for live engines whose view
            // is not attached yet.  The messenger exists for the whole engine
            // lifetime; probe it to tell the two apart.
            return Ok(if self.messenger_ptr(handle).is_null() {
                Resolved::HandleNotFound
            } else {
                Resolved::ViewNotAttached
            });
        }
        Ok(Resolved::Found(FlutterView(ptr)))
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
