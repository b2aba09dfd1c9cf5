//! Resolve engine-owned handles from native Rust code inside a Flutter app.
//!
//! The Dart side of the companion `engine_context` plugin registers every
//! running engine instance under an opaque integer handle and hands that
//! handle to native code.  This crate is the native side: given a handle, it
//! looks the instance up in the plugin's registry and returns the engine's
//! view, binary messenger, or texture registrar in that platform's native
//! representation.
//!
//! All returned references are non-owning.  They stay valid only while the
//! engine instance is alive; resolving a handle after engine teardown yields
//! [`EngineContextError::HandleNotFound`].
//!
//! ```no_run
//! use engine_context::EngineContext;
//!
//! # fn demo(handle: i64) -> engine_context::Result<()> {
//! let context = EngineContext::new()?;
//! let view = context.view(handle)?;
//! let messenger = context.messenger(handle)?;
//! # let _ = (view, messenger);
//! # Ok(())
//! # }
//! ```

// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except the `platform::*` bindings,
// which carry the FFI to the companion plugin's registry accessors.
// Each unsafe block there MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

mod error;
mod platform;
mod resolver;

pub use error::{EngineContextError, Result};
pub use resolver::{EngineHandle, InstanceLookup, Resolved};

use std::{cell::Cell, marker::PhantomData, sync::MutexGuard};

/// The engine's native view: `HWND` on Windows, `FlView*` on Linux, the
/// `FlutterView` object on macOS/iOS and Android.
pub type FlutterView = platform::imp::FlutterView;

/// The engine's byte-oriented platform-channel transport.
pub type FlutterBinaryMessenger = platform::imp::FlutterBinaryMessenger;

/// The engine's registry for externally rendered textures.
pub type FlutterTextureRegistrar = platform::imp::FlutterTextureRegistrar;

/// The Android activity hosting the engine.
#[cfg(target_os = "android")]
pub type Activity = platform::android::Activity;

// EngineContext must stay on the thread that created it (conventionally the
// platform thread): the JNI env and the engine accessors are thread-affine.
type PhantomUnsync = PhantomData<Cell<()>>;
type PhantomUnsend = PhantomData<MutexGuard<'static, ()>>;

/// Entry point for handle resolution.
///
/// `new` binds to the companion plugin once (symbol or class lookup); each
/// resolve call after that is a single read of the plugin's registry of live
/// engines.  The context is deliberately `!Send + !Sync` — create it on the
/// platform thread and keep it there.
pub struct EngineContext {
    platform: platform::imp::PlatformContext,
    _unsync: PhantomUnsync,
    _unsend: PhantomUnsend,
}

impl EngineContext {
    /// Bind to the companion plugin in this process.
    ///
    /// Fails with [`EngineContextError::PluginNotLoaded`] (or the platform's
    /// equivalent) when the application does not link the plugin.  Must be
    /// called on the platform thread.
    pub fn new() -> Result<Self> {
        Ok(Self {
            platform: platform::imp::PlatformContext::new()?,
            _unsync: PhantomData,
            _unsend: PhantomData,
        })
    }

    /// The native view the engine renders into.
    ///
    /// Errors with [`EngineContextError::ViewNotAttached`] when the engine is
    /// live but has no view yet (a transient startup state) and
    /// [`EngineContextError::HandleNotFound`] when the handle does not
    /// identify a live engine.
    pub fn view(&self, handle: impl Into<EngineHandle>) -> Result<FlutterView> {
        let handle = handle.into();
        log::trace!("resolving view for engine {handle}");
        self.platform.view(handle)?.into_result(handle)
    }

    /// The engine's binary messenger.
    pub fn messenger(&self, handle: impl Into<EngineHandle>) -> Result<FlutterBinaryMessenger> {
        let handle = handle.into();
        log::trace!("resolving messenger for engine {handle}");
        self.platform.messenger(handle)?.into_result(handle)
    }

    /// The engine's texture registrar.
    pub fn texture_registrar(
        &self,
        handle: impl Into<EngineHandle>,
    ) -> Result<FlutterTextureRegistrar> {
        let handle = handle.into();
        log::trace!("resolving texture registrar for engine {handle}");
        self.platform.texture_registrar(handle)?.into_result(handle)
    }

    /// The activity hosting the engine.  Android only.
    #[cfg(target_os = "android")]
    pub fn activity(&self, handle: impl Into<EngineHandle>) -> Result<Activity> {
        let handle = handle.into();
        log::trace!("resolving activity for engine {handle}");
        self.platform.activity(handle)?.into_result(handle)
    }
}
