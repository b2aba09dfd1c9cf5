// ── Android platform binding ──────────────────────────────────────────────────
//
// The companion plugin class keeps the registry of live engines and exposes
// static accessors taking the integer handle:
//
//   static FlutterView     getFlutterView(int)
//   static BinaryMessenger getBinaryMessenger(int)
//   static TextureRegistry getTextureRegistry(int)
//   static Activity        getActivity(int)
//
// Native code reaches the class through the application class loader (the
// JNI-attached loader of a Rust thread cannot see app classes), so the
// binding captures the loader once and calls `loadClass` per resolve.  The
// process JavaVM and application context come from `ndk-context`, which the
// standard Android glue initialises before Dart code runs.
//
// Returned objects are pinned as JNI global refs; the pin keeps the *Java
// wrapper* alive, not the engine — after engine teardown the wrapper is
// defunct and the handle stops resolving.

#![allow(unsafe_code)]

use jni::{
    objects::{GlobalRef, JClass, JObject},
    sys::jint,
    JNIEnv,
};

use crate::error::{EngineContextError, Result};
use crate::resolver::{EngineHandle, InstanceLookup, Resolved};

// ── Native reference types ────────────────────────────────────────────────────

pub type FlutterView = GlobalRef;
pub type FlutterBinaryMessenger = GlobalRef;
pub type FlutterTextureRegistrar = GlobalRef;
pub type Activity = GlobalRef;

/// JVM-internal name of the plugin class holding the engine registry.
const PLUGIN_CLASS: &str = "dev/nativeshell/flutter_engine_context/FlutterEngineContextPlugin";

// ── Platform context ──────────────────────────────────────────────────────────

pub(crate) struct PlatformContext {
    java_vm: jni::JavaVM,
    class_loader: GlobalRef,
}

impl PlatformContext {
    pub(crate) fn new() -> Result<Self> {
        let ctx = ndk_context::android_context();
        // SAFETY: ndk-context stores the process-wide JavaVM pointer set up
        // by the Android glue; it is valid for the life of the process.
        let java_vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }?;
        let env = java_vm.get_env()?;

        // SAFETY: ndk-context stores a live android.content.Context jobject;
        // we only borrow it for the duration of the getClassLoader call.
        let context = unsafe { JObject::from_raw(ctx.context() as jni::sys::jobject) };
        let loader = env
            .call_method(context, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])?
            .l()?;
        if env.is_same_object(loader, JObject::null())? {
            return Err(EngineContextError::MissingClassLoader);
        }
        let class_loader = env.new_global_ref(loader)?;
        log::debug!("engine_context plugin class loader captured");

        Ok(Self {
            java_vm,
            class_loader,
        })
    }

    fn plugin_class<'a>(&'a self, env: &JNIEnv<'a>) -> Result<JClass<'a>> {
        let class = env
            .call_method(
                self.class_loader.as_obj(),
                "loadClass",
                "(Ljava/lang/String;)Ljava/lang/Class;",
                &[env.new_string(PLUGIN_CLASS)?.into()],
            )?
            .l()?;
        Ok(class.into())
    }

    /// Call one static registry accessor, pinning a non-null result.
    fn lookup_object(
        &self,
        handle: EngineHandle,
        method: &str,
        signature: &str,
    ) -> Result<Resolved<GlobalRef>> {
        // Handles wider than jint cannot have been issued by the plugin.
        let id: jint = match handle.0.try_into() {
            Ok(id) => id,
            Err(_) => return Ok(Resolved::HandleNotFound),
        };
        let env = self.java_vm.get_env()?;
        let class = self.plugin_class(&env)?;
        let object = env
            .call_static_method(class, method, signature, &[id.into()])?
            .l()?;
        if env.is_same_object(object, JObject::null())? {
            Ok(Resolved::HandleNotFound)
        } else {
            Ok(Resolved::Found(env.new_global_ref(object)?))
        }
    }

    /// The Android activity hosting the engine.  Android-only extra; the
    /// other platforms have no equivalent concept.
    pub(crate) fn activity(&self, handle: EngineHandle) -> Result<Resolved<Activity>> {
        self.lookup_object(handle, "getActivity", "(I)Landroid/app/Activity;")
    }
}

impl InstanceLookup for PlatformContext {
    type View = FlutterView;
    type Messenger = FlutterBinaryMessenger;
    type TextureRegistrar = FlutterTextureRegistrar;

    fn view(&self, handle: EngineHandle) -> Result<Resolved<FlutterView>> {
        let view = self.lookup_object(
            handle,
            "getFlutterView",
            "(I)Lio/flutter/embedding/android/FlutterView;",
        )?;
        if let Resolved::HandleNotFound = view {
            // A null view is also what a live engine reports before its view
            // is attached.  The messenger exists for the whole engine
            // lifetime; probe it to tell the two apart.
            if self.messenger(handle)?.is_found() {
                return Ok(Resolved::ViewNotAttached);
            }
        }
        Ok(view)
    }

    fn messenger(&self, handle: EngineHandle) -> Result<Resolved<FlutterBinaryMessenger>> {
        self.lookup_object(
            handle,
            "getBinaryMessenger",
            "(I)Lio/flutter/plugin/common/BinaryMessenger;",
        )
    }

    fn texture_registrar(&self, handle: EngineHandle) -> Result<Resolved<FlutterTextureRegistrar>> {
        self.lookup_object(
            handle,
            "getTextureRegistry",
            "(I)Lio/flutter/view/TextureRegistry;",
        )
    }
}
