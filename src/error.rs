// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in engine-context return `error::Result<T>`.  No
// panics in production paths; absence of an engine instance is an ordinary
// error value, never an assertion.

use crate::resolver::EngineHandle;

/// Every error that engine-context can produce.
#[derive(Debug)]
pub enum EngineContextError {
    /// The handle does not currently identify a live engine instance —
    /// either it was never registered or the engine has been torn down.
    HandleNotFound(EngineHandle),

    /// The engine instance exists but no view is attached to it yet.
    ///
    /// This is a transient state during engine startup; retrying after the
    /// view is attached will succeed. Distinct from [`HandleNotFound`]:
    /// the messenger and texture registrar are already resolvable.
    ///
    /// [`HandleNotFound`]: EngineContextError::HandleNotFound
    ViewNotAttached(EngineHandle),

    /// A companion-plugin symbol could not be resolved in this process.
    ///
    /// Almost always means the application does not link the engine_context
    /// plugin (it is missing from the pubspec, or the binding was set up
    /// before the plugin registrar ran).
    PluginNotLoaded {
        /// The symbol whose lookup failed, for display purposes.
        symbol: &'static str,
    },

    /// A Win32 API call returned a failure code.
    #[cfg(target_os = "windows")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// A JNI call into the companion plugin class failed.
    #[cfg(target_os = "android")]
    Jni(jni::errors::Error),

    /// The application class loader could not be obtained, so the plugin
    /// class cannot be looked up from native code.
    #[cfg(target_os = "android")]
    MissingClassLoader,
}

impl std::fmt::Display for EngineContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HandleNotFound(handle) => {
                write!(f, "engine handle {handle} does not identify a live engine instance")
            }
            Self::ViewNotAttached(handle) => {
                write!(f, "engine {handle} has no view attached yet")
            }
            Self::PluginNotLoaded { symbol } => {
                write!(
                    f,
                    "plugin symbol `{symbol}` not found in this process \
                     (is the engine_context plugin linked into the application?)"
                )
            }
            #[cfg(target_os = "windows")]
            Self::Win32 { function, code } => {
                write!(f, "{function} failed (error {code:#010x})")
            }
            #[cfg(target_os = "android")]
            Self::Jni(e) => write!(f, "JNI error: {e}"),
            #[cfg(target_os = "android")]
            Self::MissingClassLoader => write!(f, "missing application class loader"),
        }
    }
}

impl std::error::Error for EngineContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(target_os = "android")]
            Self::Jni(e) => Some(e),
            _ => None,
        }
    }
}

// Convert a windows-crate error (HRESULT) directly into an EngineContextError
// so that `?` can be used on `windows::core::Result<T>` in the platform module.
#[cfg(target_os = "windows")]
impl From<windows::core::Error> for EngineContextError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

#[cfg(target_os = "android")]
impl From<jni::errors::Error> for EngineContextError {
    fn from(e: jni::errors::Error) -> Self {
        Self::Jni(e)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineContextError>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_not_found_names_the_handle() {
        let msg = EngineContextError::HandleNotFound(EngineHandle(42)).to_string();
        assert!(msg.contains("42"), "{msg}");
        assert!(msg.contains("live engine instance"), "{msg}");
    }

    #[test]
    fn view_not_attached_is_distinct_from_not_found() {
        let not_found = EngineContextError::HandleNotFound(EngineHandle(7)).to_string();
        let detached = EngineContextError::ViewNotAttached(EngineHandle(7)).to_string();
        assert_ne!(not_found, detached);
        assert!(detached.contains("no view attached"), "{detached}");
    }

    #[test]
    fn plugin_not_loaded_names_the_symbol() {
        let msg = EngineContextError::PluginNotLoaded {
            symbol: "FlutterEngineContextGetFlutterView",
        }
        .to_string();
        assert!(msg.contains("FlutterEngineContextGetFlutterView"), "{msg}");
    }
}
