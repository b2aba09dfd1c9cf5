// ── Handle resolution core ────────────────────────────────────────────────────
//
// Platform-independent half of the resolver: the handle newtype, the tagged
// lookup result, and the `InstanceLookup` capability that each platform
// binding implements.  The registry of live engines is owned by the companion
// plugin on the Dart/platform side; this module only models the *query* side
// of it, which is what lets tests substitute a fake registry.

use crate::error::{EngineContextError, Result};

// ── Engine handle ─────────────────────────────────────────────────────────────

/// Opaque identifier for one running engine instance.
///
/// Issued by the companion plugin when the engine is registered (the Dart side
/// hands it to native code, typically through a platform channel or FFI call).
/// The handle is only meaningful while that engine is alive; resolving a
/// handle after engine teardown yields [`EngineContextError::HandleNotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle(pub i64);

impl std::fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EngineHandle {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<EngineHandle> for i64 {
    fn from(handle: EngineHandle) -> Self {
        handle.0
    }
}

// ── Lookup result ─────────────────────────────────────────────────────────────

/// Outcome of one registry query.
///
/// Each platform binding translates its native absence convention (null
/// pointer, null jobject) into one of the two absence tags; the public API
/// then turns the tag into the matching [`EngineContextError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<T> {
    /// The instance is live and the requested reference was extracted.
    Found(T),
    /// No live engine instance is registered under the queried handle.
    HandleNotFound,
    /// The instance is live but its view has not been attached yet.
    /// Only `view` queries produce this tag.
    ViewNotAttached,
}

impl<T> Resolved<T> {
    /// Convert the tag into the crate error type, naming the queried handle.
    pub fn into_result(self, handle: EngineHandle) -> Result<T> {
        match self {
            Self::Found(value) => Ok(value),
            Self::HandleNotFound => Err(EngineContextError::HandleNotFound(handle)),
            Self::ViewNotAttached => Err(EngineContextError::ViewNotAttached(handle)),
        }
    }

    /// True if the query found a live instance with the requested reference.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

// ── Instance lookup capability ────────────────────────────────────────────────

/// Read-only view of the host's registry of live engine instances.
///
/// The registry itself lives in the companion plugin and is mutated only by
/// the host (engine registration and teardown); implementations of this trait
/// poll it at call time and never cache liveness.  Every operation is a pure
/// read: idempotent, free of side effects, and independent of the others.
///
/// The outer `Result` carries platform transport failures (a JNI call that
/// throws, a plugin export that vanished); absence of the engine instance
/// itself is always reported through the [`Resolved`] tag, never the error.
pub trait InstanceLookup {
    type View;
    type Messenger;
    type TextureRegistrar;

    /// The native view/surface the engine renders into.
    fn view(&self, handle: EngineHandle) -> Result<Resolved<Self::View>>;

    /// The engine's byte-oriented platform-channel transport.
    fn messenger(&self, handle: EngineHandle) -> Result<Resolved<Self::Messenger>>;

    /// The engine's registry for externally rendered textures.
    fn texture_registrar(&self, handle: EngineHandle) -> Result<Resolved<Self::TextureRegistrar>>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory stand-in for the plugin-side registry.
    struct FakeEngine {
        // None models the startup window where the engine exists but no
        // view has been attached to it yet.
        view: Option<&'static str>,
        messenger: &'static str,
        registrar: &'static str,
    }

    #[derive(Default)]
    struct FakeLookup {
        engines: HashMap<i64, FakeEngine>,
    }

    impl FakeLookup {
        fn register(&mut self, handle: i64, view: Option<&'static str>) {
            self.engines.insert(
                handle,
                FakeEngine {
                    view,
                    messenger: "messenger",
                    registrar: "registrar",
                },
            );
        }

        fn tear_down(&mut self, handle: i64) {
            self.engines.remove(&handle);
        }
    }

    impl InstanceLookup for FakeLookup {
        type View = &'static str;
        type Messenger = &'static str;
        type TextureRegistrar = &'static str;

        fn view(&self, handle: EngineHandle) -> Result<Resolved<&'static str>> {
            Ok(match self.engines.get(&handle.0) {
                Some(engine) => match engine.view {
                    Some(view) => Resolved::Found(view),
                    None => Resolved::ViewNotAttached,
                },
                None => Resolved::HandleNotFound,
            })
        }

        fn messenger(&self, handle: EngineHandle) -> Result<Resolved<&'static str>> {
            Ok(match self.engines.get(&handle.0) {
                Some(engine) => Resolved::Found(engine.messenger),
                None => Resolved::HandleNotFound,
            })
        }

        fn texture_registrar(&self, handle: EngineHandle) -> Result<Resolved<&'static str>> {
            Ok(match self.engines.get(&handle.0) {
                Some(engine) => Resolved::Found(engine.registrar),
                None => Resolved::HandleNotFound,
            })
        }
    }

    #[test]
    fn live_handle_resolves_all_three_subsystems() {
        let mut lookup = FakeLookup::default();
        lookup.register(42, Some("view"));

        assert_eq!(lookup.view(EngineHandle(42)).unwrap(), Resolved::Found("view"));
        assert_eq!(
            lookup.messenger(EngineHandle(42)).unwrap(),
            Resolved::Found("messenger")
        );
        assert_eq!(
            lookup.texture_registrar(EngineHandle(42)).unwrap(),
            Resolved::Found("registrar")
        );
    }

    #[test]
    fn unknown_handles_are_absent() {
        let mut lookup = FakeLookup::default();
        lookup.register(42, Some("view"));

        for raw in [99, 0, -1] {
            let handle = EngineHandle(raw);
            assert_eq!(lookup.view(handle).unwrap(), Resolved::HandleNotFound);
            assert_eq!(lookup.messenger(handle).unwrap(), Resolved::HandleNotFound);
            assert_eq!(
                lookup.texture_registrar(handle).unwrap(),
                Resolved::HandleNotFound
            );
        }
    }

    #[test]
    fn torn_down_handle_becomes_absent() {
        let mut lookup = FakeLookup::default();
        lookup.register(42, Some("view"));
        assert!(lookup.view(EngineHandle(42)).unwrap().is_found());

        lookup.tear_down(42);
        assert_eq!(lookup.view(EngineHandle(42)).unwrap(), Resolved::HandleNotFound);
        assert_eq!(
            lookup.messenger(EngineHandle(42)).unwrap(),
            Resolved::HandleNotFound
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut lookup = FakeLookup::default();
        lookup.register(42, Some("view"));

        let first = lookup.view(EngineHandle(42)).unwrap();
        let second = lookup.view(EngineHandle(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn operations_are_independent() {
        let mut lookup = FakeLookup::default();
        lookup.register(42, Some("view"));

        // Interleave the other two operations; the view result must not move.
        let before = lookup.view(EngineHandle(42)).unwrap();
        let _ = lookup.messenger(EngineHandle(42)).unwrap();
        let _ = lookup.texture_registrar(EngineHandle(42)).unwrap();
        assert_eq!(lookup.view(EngineHandle(42)).unwrap(), before);
    }

    #[test]
    fn detached_view_is_its_own_absence_case() {
        let mut lookup = FakeLookup::default();
        lookup.register(42, None);

        assert_eq!(lookup.view(EngineHandle(42)).unwrap(), Resolved::ViewNotAttached);
        // The instance is live, so the other subsystems still resolve.
        assert!(lookup.messenger(EngineHandle(42)).unwrap().is_found());
        assert!(lookup.texture_registrar(EngineHandle(42)).unwrap().is_found());
    }

    #[test]
    fn into_result_maps_tags_to_errors() {
        use crate::error::EngineContextError;

        let handle = EngineHandle(7);
        assert_eq!(Resolved::Found(1).into_result(handle).ok(), Some(1));

        match Resolved::<i32>::HandleNotFound.into_result(handle) {
            Err(EngineContextError::HandleNotFound(h)) => assert_eq!(h, handle),
            other => panic!("expected HandleNotFound, got {other:?}"),
        }
        match Resolved::<i32>::ViewNotAttached.into_result(handle) {
            Err(EngineContextError::ViewNotAttached(h)) => assert_eq!(h, handle),
            other => panic!("expected ViewNotAttached, got {other:?}"),
        }
    }
}
