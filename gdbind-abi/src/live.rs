// Live-wrapper registry: engine objects that already have a Rust-side
// wrapper (script instances created by the extension). Keyed by handle
// address, written on instance creation/destruction, read by generated code
// when a handle comes back from the engine.

use std::any::Any;
use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::{AbiError, AbiResult};
use crate::handles::ObjectHandle;

/// Implemented by every generated class wrapper.
pub trait Wrapped: Sized + Clone + Send + Sync + 'static {
    /// Engine class name the wrapper binds.
    const CLASS_NAME: &'static str;

    fn from_handle(handle: ObjectHandle) -> Self;

    fn handle(&self) -> ObjectHandle;
}

#[derive(Clone)]
pub struct LiveEntry {
    /// Most-derived class the instance was registered as.
    pub class_name: &'static str,
    /// Rust-side instance data.
    pub instance: *mut c_void,
    wrapper: Arc<dyn Any + Send + Sync>,
}

impl LiveEntry {
    /// The registered wrapper, if it was registered as `T`.
    pub fn wrapper<T: Wrapped>(&self) -> Option<T> {
        self.wrapper.downcast_ref::<T>().cloned()
    }
}

impl std::fmt::Debug for LiveEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveEntry")
            .field("class_name", &self.class_name)
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

// SAFETY: entries are only dereferenced on the engine's main thread.
unsafe impl Send for LiveEntry {}
unsafe impl Sync for LiveEntry {}

static LIVE: OnceLock<RwLock<HashMap<usize, LiveEntry>>> = OnceLock::new();

fn live() -> &'static RwLock<HashMap<usize, LiveEntry>> {
    LIVE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Record `wrapper` as the live wrapper of its handle. Later lookups of the
/// handle as `W` return a clone of it.
pub fn register_live<W: Wrapped>(wrapper: W, instance: *mut c_void) {
    let handle = wrapper.handle();
    if handle.is_null() {
        return;
    }
    let entry = LiveEntry {
        class_name: W::CLASS_NAME,
        instance,
        wrapper: Arc::new(wrapper),
    };
    let mut map = live().write().unwrap_or_else(|e| e.into_inner());
    map.insert(handle.addr(), entry);
    tracing::debug!(class = W::CLASS_NAME, addr = handle.addr(), "registered live wrapper");
}

pub fn unregister_live(handle: ObjectHandle) -> Option<LiveEntry> {
    let mut map = live().write().unwrap_or_else(|e| e.into_inner());
    map.remove(&handle.addr())
}

pub fn lookup_live(handle: ObjectHandle) -> Option<LiveEntry> {
    if handle.is_null() {
        return None;
    }
    let map = live().read().unwrap_or_else(|e| e.into_inner());
    map.get(&handle.addr()).cloned()
}

/// Convert an engine handle whose declared type has subclasses. A live
/// wrapper registered as `T` wins; otherwise a fresh wrapper is bound to the
/// handle.
pub fn lookup_object<T: Wrapped>(handle: ObjectHandle) -> Option<T> {
    if handle.is_null() {
        return None;
    }
    if let Some(entry) = lookup_live(handle) {
        if let Some(wrapper) = entry.wrapper::<T>() {
            return Some(wrapper);
        }
        tracing::trace!(
            declared = T::CLASS_NAME,
            live = entry.class_name,
            "live wrapper has another type, binding a fresh one"
        );
    }
    Some(T::from_handle(handle))
}

/// Direct wrap for leaf classes: no registry lookup.
#[inline]
pub fn wrap_object<T: Wrapped>(handle: ObjectHandle) -> Option<T> {
    if handle.is_null() {
        None
    } else {
        Some(T::from_handle(handle))
    }
}

/// Recover the Rust instance a trampoline was invoked on.
///
/// # Safety
/// `instance` must be null or point to a live `T` owned by the extension,
/// not aliased for the returned lifetime.
pub unsafe fn instance_mut<'a, T>(instance: *mut c_void) -> AbiResult<&'a mut T> {
    if instance.is_null() {
        return Err(AbiError::NullInstance);
    }
    Ok(unsafe { &mut *(instance as *mut T) })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wrapper carrying extension-side state next to the handle.
    #[derive(Debug, Clone, PartialEq)]
    struct Player {
        handle: ObjectHandle,
        tag: u32,
    }

    impl Wrapped for Player {
        const CLASS_NAME: &'static str = "Player";

        fn from_handle(handle: ObjectHandle) -> Self {
            Player { handle, tag: 0 }
        }

        fn handle(&self) -> ObjectHandle {
            self.handle
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Node(ObjectHandle);

    impl Wrapped for Node {
        const CLASS_NAME: &'static str = "Node";

        fn from_handle(handle: ObjectHandle) -> Self {
            Node(handle)
        }

        fn handle(&self) -> ObjectHandle {
            self.0
        }
    }

    fn handle(addr: usize) -> ObjectHandle {
        ObjectHandle(addr as *mut c_void)
    }

    #[test]
    fn null_handles_never_wrap() {
        assert_eq!(lookup_object::<Player>(ObjectHandle::NULL), None);
        assert_eq!(wrap_object::<Player>(ObjectHandle::NULL), None);
    }

    #[test]
    fn live_entries_register_and_unregister() {
        let h = handle(0x7f00_1000);
        let mut data = 5u32;
        register_live(Player { handle: h, tag: 1 }, &mut data as *mut u32 as *mut c_void);
        let entry = lookup_live(h).unwrap();
        assert_eq!(entry.class_name, "Player");
        assert_eq!(entry.instance, &mut data as *mut u32 as *mut c_void);
        assert!(unregister_live(h).is_some());
        assert!(lookup_live(h).is_none());
    }

    #[test]
    fn registered_wrapper_is_preferred_over_a_fresh_one() {
        let h = handle(0x7f00_2000);
        register_live(Player { handle: h, tag: 7 }, std::ptr::null_mut());

        let live = lookup_object::<Player>(h).unwrap();
        assert_eq!(live.tag, 7);
        assert_ne!(Some(live), wrap_object::<Player>(h));

        unregister_live(h);
        assert_eq!(lookup_object::<Player>(h).unwrap().tag, 0);
    }

    #[test]
    fn other_declared_types_fall_back_to_the_handle() {
        let h = handle(0x7f00_3000);
        register_live(Player { handle: h, tag: 9 }, std::ptr::null_mut());
        assert_eq!(lookup_object::<Node>(h), Some(Node(h)));
        unregister_live(h);
    }

    #[test]
    fn null_wrappers_are_not_registered() {
        register_live(Player { handle: ObjectHandle::NULL, tag: 3 }, std::ptr::null_mut());
        assert!(lookup_live(ObjectHandle::NULL).is_none());
    }

    #[test]
    fn instance_mut_rejects_null() {
        let err = unsafe { instance_mut::<u32>(std::ptr::null_mut()) }.unwrap_err();
        assert_eq!(err, AbiError::NullInstance);
        let mut value = 3u32;
        let r = unsafe { instance_mut::<u32>(&mut value as *mut u32 as *mut c_void) }.unwrap();
        *r += 1;
        assert_eq!(value, 4);
    }
}
