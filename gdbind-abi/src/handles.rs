use std::ffi::c_void;

/// Opaque handle to an engine object. Rust never dereferences it.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObjectHandle(pub *mut c_void);

impl ObjectHandle {
    pub const NULL: ObjectHandle = ObjectHandle(std::ptr::null_mut());

    #[inline]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// Address used as a key by the live-wrapper registry.
    #[inline]
    pub fn addr(self) -> usize {
        self.0 as usize
    }
}

impl Default for ObjectHandle {
    fn default() -> Self {
        ObjectHandle::NULL
    }
}

/// Engine method bind resolved by `(class, method, hash)`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MethodBindPtr(pub *const c_void);

impl MethodBindPtr {
    #[inline]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

/// Builtin-type constructor: `(base, args)`.
pub type PtrConstructor = unsafe extern "C" fn(base: *mut c_void, args: *const *const c_void);

/// Builtin operator evaluator: `(left, right, result)`.
pub type PtrOperatorEvaluator =
    unsafe extern "C" fn(left: *const c_void, right: *const c_void, result: *mut c_void);

/// Utility function: `(ret, args, arg_count)`.
pub type PtrUtilityFunction =
    unsafe extern "C" fn(ret: *mut c_void, args: *const *const c_void, arg_count: i32);

/// Virtual-method trampoline: `(instance, args, ret)`.
pub type VirtualFn =
    unsafe extern "C" fn(instance: *mut c_void, args: *const *const c_void, ret: *mut c_void);

// Handles are raw engine identifiers. They can be sent across threads
// (but must only be *used* on the engine's main thread).
// Sync is needed for OnceLock caching in generated code.
unsafe impl Send for ObjectHandle {}
unsafe impl Sync for ObjectHandle {}
unsafe impl Send for MethodBindPtr {}
unsafe impl Sync for MethodBindPtr {}
