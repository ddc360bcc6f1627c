// Engine interface table. Handed to the extension once at load time, then
// read-only for the lifetime of the library.

use std::ffi::c_void;
use std::sync::OnceLock;

use crate::error::{AbiError, AbiResult};
use crate::handles::*;

/// Function table supplied by the engine. Strings cross as UTF-8 ptr+len.
#[repr(C)]
pub struct ExtensionInterface {
    pub version: u32,

    /// Resolve a method bind by class name, method name and ABI hash.
    /// Returns a null bind when the engine does not know the method.
    pub classdb_get_method_bind: unsafe extern "C" fn(
        class_name: *const u8,
        class_name_len: u32,
        method_name: *const u8,
        method_name_len: u32,
        hash: i64,
    ) -> MethodBindPtr,

    /// Call a resolved bind. `args` holds one pointer per declared argument;
    /// `ret` is null for methods without a return value.
    pub object_method_bind_ptrcall: unsafe extern "C" fn(
        bind: MethodBindPtr,
        instance: ObjectHandle,
        args: *const *const c_void,
        ret: *mut c_void,
    ),

    /// Construct a registered engine object of the given class.
    pub classdb_construct_object:
        unsafe extern "C" fn(class_name: *const u8, class_name_len: u32) -> ObjectHandle,

    pub variant_get_ptr_constructor:
        unsafe extern "C" fn(type_code: u32, index: i32) -> Option<PtrConstructor>,

    pub variant_get_ptr_operator_evaluator:
        unsafe extern "C" fn(op: u32, left: u32, right: u32) -> Option<PtrOperatorEvaluator>,

    pub variant_get_ptr_utility_function: unsafe extern "C" fn(
        name: *const u8,
        name_len: u32,
        hash: i64,
    ) -> Option<PtrUtilityFunction>,
}

/// Wrapper so a raw pointer can live inside OnceLock (which requires Send+Sync).
/// SAFETY: the table is owned by the engine, outlives the library, and is
/// only read after init.
struct InterfaceRef(*const ExtensionInterface);
unsafe impl Send for InterfaceRef {}
unsafe impl Sync for InterfaceRef {}

static INTERFACE: OnceLock<InterfaceRef> = OnceLock::new();

/// Store the interface table pointer. Called once from the extension entry point.
pub fn init_interface(table: *const ExtensionInterface) -> AbiResult<()> {
    if table.is_null() {
        return Err(AbiError::InterfaceMissing);
    }
    INTERFACE
        .set(InterfaceRef(table))
        .map_err(|_| AbiError::InterfaceAlreadySet)
}

/// Access the interface table.
#[inline]
pub fn interface() -> AbiResult<&'static ExtensionInterface> {
    // SAFETY: validated non-null in init_interface; the engine guarantees
    // the table outlives the library.
    INTERFACE
        .get()
        .map(|r| unsafe { &*r.0 })
        .ok_or(AbiError::InterfaceMissing)
}

#[inline]
pub fn is_interface_initialized() -> bool {
    INTERFACE.get().is_some()
}

/// Perform a pointer call on a resolved bind.
///
/// # Safety
/// `args` must point to as many valid slot pointers as the method declares,
/// each pointing at storage of the type the engine expects; `ret` must be
/// null or point at writable storage of the declared return type.
pub unsafe fn ptrcall(
    bind: MethodBindPtr,
    instance: ObjectHandle,
    args: *const *const c_void,
    ret: *mut c_void,
) {
    match interface() {
        Ok(gi) => unsafe { (gi.object_method_bind_ptrcall)(bind, instance, args, ret) },
        Err(err) => panic!("ptrcall before interface init: {err}"),
    }
}

/// Construct a fresh engine object of `class_name`.
pub fn construct_object(class_name: &str) -> AbiResult<ObjectHandle> {
    let gi = interface()?;
    // SAFETY: the pointer/length pair describes a live UTF-8 buffer.
    let handle =
        unsafe { (gi.classdb_construct_object)(class_name.as_ptr(), class_name.len() as u32) };
    Ok(handle)
}
