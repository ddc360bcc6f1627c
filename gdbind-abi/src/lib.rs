// gdbind-abi: the runtime surface generated bindings link against.
// Handle types, the engine interface table, lazily-resolved binds, slot
// buffers for virtual trampolines, opaque value storage and the live-wrapper
// registry. Everything generated code calls goes through this crate.

pub mod binding;
pub mod error;
pub mod ffi_guard;
pub mod handles;
pub mod interface;
pub mod live;
pub mod slots;
pub mod storage;

pub use binding::{LazyConstructor, LazyMethodBind, LazyOperator, LazyUtility};
pub use error::{AbiError, AbiResult};
pub use ffi_guard::ffi_boundary;
pub use handles::*;
pub use interface::{
    ExtensionInterface, construct_object, init_interface, interface, is_interface_initialized,
    ptrcall,
};
pub use live::{
    LiveEntry, Wrapped, instance_mut, lookup_live, lookup_object, register_live, unregister_live,
    wrap_object,
};
pub use slots::{ArgSlots, RetSlot, SlotValue};
pub use storage::OpaqueStorage;
