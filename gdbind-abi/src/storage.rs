use std::ffi::c_void;

use crate::slots::SlotValue;

/// Raw, engine-owned content of an opaque builtin value (String, Array,
/// Dictionary, ...). `N` is the byte size for the active build
/// configuration. The all-zero image is the engine's empty value.
#[repr(C, align(8))]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct OpaqueStorage<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> OpaqueStorage<N> {
    pub const SIZE: usize = N;

    pub const fn zeroed() -> Self {
        OpaqueStorage { bytes: [0; N] }
    }

    pub const fn from_bytes(bytes: [u8; N]) -> Self {
        OpaqueStorage { bytes }
    }

    pub fn to_bytes(&self) -> [u8; N] {
        self.bytes
    }

    pub fn is_zeroed(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Address passed to the engine as an argument slot.
    pub fn as_ptr(&self) -> *const c_void {
        self.bytes.as_ptr() as *const c_void
    }

    /// Address handed to the engine as return storage.
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        self.bytes.as_mut_ptr() as *mut c_void
    }
}

impl<const N: usize> Default for OpaqueStorage<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

unsafe impl<const N: usize> SlotValue for OpaqueStorage<N> {
    const SIZE: usize = N;

    unsafe fn read_from(src: *const u8) -> Self {
        let mut bytes = [0u8; N];
        // SAFETY: caller guarantees N readable bytes at `src`.
        unsafe { std::ptr::copy_nonoverlapping(src, bytes.as_mut_ptr(), N) };
        OpaqueStorage { bytes }
    }

    unsafe fn write_to(&self, dst: *mut u8) {
        // SAFETY: caller guarantees N writable bytes at `dst`.
        unsafe { std::ptr::copy_nonoverlapping(self.bytes.as_ptr(), dst, N) };
    }
}
