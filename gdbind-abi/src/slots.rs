// Argument and return slots for virtual-method trampolines.
//
// The engine hands a trampoline an array of untyped argument pointers and
// one untyped return pointer. Everything here funnels those through a
// per-type byte image (`SlotValue`) with explicit size checks, so generated
// code never reinterprets engine memory directly.

use std::ffi::c_void;

use crate::error::{AbiError, AbiResult};
use crate::handles::ObjectHandle;

/// Value with a fixed-size byte image in an engine slot.
///
/// # Safety
/// `SIZE` must be the exact byte count the engine reads or writes for this
/// type. `read_from` must accept any image produced by `write_to`.
pub unsafe trait SlotValue: Sized {
    const SIZE: usize;

    /// # Safety
    /// `src` must point to at least `SIZE` readable bytes.
    unsafe fn read_from(src: *const u8) -> Self;

    /// # Safety
    /// `dst` must point to at least `SIZE` writable bytes.
    unsafe fn write_to(&self, dst: *mut u8);
}

macro_rules! impl_slot_value_primitive {
    ($($ty:ty),* $(,)?) => {$(
        unsafe impl SlotValue for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            unsafe fn read_from(src: *const u8) -> Self { unsafe {
                (src as *const $ty).read_unaligned()
            }}

            #[inline]
            unsafe fn write_to(&self, dst: *mut u8) { unsafe {
                (dst as *mut $ty).write_unaligned(*self);
            }}
        }
    )*};
}

impl_slot_value_primitive!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64, ObjectHandle);

// The engine stores bool slots as a single byte; any non-zero byte is true.
unsafe impl SlotValue for bool {
    const SIZE: usize = 1;

    #[inline]
    unsafe fn read_from(src: *const u8) -> Self {
        unsafe { src.read() != 0 }
    }

    #[inline]
    unsafe fn write_to(&self, dst: *mut u8) {
        unsafe { dst.write(*self as u8) }
    }
}

/// Read-only view over a trampoline's argument pointer array.
pub struct ArgSlots {
    args: *const *const c_void,
    count: usize,
}

impl ArgSlots {
    /// # Safety
    /// When `count > 0`, `args` must point to `count` readable slot pointers
    /// that stay valid for the lifetime of the view.
    pub unsafe fn new(args: *const *const c_void, count: usize) -> AbiResult<Self> {
        if count > 0 && args.is_null() {
            return Err(AbiError::NullArguments);
        }
        Ok(ArgSlots { args, count })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Raw slot pointer at `index`, null-checked.
    pub fn ptr(&self, index: usize) -> AbiResult<*const c_void> {
        if index >= self.count {
            return Err(AbiError::SlotIndexOutOfRange {
                index,
                count: self.count,
            });
        }
        // SAFETY: index < count and `new` validated the array.
        let slot = unsafe { *self.args.add(index) };
        if slot.is_null() {
            return Err(AbiError::NullSlot(index));
        }
        Ok(slot)
    }

    /// Decode the pointee of slot `index` as `T`.
    ///
    /// # Safety
    /// The slot must hold a `T` written by the engine (at least `T::SIZE`
    /// readable bytes).
    pub unsafe fn value<T: SlotValue>(&self, index: usize) -> AbiResult<T> {
        let slot = self.ptr(index)?;
        Ok(unsafe { T::read_from(slot as *const u8) })
    }
}

/// Fixed-capacity view over a trampoline's return pointer.
pub struct RetSlot {
    ret: *mut c_void,
    capacity: usize,
}

impl RetSlot {
    /// # Safety
    /// `ret` must be null or point to `capacity` writable bytes.
    pub unsafe fn new(ret: *mut c_void, capacity: usize) -> Self {
        RetSlot { ret, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write `value`'s byte image into the slot.
    pub fn store<T: SlotValue>(&self, value: &T) -> AbiResult<()> {
        if self.ret.is_null() {
            return Err(AbiError::NullReturnSlot);
        }
        if T::SIZE > self.capacity {
            return Err(AbiError::SlotTooSmall {
                needed: T::SIZE,
                capacity: self.capacity,
            });
        }
        // SAFETY: non-null and at least T::SIZE bytes per the constructor
        // contract.
        unsafe { value.write_to(self.ret as *mut u8) };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_slots_decode_in_declared_order() {
        let a: i32 = -7;
        let b: f64 = 2.5;
        let c: u8 = 1;
        let ptrs: [*const c_void; 3] = [
            &a as *const i32 as *const c_void,
            &b as *const f64 as *const c_void,
            &c as *const u8 as *const c_void,
        ];
        let slots = unsafe { ArgSlots::new(ptrs.as_ptr(), ptrs.len()) }.unwrap();
        assert_eq!(slots.len(), 3);
        unsafe {
            assert_eq!(slots.value::<i32>(0).unwrap(), -7);
            assert_eq!(slots.value::<f64>(1).unwrap(), 2.5);
            assert!(slots.value::<bool>(2).unwrap());
        }
    }

    #[test]
    fn arg_slots_reject_bad_shapes() {
        assert_eq!(
            unsafe { ArgSlots::new(std::ptr::null(), 2) }.err(),
            Some(AbiError::NullArguments)
        );
        let empty = unsafe { ArgSlots::new(std::ptr::null(), 0) }.unwrap();
        assert!(empty.is_empty());

        let ptrs: [*const c_void; 1] = [std::ptr::null()];
        let slots = unsafe { ArgSlots::new(ptrs.as_ptr(), 1) }.unwrap();
        assert_eq!(slots.ptr(0).unwrap_err(), AbiError::NullSlot(0));
        assert_eq!(
            slots.ptr(3).unwrap_err(),
            AbiError::SlotIndexOutOfRange { index: 3, count: 1 }
        );
    }

    #[test]
    fn ret_slot_is_size_checked() {
        let mut small = [0u8; 4];
        let slot = unsafe { RetSlot::new(small.as_mut_ptr() as *mut c_void, small.len()) };
        assert_eq!(
            slot.store(&1.0f64).unwrap_err(),
            AbiError::SlotTooSmall { needed: 8, capacity: 4 }
        );
        slot.store(&0x0102_0304u32).unwrap();
        assert_eq!(u32::from_ne_bytes(small), 0x0102_0304);
    }

    #[test]
    fn ret_slot_null_is_an_error() {
        let slot = unsafe { RetSlot::new(std::ptr::null_mut(), 8) };
        assert_eq!(slot.store(&true).unwrap_err(), AbiError::NullReturnSlot);
    }

    #[test]
    fn object_handles_round_trip_through_slots() {
        let handle = ObjectHandle(0xdead_0000usize as *mut c_void);
        let mut buf = [0u8; 8];
        let slot = unsafe { RetSlot::new(buf.as_mut_ptr() as *mut c_void, buf.len()) };
        slot.store(&handle).unwrap();
        let back = unsafe { ObjectHandle::read_from(buf.as_ptr()) };
        assert_eq!(back, handle);
    }
}
