// Lazily-resolved engine entry points. Generated code declares one static per
// bound method / constructor / operator / utility function and resolves it
// on first use. A failed lookup means the bindings were generated against a
// different engine version, so `get()` aborts instead of limping on.

use std::sync::OnceLock;

use crate::error::{AbiError, AbiResult};
use crate::handles::*;
use crate::interface::interface;

/// Method bind keyed by `(class, method, hash)`.
pub struct LazyMethodBind {
    class: &'static str,
    method: &'static str,
    hash: i64,
    cell: OnceLock<MethodBindPtr>,
}

impl LazyMethodBind {
    pub const fn new(class: &'static str, method: &'static str, hash: i64) -> Self {
        LazyMethodBind {
            class,
            method,
            hash,
            cell: OnceLock::new(),
        }
    }

    pub fn key(&self) -> (&'static str, &'static str, i64) {
        (self.class, self.method, self.hash)
    }

    /// Resolve through `lookup`, caching the first non-null result.
    pub fn resolve_with<F>(&self, lookup: F) -> AbiResult<MethodBindPtr>
    where
        F: FnOnce(&str, &str, i64) -> AbiResult<MethodBindPtr>,
    {
        if let Some(bind) = self.cell.get() {
            return Ok(*bind);
        }
        let bind = lookup(self.class, self.method, self.hash)?;
        if bind.is_null() {
            return Err(AbiError::MethodBindNotFound {
                class: self.class,
                method: self.method,
                hash: self.hash,
            });
        }
        Ok(*self.cell.get_or_init(|| bind))
    }

    /// Resolve against the live engine. Panics on a schema/engine mismatch.
    pub fn get(&self) -> MethodBindPtr {
        match self.resolve_with(engine_method_bind) {
            Ok(bind) => bind,
            Err(err) => panic!("{err}"),
        }
    }
}

fn engine_method_bind(class: &str, method: &str, hash: i64) -> AbiResult<MethodBindPtr> {
    let gi = interface()?;
    // SAFETY: both pointer/length pairs describe live UTF-8 buffers.
    Ok(unsafe {
        (gi.classdb_get_method_bind)(
            class.as_ptr(),
            class.len() as u32,
            method.as_ptr(),
            method.len() as u32,
            hash,
        )
    })
}

/// Builtin-type constructor keyed by `(type code, constructor index)`.
pub struct LazyConstructor {
    type_code: u32,
    index: i32,
    cell: OnceLock<PtrConstructor>,
}

impl LazyConstructor {
    pub const fn new(type_code: u32, index: i32) -> Self {
        LazyConstructor {
            type_code,
            index,
            cell: OnceLock::new(),
        }
    }

    pub fn resolve(&self) -> AbiResult<PtrConstructor> {
        if let Some(ctor) = self.cell.get() {
            return Ok(*ctor);
        }
        let gi = interface()?;
        // SAFETY: plain value arguments; the engine returns None on a miss.
        let ctor = unsafe { (gi.variant_get_ptr_constructor)(self.type_code, self.index) }.ok_or(
            AbiError::ConstructorNotFound {
                type_code: self.type_code,
                index: self.index,
            },
        )?;
        Ok(*self.cell.get_or_init(|| ctor))
    }

    pub fn get(&self) -> PtrConstructor {
        match self.resolve() {
            Ok(ctor) => ctor,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Operator evaluator keyed by `(operator, left type, right type)`.
pub struct LazyOperator {
    op: u32,
    left: u32,
    right: u32,
    cell: OnceLock<PtrOperatorEvaluator>,
}

impl LazyOperator {
    pub const fn new(op: u32, left: u32, right: u32) -> Self {
        LazyOperator {
            op,
            left,
            right,
            cell: OnceLock::new(),
        }
    }

    pub fn resolve(&self) -> AbiResult<PtrOperatorEvaluator> {
        if let Some(eval) = self.cell.get() {
            return Ok(*eval);
        }
        let gi = interface()?;
        // SAFETY: plain value arguments; the engine returns None on a miss.
        let eval = unsafe {
            (gi.variant_get_ptr_operator_evaluator)(self.op, self.left, self.right)
        }
        .ok_or(AbiError::OperatorNotFound {
            op: self.op,
            left: self.left,
            right: self.right,
        })?;
        Ok(*self.cell.get_or_init(|| eval))
    }

    pub fn get(&self) -> PtrOperatorEvaluator {
        match self.resolve() {
            Ok(eval) => eval,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Utility function keyed by `(name, hash)`.
pub struct LazyUtility {
    name: &'static str,
    hash: i64,
    cell: OnceLock<PtrUtilityFunction>,
}

impl LazyUtility {
    pub const fn new(name: &'static str, hash: i64) -> Self {
        LazyUtility {
            name,
            hash,
            cell: OnceLock::new(),
        }
    }

    pub fn resolve(&self) -> AbiResult<PtrUtilityFunction> {
        if let Some(func) = self.cell.get() {
            return Ok(*func);
        }
        let gi = interface()?;
        // SAFETY: the pointer/length pair describes a live UTF-8 buffer.
        let func = unsafe {
            (gi.variant_get_ptr_utility_function)(
                self.name.as_ptr(),
                self.name.len() as u32,
                self.hash,
            )
        }
        .ok_or(AbiError::UtilityNotFound {
            name: self.name,
            hash: self.hash,
        })?;
        Ok(*self.cell.get_or_init(|| func))
    }

    pub fn get(&self) -> PtrUtilityFunction {
        match self.resolve() {
            Ok(func) => func,
            Err(err) => panic!("{err}"),
        }
    }
}
