// FFI boundary guard: wraps trampoline bodies so neither a panic nor an
// unmarshalling error crosses back into the engine.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::AbiResult;

/// Run `f`, logging an `Err` or a caught panic under `context`
/// (usually `Class.method`). Returns whether `f` completed successfully.
pub fn ffi_boundary<F>(context: &str, f: F) -> bool
where
    F: FnOnce() -> AbiResult<()>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::error!(context, %err, "virtual call failed");
            false
        }
        Err(payload) => {
            tracing::error!(context, panic = %panic_message(&payload), "panic in virtual call");
            false
        }
    }
}

/// Extract a human-readable message from a panic payload.
fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
