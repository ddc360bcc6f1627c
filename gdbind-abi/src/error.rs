// Error types for the ABI layer used by generated code.

use thiserror::Error;

/// Failures observable while marshalling across the engine ABI.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("engine interface not initialized")]
    InterfaceMissing,
    #[error("engine interface initialized more than once")]
    InterfaceAlreadySet,
    #[error("method bind not found: {class}.{method} (hash {hash})")]
    MethodBindNotFound {
        class: &'static str,
        method: &'static str,
        hash: i64,
    },
    #[error("builtin constructor not found: type {type_code} index {index}")]
    ConstructorNotFound { type_code: u32, index: i32 },
    #[error("operator evaluator not found: op {op} ({left} x {right})")]
    OperatorNotFound { op: u32, left: u32, right: u32 },
    #[error("utility function not found: {name} (hash {hash})")]
    UtilityNotFound { name: &'static str, hash: i64 },
    #[error("null instance pointer")]
    NullInstance,
    #[error("null argument array")]
    NullArguments,
    #[error("null slot pointer at index {0}")]
    NullSlot(usize),
    #[error("argument index {index} out of range ({count} slots)")]
    SlotIndexOutOfRange { index: usize, count: usize },
    #[error("slot too small: need {needed} bytes, capacity {capacity}")]
    SlotTooSmall { needed: usize, capacity: usize },
    #[error("return slot is null but a value was produced")]
    NullReturnSlot,
}

/// Convenience alias used throughout the ABI crate and generated code.
pub type AbiResult<T> = Result<T, AbiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_are_human_readable() {
        let err = AbiError::MethodBindNotFound {
            class: "Node",
            method: "get_name",
            hash: 2002593661,
        };
        assert_eq!(
            err.to_string(),
            "method bind not found: Node.get_name (hash 2002593661)"
        );
        let err = AbiError::SlotTooSmall { needed: 16, capacity: 8 };
        assert_eq!(err.to_string(), "slot too small: need 16 bytes, capacity 8");
    }
}
