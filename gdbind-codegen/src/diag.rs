// Recoverable skips. Each one omits a single member; the rest of the owner
// still generates.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Vararg,
    /// Raw pointer in an argument or the return type.
    RawPointer,
    /// Virtual argument whose type the trampoline can't unmarshal.
    UnsupportedVirtualArg { arg: String, ty: String },
    NoGetter,
    InternalGetter,
    UnresolvedGetter(String),
    UnresolvedSetter(Option<String>),
    GetterArity(usize),
    SetterArity(usize),
    GetterWithoutReturn,
    IndexType(String),
    /// Setter value type differs from the getter's return type.
    SetterTypeMismatch { getter: String, setter: String },
    AccessorCollision(String),
    /// Operator whose right operand is `Variant`; no typed evaluator exists.
    VariantOperand,
    /// Native-structure field whose C type has no Rust equivalent.
    NativeFieldType(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Vararg => f.write_str("vararg methods are not supported"),
            SkipReason::RawPointer => f.write_str("raw pointer argument or return"),
            SkipReason::UnsupportedVirtualArg { arg, ty } => {
                write!(f, "virtual argument `{arg}` of type `{ty}` can't be unmarshalled")
            }
            SkipReason::NoGetter => f.write_str("property has no getter"),
            SkipReason::InternalGetter => f.write_str("getter is internal"),
            SkipReason::UnresolvedGetter(g) => write!(f, "getter `{g}` not found in class"),
            SkipReason::UnresolvedSetter(Some(s)) => write!(f, "setter `{s}` not found in class"),
            SkipReason::UnresolvedSetter(None) => f.write_str("property has no setter"),
            SkipReason::GetterArity(n) => write!(f, "getter takes {n} arguments (max 1)"),
            SkipReason::SetterArity(n) => write!(f, "setter takes {n} arguments (max 2)"),
            SkipReason::GetterWithoutReturn => f.write_str("getter returns nothing"),
            SkipReason::IndexType(t) => write!(f, "indexed getter takes `{t}`, not an integer"),
            SkipReason::SetterTypeMismatch { getter, setter } => {
                write!(f, "setter takes `{setter}` but getter returns `{getter}`")
            }
            SkipReason::AccessorCollision(n) => write!(f, "accessor `{n}` collides with a method"),
            SkipReason::VariantOperand => f.write_str("operator takes a Variant operand"),
            SkipReason::NativeFieldType(t) => write!(f, "native field type `{t}` is not supported"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub owner: String,
    pub member: String,
    pub reason: SkipReason,
}

impl Diagnostic {
    pub fn new(owner: &str, member: &str, reason: SkipReason) -> Self {
        Diagnostic {
            owner: owner.to_string(),
            member: member.to_string(),
            reason,
        }
    }

    pub fn log(&self) {
        tracing::warn!(owner = %self.owner, member = %self.member, "skipped: {}", self.reason);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.owner, self.member, self.reason)
    }
}
