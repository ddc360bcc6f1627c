// Identity of a generated call site. An override table keyed on
// (owner, name, parameter types, return type) can replace the generated
// body with a hand-written one.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallIdentity {
    pub owner: String,
    pub name: String,
    pub params: Vec<String>,
    pub ret: Option<String>,
}

impl CallIdentity {
    pub fn new(owner: &str, name: &str, params: Vec<String>, ret: Option<String>) -> Self {
        CallIdentity {
            owner: owner.to_string(),
            name: name.to_string(),
            params,
            ret,
        }
    }
}

impl fmt::Display for CallIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.owner, self.name, self.params.join(", "))?;
        if let Some(ret) = &self.ret {
            write!(f, " -> {ret}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_signature() {
        let id = CallIdentity::new("Foo", "bar", vec!["i32".into()], Some("f64".into()));
        assert_eq!(id.to_string(), "Foo.bar(i32) -> f64");
        let id = CallIdentity::new("Foo", "reset", vec![], None);
        assert_eq!(id.to_string(), "Foo.reset()");
    }
}
