// Enum and bitfield wrapper generation.

use std::collections::HashSet;

use crate::model::EnumDef;
use crate::type_map::enum_host_name;

/// Generate the wrapper for a global enum, or for a class enum when `owner`
/// is given (`Foo.Kind` → `FooKind`).
pub fn generate_enum(e: &EnumDef, owner: Option<&str>) -> String {
    let name = match owner {
        Some(class) => enum_host_name(&format!("{class}.{}", e.name)),
        None => enum_host_name(&e.name),
    };
    let mut seen = HashSet::new();
    let members: Vec<&(String, i64)> = e
        .values
        .iter()
        .filter(|(member, _)| seen.insert(member.as_str()))
        .collect();

    if e.is_bitfield {
        generate_bitfield(&name, &members)
    } else {
        generate_selection(&name, &members)
    }
}

fn generate_selection(name: &str, members: &[&(String, i64)]) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!(
        "#[repr(transparent)]\n\
         #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]\n\
         pub struct {name}(pub i64);\n\n\
         impl {name} {{\n"
    ));
    for (member, value) in members {
        out.push_str(&format!("    pub const {member}: {name} = {name}({value});\n"));
    }
    out.push_str(
        "\n    #[inline]\n\
         \x20   pub fn ord(self) -> i64 {\n\
         \x20       self.0\n\
         \x20   }\n",
    );

    // First member wins for aliased values.
    out.push_str("\n    pub fn name(self) -> Option<&'static str> {\n        match self.0 {\n");
    let mut seen_values = HashSet::new();
    for (member, value) in members {
        if seen_values.insert(*value) {
            out.push_str(&format!("            {value} => Some(\"{member}\"),\n"));
        }
    }
    out.push_str("            _ => None,\n        }\n    }\n}\n");

    generate_slot_value(&mut out, name, "i64");
    out
}

fn generate_bitfield(name: &str, members: &[&(String, i64)]) -> String {
    let mut out = String::with_capacity(1536);
    out.push_str(&format!(
        "#[repr(transparent)]\n\
         #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]\n\
         pub struct {name}(pub u64);\n\n\
         impl {name} {{\n"
    ));
    for (member, value) in members {
        out.push_str(&format!("    pub const {member}: {name} = {name}({});\n", *value as u64));
    }
    out.push_str(&format!(
        "\n    pub const fn empty() -> {name} {{\n\
         \x20       {name}(0)\n\
         \x20   }}\n\n\
         \x20   #[inline]\n\
         \x20   pub fn bits(self) -> u64 {{\n\
         \x20       self.0\n\
         \x20   }}\n\n\
         \x20   pub fn contains(self, other: {name}) -> bool {{\n\
         \x20       self.0 & other.0 == other.0\n\
         \x20   }}\n\
         }}\n\n\
         impl std::ops::BitOr for {name} {{\n\
         \x20   type Output = {name};\n\
         \x20   fn bitor(self, rhs: {name}) -> {name} {{\n\
         \x20       {name}(self.0 | rhs.0)\n\
         \x20   }}\n\
         }}\n\n\
         impl std::ops::BitAnd for {name} {{\n\
         \x20   type Output = {name};\n\
         \x20   fn bitand(self, rhs: {name}) -> {name} {{\n\
         \x20       {name}(self.0 & rhs.0)\n\
         \x20   }}\n\
         }}\n\n\
         impl std::ops::BitOrAssign for {name} {{\n\
         \x20   fn bitor_assign(&mut self, rhs: {name}) {{\n\
         \x20       self.0 |= rhs.0;\n\
         \x20   }}\n\
         }}\n"
    ));
    generate_slot_value(&mut out, name, "u64");
    out
}

/// Enum slots hold the raw 64-bit integer image.
fn generate_slot_value(out: &mut String, name: &str, repr: &str) {
    out.push_str(&format!(
        "\nunsafe impl gdbind_abi::SlotValue for {name} {{\n\
         \x20   const SIZE: usize = 8;\n\n\
         \x20   unsafe fn read_from(src: *const u8) -> Self {{\n\
         \x20       {name}(unsafe {{ <{repr} as gdbind_abi::SlotValue>::read_from(src) }})\n\
         \x20   }}\n\n\
         \x20   unsafe fn write_to(&self, dst: *mut u8) {{\n\
         \x20       unsafe {{ gdbind_abi::SlotValue::write_to(&self.0, dst) }}\n\
         \x20   }}\n\
         }}\n"
    ));
}
