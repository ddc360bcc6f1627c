// Property accessor pairs. Both forward to the privatized backing methods.

use crate::plan::{PropertyPlan, SetterValue};

pub fn generate_property(out: &mut String, prop: &PropertyPlan) {
    let call = |is_static: bool, method: &str| {
        if is_static {
            format!("Self::raw_{method}")
        } else {
            format!("self.raw_{method}")
        }
    };

    let getter_args = prop.index_getter.clone().unwrap_or_default();
    out.push_str(&format!(
        "    /// Property `{}`.\n\
         \x20   pub fn {}(&self) -> {} {{\n\
         \x20       {}({getter_args})\n\
         \x20   }}\n\n",
        prop.schema_name,
        prop.getter_name,
        prop.getter_ret,
        call(prop.getter_static, &prop.getter),
    ));

    let value = match prop.value {
        SetterValue::Direct => "value".to_string(),
        SetterValue::StringNameToGString => "&GString::from(value)".to_string(),
    };
    let value = if prop.value_optional {
        format!("Some({value})")
    } else {
        value
    };
    let setter_args = match &prop.index_setter {
        Some(index) => format!("{index}, {value}"),
        None => value,
    };
    out.push_str(&format!(
        "    pub fn {}(&self, value: {}) {{\n\
         \x20       {}({setter_args})\n\
         \x20   }}\n\n",
        prop.setter_name,
        prop.value_param,
        call(prop.setter_static, &prop.setter),
    ));
}
