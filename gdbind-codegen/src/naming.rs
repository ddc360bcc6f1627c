// Name conversion utilities for codegen.

/// Convert a PascalCase or UPPER_CASE name to snake_case.
pub fn to_snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 8);
    let chars: Vec<char> = name.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                // Word boundary after lowercase/digit, or at the end of an
                // acronym ("HTTPRequest" -> "http_request").
                if prev.is_ascii_lowercase() || prev.is_ascii_digit() {
                    result.push('_');
                } else if prev.is_ascii_uppercase()
                    && i + 1 < chars.len()
                    && chars[i + 1].is_ascii_lowercase()
                {
                    result.push('_');
                }
            }
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push(ch);
        }
    }

    result
}

const RESERVED_WORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super",
    "trait", "true", "type", "unsafe", "use", "where", "while", "async",
    "await", "dyn", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Check if a name is a Rust reserved word.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Escape Rust reserved words by prepending `r#`. `self`/`Self`/`super`/
/// `crate` can't be raw identifiers, so they get a trailing underscore.
pub fn escape_reserved(name: &str) -> String {
    match name {
        "self" | "Self" | "super" | "crate" => format!("{name}_"),
        n if is_reserved(n) => format!("r#{n}"),
        n => n.to_string(),
    }
}

/// Make an arbitrary schema name a valid identifier (keeps case).
pub fn sanitize_ident(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 1);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if i == 0 && ch.is_ascii_digit() {
                result.push('_');
            }
            result.push(ch);
        } else {
            result.push('_');
        }
    }
    if result.is_empty() {
        result.push_str("_unnamed");
    }
    escape_reserved(&result)
}

/// Rust module / file stem for a class.
pub fn module_name(class: &str) -> String {
    escape_reserved(&to_snake_case(class))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Node2D"), "node2_d");
        assert_eq!(to_snake_case("GetChildCount"), "get_child_count");
        assert_eq!(to_snake_case("HTTPRequest"), "http_request");
        assert_eq!(to_snake_case("AABB"), "aabb");
        assert_eq!(to_snake_case("RefCounted"), "ref_counted");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_escape_reserved() {
        assert_eq!(escape_reserved("type"), "r#type");
        assert_eq!(escape_reserved("gen"), "r#gen");
        assert_eq!(escape_reserved("self"), "self_");
        assert_eq!(escape_reserved("node"), "node");
    }

    #[test]
    fn test_sanitize_ident() {
        assert_eq!(sanitize_ident("KEY_1"), "KEY_1");
        assert_eq!(sanitize_ident("3D"), "_3D");
        assert_eq!(sanitize_ident("a-b"), "a_b");
        assert_eq!(sanitize_ident(""), "_unnamed");
        assert_eq!(sanitize_ident("in"), "r#in");
    }
}
