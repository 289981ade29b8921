//! Counter-suffix name pattern helpers shared by the repository backends.
//!
//! Sibling names produced by the naming resolver look like `"{base} (n)"`.
//! The Postgres repositories match that shape with a regex built by
//! [`suffix_regex`]; the in-memory repositories parse it directly with
//! [`parse_suffix`].

/// Build the Postgres regex matching `"{base} (n)"` for a literal base.
pub(crate) fn suffix_regex(base: &str) -> String {
    format!("^{} \\([0-9]+\\)$", escape_regex(base))
}

/// Parse a sibling name against a base.
///
/// Returns `Some(0)` for the bare base, `Some(n)` for `"{base} (n)"`,
/// `None` for anything else.
pub(crate) fn parse_suffix(name: &str, base: &str) -> Option<i64> {
    if name == base {
        return Some(0);
    }
    let rest = name.strip_prefix(base)?.strip_prefix(" (")?;
    let digits = rest.strip_suffix(')')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Escape regex metacharacters so a display name matches literally.
fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suffix() {
        assert_eq!(parse_suffix("report", "report"), Some(0));
        assert_eq!(parse_suffix("report (1)", "report"), Some(1));
        assert_eq!(parse_suffix("report (12)", "report"), Some(12));
        assert_eq!(parse_suffix("report (x)", "report"), None);
        assert_eq!(parse_suffix("report ()", "report"), None);
        assert_eq!(parse_suffix("reports (1)", "report"), None);
        assert_eq!(parse_suffix("other", "report"), None);
    }

    #[test]
    fn test_suffix_regex_escapes_base() {
        assert_eq!(suffix_regex("a.b"), "^a\\.b \\([0-9]+\\)$");
        assert_eq!(suffix_regex("plan (v2)"), "^plan \\(v2\\) \\([0-9]+\\)$");
    }
}
