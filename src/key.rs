//! Conversion between configuration paths and flat environment keys.
//!
//! Flat keys are uppercase and underscore-delimited. A camelCase segment
//! like `redisHost` maps to `REDIS_HOST`; a prefix composes onto a key
//! with a single `_` separator.

/// Convert a camelCase identifier to its flat, uppercased form.
///
/// An underscore is inserted before each uppercase letter that directly
/// follows a lowercase letter, then the whole string is uppercased.
/// Consecutive uppercase runs are left as-is, so the function is
/// idempotent on already-flat input.
///
/// ```
/// use envscope::key::to_flat_segment;
///
/// assert_eq!(to_flat_segment("redisHost"), "REDIS_HOST");
/// assert_eq!(to_flat_segment("REDIS_HOST"), "REDIS_HOST");
/// ```
pub fn to_flat_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev_lower = false;
    for ch in input.chars() {
        if prev_lower && ch.is_ascii_uppercase() {
            out.push('_');
        }
        prev_lower = ch.is_ascii_lowercase();
        out.push(ch.to_ascii_uppercase());
    }
    out
}

/// Compose a prefix and a key into one flat key.
///
/// `None` and `""` prefixes behave identically: the key is returned
/// unchanged, never with a leading underscore.
pub fn compose_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}_{}", p, key),
        _ => key.to_string(),
    }
}

/// Whether a key contains a lowercase-then-uppercase camelCase boundary.
pub fn has_camel_boundary(key: &str) -> bool {
    let mut prev_lower = false;
    for ch in key.chars() {
        if prev_lower && ch.is_ascii_uppercase() {
            return true;
        }
        prev_lower = ch.is_ascii_lowercase();
    }
    false
}
