//! Identity rules: entity ids, layout UUID validation, and device-type slugs.
//!
//! Layouts are stored by the persistence sidecar in folders named after their
//! UUID, so an externally supplied id is kept verbatim when it has the
//! canonical 8-4-4-4-12 hex shape and replaced otherwise. A malformed id never
//! reaches the store.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use uuid::Uuid;

/// Length of the hyphenated 8-4-4-4-12 text form.
const HYPHENATED_LEN: usize = 36;

/// A fresh random (v4) id in hyphenated lowercase form.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whether `candidate` is exactly 8-4-4-4-12 hex digits separated by hyphens.
///
/// Only the hyphenated form is 36 characters long, so the length check rules
/// out the braced, URN, and simple forms `uuid` would otherwise accept; folder
/// names depend on the exact text.
#[must_use]
pub fn is_valid_uuid(candidate: &str) -> bool {
    candidate.len() == HYPHENATED_LEN && Uuid::try_parse(candidate).is_ok()
}

/// Keep a valid external id, otherwise generate a new one.
#[must_use]
pub fn resolve_layout_id(external: Option<&str>) -> String {
    match external {
        Some(id) if is_valid_uuid(id) => id.to_string(),
        Some(id) => {
            tracing::warn!(id, "discarding malformed layout id");
            new_id()
        }
        None => new_id(),
    }
}

/// Lowercase slug: alphanumerics kept, every other run collapsed to one `-`.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// `base`, or `base-2`, `base-3`, ... whichever is first not `taken`.
#[must_use]
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = if base.is_empty() { "device" } else { base };
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 2_u32;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
