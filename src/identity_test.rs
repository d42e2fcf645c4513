use super::*;

// --- UUID validation ---

#[test]
fn new_id_is_valid_uuid() {
    let id = new_id();
    assert!(is_valid_uuid(&id), "{id}");
}

#[test]
fn new_ids_are_distinct() {
    assert_ne!(new_id(), new_id());
}

#[test]
fn accepts_canonical_lowercase_and_uppercase() {
    assert!(is_valid_uuid("123e4567-e89b-12d3-a456-426614174000"));
    assert!(is_valid_uuid("123E4567-E89B-12D3-A456-426614174000"));
}

#[test]
fn rejects_wrong_group_lengths() {
    assert!(!is_valid_uuid("123e4567-e89b-12d3-a456-42661417400"));
    assert!(!is_valid_uuid("123e4567e-89b-12d3-a456-426614174000"));
}

#[test]
fn rejects_non_hex() {
    assert!(!is_valid_uuid("123e4567-e89b-12d3-a456-42661417400g"));
}

#[test]
fn rejects_alternate_uuid_forms() {
    assert!(!is_valid_uuid("123e4567e89b12d3a456426614174000"));
    assert!(!is_valid_uuid("{123e4567-e89b-12d3-a456-426614174000}"));
    assert!(!is_valid_uuid("urn:uuid:123e4567-e89b-12d3-a456-426614174000"));
    assert!(!is_valid_uuid(""));
}

// --- resolve_layout_id ---

#[test]
fn resolve_preserves_valid_external_id_verbatim() {
    let id = "AAAAAAAA-bbbb-CCCC-dddd-eeeeeeeeeeee";
    assert_eq!(resolve_layout_id(Some(id)), id);
}

#[test]
fn resolve_replaces_malformed_id() {
    let resolved = resolve_layout_id(Some("my-layout"));
    assert_ne!(resolved, "my-layout");
    assert!(is_valid_uuid(&resolved));
}

#[test]
fn resolve_generates_when_absent() {
    assert!(is_valid_uuid(&resolve_layout_id(None)));
}

// --- Slugs ---

#[test]
fn slugify_collapses_separators() {
    assert_eq!(slugify("Dell PowerEdge R650"), "dell-poweredge-r650");
    assert_eq!(slugify("  Ubiquiti / USW-Pro 24  "), "ubiquiti-usw-pro-24");
}

#[test]
fn slugify_empty_for_symbols_only() {
    assert_eq!(slugify("!!!"), "");
}

#[test]
fn unique_slug_returns_base_when_free() {
    assert_eq!(unique_slug("switch", |_| false), "switch");
}

#[test]
fn unique_slug_appends_counter() {
    let taken = ["switch", "switch-2"];
    assert_eq!(unique_slug("switch", |s| taken.contains(&s)), "switch-3");
}

#[test]
fn unique_slug_defaults_empty_base() {
    assert_eq!(unique_slug("", |_| false), "device");
}

#[test]
fn rejects_misplaced_hyphens_at_full_length() {
    assert!(!is_valid_uuid("123e4567-e89b-12d3-a456-42661417400-"));
    assert!(!is_valid_uuid("123e4567-e89b-12d3-a456+426614174000"));
}
