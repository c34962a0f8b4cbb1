//! The closed set of `loc:` attributes that drive extraction and rendering.
//!
//! The HTML parser lowercases attribute names, so every marker is stored in
//! lowercase and matched case-insensitively.

/// Namespace prefix shared by every marker attribute.
pub const PREFIX: &str = "loc:";

/// Marks an element as a field; the value is the field name or a `path#field` reference.
pub const NAME: &str = "loc:name";

/// Explicit comma-separated attribute list overriding tag defaults.
pub const ATTRIBUTES: &str = "loc:attributes";

/// Per-element extraction flags.
pub const OPTIONS: &str = "loc:options";

/// Document-level options.
pub const FILE_OPTIONS: &str = "loc:fileoptions";

/// Every marker recognized by extraction.
pub const ALL: [&str; 4] = [NAME, ATTRIBUTES, OPTIONS, FILE_OPTIONS];

/// True for any attribute in the localization namespace, recognized or not.
/// Rendering strips all of them so stray markers never reach the output.
pub fn has_prefix(attribute_name: &str) -> bool {
    return attribute_name
        .get(..PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(PREFIX));
}

/// True for the recognized markers only.
pub fn is_known(attribute_name: &str) -> bool {
    return ALL.iter().any(|marker| marker.eq_ignore_ascii_case(attribute_name));
}

/// Split a `loc:attributes` value into trimmed, non-empty names.
pub fn split_attribute_list(value: &str) -> Vec<String> {
    return value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();
}
