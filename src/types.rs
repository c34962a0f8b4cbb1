//! Core domain types for htmlloc fields, documents, and output layouts.
use std::str::FromStr;

use crate::error::Error;

/// The invariant culture key: the original, untranslated source text.
pub const INVARIANT_CULTURE: &str = "";

/// Pseudo-attribute holding an element's flattened text content.
pub const INNER_TEXT: &str = "innerText";

/// Pseudo-attribute holding an element's serialized inner markup.
pub const INNER_HTML: &str = "innerHtml";

/// Sentinel resolved at extraction time to `innerText` or `innerHtml`
/// depending on whether the element has child elements.
pub const INNER_TEXT_OR_HTML: &str = "innerTextOrInnerHtml";

/// Separator between the document path and the field name of a reference.
pub const REFERENCE_SEPARATOR: char = '#';

/// Parsed from a field name containing `#`. An empty `path` targets the
/// document owning the referencing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// Field name inside the target document.
    pub name: String,
    /// Document path, exactly as written before the separator.
    pub path: String,
}

impl FieldRef {
    /// Split a field name on the first `#`. Returns `None` for plain names.
    pub fn parse(field_name: &str) -> Option<Self> {
        let (path, name) = field_name.split_once(REFERENCE_SEPARATOR)?;
        return Some(Self {
            name: name.to_string(),
            path: path.to_string(),
        });
    }

    /// True when the reference points into the owning document.
    pub fn is_local(&self) -> bool {
        return self.path.is_empty();
    }
}

/// Document-level options set through `loc:fileOptions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FileOptions {
    /// Rendered like any other document.
    #[default]
    None,
    /// Pure string library: never rendered, only referenced.
    ReferencesOnly,
}

impl FileOptions {
    /// Whether the record can omit this value.
    pub fn is_default(&self) -> bool {
        return *self == Self::None;
    }

    /// Parse a marker value such as `ReferencesOnly` or `None, ReferencesOnly`.
    /// Flags combine, so any `ReferencesOnly` entry wins. Returns `None` if any
    /// entry is unknown.
    pub fn parse_marker(value: &str) -> Option<Self> {
        let mut options = Self::None;
        for flag in split_flags(value) {
            if flag.eq_ignore_ascii_case("None") {
                continue;
            }
            if flag.eq_ignore_ascii_case("ReferencesOnly") || flag.eq_ignore_ascii_case("ReferenceOnly") {
                options = Self::ReferencesOnly;
                continue;
            }
            return None;
        }
        return Some(options);
    }
}

/// Per-element extraction flags set through `loc:options`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Trim surrounding whitespace from `innerText` and `innerHtml` values.
    pub trim_inner_content: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        return Self { trim_inner_content: true };
    }
}

impl ExtractOptions {
    /// Parse a marker value (`None`, `TrimInnerHtml`, `Default`).
    /// An empty value means the defaults. Returns `None` if any entry is unknown.
    pub fn parse_marker(value: &str) -> Option<Self> {
        if split_flags(value).next().is_none() {
            return Some(Self::default());
        }
        let mut trim_inner_content = false;
        for flag in split_flags(value) {
            if flag.eq_ignore_ascii_case("None") {
                continue;
            }
            if flag.eq_ignore_ascii_case("TrimInnerHtml") || flag.eq_ignore_ascii_case("Default") {
                trim_inner_content = true;
                continue;
            }
            return None;
        }
        return Some(Self { trim_inner_content });
    }
}

/// Split a comma-separated flag list, dropping blank entries.
fn split_flags(value: &str) -> impl Iterator<Item = &str> {
    return value.split(',').map(str::trim).filter(|flag| !flag.is_empty());
}

/// Strategy for deriving a localized document's output path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileLayout {
    /// `dir/page.html` becomes `dir/page.fr.html`.
    Extensions,
    /// `dir/page.html` becomes `dir/fr/page.html`.
    #[default]
    SubDirectory,
}

impl FileLayout {
    /// Build the output path for `path` (forward-slash relative) and `culture`.
    pub fn output_path(self, path: &str, culture: &str) -> String {
        let (dir, file_name) = match path.rsplit_once('/') {
            Some((dir, file_name)) => (Some(dir), file_name),
            None => (None, path),
        };

        let localized_name = match self {
            Self::Extensions => match file_name.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() => format!("{stem}.{culture}.{ext}"),
                _ => format!("{file_name}.{culture}"),
            },
            Self::SubDirectory => format!("{culture}/{file_name}"),
        };

        return match dir {
            Some(dir) => format!("{dir}/{localized_name}"),
            None => localized_name,
        };
    }
}

impl FromStr for FileLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != '-' && *c != '_').collect();
        if normalized.eq_ignore_ascii_case("SubDirectory") {
            return Ok(Self::SubDirectory);
        }
        if normalized.eq_ignore_ascii_case("Extensions") || normalized.eq_ignore_ascii_case("Extension") {
            return Ok(Self::Extensions);
        }
        return Err(Error::UnsupportedFileLayout { value: s.to_string() });
    }
}
