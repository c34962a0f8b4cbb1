//! Project record persistence: JSON shape, parsing, serialization, and
//! structural validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::field::{Field, Values};
use crate::options::ProjectOptions;
use crate::types::FileOptions;

/// Default for `SortOrder` when the key is absent.
const fn never_extracted() -> i64 {
    return Field::NEVER_EXTRACTED;
}

/// Default for `Exists` when the key is absent.
const fn present() -> bool {
    return true;
}

/// `skip_serializing_if` helper for `SortOrder`.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "serde passes fields by reference")]
const fn is_never_extracted(sort_order: &i64) -> bool {
    return *sort_order == Field::NEVER_EXTRACTED;
}

/// `skip_serializing_if` helper for `Exists`.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "serde passes fields by reference")]
const fn is_present(exists: &bool) -> bool {
    return *exists;
}

/// One field as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldRecord {
    /// `false` when the field vanished from the markup; omitted when `true`.
    #[serde(default = "present", skip_serializing_if = "is_present")]
    pub exists: bool,
    /// Field name or `path#field` reference.
    pub name: String,
    /// Document position at the last extraction; omitted when `-1`.
    #[serde(default = "never_extracted", skip_serializing_if = "is_never_extracted")]
    pub sort_order: i64,
    /// Marker-free snapshot of the originating element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_html: Option<String>,
    /// Attribute → culture → text. Absent for reference fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Values>,
}

/// One document as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentRecord {
    /// Fields in list order.
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    /// File options; omitted when `None`.
    #[serde(default, skip_serializing_if = "FileOptions::is_default")]
    pub options: FileOptions,
    /// Forward-slash path relative to the record's directory.
    pub path: String,
}

/// The project record as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectRecord {
    /// Tracked documents.
    #[serde(default)]
    pub files: Vec<DocumentRecord>,
    /// Localizable attribute configuration.
    #[serde(default)]
    pub options: ProjectOptions,
}

impl FieldRecord {
    /// Persisted shape of a field. Reference fields carry no value table.
    pub fn from_field(field: &Field) -> Self {
        return Self {
            exists: field.exists,
            name: field.name().to_string(),
            sort_order: field.sort_order,
            source_html: field.source_html.clone(),
            values: field.values().cloned(),
        };
    }

    /// Rebuild the in-memory field. Values stored on a reference are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingIdentifier` if the name is blank.
    pub fn into_field(self) -> Result<Field, Error> {
        let mut field = Field::new(&self.name)?;
        field.exists = self.exists;
        field.sort_order = self.sort_order;
        field.source_html = self.source_html;
        if let Some(values) = self.values
            && !field.is_reference()
        {
            field.set_values(values)?;
        }
        return Ok(field);
    }
}

impl ProjectRecord {
    /// Parse a record from JSON content.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the content is not a valid record,
    /// or `Error::ProjectCorrupt` if paths or field names are blank or repeated.
    pub fn parse(content: &str) -> Result<Self, Error> {
        return Self::parse_at(content, Path::new(""));
    }

    /// Parse, attributing validation failures to `path`.
    fn parse_at(content: &str, path: &Path) -> Result<Self, Error> {
        let record: Self = serde_json::from_str(content)?;
        enforce_unique_identifiers(&record, path)?;
        return Ok(record);
    }

    /// Read and parse a record from disk. A missing file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` for read failures other than not-found,
    /// `Error::Json` for invalid content, or `Error::ProjectCorrupt`.
    pub fn read(path: &Path) -> Result<Option<Self>, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse_at(&content, path).map(Some);
    }

    /// Serialize to indented JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn serialize(&self) -> Result<String, Error> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        return Ok(content);
    }

    /// Write the record to disk, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let content = self.serialize()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        return Ok(());
    }
}

/// Validate that document paths (case-insensitive) and field names within a
/// document (exact) are non-blank and unique.
///
/// # Errors
///
/// Returns `Error::ProjectCorrupt` naming the first offending entry.
fn enforce_unique_identifiers(record: &ProjectRecord, path: &Path) -> Result<(), Error> {
    let corrupt = |reason: String| Error::ProjectCorrupt {
        path: PathBuf::from(path),
        reason,
    };

    let mut seen_paths: HashSet<String> = HashSet::new();
    for document in &record.files {
        if document.path.trim().is_empty() {
            return Err(corrupt("document with empty path".to_string()));
        }
        if !seen_paths.insert(document.path.to_ascii_lowercase()) {
            return Err(corrupt(format!("document `{}` listed twice", document.path)));
        }

        let mut seen_fields: HashSet<&str> = HashSet::new();
        for field in &document.fields {
            if field.name.trim().is_empty() {
                return Err(corrupt(format!("field with empty name in `{}`", document.path)));
            }
            if !seen_fields.insert(field.name.as_str()) {
                return Err(corrupt(format!(
                    "field `{}` listed twice in `{}`",
                    field.name, document.path
                )));
            }
        }
    }
    return Ok(());
}
