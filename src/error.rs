//! Crate-level error types for htmlloc diagnostics.
use std::path::PathBuf;

/// All errors in htmlloc carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, field, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document path is already tracked by the project (paths compare case-insensitively).
    #[error("duplicate document: {path}")]
    DuplicateDocument {
        /// Path of the document that was added twice.
        path: String,
    },

    /// A field name is already present in the document's field collection.
    #[error("duplicate field `{name}` in {document}")]
    DuplicateField {
        /// Path of the document owning the collection.
        document: String,
        /// Field name that collided.
        name: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The project record is not valid JSON or does not match the record shape.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A required identifier (field name, document path) was blank.
    #[error("missing identifier: {what} must not be empty")]
    MissingIdentifier {
        /// Which identifier was missing.
        what: &'static str,
    },

    /// The project record parsed but violates a structural invariant.
    #[error("project record corrupt: {}: {reason}", path.display())]
    ProjectCorrupt {
        /// Record file, or empty when parsed from memory.
        path: PathBuf,
        /// Description of the violated invariant.
        reason: String,
    },

    /// A translation was written to a field whose content comes from another field.
    #[error("field `{name}` is a reference and holds no values")]
    ReferenceHasNoValues {
        /// The reference field name.
        name: String,
    },

    /// TOML deserialization of the scan config failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The requested output layout is not one of the supported layouts.
    #[error("unsupported file layout: `{value}` (expected SubDirectory or Extensions)")]
    UnsupportedFileLayout {
        /// The rejected layout name.
        value: String,
    },
}
