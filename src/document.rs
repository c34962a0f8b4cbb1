//! A single HTML document: field extraction, incremental merge, and rendering.

use std::path::Path;

use kuchiki::NodeRef;
use tracing::{debug, warn};

use crate::collection::FieldCollection;
use crate::dom;
use crate::error::Error;
use crate::field::Field;
use crate::markers;
use crate::options::ProjectOptions;
use crate::project::Project;
use crate::types::{ExtractOptions, FileOptions, INNER_HTML, INNER_TEXT, INNER_TEXT_OR_HTML, INVARIANT_CULTURE};

/// One HTML file tracked by a project.
#[derive(Debug, Default)]
pub struct Document {
    /// Fields extracted from this document, translations included.
    pub fields: FieldCollection,
    /// Options set through `loc:fileOptions`.
    pub options: FileOptions,
    /// Forward-slash path relative to the project base directory.
    path: String,
    /// Parsed top-level nodes; `None` until markup is loaded.
    tree: Option<Vec<NodeRef>>,
}

impl Document {
    /// Empty document for a relative path.
    pub fn new(path: &str) -> Self {
        return Self {
            fields: FieldCollection::new(),
            options: FileOptions::None,
            path: path.replace('\\', "/"),
            tree: None,
        };
    }

    /// Relative path used for references and output paths.
    pub fn path(&self) -> &str {
        return &self.path;
    }

    /// Update the stored path (the scan may report a different casing).
    pub fn set_path(&mut self, path: &str) {
        self.path = path.replace('\\', "/");
        self.relink();
    }

    /// Whether markup has been parsed for this document.
    pub const fn is_loaded(&self) -> bool {
        return self.tree.is_some();
    }

    /// Parse literal markup, replacing any previously loaded tree.
    pub fn load_html(&mut self, html: &str) {
        self.tree = Some(dom::parse_nodes(html));
    }

    /// Parse the document from `base/path`. A missing file leaves the tree
    /// unloaded and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` for read failures other than not-found.
    pub fn load_from_disk(&mut self, base: &Path) -> Result<bool, Error> {
        if self.path.is_empty() {
            return Ok(false);
        }
        let full_path = base.join(&self.path);
        let html = match read_markup(&full_path) {
            Ok(html) => html,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %full_path.display(), "document missing on disk");
                return Ok(false);
            },
            Err(e) => return Err(Error::Io(e)),
        };
        self.load_html(&html);
        return Ok(true);
    }

    /// Point every field back at this document.
    pub(crate) fn relink(&mut self) {
        for field in self.fields.iter_mut() {
            field.set_owner(&self.path);
        }
    }

    /// Whether the document is rendered as standalone output.
    pub fn can_localize(&self) -> bool {
        return self.options != FileOptions::ReferencesOnly;
    }

    /// Extract fields from the loaded tree and merge them into the existing
    /// collection. Returns the number of fields found in the markup.
    ///
    /// Every existing field is first flagged absent; found fields are flagged
    /// present again, get their document position as sort order, and have
    /// their extracted values merged over the stored ones. New fields are
    /// appended. Translations of absent fields are kept.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateField` only if the collection index is
    /// inconsistent, which indicates a bug.
    pub fn extract_fields(&mut self, options: &ProjectOptions) -> Result<usize, Error> {
        let nodes = self.tree.clone().unwrap_or_default();
        let mut file_options = self.options;
        let mut extracted = Vec::new();
        for node in &nodes {
            dom::walk_breadth_first(node, |current| {
                if let Some(field) = self.extract_node(current, options, &mut file_options) {
                    extracted.push(field);
                }
            });
        }
        self.options = file_options;

        let count = extracted.len();
        self.merge_extracted(extracted)?;
        debug!(path = %self.path, fields = count, "extracted fields");
        return Ok(count);
    }

    /// Merge a freshly extracted field sequence, in document order.
    fn merge_extracted(&mut self, extracted: Vec<Field>) -> Result<(), Error> {
        self.fields.mark_all_missing();

        let mut sort_order: i64 = 0;
        for mut field in extracted {
            field.sort_order = sort_order;
            sort_order = sort_order.saturating_add(1);
            field.set_owner(&self.path);

            match self.fields.get_mut(field.name()) {
                Some(existing) => {
                    existing.exists = true;
                    existing.sort_order = field.sort_order;
                    existing.source_html.clone_from(&field.source_html);
                    existing.merge_values(&field);
                },
                None => self.fields.push(field)?,
            }
        }

        self.fields.restore_document_order();
        return Ok(());
    }

    /// Drop every soft-deleted field, translations included.
    /// Returns the removed names in list order.
    pub fn prune_removed_fields(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        let mut position = 0_usize;
        while let Some(field) = self.fields.at(position) {
            if field.exists {
                position = position.saturating_add(1);
                continue;
            }
            let name = field.name().to_string();
            self.fields.remove(&name);
            removed.push(name);
        }
        return removed;
    }

    /// Read the markers of one visited node and build its field, if any.
    fn extract_node(&self, node: &NodeRef, options: &ProjectOptions, file_options: &mut FileOptions) -> Option<Field> {
        node.as_element()?;

        for marker in dom::unknown_markers(node) {
            debug!(path = %self.path, marker = %marker, "ignoring unknown localization marker");
        }

        if let Some(value) = dom::attribute(node, markers::FILE_OPTIONS) {
            match FileOptions::parse_marker(&value) {
                Some(parsed) => *file_options = parsed,
                None => warn!(path = %self.path, value = %value, "unrecognized loc:fileOptions value"),
            }
        }

        let name = dom::attribute(node, markers::NAME)?;
        let mut field = Field::new(&name).ok()?;
        field.source_html = Some(source_html(node));
        if field.is_reference() {
            return Some(field);
        }

        let extract_options = match dom::attribute(node, markers::OPTIONS) {
            None => ExtractOptions::default(),
            Some(value) => ExtractOptions::parse_marker(&value).unwrap_or_else(|| {
                warn!(path = %self.path, field = %name, value = %value, "unrecognized loc:options value");
                ExtractOptions::default()
            }),
        };

        for attribute in localizable_attributes(node, options) {
            let Some((key, value)) = capture(node, &attribute, extract_options) else {
                continue;
            };
            if field.set_value(&key, INVARIANT_CULTURE, &value).is_err() {
                debug!(path = %self.path, field = %name, attribute = %key, "skipping blank attribute name");
            }
        }
        return Some(field);
    }

    /// Render the document for `culture`, resolving references through
    /// `project`. Returns `None` for reference-only or unloaded documents.
    ///
    /// The stored tree is never modified; each top-level node is cloned,
    /// translated, stripped of `loc:` attributes, and serialized.
    pub fn localize(&self, culture: &str, project: &Project) -> Option<String> {
        if !self.can_localize() {
            return None;
        }
        let nodes = self.tree.as_ref()?;

        let mut output = String::new();
        for node in nodes {
            let copy = dom::deep_clone(node);
            dom::walk_breadth_first(&copy, |current| {
                if current.as_element().is_none() {
                    return;
                }
                self.localize_element(current, culture, project);
                dom::strip_markers(current);
            });
            output.push_str(&dom::outer_html(&copy));
        }
        return Some(output);
    }

    /// Apply the best available translation to one element of the clone.
    fn localize_element(&self, node: &NodeRef, culture: &str, project: &Project) {
        let Some(name) = dom::attribute(node, markers::NAME) else {
            return;
        };
        let Some(field) = self.fields.get(&name) else {
            debug!(path = %self.path, field = %name, "field not in collection, leaving element untouched");
            return;
        };
        let Some(source) = project.resolve_field(self, field) else {
            debug!(path = %self.path, field = %name, "unresolved reference, leaving element untouched");
            return;
        };
        let Some(values) = source.values() else {
            debug!(path = %self.path, field = %name, "reference targets another reference");
            return;
        };

        let accepts_content = !dom::is_void(node);
        for (attribute, translations) in values {
            let Some(text) = translations.get(culture) else {
                continue;
            };
            if attribute.eq_ignore_ascii_case(INNER_HTML) {
                if accepts_content {
                    dom::set_inner_html(node, text);
                }
            } else if attribute.eq_ignore_ascii_case(INNER_TEXT) {
                if accepts_content {
                    dom::set_inner_text(node, text);
                }
            } else if !dom::replace_attribute(node, attribute, text) {
                debug!(path = %self.path, field = %name, attribute = %attribute, "attribute absent on element");
            }
        }
    }
}

/// Read a markup file. Bytes that are not valid UTF-8 are replaced with
/// U+FFFD and a warning is logged.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be read.
pub fn read_markup(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    return Ok(match String::from_utf8(bytes) {
        Ok(html) => html,
        Err(e) => {
            warn!(path = %path.display(), "markup is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        },
    });
}

/// The attribute names to extract for an element.
///
/// An explicit `loc:attributes` list wins. Otherwise the tag override or
/// default list is used, preceded by the inner-content sentinel for
/// elements that can have content.
fn localizable_attributes(node: &NodeRef, options: &ProjectOptions) -> Vec<String> {
    if let Some(explicit) = dom::attribute(node, markers::ATTRIBUTES) {
        return markers::split_attribute_list(&explicit);
    }

    let tag = dom::tag_name(node).unwrap_or_default();
    let mut names = Vec::new();
    if !dom::is_void(node) {
        names.push(INNER_TEXT_OR_HTML.to_string());
    }
    names.extend(options.attributes_for_tag(&tag).names().iter().cloned());
    return names;
}

/// Read one attribute (or pseudo-attribute) of an element.
/// Returns the canonical key and the captured text.
fn capture(node: &NodeRef, attribute: &str, options: ExtractOptions) -> Option<(String, String)> {
    let is_pseudo = [INNER_TEXT_OR_HTML, INNER_TEXT, INNER_HTML]
        .iter()
        .any(|pseudo| pseudo.eq_ignore_ascii_case(attribute));
    if !is_pseudo {
        let value = dom::attribute(node, attribute)?;
        return Some((attribute.to_string(), value));
    }

    // Content never comes from void elements, even when requested explicitly.
    if dom::is_void(node) {
        return None;
    }

    let key = if attribute.eq_ignore_ascii_case(INNER_TEXT_OR_HTML) {
        if dom::child_element_count(node) == 0 { INNER_TEXT } else { INNER_HTML }
    } else if attribute.eq_ignore_ascii_case(INNER_TEXT) {
        INNER_TEXT
    } else {
        INNER_HTML
    };

    let raw = if key == INNER_HTML { dom::inner_html(node) } else { dom::inner_text(node) };
    let value = if options.trim_inner_content { raw.trim().to_string() } else { raw };
    return Some((key.to_string(), value));
}

/// Serialized clone of the element without its `loc:` attributes.
fn source_html(node: &NodeRef) -> String {
    let copy = dom::deep_clone(node);
    dom::strip_markers(&copy);
    return dom::outer_html(&copy);
}
