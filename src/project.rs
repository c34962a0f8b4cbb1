//! The project aggregate: documents, options, scanning, persistence, and
//! multi-culture output.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::document::{self, Document};
use crate::error::Error;
use crate::field::Field;
use crate::options::ProjectOptions;
use crate::record::{DocumentRecord, FieldRecord, ProjectRecord};
use crate::scanner;
use crate::types::{FileLayout, INVARIANT_CULTURE};

/// What a directory scan did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Documents newly added to the project.
    pub added: usize,
    /// HTML files found that produced no fields and are not tracked.
    pub ignored: usize,
    /// HTML files that could not be read.
    pub skipped: usize,
    /// Documents that were already tracked and got re-extracted.
    pub updated: usize,
}

/// All documents of one localization project plus their shared options.
#[derive(Debug, Default)]
pub struct Project {
    /// Root for scanning and output generation.
    base_directory: Option<PathBuf>,
    /// Tracked documents, unique by case-insensitive path.
    pub documents: Vec<Document>,
    /// Localizable attribute configuration.
    pub options: ProjectOptions,
}

impl Project {
    /// Empty project with default options.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Directory against which document paths resolve.
    pub fn base_directory(&self) -> Option<&Path> {
        return self.base_directory.as_deref();
    }

    /// Load the record at `path`, or start empty if it does not exist. The
    /// record's directory becomes the base directory, and every document is
    /// re-parsed from disk.
    ///
    /// # Errors
    ///
    /// Returns errors from reading or validating the record, or from reading
    /// tracked documents.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let base = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let Some(record) = ProjectRecord::read(path)? else {
            info!(path = %path.display(), "no project record yet, starting empty");
            let mut project = Self::new();
            project.base_directory = Some(base);
            return Ok(project);
        };

        let mut project = Self::from_record(record)?;
        for document in &mut project.documents {
            if !document.load_from_disk(&base)? {
                warn!(path = %document.path(), "tracked document not found on disk");
            }
        }
        project.base_directory = Some(base);
        return Ok(project);
    }

    /// Rebuild a project from its record without touching the disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingIdentifier`, `Error::DuplicateDocument`, or
    /// `Error::DuplicateField` if the record violates an invariant.
    pub fn from_record(record: ProjectRecord) -> Result<Self, Error> {
        let mut project = Self {
            base_directory: None,
            documents: Vec::with_capacity(record.files.len()),
            options: record.options,
        };
        for document_record in record.files {
            let mut document = Document::new(&document_record.path);
            document.options = document_record.options;
            for field_record in document_record.fields {
                document.fields.push(field_record.into_field()?)?;
            }
            document.relink();
            project.add_document(document)?;
        }
        return Ok(project);
    }

    /// The persisted shape of the whole project.
    pub fn to_record(&self) -> ProjectRecord {
        return ProjectRecord {
            files: self
                .documents
                .iter()
                .map(|document| DocumentRecord {
                    fields: document.fields.iter().map(FieldRecord::from_field).collect(),
                    options: document.options,
                    path: document.path().to_string(),
                })
                .collect(),
            options: self.options.clone(),
        };
    }

    /// Write the project record.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` or `Error::Io` from writing the record.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        self.to_record().write(path)?;
        debug!(path = %path.display(), documents = self.documents.len(), "saved project record");
        return Ok(());
    }

    /// Track a document.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingIdentifier` for a blank path, or
    /// `Error::DuplicateDocument` if the path is already tracked.
    pub fn add_document(&mut self, document: Document) -> Result<(), Error> {
        if document.path().trim().is_empty() {
            return Err(Error::MissingIdentifier { what: "document path" });
        }
        if self.position_of(document.path()).is_some() {
            return Err(Error::DuplicateDocument {
                path: document.path().to_string(),
            });
        }
        self.documents.push(document);
        return Ok(());
    }

    /// Document by path, compared case-insensitively.
    pub fn document(&self, path: &str) -> Option<&Document> {
        return self.documents.get(self.position_of(path)?);
    }

    /// Index of a document by case-insensitive path.
    fn position_of(&self, path: &str) -> Option<usize> {
        return self
            .documents
            .iter()
            .position(|document| document.path().eq_ignore_ascii_case(path));
    }

    /// Scan `root` for HTML files, extract their fields, and merge them into
    /// the project. `root` becomes the base directory.
    ///
    /// Existing documents are re-extracted even when they no longer contain
    /// fields; new documents are only tracked if they contain at least one.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateField` or `Error::DuplicateDocument` if an
    /// internal invariant is broken. Unreadable files are skipped.
    pub fn open_directory(&mut self, root: &Path, config: &ScanConfig) -> Result<ScanSummary, Error> {
        self.base_directory = Some(root.to_path_buf());
        let mut summary = ScanSummary::default();

        for file in scanner::scan(root, config) {
            let html = match document::read_markup(&file.absolute) {
                Ok(html) => html,
                Err(e) => {
                    warn!(path = %file.absolute.display(), error = %e, "skipping unreadable file");
                    summary.skipped = summary.skipped.saturating_add(1);
                    continue;
                },
            };

            if let Some(position) = self.position_of(&file.relative) {
                let Some(document) = self.documents.get_mut(position) else {
                    continue;
                };
                document.set_path(&file.relative);
                document.load_html(&html);
                document.extract_fields(&self.options)?;
                summary.updated = summary.updated.saturating_add(1);
                continue;
            }

            let mut document = Document::new(&file.relative);
            document.load_html(&html);
            if document.extract_fields(&self.options)? == 0 {
                debug!(path = %file.relative, "no localizable fields, not tracking");
                summary.ignored = summary.ignored.saturating_add(1);
                continue;
            }
            info!(path = %file.relative, fields = document.fields.len(), "tracking new document");
            self.add_document(document)?;
            summary.added = summary.added.saturating_add(1);
        }

        return Ok(summary);
    }

    /// The field whose values render `field`: `field` itself, or the target
    /// of its reference. References are followed a single hop and matched by
    /// exact document path; a missing target yields `None`.
    pub fn resolve_field<'a>(&'a self, owner: &'a Document, field: &'a Field) -> Option<&'a Field> {
        let Some(reference) = field.reference() else {
            return Some(field);
        };
        if reference.is_local() {
            return owner.fields.get(&reference.name);
        }
        let target = self
            .documents
            .iter()
            .find(|document| document.path() == reference.path)?;
        return target.fields.get(&reference.name);
    }

    /// Every non-invariant culture present in any value table, sorted.
    pub fn cultures(&self) -> BTreeSet<String> {
        return self
            .documents
            .iter()
            .flat_map(|document| document.fields.iter())
            .flat_map(Field::cultures)
            .filter(|culture| *culture != INVARIANT_CULTURE)
            .map(String::from)
            .collect();
    }

    /// Render every localizable document for `culture` and write it under
    /// the base directory. Returns the written paths.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if an output file or directory cannot be written.
    pub fn localize(&self, culture: &str, layout: FileLayout) -> Result<Vec<PathBuf>, Error> {
        let base = self.base_directory.clone().unwrap_or_default();
        let mut written = Vec::new();

        for document in &self.documents {
            if !document.can_localize() {
                debug!(path = %document.path(), "reference-only document, not rendered");
                continue;
            }
            if !document.is_loaded() {
                warn!(path = %document.path(), culture, "document not loaded, skipping output");
                continue;
            }
            let Some(html) = document.localize(culture, self) else {
                continue;
            };

            let output = base.join(layout.output_path(document.path(), culture));
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output, html)?;
            debug!(path = %output.display(), "wrote localized document");
            written.push(output);
        }

        return Ok(written);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(path: &str, html: &str, options: &ProjectOptions) -> Document {
        let mut document = Document::new(path);
        document.load_html(html);
        document.extract_fields(options).unwrap();
        document
    }

    fn resource_project() -> Project {
        let mut project = Project::new();
        let mut resources = document("SR.html", "<span loc:name='Cancel'>Cancel</span>", &project.options);
        resources
            .fields
            .get_mut("Cancel")
            .unwrap()
            .set_value("innerText", "fr", "Annuler")
            .unwrap();
        project.add_document(resources).unwrap();
        project
    }

    #[test]
    fn reference_renders_target_translation() {
        let mut project = resource_project();
        let consumer = document("sr.html", "<span loc:name='SR.html#Cancel'>Cancel</span>", &project.options);
        project.documents.push(consumer);

        let consumer = project.documents.get(1).unwrap();
        assert_eq!(consumer.localize("fr", &project).as_deref(), Some("<span>Annuler</span>"));
    }

    #[test]
    fn reference_matches_direct_localization() {
        let mut project = resource_project();
        let consumer = document("page.html", "<span loc:name='SR.html#Cancel'>Cancel</span>", &project.options);
        project.add_document(consumer).unwrap();

        let direct = project.document("SR.html").unwrap().localize("fr", &project);
        let referenced = project.document("page.html").unwrap().localize("fr", &project);
        assert_eq!(direct, referenced);
    }

    #[test]
    fn local_reference_uses_owning_document() {
        let project = Project::new();
        let mut page = document(
            "page.html",
            "<b loc:name='Yes'>Yes</b><i loc:name='#Yes'>Yes</i>",
            &project.options,
        );
        page.fields.get_mut("Yes").unwrap().set_value("innerText", "de", "Ja").unwrap();
        assert_eq!(page.localize("de", &project).as_deref(), Some("<b>Ja</b><i>Ja</i>"));
    }

    #[test]
    fn unresolved_reference_leaves_element_untranslated() {
        let project = resource_project();
        let page = document(
            "page.html",
            "<span loc:name='Missing.html#Cancel'>Cancel</span><span loc:name='SR.html#Nope'>Nope</span>",
            &project.options,
        );
        assert_eq!(
            page.localize("fr", &project).as_deref(),
            Some("<span>Cancel</span><span>Nope</span>")
        );
    }

    #[test]
    fn reference_lookup_is_exact_path_match() {
        let project = resource_project();
        let page = document("page.html", "<span loc:name='sr.html#Cancel'>Cancel</span>", &project.options);
        assert_eq!(page.localize("fr", &project).as_deref(), Some("<span>Cancel</span>"));
    }

    #[test]
    fn missing_translation_keeps_original() {
        let project = resource_project();
        let resources = project.document("SR.html").unwrap();
        assert_eq!(resources.localize("es", &project).as_deref(), Some("<span>Cancel</span>"));
    }

    #[test]
    fn attributes_and_inner_html_are_translated() {
        let project = Project::new();
        let mut page = document(
            "page.html",
            "<p loc:name='Intro' title='Hi'>Hello <b>you</b></p><img loc:name='Logo' src='en.png' alt='Logo'>",
            &project.options,
        );
        let intro = page.fields.get_mut("Intro").unwrap();
        intro.set_value("innerHtml", "fr", "Bonjour <b>toi</b>").unwrap();
        intro.set_value("title", "fr", "Salut").unwrap();
        let logo = page.fields.get_mut("Logo").unwrap();
        logo.set_value("src", "fr", "fr.png").unwrap();
        logo.set_value("innerText", "fr", "ignored on void").unwrap();
        logo.set_value("srcset", "fr", "absent on element").unwrap();

        assert_eq!(
            page.localize("fr", &project).as_deref(),
            Some("<p title=\"Salut\">Bonjour <b>toi</b></p><img alt=\"Logo\" src=\"fr.png\">")
        );
        // The stored tree is untouched by rendering.
        assert_eq!(
            page.localize("de", &project).as_deref(),
            Some("<p title=\"Hi\">Hello <b>you</b></p><img alt=\"Logo\" src=\"en.png\">")
        );
    }

    #[test]
    fn reference_only_documents_are_not_rendered() {
        let project = Project::new();
        let library = document(
            "lib.html",
            "<div loc:fileOptions='ReferencesOnly'><span loc:name='Ok'>OK</span></div>",
            &project.options,
        );
        assert!(library.localize("fr", &project).is_none());
    }

    #[test]
    fn cultures_are_collected_project_wide() {
        let mut project = resource_project();
        let mut page = document("page.html", "<h1 loc:name='Title'>Hello</h1>", &project.options);
        let title = page.fields.get_mut("Title").unwrap();
        title.set_value("innerText", "de", "Hallo").unwrap();
        title.set_value("innerText", "fr", "Bonjour").unwrap();
        project.add_document(page).unwrap();

        let cultures: Vec<String> = project.cultures().into_iter().collect();
        assert_eq!(cultures, vec!["de", "fr"]);
    }

    #[test]
    fn documents_are_unique_case_insensitively() {
        let mut project = resource_project();
        assert!(matches!(
            project.add_document(Document::new("sr.HTML")),
            Err(Error::DuplicateDocument { .. })
        ));
        assert!(matches!(
            project.add_document(Document::new(" ")),
            Err(Error::MissingIdentifier { .. })
        ));
        assert!(project.document("sr.html").is_some());
    }

    #[test]
    fn record_round_trip_keeps_translations() {
        let mut project = resource_project();
        let consumer = document("page.html", "<span loc:name='SR.html#Cancel'>Cancel</span>", &project.options);
        project.add_document(consumer).unwrap();

        let restored = Project::from_record(project.to_record()).unwrap();
        let cancel = restored.document("SR.html").unwrap().fields.get("Cancel").unwrap();
        assert_eq!(cancel.value("innerText", "fr"), Some("Annuler"));
        assert_eq!(cancel.owner(), "SR.html");
        let reference = restored.document("page.html").unwrap().fields.get("SR.html#Cancel").unwrap();
        assert!(reference.is_reference());
        assert_eq!(reference.owner(), "page.html");
    }

    #[test]
    fn open_directory_tracks_only_documents_with_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1 loc:name='Title'>Hello</h1>").unwrap();
        std::fs::write(dir.path().join("plain.html"), "<h1>Hello</h1>").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/page.html"), "<p loc:name='Body'>Text</p>").unwrap();

        let mut project = Project::new();
        let summary = project.open_directory(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(summary, ScanSummary { added: 2, ignored: 1, skipped: 0, updated: 0 });
        assert!(project.document("sub/page.html").is_some());
        assert!(project.document("plain.html").is_none());

        let again = project.open_directory(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(again, ScanSummary { added: 0, ignored: 1, skipped: 0, updated: 2 });
    }

    #[test]
    fn invalid_utf8_markup_is_decoded_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let record_path = dir.path().join("project.json");
        // "Café" in Latin-1.
        std::fs::write(dir.path().join("legacy.html"), b"<p loc:name='Menu'>Caf\xe9</p>").unwrap();

        let mut project = Project::new();
        let summary = project.open_directory(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(summary, ScanSummary { added: 1, ignored: 0, skipped: 0, updated: 0 });
        let menu = project.document("legacy.html").unwrap().fields.get("Menu").unwrap();
        assert_eq!(menu.value("innerText", INVARIANT_CULTURE), Some("Caf\u{fffd}"));
        project.save(&record_path).unwrap();

        std::fs::write(dir.path().join("legacy.html"), b"<p loc:name='Menu'>Men\xfc</p>").unwrap();
        let loaded = Project::load(&record_path).unwrap();
        assert!(loaded.document("legacy.html").unwrap().is_loaded());
    }

    #[test]
    fn localize_writes_each_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/page.html"), "<h1 loc:name='Title'>Hello</h1>").unwrap();

        let mut project = Project::new();
        project.open_directory(dir.path(), &ScanConfig::default()).unwrap();
        project
            .documents
            .first_mut()
            .unwrap()
            .fields
            .get_mut("Title")
            .unwrap()
            .set_value("innerText", "fr", "Bonjour")
            .unwrap();

        project.localize("fr", FileLayout::SubDirectory).unwrap();
        project.localize("fr", FileLayout::Extensions).unwrap();

        let nested = std::fs::read_to_string(dir.path().join("docs/fr/page.html")).unwrap();
        let suffixed = std::fs::read_to_string(dir.path().join("docs/page.fr.html")).unwrap();
        assert_eq!(nested, "<h1>Bonjour</h1>");
        assert_eq!(suffixed, "<h1>Bonjour</h1>");
    }

    #[test]
    fn load_relinks_and_reparses_documents() {
        let dir = tempfile::tempdir().unwrap();
        let record_path = dir.path().join("project.json");
        std::fs::write(dir.path().join("index.html"), "<h1 loc:name='Title'>Hello</h1>").unwrap();

        let mut project = Project::new();
        project.open_directory(dir.path(), &ScanConfig::default()).unwrap();
        project.save(&record_path).unwrap();

        let loaded = Project::load(&record_path).unwrap();
        let index = loaded.document("index.html").unwrap();
        assert!(index.is_loaded());
        assert_eq!(index.fields.get("Title").unwrap().owner(), "index.html");
        assert_eq!(loaded.base_directory(), Some(dir.path()));
    }

    #[test]
    fn load_without_record_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::load(&dir.path().join("project.json")).unwrap();
        assert!(project.documents.is_empty());
        assert_eq!(project.options, ProjectOptions::default());
    }
}
