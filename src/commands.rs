//! CLI commands for htmlloc: build and status.

use std::path::Path;

use crate::config::ScanConfig;
use crate::error;
use crate::project::Project;
use crate::types::FileLayout;

/// Flags of the build command.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Update the record without rendering.
    pub extract_only: bool,
    /// Output path strategy.
    pub layout: FileLayout,
    /// Remove soft-deleted fields before saving.
    pub prune: bool,
}

/// Scan the record's directory, merge the extracted fields into the project,
/// optionally drop soft-deleted fields, save the record, then render every
/// discovered culture unless `extract_only` is set.
///
/// # Errors
///
/// Returns errors from loading the record or scan config, scanning,
/// saving the record, or writing localized output.
pub fn build(project_path: &Path, options: &BuildOptions) -> Result<(), error::Error> {
    let mut project = Project::load(project_path)?;
    let base = project.base_directory().map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf);
    let config = ScanConfig::load(&base)?;

    let summary = project.open_directory(&base, &config)?;
    if options.prune {
        for document in &mut project.documents {
            for name in document.prune_removed_fields() {
                eprintln!("pruned {}#{name}", document.path());
            }
        }
    }
    project.save(project_path)?;
    eprintln!(
        "Scanned {}: {} added, {} updated, {} without fields, {} unreadable",
        base.display(),
        summary.added,
        summary.updated,
        summary.ignored,
        summary.skipped
    );

    if options.extract_only {
        eprintln!("Wrote {} (extract only)", project_path.display());
        return Ok(());
    }

    let cultures = project.cultures();
    let mut written = 0_usize;
    for culture in &cultures {
        let outputs = project.localize(culture, options.layout)?;
        tracing::info!(culture = %culture, files = outputs.len(), "localized");
        written = written.saturating_add(outputs.len());
    }

    eprintln!(
        "Wrote {} and {written} localized files for {} cultures",
        project_path.display(),
        cultures.len()
    );
    return Ok(());
}

/// Print translation progress for every tracked document.
/// Loads the record only; nothing is scanned or written.
///
/// # Errors
///
/// Returns errors from loading the record.
pub fn status(project_path: &Path) -> Result<(), error::Error> {
    let project = Project::load(project_path)?;
    let cultures = project.cultures();

    if project.documents.is_empty() {
        println!("No documents tracked in {}", project_path.display());
        return Ok(());
    }

    for document in &project.documents {
        println!("{}", document.path());
        println!("  options: {:?}", document.options);
        println!("  fields:  {}", document.fields.len());

        let removed: Vec<&str> = document
            .fields
            .iter()
            .filter(|field| !field.exists)
            .map(|field| field.name())
            .collect();
        if !removed.is_empty() {
            println!("  removed: {}", removed.join(", "));
        }

        for culture in &cultures {
            let untranslated = document
                .fields
                .iter()
                .filter(|field| !field.untranslated_attributes(culture).is_empty())
                .count();
            println!("  {culture}: {untranslated} untranslated");
        }
    }

    println!();
    println!("{} documents, {} cultures", project.documents.len(), cultures.len());
    return Ok(());
}
