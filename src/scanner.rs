use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ScanConfig;

/// An HTML file found under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path usable for reading the file.
    pub absolute: PathBuf,
    /// Forward-slash path relative to the scan root.
    pub relative: String,
}

/// Walk `root` recursively and collect every `.html` file the config allows,
/// in file-name order within each directory.
/// Entries that cannot be read are logged and skipped.
pub fn scan(root: &Path, config: &ScanConfig) -> Vec<ScannedFile> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable directory entry");
                continue;
            },
        };
        if !entry.file_type().is_file() || !is_html(entry.path()) {
            continue;
        }

        let absolute = entry.path();
        let relative = relative_forward_slash(root, absolute);
        if !config.should_scan(&relative) {
            tracing::debug!(path = %relative, "excluded by scan config");
            continue;
        }

        files.push(ScannedFile {
            absolute: absolute.to_path_buf(),
            relative,
        });
    }

    return files;
}

/// Whether the path carries an `.html` extension, in any casing.
fn is_html(path: &Path) -> bool {
    return path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("html"));
}

/// Path of `path` below `root`, joined with `/`.
fn relative_forward_slash(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    return relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_html_recursively_with_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b/nested")).unwrap();
        std::fs::write(dir.path().join("b/nested/page.HTML"), "").unwrap();
        std::fs::write(dir.path().join("a.html"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("page.htm"), "").unwrap();

        let relative: Vec<String> = scan(dir.path(), &ScanConfig::default())
            .into_iter()
            .map(|file| file.relative)
            .collect();
        assert_eq!(relative, vec!["a.html", "b/nested/page.HTML"]);
    }

    #[test]
    fn config_filters_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("drafts")).unwrap();
        std::fs::write(dir.path().join("drafts/wip.html"), "").unwrap();
        std::fs::write(dir.path().join("index.html"), "").unwrap();
        std::fs::write(dir.path().join(crate::config::CONFIG_FILE), "exclude = [\"drafts/\"]\n").unwrap();

        let config = ScanConfig::load(dir.path()).unwrap();
        let files = scan(dir.path(), &config);
        assert_eq!(files.len(), 1);
        assert_eq!(files.first().map(|file| file.relative.as_str()), Some("index.html"));
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(&dir.path().join("absent"), &ScanConfig::default()).is_empty());
    }
}
