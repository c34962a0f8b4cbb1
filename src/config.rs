//! Optional `.htmlloc.toml` scan configuration.

use std::path::Path;

use crate::error::Error;

/// Name of the optional scan configuration file in the base directory.
pub const CONFIG_FILE: &str = ".htmlloc.toml";

/// Scan configuration loaded from `.htmlloc.toml`.
/// Include/exclude patterns are path prefixes applied to HTML document paths
/// relative to the base directory.
#[derive(Debug, Default)]
pub struct ScanConfig {
    /// Prefixes a document must start with (empty = everything).
    include: Vec<String>,
    /// Prefixes that remove a document from the scan.
    exclude: Vec<String>,
}

/// Raw TOML structure for `.htmlloc.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct HtmllocTomlConfig {
    /// Include prefixes.
    #[serde(default)]
    include: Vec<String>,
    /// Exclude prefixes.
    #[serde(default)]
    exclude: Vec<String>,
}

impl ScanConfig {
    /// Load config from `.htmlloc.toml` in the given base directory.
    /// Returns a default that scans everything if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(base: &Path) -> Result<Self, Error> {
        let path = base.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: HtmllocTomlConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), include = ?raw.include, exclude = ?raw.exclude, "loaded scan config");
        return Ok(Self {
            include: raw.include,
            exclude: raw.exclude,
        });
    }

    /// Check whether a document path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| relative_path.starts_with(p.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_scans_everything() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScanConfig::load(dir.path()).unwrap();
        assert!(config.should_scan("index.html"));
        assert!(config.should_scan("deep/page.html"));
    }

    #[test]
    fn include_then_exclude() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "include = [\"pages/\"]\nexclude = [\"pages/drafts/\"]\n",
        )
        .unwrap();
        let config = ScanConfig::load(dir.path()).unwrap();
        assert!(config.should_scan("pages/index.html"));
        assert!(!config.should_scan("pages/drafts/wip.html"));
        assert!(!config.should_scan("index.html"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "include = 3").unwrap();
        assert!(matches!(ScanConfig::load(dir.path()), Err(Error::TomlDe(_))));
    }
}
