//! User preferences read from `.erised.yaml` at the repository root.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::boundary::BoundaryRules;
use crate::error::{Error, Result};

/// File name looked up at the working-tree root.
pub const PREFERENCES_FILE: &str = ".erised.yaml";

/// Boundary rules used when no preferences file exists.
pub const DEFAULT_BOUNDARY_RULES: [&str; 3] = ["apps/*", "packages/*", "workspaces/*"];

/// Remote used when no preferences file names one.
pub const DEFAULT_REMOTE: &str = "origin";

/// Per-repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Path patterns partitioning changed files into boundaries.
    pub boundary_rules: Vec<String>,
    /// Git remote that mirrored branches are pushed to.
    pub remote: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            boundary_rules: DEFAULT_BOUNDARY_RULES
                .iter()
                .map(|r| (*r).to_string())
                .collect(),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

impl Preferences {
    /// Loads `<root>/.erised.yaml`, falling back to defaults when it is
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(PREFERENCES_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no preferences file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        Self::parse(&contents).map_err(|message| Error::Preferences {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parses preferences from YAML. Missing keys take their default value.
    ///
    /// # Errors
    ///
    /// Returns the parser message if the YAML is malformed.
    pub fn parse(yaml: &str) -> std::result::Result<Self, String> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())
    }

    /// The boundary rules, pre-sorted for matching.
    #[must_use]
    pub fn rules(&self) -> BoundaryRules {
        BoundaryRules::new(&self.boundary_rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_monorepo_layouts() {
        let prefs = Preferences::default();
        assert_eq!(
            prefs.boundary_rules,
            vec!["apps/*", "packages/*", "workspaces/*"]
        );
        assert_eq!(prefs.remote, "origin");
    }

    #[test]
    fn parses_partial_yaml() {
        let yaml = "boundary_rules:\n  - services/*\n  - docs\n";
        let prefs = Preferences::parse(yaml).unwrap();
        assert_eq!(prefs.boundary_rules, vec!["services/*", "docs"]);
        assert_eq!(prefs.remote, "origin");
        assert_eq!(
            prefs.rules().boundary_of("services/api/main.rs"),
            "services/api"
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(Preferences::parse("  \n").unwrap(), Preferences::default());
    }

    #[test]
    fn reports_malformed_yaml() {
        assert!(Preferences::parse("boundary_rules: 3").is_err());
    }

    #[test]
    fn load_reads_file_from_root() {
        let dir = std::env::temp_dir().join("erised_prefs_load_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(PREFERENCES_FILE);
        std::fs::write(&path, "remote: upstream\n").unwrap();

        let prefs = Preferences::load(&dir).unwrap();

        let _ = std::fs::remove_dir_all(&dir);
        assert_eq!(prefs.remote, "upstream");
        assert_eq!(prefs.boundary_rules.len(), 3);
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let dir = std::env::temp_dir().join("erised_prefs_missing_test");
        assert_eq!(Preferences::load(&dir).unwrap(), Preferences::default());
    }
}
