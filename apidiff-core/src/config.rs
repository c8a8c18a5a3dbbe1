//! Analysis configuration loaded from TOML.
//!
//! All sections are optional. An empty document, or no configuration at
//! all, gives the same behavior as the unconfigured entry points.
//!
//! # Example Configuration
//!
//! ```toml
//! [differ]
//! report_additions = true
//! property_type_severity = "major"
//!
//! [impact]
//! reference_types = ["api", "reference", "sdk"]
//! max_scan_chars = 200000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::differ::Severity;
use crate::error::Result;

/// Root configuration structure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Surface differ policy.
    #[serde(default)]
    pub differ: DiffOptions,

    /// Documentation impact analysis settings.
    #[serde(default)]
    pub impact: ImpactOptions,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// A missing file is an error; callers that want defaults in that case
    /// fall back to [`Config::default`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Surface differ policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Emit informational `function_added` changes.
    pub report_additions: bool,

    /// Severity for an interface property whose type text changed.
    pub property_type_severity: Severity,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            report_additions: true,
            property_type_severity: Severity::Major,
        }
    }
}

/// Documentation impact analysis settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactOptions {
    /// Document types that describe APIs. Matched case-insensitively.
    /// Narrative types such as `readme` or `guide` are left out so casual
    /// mentions do not count as impact.
    pub reference_types: Vec<String>,

    /// Only the first this-many characters of each document are scanned.
    /// `None` scans whole documents.
    pub max_scan_chars: Option<usize>,
}

/// Default cap on characters scanned per document.
pub const DEFAULT_MAX_SCAN_CHARS: usize = 200_000;

impl Default for ImpactOptions {
    fn default() -> Self {
        Self {
            reference_types: ["api", "api-reference", "reference", "sdk"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            max_scan_chars: Some(DEFAULT_MAX_SCAN_CHARS),
        }
    }
}

impl ImpactOptions {
    pub fn is_reference_type(&self, doc_type: &str) -> bool {
        self.reference_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(doc_type.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.differ.report_additions);
        assert_eq!(config.differ.property_type_severity, Severity::Major);
        assert_eq!(config.impact.max_scan_chars, Some(DEFAULT_MAX_SCAN_CHARS));
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
[differ]
property_type_severity = "minor"

[impact]
reference_types = ["openapi"]
"#,
        )
        .unwrap();

        assert!(config.differ.report_additions);
        assert_eq!(config.differ.property_type_severity, Severity::Minor);
        assert_eq!(config.impact.reference_types, vec!["openapi"]);
        assert_eq!(config.impact.max_scan_chars, Some(DEFAULT_MAX_SCAN_CHARS));
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::from_toml_str("[differ]\nreport_additions = \"yes\"").unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("apidiff.toml");
        fs::write(&path, "[differ]\nreport_additions = false\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.differ.report_additions);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_reference_type_matching() {
        let options = ImpactOptions::default();
        assert!(options.is_reference_type("api"));
        assert!(options.is_reference_type("API"));
        assert!(options.is_reference_type("sdk"));
        assert!(!options.is_reference_type("readme"));
        assert!(!options.is_reference_type("guide"));
    }
}
