//! Acceptance settings
//!
//! Loaded from a `trackless.toml` file; every key is optional.
//!
//! ```toml
//! normalize = true
//! parallel = false
//!
//! [parts]
//! comments = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trackless_ooxml::PartKind;

/// File name looked up in the working directory when no config is given
pub const DEFAULT_CONFIG_FILE: &str = "trackless.toml";

/// Errors reading or writing settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML for these settings
    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be written as TOML
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptSettings {
    /// Run the structural normalizer on parts that had revisions
    pub normalize: bool,
    /// Process parts in parallel
    pub parallel: bool,
    /// Which parts besides the main document are processed
    pub parts: PartSelection,
}

impl Default for AcceptSettings {
    fn default() -> Self {
        Self {
            normalize: true,
            parallel: false,
            parts: PartSelection::default(),
        }
    }
}

impl AcceptSettings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Render the settings as TOML
    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Part kinds selected for processing
///
/// The main document is always processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartSelection {
    /// Headers
    pub headers: bool,
    /// Footers
    pub footers: bool,
    /// Footnotes
    pub footnotes: bool,
    /// Endnotes
    pub endnotes: bool,
    /// Comments
    pub comments: bool,
    /// Style definitions
    pub styles: bool,
    /// Numbering definitions
    pub numbering: bool,
}

impl Default for PartSelection {
    fn default() -> Self {
        Self {
            headers: true,
            footers: true,
            footnotes: true,
            endnotes: true,
            comments: true,
            styles: true,
            numbering: true,
        }
    }
}

impl PartSelection {
    /// Whether parts of this kind are processed
    pub fn includes(&self, kind: PartKind) -> bool {
        match kind {
            PartKind::Document => true,
            PartKind::Header => self.headers,
            PartKind::Footer => self.footers,
            PartKind::Footnotes => self.footnotes,
            PartKind::Endnotes => self.endnotes,
            PartKind::Comments => self.comments,
            PartKind::Styles => self.styles,
            PartKind::Numbering => self.numbering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = AcceptSettings::from_toml_str("").unwrap();
        assert_eq!(settings, AcceptSettings::default());
        assert!(settings.normalize);
        assert!(!settings.parallel);
        assert!(settings.parts.includes(PartKind::Comments));
    }

    #[test]
    fn test_partial_config() {
        let settings = AcceptSettings::from_toml_str(
            r#"
parallel = true

[parts]
comments = false
styles = false
"#,
        )
        .unwrap();
        assert!(settings.parallel);
        assert!(settings.normalize);
        assert!(!settings.parts.includes(PartKind::Comments));
        assert!(!settings.parts.includes(PartKind::Styles));
        assert!(settings.parts.includes(PartKind::Header));
        assert!(settings.parts.includes(PartKind::Document));
    }

    #[test]
    fn test_invalid_config() {
        let err = AcceptSettings::from_toml_str("normalize = \"yes\"").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut settings = AcceptSettings::default();
        settings.parts.footnotes = false;
        let toml = settings.to_toml_string().unwrap();
        assert!(toml.contains("footnotes = false"));
        assert_eq!(AcceptSettings::from_toml_str(&toml).unwrap(), settings);
    }
}
