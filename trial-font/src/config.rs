//! Settings shared by every font in a run
use std::path::PathBuf;

use write_fonts::read::collections::IntSet;

use crate::{
    partition::Replacer,
    unicodes::{parse_unicodes, DEFAULT_UNICODES},
    Error,
};

pub const DEFAULT_SUFFIX: &str = "Trial";

/// How trial fonts are made. Built once, before any font is read.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialConfig {
    /// Codepoints that render with their own glyph.
    pub unicodes: IntSet<u32>,
    pub replacer: Replacer,
    /// Appended to the family names, and inserted into output file names.
    pub suffix: String,
    /// Keep the full character set and only rename.
    pub extended: bool,
    /// Where output is written. Defaults to the directory of each input.
    pub output_dir: Option<PathBuf>,
}

impl TrialConfig {
    /// Parse and check the textual settings.
    pub fn new(unicodes: &str, replacer: &str, suffix: &str) -> Result<Self, Error> {
        let suffix = suffix.trim();
        if suffix.is_empty() {
            return Err(Error::EmptySuffix);
        }
        Ok(TrialConfig {
            unicodes: parse_unicodes(unicodes)?,
            replacer: replacer.parse()?,
            suffix: suffix.to_owned(),
            extended: false,
            output_dir: None,
        })
    }

    pub fn extended(self, extended: bool) -> Self {
        TrialConfig { extended, ..self }
    }

    pub fn output_dir(self, output_dir: Option<PathBuf>) -> Self {
        TrialConfig { output_dir, ..self }
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        TrialConfig {
            unicodes: parse_unicodes(DEFAULT_UNICODES).unwrap_or_default(),
            replacer: Replacer::default(),
            suffix: DEFAULT_SUFFIX.to_owned(),
            extended: false,
            output_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TrialConfig::default();
        assert_eq!(
            config,
            TrialConfig::new(DEFAULT_UNICODES, "X", DEFAULT_SUFFIX).unwrap()
        );
        assert_eq!(config.replacer, Replacer::GlyphName("X".into()));
        assert_eq!(config.unicodes.len(), 93);
        assert!(!config.extended);
    }

    #[test]
    fn suffix_is_trimmed() {
        let config = TrialConfig::new("41", "X", "  Demo ").unwrap();
        assert_eq!(config.suffix, "Demo");
    }

    #[test]
    fn invalid_settings() {
        assert!(matches!(
            TrialConfig::new("41", "X", " "),
            Err(Error::EmptySuffix)
        ));
        assert!(matches!(
            TrialConfig::new("4G", "X", "Trial"),
            Err(Error::InvalidUnicode(_))
        ));
        assert!(matches!(
            TrialConfig::new("41", "U+", "Trial"),
            Err(Error::InvalidReplacer(_))
        ));
    }
}
