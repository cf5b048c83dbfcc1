//! Extraction options and configuration file support.
//!
//! [`ExtractConfig`] holds the options the pipeline recognizes. Defaults can
//! be kept in a `.ferro-extract.toml` file:
//!
//! ```toml
//! [extract]
//! pass-only = true
//! ensure-pairs = false
//! fasta = "/data/ref/GRCh38.fa"
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro-extract.toml` in current directory
//! 2. `~/.config/ferro/extract.toml`
//!
//! CLI flags take precedence over config file settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// Options controlling record filtering, pairing strictness and anchor lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Drop records whose FILTER does not contain PASS
    pub pass_only: bool,
    /// Fail when breakends remain unpaired in a file where pairing succeeded
    pub ensure_pairs: bool,
    /// Indexed FASTA used to fill in anchor bases
    pub fasta_ref: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            pass_only: false,
            ensure_pairs: true,
            fasta_ref: None,
        }
    }
}

impl ExtractConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pass_only(mut self, pass_only: bool) -> Self {
        self.pass_only = pass_only;
        self
    }

    pub fn with_ensure_pairs(mut self, ensure_pairs: bool) -> Self {
        self.ensure_pairs = ensure_pairs;
        self
    }

    pub fn with_fasta_ref(mut self, path: impl Into<PathBuf>) -> Self {
        self.fasta_ref = Some(path.into());
        self
    }
}

/// Values read from a config file; unset keys leave the defaults alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub pass_only: Option<bool>,
    pub ensure_pairs: Option<bool>,
    pub fasta: Option<PathBuf>,
}

impl ConfigFile {
    /// Load configuration from the default locations.
    pub fn load() -> Option<Self> {
        let cwd_config = PathBuf::from(".ferro-extract.toml");
        if cwd_config.exists() {
            match Self::load_from_path(&cwd_config) {
                Ok(config) => return Some(config),
                Err(e) => log::warn!("ignoring {}: {}", cwd_config.display(), e),
            }
        }

        if let Some(home) = dirs_home() {
            let home_config = home.join(".config").join("ferro").join("extract.toml");
            if home_config.exists() {
                match Self::load_from_path(&home_config) {
                    Ok(config) => return Some(config),
                    Err(e) => log::warn!("ignoring {}: {}", home_config.display(), e),
                }
            }
        }

        None
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ExtractError> {
        let content = fs::read_to_string(path).map_err(|e| ExtractError::Config {
            msg: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    ///
    /// Only the `[extract]` section is read; other sections are skipped.
    pub fn parse(content: &str) -> Result<Self, ExtractError> {
        let mut config = ConfigFile::default();
        let mut in_extract = false;

        for (i, line) in content.lines().enumerate() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                in_extract = &line[1..line.len() - 1] == "extract";
                continue;
            }

            if !in_extract {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ExtractError::Config {
                    msg: format!("line {}: expected key = value", i + 1),
                });
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "pass-only" => config.pass_only = Some(parse_bool(key, value)?),
                "ensure-pairs" => config.ensure_pairs = Some(parse_bool(key, value)?),
                "fasta" => config.fasta = Some(PathBuf::from(unquote(value))),
                other => log::warn!("unknown config key '{}'", other),
            }
        }

        Ok(config)
    }

    /// Apply file values over the defaults
    pub fn to_extract_config(&self) -> ExtractConfig {
        let defaults = ExtractConfig::default();
        ExtractConfig {
            pass_only: self.pass_only.unwrap_or(defaults.pass_only),
            ensure_pairs: self.ensure_pairs.unwrap_or(defaults.ensure_pairs),
            fasta_ref: self.fasta.clone(),
        }
    }

    /// Merge this config with CLI arguments.
    /// CLI arguments take precedence; a flag that is off leaves the file value.
    pub fn merge_with_cli(
        &self,
        pass_only: bool,
        allow_unpaired: bool,
        fasta: Option<&Path>,
    ) -> ExtractConfig {
        let mut config = self.to_extract_config();
        if pass_only {
            config.pass_only = true;
        }
        if allow_unpaired {
            config.ensure_pairs = false;
        }
        if let Some(path) = fasta {
            config.fasta_ref = Some(path.to_path_buf());
        }
        config
    }
}

fn strip_comment(line: &str) -> &str {
    // Quoted values may legitimately contain '#'
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' | '\'' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}

fn unquote(value: &str) -> &str {
    value.trim_matches('"').trim_matches('\'')
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ExtractError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ExtractError::Config {
            msg: format!("'{}' expects true or false, found '{}'", key, other),
        }),
    }
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::default();
        assert!(!config.pass_only);
        assert!(config.ensure_pairs);
        assert!(config.fasta_ref.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ExtractConfig::new()
            .with_pass_only(true)
            .with_ensure_pairs(false)
            .with_fasta_ref("ref.fa");
        assert!(config.pass_only);
        assert!(!config.ensure_pairs);
        assert_eq!(config.fasta_ref, Some(PathBuf::from("ref.fa")));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = ConfigFile::parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.to_extract_config(), ExtractConfig::default());
    }

    #[test]
    fn test_parse_extract_section() {
        let content = r#"
# defaults for the lab cluster
[other]
pass-only = maybe

[extract]
pass-only = true   # only PASS calls
ensure-pairs = false
fasta = "/data/ref#1/GRCh38.fa"
"#;
        let config = ConfigFile::parse(content).unwrap();
        assert_eq!(config.pass_only, Some(true));
        assert_eq!(config.ensure_pairs, Some(false));
        assert_eq!(config.fasta, Some(PathBuf::from("/data/ref#1/GRCh38.fa")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ConfigFile::parse("[extract]\npass-only = yes\n"),
            Err(ExtractError::Config { .. })
        ));
        assert!(matches!(
            ConfigFile::parse("[extract]\npass-only\n"),
            Err(ExtractError::Config { .. })
        ));
    }

    #[test]
    fn test_merge_with_cli() {
        let file = ConfigFile {
            pass_only: Some(false),
            ensure_pairs: Some(true),
            fasta: Some(PathBuf::from("file.fa")),
        };

        let merged = file.merge_with_cli(false, false, None);
        assert_eq!(merged.fasta_ref, Some(PathBuf::from("file.fa")));
        assert!(merged.ensure_pairs);

        let merged = file.merge_with_cli(true, true, Some(Path::new("cli.fa")));
        assert!(merged.pass_only);
        assert!(!merged.ensure_pairs);
        assert_eq!(merged.fasta_ref, Some(PathBuf::from("cli.fa")));
    }

    #[test]
    fn test_load_from_path() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[extract]\nensure-pairs = false").unwrap();
        file.flush().unwrap();

        let config = ConfigFile::load_from_path(file.path()).unwrap();
        assert_eq!(config.ensure_pairs, Some(false));
        assert!(ConfigFile::load_from_path(Path::new("/nonexistent/x.toml")).is_err());
    }
}
