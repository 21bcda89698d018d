use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CleanerError, Result};

/// Runtime settings. Precedence: CLI flags > environment > TOML file > defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub delimiter: String,
    pub log_dir: PathBuf,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            report: None,
            delimiter: ",".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl CleanerConfig {
    /// Load from an optional TOML file, then apply `CLEANER_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CleanerError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CleanerConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment, in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = lookup("CLEANER_INPUT") {
            self.input = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("CLEANER_OUTPUT") {
            self.output = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("CLEANER_REPORT") {
            self.report = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("CLEANER_DELIMITER") {
            self.delimiter = v;
        }
        if let Some(v) = lookup("CLEANER_LOG_DIR") {
            self.log_dir = PathBuf::from(v);
        }
    }

    /// The delimiter as a byte. Must be exactly one ASCII character.
    pub fn delimiter_byte(&self) -> Result<u8> {
        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Ok(c as u8),
            _ => Err(CleanerError::Config(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ))),
        }
    }

    /// Where the cleaned CSV goes: the configured output, or `<stem>_clean.csv` next to the input
    pub fn output_path(&self, input: &Path) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        input.with_file_name(format!("{}_clean.csv", stem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = CleanerConfig::default();
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert!(config.input.is_none());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = CleanerConfig::from_toml("input = \"data/customers.csv\"\ndelimiter = \";\"\n").unwrap();
        assert_eq!(config.input, Some(PathBuf::from("data/customers.csv")));
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(matches!(
            CleanerConfig::from_toml("delimiter = ["),
            Err(CleanerError::Toml(_))
        ));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut config = CleanerConfig::from_toml("output = \"a.csv\"").unwrap();
        let env: HashMap<&str, &str> = [("CLEANER_OUTPUT", "b.csv"), ("CLEANER_LOG_DIR", "  ")].into();

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.output, Some(PathBuf::from("b.csv")));
        // Blank values are ignored
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_delimiter_must_be_one_ascii_char() {
        let mut config = CleanerConfig::default();
        config.delimiter = ";;".to_string();
        assert!(config.delimiter_byte().is_err());
        config.delimiter = "é".to_string();
        assert!(config.delimiter_byte().is_err());
        config.delimiter = "\t".to_string();
        assert_eq!(config.delimiter_byte().unwrap(), b'\t');
    }

    #[test]
    fn test_output_path_defaults_next_to_input() {
        let config = CleanerConfig::default();
        assert_eq!(
            config.output_path(Path::new("data/customers.csv")),
            PathBuf::from("data/customers_clean.csv")
        );
    }

    #[test]
    fn test_missing_config_file() {
        let err = CleanerConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }
}
