use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value in config file at {config_path}: {message}")]
    ConfigValueError {
        config_path: PathBuf,
        message: String,
    },
}

/// Widest style-block nesting step accepted from a config file.
pub const MAX_INDENT: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document opened when the command line names none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_document: Option<PathBuf>,
    pub style: StyleConfig,
    pub targets: TargetConfig,
}

/// How the `--- style` block is written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// How preview clicks become style targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Prefix of the rendered block classes, `mkly` in `mkly-core-text`.
    pub class_prefix: String,
    /// Emit `>p:nth-of-type(2)` instead of `>p` when siblings share a tag.
    pub positional: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            class_prefix: "mkly".to_string(),
            positional: false,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config
            .validate()
            .map_err(|message| ConfigError::ConfigValueError {
                config_path: config_path.to_path_buf(),
                message,
            })?;

        // Expand shell variables and tilde in the loaded document path
        config.default_document = config
            .default_document
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/mkly-editor");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn validate(&self) -> Result<(), String> {
        if self.style.indent == 0 || self.style.indent > MAX_INDENT {
            return Err(format!(
                "style.indent must be between 1 and {MAX_INDENT}, got {}",
                self.style.indent
            ));
        }
        let prefix = &self.targets.class_prefix;
        if prefix.is_empty() || prefix.contains(char::is_whitespace) {
            return Err(format!(
                "targets.class_prefix must be a single non-empty word, got '{prefix}'"
            ));
        }
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let config_file = dir.path().join("config.toml");
        std::fs::write(&config_file, content).unwrap();
        config_file
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        // Should contain the expected config file name
        assert!(path_str.ends_with(".config/mkly-editor/config.toml"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.style.indent, 2);
        assert_eq!(config.targets.class_prefix, "mkly");
        assert!(!config.targets.positional);
        assert_eq!(config.default_document, None);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            default_document: Some(PathBuf::from("/tmp/page.mkly")),
            style: StyleConfig { indent: 4 },
            targets: TargetConfig {
                class_prefix: "acme".to_string(),
                positional: true,
            },
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "[targets]\npositional = true\n");

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert!(config.targets.positional);
        assert_eq!(config.targets.class_prefix, "mkly");
        assert_eq!(config.style, StyleConfig::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "[style]\nindent = 0\n");

        let result = Config::load_from_path(&config_file);
        assert!(matches!(result, Err(ConfigError::ConfigValueError { .. })));

        let config_file = write_config(&temp_dir, "[targets]\nclass_prefix = \"my kit\"\n");
        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(err.to_string().contains("class_prefix"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "[style\nindent = 2\n");

        let result = Config::load_from_path(&config_file);
        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path);

        assert!(expanded.is_some());
        let expanded = expanded.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            style: StyleConfig { indent: 3 },
            ..Config::default()
        };

        // Test saving
        test_config.save_to_path(&config_file).unwrap();

        // Test loading
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_config_with_env_var_in_toml() {
        unsafe {
            env::set_var("MKLY_PAGES", "/custom/pages");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(
            &temp_dir,
            "default_document = \"$MKLY_PAGES/home.mkly\"\n",
        );
        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            config.default_document,
            Some(PathBuf::from("/custom/pages/home.mkly"))
        );

        unsafe {
            env::remove_var("MKLY_PAGES");
        }
    }
}
