use crate::identifier::DEFAULT_ID_REGEX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Name of the per-directory ordering file
    pub order_file: String,

    /// Root name of the transaction logs
    pub history_file: String,

    /// Identifier pattern
    pub id_regex: String,

    /// Target prefix; "." means the directory's own name plus "_"
    pub prefix: String,

    pub id_prefix: String,
    pub id_start: u64,
    pub id_step: u64,
    pub id_width: usize,

    /// Restart numbering in every directory instead of carrying it forward
    pub restart_ids_per_dir: bool,

    /// Skip directories that have no ordering file
    pub skip_if_no_order_file: bool,

    /// Match ordering lines to files case-insensitively
    pub adapt_case: bool,

    /// Keep undone logs as `u_<name>`
    pub keep_history: bool,

    /// File listing directory names to prune from recursive walks
    pub ignore_file: String,

    /// Default verbosity (0-3)
    pub verbosity: u8,

    /// Whether to use color output by default (None = auto-detect)
    pub use_color: Option<bool>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            order_file: "fssort.ini".to_string(),
            history_file: "rename_history.csv".to_string(),
            id_regex: DEFAULT_ID_REGEX.to_string(),
            prefix: ".".to_string(),
            id_prefix: "i".to_string(),
            id_start: 10,
            id_step: 10,
            id_width: 4,
            restart_ids_per_dir: true,
            skip_if_no_order_file: true,
            adapt_case: true,
            keep_history: false,
            ignore_file: ".regroup.ignore".to_string(),
            verbosity: 1,
            use_color: None,
        }
    }
}

impl Config {
    /// Load config from .regroup/config.toml if it exists
    pub fn load() -> Result<Self> {
        if let Ok(cwd) = std::env::current_dir() {
            let config_path = cwd.join(".regroup").join("config.toml");
            if config_path.exists() {
                return Self::load_from_path(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.order_file, "fssort.ini");
        assert_eq!(config.defaults.history_file, "rename_history.csv");
        assert_eq!(config.defaults.id_regex, r"\d{2,5}");
        assert_eq!(config.defaults.prefix, ".");
        assert_eq!(config.defaults.id_prefix, "i");
        assert_eq!(
            (config.defaults.id_start, config.defaults.id_step, config.defaults.id_width),
            (10, 10, 4)
        );
        assert!(config.defaults.skip_if_no_order_file);
        assert!(config.defaults.adapt_case);
        assert!(!config.defaults.keep_history);
    }

    #[test]
    fn test_load_save_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.defaults.id_prefix = "img".to_string();
        config.defaults.id_width = 6;
        config.defaults.keep_history = true;
        config.defaults.use_color = Some(false);

        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.defaults.id_prefix, "img");
        assert_eq!(loaded.defaults.id_width, 6);
        assert!(loaded.defaults.keep_history);
        assert_eq!(loaded.defaults.use_color, Some(false));
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
[defaults]
order_file = "order.txt"
id_step = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.defaults.order_file, "order.txt");
        assert_eq!(config.defaults.id_step, 5);
        // Other fields should have their defaults
        assert_eq!(config.defaults.history_file, "rename_history.csv");
        assert_eq!(config.defaults.id_start, 10);
        assert!(config.defaults.adapt_case);
    }

    #[test]
    fn test_invalid_config_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[defaults]\nid_step = \"ten\"\n").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}
