use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::GocoError;
use crate::providers::ProviderKind;

pub const DEFAULT_GEMINI_KEY_VAR: &str = "GOCO_GEMINI_KEY";
pub const DEFAULT_GROQ_KEY_VAR: &str = "GOCO_GROQ_KEY";
pub const DEFAULT_PROVIDER: &str = "gemini";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "General", default)]
    pub general: General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct General {
    #[serde(default = "default_gemini_var")]
    pub api_key_gemini_env_variable: String,
    #[serde(default = "default_groq_var")]
    pub api_key_groq_env_variable: String,
    #[serde(default = "default_provider")]
    pub default_provider: String,
}

fn default_gemini_var() -> String {
    DEFAULT_GEMINI_KEY_VAR.to_string()
}

fn default_groq_var() -> String {
    DEFAULT_GROQ_KEY_VAR.to_string()
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

impl Default for General {
    fn default() -> Self {
        Self {
            api_key_gemini_env_variable: default_gemini_var(),
            api_key_groq_env_variable: default_groq_var(),
            default_provider: default_provider(),
        }
    }
}

impl Config {
    /// Load configuration from the user's config file, or defaults if there is none.
    pub fn load() -> Result<Self, GocoError> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load configuration from `path`. A missing file yields defaults; a file
    /// that does not parse is an error.
    pub fn load_from(path: &Path) -> Result<Self, GocoError> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GocoError::Config {
            field: path.display().to_string(),
            message: format!("failed to read config file: {e}"),
            source: Some(Box::new(e)),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| GocoError::Config {
            field: "General".to_string(),
            message: format!("failed to parse {}: {}", path.display(), e.message()),
            source: Some(Box::new(e)),
        })?;
        info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, GocoError> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), GocoError> {
        let write_error = |e: std::io::Error| GocoError::Config {
            field: path.display().to_string(),
            message: format!("failed to write config file: {e}"),
            source: Some(Box::new(e)),
        };

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| GocoError::Config {
            field: "General".to_string(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?;
        fs::write(path, content).map_err(write_error)?;
        info!("Saved config to: {}", path.display());
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf, GocoError> {
        config_path_from(std::env::var("XDG_CONFIG_HOME").ok(), home_dir())
    }

    /// Name of the environment variable holding the Gemini key.
    pub fn get_gemini_api_key(&self) -> &str {
        or_default(&self.general.api_key_gemini_env_variable, DEFAULT_GEMINI_KEY_VAR)
    }

    /// Name of the environment variable holding the Groq key.
    pub fn get_groq_api_key(&self) -> &str {
        or_default(&self.general.api_key_groq_env_variable, DEFAULT_GROQ_KEY_VAR)
    }

    pub fn api_key_env_var(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::Gemini => self.get_gemini_api_key(),
            ProviderKind::Groq => self.get_groq_api_key(),
        }
    }

    pub fn get_default_provider(&self) -> &str {
        or_default(&self.general.default_provider, DEFAULT_PROVIDER)
    }

    pub fn show_config_info_with_io<W: Write>(path: &Path, output: &mut W) -> Result<(), GocoError> {
        let io_error = |e: std::io::Error| GocoError::Config {
            field: "output".to_string(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        };

        writeln!(output, "Configuration file: {}", path.display()).map_err(io_error)?;
        let config = if path.exists() {
            writeln!(output, "Status: Found").map_err(io_error)?;
            Self::load_from(path)?
        } else {
            writeln!(output, "Status: Not found (using defaults)").map_err(io_error)?;
            Self::default()
        };

        writeln!(output, "Default provider: {}", config.get_default_provider()).map_err(io_error)?;
        writeln!(output, "Gemini API key variable: {}", config.get_gemini_api_key()).map_err(io_error)?;
        writeln!(output, "Groq API key variable: {}", config.get_groq_api_key()).map_err(io_error)?;
        writeln!(output, "\nTo set an API key:").map_err(io_error)?;
        writeln!(output, "  export {}=<your-key>", config.get_gemini_api_key()).map_err(io_error)?;
        writeln!(output, "\nTo write a default config file:").map_err(io_error)?;
        writeln!(output, "  goco config --init").map_err(io_error)?;
        Ok(())
    }

    pub fn show_config_info() -> Result<(), GocoError> {
        let path = Self::get_config_path()?;
        Self::show_config_info_with_io(&path, &mut std::io::stdout())
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() { default } else { value.trim() }
}

/// `$XDG_CONFIG_HOME/goco/config.toml`, else `~/.config/goco/config.toml`.
fn config_path_from(xdg: Option<String>, home: Option<PathBuf>) -> Result<PathBuf, GocoError> {
    if let Some(xdg) = xdg.filter(|x| !x.trim().is_empty()) {
        return Ok(PathBuf::from(xdg).join("goco").join("config.toml"));
    }
    let home = home.ok_or_else(|| GocoError::Config {
        field: "path".to_string(),
        message: "could not find home directory".to_string(),
        source: None,
    })?;
    Ok(home.join(".config").join("goco").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.get_gemini_api_key(), "GOCO_GEMINI_KEY");
        assert_eq!(config.get_groq_api_key(), "GOCO_GROQ_KEY");
        assert_eq!(config.get_default_provider(), "gemini");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[General]\ndefault_provider = \"groq\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.get_default_provider(), "groq");
        assert_eq!(config.api_key_env_var(ProviderKind::Gemini), "GOCO_GEMINI_KEY");
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[General]\napi_key_groq_env_variable = \"\"\ndefault_provider = \"  \"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.api_key_env_var(ProviderKind::Groq), "GOCO_GROQ_KEY");
        assert_eq!(config.get_default_provider(), "gemini");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[General\nnot toml").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, GocoError::Config { .. }));
    }

    #[test]
    fn test_save_creates_directory_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("goco").join("config.toml");
        let mut config = Config::default();
        config.general.api_key_gemini_env_variable = "MY_GEMINI".to_string();

        config.save_to(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[General]"));
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_config_path_prefers_xdg() {
        let path = config_path_from(Some("/xdg".to_string()), Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(path, PathBuf::from("/xdg/goco/config.toml"));

        let path = config_path_from(None, Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.config/goco/config.toml"));

        assert!(config_path_from(Some(String::new()), None).is_err());
    }

    #[test]
    fn test_show_config_info_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut output = Vec::new();

        Config::show_config_info_with_io(&dir.path().join("config.toml"), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Not found (using defaults)"));
        assert!(text.contains("GOCO_GEMINI_KEY"));
        assert!(text.contains("goco config --init"));
    }
}
