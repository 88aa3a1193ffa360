use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RecapError, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GitHub username whose activity is reported
    pub github_username: String,

    /// Repositories to scan, as `owner/repo` qualified names
    pub repositories: Vec<String>,

    /// Length of the reporting window in days (default: 7)
    #[serde(default = "default_days")]
    pub days_to_report: u32,

    /// AI provider discriminator ("groq" or "claude")
    #[serde(default = "default_provider")]
    pub ai_provider: String,

    /// Model override for the selected provider
    pub ai_model: Option<String>,

    /// Directory the report file is written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Path to a prompt template; a built-in template is used when unset
    pub prompt_template: Option<PathBuf>,

    /// Include calendar meetings in the report
    #[serde(default = "default_true")]
    pub calendar_enabled: bool,

    /// Google Calendar id to read events from
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// GitHub token; the GITHUB_TOKEN environment variable takes precedence
    pub github_token: Option<String>,

    /// Groq API key; the GROQ_API_KEY environment variable takes precedence
    pub groq_api_key: Option<String>,

    /// Claude API key; the ANTHROPIC_AUTH_TOKEN environment variable takes precedence
    pub claude_api_key: Option<String>,

    /// Calendar OAuth token; the GOOGLE_CALENDAR_TOKEN environment variable takes precedence
    pub calendar_token: Option<String>,
}

impl Config {
    /// Load configuration from the default location (~/.config/weekly-recap/config.toml)
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RecapError::config(format!(
                "Config file not found at: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RecapError::config("Could not determine home directory"))?;
        Ok(home.join(".config").join("weekly-recap").join("config.toml"))
    }

    /// Create a default configuration file at the default location
    pub fn create_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        // Create parent directories if they don't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = Self::default();
        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(&config_path, toml_string)?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.github_username.is_empty() {
            return Err(RecapError::MissingConfig(
                "github_username is required".to_string(),
            ));
        }

        if self.repositories.is_empty() {
            return Err(RecapError::MissingConfig(
                "at least one repository is required".to_string(),
            ));
        }

        for repo in &self.repositories {
            if !repo.contains('/') {
                return Err(RecapError::config(format!(
                    "repository '{}' is not a qualified owner/repo name",
                    repo
                )));
            }
        }

        if self.days_to_report == 0 {
            return Err(RecapError::config("days_to_report must be > 0"));
        }

        if self.ai_provider.is_empty() {
            return Err(RecapError::MissingConfig(
                "ai_provider is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Load config from file, or create default if it doesn't exist
    pub fn load_or_create_default() -> Result<Self> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(RecapError::Config(_)) => {
                eprintln!("Config file not found. Creating default config...");
                Self::create_default()
            }
            Err(e) => Err(e),
        }
    }

    /// GitHub token, environment first then config file
    pub fn github_token(&self) -> Result<String> {
        env::var("GITHUB_TOKEN")
            .ok()
            .or_else(|| self.github_token.clone())
            .ok_or_else(|| {
                RecapError::MissingConfig(
                    "GitHub token (GITHUB_TOKEN env or github_token config key)".to_string(),
                )
            })
    }

    /// API key for the configured AI provider, environment first
    pub fn ai_api_key(&self) -> Result<String> {
        let (env_var, config_key) = match self.ai_provider.as_str() {
            "groq" => ("GROQ_API_KEY", self.groq_api_key.clone()),
            "claude" => ("ANTHROPIC_AUTH_TOKEN", self.claude_api_key.clone()),
            other => {
                return Err(RecapError::config(format!(
                    "unsupported AI provider: {}",
                    other
                )))
            }
        };

        env::var(env_var).ok().or(config_key).ok_or_else(|| {
            RecapError::MissingConfig(format!(
                "API key for provider '{}' ({} env or config file)",
                self.ai_provider, env_var
            ))
        })
    }

    /// Calendar OAuth token, environment first then config file
    pub fn calendar_token(&self) -> Result<String> {
        env::var("GOOGLE_CALENDAR_TOKEN")
            .ok()
            .or_else(|| self.calendar_token.clone())
            .ok_or_else(|| {
                RecapError::MissingConfig(
                    "calendar token (GOOGLE_CALENDAR_TOKEN env or calendar_token config key)"
                        .to_string(),
                )
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_username: String::from("your-github-username"),
            repositories: vec![String::from("owner/repo")],
            days_to_report: default_days(),
            ai_provider: default_provider(),
            ai_model: None,
            output_dir: default_output_dir(),
            prompt_template: None,
            calendar_enabled: default_true(),
            calendar_id: default_calendar_id(),
            github_token: None,
            groq_api_key: None,
            claude_api_key: None,
            calendar_token: None,
        }
    }
}

// Serde default functions
fn default_days() -> u32 {
    7 // one week
}

fn default_provider() -> String {
    String::from("groq")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("result")
}

fn default_calendar_id() -> String {
    String::from("primary")
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.days_to_report, 7);
        assert_eq!(config.ai_provider, "groq");
        assert_eq!(config.calendar_id, "primary");
        assert!(config.calendar_enabled);
        assert_eq!(config.output_dir, PathBuf::from("result"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_username() {
        let mut config = Config::default();
        config.github_username = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_repositories() {
        let mut config = Config::default();
        config.repositories = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unqualified_repository() {
        let mut config = Config::default();
        config.repositories = vec!["just-a-name".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_days() {
        let mut config = Config::default();
        config.days_to_report = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("github_username"));
        assert!(toml_str.contains("days_to_report"));
        assert!(toml_str.contains("ai_provider"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            github_username = "alice"
            repositories = ["org/alpha", "org/beta"]
            days_to_report = 14
            ai_provider = "claude"
            calendar_enabled = false
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github_username, "alice");
        assert_eq!(config.repositories.len(), 2);
        assert_eq!(config.days_to_report, 14);
        assert_eq!(config.ai_provider, "claude");
        assert!(!config.calendar_enabled);
        // Unset keys fall back to defaults
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.output_dir, PathBuf::from("result"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            github_username = "alice"
            repositories = ["org/alpha"]
            "#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.github_username, "alice");
        assert_eq!(config.days_to_report, 7);
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(RecapError::Config(_))));
    }

    #[test]
    fn test_ai_api_key_unsupported_provider() {
        let mut config = Config::default();
        config.ai_provider = "watson".to_string();
        assert!(config.ai_api_key().is_err());
    }
}
