use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spreadsheet location
    pub workbook: WorkbookConfig,

    /// Settings for requests to YouTube
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookConfig {
    /// Spreadsheet read at start and written back at the end
    pub path: PathBuf,

    /// Worksheet holding the links
    pub sheet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Accept-Language header sent with every request
    pub accept_language: String,
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("youtube_links.xlsx"),
            sheet: "Sheet1".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            accept_language: "en-US".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::existing_config_path() {
            Some(config_path) => {
                tracing::debug!("Loading configuration from {}", config_path.display());
                let content = fs_err::read_to_string(&config_path)
                    .context("Failed to read config file")?;
                Self::from_yaml(&content)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Config file in use, if any
    fn existing_config_path() -> Option<PathBuf> {
        Self::config_path().ok().filter(|path| path.exists())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-fetcher").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.workbook.path.as_os_str().is_empty() {
            anyhow::bail!("Workbook path must not be empty");
        }

        if self.workbook.sheet.trim().is_empty() {
            anyhow::bail!("Worksheet name must not be empty");
        }

        if self.http.timeout_secs == 0 {
            anyhow::bail!("HTTP timeout must be at least one second");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        match Self::existing_config_path() {
            Some(path) => println!("  Config File: {}", path.display()),
            None => println!("  Config File: (none, using defaults)"),
        }
        println!("  Workbook: {}", self.workbook.path.display());
        println!("  Worksheet: {}", self.workbook.sheet);
        println!("  HTTP Timeout: {}s", self.http.timeout_secs);
        println!("  Accept-Language: {}", self.http.accept_language);
    }

    /// Write the current settings to a config file unless one already exists
    pub fn init(&self) -> Result<()> {
        if let Some(path) = Self::existing_config_path() {
            println!("Configuration already exists, edit it manually:");
            println!("  {}", path.display());
            return Ok(());
        }

        let path = self.save()?;
        println!("Configuration written to:");
        println!("  {}", path.display());
        Ok(())
    }

    /// Request timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("workbook:\n  sheet: Videos\n").unwrap();
        assert_eq!(config.workbook.sheet, "Videos");
        assert_eq!(config.workbook.path, PathBuf::from("youtube_links.xlsx"));
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(Config::from_yaml("http:\n  timeout_secs: 0\n").is_err());
    }

    #[test]
    fn test_rejects_blank_sheet() {
        assert!(Config::from_yaml("workbook:\n  sheet: \"  \"\n").is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
    }
}
