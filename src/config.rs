use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the article backend, including any version prefix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Backend request timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Add `Secure` to the session cookie; enable when served over TLS
    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8001/v1".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            bind_addr: default_bind_addr(),
            request_timeout_secs: None,
            secure_cookies: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the base URL when `API_BASE_URL` is set
    pub fn with_env_overrides(mut self) -> anyhow::Result<Self> {
        if let Ok(url) = std::env::var("API_BASE_URL") {
            self.api_base_url = url;
            self.validate()?;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let url = reqwest::Url::parse(&self.api_base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api_base_url must be http or https, got {}", url.scheme());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8001/v1");
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert!(config.request_timeout().is_none());
        assert!(!config.secure_cookies);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            api_base_url = "https://blog.example.com/v1"
            bind_addr = "127.0.0.1:8080"
            request_timeout_secs = 10
            secure_cookies = true
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.api_base_url, "https://blog.example.com/v1");
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert!(config.secure_cookies);
    }

    // One test owns API_BASE_URL so parallel tests never see it half-set
    #[test]
    fn test_api_base_url_env_override() {
        let file = r#"api_base_url = "https://file.example.com/v1""#;

        std::env::remove_var("API_BASE_URL");
        let config = Config::from_str(file).unwrap().with_env_overrides().unwrap();
        assert_eq!(config.api_base_url, "https://file.example.com/v1");

        std::env::set_var("API_BASE_URL", "https://env.example.com/v2");
        let config = Config::from_str(file).unwrap().with_env_overrides();
        std::env::remove_var("API_BASE_URL");
        assert_eq!(config.unwrap().api_base_url, "https://env.example.com/v2");

        std::env::set_var("API_BASE_URL", "ftp://x");
        let result = Config::from_str(file).unwrap().with_env_overrides();
        std::env::remove_var("API_BASE_URL");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.api_base_url, default_api_base_url());
        assert_eq!(config.bind_addr, default_bind_addr());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.api_base_url, default_api_base_url());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let content = "this is not valid toml {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = Config::from_str(r#"api_base_url = "ftp://example.com/v1""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let result = Config::from_str(r#"api_base_url = "not a url""#);
        assert!(result.is_err());
    }
}
