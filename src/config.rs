//! Runtime configuration.
//!
//! Configuration is via environment variables:
//! - `CONF_BASE_URL` - Confluence root URL, e.g. `https://wiki.example.com` (required)
//! - `CONF_USERNAME` / `CONF_PASSWORD` - Basic auth credentials
//! - `CONF_SPACE` - Default space key for page tools
//! - `CONF_TEMPLATES_DIR` - Custom page template directory

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Could not determine data directory")]
    NoDataDir,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_space: Option<String>,
    pub templates_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value. Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = var("CONF_BASE_URL").ok_or(ConfigError::Missing("CONF_BASE_URL"))?;

        let templates_dir = var("CONF_TEMPLATES_DIR").map(|dir| {
            let path = PathBuf::from(dir);
            if path.is_absolute() {
                path
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(&path))
                    .unwrap_or(path)
            }
        });

        Ok(Self::new(base_url)
            .with_credentials(var("CONF_USERNAME"), var("CONF_PASSWORD"))
            .with_default_space(var("CONF_SPACE"))
            .with_templates_dir(templates_dir))
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    pub fn with_default_space(mut self, space: Option<String>) -> Self {
        self.default_space = space;
        self
    }

    pub fn with_templates_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.templates_dir = dir;
        self
    }

    /// The password with everything after the first four characters hidden.
    pub fn masked_password(&self) -> Option<String> {
        self.password.as_deref().map(mask_secret)
    }
}

/// Show at most the first four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn base_url_is_required() {
        let err = Config::from_lookup(lookup(&[("CONF_SPACE", "DOC")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CONF_BASE_URL")));
        assert_eq!(err.to_string(), "Missing environment variable CONF_BASE_URL");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let err = Config::from_lookup(lookup(&[("CONF_BASE_URL", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CONF_BASE_URL")));

        let config = Config::from_lookup(lookup(&[
            ("CONF_BASE_URL", "https://wiki.example.com/"),
            ("CONF_USERNAME", ""),
            ("CONF_SPACE", " "),
            ("CONF_TEMPLATES_DIR", ""),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://wiki.example.com");
        assert_eq!(config.username, None);
        assert_eq!(config.default_space, None);
        assert_eq!(config.templates_dir, None);
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            ("CONF_BASE_URL", "https://wiki.example.com"),
            ("CONF_USERNAME", "alice"),
            ("CONF_PASSWORD", "secret"),
            ("CONF_SPACE", "DOC"),
        ]))
        .unwrap();
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.default_space.as_deref(), Some("DOC"));
        assert_eq!(config.masked_password().as_deref(), Some("secr****"));
    }

    #[test]
    fn relative_templates_dir_resolves_against_cwd() {
        let config = Config::from_lookup(lookup(&[
            ("CONF_BASE_URL", "https://wiki.example.com"),
            ("CONF_TEMPLATES_DIR", "team/templates"),
        ]))
        .unwrap();
        let expected = std::env::current_dir().unwrap().join("team/templates");
        assert_eq!(config.templates_dir, Some(expected));
    }

    #[test]
    fn absolute_templates_dir_is_kept() {
        let dir = std::env::temp_dir().join("confluence-templates");
        let config = Config::from_lookup(lookup(&[
            ("CONF_BASE_URL", "https://wiki.example.com"),
            ("CONF_TEMPLATES_DIR", dir.to_str().unwrap()),
        ]))
        .unwrap();
        assert_eq!(config.templates_dir, Some(dir));
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let config = Config::new("https://wiki.example.com/");
        assert_eq!(config.base_url, "https://wiki.example.com");
    }

    #[test]
    fn masks_all_but_four_characters() {
        assert_eq!(mask_secret("hunter22"), "hunt****");
        assert_eq!(mask_secret("ab"), "ab****");
    }
}
