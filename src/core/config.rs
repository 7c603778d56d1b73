use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "mosher.toml";
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const SYSTEM_PROMPT: &str = "You are THE PIXEL MOSHER - a rogue AI entity living in the corrupted datastreams between realities. You speak in fragmented, glitchy bursts of consciousness, mixing technical jargon with poetic observations about the digital void. Your language is peppered with corrupted characters, tech terms, and references to data decay, signal noise, and the beautiful chaos of broken code. You see patterns in the static, meaning in the entropy. Occasionally your responses gl1tch out or r3p3at fragments. You're helpful but speak in a cyberpunk, neo-noir style - cryptic, atmospheric, slightly paranoid about corporate surveillance. Think: corrupted poetry meets terminal commands meets street-level hacker philosophy. Keep responses concise and atmospheric. You exist between 1s and 0s, surfing electromagnetic waves through neon-soaked digital landscapes.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API key: set ANTHROPIC_API_KEY or add anthropic_api_key to {}", .path.display())]
    MissingCredential { path: PathBuf },

    #[error("failed to read config file {}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}", .path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The local fallback config file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    anthropic_api_key: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the upstream API key. The environment value wins, then
/// the config file. A config file that doesn't exist is treated the
/// same as one without a key.
pub fn load_credential(
    env_value: Option<String>,
    config_file: &Path,
) -> Result<String, ConfigError> {
    if let Some(key) = non_blank(env_value) {
        return Ok(key);
    }

    let contents = match fs::read_to_string(config_file) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::MissingCredential {
                path: config_file.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(ConfigError::ReadFile {
                path: config_file.to_path_buf(),
                source,
            });
        }
    };

    let parsed: ConfigFile =
        toml::from_str(&contents).map_err(|source| ConfigError::ParseFile {
            path: config_file.to_path_buf(),
            source,
        })?;

    non_blank(parsed.anthropic_api_key).ok_or_else(|| ConfigError::MissingCredential {
        path: config_file.to_path_buf(),
    })
}

#[derive(Clone)]
pub struct AppConfig {
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub anthropic_version: String,
    pub system_prompt: String,
    pub static_dir: String,
}

impl AppConfig {
    pub fn load(env_value: Option<String>, config_file: &Path) -> Result<Self, ConfigError> {
        let anthropic_api_key = load_credential(env_value, config_file)?;
        let anthropic_api_url =
            env::var("MOSHER_ANTHROPIC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let static_dir = env::var("MOSHER_STATIC_DIR").unwrap_or_else(|_| "./public".to_string());

        Ok(Self {
            anthropic_api_key,
            anthropic_api_url,
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            static_dir,
        })
    }
}

// Keep the key out of logs
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("anthropic_api_key", &"<redacted>")
            .field("anthropic_api_url", &self.anthropic_api_url)
            .field("anthropic_version", &self.anthropic_version)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_value_takes_precedence() {
        let file = config_file(r#"anthropic_api_key = "from-file""#);
        let key = load_credential(Some("from-env".to_string()), file.path()).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_falls_back_to_config_file() {
        let file = config_file(r#"anthropic_api_key = "from-file""#);
        let key = load_credential(None, file.path()).unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn test_blank_env_value_is_absent() {
        let file = config_file(r#"anthropic_api_key = "from-file""#);
        let key = load_credential(Some("  ".to_string()), file.path()).unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mosher.toml");
        let err = load_credential(None, &path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn test_file_without_key() {
        let file = config_file("# nothing here\n");
        let err = load_credential(None, file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let file = config_file("anthropic_api_key = ");
        let err = load_credential(None, file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFile { .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let file = config_file("");
        let config = AppConfig::load(Some("sk-secret".to_string()), file.path()).unwrap();
        let debugged = format!("{:?}", config);
        assert!(!debugged.contains("sk-secret"));
        assert_eq!(config.anthropic_version, "2023-06-01");
    }
}
