//! Runtime configuration from environment variables.
//!
//! - `TMAP_UPDATE_URL` - update manifest URL (default: [`DEFAULT_UPDATE_URL`])
//! - `TMAP_USER_AGENT` - user agent for the update check
//! - `TMAP_CONFIG_DIR` - directory holding `settings.json` (default: the
//!   platform's local data directory)

use std::path::PathBuf;

pub const DEFAULT_UPDATE_URL: &str =
    "https://raw.githubusercontent.com/georgetsirogiannis/SixteenCoreCharacterMapper/master/version.json";
pub const DEFAULT_USER_AGENT: &str = "16Core-Character-Mapper-Update-Check";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub update_url: String,
    pub user_agent: String,
    pub config_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_url: DEFAULT_UPDATE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            config_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            update_url: get("TMAP_UPDATE_URL").unwrap_or(defaults.update_url),
            user_agent: get("TMAP_USER_AGENT").unwrap_or(defaults.user_agent),
            config_dir: get("TMAP_CONFIG_DIR").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TMAP_UPDATE_URL", "http://localhost:9000/version.json"),
            ("TMAP_USER_AGENT", " "),
            ("TMAP_CONFIG_DIR", "/tmp/tmap"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.update_url, "http://localhost:9000/version.json");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.config_dir, Some(PathBuf::from("/tmp/tmap")));
    }
}
