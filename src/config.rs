//! Configuration file support for voicecmd
//!
//! Reads from .voicecmd/config.toml (walking up from the current
//! directory), then ~/.voicecmd/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the store directory
pub const STORE_DIR_ENV: &str = "VOICECMD_DIR";

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Where command files are kept
    #[serde(default)]
    pub store: StoreConfig,

    /// Browser front end settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Store-related configuration
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct StoreConfig {
    /// Command directory. A leading `~/` is expanded to the home directory.
    /// Default: ~/AI-Collaboration-Management/.claude/commands
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Address to bind
    /// Default: "127.0.0.1"
    #[serde(default = "default_host")]
    pub host: String,

    /// Default: 5555
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5555
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load config from .voicecmd/config.toml
    /// Returns default config if file doesn't exist
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_path() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                match toml::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                    }
                }
            }
        }
        Self::default()
    }

    /// Find config.toml by walking up directory tree, then in the home directory
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(current_dir) = std::env::current_dir() {
            let mut dir = current_dir.as_path();
            loop {
                let config_path = dir.join(".voicecmd").join("config.toml");
                if config_path.exists() {
                    return Some(config_path);
                }

                match dir.parent() {
                    Some(parent) => dir = parent,
                    None => break,
                }
            }
        }

        let home_config = dirs::home_dir()?.join(".voicecmd").join("config.toml");
        home_config.exists().then_some(home_config)
    }

    /// Resolve the store directory
    ///
    /// Precedence: explicit flag, then `VOICECMD_DIR`, then `[store] dir`,
    /// then the default under the home directory.
    pub fn store_dir(&self, flag: Option<&Path>) -> PathBuf {
        let env = std::env::var_os(STORE_DIR_ENV).map(PathBuf::from);
        self.resolve_store_dir(flag, env.as_deref())
    }

    fn resolve_store_dir(&self, flag: Option<&Path>, env: Option<&Path>) -> PathBuf {
        let non_empty = |p: &&Path| !p.as_os_str().is_empty();
        if let Some(dir) = flag.filter(non_empty).or(env.filter(non_empty)) {
            return dir.to_path_buf();
        }
        match &self.store.dir {
            Some(dir) => expand_home(dir),
            None => default_store_dir(),
        }
    }
}

/// ~/AI-Collaboration-Management/.claude/commands
pub fn default_store_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("AI-Collaboration-Management")
        .join(".claude")
        .join("commands")
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.store.dir.is_none());
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5555);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[store]
dir = "/srv/commands"

[server]
port = 8080
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.store.dir, Some(PathBuf::from("/srv/commands")));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 5555);
    }

    #[test]
    fn test_store_dir_precedence() {
        let config: Config = toml::from_str("[store]\ndir = \"/from/config\"").unwrap();
        let flag = Path::new("/from/flag");
        let env = Path::new("/from/env");

        assert_eq!(config.resolve_store_dir(Some(flag), Some(env)), flag);
        assert_eq!(config.resolve_store_dir(None, Some(env)), env);
        assert_eq!(config.resolve_store_dir(None, None), Path::new("/from/config"));
        assert_eq!(config.resolve_store_dir(None, Some(Path::new(""))), Path::new("/from/config"));
        assert_eq!(config.resolve_store_dir(Some(Path::new("")), Some(env)), env);
        assert_eq!(
            config.resolve_store_dir(Some(Path::new("")), None),
            Path::new("/from/config")
        );
        assert_eq!(Config::default().resolve_store_dir(None, None), default_store_dir());
    }

    #[test]
    fn test_default_store_dir_layout() {
        let dir = default_store_dir();
        assert!(dir.ends_with("AI-Collaboration-Management/.claude/commands"));
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/cmds")), home.join("cmds"));
        }
        assert_eq!(expand_home(Path::new("/abs/cmds")), PathBuf::from("/abs/cmds"));
    }
}
