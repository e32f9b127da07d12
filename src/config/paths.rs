//! Config file location
//!
//! The file is looked up in order: the `--config` flag, the
//! `BRIEFCRAFT_CONFIG` environment variable, then
//! `$XDG_CONFIG_HOME/briefcraft/config.toml` (or `~/.config/briefcraft/config.toml`).

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "BRIEFCRAFT_CONFIG";

const APP_DIR: &str = "briefcraft";
const CONFIG_FILE: &str = "config.toml";

/// Where a config file path came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` on the command line
    Flag(PathBuf),
    /// [`CONFIG_ENV`]
    Env(PathBuf),
    /// The per-user default location
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Flag(p) | ConfigSource::Env(p) | ConfigSource::Default(p) => p,
        }
    }

    /// Explicitly named files must exist; the default one is optional
    pub fn is_required(&self) -> bool {
        !matches!(self, ConfigSource::Default(_))
    }
}

/// Locate the config file from the flag, the environment and the default directory
pub fn locate(flag: Option<&str>) -> Result<ConfigSource> {
    let env = std::env::var(CONFIG_ENV).ok();
    locate_with(flag, env.as_deref(), config_dir())
}

fn locate_with(flag: Option<&str>, env: Option<&str>, dir: PathBuf) -> Result<ConfigSource> {
    let named = |p: &str| !p.trim().is_empty();
    if let Some(p) = flag.filter(|p| named(p)) {
        return Ok(ConfigSource::Flag(absolute(p)?));
    }
    if let Some(p) = env.filter(|p| named(p)) {
        let path = absolute(p).with_context(|| format!("Invalid {}", CONFIG_ENV))?;
        return Ok(ConfigSource::Env(path));
    }
    Ok(ConfigSource::Default(dir.join(CONFIG_FILE)))
}

/// Per-user briefcraft config directory
pub fn config_dir() -> PathBuf {
    let base = non_empty_var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty_var("HOME").map(|home| Path::new(&home).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join(APP_DIR)
}

/// Default config file inside [`config_dir`]
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// `~` and `~/...` are expanded against `$HOME`; relative paths join the working directory
fn absolute(raw: &str) -> Result<PathBuf> {
    let path = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let home = non_empty_var("HOME")
                .ok_or_else(|| anyhow!("Cannot expand '{}': HOME is not set", raw))?;
            PathBuf::from(home).join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(raw),
    };

    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Cannot resolve relative config path")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> PathBuf {
        PathBuf::from("/home/analyst/.config/briefcraft")
    }

    #[test]
    fn test_flag_wins_over_env() {
        let source = locate_with(Some("/etc/flag.toml"), Some("/etc/env.toml"), dir()).unwrap();
        assert_eq!(source, ConfigSource::Flag(PathBuf::from("/etc/flag.toml")));
        assert!(source.is_required());
    }

    #[test]
    fn test_env_wins_over_default() {
        let source = locate_with(None, Some("/etc/env.toml"), dir()).unwrap();
        assert_eq!(source, ConfigSource::Env(PathBuf::from("/etc/env.toml")));
        assert!(source.is_required());
    }

    #[test]
    fn test_blank_values_fall_through_to_default() {
        let source = locate_with(Some(" "), Some(""), dir()).unwrap();
        assert_eq!(
            source,
            ConfigSource::Default(PathBuf::from("/home/analyst/.config/briefcraft/config.toml"))
        );
        assert!(!source.is_required());
    }

    #[test]
    fn test_relative_flag_is_made_absolute() {
        let source = locate_with(Some("briefcraft.toml"), None, dir()).unwrap();
        assert!(source.path().is_absolute());
        assert!(source.path().ends_with("briefcraft.toml"));
    }

    #[test]
    fn test_tilde_is_expanded() {
        let path = absolute("~/briefcraft.toml").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("briefcraft.toml"));
        assert!(!path.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_default_config_path() {
        assert!(default_config_path().ends_with("briefcraft/config.toml"));
    }
}
