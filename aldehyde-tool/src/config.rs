use std::path::PathBuf;

use log::warn;
use serde::Deserialize;

const APP_DIR: &str = "aldehyde";

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub assets_file: Option<PathBuf>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_assets_path() -> PathBuf {
    data_dir().join("assets.csv")
}

pub fn log_path() -> PathBuf {
    data_dir().join("ald.log")
}

pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    let Ok(content) = std::fs::read_to_string(&path) else {
        return Config::default();
    };

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// CLI flag first, then the config file, then the default data location.
pub fn resolve_assets_path(cli_path: Option<PathBuf>) -> PathBuf {
    cli_path
        .or_else(|| load_config().assets_file)
        .unwrap_or_else(default_assets_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assets_file() {
        let config: Config = toml::from_str("assets_file = \"/tmp/home.csv\"").unwrap();
        assert_eq!(config.assets_file, Some(PathBuf::from("/tmp/home.csv")));
    }

    #[test]
    fn empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn cli_path_wins() {
        let path = resolve_assets_path(Some(PathBuf::from("mine.csv")));
        assert_eq!(path, PathBuf::from("mine.csv"));
    }

    #[test]
    fn default_path_ends_with_assets_file() {
        assert!(default_assets_path().ends_with("aldehyde/assets.csv"));
    }
}
