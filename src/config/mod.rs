use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use toml::Value;

use crate::diff::DiffViewMode;

/// Lines revealed per "expand up"/"expand down" when no step is configured
pub const DEFAULT_EXPAND_STEP: u32 = 20;

const KNOWN_KEYS: &[&str] = &["view_mode", "expand_step"];

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub view_mode: Option<DiffViewMode>,
    pub expand_step: Option<u32>,
}

impl AppConfig {
    pub fn view_mode(&self) -> DiffViewMode {
        self.view_mode.unwrap_or_default()
    }

    pub fn expand_step(&self) -> u32 {
        self.expand_step.unwrap_or(DEFAULT_EXPAND_STEP)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLoadOutcome {
    pub config: Option<AppConfig>,
    pub warnings: Vec<String>,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let appdata = std::env::var_os("APPDATA").map(PathBuf::from);

    config_path_from_parts(xdg_config_home, home, appdata)
}

pub fn config_path_hint() -> &'static str {
    #[cfg(windows)]
    {
        r"%APPDATA%\hunkwise\config.toml"
    }

    #[cfg(not(windows))]
    {
        "$XDG_CONFIG_HOME/hunkwise/config.toml (default: ~/.config/hunkwise/config.toml)"
    }
}

fn config_path_from_parts(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
    _appdata: Option<PathBuf>,
) -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let base = _appdata
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| anyhow!("Could not determine APPDATA for config directory"))?;
        return Ok(base.join("hunkwise").join("config.toml"));
    }

    #[cfg(not(windows))]
    {
        if let Some(base) = xdg_config_home.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(base.join("hunkwise").join("config.toml"));
        }

        let home = home
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| anyhow!("Could not determine HOME for config directory"))?;
        Ok(home.join(".config").join("hunkwise").join("config.toml"))
    }
}

pub fn load_config() -> Result<ConfigLoadOutcome> {
    let path = config_path()?;
    load_config_from_path(&path)
}

pub fn load_config_from_path(path: &Path) -> Result<ConfigLoadOutcome> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ConfigLoadOutcome::default()),
        Err(err) => return Err(err.into()),
    };

    let value: Value = toml::from_str(&contents)?;
    let table = value
        .as_table()
        .ok_or_else(|| anyhow!("Config root must be a TOML table"))?;

    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    if let Some(view_mode) = table.get("view_mode") {
        match view_mode.as_str().and_then(parse_view_mode) {
            Some(mode) => config.view_mode = Some(mode),
            None => warnings.push(
                "Warning: Config key 'view_mode' must be \"unified\" or \"split\"; ignoring value"
                    .to_string(),
            ),
        }
    }

    if let Some(step) = table.get("expand_step") {
        match step.as_integer().and_then(|n| u32::try_from(n).ok()) {
            Some(step) if step > 0 => config.expand_step = Some(step),
            _ => warnings.push(
                "Warning: Config key 'expand_step' must be a positive integer; ignoring value"
                    .to_string(),
            ),
        }
    }

    for key in table.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warnings.push(format!("Warning: Unknown config key '{key}', ignoring"));
        }
    }

    Ok(ConfigLoadOutcome {
        config: Some(config),
        warnings,
    })
}

fn parse_view_mode(name: &str) -> Option<DiffViewMode> {
    match name {
        "unified" => Some(DiffViewMode::Unified),
        "split" | "side-by-side" => Some(DiffViewMode::SideBySide),
        _ => None,
    }
}
