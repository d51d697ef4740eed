use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    ai::{AiSettings, DEFAULT_MODEL},
    errors::LedgerError,
    utils::{app_data_dir, persistence::write_atomic},
};

/// Stores user-configurable preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "Config::default_autosave")]
    pub autosave: bool,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional override for the ledger directory. Defaults to `<home>/ledger`.
    pub ledger_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            theme: Theme::default(),
            autosave: Self::default_autosave(),
            backup_retention: Self::default_backup_retention(),
            ai: AiConfig::default(),
            ledger_root: None,
        }
    }
}

impl Config {
    pub fn default_autosave() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_ledger_root(&self) -> PathBuf {
        self.ledger_root
            .clone()
            .unwrap_or_else(crate::utils::ledger_dir)
    }
}

/// AI collaborator preferences. The key itself is read from the environment
/// variable named here and never written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "AiConfig::default_model")]
    pub model: String,
    #[serde(default = "AiConfig::default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub settings: AiSettings,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: Self::default_model(),
            api_key_env: Self::default_api_key_env(),
            settings: AiSettings::default(),
        }
    }
}

impl AiConfig {
    pub fn default_model() -> String {
        DEFAULT_MODEL.into()
    }

    pub fn default_api_key_env() -> String {
        "OPENAI_API_KEY".into()
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme `{other}` (light|dark)")),
        }
    }
}

/// Loads and saves [`Config`] as JSON under the application home.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        Ok(Self {
            path: config_dir.join("config.json"),
        })
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| {
                LedgerError::Config(format!("{}: {err}", self.path.display()))
            })
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
