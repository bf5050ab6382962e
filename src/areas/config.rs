use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_COMPONENT: &str = "data";
const DEFAULT_EXCLUDES: [&str; 1] = [".git"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base names excluded everywhere, regardless of rule files
    pub always_exclude: Vec<String>,
    /// Path component renamed to locate the mirror tree
    pub path_component: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            always_exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            path_component: DEFAULT_COMPONENT.to_string(),
        }
    }
}

/// On-disk shape; every field is optional and empty values keep the default
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigFile {
    always_exclude: Vec<String>,
    path_component: String,
}

impl Config {
    /// Loads the user configuration, falling back to defaults when the file is
    /// missing or unusable.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        Self::load_from(&path).unwrap_or_else(|err| {
            tracing::debug!("using default config: {err:#}");
            Config::default()
        })
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = serde_json::from_str(content)?;
        let mut config = Config::default();

        if !file.always_exclude.is_empty() {
            config.always_exclude = file.always_exclude;
        }
        if !file.path_component.is_empty() {
            config.path_component = file.path_component;
        }

        Ok(config)
    }
}

const CONFIG_VENDOR: &str = "trueblocks";
const CONFIG_APP: &str = "differ";
const CONFIG_FILE: &str = "config.json";

/// `<data_local_dir>/trueblocks/differ/config.json`
pub fn config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(CONFIG_VENDOR).join(CONFIG_APP).join(CONFIG_FILE))
}
