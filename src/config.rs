use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::FileLocation;

pub const CONFIG_FILE: &str = "afterlife.toml";

pub const GITHUB_API: &str = "https://api.github.com";
pub const GITHUB_RAW: &str = "https://raw.githubusercontent.com";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub cms: CmsConfig,
    pub ota: OtaConfig,
    pub site: RenderConfig,
}

/// The changelog data file edited by the admin console.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub branch: String,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API.to_string(),
            owner: "AfterlifeOS".to_string(),
            repo: "AfterlifeOS.github.io".to_string(),
            path: "js/data_changelogs.js".to_string(),
            branch: "main".to_string(),
        }
    }
}

impl CmsConfig {
    pub fn location(&self) -> FileLocation {
        FileLocation::new(&self.owner, &self.repo, &self.path, &self.branch)
    }
}

/// The OTA repository that publishes `devices.json` and per-device manifests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtaConfig {
    pub api_base: String,
    pub raw_base: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl Default for OtaConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API.to_string(),
            raw_base: GITHUB_RAW.to_string(),
            owner: "AfterlifeOS".to_string(),
            repo: "device_afterlife_ota".to_string(),
            branch: "16".to_string(),
        }
    }
}

impl OtaConfig {
    /// `{raw_base}/{owner}/{repo}/{branch}`
    pub fn raw_root(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.raw_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.branch
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory holding same-origin data files (`js/data_changelogs.js`, `team.json`).
    pub data_dir: PathBuf,
    pub changelog_path: String,
    pub team_path: String,
    pub cache_ttl_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            changelog_path: "js/data_changelogs.js".to_string(),
            team_path: "team.json".to_string(),
            cache_ttl_secs: 300,
        }
    }
}

impl SiteConfig {
    /// Reads `path` if given, otherwise `./afterlife.toml` when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE), false),
        };

        if !path.is_file() {
            if required {
                anyhow::bail!("config file not found: {}", path.display());
            }
            tracing::debug!("no {} found; using defaults", path.display());
            return Ok(Self::default());
        }

        let text =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let cfg: SiteConfig =
            toml::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize config")
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
