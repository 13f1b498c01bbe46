// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use parla_app::HubTab;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub dev: Dev,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            auth: Auth::default(),
            ui: Ui::default(),
            dev: Dev::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Auth {
    pub google_auth_url: Option<String>,
    pub redirect_uri: Option<String>,
    pub cookie_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub default_tab: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            default_tab: Some("actions".to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dev {
    pub mock: Option<bool>,
}

impl Default for Dev {
    fn default() -> Self {
        Self { mock: Some(false) }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("PARLA_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set PARLA_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join("parla");
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [api], [auth], [ui], and [dev]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        self.default_tab()
            .with_context(|| format!("invalid [ui] section in {}", path.display()))?;

        Ok(())
    }

    pub fn api_base_url(&self) -> Result<&str> {
        match self.api.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url.trim_end_matches('/')),
            _ => bail!(
                "api.base_url is not configured; set [api].base_url in the config file or run with --mock"
            ),
        }
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn google_auth_url(&self) -> &str {
        self.auth.google_auth_url.as_deref().unwrap_or("")
    }

    pub fn redirect_uri(&self) -> &str {
        self.auth.redirect_uri.as_deref().unwrap_or("")
    }

    pub fn cookie_path(&self) -> Result<PathBuf> {
        match &self.auth.cookie_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(data_root()?.join("session-cookie")),
        }
    }

    pub fn session_query_path(&self) -> Result<PathBuf> {
        Ok(data_root()?.join("session-query"))
    }

    pub fn default_tab(&self) -> Result<HubTab> {
        match self.ui.default_tab.as_deref().unwrap_or("actions") {
            "actions" => Ok(HubTab::Actions),
            "rules" => Ok(HubTab::Rules),
            other => bail!("ui.default_tab must be \"actions\" or \"rules\", got {other:?}"),
        }
    }

    pub fn mock(&self) -> bool {
        self.dev.mock.unwrap_or(false)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# parla config\n# Place this file at: {}\n\nversion = 1\n\n[api]\n# Required outside mock mode. The assistant backend base URL.\n# base_url = \"https://api.example.com\"\ntimeout = \"{}\"\n\n[auth]\n# google_auth_url = \"https://accounts.google.com/o/oauth2/v2/auth\"\n# redirect_uri = \"https://api.example.com/v1/auth/callback\"\n# Optional. Default is the platform data dir (for example ~/.local/share/parla/session-cookie)\n# cookie_path = \"/absolute/path/to/session-cookie\"\n\n[ui]\ndefault_tab = \"actions\"\n\n[dev]\nmock = false\n",
            path.display(),
            DEFAULT_TIMEOUT,
        )
    }
}

fn data_root() -> Result<PathBuf> {
    let root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set auth.cookie_path in the config file")
    })?;
    Ok(root.join("parla"))
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
