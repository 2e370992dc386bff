use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model: String,
    pub base_url: String,
    pub key: Option<String>,
    pub addr: String,
    pub locale: String,
    pub provider_failure_status: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            key: None,
            addr: DEFAULT_ADDR.to_string(),
            locale: "en".to_string(),
            provider_failure_status: 200,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    openai: Option<OpenAISettings>,
    server: Option<ServerSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAISettings {
    model: Option<String>,
    base_url: Option<String>,
    key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    addr: Option<String>,
    locale: Option<String>,
    provider_failure_status: Option<u16>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings
                .merge_toml(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

/// Resolves the process-wide default credential once at start-up.
///
/// Precedence: explicit override, `OPENAI_KEY`, `OPENAI_API_KEY`, then the
/// `[openai] key` settings entry. Blank values are skipped.
pub fn resolve_default_key(settings: &Settings, override_key: Option<&str>) -> Option<String> {
    override_key
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| get_env("OPENAI_KEY"))
        .or_else(|| get_env("OPENAI_API_KEY"))
        .or_else(|| settings.key.clone())
}

impl Settings {
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)?;
        self.merge(parsed);
        Ok(())
    }

    /// Applies `OPENAI_BASE_URL` on top of the file settings.
    pub fn apply_env(&mut self) {
        if let Some(base_url) = get_env("OPENAI_BASE_URL") {
            self.base_url = base_url;
        }
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(openai) = incoming.openai {
            if let Some(model) = openai.model {
                if !model.trim().is_empty() {
                    self.model = model.trim().to_string();
                }
            }
            if let Some(base_url) = openai.base_url {
                if !base_url.trim().is_empty() {
                    self.base_url = base_url.trim().trim_end_matches('/').to_string();
                }
            }
            if let Some(key) = openai.key {
                if !key.trim().is_empty() {
                    self.key = Some(key.trim().to_string());
                }
            }
        }
        if let Some(server) = incoming.server {
            if let Some(addr) = server.addr {
                if !addr.trim().is_empty() {
                    self.addr = addr.trim().to_string();
                }
            }
            if let Some(locale) = server.locale {
                if !locale.trim().is_empty() {
                    self.locale = locale.trim().to_lowercase();
                }
            }
            if let Some(status) = server.provider_failure_status {
                if (100..=599).contains(&status) {
                    self.provider_failure_status = status;
                }
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".locale-json-translator"))
        }
    })
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
