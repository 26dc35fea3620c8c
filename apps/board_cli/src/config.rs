use std::{collections::HashMap, fs, path::Path};

pub const DEFAULT_CONFIG_PATH: &str = "board.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub user_id: Option<String>,
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:3000/user".into(),
            user_id: None,
            auth_token: None,
            request_timeout_secs: 30,
            log_level: "info".into(),
        }
    }
}

/// Settings plus the reason the settings file was skipped, if it was.
/// Loading runs before logging is installed, so the caller reports it.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub file_error: Option<String>,
}

/// Defaults, then the toml file at `path` when present, then environment.
pub fn load_settings(path: &Path) -> LoadedSettings {
    let mut settings = Settings::default();
    let mut file_error = None;

    if let Ok(raw) = fs::read_to_string(path) {
        if let Err(err) = apply_file(&mut settings, &raw) {
            file_error = Some(format!("{}: {err}", path.display()));
        }
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings.api_url = normalize_api_url(&settings.api_url);
    LoadedSettings {
        settings,
        file_error,
    }
}

/// Leaves `settings` untouched when `raw` is not valid toml.
pub(crate) fn apply_file(settings: &mut Settings, raw: &str) -> Result<(), toml::de::Error> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;

    if let Some(v) = file_cfg.get("api_url").and_then(toml::Value::as_str) {
        settings.api_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("user_id").and_then(toml::Value::as_str) {
        settings.user_id = Some(v.to_string());
    }
    if let Some(v) = file_cfg.get("auth_token").and_then(toml::Value::as_str) {
        settings.auth_token = Some(v.to_string());
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
    {
        if let Ok(v) = u64::try_from(v) {
            settings.request_timeout_secs = v;
        }
    }
    if let Some(v) = file_cfg.get("log_level").and_then(toml::Value::as_str) {
        settings.log_level = v.to_string();
    }
    Ok(())
}

pub(crate) fn apply_env<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("BOARD_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("BOARD_USER_ID") {
        settings.user_id = Some(v);
    }
    if let Some(v) = lookup("APP__USER_ID") {
        settings.user_id = Some(v);
    }

    if let Some(v) = lookup("BOARD_AUTH_TOKEN") {
        settings.auth_token = Some(v);
    }
    if let Some(v) = lookup("APP__AUTH_TOKEN") {
        settings.auth_token = Some(v);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = lookup("APP__LOG_LEVEL") {
        settings.log_level = v;
    }
}

pub(crate) fn normalize_api_url(raw_api_url: &str) -> String {
    let raw_api_url = raw_api_url.trim();

    if raw_api_url.is_empty() {
        return Settings::default().api_url;
    }

    let with_scheme = if raw_api_url.contains("://") {
        raw_api_url.to_string()
    } else {
        format!("http://{raw_api_url}")
    };

    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
