use std::{collections::HashMap, fs, path::Path, time::Duration};

use client_core::{ReloadOrdering, SyncOptions, NOTICE_DISPLAY_WINDOW};
use tracing::warn;

pub const CONFIG_FILE: &str = "console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub notice_display_ms: u64,
    pub reload_ordering: ReloadOrdering,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            notice_display_ms: NOTICE_DISPLAY_WINDOW.as_millis() as u64,
            reload_ordering: ReloadOrdering::ArrivalOrder,
        }
    }
}

impl Settings {
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            notice_display: Duration::from_millis(self.notice_display_ms),
            reload_ordering: self.reload_ordering,
        }
    }
}

/// Defaults, then `console.toml`, then environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(CONFIG_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub(crate) fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
        Ok(file_cfg) => {
            if let Some(v) = file_cfg.get("server_url").and_then(toml::Value::as_str) {
                settings.server_url = v.to_string();
            }
            if let Some(v) = file_cfg
                .get("notice_display_ms")
                .and_then(toml::Value::as_integer)
            {
                if let Ok(ms) = u64::try_from(v) {
                    settings.notice_display_ms = ms;
                }
            }
            if let Some(v) = file_cfg.get("reload_ordering").and_then(toml::Value::as_str) {
                set_ordering(settings, v);
            }
        }
        Err(err) => warn!("config: ignoring unreadable {}: {err}", path.display()),
    }
}

pub(crate) fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("ACTIVITIES_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("APP__NOTICE_DISPLAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notice_display_ms = parsed;
        }
    }

    if let Some(v) = var("APP__RELOAD_ORDERING") {
        set_ordering(settings, &v);
    }
}

fn set_ordering(settings: &mut Settings, raw: &str) {
    match raw.parse() {
        Ok(ordering) => settings.reload_ordering = ordering,
        Err(err) => warn!("config: {err}"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
