use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, warn};

pub const SETTINGS_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub notification_ttl_secs: u64,
    pub refresh_delay_ms: u64,
    pub channel_buffer: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            notification_ttl_secs: 5,
            refresh_delay_ms: 1000,
            channel_buffer: 32,
        }
    }
}

impl Settings {
    /// Parses a settings file. Keys missing from the file keep their defaults.
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("invalid settings file")
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    /// Applies `APP__*` style overrides. `lookup` stands in for the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("STOREFRONT_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("APP__BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("APP__NOTIFICATION_TTL_SECS") {
            override_number("APP__NOTIFICATION_TTL_SECS", &v, &mut self.notification_ttl_secs);
        }
        if let Some(v) = lookup("APP__REFRESH_DELAY_MS") {
            override_number("APP__REFRESH_DELAY_MS", &v, &mut self.refresh_delay_ms);
        }
        if let Some(v) = lookup("APP__CHANNEL_BUFFER") {
            override_number("APP__CHANNEL_BUFFER", &v, &mut self.channel_buffer);
        }
    }
}

fn override_number<N: std::str::FromStr>(key: &str, raw: &str, slot: &mut N) {
    match raw.trim().parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!(key, value = raw, "Ignoring non-numeric override"),
    }
}

/// Defaults, then `storefront.toml` when present, then the environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => Settings::from_toml_str(&raw).with_context(|| format!("reading {}", path.display()))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No settings file, using defaults");
            Settings::default()
        }
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
    };
    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}
