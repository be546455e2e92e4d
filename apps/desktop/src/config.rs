use std::{fs, io::ErrorKind, path::Path};

use anyhow::{bail, Context};
use client_core::input::DEFAULT_MAX_QUESTION_CHARS;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "documind.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub max_question_chars: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".into(),
            max_question_chars: DEFAULT_MAX_QUESTION_CHARS,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    max_question_chars: Option<usize>,
    log_filter: Option<String>,
}

/// Defaults, then the config file, then `DOCUMIND_*` environment variables.
///
/// A missing `documind.toml` in the working directory is fine; an explicitly
/// requested file must exist.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if !required && err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.max_question_chars {
        settings.max_question_chars = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DOCUMIND_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("DOCUMIND_MAX_QUESTION_CHARS") {
        if let Ok(parsed) = v.trim().parse::<usize>() {
            settings.max_question_chars = parsed;
        }
    }
    if let Some(v) = var("DOCUMIND_LOG") {
        settings.log_filter = v;
    }
}

pub fn validate_server_url(raw: &str) -> anyhow::Result<()> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid server url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("server url '{raw}' must use http or https");
    }
    Ok(())
}
