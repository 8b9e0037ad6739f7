//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroUsize, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{CliArgs, Command, Overrides, PlayersArgs, ToggleArgs};

use crate::application::pagination::DEFAULT_PAGE_SIZE;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "roster";
const DEFAULT_SOURCE_URL: &str = "http://localhost:8080/";
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 20;
const DEFAULT_PREFS_PATH: &str = "roster-prefs.json";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub source: SourceSettings,
    pub paging: PagingSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Where the roster feed comes from.
#[derive(Debug, Clone)]
pub enum SourceSettings {
    Http { base_url: Url, timeout: Duration },
    File { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct PagingSettings {
    pub page_size: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub prefs_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    load_from(cli, None)
}

/// Same as [`load`], reading `ROSTER__*` variables from `env` instead of the
/// process environment when it is given.
fn load_from(cli: &CliArgs, env: Option<Map<String, String>>) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("ROSTER")
            .separator("__")
            .source(env),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    source: RawSourceSettings,
    paging: RawPagingSettings,
    storage: RawStorageSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.source_url.as_ref() {
            self.source.url = Some(url.clone());
        }
        if let Some(path) = overrides.source_file.as_ref() {
            self.source.file = Some(path.clone());
        }
        if let Some(seconds) = overrides.source_timeout_seconds {
            self.source.timeout_seconds = Some(seconds);
        }
        if let Some(size) = overrides.page_size {
            self.paging.page_size = Some(size);
        }
        if let Some(path) = overrides.prefs_path.as_ref() {
            self.storage.prefs_path = Some(path.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            source,
            paging,
            storage,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            source: build_source_settings(source)?,
            paging: build_paging_settings(paging)?,
            storage: build_storage_settings(storage)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_source_settings(source: RawSourceSettings) -> Result<SourceSettings, LoadError> {
    if let Some(path) = source.file {
        if path.as_os_str().is_empty() {
            return Err(LoadError::invalid("source.file", "path must not be empty"));
        }
        return Ok(SourceSettings::File { path });
    }

    let raw_url = source
        .url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
    let base_url = Url::parse(&raw_url)
        .map_err(|err| LoadError::invalid("source.url", format!("invalid url `{raw_url}`: {err}")))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "source.url",
            format!("unsupported scheme `{}`", base_url.scheme()),
        ));
    }

    let timeout_seconds = source
        .timeout_seconds
        .unwrap_or(DEFAULT_SOURCE_TIMEOUT_SECS);
    if timeout_seconds == 0 {
        return Err(LoadError::invalid(
            "source.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(SourceSettings::Http {
        base_url,
        timeout: Duration::from_secs(timeout_seconds),
    })
}

fn build_paging_settings(paging: RawPagingSettings) -> Result<PagingSettings, LoadError> {
    let value = paging.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    let page_size = NonZeroUsize::new(value)
        .ok_or_else(|| LoadError::invalid("paging.page_size", "must be greater than zero"))?;
    Ok(PagingSettings { page_size })
}

fn build_storage_settings(storage: RawStorageSettings) -> Result<StorageSettings, LoadError> {
    let prefs_path = storage
        .prefs_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFS_PATH));
    if prefs_path.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "storage.prefs_path",
            "path must not be empty",
        ));
    }
    Ok(StorageSettings { prefs_path })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSourceSettings {
    url: Option<String>,
    file: Option<PathBuf>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPagingSettings {
    page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    prefs_path: Option<PathBuf>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
