use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::domain::models::{LanguagePreference, LanguagePriority};
use crate::infra::betaseries::Credentials;
use crate::media::library::SubtitleDir;
use crate::messages::{MessageKey, Messages};

/// Contents of `settings.toml`; every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: Option<String>,
    pub search: String,
    pub api_key: Option<String>,
    pub login: String,
    pub password: String,
    pub default_directory: String,
    /// "" next to the video, "|name" in a sub-folder of the video's directory, else a path
    pub subtitles_directory: String,
    pub use_history: bool,
    pub unzip_files: bool,
    pub use_filters: bool,
    pub filters_regex: String,
    pub use_updater: bool,
    pub updater_freq_sec: u64,
    pub use_subdirectories: bool,
    pub rename_subtitles: bool,
    pub language_priority: String,
    pub set_episode_downloaded: bool,
    pub series_extensions: Vec<String>,
    pub extensions_filter_mode: Vec<String>,
    pub quality_subtitles: String,
    pub language_subtitles: String,
    pub no_download_if_present: bool,
    pub keep_only_one_subtitle: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: None,
            search: String::new(),
            api_key: None,
            login: String::new(),
            password: String::new(),
            default_directory: String::new(),
            subtitles_directory: String::new(),
            use_history: false,
            unzip_files: false,
            use_filters: false,
            filters_regex: String::new(),
            use_updater: false,
            updater_freq_sec: 3600,
            use_subdirectories: false,
            rename_subtitles: false,
            language_priority: "VF".to_string(),
            set_episode_downloaded: false,
            series_extensions: vec!["avi".to_string()],
            extensions_filter_mode: vec!["srt".to_string(), "txt".to_string(), "ass".to_string()],
            quality_subtitles: String::new(),
            language_subtitles: String::new(),
            no_download_if_present: false,
            keep_only_one_subtitle: false,
        }
    }
}

/// Validated settings the workflows run with.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub credentials: Credentials,
    pub default_dir: PathBuf,
    pub subtitle_dir: SubtitleDir,
    pub use_history: bool,
    pub history_path: PathBuf,
    pub unzip: bool,
    pub use_filters: bool,
    pub filters_regex: Option<Regex>,
    /// Delay between passes when the updater is on
    pub updater: Option<Duration>,
    pub recursive: bool,
    pub rename_subtitles: bool,
    pub language_priority: LanguagePriority,
    pub mark_downloaded: bool,
    pub video_extensions: Vec<String>,
    pub filter_extensions: Vec<String>,
    pub allowed_qualities: BTreeSet<char>,
    pub language: LanguagePreference,
    pub skip_if_present: bool,
    pub keep_only_one: bool,
}

impl RunOptions {
    /// Exclusion pattern applied while extracting archives.
    pub fn archive_filter(&self) -> Option<&Regex> {
        if self.use_filters {
            self.filters_regex.as_ref()
        } else {
            None
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Cannot read settings {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid settings file {}", path.display()))?
        } else {
            debug!("No settings file at {}, using defaults", path.display());
            Settings::default()
        };
        settings.apply_env(|name| env::var(name).ok());
        Ok(settings)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("BETASUB_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(login) = lookup("BETASUB_LOGIN") {
            self.login = login;
        }
        if let Some(password) = lookup("BETASUB_PASSWORD") {
            self.password = password;
        }
    }

    pub fn api_key(&self) -> Result<String> {
        match &self.api_key {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => bail!(
                "Betaseries API key not found. Set BETASUB_API_KEY environment variable or add api_key = \"your-key\" to {}",
                default_settings_path().display()
            ),
        }
    }

    /// Check the settings and turn them into [`RunOptions`].
    ///
    /// `needs_directory` is set for the modes that work on `default_directory`.
    pub fn validate(
        &self,
        needs_directory: bool,
        history_path: PathBuf,
        messages: Messages,
    ) -> Result<RunOptions> {
        let default_dir = PathBuf::from(&self.default_directory);
        if needs_directory && !default_dir.is_dir() {
            bail!("{}", messages(MessageKey::CriticalDir));
        }

        let subtitle_dir = SubtitleDir::from_setting(&self.subtitles_directory)
            .with_context(|| messages(MessageKey::CriticalSubsDir))?;

        let filters_regex = if self.filters_regex.is_empty() {
            None
        } else {
            Some(
                Regex::new(&self.filters_regex)
                    .with_context(|| format!("Invalid filters_regex: {}", self.filters_regex))?,
            )
        };

        let qualities = if self.quality_subtitles.trim().is_empty() {
            "12345"
        } else {
            self.quality_subtitles.trim()
        };

        Ok(RunOptions {
            credentials: Credentials {
                login: self.login.clone(),
                password: self.password.clone(),
            },
            default_dir,
            subtitle_dir,
            use_history: self.use_history,
            history_path,
            unzip: self.unzip_files,
            use_filters: self.use_filters && filters_regex.is_some(),
            filters_regex,
            updater: self
                .use_updater
                .then(|| Duration::from_secs(self.updater_freq_sec)),
            recursive: self.use_subdirectories,
            rename_subtitles: self.rename_subtitles,
            language_priority: self.language_priority.parse()?,
            mark_downloaded: self.set_episode_downloaded,
            video_extensions: self.series_extensions.clone(),
            filter_extensions: self.extensions_filter_mode.clone(),
            allowed_qualities: qualities.chars().collect(),
            language: self.language_subtitles.parse()?,
            skip_if_present: self.no_download_if_present,
            keep_only_one: self.keep_only_one_subtitle,
        })
    }
}

/// `--config`, then `BETASUB_CONFIG`, then the user configuration directory.
pub fn settings_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os("BETASUB_CONFIG").map(PathBuf::from))
        .unwrap_or_else(default_settings_path)
}

/// The download history sits next to the settings file.
pub fn history_path(settings_path: &Path) -> PathBuf {
    settings_path.with_file_name("history.json")
}

fn default_settings_path() -> PathBuf {
    get_config_dir_path().join("settings.toml")
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("betasub"))
        // Without a standard location (e.g. `$HOME` unset) use the current directory.
        .unwrap_or_default()
}
