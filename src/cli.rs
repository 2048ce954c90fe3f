use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;
use crate::workflows::mode::Mode;

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Subtitles of the episodes left to watch on your Betaseries account
    Episodes,
    /// Search subtitles from a text like "dexter s01e01" or "the office 3"
    Search {
        /// Search text; the free words are used when omitted
        #[arg(short, long)]
        search: Option<String>,
        words: Vec<String>,
    },
    /// Ask for show, season, episode and language interactively
    Prompt,
    /// Subtitles for every video of the default directory
    File,
    /// Subtitles for one downloaded release, named relative to the default directory
    Torrent { release: String },
    /// Extract every zip archive of the default directory
    Unzip,
    /// Delete the subtitle files matching the filters
    Filter,
    /// Statistics about the downloaded subtitles
    Stat,
    /// Mark the episode of a video file as watched on Betaseries
    Watched { file: PathBuf },
}

#[derive(Parser)]
#[command(name = "betasub", version)]
#[command(about = "Download, extract and filter TV show subtitles from Betaseries")]
pub struct Cli {
    /// Mode to run; the settings file's `mode` is used when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Settings file to use instead of the default one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log pipeline decisions
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory of the videos
    #[arg(short = 'd', long, global = true)]
    pub directory: Option<String>,

    /// Subtitles directory: a path, or |name for a sub-folder beside each video
    #[arg(long, global = true)]
    pub subsdir: Option<String>,

    #[arg(short, long, global = true)]
    pub login: Option<String>,

    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Extract downloaded zip archives
    #[arg(short, long, global = true)]
    pub unzip: bool,

    /// Regex of the files to leave out of archives and to delete in filter mode
    #[arg(short, long, global = true)]
    pub filters: Option<String>,

    /// Skip subtitles already downloaded
    #[arg(long, global = true)]
    pub history: bool,

    /// Run again and again (episodes and file modes)
    #[arg(long, global = true)]
    pub updater: bool,

    /// Seconds between two updater passes
    #[arg(long, global = true)]
    pub freq: Option<u64>,

    /// Look for videos in sub-directories too
    #[arg(long, global = true)]
    pub subfolders: bool,

    /// Copy the best subtitle under the video's name
    #[arg(long, global = true)]
    pub rename: bool,

    /// Language the renamed subtitle should be in: VF (FR) or VO (EN)
    #[arg(long, global = true)]
    pub langpriority: Option<String>,

    /// Video extensions to consider
    #[arg(long, global = true, value_delimiter = '|')]
    pub seriesext: Vec<String>,

    /// Mark the release as downloaded on Betaseries (torrent mode)
    #[arg(long, global = true)]
    pub downloaded: bool,

    /// Extensions considered in filter mode
    #[arg(long, global = true, value_delimiter = '|')]
    pub filterext: Vec<String>,

    /// Accepted subtitle qualities, e.g. 345
    #[arg(long, global = true)]
    pub qualitysub: Option<String>,

    /// Accepted subtitle languages: VF, VO or VOVF
    #[arg(long, global = true)]
    pub languagesub: Option<String>,

    /// Skip videos that already have a subtitle
    #[arg(long, global = true)]
    pub nodlifpresent: bool,

    /// Keep only the renamed subtitle
    #[arg(long, global = true)]
    pub onlyone: bool,
}

impl Cli {
    /// Command-line values win over the settings file.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(directory) = &self.directory {
            settings.default_directory = directory.clone();
        }
        if let Some(subsdir) = &self.subsdir {
            settings.subtitles_directory = subsdir.clone();
        }
        if let Some(login) = &self.login {
            settings.login = login.clone();
        }
        if let Some(password) = &self.password {
            settings.password = password.clone();
        }
        if let Some(filters) = &self.filters {
            settings.use_filters = true;
            settings.filters_regex = filters.clone();
        }
        if let Some(freq) = self.freq {
            settings.updater_freq_sec = freq;
        }
        if let Some(priority) = &self.langpriority {
            settings.language_priority = priority.clone();
        }
        if !self.seriesext.is_empty() {
            settings.series_extensions = self.seriesext.clone();
        }
        if !self.filterext.is_empty() {
            settings.extensions_filter_mode = self.filterext.clone();
        }
        if let Some(quality) = &self.qualitysub {
            settings.quality_subtitles = quality.clone();
        }
        if let Some(language) = &self.languagesub {
            settings.language_subtitles = language.clone();
        }
        settings.unzip_files |= self.unzip;
        settings.use_history |= self.history;
        settings.use_updater |= self.updater;
        settings.use_subdirectories |= self.subfolders;
        settings.rename_subtitles |= self.rename;
        settings.set_episode_downloaded |= self.downloaded;
        settings.no_download_if_present |= self.nodlifpresent;
        settings.keep_only_one_subtitle |= self.onlyone;
    }

    /// The subcommand, else the settings file's mode.
    pub fn mode(&self, settings: &Settings) -> Option<Mode> {
        match &self.command {
            Some(command) => Some(command_mode(command, settings)),
            None => settings
                .mode
                .as_deref()
                .and_then(|name| Mode::from_setting(name, &settings.search)),
        }
    }
}

fn command_mode(command: &Command, settings: &Settings) -> Mode {
    match command {
        Command::Episodes => Mode::Episodes,
        Command::Search { search, words } => {
            let extra = words.join(" ");
            let query = match search {
                Some(search) => search.clone(),
                None if !extra.is_empty() => extra.clone(),
                None => settings.search.clone(),
            };
            Mode::Search { query, extra }
        }
        Command::Prompt => Mode::Prompt,
        Command::File => Mode::File,
        Command::Torrent { release } => Mode::Torrent {
            release: release.clone(),
        },
        Command::Unzip => Mode::Unzip,
        Command::Filter => Mode::Filter,
        Command::Stat => Mode::Stat,
        Command::Watched { file } => Mode::Watched { file: file.clone() },
    }
}
