pub mod download;
pub mod mode;
pub mod prompt;
pub mod renamer;
pub mod stats;

#[cfg(test)]
pub mod testing;

use anyhow::{anyhow, bail, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, error, warn};

use crate::config::RunOptions;
use crate::domain::models::{MediaIdentity, ShowIdentifier, SubtitleCandidate, SubtitleLanguage};
use crate::infra::betaseries::SubtitleService;
use crate::infra::history::History;
use crate::matching::{parse, select_best_slug};
use crate::media::archive;
use crate::media::library::{collect_files, videos_without_subtitles, SubtitleDir};
use crate::messages::{MessageKey, Messages};
use download::{download_subtitles, DownloadJob, DownloadOutcome};
use mode::Mode;
use prompt::Prompter;

/// Runs the modes against a subtitle service.
pub struct App<S: SubtitleService, P: Prompter> {
    service: S,
    prompt: P,
    options: RunOptions,
    history: History,
    messages: Messages,
}

impl<S: SubtitleService, P: Prompter> App<S, P> {
    pub fn new(service: S, prompt: P, options: RunOptions, messages: Messages) -> Self {
        let history = History::load(&options.history_path);
        Self {
            service,
            prompt,
            options,
            history,
            messages,
        }
    }

    /// One pass, or a pass every updater period for the modes that allow it.
    pub fn run(&mut self, mode: &Mode) -> Result<()> {
        match self.options.updater {
            Some(delay) if mode.is_repeatable() => {
                println!("{} {}\n", self.text(MessageKey::UsingUpdater), delay.as_secs());
                loop {
                    if let Err(e) = self.pass(mode) {
                        error!("Pass failed: {e:#}");
                    }
                    thread::sleep(delay);
                }
            }
            _ => self.pass(mode),
        }
    }

    pub fn pass(&mut self, mode: &Mode) -> Result<()> {
        match mode {
            Mode::Episodes => {
                println!("{}", self.text(MessageKey::SubSearch));
                let candidates = self.service.member_subtitles(&self.options.credentials)?;
                let dest_dir = self.shared_download_dir();
                self.download(DownloadJob::new(mode, candidates, &dest_dir, None))?;
            }
            Mode::Search { query, extra } => {
                if let Some(candidates) = self.search(query, extra)? {
                    self.download_manual(mode, candidates)?;
                }
            }
            Mode::Prompt => {
                let candidates = self.ask_episode()?;
                self.download_manual(mode, candidates)?;
            }
            Mode::File => self.download_for_library(mode)?,
            Mode::Torrent { release } => self.download_for_release(mode, release)?,
            Mode::Unzip => self.unzip_all()?,
            Mode::Filter => self.filter_all()?,
            Mode::Stat => {
                println!("{}", self.text(MessageKey::Working));
                let summary = stats::summarize(&self.history, &self.service);
                println!("{}", stats::render(&summary));
            }
            Mode::Watched { file } => self.mark_watched(file)?,
        }
        Ok(())
    }

    fn text(&self, key: MessageKey) -> &'static str {
        (self.messages)(key)
    }

    fn download(&mut self, job: DownloadJob<'_>) -> Result<DownloadOutcome> {
        download_subtitles(
            &self.service,
            &self.options,
            &mut self.history,
            self.messages,
            job,
        )
    }

    fn download_manual(&mut self, mode: &Mode, candidates: Vec<SubtitleCandidate>) -> Result<()> {
        let dest_dir = self.shared_download_dir();
        self.download(DownloadJob::new(mode, candidates, &dest_dir, None))?;
        Ok(())
    }

    /// Without a video to sit next to, subtitles go to the fixed directory or the default one.
    fn shared_download_dir(&self) -> PathBuf {
        match &self.options.subtitle_dir {
            SubtitleDir::Fixed(path) => path.clone(),
            SubtitleDir::NextToVideo | SubtitleDir::Subfolder(_) => self.options.default_dir.clone(),
        }
    }

    fn search(&mut self, query: &str, extra: &str) -> Result<Option<Vec<SubtitleCandidate>>> {
        let mut query = query.trim().to_string();
        let mut extra = extra.trim().to_string();
        let identity = loop {
            if query.chars().count() < 2 {
                println!("{}", self.text(MessageKey::WarningModeSearch));
                query = self.prompt.ask("search: ")?;
                extra.clear();
                continue;
            }

            let parsed = parse(&query)
                .or_else(|_| parse(&format!("{query} {extra}")))
                .or_else(|_| parse(&extra));
            match parsed {
                Ok(identity) => break identity,
                Err(e) => {
                    debug!("{e}");
                    println!("{} {query}", self.text(MessageKey::ExtractInfoFailed));
                    query = self.prompt.ask("search: ")?;
                    extra.clear();
                }
            }
        };

        let Some(show) = self.show_choice(&identity.show)? else {
            return Ok(None);
        };
        println!(
            "\n{}  season:{}  episode:{}  language:{}\n",
            show.title,
            identity.season.as_deref().unwrap_or_default(),
            identity.episode.as_deref().unwrap_or_default(),
            identity.language.map_or("", |l| l.as_str()),
        );
        println!("{}", self.text(MessageKey::SubSearch));
        let candidates = self.service.search_subtitles(
            &show.url_slug,
            identity.season.as_deref(),
            identity.episode.as_deref(),
            identity.language,
        )?;
        Ok(Some(candidates))
    }

    fn ask_episode(&mut self) -> Result<Vec<SubtitleCandidate>> {
        let show = loop {
            let search = self.prompt.ask("search show: ")?;
            if let Some(show) = self.show_choice(&search)? {
                break show;
            }
        };
        println!("\nshow:     {}", show.title);
        let season = self.prompt.ask("season:   ")?;
        let episode = self.prompt.ask("episode:  ")?;
        let language = self.prompt.ask("language: ")?;
        let language = if language.is_empty() {
            None
        } else {
            match language.parse::<SubtitleLanguage>() {
                Ok(language) => Some(language),
                Err(e) => {
                    warn!("{e}, searching every language");
                    None
                }
            }
        };

        println!("\n{}", self.text(MessageKey::SubSearch));
        self.service.search_subtitles(
            &show.url_slug,
            non_empty(&season),
            non_empty(&episode),
            language,
        )
    }

    /// The show a search refers to, asking the user when several match.
    fn show_choice(&mut self, search: &str) -> Result<Option<ShowIdentifier>> {
        if search.chars().count() < 2 {
            eprintln!("{}", self.text(MessageKey::WarningSearch));
            return Ok(None);
        }

        let mut shows = self.service.search_shows(search)?;
        match shows.len() {
            0 => {
                println!("{search}... {}", self.text(MessageKey::ShowNotExist));
                Ok(None)
            }
            1 => Ok(shows.pop()),
            count => {
                println!("\n  {count} {}", self.text(MessageKey::ShowsFound));
                for (i, show) in shows.iter().enumerate() {
                    println!("    {}: {} ({})", i + 1, show.title, show.url_slug);
                }
                let answer = self.prompt.ask(&format!("\n  show number (1-{count}): "))?;
                let choice: usize = answer
                    .parse()
                    .map_err(|_| anyhow!("Invalid selection"))?;
                if choice < 1 || choice > count {
                    bail!("Invalid selection");
                }
                Ok(Some(shows.swap_remove(choice - 1)))
            }
        }
    }

    /// Parse a file or release name and find its show, telling the user when either fails.
    fn lookup_episode(&self, name: &str) -> Result<Option<(ShowIdentifier, MediaIdentity)>> {
        let identity = match parse(name) {
            Ok(identity) => identity,
            Err(e) => {
                debug!("{e}");
                println!("{} {name}", self.text(MessageKey::ExtractInfoFailed));
                return Ok(None);
            }
        };

        let query = identity.show.to_lowercase();
        let shows = self.service.search_shows(&query)?;
        match select_best_slug(&query, &shows) {
            Some(show) => Ok(Some((show.clone(), identity))),
            None => {
                println!("{}... {}", identity.show, self.text(MessageKey::ShowNotExist));
                Ok(None)
            }
        }
    }

    fn download_for_library(&mut self, mode: &Mode) -> Result<()> {
        let mut videos = collect_files(
            &self.options.default_dir,
            &self.options.video_extensions,
            self.options.recursive,
        )?;
        if videos.is_empty() {
            println!("{}", self.text(MessageKey::NoFile));
            return Ok(());
        }
        if self.options.skip_if_present {
            videos = videos_without_subtitles(videos, &self.options.subtitle_dir);
        }

        if videos.is_empty() {
            println!("{}", self.text(MessageKey::NothingToDo));
            return Ok(());
        }

        for video in &videos {
            if let Err(e) = self.download_for_video(mode, video) {
                eprintln!("Error processing {}: {e:#}", video.display());
            }
        }
        Ok(())
    }

    fn download_for_video(&mut self, mode: &Mode, video: &Path) -> Result<()> {
        let name = video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some((show, identity)) = self.lookup_episode(&name)? else {
            return Ok(());
        };

        let candidates = self.service.search_subtitles(
            &show.url_slug,
            identity.season.as_deref(),
            identity.episode.as_deref(),
            None,
        )?;
        if candidates.is_empty() {
            println!("{} {}", self.text(MessageKey::NoSubFor), file_stem(video));
            return Ok(());
        }

        let dest_dir = self.options.subtitle_dir.ensure(video)?;
        self.download(DownloadJob::new(mode, candidates, &dest_dir, Some(video)))?;
        Ok(())
    }

    fn download_for_release(&mut self, mode: &Mode, release: &str) -> Result<()> {
        let Some((show, identity)) = self.lookup_episode(release)? else {
            return Ok(());
        };
        let season = identity.season.as_deref().unwrap_or_default();
        let episode = identity.episode.as_deref().unwrap_or_default();

        if self.options.mark_downloaded {
            let marked = self.service.mark_downloaded(
                &self.options.credentials,
                &show.url_slug,
                season,
                episode,
            )?;
            let key = if marked {
                MessageKey::MarkedDownloaded
            } else {
                MessageKey::NotMarkedDownloaded
            };
            println!("{} S{season}E{episode} {}", show.url_slug, self.text(key));
        }

        let candidates = self.service.search_subtitles(
            &show.url_slug,
            identity.season.as_deref(),
            identity.episode.as_deref(),
            None,
        )?;
        let video = self.options.default_dir.join(release);
        let dest_dir = self.options.subtitle_dir.ensure(&video)?;
        self.download(DownloadJob::new(mode, candidates, &dest_dir, Some(&video)))?;
        Ok(())
    }

    fn unzip_all(&self) -> Result<()> {
        println!("{}", self.text(MessageKey::Unzip));
        let archives = collect_files(
            &self.options.default_dir,
            &["zip".to_string()],
            self.options.recursive,
        )?;
        for zip in archives {
            let dir = zip.parent().unwrap_or(Path::new("."));
            archive::extract(&zip, dir, self.options.archive_filter())?;
            println!("{}", file_name(&zip));
        }
        Ok(())
    }

    fn filter_all(&self) -> Result<()> {
        println!("{}", self.text(MessageKey::Filter));
        let Some(filter) = &self.options.filters_regex else {
            warn!("No filters_regex set, nothing to filter");
            return Ok(());
        };
        let files = collect_files(
            &self.options.default_dir,
            &self.options.filter_extensions,
            self.options.recursive,
        )?;
        for file in files {
            if filter.is_match(&file.to_string_lossy()) {
                fs::remove_file(&file)?;
                println!("{}", file_name(&file));
            }
        }
        Ok(())
    }

    fn mark_watched(&self, file: &Path) -> Result<()> {
        let Some((show, identity)) = self.lookup_episode(&file_stem(file))? else {
            return Ok(());
        };
        let season = identity.season.as_deref().unwrap_or_default();
        let episode = identity.episode.as_deref().unwrap_or_default();

        let watched =
            self.service
                .mark_watched(&self.options.credentials, &show.url_slug, season, episode)?;
        if watched {
            println!(
                "\n[{} season {season} episode {episode}] {}",
                show.title,
                self.text(MessageKey::MarkedWatched)
            );
        }
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
