//! In-memory stand-ins for the remote service and the console.

use anyhow::{bail, Result};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::prompt::Prompter;
use crate::domain::models::{ShowIdentifier, SubtitleCandidate, SubtitleLanguage};
use crate::infra::betaseries::{Credentials, SubtitleService};

pub type SearchCall = (String, Option<String>, Option<String>, Option<SubtitleLanguage>);

#[derive(Default)]
pub struct FakeService {
    pub files: HashMap<String, Vec<u8>>,
    pub shows: Vec<ShowIdentifier>,
    pub subtitles: Vec<SubtitleCandidate>,
    pub member: Vec<SubtitleCandidate>,
    pub genres: HashMap<String, Vec<String>>,
    pub fetches: Cell<usize>,
    pub searches: RefCell<Vec<SearchCall>>,
    pub marked_downloaded: RefCell<Vec<(String, String, String)>>,
    pub marked_watched: RefCell<Vec<(String, String, String)>>,
}

impl FakeService {
    pub fn with_file(mut self, url: &str, content: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), content);
        self
    }

    pub fn with_show(mut self, slug: &str, title: &str) -> Self {
        self.shows.push(ShowIdentifier {
            url_slug: slug.to_string(),
            title: title.to_string(),
        });
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl SubtitleService for FakeService {
    fn search_shows(&self, _title: &str) -> Result<Vec<ShowIdentifier>> {
        Ok(self.shows.clone())
    }

    fn search_subtitles(
        &self,
        show: &str,
        season: Option<&str>,
        episode: Option<&str>,
        language: Option<SubtitleLanguage>,
    ) -> Result<Vec<SubtitleCandidate>> {
        self.searches.borrow_mut().push((
            show.to_string(),
            season.map(str::to_string),
            episode.map(str::to_string),
            language,
        ));
        Ok(self
            .subtitles
            .iter()
            .filter(|c| c.show == show)
            .cloned()
            .collect())
    }

    fn member_subtitles(&self, _credentials: &Credentials) -> Result<Vec<SubtitleCandidate>> {
        Ok(self.member.clone())
    }

    fn mark_downloaded(
        &self,
        _credentials: &Credentials,
        show: &str,
        season: &str,
        episode: &str,
    ) -> Result<bool> {
        self.marked_downloaded
            .borrow_mut()
            .push((show.to_string(), season.to_string(), episode.to_string()));
        Ok(true)
    }

    fn mark_watched(
        &self,
        _credentials: &Credentials,
        show: &str,
        season: &str,
        episode: &str,
    ) -> Result<bool> {
        self.marked_watched
            .borrow_mut()
            .push((show.to_string(), season.to_string(), episode.to_string()));
        Ok(true)
    }

    fn show_genres(&self, show: &str) -> Result<Vec<String>> {
        match self.genres.get(show) {
            Some(genres) => Ok(genres.clone()),
            None => bail!("Betaseries: unknown show {show}"),
        }
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetches.set(self.fetches.get() + 1);
        match self.files.get(url) {
            Some(content) => Ok(content.clone()),
            None => bail!("Download of {url} failed: HTTP 404 Not Found"),
        }
    }
}

/// Answers handed out in order.
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Prompter for ScriptedPrompt {
    fn ask(&mut self, _label: &str) -> Result<String> {
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("Input cancelled"),
        }
    }
}

pub fn candidate(
    url: &str,
    display_name: &str,
    quality: u8,
    language: SubtitleLanguage,
) -> SubtitleCandidate {
    SubtitleCandidate {
        remote_id: url.to_string(),
        display_name: display_name.to_string(),
        show: "lost".to_string(),
        source: "addic7ed".to_string(),
        quality,
        language,
        season: "1".to_string(),
        episode: "1".to_string(),
    }
}

pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
