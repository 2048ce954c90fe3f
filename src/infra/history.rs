use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub show: String,
    pub url: String,
    pub downloaded_at: DateTime<Utc>,
}

/// Subtitles already downloaded, kept so a later pass does not fetch them again.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct History {
    records: Vec<DownloadRecord>,
    #[serde(skip)]
    path: PathBuf,
}

impl History {
    /// An unreadable or corrupt file starts an empty history.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<History>(&content) {
                    Ok(mut history) => {
                        history.path = path.to_path_buf();
                        return history;
                    }
                    Err(e) => warn!("Ignoring unreadable history {}: {e}", path.display()),
                },
                Err(e) => warn!("Cannot read history {}: {e}", path.display()),
            }
        }
        History {
            records: Vec::new(),
            path: path.to_path_buf(),
        }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.records.iter().any(|r| r.url == url)
    }

    pub fn record(&mut self, show: &str, url: &str) {
        if self.contains(url) {
            return;
        }
        self.records.push(DownloadRecord {
            show: show.to_string(),
            url: url.to_string(),
            downloaded_at: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct shows, in order of first download.
    pub fn titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = Vec::new();
        for record in &self.records {
            if !titles.contains(&record.show.as_str()) {
                titles.push(&record.show);
            }
        }
        titles
    }

    /// Download count per show, most downloaded first; ties stay in first-download order.
    pub fn top_shows(&self) -> Vec<(&str, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.show.as_str()).or_default() += 1;
        }
        let mut top: Vec<(&str, usize)> = self
            .titles()
            .into_iter()
            .map(|show| (show, counts[show]))
            .collect();
        top.sort_by(|a, b| b.1.cmp(&a.1));
        top
    }
}
