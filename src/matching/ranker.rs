//! Picks the one subtitle file to keep for a video among everything downloaded for it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::parser::comparison_key;
use super::similarity::ratio;
use crate::domain::models::{LanguagePriority, SubtitleCandidate};

/// A ".fr" or ".vf" anywhere in a base name marks a French subtitle inside a multi-language archive.
static FRENCH_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(FR|VF)").expect("marker pattern is valid"));

#[derive(Debug, Clone)]
pub struct BucketEntry {
    pub candidate: SubtitleCandidate,
    pub files: Vec<PathBuf>,
}

/// Downloaded subtitle files of one video, grouped by the resource they came from.
///
/// Entries keep insertion order, which decides exact ties in [`rank`].
#[derive(Debug, Clone, Default)]
pub struct RankingBucket {
    entries: Vec<BucketEntry>,
}

impl RankingBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate; a second registration of the same id keeps the first position.
    pub fn register(&mut self, candidate: SubtitleCandidate) {
        if self.entry_mut(&candidate.remote_id).is_none() {
            self.entries.push(BucketEntry {
                candidate,
                files: Vec::new(),
            });
        }
    }

    pub fn set_files(&mut self, remote_id: &str, files: Vec<PathBuf>) {
        if let Some(entry) = self.entry_mut(remote_id) {
            entry.files = files;
        }
    }

    pub fn entries(&self) -> &[BucketEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().next().is_none()
    }

    fn entry_mut(&mut self, remote_id: &str) -> Option<&mut BucketEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.candidate.remote_id == remote_id)
    }

    fn pairs(&self) -> impl Iterator<Item = (&SubtitleCandidate, &PathBuf)> {
        self.entries
            .iter()
            .flat_map(|e| e.files.iter().map(move |f| (&e.candidate, f)))
    }
}

/// Nothing was downloaded for the video.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no subtitle file to choose from")]
pub struct NoWinner;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSubtitle {
    pub winner: PathBuf,
    /// Winner renamed after the video, in the winner's directory
    pub destination: PathBuf,
    pub ratio: f64,
    /// Every other file seen, each listed once
    pub junk: Vec<PathBuf>,
}

struct Best<'a> {
    path: &'a PathBuf,
    ratio: f64,
    quality: u8,
}

/// Choose the file whose name is closest to `reference`, favouring `priority`'s language.
///
/// The preferred language is tried first; when it yields nothing every file competes. Higher
/// similarity wins, equal similarity goes to the higher quality, and a complete tie goes to
/// the file seen last.
pub fn rank(
    bucket: &RankingBucket,
    reference: &Path,
    priority: LanguagePriority,
) -> Result<RankedSubtitle, NoWinner> {
    let reference_key = comparison_key(&base_name(reference));

    let preferred = best_of(
        bucket.pairs().filter(|(candidate, path)| {
            // Raw stem: normalizing turns the dots into spaces and the marker never matches.
            let french_name = FRENCH_MARKER.is_match(&base_name(path));
            priority.accepts(candidate.language)
                && match priority {
                    LanguagePriority::French => french_name,
                    LanguagePriority::Original => !french_name,
                }
        }),
        &reference_key,
    );
    let best = preferred
        .or_else(|| best_of(bucket.pairs(), &reference_key))
        .ok_or(NoWinner)?;

    let winner = best.path.clone();
    let extension = winner
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let destination = winner
        .parent()
        .unwrap_or(Path::new(""))
        .join(format!("{}{}", base_name(reference), extension));

    let mut junk: Vec<PathBuf> = Vec::new();
    for (_, path) in bucket.pairs() {
        if *path != winner && *path != destination && !junk.contains(path) {
            junk.push(path.clone());
        }
    }

    Ok(RankedSubtitle {
        winner,
        destination,
        ratio: best.ratio,
        junk,
    })
}

fn best_of<'a>(
    pairs: impl Iterator<Item = (&'a SubtitleCandidate, &'a PathBuf)>,
    reference_key: &str,
) -> Option<Best<'a>> {
    let mut best: Option<Best<'a>> = None;
    for (candidate, path) in pairs {
        let score = ratio(reference_key, &comparison_key(&base_name(path)));
        let replace = match &best {
            None => true,
            Some(current) => {
                score > current.ratio
                    || (score == current.ratio && candidate.quality >= current.quality)
            }
        };
        if replace {
            best = Some(Best {
                path,
                ratio: score,
                quality: candidate.quality,
            });
        }
    }
    best
}

/// File name without directory and extension.
fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
