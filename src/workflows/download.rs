use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error};

use super::renamer;
use crate::config::RunOptions;
use crate::domain::models::SubtitleCandidate;
use crate::infra::betaseries::SubtitleService;
use crate::infra::history::History;
use crate::matching::{filter_candidates, rank, RankingBucket};
use crate::media::archive;
use crate::messages::{MessageKey, Messages};
use crate::workflows::mode::Mode;

/// Subtitles to fetch for one video, or for no video in particular.
pub struct DownloadJob<'a> {
    pub candidates: Vec<SubtitleCandidate>,
    pub dest_dir: &'a Path,
    /// The video the subtitles are for; the best one is renamed after it
    pub video: Option<&'a Path>,
    /// Apply the user's filter and skip what the history already has
    pub automatic: bool,
    /// Whole-season archives are wanted
    pub bulk_episodes: bool,
}

impl<'a> DownloadJob<'a> {
    /// Job shaped by what `mode` allows: filtering, history and renaming after the video.
    pub fn new(
        mode: &Mode,
        candidates: Vec<SubtitleCandidate>,
        dest_dir: &'a Path,
        video: Option<&'a Path>,
    ) -> Self {
        Self {
            candidates,
            dest_dir,
            video: video.filter(|_| mode.has_video()),
            automatic: mode.is_automatic(),
            bulk_episodes: matches!(mode, Mode::Episodes),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum DownloadOutcome {
    NoSubtitles,
    AlreadyDownloaded,
    Downloaded {
        files: Vec<PathBuf>,
        placed: Option<PathBuf>,
    },
}

pub fn download_subtitles<S: SubtitleService>(
    service: &S,
    options: &RunOptions,
    history: &mut History,
    messages: Messages,
    job: DownloadJob<'_>,
) -> Result<DownloadOutcome> {
    let candidates = if job.automatic {
        filter_candidates(
            &job.candidates,
            &options.allowed_qualities,
            options.language,
            job.bulk_episodes,
        )
    } else {
        job.candidates
    };

    if candidates.is_empty() {
        println!("{}", messages(MessageKey::NoSub));
        return Ok(DownloadOutcome::NoSubtitles);
    }

    let use_history = options.use_history && job.automatic;
    let candidates: Vec<SubtitleCandidate> = if use_history {
        candidates
            .into_iter()
            .filter(|c| !history.contains(&c.remote_id))
            .collect()
    } else {
        candidates
    };

    if candidates.is_empty() {
        match job.video {
            Some(video) => println!(
                "{} {}",
                messages(MessageKey::SubDownloadedFor),
                display_stem(video)
            ),
            None => println!("{}", messages(MessageKey::SubDownloaded)),
        }
        return Ok(DownloadOutcome::AlreadyDownloaded);
    }

    println!(
        "\n{} {} in {}\n",
        candidates.len(),
        messages(MessageKey::SubDownload),
        job.dest_dir.display()
    );

    let mut bucket = RankingBucket::new();
    let mut written: Vec<PathBuf> = Vec::new();
    for candidate in candidates {
        let path = match download_one(service, &candidate, job.dest_dir, &written) {
            Ok(path) => path,
            Err(e) => {
                error!("Download of {} failed: {e:#}", candidate.remote_id);
                continue;
            }
        };
        written.push(path.clone());
        debug!(file = %path.display(), quality = candidate.quality, "Downloaded subtitle");

        let files = if options.unzip {
            match archive::extract(&path, job.dest_dir, options.archive_filter()) {
                Ok(extracted) => extracted,
                Err(e) => {
                    error!("Extraction of {} failed: {e:#}", path.display());
                    continue;
                }
            }
        } else if archive::is_zip(&path) {
            Vec::new()
        } else {
            vec![path]
        };

        if use_history {
            history.record(&candidate.show, &candidate.remote_id);
        }

        let remote_id = candidate.remote_id.clone();
        bucket.register(candidate);
        bucket.set_files(&remote_id, files);
    }

    if use_history {
        history.save()?;
    }

    let placed = match job.video {
        Some(video) if options.rename_subtitles => place_best(options, messages, &bucket, video),
        _ => None,
    };

    let files = bucket
        .entries()
        .iter()
        .flat_map(|e| e.files.iter().cloned())
        .collect();
    Ok(DownloadOutcome::Downloaded { files, placed })
}

/// Fetch one candidate into `dest_dir`; names already written by this job are not overwritten.
fn download_one<S: SubtitleService>(
    service: &S,
    candidate: &SubtitleCandidate,
    dest_dir: &Path,
    written: &[PathBuf],
) -> Result<PathBuf> {
    let bytes = service.fetch(&candidate.remote_id)?;

    let file_name = renamer::subtitle_file_name(&candidate.display_name, &candidate.remote_id);
    let mut target = dest_dir.join(&file_name);
    if written.contains(&target) {
        target = renamer::find_unique_filename(dest_dir, &file_name);
    }

    let mut temp = NamedTempFile::new_in(dest_dir)?;
    temp.write_all(&bytes)?;
    temp.persist(&target)?;
    Ok(target)
}

fn place_best(
    options: &RunOptions,
    messages: Messages,
    bucket: &RankingBucket,
    video: &Path,
) -> Option<PathBuf> {
    let ranked = match rank(bucket, video, options.language_priority) {
        Ok(ranked) => ranked,
        Err(e) => {
            eprintln!("{} {}: {e}", messages(MessageKey::RankFailed), video.display());
            return None;
        }
    };
    debug!(winner = %ranked.winner.display(), ratio = ranked.ratio, "Best subtitle");

    if let Err(e) = renamer::place_winner(&ranked.winner, &ranked.destination) {
        error!("{e:#}");
        return None;
    }

    if options.keep_only_one {
        let mut junk = ranked.junk;
        if ranked.winner != ranked.destination {
            junk.push(ranked.winner);
        }
        renamer::remove_junk(&junk);
    }
    Some(ranked.destination)
}

fn display_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
