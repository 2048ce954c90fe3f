use anyhow::{bail, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Where downloaded subtitles go, relative to the video they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleDir {
    NextToVideo,
    /// A folder of that name beside each video
    Subfolder(String),
    /// One directory for every video
    Fixed(PathBuf),
}

impl SubtitleDir {
    /// `""` keeps subtitles next to the video, `"|name"` uses a sub-folder, anything else must be
    /// an existing directory.
    pub fn from_setting(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Ok(SubtitleDir::NextToVideo);
        }
        if let Some(name) = value.strip_prefix('|') {
            if name.is_empty() {
                bail!("Subtitle sub-folder name is empty");
            }
            return Ok(SubtitleDir::Subfolder(name.to_string()));
        }
        let path = PathBuf::from(value);
        if !path.is_dir() {
            bail!("Subtitles directory does not exist: {value}");
        }
        Ok(SubtitleDir::Fixed(path))
    }

    pub fn resolve(&self, video: &Path) -> PathBuf {
        let parent = video.parent().unwrap_or(Path::new("."));
        match self {
            SubtitleDir::NextToVideo => parent.to_path_buf(),
            SubtitleDir::Subfolder(name) => parent.join(name),
            SubtitleDir::Fixed(path) => path.clone(),
        }
    }

    /// Resolve and create the directory if needed.
    pub fn ensure(&self, video: &Path) -> Result<PathBuf> {
        let dir = self.resolve(video);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// Files under `dir_path` whose extension is one of `extensions` (case-insensitive), sorted.
pub fn collect_files(dir_path: &Path, extensions: &[String], recurse: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files_helper(dir_path, extensions, recurse, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files_helper(
    dir_path: &Path,
    extensions: &[String],
    recurse: bool,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_file() {
            if has_extension(&path, extensions) {
                files.push(path);
            }
        } else if path.is_dir() && recurse {
            collect_files_helper(&path, extensions, recurse, files)?;
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Videos with no `<stem>.srt` in their subtitle directory yet.
pub fn videos_without_subtitles(videos: Vec<PathBuf>, subtitle_dir: &SubtitleDir) -> Vec<PathBuf> {
    videos
        .into_iter()
        .filter(|video| {
            let Some(stem) = video.file_stem() else {
                return true;
            };
            let mut srt = stem.to_os_string();
            srt.push(".srt");
            !subtitle_dir.resolve(video).join(srt).exists()
        })
        .collect()
}
