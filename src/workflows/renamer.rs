use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

/// File name for a downloaded subtitle; falls back to the last url segment.
pub fn subtitle_file_name(display_name: &str, remote_id: &str) -> String {
    let name = sanitize_filename(display_name);
    if !name.is_empty() {
        return name;
    }
    let fallback = sanitize_filename(remote_id.rsplit('/').next().unwrap_or_default());
    if fallback.is_empty() {
        "subtitle".to_string()
    } else {
        fallback
    }
}

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// `directory/file_name`, or `stem [copy N].ext` when that name is already taken.
pub fn find_unique_filename(directory: &Path, file_name: &str) -> PathBuf {
    let mut path = directory.join(file_name);
    let mut counter = 1;

    while path.exists() {
        let base = Path::new(file_name);
        let stem = base
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("subtitle");
        let new_filename = match base.extension().and_then(|s| s.to_str()) {
            Some(extension) => format!("{stem} [copy {counter}].{extension}"),
            None => format!("{stem} [copy {counter}]"),
        };
        path = directory.join(new_filename);
        counter += 1;
    }

    path
}

/// Copy the chosen subtitle to its final name, replacing any previous one.
pub fn place_winner(winner: &Path, destination: &Path) -> Result<()> {
    if winner == destination {
        return Ok(());
    }
    fs::copy(winner, destination).with_context(|| {
        format!(
            "Problem to rename {} to {}",
            winner.display(),
            destination.display()
        )
    })?;
    Ok(())
}

/// Delete leftover subtitles; returns how many were removed.
pub fn remove_junk(junk: &[PathBuf]) -> usize {
    let mut removed = 0;
    for path in junk {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Cannot remove {}: {e}", path.display()),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Normal Name.srt"), "Normal Name.srt");
        assert_eq!(sanitize_filename("Name/With/Slashes"), "Name-With-Slashes");
        assert_eq!(
            sanitize_filename("Name\\With\\Backslashes"),
            "Name-With-Backslashes"
        );
        assert_eq!(sanitize_filename("Chuck: 04x14?"), "Chuck- 04x14-");
        assert_eq!(sanitize_filename("Name\"With\"Quotes"), "Name-With-Quotes");
        assert_eq!(sanitize_filename("Name<With>Angles|Pipes*"), "Name-With-Angles-Pipes-");
        assert_eq!(sanitize_filename("  Trim Me  "), "Trim Me");
    }

    #[test]
    fn test_subtitle_file_name() {
        assert_eq!(
            subtitle_file_name("Chuck - 04x14.srt", "http://www.betaseries.com/srt/310234"),
            "Chuck - 04x14.srt"
        );
        assert_eq!(
            subtitle_file_name("   ", "http://www.betaseries.com/srt/310234"),
            "310234"
        );
        assert_eq!(subtitle_file_name("", ""), "subtitle");
    }

    #[test]
    fn test_find_unique_filename_no_conflict() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path();

        let unique_path = find_unique_filename(dir_path, "dexter.410.zip");
        assert_eq!(unique_path, dir_path.join("dexter.410.zip"));
    }

    #[test]
    fn test_find_unique_filename_with_conflict() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path();
        let base_filename = "Dexter - 4x10.srt";

        File::create(dir_path.join(base_filename)).unwrap();
        let unique_path = find_unique_filename(dir_path, base_filename);
        assert_eq!(unique_path, dir_path.join("Dexter - 4x10 [copy 1].srt"));

        File::create(dir_path.join("Dexter - 4x10 [copy 1].srt")).unwrap();
        let unique_path_2 = find_unique_filename(dir_path, base_filename);
        assert_eq!(unique_path_2, dir_path.join("Dexter - 4x10 [copy 2].srt"));
    }

    #[test]
    fn test_place_winner_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let winner = temp_dir.path().join("Dexter.4x10.fr.srt");
        let destination = temp_dir.path().join("Dexter.S04E10.srt");
        fs::write(&winner, "new").unwrap();
        fs::write(&destination, "old").unwrap();

        place_winner(&winner, &destination).unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "new");
        assert!(winner.exists());

        place_winner(&destination, &destination).unwrap();
        assert!(place_winner(&temp_dir.path().join("missing.srt"), &destination).is_err());
    }

    #[test]
    fn test_remove_junk() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.srt");
        let b = temp_dir.path().join("b.srt");
        fs::write(&a, "").unwrap();

        assert_eq!(remove_junk(&[a.clone(), b]), 1);
        assert!(!a.exists());
    }
}
