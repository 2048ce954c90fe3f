use anyhow::{Context, Result};
use regex::Regex;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

pub fn is_zip(path: &Path) -> bool {
    File::open(path)
        .ok()
        .and_then(|file| ZipArchive::new(file).ok())
        .is_some()
}

/// Extract every file of `archive` directly into `dest_dir`, then delete the archive.
///
/// Entries whose name matches `exclude` are left out. A path that is not a zip archive is
/// returned unchanged.
pub fn extract(archive: &Path, dest_dir: &Path, exclude: Option<&Regex>) -> Result<Vec<PathBuf>> {
    let Ok(file) = File::open(archive) else {
        return Ok(vec![archive.to_path_buf()]);
    };
    let Ok(mut zip) = ZipArchive::new(file) else {
        return Ok(vec![archive.to_path_buf()]);
    };

    let mut extracted = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let entry_name = entry.name().to_string();
        if exclude.is_some_and(|re| re.is_match(&entry_name)) {
            debug!(entry = %entry_name, "Filtered out of archive");
            continue;
        }

        let Some(file_name) = Path::new(&entry_name).file_name() else {
            continue;
        };
        let target = dest_dir.join(file_name);
        if target.is_dir() {
            continue;
        }

        let mut out = File::create(&target)
            .with_context(|| format!("Cannot write {}", target.display()))?;
        if let Err(e) = io::copy(&mut entry, &mut out) {
            drop(out);
            let _ = fs::remove_file(&target);
            return Err(e).with_context(|| format!("Cannot extract {entry_name}"));
        }
        extracted.push(target);
    }

    drop(zip);
    fs::remove_file(archive)?;
    Ok(extracted)
}
