use std::path::PathBuf;

/// What a run does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Subtitles of the episodes left to watch on the member's account
    Episodes,
    /// A free-text query such as "dexter s01e01"; `extra` holds the loose words around it
    Search { query: String, extra: String },
    Prompt,
    /// Every video of the default directory
    File,
    /// One freshly downloaded release inside the default directory
    Torrent { release: String },
    Unzip,
    Filter,
    Stat,
    Watched { file: PathBuf },
}

impl Mode {
    /// Mode named in the settings file; `search` feeds the modes that take a text argument.
    pub fn from_setting(name: &str, search: &str) -> Option<Mode> {
        let mode = match name.trim().to_ascii_lowercase().as_str() {
            "episodes" => Mode::Episodes,
            "search" => Mode::Search {
                query: search.to_string(),
                extra: String::new(),
            },
            "prompt" => Mode::Prompt,
            "file" => Mode::File,
            "torrent" | "utorrent" => Mode::Torrent {
                release: search.to_string(),
            },
            "unzip" => Mode::Unzip,
            "filter" => Mode::Filter,
            "stat" => Mode::Stat,
            "watched" => Mode::Watched {
                file: PathBuf::from(search),
            },
            _ => return None,
        };
        Some(mode)
    }

    pub fn needs_directory(&self) -> bool {
        !matches!(self, Mode::Stat | Mode::Watched { .. })
    }

    /// Modes the updater may run again and again.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Mode::Episodes | Mode::File)
    }

    /// Modes whose candidates go through the user's quality/language filter and the history.
    pub fn is_automatic(&self) -> bool {
        matches!(self, Mode::Episodes | Mode::File | Mode::Torrent { .. })
    }

    /// Modes downloading for one known video, where the best file can be renamed after it.
    pub fn has_video(&self) -> bool {
        matches!(self, Mode::File | Mode::Torrent { .. })
    }
}
