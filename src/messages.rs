//! Console texts, looked up by key so a translation can be swapped in.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    CriticalMode,
    CriticalDir,
    CriticalSubsDir,
    WarningModeSearch,
    WarningSearch,
    ShowNotExist,
    ShowsFound,
    SubSearch,
    SubDownloaded,
    SubDownloadedFor,
    SubDownload,
    Unzip,
    Filter,
    Working,
    NoFile,
    NoSub,
    NoSubFor,
    NothingToDo,
    UsingUpdater,
    ExtractInfoFailed,
    RankFailed,
    MarkedDownloaded,
    NotMarkedDownloaded,
    MarkedWatched,
}

/// Resolves a key to the text shown to the user.
pub type Messages = fn(MessageKey) -> &'static str;

pub fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::CriticalMode => "Mode is not defined or not correctly defined",
        MessageKey::CriticalDir => {
            "default_directory is not defined or not correctly defined"
        }
        MessageKey::CriticalSubsDir => "subtitles_directory is not correctly defined",
        MessageKey::WarningModeSearch => {
            "Holy crap!\nThe search must:\n    1) use a pattern like: dexter s01e01  or  the office 3\n    2) be more than 2 characters\n"
        }
        MessageKey::WarningSearch => "Show title must be 2 or more characters.",
        MessageKey::ShowNotExist => "This show does not exist on Betaseries!",
        MessageKey::ShowsFound => "shows found:",
        MessageKey::SubSearch => "Search subtitles...",
        MessageKey::SubDownloaded => "Woo-hoo! All subtitles are already downloaded!",
        MessageKey::SubDownloadedFor => "Subtitles already downloaded for",
        MessageKey::SubDownload => "subtitles to download",
        MessageKey::Unzip => "Unzip...",
        MessageKey::Filter => "Filter...",
        MessageKey::Working => "Working...",
        MessageKey::NoFile => "No videos or movies in your default directory.",
        MessageKey::NoSub => "No subtitles at the moment for all your files. Try later!",
        MessageKey::NoSubFor => "No subtitles for",
        MessageKey::NothingToDo => "You've no need of BetaSub right now!",
        MessageKey::UsingUpdater => "You activated the updater! Seconds between passes:",
        MessageKey::ExtractInfoFailed => "Extracting infos failed with file:",
        MessageKey::RankFailed => "Failed to find the best subtitle to rename",
        MessageKey::MarkedDownloaded => "downloaded on Betaseries!",
        MessageKey::NotMarkedDownloaded => "not downloaded on Betaseries!",
        MessageKey::MarkedWatched => "is watched on Betaseries!",
    }
}
