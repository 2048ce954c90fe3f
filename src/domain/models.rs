use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Error};

/// Language of a subtitle resource as reported by Betaseries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubtitleLanguage {
    /// Original version (English for most shows)
    Vo,
    /// French
    Vf,
    /// Archive carrying both
    VoVf,
}

impl SubtitleLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtitleLanguage::Vo => "VO",
            SubtitleLanguage::Vf => "VF",
            SubtitleLanguage::VoVf => "VOVF",
        }
    }
}

impl fmt::Display for SubtitleLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubtitleLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VO" => Ok(SubtitleLanguage::Vo),
            "VF" => Ok(SubtitleLanguage::Vf),
            "VOVF" => Ok(SubtitleLanguage::VoVf),
            other => bail!("Unknown subtitle language: {other}"),
        }
    }
}

/// Which subtitle languages the user wants downloaded at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguagePreference {
    Vf,
    Vo,
    #[default]
    Both,
}

impl LanguagePreference {
    pub fn accepts(&self, language: SubtitleLanguage) -> bool {
        match self {
            LanguagePreference::Vf => {
                matches!(language, SubtitleLanguage::Vf | SubtitleLanguage::VoVf)
            }
            LanguagePreference::Vo => {
                matches!(language, SubtitleLanguage::Vo | SubtitleLanguage::VoVf)
            }
            LanguagePreference::Both => true,
        }
    }
}

impl FromStr for LanguagePreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VF" => Ok(LanguagePreference::Vf),
            "VO" => Ok(LanguagePreference::Vo),
            "VOVF" | "" => Ok(LanguagePreference::Both),
            other => bail!("Invalid subtitle language preference: {other} (expected VF, VO or VOVF)"),
        }
    }
}

/// Language the ranker favours when picking the single subtitle to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguagePriority {
    /// `VF`, or its synonym `FR`
    French,
    /// `VO`, or its synonym `EN`
    Original,
}

impl LanguagePriority {
    pub fn accepts(&self, language: SubtitleLanguage) -> bool {
        match self {
            LanguagePriority::French => LanguagePreference::Vf.accepts(language),
            LanguagePriority::Original => LanguagePreference::Vo.accepts(language),
        }
    }
}

impl FromStr for LanguagePriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VF" | "FR" => Ok(LanguagePriority::French),
            "VO" | "EN" => Ok(LanguagePriority::Original),
            other => bail!("Invalid language priority: {other} (expected VF, FR, VO or EN)"),
        }
    }
}

/// Show, season, episode and language hint extracted from a file name or a search string.
///
/// Season and episode keep the digits exactly as written ("01" stays "01"); `None` means the
/// marker was not present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaIdentity {
    pub show: String,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub language: Option<SubtitleLanguage>,
}

/// A subtitle resource advertised by the service, before anything is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    /// Download url, unique per resource
    pub remote_id: String,
    pub display_name: String,
    /// Show url slug the subtitle belongs to
    pub show: String,
    pub source: String,
    pub quality: u8,
    pub language: SubtitleLanguage,
    pub season: String,
    /// "0" marks a whole-season archive
    pub episode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowIdentifier {
    #[serde(rename = "url")]
    pub url_slug: String,
    pub title: String,
}
