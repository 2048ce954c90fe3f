//! Extracts show, season, episode and language hint from loosely formatted names.
//!
//! Handles the shapes found in the wild:
//! - "Southland - 3x01 - Episode 1.HDTV.en.avi"
//! - "Chuck.S04E14.HDTV.vostfr.avi"
//! - "dexter 410 vf" (season and episode glued together)
//! - "the office saison 3"

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::domain::models::{MediaIdentity, SubtitleLanguage};

/// Characters that separate words in release names.
const SEPARATORS: &[char] = &['.', '-', '_', ',', ':', ';', '[', ']', '(', ')'];

/// Years that would otherwise be read as season 20, episode 0x.
const RELEASE_YEARS: std::ops::Range<u32> = 2000..2020;

static WITH_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?xi)
        ^(?P<show>.*?)\s*
        (
            season?|saison?|[s\x20.n]?(?P<season>[0-9]+)
            [e\x20.x]?(?P<episode>[0-9]+)?
        )+
        .*
        [\x20.]+(?P<language>fren|enfr|vovf|vfvo|fr|en|vo|vf)+?
        .*?$",
    )
    .expect("language pattern is valid")
});

static WITHOUT_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?xi)
        ^(?P<show>.*?)\s*
        (
            season?|saison?|[s\x20.n]?(?P<season>[0-9]+)
            [e\x20.x]?(?P<episode>[0-9]+)?
        )+",
    )
    .expect("fallback pattern is valid")
});

/// The input carries no recognizable season/episode marker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not extract show, season and episode from {input:?}")]
pub struct NoMatch {
    pub input: String,
}

/// Replace separators with spaces and drop release years.
pub fn normalize(raw: &str) -> String {
    let mut value: String = raw
        .chars()
        .map(|c| if SEPARATORS.contains(&c) { ' ' } else { c })
        .collect();
    for year in RELEASE_YEARS {
        value = value.replace(&year.to_string(), "");
    }
    value
}

/// Key used whenever two names are compared for similarity.
pub fn comparison_key(raw: &str) -> String {
    normalize(raw).to_lowercase()
}

pub fn parse(raw: &str) -> Result<MediaIdentity, NoMatch> {
    let value = normalize(raw);

    let caps = WITH_LANGUAGE
        .captures(&value)
        .or_else(|| WITHOUT_LANGUAGE.captures(&value))
        .ok_or_else(|| NoMatch {
            input: raw.to_string(),
        })?;

    let mut season = caps.name("season").map(|m| m.as_str().to_string());
    let mut episode = caps.name("episode").map(|m| m.as_str().to_string());

    if let Some((s, e)) = season.as_deref().and_then(split_glued_season) {
        season = Some(s);
        episode = Some(e);
    }

    let language = caps
        .name("language")
        .and_then(|m| normalize_language(m.as_str()));

    let show = caps.name("show").map_or("", |m| m.as_str()).trim();
    let show = if show.to_lowercase() == "v" {
        "V (2009)".to_string()
    } else {
        show.to_string()
    };

    Ok(MediaIdentity {
        show,
        season,
        episode,
        language,
    })
}

/// "410" is season 4 episode 10, "1203" is season 12 episode 03.
fn split_glued_season(season: &str) -> Option<(String, String)> {
    match season.len() {
        3 => Some((season[..1].to_string(), season[1..].to_string())),
        n if n >= 4 => Some((season[..2].to_string(), season[2..].to_string())),
        _ => None,
    }
}

fn normalize_language(token: &str) -> Option<SubtitleLanguage> {
    // Bilingual synonyms first, so the "en"/"fr" inside them are not rewritten.
    let token = token
        .to_lowercase()
        .replace("fren", "vovf")
        .replace("enfr", "vovf")
        .replace("vfvo", "vovf");
    let token = token.replace("en", "vo").replace("fr", "vf");
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(show: &str, season: &str, episode: &str, language: Option<SubtitleLanguage>) -> MediaIdentity {
        let digits = |s: &str| (!s.is_empty()).then(|| s.to_string());
        MediaIdentity {
            show: show.to_string(),
            season: digits(season),
            episode: digits(episode),
            language,
        }
    }

    #[test]
    fn test_parse_season_x_episode_with_language() {
        assert_eq!(
            parse("Southland - 3x01 - Episode 1.HDTV.en.avi").unwrap(),
            identity("Southland", "3", "01", Some(SubtitleLanguage::Vo))
        );
    }

    #[test]
    fn test_parse_vostfr_reads_as_original_version() {
        // The language marker only has to start a word: "vostfr" yields "vo".
        assert_eq!(
            parse("Chuck.S04E14.HDTV.vostfr.avi").unwrap(),
            identity("Chuck", "04", "14", Some(SubtitleLanguage::Vo))
        );
    }

    #[test]
    fn test_parse_three_digit_season() {
        assert_eq!(
            parse("dexter 410 en").unwrap(),
            identity("dexter", "4", "10", Some(SubtitleLanguage::Vo))
        );
    }

    #[test]
    fn test_parse_four_digit_season() {
        assert_eq!(
            parse("The Office 1203 VF").unwrap(),
            identity("The Office", "12", "03", Some(SubtitleLanguage::Vf))
        );
    }

    #[test]
    fn test_parse_v_is_disambiguated() {
        assert_eq!(
            parse("V.2009.S01E01.en.avi").unwrap(),
            identity("V (2009)", "01", "01", Some(SubtitleLanguage::Vo))
        );
    }

    #[test]
    fn test_parse_without_language_marker() {
        assert_eq!(
            parse("Lost.S02E05.HDTV.XviD.avi").unwrap(),
            identity("Lost", "02", "05", None)
        );
    }

    #[test]
    fn test_parse_bilingual_marker() {
        assert_eq!(
            parse("Fringe - 3x05 - FrEn.srt").unwrap(),
            identity("Fringe", "3", "05", Some(SubtitleLanguage::VoVf))
        );
    }

    #[test]
    fn test_parse_season_word() {
        assert_eq!(
            parse("Dexter saison 3").unwrap(),
            identity("Dexter", "3", "", None)
        );
    }

    #[test]
    fn test_parse_strips_release_year() {
        assert_eq!(
            parse("Castle.2009.S03E10.avi").unwrap(),
            identity("Castle", "03", "10", None)
        );
    }

    #[test]
    fn test_parse_no_match() {
        assert_eq!(
            parse(""),
            Err(NoMatch {
                input: String::new()
            })
        );
        assert!(parse("Just a title").is_err());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let name = "Breaking.Bad.S05E14.HDTV.x264.fr.mkv";
        assert_eq!(parse(name).unwrap(), parse(name).unwrap());
        assert_eq!(parse(name).unwrap().language, Some(SubtitleLanguage::Vf));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a.b-c_d,e:f;g[h]i(j)"), "a b c d e f g h i j ");
        assert_eq!(normalize("Castle.2009.S03"), "Castle  S03");
        assert_eq!(comparison_key("Chuck.S04E14.LOL"), "chuck s04e14 lol");
    }
}
