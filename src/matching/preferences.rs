use std::collections::BTreeSet;

use crate::domain::models::{LanguagePreference, SubtitleCandidate};

/// Episode value the service uses for a whole-season archive.
pub const WHOLE_SEASON: &str = "0";

/// Keep the candidates matching the user's quality and language choices, in their original order.
///
/// Whole-season archives only survive in bulk episode mode, where they are the natural unit.
pub fn filter_candidates(
    candidates: &[SubtitleCandidate],
    allowed_qualities: &BTreeSet<char>,
    language: LanguagePreference,
    bulk_episodes: bool,
) -> Vec<SubtitleCandidate> {
    candidates
        .iter()
        .filter(|c| {
            char::from_digit(u32::from(c.quality), 10)
                .is_some_and(|digit| allowed_qualities.contains(&digit))
        })
        .filter(|c| bulk_episodes || c.episode != WHOLE_SEASON)
        .filter(|c| language.accepts(c.language))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SubtitleLanguage;

    fn candidate(id: &str, quality: u8, language: SubtitleLanguage, episode: &str) -> SubtitleCandidate {
        SubtitleCandidate {
            remote_id: id.to_string(),
            display_name: format!("{id}.zip"),
            show: "dexter".to_string(),
            source: "addic7ed".to_string(),
            quality,
            language,
            season: "4".to_string(),
            episode: episode.to_string(),
        }
    }

    fn qualities(digits: &str) -> BTreeSet<char> {
        digits.chars().collect()
    }

    fn ids(candidates: &[SubtitleCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.remote_id.as_str()).collect()
    }

    fn sample() -> Vec<SubtitleCandidate> {
        vec![
            candidate("a", 3, SubtitleLanguage::Vo, "10"),
            candidate("b", 5, SubtitleLanguage::Vf, "10"),
            candidate("c", 1, SubtitleLanguage::VoVf, "10"),
            candidate("d", 4, SubtitleLanguage::Vf, WHOLE_SEASON),
        ]
    }

    #[test]
    fn test_quality_filter() {
        let kept = filter_candidates(&sample(), &qualities("345"), LanguagePreference::Both, true);
        assert_eq!(ids(&kept), vec!["a", "b", "d"]);
    }

    #[test]
    fn test_quality_outside_single_digit_never_matches() {
        let kept = filter_candidates(
            &[candidate("x", 10, SubtitleLanguage::Vo, "1")],
            &qualities("0123456789"),
            LanguagePreference::Both,
            false,
        );
        assert!(kept.is_empty());
    }

    #[test]
    fn test_whole_season_only_in_bulk_mode() {
        let all = qualities("12345");
        let kept = filter_candidates(&sample(), &all, LanguagePreference::Both, false);
        assert_eq!(ids(&kept), vec!["a", "b", "c"]);
        let kept = filter_candidates(&sample(), &all, LanguagePreference::Both, true);
        assert_eq!(ids(&kept), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_language_filter() {
        let all = qualities("12345");
        let vf = filter_candidates(&sample(), &all, LanguagePreference::Vf, true);
        assert_eq!(ids(&vf), vec!["b", "c", "d"]);
        let vo = filter_candidates(&sample(), &all, LanguagePreference::Vo, true);
        assert_eq!(ids(&vo), vec!["a", "c"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let allowed = qualities("1345");
        let once = filter_candidates(&sample(), &allowed, LanguagePreference::Vf, false);
        let twice = filter_candidates(&once, &allowed, LanguagePreference::Vf, false);
        assert_eq!(once, twice);
    }
}
