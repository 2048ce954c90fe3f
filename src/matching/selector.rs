use std::collections::HashSet;

use crate::domain::models::ShowIdentifier;

/// Pick the show whose url slug could have been typed as `query`.
///
/// A slug qualifies when every one of its characters appears somewhere in `query`; position
/// and repetition are ignored. When nothing qualifies the first result wins, so a search
/// that returned anything always resolves to a show.
pub fn select_best_slug<'a>(
    query: &str,
    candidates: &'a [ShowIdentifier],
) -> Option<&'a ShowIdentifier> {
    let alphabet: HashSet<char> = query.chars().collect();
    candidates
        .iter()
        .find(|show| show.url_slug.chars().all(|c| alphabet.contains(&c)))
        .or_else(|| candidates.first())
}
