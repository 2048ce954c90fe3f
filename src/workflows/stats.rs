use std::collections::HashMap;
use std::fmt::Write;
use tracing::warn;

use crate::infra::betaseries::SubtitleService;
use crate::infra::history::History;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub top_shows: Vec<(String, usize)>,
    /// Genres of the downloaded shows, one count per show
    pub top_genres: Vec<(String, usize)>,
}

pub fn summarize<S: SubtitleService>(history: &History, service: &S) -> Summary {
    let mut genres: HashMap<String, usize> = HashMap::new();
    for show in history.titles() {
        match service.show_genres(show) {
            Ok(list) => {
                for genre in list {
                    *genres.entry(genre).or_default() += 1;
                }
            }
            Err(e) => warn!("No genres for {show}: {e:#}"),
        }
    }

    let mut top_genres: Vec<(String, usize)> = genres.into_iter().collect();
    top_genres.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Summary {
        total: history.len(),
        top_shows: history
            .top_shows()
            .into_iter()
            .map(|(show, count)| (show.to_string(), count))
            .collect(),
        top_genres,
    }
}

pub fn render(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SUBTITLES STATISTICS\n====================");
    let _ = writeln!(out, "\nTOTAL DOWNLOADED: {}", summary.total);

    let _ = writeln!(out, "\nTOP SERIES:");
    for (show, count) in &summary.top_shows {
        let _ = writeln!(out, "   {count}  {show} ({:.1}%)", percent(*count, summary.total));
    }

    let _ = writeln!(out, "\nTOP GENRES:");
    let genre_total: usize = summary.top_genres.iter().map(|(_, n)| n).sum();
    for (genre, count) in &summary.top_genres {
        let _ = writeln!(out, "   {count}  {genre} ({:.1}%)", percent(*count, genre_total));
    }
    out
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::testing::FakeService;
    use tempfile::TempDir;

    fn genres(list: &[&str]) -> Vec<String> {
        list.iter().map(|g| g.to_string()).collect()
    }

    #[test]
    fn test_summary() {
        let temp_dir = TempDir::new().unwrap();
        let mut history = History::load(&temp_dir.path().join("history.json"));
        history.record("fringe", "u1");
        history.record("fringe", "u2");
        history.record("fringe", "u3");
        history.record("dexter", "u4");
        history.record("unknown", "u5");

        let mut service = FakeService::default();
        service.genres.insert("fringe".to_string(), genres(&["Drama", "Science-Fiction"]));
        service.genres.insert("dexter".to_string(), genres(&["Drama", "Crime"]));

        let summary = summarize(&history, &service);
        assert_eq!(summary.total, 5);
        assert_eq!(
            summary.top_shows,
            vec![
                ("fringe".to_string(), 3),
                ("dexter".to_string(), 1),
                ("unknown".to_string(), 1)
            ]
        );
        assert_eq!(
            summary.top_genres,
            vec![
                ("Drama".to_string(), 2),
                ("Crime".to_string(), 1),
                ("Science-Fiction".to_string(), 1)
            ]
        );

        let text = render(&summary);
        assert!(text.contains("TOTAL DOWNLOADED: 5"));
        assert!(text.contains("   3  fringe (60.0%)"));
        assert!(text.contains("   2  Drama (50.0%)"));
    }

    #[test]
    fn test_empty_history() {
        let temp_dir = TempDir::new().unwrap();
        let history = History::load(&temp_dir.path().join("history.json"));
        let summary = summarize(&history, &FakeService::default());
        assert_eq!(summary.total, 0);
        assert!(render(&summary).contains("TOTAL DOWNLOADED: 0"));
    }
}
