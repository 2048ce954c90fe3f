use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use anyhow::{bail, Context, Result};

use crate::domain::models::{ShowIdentifier, SubtitleCandidate, SubtitleLanguage};

const BETASERIES_API_BASE: &str = "http://api.betaseries.com";

/// Error listed by Betaseries in the response's `errors`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Betaseries: {0}")]
pub struct ServiceError(String);

/// Member account used by the calls that act on a Betaseries profile.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// What the workflows need from the subtitle service.
pub trait SubtitleService {
    fn search_shows(&self, title: &str) -> Result<Vec<ShowIdentifier>>;

    fn search_subtitles(
        &self,
        show: &str,
        season: Option<&str>,
        episode: Option<&str>,
        language: Option<SubtitleLanguage>,
    ) -> Result<Vec<SubtitleCandidate>>;

    /// Subtitles of the episodes the member still has to watch.
    fn member_subtitles(&self, credentials: &Credentials) -> Result<Vec<SubtitleCandidate>>;

    fn mark_downloaded(
        &self,
        credentials: &Credentials,
        show: &str,
        season: &str,
        episode: &str,
    ) -> Result<bool>;

    fn mark_watched(
        &self,
        credentials: &Credentials,
        show: &str,
        season: &str,
        episode: &str,
    ) -> Result<bool>;

    fn show_genres(&self, show: &str) -> Result<Vec<String>>;

    /// Raw content of a subtitle resource.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug)]
pub struct BetaseriesClient {
    api_key: String,
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    root: Value,
}

#[derive(Debug, Deserialize)]
struct SubtitleRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    season: Value,
    #[serde(default)]
    episode: Value,
    language: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    url: String,
    #[serde(default)]
    quality: Value,
}

impl SubtitleRecord {
    /// Member episode listings name the file `filename`, searches name it `file`.
    fn into_candidate(self, prefer_filename: bool, show: Option<&str>) -> Result<SubtitleCandidate> {
        let language: SubtitleLanguage = self.language.parse()?;
        let display_name = if prefer_filename {
            self.filename.or(self.file)
        } else {
            self.file.or(self.filename)
        }
        .with_context(|| format!("Subtitle {} has no file name", self.url))?;

        Ok(SubtitleCandidate {
            display_name,
            show: show
                .map(str::to_string)
                .or(self.title)
                .unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            quality: scalar_to_u8(&self.quality),
            language,
            season: scalar_to_string(&self.season),
            episode: scalar_to_string(&self.episode),
            remote_id: self.url,
        })
    }
}

impl BetaseriesClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("BetaSub {}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { api_key, http })
    }

    /// Token for the member calls; requested again for every call.
    pub fn auth(&self, credentials: &Credentials) -> Result<String> {
        let hashed = format!("{:x}", md5::compute(credentials.password.as_bytes()));
        let root = self.get_root(
            "members/auth.json",
            &[("login", credentials.login.as_str()), ("password", hashed.as_str())],
        )?;
        let token = payload(&root, "member")?
            .get("token")
            .and_then(Value::as_str)
            .context("Betaseries: authentication returned no token")?;
        Ok(token.to_string())
    }

    fn get_root(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        debug!(path, "Betaseries request");
        let response = self
            .http
            .get(format!("{BETASERIES_API_BASE}/{path}"))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()?;

        if !response.status().is_success() {
            bail!("Betaseries request {path} failed: HTTP {}", response.status());
        }

        let envelope: Envelope = serde_json::from_str(&response.text()?)?;
        Ok(envelope.root)
    }
}

impl SubtitleService for BetaseriesClient {
    fn search_shows(&self, title: &str) -> Result<Vec<ShowIdentifier>> {
        let root = self.get_root("shows/search.json", &[("title", title)])?;
        empty_on_service_error(parse_shows(&root))
    }

    fn search_subtitles(
        &self,
        show: &str,
        season: Option<&str>,
        episode: Option<&str>,
        language: Option<SubtitleLanguage>,
    ) -> Result<Vec<SubtitleCandidate>> {
        let root = self.get_root(
            &format!("subtitles/show/{show}.json"),
            &[
                ("language", language.map_or("", |l| l.as_str())),
                ("season", season.unwrap_or_default()),
                ("episode", episode.unwrap_or_default()),
            ],
        )?;
        empty_on_service_error(parse_subtitles(&root))
    }

    fn member_subtitles(&self, credentials: &Credentials) -> Result<Vec<SubtitleCandidate>> {
        let token = self.auth(credentials)?;
        let root = self.get_root(
            "members/episodes/vovf.json",
            &[("view", ""), ("token", token.as_str())],
        )?;
        parse_member_episodes(&root)
    }

    fn mark_downloaded(
        &self,
        credentials: &Credentials,
        show: &str,
        season: &str,
        episode: &str,
    ) -> Result<bool> {
        let token = self.auth(credentials)?;
        let root = self.get_root(
            &format!("members/downloaded/{show}.json"),
            &[("season", season), ("episode", episode), ("token", token.as_str())],
        )?;
        Ok(scalar_to_string(payload(&root, "downloaded")?) == "1")
    }

    fn mark_watched(
        &self,
        credentials: &Credentials,
        show: &str,
        season: &str,
        episode: &str,
    ) -> Result<bool> {
        let token = self.auth(credentials)?;
        let root = self.get_root(
            &format!("members/watched/{show}.json"),
            &[
                ("season", season),
                ("episode", episode),
                ("note", ""),
                ("token", token.as_str()),
            ],
        )?;
        Ok(scalar_to_string(payload(&root, "code")?) == "1")
    }

    fn show_genres(&self, show: &str) -> Result<Vec<String>> {
        let root = self.get_root(&format!("shows/display/{show}.json"), &[])?;
        let genres = payload(&root, "show")?.get("genres");
        Ok(indexed_values(genres)
            .into_iter()
            .filter_map(|g| g.as_str().map(str::to_string))
            .collect())
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send()?;
        if !response.status().is_success() {
            bail!("Download of {url} failed: HTTP {}", response.status());
        }
        Ok(response.bytes()?.to_vec())
    }
}

fn parse_shows(root: &Value) -> Result<Vec<ShowIdentifier>> {
    indexed_values(Some(payload(root, "shows")?))
        .into_iter()
        .map(|show| Ok(serde_json::from_value(show.clone())?))
        .collect()
}

fn parse_subtitles(root: &Value) -> Result<Vec<SubtitleCandidate>> {
    Ok(collect_candidates(
        indexed_values(Some(payload(root, "subtitles")?)),
        false,
        None,
    ))
}

fn parse_member_episodes(root: &Value) -> Result<Vec<SubtitleCandidate>> {
    let mut candidates = Vec::new();
    for episode in indexed_values(Some(payload(root, "episodes")?)) {
        let show = episode.get("url").and_then(Value::as_str);
        candidates.extend(collect_candidates(
            indexed_values(episode.get("subs")),
            true,
            show,
        ));
    }
    Ok(candidates)
}

fn collect_candidates(
    records: Vec<&Value>,
    prefer_filename: bool,
    show: Option<&str>,
) -> Vec<SubtitleCandidate> {
    records
        .into_iter()
        .filter_map(|record| {
            let parsed = serde_json::from_value::<SubtitleRecord>(record.clone())
                .map_err(anyhow::Error::from)
                .and_then(|r| r.into_candidate(prefer_filename, show));
            match parsed {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    warn!("Skipping subtitle record: {e}");
                    None
                }
            }
        })
        .collect()
}

/// The requested payload, or the service's own error messages.
fn payload<'v>(root: &'v Value, key: &str) -> Result<&'v Value> {
    if let Some(value) = root.get(key) {
        return Ok(value);
    }
    let messages: Vec<&str> = indexed_values(root.get("errors"))
        .into_iter()
        .filter_map(|e| e.get("content").and_then(Value::as_str))
        .collect();
    if messages.is_empty() {
        bail!("Betaseries: response has no {key}");
    }
    Err(ServiceError(messages.join("; ")).into())
}

/// An unknown show or episode ends one search, not the whole pass.
fn empty_on_service_error<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(e) if e.is::<ServiceError>() => {
            error!("{e}");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Collections come back either as arrays or as objects keyed "0", "1", ...
fn indexed_values(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(key, _)| (key.parse::<u64>().unwrap_or(u64::MAX), key.to_string()));
            entries.into_iter().map(|(_, v)| v).collect()
        }
        _ => Vec::new(),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn scalar_to_u8(value: &Value) -> u8 {
    scalar_to_string(value).trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_subtitles_in_index_order() {
        let root = json!({
            "code": 1,
            "subtitles": {
                "10": {"title": "chuck", "season": 4, "episode": 14, "language": "VF",
                       "source": "seriessub", "file": "chuck.414.zip",
                       "url": "http://www.betaseries.com/srt/3", "quality": 5},
                "2": {"title": "chuck", "season": "4", "episode": "14", "language": "VO",
                      "source": "addic7ed", "file": "Chuck - 04x14.srt",
                      "url": "http://www.betaseries.com/srt/2", "quality": 3}
            }
        });
        let subs = parse_subtitles(&root).unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].remote_id, "http://www.betaseries.com/srt/2");
        assert_eq!(subs[0].language, SubtitleLanguage::Vo);
        assert_eq!(subs[0].display_name, "Chuck - 04x14.srt");
        assert_eq!(subs[1].season, "4");
        assert_eq!(subs[1].episode, "14");
        assert_eq!(subs[1].quality, 5);
        assert_eq!(subs[1].show, "chuck");
    }

    #[test]
    fn test_parse_subtitles_skips_unknown_language() {
        let root = json!({"subtitles": [
            {"language": "DE", "file": "a.srt", "url": "u1", "quality": 3},
            {"language": "VOVF", "file": "b.zip", "url": "u2", "quality": "4"}
        ]});
        let subs = parse_subtitles(&root).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].language, SubtitleLanguage::VoVf);
        assert_eq!(subs[0].quality, 4);
    }

    #[test]
    fn test_parse_member_episodes_tags_show() {
        let root = json!({"episodes": {
            "0": {"url": "dexter", "subs": {
                "0": {"language": "VF", "file": "dexter.zip", "filename": "Dexter.4x10.fr.srt",
                      "url": "u1", "quality": 4, "season": 4, "episode": 10}
            }},
            "1": {"url": "fringe", "subs": []}
        }});
        let subs = parse_member_episodes(&root).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].show, "dexter");
        assert_eq!(subs[0].display_name, "Dexter.4x10.fr.srt");
    }

    #[test]
    fn test_parse_shows() {
        let root = json!({"shows": {
            "0": {"url": "theofficeus", "title": "The Office US"},
            "1": {"url": "theofficeuk", "title": "The Office (UK)"}
        }});
        let shows = parse_shows(&root).unwrap();
        assert_eq!(shows[1].url_slug, "theofficeuk");
    }

    #[test]
    fn test_payload_reports_service_errors() {
        let root = json!({"errors": {"0": {"code": 2003, "content": "Show not found."}}});
        let err = parse_shows(&root).unwrap_err();
        assert_eq!(err.to_string(), "Betaseries: Show not found.");

        let err = parse_subtitles(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Betaseries: response has no subtitles");
    }

    #[test]
    fn test_searches_read_service_errors_as_empty() {
        let root = json!({"errors": {"0": {"code": 4001, "content": "Show not found."}}});
        assert!(empty_on_service_error(parse_shows(&root)).unwrap().is_empty());
        assert!(empty_on_service_error(parse_subtitles(&root)).unwrap().is_empty());

        assert!(empty_on_service_error(parse_subtitles(&json!({}))).is_err());
    }
}
