//! Player sources backed by HTTP and by a local JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use super::error::InfraError;
use crate::application::error::TransportError;
use crate::application::repos::PlayerSource;
use crate::domain::records::LeagueFeedRecord;

const LIST_PATH: &str = "list";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the league feed with `GET {base}/list`.
#[derive(Clone, Debug)]
pub struct HttpPlayerSource {
    client: Client,
    list_url: Url,
}

impl HttpPlayerSource {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, InfraError> {
        let list_url = base_url
            .join(LIST_PATH)
            .map_err(|err| InfraError::configuration(format!("invalid source url: {err}")))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;
        Ok(Self { client, list_url })
    }

    pub fn user_agent() -> &'static str {
        concat!("roster/", env!("CARGO_PKG_VERSION"))
    }

    pub fn list_url(&self) -> &Url {
        &self.list_url
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::no_connection(err.to_string())
    } else if err.is_body() || err.is_decode() {
        TransportError::io(err.to_string())
    } else {
        TransportError::other(err.to_string())
    }
}

#[async_trait]
impl PlayerSource for HttpPlayerSource {
    #[instrument(skip(self), fields(url = %self.list_url))]
    async fn fetch(&self) -> Result<Vec<LeagueFeedRecord>, TransportError> {
        let resp = self
            .client
            .get(self.list_url.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(TransportError::other(format!("status {status} body {text}")));
        }

        let body = resp.bytes().await.map_err(classify)?;
        let feed: Vec<LeagueFeedRecord> = serde_json::from_slice(&body)
            .map_err(|err| TransportError::io(format!("malformed league feed: {err}")))?;
        debug!(leagues = feed.len(), bytes = body.len(), "Fetched league feed");
        Ok(feed)
    }
}

/// Reads the league feed from a JSON file on every fetch.
#[derive(Clone, Debug)]
pub struct FilePlayerSource {
    path: PathBuf,
}

impl FilePlayerSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PlayerSource for FilePlayerSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<Vec<LeagueFeedRecord>, TransportError> {
        let body = tokio::fs::read(&self.path).await.map_err(|err| {
            TransportError::io(format!("failed to read {}: {err}", self.path.display()))
        })?;
        let feed: Vec<LeagueFeedRecord> = serde_json::from_slice(&body).map_err(|err| {
            TransportError::io(format!("malformed league feed in {}: {err}", self.path.display()))
        })?;
        debug!(leagues = feed.len(), "Read league feed from file");
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::application::error::TransportErrorKind;

    const FEED: &str = r#"[
        {
            "league": {"name": "Ligue 1", "country": "France", "rank": 5, "totalMatches": 306},
            "players": [
                {"name": "Kylian Mbappe", "team": {"name": "PSG", "rank": 1}, "totalGoal": 28}
            ]
        }
    ]"#;

    #[test]
    fn list_url_joins_base() {
        let base = Url::parse("https://example.com/api/").expect("url");
        let source = HttpPlayerSource::new(&base, Duration::from_secs(5)).expect("source");
        assert_eq!(source.list_url().as_str(), "https://example.com/api/list");
    }

    #[tokio::test]
    async fn file_source_reads_feed() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(FEED.as_bytes()).expect("write feed");

        let feed = FilePlayerSource::new(file.path())
            .fetch()
            .await
            .expect("feed");

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].league.total_matches, 306);
        assert_eq!(feed[0].players[0].total_goal, 28);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = FilePlayerSource::new(dir.path().join("absent.json"))
            .fetch()
            .await
            .expect_err("missing file");
        assert_eq!(err.kind, TransportErrorKind::Io);
    }

    #[tokio::test]
    async fn malformed_file_is_io_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{not json").expect("write");

        let err = FilePlayerSource::new(file.path())
            .fetch()
            .await
            .expect_err("malformed");
        assert_eq!(err.kind, TransportErrorKind::Io);
    }
}
