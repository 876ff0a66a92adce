use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("sitedata/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Where a data file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// Interpret `http://` and `https://` locations as URLs, anything else
    /// as a filesystem path
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(location.to_string())
        } else {
            Source::Path(PathBuf::from(location))
        }
    }
}

impl From<&str> for Source {
    fn from(location: &str) -> Self {
        Source::parse(location)
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Reads source text from disk or over HTTP
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Fetch the full text of `source` as UTF-8
    pub async fn fetch_text(&self, source: &Source) -> Result<String, FetchError> {
        debug!(%source, "fetching");

        let text = match source {
            Source::Path(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
            Source::Url(url) => {
                let response = self.client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: url.clone(),
                        status,
                    });
                }
                response.text().await?
            }
        };

        debug!(%source, bytes = text.len(), "fetched");
        Ok(text)
    }
}
