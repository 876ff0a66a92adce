pub mod delimited;
pub mod fetch;
pub mod parser;
pub mod record;
pub mod render;
pub mod store;

use fetch::{FetchError, Fetcher, Source};
use record::Record;
use std::fmt;
use store::RecordStore;
use thiserror::Error;
use tracing::{info, warn};

/// Default location of the teaching activities file
pub const DEFAULT_TEACHING_SOURCE: &str = "data/teaching.csv";
/// Default location of the bibliography
pub const DEFAULT_PUBLICATIONS_SOURCE: &str = "data/publications.bib";

/// The two independent data pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Teaching,
    Publications,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipeline::Teaching => write!(f, "teaching"),
            Pipeline::Publications => write!(f, "publications"),
        }
    }
}

#[derive(Error, Debug)]
#[error("Failed to load {pipeline} from {source_location}: {cause}")]
pub struct LoadError {
    pub pipeline: Pipeline,
    pub source_location: String,
    #[source]
    pub cause: FetchError,
}

/// Configuration for loading site data
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub teaching: Source,
    pub publications: Source,
    pub load_teaching: bool,
    pub load_publications: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            teaching: Source::parse(DEFAULT_TEACHING_SOURCE),
            publications: Source::parse(DEFAULT_PUBLICATIONS_SOURCE),
            load_teaching: true,
            load_publications: true,
        }
    }
}

/// Result of one load: each pipeline succeeds or fails on its own.
/// A pipeline disabled in the config is `None`.
#[derive(Debug)]
pub struct SiteData {
    pub teaching: Option<Result<Vec<Record>, LoadError>>,
    pub publications: Option<Result<RecordStore, LoadError>>,
}

impl SiteData {
    /// Fetch and parse both sources concurrently.
    ///
    /// Only a failure to set up the HTTP client is returned as an error; a
    /// source that cannot be fetched fails its own pipeline and leaves the
    /// other one intact.
    pub async fn load(config: &SiteConfig) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new()?;

        let teaching = async {
            if config.load_teaching {
                Some(load_teaching(&fetcher, &config.teaching).await)
            } else {
                None
            }
        };
        let publications = async {
            if config.load_publications {
                Some(load_publications(&fetcher, &config.publications).await)
            } else {
                None
            }
        };

        let (teaching, publications) = tokio::join!(teaching, publications);
        Ok(Self {
            teaching,
            publications,
        })
    }

    /// Select publication entry types, as given on the command line. Types
    /// are lowercased to match parsed entry types; naming one twice toggles
    /// it back off.
    pub fn apply_filters<S: AsRef<str>>(&mut self, filters: &[S]) {
        if let Some(Ok(store)) = self.publications.as_mut() {
            for filter in filters {
                store.toggle_filter(&filter.as_ref().to_lowercase());
            }
        }
    }

    /// Number of enabled pipelines that failed
    pub fn failure_count(&self) -> usize {
        let teaching_failed = matches!(self.teaching, Some(Err(_)));
        let publications_failed = matches!(self.publications, Some(Err(_)));
        usize::from(teaching_failed) + usize::from(publications_failed)
    }
}

async fn fetch_for(
    fetcher: &Fetcher,
    pipeline: Pipeline,
    source: &Source,
) -> Result<String, LoadError> {
    fetcher.fetch_text(source).await.map_err(|cause| {
        warn!(%pipeline, %source, error = %cause, "fetch failed");
        LoadError {
            pipeline,
            source_location: source.to_string(),
            cause,
        }
    })
}

/// Fetch and parse the teaching activities
pub async fn load_teaching(fetcher: &Fetcher, source: &Source) -> Result<Vec<Record>, LoadError> {
    let text = fetch_for(fetcher, Pipeline::Teaching, source).await?;
    let records = delimited::parse(&text);
    info!(%source, records = records.len(), "loaded teaching activities");
    Ok(records)
}

/// Fetch and parse the bibliography into a store with no active filters
pub async fn load_publications(
    fetcher: &Fetcher,
    source: &Source,
) -> Result<RecordStore, LoadError> {
    let text = fetch_for(fetcher, Pipeline::Publications, source).await?;
    let store = RecordStore::new(parser::parse(&text));
    info!(%source, records = store.len(), "loaded publications");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_data_dir() {
        let config = SiteConfig::default();
        assert_eq!(config.teaching.to_string(), "data/teaching.csv");
        assert_eq!(config.publications.to_string(), "data/publications.bib");
        assert!(config.load_teaching && config.load_publications);
    }

    #[test]
    fn test_failure_count() {
        let failed = || LoadError {
            pipeline: Pipeline::Teaching,
            source_location: "x".to_string(),
            cause: FetchError::Io {
                path: "x".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
        };

        let data = SiteData {
            teaching: Some(Err(failed())),
            publications: Some(Ok(RecordStore::default())),
        };
        assert_eq!(data.failure_count(), 1);

        let data = SiteData {
            teaching: None,
            publications: Some(Err(failed())),
        };
        assert_eq!(data.failure_count(), 1);
    }
}
