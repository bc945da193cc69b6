//! Boundary toward the episode metadata provider.
//!
//! The provider resolves a series by id or name and answers episode queries
//! by season/number, absolute number or air date. Every failure is reported
//! through [`LookupError`] so callers can decide per kind whether to skip,
//! proceed without a title, or abort.

use chrono::NaiveDate;
use thiserror::Error;

/// Per-file metadata resolution failures.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Series not found: {0}")]
    SeriesNotFound(String),

    #[error("Season {season} of series {series} could not be found")]
    SeasonNotFound { series: String, season: u32 },

    #[error("Episode not found: {0}")]
    EpisodeNotFound(String),

    #[error("Episode name not found: {0}")]
    EpisodeNameNotFound(String),

    #[error("Failed to retrieve metadata: {0}")]
    DataRetrieval(String),

    #[error("Cancelled by user")]
    UserAbort,
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        Self::DataRetrieval(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesQuery<'a> {
    Id(u64),
    Name(&'a str),
}

impl std::fmt::Display for SeriesQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeEntry {
    pub season: u32,
    pub number: u32,
    pub absolute_number: Option<u32>,
    pub air_date: Option<NaiveDate>,
    pub name: Option<String>,
}

/// Source of canonical series names and episode titles.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Resolves a series by provider id or by name.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::SeriesNotFound`] when nothing matches.
    async fn resolve_series(
        &self,
        query: SeriesQuery<'_>,
        language: &str,
    ) -> Result<Series, LookupError>;

    /// Episode `number` of `season`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::SeasonNotFound`] when the series has no such
    /// season and [`LookupError::EpisodeNotFound`] when the season lacks the
    /// episode.
    async fn episode(
        &self,
        series: &Series,
        season: u32,
        number: u32,
    ) -> Result<EpisodeEntry, LookupError>;

    /// Every episode whose absolute number matches `number`. An empty list is
    /// not an error.
    async fn episodes_by_absolute_number(
        &self,
        series: &Series,
        number: u32,
    ) -> Result<Vec<EpisodeEntry>, LookupError>;

    /// Every episode that aired on `date`. An empty list is not an error.
    async fn episodes_on_date(
        &self,
        series: &Series,
        date: NaiveDate,
    ) -> Result<Vec<EpisodeEntry>, LookupError>;
}
