use crate::config::MetadataConfig;
use crate::constants::metadata::USER_AGENT;
use crate::services::metadata::{EpisodeEntry, LookupError, MetadataProvider, Series, SeriesQuery};
use anyhow::Result;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct TvMazeShow {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeEpisode {
    pub name: Option<String>,
    pub season: u32,
    /// Missing for specials.
    pub number: Option<u32>,
    pub airdate: Option<String>,
}

/// Episode metadata from the TVmaze API.
pub struct TvMazeClient {
    client: Client,
    base_url: String,
    episodes: Mutex<HashMap<u64, Arc<Vec<EpisodeEntry>>>>,
}

impl TvMazeClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &MetadataConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            episodes: Mutex::new(HashMap::new()),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, LookupError> {
        debug!(url, "TVmaze request");
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::DataRetrieval(format!(
                "TVmaze API error: {status} - {body}"
            )));
        }

        Ok(Some(response.json().await?))
    }

    async fn episode_list(&self, series: &Series) -> Result<Arc<Vec<EpisodeEntry>>, LookupError> {
        let mut cache = self.episodes.lock().await;
        if let Some(entries) = cache.get(&series.id) {
            return Ok(Arc::clone(entries));
        }

        let url = format!("{}/shows/{}/episodes", self.base_url, series.id);
        let raw: Vec<TvMazeEpisode> = self
            .get_json(&url)
            .await?
            .ok_or_else(|| LookupError::SeriesNotFound(series.name.clone()))?;

        let entries = Arc::new(episode_entries(raw));
        debug!(series = %series.name, count = entries.len(), "Cached episode list");
        cache.insert(series.id, Arc::clone(&entries));
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TvMazeClient {
    async fn resolve_series(
        &self,
        query: SeriesQuery<'_>,
        language: &str,
    ) -> Result<Series, LookupError> {
        let url = match query {
            SeriesQuery::Id(id) => format!("{}/shows/{id}", self.base_url),
            SeriesQuery::Name(name) => format!(
                "{}/singlesearch/shows?q={}",
                self.base_url,
                urlencoding::encode(name)
            ),
        };
        debug!(series = %query, language, "Looking up series");

        let show: TvMazeShow = self
            .get_json(&url)
            .await?
            .ok_or_else(|| LookupError::SeriesNotFound(query.to_string()))?;

        Ok(Series {
            id: show.id,
            name: show.name,
        })
    }

    async fn episode(
        &self,
        series: &Series,
        season: u32,
        number: u32,
    ) -> Result<EpisodeEntry, LookupError> {
        let entries = self.episode_list(series).await?;
        find_episode(&entries, &series.name, season, number)
    }

    async fn episodes_by_absolute_number(
        &self,
        series: &Series,
        number: u32,
    ) -> Result<Vec<EpisodeEntry>, LookupError> {
        let entries = self.episode_list(series).await?;
        Ok(entries
            .iter()
            .filter(|e| e.absolute_number == Some(number))
            .cloned()
            .collect())
    }

    async fn episodes_on_date(
        &self,
        series: &Series,
        date: NaiveDate,
    ) -> Result<Vec<EpisodeEntry>, LookupError> {
        let entries = self.episode_list(series).await?;
        Ok(entries
            .iter()
            .filter(|e| e.air_date == Some(date))
            .cloned()
            .collect())
    }
}

/// Converts the API episode list, numbering regular episodes across the
/// whole series in season order.
fn episode_entries(mut raw: Vec<TvMazeEpisode>) -> Vec<EpisodeEntry> {
    raw.sort_by_key(|e| (e.season, e.number.unwrap_or(u32::MAX)));

    let mut absolute = 0;
    raw.into_iter()
        .map(|episode| {
            let absolute_number = episode.number.map(|_| {
                absolute += 1;
                absolute
            });
            EpisodeEntry {
                season: episode.season,
                number: episode.number.unwrap_or(0),
                absolute_number,
                air_date: episode
                    .airdate
                    .as_deref()
                    .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
                name: episode.name,
            }
        })
        .collect()
}

fn find_episode(
    entries: &[EpisodeEntry],
    series: &str,
    season: u32,
    number: u32,
) -> Result<EpisodeEntry, LookupError> {
    let mut in_season = entries
        .iter()
        .filter(|e| e.season == season && e.absolute_number.is_some())
        .peekable();

    if in_season.peek().is_none() {
        return Err(LookupError::SeasonNotFound {
            series: series.to_string(),
            season,
        });
    }

    in_season
        .find(|e| e.number == number)
        .cloned()
        .ok_or_else(|| {
            LookupError::EpisodeNotFound(format!(
                "Episode {number} of {series} season {season} could not be found"
            ))
        })
}
