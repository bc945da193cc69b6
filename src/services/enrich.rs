//! Fills parsed episodes with the canonical series name and episode titles.

use crate::config::Config;
use crate::models::episode::{Episode, EpisodeKind};
use crate::services::metadata::{EpisodeEntry, LookupError, MetadataProvider, Series, SeriesQuery};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub struct Enricher {
    provider: Arc<dyn MetadataProvider>,
    language: String,
    series_name: Option<String>,
    series_id: Option<u64>,
    output_series_replacements: BTreeMap<String, String>,
}

impl Enricher {
    #[must_use]
    pub fn new(provider: Arc<dyn MetadataProvider>, config: &Config) -> Self {
        Self {
            provider,
            language: config.metadata.language.clone(),
            series_name: config.metadata.series_name.clone(),
            series_id: config.metadata.series_id,
            output_series_replacements: config.naming.output_series_replacements.clone(),
        }
    }

    /// Whether every file gets its series from configuration instead of the
    /// filename.
    #[must_use]
    pub const fn has_series_override(&self) -> bool {
        self.series_name.is_some() || self.series_id.is_some()
    }

    #[must_use]
    pub fn output_series_name(&self, canonical: &str) -> String {
        self.output_series_replacements
            .get(canonical)
            .cloned()
            .unwrap_or_else(|| canonical.to_string())
    }

    fn series_query<'a>(&'a self, episode: &'a Episode) -> Option<SeriesQuery<'a>> {
        if let Some(id) = self.series_id {
            return Some(SeriesQuery::Id(id));
        }
        if let Some(name) = &self.series_name {
            return Some(SeriesQuery::Name(name.as_str()));
        }
        if let Some(id) = episode.series_id {
            return Some(SeriesQuery::Id(id));
        }
        episode.series_name.as_deref().map(SeriesQuery::Name)
    }

    /// Replaces the series name with the provider's canonical one and
    /// populates the episode titles.
    ///
    /// # Errors
    ///
    /// Any [`LookupError`]; the episode keeps whatever was updated before the
    /// failing step (the corrected series name survives an episode miss).
    pub async fn enrich(&self, episode: &mut Episode) -> Result<(), LookupError> {
        let query = self
            .series_query(episode)
            .ok_or_else(|| LookupError::SeriesNotFound(episode.original_filename.clone()))?;

        debug!(series = %query, language = %self.language, "Resolving series");
        let series = self.provider.resolve_series(query, &self.language).await?;

        episode.series_name = Some(self.output_series_name(&series.name));
        episode.series_id = Some(series.id);

        let names = match &episode.kind {
            EpisodeKind::Dated { air_date } => vec![self.name_on_date(&series, *air_date).await?],
            EpisodeKind::Standard { season, episodes } => {
                let mut names = Vec::with_capacity(episodes.len());
                for &number in episodes {
                    names.push(self.name_in_season(&series, *season, number).await?);
                }
                names
            }
            EpisodeKind::NoSeason { episodes } | EpisodeKind::Anime { episodes, .. } => {
                let mut names = Vec::with_capacity(episodes.len());
                for &number in episodes {
                    names.push(self.name_by_absolute_number(&series, number).await?);
                }
                names
            }
        };

        episode.episode_names = Some(names);
        Ok(())
    }

    async fn name_on_date(&self, series: &Series, date: NaiveDate) -> Result<String, LookupError> {
        let mut found = self.provider.episodes_on_date(series, date).await?;
        match found.len() {
            0 => Err(LookupError::EpisodeNotFound(format!(
                "Episode of {} that aired on {date} could not be found",
                series.name
            ))),
            1 => episode_name(found.remove(0), &series.name),
            n => Err(LookupError::EpisodeNotFound(format!(
                "Ambiguous air date {date}, there were {n} episodes of {} on that day",
                series.name
            ))),
        }
    }

    async fn name_in_season(
        &self,
        series: &Series,
        season: u32,
        number: u32,
    ) -> Result<String, LookupError> {
        match self.provider.episode(series, season, number).await {
            Ok(entry) => episode_name(entry, &series.name),
            Err(LookupError::EpisodeNotFound(_)) => {
                debug!(
                    series = %series.name,
                    season,
                    episode = number,
                    "Episode not in season, trying absolute number"
                );
                self.name_by_absolute_number(series, number).await
            }
            Err(e) => Err(e),
        }
    }

    async fn name_by_absolute_number(
        &self,
        series: &Series,
        number: u32,
    ) -> Result<String, LookupError> {
        let mut found = self
            .provider
            .episodes_by_absolute_number(series, number)
            .await?;

        match found.len() {
            0 => Err(LookupError::EpisodeNameNotFound(format!(
                "Episode {number} of {} could not be found (also tried the absolute episode number)",
                series.name
            ))),
            1 => episode_name(found.remove(0), &series.name),
            n => {
                let mut exact: Vec<_> = found
                    .into_iter()
                    .filter(|e| e.absolute_number == Some(number))
                    .collect();
                if exact.len() == 1 {
                    episode_name(exact.remove(0), &series.name)
                } else {
                    Err(LookupError::EpisodeNotFound(format!(
                        "No episode of {} matches absolute number {number} exactly, found {n} results instead",
                        series.name
                    )))
                }
            }
        }
    }
}

fn episode_name(entry: EpisodeEntry, series: &str) -> Result<String, LookupError> {
    entry.name.filter(|n| !n.is_empty()).ok_or_else(|| {
        LookupError::EpisodeNameNotFound(format!(
            "Could not find the name of {series} season {} episode {}",
            entry.season, entry.number
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    struct StubProvider {
        series: Series,
        episodes: Vec<EpisodeEntry>,
    }

    #[async_trait::async_trait]
    impl MetadataProvider for StubProvider {
        async fn resolve_series(
            &self,
            query: SeriesQuery<'_>,
            _language: &str,
        ) -> Result<Series, LookupError> {
            match query {
                SeriesQuery::Id(id) if id == self.series.id => Ok(self.series.clone()),
                SeriesQuery::Name(name) if name.eq_ignore_ascii_case(&self.series.name) => {
                    Ok(self.series.clone())
                }
                other => Err(LookupError::SeriesNotFound(other.to_string())),
            }
        }

        async fn episode(
            &self,
            _series: &Series,
            season: u32,
            number: u32,
        ) -> Result<EpisodeEntry, LookupError> {
            if !self.episodes.iter().any(|e| e.season == season) {
                return Err(LookupError::SeasonNotFound {
                    series: self.series.name.clone(),
                    season,
                });
            }
            self.episodes
                .iter()
                .find(|e| e.season == season && e.number == number)
                .cloned()
                .ok_or_else(|| LookupError::EpisodeNotFound(format!("{season}x{number}")))
        }

        async fn episodes_by_absolute_number(
            &self,
            _series: &Series,
            number: u32,
        ) -> Result<Vec<EpisodeEntry>, LookupError> {
            Ok(self
                .episodes
                .iter()
                .filter(|e| e.absolute_number.is_some_and(|a| a.to_string().contains(&number.to_string())))
                .cloned()
                .collect())
        }

        async fn episodes_on_date(
            &self,
            _series: &Series,
            date: NaiveDate,
        ) -> Result<Vec<EpisodeEntry>, LookupError> {
            Ok(self
                .episodes
                .iter()
                .filter(|e| e.air_date == Some(date))
                .cloned()
                .collect())
        }
    }

    fn entry(season: u32, number: u32, absolute: u32, name: &str) -> EpisodeEntry {
        EpisodeEntry {
            season,
            number,
            absolute_number: Some(absolute),
            air_date: NaiveDate::from_ymd_opt(2001, 10, 1 + absolute),
            name: Some(name.to_string()),
        }
    }

    fn stub_enricher(configure: impl FnOnce(&mut Config)) -> Enricher {
        let provider = StubProvider {
            series: Series {
                id: 76156,
                name: "Scrubs".to_string(),
            },
            episodes: vec![
                entry(1, 1, 1, "My First Day"),
                entry(1, 2, 2, "My Mentor"),
                entry(1, 3, 3, "My Best Friend's Mistake"),
                entry(2, 1, 12, "My Overkill"),
                entry(2, 2, 21, ""),
            ],
        };
        let mut config = Config::default();
        configure(&mut config);
        Enricher::new(Arc::new(provider), &config)
    }

    fn episode(series: Option<&str>, kind: EpisodeKind) -> Episode {
        Episode {
            series_name: series.map(str::to_string),
            series_id: None,
            kind,
            episode_names: None,
            path: PathBuf::from("scrubs.avi"),
            original_filename: "scrubs.avi".to_string(),
            extension: ".avi".to_string(),
            extra: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_standard_lookup_and_canonical_name() {
        let enricher = stub_enricher(|_| {});
        let mut ep = episode(
            Some("scrubs"),
            EpisodeKind::Standard {
                season: 1,
                episodes: vec![1, 2],
            },
        );
        enricher.enrich(&mut ep).await.unwrap();
        assert_eq!(ep.series_name.as_deref(), Some("Scrubs"));
        assert_eq!(ep.series_id, Some(76156));
        assert_eq!(
            ep.episode_names,
            Some(vec!["My First Day".to_string(), "My Mentor".to_string()])
        );
    }

    #[tokio::test]
    async fn test_output_series_replacement() {
        let enricher = stub_enricher(|c| {
            c.naming
                .output_series_replacements
                .insert("Scrubs".to_string(), "Scrubs (2001)".to_string());
        });
        let mut ep = episode(
            Some("scrubs"),
            EpisodeKind::Standard {
                season: 1,
                episodes: vec![3],
            },
        );
        enricher.enrich(&mut ep).await.unwrap();
        assert_eq!(ep.series_name.as_deref(), Some("Scrubs (2001)"));
    }

    #[tokio::test]
    async fn test_season_not_found() {
        let enricher = stub_enricher(|_| {});
        let mut ep = episode(
            Some("scrubs"),
            EpisodeKind::Standard {
                season: 9,
                episodes: vec![1],
            },
        );
        let err = enricher.enrich(&mut ep).await.unwrap_err();
        assert!(matches!(err, LookupError::SeasonNotFound { season: 9, .. }));
        assert_eq!(ep.series_name.as_deref(), Some("Scrubs"));
    }

    #[tokio::test]
    async fn test_falls_back_to_absolute_number() {
        let enricher = stub_enricher(|_| {});
        let mut ep = episode(
            Some("scrubs"),
            EpisodeKind::Standard {
                season: 1,
                episodes: vec![12],
            },
        );
        enricher.enrich(&mut ep).await.unwrap();
        assert_eq!(ep.episode_names, Some(vec!["My Overkill".to_string()]));
    }

    #[tokio::test]
    async fn test_absolute_lookup_needs_exact_match_when_ambiguous() {
        let enricher = stub_enricher(|_| {});
        // "1" is contained in 1, 12 and 21; only one is exact.
        let mut ep = episode(Some("scrubs"), EpisodeKind::NoSeason { episodes: vec![1] });
        enricher.enrich(&mut ep).await.unwrap();
        assert_eq!(ep.episode_names, Some(vec!["My First Day".to_string()]));

        // "2" is contained in 2, 12 and 21; exact match is 2.
        let mut ep = episode(Some("scrubs"), EpisodeKind::NoSeason { episodes: vec![2] });
        enricher.enrich(&mut ep).await.unwrap();
        assert_eq!(ep.episode_names, Some(vec!["My Mentor".to_string()]));
    }

    #[tokio::test]
    async fn test_absolute_lookup_ambiguous_without_exact_match() {
        let provider = StubProvider {
            series: Series {
                id: 1,
                name: "Show".to_string(),
            },
            episodes: vec![entry(1, 1, 14, "A"), entry(1, 2, 41, "B")],
        };
        let enricher = Enricher::new(Arc::new(provider), &Config::default());
        let mut ep = episode(Some("show"), EpisodeKind::NoSeason { episodes: vec![4] });
        let err = enricher.enrich(&mut ep).await.unwrap_err();
        assert!(matches!(err, LookupError::EpisodeNotFound(_)));
    }

    #[tokio::test]
    async fn test_absolute_lookup_without_candidates() {
        let enricher = stub_enricher(|_| {});
        let mut ep = episode(
            Some("scrubs"),
            EpisodeKind::Anime {
                episodes: vec![99],
                group: None,
                crc: None,
            },
        );
        let err = enricher.enrich(&mut ep).await.unwrap_err();
        assert!(matches!(err, LookupError::EpisodeNameNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_episode_title() {
        let enricher = stub_enricher(|_| {});
        let mut ep = episode(
            Some("scrubs"),
            EpisodeKind::Standard {
                season: 2,
                episodes: vec![2],
            },
        );
        let err = enricher.enrich(&mut ep).await.unwrap_err();
        assert!(matches!(err, LookupError::EpisodeNameNotFound(_)));
    }

    #[tokio::test]
    async fn test_dated_lookup() {
        let enricher = stub_enricher(|_| {});
        let mut ep = episode(
            Some("scrubs"),
            EpisodeKind::Dated {
                air_date: NaiveDate::from_ymd_opt(2001, 10, 3).unwrap(),
            },
        );
        enricher.enrich(&mut ep).await.unwrap();
        assert_eq!(ep.episode_names, Some(vec!["My Mentor".to_string()]));

        let mut ep = episode(
            Some("scrubs"),
            EpisodeKind::Dated {
                air_date: NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(),
            },
        );
        let err = enricher.enrich(&mut ep).await.unwrap_err();
        assert!(matches!(err, LookupError::EpisodeNotFound(_)));
    }

    #[tokio::test]
    async fn test_series_overrides() {
        let enricher = stub_enricher(|c| c.metadata.series_id = Some(76156));
        assert!(enricher.has_series_override());
        let mut ep = episode(None, EpisodeKind::NoSeason { episodes: vec![3] });
        enricher.enrich(&mut ep).await.unwrap();
        assert_eq!(ep.series_name.as_deref(), Some("Scrubs"));

        let enricher = stub_enricher(|c| c.metadata.series_name = Some("Unknown".to_string()));
        let mut ep = episode(Some("scrubs"), EpisodeKind::NoSeason { episodes: vec![3] });
        let err = enricher.enrich(&mut ep).await.unwrap_err();
        assert!(matches!(err, LookupError::SeriesNotFound(name) if name == "Unknown"));
    }

    #[tokio::test]
    async fn test_no_series_name() {
        let enricher = stub_enricher(|_| {});
        assert!(!enricher.has_series_override());
        let mut ep = episode(None, EpisodeKind::NoSeason { episodes: vec![1] });
        let err = enricher.enrich(&mut ep).await.unwrap_err();
        assert!(matches!(err, LookupError::SeriesNotFound(_)));
    }
}
