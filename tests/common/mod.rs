#![allow(dead_code)]

use chrono::NaiveDate;
use renamarr::services::{
    Answer, EpisodeEntry, LookupError, MetadataProvider, Prompt, Series, SeriesQuery,
};
use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory metadata provider.
#[derive(Default)]
pub struct FakeProvider {
    series: Vec<(Series, Vec<EpisodeEntry>)>,
    failure: Option<fn() -> LookupError>,
    pub lookups: AtomicUsize,
}

impl FakeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series whose episodes are numbered absolutely in the given order.
    #[must_use]
    pub fn with_series(mut self, id: u64, name: &str, episodes: &[(u32, u32, &str)]) -> Self {
        let entries = episodes
            .iter()
            .enumerate()
            .map(|(index, (season, number, title))| EpisodeEntry {
                season: *season,
                number: *number,
                absolute_number: u32::try_from(index + 1).ok(),
                air_date: None,
                name: Some((*title).to_string()),
            })
            .collect();
        self.series.push((
            Series {
                id,
                name: name.to_string(),
            },
            entries,
        ));
        self
    }

    #[must_use]
    pub fn with_air_date(mut self, series_id: u64, index: usize, date: NaiveDate) -> Self {
        if let Some((_, entries)) = self.series.iter_mut().find(|(s, _)| s.id == series_id) {
            entries[index].air_date = Some(date);
        }
        self
    }

    /// Every lookup fails with the given error.
    #[must_use]
    pub fn failing(mut self, failure: fn() -> LookupError) -> Self {
        self.failure = Some(failure);
        self
    }

    fn entries(&self, series: &Series) -> &[EpisodeEntry] {
        self.series
            .iter()
            .find(|(s, _)| s.id == series.id)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl MetadataProvider for FakeProvider {
    async fn resolve_series(
        &self,
        query: SeriesQuery<'_>,
        _language: &str,
    ) -> Result<Series, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure {
            return Err(failure());
        }

        self.series
            .iter()
            .map(|(series, _)| series)
            .find(|series| match query {
                SeriesQuery::Id(id) => series.id == id,
                SeriesQuery::Name(name) => series.name.eq_ignore_ascii_case(name),
            })
            .cloned()
            .ok_or_else(|| LookupError::SeriesNotFound(query.to_string()))
    }

    async fn episode(
        &self,
        series: &Series,
        season: u32,
        number: u32,
    ) -> Result<EpisodeEntry, LookupError> {
        let entries = self.entries(series);
        if !entries.iter().any(|e| e.season == season) {
            return Err(LookupError::SeasonNotFound {
                series: series.name.clone(),
                season,
            });
        }
        entries
            .iter()
            .find(|e| e.season == season && e.number == number)
            .cloned()
            .ok_or_else(|| LookupError::EpisodeNotFound(format!("{season}x{number}")))
    }

    async fn episodes_by_absolute_number(
        &self,
        series: &Series,
        number: u32,
    ) -> Result<Vec<EpisodeEntry>, LookupError> {
        Ok(self
            .entries(series)
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
        Ok(self
            .entries(series)
            .iter()
            .filter(|e| e.air_date == Some(date))
            .cloned()
            .collect())
    }
}

#[must_use]
pub fn scrubs() -> FakeProvider {
    FakeProvider::new().with_series(
        76156,
        "Scrubs",
        &[
            (1, 1, "My First Day"),
            (1, 2, "My Mentor"),
            (1, 3, "My Best Friend's Mistake"),
            (1, 4, "My Old Lady"),
        ],
    )
}

/// Answers prompts from a fixed script; runs out as "quit".
pub struct ScriptedPrompt {
    answers: VecDeque<Answer>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    #[must_use]
    pub fn new(answers: &[Answer]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, question: &str) -> io::Result<Answer> {
        self.asked.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(Answer::Quit))
    }
}

pub fn touch(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[must_use]
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
