use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// How an episode is identified within its series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeKind {
    /// Season plus one or more episode numbers.
    Standard { season: u32, episodes: Vec<u32> },

    /// Identified by air date only.
    Dated { air_date: NaiveDate },

    /// Episode numbers without a season.
    NoSeason { episodes: Vec<u32> },

    /// Release-group style numbering, optionally carrying a CRC tag.
    Anime {
        episodes: Vec<u32>,
        group: Option<String>,
        crc: Option<String>,
    },
}

/// One video file as recognised from its filename.
#[derive(Debug, Clone)]
pub struct Episode {
    pub series_name: Option<String>,

    /// Provider id requested through an input series replacement.
    pub series_id: Option<u64>,

    pub kind: EpisodeKind,

    /// Filled by metadata enrichment, aligned with the episode numbers.
    pub episode_names: Option<Vec<String>>,

    pub path: PathBuf,

    pub original_filename: String,

    /// Extension of the original filename, including the dot.
    pub extension: String,

    /// Every named group of the matching pattern, `None` when it did not take part.
    pub extra: BTreeMap<String, Option<String>>,
}

impl Episode {
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    #[must_use]
    pub const fn season(&self) -> Option<u32> {
        match &self.kind {
            EpisodeKind::Standard { season, .. } => Some(*season),
            _ => None,
        }
    }

    /// Episode numbers, or `None` for dated episodes.
    #[must_use]
    pub fn episode_numbers(&self) -> Option<&[u32]> {
        match &self.kind {
            EpisodeKind::Standard { episodes, .. }
            | EpisodeKind::NoSeason { episodes }
            | EpisodeKind::Anime { episodes, .. } => Some(episodes.as_slice()),
            EpisodeKind::Dated { .. } => None,
        }
    }

    #[must_use]
    pub const fn air_date(&self) -> Option<NaiveDate> {
        match &self.kind {
            EpisodeKind::Dated { air_date } => Some(*air_date),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_anime(&self) -> bool {
        matches!(self.kind, EpisodeKind::Anime { .. })
    }

    /// Ordering used for batch processing: series, season, then numbers or date.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.series_name
            .cmp(&other.series_name)
            .then_with(|| self.season().cmp(&other.season()))
            .then_with(|| self.episode_numbers().cmp(&other.episode_numbers()))
            .then_with(|| self.air_date().cmp(&other.air_date()))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let series = self.series_name.as_deref().unwrap_or("<unknown series>");
        let numbers = |episodes: &[u32]| {
            episodes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        match &self.kind {
            EpisodeKind::Standard { season, episodes } => {
                write!(f, "{series} - season {season}, episode {}", numbers(episodes))
            }
            EpisodeKind::Dated { air_date } => write!(f, "{series} - episode {air_date}"),
            EpisodeKind::NoSeason { episodes } => {
                write!(f, "{series} - episode {}", numbers(episodes))
            }
            EpisodeKind::Anime { episodes, group, .. } => {
                write!(f, "{series} - episode {}", numbers(episodes))?;
                if let Some(group) = group {
                    write!(f, " [{group}]")?;
                }
                Ok(())
            }
        }
    }
}
