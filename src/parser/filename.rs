//! Recognises series, season, episode numbers and air dates in filenames.

use crate::config::{ParsingConfig, SeriesReplacement, SeriesTarget};
use crate::constants::parsing::{EPISODE_RANGE_LIMIT, TWO_DIGIT_YEAR_PIVOT};
use crate::library::replace::Replacements;
use crate::library::sanitize::ExtensionPattern;
use crate::models::episode::{Episode, EpisodeKind};
use crate::parser::patterns;
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "Cannot parse {filename:?}{}",
        .replaced.as_ref().map(|r| format!(" (after input replacements: {r:?})")).unwrap_or_default()
    )]
    InvalidFilename {
        filename: String,
        replaced: Option<String>,
    },
}

#[derive(Debug)]
enum SeriesMatcher {
    Pattern(Regex),
    Literal(String),
}

#[derive(Debug)]
struct SeriesRule {
    matcher: SeriesMatcher,
    target: SeriesTarget,
}

impl SeriesRule {
    fn compile(rule: &SeriesReplacement) -> Result<Self, regex::Error> {
        let matcher = if rule.is_regex {
            SeriesMatcher::Pattern(Regex::new(&format!("(?i)^(?:{})", rule.pattern))?)
        } else {
            SeriesMatcher::Literal(rule.pattern.to_lowercase())
        };
        Ok(Self {
            matcher,
            target: rule.replacement.clone(),
        })
    }

    fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            SeriesMatcher::Pattern(re) => re.is_match(name),
            SeriesMatcher::Literal(literal) => name.to_lowercase() == *literal,
        }
    }
}

enum Numbering {
    Episodes(Vec<u32>),
    Date(NaiveDate),
}

/// Matches filenames against an ordered list of patterns.
#[derive(Debug)]
pub struct FilenameParser {
    patterns: Vec<Regex>,
    extension: ExtensionPattern,
    input_replacements: Replacements,
    series_rules: Vec<SeriesRule>,
}

impl FilenameParser {
    pub fn from_config(config: &ParsingConfig) -> Result<Self, ParseError> {
        let patterns = config
            .filename_patterns
            .iter()
            .map(|pattern| {
                patterns::compile(pattern).map_err(|e| {
                    ParseError::Configuration(format!("Invalid filename pattern {pattern:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let extension = ExtensionPattern::new(&config.extension_pattern).map_err(|e| {
            ParseError::Configuration(format!("Invalid extension pattern: {e}"))
        })?;

        let input_replacements = Replacements::compile(&config.input_filename_replacements)
            .map_err(|e| ParseError::Configuration(format!("Invalid input replacement: {e}")))?;

        let series_rules = config
            .input_series_replacements
            .iter()
            .map(|rule| {
                SeriesRule::compile(rule).map_err(|e| {
                    ParseError::Configuration(format!("Invalid series replacement: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            extension,
            input_replacements,
            series_rules,
        })
    }

    #[must_use]
    pub const fn extension(&self) -> &ExtensionPattern {
        &self.extension
    }

    /// The basename after input replacements, if any changed it.
    #[must_use]
    pub fn replaced_basename(&self, basename: &str) -> Option<String> {
        if self.input_replacements.is_empty() {
            return None;
        }
        let replaced = self.input_replacements.apply(basename, &self.extension);
        (replaced != basename).then_some(replaced)
    }

    pub fn parse(&self, path: &Path) -> Result<Episode, ParseError> {
        let basename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let replaced = self.input_replacements.apply(&basename, &self.extension);

        for (index, pattern) in self.patterns.iter().enumerate() {
            let Some(caps) = pattern.captures(&replaced) else {
                continue;
            };

            let Some(numbering) = extract_numbering(pattern, &caps)? else {
                debug!(pattern = index, file = %basename, "Pattern matched but numbers were unusable");
                continue;
            };

            let season = match caps.name("seasonnumber") {
                Some(m) => {
                    let Ok(season) = m.as_str().parse::<u32>() else {
                        debug!(pattern = index, file = %basename, "Season number out of range");
                        continue;
                    };
                    Some(season)
                }
                None => None,
            };

            if !has_group(pattern, "seriesname") {
                return Err(ParseError::Configuration(format!(
                    "Filename pattern #{} has no 'seriesname' group",
                    index + 1
                )));
            }

            debug!(pattern = index, file = %basename, "Filename matched");
            return Ok(self.build_episode(path, &basename, pattern, &caps, numbering, season));
        }

        Err(ParseError::InvalidFilename {
            filename: basename.clone(),
            replaced: (!self.input_replacements.is_empty()).then(|| replaced.clone()),
        })
    }

    fn build_episode(
        &self,
        path: &Path,
        basename: &str,
        pattern: &Regex,
        caps: &Captures<'_>,
        numbering: Numbering,
        season: Option<u32>,
    ) -> Episode {
        let mut series_name = caps
            .name("seriesname")
            .map(|m| clean_series_name(m.as_str()))
            .filter(|name| !name.is_empty());
        let mut series_id = None;

        if let Some(name) = series_name.as_deref()
            && let Some(rule) = self.series_rules.iter().find(|rule| rule.matches(name))
        {
            match &rule.target {
                SeriesTarget::Name(replacement) => series_name = Some(replacement.clone()),
                SeriesTarget::Id(id) => series_id = Some(*id),
            }
        }

        let group = caps.name("group").map(|m| m.as_str().to_string());
        let crc = caps.name("crc").map(|m| m.as_str().to_string());

        let kind = match (numbering, season) {
            (Numbering::Date(air_date), _) => EpisodeKind::Dated { air_date },
            (Numbering::Episodes(episodes), Some(season)) => {
                EpisodeKind::Standard { season, episodes }
            }
            (Numbering::Episodes(episodes), None) if has_group(pattern, "group") => {
                EpisodeKind::Anime {
                    episodes,
                    group,
                    crc,
                }
            }
            (Numbering::Episodes(episodes), None) => EpisodeKind::NoSeason { episodes },
        };

        let extra = pattern
            .capture_names()
            .flatten()
            .map(|name| {
                (
                    name.to_string(),
                    caps.name(name).map(|m| m.as_str().to_string()),
                )
            })
            .collect::<BTreeMap<_, _>>();

        let (_, extension) = self.extension.split(basename);

        Episode {
            series_name,
            series_id,
            kind,
            episode_names: None,
            path: path.to_path_buf(),
            original_filename: basename.to_string(),
            extension: extension.to_string(),
            extra,
        }
    }
}

fn has_group(pattern: &Regex, name: &str) -> bool {
    pattern.capture_names().flatten().any(|n| n == name)
}

fn capture_number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

/// Episode numbers or air date from a successful match. `Ok(None)` means the
/// match is unusable (overflowing number, impossible date) and the next
/// pattern should be tried.
fn extract_numbering(pattern: &Regex, caps: &Captures<'_>) -> Result<Option<Numbering>, ParseError> {
    let numbered: Vec<&str> = pattern
        .capture_names()
        .flatten()
        .filter(|name| {
            name.strip_prefix("episodenumber")
                .is_some_and(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
        })
        .collect();

    if !numbered.is_empty() {
        let mut episodes = Vec::new();
        for name in numbered {
            if let Some(m) = caps.name(name) {
                let Ok(number) = m.as_str().parse::<u32>() else {
                    return Ok(None);
                };
                episodes.push(number);
            }
        }
        if episodes.is_empty() {
            return Ok(None);
        }
        episodes.sort_unstable();
        return Ok(Some(Numbering::Episodes(episodes)));
    }

    if has_group(pattern, "episodenumberstart") {
        let Some(start) = capture_number(caps, "episodenumberstart") else {
            return Ok(None);
        };
        let Some(end) = capture_number(caps, "episodenumberend") else {
            return Ok(Some(Numbering::Episodes(vec![start])));
        };
        return Ok(Some(Numbering::Episodes(episode_range(start, end))));
    }

    if has_group(pattern, "episodenumber") {
        return Ok(capture_number(caps, "episodenumber").map(|n| Numbering::Episodes(vec![n])));
    }

    let date_groups = ["year", "month", "day"].map(|name| has_group(pattern, name));
    if date_groups.contains(&true) {
        if date_groups.contains(&false) {
            return Err(ParseError::Configuration(format!(
                "Date-based pattern {:?} must contain groups 'year', 'month' and 'day'",
                pattern.as_str()
            )));
        }
        let date = caps
            .name("year")
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .zip(capture_number(caps, "month"))
            .zip(capture_number(caps, "day"))
            .and_then(|((year, month), day)| {
                NaiveDate::from_ymd_opt(handle_year(year), month, day)
            });
        return Ok(date.map(Numbering::Date));
    }

    Err(ParseError::Configuration(format!(
        "Filename pattern {:?} has no episode number or date groups",
        pattern.as_str()
    )))
}

/// Expands `start..=end`, collapsing implausibly wide ranges to `[start]`.
fn episode_range(start: u32, end: u32) -> Vec<u32> {
    if i64::from(end) - i64::from(start) > EPISODE_RANGE_LIMIT {
        warn!(
            start,
            end,
            "Episode range looks like a misdetection, using only the first episode"
        );
        return vec![start];
    }

    let (low, high) = if start > end { (end, start) } else { (start, end) };
    (low..=high).collect()
}

/// Maps two-digit years onto 1950-2049; four-digit years pass through.
#[must_use]
pub const fn handle_year(year: i32) -> i32 {
    if year > 999 {
        year
    } else if year < TWO_DIGIT_YEAR_PIVOT {
        2000 + year
    } else {
        1900 + year
    }
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

/// Turns dot and underscore separated names into spaced ones, keeping dots
/// between digits (`an.example.1.0.test` becomes `an example 1.0 test`).
#[must_use]
pub fn clean_series_name(name: &str) -> String {
    static DOT_BETWEEN: OnceLock<Regex> = OnceLock::new();
    static DOT_AFTER: OnceLock<Regex> = OnceLock::new();
    static DOT_BEFORE: OnceLock<Regex> = OnceLock::new();

    let name = get_regex(&DOT_BETWEEN, r"(\D)[.](\D)").replace_all(name, "${1} ${2}");
    let name = get_regex(&DOT_AFTER, r"(\D)[.]").replace_all(&name, "${1} ");
    let name = get_regex(&DOT_BEFORE, r"[.](\D)").replace_all(&name, " ${1}");
    let name = name.replace('_', " ");
    let name = name.strip_suffix('-').unwrap_or(&name);

    name.trim().to_string()
}
