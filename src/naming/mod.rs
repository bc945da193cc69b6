//! Builds new filenames for parsed episodes from the configured templates.

pub mod template;
pub mod titlecase;

use crate::config::{Config, FilenameTemplates, NamingConfig};
use crate::library::replace::Replacements;
use crate::library::sanitize::{self, ExtensionPattern, SanitizeOptions};
use crate::models::episode::{Episode, EpisodeKind};
use regex::Regex;
use std::sync::OnceLock;

pub use template::{FieldMap, TemplateError, Value};

/// Formats each number with `single` (e.g. `%02d`) and joins them with `separator`.
pub fn format_episode_numbers(
    numbers: &[u32],
    single: &str,
    separator: &str,
) -> Result<String, TemplateError> {
    let formatted = numbers
        .iter()
        .map(|n| template::render_single(single, &Value::from(*n)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(formatted.join(separator))
}

/// Collapses multi-part titles such as `Pilot (1)`, `Pilot (2)` into a single
/// `multiep_format` rendering; anything else is joined with `join_with`.
pub fn format_episode_name(
    names: &[String],
    join_with: &str,
    multiep_format: &str,
) -> Result<String, TemplateError> {
    static PART_RE: OnceLock<Regex> = OnceLock::new();

    if names.len() == 1 {
        return Ok(names[0].clone());
    }

    let part_re = PART_RE.get_or_init(|| {
        Regex::new(r"^(?P<base>.*) \((?P<number>[0-9]+)\)$")
            .expect("Invalid regex pattern defined in code")
    });

    let mut base: Option<&str> = None;
    let mut parts = Vec::with_capacity(names.len());

    for (index, name) in names.iter().enumerate() {
        let part = part_re.captures(name).and_then(|caps| {
            let number = caps.name("number")?.as_str().parse::<i64>().ok()?;
            Some((caps.name("base")?.as_str(), number))
        });

        let (name_base, number) = match part {
            Some(part) => part,
            None if index == 0 => (name.as_str(), 1),
            None => return Ok(names.join(join_with)),
        };

        if base.is_some_and(|existing| existing != name_base) {
            return Ok(names.join(join_with));
        }
        base = Some(name_base);
        parts.push(number);
    }

    let (Some(base), Some(min), Some(max)) = (
        base,
        parts.iter().min().copied(),
        parts.iter().max().copied(),
    ) else {
        return Ok(String::new());
    };

    let fields = FieldMap::from([
        ("epname".to_string(), Value::from(base)),
        ("episodemin".to_string(), Value::from(min)),
        ("episodemax".to_string(), Value::from(max)),
    ]);
    template::render(multiep_format, &fields)
}

/// Renders, normalises and sanitises filenames for episodes.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    templates: FilenameTemplates,
    naming: NamingConfig,
    extension: ExtensionPattern,
    output_replacements: Replacements,
    sanitize_options: SanitizeOptions,
}

impl NameGenerator {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            templates: config.templates.clone(),
            naming: config.naming.clone(),
            extension: ExtensionPattern::new(&config.parsing.extension_pattern)?,
            output_replacements: Replacements::compile(&config.naming.output_filename_replacements)?,
            sanitize_options: config.naming.sanitize_options(),
        })
    }

    /// The template used for `episode`, chosen by kind, whether episode names
    /// are known and, for anime, whether a CRC was captured.
    #[must_use]
    pub fn template_for(&self, episode: &Episode) -> &str {
        let t = &self.templates;
        let named = episode.episode_names.is_some();

        match &episode.kind {
            EpisodeKind::Standard { .. } if named => &t.filename_with_episode,
            EpisodeKind::Standard { .. } => &t.filename_without_episode,
            EpisodeKind::Dated { .. } if named => &t.filename_with_date_and_episode,
            EpisodeKind::Dated { .. } => &t.filename_with_date_without_episode,
            EpisodeKind::NoSeason { .. } if named => &t.filename_with_episode_no_season,
            EpisodeKind::NoSeason { .. } => &t.filename_without_episode_no_season,
            EpisodeKind::Anime { crc, .. } => match (named, crc.is_some()) {
                (true, true) => &t.filename_anime_with_episode,
                (false, true) => &t.filename_anime_without_episode,
                (true, false) => &t.filename_anime_with_episode_without_crc,
                (false, false) => &t.filename_anime_without_episode_without_crc,
            },
        }
    }

    pub fn format_numbers(&self, numbers: &[u32]) -> Result<String, TemplateError> {
        format_episode_numbers(
            numbers,
            &self.naming.episode_single,
            &self.naming.episode_separator,
        )
    }

    /// Template fields: every captured group, overlaid with the canonical
    /// `seriesname`, `seasonno`/`seasonnumber`, `episode`, `episodename` and `ext`.
    pub fn field_map(&self, episode: &Episode) -> Result<FieldMap, TemplateError> {
        let mut fields: FieldMap = episode
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value.clone())))
            .collect();

        let episode_name = match episode.episode_names.as_deref() {
            Some(names) if !names.is_empty() => Value::from(format_episode_name(
                names,
                &self.naming.multiep_join_name_with,
                &self.naming.multiep_format,
            )?),
            _ => Value::Null,
        };

        let formatted = match &episode.kind {
            EpisodeKind::Standard { season, episodes } => {
                fields.insert("seasonno".to_string(), Value::from(*season));
                fields.insert("seasonnumber".to_string(), Value::from(*season));
                self.format_numbers(episodes)?
            }
            EpisodeKind::Dated { air_date } => air_date.to_string(),
            EpisodeKind::NoSeason { episodes } | EpisodeKind::Anime { episodes, .. } => {
                self.format_numbers(episodes)?
            }
        };

        fields.insert(
            "seriesname".to_string(),
            Value::from(episode.series_name.clone()),
        );
        fields.insert("episode".to_string(), Value::from(formatted));
        fields.insert("episodename".to_string(), episode_name);
        fields.insert("ext".to_string(), Value::from(episode.extension.as_str()));

        Ok(fields)
    }

    /// The rendered name before output replacements and sanitisation.
    pub fn preview(&self, episode: &Episode) -> Result<String, TemplateError> {
        let fields = self.field_map(episode)?;
        let mut name = template::render(self.template_for(episode), &fields)?;

        if self.naming.titlecase_filename && !episode.is_anime() {
            name = titlecase::titlecase(&name);
        }
        if self.naming.lowercase_filename {
            name = name.to_lowercase();
        }

        Ok(name)
    }

    /// The final filename for `episode`.
    pub fn generate(&self, episode: &Episode) -> Result<String, TemplateError> {
        let name = self.preview(episode)?;
        let name = self.output_replacements.apply(&name, &self.extension);
        Ok(self.sanitize(&name))
    }

    #[must_use]
    pub fn sanitize(&self, name: &str) -> String {
        sanitize::make_valid_filename(name, &self.extension, &self.sanitize_options)
    }
}
