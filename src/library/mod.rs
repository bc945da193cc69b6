pub mod finder;
pub mod relocate;
pub mod replace;
pub mod sanitize;

use crate::config::MoveConfig;
use crate::models::episode::{Episode, EpisodeKind};
use crate::naming::{FieldMap, NameGenerator, TemplateError, Value, template};
use chrono::Datelike;
use std::path::PathBuf;

pub use finder::FileFinder;
pub use relocate::{Destination, RelocateError, RelocateOptions, Relocation, Relocator};
pub use replace::Replacements;
pub use sanitize::ExtensionPattern;

/// Decides where renamed files go and how they get there.
#[derive(Debug, Clone)]
pub struct LibraryService {
    config: MoveConfig,
    fullpath_replacements: Replacements,
}

impl LibraryService {
    pub fn new(config: MoveConfig) -> Result<Self, regex::Error> {
        let fullpath_replacements = Replacements::compile(&config.fullpath_replacements)?;
        Ok(Self {
            config,
            fullpath_replacements,
        })
    }

    #[must_use]
    pub const fn moves_files(&self) -> bool {
        self.config.enable
    }

    #[must_use]
    pub const fn keeps_filenames(&self) -> bool {
        self.config.enable && self.config.only
    }

    #[must_use]
    pub const fn fullpath_replacements(&self) -> &Replacements {
        &self.fullpath_replacements
    }

    #[must_use]
    pub const fn relocate_options(&self) -> RelocateOptions {
        RelocateOptions {
            force: self.config.overwrite_destination,
            always_copy: self.config.always_copy,
            always_move: self.config.always_move,
            leave_symlink: self.config.leave_symlink,
            create_dirs: self.config.create_dirs,
        }
    }

    /// Fields available to the destination templates.
    pub fn destination_fields(
        &self,
        episode: &Episode,
        generator: &NameGenerator,
    ) -> Result<FieldMap, TemplateError> {
        let series = generator.sanitize(episode.series_name.as_deref().unwrap_or_default());

        let mut fields = FieldMap::from([
            ("seriesname".to_string(), Value::from(series)),
            (
                "originalfilename".to_string(),
                Value::from(episode.original_filename.as_str()),
            ),
        ]);

        match &episode.kind {
            EpisodeKind::Standard { season, episodes } => {
                fields.insert("seasonnumber".to_string(), Value::from(*season));
                let numbers = generator.sanitize(&generator.format_numbers(episodes)?);
                fields.insert("episodenumbers".to_string(), Value::from(numbers));
            }
            EpisodeKind::Dated { air_date } => {
                fields.insert("year".to_string(), Value::from(i64::from(air_date.year())));
                fields.insert("month".to_string(), Value::from(air_date.month()));
                fields.insert("day".to_string(), Value::from(air_date.day()));
                fields.insert(
                    "episodenumbers".to_string(),
                    Value::from(air_date.to_string()),
                );
            }
            EpisodeKind::NoSeason { episodes } | EpisodeKind::Anime { episodes, .. } => {
                let numbers = generator.sanitize(&generator.format_numbers(episodes)?);
                fields.insert("episodenumbers".to_string(), Value::from(numbers));
            }
        }

        Ok(fields)
    }

    /// Target for `episode` once renamed to `new_name`.
    pub fn destination(
        &self,
        episode: &Episode,
        new_name: &str,
        generator: &NameGenerator,
    ) -> Result<Destination, TemplateError> {
        if !self.config.enable {
            return Ok(Destination::Path(PathBuf::from(new_name)));
        }

        let template = match episode.kind {
            EpisodeKind::Dated { .. } => &self.config.destination_date,
            _ => &self.config.destination,
        };

        let fields = self.destination_fields(episode, generator)?;
        let mut rendered = template::render(template, &fields)?;
        if self.config.lowercase_destination {
            rendered = rendered.to_lowercase();
        }

        if self.config.destination_is_filepath {
            Ok(Destination::Path(PathBuf::from(rendered)))
        } else {
            Ok(Destination::Path(PathBuf::from(rendered).join(new_name)))
        }
    }
}
