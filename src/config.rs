use crate::constants::{self, CONFIG_DIR_NAME, DEFAULT_EXTENSION_PATTERN};
use crate::library::replace::Replacements;
use crate::library::sanitize::{ExtensionPattern, SanitizeOptions};
use crate::parser::patterns;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub parsing: ParsingConfig,

    pub templates: FilenameTemplates,

    pub naming: NamingConfig,

    #[serde(rename = "move")]
    pub relocation: MoveConfig,

    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Rename without prompting.
    pub batch: bool,

    /// Descend into sub-directories of the supplied paths.
    pub recursive: bool,

    /// Print the computed destinations without touching any file.
    pub dry_run: bool,

    /// What batch mode does with a file whose metadata lookup failed.
    pub on_lookup_error: LookupErrorPolicy,

    /// Extensions (without the dot) of files to consider; empty accepts all.
    pub valid_extensions: Vec<String>,

    pub filename_blacklist: Vec<BlacklistRule>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            batch: false,
            recursive: false,
            dry_run: false,
            on_lookup_error: LookupErrorPolicy::Skip,
            valid_extensions: Vec::new(),
            filename_blacklist: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupErrorPolicy {
    /// Leave the file untouched and move on.
    Skip,
    /// Rename using the un-enriched name.
    Proceed,
    /// Stop the whole run.
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistRule {
    #[serde(rename = "match")]
    pub pattern: String,

    #[serde(default)]
    pub is_regex: bool,

    /// Match against the full path instead of the basename.
    #[serde(default)]
    pub full_path: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacementRule {
    #[serde(rename = "match")]
    pub pattern: String,

    #[serde(default)]
    pub replacement: String,

    #[serde(default)]
    pub is_regex: bool,

    #[serde(default)]
    pub with_extension: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesReplacement {
    #[serde(rename = "match")]
    pub pattern: String,

    pub replacement: SeriesTarget,

    #[serde(default = "default_true")]
    pub is_regex: bool,
}

/// A detected series name is replaced either by another name or by a
/// provider id that bypasses the name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesTarget {
    Id(u64),
    Name(String),
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Ordered; the first pattern that matches wins.
    pub filename_patterns: Vec<String>,

    pub extension_pattern: String,

    pub input_filename_replacements: Vec<ReplacementRule>,

    pub input_series_replacements: Vec<SeriesReplacement>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            filename_patterns: patterns::default_patterns(),
            extension_pattern: DEFAULT_EXTENSION_PATTERN.to_string(),
            input_filename_replacements: Vec::new(),
            input_series_replacements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilenameTemplates {
    pub filename_with_episode: String,
    pub filename_without_episode: String,

    pub filename_with_episode_no_season: String,
    pub filename_without_episode_no_season: String,

    pub filename_with_date_and_episode: String,
    pub filename_with_date_without_episode: String,

    pub filename_anime_with_episode: String,
    pub filename_anime_without_episode: String,
    pub filename_anime_with_episode_without_crc: String,
    pub filename_anime_without_episode_without_crc: String,
}

impl Default for FilenameTemplates {
    fn default() -> Self {
        Self {
            filename_with_episode:
                "%(seriesname)s - [%(seasonno)02dx%(episode)s] - %(episodename)s%(ext)s".to_string(),
            filename_without_episode: "%(seriesname)s - [%(seasonno)02dx%(episode)s]%(ext)s"
                .to_string(),
            filename_with_episode_no_season:
                "%(seriesname)s - [%(episode)s] - %(episodename)s%(ext)s".to_string(),
            filename_without_episode_no_season: "%(seriesname)s - [%(episode)s]%(ext)s".to_string(),
            filename_with_date_and_episode:
                "%(seriesname)s - [%(episode)s] - %(episodename)s%(ext)s".to_string(),
            filename_with_date_without_episode: "%(seriesname)s - [%(episode)s]%(ext)s".to_string(),
            filename_anime_with_episode:
                "[%(group)s] %(seriesname)s - %(episode)s - %(episodename)s [%(crc)s]%(ext)s"
                    .to_string(),
            filename_anime_without_episode:
                "[%(group)s] %(seriesname)s - %(episode)s [%(crc)s]%(ext)s".to_string(),
            filename_anime_with_episode_without_crc:
                "[%(group)s] %(seriesname)s - %(episode)s - %(episodename)s%(ext)s".to_string(),
            filename_anime_without_episode_without_crc:
                "[%(group)s] %(seriesname)s - %(episode)s%(ext)s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Format of one episode number, e.g. `%02d`.
    pub episode_single: String,

    pub episode_separator: String,

    pub multiep_join_name_with: String,

    /// Format for a run of same-titled parts; fields `epname`, `episodemin`, `episodemax`.
    pub multiep_format: String,

    pub lowercase_filename: bool,

    pub titlecase_filename: bool,

    pub output_filename_replacements: Vec<ReplacementRule>,

    /// Canonical provider name to preferred output name.
    pub output_series_replacements: BTreeMap<String, String>,

    pub normalize_unicode_filenames: bool,

    pub windows_safe_filenames: bool,

    pub custom_filename_character_blacklist: String,

    pub replace_invalid_characters_with: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            episode_single: "%02d".to_string(),
            episode_separator: "-".to_string(),
            multiep_join_name_with: ", ".to_string(),
            multiep_format: "%(epname)s (%(episodemin)s-%(episodemax)s)".to_string(),
            lowercase_filename: false,
            titlecase_filename: false,
            output_filename_replacements: Vec::new(),
            output_series_replacements: BTreeMap::new(),
            normalize_unicode_filenames: false,
            windows_safe_filenames: false,
            custom_filename_character_blacklist: String::new(),
            replace_invalid_characters_with: "_".to_string(),
        }
    }
}

impl NamingConfig {
    #[must_use]
    pub fn sanitize_options(&self) -> SanitizeOptions {
        SanitizeOptions {
            normalize_unicode: self.normalize_unicode_filenames,
            windows_safe: self.windows_safe_filenames,
            custom_blacklist: self.custom_filename_character_blacklist.clone(),
            replace_with: self.replace_invalid_characters_with.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveConfig {
    pub enable: bool,

    /// Relocate without renaming.
    pub only: bool,

    /// Destination directory template; relative paths resolve against the
    /// source file's directory.
    pub destination: String,

    /// Destination template for dated episodes (`year`, `month`, `day`).
    pub destination_date: String,

    /// The destination template renders a full path rather than a directory.
    pub destination_is_filepath: bool,

    pub lowercase_destination: bool,

    pub fullpath_replacements: Vec<ReplacementRule>,

    pub always_move: bool,

    pub always_copy: bool,

    pub leave_symlink: bool,

    pub overwrite_destination: bool,

    pub create_dirs: bool,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            enable: false,
            only: false,
            destination: ".".to_string(),
            destination_date: ".".to_string(),
            destination_is_filepath: false,
            lowercase_destination: false,
            fullpath_replacements: Vec::new(),
            always_move: false,
            always_copy: false,
            leave_symlink: false,
            overwrite_destination: false,
            create_dirs: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub base_url: String,

    pub language: String,

    pub request_timeout_seconds: u64,

    /// Use this series name for every file instead of the detected one.
    pub series_name: Option<String>,

    /// Use this provider series id for every file.
    pub series_id: Option<u64>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: constants::metadata::TVMAZE_API.to_string(),
            language: "en".to_string(),
            request_timeout_seconds: constants::metadata::DEFAULT_TIMEOUT.as_secs(),
            series_name: None,
            series_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = match Format::for_path(path) {
            Format::Json => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            Format::Toml => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = match Format::for_path(path) {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => self.to_toml()?,
        };
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from(format!("{CONFIG_DIR_NAME}.toml")));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(CONFIG_DIR_NAME).join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{CONFIG_DIR_NAME}")).join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.relocation.always_copy && self.relocation.always_move {
            anyhow::bail!("move.always_copy and move.always_move cannot both be enabled");
        }

        if self.naming.lowercase_filename && self.naming.titlecase_filename {
            anyhow::bail!("naming.lowercase_filename and naming.titlecase_filename cannot both be enabled");
        }

        if self.relocation.only && !self.relocation.enable {
            anyhow::bail!("move.only requires move.enable");
        }

        if self.parsing.filename_patterns.is_empty() {
            anyhow::bail!("parsing.filename_patterns cannot be empty");
        }

        for (index, pattern) in self.parsing.filename_patterns.iter().enumerate() {
            patterns::compile(pattern)
                .with_context(|| format!("Invalid filename pattern #{}", index + 1))?;
        }

        ExtensionPattern::new(&self.parsing.extension_pattern)
            .context("Invalid parsing.extension_pattern")?;

        Replacements::compile(&self.parsing.input_filename_replacements)
            .context("Invalid parsing.input_filename_replacements")?;
        Replacements::compile(&self.naming.output_filename_replacements)
            .context("Invalid naming.output_filename_replacements")?;
        Replacements::compile(&self.relocation.fullpath_replacements)
            .context("Invalid move.fullpath_replacements")?;

        for rule in &self.parsing.input_series_replacements {
            if rule.is_regex {
                regex::Regex::new(&rule.pattern).with_context(|| {
                    format!("Invalid input series replacement: {}", rule.pattern)
                })?;
            }
        }

        for rule in &self.general.filename_blacklist {
            if rule.is_regex {
                regex::Regex::new(&rule.pattern)
                    .with_context(|| format!("Invalid blacklist pattern: {}", rule.pattern))?;
            }
        }

        Ok(())
    }
}
