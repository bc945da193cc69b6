use crate::config::{BlacklistRule, GeneralConfig};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug)]
enum BlacklistMatcher {
    Literal(String),
    Pattern(Regex),
}

#[derive(Debug)]
struct Blacklist {
    matcher: BlacklistMatcher,
    full_path: bool,
}

impl Blacklist {
    fn compile(rule: &BlacklistRule) -> Result<Self, regex::Error> {
        let matcher = if rule.is_regex {
            BlacklistMatcher::Pattern(Regex::new(&rule.pattern)?)
        } else {
            BlacklistMatcher::Literal(rule.pattern.clone())
        };
        Ok(Self {
            matcher,
            full_path: rule.full_path,
        })
    }

    fn matches(&self, path: &Path) -> bool {
        let subject = if self.full_path {
            path.to_string_lossy()
        } else {
            path.file_name().unwrap_or_default().to_string_lossy()
        };

        match &self.matcher {
            BlacklistMatcher::Literal(literal) => subject == literal.as_str(),
            BlacklistMatcher::Pattern(re) => re.is_match(&subject),
        }
    }
}

/// Expands command line paths into the list of candidate video files.
#[derive(Debug)]
pub struct FileFinder {
    valid_extensions: Vec<String>,
    blacklist: Vec<Blacklist>,
    recursive: bool,
}

impl FileFinder {
    pub fn from_config(config: &GeneralConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            valid_extensions: config
                .valid_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            blacklist: config
                .filename_blacklist
                .iter()
                .map(Blacklist::compile)
                .collect::<Result<_, _>>()?,
            recursive: config.recursive,
        })
    }

    /// Files are taken as given, directories are listed (recursively when
    /// configured). The result is de-duplicated and sorted.
    #[must_use]
    pub fn find_files(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut found = BTreeSet::new();

        for path in paths {
            if path.is_file() {
                if self.accepts(path) {
                    found.insert(path.clone());
                }
            } else if path.is_dir() {
                let max_depth = if self.recursive { usize::MAX } else { 1 };
                for entry in WalkDir::new(path)
                    .max_depth(max_depth)
                    .into_iter()
                    .filter_map(|e| {
                        e.map_err(|e| warn!(error = %e, "Failed to read directory entry"))
                            .ok()
                    })
                    .filter(|e| e.file_type().is_file())
                {
                    if self.accepts(entry.path()) {
                        found.insert(entry.into_path());
                    }
                }
            } else {
                warn!(path = %path.display(), "Invalid path, skipping");
            }
        }

        found.into_iter().collect()
    }

    fn accepts(&self, path: &Path) -> bool {
        if !self.valid_extensions.is_empty() {
            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if !self.valid_extensions.contains(&extension) {
                debug!(path = %path.display(), "Skipping file with unsupported extension");
                return false;
            }
        }

        if self.blacklist.iter().any(|rule| rule.matches(path)) {
            debug!(path = %path.display(), "Skipping blacklisted file");
            return false;
        }

        true
    }
}
