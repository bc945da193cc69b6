//! Batch processing of episode files.
//!
//! Each file is parsed, enriched through the metadata provider, given a new
//! name and destination, confirmed with the user unless running in batch
//! mode, and finally relocated. Files are handled strictly one after another.

use crate::config::{Config, LookupErrorPolicy};
use crate::error::Error;
use crate::library::{Destination, FileFinder, LibraryService, Relocation, Relocator};
use crate::models::episode::Episode;
use crate::naming::NameGenerator;
use crate::parser::FilenameParser;
use crate::services::enrich::Enricher;
use crate::services::metadata::{LookupError, MetadataProvider};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Always,
    Quit,
}

impl Answer {
    /// Parses a prompt reply; an empty reply means yes.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => Some(Self::Yes),
            "n" | "no" => Some(Self::No),
            "a" | "always" => Some(Self::Always),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Asks the user whether to go ahead with a rename.
pub trait Prompt {
    fn confirm(&mut self, question: &str) -> io::Result<Answer>;
}

/// Reads answers from standard input.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&mut self, question: &str) -> io::Result<Answer> {
        let stdin = io::stdin();
        loop {
            print!("{question} ([y]/n/a/q) ");
            io::stdout().flush()?;

            let mut input = String::new();
            if stdin.lock().read_line(&mut input)? == 0 {
                return Ok(Answer::Quit);
            }

            match Answer::parse(&input) {
                Some(answer) => return Ok(answer),
                None => println!("Invalid input, enter y, n, a or q"),
            }
        }
    }
}

/// State carried from one file to the next within a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchState {
    always_rename: bool,
}

impl BatchState {
    #[must_use]
    pub const fn always_rename(self) -> bool {
        self.always_rename
    }

    /// Stop asking for the rest of the run. There is no way back.
    #[must_use]
    pub const fn escalate(self) -> Self {
        Self {
            always_rename: true,
        }
    }
}

#[derive(Debug)]
pub enum FileOutcome {
    Renamed(Relocation),
    /// Dry run: the file would have gone to `destination`.
    Previewed {
        original: PathBuf,
        destination: PathBuf,
    },
    /// The computed path already equals the current one.
    Unchanged(PathBuf),
    Skipped {
        path: PathBuf,
        reason: String,
    },
    Failed {
        path: PathBuf,
        error: Error,
    },
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub renamed: usize,
    pub previewed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Renamed(_) => self.renamed += 1,
            FileOutcome::Previewed { .. } => self.previewed += 1,
            FileOutcome::Unchanged(_) => self.unchanged += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { path, error } => {
                self.failures.push((path.clone(), error.to_string()));
            }
        }
    }

    #[must_use]
    pub const fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn print(&self) {
        println!();
        println!("# Done");
        println!(
            "Renamed: {}, unchanged: {}, skipped: {}, failed: {}",
            self.renamed,
            self.unchanged,
            self.skipped,
            self.failures.len()
        );
        if self.previewed > 0 {
            println!("Dry run, {} file(s) not touched", self.previewed);
        }
        for (path, error) in &self.failures {
            println!("  FAILED {}: {error}", path.display());
        }
    }
}

pub struct RenameService {
    finder: FileFinder,
    parser: FilenameParser,
    generator: NameGenerator,
    library: LibraryService,
    enricher: Enricher,
    batch: bool,
    dry_run: bool,
    on_lookup_error: LookupErrorPolicy,
}

impl RenameService {
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when a pattern, replacement rule or
    /// extension rule does not compile.
    pub fn new(config: &Config, provider: Arc<dyn MetadataProvider>) -> Result<Self, Error> {
        let configuration = |e: &dyn std::fmt::Display| Error::Configuration(e.to_string());

        Ok(Self {
            finder: FileFinder::from_config(&config.general).map_err(|e| configuration(&e))?,
            parser: FilenameParser::from_config(&config.parsing)?,
            generator: NameGenerator::from_config(config).map_err(|e| configuration(&e))?,
            library: LibraryService::new(config.relocation.clone())
                .map_err(|e| configuration(&e))?,
            enricher: Enricher::new(provider, config),
            batch: config.general.batch,
            dry_run: config.general.dry_run,
            on_lookup_error: config.general.on_lookup_error,
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::NoValidFiles`] when nothing usable was found.
    pub fn find_files(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, Error> {
        let files = self.finder.find_files(paths);
        if files.is_empty() {
            return Err(Error::NoValidFiles);
        }
        info!(count = files.len(), "Found files");
        Ok(files)
    }

    /// Parses every file, dropping those that cannot be parsed or have no
    /// series, and sorts the rest by series, season and episode.
    ///
    /// # Errors
    ///
    /// Only configuration problems are returned; unparsable files are logged
    /// and skipped.
    pub fn collect_episodes(&self, files: &[PathBuf]) -> Result<Vec<Episode>, Error> {
        let mut episodes = Vec::with_capacity(files.len());

        for file in files {
            match self.parser.parse(file) {
                Ok(episode) => {
                    if episode.series_name.is_none()
                        && episode.series_id.is_none()
                        && !self.enricher.has_series_override()
                    {
                        warn!(file = %file.display(), "No series name detected, skipping");
                        continue;
                    }
                    episodes.push(episode);
                }
                Err(e) => {
                    let error = Error::from(e);
                    if error.is_fatal() {
                        return Err(error);
                    }
                    warn!(file = %file.display(), error = %error, "Skipping file");
                }
            }
        }

        episodes.sort_by(Episode::sort_cmp);
        Ok(episodes)
    }

    /// Handles one episode from detection to relocation.
    ///
    /// # Errors
    ///
    /// Only errors that end the run are returned: user aborts, a lookup
    /// failure under the `abort` policy and template errors. Everything that
    /// concerns this file alone is reported through [`FileOutcome`].
    pub async fn process_file(
        &self,
        mut episode: Episode,
        state: BatchState,
        prompt: &mut dyn Prompt,
    ) -> Result<(FileOutcome, BatchState), Error> {
        println!();
        println!("# Processing file: {}", episode.original_filename);
        if let Some(replaced) = self.parser.replaced_basename(&episode.original_filename) {
            println!("# With custom replacements: {replaced}");
        }
        println!("# Detected: {episode}");

        if let Err(e) = self.enricher.enrich(&mut episode).await
            && let Some(outcome) = self.handle_lookup_error(&episode, e)?
        {
            return Ok((outcome, state));
        }

        let new_name = if self.library.keeps_filenames() {
            episode.original_filename.clone()
        } else {
            self.generator.generate(&episode)?
        };
        let preview = self.generator.preview(&episode)?;
        debug!(preview = %preview, new_name = %new_name, "Rendered name");

        let destination = self.library.destination(&episode, &new_name, &self.generator)?;

        let relocator = match Relocator::new(&episode.path) {
            Ok(relocator) => relocator.with_fullpath_replacements(
                self.library.fullpath_replacements(),
                self.parser.extension(),
            ),
            Err(e) => return Ok((failed(&episode.path, e.into()), state)),
        };

        let target = relocator.preview(&destination);
        if target == relocator.source() {
            println!("Existing filename is correct: {}", episode.original_filename);
            return Ok((FileOutcome::Unchanged(episode.path), state));
        }

        print_plan(&episode, &new_name, &target, self.library.moves_files());

        if self.dry_run {
            println!("Dry run, not renaming");
            return Ok((
                FileOutcome::Previewed {
                    original: relocator.source().to_path_buf(),
                    destination: target,
                },
                state,
            ));
        }

        let state = match self.confirm(state, prompt)? {
            Some(state) => state,
            None => {
                println!("Skipping file");
                return Ok((
                    FileOutcome::Skipped {
                        path: episode.path,
                        reason: "declined by user".to_string(),
                    },
                    state,
                ));
            }
        };

        Ok((self.relocate(&relocator, &destination, &episode.path), state))
    }

    /// Finds, collects and processes every file under `paths`.
    ///
    /// # Errors
    ///
    /// Returns the first error that ends the run; per-file failures end up in
    /// the summary.
    pub async fn process_all(
        &self,
        paths: &[PathBuf],
        prompt: &mut dyn Prompt,
    ) -> Result<RunSummary, Error> {
        let files = self.find_files(paths)?;
        let episodes = self.collect_episodes(&files)?;
        if episodes.is_empty() {
            return Err(Error::NoValidFiles);
        }

        let mut summary = RunSummary {
            skipped: files.len() - episodes.len(),
            ..RunSummary::default()
        };
        let mut state = BatchState::default();

        for episode in episodes {
            let (outcome, next) = self.process_file(episode, state, prompt).await?;
            summary.record(&outcome);
            state = next;
        }

        Ok(summary)
    }

    /// `Ok(None)` continues with the un-enriched episode, `Ok(Some(_))` ends
    /// this file, `Err` ends the run.
    fn handle_lookup_error(
        &self,
        episode: &Episode,
        error: LookupError,
    ) -> Result<Option<FileOutcome>, Error> {
        if matches!(error, LookupError::UserAbort) {
            return Err(Error::UserAbort);
        }

        if !self.batch {
            warn!(file = %episode.original_filename, error = %error, "Metadata lookup failed, continuing without episode name");
            return Ok(None);
        }

        match self.on_lookup_error {
            LookupErrorPolicy::Skip => {
                warn!(file = %episode.original_filename, error = %error, "Metadata lookup failed, skipping file");
                Ok(Some(FileOutcome::Skipped {
                    path: episode.path.clone(),
                    reason: error.to_string(),
                }))
            }
            LookupErrorPolicy::Proceed => {
                warn!(file = %episode.original_filename, error = %error, "Metadata lookup failed, continuing without episode name");
                Ok(None)
            }
            LookupErrorPolicy::Abort => {
                error!(file = %episode.original_filename, error = %error, "Metadata lookup failed, aborting");
                Err(error.into())
            }
        }
    }

    /// `Ok(None)` means the user declined this file.
    fn confirm(
        &self,
        state: BatchState,
        prompt: &mut dyn Prompt,
    ) -> Result<Option<BatchState>, Error> {
        if self.batch || state.always_rename() {
            return Ok(Some(state));
        }

        let question = if self.library.moves_files() {
            "Move file?"
        } else {
            "Rename?"
        };

        match prompt.confirm(question)? {
            Answer::Yes => Ok(Some(state)),
            Answer::No => Ok(None),
            Answer::Always => Ok(Some(state.escalate())),
            Answer::Quit => Err(Error::UserAbort),
        }
    }

    fn relocate(
        &self,
        relocator: &Relocator<'_>,
        destination: &Destination,
        path: &Path,
    ) -> FileOutcome {
        match relocator.relocate(destination, self.library.relocate_options()) {
            Ok(relocation) => {
                println!("Done: {}", relocation.destination.display());
                FileOutcome::Renamed(relocation)
            }
            Err(e) => failed(path, e.into()),
        }
    }
}

fn failed(path: &Path, error: Error) -> FileOutcome {
    error!(file = %path.display(), error = %error, "Failed to relocate file");
    FileOutcome::Failed {
        path: path.to_path_buf(),
        error,
    }
}

fn print_plan(episode: &Episode, new_name: &str, target: &Path, moving: bool) {
    println!("Old filename: {}", episode.original_filename);
    if moving {
        println!("New path: {}", target.display());
    } else {
        println!("New filename: {new_name}");
    }
}
