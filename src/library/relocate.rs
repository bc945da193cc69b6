//! Moves, copies or symlinks a file to its new name and location.

use crate::library::replace::Replacements;
use crate::library::sanitize::ExtensionPattern;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("Invalid relocation options: {0}")]
    InvalidOptions(String),

    #[error("Destination {} already exists, not overwriting {}", .destination.display(), .original.display())]
    DestinationExists {
        original: PathBuf,
        destination: PathBuf,
    },

    #[error("Failed to {action} {}: {error}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error(
        "Copied {} to {} but could not remove the original ({error}); both copies now exist",
        .original.display(),
        .destination.display()
    )]
    PartialMove {
        original: PathBuf,
        destination: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl RelocateError {
    fn io(action: &'static str, path: &Path, error: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            error,
        }
    }
}

/// Where a file should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Keep the current basename inside this directory.
    Directory(PathBuf),
    /// Exact target path; relative paths resolve against the source directory.
    Path(PathBuf),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelocateOptions {
    /// Overwrite an existing destination file.
    pub force: bool,
    /// Copy even when a rename would do, leaving the original in place.
    pub always_copy: bool,
    /// Delete the original after a cross-volume copy.
    pub always_move: bool,
    /// Leave a symlink at the original path pointing at the new location.
    pub leave_symlink: bool,
    pub create_dirs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Renamed,
    Copied,
    /// Copied across volumes, then the original removed.
    Moved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub original: PathBuf,
    pub destination: PathBuf,
    pub disposition: Disposition,
    pub symlinked: bool,
}

/// Relocates one source file.
#[derive(Debug)]
pub struct Relocator<'a> {
    source: PathBuf,
    fullpath_replacements: Option<(&'a Replacements, &'a ExtensionPattern)>,
}

impl<'a> Relocator<'a> {
    pub fn new(source: impl AsRef<Path>) -> Result<Self, RelocateError> {
        let source = source.as_ref();
        let absolute = std::path::absolute(source)
            .map_err(|e| RelocateError::io("resolve", source, e))?;

        Ok(Self {
            source: normalize(&absolute),
            fullpath_replacements: None,
        })
    }

    /// Runs `rules` over every computed destination path.
    #[must_use]
    pub fn with_fullpath_replacements(
        mut self,
        rules: &'a Replacements,
        extension: &'a ExtensionPattern,
    ) -> Self {
        self.fullpath_replacements = Some((rules, extension));
        self
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The absolute path the file would be relocated to, without touching the
    /// filesystem.
    #[must_use]
    pub fn preview(&self, destination: &Destination) -> PathBuf {
        let source_dir = self.source.parent().unwrap_or_else(|| Path::new("/"));

        let joined = match destination {
            Destination::Directory(dir) => {
                let name = self.source.file_name().unwrap_or_default();
                source_dir.join(dir).join(name)
            }
            Destination::Path(path) => source_dir.join(path),
        };
        let resolved = normalize(&joined);

        match self.fullpath_replacements {
            Some((rules, extension)) if !rules.is_empty() => {
                let replaced = rules.apply(&resolved.to_string_lossy(), extension);
                PathBuf::from(replaced)
            }
            _ => resolved,
        }
    }

    pub fn relocate(
        &self,
        destination: &Destination,
        options: RelocateOptions,
    ) -> Result<Relocation, RelocateError> {
        if options.always_copy && options.always_move {
            return Err(RelocateError::InvalidOptions(
                "always_copy and always_move are mutually exclusive".to_string(),
            ));
        }

        let target = self.preview(destination);
        let target_dir = target.parent().unwrap_or_else(|| Path::new("/"));

        if options.create_dirs {
            create_dir_all(target_dir)?;
        }

        if target.is_file() && !options.force {
            return Err(RelocateError::DestinationExists {
                original: self.source.clone(),
                destination: target,
            });
        }

        let same_volume = same_volume(&self.source, target_dir)
            .map_err(|e| RelocateError::io("inspect", target_dir, e))?;

        let relocation = self.transfer(&target, same_volume, options, |p| fs::remove_file(p))?;

        info!(
            from = %relocation.original.display(),
            to = %relocation.destination.display(),
            disposition = ?relocation.disposition,
            "Relocated file"
        );

        Ok(relocation)
    }

    /// Renames or copies the source to `target`. Across volumes the original
    /// is only removed, with `remove_original`, when `always_move` is set.
    fn transfer(
        &self,
        target: &Path,
        same_volume: bool,
        options: RelocateOptions,
        remove_original: fn(&Path) -> io::Result<()>,
    ) -> Result<Relocation, RelocateError> {
        let mut relocation = Relocation {
            original: self.source.clone(),
            destination: target.to_path_buf(),
            disposition: Disposition::Renamed,
            symlinked: false,
        };

        if same_volume && !options.always_copy {
            debug!(from = %self.source.display(), to = %target.display(), "Renaming");
            fs::rename(&self.source, target)
                .map_err(|e| RelocateError::io("rename", &self.source, e))?;
        } else {
            debug!(from = %self.source.display(), to = %target.display(), same_volume, "Copying");
            copy_with_metadata(&self.source, target)?;
            relocation.disposition = Disposition::Copied;

            if !same_volume && options.always_move {
                remove_original(&self.source).map_err(|error| RelocateError::PartialMove {
                    original: self.source.clone(),
                    destination: target.to_path_buf(),
                    error,
                })?;
                relocation.disposition = Disposition::Moved;
            }
        }

        if options.leave_symlink && relocation.disposition != Disposition::Copied {
            symlink(target, &self.source)
                .map_err(|e| RelocateError::io("create symlink at", &self.source, e))?;
            relocation.symlinked = true;
        }

        Ok(relocation)
    }
}

fn create_dir_all(dir: &Path) -> Result<(), RelocateError> {
    if dir.is_dir() {
        return Ok(());
    }

    match fs::create_dir_all(dir) {
        Ok(()) => {
            info!(path = %dir.display(), "Created directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(RelocateError::io("create directory", dir, e)),
    }
}

fn copy_with_metadata(from: &Path, to: &Path) -> Result<(), RelocateError> {
    let metadata = fs::metadata(from).map_err(|e| RelocateError::io("read metadata of", from, e))?;

    fs::copy(from, to).map_err(|e| RelocateError::io("copy", from, e))?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }

    open_for_times(to)
        .and_then(|file| file.set_times(times))
        .map_err(|e| RelocateError::io("copy timestamps to", to, e))
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<File> {
    fs::OpenOptions::new().write(true).open(path)
}

#[cfg(not(windows))]
fn open_for_times(path: &Path) -> io::Result<File> {
    File::open(path)
}

#[cfg(unix)]
fn same_volume(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;
    Ok(fs::metadata(a)?.dev() == fs::metadata(b)?.dev())
}

#[cfg(not(unix))]
fn same_volume(a: &Path, b: &Path) -> io::Result<bool> {
    fs::metadata(b)?;
    let prefix = |p: &Path| match p.components().next() {
        Some(Component::Prefix(prefix)) => Some(prefix.as_os_str().to_ascii_lowercase()),
        _ => None,
    };
    Ok(prefix(a) == prefix(b))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

/// Lexically resolves `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
