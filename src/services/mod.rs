pub mod enrich;
pub use enrich::Enricher;

pub mod metadata;
pub use metadata::{EpisodeEntry, LookupError, MetadataProvider, Series, SeriesQuery};

pub mod rename_service;
pub use rename_service::{
    Answer, BatchState, FileOutcome, Prompt, RenameService, RunSummary, StdinPrompt,
};
