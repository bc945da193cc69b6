pub mod tvmaze;

pub use tvmaze::TvMazeClient;
