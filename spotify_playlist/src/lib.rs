//! Sorting, deduplicating and copying Spotify playlists.
//!
//! Every operation reads a playlist in full, works on the in-memory copy and
//! writes the result back in batches the Web API accepts.

pub mod api;
pub mod client;
pub mod dedup;
pub mod error;
pub mod fetch;
pub mod model;
pub mod mutate;
pub mod sort;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use api::{Cursor, Page, PlaylistApi, DEFAULT_BATCH_CAP};
pub use client::Spotify;
pub use dedup::{DedupStrategy, EquivalenceKey, TrackKey};
pub use error::{Error, Result};
pub use model::{Album, Artist, AudioFeatures, FeatureSet, PlaylistSummary, Track};
pub use mutate::{BatchMutator, BatchOp, BatchPlan};
pub use sort::{Feature, Order, SortKey, SortSpec};
pub use workflow::{CleanReport, CopyReport, DedupReport, PlaylistRef, PlaylistTools, SortReport};
