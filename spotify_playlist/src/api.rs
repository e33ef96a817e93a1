use async_trait::async_trait;

use crate::{
    error::Result,
    model::{AudioFeatures, PlaylistSummary, Track},
};

/// Maximum number of locators or ids Spotify accepts in one call.
pub const DEFAULT_BATCH_CAP: usize = 100;

/// Opaque position in a paged listing, as handed out by the previous page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(pub String);

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Cursor>,
}

/// The remote calls the playlist tools depend on.
///
/// Mutation and feature calls receive at most one batch cap worth of
/// locators/ids; splitting longer inputs is the caller's job.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    /// First page when `cursor` is `None`, otherwise the page it points at.
    async fn fetch_page(&self, playlist_id: &str, cursor: Option<&Cursor>) -> Result<Page<Track>>;

    /// Sets the playlist to exactly `locators`.
    async fn replace_items(&self, playlist_id: &str, locators: &[String]) -> Result<()>;

    async fn append_items(&self, playlist_id: &str, locators: &[String]) -> Result<()>;

    /// Removes every occurrence of each locator.
    async fn remove_all_occurrences(&self, playlist_id: &str, locators: &[String]) -> Result<()>;

    /// Ids the service has no features for are left out of the result.
    async fn fetch_feature_batch(&self, ids: &[String]) -> Result<Vec<(String, AudioFeatures)>>;

    async fn fetch_playlists_page(&self, cursor: Option<&Cursor>) -> Result<Page<PlaylistSummary>>;

    async fn current_user_id(&self) -> Result<String>;

    async fn create_playlist(&self, user_id: &str, name: &str, public: bool) -> Result<PlaylistSummary>;
}
