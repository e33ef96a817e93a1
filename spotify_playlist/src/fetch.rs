use std::collections::HashSet;

use log::{debug, info};

use crate::{
    api::{Cursor, PlaylistApi},
    error::{Error, Result},
    model::{FeatureSet, PlaylistSummary, Track},
};

/// Collects every track of a playlist, following `next` cursors until the
/// last page. Any failed page aborts the whole fetch.
pub async fn fetch_all(api: &impl PlaylistApi, playlist_id: &str) -> Result<Vec<Track>> {
    let mut tracks = Vec::new();
    let mut cursor: Option<Cursor> = None;
    let mut pages = 0;
    loop {
        let page = api
            .fetch_page(playlist_id, cursor.as_ref())
            .await
            .map_err(|e| Error::TransientFetch(format!("playlist {playlist_id}, page {pages}: {e}")))?;
        pages += 1;
        debug!("Page {pages} of playlist {playlist_id}: {} tracks", page.items.len());
        tracks.extend(page.items);
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    info!("Fetched {} tracks from playlist {playlist_id} in {pages} pages", tracks.len());
    Ok(tracks)
}

/// Looks up audio features for `tracks`, at most `cap` ids per request.
/// Each catalog id is requested once; local files are never requested. Tracks
/// the service knows nothing about are simply absent from the result.
pub async fn fetch_features(api: &impl PlaylistApi, tracks: &[Track], cap: usize) -> Result<FeatureSet> {
    let mut seen = HashSet::new();
    let ids: Vec<String> = tracks
        .iter()
        .filter(|t| !t.is_local() && seen.insert(t.id.as_str()))
        .map(|t| t.id.clone())
        .collect();
    let mut features = FeatureSet::with_capacity(ids.len());
    for (index, batch) in ids.chunks(cap.max(1)).enumerate() {
        let entries = api
            .fetch_feature_batch(batch)
            .await
            .map_err(|e| Error::TransientFetch(format!("audio features, batch {index}: {e}")))?;
        features.extend(entries);
    }
    info!("Fetched audio features for {} of {} tracks", features.len(), ids.len());
    Ok(features)
}

/// Finds one of the current user's playlists by name, ignoring case.
pub async fn find_playlist(api: &impl PlaylistApi, name: &str) -> Result<PlaylistSummary> {
    let wanted = name.to_lowercase();
    let mut cursor: Option<Cursor> = None;
    loop {
        let page = api
            .fetch_playlists_page(cursor.as_ref())
            .await
            .map_err(|e| Error::TransientFetch(format!("playlists: {e}")))?;
        if let Some(found) = page.items.into_iter().find(|p| p.name.to_lowercase() == wanted) {
            debug!("Resolved playlist '{name}' to {}", found.id);
            return Ok(found);
        }
        match page.next {
            Some(next) => cursor = Some(next),
            None => return Err(Error::NotFound(name.to_string())),
        }
    }
}
