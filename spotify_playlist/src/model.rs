use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub release_date: String,
}

/// A track as it appears in a playlist.
///
/// `uri` is the locator handed to mutation calls. Local files have no catalog
/// id, so their `uri` doubles as `id`. The service refuses to add local uris,
/// so a rewrite of a playlist holding local files fails on the batch that
/// carries them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub uri: String,
    pub title: String,
    pub artists: Vec<Artist>,
    pub album: Album,
    pub duration_ms: u64,
    pub popularity: u32,
}

impl Track {
    pub fn is_local(&self) -> bool {
        is_local_uri(&self.uri)
    }

    /// Name of the first credited artist, empty when none is credited.
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(|a| a.name.as_str()).unwrap_or("")
    }
}

pub fn is_local_uri(uri: &str) -> bool {
    uri.starts_with("spotify:local:")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub tempo: f64,
    pub loudness: f64,
    pub acousticness: f64,
    pub speechiness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
}

/// Audio features joined to tracks by id.
pub type FeatureSet = HashMap<String, AudioFeatures>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub total_tracks: u32,
}
