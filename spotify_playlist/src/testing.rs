//! In-memory `PlaylistApi` used by the unit tests.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::{
    api::{Cursor, Page, PlaylistApi},
    error::{Error, Result},
    model::{Album, Artist, AudioFeatures, FeatureSet, PlaylistSummary, Track},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(String),
    Replace(String, Vec<String>),
    Append(String, Vec<String>),
    Remove(String, Vec<String>),
    Features(Vec<String>),
    Create(String),
}

#[derive(Default)]
struct State {
    playlists: Vec<(PlaylistSummary, Vec<Track>)>,
    catalog: HashMap<String, Track>,
    features: FeatureSet,
    calls: Vec<Call>,
    fail_mutation: Option<usize>,
    mutations: usize,
    fail_fetch: Option<usize>,
    fetches: usize,
}

pub struct MockApi {
    page_sizes: Vec<usize>,
    state: Mutex<State>,
}

impl MockApi {
    pub fn new(page_size: usize) -> Self {
        Self::with_page_sizes(vec![page_size])
    }

    /// Serves pages of the given sizes in turn, repeating the last one.
    pub fn with_page_sizes(page_sizes: Vec<usize>) -> Self {
        assert!(page_sizes.last().is_some_and(|&n| n > 0));
        MockApi {
            page_sizes,
            state: Mutex::default(),
        }
    }

    fn page_end(&self, offset: usize, len: usize) -> usize {
        let mut start = 0;
        for &size in &self.page_sizes {
            if start + size > offset {
                return (start + size).min(len);
            }
            start += size;
        }
        let last = self.page_sizes[self.page_sizes.len() - 1];
        (offset + last).min(len)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn with_playlist(self, id: &str, name: &str, tracks: Vec<Track>) -> Self {
        {
            let mut state = self.state();
            for track in &tracks {
                state.catalog.insert(track.uri.clone(), track.clone());
            }
            let summary = PlaylistSummary {
                id: id.into(),
                name: name.into(),
                total_tracks: tracks.len() as u32,
            };
            state.playlists.push((summary, tracks));
        }
        self
    }

    pub fn with_features(self, id: &str, features: AudioFeatures) -> Self {
        self.state().features.insert(id.into(), features);
        self
    }

    /// The `n`th mutation call (zero-based) fails with an API error.
    pub fn failing_mutation(self, n: usize) -> Self {
        self.state().fail_mutation = Some(n);
        self
    }

    /// The `n`th page fetch (zero-based, across all playlists) fails.
    pub fn failing_fetch(self, n: usize) -> Self {
        self.state().fail_fetch = Some(n);
        self
    }

    pub fn tracks(&self, playlist_id: &str) -> Vec<Track> {
        self.state()
            .playlists
            .iter()
            .find(|(p, _)| p.id == playlist_id)
            .map(|(_, t)| t.clone())
            .unwrap_or_default()
    }

    pub fn uris(&self, playlist_id: &str) -> Vec<String> {
        self.tracks(playlist_id).into_iter().map(|t| t.uri).collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn mutation_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Replace(..) | Call::Append(..) | Call::Remove(..)))
            .collect()
    }

    fn mutate(&self, call: Call, apply: impl FnOnce(&mut State, &mut Vec<Track>)) -> Result<()> {
        let mut state = self.state();
        let n = state.mutations;
        state.mutations += 1;
        let playlist_id = match &call {
            Call::Replace(id, _) | Call::Append(id, _) | Call::Remove(id, _) => id.clone(),
            _ => unreachable!(),
        };
        state.calls.push(call);
        if state.fail_mutation == Some(n) {
            return Err(Error::Api {
                status: 502,
                message: "bad gateway".into(),
            });
        }
        let index = state
            .playlists
            .iter()
            .position(|(p, _)| p.id == playlist_id)
            .ok_or_else(|| Error::NotFound(playlist_id.clone()))?;
        let mut tracks = std::mem::take(&mut state.playlists[index].1);
        apply(&mut *state, &mut tracks);
        state.playlists[index].1 = tracks;
        Ok(())
    }

    fn resolve(state: &State, locators: &[String]) -> Vec<Track> {
        locators
            .iter()
            .map(|uri| {
                state
                    .catalog
                    .get(uri)
                    .cloned()
                    .unwrap_or_else(|| {
                        let mut unknown = track(uri, uri, "Unknown");
                        unknown.uri = uri.clone();
                        unknown
                    })
            })
            .collect()
    }
}

#[async_trait]
impl PlaylistApi for MockApi {
    async fn fetch_page(&self, playlist_id: &str, cursor: Option<&Cursor>) -> Result<Page<Track>> {
        let tracks = {
            let mut state = self.state();
            state.calls.push(Call::Fetch(playlist_id.into()));
            let n = state.fetches;
            state.fetches += 1;
            if state.fail_fetch == Some(n) {
                return Err(Error::Api {
                    status: 503,
                    message: "service unavailable".into(),
                });
            }
            state
                .playlists
                .iter()
                .find(|(p, _)| p.id == playlist_id)
                .map(|(_, t)| t.clone())
                .ok_or_else(|| Error::Api {
                    status: 404,
                    message: "Not found.".into(),
                })?
        };
        let offset: usize = cursor.map_or(0, |c| c.0.parse().unwrap());
        let end = self.page_end(offset, tracks.len());
        Ok(Page {
            items: tracks[offset..end].to_vec(),
            next: (end < tracks.len()).then(|| Cursor(end.to_string())),
        })
    }

    async fn replace_items(&self, playlist_id: &str, locators: &[String]) -> Result<()> {
        let call = Call::Replace(playlist_id.into(), locators.to_vec());
        self.mutate(call, |state, tracks| {
            *tracks = Self::resolve(state, locators);
        })
    }

    async fn append_items(&self, playlist_id: &str, locators: &[String]) -> Result<()> {
        let call = Call::Append(playlist_id.into(), locators.to_vec());
        self.mutate(call, |state, tracks| {
            tracks.extend(Self::resolve(state, locators));
        })
    }

    async fn remove_all_occurrences(&self, playlist_id: &str, locators: &[String]) -> Result<()> {
        let call = Call::Remove(playlist_id.into(), locators.to_vec());
        self.mutate(call, |_, tracks| {
            tracks.retain(|t| !locators.contains(&t.uri) && !locators.contains(&t.id));
        })
    }

    async fn fetch_feature_batch(&self, ids: &[String]) -> Result<Vec<(String, AudioFeatures)>> {
        let mut state = self.state();
        state.calls.push(Call::Features(ids.to_vec()));
        Ok(ids
            .iter()
            .filter_map(|id| state.features.get(id).map(|f| (id.clone(), *f)))
            .collect())
    }

    async fn fetch_playlists_page(&self, cursor: Option<&Cursor>) -> Result<Page<PlaylistSummary>> {
        let summaries: Vec<PlaylistSummary> =
            self.state().playlists.iter().map(|(p, _)| p.clone()).collect();
        let offset: usize = cursor.map_or(0, |c| c.0.parse().unwrap());
        let end = self.page_end(offset, summaries.len());
        Ok(Page {
            items: summaries[offset..end].to_vec(),
            next: (end < summaries.len()).then(|| Cursor(end.to_string())),
        })
    }

    async fn current_user_id(&self) -> Result<String> {
        Ok("me".into())
    }

    async fn create_playlist(&self, _user_id: &str, name: &str, _public: bool) -> Result<PlaylistSummary> {
        let mut state = self.state();
        state.calls.push(Call::Create(name.into()));
        let summary = PlaylistSummary {
            id: format!("new-{}", state.playlists.len()),
            name: name.into(),
            total_tracks: 0,
        };
        state.playlists.push((summary.clone(), Vec::new()));
        Ok(summary)
    }
}

/// A catalog track with the given id, title and primary artist.
pub fn track(id: &str, title: &str, artist: &str) -> Track {
    Track {
        id: id.into(),
        uri: format!("spotify:track:{id}"),
        title: title.into(),
        artists: vec![Artist {
            name: artist.into(),
        }],
        album: Album {
            name: format!("{title} (album)"),
            release_date: "2000-01-01".into(),
        },
        duration_ms: 180_000,
        popularity: 50,
    }
}

/// A local file: no catalog id, so the uri stands in for it.
pub fn local_track(title: &str, artist: &str) -> Track {
    let uri = format!("spotify:local:{artist}:{title}:{title}:180");
    Track {
        id: uri.clone(),
        uri,
        ..track("local", title, artist)
    }
}

pub fn features(energy: f64) -> AudioFeatures {
    AudioFeatures {
        danceability: 0.5,
        energy,
        valence: 0.5,
        tempo: 120.0,
        loudness: -6.0,
        acousticness: 0.1,
        speechiness: 0.05,
        instrumentalness: 0.0,
        liveness: 0.1,
    }
}

pub fn numbered(n: usize) -> Vec<Track> {
    (0..n)
        .map(|i| track(&i.to_string(), &format!("Song {i}"), "Artist"))
        .collect()
}
