use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    api::{Cursor, Page, PlaylistApi},
    error::{Error, Result},
    model::{Album, Artist, AudioFeatures, PlaylistSummary, Track},
};

pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

const TRACKS_PAGE_LIMIT: usize = 100;
const PLAYLISTS_PAGE_LIMIT: usize = 50;

/// Spotify Web API client authorised with a user bearer token.
pub struct Spotify {
    client: Client,
    base_url: String,
}

impl Spotify {
    pub fn new(bearer_token: &str) -> Result<Self> {
        Self::with_base_url(bearer_token, SPOTIFY_API_URL)
    }

    pub fn with_base_url(bearer_token: &str, base_url: &str) -> Result<Self> {
        let token = bearer_token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);
        if token.is_empty() {
            return Err(Error::Config("bearer token is empty".into()));
        }
        let mut headers = HeaderMap::new();
        headers.append(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Config(format!("bearer token is not a valid header: {e}")))?,
        );
        Ok(Spotify {
            client: Client::builder().default_headers(headers).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error body".to_string());
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let text = self.send(request).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn tracks_request(&self, method: Method, playlist_id: &str) -> RequestBuilder {
        let url = self.endpoint(&format!("playlists/{playlist_id}/tracks"));
        debug!("Request: {method} {url}");
        self.client.request(method, url)
    }
}

#[async_trait]
impl PlaylistApi for Spotify {
    async fn fetch_page(&self, playlist_id: &str, cursor: Option<&Cursor>) -> Result<Page<Track>> {
        let request = match cursor {
            Some(Cursor(next)) => {
                debug!("Request: GET {next}");
                self.client.get(next)
            }
            None => self
                .tracks_request(Method::GET, playlist_id)
                .query(&[("limit", TRACKS_PAGE_LIMIT)]),
        };
        let page: Paging<PlaylistItem> = self.get_json(request).await?;
        let items = page
            .items
            .into_iter()
            .filter_map(|item| match item.track {
                Some(track) if track.kind != "episode" => Some(track.into()),
                Some(track) => {
                    warn!("Skipping episode '{}' in playlist {playlist_id}", track.name);
                    None
                }
                None => {
                    warn!("Skipping unavailable entry in playlist {playlist_id}");
                    None
                }
            })
            .collect();
        Ok(Page {
            items,
            next: page.next.map(Cursor),
        })
    }

    async fn replace_items(&self, playlist_id: &str, locators: &[String]) -> Result<()> {
        let request = self
            .tracks_request(Method::PUT, playlist_id)
            .json(&UrisBody { uris: locators });
        self.send(request).await?;
        Ok(())
    }

    async fn append_items(&self, playlist_id: &str, locators: &[String]) -> Result<()> {
        let request = self
            .tracks_request(Method::POST, playlist_id)
            .json(&UrisBody { uris: locators });
        self.send(request).await?;
        Ok(())
    }

    async fn remove_all_occurrences(&self, playlist_id: &str, locators: &[String]) -> Result<()> {
        let body = RemoveBody {
            tracks: locators.iter().map(|uri| UriRef { uri }).collect(),
        };
        let request = self.tracks_request(Method::DELETE, playlist_id).json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn fetch_feature_batch(&self, ids: &[String]) -> Result<Vec<(String, AudioFeatures)>> {
        let url = self.endpoint("audio-features");
        debug!("Request: GET {url} ({} ids)", ids.len());
        let request = self.client.get(url).query(&[("ids", ids.join(","))]);
        let response: FeaturesResponse = self.get_json(request).await?;
        Ok(response
            .audio_features
            .into_iter()
            .flatten()
            .map(|entry| (entry.id, entry.features))
            .collect())
    }

    async fn fetch_playlists_page(&self, cursor: Option<&Cursor>) -> Result<Page<PlaylistSummary>> {
        let request = match cursor {
            Some(Cursor(next)) => self.client.get(next),
            None => self
                .client
                .get(self.endpoint("me/playlists"))
                .query(&[("limit", PLAYLISTS_PAGE_LIMIT)]),
        };
        let page: Paging<WirePlaylist> = self.get_json(request).await?;
        Ok(Page {
            items: page.items.into_iter().map(Into::into).collect(),
            next: page.next.map(Cursor),
        })
    }

    async fn current_user_id(&self) -> Result<String> {
        let user: WireUser = self.get_json(self.client.get(self.endpoint("me"))).await?;
        Ok(user.id)
    }

    async fn create_playlist(&self, user_id: &str, name: &str, public: bool) -> Result<PlaylistSummary> {
        let request = self
            .client
            .post(self.endpoint(&format!("users/{user_id}/playlists")))
            .json(&CreatePlaylistBody { name, public });
        let playlist: WirePlaylist = self.get_json(request).await?;
        Ok(playlist.into())
    }
}

#[derive(Deserialize)]
struct Paging<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct PlaylistItem {
    track: Option<WireTrack>,
}

#[derive(Deserialize)]
struct WireTrack {
    id: Option<String>,
    uri: String,
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
    album: Option<WireAlbum>,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    popularity: u32,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Deserialize)]
struct WireAlbum {
    name: Option<String>,
    release_date: Option<String>,
}

impl From<WireTrack> for Track {
    fn from(track: WireTrack) -> Self {
        let album = track.album.map_or(
            Album {
                name: String::new(),
                release_date: String::new(),
            },
            |album| Album {
                name: album.name.unwrap_or_default(),
                release_date: album.release_date.unwrap_or_default(),
            },
        );
        Track {
            id: track.id.unwrap_or_else(|| track.uri.clone()),
            uri: track.uri,
            title: track.name,
            artists: track.artists,
            album,
            duration_ms: track.duration_ms,
            popularity: track.popularity,
        }
    }
}

#[derive(Deserialize)]
struct FeaturesResponse {
    audio_features: Vec<Option<FeatureEntry>>,
}

#[derive(Deserialize)]
struct FeatureEntry {
    id: String,
    #[serde(flatten)]
    features: AudioFeatures,
}

#[derive(Deserialize)]
struct WirePlaylist {
    id: String,
    name: String,
    tracks: Option<TracksRef>,
}

#[derive(Deserialize)]
struct TracksRef {
    total: u32,
}

impl From<WirePlaylist> for PlaylistSummary {
    fn from(playlist: WirePlaylist) -> Self {
        PlaylistSummary {
            id: playlist.id,
            name: playlist.name,
            total_tracks: playlist.tracks.map_or(0, |t| t.total),
        }
    }
}

#[derive(Deserialize)]
struct WireUser {
    id: String,
}

#[derive(Serialize)]
struct UrisBody<'a> {
    uris: &'a [String],
}

#[derive(Serialize)]
struct RemoveBody<'a> {
    tracks: Vec<UriRef<'a>>,
}

#[derive(Serialize)]
struct UriRef<'a> {
    uri: &'a str,
}

#[derive(Serialize)]
struct CreatePlaylistBody<'a> {
    name: &'a str,
    public: bool,
}
