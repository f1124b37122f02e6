use reqwest::Method;
use url::Url;

use crate::spotify_rs::error::SpotifyApiError;

/// Decoupled representation of a Spotify track from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub uri: String,
}

/// A playlist as seen by the mix. Two playlists are the same logical playlist
/// when owner and name match exactly, regardless of id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub owner_id: String,
    pub name: String,
}

impl PlaylistRef {
    pub fn is_same_logical_playlist(&self, owner_id: &str, name: &str) -> bool {
        self.owner_id == owner_id && self.name == name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

/// Settings for a playlist about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub name: String,
    pub public: bool,
    pub collaborative: bool,
    pub description: String,
}

impl NewPlaylist {
    /// A private, non-collaborative playlist.
    pub fn private(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public: false,
            collaborative: false,
            description: description.into(),
        }
    }
}

/// One call against the Web API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            body: None,
        }
    }

    pub fn with_body(method: Method, url: Url, body: serde_json::Value) -> Self {
        Self {
            method,
            url,
            body: Some(body),
        }
    }
}

/// Port wrapping a single authenticated HTTP round trip.
///
/// Implemented by `spotify_rs::client::SpotifyHttpClient` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn perform_request(&self, request: ApiRequest)
    -> Result<serde_json::Value, SpotifyApiError>;
}

/// Port trait wrapping the Spotify API capabilities used by business logic.
///
/// Implementations live in `services::spotify::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpotifyClient: Send + Sync {
    async fn current_user(&self) -> Result<CurrentUser, SpotifyApiError>;

    async fn saved_tracks(&self) -> Result<Vec<Track>, SpotifyApiError>;

    async fn saved_playlists(&self) -> Result<Vec<PlaylistRef>, SpotifyApiError>;

    async fn playlist_track_uris(&self, playlist_id: &str) -> Result<Vec<String>, SpotifyApiError>;

    async fn remove_tracks(&self, playlist_id: &str, uris: &[String])
    -> Result<(), SpotifyApiError>;

    async fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<PlaylistRef, SpotifyApiError>;

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), SpotifyApiError>;

    async fn recommendations(
        &self,
        seed_track_id: &str,
        limit: usize,
    ) -> Result<Vec<Track>, SpotifyApiError>;

    async fn search_playlists(&self, query: &str) -> Result<Vec<PlaylistRef>, SpotifyApiError>;
}
