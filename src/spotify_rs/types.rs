use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::spotify_rs::error::SpotifyApiError;

/// Uniform pagination envelope returned by every listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Spotify user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    pub display_name: Option<String>,
}

/// Spotify track, trimmed to what the mix needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub uri: String,
}

/// Entry of the saved tracks listing
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifySavedTrack {
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyOwner {
    pub id: String,
}

/// Simplified playlist object, as returned by listings, search and creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    pub owner: SpotifyOwner,
}

/// Entry of the field-projected `items(track(uri))` playlist listing.
/// Local files and unavailable episodes come back with a null track.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistItem {
    pub track: Option<SpotifyItemUri>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyItemUri {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyRecommendations {
    pub tracks: Vec<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistSearch {
    pub playlists: Page<Option<SpotifyPlaylist>>,
}

/// Body of the error responses, `{"error": {"status": 401, "message": "..."}}`
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyErrorResponse {
    pub error: SpotifyErrorObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyErrorObject {
    pub message: Option<String>,
}

/// Decode a JSON body fetched from `url` into a typed response.
pub fn decode<T: DeserializeOwned>(url: &Url, value: serde_json::Value) -> Result<T, SpotifyApiError> {
    serde_json::from_value(value).map_err(|source| SpotifyApiError::Decode {
        url: url.to_string(),
        source,
    })
}
