use url::Url;

use crate::spotify_rs::error::SpotifyApiError;

pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Page sizes used for the library listings
pub const SAVED_TRACKS_PAGE_SIZE: u32 = 50;
pub const SAVED_PLAYLISTS_PAGE_SIZE: u32 = 50;
pub const PLAYLIST_ITEMS_PAGE_SIZE: u32 = 100;
pub const SEARCH_LIMIT: u32 = 50;

/// Builds the Web API urls the mix talks to, relative to a configurable base.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        // The constant is a valid absolute url
        Self {
            base: Url::parse(SPOTIFY_API_BASE_URL).expect("valid base url"),
        }
    }
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, SpotifyApiError> {
        let base = Url::parse(base_url).map_err(|source| SpotifyApiError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(SpotifyApiError::InvalidUrl {
                url: base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }
        Ok(Self { base })
    }

    fn path(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // checked in `new`, the base can always carry path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn current_user(&self) -> Url {
        self.path(&["me"])
    }

    pub fn saved_tracks(&self) -> Url {
        let mut url = self.path(&["me", "tracks"]);
        url.query_pairs_mut()
            .append_pair("offset", "0")
            .append_pair("limit", &SAVED_TRACKS_PAGE_SIZE.to_string());
        url
    }

    pub fn saved_playlists(&self) -> Url {
        let mut url = self.path(&["me", "playlists"]);
        url.query_pairs_mut()
            .append_pair("offset", "0")
            .append_pair("limit", &SAVED_PLAYLISTS_PAGE_SIZE.to_string());
        url
    }

    /// Field-projected listing of a playlist's item uris
    pub fn playlist_item_uris(&self, playlist_id: &str) -> Url {
        let mut url = self.playlist_tracks(playlist_id);
        url.query_pairs_mut()
            .append_pair("fields", "limit,next,items(track(uri))")
            .append_pair("limit", &PLAYLIST_ITEMS_PAGE_SIZE.to_string());
        url
    }

    /// Target of the bulk add and remove mutations
    pub fn playlist_tracks(&self, playlist_id: &str) -> Url {
        self.path(&["playlists", playlist_id, "tracks"])
    }

    pub fn user_playlists(&self, user_id: &str) -> Url {
        self.path(&["users", user_id, "playlists"])
    }

    pub fn recommendations(&self, seed_track_id: &str, limit: usize) -> Url {
        let mut url = self.path(&["recommendations"]);
        url.query_pairs_mut()
            .append_pair("seed_tracks", seed_track_id)
            .append_pair("limit", &limit.to_string());
        url
    }

    pub fn search_playlists(&self, query: &str) -> Url {
        let mut url = self.path(&["search"]);
        url.query_pairs_mut()
            .append_pair("type", "playlist")
            .append_pair("q", query)
            .append_pair("limit", &SEARCH_LIMIT.to_string());
        url
    }
}
