use crate::ports::spotify::{PlaylistRef, RequestExecutor, Track};
use crate::spotify_rs::endpoints::Endpoints;
use crate::spotify_rs::error::SpotifyApiError;
use crate::spotify_rs::pagination::fetch_all;
use crate::spotify_rs::types::{SpotifyPlaylist, SpotifyPlaylistItem, SpotifySavedTrack};

impl From<SpotifyPlaylist> for PlaylistRef {
    fn from(playlist: SpotifyPlaylist) -> Self {
        Self {
            id: playlist.id,
            owner_id: playlist.owner.id,
            name: playlist.name,
        }
    }
}

/// The paginated listings of a user's library.
pub struct LibrarySource<'a, R: ?Sized> {
    executor: &'a R,
    endpoints: &'a Endpoints,
    max_pages: usize,
}

impl<'a, R: RequestExecutor + ?Sized> LibrarySource<'a, R> {
    pub fn new(executor: &'a R, endpoints: &'a Endpoints, max_pages: usize) -> Self {
        Self {
            executor,
            endpoints,
            max_pages,
        }
    }

    /// All tracks in "Liked Songs", newest first as the API returns them
    pub async fn saved_tracks(&self) -> Result<Vec<Track>, SpotifyApiError> {
        let items: Vec<SpotifySavedTrack> =
            fetch_all(self.executor, self.endpoints.saved_tracks(), self.max_pages).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| item.track)
            .map(|track| Track {
                id: track.id,
                uri: track.uri,
            })
            .collect())
    }

    /// Playlists owned or followed by the current user
    pub async fn saved_playlists(&self) -> Result<Vec<PlaylistRef>, SpotifyApiError> {
        let items: Vec<Option<SpotifyPlaylist>> =
            fetch_all(self.executor, self.endpoints.saved_playlists(), self.max_pages).await?;

        Ok(items.into_iter().flatten().map(PlaylistRef::from).collect())
    }

    /// Uris of every item in a playlist. Entries without a track are dropped.
    pub async fn playlist_track_uris(&self, playlist_id: &str) -> Result<Vec<String>, SpotifyApiError> {
        let items: Vec<SpotifyPlaylistItem> = fetch_all(
            self.executor,
            self.endpoints.playlist_item_uris(playlist_id),
            self.max_pages,
        )
        .await?;

        Ok(items
            .into_iter()
            .filter_map(|item| item.track.and_then(|track| track.uri))
            .collect())
    }
}
