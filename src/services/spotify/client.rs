use reqwest::Method;
use serde_json::json;

use crate::ports::spotify::{
    ApiRequest, CurrentUser, NewPlaylist, PlaylistRef, RequestExecutor, SpotifyClient, Track,
};
use crate::spotify_rs::endpoints::Endpoints;
use crate::spotify_rs::error::SpotifyApiError;
use crate::spotify_rs::library::LibrarySource;
use crate::spotify_rs::pagination::DEFAULT_MAX_PAGES;
use crate::spotify_rs::types::{
    SpotifyPlaylist, SpotifyPlaylistSearch, SpotifyRecommendations, SpotifyUser, decode,
};

/// Production adapter for the [`SpotifyClient`] port, on top of any
/// [`RequestExecutor`] (normally `spotify_rs::SpotifyHttpClient`).
pub struct SpotifyWebClient<R: RequestExecutor> {
    executor: R,
    endpoints: Endpoints,
    max_pages: usize,
}

impl<R: RequestExecutor> SpotifyWebClient<R> {
    pub fn new(executor: R, endpoints: Endpoints) -> Self {
        Self {
            executor,
            endpoints,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn library(&self) -> LibrarySource<'_, R> {
        LibrarySource::new(&self.executor, &self.endpoints, self.max_pages)
    }
}

#[async_trait::async_trait]
impl<R: RequestExecutor> SpotifyClient for SpotifyWebClient<R> {
    async fn current_user(&self) -> Result<CurrentUser, SpotifyApiError> {
        let url = self.endpoints.current_user();
        let body = self.executor.perform_request(ApiRequest::get(url.clone())).await?;
        let user: SpotifyUser = decode(&url, body)?;

        Ok(CurrentUser {
            id: user.id,
            display_name: user.display_name,
        })
    }

    async fn saved_tracks(&self) -> Result<Vec<Track>, SpotifyApiError> {
        self.library().saved_tracks().await
    }

    async fn saved_playlists(&self) -> Result<Vec<PlaylistRef>, SpotifyApiError> {
        self.library().saved_playlists().await
    }

    async fn playlist_track_uris(&self, playlist_id: &str) -> Result<Vec<String>, SpotifyApiError> {
        self.library().playlist_track_uris(playlist_id).await
    }

    async fn remove_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyApiError> {
        let tracks: Vec<_> = uris.iter().map(|uri| json!({ "uri": uri })).collect();
        let request = ApiRequest::with_body(
            Method::DELETE,
            self.endpoints.playlist_tracks(playlist_id),
            json!({ "tracks": tracks }),
        );

        self.executor.perform_request(request).await?;
        Ok(())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<PlaylistRef, SpotifyApiError> {
        let url = self.endpoints.user_playlists(user_id);
        let body = json!({
            "name": playlist.name,
            "public": playlist.public,
            "collaborative": playlist.collaborative,
            "description": playlist.description,
        });

        let response = self
            .executor
            .perform_request(ApiRequest::with_body(Method::POST, url.clone(), body))
            .await?;
        let created: SpotifyPlaylist = decode(&url, response)?;

        Ok(created.into())
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), SpotifyApiError> {
        let request = ApiRequest::with_body(
            Method::POST,
            self.endpoints.playlist_tracks(playlist_id),
            json!({ "uris": uris }),
        );

        self.executor.perform_request(request).await?;
        Ok(())
    }

    async fn recommendations(
        &self,
        seed_track_id: &str,
        limit: usize,
    ) -> Result<Vec<Track>, SpotifyApiError> {
        let url = self.endpoints.recommendations(seed_track_id, limit);
        let body = self.executor.perform_request(ApiRequest::get(url.clone())).await?;
        let recommendations: SpotifyRecommendations = decode(&url, body)?;

        Ok(recommendations
            .tracks
            .into_iter()
            .map(|track| Track {
                id: track.id,
                uri: track.uri,
            })
            .collect())
    }

    /// First page of playlist search results only.
    async fn search_playlists(&self, query: &str) -> Result<Vec<PlaylistRef>, SpotifyApiError> {
        let url = self.endpoints.search_playlists(query);
        let body = self.executor.perform_request(ApiRequest::get(url.clone())).await?;
        let search: SpotifyPlaylistSearch = decode(&url, body)?;

        Ok(search
            .playlists
            .items
            .into_iter()
            .flatten()
            .map(PlaylistRef::from)
            .collect())
    }
}
