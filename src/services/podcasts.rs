use crate::ports::progress::{Phase, ProgressObserver};
use crate::ports::spotify::{PlaylistRef, SpotifyClient};
use crate::spotify_rs::error::SpotifyApiError;

/// Search query for the curated playlist mixing music and news podcasts
pub const DAILY_DRIVE_QUERY: &str = "\"Your Daily Drive\"";

/// Account that owns the curated playlists
pub const DAILY_DRIVE_OWNER: &str = "spotify";

/// Known display names of the curated playlist. Only these spellings are
/// recognized; in other locales the playlist is simply not found.
pub const DAILY_DRIVE_NAMES: [&str; 2] = ["Your Daily Drive", "Daily Drive"];

pub const EPISODE_URI_PREFIX: &str = "spotify:episode:";

pub fn is_episode_uri(uri: &str) -> bool {
    uri.starts_with(EPISODE_URI_PREFIX)
}

fn is_daily_drive(playlist: &PlaylistRef) -> bool {
    playlist.owner_id == DAILY_DRIVE_OWNER && DAILY_DRIVE_NAMES.contains(&playlist.name.as_str())
}

/// Best-effort lookup of the podcast episodes in the user's Daily Drive.
pub struct PodcastLocator<'a, C: ?Sized> {
    client: &'a C,
    observer: &'a dyn ProgressObserver,
}

impl<'a, C: SpotifyClient + ?Sized> PodcastLocator<'a, C> {
    pub fn new(client: &'a C, observer: &'a dyn ProgressObserver) -> Self {
        Self { client, observer }
    }

    /// Episode uris of the Daily Drive playlist, in playlist order.
    ///
    /// `None` when the playlist can't be found or anything goes wrong along the
    /// way. Never fails the caller.
    pub async fn find_episode_uris(&self) -> Option<Vec<String>> {
        self.observer.start(Phase::GetEpisodePodcasts);

        match self.locate().await {
            Ok(Some(episodes)) => {
                let detail = format!("Found {} episodes.", episodes.len());
                self.observer
                    .complete(Phase::GetEpisodePodcasts, Some(&detail));
                Some(episodes)
            }
            Ok(None) => {
                log::warn!("Your Daily Drive could not be found. Skipping including podcasts.");
                self.observer.complete(
                    Phase::GetEpisodePodcasts,
                    Some("Daily Drive playlist not found."),
                );
                None
            }
            Err(error) => {
                self.observer.fail(
                    Phase::GetEpisodePodcasts,
                    "search for Daily Drive playlist",
                    &error,
                );
                None
            }
        }
    }

    async fn locate(&self) -> Result<Option<Vec<String>>, SpotifyApiError> {
        let candidates = self.client.search_playlists(DAILY_DRIVE_QUERY).await?;
        let Some(daily_drive) = candidates.iter().find(|playlist| is_daily_drive(playlist)) else {
            return Ok(None);
        };
        log::debug!("Using Daily Drive playlist {}", daily_drive.id);

        let uris = self.client.playlist_track_uris(&daily_drive.id).await?;
        Ok(Some(uris.into_iter().filter(|uri| is_episode_uri(uri)).collect()))
    }
}
