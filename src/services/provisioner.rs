use crate::ports::progress::{Phase, ProgressObserver};
use crate::ports::spotify::{NewPlaylist, PlaylistRef, SpotifyClient};
use crate::spotify_rs::error::SpotifyApiError;

pub const DEFAULT_PLAYLIST_DESCRIPTION: &str = "Autogenerated playlist by Random Daily Drive";

/// How the destination playlist was made ready for new tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// No playlist with that owner and name existed, a new one was created
    Created,
    /// An existing playlist was found and its items removed
    Emptied { removed: usize },
    /// An existing playlist was found and had nothing in it
    AlreadyEmpty,
    /// An existing playlist was found but listing or removing its items failed.
    /// The playlist may still contain old items.
    EmptyingFailed,
}

impl ProvisionOutcome {
    pub fn may_contain_old_items(&self) -> bool {
        matches!(self, ProvisionOutcome::EmptyingFailed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedPlaylist {
    pub playlist: PlaylistRef,
    pub outcome: ProvisionOutcome,
}

/// Finds the user's playlist with a given name, or creates it, and empties it.
pub struct PlaylistProvisioner<'a, C: ?Sized> {
    client: &'a C,
    observer: &'a dyn ProgressObserver,
    description: &'a str,
}

impl<'a, C: SpotifyClient + ?Sized> PlaylistProvisioner<'a, C> {
    pub fn new(client: &'a C, observer: &'a dyn ProgressObserver) -> Self {
        Self {
            client,
            observer,
            description: DEFAULT_PLAYLIST_DESCRIPTION,
        }
    }

    /// Description given to playlists this provisioner creates
    pub fn with_description(mut self, description: &'a str) -> Self {
        self.description = description;
        self
    }

    /// Returns a playlist owned by `user_id` and named exactly `name` that is
    /// ready to receive tracks.
    ///
    /// Only a failure to create the playlist is returned as an error. Failing to
    /// list the user's playlists is treated as "no such playlist", and failing to
    /// empty an existing one is reported through
    /// [`ProvisionOutcome::EmptyingFailed`].
    pub async fn ensure_empty_playlist(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<ProvisionedPlaylist, SpotifyApiError> {
        match self.find_existing(user_id, name).await {
            Some(playlist) => {
                log::info!("Reusing playlist '{}' ({})", playlist.name, playlist.id);
                self.observer.skip(Phase::CreateEmptyPlaylist);
                let outcome = self.empty(&playlist.id).await;
                Ok(ProvisionedPlaylist { playlist, outcome })
            }
            None => {
                self.observer.skip(Phase::EmptyExistingPlaylist);
                let playlist = self.create(user_id, name).await?;
                log::info!("Created playlist '{}' ({})", playlist.name, playlist.id);
                Ok(ProvisionedPlaylist {
                    playlist,
                    outcome: ProvisionOutcome::Created,
                })
            }
        }
    }

    async fn find_existing(&self, user_id: &str, name: &str) -> Option<PlaylistRef> {
        self.observer.start(Phase::GetExistingPlaylist);
        match self.client.saved_playlists().await {
            Ok(playlists) => {
                self.observer.complete(Phase::GetExistingPlaylist, None);
                playlists
                    .into_iter()
                    .find(|playlist| playlist.is_same_logical_playlist(user_id, name))
            }
            Err(error) => {
                log::warn!("Failed to list saved playlists, creating a new one: {}", error);
                self.observer
                    .fail(Phase::GetExistingPlaylist, "GET /me/playlists", &error);
                None
            }
        }
    }

    async fn empty(&self, playlist_id: &str) -> ProvisionOutcome {
        self.observer.start(Phase::EmptyExistingPlaylist);

        let uris = match self.client.playlist_track_uris(playlist_id).await {
            Ok(uris) => uris,
            Err(error) => {
                self.observer.fail(
                    Phase::EmptyExistingPlaylist,
                    &format!("GET /playlists/{}/tracks", playlist_id),
                    &error,
                );
                return ProvisionOutcome::EmptyingFailed;
            }
        };

        if uris.is_empty() {
            self.observer.skip(Phase::EmptyExistingPlaylist);
            return ProvisionOutcome::AlreadyEmpty;
        }

        match self.client.remove_tracks(playlist_id, &uris).await {
            Ok(()) => {
                let detail = format!("Removed {} items.", uris.len());
                self.observer
                    .complete(Phase::EmptyExistingPlaylist, Some(&detail));
                ProvisionOutcome::Emptied {
                    removed: uris.len(),
                }
            }
            Err(error) => {
                log::warn!(
                    "Failed to empty playlist {}, it may keep old items: {}",
                    playlist_id,
                    error
                );
                self.observer.fail(
                    Phase::EmptyExistingPlaylist,
                    &format!("DELETE /playlists/{}/tracks", playlist_id),
                    &error,
                );
                ProvisionOutcome::EmptyingFailed
            }
        }
    }

    async fn create(&self, user_id: &str, name: &str) -> Result<PlaylistRef, SpotifyApiError> {
        self.observer.start(Phase::CreateEmptyPlaylist);
        let new_playlist = NewPlaylist::private(name, self.description);

        match self.client.create_playlist(user_id, &new_playlist).await {
            Ok(playlist) => {
                self.observer.complete(Phase::CreateEmptyPlaylist, None);
                Ok(playlist)
            }
            Err(error) => {
                self.observer.fail(
                    Phase::CreateEmptyPlaylist,
                    &format!("POST /users/{}/playlists", user_id),
                    &error,
                );
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::ports::spotify::MockSpotifyClient;
    use crate::test_utils::{ProgressEvent, RecordingObserver, playlist};

    #[tokio::test]
    async fn test_creates_private_playlist_when_no_exact_match() {
        let mut client = MockSpotifyClient::new();
        client.expect_saved_playlists().times(1).returning(|| {
            Ok(vec![
                playlist("p1", "someone-else", "Daily"),
                playlist("p2", "me", "daily"),
                playlist("p3", "me", "Daily "),
            ])
        });
        client
            .expect_create_playlist()
            .withf(|user_id, new_playlist| {
                user_id == "me"
                    && *new_playlist
                        == NewPlaylist::private("Daily", DEFAULT_PLAYLIST_DESCRIPTION)
            })
            .times(1)
            .returning(|_, _| Ok(playlist("new", "me", "Daily")));

        let observer = RecordingObserver::default();
        let provisioner = PlaylistProvisioner::new(&client, &observer);
        let provisioned = provisioner.ensure_empty_playlist("me", "Daily").await.unwrap();

        assert_eq!(provisioned.playlist.id, "new");
        assert_eq!(provisioned.outcome, ProvisionOutcome::Created);
        assert_eq!(
            observer.events(),
            vec![
                ProgressEvent::Start(Phase::GetExistingPlaylist),
                ProgressEvent::Complete(Phase::GetExistingPlaylist, None),
                ProgressEvent::Skip(Phase::EmptyExistingPlaylist),
                ProgressEvent::Start(Phase::CreateEmptyPlaylist),
                ProgressEvent::Complete(Phase::CreateEmptyPlaylist, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_custom_description() {
        let mut client = MockSpotifyClient::new();
        client.expect_saved_playlists().returning(|| Ok(vec![]));
        client
            .expect_create_playlist()
            .withf(|_, new_playlist| new_playlist.description == "made by hand")
            .times(1)
            .returning(|_, _| Ok(playlist("new", "me", "Daily")));

        let observer = RecordingObserver::default();
        let provisioned = PlaylistProvisioner::new(&client, &observer)
            .with_description("made by hand")
            .ensure_empty_playlist("me", "Daily")
            .await
            .unwrap();

        assert_eq!(provisioned.outcome, ProvisionOutcome::Created);
    }

    #[tokio::test]
    async fn test_empties_first_matching_playlist() {
        let mut client = MockSpotifyClient::new();
        client.expect_saved_playlists().returning(|| {
            Ok(vec![
                playlist("p1", "me", "Daily"),
                playlist("p2", "me", "Daily"),
            ])
        });
        client
            .expect_playlist_track_uris()
            .withf(|id| id == "p1")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    "spotify:track:a".to_string(),
                    "spotify:episode:b".to_string(),
                ])
            });
        client
            .expect_remove_tracks()
            .withf(|id, uris| {
                id == "p1" && uris == ["spotify:track:a".to_string(), "spotify:episode:b".to_string()]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let observer = RecordingObserver::default();
        let provisioned = PlaylistProvisioner::new(&client, &observer)
            .ensure_empty_playlist("me", "Daily")
            .await
            .unwrap();

        assert_eq!(provisioned.playlist, playlist("p1", "me", "Daily"));
        assert_eq!(provisioned.outcome, ProvisionOutcome::Emptied { removed: 2 });
        assert!(observer.skipped(Phase::CreateEmptyPlaylist));
        assert_eq!(
            observer.events_for(Phase::EmptyExistingPlaylist),
            vec![
                ProgressEvent::Start(Phase::EmptyExistingPlaylist),
                ProgressEvent::Complete(
                    Phase::EmptyExistingPlaylist,
                    Some("Removed 2 items.".to_string())
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_already_empty_playlist_skips_removal() {
        let mut client = MockSpotifyClient::new();
        client
            .expect_saved_playlists()
            .returning(|| Ok(vec![playlist("p1", "me", "Daily")]));
        client
            .expect_playlist_track_uris()
            .returning(|_| Ok(vec![]));
        client.expect_remove_tracks().never();

        let observer = RecordingObserver::default();
        let provisioned = PlaylistProvisioner::new(&client, &observer)
            .ensure_empty_playlist("me", "Daily")
            .await
            .unwrap();

        assert_eq!(provisioned.outcome, ProvisionOutcome::AlreadyEmpty);
        assert!(observer.skipped(Phase::EmptyExistingPlaylist));
    }

    #[tokio::test]
    async fn test_failed_removal_is_not_fatal() {
        let mut client = MockSpotifyClient::new();
        client
            .expect_saved_playlists()
            .returning(|| Ok(vec![playlist("p1", "me", "Daily")]));
        client
            .expect_playlist_track_uris()
            .returning(|_| Ok(vec!["spotify:track:a".to_string()]));
        client
            .expect_remove_tracks()
            .returning(|_, _| Err(SpotifyApiError::http(403, "Forbidden")));

        let observer = RecordingObserver::default();
        let provisioned = PlaylistProvisioner::new(&client, &observer)
            .ensure_empty_playlist("me", "Daily")
            .await
            .unwrap();

        assert_eq!(provisioned.playlist.id, "p1");
        assert_eq!(provisioned.outcome, ProvisionOutcome::EmptyingFailed);
        assert!(provisioned.outcome.may_contain_old_items());
        assert!(observer.events().contains(&ProgressEvent::Fail(
            Phase::EmptyExistingPlaylist,
            "DELETE /playlists/p1/tracks".to_string(),
            "403: Forbidden".to_string(),
        )));
    }

    #[tokio::test]
    async fn test_failed_listing_of_existing_items_is_not_fatal() {
        let mut client = MockSpotifyClient::new();
        client
            .expect_saved_playlists()
            .returning(|| Ok(vec![playlist("p1", "me", "Daily")]));
        client
            .expect_playlist_track_uris()
            .returning(|_| Err(SpotifyApiError::http(500, "Server error")));
        client.expect_remove_tracks().never();

        let observer = RecordingObserver::default();
        let provisioned = PlaylistProvisioner::new(&client, &observer)
            .ensure_empty_playlist("me", "Daily")
            .await
            .unwrap();

        assert_eq!(provisioned.outcome, ProvisionOutcome::EmptyingFailed);
        assert!(observer.failed(Phase::EmptyExistingPlaylist));
    }

    #[tokio::test]
    async fn test_failed_lookup_falls_back_to_creating() {
        let mut client = MockSpotifyClient::new();
        client
            .expect_saved_playlists()
            .returning(|| Err(SpotifyApiError::http(503, "Service unavailable")));
        client
            .expect_create_playlist()
            .times(1)
            .returning(|_, _| Ok(playlist("new", "me", "Daily")));

        let observer = RecordingObserver::default();
        let provisioned = PlaylistProvisioner::new(&client, &observer)
            .ensure_empty_playlist("me", "Daily")
            .await
            .unwrap();

        assert_eq!(provisioned.outcome, ProvisionOutcome::Created);
        assert!(observer.failed(Phase::GetExistingPlaylist));
    }

    #[tokio::test]
    async fn test_failed_creation_is_an_error() {
        let mut client = MockSpotifyClient::new();
        client.expect_saved_playlists().returning(|| Ok(vec![]));
        client
            .expect_create_playlist()
            .returning(|_, _| Err(SpotifyApiError::http(400, "Missing required field: name")));

        let observer = RecordingObserver::default();
        let result = PlaylistProvisioner::new(&client, &observer)
            .ensure_empty_playlist("me", "Daily")
            .await;

        assert_eq!(result.unwrap_err().status(), Some(400));
        assert!(observer.failed(Phase::CreateEmptyPlaylist));
    }

    /// In-memory stand-in for the user's account, shared by the mock closures.
    #[derive(Default)]
    struct Account {
        playlists: Vec<PlaylistRef>,
        items: HashMap<String, Vec<String>>,
    }

    fn account_client(account: Arc<Mutex<Account>>) -> MockSpotifyClient {
        let mut client = MockSpotifyClient::new();

        let state = account.clone();
        client
            .expect_saved_playlists()
            .returning(move || Ok(state.lock().unwrap().playlists.clone()));

        let state = account.clone();
        client.expect_playlist_track_uris().returning(move |id| {
            Ok(state.lock().unwrap().items.get(id).cloned().unwrap_or_default())
        });

        let state = account.clone();
        client.expect_remove_tracks().returning(move |id, uris| {
            let mut account = state.lock().unwrap();
            if let Some(items) = account.items.get_mut(id) {
                items.retain(|item| !uris.contains(item));
            }
            Ok(())
        });

        let state = account;
        client
            .expect_create_playlist()
            .returning(move |user_id, new_playlist| {
                let mut account = state.lock().unwrap();
                let created = PlaylistRef {
                    id: format!("pl-{}", account.playlists.len() + 1),
                    owner_id: user_id.to_string(),
                    name: new_playlist.name.clone(),
                };
                account.playlists.push(created.clone());
                account.items.insert(created.id.clone(), vec![]);
                Ok(created)
            });

        client
    }

    #[tokio::test]
    async fn test_provisioning_twice_reuses_and_empties_the_same_playlist() {
        let account = Arc::new(Mutex::new(Account::default()));
        let client = account_client(account.clone());
        let observer = RecordingObserver::default();
        let provisioner = PlaylistProvisioner::new(&client, &observer);

        let first = provisioner.ensure_empty_playlist("me", "Daily").await.unwrap();
        assert_eq!(first.outcome, ProvisionOutcome::Created);

        // Something gets committed between the runs
        account.lock().unwrap().items.insert(
            first.playlist.id.clone(),
            vec!["spotify:track:a".into(), "spotify:track:b".into()],
        );

        let second = provisioner.ensure_empty_playlist("me", "Daily").await.unwrap();

        assert_eq!(second.playlist.id, first.playlist.id);
        assert_eq!(second.outcome, ProvisionOutcome::Emptied { removed: 2 });
        let account = account.lock().unwrap();
        assert_eq!(account.playlists.len(), 1);
        assert!(account.items[&first.playlist.id].is_empty());
    }
}
