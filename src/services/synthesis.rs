use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::ports::progress::{Phase, ProgressObserver};
use crate::ports::spotify::{CurrentUser, PlaylistRef, SpotifyClient, Track};
use crate::services::podcasts::PodcastLocator;
use crate::services::provisioner::{
    DEFAULT_PLAYLIST_DESCRIPTION, PlaylistProvisioner, ProvisionOutcome,
};
use crate::spotify_rs::error::SpotifyApiError;

/// Largest `limit` the recommendations endpoint accepts
pub const MAX_RECOMMENDATIONS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequest {
    #[error("Playlist name must not be empty")]
    EmptyName,
    #[error("At least one block is required")]
    NoBlocks,
    #[error("Block size must be at least 2, got {0}")]
    BlockTooSmall(usize),
    #[error("Block size must be at most {max}, got {got}")]
    BlockTooLarge { got: usize, max: usize },
}

/// What to build: `block_count` blocks of `block_size` tracks each, written to
/// the user's playlist called `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    name: String,
    block_count: usize,
    block_size: usize,
    include_episodes: bool,
}

impl SynthesisRequest {
    pub fn new(
        name: impl Into<String>,
        block_count: usize,
        block_size: usize,
        include_episodes: bool,
    ) -> Result<Self, InvalidRequest> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidRequest::EmptyName);
        }
        if block_count == 0 {
            return Err(InvalidRequest::NoBlocks);
        }
        if block_size < 2 {
            return Err(InvalidRequest::BlockTooSmall(block_size));
        }
        if block_size - 1 > MAX_RECOMMENDATIONS {
            return Err(InvalidRequest::BlockTooLarge {
                got: block_size,
                max: MAX_RECOMMENDATIONS + 1,
            });
        }

        Ok(Self {
            name,
            block_count,
            block_size,
            include_episodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn include_episodes(&self) -> bool {
        self.include_episodes
    }

    /// Every block is its seed plus this many recommendations
    pub fn recommendations_per_block(&self) -> usize {
        self.block_size - 1
    }
}

/// How many recommendation requests may be in flight at once. Blocks are
/// always assembled in seed order whatever the setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutPolicy {
    max_in_flight: NonZeroUsize,
}

impl FanOutPolicy {
    pub const SEQUENTIAL: FanOutPolicy = FanOutPolicy {
        max_in_flight: NonZeroUsize::MIN,
    };

    pub fn bounded(max_in_flight: NonZeroUsize) -> Self {
        Self { max_in_flight }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.get()
    }
}

impl Default for FanOutPolicy {
    fn default() -> Self {
        Self::SEQUENTIAL
    }
}

#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    pub fan_out: FanOutPolicy,
    /// Fixed seed for the track shuffle, random when unset
    pub shuffle_seed: Option<u64>,
    pub playlist_description: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            fan_out: FanOutPolicy::default(),
            shuffle_seed: None,
            playlist_description: DEFAULT_PLAYLIST_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Added { count: usize },
    /// There was nothing to add, no request was sent
    Skipped,
    Failed,
}

/// Result of a run that got as far as committing.
#[derive(Debug, Clone)]
pub struct SynthesisReport {
    pub playlist: PlaylistRef,
    pub provisioning: ProvisionOutcome,
    pub saved_track_count: usize,
    pub seed_count: usize,
    pub episode_count: usize,
    /// The sequence sent to the playlist, in order
    pub uris: Vec<String>,
    pub commit: CommitOutcome,
}

/// Reasons a run stops before committing anything.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Failed to fetch user info: {0}")]
    FetchUser(SpotifyApiError),
    #[error("Failed to create playlist: {0}")]
    CreatePlaylist(SpotifyApiError),
    #[error("Failed to fetch saved tracks: {0}")]
    GetTracks(SpotifyApiError),
    #[error("Failed to fetch recommendations for track {track_id}: {error}")]
    GetRecommendations {
        track_id: String,
        error: SpotifyApiError,
    },
}

/// Shuffles the whole collection and keeps the first `count` tracks.
pub fn sample_seeds<R: Rng + ?Sized>(mut tracks: Vec<Track>, count: usize, rng: &mut R) -> Vec<Track> {
    tracks.shuffle(rng);
    tracks.truncate(count);
    tracks
}

/// Optional episode, then the seed, then its recommendations in server order.
pub fn assemble_block(episode: Option<String>, seed: &Track, recommended: Vec<Track>) -> Vec<String> {
    let mut block = Vec::with_capacity(recommended.len() + 2);
    block.extend(episode);
    block.push(seed.uri.clone());
    block.extend(recommended.into_iter().map(|track| track.uri));
    block
}

pub fn flatten(blocks: Vec<Vec<String>>) -> Vec<String> {
    blocks.into_iter().flatten().collect()
}

/// Builds the daily mix and writes it to the user's playlist.
pub struct Synthesizer<C: SpotifyClient> {
    client: C,
    observer: Arc<dyn ProgressObserver>,
    options: SynthesisOptions,
}

impl<C: SpotifyClient> Synthesizer<C> {
    pub fn new(client: C, observer: Arc<dyn ProgressObserver>, options: SynthesisOptions) -> Self {
        Self {
            client,
            observer,
            options,
        }
    }

    /// Runs every phase in order. User lookup, playlist creation, the saved
    /// tracks listing and any recommendation request are fatal; everything else
    /// is reported to the observer and the run carries on.
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisReport, SynthesisError> {
        let observer = self.observer.as_ref();
        log::info!(
            "Building '{}': {} blocks of {} tracks{}",
            request.name(),
            request.block_count(),
            request.block_size(),
            if request.include_episodes() {
                " with podcasts"
            } else {
                ""
            }
        );

        let user = self.fetch_user().await?;

        let provisioned = PlaylistProvisioner::new(&self.client, observer)
            .with_description(&self.options.playlist_description)
            .ensure_empty_playlist(&user.id, request.name())
            .await
            .map_err(SynthesisError::CreatePlaylist)?;

        let (saved_track_count, seeds) = self.pick_seed_tracks(request.block_count()).await?;

        let mut episodes: VecDeque<String> = if request.include_episodes() {
            PodcastLocator::new(&self.client, observer)
                .find_episode_uris()
                .await
                .unwrap_or_default()
                .into()
        } else {
            observer.skip(Phase::GetEpisodePodcasts);
            VecDeque::new()
        };
        let episode_count = episodes.len();

        let mut blocks = self
            .build_blocks(&seeds, request.recommendations_per_block(), &mut episodes)
            .await?;

        // More episodes than seeds, the rest go at the very end
        if !episodes.is_empty() {
            log::debug!("Appending {} leftover episodes", episodes.len());
            blocks.push(episodes.into_iter().collect());
        }

        let uris = flatten(blocks);
        let commit = self.commit(&provisioned.playlist, &uris).await;

        Ok(SynthesisReport {
            playlist: provisioned.playlist,
            provisioning: provisioned.outcome,
            saved_track_count,
            seed_count: seeds.len(),
            episode_count,
            uris,
            commit,
        })
    }

    async fn fetch_user(&self) -> Result<CurrentUser, SynthesisError> {
        self.observer.start(Phase::FetchUser);
        match self.client.current_user().await {
            Ok(user) => {
                self.observer.complete(Phase::FetchUser, None);
                Ok(user)
            }
            Err(error) => {
                self.observer.fail(Phase::FetchUser, "GET /me", &error);
                Err(SynthesisError::FetchUser(error))
            }
        }
    }

    async fn pick_seed_tracks(&self, count: usize) -> Result<(usize, Vec<Track>), SynthesisError> {
        self.observer.start(Phase::GetTracks);
        let tracks = match self.client.saved_tracks().await {
            Ok(tracks) => tracks,
            Err(error) => {
                self.observer.fail(Phase::GetTracks, "GET /me/tracks", &error);
                return Err(SynthesisError::GetTracks(error));
            }
        };

        let total = tracks.len();
        let seeds = sample_seeds(tracks, count, &mut self.rng());

        let detail = format!(
            "Found {} tracks, picked {} random tracks.",
            total,
            seeds.len()
        );
        self.observer.complete(Phase::GetTracks, Some(&detail));
        Ok((total, seeds))
    }

    fn rng(&self) -> StdRng {
        match self.options.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// One block per seed, in seed order. Episodes are handed out front to back.
    async fn build_blocks(
        &self,
        seeds: &[Track],
        limit: usize,
        episodes: &mut VecDeque<String>,
    ) -> Result<Vec<Vec<String>>, SynthesisError> {
        self.observer.start(Phase::GetRecommendations);

        // `buffered` yields results in input order
        let fetched: Result<Vec<Vec<Track>>, SynthesisError> = stream::iter(seeds)
            .map(|seed| async move {
                self.client
                    .recommendations(&seed.id, limit)
                    .await
                    .map_err(|error| SynthesisError::GetRecommendations {
                        track_id: seed.id.clone(),
                        error,
                    })
            })
            .buffered(self.options.fan_out.max_in_flight())
            .try_collect()
            .await;

        let recommendations = match fetched {
            Ok(recommendations) => recommendations,
            Err(error) => {
                self.observer
                    .fail(Phase::GetRecommendations, "GET /recommendations", &error);
                return Err(error);
            }
        };

        let blocks = seeds
            .iter()
            .zip(recommendations)
            .map(|(seed, recommended)| assemble_block(episodes.pop_front(), seed, recommended))
            .collect();

        self.observer.complete(Phase::GetRecommendations, None);
        Ok(blocks)
    }

    async fn commit(&self, playlist: &PlaylistRef, uris: &[String]) -> CommitOutcome {
        if uris.is_empty() {
            log::info!("Nothing to add to '{}'", playlist.name);
            self.observer.skip(Phase::AddTracks);
            return CommitOutcome::Skipped;
        }

        self.observer.start(Phase::AddTracks);
        match self.client.add_tracks(&playlist.id, uris).await {
            Ok(()) => {
                let detail = format!("Added {} items.", uris.len());
                self.observer.complete(Phase::AddTracks, Some(&detail));
                CommitOutcome::Added { count: uris.len() }
            }
            Err(error) => {
                self.observer.fail(
                    Phase::AddTracks,
                    &format!("POST /playlists/{}/tracks", playlist.id),
                    &error,
                );
                CommitOutcome::Failed
            }
        }
    }
}
