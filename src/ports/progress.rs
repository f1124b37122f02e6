use std::fmt;

/// Named steps of a mix run, in the order they normally happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    FetchUser,
    GetExistingPlaylist,
    EmptyExistingPlaylist,
    CreateEmptyPlaylist,
    GetTracks,
    GetEpisodePodcasts,
    GetRecommendations,
    AddTracks,
}

impl Phase {
    #[cfg(test)]
    pub const ALL: [Phase; 8] = [
        Phase::FetchUser,
        Phase::GetExistingPlaylist,
        Phase::EmptyExistingPlaylist,
        Phase::CreateEmptyPlaylist,
        Phase::GetTracks,
        Phase::GetEpisodePodcasts,
        Phase::GetRecommendations,
        Phase::AddTracks,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Phase::FetchUser => "Fetching user info",
            Phase::GetExistingPlaylist => "Looking for existing playlist",
            Phase::EmptyExistingPlaylist => "Emptying existing playlist",
            Phase::CreateEmptyPlaylist => "Creating new playlist",
            Phase::GetTracks => "Fetching saved tracks",
            Phase::GetEpisodePodcasts => "Fetching Daily Drive podcasts",
            Phase::GetRecommendations => "Fetching recommendations",
            Phase::AddTracks => "Adding tracks to playlist",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Notification sink for phase progress. Purely a side channel: implementations
/// must not panic and nothing they do feeds back into the run.
pub trait ProgressObserver: Send + Sync {
    fn start(&self, phase: Phase);

    fn complete(&self, phase: Phase, detail: Option<&str>);

    fn skip(&self, phase: Phase);

    fn fail(&self, phase: Phase, context: &str, error: &(dyn std::error::Error + 'static));
}
