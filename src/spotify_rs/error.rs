/// Failures surfaced by a single Spotify Web API call or a paginated listing.
#[derive(Debug, thiserror::Error)]
pub enum SpotifyApiError {
    #[error("Failed to send http request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Http { status: u16, message: Option<String> },
    #[error("Failed to parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Gave up paginating after {max_pages} pages")]
    PaginationLimitExceeded { max_pages: usize },
    #[error("Invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
impl SpotifyApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: Some(message.into()),
        }
    }

    /// Status code of a non-2xx response, if this error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
