//! Thin client for the parts of the Spotify Web API the mix needs.
//!
//! Docs:
//! https://developer.spotify.com/documentation/web-api

pub mod client;
pub mod endpoints;
pub mod error;
pub mod library;
pub mod pagination;
pub mod types;

pub use client::{AccessToken, SpotifyHttpClient};
pub use endpoints::Endpoints;
