pub mod progress;
pub mod spotify;
