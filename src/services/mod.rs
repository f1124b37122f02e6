pub mod podcasts;
pub mod progress;
pub mod provisioner;
pub mod spotify;
pub mod synthesis;
