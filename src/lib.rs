pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod runpod;

#[cfg(feature = "server")]
pub mod server;

pub use config::{Config, RunpodConfig};
pub use error::{ArtError, Result};
pub use models::*;
pub use runpod::{AdminClient, ImageClient, MediaGenerator, RunpodClient, VideoClient};
