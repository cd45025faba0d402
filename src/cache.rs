//! Compressed-audio cache: decides when a cache artifact must be
//! (re)encoded and drives the transcoder.

mod manager;
pub(crate) mod transcode;

pub use manager::{CacheManager, artifact_exists};
pub use transcode::FfmpegTranscoder;
