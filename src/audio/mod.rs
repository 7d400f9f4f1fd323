//! Audio decoding and transcoding

pub mod decoder;
pub mod transcode;

pub use decoder::decode;
pub use transcode::{FfmpegTranscoder, Transcoder};
