//! Capability traits for hardware-backed input channels.
//!
//! Microphone access and live speech recognition sit behind these traits so
//! the orchestration logic can run against fakes; real adapters are bound
//! only by the outermost application layer.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::search::VoiceLanguage;

/// Reads the current frequency-domain energy of a live audio stream.
pub trait LevelMeter: Send + Sync {
    /// One byte (0–255) per frequency bin, like an analyser node.
    fn frequency_data(&self) -> Vec<u8>;
}

/// The acquired hardware stream. Dropping it without `release` is a leak the
/// recorder guards against.
pub trait CaptureDevice: Send {
    /// Stops every track and tears down the processing graph.
    fn release(&mut self);
}

/// An open microphone stream.
pub struct CaptureStream {
    /// Container type of the recorded chunks, e.g. `audio/webm`.
    pub mime_type: String,
    /// Encoded audio chunks in recording order; closes when the device stops.
    pub chunks: mpsc::Receiver<Vec<u8>>,
    pub meter: std::sync::Arc<dyn LevelMeter>,
    pub device: Box<dyn CaptureDevice>,
}

impl std::fmt::Debug for CaptureStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureStream")
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// Grants access to the microphone.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Prompts for permission and opens the stream.
    ///
    /// Fails with `HaatError::PermissionDenied` when the user declines.
    async fn open(&self) -> Result<CaptureStream>;
}

/// Live speech-to-text running next to a recording.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Starts recognition; the receiver yields interim transcripts until the
    /// recognizer stops or the receiver is dropped.
    async fn start(&self, language: VoiceLanguage) -> Result<mpsc::Receiver<String>>;
}

/// Spoken commands recognized in the live transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceCommand {
    /// Stop recording and search now.
    Search,
    /// Stop recording and discard it.
    Cancel,
}

const SEARCH_WORDS: &[&str] = &["search", "search now", "খুঁজুন", "সার্চ"];
const CANCEL_WORDS: &[&str] = &["cancel", "stop", "বাতিল", "থামো"];

/// Looks for a command word at the end of an interim transcript.
pub fn detect_voice_command(transcript: &str) -> Option<VoiceCommand> {
    let normalized = transcript.trim().to_lowercase();
    let ends_with_any = |words: &[&str]| {
        words.iter().any(|w| {
            normalized == *w
                || normalized
                    .strip_suffix(w)
                    .is_some_and(|head| head.ends_with(char::is_whitespace))
        })
    };

    if ends_with_any(CANCEL_WORDS) {
        Some(VoiceCommand::Cancel)
    } else if ends_with_any(SEARCH_WORDS) {
        Some(VoiceCommand::Search)
    } else {
        None
    }
}

/// Mean of the frequency bins, the value shown by the level meter.
pub fn mean_level(bins: &[u8]) -> u8 {
    if bins.is_empty() {
        return 0;
    }
    let sum: u64 = bins.iter().map(|&b| u64::from(b)).sum();
    (sum / bins.len() as u64) as u8
}
