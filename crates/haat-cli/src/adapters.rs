//! Terminal stand-ins for browser capabilities.
//!
//! The CLI has no microphone or router: a recording is read from an audio
//! file, and navigation prints the destination.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use colored::Colorize;
use haat_core::capture::{AudioCapture, CaptureDevice, CaptureStream, LevelMeter};
use haat_core::error::{HaatError, Result};
use haat_core::navigation::{NavigationTarget, Navigator};
use haat_core::search::ImageBlob;
use tokio::sync::mpsc;

const CHUNK_SIZE: usize = 16 * 1024;
const METER_BINS: usize = 64;

/// Prints navigations instead of routing.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    last: Mutex<Option<NavigationTarget>>,
}

impl TerminalNavigator {
    pub fn last(&self) -> Option<NavigationTarget> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, target: NavigationTarget) {
        println!("{} {}", "→ navigate".bright_green(), format_target(&target));
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(target);
    }
}

/// Path plus query string, e.g. `/search?q=lamp&type=collection`.
pub fn format_target(target: &NavigationTarget) -> String {
    if target.query.is_empty() {
        return target.path.clone();
    }
    let query = target
        .query
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", target.path, query)
}

/// "Microphone" that plays back the audio file armed with [`arm`](Self::arm).
#[derive(Debug, Default)]
pub struct FileAudioCapture {
    armed: Mutex<Option<PathBuf>>,
}

impl FileAudioCapture {
    /// Selects the file the next recording reads from.
    pub fn arm(&self, path: impl Into<PathBuf>) {
        *self.armed.lock().unwrap_or_else(PoisonError::into_inner) = Some(path.into());
    }
}

#[async_trait]
impl AudioCapture for FileAudioCapture {
    async fn open(&self) -> Result<CaptureStream> {
        let path = self
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| HaatError::permission_denied("no audio input selected"))?;

        // An unreadable input behaves like a refused microphone.
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            HaatError::permission_denied(format!("cannot read {}: {}", path.display(), e))
        })?;

        let chunks: Vec<Vec<u8>> = bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let (tx, rx) = mpsc::channel(chunks.len().max(1));
        for chunk in chunks {
            tx.try_send(chunk)
                .map_err(|e| HaatError::internal(format!("audio buffer rejected chunk: {}", e)))?;
        }

        let meter = FileLevelMeter {
            bins: bytes.iter().take(METER_BINS).copied().collect(),
        };

        Ok(CaptureStream {
            mime_type: audio_mime_type(&path),
            chunks: rx,
            meter: Arc::new(meter),
            device: Box::new(FileDevice { sender: Some(tx) }),
        })
    }
}

struct FileLevelMeter {
    bins: Vec<u8>,
}

impl LevelMeter for FileLevelMeter {
    fn frequency_data(&self) -> Vec<u8> {
        self.bins.clone()
    }
}

struct FileDevice {
    sender: Option<mpsc::Sender<Vec<u8>>>,
}

impl CaptureDevice for FileDevice {
    fn release(&mut self) {
        self.sender.take();
    }
}

fn audio_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::AUDIO)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "audio/webm".to_string())
}

/// Reads an image for photo or QR search.
pub async fn read_image(path: &Path) -> Result<ImageBlob> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| HaatError::io(format!("cannot read {}: {}", path.display(), e)))?;
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ImageBlob {
        file_name,
        mime_type,
        bytes,
    })
}
