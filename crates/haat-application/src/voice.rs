//! Voice capture session.
//!
//! A [`VoiceRecorder`] owns the microphone from `start` until `stop`, `cancel`
//! or drop. While active it collects encoded chunks, samples the level meter
//! for the UI, and optionally relays a live transcript. The meter and the
//! transcript never influence the recorded audio.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use haat_core::capture::{
    AudioCapture, CaptureDevice, CaptureStream, LevelMeter, Transcriber, mean_level,
};
use haat_core::error::Result;
use haat_core::search::{AudioBlob, VoiceLanguage};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lock;

/// How long `stop` waits for the device to flush its last chunk and close
/// the stream.
const FINAL_CHUNK_GRACE: Duration = Duration::from_secs(2);

pub struct VoiceRecorder {
    mime_type: String,
    /// `Some` while the hardware stream is held.
    device: Option<Box<dyn CaptureDevice>>,
    recorded: Arc<Mutex<Vec<Vec<u8>>>>,
    collector: Option<JoinHandle<()>>,
    cancel: CancellationToken,
    amplitude: watch::Receiver<u8>,
    transcript: watch::Receiver<String>,
}

impl VoiceRecorder {
    /// Opens the microphone and starts recording.
    ///
    /// Fails with `PermissionDenied` when access is refused; nothing is left
    /// running in that case.
    pub async fn start(
        capture: &dyn AudioCapture,
        transcriber: Option<Arc<dyn Transcriber>>,
        language: VoiceLanguage,
        meter_interval: Duration,
    ) -> Result<Self> {
        let CaptureStream {
            mime_type,
            chunks,
            meter,
            device,
        } = capture.open().await?;

        let cancel = CancellationToken::new();
        let recorded = Arc::new(Mutex::new(Vec::new()));

        let collector = tokio::spawn(collect_chunks(chunks, Arc::clone(&recorded)));
        let amplitude = spawn_level_meter(meter, meter_interval, cancel.clone());
        let transcript = spawn_transcript(transcriber, language, cancel.clone());

        tracing::debug!(%mime_type, %language, "Voice recording started");

        Ok(Self {
            mime_type,
            device: Some(device),
            recorded,
            collector: Some(collector),
            cancel,
            amplitude,
            transcript,
        })
    }

    pub fn is_active(&self) -> bool {
        self.device.is_some()
    }

    /// Live level readings (0–255) for the recording indicator.
    pub fn amplitude(&self) -> watch::Receiver<u8> {
        self.amplitude.clone()
    }

    /// Latest interim transcript, empty when no transcriber is running.
    pub fn transcript(&self) -> watch::Receiver<String> {
        self.transcript.clone()
    }

    /// Stops recording and returns the finished audio.
    ///
    /// Returns `None` when the recorder was already stopped; the device is
    /// released only by the first call. Chunks the device flushes after
    /// release are kept until it closes the stream.
    pub async fn stop(&mut self) -> Option<AudioBlob> {
        if !self.is_active() {
            return None;
        }
        self.release();

        if let Some(mut collector) = self.collector.take() {
            match tokio::time::timeout(FINAL_CHUNK_GRACE, &mut collector).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Voice chunk collector ended abnormally: {}", e),
                Err(_) => {
                    tracing::warn!("Audio stream still open after release; finalizing without it");
                    collector.abort();
                }
            }
        }

        let chunks = std::mem::take(&mut *lock(&self.recorded));
        let blob = AudioBlob {
            mime_type: self.mime_type.clone(),
            bytes: chunks.concat(),
        };
        tracing::debug!(bytes = blob.bytes.len(), "Voice recording finalized");
        Some(blob)
    }

    /// Stops recording and throws the audio away.
    pub fn cancel(&mut self) {
        self.release();
        if let Some(collector) = self.collector.take() {
            collector.abort();
        }
        lock(&self.recorded).clear();
    }

    /// Releases the hardware stream (once) and stops the helper loops.
    fn release(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
            tracing::debug!("Microphone released");
        }
        self.cancel.cancel();
    }
}

impl Drop for VoiceRecorder {
    fn drop(&mut self) {
        if self.is_active() {
            tracing::debug!("Voice recorder dropped while active; releasing microphone");
        }
        self.cancel();
    }
}

impl std::fmt::Debug for VoiceRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceRecorder")
            .field("mime_type", &self.mime_type)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// Runs until the device closes the stream; `cancel` aborts it instead.
async fn collect_chunks(
    mut chunks: mpsc::Receiver<Vec<u8>>,
    recorded: Arc<Mutex<Vec<Vec<u8>>>>,
) {
    while let Some(chunk) = chunks.recv().await {
        lock(&recorded).push(chunk);
    }
}

fn spawn_level_meter(
    meter: Arc<dyn LevelMeter>,
    interval: Duration,
    cancel: CancellationToken,
) -> watch::Receiver<u8> {
    let (level_tx, level_rx) = watch::channel(0u8);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let level = mean_level(&meter.frequency_data());
                    if level_tx.send(level).is_err() {
                        break;
                    }
                }
            }
        }
        let _ = level_tx.send(0);
    });

    level_rx
}

fn spawn_transcript(
    transcriber: Option<Arc<dyn Transcriber>>,
    language: VoiceLanguage,
    cancel: CancellationToken,
) -> watch::Receiver<String> {
    let (text_tx, text_rx) = watch::channel(String::new());

    if let Some(transcriber) = transcriber {
        tokio::spawn(async move {
            let mut interim = match transcriber.start(language).await {
                Ok(rx) => rx,
                Err(e) => {
                    tracing::warn!("Live transcription unavailable: {}", e);
                    return;
                }
            };
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    next = interim.recv() => match next {
                        Some(text) => {
                            let _ = text_tx.send(text);
                        }
                        None => break,
                    },
                }
            }
        });
    }

    text_rx
}
