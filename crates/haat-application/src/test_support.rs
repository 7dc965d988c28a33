//! Test doubles shared by the application-layer tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use haat_core::capture::{AudioCapture, CaptureDevice, CaptureStream, LevelMeter, Transcriber};
use haat_core::error::{HaatError, Result};
use haat_core::navigation::{NavigationTarget, Navigator};
use haat_core::search::{
    AudioBlob, Filters, ImageBlob, QueryAnalysis, ResultKind, SearchBackend, SearchResult,
    SuggestionItem, VoiceLanguage,
};
use tokio::sync::{mpsc, oneshot};

/// Holds completions back until the test releases them by key.
struct Gate<T> {
    enabled: AtomicBool,
    pending: Mutex<HashMap<String, oneshot::Sender<T>>>,
}

impl<T> Gate<T> {
    fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            pending: Mutex::new(HashMap::new()),
        }
    }

    async fn pass(&self, key: &str, default: impl FnOnce() -> T) -> T {
        if !self.enabled.load(Ordering::SeqCst) {
            return default();
        }
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(key.to_string(), tx);
        match rx.await {
            Ok(value) => value,
            Err(_) => default(),
        }
    }

    fn release(&self, key: &str, value: T) {
        let tx = self
            .pending
            .lock()
            .unwrap()
            .remove(key)
            .unwrap_or_else(|| panic!("nothing pending for {key:?}"));
        let _ = tx.send(value);
    }

    fn has_pending(&self, key: &str) -> bool {
        self.pending.lock().unwrap().contains_key(key)
    }
}

/// Scriptable in-memory backend that logs every call.
pub struct MockBackend {
    calls: Mutex<Vec<String>>,
    results: Mutex<Vec<SearchResult>>,
    recommendations: Mutex<Vec<SearchResult>>,
    fail_suggestions: AtomicBool,
    fail_searches: AtomicBool,
    suggestion_gate: Gate<Result<Vec<SuggestionItem>>>,
    search_gate: Gate<Result<Vec<SearchResult>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            results: Mutex::new(vec![
                SearchResult::new("p-1", ResultKind::Product, "Cotton Saree"),
                SearchResult::new("v-1", ResultKind::Vendor, "Dhaka Looms"),
            ]),
            recommendations: Mutex::new(Vec::new()),
            fail_suggestions: AtomicBool::new(false),
            fail_searches: AtomicBool::new(false),
            suggestion_gate: Gate::new(),
            search_gate: Gate::new(),
        }
    }

    pub fn with_recommendations(self, results: Vec<SearchResult>) -> Self {
        *self.recommendations.lock().unwrap() = results;
        self
    }

    pub fn failing_suggestions(self) -> Self {
        self.fail_suggestions.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_searches(self) -> Self {
        self.fail_searches.store(true, Ordering::SeqCst);
        self
    }

    /// Suggestion calls wait for [`release_suggestions`](Self::release_suggestions).
    pub fn gated_suggestions(self) -> Self {
        self.suggestion_gate.enabled.store(true, Ordering::SeqCst);
        self
    }

    /// Search calls wait for [`release_search`](Self::release_search).
    pub fn gated_searches(self) -> Self {
        self.search_gate.enabled.store(true, Ordering::SeqCst);
        self
    }

    pub fn release_suggestions(&self, text: &str, items: Vec<SuggestionItem>) {
        self.suggestion_gate.release(text, Ok(items));
    }

    pub fn release_search(&self, query: &str, results: Vec<SearchResult>) {
        self.search_gate.release(query, Ok(results));
    }

    pub fn has_pending_suggestions(&self, text: &str) -> bool {
        self.suggestion_gate.has_pending(text)
    }

    pub fn has_pending_search(&self, query: &str) -> bool {
        self.search_gate.has_pending(query)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than the mount-time recommendations fetch.
    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c != "recommendations")
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn unavailable(operation: &str) -> HaatError {
        HaatError::backend(operation, "connection refused")
    }

    async fn search(&self, operation: &str, key: &str) -> Result<Vec<SearchResult>> {
        if self.fail_searches.load(Ordering::SeqCst) {
            return Err(Self::unavailable(operation));
        }
        let results = self.results.lock().unwrap().clone();
        self.search_gate.pass(key, || Ok(results)).await
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn fetch_suggestions(&self, text: &str) -> Result<Vec<SuggestionItem>> {
        self.record(format!("suggestions:{text}"));
        if self.fail_suggestions.load(Ordering::SeqCst) {
            return Err(Self::unavailable("fetch_suggestions"));
        }
        self.suggestion_gate
            .pass(text, || Ok(vec![SuggestionItem::ai(format!("{text} ai"))]))
            .await
    }

    async fn analyze_query(&self, text: &str) -> Result<QueryAnalysis> {
        self.record(format!("analyze:{text}"));
        if self.fail_suggestions.load(Ordering::SeqCst) {
            return Err(Self::unavailable("analyze_query"));
        }
        Ok(QueryAnalysis {
            intent: Some("product_search".to_string()),
            refinements: vec![format!("{text} refined")],
            ..Default::default()
        })
    }

    async fn search_with_text(&self, text: &str, _filters: &Filters) -> Result<Vec<SearchResult>> {
        self.record(format!("text:{text}"));
        self.search("search_with_text", text).await
    }

    async fn search_conversational(
        &self,
        text: &str,
        _filters: &Filters,
    ) -> Result<Vec<SearchResult>> {
        self.record(format!("conversational:{text}"));
        self.search("search_conversational", text).await
    }

    async fn search_by_voice(
        &self,
        audio: &AudioBlob,
        language: VoiceLanguage,
    ) -> Result<Vec<SearchResult>> {
        self.record(format!("voice:{language}:{}", audio.bytes.len()));
        self.search("search_by_voice", "voice").await
    }

    async fn search_by_image(&self, image: &ImageBlob) -> Result<Vec<SearchResult>> {
        self.record(format!("image:{}", image.file_name));
        self.search("search_by_image", &image.file_name).await
    }

    async fn get_personalized_recommendations(&self) -> Result<Vec<SearchResult>> {
        self.record("recommendations".to_string());
        Ok(self.recommendations.lock().unwrap().clone())
    }
}

/// Records every navigation instead of performing it.
#[derive(Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn targets(&self) -> Vec<NavigationTarget> {
        self.targets.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.targets().into_iter().map(|t| t.path).collect()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: NavigationTarget) {
        self.targets.lock().unwrap().push(target);
    }
}

struct StaticMeter(Vec<u8>);

impl LevelMeter for StaticMeter {
    fn frequency_data(&self) -> Vec<u8> {
        self.0.clone()
    }
}

struct FakeDevice {
    releases: Arc<AtomicUsize>,
    /// Dropped on release so the chunk stream closes like a stopped recorder.
    sender: Option<mpsc::Sender<Vec<u8>>>,
    /// Sent from a separate task after release, like a recorder's last
    /// data event.
    final_chunk: Option<Vec<u8>>,
    /// Set when the sender must outlive the device.
    keep_open: Option<Arc<Mutex<Vec<mpsc::Sender<Vec<u8>>>>>>,
}

impl CaptureDevice for FakeDevice {
    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        let Some(sender) = self.sender.take() else {
            return;
        };
        if let Some(open) = &self.keep_open {
            open.lock().unwrap().push(sender);
        } else if let Some(chunk) = self.final_chunk.take() {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                let _ = sender.send(chunk).await;
            });
        }
    }
}

/// Microphone that replays pre-recorded chunks.
pub struct FakeAudioCapture {
    chunks: Vec<Vec<u8>>,
    final_chunk: Option<Vec<u8>>,
    keep_open: bool,
    open_streams: Arc<Mutex<Vec<mpsc::Sender<Vec<u8>>>>>,
    level: Vec<u8>,
    denied: bool,
    pub opens: AtomicUsize,
    pub releases: Arc<AtomicUsize>,
}

impl FakeAudioCapture {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            final_chunk: None,
            keep_open: false,
            open_streams: Arc::new(Mutex::new(Vec::new())),
            level: Vec::new(),
            denied: false,
            opens: AtomicUsize::new(0),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_level(mut self, level: Vec<u8>) -> Self {
        self.level = level;
        self
    }

    pub fn with_final_chunk(mut self, chunk: Vec<u8>) -> Self {
        self.final_chunk = Some(chunk);
        self
    }

    /// The device never closes its stream after release.
    pub fn keeping_stream_open(mut self) -> Self {
        self.keep_open = true;
        self
    }
}

#[async_trait]
impl AudioCapture for FakeAudioCapture {
    async fn open(&self) -> Result<CaptureStream> {
        if self.denied {
            return Err(HaatError::permission_denied("microphone access was denied"));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(self.chunks.len().max(1));
        for chunk in &self.chunks {
            tx.try_send(chunk.clone()).unwrap();
        }

        Ok(CaptureStream {
            mime_type: "audio/webm".to_string(),
            chunks: rx,
            meter: Arc::new(StaticMeter(self.level.clone())),
            device: Box::new(FakeDevice {
                releases: Arc::clone(&self.releases),
                sender: Some(tx),
                final_chunk: self.final_chunk.clone(),
                keep_open: self.keep_open.then(|| Arc::clone(&self.open_streams)),
            }),
        })
    }
}

/// Recognizer that emits a fixed list of interim transcripts.
pub struct FakeTranscriber {
    lines: Vec<String>,
    pub language: Mutex<Option<VoiceLanguage>>,
}

impl FakeTranscriber {
    pub fn new(lines: Vec<&str>) -> Self {
        Self {
            lines: lines.into_iter().map(String::from).collect(),
            language: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn start(&self, language: VoiceLanguage) -> Result<mpsc::Receiver<String>> {
        *self.language.lock().unwrap() = Some(language);
        let (tx, rx) = mpsc::channel(self.lines.len().max(1));
        for line in &self.lines {
            tx.try_send(line.clone()).unwrap();
        }
        Ok(rx)
    }
}
