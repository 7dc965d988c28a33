#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use haat_core::config::RootConfig;
    use haat_core::navigation::{NavigationTable, PageNavigationEntry};
    use haat_core::search::{
        Filters, ImageBlob, InputChannel, ResultKind, SearchResult, SuggestionItem,
        SuggestionSource, VoiceLanguage,
    };
    use haat_core::visibility::{PointerEvent, Visibility};

    use crate::listeners::DocumentListeners;
    use crate::orchestrator::{DispatchOutcome, RendererEvent, SearchDeps, SearchOrchestrator};
    use crate::test_support::{FakeAudioCapture, MockBackend, RecordingNavigator};

    struct Harness {
        backend: Arc<MockBackend>,
        navigator: Arc<RecordingNavigator>,
        audio: Arc<FakeAudioCapture>,
        listeners: DocumentListeners,
        search: Arc<SearchOrchestrator>,
    }

    fn table() -> Arc<NavigationTable> {
        Arc::new(NavigationTable::new(
            [
                ("cart", "/cart"),
                ("my cart", "/cart"),
                ("checkout", "/checkout"),
                ("orders", "/orders"),
                ("track order", "/orders/track"),
                ("wishlist", "/wishlist"),
            ]
            .into_iter()
            .map(|(phrase, route)| PageNavigationEntry::new(phrase, route)),
        ))
    }

    fn deps(
        backend: &Arc<MockBackend>,
        navigator: &Arc<RecordingNavigator>,
        audio: &Arc<FakeAudioCapture>,
    ) -> SearchDeps {
        SearchDeps {
            backend: backend.clone(),
            navigator: navigator.clone(),
            audio: audio.clone(),
            transcriber: None,
            table: table(),
            config: RootConfig::default(),
        }
    }

    async fn mount_with(backend: MockBackend, audio: FakeAudioCapture) -> Harness {
        let backend = Arc::new(backend);
        let navigator = Arc::new(RecordingNavigator::default());
        let audio = Arc::new(audio);
        let listeners = DocumentListeners::new();
        let search = SearchOrchestrator::mount(
            deps(&backend, &navigator, &audio),
            "search-desktop",
            &listeners,
        )
        .await;

        Harness {
            backend,
            navigator,
            audio,
            listeners,
            search,
        }
    }

    async fn mount() -> Harness {
        mount_with(MockBackend::new(), FakeAudioCapture::new(vec![])).await
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..1_000 {
            if condition() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("condition never became true");
    }

    fn suggestion_texts(search: &SearchOrchestrator) -> Vec<String> {
        search
            .view()
            .suggestions
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    fn photo(name: &str) -> ImageBlob {
        ImageBlob {
            file_name: name.to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4E, 0x47],
        }
    }

    // ============================================================================
    // Suggestion pipeline
    // ============================================================================

    #[tokio::test]
    async fn test_typing_merges_page_ai_and_refinements() {
        let h = mount().await;

        h.search.on_query_change("my ca").await;

        let view = h.search.view();
        assert_eq!(view.phase, Visibility::ShowingSuggestions);
        assert_eq!(view.suggestions[0].source, SuggestionSource::Page);
        assert_eq!(
            suggestion_texts(&h.search),
            vec!["my cart", "my ca ai", "my ca refined"]
        );
    }

    #[tokio::test]
    async fn test_short_query_skips_analysis() {
        let h = mount().await;

        h.search.on_query_change("car").await;

        assert_eq!(h.backend.search_calls(), vec!["suggestions:car"]);
        assert_eq!(
            suggestion_texts(&h.search),
            vec!["cart", "my cart", "car ai"]
        );
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_page_suggestions() {
        let h = mount_with(
            MockBackend::new().failing_suggestions(),
            FakeAudioCapture::new(vec![]),
        )
        .await;

        h.search.on_query_change("orde").await;

        assert_eq!(suggestion_texts(&h.search), vec!["orders", "track order"]);
        assert_eq!(h.search.view().error, None);
    }

    #[tokio::test]
    async fn test_out_of_order_completions_apply_only_latest() {
        let h = mount_with(
            MockBackend::new().gated_suggestions(),
            FakeAudioCapture::new(vec![]),
        )
        .await;

        let mut pending = Vec::new();
        for text in ["s", "sa", "sar", "saree"] {
            let search = Arc::clone(&h.search);
            pending.push(tokio::spawn(async move { search.on_query_change(text).await }));
            wait_until(|| h.backend.has_pending_suggestions(text)).await;
        }

        for text in ["sar", "saree", "s", "sa"] {
            h.backend
                .release_suggestions(text, vec![SuggestionItem::ai(format!("{text} ai"))]);
        }
        for task in pending {
            task.await.unwrap();
        }

        assert_eq!(
            suggestion_texts(&h.search),
            vec!["saree ai", "saree refined"]
        );
        assert_eq!(h.search.view().query, "saree");
    }

    #[tokio::test]
    async fn test_blank_query_clears_and_discards_late_suggestions() {
        let h = mount_with(
            MockBackend::new().gated_suggestions(),
            FakeAudioCapture::new(vec![]),
        )
        .await;

        let search = Arc::clone(&h.search);
        let typing = tokio::spawn(async move { search.on_query_change("lamp").await });
        wait_until(|| h.backend.has_pending_suggestions("lamp")).await;

        h.search.on_query_change("   ").await;
        assert_eq!(h.search.view().phase, Visibility::Idle);

        h.backend
            .release_suggestions("lamp", vec![SuggestionItem::ai("lamp shade")]);
        typing.await.unwrap();

        let view = h.search.view();
        assert_eq!(view.phase, Visibility::Idle);
        assert!(view.suggestions.is_empty());
        assert!(!h.backend.calls().iter().any(|c| c.starts_with("suggestions: ")));
    }

    // ============================================================================
    // Intent dispatch
    // ============================================================================

    #[tokio::test]
    async fn test_exact_page_name_navigates_without_backend() {
        let h = mount().await;

        let outcome = h.search.submit("  My Cart ").await;

        assert_eq!(outcome, DispatchOutcome::Navigated("/cart".to_string()));
        assert_eq!(h.navigator.paths(), vec!["/cart"]);
        assert!(h.backend.search_calls().is_empty());
        assert_eq!(h.search.view().phase, Visibility::Idle);
    }

    #[tokio::test]
    async fn test_conversational_query_uses_conversational_endpoint() {
        let h = mount().await;

        let outcome = h.search.submit("Show me red sarees").await;

        assert_eq!(outcome, DispatchOutcome::Results(2));
        assert_eq!(
            h.backend.search_calls(),
            vec!["conversational:Show me red sarees"]
        );
        let view = h.search.view();
        assert_eq!(view.phase, Visibility::ShowingResults);
        assert_eq!(view.results.len(), 2);
        assert_eq!(view.history, vec!["Show me red sarees"]);
    }

    #[tokio::test]
    async fn test_keyword_query_uses_text_endpoint() {
        let h = mount().await;

        h.search.submit("jamdani").await;

        assert_eq!(h.backend.search_calls(), vec!["text:jamdani"]);
        assert_eq!(h.search.view().input_channel, InputChannel::Text);
    }

    #[tokio::test]
    async fn test_empty_submission_is_ignored() {
        let h = mount().await;

        assert_eq!(h.search.submit("  ").await, DispatchOutcome::Ignored);
        assert!(h.backend.search_calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_settles_with_error() {
        let h = mount_with(
            MockBackend::new().failing_searches(),
            FakeAudioCapture::new(vec![]),
        )
        .await;

        let outcome = h.search.submit("jamdani").await;

        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
        let view = h.search.view();
        assert_eq!(view.phase, Visibility::ShowingResults);
        assert!(view.results.is_empty());
        assert!(view.error.is_some());
    }

    #[tokio::test]
    async fn test_newer_submission_supersedes_older() {
        let h = mount_with(
            MockBackend::new().gated_searches(),
            FakeAudioCapture::new(vec![]),
        )
        .await;

        let search = Arc::clone(&h.search);
        let first = tokio::spawn(async move { search.submit("saree").await });
        wait_until(|| h.backend.has_pending_search("saree")).await;

        let search = Arc::clone(&h.search);
        let second = tokio::spawn(async move { search.submit("lungi").await });
        wait_until(|| h.backend.has_pending_search("lungi")).await;

        let lungi = SearchResult::new("p-9", ResultKind::Product, "Check Lungi");
        h.backend.release_search("lungi", vec![lungi.clone()]);
        assert_eq!(second.await.unwrap(), DispatchOutcome::Results(1));

        h.backend.release_search(
            "saree",
            vec![SearchResult::new("p-1", ResultKind::Product, "Cotton Saree")],
        );
        assert_eq!(first.await.unwrap(), DispatchOutcome::Superseded);

        let view = h.search.view();
        assert_eq!(view.results, vec![lungi]);
        assert_eq!(view.query, "lungi");
        assert_eq!(view.phase, Visibility::ShowingResults);
    }

    // ============================================================================
    // Voice, image and QR channels
    // ============================================================================

    #[tokio::test]
    async fn test_voice_recording_round_trip() {
        let h = mount_with(
            MockBackend::new(),
            FakeAudioCapture::new(vec![vec![1, 2], vec![3]]),
        )
        .await;
        h.search.set_voice_language(VoiceLanguage::Bn);

        h.search.start_recording().await.unwrap();
        let view = h.search.view();
        assert!(view.is_recording);
        assert!(!view.record_enabled);

        let again = h.search.start_recording().await.unwrap_err();
        assert!(matches!(again, haat_core::HaatError::RecordingInProgress));

        assert_eq!(h.search.stop_recording().await, DispatchOutcome::Results(2));
        assert_eq!(h.backend.search_calls(), vec!["voice:bn:3"]);
        assert_eq!(h.search.view().input_channel, InputChannel::Voice);
        assert!(!h.search.view().is_recording);

        assert_eq!(h.search.stop_recording().await, DispatchOutcome::Ignored);
        assert_eq!(h.audio.releases.load(Ordering::SeqCst), 1);
        assert_eq!(h.audio.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_recording_does_not_search() {
        let h = mount().await;

        h.search.start_recording().await.unwrap();
        assert_eq!(h.search.stop_recording().await, DispatchOutcome::Ignored);

        assert!(h.backend.search_calls().is_empty());
        assert_eq!(h.audio.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_microphone_sets_alert() {
        let h = mount_with(MockBackend::new(), FakeAudioCapture::denied()).await;

        let err = h.search.start_recording().await.unwrap_err();

        assert!(err.is_permission_denied());
        let view = h.search.view();
        assert!(view.alert.is_some());
        assert!(!view.is_recording);
        assert_eq!(h.search.stop_recording().await, DispatchOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_cancel_recording_discards_audio() {
        let h = mount_with(MockBackend::new(), FakeAudioCapture::new(vec![vec![7]])).await;

        h.search.start_recording().await.unwrap();
        h.search.cancel_recording().await;

        assert!(h.backend.search_calls().is_empty());
        assert_eq!(h.audio.releases.load(Ordering::SeqCst), 1);
        assert_eq!(h.search.stop_recording().await, DispatchOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_image_and_qr_skip_classification() {
        let h = mount().await;

        let outcome = h.search.on_image_selected(photo("cart.png")).await;
        assert_eq!(outcome, DispatchOutcome::Results(2));
        assert_eq!(h.search.view().input_channel, InputChannel::Image);

        h.search.on_qr_selected(photo("shop-qr.png")).await;
        assert_eq!(h.search.view().input_channel, InputChannel::Qr);

        assert_eq!(
            h.backend.search_calls(),
            vec!["image:cart.png", "image:shop-qr.png"]
        );
        assert!(h.navigator.paths().is_empty());
    }

    #[tokio::test]
    async fn test_same_photo_can_be_searched_twice() {
        let h = mount().await;

        assert_eq!(h.search.on_image_selected(photo("cart.png")).await, DispatchOutcome::Results(2));
        assert_eq!(h.search.on_image_selected(photo("cart.png")).await, DispatchOutcome::Results(2));
        assert_eq!(h.backend.search_calls(), vec!["image:cart.png", "image:cart.png"]);
    }

    // ============================================================================
    // Visibility and lifecycle
    // ============================================================================

    #[tokio::test]
    async fn test_outside_click_dismisses_only_that_instance() {
        let h = mount().await;
        let mobile = SearchOrchestrator::mount(
            deps(&h.backend, &h.navigator, &h.audio),
            "search-mobile",
            &h.listeners,
        )
        .await;
        assert_eq!(h.listeners.listener_count(), 2);

        h.search.on_query_change("saree").await;
        mobile.on_query_change("saree").await;

        h.listeners.dispatch_click(&PointerEvent::new([
            "suggestion-2",
            "search-desktop",
            "header",
            "body",
        ]));

        assert_eq!(h.search.view().phase, Visibility::ShowingSuggestions);
        assert_eq!(mobile.view().phase, Visibility::Idle);
    }

    #[tokio::test]
    async fn test_unmount_removes_listener() {
        let h = mount().await;
        assert_eq!(h.listeners.listener_count(), 1);

        h.search.unmount().await;
        assert_eq!(h.listeners.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_escape_then_focus_reopens_suggestions() {
        let h = mount().await;
        h.search.submit("jamdani").await;

        h.search.on_escape();
        assert_eq!(h.search.view().phase, Visibility::Idle);

        h.search.on_focus();
        assert_eq!(h.search.view().phase, Visibility::ShowingSuggestions);
    }

    #[tokio::test]
    async fn test_clear_resets_session_but_keeps_identity() {
        let h = mount().await;
        let id = h.search.session_id();
        h.search.submit("jamdani").await;

        h.search.clear();

        let view = h.search.view();
        assert_eq!(view.phase, Visibility::Idle);
        assert_eq!(view.query, "");
        assert!(view.results.is_empty());
        assert_eq!(h.search.session_id(), id);
    }

    #[tokio::test]
    async fn test_mount_loads_recommendations() {
        let picks = vec![SearchResult::new("p-5", ResultKind::Product, "Nakshi Kantha")];
        let h = mount_with(
            MockBackend::new().with_recommendations(picks.clone()),
            FakeAudioCapture::new(vec![]),
        )
        .await;

        assert_eq!(h.search.view().recommendations, picks);
    }

    // ============================================================================
    // Renderer events
    // ============================================================================

    #[tokio::test]
    async fn test_result_click_routes_and_dismisses() {
        let h = mount().await;
        h.search.submit("jamdani").await;
        let product = SearchResult::new("p-1", ResultKind::Product, "Cotton Saree");

        let outcome = h
            .search
            .handle_renderer_event(RendererEvent::ResultClick(product.clone()))
            .await;

        assert_eq!(outcome, DispatchOutcome::Navigated("/product/p-1".to_string()));
        assert_eq!(h.navigator.targets()[0].state, Some(product));
        assert_eq!(h.search.view().phase, Visibility::Idle);
    }

    #[tokio::test]
    async fn test_suggestion_click_submits_its_text() {
        let h = mount().await;

        let outcome = h
            .search
            .handle_renderer_event(RendererEvent::SuggestionClick(SuggestionItem::page(
                "checkout",
            )))
            .await;

        assert_eq!(outcome, DispatchOutcome::Navigated("/checkout".to_string()));
        assert!(h.backend.search_calls().is_empty());
    }

    #[tokio::test]
    async fn test_filters_apply_reruns_current_query() {
        let h = mount().await;
        h.search.submit("jamdani").await;
        h.search.toggle_filters();
        assert!(h.search.view().filters_open);

        let filters = Filters {
            free_shipping: Some(true),
            ..Default::default()
        };
        let outcome = h
            .search
            .handle_renderer_event(RendererEvent::FiltersApply(filters.clone()))
            .await;

        assert_eq!(outcome, DispatchOutcome::Results(2));
        let view = h.search.view();
        assert!(!view.filters_open);
        assert_eq!(view.filters, filters);
        assert_eq!(h.backend.search_calls(), vec!["text:jamdani", "text:jamdani"]);
    }
}
